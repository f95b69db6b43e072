//! Types for transcription operations.

use serde::{Deserialize, Serialize};

/// A word with timing as reported by a vendor, before normalization.
///
/// Speaker fields are optional because not every vendor diarizes; the
/// normalizer substitutes the "Unknown" sentinel where they are absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawWord {
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(default)]
    pub speaker_id: Option<String>,
}

/// A ready-made segment from a vendor that does its own sentence grouping
/// (no word-level reconstruction needed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSegment {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
}

/// Vendor transcription output reduced to the material the normalizer
/// consumes. Exactly one of `words` / `segments` is usually populated;
/// `raw` retains the untouched vendor payload for audit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTranscript {
    /// Vendor-level full text, used as the content fallback
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub words: Vec<RawWord>,
    #[serde(default)]
    pub segments: Vec<RawSegment>,
    /// Vendor-reported audio duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    /// The untouched vendor response
    #[serde(default)]
    pub raw: serde_json::Value,
}

/// One contiguous span of transcript text attributed to a single speaker.
///
/// This is the internal segment format every vendor payload is normalized
/// into; it is what gets persisted on the transcript row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Sequential id of the form `seg_<n>`
    pub id: String,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    pub speaker: String,
    pub speaker_id: String,
}

/// The normalizer's output: everything the pipeline persists for a meeting's
/// transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedTranscript {
    pub content: String,
    pub segments: Vec<Segment>,
    pub duration_seconds: Option<i64>,
    pub raw_response: serde_json::Value,
}

/// A transcription request handed to a provider: the audio bytes plus the
/// context the vendor call needs.
#[derive(Debug, Clone)]
pub struct TranscribeRequest {
    pub audio: Vec<u8>,
    /// Original filename; vendors use the extension to pick a content type
    pub filename: String,
    /// ISO language code; None lets the vendor auto-detect
    pub language: Option<String>,
}
