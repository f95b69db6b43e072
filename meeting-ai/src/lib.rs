//! Meeting AI abstraction layer for transcription and summarization providers.
//!
//! This crate provides the trait-based seam between the processing pipeline
//! and external AI vendors:
//! - Speech-to-text transcription (batch-polling or synchronous vendors)
//! - LLM-powered structured summarization
//! - The pure transcript normalizer that converts heterogeneous vendor
//!   payloads into one internal segment format
//!
//! The design is provider-agnostic: the pipeline holds `dyn Provider` /
//! `dyn Summarizer` instances constructed at its call sites, so vendors can
//! be swapped (or faked in tests) without touching orchestration code.

pub mod error;
pub mod normalize;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::Error;
pub use types::transcript::{NormalizedTranscript, RawTranscript, Segment};
