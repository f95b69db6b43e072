//! Transcript normalization: one internal segment format out of
//! heterogeneous vendor payloads.
//!
//! Pure and deterministic: identical input always yields identical output,
//! with no I/O or clock access. The pipeline persists the result verbatim.

use crate::types::transcript::{NormalizedTranscript, RawTranscript, RawWord, Segment};

/// A segment is closed once its elapsed time exceeds this many seconds.
pub const MAX_SEGMENT_SECONDS: f64 = 10.0;

/// A segment is closed once it holds this many words.
pub const MAX_SEGMENT_WORDS: usize = 30;

/// Speaker sentinel used when a vendor provides no diarization.
pub const UNKNOWN_SPEAKER: &str = "Unknown";

const SENTENCE_ENDINGS: [char; 6] = ['.', '!', '?', '。', '！', '？'];

/// Converts a raw vendor transcript into the internal normalized form.
///
/// Vendors with word-level timestamps get sentence-style segments rebuilt
/// from the word stream; vendors that already segment get a pass-through
/// with timestamp reformatting only.
pub fn normalize(raw: &RawTranscript) -> NormalizedTranscript {
    let segments = if !raw.words.is_empty() {
        build_segments(&raw.words)
    } else {
        passthrough_segments(raw)
    };

    let content = match &raw.text {
        Some(text) if !text.is_empty() => text.clone(),
        _ => raw
            .words
            .iter()
            .map(|word| word.text.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    };

    // Duration: last segment end, else last word end, else vendor metadata.
    let duration_seconds = segments
        .last()
        .map(|segment| segment.end_time as i64)
        .or_else(|| raw.words.last().map(|word| word.end_time as i64))
        .or(raw.duration.map(|duration| duration as i64));

    NormalizedTranscript {
        content,
        segments,
        duration_seconds,
        raw_response: raw.raw.clone(),
    }
}

fn speaker_of(word: &RawWord) -> &str {
    word.speaker.as_deref().unwrap_or(UNKNOWN_SPEAKER)
}

fn ends_sentence(text: &str) -> bool {
    text.trim()
        .chars()
        .last()
        .map(|last| SENTENCE_ENDINGS.contains(&last))
        .unwrap_or(false)
}

fn derived_speaker_id(speaker: &str, vendor_id: &Option<String>) -> String {
    vendor_id
        .clone()
        .unwrap_or_else(|| speaker.replace(' ', "_").to_lowercase())
}

/// Accumulates words into segments. A segment closes when, in priority
/// order: the speaker changes (boundary lands before the changed word),
/// the just-appended word ends a sentence, the elapsed duration exceeds
/// `MAX_SEGMENT_SECONDS`, or the word count reaches `MAX_SEGMENT_WORDS`.
fn build_segments(words: &[RawWord]) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut current: Vec<&RawWord> = Vec::new();
    let mut current_start = 0.0;
    let mut current_speaker = UNKNOWN_SPEAKER.to_string();
    let mut current_speaker_id: Option<String> = None;

    let emit = |segments: &mut Vec<Segment>,
                words: &[&RawWord],
                start: f64,
                speaker: &str,
                speaker_id: &Option<String>| {
        let text = words
            .iter()
            .map(|word| word.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        segments.push(Segment {
            id: format!("seg_{}", segments.len()),
            text,
            start_time: start,
            end_time: words.last().map(|word| word.end_time).unwrap_or(start),
            speaker: speaker.to_string(),
            speaker_id: derived_speaker_id(speaker, speaker_id),
        });
    };

    for word in words {
        // Speaker change always opens a new segment before this word.
        if !current.is_empty() && speaker_of(word) != current_speaker {
            emit(
                &mut segments,
                &current,
                current_start,
                &current_speaker,
                &current_speaker_id,
            );
            current.clear();
        }

        if current.is_empty() {
            current_start = word.start_time;
            current_speaker = speaker_of(word).to_string();
            current_speaker_id = word.speaker_id.clone();
        }

        current.push(word);

        let close = ends_sentence(&word.text)
            || (word.end_time - current_start) > MAX_SEGMENT_SECONDS
            || current.len() >= MAX_SEGMENT_WORDS;

        if close {
            emit(
                &mut segments,
                &current,
                current_start,
                &current_speaker,
                &current_speaker_id,
            );
            current.clear();
        }
    }

    if !current.is_empty() {
        emit(
            &mut segments,
            &current,
            current_start,
            &current_speaker,
            &current_speaker_id,
        );
    }

    segments
}

/// Pass-through for vendors that return ready-made segments: keep their
/// grouping, fix the speaker to the unknown sentinel (no diarization
/// available), and drop empty entries.
fn passthrough_segments(raw: &RawTranscript) -> Vec<Segment> {
    raw.segments
        .iter()
        .filter(|segment| !segment.text.trim().is_empty())
        .enumerate()
        .map(|(index, segment)| Segment {
            id: segment
                .id
                .clone()
                .unwrap_or_else(|| format!("seg_{index}")),
            text: segment.text.trim().to_string(),
            start_time: segment.start_time,
            end_time: segment.end_time,
            speaker: UNKNOWN_SPEAKER.to_string(),
            speaker_id: UNKNOWN_SPEAKER.to_lowercase(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::transcript::RawSegment;
    use serde_json::json;

    fn word(text: &str, start: f64, end: f64, speaker: &str) -> RawWord {
        RawWord {
            text: text.to_string(),
            start_time: start,
            end_time: end,
            confidence: 0.95,
            speaker: Some(speaker.to_string()),
            speaker_id: None,
        }
    }

    fn uniform_words(count: usize, speaker: &str) -> Vec<RawWord> {
        (0..count)
            .map(|i| word(&format!("w{i}"), i as f64 * 0.1, i as f64 * 0.1 + 0.05, speaker))
            .collect()
    }

    fn raw(words: Vec<RawWord>) -> RawTranscript {
        RawTranscript {
            words,
            ..Default::default()
        }
    }

    #[test]
    fn untriggered_word_stream_yields_a_single_segment() {
        let words = uniform_words(12, "S1");
        let normalized = normalize(&raw(words));

        assert_eq!(normalized.segments.len(), 1);
        let segment = &normalized.segments[0];
        assert_eq!(segment.id, "seg_0");
        assert_eq!(segment.text, "w0 w1 w2 w3 w4 w5 w6 w7 w8 w9 w10 w11");
        assert_eq!(segment.speaker, "S1");
    }

    #[test]
    fn word_count_ceiling_splits_at_multiples_of_thirty() {
        let words = uniform_words(65, "S1");
        let normalized = normalize(&raw(words));

        assert_eq!(normalized.segments.len(), 3); // ceil(65 / 30)
        let counts: Vec<usize> = normalized
            .segments
            .iter()
            .map(|segment| segment.text.split_whitespace().count())
            .collect();
        assert_eq!(counts, vec![30, 30, 5]);
    }

    #[test]
    fn speaker_change_forces_a_boundary_before_the_changed_word() {
        let mut words = uniform_words(5, "Alice");
        words.extend((5..8).map(|i| word(&format!("w{i}"), i as f64, i as f64 + 0.2, "Bob")));
        let normalized = normalize(&raw(words));

        assert_eq!(normalized.segments.len(), 2);
        assert_eq!(normalized.segments[0].speaker, "Alice");
        assert_eq!(normalized.segments[1].speaker, "Bob");
        assert_eq!(normalized.segments[1].text, "w5 w6 w7");
    }

    #[test]
    fn sentence_punctuation_closes_the_segment_after_the_word() {
        let words = vec![
            word("Hello", 0.0, 0.3, "S1"),
            word("world.", 0.35, 0.6, "S1"),
            word("Next", 0.7, 0.9, "S1"),
        ];
        let normalized = normalize(&raw(words));

        assert_eq!(normalized.segments.len(), 2);
        assert_eq!(normalized.segments[0].text, "Hello world.");
        assert_eq!(normalized.segments[1].text, "Next");
    }

    #[test]
    fn cjk_sentence_punctuation_also_splits() {
        let words = vec![
            word("你好", 0.0, 0.4, "S1"),
            word("世界。", 0.5, 0.9, "S1"),
            word("繼續", 1.0, 1.4, "S1"),
        ];
        let normalized = normalize(&raw(words));

        assert_eq!(normalized.segments.len(), 2);
        assert_eq!(normalized.segments[0].text, "你好 世界。");
    }

    #[test]
    fn duration_ceiling_splits_long_segments() {
        // One word per second; the word ending at 10.5s exceeds the 10s
        // ceiling measured from segment start 0.0.
        let words: Vec<RawWord> = (0..12)
            .map(|i| word(&format!("w{i}"), i as f64, i as f64 + 0.5, "S1"))
            .collect();
        let normalized = normalize(&raw(words));

        assert_eq!(normalized.segments.len(), 2);
        assert_eq!(
            normalized.segments[0].text.split_whitespace().count(),
            11 // w0..w10; w10 ends at 10.5s which breaches the ceiling
        );
        assert_eq!(normalized.segments[1].text, "w11");
    }

    #[test]
    fn segment_times_are_monotonically_non_decreasing() {
        let mut words = uniform_words(40, "Alice");
        words.push(word("done.", 4.0, 4.2, "Alice"));
        words.extend((0..35).map(|i| {
            word(
                &format!("b{i}"),
                5.0 + i as f64 * 0.1,
                5.0 + i as f64 * 0.1 + 0.05,
                "Bob",
            )
        }));
        let normalized = normalize(&raw(words));

        assert!(normalized.segments.len() >= 4);
        for pair in normalized.segments.windows(2) {
            assert!(pair[1].start_time >= pair[0].start_time);
            assert!(pair[1].end_time >= pair[0].end_time);
        }
        for (index, segment) in normalized.segments.iter().enumerate() {
            assert_eq!(segment.id, format!("seg_{index}"));
            assert!(segment.end_time >= segment.start_time);
        }
    }

    #[test]
    fn speaker_id_is_derived_from_the_label_when_absent() {
        let words = vec![word("hi", 0.0, 0.2, "Speaker A")];
        let normalized = normalize(&raw(words));

        assert_eq!(normalized.segments[0].speaker_id, "speaker_a");
    }

    #[test]
    fn vendor_speaker_id_wins_over_derivation() {
        let mut w = word("hi", 0.0, 0.2, "Speaker A");
        w.speaker_id = Some("spk_7".to_string());
        let normalized = normalize(&raw(vec![w]));

        assert_eq!(normalized.segments[0].speaker_id, "spk_7");
    }

    #[test]
    fn missing_speaker_falls_back_to_the_unknown_sentinel() {
        let mut w = word("hi", 0.0, 0.2, "x");
        w.speaker = None;
        let normalized = normalize(&raw(vec![w]));

        assert_eq!(normalized.segments[0].speaker, "Unknown");
        assert_eq!(normalized.segments[0].speaker_id, "unknown");
    }

    #[test]
    fn empty_input_yields_empty_segments_and_text_fallback() {
        let empty = normalize(&RawTranscript::default());
        assert!(empty.segments.is_empty());
        assert_eq!(empty.content, "");
        assert_eq!(empty.duration_seconds, None);

        let with_fallback = normalize(&RawTranscript {
            text: Some("vendor level text".to_string()),
            ..Default::default()
        });
        assert!(with_fallback.segments.is_empty());
        assert_eq!(with_fallback.content, "vendor level text");
    }

    #[test]
    fn content_prefers_vendor_text_over_word_join() {
        let normalized = normalize(&RawTranscript {
            text: Some("exact vendor text".to_string()),
            words: uniform_words(3, "S1"),
            ..Default::default()
        });
        assert_eq!(normalized.content, "exact vendor text");

        let joined = normalize(&raw(uniform_words(3, "S1")));
        assert_eq!(joined.content, "w0 w1 w2");
    }

    #[test]
    fn passthrough_keeps_vendor_grouping_and_marks_speakers_unknown() {
        let normalized = normalize(&RawTranscript {
            text: Some("full text".to_string()),
            segments: vec![
                RawSegment {
                    id: Some("seg_0".to_string()),
                    text: " first part ".to_string(),
                    start_time: 0.0,
                    end_time: 4.5,
                },
                RawSegment {
                    id: None,
                    text: "   ".to_string(),
                    start_time: 4.5,
                    end_time: 5.0,
                },
                RawSegment {
                    id: None,
                    text: "second part".to_string(),
                    start_time: 5.0,
                    end_time: 9.0,
                },
            ],
            duration: Some(9.4),
            ..Default::default()
        });

        assert_eq!(normalized.segments.len(), 2);
        assert_eq!(normalized.segments[0].text, "first part");
        assert_eq!(normalized.segments[0].speaker, "Unknown");
        assert_eq!(normalized.segments[1].speaker_id, "unknown");
        assert_eq!(normalized.duration_seconds, Some(9));
    }

    #[test]
    fn duration_falls_back_to_vendor_metadata_without_words_or_segments() {
        let normalized = normalize(&RawTranscript {
            duration: Some(123.9),
            ..Default::default()
        });
        assert_eq!(normalized.duration_seconds, Some(123));
    }

    #[test]
    fn raw_vendor_payload_is_carried_through_untouched() {
        let payload = json!({"vendor": "speechmatics", "results": []});
        let normalized = normalize(&RawTranscript {
            raw: payload.clone(),
            ..Default::default()
        });
        assert_eq!(normalized.raw_response, payload);
    }

    #[test]
    fn identical_input_normalizes_identically() {
        let input = raw(uniform_words(45, "S1"));
        let first = normalize(&input);
        let second = normalize(&input);
        assert_eq!(first.segments, second.segments);
        assert_eq!(first.content, second.content);
    }
}
