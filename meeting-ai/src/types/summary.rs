//! Types for structured summarization output.
//!
//! The LLM is asked for a fixed JSON shape, but its output is still vendor
//! territory: every field here defaults when missing, and action items are
//! kept loose (`Value`) so one malformed record can be skipped without
//! discarding the batch.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Input contract for a summarization call.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub transcript_text: String,
    pub meeting_title: Option<String>,
    /// Free-text template category steering the system prompt
    pub template: Option<String>,
    pub language: String,
}

/// An agenda item extracted from the transcript.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgendaItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// A decision made during the meeting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "relatedSegmentId", alias = "segment_id")]
    pub related_segment_id: String,
}

/// An important point or insight worth surfacing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    /// One of "technical" | "business" | "action" | "risk"
    #[serde(default)]
    pub category: String,
}

/// A follow-up task extracted from the summary, parsed individually so a
/// malformed sibling never poisons the batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionItemDraft {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub description: String,
    /// Owner name as mentioned in the transcript, else "TBD"
    #[serde(default)]
    pub owner: Option<String>,
    /// `YYYY-MM-DD` or an ISO datetime string
    #[serde(default, rename = "dueDate")]
    pub due_date: Option<String>,
    /// "high" | "medium" | "low"
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default, rename = "relatedSegmentId")]
    pub related_segment_id: String,
}

/// The summarizer's structured output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryOutput {
    #[serde(default)]
    pub overview: String,
    /// Absent for very short or non-business transcripts
    #[serde(default)]
    pub detailed_minutes: Option<String>,
    #[serde(default)]
    pub agenda_items: Vec<AgendaItem>,
    #[serde(default)]
    pub decisions: Vec<Decision>,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
    /// Kept loose on purpose; use `action_item_drafts` to extract
    #[serde(default)]
    pub action_items: Vec<Value>,
}

impl SummaryOutput {
    /// Extracts the action items that parse as records, skipping malformed
    /// entries (non-objects, wrong field types) without aborting the batch.
    pub fn action_item_drafts(&self) -> Vec<ActionItemDraft> {
        self.action_items
            .iter()
            .filter(|item| item.is_object())
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_collapse_to_defaults() {
        let output: SummaryOutput = serde_json::from_value(json!({
            "overview": "Quarterly planning recap."
        }))
        .unwrap();

        assert_eq!(output.overview, "Quarterly planning recap.");
        assert!(output.detailed_minutes.is_none());
        assert!(output.decisions.is_empty());
        assert!(output.action_items.is_empty());
    }

    #[test]
    fn decision_segment_id_accepts_both_key_spellings() {
        let camel: Decision =
            serde_json::from_value(json!({"id": "dec_1", "relatedSegmentId": "seg_3"})).unwrap();
        let snake: Decision =
            serde_json::from_value(json!({"id": "dec_1", "segment_id": "seg_3"})).unwrap();
        assert_eq!(camel.related_segment_id, "seg_3");
        assert_eq!(snake.related_segment_id, "seg_3");
    }

    #[test]
    fn malformed_action_items_are_skipped_not_fatal() {
        let output: SummaryOutput = serde_json::from_value(json!({
            "overview": "x",
            "action_items": [
                {"description": "Send the deck", "owner": "May", "priority": "high"},
                "not-a-record",
                42,
                {"description": "Book the room", "dueDate": "2025-09-01"}
            ]
        }))
        .unwrap();

        let drafts = output.action_item_drafts();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].description, "Send the deck");
        assert_eq!(drafts[1].due_date.as_deref(), Some("2025-09-01"));
    }

    #[test]
    fn empty_object_drafts_still_parse_with_defaults() {
        let output: SummaryOutput = serde_json::from_value(json!({
            "action_items": [{}]
        }))
        .unwrap();

        let drafts = output.action_item_drafts();
        assert_eq!(drafts.len(), 1);
        assert!(drafts[0].description.is_empty());
        assert!(drafts[0].owner.is_none());
    }
}
