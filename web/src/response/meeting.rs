//! Frontend-facing meeting projections.
//!
//! The stored entities use snake_case and vendor-shaped JSON blobs; the
//! client contract is camelCase with humanized durations, `MM:SS` segment
//! timestamps and speakers derived from the transcript. All JSON blob reads
//! fall back field-by-field so older rows keep rendering.

use domain::action_status::ActionStatus;
use domain::meeting::MeetingDetail;
use domain::meetings::Model as MeetingModel;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MeetingListItemResponse {
    pub id: String,
    pub workspace_id: String,
    pub title: String,
    /// ISO datetime the meeting was recorded (or created)
    pub date: String,
    /// Humanized duration, e.g. "45 mins" or "1 hour 30 mins"
    pub duration: String,
    pub status: String,
    pub tags: Vec<String>,
    pub template: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TranscriptSegmentResponse {
    pub id: String,
    pub speaker_id: String,
    /// Segment start formatted MM:SS
    pub timestamp: String,
    pub text: String,
    pub sentiment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct SpeakerResponse {
    pub id: String,
    pub name: String,
    pub role: String,
    /// Initials placeholder until profile avatars exist
    pub avatar: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActionItemResponse {
    pub id: String,
    pub description: String,
    pub owner: String,
    pub due_date: String,
    pub status: String,
    pub priority: String,
    pub related_segment_id: String,
    pub reminder: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct KeyDecisionResponse {
    pub id: String,
    pub description: String,
    pub related_segment_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MeetingSummaryResponse {
    pub executive_summary: String,
    pub detailed_minutes: Option<String>,
    pub decisions: Vec<KeyDecisionResponse>,
    pub action_items: Vec<ActionItemResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MeetingDetailResponse {
    pub id: String,
    pub workspace_id: String,
    pub title: String,
    pub date: String,
    pub duration: String,
    pub participants: Vec<SpeakerResponse>,
    pub tags: Vec<String>,
    pub transcript: Vec<TranscriptSegmentResponse>,
    pub summary: Option<MeetingSummaryResponse>,
    pub hub_spot_synced: bool,
    pub status: String,
    pub template: Option<String>,
}

/// "45 mins", "1 hour", "2 hours 5 mins"; None renders as "0 mins".
pub(crate) fn format_duration(seconds: Option<i32>) -> String {
    let Some(seconds) = seconds else {
        return "0 mins".to_string();
    };

    let minutes = seconds / 60;
    let hours = minutes / 60;
    let remaining_minutes = minutes % 60;

    if hours > 0 {
        let hours_part = format!("{hours} hour{}", if hours > 1 { "s" } else { "" });
        if remaining_minutes > 0 {
            format!(
                "{hours_part} {remaining_minutes} min{}",
                if remaining_minutes > 1 { "s" } else { "" }
            )
        } else {
            hours_part
        }
    } else {
        format!("{minutes} min{}", if minutes != 1 { "s" } else { "" })
    }
}

/// Segment start time as MM:SS.
pub(crate) fn format_timestamp(seconds: f64) -> String {
    let minutes = (seconds / 60.0) as i64;
    let secs = (seconds % 60.0) as i64;
    format!("{minutes:02}:{secs:02}")
}

/// Tags are stored as a JSON array of strings; anything else reads as empty.
pub(crate) fn json_tags(tags: &Option<Value>) -> Vec<String> {
    match tags {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| entry.as_str().map(String::from))
            .collect(),
        _ => Vec::new(),
    }
}

fn meeting_date(meeting: &MeetingModel) -> String {
    meeting
        .recorded_at
        .map(|recorded| recorded.to_rfc3339())
        .unwrap_or_else(|| meeting.created_at.to_rfc3339())
}

/// Stored segment records back out of the transcript's JSON column, with
/// documented defaults for anything missing.
pub(crate) fn convert_segments(segments: &Option<Value>) -> Vec<TranscriptSegmentResponse> {
    let Some(Value::Array(entries)) = segments else {
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let record = entry.as_object()?;
            let speaker = record
                .get("speaker")
                .and_then(Value::as_str)
                .unwrap_or("Unknown");
            Some(TranscriptSegmentResponse {
                id: record
                    .get("id")
                    .and_then(Value::as_str)
                    .map(String::from)
                    .unwrap_or_else(|| format!("seg_{index}")),
                speaker_id: record
                    .get("speaker_id")
                    .and_then(Value::as_str)
                    .map(String::from)
                    .unwrap_or_else(|| speaker.replace(' ', "_").to_lowercase()),
                timestamp: format_timestamp(
                    record
                        .get("start_time")
                        .and_then(Value::as_f64)
                        .unwrap_or(0.0),
                ),
                text: record
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                sentiment: record
                    .get("sentiment")
                    .and_then(Value::as_str)
                    .map(String::from),
            })
        })
        .collect()
}

/// Distinct speakers across the segments, with initials avatars.
pub(crate) fn extract_participants(segments: &Option<Value>) -> Vec<SpeakerResponse> {
    let mut seen: Vec<String> = Vec::new();
    let mut participants: Vec<SpeakerResponse> = Vec::new();

    let Some(Value::Array(entries)) = segments else {
        return participants;
    };

    for entry in entries {
        let Some(record) = entry.as_object() else {
            continue;
        };
        let name = record
            .get("speaker")
            .and_then(Value::as_str)
            .unwrap_or("Unknown");
        let id = record
            .get("speaker_id")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| name.replace(' ', "_").to_lowercase());

        if seen.contains(&id) {
            continue;
        }
        seen.push(id.clone());

        let initials: String = name
            .split_whitespace()
            .take(2)
            .filter_map(|word| word.chars().next())
            .flat_map(|letter| letter.to_uppercase())
            .collect();

        participants.push(SpeakerResponse {
            id,
            name: name.to_string(),
            role: "Participant".to_string(),
            avatar: if initials.is_empty() {
                "U".to_string()
            } else {
                initials
            },
        });
    }

    participants
}

fn map_action_status(status: &ActionStatus) -> &'static str {
    match status {
        ActionStatus::Pending => "pending",
        ActionStatus::InProgress => "in-progress",
        ActionStatus::Done => "completed",
    }
}

pub(crate) fn convert_action_items(
    items: &[domain::action_items::Model],
) -> Vec<ActionItemResponse> {
    items
        .iter()
        .map(|item| {
            let description = match &item.description {
                Some(body) if !item.title.is_empty() && body != &item.title => {
                    format!("{}: {}", item.title, body)
                }
                Some(body) => body.clone(),
                None => item.title.clone(),
            };

            let owner = match (&item.owner_name, &item.owner_email) {
                (Some(name), Some(email)) => format!("{name} ({email})"),
                (Some(name), None) => name.clone(),
                (None, Some(email)) => email.clone(),
                (None, None) => "Unassigned".to_string(),
            };

            ActionItemResponse {
                id: item.id.to_string(),
                description,
                owner,
                due_date: item
                    .due_date
                    .map(|due| due.to_string())
                    .unwrap_or_default(),
                status: map_action_status(&item.status).to_string(),
                priority: item.priority.to_string(),
                related_segment_id: String::new(),
                reminder: None,
            }
        })
        .collect()
}

/// Decisions back out of the summary's JSON column with key fallbacks kept
/// from older row shapes.
pub(crate) fn convert_decisions(decisions: &Option<Value>) -> Vec<KeyDecisionResponse> {
    let Some(Value::Array(entries)) = decisions else {
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let record = entry.as_object()?;
            Some(KeyDecisionResponse {
                id: record
                    .get("id")
                    .and_then(Value::as_str)
                    .map(String::from)
                    .unwrap_or_else(|| format!("dec_{index}")),
                description: record
                    .get("description")
                    .or_else(|| record.get("text"))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                related_segment_id: record
                    .get("relatedSegmentId")
                    .or_else(|| record.get("related_segment_id"))
                    .or_else(|| record.get("segment_id"))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            })
        })
        .collect()
}

impl MeetingListItemResponse {
    pub(crate) fn from_model(meeting: &MeetingModel) -> Self {
        Self {
            id: meeting.id.to_string(),
            workspace_id: meeting
                .workspace_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            title: meeting.title.clone(),
            date: meeting_date(meeting),
            duration: format_duration(meeting.audio_duration_seconds),
            status: meeting.status.to_string(),
            tags: json_tags(&meeting.tags),
            template: meeting.template.clone(),
        }
    }
}

impl MeetingDetailResponse {
    pub(crate) fn from_detail(detail: &MeetingDetail) -> Self {
        let meeting = &detail.meeting;
        let segments = detail
            .transcript
            .as_ref()
            .map(|transcript| transcript.segments.clone())
            .unwrap_or_default();

        let summary = detail.summary.as_ref().map(|summary| MeetingSummaryResponse {
            executive_summary: summary.overview.clone().unwrap_or_default(),
            detailed_minutes: summary.detailed_minutes.clone(),
            decisions: convert_decisions(&summary.decisions),
            action_items: convert_action_items(&detail.action_items),
        });

        Self {
            id: meeting.id.to_string(),
            workspace_id: meeting
                .workspace_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            title: meeting.title.clone(),
            date: meeting_date(meeting),
            duration: format_duration(meeting.audio_duration_seconds),
            participants: extract_participants(&segments),
            tags: json_tags(&meeting.tags),
            transcript: convert_segments(&segments),
            summary,
            hub_spot_synced: meeting.hubspot_synced,
            status: meeting.status.to_string(),
            template: meeting.template.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn durations_humanize_like_the_frontend_expects() {
        assert_eq!(format_duration(None), "0 mins");
        assert_eq!(format_duration(Some(0)), "0 mins");
        assert_eq!(format_duration(Some(60)), "1 min");
        assert_eq!(format_duration(Some(45 * 60)), "45 mins");
        assert_eq!(format_duration(Some(60 * 60)), "1 hour");
        assert_eq!(format_duration(Some(90 * 60)), "1 hour 30 mins");
        assert_eq!(format_duration(Some(2 * 60 * 60 + 60)), "2 hours 1 min");
    }

    #[test]
    fn timestamps_render_minutes_and_seconds() {
        assert_eq!(format_timestamp(5.4), "00:05");
        assert_eq!(format_timestamp(65.0), "01:05");
        assert_eq!(format_timestamp(45.0 * 60.0 + 30.0), "45:30");
    }

    #[test]
    fn segment_records_fall_back_field_by_field() {
        let segments = Some(json!([
            {"text": "hello", "speaker": "Speaker A", "start_time": 65.0},
            "garbage",
            {"id": "seg_9", "speaker_id": "spk_1", "text": "again", "sentiment": "positive"}
        ]));

        let converted = convert_segments(&segments);
        assert_eq!(converted.len(), 2);
        assert_eq!(converted[0].id, "seg_0");
        assert_eq!(converted[0].speaker_id, "speaker_a");
        assert_eq!(converted[0].timestamp, "01:05");
        assert_eq!(converted[1].id, "seg_9");
        assert_eq!(converted[1].sentiment.as_deref(), Some("positive"));
    }

    #[test]
    fn participants_are_deduplicated_with_initials_avatars() {
        let segments = Some(json!([
            {"speaker": "May Wong", "speaker_id": "may", "text": "a"},
            {"speaker": "May Wong", "speaker_id": "may", "text": "b"},
            {"speaker": "Ken", "text": "c"}
        ]));

        let participants = extract_participants(&segments);
        assert_eq!(participants.len(), 2);
        assert_eq!(participants[0].avatar, "MW");
        assert_eq!(participants[1].id, "ken");
        assert_eq!(participants[1].avatar, "K");
    }

    #[test]
    fn decision_records_tolerate_older_key_spellings() {
        let decisions = Some(json!([
            {"description": "Ship Q3", "relatedSegmentId": "seg_1"},
            {"text": "Hire two engineers", "segment_id": "seg_4"},
            17
        ]));

        let converted = convert_decisions(&decisions);
        assert_eq!(converted.len(), 2);
        assert_eq!(converted[0].related_segment_id, "seg_1");
        assert_eq!(converted[1].description, "Hire two engineers");
        assert_eq!(converted[1].related_segment_id, "seg_4");
        assert_eq!(converted[1].id, "dec_1");
    }

    #[test]
    fn tags_read_as_empty_when_the_column_is_malformed() {
        assert!(json_tags(&None).is_empty());
        assert!(json_tags(&Some(json!("oops"))).is_empty());
        assert_eq!(json_tags(&Some(json!(["a", "b"]))), vec!["a", "b"]);
    }
}
