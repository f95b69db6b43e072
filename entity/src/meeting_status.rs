use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Processing lifecycle of an uploaded meeting.
///
/// The canonical path is Uploaded → Transcribing → Summarizing → Completed.
/// Failed is reachable from either in-flight state. Scheduled is reserved
/// for future calendar-driven recordings; no pipeline path produces it.
#[derive(
    Debug, Clone, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "meeting_status")]
pub enum MeetingStatus {
    /// Audio received, no processing started yet
    #[sea_orm(string_value = "uploaded")]
    #[default]
    Uploaded,
    /// Reserved placeholder for scheduled (not yet recorded) meetings
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    /// Transcription job is running
    #[sea_orm(string_value = "transcribing")]
    Transcribing,
    /// Transcript persisted, summary generation pending or running
    #[sea_orm(string_value = "summarizing")]
    Summarizing,
    /// All derived content produced and confirmed
    #[sea_orm(string_value = "completed")]
    Completed,
    /// A pipeline stage failed; status_reason holds the cause
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl MeetingStatus {
    /// The single authoritative transition table for meetings. Every status
    /// write goes through `entity_api::meeting::update_status`, which
    /// rejects anything this table does not allow. Self-transitions are
    /// permitted so repeated writes stay idempotent. Failed accepts only
    /// the two re-entry edges an operator re-enqueue takes.
    pub fn can_transition_to(&self, next: &MeetingStatus) -> bool {
        use MeetingStatus::*;
        if self == next {
            return *self != Failed;
        }
        matches!(
            (self, next),
            (Uploaded, Scheduled)
                | (Uploaded, Transcribing)
                | (Uploaded, Completed)
                | (Scheduled, Transcribing)
                | (Transcribing, Summarizing)
                | (Transcribing, Completed)
                | (Transcribing, Failed)
                | (Summarizing, Completed)
                | (Summarizing, Failed)
                | (Failed, Transcribing)
                | (Failed, Summarizing)
        )
    }
}

impl std::fmt::Display for MeetingStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeetingStatus::Uploaded => write!(fmt, "uploaded"),
            MeetingStatus::Scheduled => write!(fmt, "scheduled"),
            MeetingStatus::Transcribing => write!(fmt, "transcribing"),
            MeetingStatus::Summarizing => write!(fmt, "summarizing"),
            MeetingStatus::Completed => write!(fmt, "completed"),
            MeetingStatus::Failed => write!(fmt, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MeetingStatus::*;

    #[test]
    fn happy_path_transitions_are_allowed() {
        assert!(Uploaded.can_transition_to(&Transcribing));
        assert!(Transcribing.can_transition_to(&Summarizing));
        assert!(Summarizing.can_transition_to(&Completed));
    }

    #[test]
    fn failure_is_only_reachable_from_in_flight_states() {
        assert!(Transcribing.can_transition_to(&Failed));
        assert!(Summarizing.can_transition_to(&Failed));
        assert!(!Uploaded.can_transition_to(&Failed));
        assert!(!Completed.can_transition_to(&Failed));
    }

    #[test]
    fn failed_only_reopens_into_a_pipeline_stage() {
        // An operator re-enqueue restarts a stage; nothing else touches a
        // failed meeting.
        assert!(Failed.can_transition_to(&Transcribing));
        assert!(Failed.can_transition_to(&Summarizing));
        assert!(!Failed.can_transition_to(&Failed));
        assert!(!Failed.can_transition_to(&Completed));
        assert!(!Failed.can_transition_to(&Uploaded));
    }

    #[test]
    fn self_transitions_are_idempotent() {
        assert!(Summarizing.can_transition_to(&Summarizing));
        assert!(Completed.can_transition_to(&Completed));
    }

    #[test]
    fn statuses_never_move_backwards() {
        assert!(!Summarizing.can_transition_to(&Transcribing));
        assert!(!Completed.can_transition_to(&Summarizing));
        assert!(!Transcribing.can_transition_to(&Uploaded));
    }
}
