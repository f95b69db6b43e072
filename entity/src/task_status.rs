use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status of a background processing task.
///
/// A task passes through Processing twice (once per pipeline stage) and
/// parks at ReviewReady between and after stages; Completed is reserved
/// for the user-confirmed finalize transition.
#[derive(
    Debug, Clone, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "task_status")]
pub enum TaskStatus {
    /// Waiting in the job queue
    #[sea_orm(string_value = "queued")]
    #[default]
    Queued,
    /// A worker is actively running a pipeline stage
    #[sea_orm(string_value = "processing")]
    Processing,
    /// Stage output is ready for human review
    #[sea_orm(string_value = "review_ready")]
    ReviewReady,
    /// User finalized the task
    #[sea_orm(string_value = "completed")]
    Completed,
    /// A stage failed; error_message holds the cause
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl TaskStatus {
    /// The single authoritative transition table for processing tasks.
    /// ReviewReady → Processing covers the summarization stage re-entering
    /// work after transcription parked the task; Processing → Completed
    /// covers the early-finalize path at 100% progress; Failed → Processing
    /// is the operator re-enqueue recovery edge (a fresh stage start, the
    /// one permitted backward progress move).
    pub fn can_transition_to(&self, next: &TaskStatus) -> bool {
        use TaskStatus::*;
        if self == next {
            return *self != Failed;
        }
        matches!(
            (self, next),
            (Queued, Processing)
                | (Queued, Failed)
                | (Processing, ReviewReady)
                | (Processing, Completed)
                | (Processing, Failed)
                | (ReviewReady, Processing)
                | (ReviewReady, Completed)
                | (ReviewReady, Failed)
                | (Failed, Processing)
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Queued => write!(fmt, "queued"),
            TaskStatus::Processing => write!(fmt, "processing"),
            TaskStatus::ReviewReady => write!(fmt, "review_ready"),
            TaskStatus::Completed => write!(fmt, "completed"),
            TaskStatus::Failed => write!(fmt, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TaskStatus::*;

    #[test]
    fn both_stages_can_enter_processing() {
        assert!(Queued.can_transition_to(&Processing));
        assert!(ReviewReady.can_transition_to(&Processing));
    }

    #[test]
    fn finalize_paths_are_allowed() {
        assert!(ReviewReady.can_transition_to(&Completed));
        assert!(Processing.can_transition_to(&Completed));
        assert!(Completed.can_transition_to(&Completed));
    }

    #[test]
    fn failed_only_reopens_through_a_fresh_stage_start() {
        assert!(Failed.can_transition_to(&Processing));
        assert!(!Failed.can_transition_to(&Failed));
        assert!(!Failed.can_transition_to(&Completed));
        assert!(!Failed.can_transition_to(&ReviewReady));
        assert!(!Failed.can_transition_to(&Queued));
    }

    #[test]
    fn completed_cannot_reopen() {
        assert!(!Completed.can_transition_to(&Processing));
        assert!(!Completed.can_transition_to(&ReviewReady));
        assert!(!Completed.can_transition_to(&Failed));
    }

    #[test]
    fn enqueue_failure_can_fail_a_queued_task() {
        assert!(Queued.can_transition_to(&Failed));
    }
}
