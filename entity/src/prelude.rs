pub use super::action_items::Entity as ActionItems;
pub use super::meetings::Entity as Meetings;
pub use super::processing_tasks::Entity as ProcessingTasks;
pub use super::queue_jobs::Entity as QueueJobs;
pub use super::summaries::Entity as Summaries;
pub use super::transcripts::Entity as Transcripts;
pub use super::workspaces::Entity as Workspaces;
