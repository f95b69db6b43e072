//! Frontend-facing processing task projections (camelCase, ISO timestamps).

use domain::processing_tasks::Model as ProcessingTaskModel;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProcessingTaskListResponse {
    pub id: String,
    pub workspace_id: String,
    pub filename: String,
    pub file_size: i64,
    pub status: String,
    pub progress: i32,
    pub logs: Vec<String>,
    /// ISO-8601, empty until the job is enqueued
    pub start_time: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProcessingTaskDetailResponse {
    pub id: String,
    pub workspace_id: String,
    pub filename: String,
    pub file_size: i64,
    pub status: String,
    pub progress: i32,
    pub logs: Vec<String>,
    pub start_time: String,
    pub meeting_id: Option<String>,
    pub queue_job_id: Option<String>,
    pub error_message: Option<String>,
}

fn logs_vec(logs: &Option<Value>) -> Vec<String> {
    match logs {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| entry.as_str().map(String::from))
            .collect(),
        _ => Vec::new(),
    }
}

fn start_time_string(task: &ProcessingTaskModel) -> String {
    task.start_time
        .map(|start| start.to_rfc3339())
        .unwrap_or_default()
}

impl ProcessingTaskListResponse {
    pub(crate) fn from_model(task: &ProcessingTaskModel) -> Self {
        Self {
            id: task.id.to_string(),
            workspace_id: task.workspace_id.to_string(),
            filename: task.filename.clone(),
            file_size: task.file_size,
            status: task.status.to_string(),
            progress: task.progress,
            logs: logs_vec(&task.logs),
            start_time: start_time_string(task),
        }
    }
}

impl ProcessingTaskDetailResponse {
    pub(crate) fn from_model(task: &ProcessingTaskModel) -> Self {
        Self {
            id: task.id.to_string(),
            workspace_id: task.workspace_id.to_string(),
            filename: task.filename.clone(),
            file_size: task.file_size,
            status: task.status.to_string(),
            progress: task.progress,
            logs: logs_vec(&task.logs),
            start_time: start_time_string(task),
            meeting_id: task.meeting_id.map(|id| id.to_string()),
            queue_job_id: task.queue_job_id.clone(),
            error_message: task.error_message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::task_status::TaskStatus;
    use serde_json::json;

    fn task_fixture() -> ProcessingTaskModel {
        ProcessingTaskModel {
            id: domain::Id::new_v4(),
            workspace_id: domain::Id::new_v4(),
            filename: "meeting1.wav".to_string(),
            file_size: 3_500_000,
            status: TaskStatus::ReviewReady,
            progress: 100,
            logs: Some(json!(["File uploaded successfully", "[09:00:00 AM] Done"])),
            start_time: None,
            meeting_id: None,
            queue_job_id: Some("b9f2".to_string()),
            error_message: None,
            created_at: chrono::Utc::now().into(),
            updated_at: chrono::Utc::now().into(),
        }
    }

    #[test]
    fn projection_uses_camel_case_keys() {
        let response = ProcessingTaskDetailResponse::from_model(&task_fixture());
        let value = serde_json::to_value(&response).unwrap();

        assert!(value.get("workspaceId").is_some());
        assert!(value.get("fileSize").is_some());
        assert!(value.get("queueJobId").is_some());
        assert_eq!(value["status"], json!("review_ready"));
        assert_eq!(value["startTime"], json!(""));
    }

    #[test]
    fn logs_survive_the_round_trip_in_order() {
        let response = ProcessingTaskListResponse::from_model(&task_fixture());
        assert_eq!(response.logs.len(), 2);
        assert_eq!(response.logs[0], "File uploaded successfully");
    }
}
