use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which pipeline stage a queued job executes.
#[derive(Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Serialize, DeriveActiveEnum)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "job_stage")]
pub enum JobStage {
    #[sea_orm(string_value = "transcription")]
    Transcription,
    #[sea_orm(string_value = "summarization")]
    Summarization,
}

impl std::fmt::Display for JobStage {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStage::Transcription => write!(fmt, "transcription"),
            JobStage::Summarization => write!(fmt, "summarization"),
        }
    }
}
