//! Summarization provider trait.

use crate::types::summary::{SummaryOutput, SummaryRequest};
use crate::Error;
use async_trait::async_trait;

/// Abstraction for LLM-backed meeting summarization.
///
/// One structured request/response: transcript text in, `SummaryOutput`
/// JSON out. The prompt content behind the call is configuration, not
/// pipeline logic. A malformed (non-JSON) vendor response surfaces as
/// `Error::Deserialization` and is terminal for the pipeline run.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Generate a structured summary for the given transcript.
    async fn generate_summary(&self, request: SummaryRequest) -> Result<SummaryOutput, Error>;

    /// Identifier of the underlying model (e.g., "gpt-4o-mini"), recorded
    /// on the stored summary for provenance.
    fn model_id(&self) -> &str;
}
