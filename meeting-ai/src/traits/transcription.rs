//! Transcription provider trait.

use crate::types::transcript::{RawTranscript, TranscribeRequest};
use crate::Error;
use async_trait::async_trait;

/// Abstraction for speech-to-text transcription services.
///
/// Implementations convert audio to a `RawTranscript` the normalizer can
/// consume. Batch vendors implement this by creating a job, polling its
/// status to a terminal state and fetching the result; synchronous vendors
/// do it in one blocking call. The pipeline depends only on this trait, so
/// providers can be swapped by configuration or faked in tests.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Transcribe the given audio through to a raw vendor transcript.
    ///
    /// This call blocks (asynchronously) for the full duration of the
    /// vendor job, which can be minutes for long recordings. Failures are
    /// never retried here; the caller decides recovery policy per error kind.
    async fn transcribe(&self, request: TranscribeRequest) -> Result<RawTranscript, Error>;

    /// Return unique identifier for this provider (e.g., "speechmatics").
    ///
    /// Used for log attribution and provider selection. Must be lowercase,
    /// alphanumeric with underscores only.
    fn provider_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;

    mock! {
        pub AsrProvider {}

        #[async_trait]
        impl Provider for AsrProvider {
            async fn transcribe(&self, request: TranscribeRequest) -> Result<RawTranscript, Error>;
            fn provider_id(&self) -> &str;
        }
    }

    #[tokio::test]
    async fn pipeline_facing_seam_is_mockable() {
        let mut provider = MockAsrProvider::new();
        provider.expect_transcribe().returning(|_| {
            Ok(RawTranscript {
                text: Some("hello there".to_string()),
                ..Default::default()
            })
        });
        provider.expect_provider_id().return_const("fake".to_owned());

        let request = TranscribeRequest {
            audio: vec![0u8; 4],
            filename: "meeting1.wav".to_string(),
            language: Some("yue".to_string()),
        };

        let transcript = provider.transcribe(request).await.unwrap();
        assert_eq!(transcript.text.as_deref(), Some("hello there"));
        assert_eq!(provider.provider_id(), "fake");
    }
}
