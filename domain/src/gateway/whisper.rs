//! OpenAI Whisper API client for transcription.
//!
//! The synchronous vendor: one blocking multipart call returns the full
//! verbose transcript, no job handles to poll. Whisper segments the audio
//! itself, so normalization takes the pass-through path (no diarization).

use crate::gateway::content_type_for;
use async_trait::async_trait;
use log::*;
use meeting_ai::traits::transcription::Provider;
use meeting_ai::types::transcript::{RawSegment, RawTranscript, TranscribeRequest};
use meeting_ai::Error;
use serde_json::Value;

/// OpenAI Whisper API client.
pub struct WhisperClient {
    client: reqwest::Client,
    base_url: String,
}

impl WhisperClient {
    /// Create a new client. Fails fast with a configuration error when no
    /// API key is available.
    pub fn new(api_key: Option<String>, base_url: &str) -> Result<Self, Error> {
        let api_key = api_key.filter(|key| !key.is_empty()).ok_or_else(|| {
            Error::Configuration(
                "OPENAI_API_KEY is not configured. Set it in environment variables.".to_string(),
            )
        })?;

        let mut headers = reqwest::header::HeaderMap::new();
        let mut header_value =
            reqwest::header::HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                warn!("Failed to create auth header: {e:?}");
                Error::Configuration("Invalid API key format".to_string())
            })?;
        header_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, header_value);

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Other(Box::new(e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Reduce a verbose_json Whisper response to raw-transcript form with
    /// ready-made segments.
    pub fn to_raw_transcript(response: Value) -> RawTranscript {
        let segments = response
            .get("segments")
            .and_then(Value::as_array)
            .map(|segments| {
                segments
                    .iter()
                    .enumerate()
                    .map(|(index, segment)| RawSegment {
                        id: Some(format!(
                            "seg_{}",
                            segment
                                .get("id")
                                .and_then(Value::as_i64)
                                .unwrap_or(index as i64)
                        )),
                        text: segment
                            .get("text")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        start_time: segment.get("start").and_then(Value::as_f64).unwrap_or(0.0),
                        end_time: segment.get("end").and_then(Value::as_f64).unwrap_or(0.0),
                    })
                    .collect()
            })
            .unwrap_or_default();

        RawTranscript {
            text: response
                .get("text")
                .and_then(Value::as_str)
                .map(String::from),
            words: Vec::new(),
            segments,
            duration: response.get("duration").and_then(Value::as_f64),
            raw: response,
        }
    }
}

#[async_trait]
impl Provider for WhisperClient {
    async fn transcribe(&self, request: TranscribeRequest) -> Result<RawTranscript, Error> {
        debug!(
            "Transcribing {} ({} bytes) with Whisper (language: {})",
            request.filename,
            request.audio.len(),
            request.language.as_deref().unwrap_or("auto-detect")
        );

        let part = reqwest::multipart::Part::bytes(request.audio.clone())
            .file_name(request.filename.clone())
            .mime_str(content_type_for(&request.filename))
            .map_err(|e| Error::Serialization(format!("Invalid audio part: {e}")))?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", "whisper-1")
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "segment");
        if let Some(language) = &request.language {
            form = form.text("language", language.clone());
        }

        let url = format!("{}/v1/audio/transcriptions", self.base_url);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!("Whisper request failed: {e:?}");
                Error::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|value| {
                    value
                        .get("error")
                        .and_then(|error| error.get("message"))
                        .and_then(Value::as_str)
                        .map(String::from)
                })
                .unwrap_or(body);
            error!("Whisper API error: {} - {detail}", status.as_u16());
            return Err(Error::Provider(format!(
                "Whisper API error: {} - {detail}",
                status.as_u16()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Deserialization(format!("Invalid response from Whisper: {e}")))?;

        info!(
            "Whisper transcription completed ({} chars)",
            body.get("text").and_then(Value::as_str).unwrap_or("").len()
        );

        Ok(Self::to_raw_transcript(body))
    }

    fn provider_id(&self) -> &str {
        "whisper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn construction_fails_fast_without_an_api_key() {
        assert!(matches!(
            WhisperClient::new(None, "http://localhost"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn verbose_json_reduces_to_ready_made_segments() {
        let raw = WhisperClient::to_raw_transcript(json!({
            "text": "full transcript text",
            "language": "yue",
            "duration": 62.25,
            "segments": [
                {"id": 0, "start": 0.0, "end": 4.8, "text": " first sentence "},
                {"id": 1, "start": 4.8, "end": 9.1, "text": "second sentence"}
            ]
        }));

        assert_eq!(raw.text.as_deref(), Some("full transcript text"));
        assert!(raw.words.is_empty());
        assert_eq!(raw.segments.len(), 2);
        assert_eq!(raw.segments[0].id.as_deref(), Some("seg_0"));
        assert_eq!(raw.segments[1].end_time, 9.1);
        assert_eq!(raw.duration, Some(62.25));
    }

    #[tokio::test]
    async fn transcribe_round_trips_through_the_api() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/audio/transcriptions")
            .with_status(200)
            .with_body(
                json!({
                    "text": "hello from whisper",
                    "duration": 3.5,
                    "segments": [{"id": 0, "start": 0.0, "end": 3.5, "text": "hello from whisper"}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = WhisperClient::new(Some("key".to_string()), &server.url()).unwrap();
        let raw = client
            .transcribe(TranscribeRequest {
                audio: vec![0u8; 16],
                filename: "call.m4a".to_string(),
                language: None,
            })
            .await
            .unwrap();

        assert_eq!(raw.text.as_deref(), Some("hello from whisper"));
        assert_eq!(raw.segments.len(), 1);
    }

    #[tokio::test]
    async fn vendor_error_detail_is_extracted_from_the_error_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/audio/transcriptions")
            .with_status(400)
            .with_body(r#"{"error": {"message": "audio file is too short"}}"#)
            .create_async()
            .await;

        let client = WhisperClient::new(Some("key".to_string()), &server.url()).unwrap();
        match client
            .transcribe(TranscribeRequest {
                audio: vec![0u8; 2],
                filename: "x.wav".to_string(),
                language: Some("en".to_string()),
            })
            .await
        {
            Err(Error::Provider(msg)) => {
                assert!(msg.contains("400"));
                assert!(msg.contains("audio file is too short"));
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }
}
