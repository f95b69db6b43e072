//! Speechmatics Batch API client for transcription.
//!
//! The batch vendor: job creation returns immediately with a job id, the
//! caller polls status until a terminal state and then fetches the result
//! separately. All failure classes surface as distinguishable
//! `meeting_ai::Error` variants so the pipeline can decide recovery policy.

use crate::gateway::content_type_for;
use async_trait::async_trait;
use log::*;
use meeting_ai::traits::transcription::Provider;
use meeting_ai::types::transcript::{RawTranscript, RawWord, TranscribeRequest};
use meeting_ai::Error;
use serde_json::{json, Value};
use std::time::Duration;

/// Seconds between status polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Wall-clock budget for one job; polling past this raises a timeout.
const DEFAULT_POLL_BUDGET: Duration = Duration::from_secs(3600);

/// Vendor statuses that mean "keep waiting".
const IN_FLIGHT_STATUSES: &[&str] = &["running", "queued", "processing", "transcribing", "started"];

/// Vendor statuses that mean the job is dead.
const FAILED_STATUSES: &[&str] = &["failed", "rejected", "error"];

/// Response from creating a transcription job.
#[derive(Debug, Clone)]
pub struct CreatedJob {
    pub job_id: String,
    pub status: String,
}

/// Speechmatics Batch API client.
pub struct SpeechmaticsClient {
    client: reqwest::Client,
    base_url: String,
    poll_interval: Duration,
    poll_budget: Duration,
}

impl SpeechmaticsClient {
    /// Create a new client. Fails fast with a configuration error when no
    /// API key is available.
    pub fn new(api_key: Option<String>, base_url: &str) -> Result<Self, Error> {
        let api_key = api_key.filter(|key| !key.is_empty()).ok_or_else(|| {
            Error::Configuration(
                "SPEECHMATICS_API_KEY is not configured. Set it in environment variables."
                    .to_string(),
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
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_budget: DEFAULT_POLL_BUDGET,
        })
    }

    /// Overrides the poll cadence; tests shrink both to milliseconds.
    pub fn with_poll_params(mut self, interval: Duration, budget: Duration) -> Self {
        self.poll_interval = interval;
        self.poll_budget = budget;
        self
    }

    /// Create a transcription job by uploading the audio with its config as
    /// multipart form data.
    pub async fn create_transcription_job(
        &self,
        request: &TranscribeRequest,
    ) -> Result<CreatedJob, Error> {
        let language = request.language.as_deref().unwrap_or("yue");

        let mut transcription_config = json!({ "language": language });
        if language == "yue" {
            // Mixed Cantonese-English audio benefits from the general domain
            transcription_config["domain"] = json!("general");
        }
        let job_config = json!({
            "type": "transcription",
            "transcription_config": transcription_config,
        });

        debug!(
            "Creating Speechmatics job for {} ({} bytes, language: {language})",
            request.filename,
            request.audio.len()
        );

        let part = reqwest::multipart::Part::bytes(request.audio.clone())
            .file_name(request.filename.clone())
            .mime_str(content_type_for(&request.filename))
            .map_err(|e| Error::Serialization(format!("Invalid audio part: {e}")))?;
        let form = reqwest::multipart::Form::new()
            .text("config", job_config.to_string())
            .part("data_file", part);

        let url = format!("{}/v2/jobs", self.base_url);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to create Speechmatics job: {e:?}");
                Error::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(vendor_error("Speechmatics API error", status, response).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Deserialization(format!("Invalid response from Speechmatics: {e}")))?;

        let job_id = body
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Provider("No job ID returned from Speechmatics API".to_string()))?
            .to_string();

        info!("Created Speechmatics job: {job_id}");
        Ok(CreatedJob {
            job_id,
            status: body
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or("running")
                .to_string(),
        })
    }

    /// Get the status payload of a transcription job.
    pub async fn get_job_status(&self, job_id: &str) -> Result<Value, Error> {
        let url = format!("{}/v2/jobs/{job_id}", self.base_url);
        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("Failed to get Speechmatics job status: {e:?}");
            Error::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(vendor_error("Failed to get job status", status, response).await);
        }

        response
            .json()
            .await
            .map_err(|e| Error::Deserialization(format!("Invalid response from Speechmatics: {e}")))
    }

    /// Fetch the transcript result for a completed job.
    pub async fn get_transcript(&self, job_id: &str) -> Result<Value, Error> {
        let url = format!("{}/v2/jobs/{job_id}/transcript", self.base_url);
        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("Failed to get Speechmatics transcript: {e:?}");
            Error::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(vendor_error("Failed to get transcript", status, response).await);
        }

        response
            .json()
            .await
            .map_err(|e| Error::Deserialization(format!("Invalid response from Speechmatics: {e}")))
    }

    /// Poll job status until a terminal state, then fetch the result.
    ///
    /// Terminal failure statuses raise immediately with the vendor-reported
    /// error text. An unrecognized status is a hard error carrying the full
    /// raw payload; vendor contract drift must surface, not be retried past.
    /// Exceeding the wall-clock budget raises a timeout and never returns a
    /// partial result.
    pub async fn poll_until_complete(&self, job_id: &str) -> Result<Value, Error> {
        let started = tokio::time::Instant::now();
        let mut poll_count: u64 = 0;

        loop {
            let status_response = self.get_job_status(job_id).await?;
            poll_count += 1;

            // The API nests the interesting object: {"job": {"status": ...}}
            let job_data = status_response.get("job").unwrap_or(&status_response);

            let job_status = job_data
                .get("status")
                .or_else(|| status_response.get("status"))
                .or_else(|| status_response.get("job_status"))
                .or_else(|| status_response.get("state"))
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_lowercase();

            if job_status == "done" {
                debug!("Job {job_id} done after {poll_count} polls");
                return self.get_transcript(job_id).await;
            }

            if FAILED_STATUSES.contains(&job_status.as_str()) {
                let error_msg = first_error_field(job_data, &status_response)
                    .unwrap_or_else(|| "Unknown error".to_string());
                return Err(Error::Provider(format!("Job {job_id} failed: {error_msg}")));
            }

            if IN_FLIGHT_STATUSES.contains(&job_status.as_str()) {
                if started.elapsed() > self.poll_budget {
                    return Err(Error::Timeout(format!(
                        "Job {job_id} timed out after {} seconds",
                        self.poll_budget.as_secs()
                    )));
                }
                if poll_count % 6 == 0 {
                    debug!(
                        "Job {job_id} still processing (status: {job_status}, elapsed: {}s)",
                        started.elapsed().as_secs()
                    );
                }
                tokio::time::sleep(self.poll_interval).await;
                continue;
            }

            return Err(Error::Provider(format!(
                "Unknown job status: {job_status}. Full response: {status_response}"
            )));
        }
    }

    /// Reduce a json_v2 transcript payload to the raw material the
    /// normalizer consumes: the word stream with timings and speakers, the
    /// joined text, and the untouched payload for audit.
    pub fn to_raw_transcript(response: Value) -> RawTranscript {
        let mut content_parts: Vec<String> = Vec::new();
        let mut words: Vec<RawWord> = Vec::new();

        for result in response
            .get("results")
            .and_then(Value::as_array)
            .unwrap_or(&Vec::new())
        {
            for alternative in result
                .get("alternatives")
                .and_then(Value::as_array)
                .unwrap_or(&Vec::new())
            {
                if let Some(text) = alternative.get("content").and_then(Value::as_str) {
                    let text = text.trim();
                    if !text.is_empty() {
                        content_parts.push(text.to_string());
                    }
                }

                for word in alternative
                    .get("words")
                    .and_then(Value::as_array)
                    .unwrap_or(&Vec::new())
                {
                    words.push(RawWord {
                        text: word
                            .get("word")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        start_time: word
                            .get("start_time")
                            .and_then(Value::as_f64)
                            .unwrap_or(0.0),
                        end_time: word.get("end_time").and_then(Value::as_f64).unwrap_or(0.0),
                        confidence: word
                            .get("confidence")
                            .and_then(Value::as_f64)
                            .unwrap_or(0.0),
                        speaker: word
                            .get("speaker")
                            .and_then(Value::as_str)
                            .map(String::from),
                        speaker_id: word
                            .get("speaker_id")
                            .and_then(Value::as_str)
                            .map(String::from),
                    });
                }
            }
        }

        let text = if content_parts.is_empty() {
            response
                .get("text")
                .and_then(Value::as_str)
                .map(String::from)
        } else {
            Some(content_parts.join(" "))
        };

        let duration = response
            .get("metadata")
            .and_then(|metadata| metadata.get("duration"))
            .and_then(Value::as_f64);

        RawTranscript {
            text,
            words,
            segments: Vec::new(),
            duration,
            raw: response,
        }
    }
}

#[async_trait]
impl Provider for SpeechmaticsClient {
    async fn transcribe(&self, request: TranscribeRequest) -> Result<RawTranscript, Error> {
        let job = self.create_transcription_job(&request).await?;
        let response = self.poll_until_complete(&job.job_id).await?;
        Ok(Self::to_raw_transcript(response))
    }

    fn provider_id(&self) -> &str {
        "speechmatics"
    }
}

/// Extracts the first populated error field, walking the documented fallback
/// order: job.error, error, job.detail, detail, job.message, message.
fn first_error_field(job_data: &Value, top_level: &Value) -> Option<String> {
    ["error", "detail", "message"].iter().find_map(|field| {
        job_data
            .get(*field)
            .or_else(|| top_level.get(*field))
            .and_then(Value::as_str)
            .map(String::from)
    })
}

/// Builds a provider error from a non-2xx response, preferring the JSON
/// "detail" field over raw body text.
async fn vendor_error(
    prefix: &str,
    status: reqwest::StatusCode,
    response: reqwest::Response,
) -> Error {
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .and_then(Value::as_str)
                .map(String::from)
        })
        .unwrap_or(body);
    error!("{prefix}: {} - {detail}", status.as_u16());
    Error::Provider(format!("{prefix}: {} - {detail}", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fast_client(base_url: &str) -> SpeechmaticsClient {
        SpeechmaticsClient::new(Some("test-key".to_string()), base_url)
            .unwrap()
            .with_poll_params(Duration::from_millis(10), Duration::from_millis(500))
    }

    fn json_v2_fixture() -> Value {
        json!({
            "metadata": { "duration": 12.5 },
            "results": [
                {
                    "alternatives": [
                        {
                            "content": "hello world",
                            "words": [
                                {"word": "hello", "start_time": 0.0, "end_time": 0.4, "confidence": 0.98, "speaker": "S1"},
                                {"word": "world", "start_time": 0.5, "end_time": 0.9, "confidence": 0.97, "speaker": "S1"}
                            ]
                        }
                    ]
                }
            ]
        })
    }

    #[test]
    fn construction_fails_fast_without_an_api_key() {
        let missing = SpeechmaticsClient::new(None, "http://localhost");
        assert!(matches!(missing, Err(Error::Configuration(_))));

        let empty = SpeechmaticsClient::new(Some(String::new()), "http://localhost");
        assert!(matches!(empty, Err(Error::Configuration(_))));
    }

    #[test]
    fn raw_transcript_extraction_pulls_words_text_and_duration() {
        let raw = SpeechmaticsClient::to_raw_transcript(json_v2_fixture());

        assert_eq!(raw.text.as_deref(), Some("hello world"));
        assert_eq!(raw.words.len(), 2);
        assert_eq!(raw.words[0].text, "hello");
        assert_eq!(raw.words[1].speaker.as_deref(), Some("S1"));
        assert_eq!(raw.duration, Some(12.5));
        assert!(raw.raw.get("results").is_some());
    }

    #[test]
    fn raw_transcript_extraction_falls_back_to_top_level_text() {
        let raw = SpeechmaticsClient::to_raw_transcript(json!({"text": "fallback only"}));
        assert_eq!(raw.text.as_deref(), Some("fallback only"));
        assert!(raw.words.is_empty());
    }

    #[tokio::test]
    async fn poll_returns_the_transcript_once_the_job_is_done() {
        let mut server = mockito::Server::new_async().await;

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_mock = Arc::clone(&calls);
        let _status = server
            .mock("GET", "/v2/jobs/job123")
            .with_status(200)
            .with_body_from_request(move |_| {
                // Stay queued for the first few polls, then complete.
                if calls_in_mock.fetch_add(1, Ordering::SeqCst) < 3 {
                    br#"{"job": {"status": "queued"}}"#.to_vec()
                } else {
                    br#"{"job": {"status": "done"}}"#.to_vec()
                }
            })
            .create_async()
            .await;
        let _transcript = server
            .mock("GET", "/v2/jobs/job123/transcript")
            .with_status(200)
            .with_body(json_v2_fixture().to_string())
            .create_async()
            .await;

        let client = fast_client(&server.url());
        let result = client.poll_until_complete("job123").await.unwrap();

        assert!(calls.load(Ordering::SeqCst) >= 4);
        assert_eq!(result["metadata"]["duration"], json!(12.5));
    }

    #[tokio::test]
    async fn poll_times_out_rather_than_returning_a_partial_result() {
        let mut server = mockito::Server::new_async().await;
        let _status = server
            .mock("GET", "/v2/jobs/slow")
            .with_status(200)
            .with_body(r#"{"job": {"status": "running"}}"#)
            .create_async()
            .await;

        let client = SpeechmaticsClient::new(Some("k".to_string()), &server.url())
            .unwrap()
            .with_poll_params(Duration::from_millis(10), Duration::from_millis(80));

        let result = client.poll_until_complete("slow").await;
        match result {
            Err(Error::Timeout(msg)) => assert!(msg.contains("slow")),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_jobs_raise_immediately_with_vendor_error_text() {
        let mut server = mockito::Server::new_async().await;
        let _status = server
            .mock("GET", "/v2/jobs/bad")
            .with_status(200)
            .with_body(r#"{"job": {"status": "rejected", "error": "unsupported audio codec"}}"#)
            .create_async()
            .await;

        let client = fast_client(&server.url());
        match client.poll_until_complete("bad").await {
            Err(Error::Provider(msg)) => {
                assert!(msg.contains("unsupported audio codec"));
                assert!(msg.contains("bad"));
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_text_falls_back_through_the_documented_field_order() {
        let mut server = mockito::Server::new_async().await;
        let _status = server
            .mock("GET", "/v2/jobs/bad2")
            .with_status(200)
            .with_body(r#"{"status": "failed", "message": "quota exhausted"}"#)
            .create_async()
            .await;

        let client = fast_client(&server.url());
        match client.poll_until_complete("bad2").await {
            Err(Error::Provider(msg)) => assert!(msg.contains("quota exhausted")),
            other => panic!("expected provider error, got {other:?}"),
        }

        let _status_empty = server
            .mock("GET", "/v2/jobs/bad3")
            .with_status(200)
            .with_body(r#"{"status": "failed"}"#)
            .create_async()
            .await;
        match client.poll_until_complete("bad3").await {
            Err(Error::Provider(msg)) => assert!(msg.contains("Unknown error")),
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unrecognized_statuses_are_a_hard_error_with_the_raw_payload() {
        let mut server = mockito::Server::new_async().await;
        let _status = server
            .mock("GET", "/v2/jobs/weird")
            .with_status(200)
            .with_body(r#"{"job": {"status": "hibernating", "hint": 7}}"#)
            .create_async()
            .await;

        let client = fast_client(&server.url());
        match client.poll_until_complete("weird").await {
            Err(Error::Provider(msg)) => {
                assert!(msg.contains("Unknown job status: hibernating"));
                assert!(msg.contains("hint"));
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn job_creation_extracts_the_job_id() {
        let mut server = mockito::Server::new_async().await;
        let _create = server
            .mock("POST", "/v2/jobs")
            .with_status(201)
            .with_body(r#"{"id": "job789", "status": "running"}"#)
            .create_async()
            .await;

        let client = fast_client(&server.url());
        let request = TranscribeRequest {
            audio: b"RIFFfake".to_vec(),
            filename: "meeting1.wav".to_string(),
            language: Some("yue".to_string()),
        };

        let job = client.create_transcription_job(&request).await.unwrap();
        assert_eq!(job.job_id, "job789");
        assert_eq!(job.status, "running");
    }

    #[tokio::test]
    async fn job_creation_surfaces_vendor_detail_on_http_errors() {
        let mut server = mockito::Server::new_async().await;
        let _create = server
            .mock("POST", "/v2/jobs")
            .with_status(403)
            .with_body(r#"{"detail": "invalid API key"}"#)
            .create_async()
            .await;

        let client = fast_client(&server.url());
        let request = TranscribeRequest {
            audio: vec![1, 2, 3],
            filename: "a.mp3".to_string(),
            language: None,
        };

        match client.create_transcription_job(&request).await {
            Err(Error::Provider(msg)) => {
                assert!(msg.contains("403"));
                assert!(msg.contains("invalid API key"));
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }
}
