//! OpenAI chat-completions client for structured meeting summarization.
//!
//! One request/response pair: transcript text in, `SummaryOutput` JSON out.
//! The prompt content is configuration, not pipeline logic; the pipeline
//! only depends on the output schema.

use async_trait::async_trait;
use log::*;
use meeting_ai::traits::summarization::Summarizer;
use meeting_ai::types::summary::{SummaryOutput, SummaryRequest};
use meeting_ai::Error;
use serde_json::{json, Value};

/// Transcripts are truncated to this many characters before submission to
/// respect upstream context limits.
pub const MAX_TRANSCRIPT_CHARS: usize = 100_000;

const TRUNCATION_MARKER: &str = "\n\n[... transcript truncated ...]";

/// OpenAI-backed summarizer.
pub struct OpenAiSummarizer {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAiSummarizer {
    /// Create a new summarizer. Fails fast with a configuration error when
    /// no API key is available.
    pub fn new(api_key: Option<String>, base_url: &str, model: &str) -> Result<Self, Error> {
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
            model: model.to_string(),
        })
    }
}

/// System prompt encoding the output schema and formatting rules, with
/// template-specific addenda.
fn build_system_prompt(template: Option<&str>) -> String {
    let base_prompt = r#"You are an expert meeting notes assistant for Hong Kong business meetings. You analyze transcripts that mix Cantonese (粤语) and English, as is common in Hong Kong business environments.

Generate a structured JSON object with exactly these fields:
{
  "overview": "A concise executive summary (2-3 paragraphs) of what the meeting was about, key topics discussed, and main outcomes. Use the same language mix as the transcript.",
  "detailed_minutes": "Compact professional meeting minutes (会议纪要) in Markdown: topic, date, attendees, objectives, discussion points by topic, action items per party, next steps, conclusions. No horizontal rules and no blank lines between sections. Set to null ONLY if the transcript is clearly not a business meeting.",
  "agenda_items": [{"id": "agenda_1", "title": "...", "description": "..."}],
  "decisions": [{"id": "dec_1", "description": "Who decided what", "relatedSegmentId": "seg_0"}],
  "highlights": [{"id": "highlight_1", "text": "...", "category": "technical" | "business" | "action" | "risk"}],
  "action_items": [{"id": "act_1", "description": "...", "owner": "Name or 'TBD'", "dueDate": "YYYY-MM-DD" or null, "priority": "high" | "medium" | "low", "relatedSegmentId": "seg_0"}]
}

Guidelines:
1. Be precise and factual; include only information from the transcript.
2. Preserve the transcript's Cantonese-English language mix in your output.
3. Refine verbose spoken content into concise written form; drop filler.
4. Extract owners and due dates for action items only when the transcript states them; otherwise use "TBD" and null.
5. Match decisions and action items to transcript segments via seg_<n> ids where possible.
Return ONLY valid JSON, no markdown fences or explanation."#;

    match template {
        Some("Product Review") => format!(
            "{base_prompt}\n\nADDITIONAL GUIDELINES FOR PRODUCT REVIEW TEMPLATE:\n\
             - Focus on product features, user feedback, and technical decisions\n\
             - Highlight technical risks and dependencies\n\
             - Emphasize product roadmap and timeline decisions"
        ),
        Some("Sales") => format!(
            "{base_prompt}\n\nADDITIONAL GUIDELINES FOR SALES TEMPLATE:\n\
             - Focus on customer needs, objections, and next steps\n\
             - Highlight deal status and pipeline updates\n\
             - Emphasize follow-up actions and commitments"
        ),
        _ => base_prompt.to_string(),
    }
}

/// User prompt embedding the (possibly truncated) transcript.
fn build_user_prompt(transcript_text: &str, meeting_title: Option<&str>, language: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(title) = meeting_title {
        parts.push(format!("Meeting Title: {title}"));
    }
    parts.push(format!("Language: {language}"));
    parts.push("Generate the structured JSON summary for the transcript below.".to_string());

    let transcript = if transcript_text.chars().count() > MAX_TRANSCRIPT_CHARS {
        warn!(
            "Transcript is very long ({} chars). Truncating to {MAX_TRANSCRIPT_CHARS} chars.",
            transcript_text.chars().count()
        );
        let truncated: String = transcript_text.chars().take(MAX_TRANSCRIPT_CHARS).collect();
        format!("{truncated}{TRUNCATION_MARKER}")
    } else {
        transcript_text.to_string()
    };

    parts.push("\n--- TRANSCRIPT ---".to_string());
    parts.push(transcript);
    parts.push("--- END TRANSCRIPT ---".to_string());

    parts.join("\n")
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn generate_summary(&self, request: SummaryRequest) -> Result<SummaryOutput, Error> {
        debug!(
            "Generating summary for '{}' ({} chars, template: {})",
            request.meeting_title.as_deref().unwrap_or("Untitled"),
            request.transcript_text.len(),
            request.template.as_deref().unwrap_or("default")
        );

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": build_system_prompt(request.template.as_deref())},
                {"role": "user", "content": build_user_prompt(
                    &request.transcript_text,
                    request.meeting_title.as_deref(),
                    &request.language,
                )},
            ],
            "temperature": 0.7,
            "response_format": {"type": "json_object"},
        });

        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("Summarization request failed: {e:?}");
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
            error!("Summarization API error: {} - {detail}", status.as_u16());
            return Err(Error::Provider(format!(
                "Summarization API error: {} - {detail}",
                status.as_u16()
            )));
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| Error::Deserialization(format!("Invalid response envelope: {e}")))?;

        let content = envelope
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| Error::Provider("Empty response from LLM".to_string()))?;

        let output: SummaryOutput = serde_json::from_str(content).map_err(|e| {
            let snippet: String = content.chars().take(500).collect();
            warn!("Failed to parse LLM JSON response: {e}; content: {snippet}");
            Error::Deserialization(format!("Invalid JSON response from LLM: {e}"))
        })?;

        info!(
            "Summary generated (overview: {} chars, decisions: {}, action items: {})",
            output.overview.len(),
            output.decisions.len(),
            output.action_items.len()
        );

        Ok(output)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
