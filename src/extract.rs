use crate::consts::{FAILED_EXTRACTION_SUMMARY, MIN_TRANSCRIPT_CHARS, SHORT_TRANSCRIPT_SUMMARY};
use crate::groq_types::{ChatMessage, ChatPayload, ChatResponse};
use crate::utils::first_json_object;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error};

pub const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Structured contact fields pulled out of a call transcript.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub best_time_to_call: Option<String>,
    pub summary: Option<String>,
}

impl ExtractedFields {
    /// Stub for transcripts too short to be worth a model call.
    pub fn short_transcript(fallback_phone: Option<&str>) -> Self {
        Self {
            phone_number: fallback_phone.map(str::to_string),
            summary: Some(SHORT_TRANSCRIPT_SUMMARY.to_string()),
            ..Default::default()
        }
    }

    /// Stub for model calls that failed or produced unusable output.
    pub fn failed(fallback_phone: Option<&str>) -> Self {
        Self {
            phone_number: fallback_phone.map(str::to_string),
            summary: Some(FAILED_EXTRACTION_SUMMARY.to_string()),
            ..Default::default()
        }
    }
}

#[async_trait]
pub trait Extractor: Send + Sync {
    /// Derive contact fields from a transcript. Never fails: unusable input
    /// short-circuits to a stub and unusable model output maps to one.
    async fn extract(&self, transcript: &str, fallback_phone: Option<&str>) -> ExtractedFields;
}

/// Extraction engine backed by Groq's OpenAI-compatible chat completions.
pub struct GroqExtractor {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GroqExtractor {
    pub fn new(http_client: reqwest::Client, api_key: String, model: String) -> Self {
        Self {
            http_client,
            api_key,
            model,
        }
    }

    fn payload(&self, transcript: &str) -> ChatPayload {
        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: "Extract call details and return ONLY valid JSON. Use null for missing fields."
                    .to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: format!(
                    "Extract the following from this call transcript:\n\n\
                     JSON FORMAT:\n\
                     {{\n  \"name\": null,\n  \"email\": null,\n  \"phone_number\": null,\n  \"best_time_to_call\": null,\n  \"summary\": \"\"\n}}\n\n\
                     TRANSCRIPT:\n{transcript}\n"
                ),
            },
        ];
        ChatPayload {
            model: self.model.clone(),
            messages,
            temperature: Some(0.1),
            max_tokens: Some(400),
        }
    }

    async fn complete(&self, payload: &ChatPayload) -> Result<String, reqwest::Error> {
        let resp = self
            .http_client
            .post(GROQ_CHAT_URL)
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(payload)
            .send()
            .await?
            .error_for_status()?;
        let resp = resp.json::<ChatResponse>().await?;
        Ok(resp
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl Extractor for GroqExtractor {
    async fn extract(&self, transcript: &str, fallback_phone: Option<&str>) -> ExtractedFields {
        if transcript.len() < MIN_TRANSCRIPT_CHARS {
            return ExtractedFields::short_transcript(fallback_phone);
        }
        match self.complete(&self.payload(transcript)).await {
            Ok(text) => {
                debug!(text=%text, "got model output");
                parse_extraction(&text, fallback_phone)
            }
            Err(e) => {
                error!(error=%e, "extraction request failed");
                ExtractedFields::failed(fallback_phone)
            }
        }
    }
}

/// Pull the first JSON object out of model output. Non-JSON output and parse
/// failures map to the failure stub; a parse error never escapes.
pub fn parse_extraction(text: &str, fallback_phone: Option<&str>) -> ExtractedFields {
    let Some(object) = first_json_object(text) else {
        error!("no JSON object in model output");
        return ExtractedFields::failed(fallback_phone);
    };
    let data: Value = match serde_json::from_str(object) {
        Ok(v) => v,
        Err(e) => {
            error!(error=%e, "failed to parse model output");
            return ExtractedFields::failed(fallback_phone);
        }
    };
    ExtractedFields {
        name: string_field(&data, "name"),
        email: string_field(&data, "email"),
        phone_number: string_field(&data, "phone_number")
            .or_else(|| fallback_phone.map(str::to_string)),
        best_time_to_call: string_field(&data, "best_time_to_call"),
        summary: string_field(&data, "summary"),
    }
}

fn string_field(data: &Value, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_clean_object() {
        let text = r#"{"name": "Asha", "email": "asha@example.com", "phone_number": "9876543210", "best_time_to_call": "4 PM", "summary": "wants a callback"}"#;
        let fields = parse_extraction(text, None);
        assert_eq!(fields.name.as_deref(), Some("Asha"));
        assert_eq!(fields.email.as_deref(), Some("asha@example.com"));
        assert_eq!(fields.phone_number.as_deref(), Some("9876543210"));
        assert_eq!(fields.best_time_to_call.as_deref(), Some("4 PM"));
        assert_eq!(fields.summary.as_deref(), Some("wants a callback"));
    }

    #[test]
    fn parses_an_object_wrapped_in_prose() {
        let text = "Sure! Here is the extraction:\n{\"name\": \"Ravi\", \"summary\": \"pricing\"}\nLet me know if you need more.";
        let fields = parse_extraction(text, Some("9876543210"));
        assert_eq!(fields.name.as_deref(), Some("Ravi"));
        assert_eq!(fields.summary.as_deref(), Some("pricing"));
        // absent phone falls back to the caller's number
        assert_eq!(fields.phone_number.as_deref(), Some("9876543210"));
        assert_eq!(fields.email, None);
    }

    #[test]
    fn non_json_output_yields_the_failure_stub() {
        let fields = parse_extraction("I could not find any details.", Some("9876543210"));
        assert_eq!(fields, ExtractedFields::failed(Some("9876543210")));
        assert_eq!(fields.summary.as_deref(), Some(FAILED_EXTRACTION_SUMMARY));
    }

    #[test]
    fn malformed_json_yields_the_failure_stub() {
        let fields = parse_extraction("{\"name\": \"Asha\", }", None);
        assert_eq!(fields.summary.as_deref(), Some(FAILED_EXTRACTION_SUMMARY));
        assert_eq!(fields.name, None);
    }

    #[test]
    fn extracted_phone_wins_over_fallback() {
        let fields = parse_extraction(r#"{"phone_number": "9999999999"}"#, Some("9876543210"));
        assert_eq!(fields.phone_number.as_deref(), Some("9999999999"));
    }

    #[tokio::test]
    async fn short_transcript_short_circuits_without_a_model_call() {
        let extractor = GroqExtractor::new(
            reqwest::Client::new(),
            "test-key".to_string(),
            "test-model".to_string(),
        );
        let fields = extractor.extract("", Some("9876543210")).await;
        assert_eq!(fields.summary.as_deref(), Some(SHORT_TRANSCRIPT_SUMMARY));
        assert_eq!(fields.phone_number.as_deref(), Some("9876543210"));
        assert_eq!(fields.name, None);

        let fields = extractor.extract("hello?", None).await;
        assert_eq!(fields.summary.as_deref(), Some(SHORT_TRANSCRIPT_SUMMARY));
        assert_eq!(fields.phone_number, None);
    }
}
