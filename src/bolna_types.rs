use serde::Deserialize;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// The executions endpoint has been seen returning both a bare array and an
/// object keyed by `executions`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ExecutionsResponse {
    List(Vec<RawCall>),
    Wrapped { executions: Vec<RawCall> },
}

impl ExecutionsResponse {
    pub fn into_calls(self) -> Vec<RawCall> {
        match self {
            ExecutionsResponse::List(calls) => calls,
            ExecutionsResponse::Wrapped { executions } => executions,
        }
    }
}

/// One execution as the provider returns it. The shape is not guaranteed, so
/// every field is optional and the accessors tolerate absence.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawCall {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub user_number: Option<Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub conversation_duration: Option<f64>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub transcripts: Option<Vec<TranscriptEntry>>,
    #[serde(default)]
    pub output: Option<RawCallOutput>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TranscriptEntry {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawCallOutput {
    #[serde(default)]
    pub transcript: Option<String>,
}

impl RawCall {
    pub fn external_id(&self) -> Option<String> {
        self.id.as_ref().and_then(value_to_string)
    }

    /// Caller number as a string; the provider sometimes sends it as a bare
    /// number.
    pub fn user_number(&self) -> Option<String> {
        self.user_number.as_ref().and_then(value_to_string)
    }

    pub fn call_timestamp(&self) -> Option<OffsetDateTime> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }

    pub fn duration_secs(&self) -> i32 {
        self.conversation_duration.map(|d| d as i32).unwrap_or(0)
    }

    /// Transcript from the top-level field, the first transcript entry, or the
    /// nested output, in that order.
    pub fn transcript_text(&self) -> String {
        if let Some(t) = self.transcript.as_deref().filter(|t| !t.is_empty()) {
            return t.to_string();
        }
        if let Some(first) = self.transcripts.as_deref().and_then(<[_]>::first) {
            let entry = first.text.as_deref().or(first.transcript.as_deref());
            if let Some(t) = entry.filter(|t| !t.is_empty()) {
                return t.to_string();
            }
        }
        if let Some(output) = &self.output {
            if let Some(t) = output.transcript.as_deref().filter(|t| !t.is_empty()) {
                return t.to_string();
            }
        }
        String::new()
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(dt);
    }
    // Some executions carry naive timestamps; treat those as UTC.
    let with_micros = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
    let plain = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let spaced = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    for format in [with_micros, plain, spaced] {
        if let Ok(dt) = PrimitiveDateTime::parse(raw, format) {
            return Some(dt.assume_utc());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwraps_bare_array_and_wrapped_object() {
        let bare: ExecutionsResponse =
            serde_json::from_value(json!([{ "id": "a" }, { "id": "b" }])).unwrap();
        assert_eq!(bare.into_calls().len(), 2);

        let wrapped: ExecutionsResponse =
            serde_json::from_value(json!({ "executions": [{ "id": "c" }] })).unwrap();
        assert_eq!(wrapped.into_calls().len(), 1);
    }

    #[test]
    fn numeric_fields_stringify() {
        let call: RawCall =
            serde_json::from_value(json!({ "id": 42, "user_number": 919876543210u64 })).unwrap();
        assert_eq!(call.external_id().as_deref(), Some("42"));
        assert_eq!(call.user_number().as_deref(), Some("919876543210"));
    }

    #[test]
    fn transcript_falls_back_through_nested_shapes() {
        let top: RawCall = serde_json::from_value(json!({ "transcript": "top level" })).unwrap();
        assert_eq!(top.transcript_text(), "top level");

        let entries: RawCall = serde_json::from_value(json!({
            "transcripts": [{ "text": "from entry" }, { "text": "ignored" }]
        }))
        .unwrap();
        assert_eq!(entries.transcript_text(), "from entry");

        let nested: RawCall =
            serde_json::from_value(json!({ "output": { "transcript": "from output" } })).unwrap();
        assert_eq!(nested.transcript_text(), "from output");

        let empty: RawCall = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.transcript_text(), "");
    }

    #[test]
    fn parses_offset_and_naive_timestamps() {
        assert!(parse_timestamp("2024-05-01T10:30:00+00:00").is_some());
        assert!(parse_timestamp("2024-05-01T10:30:00Z").is_some());
        assert!(parse_timestamp("2024-05-01T10:30:00.123456").is_some());
        assert!(parse_timestamp("2024-05-01 10:30:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn missing_duration_defaults_to_zero() {
        let call: RawCall = serde_json::from_value(json!({})).unwrap();
        assert_eq!(call.duration_secs(), 0);

        let call: RawCall =
            serde_json::from_value(json!({ "conversation_duration": 42.7 })).unwrap();
        assert_eq!(call.duration_secs(), 42);
    }
}
