// Each integration test binary pulls in the subset of doubles it needs.
#![allow(dead_code)]

use callbridge::bolna::{CallSource, FetchOptions};
use callbridge::bolna_types::RawCall;
use callbridge::error::SendError;
use callbridge::extract::{ExtractedFields, Extractor};
use callbridge::msg91::{Messenger, SendReceipt};

use async_trait::async_trait;
use std::sync::Mutex;

/// Source that replays a fixed batch of raw calls.
pub struct StaticSource {
    pub calls: Vec<RawCall>,
}

impl StaticSource {
    pub fn new(calls: Vec<serde_json::Value>) -> Self {
        let calls = calls
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect();
        Self { calls }
    }
}

#[async_trait]
impl CallSource for StaticSource {
    async fn fetch(&self, _options: &FetchOptions) -> Vec<RawCall> {
        self.calls.clone()
    }
}

/// Extractor that mirrors the real engine's short-circuit behavior but never
/// touches the network, and counts how often the model path was taken.
pub struct StubExtractor {
    pub model_calls: Mutex<usize>,
}

impl StubExtractor {
    pub fn new() -> Self {
        Self {
            model_calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl Extractor for StubExtractor {
    async fn extract(&self, transcript: &str, fallback_phone: Option<&str>) -> ExtractedFields {
        if transcript.len() < callbridge::consts::MIN_TRANSCRIPT_CHARS {
            return ExtractedFields::short_transcript(fallback_phone);
        }
        *self.model_calls.lock().unwrap() += 1;
        ExtractedFields {
            name: Some("Asha".to_string()),
            phone_number: fallback_phone.map(str::to_string),
            summary: Some("asked for a callback".to_string()),
            ..Default::default()
        }
    }
}

/// Messenger that records recipients instead of hitting the provider.
pub struct RecordingMessenger {
    pub sent_to: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self {
            sent_to: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            sent_to: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn recipients(&self) -> Vec<String> {
        self.sent_to.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_template(&self, to: &str, _name: &str) -> Result<SendReceipt, SendError> {
        self.sent_to.lock().unwrap().push(to.to_string());
        if self.fail {
            Err(SendError::Rejected(
                serde_json::json!({ "code": "throttled" }),
            ))
        } else {
            Ok(SendReceipt {
                message_id: Some(format!("msg-{to}")),
            })
        }
    }
}
