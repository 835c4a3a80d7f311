use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Delivery state for the follow-up message. A record only moves forward:
/// `pending -> sent | failed`. `not_sent` marks records excluded by hand and
/// is never entered by the pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    NotSent,
    #[default]
    Pending,
    Sent,
    Failed,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::NotSent => "not_sent",
            NotificationStatus::Pending => "pending",
            NotificationStatus::Sent => "sent",
            NotificationStatus::Failed => "failed",
        }
    }

    /// Unknown values fall back to the schema default.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "not_sent" => NotificationStatus::NotSent,
            "sent" => NotificationStatus::Sent,
            "failed" => NotificationStatus::Failed,
            _ => NotificationStatus::Pending,
        }
    }
}

/// A persisted call record.
#[derive(Clone, Debug, Serialize)]
pub struct CallRecord {
    pub id: Uuid,
    pub external_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub best_time_to_call: Option<String>,
    pub summary: Option<String>,
    pub transcript: String,
    pub call_duration: i32,
    #[serde(with = "time::serde::rfc3339::option")]
    pub call_timestamp: Option<OffsetDateTime>,
    pub source: String,
    pub notification_status: NotificationStatus,
    pub notification_message_id: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub notification_sent_at: Option<OffsetDateTime>,
    pub notification_error: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Field set for a record at first sight. Ids, creation times, the source tag,
/// and the initial delivery status are assigned by the store.
#[derive(Clone, Debug, Default)]
pub struct NewCall {
    pub external_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub best_time_to_call: Option<String>,
    pub summary: Option<String>,
    pub transcript: String,
    pub call_duration: i32,
    pub call_timestamp: Option<OffsetDateTime>,
}
