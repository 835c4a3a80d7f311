use crate::consts::{DISPLAY_PLACEHOLDER, INTER_RECORD_DELAY_MILLIS, INTER_SEND_DELAY_MILLIS};
use crate::db_types::CallRecord;
use crate::dispatch::run_notification_dispatch;
use crate::pipeline::run_ingestion;
use crate::types::AppState;
use crate::utils::format_callback_time;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use tracing::error;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn sync(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let summary = run_ingestion(
        app_state.source.as_ref(),
        app_state.extractor.as_ref(),
        app_state.store.as_ref(),
        Duration::from_millis(INTER_RECORD_DELAY_MILLIS),
    )
    .await;
    Json(summary)
}

pub async fn notify(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let summary = run_notification_dispatch(
        app_state.store.as_ref(),
        app_state.messenger.as_ref(),
        Duration::from_millis(INTER_SEND_DELAY_MILLIS),
    )
    .await;
    Json(summary)
}

/// Row shape the dashboard table consumes: every string field present, absent
/// values shown as "N/A", callback time rendered human-readable.
#[derive(Serialize)]
pub struct CallDisplay {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub best_time_to_call: String,
    pub summary: String,
    pub transcript: String,
    pub call_duration: i32,
    pub call_timestamp: String,
    pub notification_status: String,
    pub created_at: String,
}

impl From<CallRecord> for CallDisplay {
    fn from(record: CallRecord) -> Self {
        Self {
            id: record.id.to_string(),
            name: or_placeholder(record.name),
            email: or_placeholder(record.email),
            phone_number: or_placeholder(record.phone_number),
            best_time_to_call: record
                .best_time_to_call
                .as_deref()
                .map(format_callback_time)
                .unwrap_or_else(|| DISPLAY_PLACEHOLDER.to_string()),
            summary: or_placeholder(record.summary),
            transcript: record.transcript,
            call_duration: record.call_duration,
            call_timestamp: record
                .call_timestamp
                .and_then(|t| t.format(&Rfc3339).ok())
                .unwrap_or_else(|| DISPLAY_PLACEHOLDER.to_string()),
            notification_status: record.notification_status.as_str().to_string(),
            created_at: record.created_at.format(&Rfc3339).unwrap_or_default(),
        }
    }
}

fn or_placeholder(value: Option<String>) -> String {
    value
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DISPLAY_PLACEHOLDER.to_string())
}

pub async fn list_calls(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    match app_state.store.list_calls().await {
        Ok(calls) => {
            let rows: Vec<CallDisplay> = calls.into_iter().map(CallDisplay::from).collect();
            (
                StatusCode::OK,
                Json(json!({ "count": rows.len(), "data": rows })),
            )
        }
        Err(e) => {
            error!(error=%e, "failed to list calls");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "failed to list calls" })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db_types::NotificationStatus;
    use time::macros::datetime;
    use uuid::Uuid;

    #[test]
    fn display_defaults_absent_fields_to_placeholder() {
        let record = CallRecord {
            id: Uuid::new_v4(),
            external_id: None,
            name: None,
            email: None,
            phone_number: Some("9876543210".to_string()),
            best_time_to_call: Some("2024-05-01T15:30:00Z".to_string()),
            summary: None,
            transcript: String::new(),
            call_duration: 0,
            call_timestamp: None,
            source: "bolna-ai".to_string(),
            notification_status: NotificationStatus::Pending,
            notification_message_id: None,
            notification_sent_at: None,
            notification_error: None,
            created_at: datetime!(2024-05-01 10:30:00 UTC),
        };
        let display = CallDisplay::from(record);
        assert_eq!(display.name, "N/A");
        assert_eq!(display.email, "N/A");
        assert_eq!(display.phone_number, "9876543210");
        assert_eq!(display.best_time_to_call, "3:30 PM");
        assert_eq!(display.summary, "N/A");
        assert_eq!(display.call_timestamp, "N/A");
        assert_eq!(display.notification_status, "pending");
    }
}
