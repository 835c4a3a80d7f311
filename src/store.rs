use crate::consts::SOURCE_TAG;
use crate::db_types::{CallRecord, NewCall, NotificationStatus};
use crate::error::StoreError;

use async_trait::async_trait;
use std::sync::Mutex;
use time::OffsetDateTime;
use uuid::Uuid;

/// Persistent collection of call records.
#[async_trait]
pub trait CallStore: Send + Sync {
    /// True if a record matches `external_id`, or matches both `phone` and
    /// `timestamp`. The two identity strategies are independent; either one
    /// can catch a duplicate. Absent components never match on their own.
    async fn exists(
        &self,
        external_id: Option<&str>,
        phone: Option<&str>,
        timestamp: Option<OffsetDateTime>,
    ) -> Result<bool, StoreError>;

    /// Insert a record at first sight. Uniqueness is enforced here as well as
    /// in `exists`, so two overlapping runs racing past the pre-check still
    /// produce one record; the loser gets `StoreError::Duplicate`.
    async fn insert(&self, call: NewCall) -> Result<CallRecord, StoreError>;

    /// Records with a phone number on file that still await dispatch.
    async fn find_pending_notification(&self) -> Result<Vec<CallRecord>, StoreError>;

    /// Update only the delivery-state fields of one record.
    async fn update_notification_status(
        &self,
        id: Uuid,
        status: NotificationStatus,
        message_id: Option<String>,
        sent_at: Option<OffsetDateTime>,
        error: Option<String>,
    ) -> Result<(), StoreError>;

    /// All records, newest first.
    async fn list_calls(&self) -> Result<Vec<CallRecord>, StoreError>;

    /// Administrative escape hatch; returns the number of records removed.
    async fn clear_all(&self) -> Result<u64, StoreError>;
}

pub(crate) fn matches_identity(
    record: &CallRecord,
    external_id: Option<&str>,
    phone: Option<&str>,
    timestamp: Option<OffsetDateTime>,
) -> bool {
    if let (Some(ext), Some(rec_ext)) = (external_id, record.external_id.as_deref()) {
        if ext == rec_ext {
            return true;
        }
    }
    if let (Some(phone), Some(ts)) = (phone, timestamp) {
        if record.phone_number.as_deref() == Some(phone) && record.call_timestamp == Some(ts) {
            return true;
        }
    }
    false
}

/// In-memory store for tests and development; data is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<CallRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CallStore for MemoryStore {
    async fn exists(
        &self,
        external_id: Option<&str>,
        phone: Option<&str>,
        timestamp: Option<OffsetDateTime>,
    ) -> Result<bool, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .any(|r| matches_identity(r, external_id, phone, timestamp)))
    }

    async fn insert(&self, call: NewCall) -> Result<CallRecord, StoreError> {
        // check-and-insert under one lock; this is the uniqueness backstop
        let mut records = self.records.lock().unwrap();
        let duplicate = records.iter().any(|r| {
            matches_identity(
                r,
                call.external_id.as_deref(),
                call.phone_number.as_deref(),
                call.call_timestamp,
            )
        });
        if duplicate {
            return Err(StoreError::Duplicate);
        }
        let record = CallRecord {
            id: Uuid::new_v4(),
            external_id: call.external_id,
            name: call.name,
            email: call.email,
            phone_number: call.phone_number,
            best_time_to_call: call.best_time_to_call,
            summary: call.summary,
            transcript: call.transcript,
            call_duration: call.call_duration,
            call_timestamp: call.call_timestamp,
            source: SOURCE_TAG.to_string(),
            notification_status: NotificationStatus::Pending,
            notification_message_id: None,
            notification_sent_at: None,
            notification_error: None,
            created_at: OffsetDateTime::now_utc(),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn find_pending_notification(&self) -> Result<Vec<CallRecord>, StoreError> {
        let records = self.records.lock().unwrap();
        let mut pending: Vec<CallRecord> = records
            .iter()
            .filter(|r| r.notification_status == NotificationStatus::Pending)
            .filter(|r| r.phone_number.as_deref().is_some_and(|p| !p.is_empty()))
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pending)
    }

    async fn update_notification_status(
        &self,
        id: Uuid,
        status: NotificationStatus,
        message_id: Option<String>,
        sent_at: Option<OffsetDateTime>,
        error: Option<String>,
    ) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.iter_mut().find(|r| r.id == id) {
            record.notification_status = status;
            record.notification_message_id = message_id;
            record.notification_sent_at = sent_at;
            record.notification_error = error;
        }
        Ok(())
    }

    async fn list_calls(&self) -> Result<Vec<CallRecord>, StoreError> {
        let records = self.records.lock().unwrap();
        let mut all: Vec<CallRecord> = records.iter().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn clear_all(&self) -> Result<u64, StoreError> {
        let mut records = self.records.lock().unwrap();
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }
}
