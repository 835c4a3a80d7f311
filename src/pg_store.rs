use crate::consts::SOURCE_TAG;
use crate::db_types::{CallRecord, NewCall, NotificationStatus};
use crate::error::StoreError;
use crate::store::CallStore;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use time::OffsetDateTime;
use uuid::Uuid;

const UNIQUE_VIOLATION: &str = "23505";

/// Row shape for the `calls` table. Converted into the domain record so the
/// status string stays a storage detail.
#[derive(sqlx::FromRow)]
struct CallRow {
    id: Uuid,
    external_id: Option<String>,
    name: Option<String>,
    email: Option<String>,
    phone_number: Option<String>,
    best_time_to_call: Option<String>,
    summary: Option<String>,
    transcript: String,
    call_duration: i32,
    call_timestamp: Option<OffsetDateTime>,
    source: String,
    notification_status: String,
    notification_message_id: Option<String>,
    notification_sent_at: Option<OffsetDateTime>,
    notification_error: Option<String>,
    created_at: OffsetDateTime,
}

impl From<CallRow> for CallRecord {
    fn from(row: CallRow) -> Self {
        CallRecord {
            id: row.id,
            external_id: row.external_id,
            name: row.name,
            email: row.email,
            phone_number: row.phone_number,
            best_time_to_call: row.best_time_to_call,
            summary: row.summary,
            transcript: row.transcript,
            call_duration: row.call_duration,
            call_timestamp: row.call_timestamp,
            source: row.source,
            notification_status: NotificationStatus::parse(&row.notification_status),
            notification_message_id: row.notification_message_id,
            notification_sent_at: row.notification_sent_at,
            notification_error: row.notification_error,
            created_at: row.created_at,
        }
    }
}

/// Postgres-backed store. The partial unique indexes on `external_id` and on
/// (`phone_number`, `call_timestamp`) are the dedupe backstop under
/// concurrent ingestion runs.
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

#[async_trait]
impl CallStore for PgStore {
    async fn exists(
        &self,
        external_id: Option<&str>,
        phone: Option<&str>,
        timestamp: Option<OffsetDateTime>,
    ) -> Result<bool, StoreError> {
        // Only present identity components participate in the match; an
        // absent component must never match rows on its own.
        let found: Option<(Uuid,)> = match (external_id, phone.zip(timestamp)) {
            (None, None) => return Ok(false),
            (Some(ext), None) => {
                sqlx::query_as(
                    "
                    select id from calls
                    where external_id = $1
                    limit 1
                    ",
                )
                .bind(ext)
                .fetch_optional(&self.pool)
                .await?
            }
            (None, Some((phone, ts))) => {
                sqlx::query_as(
                    "
                    select id from calls
                    where phone_number = $1 and call_timestamp = $2
                    limit 1
                    ",
                )
                .bind(phone)
                .bind(ts)
                .fetch_optional(&self.pool)
                .await?
            }
            (Some(ext), Some((phone, ts))) => {
                sqlx::query_as(
                    "
                    select id from calls
                    where external_id = $1
                       or (phone_number = $2 and call_timestamp = $3)
                    limit 1
                    ",
                )
                .bind(ext)
                .bind(phone)
                .bind(ts)
                .fetch_optional(&self.pool)
                .await?
            }
        };
        Ok(found.is_some())
    }

    async fn insert(&self, call: NewCall) -> Result<CallRecord, StoreError> {
        let row: CallRow = sqlx::query_as(
            "
            insert into calls (
              external_id,
              name,
              email,
              phone_number,
              best_time_to_call,
              summary,
              transcript,
              call_duration,
              call_timestamp,
              source,
              notification_status
            ) values (
              $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11
            )
            returning *
            ",
        )
        .bind(call.external_id)
        .bind(call.name)
        .bind(call.email)
        .bind(call.phone_number)
        .bind(call.best_time_to_call)
        .bind(call.summary)
        .bind(call.transcript)
        .bind(call.call_duration)
        .bind(call.call_timestamp)
        .bind(SOURCE_TAG)
        .bind(NotificationStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Duplicate
            } else {
                StoreError::Database(e)
            }
        })?;
        Ok(row.into())
    }

    async fn find_pending_notification(&self) -> Result<Vec<CallRecord>, StoreError> {
        let rows: Vec<CallRow> = sqlx::query_as(
            "
            select * from calls
            where notification_status = $1
              and phone_number is not null
              and phone_number <> ''
            order by created_at desc
            ",
        )
        .bind(NotificationStatus::Pending.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(CallRecord::from).collect())
    }

    async fn update_notification_status(
        &self,
        id: Uuid,
        status: NotificationStatus,
        message_id: Option<String>,
        sent_at: Option<OffsetDateTime>,
        error: Option<String>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "
            update calls
            set notification_status = $2,
                notification_message_id = $3,
                notification_sent_at = $4,
                notification_error = $5
            where id = $1
            ",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(message_id)
        .bind(sent_at)
        .bind(error)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_calls(&self) -> Result<Vec<CallRecord>, StoreError> {
        let rows: Vec<CallRow> = sqlx::query_as(
            "
            select * from calls
            order by created_at desc
            ",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(CallRecord::from).collect())
    }

    async fn clear_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("delete from calls").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
