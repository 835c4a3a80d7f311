use crate::consts::MIN_DIALABLE_DIGITS;
use crate::db_types::{CallRecord, NotificationStatus};
use crate::msg91::Messenger;
use crate::store::CallStore;
use crate::utils::prefix_country_code;

use serde::Serialize;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Counts reported to the caller after one dispatch run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
}

enum Dispatched {
    Sent,
    Failed,
    Skipped,
}

/// One dispatch run over every record still awaiting its follow-up message.
/// Each record moves `pending -> sent | failed`; records without a dialable
/// phone number are skipped with no state change. One record's failure never
/// blocks the rest.
pub async fn run_notification_dispatch(
    store: &dyn CallStore,
    messenger: &dyn Messenger,
    inter_send_delay: Duration,
) -> DispatchSummary {
    let contacts = match store.find_pending_notification().await {
        Ok(contacts) => contacts,
        Err(e) => {
            error!(error=%e, "failed to load pending notifications");
            return DispatchSummary::default();
        }
    };
    if contacts.is_empty() {
        info!("no contacts awaiting notification");
        return DispatchSummary::default();
    }
    info!(count = contacts.len(), "dispatching notifications");

    let mut summary = DispatchSummary::default();
    let total = contacts.len();
    for (idx, contact) in contacts.iter().enumerate() {
        match dispatch_one(contact, store, messenger).await {
            Dispatched::Sent => summary.sent += 1,
            Dispatched::Failed => summary.failed += 1,
            Dispatched::Skipped => summary.skipped += 1,
        }
        // rate-limit courtesy toward the messaging provider
        if idx + 1 < total {
            sleep(inter_send_delay).await;
        }
    }

    info!(
        sent = summary.sent,
        failed = summary.failed,
        skipped = summary.skipped,
        "dispatch run complete"
    );
    summary
}

async fn dispatch_one(
    contact: &CallRecord,
    store: &dyn CallStore,
    messenger: &dyn Messenger,
) -> Dispatched {
    let digits: String = contact
        .phone_number
        .as_deref()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    if digits.len() < MIN_DIALABLE_DIGITS {
        warn!(id=%contact.id, phone=?contact.phone_number, "skipping record with unusable phone number");
        return Dispatched::Skipped;
    }
    let to = prefix_country_code(&digits);
    let name = contact.name.as_deref().unwrap_or("Customer");

    match messenger.send_template(&to, name).await {
        Ok(receipt) => {
            info!(id=%contact.id, to=%to, "whatsapp message sent");
            if let Err(e) = store
                .update_notification_status(
                    contact.id,
                    NotificationStatus::Sent,
                    receipt.message_id,
                    Some(OffsetDateTime::now_utc()),
                    None,
                )
                .await
            {
                error!(error=%e, id=%contact.id, "failed to record sent status");
            }
            Dispatched::Sent
        }
        Err(e) => {
            error!(id=%contact.id, error=%e, "whatsapp send failed");
            if let Err(db) = store
                .update_notification_status(
                    contact.id,
                    NotificationStatus::Failed,
                    None,
                    None,
                    Some(e.detail()),
                )
                .await
            {
                error!(error=%db, id=%contact.id, "failed to record failed status");
            }
            Dispatched::Failed
        }
    }
}
