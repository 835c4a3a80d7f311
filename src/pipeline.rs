use crate::bolna::{CallSource, FetchOptions};
use crate::bolna_types::RawCall;
use crate::db_types::NewCall;
use crate::error::StoreError;
use crate::extract::Extractor;
use crate::store::CallStore;
use crate::utils::normalize_phone;

use serde::Serialize;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Counts reported to the caller after one ingestion run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IngestionSummary {
    pub new_calls: usize,
    pub duplicate_calls: usize,
    pub total_from_api: usize,
}

enum Ingested {
    New,
    Duplicate,
}

/// One ingestion run: fetch, then per raw call check identity, extract, and
/// persist. A single record's failure is logged and skipped; the run always
/// completes with a summary. An empty fetch is a normal outcome, not an error.
pub async fn run_ingestion(
    source: &dyn CallSource,
    extractor: &dyn Extractor,
    store: &dyn CallStore,
    inter_record_delay: Duration,
) -> IngestionSummary {
    let calls = source.fetch(&FetchOptions::default()).await;
    if calls.is_empty() {
        warn!("no calls returned from source");
        return IngestionSummary::default();
    }
    info!(count = calls.len(), "fetched calls from source");

    let mut summary = IngestionSummary {
        total_from_api: calls.len(),
        ..Default::default()
    };
    let total = calls.len();
    for (idx, call) in calls.iter().enumerate() {
        match ingest_one(call, extractor, store).await {
            Ok(Ingested::New) => summary.new_calls += 1,
            Ok(Ingested::Duplicate) => {
                info!(phone = ?call.user_number(), "skipping duplicate call");
                summary.duplicate_calls += 1;
            }
            Err(e) => error!(error=%e, "failed to process call"),
        }
        // pause between records for the extraction provider's rate limits
        if idx + 1 < total {
            sleep(inter_record_delay).await;
        }
    }

    info!(
        new_calls = summary.new_calls,
        duplicate_calls = summary.duplicate_calls,
        total_from_api = summary.total_from_api,
        "ingestion run complete"
    );
    summary
}

async fn ingest_one(
    call: &RawCall,
    extractor: &dyn Extractor,
    store: &dyn CallStore,
) -> Result<Ingested, StoreError> {
    let external_id = call.external_id();
    let user_number = call.user_number().and_then(|n| normalize_phone(&n));
    let timestamp = call.call_timestamp();

    if store
        .exists(external_id.as_deref(), user_number.as_deref(), timestamp)
        .await?
    {
        return Ok(Ingested::Duplicate);
    }

    let transcript = call.transcript_text();
    debug!(phone = ?user_number, transcript_len = transcript.len(), "processing call");
    let extracted = extractor.extract(&transcript, user_number.as_deref()).await;

    let new_call = NewCall {
        external_id,
        name: extracted.name,
        email: extracted.email,
        phone_number: extracted.phone_number.as_deref().and_then(normalize_phone),
        best_time_to_call: extracted.best_time_to_call,
        summary: extracted.summary,
        transcript,
        call_duration: call.duration_secs(),
        call_timestamp: Some(timestamp.unwrap_or_else(OffsetDateTime::now_utc)),
    };

    match store.insert(new_call).await {
        Ok(_) => Ok(Ingested::New),
        // a concurrent run got there first; same outcome as the pre-check
        Err(StoreError::Duplicate) => Ok(Ingested::Duplicate),
        Err(e) => Err(e),
    }
}
