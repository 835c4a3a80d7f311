use crate::bolna_types::{ExecutionsResponse, RawCall};

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error};

/// Query parameters passed through to the executions endpoint.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FetchOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Source of raw call executions for the ingestion pipeline.
#[async_trait]
pub trait CallSource: Send + Sync {
    /// Fetch executions matching `options`. Transport and API failures are
    /// logged and surface as an empty batch; the next scheduled run retries.
    async fn fetch(&self, options: &FetchOptions) -> Vec<RawCall>;
}

/// Client for the voice-AI provider's executions API. Does transport and
/// response unwrapping only; no validation of the records themselves.
pub struct BolnaClient {
    http_client: reqwest::Client,
    base_url: String,
    agent_id: String,
    api_key: String,
}

impl BolnaClient {
    pub fn new(
        http_client: reqwest::Client,
        base_url: String,
        agent_id: String,
        api_key: String,
    ) -> Self {
        Self {
            http_client,
            base_url,
            agent_id,
            api_key,
        }
    }

    fn executions_url(&self) -> String {
        format!(
            "{}/agent/{}/executions",
            self.base_url.trim_end_matches('/'),
            self.agent_id
        )
    }

    async fn fetch_executions(&self, options: &FetchOptions) -> Result<Vec<RawCall>, reqwest::Error> {
        let resp = self
            .http_client
            .get(self.executions_url())
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(options)
            .send()
            .await?
            .error_for_status()?;
        let body = resp.json::<ExecutionsResponse>().await?;
        Ok(body.into_calls())
    }
}

#[async_trait]
impl CallSource for BolnaClient {
    async fn fetch(&self, options: &FetchOptions) -> Vec<RawCall> {
        match self.fetch_executions(options).await {
            Ok(calls) => {
                debug!(count = calls.len(), "fetched executions");
                calls
            }
            Err(e) => {
                error!(error=%e, "failed to fetch executions");
                Vec::new()
            }
        }
    }
}
