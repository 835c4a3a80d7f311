use crate::error::SendError;
use crate::msg91_types::{BulkTemplatePayload, SendResponse};

use async_trait::async_trait;
use tracing::{debug, error};

pub const MSG91_WHATSAPP_URL: &str =
    "https://control.msg91.com/api/v5/whatsapp/whatsapp-outbound-message/bulk/";

/// Receipt for an accepted outbound message.
#[derive(Clone, Debug, Default)]
pub struct SendReceipt {
    pub message_id: Option<String>,
}

/// Outbound WhatsApp channel used by the notification dispatcher.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send the follow-up template to `to` (digits, country code included),
    /// personalized with `name`.
    async fn send_template(&self, to: &str, name: &str) -> Result<SendReceipt, SendError>;
}

pub struct Msg91Client {
    http_client: reqwest::Client,
    api_key: String,
    sender_number: String,
    template_name: String,
}

impl Msg91Client {
    pub fn new(
        http_client: reqwest::Client,
        api_key: String,
        sender_number: String,
        template_name: String,
    ) -> Self {
        Self {
            http_client,
            api_key,
            sender_number,
            template_name,
        }
    }
}

#[async_trait]
impl Messenger for Msg91Client {
    async fn send_template(&self, to: &str, name: &str) -> Result<SendReceipt, SendError> {
        let payload =
            BulkTemplatePayload::single(&self.sender_number, &self.template_name, to, name);
        let resp = self
            .http_client
            .post(MSG91_WHATSAPP_URL)
            .header("authkey", &self.api_key)
            .json(&payload)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            // keep the provider's rejection body; it ends up on the record
            let body = resp
                .json::<serde_json::Value>()
                .await
                .unwrap_or_else(|_| serde_json::Value::String(status.to_string()));
            error!(status=%status, body=%body, "whatsapp message rejected");
            return Err(SendError::Rejected(body));
        }
        let body = resp.json::<SendResponse>().await?;
        debug!(to=%to, message_id=?body.message_id, "whatsapp message accepted");
        Ok(SendReceipt {
            message_id: body.message_id,
        })
    }
}
