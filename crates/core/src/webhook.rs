use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::{
    error::{Result, VibenoteError},
    export::ExportSink,
    types::ExportPayload,
};

/// Posts the payload as JSON and expects `{"success": true}` back.
#[derive(Clone, Debug)]
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ExportSink for WebhookSink {
    async fn deliver(&self, payload: &ExportPayload) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| VibenoteError::transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| VibenoteError::transport(e.to_string()))?;
        debug!(status = status.as_u16(), body = %text, "sink response");

        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

        if !status.is_success() {
            let reason = match body["error"].as_str() {
                Some(message) => message.to_string(),
                None => format!("sink responded with status: {}", status.as_u16()),
            };
            return Err(VibenoteError::transport(reason));
        }

        if body["success"].as_bool() != Some(true) {
            return Err(VibenoteError::transport("sink reported failure"));
        }

        Ok(())
    }
}
