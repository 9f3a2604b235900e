// src/slack.rs

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::error::ReportError;

/// Outbound channel announcements. Fire and forget; implementations never
/// retry.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<(), ReportError>;
}

/// Posts plain-text messages to a Slack incoming webhook.
pub struct SlackNotifier {
    http_client: Client,
    webhook_url: String,
}

impl SlackNotifier {
    pub fn new(http_client: Client, webhook_url: String) -> Self {
        Self {
            http_client,
            webhook_url,
        }
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, message: &str) -> Result<(), ReportError> {
        let payload = json!({ "text": message });
        let response = self
            .http_client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(ReportError::SlackApi { status, message });
        }

        debug!("Slack notification delivered");
        Ok(())
    }
}
