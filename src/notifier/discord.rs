use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::json;

use super::{ensure_success, RetryPolicy};

/// Posts `**title**\nbody` to a Discord webhook.
#[derive(Debug, Clone)]
pub struct DiscordNotifier {
    client: Client,
    webhook_url: String,
    retry: RetryPolicy,
}

impl DiscordNotifier {
    pub fn new(client: Client, webhook_url: impl Into<String>) -> Self {
        Self {
            client,
            webhook_url: webhook_url.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn send(&self, title: &str, body: &str) -> Result<()> {
        let payload = json!({ "content": format!("**{}**\n{}", title, body) });
        let payload = &payload;

        self.retry
            .execute(move || async move {
                let response = self
                    .client
                    .post(&self.webhook_url)
                    .json(payload)
                    .send()
                    .await
                    .context("Failed to reach Discord webhook")?;
                ensure_success(response)
            })
            .await
    }
}
