use anyhow::{Context, Result};
use reqwest::Client;

use super::{ensure_success, NotificationPriority, RetryPolicy};

/// Publishes the body as plain text to an ntfy topic URL.
#[derive(Debug, Clone)]
pub struct NtfyNotifier {
    client: Client,
    topic_url: String,
    retry: RetryPolicy,
}

impl NtfyNotifier {
    pub fn new(client: Client, topic_url: impl Into<String>) -> Self {
        Self {
            client,
            topic_url: topic_url.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn send(&self, title: &str, body: &str, priority: NotificationPriority) -> Result<()> {
        let priority = match priority {
            NotificationPriority::Normal => "3",
            NotificationPriority::High => "4",
        };

        self.retry
            .execute(move || async move {
                let response = self
                    .client
                    .post(&self.topic_url)
                    .header("Title", title)
                    .header("Priority", priority)
                    .body(body.to_string())
                    .send()
                    .await
                    .context("Failed to reach ntfy topic")?;
                ensure_success(response)
            })
            .await
    }
}
