//! Outbound notifications for reminders and the midnight tick.
//!
//! Delivery is best effort: every target retries a few times and a final
//! failure is logged, never returned, so a flaky webhook cannot fail a job.

mod discord;
mod ntfy;
mod retry;

pub use discord::DiscordNotifier;
pub use ntfy::NtfyNotifier;
pub use retry::RetryPolicy;

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use crate::models::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationPriority {
    #[default]
    Normal,
    High,
}

#[derive(Debug, Clone)]
pub enum Notifier {
    Discord(DiscordNotifier),
    Ntfy(NtfyNotifier),
    Noop,
}

impl Notifier {
    /// Per-request timeout for webhook calls
    pub const TIMEOUT: Duration = Duration::from_secs(5);

    /// Pick the target from the player's settings: Discord first, then ntfy.
    pub fn for_player(player: &Player) -> Result<Self> {
        Self::from_targets(
            player.discord_webhook_url.as_deref(),
            player.ntfy_topic_url.as_deref(),
        )
    }

    pub fn from_targets(discord_webhook_url: Option<&str>, ntfy_topic_url: Option<&str>) -> Result<Self> {
        let discord = discord_webhook_url.map(str::trim).filter(|u| !u.is_empty());
        let ntfy = ntfy_topic_url.map(str::trim).filter(|u| !u.is_empty());

        if discord.is_none() && ntfy.is_none() {
            return Ok(Notifier::Noop);
        }

        let client = Client::builder()
            .timeout(Self::TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(match (discord, ntfy) {
            (Some(url), _) => Notifier::Discord(DiscordNotifier::new(client, url)),
            (None, Some(url)) => Notifier::Ntfy(NtfyNotifier::new(client, url)),
            (None, None) => Notifier::Noop,
        })
    }

    pub fn with_retry_policy(self, policy: RetryPolicy) -> Self {
        match self {
            Notifier::Discord(n) => Notifier::Discord(n.with_retry_policy(policy)),
            Notifier::Ntfy(n) => Notifier::Ntfy(n.with_retry_policy(policy)),
            Notifier::Noop => Notifier::Noop,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Notifier::Discord(_) => "discord",
            Notifier::Ntfy(_) => "ntfy",
            Notifier::Noop => "noop",
        }
    }

    /// Deliver a notification. Returns whether the target accepted it.
    pub async fn send(&self, title: &str, body: &str, priority: NotificationPriority) -> bool {
        let result = match self {
            Notifier::Discord(n) => n.send(title, body).await,
            Notifier::Ntfy(n) => n.send(title, body, priority).await,
            Notifier::Noop => {
                tracing::debug!("No notifier configured, dropping {:?}", title);
                return true;
            }
        };

        match result {
            Ok(()) => {
                tracing::info!("Sent {:?} via {}", title, self.name());
                true
            }
            Err(e) => {
                tracing::warn!("Notifier send failed after retries: {:#}", e);
                false
            }
        }
    }
}

pub(crate) fn ensure_success(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(anyhow::anyhow!("Notification target returned HTTP {}", status))
    }
}
