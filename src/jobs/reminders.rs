use anyhow::Result;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::JobContext;
use crate::content::stable_seed;
use crate::notifier::NotificationPriority;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Morning,
    Evening,
    Midnight,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::Morning => "morning",
            ReminderKind::Evening => "evening",
            ReminderKind::Midnight => "midnight",
        }
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(ReminderKind::Morning),
            "evening" => Ok(ReminderKind::Evening),
            "midnight" => Ok(ReminderKind::Midnight),
            other => Err(format!("Unknown reminder kind: {}", other)),
        }
    }
}

/// Morning, evening and midnight notifications, each sent at most once per date.
#[derive(Debug, Clone)]
pub struct Reminders {
    ctx: JobContext,
}

impl Reminders {
    pub fn new(ctx: JobContext) -> Self {
        Self { ctx }
    }

    pub async fn send(&self, kind: ReminderKind, date: NaiveDate) -> Result<bool> {
        match kind {
            ReminderKind::Morning => self.send_morning(date).await,
            ReminderKind::Evening => self.send_evening(date).await,
            ReminderKind::Midnight => self.send_midnight(date).await,
        }
    }

    pub async fn send_morning(&self, date: NaiveDate) -> Result<bool> {
        if self.was_sent(ReminderKind::Morning, date).await? {
            return Ok(false);
        }

        let summary = self.ctx.encounters.notification_summary(date).await?;
        let body = format!("Minimum set keeps your Grit alive. Tonight: {}.", summary.threat);
        self.dispatch(ReminderKind::Morning, date, "Morning Rally", body, NotificationPriority::Normal)
            .await
    }

    pub async fn send_evening(&self, date: NaiveDate) -> Result<bool> {
        if self.was_sent(ReminderKind::Evening, date).await? {
            return Ok(false);
        }
        if self.ctx.workouts.meets_minimum(date).await? {
            tracing::debug!("Minimum set already logged for {}, skipping evening nudge", date);
            return Ok(false);
        }

        let body = "You have not logged minimum set yet. Lock in before midnight.".to_string();
        self.dispatch(ReminderKind::Evening, date, "Evening Nudge", body, NotificationPriority::High)
            .await
    }

    pub async fn send_midnight(&self, date: NaiveDate) -> Result<bool> {
        if self.was_sent(ReminderKind::Midnight, date).await? {
            return Ok(false);
        }

        let summary = self.ctx.encounters.notification_summary(date).await?;
        let mut body = format!("Threat: {}.", summary.threat);
        if let (true, Some(result)) = (summary.resolved, summary.result.as_deref()) {
            body.push_str(&format!(" Latest result: {}.", result));
        }
        self.dispatch(ReminderKind::Midnight, date, "Midnight Summary", body, NotificationPriority::Normal)
            .await
    }

    pub async fn was_sent(&self, kind: ReminderKind, date: NaiveDate) -> Result<bool> {
        let sent = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reminder_log WHERE kind = ? AND date = ?",
        )
        .bind(kind.as_str())
        .bind(date)
        .fetch_one(&self.ctx.db)
        .await?;

        Ok(sent > 0)
    }

    /// Claim the reminder slot first so that overlapping runs cannot both send.
    async fn dispatch(
        &self,
        kind: ReminderKind,
        date: NaiveDate,
        title: &str,
        body: String,
        priority: NotificationPriority,
    ) -> Result<bool> {
        let claimed = sqlx::query(
            "INSERT INTO reminder_log (kind, date, sent_at) VALUES (?, ?, ?)
             ON CONFLICT(kind, date) DO NOTHING",
        )
        .bind(kind.as_str())
        .bind(date)
        .bind(Utc::now())
        .execute(&self.ctx.db)
        .await?;

        if claimed.rows_affected() == 0 {
            return Ok(false);
        }

        let body = self.with_narrative(kind, date, body).await?;
        self.ctx.notifier().await?.send(title, &body, priority).await;

        tracing::info!("Sent {} reminder for {}", kind, date);
        Ok(true)
    }

    async fn with_narrative(&self, kind: ReminderKind, date: NaiveDate, body: String) -> Result<String> {
        let player = self.ctx.players.get_player().await?;
        let pack = self.ctx.theme_packs.load(&player.theme_pack);

        let date_key = date.to_string();
        let seed = stable_seed(&[kind.as_str(), date_key.as_str()]);
        let line = pack.narrative_line(kind.as_str(), seed, "");

        Ok(if line.is_empty() {
            body
        } else {
            format!("{} {}", body, line)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reminder_kind_parsing() {
        assert_eq!("Morning".parse::<ReminderKind>(), Ok(ReminderKind::Morning));
        assert_eq!(" evening ".parse::<ReminderKind>(), Ok(ReminderKind::Evening));
        assert!("noon".parse::<ReminderKind>().is_err());
        assert_eq!(ReminderKind::Midnight.to_string(), "midnight");
    }
}
