use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::{Player, UpdateSettings, DEFAULT_PLAYER_NAME, DEFAULT_THEME_PACK};
use crate::services::clock::{is_valid_timezone, local_date, local_time, resolve_timezone};
use crate::services::GameError;

const PLAYER_COLUMNS: &str = "id, name, level, xp, weeks_completed_towards_next_level, \
    weeks_required_for_next_level, grit_current, grit_max, coins, campfire_tokens, \
    streak_current, streak_best, theme_pack, testing_mode, day_timezone, \
    discord_webhook_url, ntfy_topic_url";

#[derive(Debug, Clone)]
pub struct PlayerService {
    db: SqlitePool,
    default_timezone: String,
}

impl PlayerService {
    pub fn new(db: SqlitePool, default_timezone: impl Into<String>) -> Self {
        Self {
            db,
            default_timezone: default_timezone.into(),
        }
    }

    /// Insert the player row if this is a fresh database
    pub async fn ensure_player(&self) -> Result<()> {
        let inserted = sqlx::query(
            "INSERT INTO player (
                id, name, level, xp, weeks_completed_towards_next_level,
                weeks_required_for_next_level, grit_current, grit_max,
                coins, campfire_tokens, streak_current, streak_best,
                theme_pack, testing_mode, day_timezone
            ) VALUES (1, ?, 1, 0, 0, 1, 5, 5, 0, 0, 0, 0, ?, 0, '')
            ON CONFLICT(id) DO NOTHING",
        )
        .bind(DEFAULT_PLAYER_NAME)
        .bind(DEFAULT_THEME_PACK)
        .execute(&self.db)
        .await?;

        if inserted.rows_affected() > 0 {
            tracing::info!("Created player record");
        }
        Ok(())
    }

    pub async fn get_player(&self) -> Result<Player> {
        let mut conn = self.db.acquire().await?;
        fetch_player(&mut conn).await
    }

    pub async fn update_settings(&self, settings: UpdateSettings) -> Result<Player> {
        let name = settings.name.trim();
        let name = if name.is_empty() { DEFAULT_PLAYER_NAME } else { name };
        let theme_pack = settings.theme_pack.trim();
        let theme_pack = if theme_pack.is_empty() { DEFAULT_THEME_PACK } else { theme_pack };

        let day_timezone = settings
            .day_timezone
            .as_deref()
            .map(str::trim)
            .unwrap_or_default();
        if !day_timezone.is_empty() && !is_valid_timezone(day_timezone) {
            return Err(GameError::InvalidTimezone(day_timezone.to_string()).into());
        }

        let discord = normalize_url("discord_webhook_url", settings.discord_webhook_url)?;
        let ntfy = normalize_url("ntfy_topic_url", settings.ntfy_topic_url)?;

        sqlx::query(
            "UPDATE player
             SET name = ?, theme_pack = ?, testing_mode = ?, day_timezone = ?,
                 discord_webhook_url = ?, ntfy_topic_url = ?
             WHERE id = 1",
        )
        .bind(name)
        .bind(theme_pack)
        .bind(settings.testing_mode)
        .bind(day_timezone)
        .bind(discord)
        .bind(ntfy)
        .execute(&self.db)
        .await?;

        tracing::info!("Updated settings (theme pack {}, timezone {:?})", theme_pack, day_timezone);
        self.get_player().await
    }

    pub fn timezone_for(&self, player: &Player) -> Tz {
        resolve_timezone(&player.day_timezone, &self.default_timezone)
    }

    /// The player's local wall-clock time at `now`
    pub async fn local_now(&self, now: DateTime<Utc>) -> Result<DateTime<Tz>> {
        let player = self.get_player().await?;
        Ok(local_time(now, self.timezone_for(&player)))
    }

    /// "Today" as the player sees it
    pub async fn today(&self) -> Result<NaiveDate> {
        let player = self.get_player().await?;
        Ok(local_date(Utc::now(), self.timezone_for(&player)))
    }
}

pub(crate) async fn fetch_player(conn: &mut SqliteConnection) -> Result<Player> {
    let player = sqlx::query_as::<_, Player>(&format!(
        "SELECT {} FROM player WHERE id = 1",
        PLAYER_COLUMNS
    ))
    .fetch_optional(&mut *conn)
    .await?;

    player.ok_or_else(|| anyhow::anyhow!("Player row not initialized"))
}

fn normalize_url(field: &str, url: Option<String>) -> Result<Option<String>> {
    let url = match url.as_deref().map(str::trim) {
        None | Some("") => return Ok(None),
        Some(url) => url,
    };

    match reqwest::Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(Some(url.to_string())),
        _ => Err(GameError::Validation(format!("{} must be an http(s) URL", field)).into()),
    }
}
