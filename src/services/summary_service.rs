use anyhow::Result;
use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::{DailySummary, ProgressSnapshot};
use crate::services::inventory_service::combat_stats;
use crate::services::player_service::fetch_player;

const SUMMARY_COLUMNS: &str = "date, pushups, situps, squats, pullups, minimum_set_done, \
    grit_restored, xp_earned, streak, encounter_outcome, coins_earned, created_at";

#[derive(Debug, Clone)]
pub struct SummaryService {
    db: SqlitePool,
}

impl SummaryService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn get_summary(&self, date: NaiveDate) -> Result<Option<DailySummary>> {
        let mut conn = self.db.acquire().await?;
        find_summary(&mut conn, date).await
    }

    /// Most recent summaries first
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<DailySummary>> {
        let summaries = sqlx::query_as::<_, DailySummary>(&format!(
            "SELECT {} FROM daily_summary ORDER BY date DESC LIMIT ?",
            SUMMARY_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(summaries)
    }

    pub async fn progress_snapshot(&self, date: NaiveDate) -> Result<ProgressSnapshot> {
        let mut conn = self.db.acquire().await?;
        let player = fetch_player(&mut conn).await?;
        let combat_stats = combat_stats(&mut conn).await?;
        drop(conn);

        Ok(ProgressSnapshot {
            date,
            player,
            combat_stats,
            recent_summaries: self.list_recent(7).await?,
        })
    }
}

pub(crate) async fn find_summary(conn: &mut SqliteConnection, date: NaiveDate) -> Result<Option<DailySummary>> {
    let summary = sqlx::query_as::<_, DailySummary>(&format!(
        "SELECT {} FROM daily_summary WHERE date = ?",
        SUMMARY_COLUMNS
    ))
    .bind(date)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(summary)
}

/// Summaries for `start..=end`, oldest first
pub(crate) async fn summaries_between(
    conn: &mut SqliteConnection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DailySummary>> {
    let summaries = sqlx::query_as::<_, DailySummary>(&format!(
        "SELECT {} FROM daily_summary WHERE date >= ? AND date <= ? ORDER BY date ASC",
        SUMMARY_COLUMNS
    ))
    .bind(start)
    .bind(end)
    .fetch_all(&mut *conn)
    .await?;

    Ok(summaries)
}

pub(crate) async fn insert_summary(conn: &mut SqliteConnection, summary: &DailySummary) -> Result<()> {
    sqlx::query(
        "INSERT INTO daily_summary (
            date, pushups, situps, squats, pullups, minimum_set_done,
            grit_restored, xp_earned, streak, encounter_outcome, coins_earned, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(date) DO UPDATE SET
            pushups = excluded.pushups,
            situps = excluded.situps,
            squats = excluded.squats,
            pullups = excluded.pullups,
            minimum_set_done = excluded.minimum_set_done,
            grit_restored = excluded.grit_restored,
            xp_earned = excluded.xp_earned,
            streak = excluded.streak,
            encounter_outcome = excluded.encounter_outcome,
            coins_earned = excluded.coins_earned,
            created_at = excluded.created_at",
    )
    .bind(summary.date)
    .bind(summary.pushups)
    .bind(summary.situps)
    .bind(summary.squats)
    .bind(summary.pullups)
    .bind(summary.minimum_set_done)
    .bind(summary.grit_restored)
    .bind(summary.xp_earned)
    .bind(summary.streak)
    .bind(summary.encounter_outcome.as_deref())
    .bind(summary.coins_earned)
    .bind(summary.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
