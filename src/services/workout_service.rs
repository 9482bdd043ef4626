use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::{LockInOutcome, MinimumSet, Reps, WorkoutLog};
use crate::services::inventory_service::combat_stats;
use crate::services::player_service::fetch_player;
use crate::services::GameError;

const WORKOUT_COLUMNS: &str = "date, pushups, situps, squats, pullups, other_json, \
    minimum_set_done, locked_in_at, last_edited_at";

#[derive(Debug, Clone)]
pub struct WorkoutService {
    db: SqlitePool,
    minimum_set: MinimumSet,
}

impl WorkoutService {
    pub fn new(db: SqlitePool, minimum_set: MinimumSet) -> Self {
        Self { db, minimum_set }
    }

    pub fn minimum_set(&self) -> MinimumSet {
        self.minimum_set
    }

    /// Fetch the log for `date`, creating an empty one if needed
    pub async fn get_log(&self, date: NaiveDate) -> Result<WorkoutLog> {
        let mut conn = self.db.acquire().await?;
        ensure_log(&mut conn, date).await
    }

    /// Fetch the log for `date` without creating it
    pub async fn find_log(&self, date: NaiveDate) -> Result<Option<WorkoutLog>> {
        let mut conn = self.db.acquire().await?;
        find_log(&mut conn, date).await
    }

    pub async fn save_reps(&self, date: NaiveDate, reps: Reps) -> Result<WorkoutLog> {
        let mut tx = self.db.begin().await?;

        let current = ensure_log(&mut tx, date).await?;
        if current.is_locked_in() {
            return Err(GameError::WorkoutLocked(date).into());
        }
        write_reps(&mut tx, date, reps.clamped(), &self.minimum_set).await?;
        let log = ensure_log(&mut tx, date).await?;

        tx.commit().await?;

        tracing::debug!("Saved reps for {}: {:?}", date, reps);
        Ok(log)
    }

    /// Top every count up to the minimum set
    pub async fn apply_minimum_set(&self, date: NaiveDate) -> Result<WorkoutLog> {
        let current = self.get_log(date).await?;
        self.save_reps(date, current.reps().raised_to(&self.minimum_set))
            .await
    }

    pub async fn lock_in(&self, date: NaiveDate) -> Result<LockInOutcome> {
        let mut tx = self.db.begin().await?;
        let outcome = lock_in(&mut tx, date).await?;
        tx.commit().await?;

        if !outcome.already_locked {
            tracing::info!(
                "Locked in {}: +{} grit, +{} coins from overflow",
                date,
                outcome.grit_restored,
                outcome.coins_from_overflow
            );
        }
        Ok(outcome)
    }

    /// Whether the logged reps for `date` reach the configured minimum.
    ///
    /// Evaluated against the current configuration rather than the stored
    /// `minimum_set_done` flag so that changing the minimum applies at once.
    pub async fn meets_minimum(&self, date: NaiveDate) -> Result<bool> {
        let log = self.find_log(date).await?;
        Ok(log
            .map(|log| log.reps().meets(&self.minimum_set))
            .unwrap_or(false))
    }
}

pub(crate) async fn find_log(conn: &mut SqliteConnection, date: NaiveDate) -> Result<Option<WorkoutLog>> {
    let log = sqlx::query_as::<_, WorkoutLog>(&format!(
        "SELECT {} FROM workout_log WHERE date = ?",
        WORKOUT_COLUMNS
    ))
    .bind(date)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(log)
}

pub(crate) async fn ensure_log(conn: &mut SqliteConnection, date: NaiveDate) -> Result<WorkoutLog> {
    sqlx::query(
        "INSERT INTO workout_log (date, other_json, last_edited_at)
         VALUES (?, '{}', ?)
         ON CONFLICT(date) DO NOTHING",
    )
    .bind(date)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    find_log(conn, date)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Workout log for {} vanished after insert", date))
}

async fn write_reps(
    conn: &mut SqliteConnection,
    date: NaiveDate,
    reps: Reps,
    minimum_set: &MinimumSet,
) -> Result<()> {
    sqlx::query(
        "UPDATE workout_log
         SET pushups = ?, situps = ?, squats = ?, pullups = ?,
             minimum_set_done = ?, last_edited_at = ?
         WHERE date = ?",
    )
    .bind(reps.pushups)
    .bind(reps.situps)
    .bind(reps.squats)
    .bind(reps.pullups)
    .bind(reps.meets(minimum_set))
    .bind(Utc::now())
    .bind(date)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Convert the day's reps into grit. Grit above the cap spills into coins.
pub(crate) async fn lock_in(conn: &mut SqliteConnection, date: NaiveDate) -> Result<LockInOutcome> {
    let workout = ensure_log(conn, date).await?;
    if workout.is_locked_in() {
        return Ok(LockInOutcome {
            grit_restored: 0,
            coins_from_overflow: 0,
            already_locked: true,
        });
    }

    let restore = workout.reps().grit_restore();
    let player = fetch_player(conn).await?;
    let stats = combat_stats(conn).await?;
    let grit_cap = player.grit_max + stats.grit_bonus;

    let new_grit = player.grit_current + restore;
    let overflow = (new_grit - grit_cap).max(0);
    let capped = new_grit.min(grit_cap);

    sqlx::query("UPDATE player SET grit_current = ?, coins = coins + ? WHERE id = 1")
        .bind(capped)
        .bind(overflow)
        .execute(&mut *conn)
        .await?;

    let now = Utc::now();
    sqlx::query("UPDATE workout_log SET locked_in_at = ?, last_edited_at = ? WHERE date = ?")
        .bind(now)
        .bind(now)
        .bind(date)
        .execute(&mut *conn)
        .await?;

    Ok(LockInOutcome {
        grit_restored: restore,
        coins_from_overflow: overflow,
        already_locked: false,
    })
}
