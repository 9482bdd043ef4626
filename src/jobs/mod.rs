//! Daily jobs: the midnight tick, reminders and the window-driven runner
//! that dispatches both.

pub mod midnight_tick;
pub mod reminders;
pub mod schedule_runner;
pub mod scheduler;

pub use midnight_tick::{MidnightTick, MidnightTickReport};
pub use reminders::{ReminderKind, Reminders};
pub use schedule_runner::{DispatchReport, ScheduleRunner};
pub use scheduler::RunnerScheduler;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};

use crate::config::AppConfig;
use crate::content::ThemePackLoader;
use crate::notifier::{Notifier, RetryPolicy};
use crate::services::{EncounterService, PlayerService, WorkoutService};

/// Local hours at which the runner acts, each open for `window_minutes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleWindows {
    pub midnight_hour: u32,
    pub morning_hour: u32,
    pub evening_hour: u32,
    pub window_minutes: u32,
}

impl Default for ScheduleWindows {
    fn default() -> Self {
        Self {
            midnight_hour: 0,
            morning_hour: 8,
            evening_hour: 19,
            window_minutes: 15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    Midnight,
    Morning,
    Evening,
}

impl ScheduleWindows {
    fn contains(&self, hour: u32, local: &DateTime<Tz>) -> bool {
        local.hour() == hour && local.minute() < self.window_minutes
    }

    /// Windows open at `local`. Normally zero or one, more only when hours are configured to collide.
    pub fn open_at(&self, local: &DateTime<Tz>) -> Vec<Window> {
        [
            (Window::Midnight, self.midnight_hour),
            (Window::Morning, self.morning_hour),
            (Window::Evening, self.evening_hour),
        ]
        .into_iter()
        .filter(|(_, hour)| self.contains(*hour, local))
        .map(|(window, _)| window)
        .collect()
    }
}

/// Everything a job needs, built once per process.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub db: SqlitePool,
    pub config: AppConfig,
    pub theme_packs: ThemePackLoader,
    pub players: PlayerService,
    pub workouts: WorkoutService,
    pub encounters: EncounterService,
    retry_policy: RetryPolicy,
}

impl JobContext {
    pub fn new(db: SqlitePool, config: AppConfig) -> Self {
        let theme_packs = ThemePackLoader::new(config.theme_pack_dir.clone());
        Self {
            players: PlayerService::new(db.clone(), config.default_timezone.clone()),
            workouts: WorkoutService::new(db.clone(), config.minimum_set),
            encounters: EncounterService::new(db.clone(), theme_packs.clone()),
            theme_packs,
            config,
            db,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Notifier for the player's current settings
    pub async fn notifier(&self) -> Result<Notifier> {
        let player = self.players.get_player().await?;
        Ok(Notifier::for_player(&player)?.with_retry_policy(self.retry_policy))
    }

    /// The player's current local date
    pub async fn local_today(&self, now: DateTime<Utc>) -> Result<NaiveDate> {
        Ok(self.players.local_now(now).await?.date_naive())
    }
}

/// Claim `(job, date)` in `job_run`. Returns false when it was already claimed.
pub(crate) async fn claim_job_run(conn: &mut SqliteConnection, job: &str, date: NaiveDate) -> Result<bool> {
    let claimed = sqlx::query(
        "INSERT INTO job_run (job, date, ran_at) VALUES (?, ?, ?)
         ON CONFLICT(job, date) DO NOTHING",
    )
    .bind(job)
    .bind(date)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(claimed.rows_affected() > 0)
}
