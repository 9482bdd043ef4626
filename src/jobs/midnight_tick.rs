use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::Serialize;
use sqlx::SqliteConnection;

use super::{claim_job_run, JobContext};
use crate::content::ThemePackLoader;
use crate::models::{CombatAction, DailySummary, EncounterResult, MinimumSet, Reps};
use crate::notifier::NotificationPriority;
use crate::services::encounter_service::{ensure_roll, find_roll, resolve_encounter};
use crate::services::player_service::fetch_player;
use crate::services::summary_service::{find_summary, insert_summary, summaries_between};
use crate::services::workout_service::{ensure_log, find_log, lock_in};

pub const JOB_NAME: &str = "midnight_tick";

const XP_PER_GRIT: i64 = 10;
const XP_MINIMUM_SET: i64 = 5;
const XP_VICTORY: i64 = 5;
/// Days in an ISO week that must meet the minimum for the week to count
const ACTIVE_DAYS_PER_WEEK: usize = 4;

#[derive(Debug, Clone, Serialize)]
pub struct MidnightTickReport {
    pub today: NaiveDate,
    pub yesterday: NaiveDate,
    pub already_ran: bool,
    pub auto_locked_yesterday: bool,
    pub resolved_yesterday: bool,
    pub summary: Option<DailySummary>,
    pub week_completed: bool,
    pub leveled_up: bool,
}

impl MidnightTickReport {
    fn skipped(today: NaiveDate) -> Self {
        Self {
            today,
            yesterday: today - Duration::days(1),
            already_ran: true,
            auto_locked_yesterday: false,
            resolved_yesterday: false,
            summary: None,
            week_completed: false,
            leveled_up: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct WeeklyProgress {
    week_completed: bool,
    leveled_up: bool,
}

/// Closes out yesterday and prepares today, once per local date.
#[derive(Debug, Clone)]
pub struct MidnightTick {
    ctx: JobContext,
}

impl MidnightTick {
    pub fn new(ctx: JobContext) -> Self {
        Self { ctx }
    }

    pub async fn run(&self, today: NaiveDate) -> Result<MidnightTickReport> {
        let mut tx = self.ctx.db.begin().await?;

        if !claim_job_run(&mut tx, JOB_NAME, today).await? {
            tracing::info!("Midnight tick for {} already ran", today);
            return Ok(MidnightTickReport::skipped(today));
        }

        let report = close_day(
            &mut tx,
            &self.ctx.theme_packs,
            &self.ctx.config.minimum_set,
            today,
        )
        .await?;

        tx.commit().await?;

        if let Some(summary) = &report.summary {
            tracing::info!(
                "Closed {}: streak {}, +{} xp, outcome {}",
                report.yesterday,
                summary.streak,
                summary.xp_earned,
                summary.encounter_outcome.as_deref().unwrap_or("none")
            );
        }
        if report.leveled_up {
            tracing::info!("Player leveled up at the end of the week of {}", report.yesterday);
        }
        Ok(report)
    }

    /// Run the tick and report it through the player's notifier.
    pub async fn run_and_notify(&self, today: NaiveDate) -> Result<MidnightTickReport> {
        let report = self.run(today).await?;
        if report.already_ran {
            return Ok(report);
        }

        let summary = self.ctx.encounters.notification_summary(today).await?;
        let body = format!(
            "Prepared {}. Yesterday auto-resolved: {}. Tonight threat: {}.",
            report.today, report.resolved_yesterday, summary.threat
        );
        self.ctx
            .notifier()
            .await?
            .send("Gain RPG Midnight Tick", &body, NotificationPriority::Normal)
            .await;

        Ok(report)
    }
}

async fn close_day(
    conn: &mut SqliteConnection,
    theme_packs: &ThemePackLoader,
    minimum_set: &MinimumSet,
    today: NaiveDate,
) -> Result<MidnightTickReport> {
    let yesterday = today - Duration::days(1);

    // Lock in whatever was logged but never finalised
    let mut auto_locked_yesterday = false;
    let reps = match find_log(conn, yesterday).await? {
        Some(log) => {
            if !log.is_locked_in() {
                lock_in(conn, yesterday).await?;
                auto_locked_yesterday = true;
            }
            log.reps()
        }
        None => Reps::default(),
    };

    let mut resolved_yesterday = false;
    let result = match find_roll(conn, yesterday).await? {
        Some(row) => match EncounterResult::from_stored(row.result_json.as_deref()) {
            Some(result) if result.complete => Some(result),
            _ => {
                resolved_yesterday = true;
                Some(resolve_encounter(conn, theme_packs, yesterday, CombatAction::Auto).await?)
            }
        },
        None => None,
    };
    let outcome = result.as_ref().and_then(|r| r.outcome);

    let minimum_set_done = reps.meets(minimum_set);
    let previous_streak = find_summary(conn, yesterday - Duration::days(1))
        .await?
        .map(|s| s.streak)
        .unwrap_or(0);
    let streak = if minimum_set_done { previous_streak + 1 } else { 0 };

    let grit_restored = reps.grit_restore();
    let mut xp_earned = grit_restored * XP_PER_GRIT;
    if minimum_set_done {
        xp_earned += XP_MINIMUM_SET;
    }
    if outcome.map(|o| o.is_victory()).unwrap_or(false) {
        xp_earned += XP_VICTORY;
    }

    let summary = DailySummary {
        date: yesterday,
        pushups: reps.pushups,
        situps: reps.situps,
        squats: reps.squats,
        pullups: reps.pullups,
        minimum_set_done,
        grit_restored,
        xp_earned,
        streak,
        encounter_outcome: outcome.map(|o| o.as_str().to_string()),
        coins_earned: result.as_ref().and_then(|r| r.coins_earned).unwrap_or(0),
        created_at: Utc::now(),
    };
    insert_summary(conn, &summary).await?;

    sqlx::query(
        "UPDATE player
         SET xp = xp + ?, streak_current = ?, streak_best = MAX(streak_best, ?)
         WHERE id = 1",
    )
    .bind(xp_earned)
    .bind(streak)
    .bind(streak)
    .execute(&mut *conn)
    .await?;

    let weekly = if yesterday.weekday() == Weekday::Sun {
        apply_weekly_progress(conn, yesterday).await?
    } else {
        WeeklyProgress::default()
    };

    ensure_log(conn, today).await?;
    ensure_roll(conn, theme_packs, today).await?;

    Ok(MidnightTickReport {
        today,
        yesterday,
        already_ran: false,
        auto_locked_yesterday,
        resolved_yesterday,
        summary: Some(summary),
        week_completed: weekly.week_completed,
        leveled_up: weekly.leveled_up,
    })
}

async fn apply_weekly_progress(conn: &mut SqliteConnection, week_end: NaiveDate) -> Result<WeeklyProgress> {
    let week_start = week_end - Duration::days(6);
    let active_days = summaries_between(conn, week_start, week_end)
        .await?
        .iter()
        .filter(|s| s.minimum_set_done)
        .count();

    if active_days < ACTIVE_DAYS_PER_WEEK {
        tracing::debug!("Week ending {} had {} active days", week_end, active_days);
        return Ok(WeeklyProgress::default());
    }

    let player = fetch_player(conn).await?;
    let weeks_completed = player.weeks_completed_towards_next_level + 1;

    if weeks_completed < player.weeks_required_for_next_level {
        sqlx::query("UPDATE player SET weeks_completed_towards_next_level = ? WHERE id = 1")
            .bind(weeks_completed)
            .execute(&mut *conn)
            .await?;
        return Ok(WeeklyProgress {
            week_completed: true,
            leveled_up: false,
        });
    }

    let new_level = player.level + 1;
    sqlx::query(
        "UPDATE player
         SET level = ?, weeks_completed_towards_next_level = 0,
             weeks_required_for_next_level = ?, grit_max = grit_max + 1,
             campfire_tokens = campfire_tokens + 1
         WHERE id = 1",
    )
    .bind(new_level)
    .bind(new_level)
    .execute(&mut *conn)
    .await?;

    Ok(WeeklyProgress {
        week_completed: true,
        leveled_up: true,
    })
}
