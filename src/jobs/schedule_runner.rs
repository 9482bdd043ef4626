use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::{JobContext, MidnightTick, Reminders, Window};

/// What one pass of the runner did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub local_date: Option<NaiveDate>,
    pub timezone: String,
    pub windows: Vec<Window>,
    pub ticked: bool,
    pub midnight_sent: bool,
    pub morning_sent: bool,
    pub evening_sent: bool,
}

impl DispatchReport {
    pub fn dispatched_anything(&self) -> bool {
        self.ticked || self.midnight_sent || self.morning_sent || self.evening_sent
    }
}

/// Meant to run every few minutes from cron or the in-process scheduler.
/// Every action is idempotent per window per day.
#[derive(Debug, Clone)]
pub struct ScheduleRunner {
    ctx: JobContext,
    tick: MidnightTick,
    reminders: Reminders,
}

impl ScheduleRunner {
    pub fn new(ctx: JobContext) -> Self {
        Self {
            tick: MidnightTick::new(ctx.clone()),
            reminders: Reminders::new(ctx.clone()),
            ctx,
        }
    }

    pub async fn run(&self) -> Result<DispatchReport> {
        self.run_at(Utc::now()).await
    }

    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<DispatchReport> {
        let player = self.ctx.players.get_player().await?;
        let tz = self.ctx.players.timezone_for(&player);
        let local = now.with_timezone(&tz);
        let today = local.date_naive();

        let mut report = DispatchReport {
            local_date: Some(today),
            timezone: tz.name().to_string(),
            windows: self.ctx.config.windows.open_at(&local),
            ..DispatchReport::default()
        };

        for window in report.windows.clone() {
            match window {
                Window::Midnight => {
                    report.ticked = !self.tick.run(today).await?.already_ran;
                    report.midnight_sent = self.reminders.send_midnight(today).await?;
                }
                Window::Morning => {
                    report.morning_sent = self.reminders.send_morning(today).await?;
                }
                Window::Evening => {
                    report.evening_sent = self.reminders.send_evening(today).await?;
                }
            }
        }

        if report.windows.is_empty() {
            tracing::debug!("No window open at {} ({})", local.format("%H:%M"), report.timezone);
        } else {
            tracing::info!("Schedule runner for {}: {:?}", today, report);
        }
        Ok(report)
    }
}
