mod serve;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use sqlx::SqlitePool;

use crate::config::{run_migrations, AppConfig, DatabaseConfig};
use crate::jobs::{JobContext, MidnightTick, ReminderKind, Reminders, ScheduleRunner};
use crate::services::PlayerService;

pub use serve::ServeCommand;

#[derive(Parser)]
#[command(name = "gain-rpg")]
#[command(about = "Self-hosted workout tracker with RPG progression", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database URL (overrides DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve(ServeCommand),

    /// Close out yesterday and prepare today
    MidnightTick,

    /// Send one reminder now (at most once per day per kind)
    Reminders {
        #[arg(value_enum)]
        mode: ReminderMode,
    },

    /// Run whatever is due in the current window; call every 5-10 minutes from cron
    ScheduleRunner,

    /// Create the database and apply migrations
    InitDb,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReminderMode {
    Morning,
    Evening,
    Midnight,
}

impl From<ReminderMode> for ReminderKind {
    fn from(mode: ReminderMode) -> Self {
        match mode {
            ReminderMode::Morning => ReminderKind::Morning,
            ReminderMode::Evening => ReminderKind::Evening,
            ReminderMode::Midnight => ReminderKind::Midnight,
        }
    }
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = AppConfig::from_env()?;
        let mut db_config = DatabaseConfig::from_env()?;
        if let Some(url) = self.database_url {
            db_config.database_url = url;
        }

        let db = open_database(&db_config, &config).await?;

        match self.command {
            Commands::Serve(cmd) => cmd.execute(db, config).await,
            Commands::MidnightTick => {
                let ctx = JobContext::new(db, config);
                let today = ctx.local_today(Utc::now()).await?;
                let report = MidnightTick::new(ctx).run_and_notify(today).await?;
                if report.already_ran {
                    println!("Midnight tick for {} already ran", report.today);
                } else {
                    println!("Prepared {}", report.today);
                }
                Ok(())
            }
            Commands::Reminders { mode } => {
                let ctx = JobContext::new(db, config);
                let today = ctx.local_today(Utc::now()).await?;
                let kind = ReminderKind::from(mode);
                let sent = Reminders::new(ctx).send(kind, today).await?;
                println!("{} reminder for {}: {}", kind, today, if sent { "sent" } else { "skipped" });
                Ok(())
            }
            Commands::ScheduleRunner => {
                let report = ScheduleRunner::new(JobContext::new(db, config)).run().await?;
                if !report.dispatched_anything() {
                    tracing::debug!("Nothing due");
                }
                Ok(())
            }
            Commands::InitDb => {
                println!("Database ready at {}", db_config.database_url);
                Ok(())
            }
        }
    }
}

/// Open the pool, apply migrations and make sure the player row exists.
pub async fn open_database(db_config: &DatabaseConfig, config: &AppConfig) -> Result<SqlitePool> {
    let db = db_config.create_pool().await?;
    run_migrations(&db).await?;
    PlayerService::new(db.clone(), config.default_timezone.clone())
        .ensure_player()
        .await?;
    Ok(db)
}
