use anyhow::{Context, Result};
use clap::Args;
use sqlx::SqlitePool;
use tokio::net::TcpListener;

use crate::api::{create_routes, AppState};
use crate::config::AppConfig;
use crate::jobs::{JobContext, RunnerScheduler, ScheduleRunner};

#[derive(Args)]
pub struct ServeCommand {
    /// Also run the schedule runner every 5 minutes in-process
    #[arg(long)]
    with_scheduler: bool,
}

impl ServeCommand {
    pub async fn execute(self, db: SqlitePool, config: AppConfig) -> Result<()> {
        let scheduler = if self.with_scheduler {
            let runner = ScheduleRunner::new(JobContext::new(db.clone(), config.clone()));
            Some(RunnerScheduler::start(runner).await?)
        } else {
            None
        };

        let address = config.server_address();
        let app = create_routes(AppState::new(db, config));

        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("Failed to bind {}", address))?;
        tracing::info!("Gain RPG server starting on http://{}", address);
        tracing::info!("Health check available at http://{}/health", address);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        if let Some(scheduler) = scheduler {
            scheduler.shutdown().await?;
        }
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutting down");
}
