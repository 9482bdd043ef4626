use anyhow::{anyhow, Result};
use tokio_cron_scheduler::{Job, JobScheduler};

use super::ScheduleRunner;

/// Runs the schedule runner in-process for `serve --with-scheduler`.
pub struct RunnerScheduler {
    scheduler: JobScheduler,
}

impl RunnerScheduler {
    /// Every five minutes, on the minute
    pub const CRON: &'static str = "0 */5 * * * *";

    pub async fn start(runner: ScheduleRunner) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| anyhow!("Failed to create job scheduler: {}", e))?;

        let job = Job::new_async(Self::CRON, move |_uuid, _l| {
            let runner = runner.clone();
            Box::pin(async move {
                if let Err(e) = runner.run().await {
                    tracing::error!("Scheduled run failed: {:#}", e);
                }
            })
        })
        .map_err(|e| anyhow!("Failed to create schedule job: {}", e))?;

        scheduler
            .add(job)
            .await
            .map_err(|e| anyhow!("Failed to add schedule job: {}", e))?;
        scheduler
            .start()
            .await
            .map_err(|e| anyhow!("Failed to start job scheduler: {}", e))?;

        tracing::info!("In-process scheduler started ({})", Self::CRON);
        Ok(Self { scheduler })
    }

    pub async fn shutdown(mut self) -> Result<()> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| anyhow!("Failed to stop job scheduler: {}", e))?;
        tracing::info!("In-process scheduler stopped");
        Ok(())
    }
}
