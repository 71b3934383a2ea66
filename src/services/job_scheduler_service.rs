use std::sync::Arc;

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

use crate::errors::AppError;
use crate::jobs;
use crate::services::market_data_service::MarketDataService;

// Context passed to job functions
#[derive(Clone)]
pub struct JobContext {
    pub pool: PgPool,
    pub market_data: Arc<MarketDataService>,
    pub refresh_concurrency: usize,
}

pub struct JobSchedulerService {
    scheduler: JobScheduler,
    context: JobContext,
}

impl JobSchedulerService {
    pub async fn new(context: JobContext) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::External(format!("failed to create scheduler: {}", e)))?;

        Ok(Self { scheduler, context })
    }

    /// Registers and starts all scheduled jobs.
    pub async fn start(&mut self) -> Result<(), AppError> {
        info!("🚀 starting job scheduler");

        // Test mode runs jobs every minute instead of nightly
        let test_mode = std::env::var("JOB_SCHEDULER_TEST_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        if test_mode {
            info!("⚠️ job scheduler in test mode, jobs run every minute");
        }

        // format: sec min hour day month weekday
        let schedule = if test_mode { "0 */1 * * * *" } else { "0 0 2 * * *" };
        let description = if test_mode { "every minute (test mode)" } else { "daily at 2:00 AM" };

        let context = self.context.clone();
        let job = Job::new_async(schedule, move |_uuid, _lock| {
            let context = context.clone();
            Box::pin(async move {
                jobs::price_refresh_job::run(&context).await;
            })
        })
        .map_err(|e| AppError::External(format!("failed to create refresh job: {}", e)))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::External(format!("failed to schedule refresh job: {}", e)))?;

        info!("scheduled price_refresh: {}", description);

        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::External(format!("failed to start scheduler: {}", e)))?;

        Ok(())
    }
}
