use tracing::{error, info};

use crate::db;
use crate::services::job_scheduler_service::JobContext;
use crate::services::valuation_service;

/// Nightly snapshot refresh for every market-tracked holding, across all
/// users. Runs the same fan-out as the on-demand refresh endpoints; with the
/// day-long quote TTLs this warms the cache before the morning traffic.
pub async fn run(context: &JobContext) {
    info!("🌙 nightly price refresh starting");

    let holdings = match db::holding_queries::fetch_market_tracked(&context.pool).await {
        Ok(holdings) => holdings,
        Err(e) => {
            error!("failed to load market-tracked holdings: {}", e);
            return;
        }
    };

    if holdings.is_empty() {
        info!("no market-tracked holdings to refresh");
        return;
    }

    match valuation_service::refresh_holdings(
        &context.pool,
        &context.market_data,
        &holdings,
        context.refresh_concurrency,
    )
    .await
    {
        Ok(report) => info!(
            "✓ nightly refresh done: {} updated, {} failed, {} skipped",
            report.updated, report.failed, report.skipped
        ),
        Err(e) => error!("nightly refresh failed: {}", e),
    }
}
