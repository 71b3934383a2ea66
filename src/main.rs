use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use moneta_backend::app;
use moneta_backend::config::Settings;
use moneta_backend::external::alphavantage::AlphaVantageSource;
use moneta_backend::logging::{self, LoggingConfig};
use moneta_backend::services::job_scheduler_service::{JobContext, JobSchedulerService};
use moneta_backend::services::market_data_service::MarketDataService;
use moneta_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    logging::init_logging(LoggingConfig::from_env())?;

    let settings = Settings::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&settings.database_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;

    let source = Arc::new(AlphaVantageSource::new(
        &settings.alpha_vantage_base_url,
        &settings.alpha_vantage_api_key,
        settings.request_timeout(),
    )?);
    let market_data = Arc::new(MarketDataService::new(
        source,
        settings.price_ttl(),
        settings.fx_ttl(),
    ));

    // Held for the lifetime of the process; dropping it would stop the jobs.
    let mut scheduler = None;
    if settings.scheduler_enabled {
        let mut service = JobSchedulerService::new(JobContext {
            pool: pool.clone(),
            market_data: market_data.clone(),
            refresh_concurrency: settings.refresh_concurrency,
        })
        .await?;
        service.start().await?;
        scheduler = Some(service);
    }

    let state = AppState {
        pool,
        market_data,
        lookup_concurrency: settings.refresh_concurrency,
    };
    let app = app::create_app(state);

    let addr: SocketAddr = settings.bind_addr.parse()?;
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 moneta backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    drop(scheduler);
    Ok(())
}
