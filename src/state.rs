use std::sync::Arc;

use sqlx::PgPool;

use crate::services::market_data_service::MarketDataService;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub market_data: Arc<MarketDataService>,
    pub lookup_concurrency: usize,
}
