use axum::Router;
use tower_http::cors::CorsLayer;

use crate::routes::{assets, credits, health, market_data, metadata, portfolio};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/assets", assets::router())
        .nest("/api/credits", credits::router())
        .nest("/api/portfolio", portfolio::router())
        .nest("/api/market-data", market_data::router())
        .nest("/api/metadata", metadata::router())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
