use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use http::HeaderMap;
use tracing::info;

use crate::errors::AppError;
use crate::models::PortfolioSummary;
use crate::routes::{device_id, parse_base_currency, ValuationQuery};
use crate::services::portfolio_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/summary", get(summary))
}

async fn summary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ValuationQuery>,
) -> Result<Json<PortfolioSummary>, AppError> {
    let device = device_id(&headers)?;
    let base = parse_base_currency(query.base_currency.as_deref())?;
    info!("GET /portfolio/summary in {}", base);
    let summary = portfolio_service::summary_for_device(
        &state.pool,
        &state.market_data,
        device,
        base,
        state.lookup_concurrency,
    )
    .await?;
    Ok(Json(summary))
}
