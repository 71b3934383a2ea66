use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use http::HeaderMap;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::RefreshReport;
use crate::routes::device_id;
use crate::services::valuation_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/refresh-prices", post(refresh_all))
        .route("/refresh-prices/holdings", post(refresh_selected))
        .route("/refresh-price/:id", post(refresh_single))
}

/// Refreshes the market snapshot of every asset the device owns.
async fn refresh_all(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshReport>, AppError> {
    let device = device_id(&headers)?;
    info!("POST /market-data/refresh-prices");
    let report = valuation_service::refresh_for_device(
        &state.pool,
        &state.market_data,
        device,
        None,
        state.lookup_concurrency,
    )
    .await?;
    Ok(Json(report))
}

async fn refresh_selected(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(ids): Json<Vec<Uuid>>,
) -> Result<Json<RefreshReport>, AppError> {
    let device = device_id(&headers)?;
    info!("POST /market-data/refresh-prices/holdings ({} ids)", ids.len());
    let report = valuation_service::refresh_for_device(
        &state.pool,
        &state.market_data,
        device,
        Some(&ids),
        state.lookup_concurrency,
    )
    .await?;
    Ok(Json(report))
}

async fn refresh_single(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<RefreshReport>, AppError> {
    let device = device_id(&headers)?;
    info!("POST /market-data/refresh-price/{}", id);
    let report =
        valuation_service::refresh_single(&state.pool, &state.market_data, device, id).await?;
    Ok(Json(report))
}
