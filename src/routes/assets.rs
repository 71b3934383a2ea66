use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use http::HeaderMap;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Category, CategoryGroup, CreateHolding, Holding, HoldingKind, UpdateHolding};
use crate::routes::{device_id, parse_base_currency, ValuationQuery};
use crate::services::{holding_service, portfolio_service};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_asset).get(list_assets))
        .route("/:id", get(get_asset).put(update_asset).delete(delete_asset))
}

#[axum::debug_handler]
async fn create_asset(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreateHolding>,
) -> Result<Json<Holding>, AppError> {
    let device = device_id(&headers)?;
    info!("POST /assets - creating asset");
    let holding = holding_service::create(&state.pool, device, HoldingKind::Asset, input)
        .await
        .map_err(|e| {
            error!("failed to create asset: {}", e);
            e
        })?;
    Ok(Json(holding))
}

async fn list_assets(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ValuationQuery>,
) -> Result<Json<HashMap<Category, CategoryGroup>>, AppError> {
    let device = device_id(&headers)?;
    let base = parse_base_currency(query.base_currency.as_deref())?;
    info!("GET /assets - grouped view in {}", base);
    let groups = portfolio_service::grouped_for_device(
        &state.pool,
        &state.market_data,
        device,
        HoldingKind::Asset,
        base,
        state.lookup_concurrency,
    )
    .await?;
    Ok(Json(groups))
}

async fn get_asset(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Holding>, AppError> {
    let device = device_id(&headers)?;
    info!("GET /assets/{}", id);
    let holding = holding_service::fetch_one(&state.pool, device, id).await?;
    Ok(Json(holding))
}

async fn update_asset(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateHolding>,
) -> Result<Json<Holding>, AppError> {
    let device = device_id(&headers)?;
    info!("PUT /assets/{}", id);
    let holding = holding_service::update(&state.pool, device, id, input)
        .await
        .map_err(|e| {
            error!("failed to update asset {}: {}", id, e);
            e
        })?;
    Ok(Json(holding))
}

async fn delete_asset(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<()>, AppError> {
    let device = device_id(&headers)?;
    info!("DELETE /assets/{}", id);
    holding_service::delete(&state.pool, device, id).await?;
    Ok(Json(()))
}
