use axum::routing::get;
use axum::{Json, Router};

use crate::models::{Category, CurrencyInfo};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/currencies", get(currencies))
        .route("/asset-categories", get(asset_categories))
        .route("/credit-categories", get(credit_categories))
}

async fn currencies() -> Json<Vec<CurrencyInfo>> {
    Json(CurrencyInfo::all())
}

async fn asset_categories() -> Json<Vec<&'static str>> {
    Json(
        Category::ASSET_CATEGORIES
            .iter()
            .map(|c| c.as_str())
            .collect(),
    )
}

async fn credit_categories() -> Json<Vec<&'static str>> {
    Json(
        Category::CREDIT_CATEGORIES
            .iter()
            .map(|c| c.as_str())
            .collect(),
    )
}
