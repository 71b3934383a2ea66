pub(crate) mod assets;
pub(crate) mod credits;
pub(crate) mod health;
pub(crate) mod market_data;
pub(crate) mod metadata;
pub(crate) mod portfolio;

use http::HeaderMap;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::Currency;

/// Every user-scoped route identifies its caller by this header.
pub(crate) fn device_id(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get("x-device-id")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Validation("missing X-Device-Id header".into()))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ValuationQuery {
    pub base_currency: Option<String>,
}

pub(crate) fn parse_base_currency(raw: Option<&str>) -> Result<Currency, AppError> {
    match raw {
        None => Ok(Currency::Usd),
        Some(code) => code.parse().map_err(AppError::Validation),
    }
}
