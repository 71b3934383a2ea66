use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::models::{Category, Currency, Holding};

/// Result of converting an amount between currencies. `fallback` is true when
/// no rate was available and 1.0 was substituted, so callers can tell a real
/// 1.0 rate from a degraded one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub amount: BigDecimal,
    pub rate: BigDecimal,
    pub fallback: bool,
}

/// A holding with its native and base-currency valuation attached.
#[derive(Debug, Clone, Serialize)]
pub struct ValuedHolding {
    #[serde(flatten)]
    pub holding: Holding,
    pub native_value: BigDecimal,
    pub converted_value: BigDecimal,
    pub rate_used: BigDecimal,
    pub rate_is_fallback: bool,
}

#[derive(Debug, Default, Serialize)]
pub struct CategoryGroup {
    pub items: Vec<ValuedHolding>,
    pub total_amount: BigDecimal,
    pub count: usize,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct CategoryTotal {
    pub total_amount: BigDecimal,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct PortfolioSummary {
    pub base_currency: Currency,
    pub asset_summary: HashMap<Category, CategoryTotal>,
    pub credit_summary: HashMap<Category, CategoryTotal>,
    pub total_assets: BigDecimal,
    pub total_credits: BigDecimal,
    pub net_worth: BigDecimal,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub updated: usize,
    pub failed: usize,
    pub skipped: usize,
}

#[derive(Debug, Serialize)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
}

impl CurrencyInfo {
    pub fn all() -> Vec<CurrencyInfo> {
        Currency::ALL
            .iter()
            .map(|c| CurrencyInfo {
                code: c.code(),
                name: c.display_name(),
                symbol: c.sign(),
            })
            .collect()
    }
}
