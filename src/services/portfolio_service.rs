use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use sqlx::PgPool;
use tracing::error;

use crate::db;
use crate::errors::AppError;
use crate::models::{
    Category, CategoryGroup, CategoryTotal, Currency, Holding, HoldingKind, PortfolioSummary,
    ValuedHolding,
};
use crate::services::market_data_service::MarketDataService;
use crate::services::valuation_service;

/// Values every holding concurrently, preserving input order. The fan-in
/// completes before anything is returned; a summary is never partial.
async fn value_all(
    market: &MarketDataService,
    holdings: &[Holding],
    base: Currency,
    concurrency: usize,
) -> Vec<ValuedHolding> {
    // Build futures in a plain loop, not an iterator `.map` closure: the
    // closure would need `for<'a> FnOnce(&'a Holding)`, unprovable once the
    // stream future must also be `Send` in an axum handler (the "FnOnce is not
    // general enough" HRTB limitation). A Vec of futures carries one concrete
    // lifetime, so no higher-ranked bound arises.
    let mut futs = Vec::with_capacity(holdings.len());
    for holding in holdings {
        futs.push(valuation_service::value_holding(market, holding, base));
    }
    stream::iter(futs).buffered(concurrency.max(1)).collect().await
}

/// Buckets holdings by category with per-bucket totals in the base currency.
/// Summation is decimal and commutative, so the result is independent of
/// lookup completion order.
pub async fn group_by_category(
    market: &MarketDataService,
    holdings: &[Holding],
    base: Currency,
    concurrency: usize,
) -> HashMap<Category, CategoryGroup> {
    let valued = value_all(market, holdings, base, concurrency).await;

    let mut groups: HashMap<Category, CategoryGroup> = HashMap::new();
    for item in valued {
        let group = groups.entry(item.holding.category).or_default();
        group.total_amount += item.converted_value.clone();
        group.count += 1;
        group.items.push(item);
    }
    groups
}

fn fold_totals(valued: &[ValuedHolding]) -> (HashMap<Category, CategoryTotal>, BigDecimal) {
    let mut summary: HashMap<Category, CategoryTotal> = HashMap::new();
    let mut total = BigDecimal::default();

    for item in valued {
        let entry = summary.entry(item.holding.category).or_default();
        entry.total_amount += item.converted_value.clone();
        entry.count += 1;
        total += item.converted_value.clone();
    }
    (summary, total)
}

/// Net worth and per-category totals for a full holding set, everything in
/// the requested base currency. Holdings whose price or rate was unavailable
/// participate through their fallback values rather than being dropped.
pub async fn summarize(
    market: &MarketDataService,
    assets: &[Holding],
    credits: &[Holding],
    base: Currency,
    concurrency: usize,
) -> PortfolioSummary {
    let valued_assets = value_all(market, assets, base, concurrency).await;
    let valued_credits = value_all(market, credits, base, concurrency).await;

    let (asset_summary, total_assets) = fold_totals(&valued_assets);
    let (credit_summary, total_credits) = fold_totals(&valued_credits);

    let net_worth = &total_assets - &total_credits;

    PortfolioSummary {
        base_currency: base,
        asset_summary,
        credit_summary,
        total_assets,
        total_credits,
        net_worth,
        computed_at: Utc::now(),
    }
}

/// Grouped-and-valued view of one kind of holding for a device.
pub async fn grouped_for_device(
    pool: &PgPool,
    market: &MarketDataService,
    device_id: &str,
    kind: HoldingKind,
    base: Currency,
    concurrency: usize,
) -> Result<HashMap<Category, CategoryGroup>, AppError> {
    let user = db::user_queries::get_or_create(pool, device_id).await?;
    let holdings = db::holding_queries::fetch_for_user(pool, user.id, Some(kind))
        .await
        .map_err(|e| {
            error!("failed to list {} holdings: {}", kind, e);
            e
        })?;

    Ok(group_by_category(market, &holdings, base, concurrency).await)
}

/// Full portfolio summary for a device.
pub async fn summary_for_device(
    pool: &PgPool,
    market: &MarketDataService,
    device_id: &str,
    base: Currency,
    concurrency: usize,
) -> Result<PortfolioSummary, AppError> {
    let user = db::user_queries::get_or_create(pool, device_id).await?;

    let assets =
        db::holding_queries::fetch_for_user(pool, user.id, Some(HoldingKind::Asset)).await?;
    let credits =
        db::holding_queries::fetch_for_user(pool, user.id, Some(HoldingKind::Credit)).await?;

    Ok(summarize(market, &assets, &credits, base, concurrency).await)
}
