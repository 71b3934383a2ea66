use bigdecimal::{BigDecimal, One};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::models::{Conversion, Currency, Holding, RefreshReport, ValuedHolding};
use crate::services::market_data_service::MarketDataService;

/// Outcome of pricing one holding for a refresh pass.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Updated {
        current_value: BigDecimal,
        price: BigDecimal,
    },
    Skipped,
    Failed,
}

/// Market value of a tracked holding: (price, price × shares).
/// None when the holding is not tracked, lacks symbol or shares, or the
/// lookup came back unavailable; callers fall back to the stored amount.
async fn market_value(
    market: &MarketDataService,
    holding: &Holding,
) -> Option<(BigDecimal, BigDecimal)> {
    if !holding.market_tracked {
        return None;
    }
    let symbol = holding.symbol.as_deref()?;
    let shares = holding.shares.as_ref()?;

    let price = market.market_price(holding.category, symbol).await?;
    let value = &price * shares;
    Some((price, value))
}

/// A holding's value in its own currency. Tracked holdings are priced live;
/// everything else, including tracked holdings whose lookup failed, values
/// at the stored amount so no holding ever drops out of aggregation.
pub async fn native_value(market: &MarketDataService, holding: &Holding) -> BigDecimal {
    match market_value(market, holding).await {
        Some((_, value)) => value,
        None => holding.amount.clone(),
    }
}

/// Converts an amount between currencies. An unavailable rate fails open:
/// the amount passes through unchanged with rate 1.0 and the `fallback` flag
/// set, trading accuracy for a complete summary.
pub async fn convert(
    market: &MarketDataService,
    amount: BigDecimal,
    from: Currency,
    to: Currency,
) -> Conversion {
    if from == to {
        return Conversion {
            amount,
            rate: BigDecimal::one(),
            fallback: false,
        };
    }

    match market.exchange_rate(from, to).await {
        Some(rate) => Conversion {
            amount: &amount * &rate,
            rate,
            fallback: false,
        },
        None => {
            warn!(
                "no exchange rate for {}->{}, treating amount as already in {}",
                from, to, to
            );
            Conversion {
                amount,
                rate: BigDecimal::one(),
                fallback: true,
            }
        }
    }
}

/// Native valuation followed by conversion into the requested base currency.
pub async fn value_holding(
    market: &MarketDataService,
    holding: &Holding,
    base: Currency,
) -> ValuedHolding {
    let native = native_value(market, holding).await;
    let conversion = convert(market, native.clone(), holding.currency, base).await;

    ValuedHolding {
        holding: holding.clone(),
        native_value: native,
        converted_value: conversion.amount,
        rate_used: conversion.rate,
        rate_is_fallback: conversion.fallback,
    }
}

/// Prices one holding for refresh. The snapshot stays in the holding's
/// native currency; conversion happens at read time.
pub async fn refresh_outcome(market: &MarketDataService, holding: &Holding) -> RefreshOutcome {
    if !holding.market_tracked || holding.category.quote_kind().is_none() {
        return RefreshOutcome::Skipped;
    }
    let (Some(symbol), Some(shares)) = (holding.symbol.as_deref(), holding.shares.as_ref())
    else {
        return RefreshOutcome::Skipped;
    };

    match market.market_price(holding.category, symbol).await {
        Some(price) => RefreshOutcome::Updated {
            current_value: &price * shares,
            price,
        },
        None => RefreshOutcome::Failed,
    }
}

/// Refreshes the market-value snapshot of many holdings.
///
/// Lookups fan out with bounded parallelism and no ordering dependency; a
/// failed or slow lookup degrades that holding only. Only the
/// `current_value`/`price_updated_at` snapshot columns are written; the
/// stored amount is the historical record and is never touched.
pub async fn refresh_holdings(
    pool: &PgPool,
    market: &MarketDataService,
    holdings: &[Holding],
    concurrency: usize,
) -> Result<RefreshReport, AppError> {
    // Build the lookup futures in a plain loop rather than an iterator `.map`
    // closure. A closure `|h| refresh_outcome(market, h)` must satisfy
    // `for<'a> FnOnce(&'a Holding)`, which the trait solver can't prove once the
    // resulting stream future is also required to be `Send` (in an axum handler
    // or a scheduled job) — the well-known "FnOnce is not general enough" HRTB
    // limitation. A Vec of futures carries one concrete lifetime, so no
    // higher-ranked bound arises. `buffered` preserves input order (lookups
    // still run `concurrency` at a time), so results zip back onto `holdings`.
    let mut futs = Vec::with_capacity(holdings.len());
    for holding in holdings {
        futs.push(refresh_outcome(market, holding));
    }
    let results = stream::iter(futs)
        .buffered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await;
    let outcomes = holdings.iter().zip(results);

    let mut report = RefreshReport::default();
    let now = Utc::now();

    for (holding, outcome) in outcomes {
        match outcome {
            RefreshOutcome::Updated { current_value, .. } => {
                match db::holding_queries::update_current_value(
                    pool,
                    holding.id,
                    &current_value,
                    now,
                )
                .await
                {
                    Ok(()) => {
                        info!(
                            "✓ refreshed {} ({}): {} {}",
                            holding.name,
                            holding.symbol.as_deref().unwrap_or("-"),
                            current_value,
                            holding.currency
                        );
                        report.updated += 1;
                    }
                    Err(e) => {
                        error!("failed to persist snapshot for {}: {}", holding.id, e);
                        report.failed += 1;
                    }
                }
            }
            RefreshOutcome::Skipped => report.skipped += 1,
            RefreshOutcome::Failed => {
                warn!(
                    "✗ no price for {} ({})",
                    holding.name,
                    holding.symbol.as_deref().unwrap_or("-")
                );
                report.failed += 1;
            }
        }
    }

    info!(
        "price refresh done: {} updated, {} failed, {} skipped",
        report.updated, report.failed, report.skipped
    );
    Ok(report)
}

/// Refreshes all of a device's assets, or an explicit subset by id.
pub async fn refresh_for_device(
    pool: &PgPool,
    market: &MarketDataService,
    device_id: &str,
    ids: Option<&[Uuid]>,
    concurrency: usize,
) -> Result<RefreshReport, AppError> {
    let user = db::user_queries::get_or_create(pool, device_id).await?;

    let holdings = match ids {
        Some(ids) => db::holding_queries::fetch_by_ids(pool, user.id, ids).await?,
        None => {
            db::holding_queries::fetch_for_user(
                pool,
                user.id,
                Some(crate::models::HoldingKind::Asset),
            )
            .await?
        }
    };

    refresh_holdings(pool, market, &holdings, concurrency).await
}

/// Refreshes a single holding; NotFound when it does not belong to the
/// device.
pub async fn refresh_single(
    pool: &PgPool,
    market: &MarketDataService,
    device_id: &str,
    id: Uuid,
) -> Result<RefreshReport, AppError> {
    let user = db::user_queries::get_or_create(pool, device_id).await?;
    let holding = db::holding_queries::fetch_one(pool, id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("holding {}", id)))?;

    refresh_holdings(pool, market, std::slice::from_ref(&holding), 1).await
}
