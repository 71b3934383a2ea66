use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::models::{CreateHolding, Holding, HoldingKind, UpdateHolding};

// The market-tracked invariant lives here so it holds no matter which route
// the write came through: tracked holdings need a symbol, a share count and
// a category with a quote endpoint, and only assets can be tracked.
fn validate(holding: &Holding) -> Result<(), AppError> {
    if !holding.category.valid_for(holding.kind) {
        return Err(AppError::Validation(format!(
            "category '{}' is not valid for {} holdings",
            holding.category, holding.kind
        )));
    }

    if holding.market_tracked {
        if holding.kind == HoldingKind::Credit {
            return Err(AppError::Validation(
                "credits cannot be market-tracked".into(),
            ));
        }
        if holding.symbol.as_deref().map_or(true, |s| s.trim().is_empty()) {
            return Err(AppError::Validation(
                "market-tracked holdings require a symbol".into(),
            ));
        }
        if holding.shares.is_none() {
            return Err(AppError::Validation(
                "market-tracked holdings require a share count".into(),
            ));
        }
        if holding.category.quote_kind().is_none() {
            return Err(AppError::Validation(format!(
                "category '{}' has no market quote; only stock, crypto, gold and silver can be tracked",
                holding.category
            )));
        }
    }

    if holding.name.trim().is_empty() {
        return Err(AppError::Validation("holding name cannot be empty".into()));
    }

    Ok(())
}

pub async fn create(
    pool: &PgPool,
    device_id: &str,
    kind: HoldingKind,
    input: CreateHolding,
) -> Result<Holding, AppError> {
    let user = db::user_queries::get_or_create(pool, device_id).await?;

    let holding = Holding::new(user.id, kind, input);
    validate(&holding)?;

    db::holding_queries::insert(pool, &holding).await?;
    info!("created {} {} for user {}", kind, holding.id, user.id);
    Ok(holding)
}

pub async fn fetch_one(
    pool: &PgPool,
    device_id: &str,
    id: Uuid,
) -> Result<Holding, AppError> {
    let user = db::user_queries::get_or_create(pool, device_id).await?;

    db::holding_queries::fetch_one(pool, id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("holding {}", id)))
}

pub async fn update(
    pool: &PgPool,
    device_id: &str,
    id: Uuid,
    input: UpdateHolding,
) -> Result<Holding, AppError> {
    let user = db::user_queries::get_or_create(pool, device_id).await?;

    let mut holding = db::holding_queries::fetch_one(pool, id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("holding {}", id)))?;

    holding.apply_update(input);
    validate(&holding)?;

    db::holding_queries::update(pool, &holding).await?;
    info!("updated holding {}", id);
    Ok(holding)
}

pub async fn delete(pool: &PgPool, device_id: &str, id: Uuid) -> Result<(), AppError> {
    let user = db::user_queries::get_or_create(pool, device_id).await?;

    match db::holding_queries::delete(pool, id, user.id).await? {
        0 => Err(AppError::NotFound(format!("holding {}", id))),
        _ => {
            info!("deleted holding {}", id);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Currency};
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn holding(kind: HoldingKind, category: Category) -> Holding {
        Holding::new(
            Uuid::new_v4(),
            kind,
            CreateHolding {
                name: "test".into(),
                category,
                amount: BigDecimal::from_str("100").unwrap(),
                currency: Currency::Usd,
                symbol: None,
                shares: None,
                market_tracked: false,
                notes: None,
                acquired_on: None,
            },
        )
    }

    #[test]
    fn test_untracked_holding_is_valid() {
        let h = holding(HoldingKind::Asset, Category::Cash);
        assert!(validate(&h).is_ok());
    }

    #[test]
    fn test_category_must_match_kind() {
        let h = holding(HoldingKind::Asset, Category::CreditCard);
        assert!(validate(&h).is_err());

        let h = holding(HoldingKind::Credit, Category::Stock);
        assert!(validate(&h).is_err());
    }

    #[test]
    fn test_tracked_holding_requires_symbol_and_shares() {
        let mut h = holding(HoldingKind::Asset, Category::Stock);
        h.market_tracked = true;
        assert!(validate(&h).is_err());

        h.symbol = Some("AAPL".into());
        assert!(validate(&h).is_err());

        h.shares = Some(BigDecimal::from_str("3").unwrap());
        assert!(validate(&h).is_ok());
    }

    #[test]
    fn test_tracked_holding_requires_quotable_category() {
        let mut h = holding(HoldingKind::Asset, Category::RealEstate);
        h.market_tracked = true;
        h.symbol = Some("HOME".into());
        h.shares = Some(BigDecimal::from_str("1").unwrap());
        assert!(validate(&h).is_err());
    }

    #[test]
    fn test_credits_are_never_tracked() {
        let mut h = holding(HoldingKind::Credit, Category::Loan);
        h.market_tracked = true;
        h.symbol = Some("X".into());
        h.shares = Some(BigDecimal::from_str("1").unwrap());
        assert!(validate(&h).is_err());
    }
}
