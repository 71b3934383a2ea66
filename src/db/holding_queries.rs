use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::{Category, Currency, Holding, HoldingKind};

const HOLDING_COLUMNS: &str = "id, user_id, kind, name, category, amount, currency, symbol, \
     shares, market_tracked, current_value, price_updated_at, notes, acquired_on, \
     created_at, updated_at";

// TEXT-encoded row shape. The enum codec lives at this boundary so the
// engine only ever sees the closed types.
#[derive(Debug, FromRow)]
struct HoldingRow {
    id: Uuid,
    user_id: Uuid,
    kind: String,
    name: String,
    category: String,
    amount: BigDecimal,
    currency: String,
    symbol: Option<String>,
    shares: Option<BigDecimal>,
    market_tracked: bool,
    current_value: Option<BigDecimal>,
    price_updated_at: Option<DateTime<Utc>>,
    notes: Option<String>,
    acquired_on: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn decode_err(msg: String) -> sqlx::Error {
    sqlx::Error::Decode(msg.into())
}

impl TryFrom<HoldingRow> for Holding {
    type Error = sqlx::Error;

    fn try_from(row: HoldingRow) -> Result<Self, Self::Error> {
        let kind = row.kind.parse::<HoldingKind>().map_err(decode_err)?;
        let currency = row.currency.parse::<Currency>().map_err(decode_err)?;
        // Unknown category strings group under `other` instead of failing
        // the row.
        let category = row.category.parse::<Category>().unwrap_or(Category::Other);

        Ok(Holding {
            id: row.id,
            user_id: row.user_id,
            kind,
            name: row.name,
            category,
            amount: row.amount,
            currency,
            symbol: row.symbol,
            shares: row.shares,
            market_tracked: row.market_tracked,
            current_value: row.current_value,
            price_updated_at: row.price_updated_at,
            notes: row.notes,
            acquired_on: row.acquired_on,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_holdings(rows: Vec<HoldingRow>) -> Result<Vec<Holding>, sqlx::Error> {
    rows.into_iter().map(Holding::try_from).collect()
}

pub async fn insert(pool: &PgPool, holding: &Holding) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO holdings (id, user_id, kind, name, category, amount, currency, symbol, \
         shares, market_tracked, current_value, price_updated_at, notes, acquired_on, \
         created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
    )
    .bind(holding.id)
    .bind(holding.user_id)
    .bind(holding.kind.as_str())
    .bind(&holding.name)
    .bind(holding.category.as_str())
    .bind(&holding.amount)
    .bind(holding.currency.code())
    .bind(&holding.symbol)
    .bind(&holding.shares)
    .bind(holding.market_tracked)
    .bind(&holding.current_value)
    .bind(holding.price_updated_at)
    .bind(&holding.notes)
    .bind(holding.acquired_on)
    .bind(holding.created_at)
    .bind(holding.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn fetch_one(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<Holding>, sqlx::Error> {
    let row = sqlx::query_as::<_, HoldingRow>(&format!(
        "SELECT {} FROM holdings WHERE id = $1 AND user_id = $2",
        HOLDING_COLUMNS
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    row.map(Holding::try_from).transpose()
}

pub async fn fetch_for_user(
    pool: &PgPool,
    user_id: Uuid,
    kind: Option<HoldingKind>,
) -> Result<Vec<Holding>, sqlx::Error> {
    let rows = match kind {
        Some(kind) => {
            sqlx::query_as::<_, HoldingRow>(&format!(
                "SELECT {} FROM holdings WHERE user_id = $1 AND kind = $2 \
                 ORDER BY created_at DESC",
                HOLDING_COLUMNS
            ))
            .bind(user_id)
            .bind(kind.as_str())
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, HoldingRow>(&format!(
                "SELECT {} FROM holdings WHERE user_id = $1 ORDER BY created_at DESC",
                HOLDING_COLUMNS
            ))
            .bind(user_id)
            .fetch_all(pool)
            .await?
        }
    };

    into_holdings(rows)
}

pub async fn fetch_by_ids(
    pool: &PgPool,
    user_id: Uuid,
    ids: &[Uuid],
) -> Result<Vec<Holding>, sqlx::Error> {
    let rows = sqlx::query_as::<_, HoldingRow>(&format!(
        "SELECT {} FROM holdings WHERE user_id = $1 AND id = ANY($2)",
        HOLDING_COLUMNS
    ))
    .bind(user_id)
    .bind(ids)
    .fetch_all(pool)
    .await?;

    into_holdings(rows)
}

/// All market-tracked holdings across users, for the nightly refresh job.
pub async fn fetch_market_tracked(pool: &PgPool) -> Result<Vec<Holding>, sqlx::Error> {
    let rows = sqlx::query_as::<_, HoldingRow>(&format!(
        "SELECT {} FROM holdings WHERE market_tracked ORDER BY created_at",
        HOLDING_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    into_holdings(rows)
}

pub async fn update(pool: &PgPool, holding: &Holding) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE holdings
         SET name = $3, category = $4, amount = $5, currency = $6, symbol = $7, shares = $8, \
             market_tracked = $9, notes = $10, acquired_on = $11, updated_at = $12
         WHERE id = $1 AND user_id = $2",
    )
    .bind(holding.id)
    .bind(holding.user_id)
    .bind(&holding.name)
    .bind(holding.category.as_str())
    .bind(&holding.amount)
    .bind(holding.currency.code())
    .bind(&holding.symbol)
    .bind(&holding.shares)
    .bind(holding.market_tracked)
    .bind(&holding.notes)
    .bind(holding.acquired_on)
    .bind(holding.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Overwrites only the derived market snapshot; the stored amount and every
/// other column stay untouched.
pub async fn update_current_value(
    pool: &PgPool,
    id: Uuid,
    current_value: &BigDecimal,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE holdings SET current_value = $2, price_updated_at = $3 WHERE id = $1",
    )
    .bind(id)
    .bind(current_value)
    .bind(at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM holdings WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
