use async_trait::async_trait;
use bigdecimal::BigDecimal;
use thiserror::Error;

use crate::models::{Commodity, Currency};

#[derive(Debug, Error)]
pub enum PriceSourceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,

    #[error("no quote for {0}")]
    NotFound(String),
}

/// One current value per call from an external market-data provider.
///
/// Implementations report every provider problem as a `PriceSourceError`;
/// the market data service collapses those to "unavailable" so nothing past
/// that boundary ever sees a provider failure.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Latest trade price for an equity symbol, in the listing currency.
    async fn stock_price(&self, symbol: &str) -> Result<BigDecimal, PriceSourceError>;

    /// Spot price for a crypto symbol, quoted against USD.
    async fn crypto_price(&self, symbol: &str) -> Result<BigDecimal, PriceSourceError>;

    /// Spot price for a precious metal, quoted against USD per troy ounce.
    async fn commodity_price(&self, commodity: Commodity)
        -> Result<BigDecimal, PriceSourceError>;

    async fn exchange_rate(
        &self,
        from: Currency,
        to: Currency,
    ) -> Result<BigDecimal, PriceSourceError>;
}
