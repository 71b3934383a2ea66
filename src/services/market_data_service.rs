use std::future::Future;
use std::sync::Arc;

use bigdecimal::{BigDecimal, One};
use chrono::Duration;
use tracing::{debug, warn};

use crate::external::price_source::{PriceSource, PriceSourceError};
use crate::models::{Category, Commodity, Currency, QuoteKind};
use crate::services::quote_cache::{self, QuoteCache};

/// Cache-then-source quote lookups.
///
/// Every lookup returns `Option<BigDecimal>`: a provider failure of any kind
/// is logged here and collapses to `None`, so callers only ever see
/// "unavailable" and fall back per their own policy. Market prices and FX
/// rates carry distinct TTLs; both default to a day to conserve provider
/// quota.
pub struct MarketDataService {
    source: Arc<dyn PriceSource>,
    cache: QuoteCache,
    price_ttl: Duration,
    fx_ttl: Duration,
}

impl MarketDataService {
    pub fn new(source: Arc<dyn PriceSource>, price_ttl: Duration, fx_ttl: Duration) -> Self {
        Self {
            source,
            cache: QuoteCache::new(),
            price_ttl,
            fx_ttl,
        }
    }

    pub async fn stock_price(&self, symbol: &str) -> Option<BigDecimal> {
        self.cached(
            quote_cache::stock_key(symbol),
            self.price_ttl,
            self.source.stock_price(symbol),
        )
        .await
    }

    pub async fn crypto_price(&self, symbol: &str) -> Option<BigDecimal> {
        self.cached(
            quote_cache::crypto_key(symbol),
            self.price_ttl,
            self.source.crypto_price(symbol),
        )
        .await
    }

    pub async fn commodity_price(&self, commodity: Commodity) -> Option<BigDecimal> {
        self.cached(
            quote_cache::commodity_key(commodity),
            self.price_ttl,
            self.source.commodity_price(commodity),
        )
        .await
    }

    /// Same-currency pairs short-circuit to 1.0 without touching the cache
    /// or the provider.
    pub async fn exchange_rate(&self, from: Currency, to: Currency) -> Option<BigDecimal> {
        if from == to {
            return Some(BigDecimal::one());
        }
        self.cached(
            quote_cache::fx_key(from, to),
            self.fx_ttl,
            self.source.exchange_rate(from, to),
        )
        .await
    }

    /// Price for a market-tracked category, dispatched to the category's
    /// quote endpoint. Commodity categories quote by metal, not by the
    /// holding's symbol.
    pub async fn market_price(&self, category: Category, symbol: &str) -> Option<BigDecimal> {
        match category.quote_kind()? {
            QuoteKind::Stock => self.stock_price(symbol).await,
            QuoteKind::Crypto => self.crypto_price(symbol).await,
            QuoteKind::Commodity(commodity) => self.commodity_price(commodity).await,
        }
    }

    async fn cached<F>(&self, key: String, ttl: Duration, fetch: F) -> Option<BigDecimal>
    where
        F: Future<Output = Result<BigDecimal, PriceSourceError>>,
    {
        if let Some(value) = self.cache.get(&key) {
            debug!("cache hit for {}", key);
            return Some(value);
        }

        match fetch.await {
            Ok(value) => {
                self.cache.set(&key, value.clone(), ttl);
                Some(value)
            }
            Err(err) => {
                warn!("quote lookup failed for {}: {}", key, err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves a fixed price for every query and counts provider calls.
    struct FixedSource {
        price: Option<BigDecimal>,
        calls: AtomicUsize,
    }

    impl FixedSource {
        fn new(price: Option<&str>) -> Self {
            Self {
                price: price.map(|p| BigDecimal::from_str(p).unwrap()),
                calls: AtomicUsize::new(0),
            }
        }

        fn answer(&self) -> Result<BigDecimal, PriceSourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.price
                .clone()
                .ok_or_else(|| PriceSourceError::NotFound("scripted miss".into()))
        }
    }

    #[async_trait]
    impl PriceSource for FixedSource {
        async fn stock_price(&self, _symbol: &str) -> Result<BigDecimal, PriceSourceError> {
            self.answer()
        }

        async fn crypto_price(&self, _symbol: &str) -> Result<BigDecimal, PriceSourceError> {
            self.answer()
        }

        async fn commodity_price(
            &self,
            _commodity: Commodity,
        ) -> Result<BigDecimal, PriceSourceError> {
            self.answer()
        }

        async fn exchange_rate(
            &self,
            _from: Currency,
            _to: Currency,
        ) -> Result<BigDecimal, PriceSourceError> {
            self.answer()
        }
    }

    fn service(source: Arc<FixedSource>) -> MarketDataService {
        MarketDataService::new(source, Duration::hours(24), Duration::hours(24))
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let source = Arc::new(FixedSource::new(Some("200")));
        let market = service(source.clone());

        let first = market.stock_price("AAPL").await;
        let second = market.stock_price("AAPL").await;

        assert_eq!(first, second);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_same_currency_rate_never_calls_source() {
        let source = Arc::new(FixedSource::new(Some("7")));
        let market = service(source.clone());

        let rate = market.exchange_rate(Currency::Usd, Currency::Usd).await;

        assert_eq!(rate, Some(BigDecimal::one()));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_source_failure_collapses_to_none() {
        let source = Arc::new(FixedSource::new(None));
        let market = service(source.clone());

        assert_eq!(market.stock_price("GHOST").await, None);
        // failures are not cached; the next lookup retries the source
        assert_eq!(market.stock_price("GHOST").await, None);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_market_price_requires_tracked_category() {
        let source = Arc::new(FixedSource::new(Some("100")));
        let market = service(source.clone());

        assert_eq!(market.market_price(Category::Cash, "AAPL").await, None);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);

        assert!(market.market_price(Category::Stock, "AAPL").await.is_some());
    }
}
