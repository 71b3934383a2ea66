use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::models::{Commodity, Currency};

#[derive(Debug, Clone)]
struct CachedQuote {
    value: BigDecimal,
    expires_at: DateTime<Utc>,
}

/// Thread-safe TTL cache for market prices and exchange rates.
/// Keys are deterministic, so identical lookups from concurrent requests
/// collide on one entry; writes are last-write-wins. There is no eviction
/// beyond TTL expiry, since the key space is bounded by the symbols and
/// currency pairs actually in use.
#[derive(Clone, Default)]
pub struct QuoteCache {
    entries: Arc<DashMap<String, CachedQuote>>,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Returns the cached value only while it is unexpired. Expired entries
    /// are dropped on observation.
    pub fn get(&self, key: &str) -> Option<BigDecimal> {
        if let Some(entry) = self.entries.get(key) {
            let quote = entry.value().clone();
            if Utc::now() < quote.expires_at {
                return Some(quote.value);
            }
            drop(entry); // release the read lock before removing
            self.entries.remove(key);
        }
        None
    }

    pub fn set(&self, key: &str, value: BigDecimal, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            CachedQuote {
                value,
                expires_at: Utc::now() + ttl,
            },
        );
    }

    #[allow(dead_code)]
    pub fn purge_expired(&self) {
        let now = Utc::now();
        self.entries.retain(|_, quote| now < quote.expires_at);
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn stock_key(symbol: &str) -> String {
    format!("stock_price:{}", symbol)
}

pub fn crypto_key(symbol: &str) -> String {
    format!("crypto_price:{}", symbol)
}

pub fn commodity_key(commodity: Commodity) -> String {
    format!("commodity_price:{}", commodity.name())
}

pub fn fx_key(from: Currency, to: Currency) -> String {
    format!("exchange_rate:{}_{}", from.code(), to.code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_cache_stores_and_returns_values() {
        let cache = QuoteCache::new();

        cache.set("stock_price:AAPL", dec("200.14"), Duration::hours(24));

        assert_eq!(cache.get("stock_price:AAPL"), Some(dec("200.14")));
        assert_eq!(cache.get("stock_price:TSLA"), None);
    }

    #[test]
    fn test_expired_entries_are_dropped() {
        let cache = QuoteCache::new();

        cache.set("exchange_rate:EUR_USD", dec("1.1"), Duration::seconds(-1));

        assert_eq!(cache.get("exchange_rate:EUR_USD"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_set_overwrites_prior_entry() {
        let cache = QuoteCache::new();

        cache.set("crypto_price:BTC", dec("60000"), Duration::hours(1));
        cache.set("crypto_price:BTC", dec("61000"), Duration::hours(1));

        assert_eq!(cache.get("crypto_price:BTC"), Some(dec("61000")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_purge_expired_keeps_live_entries() {
        let cache = QuoteCache::new();

        cache.set("a", dec("1"), Duration::seconds(-1));
        cache.set("b", dec("2"), Duration::hours(1));

        cache.purge_expired();

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("b"), Some(dec("2")));
    }

    #[test]
    fn test_key_builders_are_deterministic() {
        assert_eq!(stock_key("AAPL"), "stock_price:AAPL");
        assert_eq!(crypto_key("BTC"), "crypto_price:BTC");
        assert_eq!(commodity_key(Commodity::Gold), "commodity_price:gold");
        assert_eq!(
            fx_key(Currency::Eur, Currency::Cny),
            "exchange_rate:EUR_CNY"
        );
        // direction matters for FX pairs
        assert_ne!(
            fx_key(Currency::Eur, Currency::Usd),
            fx_key(Currency::Usd, Currency::Eur)
        );
    }
}
