#![allow(dead_code)]

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Duration;
use uuid::Uuid;

use moneta_backend::external::price_source::{PriceSource, PriceSourceError};
use moneta_backend::models::{
    Category, Commodity, CreateHolding, Currency, Holding, HoldingKind,
};
use moneta_backend::services::market_data_service::MarketDataService;

pub fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

/// Price source substitute scripted per key. Anything not scripted answers
/// NotFound; every provider call is counted so tests can assert on cache
/// behavior.
#[derive(Default)]
pub struct ScriptedSource {
    stocks: HashMap<String, BigDecimal>,
    cryptos: HashMap<String, BigDecimal>,
    commodities: HashMap<Commodity, BigDecimal>,
    rates: HashMap<(Currency, Currency), BigDecimal>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stock(mut self, symbol: &str, price: &str) -> Self {
        self.stocks.insert(symbol.to_string(), dec(price));
        self
    }

    #[allow(dead_code)]
    pub fn with_crypto(mut self, symbol: &str, price: &str) -> Self {
        self.cryptos.insert(symbol.to_string(), dec(price));
        self
    }

    #[allow(dead_code)]
    pub fn with_commodity(mut self, commodity: Commodity, price: &str) -> Self {
        self.commodities.insert(commodity, dec(price));
        self
    }

    pub fn with_rate(mut self, from: Currency, to: Currency, rate: &str) -> Self {
        self.rates.insert((from, to), dec(rate));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(
        &self,
        value: Option<&BigDecimal>,
        what: String,
    ) -> Result<BigDecimal, PriceSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        value.cloned().ok_or(PriceSourceError::NotFound(what))
    }
}

#[async_trait]
impl PriceSource for ScriptedSource {
    async fn stock_price(&self, symbol: &str) -> Result<BigDecimal, PriceSourceError> {
        self.answer(self.stocks.get(symbol), symbol.to_string())
    }

    async fn crypto_price(&self, symbol: &str) -> Result<BigDecimal, PriceSourceError> {
        self.answer(self.cryptos.get(symbol), symbol.to_string())
    }

    async fn commodity_price(
        &self,
        commodity: Commodity,
    ) -> Result<BigDecimal, PriceSourceError> {
        self.answer(
            self.commodities.get(&commodity),
            commodity.name().to_string(),
        )
    }

    async fn exchange_rate(
        &self,
        from: Currency,
        to: Currency,
    ) -> Result<BigDecimal, PriceSourceError> {
        self.answer(self.rates.get(&(from, to)), format!("{}/{}", from, to))
    }
}

/// Market data service over a scripted source, with day-long TTLs.
pub fn market(source: ScriptedSource) -> (Arc<ScriptedSource>, MarketDataService) {
    let source = Arc::new(source);
    let service = MarketDataService::new(
        source.clone(),
        Duration::hours(24),
        Duration::hours(24),
    );
    (source, service)
}

pub fn holding(
    kind: HoldingKind,
    category: Category,
    currency: Currency,
    amount: &str,
) -> Holding {
    Holding::new(
        Uuid::new_v4(),
        kind,
        CreateHolding {
            name: format!("{} holding", category),
            category,
            amount: dec(amount),
            currency,
            symbol: None,
            shares: None,
            market_tracked: false,
            notes: None,
            acquired_on: None,
        },
    )
}

pub fn asset(category: Category, currency: Currency, amount: &str) -> Holding {
    holding(HoldingKind::Asset, category, currency, amount)
}

pub fn credit(category: Category, currency: Currency, amount: &str) -> Holding {
    holding(HoldingKind::Credit, category, currency, amount)
}

pub fn tracked_asset(
    category: Category,
    currency: Currency,
    amount: &str,
    symbol: &str,
    shares: &str,
) -> Holding {
    let mut h = asset(category, currency, amount);
    h.symbol = Some(symbol.to_string());
    h.shares = Some(dec(shares));
    h.market_tracked = true;
    h
}
