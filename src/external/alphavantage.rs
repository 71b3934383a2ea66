use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

use crate::external::price_source::{PriceSource, PriceSourceError};
use crate::models::{Commodity, Currency};

pub struct AlphaVantageSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageSource {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PriceSourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PriceSourceError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct AvQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<AvGlobalQuote>,

    // When rate-limited Alpha Vantage returns:
    // { "Note": "Thank you for using Alpha Vantage! ... 5 calls per minute ..." }
    #[serde(rename = "Note")]
    note: Option<String>,

    // When invalid:
    // { "Error Message": "Invalid API call. ..." }
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AvGlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AvExchangeRateResponse {
    #[serde(rename = "Realtime Currency Exchange Rate")]
    exchange_rate: Option<AvExchangeRate>,

    #[serde(rename = "Note")]
    note: Option<String>,

    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AvExchangeRate {
    #[serde(rename = "5. Exchange Rate")]
    rate: Option<String>,
}

impl AlphaVantageSource {
    async fn fetch_global_quote(&self, symbol: &str) -> Result<BigDecimal, PriceSourceError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PriceSourceError::Network(e.to_string()))?;

        let body = resp
            .json::<AvQuoteResponse>()
            .await
            .map_err(|e| PriceSourceError::Parse(e.to_string()))?;

        if body.note.is_some() {
            return Err(PriceSourceError::RateLimited);
        }

        if let Some(msg) = body.error_message {
            return Err(PriceSourceError::BadResponse(msg));
        }

        let price = body
            .global_quote
            .and_then(|q| q.price)
            .ok_or_else(|| PriceSourceError::NotFound(symbol.to_string()))?;

        BigDecimal::from_str(&price).map_err(|e| PriceSourceError::Parse(e.to_string()))
    }

    // CURRENCY_EXCHANGE_RATE also serves crypto and precious metals, which
    // the provider models as currencies (BTC, XAU, XAG, ...).
    async fn fetch_rate(&self, from: &str, to: &str) -> Result<BigDecimal, PriceSourceError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "CURRENCY_EXCHANGE_RATE"),
                ("from_currency", from),
                ("to_currency", to),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PriceSourceError::Network(e.to_string()))?;

        let body = resp
            .json::<AvExchangeRateResponse>()
            .await
            .map_err(|e| PriceSourceError::Parse(e.to_string()))?;

        if body.note.is_some() {
            return Err(PriceSourceError::RateLimited);
        }

        if let Some(msg) = body.error_message {
            return Err(PriceSourceError::BadResponse(msg));
        }

        let rate = body
            .exchange_rate
            .and_then(|r| r.rate)
            .ok_or_else(|| PriceSourceError::NotFound(format!("{}/{}", from, to)))?;

        BigDecimal::from_str(&rate).map_err(|e| PriceSourceError::Parse(e.to_string()))
    }
}

#[async_trait]
impl PriceSource for AlphaVantageSource {
    async fn stock_price(&self, symbol: &str) -> Result<BigDecimal, PriceSourceError> {
        self.fetch_global_quote(symbol).await
    }

    async fn crypto_price(&self, symbol: &str) -> Result<BigDecimal, PriceSourceError> {
        self.fetch_rate(symbol, "USD").await
    }

    async fn commodity_price(
        &self,
        commodity: Commodity,
    ) -> Result<BigDecimal, PriceSourceError> {
        self.fetch_rate(commodity.proxy_symbol(), "USD").await
    }

    async fn exchange_rate(
        &self,
        from: Currency,
        to: Currency,
    ) -> Result<BigDecimal, PriceSourceError> {
        self.fetch_rate(from.code(), to.code()).await
    }
}
