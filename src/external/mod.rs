pub mod alphavantage;
pub mod price_source;
