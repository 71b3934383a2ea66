use anyhow::Context;
use chrono::Duration;

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Runtime configuration, read once at startup. Both quote TTLs default to a
/// day to conserve the external provider's call quota.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    pub alpha_vantage_api_key: String,
    pub alpha_vantage_base_url: String,
    pub external_api_timeout_secs: u64,
    pub price_cache_ttl_secs: i64,
    pub fx_cache_ttl_secs: i64,
    pub refresh_concurrency: usize,
    pub scheduler_enabled: bool,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
        let alpha_vantage_api_key =
            std::env::var("ALPHAVANTAGE_API_KEY").context("ALPHAVANTAGE_API_KEY not set")?;

        Ok(Self {
            database_url,
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:3000"),
            alpha_vantage_api_key,
            alpha_vantage_base_url: env_or(
                "ALPHAVANTAGE_BASE_URL",
                "https://www.alphavantage.co/query",
            ),
            external_api_timeout_secs: env_parse("EXTERNAL_API_TIMEOUT_SECS", 10),
            price_cache_ttl_secs: env_parse("PRICE_CACHE_TTL_SECS", 86_400),
            fx_cache_ttl_secs: env_parse("FX_CACHE_TTL_SECS", 86_400),
            refresh_concurrency: env_parse("REFRESH_CONCURRENCY", 4),
            scheduler_enabled: env_parse("SCHEDULER_ENABLED", true),
        })
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.external_api_timeout_secs)
    }

    pub fn price_ttl(&self) -> Duration {
        Duration::seconds(self.price_cache_ttl_secs)
    }

    pub fn fx_ttl(&self) -> Duration {
        Duration::seconds(self.fx_cache_ttl_secs)
    }
}
