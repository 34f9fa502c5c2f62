//! Configuration module.
//!
//! Structured loading from environment variables, organized by domain into
//! `SchedulerEnvConfig`/`TradingEnvConfig`/`ObservabilityEnvConfig`/etc.,
//! composed in one `Config::from_env`.

mod alert_config;
mod http_config;
mod market_index_config;
mod observability_config;
mod scheduler_config;
mod trading_config;

pub use alert_config::AlertEnvConfig;
pub use http_config::HttpEnvConfig;
pub use market_index_config::MarketIndexEnvConfig;
pub use observability_config::ObservabilityEnvConfig;
pub use scheduler_config::SchedulerEnvConfig;
pub use trading_config::TradingEnvConfig;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub scheduler: SchedulerEnvConfig,
    pub http: HttpEnvConfig,
    pub alert: AlertEnvConfig,
    pub trading: TradingEnvConfig,
    pub market_index: MarketIndexEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://agent-core.db".to_string());

        Ok(Self {
            database_url,
            scheduler: SchedulerEnvConfig::from_env().context("scheduler config")?,
            http: HttpEnvConfig::from_env().context("http config")?,
            alert: AlertEnvConfig::from_env().context("alert config")?,
            trading: TradingEnvConfig::from_env().context("trading config")?,
            market_index: MarketIndexEnvConfig::from_env().context("market index config")?,
            observability: ObservabilityEnvConfig::from_env(),
        })
    }
}

pub(crate) fn parse_usize(key: &str, default: usize) -> Result<usize> {
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<usize>()
        .with_context(|| format!("failed to parse {key}"))
}

pub(crate) fn parse_u64(key: &str, default: u64) -> Result<u64> {
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u64>()
        .with_context(|| format!("failed to parse {key}"))
}

pub(crate) fn parse_i64(key: &str, default: i64) -> Result<i64> {
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<i64>()
        .with_context(|| format!("failed to parse {key}"))
}

pub(crate) fn parse_f64(key: &str, default: f64) -> Result<f64> {
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<f64>()
        .with_context(|| format!("failed to parse {key}"))
}

pub(crate) fn parse_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<bool>()
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_env() {
        let config = Config::from_env().expect("should parse with defaults");
        assert!(config.scheduler.enabled);
        assert_eq!(config.http.max_attempts, 3);
    }
}
