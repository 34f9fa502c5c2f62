//! Stop-loss / execution environment configuration.

use anyhow::Result;

use super::{parse_bool, parse_u64, parse_usize};

#[derive(Debug, Clone)]
pub struct TradingEnvConfig {
    pub dry_run: bool,
    pub stoploss_cooldown_ms: i64,
    /// Bounded worker pool size for per-user fan-out in PortfolioSync /
    /// StopLossEngine (default 4).
    pub user_concurrency: usize,
}

impl TradingEnvConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            dry_run: parse_bool("TRADING_DRY_RUN", true),
            stoploss_cooldown_ms: parse_u64("TRADING_STOPLOSS_COOLDOWN_MS", 600_000)? as i64,
            user_concurrency: parse_usize("TRADING_USER_CONCURRENCY", 4)?,
        })
    }
}
