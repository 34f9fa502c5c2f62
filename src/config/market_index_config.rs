//! Market index environment configuration.

use anyhow::Result;

use super::parse_u64;

#[derive(Debug, Clone)]
pub struct MarketIndexEnvConfig {
    pub stale_after_ms: i64,
    pub limit_per_platform: usize,
    pub page_size: usize,
}

impl MarketIndexEnvConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            stale_after_ms: parse_u64("MARKETINDEX_STALE_MS", 7 * 24 * 3_600_000)? as i64,
            limit_per_platform: 1000,
            page_size: 100,
        })
    }
}
