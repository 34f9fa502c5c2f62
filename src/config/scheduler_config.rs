//! Scheduler environment configuration.

use anyhow::Result;

use super::{parse_bool, parse_u64};

#[derive(Debug, Clone)]
pub struct SchedulerEnvConfig {
    pub enabled: bool,
    pub alert_interval_ms: u64,
    pub portfolio_interval_ms: u64,
    pub digest_interval_ms: u64,
    /// `0` disables the default StopLossScan job.
    pub stoploss_interval_ms: u64,
}

impl SchedulerEnvConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            enabled: parse_bool("CRON_ENABLED", true),
            alert_interval_ms: parse_u64("CRON_ALERT_INTERVAL_MS", 30_000)?,
            portfolio_interval_ms: parse_u64("CRON_PORTFOLIO_INTERVAL_MS", 3_600_000)?,
            digest_interval_ms: parse_u64("CRON_DIGEST_INTERVAL_MS", 300_000)?,
            stoploss_interval_ms: parse_u64("CRON_STOPLOSS_INTERVAL_MS", 120_000)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = SchedulerEnvConfig::from_env().unwrap();
        assert_eq!(c.alert_interval_ms, 30_000);
        assert_eq!(c.portfolio_interval_ms, 3_600_000);
        assert_eq!(c.digest_interval_ms, 300_000);
        assert_eq!(c.stoploss_interval_ms, 120_000);
    }
}
