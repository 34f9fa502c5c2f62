//! Observability environment configuration for the push-based (no HTTP
//! server) metrics reporter.

use super::{parse_bool, parse_u64};

#[derive(Debug, Clone)]
pub struct ObservabilityEnvConfig {
    pub enabled: bool,
    pub report_interval_secs: u64,
}

impl ObservabilityEnvConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: parse_bool("OBSERVABILITY_ENABLED", true),
            report_interval_secs: parse_u64("OBSERVABILITY_INTERVAL", 60).unwrap_or(60),
        }
    }
}
