//! Alert evaluation environment configuration.

use anyhow::Result;

use super::{parse_f64, parse_u64};

#[derive(Debug, Clone)]
pub struct AlertEnvConfig {
    pub price_change_window_secs: u64,
    pub volume_spike_mult: f64,
}

impl AlertEnvConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            price_change_window_secs: parse_u64("ALERT_PRICE_CHANGE_WINDOW_SECS", 600)?,
            volume_spike_mult: parse_f64("ALERT_VOLUME_SPIKE_MULT", 3.0)?,
        })
    }
}
