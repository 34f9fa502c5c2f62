use serde::{Deserialize, Serialize};

use super::ids::{Channel, Venue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Any,
}

/// Tagged union of alert conditions, persisted as `{kind, ...}` JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AlertCondition {
    PriceAbove {
        threshold: f64,
    },
    PriceBelow {
        threshold: f64,
    },
    PriceChangePct {
        threshold: f64,
        direction: Direction,
        time_window_secs: u64,
    },
    VolumeSpike {
        /// Multiplier threshold, default 3.0 when absent at construction.
        threshold: f64,
    },
}

impl AlertCondition {
    pub fn default_time_window_secs(&self) -> u64 {
        match self {
            AlertCondition::PriceChangePct {
                time_window_secs, ..
            } => *time_window_secs,
            _ => 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub user_id: String,
    pub platform: Venue,
    pub market_id: String,
    pub condition: AlertCondition,
    pub enabled: bool,
    pub triggered: bool,
    pub channel: Option<Channel>,
    pub chat_id: Option<String>,
}

impl Alert {
    /// Normalize a raw stored threshold the way `normalizePct` treats stop-loss
    /// percentages: a fraction (<=1) is used as-is, anything else is assumed to
    /// already be a percent and divided by 100. Only applicable to
    /// `priceChangePct` thresholds; `priceAbove`/`priceBelow` thresholds are
    /// prices in the outcome's native unit and are never renormalized.
    pub fn normalized_pct_threshold(raw: f64) -> f64 {
        crate::domain::pct::normalize_pct(raw) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_change_pct_threshold_normalizes_fractions() {
        // threshold stored as 0.05 means "5%"
        assert!((Alert::normalized_pct_threshold(0.05) - 5.0).abs() < 1e-9);
        // threshold stored as 5 is already a percent
        assert!((Alert::normalized_pct_threshold(5.0) - 5.0).abs() < 1e-9);
    }
}
