use serde::{Deserialize, Serialize};

use super::ids::Venue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerStatus {
    Executed,
    Failed,
    DryRun,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopLossTrigger {
    pub user_id: String,
    pub platform: Venue,
    pub outcome_id: String,
    pub market_id: String,
    pub status: TriggerStatus,
    pub triggered_at_ms: i64,
    pub last_price: f64,
    pub last_error: Option<String>,
    pub cooldown_until_ms: i64,
}
