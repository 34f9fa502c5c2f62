use serde::{Deserialize, Serialize};

use super::ids::Venue;

/// Row backing `trading_credentials` (§6). The credential *material* itself
/// (API keys, signing keys) is out of scope — this core only tracks whether
/// a user has linked a venue and the health of the last call, per §4.G
/// step 5 ("record credential success/failure").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingCredential {
    pub user_id: String,
    pub platform: Venue,
    pub enabled: bool,
    pub last_success_at_ms: Option<i64>,
    pub last_failure_at_ms: Option<i64>,
    pub last_error: Option<String>,
}
