use serde::{Deserialize, Serialize};

use super::ids::Channel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    pub alerts_enabled: bool,
    pub digest_enabled: bool,
    /// "HH:MM", UTC.
    pub digest_time: String,
    /// 0 disables stop-loss scanning for this user.
    pub stop_loss_pct: f64,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            alerts_enabled: true,
            digest_enabled: false,
            digest_time: "09:00".to_string(),
            stop_loss_pct: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub platform: Channel,
    pub platform_user_id: String,
    pub settings: UserSettings,
}
