use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::Channel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub key: String,
    pub user_id: String,
    pub channel: Channel,
    pub chat_id: String,
    pub last_activity: DateTime<Utc>,
}
