use serde::{Deserialize, Serialize};

use super::ids::{Channel, Venue};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CronSchedule {
    At {
        at_ms: i64,
    },
    Every {
        period_ms: i64,
        anchor_ms: Option<i64>,
    },
    /// `expr` is `m h dom mon dow`. `tz` is accepted and parsed but ignored
    /// (treated as UTC) — a recorded, deliberate deviation.
    Cron {
        expr: String,
        tz: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTarget {
    pub channel: Channel,
    pub chat_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WakeMode {
    Silent,
    Notify,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum JobPayload {
    AlertScan,
    AlertSingle { id: String },
    MarketCheck { market: String, platform: Venue },
    PortfolioSync,
    DailyDigest,
    StopLossScan,
    AgentTurn { prompt: String },
    SystemEvent { text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobState {
    pub next_run_at_ms: Option<i64>,
    pub running_at_ms: Option<i64>,
    pub last_run_at_ms: Option<i64>,
    pub last_status: Option<JobStatus>,
    pub last_error: Option<String>,
    pub last_duration_ms: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronJob {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub schedule: CronSchedule,
    pub session_target: Option<SessionTarget>,
    pub wake_mode: WakeMode,
    pub payload: JobPayload,
    pub state: JobState,
    pub delete_after_run: bool,
}
