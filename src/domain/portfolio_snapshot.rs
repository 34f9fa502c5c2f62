use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformTotals {
    pub value: f64,
    pub pnl: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub user_id: String,
    pub ts_ms: i64,
    pub total_value: f64,
    pub total_pnl: f64,
    pub total_pnl_pct: f64,
    pub total_cost_basis: f64,
    pub positions_count: usize,
    pub by_platform: HashMap<String, PlatformTotals>,
}
