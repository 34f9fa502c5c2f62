//! Push-based metrics reporter: periodically logs a JSON snapshot to
//! stdout. No HTTP server, no incoming connections — only outbound data,
//! outbound-only, matching the rest of this crate's observability stack.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::ports::Store;
use crate::infrastructure::observability::metrics::Metrics;

#[derive(Serialize)]
struct ReportSnapshot {
    timestamp: String,
    uptime_seconds: u64,
    version: String,
    active_alerts: usize,
    cron_jobs: usize,
    users: usize,
}

pub struct MetricsReporter {
    store: Arc<dyn Store>,
    metrics: Metrics,
    start_time: Instant,
    interval: Duration,
}

impl MetricsReporter {
    pub fn new(store: Arc<dyn Store>, metrics: Metrics, interval_secs: u64) -> Self {
        Self {
            store,
            metrics,
            start_time: Instant::now(),
            interval: Duration::from_secs(interval_secs),
        }
    }

    pub async fn run(self) {
        info!(
            "MetricsReporter: starting push-based metrics (interval: {:?})",
            self.interval
        );

        loop {
            tokio::time::sleep(self.interval).await;

            match self.collect_snapshot().await {
                Ok(snapshot) => match serde_json::to_string(&snapshot) {
                    Ok(json) => println!("METRICS_JSON:{json}"),
                    Err(e) => warn!("failed to serialize metrics snapshot: {e}"),
                },
                Err(e) => warn!("failed to collect metrics snapshot: {e}"),
            }
        }
    }

    async fn collect_snapshot(&self) -> anyhow::Result<ReportSnapshot> {
        let uptime = self.start_time.elapsed().as_secs();
        self.metrics.uptime_seconds.set(uptime as f64);

        let active_alerts = self.store.list_active_alerts().await?.len();
        let cron_jobs = self.store.list_cron_jobs().await?.len();
        let users = self.store.list_users().await?.len();

        Ok(ReportSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_seconds: uptime,
            version: env!("CARGO_PKG_VERSION").to_string(),
            active_alerts,
            cron_jobs,
            users,
        })
    }
}
