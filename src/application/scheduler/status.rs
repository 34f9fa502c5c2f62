//! Read-only scheduler status view, modeled on an
//! `AgentStatusRegistry` but backed directly by the job table rather than a
//! separate in-memory heartbeat map — the Store row already carries
//! everything a status view needs.

use std::sync::Arc;

use crate::domain::cron_job::JobStatus;
use crate::domain::ports::Store;

#[derive(Debug, Clone, serde::Serialize)]
pub struct JobStatusView {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub running: bool,
    pub last_run_at_ms: Option<i64>,
    pub next_run_at_ms: Option<i64>,
    pub last_status: Option<JobStatus>,
    pub last_error: Option<String>,
}

pub struct SchedulerStatus {
    store: Arc<dyn Store>,
}

impl SchedulerStatus {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn snapshot(&self) -> anyhow::Result<Vec<JobStatusView>> {
        let jobs = self.store.list_cron_jobs().await?;
        Ok(jobs
            .into_iter()
            .map(|job| JobStatusView {
                id: job.id,
                name: job.name,
                enabled: job.enabled,
                running: job.state.running_at_ms.is_some(),
                last_run_at_ms: job.state.last_run_at_ms,
                next_run_at_ms: job.state.next_run_at_ms,
                last_status: job.state.last_status,
                last_error: job.state.last_error,
            })
            .collect())
    }
}
