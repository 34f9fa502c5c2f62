//! Tick loop, dispatch, and crash recovery for the job table (§4.E). Jobs
//! are polled on a short interval rather than driven by per-job one-shot
//! timers — at the job periods this system schedules (tens of seconds and
//! up) a 1s poll resolves every due job within one tick, with none of the
//! bookkeeping a dynamic timer-per-job design would need to reschedule
//! itself on every run.

use std::sync::Arc;
use std::time::Duration;

use chrono::Timelike;

use crate::config::SchedulerEnvConfig;
use crate::domain::cron_job::{CronJob, CronSchedule, JobPayload, JobState, JobStatus, WakeMode};
use crate::domain::ports::{Clock, Store};

use crate::application::alerts::AlertEngine;
use crate::application::notify::Notifier;
use crate::application::portfolio::SyncEngine;
use crate::application::stop_loss::StopLossEngine;

use super::schedule::next_run_at_ms;

const POLL_INTERVAL: Duration = Duration::from_secs(1);
const STALE_RUNNING_MS: i64 = 10 * 60_000;

pub struct JobHandlers {
    pub alerts: Arc<AlertEngine>,
    pub portfolio: Arc<SyncEngine>,
    pub stop_loss: Arc<StopLossEngine>,
    pub notifier: Arc<Notifier>,
}

pub struct Scheduler {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    handlers: JobHandlers,
    config: SchedulerEnvConfig,
}

impl Scheduler {
    pub fn new(
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
        handlers: JobHandlers,
        config: SchedulerEnvConfig,
    ) -> Self {
        Self {
            store,
            clock,
            handlers,
            config,
        }
    }

    pub async fn ensure_default_jobs(&self) -> anyhow::Result<()> {
        self.ensure_job("alert-scan", JobPayload::AlertScan, self.config.alert_interval_ms)
            .await?;
        self.ensure_job(
            "portfolio-sync",
            JobPayload::PortfolioSync,
            self.config.portfolio_interval_ms,
        )
        .await?;
        self.ensure_job("daily-digest", JobPayload::DailyDigest, self.config.digest_interval_ms)
            .await?;
        self.ensure_job(
            "stop-loss-scan",
            JobPayload::StopLossScan,
            self.config.stoploss_interval_ms,
        )
        .await?;
        Ok(())
    }

    async fn ensure_job(&self, id: &str, payload: JobPayload, period_ms: u64) -> anyhow::Result<()> {
        if period_ms == 0 {
            return Ok(());
        }

        let existing = self.store.list_cron_jobs().await?;
        if existing.iter().any(|j| j.id == id) {
            return Ok(());
        }

        let job = CronJob {
            id: id.to_string(),
            name: id.to_string(),
            enabled: true,
            schedule: CronSchedule::Every {
                period_ms: period_ms as i64,
                anchor_ms: Some(self.clock.now_ms()),
            },
            session_target: None,
            wake_mode: WakeMode::Silent,
            payload,
            state: JobState::default(),
            delete_after_run: false,
        };
        self.store.upsert_cron_job(&job).await?;
        Ok(())
    }

    /// Runs the tick loop until `shutdown` is signalled.
    pub async fn run(self: Arc<Self>, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        if let Err(err) = self.ensure_default_jobs().await {
            tracing::error!(error = %err, "could not seed default jobs");
        }

        let mut interval = tokio::time::interval(POLL_INTERVAL);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }

    pub async fn tick(&self) {
        let now = self.clock.now_ms();
        let jobs = match self.store.list_cron_jobs().await {
            Ok(jobs) => jobs,
            Err(err) => {
                tracing::error!(error = %err, "could not list cron jobs");
                return;
            }
        };

        for mut job in jobs {
            if !job.enabled {
                continue;
            }

            if let Some(running_at) = job.state.running_at_ms {
                if now - running_at < STALE_RUNNING_MS {
                    continue;
                }
                job.state.running_at_ms = None;
                let base = job.state.last_run_at_ms.unwrap_or(now);
                job.state.next_run_at_ms = Some(next_run_at_ms(&job.schedule, base));
            }

            let next_run = job
                .state
                .next_run_at_ms
                .unwrap_or_else(|| next_run_at_ms(&job.schedule, now));

            if next_run > now {
                continue;
            }

            self.run_job(job).await;
        }
    }

    async fn run_job(&self, mut job: CronJob) {
        job.state.running_at_ms = Some(self.clock.now_ms());
        if let Err(err) = self.store.upsert_cron_job(&job).await {
            tracing::warn!(job_id = %job.id, error = %err, "could not record running lease");
            return;
        }

        let start = self.clock.now_ms();
        let result = self.dispatch(&job.payload).await;
        let end = self.clock.now_ms();

        job.state.running_at_ms = None;
        job.state.last_run_at_ms = Some(end);
        job.state.last_duration_ms = Some(end - start);

        match result {
            Ok(()) => {
                job.state.last_status = Some(JobStatus::Ok);
                job.state.last_error = None;
            }
            Err(err) => {
                tracing::warn!(job_id = %job.id, error = %err, "job execution failed");
                job.state.last_status = Some(JobStatus::Error);
                job.state.last_error = Some(err.to_string());
            }
        }

        if job.delete_after_run {
            if let Err(err) = self.store.delete_cron_job(&job.id).await {
                tracing::warn!(job_id = %job.id, error = %err, "could not delete one-shot job");
            }
            return;
        }

        job.state.next_run_at_ms = Some(next_run_at_ms(&job.schedule, end));
        if let Err(err) = self.store.upsert_cron_job(&job).await {
            tracing::warn!(job_id = %job.id, error = %err, "could not persist job state");
        }
    }

    async fn dispatch(&self, payload: &JobPayload) -> anyhow::Result<()> {
        match payload {
            JobPayload::AlertScan => {
                self.handlers.alerts.scan_all().await;
                Ok(())
            }
            JobPayload::AlertSingle { id } => self.handlers.alerts.evaluate_one(id).await.map(|_| ()),
            JobPayload::MarketCheck { market, platform } => {
                self.handlers.alerts.refresh_market(*platform, market).await
            }
            JobPayload::PortfolioSync => {
                self.handlers.portfolio.sync_all().await;
                Ok(())
            }
            JobPayload::DailyDigest => self.run_digest().await,
            JobPayload::StopLossScan => {
                self.handlers.stop_loss.scan_all().await;
                Ok(())
            }
            JobPayload::AgentTurn { .. } | JobPayload::SystemEvent { .. } => {
                tracing::debug!("skipping out-of-scope job payload");
                Ok(())
            }
        }
    }

    async fn run_digest(&self) -> anyhow::Result<()> {
        let now = self.clock.now();
        let now_hm = format!("{:02}:{:02}", now.hour(), now.minute());

        for user in self.store.list_users().await? {
            if !user.settings.digest_enabled || user.settings.digest_time != now_hm {
                continue;
            }

            let positions = self.store.list_positions(&user.id).await.unwrap_or_default();
            let total_value: f64 = positions.iter().map(|p| p.value).sum();
            let total_pnl: f64 = positions.iter().map(|p| p.pnl).sum();
            let text = format!(
                "Daily digest: {} open position(s), value ${total_value:.2}, pnl ${total_pnl:.2}",
                positions.len()
            );
            self.handlers.notifier.notify_user(&user.id, None, &text).await;
        }

        Ok(())
    }
}
