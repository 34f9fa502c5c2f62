//! Tick-loop invariants: a due job runs exactly once per tick, its next run
//! is strictly after the current one, and a stale running lease is treated
//! as abandoned rather than blocking the job forever.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use agent_core::application::alerts::AlertEngine;
use agent_core::application::clock::FakeClock;
use agent_core::application::notify::{LogMessageSender, Notifier};
use agent_core::application::portfolio::SyncEngine;
use agent_core::application::scheduler::{JobHandlers, Scheduler};
use agent_core::application::stop_loss::StopLossEngine;
use agent_core::config::SchedulerEnvConfig;
use agent_core::domain::alert::{Alert, AlertCondition};
use agent_core::domain::cron_job::{CronJob, CronSchedule, JobPayload, JobState, WakeMode};
use agent_core::domain::errors::VenueError;
use agent_core::domain::ids::Venue;
use agent_core::domain::market::{Market, Outcome};
use agent_core::domain::ports::{Store, VenueAdapter};
use agent_core::domain::position::RawPosition;
use agent_core::infrastructure::persistence::{Database, SqliteStore};
use agent_core::infrastructure::venues::Feeds;
use async_trait::async_trait;
use chrono::Utc;

struct CountingMarketAdapter {
    calls: AtomicUsize,
}

#[async_trait]
impl VenueAdapter for CountingMarketAdapter {
    fn venue(&self) -> Venue {
        Venue::Polymarket
    }

    async fn list_positions(
        &self,
        _credential: &agent_core::domain::credentials::TradingCredential,
    ) -> Result<Vec<RawPosition>, VenueError> {
        Ok(vec![])
    }

    async fn get_market(&self, market_id: &str) -> Result<Market, VenueError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Market {
            platform: "polymarket".into(),
            market_id: market_id.into(),
            question: "Will it happen?".into(),
            outcomes: vec![Outcome {
                name: "Yes".into(),
                price: 0.90,
                previous_price: None,
            }],
            volume_24h: None,
            fetched_at_ms: Utc::now().timestamp_millis(),
        })
    }
}

fn scheduler_config() -> SchedulerEnvConfig {
    SchedulerEnvConfig {
        enabled: true,
        alert_interval_ms: 30_000,
        portfolio_interval_ms: 3_600_000,
        digest_interval_ms: 300_000,
        stoploss_interval_ms: 0,
    }
}

async fn build_scheduler(
    store: Arc<dyn Store>,
    clock: Arc<FakeClock>,
    adapter: Arc<CountingMarketAdapter>,
) -> Arc<Scheduler> {
    let venue_adapters: Vec<Arc<dyn VenueAdapter>> = vec![adapter];
    let feeds = Arc::new(Feeds::new(venue_adapters));
    let sender = Arc::new(LogMessageSender);
    let notifier = Arc::new(Notifier::new(store.clone(), sender));
    let alerts = Arc::new(AlertEngine::new(store.clone(), feeds, notifier.clone()));
    let portfolio = Arc::new(SyncEngine::new(store.clone(), vec![], clock.clone()));
    let stop_loss = Arc::new(StopLossEngine::new(
        store.clone(),
        vec![],
        notifier.clone(),
        clock.clone(),
        true,
        None,
    ));
    let handlers = JobHandlers {
        alerts,
        portfolio,
        stop_loss,
        notifier,
    };
    Arc::new(Scheduler::new(store, clock, handlers, scheduler_config()))
}

#[tokio::test]
async fn due_job_runs_once_and_reschedules_strictly_forward() {
    let db = Database::new("sqlite::memory:").await.unwrap();
    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(db.pool));

    store
        .upsert_alert(&Alert {
            id: "a1".into(),
            user_id: "u1".into(),
            platform: Venue::Polymarket,
            market_id: "m1".into(),
            condition: AlertCondition::PriceAbove { threshold: 0.5 },
            enabled: true,
            triggered: false,
            channel: None,
            chat_id: None,
        })
        .await
        .unwrap();

    let now = Utc::now();
    let clock = Arc::new(FakeClock::new(now));
    let adapter = Arc::new(CountingMarketAdapter {
        calls: AtomicUsize::new(0),
    });
    let scheduler = build_scheduler(store.clone(), clock.clone(), adapter.clone()).await;

    store
        .upsert_cron_job(&CronJob {
            id: "alert-scan".into(),
            name: "alert-scan".into(),
            enabled: true,
            schedule: CronSchedule::Every {
                period_ms: 30_000,
                anchor_ms: Some(now.timestamp_millis() - 60_000),
            },
            session_target: None,
            wake_mode: WakeMode::Silent,
            payload: JobPayload::AlertScan,
            state: JobState::default(),
            delete_after_run: false,
        })
        .await
        .unwrap();

    scheduler.tick().await;
    assert_eq!(adapter.calls.load(Ordering::SeqCst), 1, "due job should run exactly once");

    let after_first = store.list_cron_jobs().await.unwrap();
    let job = after_first.iter().find(|j| j.id == "alert-scan").unwrap();
    let next_run = job.state.next_run_at_ms.unwrap();
    assert!(next_run > job.state.last_run_at_ms.unwrap());

    scheduler.tick().await;
    assert_eq!(
        adapter.calls.load(Ordering::SeqCst),
        1,
        "job is not due again within the same tick's clock reading"
    );
}

#[tokio::test]
async fn stale_running_lease_is_treated_as_abandoned() {
    let db = Database::new("sqlite::memory:").await.unwrap();
    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(db.pool));

    let now = Utc::now();
    let clock = Arc::new(FakeClock::new(now));
    let adapter = Arc::new(CountingMarketAdapter {
        calls: AtomicUsize::new(0),
    });
    let scheduler = build_scheduler(store.clone(), clock.clone(), adapter.clone()).await;

    let mut state = JobState::default();
    state.running_at_ms = Some(now.timestamp_millis() - 11 * 60_000);
    state.last_run_at_ms = Some(now.timestamp_millis() - 11 * 60_000);

    store
        .upsert_cron_job(&CronJob {
            id: "alert-scan".into(),
            name: "alert-scan".into(),
            enabled: true,
            schedule: CronSchedule::Every {
                period_ms: 30_000,
                anchor_ms: Some(now.timestamp_millis() - 11 * 60_000),
            },
            session_target: None,
            wake_mode: WakeMode::Silent,
            payload: JobPayload::AlertScan,
            state,
            delete_after_run: false,
        })
        .await
        .unwrap();

    scheduler.tick().await;
    assert_eq!(
        adapter.calls.load(Ordering::SeqCst),
        1,
        "an abandoned lease older than the staleness window must not block the job"
    );
}
