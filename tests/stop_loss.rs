//! Dry-run stop-loss scenario: a position drops through its threshold
//! while trading is configured dry-run, so a trigger is recorded without
//! any execution adapter being called.

use std::sync::Arc;

use agent_core::application::clock::FakeClock;
use agent_core::application::notify::Notifier;
use agent_core::application::stop_loss::StopLossEngine;
use agent_core::domain::credentials::TradingCredential;
use agent_core::domain::errors::VenueError;
use agent_core::domain::ids::{Channel, Venue};
use agent_core::domain::ports::{ExecutionAdapter, ExecutionReceipt, MessageSender, SizeOrAll, Store};
use agent_core::domain::position::{Position, Side};
use agent_core::domain::stop_loss::TriggerStatus;
use agent_core::domain::user::{User, UserSettings};
use agent_core::infrastructure::persistence::{Database, SqliteStore};
use async_trait::async_trait;
use chrono::Utc;

struct UncalledExecutor;

#[async_trait]
impl ExecutionAdapter for UncalledExecutor {
    fn venue(&self) -> Venue {
        Venue::Polymarket
    }

    async fn execute_market_sell(
        &self,
        _credential: &TradingCredential,
        _market_id: &str,
        _outcome_id: &str,
        _size_or_all: SizeOrAll,
    ) -> Result<ExecutionReceipt, VenueError> {
        panic!("execution adapter must not be called while dry-run is enabled");
    }
}

struct RecordingSender {
    sent: std::sync::Mutex<Vec<String>>,
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_message(&self, _channel: Channel, _chat_id: &str, text: &str) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn dry_run_records_trigger_without_executing() {
    let db = Database::new("sqlite::memory:").await.unwrap();
    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(db.pool));

    let mut settings = UserSettings::default();
    settings.stop_loss_pct = 10.0;
    store
        .upsert_user(&User {
            id: "u1".into(),
            platform: Channel::Telegram,
            platform_user_id: "tg-1".into(),
            settings,
        })
        .await
        .unwrap();

    let position = Position {
        id: "p1".into(),
        user_id: "u1".into(),
        platform: Venue::Polymarket,
        market_id: "m1".into(),
        outcome_id: "m1-YES".into(),
        side: Side::Yes,
        shares: 100.0,
        avg_price: 0.50,
        current_price: 0.44,
        pnl: 0.0,
        pnl_pct: 0.0,
        value: 0.0,
        opened_at_ms: 0,
    };
    store.upsert_position(&position).await.unwrap();

    let sender = Arc::new(RecordingSender {
        sent: std::sync::Mutex::new(vec![]),
    });
    let notifier = Arc::new(Notifier::new(store.clone(), sender.clone()));
    let now = Utc::now();
    let clock = Arc::new(FakeClock::new(now));
    let executors: Vec<Arc<dyn ExecutionAdapter>> = vec![Arc::new(UncalledExecutor)];
    let engine = StopLossEngine::new(store.clone(), executors, notifier, clock, true, None);

    engine.scan_all().await;

    let trigger = store
        .get_stop_loss_trigger("u1", Venue::Polymarket, "m1-YES")
        .await
        .unwrap()
        .expect("trigger should be recorded");
    assert_eq!(trigger.status, TriggerStatus::DryRun);
    assert_eq!(trigger.cooldown_until_ms, now.timestamp_millis() + 10 * 60_000);

    let sent = sender.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("44.0¢"));
    assert!(sent[0].contains("Dry run enabled - no trade executed."));
}

#[tokio::test]
async fn cooldown_suppresses_repeated_triggers() {
    let db = Database::new("sqlite::memory:").await.unwrap();
    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(db.pool));

    let mut settings = UserSettings::default();
    settings.stop_loss_pct = 10.0;
    store
        .upsert_user(&User {
            id: "u1".into(),
            platform: Channel::Telegram,
            platform_user_id: "tg-1".into(),
            settings,
        })
        .await
        .unwrap();

    let position = Position {
        id: "p1".into(),
        user_id: "u1".into(),
        platform: Venue::Polymarket,
        market_id: "m1".into(),
        outcome_id: "m1-YES".into(),
        side: Side::Yes,
        shares: 100.0,
        avg_price: 0.50,
        current_price: 0.44,
        pnl: 0.0,
        pnl_pct: 0.0,
        value: 0.0,
        opened_at_ms: 0,
    };
    store.upsert_position(&position).await.unwrap();

    let sender = Arc::new(RecordingSender {
        sent: std::sync::Mutex::new(vec![]),
    });
    let notifier = Arc::new(Notifier::new(store.clone(), sender.clone()));
    let clock = Arc::new(FakeClock::new(Utc::now()));
    let engine = StopLossEngine::new(store.clone(), vec![], notifier, clock.clone(), true, None);

    engine.scan_all().await;
    assert_eq!(sender.sent.lock().unwrap().len(), 1);

    clock.advance(chrono::Duration::minutes(1));
    engine.scan_all().await;
    assert_eq!(
        sender.sent.lock().unwrap().len(),
        1,
        "second scan within cooldown window should not re-trigger"
    );
}
