//! End-to-end alert scenarios: a fake venue feed and an in-memory store
//! drive `AlertEngine::scan_all` the same way the real scheduler would.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use agent_core::application::alerts::AlertEngine;
use agent_core::application::notify::Notifier;
use agent_core::domain::alert::{Alert, AlertCondition, Direction};
use agent_core::domain::errors::VenueError;
use agent_core::domain::ids::{Channel, Venue};
use agent_core::domain::market::{Market, Outcome};
use agent_core::domain::ports::{MessageSender, Store, VenueAdapter};
use agent_core::domain::position::RawPosition;
use agent_core::domain::user::{User, UserSettings};
use agent_core::infrastructure::persistence::{Database, SqliteStore};
use agent_core::infrastructure::venues::Feeds;
use async_trait::async_trait;
use chrono::Utc;

struct TickingAdapter {
    prices: Vec<f64>,
    call: AtomicUsize,
}

#[async_trait]
impl VenueAdapter for TickingAdapter {
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
        let idx = self.call.fetch_add(1, Ordering::SeqCst).min(self.prices.len() - 1);
        Ok(Market {
            platform: "polymarket".into(),
            market_id: market_id.into(),
            question: "Will the bill pass?".into(),
            outcomes: vec![Outcome {
                name: "Yes".into(),
                price: self.prices[idx],
                previous_price: None,
            }],
            volume_24h: None,
            fetched_at_ms: Utc::now().timestamp_millis(),
        })
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

async fn store_with_user(user_id: &str) -> Arc<SqliteStore> {
    let db = Database::new("sqlite::memory:").await.unwrap();
    let store = SqliteStore::new(db.pool);
    store
        .upsert_user(&User {
            id: user_id.into(),
            platform: Channel::Telegram,
            platform_user_id: "tg-1".into(),
            settings: UserSettings::default(),
        })
        .await
        .unwrap();
    Arc::new(store)
}

#[tokio::test]
async fn price_above_does_not_fire_until_threshold_crossed() {
    let store = store_with_user("u1").await;
    let alert = Alert {
        id: "a1".into(),
        user_id: "u1".into(),
        platform: Venue::Polymarket,
        market_id: "m1".into(),
        condition: AlertCondition::PriceAbove { threshold: 0.72 },
        enabled: true,
        triggered: false,
        channel: None,
        chat_id: None,
    };
    store.upsert_alert(&alert).await.unwrap();

    let adapter: Arc<dyn VenueAdapter> = Arc::new(TickingAdapter {
        prices: vec![0.715, 0.725],
        call: AtomicUsize::new(0),
    });
    let feeds = Arc::new(Feeds::new(vec![adapter]));
    let sender = Arc::new(RecordingSender {
        sent: std::sync::Mutex::new(vec![]),
    });
    let notifier = Arc::new(Notifier::new(store.clone(), sender.clone()));
    let engine = AlertEngine::new(store.clone(), feeds, notifier);

    let fired_first = engine.scan_all().await;
    assert_eq!(fired_first, 0);
    assert!(!store.get_alert("a1").await.unwrap().triggered);

    let fired_second = engine.scan_all().await;
    assert_eq!(fired_second, 1);
    assert!(store.get_alert("a1").await.unwrap().triggered);

    let sent = sender.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("72.5¢"));
    assert!(sent[0].contains("above 72.0¢"));
}

#[tokio::test]
async fn price_change_pct_fires_from_cached_window() {
    let store = store_with_user("u2").await;
    let alert = Alert {
        id: "a2".into(),
        user_id: "u2".into(),
        platform: Venue::Polymarket,
        market_id: "m2".into(),
        condition: AlertCondition::PriceChangePct {
            threshold: 5.0,
            direction: Direction::Up,
            time_window_secs: 600,
        },
        enabled: true,
        triggered: false,
        channel: None,
        chat_id: None,
    };
    store.upsert_alert(&alert).await.unwrap();

    let previous = Market {
        platform: "polymarket".into(),
        market_id: "m2".into(),
        question: "Will rates rise?".into(),
        outcomes: vec![Outcome {
            name: "Yes".into(),
            price: 0.40,
            previous_price: None,
        }],
        volume_24h: None,
        fetched_at_ms: Utc::now().timestamp_millis() - 500_000,
    };
    store.cache_market(&previous).await.unwrap();

    let adapter: Arc<dyn VenueAdapter> = Arc::new(TickingAdapter {
        prices: vec![0.424],
        call: AtomicUsize::new(0),
    });
    let feeds = Arc::new(Feeds::new(vec![adapter]));
    let sender = Arc::new(RecordingSender {
        sent: std::sync::Mutex::new(vec![]),
    });
    let notifier = Arc::new(Notifier::new(store.clone(), sender.clone()));
    let engine = AlertEngine::new(store.clone(), feeds, notifier);

    let fired = engine.scan_all().await;
    assert_eq!(fired, 1);

    let sent = sender.sent.lock().unwrap();
    assert!(sent[0].contains("+6.00%"));
    assert!(sent[0].contains("40.0¢"));
    assert!(sent[0].contains("42.4¢"));
}

#[tokio::test]
async fn disabled_alert_is_skipped_by_scan() {
    let store = store_with_user("u3").await;
    let alert = Alert {
        id: "a3".into(),
        user_id: "u3".into(),
        platform: Venue::Polymarket,
        market_id: "m3".into(),
        condition: AlertCondition::PriceAbove { threshold: 0.1 },
        enabled: false,
        triggered: false,
        channel: None,
        chat_id: None,
    };
    store.upsert_alert(&alert).await.unwrap();

    let adapter: Arc<dyn VenueAdapter> = Arc::new(TickingAdapter {
        prices: vec![0.99],
        call: AtomicUsize::new(0),
    });
    let feeds = Arc::new(Feeds::new(vec![adapter]));
    let sender = Arc::new(RecordingSender {
        sent: std::sync::Mutex::new(vec![]),
    });
    let notifier = Arc::new(Notifier::new(store.clone(), sender.clone()));
    let engine = AlertEngine::new(store, feeds, notifier);

    assert_eq!(engine.scan_all().await, 0);
    assert!(sender.sent.lock().unwrap().is_empty());
}
