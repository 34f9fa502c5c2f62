//! Capability traits. Every engine receives these as `Arc<dyn Trait>` from
//! the `AppContext` built in `application::system` — no back-pointers
//! between components.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::alert::Alert;
use super::credentials::TradingCredential;
use super::cron_job::CronJob;
use super::errors::{StoreError, VenueError};
use super::ids::Venue;
use super::market::Market;
use super::market_index::{Embedding, MarketIndexEntry, MarketListing};
use super::portfolio_snapshot::PortfolioSnapshot;
use super::position::{Position, RawPosition};
use super::session::Session;
use super::stop_loss::StopLossTrigger;
use super::user::User;

pub type StoreResult<T> = Result<T, StoreError>;

/// The current time source. Injected everywhere schedule arithmetic,
/// jitter, or TTL comparisons happen, so tests can run deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn now_ms(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Narrow capability set the Store exposes (§4.A). Multi-row reconciliation
/// is performed by callers via read-then-write; the Store only guarantees
/// atomicity per row.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_user(&self, id: &str) -> StoreResult<User>;
    async fn find_user_by_platform(
        &self,
        platform: crate::domain::ids::Channel,
        platform_user_id: &str,
    ) -> StoreResult<Option<User>>;
    async fn upsert_user(&self, user: &User) -> StoreResult<()>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn latest_session(&self, user_id: &str) -> StoreResult<Option<Session>>;
    async fn upsert_session(&self, session: &Session) -> StoreResult<()>;

    /// Fetch a cached market snapshot no older than `max_age_secs`.
    async fn get_cached_market(
        &self,
        platform: Venue,
        market_id: &str,
        max_age_secs: u64,
    ) -> StoreResult<Option<Market>>;
    async fn cache_market(&self, market: &Market) -> StoreResult<()>;

    async fn list_active_alerts(&self) -> StoreResult<Vec<Alert>>;
    async fn get_alert(&self, id: &str) -> StoreResult<Alert>;
    async fn upsert_alert(&self, alert: &Alert) -> StoreResult<()>;

    async fn list_positions(&self, user_id: &str) -> StoreResult<Vec<Position>>;
    async fn upsert_position(&self, position: &Position) -> StoreResult<()>;
    async fn delete_position(&self, user_id: &str, outcome_id: &str) -> StoreResult<()>;

    async fn append_portfolio_snapshot(&self, snapshot: &PortfolioSnapshot) -> StoreResult<()>;
    async fn prune_portfolio_snapshots_before(&self, cutoff_ms: i64) -> StoreResult<u64>;

    async fn list_cron_jobs(&self) -> StoreResult<Vec<CronJob>>;
    async fn upsert_cron_job(&self, job: &CronJob) -> StoreResult<()>;
    async fn delete_cron_job(&self, id: &str) -> StoreResult<()>;

    async fn upsert_market_index_entry(&self, entry: &MarketIndexEntry) -> StoreResult<()>;
    async fn get_market_index_content_hash(
        &self,
        platform: &str,
        market_id: &str,
    ) -> StoreResult<Option<String>>;
    async fn query_market_index(
        &self,
        platform: Option<&str>,
        text_filter: Option<&str>,
        limit: usize,
    ) -> StoreResult<Vec<MarketIndexEntry>>;
    async fn prune_market_index_before(
        &self,
        platform: &str,
        cutoff_ms: i64,
    ) -> StoreResult<u64>;

    async fn get_embedding(
        &self,
        platform: &str,
        market_id: &str,
        content_hash: &str,
    ) -> StoreResult<Option<Embedding>>;
    async fn put_embedding(&self, embedding: &Embedding) -> StoreResult<()>;

    async fn get_stop_loss_trigger(
        &self,
        user_id: &str,
        platform: Venue,
        outcome_id: &str,
    ) -> StoreResult<Option<StopLossTrigger>>;
    async fn upsert_stop_loss_trigger(&self, trigger: &StopLossTrigger) -> StoreResult<()>;

    async fn list_enabled_credentials(&self, user_id: &str) -> StoreResult<Vec<TradingCredential>>;
    async fn list_users_with_enabled_credentials(&self) -> StoreResult<Vec<String>>;
    async fn upsert_credential(&self, credential: &TradingCredential) -> StoreResult<()>;
}

/// Venue-facing read interface every venue adapter implements (§4.C).
#[async_trait]
pub trait VenueAdapter: Send + Sync {
    fn venue(&self) -> Venue;

    async fn list_positions(
        &self,
        credential: &TradingCredential,
    ) -> Result<Vec<RawPosition>, VenueError>;

    async fn get_market(&self, market_id: &str) -> Result<Market, VenueError>;
}

/// Status bucket a catalog page request is scoped to. `limitPerPlatform`
/// applies per bucket so closed/settled markets aren't starved whenever the
/// open bucket alone fills the limit. Venues whose listing endpoint accepts
/// a status filter (Kalshi, Metaculus) page each bucket separately; venues
/// with no such filter return their full listing once under `All` and
/// nothing for the other three buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStatus {
    Open,
    Closed,
    Settled,
    All,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Open => "open",
            ListingStatus::Closed => "closed",
            ListingStatus::Settled => "settled",
            ListingStatus::All => "all",
        }
    }
}

/// Venue catalog listing, consulted by `MarketIndex` ingestion only — a
/// narrower surface than `VenueAdapter` since perp venues have no market
/// catalog worth indexing (§4.D).
#[async_trait]
pub trait MarketListingSource: Send + Sync {
    fn venue(&self) -> Venue;

    async fn list_markets_page(
        &self,
        status: ListingStatus,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<MarketListing>, VenueError>;
}

/// Hand-off for the stop-loss engine. Only Polymarket/Kalshi/Manifold
/// implement this (§4.C); perp venues are read-only here.
#[async_trait]
pub trait ExecutionAdapter: Send + Sync {
    fn venue(&self) -> Venue;

    async fn execute_market_sell(
        &self,
        credential: &TradingCredential,
        market_id: &str,
        outcome_id: &str,
        size_or_all: SizeOrAll,
    ) -> Result<ExecutionReceipt, VenueError>;
}

#[derive(Debug, Clone, Copy)]
pub enum SizeOrAll {
    Shares(f64),
    All,
}

#[derive(Debug, Clone)]
pub struct ExecutionReceipt {
    pub signature: String,
}

/// Delivery capability for the Notifier (§4.I).
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_message(
        &self,
        channel: crate::domain::ids::Channel,
        chat_id: &str,
        text: &str,
    ) -> anyhow::Result<()>;
}
