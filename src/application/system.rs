//! Assembles every capability and engine into one running system, mirroring
//! an `Application::build`/`start` split: `build` constructs the
//! Store/HTTP fabric/venue adapters/engines with no side effects beyond
//! opening the database, `start` seeds scheduled jobs and spawns the
//! background tasks, and `stop` signals them to drain.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::Config;
use crate::domain::ports::{Clock, ExecutionAdapter, MarketListingSource, Store, VenueAdapter};
use crate::infrastructure::http::HttpFabric;
use crate::infrastructure::persistence::{Database, SqliteStore};
use crate::infrastructure::venues::{
    binance::BinanceAdapter, bybit::BybitAdapter, feeds::Feeds, hyperliquid::HyperliquidAdapter,
    kalshi::KalshiAdapter, manifold::ManifoldAdapter, metaculus::MetaculusAdapter,
    mexc::MexcAdapter, polymarket::PolymarketAdapter,
};
use crate::infrastructure::observability::{Metrics, MetricsReporter};

use super::alerts::AlertEngine;
use super::clock::SystemClock;
use super::market_index::{Ingestor, Search, SyncOptions};
use super::notify::{LogMessageSender, Notifier};
use super::portfolio::SyncEngine;
use super::scheduler::{JobHandlers, Scheduler};
use super::stop_loss::StopLossEngine;

/// Shared, injectable capabilities. Every engine is built from these, never
/// from one another, so nothing holds a back-pointer into the system.
pub struct AppContext {
    pub store: Arc<dyn Store>,
    pub http: Arc<HttpFabric>,
    pub feeds: Arc<Feeds>,
    pub clock: Arc<dyn Clock>,
    pub notifier: Arc<Notifier>,
}

pub struct Application {
    pub config: Config,
    pub context: AppContext,
    pub alerts: Arc<AlertEngine>,
    pub portfolio: Arc<SyncEngine>,
    pub stop_loss: Arc<StopLossEngine>,
    pub ingestor: Arc<Ingestor>,
    pub search: Arc<Search>,
    pub scheduler: Arc<Scheduler>,
    pub metrics: Metrics,
}

/// Handle returned by `start`, holding the join handles and shutdown
/// signal needed to drain the system cleanly.
pub struct SystemHandle {
    pub context: AppContext,
    pub search: Arc<Search>,
    shutdown_tx: watch::Sender<bool>,
    scheduler_task: JoinHandle<()>,
    index_task: JoinHandle<()>,
    reporter_task: Option<JoinHandle<()>>,
}

impl Application {
    pub async fn build(config: Config) -> Result<Self> {
        let database = Database::new(&config.database_url).await?;
        let store: Arc<dyn Store> = Arc::new(SqliteStore::new(database.pool));

        let http = Arc::new(HttpFabric::new(&config.http));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let read_adapters: Vec<Arc<dyn VenueAdapter>> = vec![
            Arc::new(PolymarketAdapter::new(http.clone())),
            Arc::new(KalshiAdapter::new(http.clone())),
            Arc::new(ManifoldAdapter::new(http.clone())),
            Arc::new(MetaculusAdapter::new(http.clone())),
            Arc::new(BinanceAdapter::new(http.clone())),
            Arc::new(BybitAdapter::new(http.clone())),
            Arc::new(HyperliquidAdapter::new(http.clone())),
            Arc::new(MexcAdapter::new(http.clone())),
        ];
        let feeds = Arc::new(Feeds::new(read_adapters));

        let executors: Vec<Arc<dyn ExecutionAdapter>> = vec![
            Arc::new(PolymarketAdapter::new(http.clone())),
            Arc::new(KalshiAdapter::new(http.clone())),
            Arc::new(ManifoldAdapter::new(http.clone())),
        ];

        let listing_sources: Vec<Arc<dyn MarketListingSource>> = vec![
            Arc::new(PolymarketAdapter::new(http.clone())),
            Arc::new(KalshiAdapter::new(http.clone())),
            Arc::new(ManifoldAdapter::new(http.clone())),
            Arc::new(MetaculusAdapter::new(http.clone())),
        ];

        let sender = Arc::new(LogMessageSender);
        let notifier = Arc::new(Notifier::new(store.clone(), sender));

        let alerts = Arc::new(AlertEngine::new(store.clone(), feeds.clone(), notifier.clone()));

        let venue_adapters_for_sync: Vec<Arc<dyn VenueAdapter>> = vec![
            Arc::new(PolymarketAdapter::new(http.clone())),
            Arc::new(KalshiAdapter::new(http.clone())),
            Arc::new(ManifoldAdapter::new(http.clone())),
            Arc::new(MetaculusAdapter::new(http.clone())),
            Arc::new(BinanceAdapter::new(http.clone())),
            Arc::new(BybitAdapter::new(http.clone())),
            Arc::new(HyperliquidAdapter::new(http.clone())),
            Arc::new(MexcAdapter::new(http.clone())),
        ];
        let portfolio = Arc::new(SyncEngine::new(
            store.clone(),
            venue_adapters_for_sync,
            clock.clone(),
        ));

        let stop_loss = Arc::new(StopLossEngine::new(
            store.clone(),
            executors,
            notifier.clone(),
            clock.clone(),
            config.trading.dry_run,
            Some(config.trading.stoploss_cooldown_ms),
        ));

        let ingestor = Arc::new(Ingestor::new(store.clone(), listing_sources));
        let search = Arc::new(Search::new(store.clone()));

        let handlers = JobHandlers {
            alerts: alerts.clone(),
            portfolio: portfolio.clone(),
            stop_loss: stop_loss.clone(),
            notifier: notifier.clone(),
        };
        let scheduler = Arc::new(Scheduler::new(
            store.clone(),
            clock.clone(),
            handlers,
            config.scheduler.clone(),
        ));

        let metrics = Metrics::new()?;

        let context = AppContext {
            store,
            http,
            feeds,
            clock,
            notifier,
        };

        Ok(Self {
            config,
            context,
            alerts,
            portfolio,
            stop_loss,
            ingestor,
            search,
            scheduler,
            metrics,
        })
    }

    pub async fn start(self) -> Result<SystemHandle> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        info!("running initial market index sync...");
        let sync_options = SyncOptions {
            limit_per_platform: self.config.market_index.limit_per_platform,
            stale_after_ms: self.config.market_index.stale_after_ms,
            ..SyncOptions::default()
        };
        let now_ms = self.context.clock.now_ms();
        let counts = self.ingestor.sync(now_ms, &sync_options).await;
        info!(?counts, "initial market index sync complete");

        let scheduler = self.scheduler.clone();
        let scheduler_shutdown = shutdown_rx.clone();
        let scheduler_task = tokio::spawn(async move {
            scheduler.run(scheduler_shutdown).await;
        });

        let ingestor = self.ingestor.clone();
        let clock = self.context.clock.clone();
        let mut index_shutdown = shutdown_rx.clone();
        let index_interval_ms = self.config.market_index.stale_after_ms.max(3_600_000) as u64 / 24;
        let index_task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(index_interval_ms));
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let now_ms = clock.now_ms();
                        let counts = ingestor.sync(now_ms, &sync_options).await;
                        tracing::debug!(?counts, "periodic market index sync complete");
                    }
                    _ = index_shutdown.changed() => {
                        if *index_shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        let reporter_task = if self.config.observability.enabled {
            let reporter = MetricsReporter::new(
                self.context.store.clone(),
                self.metrics.clone(),
                self.config.observability.report_interval_secs,
            );
            Some(tokio::spawn(async move {
                reporter.run().await;
            }))
        } else {
            None
        };

        Ok(SystemHandle {
            context: self.context,
            search: self.search,
            shutdown_tx,
            scheduler_task,
            index_task,
            reporter_task,
        })
    }
}

impl SystemHandle {
    /// Signals every background task to stop and waits up to 10s for the
    /// scheduler to finish its current tick before returning.
    pub async fn stop(self) -> Result<()> {
        let _ = self.shutdown_tx.send(true);

        if tokio::time::timeout(Duration::from_secs(10), self.scheduler_task)
            .await
            .is_err()
        {
            tracing::warn!("scheduler task did not drain within timeout");
        }

        self.index_task.abort();
        if let Some(reporter_task) = self.reporter_task {
            reporter_task.abort();
        }

        Ok(())
    }
}
