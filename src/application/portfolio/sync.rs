//! Per-user, per-venue position reconciliation and snapshot accounting
//! (§4.G). Users run concurrently up to a bounded pool; each user's venues
//! are synced serially so a single user's credential failures stay
//! isolated from the others running in parallel.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use uuid::Uuid;

use crate::domain::credentials::TradingCredential;
use crate::domain::ids::Venue;
use crate::domain::portfolio_snapshot::{PlatformTotals, PortfolioSnapshot};
use crate::domain::position::{Position, RawPosition, Side};
use crate::domain::ports::{Clock, Store, VenueAdapter};

const DEFAULT_CONCURRENCY: usize = 4;
const SNAPSHOT_RETENTION_DAYS: i64 = 90;

pub struct SyncEngine {
    store: Arc<dyn Store>,
    venues: HashMap<Venue, Arc<dyn VenueAdapter>>,
    clock: Arc<dyn Clock>,
    concurrency: usize,
}

impl SyncEngine {
    pub fn new(
        store: Arc<dyn Store>,
        venues: Vec<Arc<dyn VenueAdapter>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            venues: venues.into_iter().map(|v| (v.venue(), v)).collect(),
            clock,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub async fn sync_all(&self) {
        let user_ids = match self.store.list_users_with_enabled_credentials().await {
            Ok(ids) => ids,
            Err(err) => {
                tracing::error!(error = %err, "could not list users with trading credentials");
                return;
            }
        };

        stream::iter(user_ids)
            .for_each_concurrent(self.concurrency, |user_id| async move {
                self.sync_user(&user_id).await;
            })
            .await;

        let cutoff = self.clock.now_ms() - SNAPSHOT_RETENTION_DAYS * 86_400_000;
        if let Err(err) = self.store.prune_portfolio_snapshots_before(cutoff).await {
            tracing::warn!(error = %err, "failed pruning portfolio snapshots");
        }
    }

    async fn sync_user(&self, user_id: &str) {
        let credentials = match self.store.list_enabled_credentials(user_id).await {
            Ok(c) => c,
            Err(err) => {
                tracing::warn!(user_id, error = %err, "could not load credentials");
                return;
            }
        };

        for credential in credentials {
            self.sync_venue(user_id, &credential).await;
        }

        if let Err(err) = self.record_snapshot(user_id).await {
            tracing::warn!(user_id, error = %err, "could not record portfolio snapshot");
        }
    }

    async fn sync_venue(&self, user_id: &str, credential: &TradingCredential) {
        let Some(adapter) = self.venues.get(&credential.platform) else {
            return;
        };

        let mut updated = credential.clone();
        match adapter.list_positions(credential).await {
            Ok(raw_positions) => {
                if let Err(err) = self.reconcile(user_id, credential.platform, raw_positions).await {
                    tracing::warn!(user_id, platform = %credential.platform, error = %err, "reconciliation failed");
                }
                updated.last_success_at_ms = Some(self.clock.now_ms());
                updated.last_error = None;
            }
            Err(err) => {
                updated.last_failure_at_ms = Some(self.clock.now_ms());
                updated.last_error = Some(err.to_string());
            }
        }

        if let Err(err) = self.store.upsert_credential(&updated).await {
            tracing::warn!(user_id, error = %err, "could not persist credential status");
        }
    }

    async fn reconcile(
        &self,
        user_id: &str,
        platform: Venue,
        raw_positions: Vec<RawPosition>,
    ) -> anyhow::Result<()> {
        let current_ids: HashSet<String> = raw_positions.iter().map(|p| p.outcome_id.clone()).collect();

        for raw in raw_positions {
            let mut position = Position {
                id: Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                platform,
                market_id: raw.market_id,
                outcome_id: raw.outcome_id,
                side: derive_side(platform, &raw),
                shares: raw.size.abs(),
                avg_price: raw.entry_price,
                current_price: raw.mark_price,
                pnl: 0.0,
                pnl_pct: 0.0,
                value: 0.0,
                opened_at_ms: self.clock.now_ms(),
            };
            position.recompute_derived();
            self.store.upsert_position(&position).await?;
        }

        for existing in self.store.list_positions(user_id).await? {
            if existing.platform == platform && !current_ids.contains(&existing.outcome_id) {
                self.store.delete_position(user_id, &existing.outcome_id).await?;
            }
        }

        Ok(())
    }

    async fn record_snapshot(&self, user_id: &str) -> anyhow::Result<()> {
        let positions = self.store.list_positions(user_id).await?;

        let mut by_platform: HashMap<String, PlatformTotals> = HashMap::new();
        let mut total_value = 0.0;
        let mut total_cost_basis = 0.0;
        let mut total_pnl = 0.0;

        for position in &positions {
            total_value += position.value;
            total_cost_basis += position.shares * position.avg_price;
            total_pnl += position.pnl;

            let entry = by_platform
                .entry(position.platform.as_str().to_string())
                .or_insert(PlatformTotals { value: 0.0, pnl: 0.0 });
            entry.value += position.value;
            entry.pnl += position.pnl;
        }

        let total_pnl_pct = if total_cost_basis != 0.0 {
            total_pnl / total_cost_basis * 100.0
        } else {
            0.0
        };

        let snapshot = PortfolioSnapshot {
            user_id: user_id.to_string(),
            ts_ms: self.clock.now_ms(),
            total_value,
            total_pnl,
            total_pnl_pct,
            total_cost_basis,
            positions_count: positions.len(),
            by_platform,
        };

        self.store.append_portfolio_snapshot(&snapshot).await?;
        Ok(())
    }
}

fn derive_side(platform: Venue, raw: &RawPosition) -> Side {
    if platform.supports_execution() {
        crate::infrastructure::venues::normalize::derive_outcome_side(&raw.outcome_name)
    } else {
        crate::infrastructure::venues::normalize::derive_perp_side(raw.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_yes_side_from_outcome_name() {
        let raw = RawPosition {
            outcome_id: "m1-YES".into(),
            market_id: "m1".into(),
            outcome_name: "Yes".into(),
            size: 10.0,
            entry_price: 0.4,
            mark_price: 0.5,
            unrealized_pnl: None,
        };
        assert_eq!(derive_side(Venue::Polymarket, &raw), Side::Yes);
    }

    #[test]
    fn derives_short_side_from_negative_perp_size_on_perp_venues() {
        let raw = RawPosition {
            outcome_id: "BTC".into(),
            market_id: "BTC".into(),
            outcome_name: "BTC-PERP".into(),
            size: -5.0,
            entry_price: 40000.0,
            mark_price: 41000.0,
            unrealized_pnl: None,
        };
        assert_eq!(derive_side(Venue::Hyperliquid, &raw), Side::Short);
    }
}
