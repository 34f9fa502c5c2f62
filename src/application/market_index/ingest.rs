//! Ingestion sweep: pages each venue's market catalog, hashes and upserts
//! changed entries, skips unchanged ones, and prunes stale rows after a
//! successful sync (§4.D).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::ids::Venue;
use crate::domain::market_index::{MarketIndexEntry, MarketListing};
use crate::domain::ports::{ListingStatus, MarketListingSource, Store};

use super::content_hash::hash_listing;

const PAGE_SIZE: usize = 100;
const PAGE_PACING: Duration = Duration::from_millis(100);

const STATUS_BUCKETS: [ListingStatus; 4] = [
    ListingStatus::Open,
    ListingStatus::Closed,
    ListingStatus::Settled,
    ListingStatus::All,
];

const SPORTS_TAGS: &[&str] = &[
    "sports", "nba", "nfl", "nhl", "mlb", "soccer", "football", "basketball", "tennis", "golf",
    "olympics", "ufc", "boxing",
];

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub limit_per_platform: usize,
    pub exclude_sports: bool,
    pub exclude_resolved: bool,
    pub min_liquidity: Option<f64>,
    pub min_volume: Option<f64>,
    pub min_open_interest: Option<f64>,
    pub min_predictions: Option<f64>,
    pub prune: bool,
    pub stale_after_ms: i64,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            limit_per_platform: 500,
            exclude_sports: false,
            exclude_resolved: false,
            min_liquidity: None,
            min_volume: None,
            min_open_interest: None,
            min_predictions: None,
            prune: true,
            stale_after_ms: 7 * 86_400_000,
        }
    }
}

pub struct Ingestor {
    store: Arc<dyn Store>,
    sources: Vec<Arc<dyn MarketListingSource>>,
}

impl Ingestor {
    pub fn new(store: Arc<dyn Store>, sources: Vec<Arc<dyn MarketListingSource>>) -> Self {
        Self { store, sources }
    }

    /// Returns the number of entries upserted per venue.
    pub async fn sync(&self, now_ms: i64, options: &SyncOptions) -> HashMap<String, u64> {
        let mut upserted_by_platform = HashMap::new();

        for source in &self.sources {
            let platform = source.venue();
            let count = self.sync_venue(platform, source.as_ref(), now_ms, options).await;
            upserted_by_platform.insert(platform.as_str().to_string(), count);
        }

        upserted_by_platform
    }

    async fn sync_venue(
        &self,
        platform: Venue,
        source: &dyn MarketListingSource,
        now_ms: i64,
        options: &SyncOptions,
    ) -> u64 {
        let mut upserted = 0u64;

        for status in STATUS_BUCKETS {
            upserted += self
                .sync_venue_status(platform, source, status, now_ms, options)
                .await;
        }

        if options.prune {
            let cutoff = now_ms - options.stale_after_ms;
            if let Err(err) = self
                .store
                .prune_market_index_before(platform.as_str(), cutoff)
                .await
            {
                tracing::warn!(%platform, error = %err, "prune failed");
            }
        }

        upserted
    }

    /// Pages a single status bucket, each bounded by `limit_per_platform` on
    /// its own so open markets filling the limit can't starve closed/settled
    /// ones out of the sync entirely.
    async fn sync_venue_status(
        &self,
        platform: Venue,
        source: &dyn MarketListingSource,
        status: ListingStatus,
        now_ms: i64,
        options: &SyncOptions,
    ) -> u64 {
        let mut upserted = 0u64;
        let mut page = 0usize;
        let mut seen = 0usize;

        loop {
            if seen >= options.limit_per_platform {
                break;
            }

            let listings = match source.list_markets_page(status, page, PAGE_SIZE).await {
                Ok(listings) => listings,
                Err(err) => {
                    tracing::warn!(%platform, status = status.as_str(), error = %err, "market listing page failed");
                    break;
                }
            };

            if listings.is_empty() {
                break;
            }

            for listing in &listings {
                seen += 1;
                if seen > options.limit_per_platform {
                    break;
                }

                if !passes_filters(listing, options) {
                    continue;
                }

                if self.upsert_if_changed(platform, listing, now_ms).await {
                    upserted += 1;
                }
            }

            page += 1;
            tokio::time::sleep(PAGE_PACING).await;
        }

        upserted
    }

    async fn upsert_if_changed(&self, platform: Venue, listing: &MarketListing, now_ms: i64) -> bool {
        let content_hash = hash_listing(platform.as_str(), listing);

        let existing = self
            .store
            .get_market_index_content_hash(platform.as_str(), &listing.market_id)
            .await
            .ok()
            .flatten();

        if existing.as_deref() == Some(content_hash.as_str()) {
            return false;
        }

        let entry = MarketIndexEntry {
            platform: platform.as_str().to_string(),
            market_id: listing.market_id.clone(),
            slug: listing.slug.clone(),
            question: listing.question.clone(),
            description: listing.description.clone(),
            outcomes_json: listing.outcomes_json.clone(),
            tags_json: serde_json::to_string(&listing.tags).unwrap_or_else(|_| "[]".to_string()),
            status: listing.status.clone(),
            url: listing.url.clone(),
            end_date: listing.end_date,
            resolved: listing.resolved,
            volume_24h: listing.volume_24h,
            liquidity: listing.liquidity,
            open_interest: listing.open_interest,
            predictions: listing.predictions,
            content_hash,
            updated_at_ms: now_ms,
        };

        match self.store.upsert_market_index_entry(&entry).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%platform, market_id = %listing.market_id, error = %err, "upsert failed");
                false
            }
        }
    }
}

fn passes_filters(listing: &MarketListing, options: &SyncOptions) -> bool {
    if options.exclude_resolved && listing.resolved {
        return false;
    }

    if listing.status == "settled" && !listing.resolved {
        return false;
    }

    if options.exclude_sports {
        let tag_set: HashSet<String> = listing.tags.iter().map(|t| t.to_lowercase()).collect();
        if SPORTS_TAGS.iter().any(|s| tag_set.contains(*s)) {
            return false;
        }
    }

    if let Some(min) = options.min_liquidity {
        if listing.liquidity.unwrap_or(0.0) < min {
            return false;
        }
    }
    if let Some(min) = options.min_volume {
        if listing.volume_24h.unwrap_or(0.0) < min {
            return false;
        }
    }
    if let Some(min) = options.min_open_interest {
        if listing.open_interest.unwrap_or(0.0) < min {
            return false;
        }
    }
    if let Some(min) = options.min_predictions {
        if listing.predictions.unwrap_or(0.0) < min {
            return false;
        }
    }

    true
}
