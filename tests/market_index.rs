//! Cache coherence scenario: a venue listing is ingested, searched (which
//! embeds it once), then its description changes upstream. The next sync
//! must store a new content hash and discard the stale embedding, and the
//! next search must re-embed under the new hash rather than reuse the old
//! vector.

use std::sync::Mutex;
use std::sync::Arc;

use agent_core::application::market_index::{Ingestor, Search, SearchOptions, SyncOptions};
use agent_core::domain::errors::VenueError;
use agent_core::domain::ids::Venue;
use agent_core::domain::market_index::MarketListing;
use agent_core::domain::ports::{ListingStatus, MarketListingSource, Store};
use agent_core::infrastructure::persistence::{Database, SqliteStore};
use async_trait::async_trait;

struct SingleListingSource {
    listing: Mutex<MarketListing>,
}

#[async_trait]
impl MarketListingSource for SingleListingSource {
    fn venue(&self) -> Venue {
        Venue::Polymarket
    }

    async fn list_markets_page(
        &self,
        status: ListingStatus,
        page: usize,
        _page_size: usize,
    ) -> Result<Vec<MarketListing>, VenueError> {
        if status != ListingStatus::All || page > 0 {
            return Ok(vec![]);
        }
        Ok(vec![self.listing.lock().unwrap().clone()])
    }
}

fn base_listing() -> MarketListing {
    MarketListing {
        market_id: "m1".into(),
        slug: "fed-rate-cut".into(),
        question: "Will the Fed cut rates in March?".into(),
        description: "Tracks the FOMC decision.".into(),
        outcomes_json: "[]".into(),
        tags: vec!["economy".into()],
        status: "open".into(),
        url: "https://example.com/m1".into(),
        end_date: None,
        resolved: false,
        volume_24h: Some(1000.0),
        liquidity: Some(500.0),
        open_interest: None,
        predictions: None,
    }
}

#[tokio::test]
async fn content_change_invalidates_the_cached_embedding() {
    let db = Database::new("sqlite::memory:").await.unwrap();
    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(db.pool));

    let source = Arc::new(SingleListingSource {
        listing: Mutex::new(base_listing()),
    });
    let sources: Vec<Arc<dyn MarketListingSource>> = vec![source.clone()];
    let ingestor = Ingestor::new(store.clone(), sources);
    let search = Search::new(store.clone());

    let counts = ingestor.sync(1_000, &SyncOptions::default()).await;
    assert_eq!(counts.get("polymarket").copied(), Some(1));

    let hash_after_first_sync = store
        .get_market_index_content_hash("polymarket", "m1")
        .await
        .unwrap()
        .expect("entry should be indexed");

    let hits = search
        .query("decision", &SearchOptions::default())
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);

    let embedding_after_first_search = store
        .get_embedding("polymarket", "m1", &hash_after_first_sync)
        .await
        .unwrap()
        .expect("first search should embed the entry");

    {
        let mut listing = source.listing.lock().unwrap();
        listing.description = "Tracks the FOMC's March decision on the federal funds rate.".into();
    }

    let counts = ingestor.sync(2_000, &SyncOptions::default()).await;
    assert_eq!(counts.get("polymarket").copied(), Some(1), "changed description should re-upsert");

    let hash_after_second_sync = store
        .get_market_index_content_hash("polymarket", "m1")
        .await
        .unwrap()
        .expect("entry should still be indexed");
    assert_ne!(hash_after_first_sync, hash_after_second_sync);

    assert!(
        store
            .get_embedding("polymarket", "m1", &hash_after_second_sync)
            .await
            .unwrap()
            .is_none(),
        "the embedding cached under the old hash must not satisfy a lookup under the new hash"
    );

    let hits = search
        .query("decision", &SearchOptions::default())
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);

    let embedding_after_second_search = store
        .get_embedding("polymarket", "m1", &hash_after_second_sync)
        .await
        .unwrap()
        .expect("second search should re-embed under the new hash");
    assert_ne!(
        embedding_after_first_search.content_hash,
        embedding_after_second_search.content_hash
    );
}

#[tokio::test]
async fn unchanged_listing_is_not_reupserted_on_second_sync() {
    let db = Database::new("sqlite::memory:").await.unwrap();
    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(db.pool));

    let source = Arc::new(SingleListingSource {
        listing: Mutex::new(base_listing()),
    });
    let sources: Vec<Arc<dyn MarketListingSource>> = vec![source];
    let ingestor = Ingestor::new(store, sources);

    let first = ingestor.sync(1_000, &SyncOptions::default()).await;
    assert_eq!(first.get("polymarket").copied(), Some(1));

    let second = ingestor.sync(2_000, &SyncOptions::default()).await;
    assert_eq!(second.get("polymarket").copied(), Some(0), "idempotent resync of unchanged content upserts nothing");
}
