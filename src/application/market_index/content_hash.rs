//! Deterministic content hashing for `MarketIndexEntry` rows. Hashing is
//! restricted to the fields that describe *what the market is* (question,
//! description, outcomes, tags, status, resolution) rather than its
//! volatile trading stats (volume/liquidity/open interest), so a sync that
//! only refreshes 24h volume doesn't invalidate every cached embedding —
//! recorded as an Open Question resolution in DESIGN.md.

use serde_json::json;
use sha2::{Digest, Sha256};

use crate::domain::market_index::{MarketIndexEntry, MarketListing};

pub fn hash_listing(platform: &str, listing: &MarketListing) -> String {
    let canonical = json!({
        "platform": platform,
        "marketId": listing.market_id,
        "slug": listing.slug,
        "question": listing.question,
        "description": listing.description,
        "outcomesJson": listing.outcomes_json,
        "tags": sorted(&listing.tags),
        "status": listing.status,
        "url": listing.url,
        "endDate": listing.end_date,
        "resolved": listing.resolved,
    });

    hash_canonical_value(&canonical)
}

/// Recomputes the same canonical hash directly from a stored entry, for
/// search's cache-coherence check (`stored.contentHash == hash(entry)`).
pub fn hash_entry(entry: &MarketIndexEntry) -> String {
    let canonical = json!({
        "platform": entry.platform,
        "marketId": entry.market_id,
        "slug": entry.slug,
        "question": entry.question,
        "description": entry.description,
        "outcomesJson": entry.outcomes_json,
        "tags": sorted_json_tags(&entry.tags_json),
        "status": entry.status,
        "url": entry.url,
        "endDate": entry.end_date,
        "resolved": entry.resolved,
    });

    hash_canonical_value(&canonical)
}

fn sorted_json_tags(tags_json: &str) -> Vec<String> {
    let mut tags: Vec<String> = serde_json::from_str(tags_json).unwrap_or_default();
    tags.sort();
    tags
}

fn sorted(tags: &[String]) -> Vec<String> {
    let mut sorted = tags.to_vec();
    sorted.sort();
    sorted
}

fn hash_canonical_value(value: &serde_json::Value) -> String {
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    hex::encode(hasher.finalize())
}
