use serde::{Deserialize, Serialize};

/// Venue-native shape returned by a listing page, before content hashing
/// and persistence turn it into a `MarketIndexEntry`.
#[derive(Debug, Clone)]
pub struct MarketListing {
    pub market_id: String,
    pub slug: String,
    pub question: String,
    pub description: String,
    pub outcomes_json: String,
    pub tags: Vec<String>,
    pub status: String,
    pub url: String,
    pub end_date: Option<i64>,
    pub resolved: bool,
    pub volume_24h: Option<f64>,
    pub liquidity: Option<f64>,
    pub open_interest: Option<f64>,
    pub predictions: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketIndexEntry {
    pub platform: String,
    pub market_id: String,
    pub slug: String,
    pub question: String,
    pub description: String,
    /// Raw JSON blobs, kept opaque to the core beyond hashing/search.
    pub outcomes_json: String,
    pub tags_json: String,
    pub status: String,
    pub url: String,
    pub end_date: Option<i64>,
    pub resolved: bool,
    pub volume_24h: Option<f64>,
    pub liquidity: Option<f64>,
    pub open_interest: Option<f64>,
    pub predictions: Option<f64>,
    pub content_hash: String,
    pub updated_at_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedding {
    pub platform: String,
    pub market_id: String,
    pub content_hash: String,
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub entry: MarketIndexEntry,
    pub score: f64,
}
