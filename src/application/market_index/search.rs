//! Hybrid lexical + embedding search over the market catalog (§4.D).

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::market_index::{Embedding, MarketIndexEntry, SearchHit};
use crate::domain::ports::Store;

use super::content_hash::hash_entry;
use super::embedding::{cosine_similarity, embed};

const DEFAULT_LIMIT: usize = 10;
const DEFAULT_MAX_CANDIDATES: usize = 1500;
const LEXICAL_PREFILTER_MIN_LEN: usize = 3;
const LEXICAL_MATCH_BOOST: f64 = 0.02;
const LEXICAL_BOOST_CAP: f64 = 0.15;

pub struct SearchOptions {
    pub platform: Option<String>,
    pub limit: usize,
    pub max_candidates: usize,
    pub min_score: Option<f64>,
    pub platform_weights: HashMap<String, f64>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            platform: None,
            limit: DEFAULT_LIMIT,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            min_score: None,
            platform_weights: HashMap::new(),
        }
    }
}

pub struct Search {
    store: Arc<dyn Store>,
}

impl Search {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn query(&self, query: &str, options: &SearchOptions) -> anyhow::Result<Vec<SearchHit>> {
        let text_filter = if query.chars().count() >= LEXICAL_PREFILTER_MIN_LEN {
            Some(query)
        } else {
            None
        };

        let candidates = self
            .store
            .query_market_index(options.platform.as_deref(), text_filter, options.max_candidates)
            .await?;

        let mut missing = Vec::new();
        let mut cached = HashMap::new();
        for entry in &candidates {
            let fresh_hash = hash_entry(entry);
            match self
                .store
                .get_embedding(&entry.platform, &entry.market_id, &fresh_hash)
                .await?
            {
                Some(embedding) => {
                    cached.insert((entry.platform.clone(), entry.market_id.clone()), embedding);
                }
                None => missing.push((entry.clone(), fresh_hash)),
            }
        }

        for (entry, content_hash) in missing {
            let vector = embed(&search_text(&entry));
            let embedding = Embedding {
                platform: entry.platform.clone(),
                market_id: entry.market_id.clone(),
                content_hash,
                vector,
            };
            self.store.put_embedding(&embedding).await?;
            cached.insert((entry.platform.clone(), entry.market_id.clone()), embedding);
        }

        let query_vector = embed(query);

        let mut hits: Vec<SearchHit> = candidates
            .into_iter()
            .filter_map(|entry| {
                let key = (entry.platform.clone(), entry.market_id.clone());
                let embedding = cached.get(&key)?;
                let weight = options
                    .platform_weights
                    .get(&entry.platform)
                    .copied()
                    .unwrap_or(1.0);
                let cosine = cosine_similarity(&query_vector, &embedding.vector);
                let lexical = lexical_boost(query, &entry);
                let score = cosine * weight + lexical;
                Some(SearchHit { entry, score })
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        if let Some(min_score) = options.min_score {
            hits.retain(|h| h.score >= min_score);
        }

        hits.truncate(options.limit);
        Ok(hits)
    }
}

fn search_text(entry: &MarketIndexEntry) -> String {
    format!(
        "{} {} {} {}",
        entry.question, entry.description, entry.outcomes_json, entry.tags_json
    )
}

fn lexical_boost(query: &str, entry: &MarketIndexEntry) -> f64 {
    let haystack = search_text(entry).to_lowercase();
    let matches = query
        .split_whitespace()
        .filter(|term| term.chars().count() > 2)
        .filter(|term| haystack.contains(&term.to_lowercase()))
        .count();

    (matches as f64 * LEXICAL_MATCH_BOOST).min(LEXICAL_BOOST_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> MarketIndexEntry {
        MarketIndexEntry {
            platform: "polymarket".into(),
            market_id: "m1".into(),
            slug: "fed-rate-cut".into(),
            question: "Will the Fed cut rates in March?".into(),
            description: "Tracks the FOMC decision.".into(),
            outcomes_json: "[]".into(),
            tags_json: "[\"economy\"]".into(),
            status: "open".into(),
            url: "https://example.com".into(),
            end_date: None,
            resolved: false,
            volume_24h: None,
            liquidity: None,
            open_interest: None,
            predictions: None,
            content_hash: "h".into(),
            updated_at_ms: 0,
        }
    }

    #[test]
    fn lexical_boost_caps_at_the_configured_ceiling() {
        let boost = lexical_boost("fed rate cut march decision fomc tracks economy", &entry());
        assert!(boost <= LEXICAL_BOOST_CAP + 1e-9);
    }

    #[test]
    fn lexical_boost_ignores_short_terms() {
        let boost = lexical_boost("a an the", &entry());
        assert_eq!(boost, 0.0);
    }
}
