//! Manifold adapter. Endpoint shapes: `GET /v0/bets?userId=`,
//! `GET /v0/market/:id`, `POST /v0/market/:id/sell`. NO-side price derives
//! via [`super::normalize::manifold_no_price`].

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::credentials::TradingCredential;
use crate::domain::errors::VenueError;
use crate::domain::ids::Venue;
use crate::domain::market::{Market, Outcome};
use crate::domain::market_index::MarketListing;
use crate::domain::ports::{
    ExecutionAdapter, ExecutionReceipt, ListingStatus, MarketListingSource, SizeOrAll, VenueAdapter,
};
use crate::domain::position::RawPosition;
use crate::infrastructure::http::SharedHttpFabric;

use super::normalize::manifold_no_price;

const BETS_URL: &str = "https://api.manifold.markets/v0/bets";
const MARKET_URL: &str = "https://api.manifold.markets/v0/market";
const MARKETS_LIST_URL: &str = "https://api.manifold.markets/v0/markets";

#[derive(Deserialize)]
struct ManifoldBet {
    #[serde(rename = "contractId")]
    contract_id: String,
    shares: f64,
    #[serde(rename = "probBefore")]
    prob_before: f64,
    outcome: String,
}

#[derive(Deserialize)]
struct ManifoldMarket {
    id: String,
    question: String,
    probability: f64,
    #[serde(rename = "volume24Hours")]
    volume_24_hours: Option<f64>,
}

pub struct ManifoldAdapter {
    http: SharedHttpFabric,
}

impl ManifoldAdapter {
    pub fn new(http: SharedHttpFabric) -> Self {
        Self { http }
    }
}

#[async_trait]
impl VenueAdapter for ManifoldAdapter {
    fn venue(&self) -> Venue {
        Venue::Manifold
    }

    async fn list_positions(
        &self,
        credential: &TradingCredential,
    ) -> Result<Vec<RawPosition>, VenueError> {
        let bets: Vec<ManifoldBet> = self
            .http
            .get_json(BETS_URL, &[("userId", credential.user_id.as_str())])
            .await?;

        Ok(bets
            .into_iter()
            .map(|b| {
                let is_no = b.outcome.eq_ignore_ascii_case("NO");
                let mark = if is_no {
                    manifold_no_price(b.prob_before)
                } else {
                    b.prob_before
                };
                RawPosition {
                    outcome_id: format!("{}-{}", b.contract_id, b.outcome),
                    market_id: b.contract_id,
                    outcome_name: b.outcome,
                    size: b.shares,
                    entry_price: mark,
                    mark_price: mark,
                    unrealized_pnl: None,
                }
            })
            .collect())
    }

    async fn get_market(&self, market_id: &str) -> Result<Market, VenueError> {
        let url = format!("{MARKET_URL}/{market_id}");
        let market: ManifoldMarket = self.http.get_json(&url, &[]).await?;

        Ok(Market {
            platform: Venue::Manifold.as_str().to_string(),
            market_id: market.id,
            question: market.question,
            outcomes: vec![
                Outcome {
                    name: "Yes".to_string(),
                    price: market.probability,
                    previous_price: None,
                },
                Outcome {
                    name: "No".to_string(),
                    price: manifold_no_price(market.probability),
                    previous_price: None,
                },
            ],
            volume_24h: market.volume_24_hours,
            fetched_at_ms: chrono::Utc::now().timestamp_millis(),
        })
    }
}

#[derive(Deserialize)]
struct ManifoldMarketListing {
    id: String,
    slug: String,
    question: String,
    #[serde(rename = "textDescription")]
    text_description: Option<String>,
    #[serde(rename = "groupSlugs")]
    group_slugs: Option<Vec<String>>,
    #[serde(rename = "isResolved")]
    is_resolved: bool,
    #[serde(rename = "closeTime")]
    close_time: Option<i64>,
    volume: Option<f64>,
}

#[async_trait]
impl MarketListingSource for ManifoldAdapter {
    fn venue(&self) -> Venue {
        Venue::Manifold
    }

    async fn list_markets_page(
        &self,
        status: ListingStatus,
        _page: usize,
        page_size: usize,
    ) -> Result<Vec<MarketListing>, VenueError> {
        // The listing endpoint has no status filter; the full catalog is
        // fetched once under the `All` bucket and skipped for the other
        // three so it isn't re-fetched (and re-upserted) four times over.
        if status != ListingStatus::All {
            return Ok(vec![]);
        }
        let limit = page_size.to_string();
        let markets: Vec<ManifoldMarketListing> = self
            .http
            .get_json(MARKETS_LIST_URL, &[("limit", &limit)])
            .await?;

        Ok(markets
            .into_iter()
            .map(|m| MarketListing {
                market_id: m.id,
                slug: m.slug.clone(),
                question: m.question,
                description: m.text_description.unwrap_or_default(),
                outcomes_json: "[]".to_string(),
                tags: m.group_slugs.unwrap_or_default(),
                status: if m.is_resolved { "settled" } else { "open" }.to_string(),
                url: format!("https://manifold.markets/market/{}", m.slug),
                end_date: m.close_time,
                resolved: m.is_resolved,
                volume_24h: m.volume,
                liquidity: None,
                open_interest: None,
                predictions: None,
            })
            .collect())
    }
}

#[async_trait]
impl ExecutionAdapter for ManifoldAdapter {
    fn venue(&self) -> Venue {
        Venue::Manifold
    }

    async fn execute_market_sell(
        &self,
        _credential: &TradingCredential,
        market_id: &str,
        outcome_id: &str,
        _size_or_all: SizeOrAll,
    ) -> Result<ExecutionReceipt, VenueError> {
        Err(VenueError::Unreachable(format!(
            "manifold execution hand-off not wired for market {market_id} outcome {outcome_id}"
        )))
    }
}
