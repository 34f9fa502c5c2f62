//! Polymarket adapter: CLOB positions + Gamma market read + (stubbed)
//! order execution. Endpoint shapes: `GET /positions?user=`,
//! `GET gamma /events`.

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

const POSITIONS_BASE: &str = "https://data-api.polymarket.com/positions";
const GAMMA_EVENT_BASE: &str = "https://gamma-api.polymarket.com/events";

#[derive(Deserialize)]
struct RawPolymarketPosition {
    #[serde(rename = "asset")]
    outcome_id: String,
    #[serde(rename = "conditionId")]
    market_id: String,
    outcome: String,
    size: f64,
    #[serde(rename = "avgPrice")]
    avg_price: f64,
    #[serde(rename = "curPrice")]
    cur_price: f64,
}

#[derive(Deserialize)]
struct GammaOutcome {
    name: String,
    price: f64,
}

#[derive(Deserialize)]
struct GammaEvent {
    #[serde(rename = "conditionId")]
    condition_id: String,
    question: String,
    outcomes: Vec<GammaOutcome>,
    volume24hr: Option<f64>,
}

pub struct PolymarketAdapter {
    http: SharedHttpFabric,
}

impl PolymarketAdapter {
    pub fn new(http: SharedHttpFabric) -> Self {
        Self { http }
    }
}

#[async_trait]
impl VenueAdapter for PolymarketAdapter {
    fn venue(&self) -> Venue {
        Venue::Polymarket
    }

    async fn list_positions(
        &self,
        credential: &TradingCredential,
    ) -> Result<Vec<RawPosition>, VenueError> {
        // Credential material (wallet address resolution) is out of scope;
        // the user id stands in for whatever the Credentials adapter
        // resolves it to upstream of this call.
        let raw: Vec<RawPolymarketPosition> = self
            .http
            .get_json(POSITIONS_BASE, &[("user", credential.user_id.as_str())])
            .await?;

        Ok(raw
            .into_iter()
            .map(|p| RawPosition {
                outcome_id: p.outcome_id,
                market_id: p.market_id,
                outcome_name: p.outcome,
                size: p.size,
                entry_price: p.avg_price,
                mark_price: p.cur_price,
                unrealized_pnl: None,
            })
            .collect())
    }

    async fn get_market(&self, market_id: &str) -> Result<Market, VenueError> {
        let event: GammaEvent = self
            .http
            .get_json(GAMMA_EVENT_BASE, &[("condition_id", market_id)])
            .await?;

        Ok(Market {
            platform: Venue::Polymarket.as_str().to_string(),
            market_id: event.condition_id,
            question: event.question,
            outcomes: event
                .outcomes
                .into_iter()
                .map(|o| Outcome {
                    name: o.name,
                    price: o.price,
                    previous_price: None,
                })
                .collect(),
            volume_24h: event.volume24hr,
            fetched_at_ms: chrono::Utc::now().timestamp_millis(),
        })
    }
}

#[derive(Deserialize)]
struct GammaEventListing {
    #[serde(rename = "conditionId")]
    condition_id: String,
    slug: String,
    question: String,
    description: Option<String>,
    outcomes: Vec<GammaOutcome>,
    tags: Option<Vec<String>>,
    closed: bool,
    #[serde(rename = "endDate")]
    end_date: Option<String>,
    volume24hr: Option<f64>,
    liquidity: Option<f64>,
}

#[async_trait]
impl MarketListingSource for PolymarketAdapter {
    fn venue(&self) -> Venue {
        Venue::Polymarket
    }

    async fn list_markets_page(
        &self,
        status: ListingStatus,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<MarketListing>, VenueError> {
        // The Gamma events endpoint has no status filter; the full catalog
        // is fetched once under the `All` bucket and skipped for the other
        // three so it isn't re-fetched (and re-upserted) four times over.
        if status != ListingStatus::All {
            return Ok(vec![]);
        }
        let offset = (page * page_size).to_string();
        let limit = page_size.to_string();
        let events: Vec<GammaEventListing> = self
            .http
            .get_json(GAMMA_EVENT_BASE, &[("limit", &limit), ("offset", &offset)])
            .await?;

        Ok(events
            .into_iter()
            .map(|e| {
                let url = format!("https://polymarket.com/event/{}", e.slug);
                MarketListing {
                    market_id: e.condition_id,
                    slug: e.slug,
                    question: e.question,
                    description: e.description.unwrap_or_default(),
                    outcomes_json: serde_json::to_string(
                        &e.outcomes
                            .iter()
                            .map(|o| (o.name.clone(), o.price))
                            .collect::<Vec<_>>(),
                    )
                    .unwrap_or_default(),
                    tags: e.tags.unwrap_or_default(),
                    status: if e.closed { "closed" } else { "open" }.to_string(),
                    url,
                    end_date: e
                        .end_date
                        .and_then(|d| chrono::DateTime::parse_from_rfc3339(&d).ok())
                        .map(|d| d.timestamp_millis()),
                    resolved: e.closed,
                    volume_24h: e.volume24hr,
                    liquidity: e.liquidity,
                    open_interest: None,
                    predictions: None,
                }
            })
            .collect())
    }
}

#[async_trait]
impl ExecutionAdapter for PolymarketAdapter {
    fn venue(&self) -> Venue {
        Venue::Polymarket
    }

    /// Order placement (CLOB order signing, wallet keys) is out of scope;
    /// this call site only needs this opaque
    /// hand-off and records whatever signature comes back.
    async fn execute_market_sell(
        &self,
        _credential: &TradingCredential,
        market_id: &str,
        outcome_id: &str,
        _size_or_all: SizeOrAll,
    ) -> Result<ExecutionReceipt, VenueError> {
        Err(VenueError::Unreachable(format!(
            "polymarket execution hand-off not wired for market {market_id} outcome {outcome_id}"
        )))
    }
}
