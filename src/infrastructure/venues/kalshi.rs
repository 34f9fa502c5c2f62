//! Kalshi adapter. Endpoint shapes: `GET /portfolio/positions`,
//! `GET /trade-api/v2/events`. Prices normalize via [`super::normalize::kalshi_price`].

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

use super::normalize::kalshi_price;

const POSITIONS_URL: &str = "https://trading-api.kalshi.com/trade-api/v2/portfolio/positions";
const EVENTS_URL: &str = "https://trading-api.kalshi.com/trade-api/v2/events";

#[derive(Deserialize)]
struct KalshiPosition {
    ticker: String,
    #[serde(rename = "market_ticker")]
    market_ticker: String,
    position: f64,
    #[serde(rename = "average_price")]
    average_price: f64,
    #[serde(rename = "last_price")]
    last_price: f64,
}

#[derive(Deserialize)]
struct KalshiPositionsResponse {
    market_positions: Vec<KalshiPosition>,
}

#[derive(Deserialize)]
struct KalshiMarket {
    ticker: String,
    title: String,
    #[serde(rename = "yes_bid")]
    yes_bid: f64,
    volume_24h: Option<f64>,
}

#[derive(Deserialize)]
struct KalshiEventsResponse {
    markets: Vec<KalshiMarket>,
}

pub struct KalshiAdapter {
    http: SharedHttpFabric,
}

impl KalshiAdapter {
    pub fn new(http: SharedHttpFabric) -> Self {
        Self { http }
    }
}

#[async_trait]
impl VenueAdapter for KalshiAdapter {
    fn venue(&self) -> Venue {
        Venue::Kalshi
    }

    async fn list_positions(
        &self,
        credential: &TradingCredential,
    ) -> Result<Vec<RawPosition>, VenueError> {
        let response: KalshiPositionsResponse = self
            .http
            .get_json_authed(POSITIONS_URL, &[], &credential.user_id)
            .await?;

        Ok(response
            .market_positions
            .into_iter()
            .map(|p| RawPosition {
                outcome_id: p.ticker,
                market_id: p.market_ticker,
                outcome_name: "Yes".to_string(),
                size: p.position,
                entry_price: kalshi_price(p.average_price),
                mark_price: kalshi_price(p.last_price),
                unrealized_pnl: None,
            })
            .collect())
    }

    async fn get_market(&self, market_id: &str) -> Result<Market, VenueError> {
        let response: KalshiEventsResponse = self
            .http
            .get_json(EVENTS_URL, &[("series_ticker", market_id)])
            .await?;

        let market = response
            .markets
            .into_iter()
            .next()
            .ok_or_else(|| VenueError::ClientError {
                status: 404,
                message: format!("no kalshi market for {market_id}"),
            })?;

        Ok(Market {
            platform: Venue::Kalshi.as_str().to_string(),
            market_id: market.ticker,
            question: market.title,
            outcomes: vec![Outcome {
                name: "Yes".to_string(),
                price: kalshi_price(market.yes_bid),
                previous_price: None,
            }],
            volume_24h: market.volume_24h,
            fetched_at_ms: chrono::Utc::now().timestamp_millis(),
        })
    }
}

#[derive(Deserialize)]
struct KalshiEventListing {
    #[serde(rename = "event_ticker")]
    event_ticker: String,
    title: String,
    #[serde(rename = "sub_title")]
    sub_title: Option<String>,
    category: Option<String>,
    markets: Vec<KalshiMarket>,
}

#[derive(Deserialize)]
struct KalshiEventsListResponse {
    events: Vec<KalshiEventListing>,
}

#[async_trait]
impl MarketListingSource for KalshiAdapter {
    fn venue(&self) -> Venue {
        Venue::Kalshi
    }

    async fn list_markets_page(
        &self,
        status: ListingStatus,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<MarketListing>, VenueError> {
        let limit = page_size.to_string();
        let cursor = page.to_string();
        let mut query = vec![("limit", limit.as_str()), ("cursor", cursor.as_str())];
        if status != ListingStatus::All {
            query.push(("status", status.as_str()));
        }
        let response: KalshiEventsListResponse = self.http.get_json(EVENTS_URL, &query).await?;

        Ok(response
            .events
            .into_iter()
            .map(|e| {
                let status = e
                    .markets
                    .first()
                    .map(|_| "open".to_string())
                    .unwrap_or_else(|| "closed".to_string());
                MarketListing {
                    market_id: e.event_ticker.clone(),
                    slug: e.event_ticker.clone(),
                    question: e.title,
                    description: e.sub_title.unwrap_or_default(),
                    outcomes_json: "[]".to_string(),
                    tags: e.category.into_iter().collect(),
                    status,
                    url: format!("https://kalshi.com/markets/{}", e.event_ticker),
                    end_date: None,
                    resolved: false,
                    volume_24h: e.markets.first().and_then(|m| m.volume_24h),
                    liquidity: None,
                    open_interest: None,
                    predictions: None,
                }
            })
            .collect())
    }
}

#[async_trait]
impl ExecutionAdapter for KalshiAdapter {
    fn venue(&self) -> Venue {
        Venue::Kalshi
    }

    async fn execute_market_sell(
        &self,
        _credential: &TradingCredential,
        market_id: &str,
        outcome_id: &str,
        _size_or_all: SizeOrAll,
    ) -> Result<ExecutionReceipt, VenueError> {
        Err(VenueError::Unreachable(format!(
            "kalshi execution hand-off not wired for market {market_id} outcome {outcome_id}"
        )))
    }
}
