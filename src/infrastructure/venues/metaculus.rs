//! Metaculus adapter. Forecasting-only: there is no portfolio/position
//! concept to sync, so `list_positions` always returns empty and
//! PortfolioSync simply has nothing to reconcile for this venue.

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::credentials::TradingCredential;
use crate::domain::errors::VenueError;
use crate::domain::ids::Venue;
use crate::domain::market::{Market, Outcome};
use crate::domain::market_index::MarketListing;
use crate::domain::ports::{ListingStatus, MarketListingSource, VenueAdapter};
use crate::domain::position::RawPosition;
use crate::infrastructure::http::SharedHttpFabric;

const QUESTIONS_URL: &str = "https://www.metaculus.com/api2/questions";

#[derive(Deserialize)]
struct MetaculusQuestion {
    id: u64,
    title: String,
    community_prediction: Option<MetaculusPrediction>,
}

#[derive(Deserialize)]
struct MetaculusPrediction {
    full: Option<MetaculusFull>,
}

#[derive(Deserialize)]
struct MetaculusFull {
    q2: f64,
}

#[derive(Deserialize)]
struct MetaculusResponse {
    results: Vec<MetaculusQuestion>,
}

pub struct MetaculusAdapter {
    http: SharedHttpFabric,
}

impl MetaculusAdapter {
    pub fn new(http: SharedHttpFabric) -> Self {
        Self { http }
    }
}

#[async_trait]
impl VenueAdapter for MetaculusAdapter {
    fn venue(&self) -> Venue {
        Venue::Metaculus
    }

    async fn list_positions(
        &self,
        _credential: &TradingCredential,
    ) -> Result<Vec<RawPosition>, VenueError> {
        Ok(Vec::new())
    }

    async fn get_market(&self, market_id: &str) -> Result<Market, VenueError> {
        let response: MetaculusResponse = self
            .http
            .get_json(QUESTIONS_URL, &[("ids", market_id)])
            .await?;

        let question = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| VenueError::ClientError {
                status: 404,
                message: format!("no metaculus question for {market_id}"),
            })?;

        let prob = question
            .community_prediction
            .and_then(|p| p.full)
            .map(|f| f.q2)
            .unwrap_or(0.5);

        Ok(Market {
            platform: Venue::Metaculus.as_str().to_string(),
            market_id: question.id.to_string(),
            question: question.title,
            outcomes: vec![Outcome {
                name: "Yes".to_string(),
                price: prob,
                previous_price: None,
            }],
            volume_24h: None,
            fetched_at_ms: chrono::Utc::now().timestamp_millis(),
        })
    }
}

#[derive(Deserialize)]
struct MetaculusQuestionListing {
    id: u64,
    title: String,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "resolve_time")]
    resolve_time: Option<String>,
    resolution: Option<f64>,
    #[serde(rename = "number_of_forecasters")]
    number_of_forecasters: Option<u64>,
}

#[derive(Deserialize)]
struct MetaculusListResponse {
    results: Vec<MetaculusQuestionListing>,
}

#[async_trait]
impl MarketListingSource for MetaculusAdapter {
    fn venue(&self) -> Venue {
        Venue::Metaculus
    }

    async fn list_markets_page(
        &self,
        status: ListingStatus,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<MarketListing>, VenueError> {
        let limit = page_size.to_string();
        let offset = (page * page_size).to_string();
        let mut query = vec![("limit", limit.as_str()), ("offset", offset.as_str())];
        if status != ListingStatus::All {
            query.push(("status", status.as_str()));
        }
        let response: MetaculusListResponse = self.http.get_json(QUESTIONS_URL, &query).await?;

        Ok(response
            .results
            .into_iter()
            .map(|q| MarketListing {
                market_id: q.id.to_string(),
                slug: q.id.to_string(),
                question: q.title,
                description: q.description.unwrap_or_default(),
                outcomes_json: "[]".to_string(),
                tags: Vec::new(),
                status: if q.resolution.is_some() {
                    "settled".to_string()
                } else {
                    "open".to_string()
                },
                url: q
                    .url
                    .unwrap_or_else(|| format!("https://www.metaculus.com/questions/{}", q.id)),
                end_date: q
                    .resolve_time
                    .and_then(|d| chrono::DateTime::parse_from_rfc3339(&d).ok())
                    .map(|d| d.timestamp_millis()),
                resolved: q.resolution.is_some(),
                volume_24h: None,
                liquidity: None,
                open_interest: None,
                predictions: q.number_of_forecasters.map(|n| n as f64),
            })
            .collect())
    }
}
