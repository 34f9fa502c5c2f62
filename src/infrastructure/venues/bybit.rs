//! Bybit derivatives adapter: read-only (§4.C).

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::credentials::TradingCredential;
use crate::domain::errors::VenueError;
use crate::domain::ids::Venue;
use crate::domain::market::Market;
use crate::domain::ports::VenueAdapter;
use crate::domain::position::RawPosition;
use crate::infrastructure::http::SharedHttpFabric;

const POSITIONS_URL: &str = "https://api.bybit.com/v5/position/list";

#[derive(Deserialize)]
struct BybitPosition {
    symbol: String,
    side: String,
    size: String,
    #[serde(rename = "avgPrice")]
    avg_price: String,
    #[serde(rename = "markPrice")]
    mark_price: String,
    #[serde(rename = "unrealisedPnl")]
    unrealised_pnl: String,
}

#[derive(Deserialize)]
struct BybitResult {
    list: Vec<BybitPosition>,
}

#[derive(Deserialize)]
struct BybitResponse {
    result: BybitResult,
}

pub struct BybitAdapter {
    http: SharedHttpFabric,
}

impl BybitAdapter {
    pub fn new(http: SharedHttpFabric) -> Self {
        Self { http }
    }
}

#[async_trait]
impl VenueAdapter for BybitAdapter {
    fn venue(&self) -> Venue {
        Venue::Bybit
    }

    async fn list_positions(
        &self,
        credential: &TradingCredential,
    ) -> Result<Vec<RawPosition>, VenueError> {
        let response: BybitResponse = self
            .http
            .get_json_authed(POSITIONS_URL, &[("category", "linear")], &credential.user_id)
            .await?;

        Ok(response
            .result
            .list
            .into_iter()
            .filter_map(|p| {
                let size: f64 = p.size.parse().ok()?;
                if size == 0.0 {
                    return None;
                }
                let signed_size = if p.side.eq_ignore_ascii_case("Sell") {
                    -size
                } else {
                    size
                };
                Some(RawPosition {
                    outcome_id: p.symbol.clone(),
                    market_id: p.symbol.clone(),
                    outcome_name: p.symbol,
                    size: signed_size,
                    entry_price: p.avg_price.parse().ok()?,
                    mark_price: p.mark_price.parse().ok()?,
                    unrealized_pnl: p.unrealised_pnl.parse().ok(),
                })
            })
            .collect())
    }

    async fn get_market(&self, market_id: &str) -> Result<Market, VenueError> {
        Err(VenueError::ClientError {
            status: 404,
            message: format!("bybit adapter has no market-question feed for {market_id}"),
        })
    }
}
