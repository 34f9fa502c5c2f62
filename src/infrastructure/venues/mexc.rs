//! MEXC futures adapter: read-only (§4.C).

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::credentials::TradingCredential;
use crate::domain::errors::VenueError;
use crate::domain::ids::Venue;
use crate::domain::market::Market;
use crate::domain::ports::VenueAdapter;
use crate::domain::position::RawPosition;
use crate::infrastructure::http::SharedHttpFabric;

const OPEN_POSITIONS_URL: &str = "https://contract.mexc.com/api/v1/private/position/open_positions";

#[derive(Deserialize)]
struct MexcPosition {
    symbol: String,
    #[serde(rename = "holdVol")]
    hold_vol: f64,
    #[serde(rename = "positionType")]
    position_type: u8,
    #[serde(rename = "holdAvgPrice")]
    hold_avg_price: f64,
    #[serde(rename = "fairPrice")]
    fair_price: f64,
    #[serde(rename = "realised")]
    realised: Option<f64>,
}

#[derive(Deserialize)]
struct MexcResponse {
    data: Vec<MexcPosition>,
}

pub struct MexcAdapter {
    http: SharedHttpFabric,
}

impl MexcAdapter {
    pub fn new(http: SharedHttpFabric) -> Self {
        Self { http }
    }
}

#[async_trait]
impl VenueAdapter for MexcAdapter {
    fn venue(&self) -> Venue {
        Venue::Mexc
    }

    async fn list_positions(
        &self,
        credential: &TradingCredential,
    ) -> Result<Vec<RawPosition>, VenueError> {
        let response: MexcResponse = self
            .http
            .get_json_authed(OPEN_POSITIONS_URL, &[], &credential.user_id)
            .await?;

        Ok(response
            .data
            .into_iter()
            .filter(|p| p.hold_vol != 0.0)
            .map(|p| {
                // positionType: 1 = long, 2 = short.
                let signed_size = if p.position_type == 2 {
                    -p.hold_vol
                } else {
                    p.hold_vol
                };
                RawPosition {
                    outcome_id: p.symbol.clone(),
                    market_id: p.symbol.clone(),
                    outcome_name: p.symbol,
                    size: signed_size,
                    entry_price: p.hold_avg_price,
                    mark_price: p.fair_price,
                    unrealized_pnl: p.realised,
                }
            })
            .collect())
    }

    async fn get_market(&self, market_id: &str) -> Result<Market, VenueError> {
        Err(VenueError::ClientError {
            status: 404,
            message: format!("mexc adapter has no market-question feed for {market_id}"),
        })
    }
}
