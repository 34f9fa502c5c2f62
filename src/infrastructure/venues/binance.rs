//! Binance USD-M futures adapter: read-only (§4.C). Side derives from the
//! signed `positionAmt` via [`super::normalize::derive_perp_side`].

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::credentials::TradingCredential;
use crate::domain::errors::VenueError;
use crate::domain::ids::Venue;
use crate::domain::market::Market;
use crate::domain::ports::VenueAdapter;
use crate::domain::position::RawPosition;
use crate::infrastructure::http::SharedHttpFabric;

const POSITION_RISK_URL: &str = "https://fapi.binance.com/fapi/v2/positionRisk";

#[derive(Deserialize)]
struct BinancePositionRisk {
    symbol: String,
    #[serde(rename = "positionAmt")]
    position_amt: String,
    #[serde(rename = "entryPrice")]
    entry_price: String,
    #[serde(rename = "markPrice")]
    mark_price: String,
    #[serde(rename = "unRealizedProfit")]
    unrealized_profit: String,
}

pub struct BinanceAdapter {
    http: SharedHttpFabric,
}

impl BinanceAdapter {
    pub fn new(http: SharedHttpFabric) -> Self {
        Self { http }
    }
}

#[async_trait]
impl VenueAdapter for BinanceAdapter {
    fn venue(&self) -> Venue {
        Venue::Binance
    }

    async fn list_positions(
        &self,
        credential: &TradingCredential,
    ) -> Result<Vec<RawPosition>, VenueError> {
        let rows: Vec<BinancePositionRisk> = self
            .http
            .get_json_authed(POSITION_RISK_URL, &[], &credential.user_id)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|r| {
                let amt: f64 = r.position_amt.parse().ok()?;
                if amt == 0.0 {
                    return None;
                }
                Some(RawPosition {
                    outcome_id: r.symbol.clone(),
                    market_id: r.symbol.clone(),
                    outcome_name: r.symbol,
                    size: amt,
                    entry_price: r.entry_price.parse().ok()?,
                    mark_price: r.mark_price.parse().ok()?,
                    unrealized_pnl: r.unrealized_profit.parse().ok(),
                })
            })
            .collect())
    }

    async fn get_market(&self, market_id: &str) -> Result<Market, VenueError> {
        Err(VenueError::ClientError {
            status: 404,
            message: format!("binance adapter has no market-question feed for {market_id}"),
        })
    }
}
