//! Hyperliquid perp adapter: read-only (§4.C — perp venues have no
//! execution hand-off in scope). `currentPrice` derives via
//! [`super::normalize::perp_current_price`], side via
//! [`super::normalize::derive_perp_side`].

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::credentials::TradingCredential;
use crate::domain::errors::VenueError;
use crate::domain::ids::Venue;
use crate::domain::market::Market;
use crate::domain::ports::VenueAdapter;
use crate::domain::position::RawPosition;
use crate::infrastructure::http::SharedHttpFabric;

use super::normalize::perp_current_price;

const INFO_URL: &str = "https://api.hyperliquid.xyz/info";

#[derive(Deserialize)]
struct HlPositionEntry {
    position: HlPosition,
}

#[derive(Deserialize)]
struct HlPosition {
    coin: String,
    szi: String,
    #[serde(rename = "entryPx")]
    entry_px: String,
    #[serde(rename = "unrealizedPnl")]
    unrealized_pnl: String,
}

#[derive(Deserialize)]
struct HlClearinghouseState {
    #[serde(rename = "assetPositions")]
    asset_positions: Vec<HlPositionEntry>,
}

pub struct HyperliquidAdapter {
    http: SharedHttpFabric,
}

impl HyperliquidAdapter {
    pub fn new(http: SharedHttpFabric) -> Self {
        Self { http }
    }
}

#[async_trait]
impl VenueAdapter for HyperliquidAdapter {
    fn venue(&self) -> Venue {
        Venue::Hyperliquid
    }

    async fn list_positions(
        &self,
        credential: &TradingCredential,
    ) -> Result<Vec<RawPosition>, VenueError> {
        let state: HlClearinghouseState = self
            .http
            .get_json(INFO_URL, &[("user", credential.user_id.as_str())])
            .await?;

        Ok(state
            .asset_positions
            .into_iter()
            .filter_map(|entry| {
                let size: f64 = entry.position.szi.parse().ok()?;
                let entry_px: f64 = entry.position.entry_px.parse().ok()?;
                let unrealized_pnl: f64 = entry.position.unrealized_pnl.parse().ok()?;
                let mark = perp_current_price(entry_px, unrealized_pnl, size.abs());
                Some(RawPosition {
                    outcome_id: entry.position.coin.clone(),
                    market_id: entry.position.coin.clone(),
                    outcome_name: entry.position.coin,
                    size,
                    entry_price: entry_px,
                    mark_price: mark,
                    unrealized_pnl: Some(unrealized_pnl),
                })
            })
            .collect())
    }

    async fn get_market(&self, market_id: &str) -> Result<Market, VenueError> {
        Err(VenueError::ClientError {
            status: 404,
            message: format!("hyperliquid has no alert-facing market feed for {market_id}"),
        })
    }
}

