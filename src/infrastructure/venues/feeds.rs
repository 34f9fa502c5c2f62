//! Feeds: the venue-read facade AlertEngine calls instead of reaching
//! into a specific adapter directly.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::errors::VenueError;
use crate::domain::ids::Venue;
use crate::domain::market::Market;
use crate::domain::ports::VenueAdapter;

pub struct Feeds {
    adapters: HashMap<Venue, Arc<dyn VenueAdapter>>,
}

impl Feeds {
    pub fn new(adapters: Vec<Arc<dyn VenueAdapter>>) -> Self {
        Self {
            adapters: adapters.into_iter().map(|a| (a.venue(), a)).collect(),
        }
    }

    pub async fn get_market(&self, platform: Venue, market_id: &str) -> Result<Market, VenueError> {
        let adapter = self.adapters.get(&platform).ok_or_else(|| {
            VenueError::ClientError {
                status: 400,
                message: format!("no adapter registered for venue {platform}"),
            }
        })?;
        adapter.get_market(market_id).await
    }
}
