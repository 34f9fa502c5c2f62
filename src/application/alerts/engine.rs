//! Condition evaluation for price/volume alerts (§4.F). One alert's failure
//! (venue unreachable, market gone) never aborts the scan; it's logged and
//! the loop moves to the next alert.

use std::sync::Arc;

use crate::domain::alert::{Alert, AlertCondition, Direction};
use crate::domain::ids::{Channel, Venue};
use crate::domain::market::Market;
use crate::domain::ports::Store;
use crate::infrastructure::venues::Feeds;

use super::super::notify::Notifier;

pub struct AlertEngine {
    store: Arc<dyn Store>,
    feeds: Arc<Feeds>,
    notifier: Arc<Notifier>,
}

impl AlertEngine {
    pub fn new(store: Arc<dyn Store>, feeds: Arc<Feeds>, notifier: Arc<Notifier>) -> Self {
        Self {
            store,
            feeds,
            notifier,
        }
    }

    /// Evaluates every enabled, not-yet-triggered alert. Returns the count
    /// that fired.
    pub async fn scan_all(&self) -> usize {
        let alerts = match self.store.list_active_alerts().await {
            Ok(alerts) => alerts,
            Err(err) => {
                tracing::error!(error = %err, "could not list active alerts");
                return 0;
            }
        };

        let mut fired = 0;
        for alert in alerts {
            if !alert.enabled || alert.triggered {
                continue;
            }
            match self.evaluate(&alert).await {
                Ok(true) => fired += 1,
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(alert_id = %alert.id, error = %err, "alert evaluation failed");
                }
            }
        }
        fired
    }

    pub async fn evaluate_one(&self, alert_id: &str) -> anyhow::Result<bool> {
        let alert = self.store.get_alert(alert_id).await?;
        Ok(self.evaluate(&alert).await?)
    }

    /// Fetches one market on demand and refreshes its cache row, so the
    /// next scan over alerts on this market sees current data immediately
    /// rather than waiting out its own cache TTL.
    pub async fn refresh_market(&self, platform: Venue, market_id: &str) -> anyhow::Result<()> {
        let market = self.feeds.get_market(platform, market_id).await?;
        self.store.cache_market(&market).await?;
        Ok(())
    }

    async fn evaluate(&self, alert: &Alert) -> anyhow::Result<bool> {
        let market = self
            .feeds
            .get_market(alert.platform, &alert.market_id)
            .await?;
        let outcome = market
            .primary_outcome()
            .ok_or_else(|| anyhow::anyhow!("market {} has no outcomes", alert.market_id))?;
        let current_price = outcome.price;
        let current_volume = market.volume_24h;

        let window_secs = alert.condition.default_time_window_secs();
        let cached = self
            .store
            .get_cached_market(alert.platform, &alert.market_id, window_secs)
            .await?;

        let previous_price = cached
            .as_ref()
            .and_then(|m| m.primary_outcome())
            .map(|o| o.price)
            .or(outcome.previous_price);
        let previous_volume = cached.as_ref().and_then(|m| m.volume_24h);

        self.store.cache_market(&market).await?;

        let triggered = evaluate_condition(
            &alert.condition,
            current_price,
            previous_price,
            current_volume,
            previous_volume,
        );

        if triggered {
            self.mark_triggered(alert, &market, current_price, previous_price)
                .await?;
        }

        Ok(triggered)
    }

    async fn mark_triggered(
        &self,
        alert: &Alert,
        market: &Market,
        current_price: f64,
        previous_price: Option<f64>,
    ) -> anyhow::Result<()> {
        let mut updated = alert.clone();
        updated.triggered = true;
        self.store.upsert_alert(&updated).await?;

        let text = describe_trigger(alert, market, current_price, previous_price);
        let explicit = match (&alert.channel, &alert.chat_id) {
            (Some(channel), Some(chat_id)) => Some((*channel, chat_id.clone())),
            _ => None,
        };
        self.notifier
            .notify_user(&alert.user_id, explicit, &text)
            .await;
        Ok(())
    }
}

fn evaluate_condition(
    condition: &AlertCondition,
    current_price: f64,
    previous_price: Option<f64>,
    current_volume: Option<f64>,
    previous_volume: Option<f64>,
) -> bool {
    match condition {
        AlertCondition::PriceAbove { threshold } => current_price >= *threshold,
        AlertCondition::PriceBelow { threshold } => current_price <= *threshold,
        AlertCondition::PriceChangePct {
            threshold,
            direction,
            ..
        } => {
            let Some(prev) = previous_price.filter(|p| *p > 0.0) else {
                return false;
            };
            let pct = (current_price - prev) / prev * 100.0;
            let threshold_pct = Alert::normalized_pct_threshold(*threshold);
            match direction {
                Direction::Up => pct >= threshold_pct,
                Direction::Down => pct <= -threshold_pct,
                Direction::Any => pct.abs() >= threshold_pct,
            }
        }
        AlertCondition::VolumeSpike { threshold } => {
            let Some(prev) = previous_volume.filter(|v| *v > 0.0) else {
                return false;
            };
            let Some(curr) = current_volume else {
                return false;
            };
            let multiplier = if *threshold > 0.0 { *threshold } else { 3.0 };
            curr / prev >= multiplier
        }
    }
}

fn describe_trigger(
    alert: &Alert,
    market: &Market,
    current_price: f64,
    previous_price: Option<f64>,
) -> String {
    let cents = current_price * 100.0;
    match &alert.condition {
        AlertCondition::PriceAbove { threshold } => format!(
            "{}: {:.1}¢ is above {:.1}¢",
            market.question,
            cents,
            threshold * 100.0
        ),
        AlertCondition::PriceBelow { threshold } => format!(
            "{}: {:.1}¢ is below {:.1}¢",
            market.question,
            cents,
            threshold * 100.0
        ),
        AlertCondition::PriceChangePct { .. } => {
            let prev = previous_price.unwrap_or(current_price);
            let pct = if prev > 0.0 {
                (current_price - prev) / prev * 100.0
            } else {
                0.0
            };
            format!(
                "{}: {:+.2}% ({:.1}¢ \u{2192} {:.1}¢)",
                market.question,
                pct,
                prev * 100.0,
                cents
            )
        }
        AlertCondition::VolumeSpike { .. } => {
            format!("{}: volume spike detected", market.question)
        }
    }
}
