//! Per-position stop-loss evaluation and (optionally dry-run) execution
//! hand-off (§4.H). A cooldown is recorded after every trigger regardless
//! of whether the sell actually executed, so a failing venue doesn't get
//! retried every tick.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::ids::Venue;
use crate::domain::pct::normalize_pct;
use crate::domain::ports::{Clock, ExecutionAdapter, SizeOrAll, Store};
use crate::domain::stop_loss::{StopLossTrigger, TriggerStatus};
use crate::domain::user::User;

use super::super::notify::Notifier;

const DEFAULT_COOLDOWN_MS: i64 = 10 * 60_000;

pub struct StopLossEngine {
    store: Arc<dyn Store>,
    executors: HashMap<Venue, Arc<dyn ExecutionAdapter>>,
    notifier: Arc<Notifier>,
    clock: Arc<dyn Clock>,
    dry_run: bool,
    cooldown_ms: i64,
}

impl StopLossEngine {
    pub fn new(
        store: Arc<dyn Store>,
        executors: Vec<Arc<dyn ExecutionAdapter>>,
        notifier: Arc<Notifier>,
        clock: Arc<dyn Clock>,
        dry_run: bool,
        cooldown_ms: Option<i64>,
    ) -> Self {
        Self {
            store,
            executors: executors.into_iter().map(|e| (e.venue(), e)).collect(),
            notifier,
            clock,
            dry_run,
            cooldown_ms: cooldown_ms.unwrap_or(DEFAULT_COOLDOWN_MS),
        }
    }

    pub async fn scan_all(&self) {
        let users = match self.store.list_users().await {
            Ok(u) => u,
            Err(err) => {
                tracing::error!(error = %err, "could not list users for stop-loss scan");
                return;
            }
        };

        for user in users {
            if user.settings.stop_loss_pct <= 0.0 {
                continue;
            }
            self.scan_user(&user).await;
        }
    }

    async fn scan_user(&self, user: &User) {
        let pct = normalize_pct(user.settings.stop_loss_pct);
        let positions = match self.store.list_positions(&user.id).await {
            Ok(p) => p,
            Err(err) => {
                tracing::warn!(user_id = %user.id, error = %err, "could not list positions");
                return;
            }
        };

        for position in positions {
            let threshold = position.avg_price * (1.0 - pct);
            if position.current_price > threshold {
                continue;
            }

            let existing = self
                .store
                .get_stop_loss_trigger(&user.id, position.platform, &position.outcome_id)
                .await
                .ok()
                .flatten();
            let now_ms = self.clock.now_ms();
            if let Some(trigger) = &existing {
                if trigger.cooldown_until_ms > now_ms {
                    continue;
                }
            }

            let (status, last_error) = if self.dry_run {
                (TriggerStatus::DryRun, None)
            } else {
                match self.executors.get(&position.platform) {
                    Some(executor) => {
                        match executor
                            .execute_market_sell(
                                &crate::domain::credentials::TradingCredential {
                                    user_id: user.id.clone(),
                                    platform: position.platform,
                                    enabled: true,
                                    last_success_at_ms: None,
                                    last_failure_at_ms: None,
                                    last_error: None,
                                },
                                &position.market_id,
                                &position.outcome_id,
                                SizeOrAll::All,
                            )
                            .await
                        {
                            Ok(_) => (TriggerStatus::Executed, None),
                            Err(err) => (TriggerStatus::Failed, Some(err.to_string())),
                        }
                    }
                    None => (
                        TriggerStatus::Skipped,
                        Some(format!("no execution adapter for {}", position.platform)),
                    ),
                }
            };

            let trigger = StopLossTrigger {
                user_id: user.id.clone(),
                platform: position.platform,
                outcome_id: position.outcome_id.clone(),
                market_id: position.market_id.clone(),
                status,
                triggered_at_ms: now_ms,
                last_price: position.current_price,
                last_error: last_error.clone(),
                cooldown_until_ms: now_ms + self.cooldown_ms,
            };
            if let Err(err) = self.store.upsert_stop_loss_trigger(&trigger).await {
                tracing::warn!(user_id = %user.id, error = %err, "could not persist stop-loss trigger");
            }

            let text = describe_trigger(&trigger, &position);
            self.notifier.notify_user(&user.id, None, &text).await;
        }
    }
}

fn describe_trigger(
    trigger: &StopLossTrigger,
    position: &crate::domain::position::Position,
) -> String {
    match trigger.status {
        TriggerStatus::DryRun => format!(
            "Stop-loss hit on {} ({:.1}¢): Dry run enabled - no trade executed.",
            position.market_id,
            trigger.last_price * 100.0
        ),
        TriggerStatus::Executed => format!(
            "Stop-loss hit on {} ({:.1}¢): position sold.",
            position.market_id,
            trigger.last_price * 100.0
        ),
        TriggerStatus::Failed => format!(
            "Stop-loss hit on {} ({:.1}¢): sell failed ({}).",
            position.market_id,
            trigger.last_price * 100.0,
            trigger.last_error.as_deref().unwrap_or("unknown error")
        ),
        TriggerStatus::Skipped => format!(
            "Stop-loss hit on {} ({:.1}¢): no execution path available.",
            position.market_id,
            trigger.last_price * 100.0
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_avg_price_times_one_minus_pct() {
        let avg_price = 0.40;
        let pct = normalize_pct(10.0);
        let threshold = avg_price * (1.0 - pct);
        assert!((threshold - 0.36).abs() < 1e-9);
    }
}
