//! SQLite-backed `Store` implementation. One logical table per entity;
//! most rows carry their full domain struct as `data_json` plus a
//! handful of indexed columns used for lookups, following
//! `SqliteStrategyRepository`'s `INSERT ... ON CONFLICT DO UPDATE` shape.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::domain::alert::Alert;
use crate::domain::credentials::TradingCredential;
use crate::domain::cron_job::CronJob;
use crate::domain::errors::StoreError;
use crate::domain::ids::{Channel, Venue};
use crate::domain::market::Market;
use crate::domain::market_index::{Embedding, MarketIndexEntry};
use crate::domain::portfolio_snapshot::PortfolioSnapshot;
use crate::domain::position::Position;
use crate::domain::ports::{Store, StoreResult};
use crate::domain::session::Session;
use crate::domain::stop_loss::StopLossTrigger;
use crate::domain::user::User;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// A SQLite unique-constraint violation is reported as a generic database
/// error with no structured code we can rely on across driver versions;
/// match on the message the way the sqlite C API phrases it.
fn map_sqlx_err(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.message().contains("UNIQUE constraint failed")
    {
        return StoreError::Conflict(db_err.message().to_string());
    }
    StoreError::Backend(err)
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Backend(sqlx::Error::Decode(Box::new(e)))
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn get_user(&self, id: &str) -> StoreResult<User> {
        let row = sqlx::query("SELECT platform, platform_user_id, settings_json FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))?;

        let platform: String = row.try_get("platform").map_err(map_sqlx_err)?;
        let settings_json: String = row.try_get("settings_json").map_err(map_sqlx_err)?;
        Ok(User {
            id: id.to_string(),
            platform: platform.parse::<Channel>().map_err(StoreError::Conflict)?,
            platform_user_id: row.try_get("platform_user_id").map_err(map_sqlx_err)?,
            settings: serde_json::from_str(&settings_json)?,
        })
    }

    async fn find_user_by_platform(
        &self,
        platform: Channel,
        platform_user_id: &str,
    ) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, settings_json FROM users WHERE platform = ? AND platform_user_id = ?",
        )
        .bind(platform.as_str())
        .bind(platform_user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        match row {
            None => Ok(None),
            Some(row) => {
                let id: String = row.try_get("id").map_err(map_sqlx_err)?;
                let settings_json: String = row.try_get("settings_json").map_err(map_sqlx_err)?;
                Ok(Some(User {
                    id,
                    platform,
                    platform_user_id: platform_user_id.to_string(),
                    settings: serde_json::from_str(&settings_json)?,
                }))
            }
        }
    }

    async fn upsert_user(&self, user: &User) -> StoreResult<()> {
        let settings_json = serde_json::to_string(&user.settings)?;
        sqlx::query(
            r#"
            INSERT INTO users (id, platform, platform_user_id, settings_json)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                platform = excluded.platform,
                platform_user_id = excluded.platform_user_id,
                settings_json = excluded.settings_json
            "#,
        )
        .bind(&user.id)
        .bind(user.platform.as_str())
        .bind(&user.platform_user_id)
        .bind(settings_json)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query("SELECT id, platform, platform_user_id, settings_json FROM users")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let platform: String = row.try_get("platform").map_err(map_sqlx_err)?;
            let settings_json: String = row.try_get("settings_json").map_err(map_sqlx_err)?;
            out.push(User {
                id: row.try_get("id").map_err(map_sqlx_err)?,
                platform: platform.parse::<Channel>().map_err(StoreError::Conflict)?,
                platform_user_id: row.try_get("platform_user_id").map_err(map_sqlx_err)?,
                settings: serde_json::from_str(&settings_json)?,
            });
        }
        Ok(out)
    }

    async fn latest_session(&self, user_id: &str) -> StoreResult<Option<Session>> {
        let row = sqlx::query(
            r#"
            SELECT id, session_key, channel, chat_id, last_activity_ms
            FROM sessions WHERE user_id = ?
            ORDER BY last_activity_ms DESC LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        match row {
            None => Ok(None),
            Some(row) => {
                let channel: String = row.try_get("channel").map_err(map_sqlx_err)?;
                let last_activity_ms: i64 = row.try_get("last_activity_ms").map_err(map_sqlx_err)?;
                Ok(Some(Session {
                    id: row.try_get("id").map_err(map_sqlx_err)?,
                    key: row.try_get("session_key").map_err(map_sqlx_err)?,
                    user_id: user_id.to_string(),
                    channel: channel.parse::<Channel>().map_err(StoreError::Conflict)?,
                    chat_id: row.try_get("chat_id").map_err(map_sqlx_err)?,
                    last_activity: chrono::DateTime::from_timestamp_millis(last_activity_ms)
                        .unwrap_or_default(),
                }))
            }
        }
    }

    async fn upsert_session(&self, session: &Session) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, session_key, user_id, channel, chat_id, last_activity_ms)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                session_key = excluded.session_key,
                channel = excluded.channel,
                chat_id = excluded.chat_id,
                last_activity_ms = excluded.last_activity_ms
            "#,
        )
        .bind(&session.id)
        .bind(&session.key)
        .bind(&session.user_id)
        .bind(session.channel.as_str())
        .bind(&session.chat_id)
        .bind(session.last_activity.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn get_cached_market(
        &self,
        platform: Venue,
        market_id: &str,
        max_age_secs: u64,
    ) -> StoreResult<Option<Market>> {
        let row = sqlx::query(
            "SELECT data_json, fetched_at_ms FROM markets_cache WHERE platform = ? AND market_id = ?",
        )
        .bind(platform.as_str())
        .bind(market_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        match row {
            None => Ok(None),
            Some(row) => {
                let fetched_at_ms: i64 = row.try_get("fetched_at_ms").map_err(map_sqlx_err)?;
                let now_ms = chrono::Utc::now().timestamp_millis();
                if now_ms - fetched_at_ms > (max_age_secs as i64) * 1000 {
                    return Ok(None);
                }
                let data_json: String = row.try_get("data_json").map_err(map_sqlx_err)?;
                Ok(Some(serde_json::from_str(&data_json)?))
            }
        }
    }

    async fn cache_market(&self, market: &Market) -> StoreResult<()> {
        let data_json = serde_json::to_string(market)?;
        sqlx::query(
            r#"
            INSERT INTO markets_cache (platform, market_id, data_json, fetched_at_ms)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(platform, market_id) DO UPDATE SET
                data_json = excluded.data_json,
                fetched_at_ms = excluded.fetched_at_ms
            "#,
        )
        .bind(&market.platform)
        .bind(&market.market_id)
        .bind(data_json)
        .bind(market.fetched_at_ms)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn list_active_alerts(&self) -> StoreResult<Vec<Alert>> {
        let rows = sqlx::query("SELECT data_json FROM alerts")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        let mut out = Vec::new();
        for row in rows {
            let data_json: String = row.try_get("data_json").map_err(map_sqlx_err)?;
            let alert: Alert = serde_json::from_str(&data_json)?;
            if alert.enabled {
                out.push(alert);
            }
        }
        Ok(out)
    }

    async fn get_alert(&self, id: &str) -> StoreResult<Alert> {
        let row = sqlx::query("SELECT data_json FROM alerts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?
            .ok_or_else(|| StoreError::NotFound(format!("alert {id}")))?;
        let data_json: String = row.try_get("data_json").map_err(map_sqlx_err)?;
        Ok(serde_json::from_str(&data_json)?)
    }

    async fn upsert_alert(&self, alert: &Alert) -> StoreResult<()> {
        let data_json = serde_json::to_string(alert)?;
        sqlx::query(
            r#"
            INSERT INTO alerts (id, user_id, data_json)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                user_id = excluded.user_id,
                data_json = excluded.data_json
            "#,
        )
        .bind(&alert.id)
        .bind(&alert.user_id)
        .bind(data_json)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn list_positions(&self, user_id: &str) -> StoreResult<Vec<Position>> {
        let rows = sqlx::query("SELECT data_json FROM positions WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let data_json: String = row.try_get("data_json").map_err(map_sqlx_err)?;
            out.push(serde_json::from_str(&data_json)?);
        }
        Ok(out)
    }

    async fn upsert_position(&self, position: &Position) -> StoreResult<()> {
        let data_json = serde_json::to_string(position)?;
        sqlx::query(
            r#"
            INSERT INTO positions (id, user_id, outcome_id, data_json)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id, outcome_id) DO UPDATE SET
                id = excluded.id,
                data_json = excluded.data_json
            "#,
        )
        .bind(&position.id)
        .bind(&position.user_id)
        .bind(&position.outcome_id)
        .bind(data_json)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn delete_position(&self, user_id: &str, outcome_id: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM positions WHERE user_id = ? AND outcome_id = ?")
            .bind(user_id)
            .bind(outcome_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn append_portfolio_snapshot(&self, snapshot: &PortfolioSnapshot) -> StoreResult<()> {
        let data_json = serde_json::to_string(snapshot)?;
        sqlx::query("INSERT INTO portfolio_snapshots (user_id, ts_ms, data_json) VALUES (?, ?, ?)")
            .bind(&snapshot.user_id)
            .bind(snapshot.ts_ms)
            .bind(data_json)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn prune_portfolio_snapshots_before(&self, cutoff_ms: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM portfolio_snapshots WHERE ts_ms < ?")
            .bind(cutoff_ms)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(result.rows_affected())
    }

    async fn list_cron_jobs(&self) -> StoreResult<Vec<CronJob>> {
        let rows = sqlx::query("SELECT data_json FROM cron_jobs")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let data_json: String = row.try_get("data_json").map_err(map_sqlx_err)?;
            out.push(serde_json::from_str(&data_json)?);
        }
        Ok(out)
    }

    async fn upsert_cron_job(&self, job: &CronJob) -> StoreResult<()> {
        let data_json = serde_json::to_string(job)?;
        let now_ms = chrono::Utc::now().timestamp_millis();
        sqlx::query(
            r#"
            INSERT INTO cron_jobs (id, data_json, enabled, created_at_ms, updated_at_ms)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                data_json = excluded.data_json,
                enabled = excluded.enabled,
                updated_at_ms = excluded.updated_at_ms
            "#,
        )
        .bind(&job.id)
        .bind(data_json)
        .bind(job.enabled)
        .bind(now_ms)
        .bind(now_ms)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn delete_cron_job(&self, id: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM cron_jobs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn upsert_market_index_entry(&self, entry: &MarketIndexEntry) -> StoreResult<()> {
        let data_json = serde_json::to_string(entry)?;
        sqlx::query(
            r#"
            INSERT INTO market_index (platform, market_id, content_hash, data_json, updated_at_ms)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(platform, market_id) DO UPDATE SET
                content_hash = excluded.content_hash,
                data_json = excluded.data_json,
                updated_at_ms = excluded.updated_at_ms
            "#,
        )
        .bind(&entry.platform)
        .bind(&entry.market_id)
        .bind(&entry.content_hash)
        .bind(data_json)
        .bind(entry.updated_at_ms)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn get_market_index_content_hash(
        &self,
        platform: &str,
        market_id: &str,
    ) -> StoreResult<Option<String>> {
        let row = sqlx::query(
            "SELECT content_hash FROM market_index WHERE platform = ? AND market_id = ?",
        )
        .bind(platform)
        .bind(market_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        match row {
            None => Ok(None),
            Some(row) => Ok(Some(row.try_get("content_hash").map_err(map_sqlx_err)?)),
        }
    }

    async fn query_market_index(
        &self,
        platform: Option<&str>,
        text_filter: Option<&str>,
        limit: usize,
    ) -> StoreResult<Vec<MarketIndexEntry>> {
        let rows = match (platform, text_filter) {
            (Some(p), Some(q)) => {
                sqlx::query(
                    "SELECT data_json FROM market_index WHERE platform = ? AND data_json LIKE ? LIMIT ?",
                )
                .bind(p)
                .bind(format!("%{q}%"))
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await
            }
            (Some(p), None) => {
                sqlx::query("SELECT data_json FROM market_index WHERE platform = ? LIMIT ?")
                    .bind(p)
                    .bind(limit as i64)
                    .fetch_all(&self.pool)
                    .await
            }
            (None, Some(q)) => {
                sqlx::query("SELECT data_json FROM market_index WHERE data_json LIKE ? LIMIT ?")
                    .bind(format!("%{q}%"))
                    .bind(limit as i64)
                    .fetch_all(&self.pool)
                    .await
            }
            (None, None) => {
                sqlx::query("SELECT data_json FROM market_index LIMIT ?")
                    .bind(limit as i64)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(map_sqlx_err)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let data_json: String = row.try_get("data_json").map_err(map_sqlx_err)?;
            out.push(serde_json::from_str(&data_json)?);
        }
        Ok(out)
    }

    async fn prune_market_index_before(
        &self,
        platform: &str,
        cutoff_ms: i64,
    ) -> StoreResult<u64> {
        let result =
            sqlx::query("DELETE FROM market_index WHERE platform = ? AND updated_at_ms < ?")
                .bind(platform)
                .bind(cutoff_ms)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_err)?;
        Ok(result.rows_affected())
    }

    async fn get_embedding(
        &self,
        platform: &str,
        market_id: &str,
        content_hash: &str,
    ) -> StoreResult<Option<Embedding>> {
        let row = sqlx::query(
            "SELECT content_hash, vector_blob FROM market_index_embeddings WHERE platform = ? AND market_id = ?",
        )
        .bind(platform)
        .bind(market_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        match row {
            None => Ok(None),
            Some(row) => {
                let stored_hash: String = row.try_get("content_hash").map_err(map_sqlx_err)?;
                if stored_hash != content_hash {
                    return Ok(None);
                }
                let blob: Vec<u8> = row.try_get("vector_blob").map_err(map_sqlx_err)?;
                let vector = blob
                    .chunks_exact(4)
                    .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                    .collect();
                Ok(Some(Embedding {
                    platform: platform.to_string(),
                    market_id: market_id.to_string(),
                    content_hash: stored_hash,
                    vector,
                }))
            }
        }
    }

    async fn put_embedding(&self, embedding: &Embedding) -> StoreResult<()> {
        let mut blob = Vec::with_capacity(embedding.vector.len() * 4);
        for v in &embedding.vector {
            blob.extend_from_slice(&v.to_le_bytes());
        }
        sqlx::query(
            r#"
            INSERT INTO market_index_embeddings (platform, market_id, content_hash, vector_blob)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(platform, market_id) DO UPDATE SET
                content_hash = excluded.content_hash,
                vector_blob = excluded.vector_blob
            "#,
        )
        .bind(&embedding.platform)
        .bind(&embedding.market_id)
        .bind(&embedding.content_hash)
        .bind(blob)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn get_stop_loss_trigger(
        &self,
        user_id: &str,
        platform: Venue,
        outcome_id: &str,
    ) -> StoreResult<Option<StopLossTrigger>> {
        let row = sqlx::query(
            "SELECT data_json FROM stop_loss_triggers WHERE user_id = ? AND platform = ? AND outcome_id = ?",
        )
        .bind(user_id)
        .bind(platform.as_str())
        .bind(outcome_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        match row {
            None => Ok(None),
            Some(row) => {
                let data_json: String = row.try_get("data_json").map_err(map_sqlx_err)?;
                Ok(Some(serde_json::from_str(&data_json)?))
            }
        }
    }

    async fn upsert_stop_loss_trigger(&self, trigger: &StopLossTrigger) -> StoreResult<()> {
        let data_json = serde_json::to_string(trigger)?;
        sqlx::query(
            r#"
            INSERT INTO stop_loss_triggers (user_id, platform, outcome_id, data_json)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id, platform, outcome_id) DO UPDATE SET
                data_json = excluded.data_json
            "#,
        )
        .bind(&trigger.user_id)
        .bind(trigger.platform.as_str())
        .bind(&trigger.outcome_id)
        .bind(data_json)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn list_enabled_credentials(&self, user_id: &str) -> StoreResult<Vec<TradingCredential>> {
        let rows = sqlx::query(
            "SELECT platform, enabled, last_success_at_ms, last_failure_at_ms, last_error
             FROM trading_credentials WHERE user_id = ? AND enabled = 1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let platform: String = row.try_get("platform").map_err(map_sqlx_err)?;
            out.push(TradingCredential {
                user_id: user_id.to_string(),
                platform: platform.parse::<Venue>().map_err(StoreError::Conflict)?,
                enabled: row.try_get("enabled").map_err(map_sqlx_err)?,
                last_success_at_ms: row.try_get("last_success_at_ms").map_err(map_sqlx_err)?,
                last_failure_at_ms: row.try_get("last_failure_at_ms").map_err(map_sqlx_err)?,
                last_error: row.try_get("last_error").map_err(map_sqlx_err)?,
            });
        }
        Ok(out)
    }

    async fn list_users_with_enabled_credentials(&self) -> StoreResult<Vec<String>> {
        let rows = sqlx::query(
            "SELECT DISTINCT user_id FROM trading_credentials WHERE enabled = 1",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(row.try_get("user_id").map_err(map_sqlx_err)?);
        }
        Ok(out)
    }

    async fn upsert_credential(&self, credential: &TradingCredential) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO trading_credentials
                (user_id, platform, enabled, last_success_at_ms, last_failure_at_ms, last_error)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id, platform) DO UPDATE SET
                enabled = excluded.enabled,
                last_success_at_ms = excluded.last_success_at_ms,
                last_failure_at_ms = excluded.last_failure_at_ms,
                last_error = excluded.last_error
            "#,
        )
        .bind(&credential.user_id)
        .bind(credential.platform.as_str())
        .bind(credential.enabled)
        .bind(credential.last_success_at_ms)
        .bind(credential.last_failure_at_ms)
        .bind(&credential.last_error)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserSettings;

    async fn test_store() -> SqliteStore {
        let db = crate::infrastructure::persistence::Database::new("sqlite::memory:")
            .await
            .unwrap();
        SqliteStore::new(db.pool)
    }

    #[tokio::test]
    async fn upsert_and_get_user_roundtrips() {
        let store = test_store().await;
        let user = User {
            id: "u1".into(),
            platform: Channel::Telegram,
            platform_user_id: "123".into(),
            settings: UserSettings::default(),
        };
        store.upsert_user(&user).await.unwrap();
        let fetched = store.get_user("u1").await.unwrap();
        assert_eq!(fetched.platform_user_id, "123");
    }

    #[tokio::test]
    async fn upserting_same_position_twice_yields_single_row() {
        let store = test_store().await;
        let mut pos = Position {
            id: "p1".into(),
            user_id: "u1".into(),
            platform: Venue::Manifold,
            market_id: "m1".into(),
            outcome_id: "m1-YES".into(),
            side: crate::domain::position::Side::Yes,
            shares: 10.0,
            avg_price: 0.4,
            current_price: 0.5,
            pnl: 0.0,
            pnl_pct: 0.0,
            value: 0.0,
            opened_at_ms: 0,
        };
        pos.recompute_derived();
        store.upsert_position(&pos).await.unwrap();
        pos.current_price = 0.6;
        pos.recompute_derived();
        store.upsert_position(&pos).await.unwrap();

        let positions = store.list_positions("u1").await.unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].current_price, 0.6);
    }

    #[tokio::test]
    async fn delete_position_removes_row() {
        let store = test_store().await;
        let mut pos = Position {
            id: "p1".into(),
            user_id: "u1".into(),
            platform: Venue::Manifold,
            market_id: "m1".into(),
            outcome_id: "m1-NO".into(),
            side: crate::domain::position::Side::No,
            shares: 10.0,
            avg_price: 0.4,
            current_price: 0.5,
            pnl: 0.0,
            pnl_pct: 0.0,
            value: 0.0,
            opened_at_ms: 0,
        };
        pos.recompute_derived();
        store.upsert_position(&pos).await.unwrap();
        store.delete_position("u1", "m1-NO").await.unwrap();
        assert!(store.list_positions("u1").await.unwrap().is_empty());
    }
}
