use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::info;

/// Thin wrapper over the SQLite pool. Schema creation lives here so every
/// repository can assume its tables already exist (`Database::new`/`init`
/// pattern).
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn new(db_url: &str) -> Result<Self> {
        if let Some(path_part) = db_url.strip_prefix("sqlite://") {
            let path = Path::new(path_part);
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                fs::create_dir_all(parent)
                    .await
                    .context("failed to create database directory")?;
            }
        }

        let options = SqliteConnectOptions::from_str(db_url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("failed to connect to sqlite database")?;

        info!("Connected to database: {}", db_url);

        let db = Self { pool };
        db.init().await?;
        Ok(db)
    }

    async fn init(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                platform TEXT NOT NULL,
                platform_user_id TEXT NOT NULL,
                settings_json TEXT NOT NULL,
                UNIQUE(platform, platform_user_id)
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("failed to create users table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                session_key TEXT NOT NULL,
                user_id TEXT NOT NULL,
                channel TEXT NOT NULL,
                chat_id TEXT NOT NULL,
                last_activity_ms INTEGER NOT NULL
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("failed to create sessions table")?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_sessions_user_activity
            ON sessions (user_id, last_activity_ms DESC);
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("failed to create sessions index")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS alerts (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                data_json TEXT NOT NULL
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("failed to create alerts table")?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_alerts_user ON alerts (user_id);")
            .execute(&mut *conn)
            .await
            .context("failed to create alerts index")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS positions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                outcome_id TEXT NOT NULL,
                data_json TEXT NOT NULL,
                UNIQUE(user_id, outcome_id)
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("failed to create positions table")?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_positions_user ON positions (user_id);")
            .execute(&mut *conn)
            .await
            .context("failed to create positions index")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS portfolio_snapshots (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                ts_ms INTEGER NOT NULL,
                data_json TEXT NOT NULL
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("failed to create portfolio_snapshots table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_snapshots_user_ts ON portfolio_snapshots (user_id, ts_ms);",
        )
        .execute(&mut *conn)
        .await
        .context("failed to create portfolio_snapshots index")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS markets_cache (
                platform TEXT NOT NULL,
                market_id TEXT NOT NULL,
                data_json TEXT NOT NULL,
                fetched_at_ms INTEGER NOT NULL,
                PRIMARY KEY (platform, market_id)
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("failed to create markets_cache table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS market_index (
                platform TEXT NOT NULL,
                market_id TEXT NOT NULL,
                content_hash TEXT NOT NULL,
                data_json TEXT NOT NULL,
                updated_at_ms INTEGER NOT NULL,
                PRIMARY KEY (platform, market_id)
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("failed to create market_index table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_market_index_updated ON market_index (platform, updated_at_ms);",
        )
        .execute(&mut *conn)
        .await
        .context("failed to create market_index index")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS market_index_embeddings (
                platform TEXT NOT NULL,
                market_id TEXT NOT NULL,
                content_hash TEXT NOT NULL,
                vector_blob BLOB NOT NULL,
                PRIMARY KEY (platform, market_id)
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("failed to create market_index_embeddings table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cron_jobs (
                id TEXT PRIMARY KEY,
                data_json TEXT NOT NULL,
                enabled BOOLEAN NOT NULL DEFAULT 1,
                created_at_ms INTEGER NOT NULL,
                updated_at_ms INTEGER NOT NULL
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("failed to create cron_jobs table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS stop_loss_triggers (
                user_id TEXT NOT NULL,
                platform TEXT NOT NULL,
                outcome_id TEXT NOT NULL,
                data_json TEXT NOT NULL,
                PRIMARY KEY (user_id, platform, outcome_id)
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("failed to create stop_loss_triggers table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trading_credentials (
                user_id TEXT NOT NULL,
                platform TEXT NOT NULL,
                enabled BOOLEAN NOT NULL DEFAULT 1,
                last_success_at_ms INTEGER,
                last_failure_at_ms INTEGER,
                last_error TEXT,
                PRIMARY KEY (user_id, platform)
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("failed to create trading_credentials table")?;

        info!("Database schema initialized.");
        Ok(())
    }
}
