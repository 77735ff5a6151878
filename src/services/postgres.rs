use crate::models::{ScoredCandidate, StoredMatch};
use crate::services::store::{MatchLedger, StoreError};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<PostgresError> for StoreError {
    fn from(err: PostgresError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// PostgreSQL client for the match ledger
///
/// Keeps the latest computed score per (user, matched user) pair so the app
/// can show saved matches without re-ranking.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL for the match ledger");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Replace the recorded matches for a user in one transaction
    ///
    /// Uses INSERT ... ON CONFLICT so a pool with a repeated candidate keeps
    /// only its latest score.
    pub async fn replace_matches(
        &self,
        user_id: &str,
        matches: &[ScoredCandidate],
    ) -> Result<u64, PostgresError> {
        if user_id.is_empty() {
            return Err(PostgresError::InvalidInput("user_id must not be empty".to_string()));
        }

        let query = r#"
            INSERT INTO matches (id, user_id, matched_user_id, score, matched_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (user_id, matched_user_id)
            DO UPDATE SET
                score = EXCLUDED.score,
                matched_at = EXCLUDED.matched_at
        "#;

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM matches WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let mut written = 0;

        for candidate in matches {
            let result = sqlx::query(query)
                .bind(uuid::Uuid::new_v4())
                .bind(user_id)
                .bind(&candidate.profile.id)
                .bind(i16::from(candidate.score))
                .execute(&mut *tx)
                .await?;
            written += result.rows_affected();
        }

        tx.commit().await?;

        tracing::debug!("Recorded {} matches for user {}", written, user_id);

        Ok(written)
    }

    /// Get a user's recorded matches, best first
    pub async fn get_matches(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<StoredMatch>, PostgresError> {
        let query = r#"
            SELECT id, user_id, matched_user_id, score, matched_at
            FROM matches
            WHERE user_id = $1
            ORDER BY score DESC, matched_at DESC
            LIMIT $2
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<StoredMatch, PostgresError> {
                let score: i16 = row.try_get("score")?;
                Ok(StoredMatch {
                    id: row.try_get("id")?,
                    user_id: row.try_get("user_id")?,
                    matched_user_id: row.try_get("matched_user_id")?,
                    score: score.clamp(0, 100) as u8,
                    matched_at: row.try_get("matched_at")?,
                })
            })
            .collect()
    }

    /// Clear all recorded matches for a user
    pub async fn clear_matches(&self, user_id: &str) -> Result<u64, PostgresError> {
        let result = sqlx::query("DELETE FROM matches WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        tracing::info!(
            "Cleared {} recorded matches for user {}",
            result.rows_affected(),
            user_id
        );

        Ok(result.rows_affected())
    }

    /// Health check for the database connection
    pub async fn ping(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[async_trait]
impl MatchLedger for PostgresClient {
    async fn record_matches(
        &self,
        subject_id: &str,
        matches: &[ScoredCandidate],
    ) -> Result<(), StoreError> {
        // Re-ranking replaces the previous snapshot
        self.replace_matches(subject_id, matches).await?;
        Ok(())
    }

    async fn saved_matches(&self, subject_id: &str, limit: usize) -> Result<Vec<StoredMatch>, StoreError> {
        Ok(self.get_matches(subject_id, limit).await?)
    }

    async fn health_check(&self) -> bool {
        self.ping().await.unwrap_or(false)
    }
}
