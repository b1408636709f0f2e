//! PostgreSQL usage reader.
//!
//! Reads aggregate usage from the usage_records table written by the
//! transcription pipeline. This adapter only reads; recording happens
//! elsewhere.

use crate::domain::billing::UsageResource;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::UsageTracker;
use async_trait::async_trait;
use sqlx::PgPool;

/// PostgreSQL implementation of the UsageTracker port.
pub struct PostgresUsageTracker {
    pool: PgPool,
}

impl PostgresUsageTracker {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageTracker for PostgresUsageTracker {
    async fn recorded_usage(
        &self,
        user_id: &UserId,
        resource: UsageResource,
    ) -> Result<i64, DomainError> {
        let row: (Option<i64>,) = sqlx::query_as(
            r#"
            SELECT SUM(quantity)
            FROM usage_records
            WHERE user_id = $1 AND resource = $2
              AND recorded_at >= date_trunc('month', NOW())
            "#,
        )
        .bind(user_id.as_str())
        .bind(resource.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to read usage: {}", e),
            )
        })?;

        Ok(row.0.unwrap_or(0))
    }
}
