//! PostgreSQL implementation of ProfileRepository.

use crate::domain::billing::PlanTier;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::ProfileRepository;
use async_trait::async_trait;
use sqlx::PgPool;

/// Updates the denormalized subscription tier on user profiles.
pub struct PostgresProfileRepository {
    pool: PgPool,
}

impl PostgresProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_tier(s: &str) -> Result<PlanTier, DomainError> {
    match s {
        "free" => Ok(PlanTier::Free),
        "pro" => Ok(PlanTier::Pro),
        "enterprise" => Ok(PlanTier::Enterprise),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid tier value: {}", s),
        )),
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn set_subscription_tier(
        &self,
        user_id: &UserId,
        tier: PlanTier,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET subscription_tier = $2, updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .bind(tier.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update profile tier: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ProfileNotFound,
                format!("No profile for user {}", user_id),
            ));
        }

        Ok(())
    }

    async fn find_tier(&self, user_id: &UserId) -> Result<Option<PlanTier>, DomainError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT subscription_tier FROM profiles WHERE user_id = $1")
                .bind(user_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to read profile tier: {}", e),
                    )
                })?;

        row.map(|(tier,)| parse_tier(&tier)).transpose()
    }
}
