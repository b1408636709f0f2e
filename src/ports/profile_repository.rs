//! ProfileRepository port - the denormalized subscription tier on the
//! user's profile row.
//!
//! The tier column is a read-optimized copy of the subscription state;
//! the subscription table stays the source of truth and the sync
//! handler rewrites the column after every lifecycle change.

use async_trait::async_trait;

use crate::domain::billing::PlanTier;
use crate::domain::foundation::{DomainError, UserId};

/// Port for reading and writing the profile's subscription tier.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Overwrite the profile's tier. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns a `ProfileNotFound` domain error when no profile row
    /// exists for the user.
    async fn set_subscription_tier(
        &self,
        user_id: &UserId,
        tier: PlanTier,
    ) -> Result<(), DomainError>;

    /// Read the profile's current tier.
    async fn find_tier(&self, user_id: &UserId) -> Result<Option<PlanTier>, DomainError>;
}
