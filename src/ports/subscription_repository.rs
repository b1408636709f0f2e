//! SubscriptionRepository port - persistence for user subscriptions.

use async_trait::async_trait;

use crate::domain::billing::UserSubscription;
use crate::domain::foundation::{DomainError, SubscriptionId, UserId};

/// Port for storing and querying subscription rows.
///
/// The backing table carries a partial unique index on `user_id` over
/// non-terminal rows, so `insert` fails with `SubscriptionExists` when
/// the user already has a current subscription.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a new subscription row.
    ///
    /// # Errors
    ///
    /// Returns a `SubscriptionExists` domain error when the user
    /// already has a non-terminal row.
    async fn insert(&self, subscription: &UserSubscription) -> Result<(), DomainError>;

    /// Update an existing row in place.
    async fn update(&self, subscription: &UserSubscription) -> Result<(), DomainError>;

    /// Find by local id.
    async fn find_by_id(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<UserSubscription>, DomainError>;

    /// Find the user's current (non-terminal, access-relevant) row.
    async fn find_current_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserSubscription>, DomainError>;

    /// Find by the gateway's subscription id.
    async fn find_by_gateway_subscription_id(
        &self,
        gateway_subscription_id: &str,
    ) -> Result<Option<UserSubscription>, DomainError>;
}
