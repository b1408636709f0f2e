//! GetSubscriptionHandler - current-subscription summary for the
//! signed-in user.

use std::sync::Arc;

use crate::domain::billing::{BillingError, PlanTier, UserSubscription};
use crate::domain::foundation::UserId;
use crate::ports::{ProfileRepository, SubscriptionRepository};

/// Summary of a user's billing state.
#[derive(Debug, Clone)]
pub struct SubscriptionSummary {
    /// The current subscription, if any.
    pub subscription: Option<UserSubscription>,
    /// The profile's denormalized tier; free when no profile row.
    pub tier: PlanTier,
}

/// Handler for the current-subscription query.
pub struct GetSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl GetSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            subscriptions,
            profiles,
        }
    }

    pub async fn handle(&self, user_id: &UserId) -> Result<SubscriptionSummary, BillingError> {
        let subscription = self
            .subscriptions
            .find_current_for_user(user_id)
            .await
            .map_err(BillingError::from)?;
        let tier = self
            .profiles
            .find_tier(user_id)
            .await
            .map_err(BillingError::from)?
            .unwrap_or(PlanTier::Free);

        Ok(SubscriptionSummary { subscription, tier })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::billing::test_support::{
        MockProfileRepository, MockSubscriptionRepository,
    };
    use crate::domain::billing::{BillingCycle, SubscriptionStatus};

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    #[tokio::test]
    async fn returns_current_subscription_and_tier() {
        let mut sub = UserSubscription::new_pending(user(), "pro", BillingCycle::Monthly, "sub_1");
        sub.status = SubscriptionStatus::Active;
        let profiles = MockProfileRepository::new();
        profiles
            .set_subscription_tier(&user(), PlanTier::Pro)
            .await
            .unwrap();
        let handler = GetSubscriptionHandler::new(
            Arc::new(MockSubscriptionRepository::with_subscription(sub)),
            profiles,
        );

        let summary = handler.handle(&user()).await.unwrap();

        assert_eq!(summary.tier, PlanTier::Pro);
        assert_eq!(
            summary.subscription.unwrap().status,
            SubscriptionStatus::Active
        );
    }

    #[tokio::test]
    async fn user_without_subscription_reads_free() {
        let handler = GetSubscriptionHandler::new(
            Arc::new(MockSubscriptionRepository::empty()),
            MockProfileRepository::new(),
        );

        let summary = handler.handle(&user()).await.unwrap();

        assert!(summary.subscription.is_none());
        assert_eq!(summary.tier, PlanTier::Free);
    }

    #[tokio::test]
    async fn terminal_subscription_is_not_returned_as_current() {
        let mut sub = UserSubscription::new_pending(user(), "pro", BillingCycle::Monthly, "sub_1");
        sub.status = SubscriptionStatus::Cancelled;
        let handler = GetSubscriptionHandler::new(
            Arc::new(MockSubscriptionRepository::with_subscription(sub)),
            MockProfileRepository::new(),
        );

        let summary = handler.handle(&user()).await.unwrap();

        assert!(summary.subscription.is_none());
    }
}
