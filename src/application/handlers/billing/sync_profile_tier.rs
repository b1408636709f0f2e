//! SyncProfileTierHandler - rewrites the profile's denormalized tier
//! from the current subscription state.

use std::sync::Arc;

use crate::domain::billing::{find_plan, BillingError, PlanTier};
use crate::domain::foundation::UserId;
use crate::ports::{ProfileRepository, SubscriptionRepository};

/// Handler that recomputes and writes a user's subscription tier.
///
/// The tier is derived, never authoritative: the plan's tier when the
/// current subscription grants paid access, `free` otherwise. Running
/// it twice in a row writes the same value, so callers invoke it after
/// every lifecycle change without checking whether anything changed.
pub struct SyncProfileTierHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl SyncProfileTierHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            subscriptions,
            profiles,
        }
    }

    /// Recomputes the tier and writes it to the profile.
    ///
    /// Returns the tier that was written.
    pub async fn handle(&self, user_id: &UserId) -> Result<PlanTier, BillingError> {
        let subscription = self
            .subscriptions
            .find_current_for_user(user_id)
            .await
            .map_err(BillingError::from)?;

        let tier = match subscription {
            Some(sub) if sub.status.grants_paid_tier() => find_plan(&sub.plan_id)
                .map(|plan| plan.tier)
                .unwrap_or(PlanTier::Free),
            _ => PlanTier::Free,
        };

        self.profiles
            .set_subscription_tier(user_id, tier)
            .await
            .map_err(BillingError::from)?;

        tracing::info!(user_id = %user_id, tier = %tier, "synced profile tier");
        Ok(tier)
    }
}
