//! CheckUsageHandler - compares recorded usage against the current
//! plan's limit.

use std::sync::Arc;

use crate::domain::billing::{find_plan, BillingError, Plan, UsageResource, PLAN_CATALOG};
use crate::domain::foundation::UserId;
use crate::ports::{SubscriptionRepository, UsageTracker};

/// Query for a usage-limit check.
#[derive(Debug, Clone)]
pub struct CheckUsageQuery {
    pub user_id: UserId,
    pub resource: UsageResource,
}

/// Outcome of a usage-limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckUsageResult {
    /// Whether the user may consume more of the resource.
    pub can_use: bool,
    /// The plan's ceiling; `-1` means unlimited.
    pub limit: i64,
    /// Recorded usage in the current period.
    pub used: i64,
    pub unlimited: bool,
}

/// Handler for usage-limit checks.
pub struct CheckUsageHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    usage: Arc<dyn UsageTracker>,
}

impl CheckUsageHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>, usage: Arc<dyn UsageTracker>) -> Self {
        Self {
            subscriptions,
            usage,
        }
    }

    /// Resolves the effective plan and checks the resource ceiling.
    pub async fn handle(&self, query: CheckUsageQuery) -> Result<CheckUsageResult, BillingError> {
        let plan = self.effective_plan(&query.user_id).await?;
        let limit = plan.limits.limit_for(query.resource);
        let used = self
            .usage
            .recorded_usage(&query.user_id, query.resource)
            .await
            .map_err(BillingError::from)?;

        let unlimited = plan.limits.is_unlimited(query.resource);
        Ok(CheckUsageResult {
            can_use: unlimited || used < limit,
            limit,
            used,
            unlimited,
        })
    }

    /// The plan whose limits apply: the subscribed plan while the
    /// subscription grants paid access, the free plan otherwise.
    async fn effective_plan(&self, user_id: &UserId) -> Result<&'static Plan, BillingError> {
        let subscription = self
            .subscriptions
            .find_current_for_user(user_id)
            .await
            .map_err(BillingError::from)?;

        let plan = match subscription {
            Some(sub) if sub.status.grants_paid_tier() => find_plan(&sub.plan_id),
            _ => None,
        };
        Ok(plan.unwrap_or(&PLAN_CATALOG[0]))
    }
}
