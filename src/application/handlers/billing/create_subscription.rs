//! CreateSubscriptionHandler - creates a recurring gateway
//! subscription for the hosted checkout widget.

use std::sync::Arc;

use serde_json::json;

use crate::domain::billing::{find_plan, BillingCycle, BillingError, UserSubscription};
use crate::domain::foundation::UserId;
use crate::ports::{CreateSubscriptionRequest, PaymentGateway, SubscriptionRepository};

/// Gateway plan ids for the paid catalog entries.
///
/// The gateway's plan objects are provisioned out of band (per
/// environment), so their ids arrive through configuration rather
/// than the static catalog.
#[derive(Debug, Clone)]
pub struct GatewayPlanIds {
    pub pro_monthly: String,
    pub pro_yearly: String,
    pub enterprise_monthly: String,
    pub enterprise_yearly: String,
}

impl GatewayPlanIds {
    /// Resolves the gateway plan id for a catalog slug and cycle.
    pub fn resolve(&self, plan_id: &str, cycle: BillingCycle) -> Option<&str> {
        match (plan_id, cycle) {
            ("pro", BillingCycle::Monthly) => Some(&self.pro_monthly),
            ("pro", BillingCycle::Yearly) => Some(&self.pro_yearly),
            ("enterprise", BillingCycle::Monthly) => Some(&self.enterprise_monthly),
            ("enterprise", BillingCycle::Yearly) => Some(&self.enterprise_yearly),
            _ => None,
        }
    }
}

/// Command to start a recurring subscription.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionCommand {
    pub user_id: UserId,
    pub plan_id: String,
    pub billing_cycle: BillingCycle,
}

/// Result returned to the checkout widget.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionResult {
    /// Local row id.
    pub subscription_id: String,
    /// Gateway subscription id fed to the widget.
    pub gateway_subscription_id: String,
    /// Hosted checkout URL, when the gateway returns one.
    pub short_url: Option<String>,
}

/// Handler for subscription creation.
pub struct CreateSubscriptionHandler {
    gateway: Arc<dyn PaymentGateway>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    plan_ids: GatewayPlanIds,
}

impl CreateSubscriptionHandler {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        plan_ids: GatewayPlanIds,
    ) -> Self {
        Self {
            gateway,
            subscriptions,
            plan_ids,
        }
    }

    /// Creates the gateway subscription and the pending local row.
    ///
    /// The row stays in `created` status until the first webhook
    /// confirms the mandate.
    ///
    /// # Errors
    ///
    /// - `PlanNotFound` - unknown plan slug
    /// - `ValidationFailed` - free plan, or no gateway plan configured
    /// - `SubscriptionExists` - the user already has a current row
    /// - `GatewayFailed` - the gateway rejected or never answered
    pub async fn handle(
        &self,
        cmd: CreateSubscriptionCommand,
    ) -> Result<CreateSubscriptionResult, BillingError> {
        let plan =
            find_plan(&cmd.plan_id).ok_or_else(|| BillingError::plan_not_found(&cmd.plan_id))?;
        if plan.is_free() {
            return Err(BillingError::validation(
                "plan_id",
                "the free plan needs no subscription",
            ));
        }

        if self
            .subscriptions
            .find_current_for_user(&cmd.user_id)
            .await
            .map_err(BillingError::from)?
            .is_some()
        {
            return Err(BillingError::subscription_exists(cmd.user_id.as_str()));
        }

        let gateway_plan_id = self
            .plan_ids
            .resolve(plan.id, cmd.billing_cycle)
            .ok_or_else(|| {
                BillingError::validation(
                    "plan_id",
                    format!("no gateway plan configured for {} {}", plan.id, cmd.billing_cycle),
                )
            })?;

        // Yearly plans bill once per period; monthly plans run a year
        // of charges before the gateway reports completion.
        let total_count = match cmd.billing_cycle {
            BillingCycle::Monthly => 12,
            BillingCycle::Yearly => 1,
        };

        let request = CreateSubscriptionRequest {
            plan_id: gateway_plan_id.to_string(),
            total_count,
            notes: json!({
                "userId": cmd.user_id.as_str(),
                "planId": plan.id,
                "billingCycle": cmd.billing_cycle.as_str(),
            }),
        };

        let gateway_subscription = self
            .gateway
            .create_subscription(request)
            .await
            .map_err(|e| {
                tracing::error!(plan_id = %plan.id, error = %e, "gateway subscription creation failed");
                BillingError::gateway_failed(e.to_string())
            })?;

        let subscription = UserSubscription::new_pending(
            cmd.user_id,
            plan.id,
            cmd.billing_cycle,
            gateway_subscription.id.clone(),
        );
        self.subscriptions
            .insert(&subscription)
            .await
            .map_err(BillingError::from)?;

        Ok(CreateSubscriptionResult {
            subscription_id: subscription.id.to_string(),
            gateway_subscription_id: gateway_subscription.id,
            short_url: gateway_subscription.short_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::billing::test_support::{
        MockPaymentGateway, MockSubscriptionRepository,
    };
    use crate::domain::billing::SubscriptionStatus;

    fn plan_ids() -> GatewayPlanIds {
        GatewayPlanIds {
            pro_monthly: "plan_pro_m".to_string(),
            pro_yearly: "plan_pro_y".to_string(),
            enterprise_monthly: "plan_ent_m".to_string(),
            enterprise_yearly: "plan_ent_y".to_string(),
        }
    }

    fn command(plan_id: &str) -> CreateSubscriptionCommand {
        CreateSubscriptionCommand {
            user_id: UserId::new("user-1").unwrap(),
            plan_id: plan_id.to_string(),
            billing_cycle: BillingCycle::Monthly,
        }
    }

    #[tokio::test]
    async fn creates_gateway_subscription_and_pending_row() {
        let subscriptions = Arc::new(MockSubscriptionRepository::empty());
        let handler = CreateSubscriptionHandler::new(
            Arc::new(MockPaymentGateway::healthy()),
            subscriptions.clone(),
            plan_ids(),
        );

        let result = handler.handle(command("pro")).await.unwrap();

        assert_eq!(result.gateway_subscription_id, "sub_mock1");
        assert!(result.short_url.is_some());

        let row = subscriptions.by_gateway_id("sub_mock1").unwrap();
        assert_eq!(row.status, SubscriptionStatus::Created);
        assert_eq!(row.plan_id, "pro");
    }

    #[tokio::test]
    async fn existing_current_subscription_conflicts() {
        let existing = UserSubscription::new_active_from_payment(
            UserId::new("user-1").unwrap(),
            "pro",
            BillingCycle::Monthly,
        );
        let gateway = Arc::new(MockPaymentGateway::healthy());
        let handler = CreateSubscriptionHandler::new(
            gateway.clone(),
            Arc::new(MockSubscriptionRepository::with_subscription(existing)),
            plan_ids(),
        );

        let result = handler.handle(command("pro")).await;

        assert!(matches!(result, Err(BillingError::SubscriptionExists { .. })));
        assert_eq!(gateway.subscription_calls(), 0);
    }

    #[tokio::test]
    async fn free_plan_is_rejected() {
        let handler = CreateSubscriptionHandler::new(
            Arc::new(MockPaymentGateway::healthy()),
            Arc::new(MockSubscriptionRepository::empty()),
            plan_ids(),
        );

        let result = handler.handle(command("free")).await;

        assert!(matches!(result, Err(BillingError::ValidationFailed { .. })));
    }

    #[tokio::test]
    async fn gateway_failure_surfaces_without_local_row() {
        let subscriptions = Arc::new(MockSubscriptionRepository::empty());
        let handler = CreateSubscriptionHandler::new(
            Arc::new(MockPaymentGateway::failing()),
            subscriptions.clone(),
            plan_ids(),
        );

        let result = handler.handle(command("pro")).await;

        assert!(matches!(result, Err(BillingError::GatewayFailed { .. })));
        assert!(subscriptions.all().is_empty());
    }
}
