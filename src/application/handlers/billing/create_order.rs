//! CreateOrderHandler - creates a gateway order for one-time checkout.

use std::sync::Arc;

use serde_json::json;

use crate::domain::billing::{find_plan, BillingCycle, BillingError, PaymentRecord, PaymentStatus};
use crate::domain::foundation::UserId;
use crate::ports::{CreateOrderRequest, PaymentGateway, PaymentRepository};

/// Command to create a checkout order.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    pub user_id: UserId,
    pub plan_id: String,
    pub billing_cycle: BillingCycle,
}

/// Result returned to the checkout widget.
#[derive(Debug, Clone)]
pub struct CreateOrderResult {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
}

/// Handler for order creation.
pub struct CreateOrderHandler {
    gateway: Arc<dyn PaymentGateway>,
    payments: Arc<dyn PaymentRepository>,
}

impl CreateOrderHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>, payments: Arc<dyn PaymentRepository>) -> Self {
        Self { gateway, payments }
    }

    /// Creates the gateway order and the local `created` record.
    ///
    /// A gateway failure after price lookup marks the local record
    /// `failed` so the attempt stays auditable, then surfaces a
    /// `GatewayFailed` error.
    ///
    /// # Errors
    ///
    /// - `PlanNotFound` - unknown plan slug
    /// - `ValidationFailed` - ordering the free plan
    /// - `GatewayFailed` - the gateway rejected or never answered
    pub async fn handle(&self, cmd: CreateOrderCommand) -> Result<CreateOrderResult, BillingError> {
        let plan =
            find_plan(&cmd.plan_id).ok_or_else(|| BillingError::plan_not_found(&cmd.plan_id))?;
        if plan.is_free() {
            return Err(BillingError::validation(
                "plan_id",
                "the free plan cannot be purchased",
            ));
        }

        let amount = plan.price_for(cmd.billing_cycle);
        let request = CreateOrderRequest {
            amount,
            currency: plan.currency.to_string(),
            receipt: format!("rcpt_{}", uuid::Uuid::new_v4().simple()),
            notes: json!({
                "userId": cmd.user_id.as_str(),
                "planId": plan.id,
                "billingCycle": cmd.billing_cycle.as_str(),
            }),
        };

        match self.gateway.create_order(request).await {
            Ok(order) => {
                let record = PaymentRecord::new_for_order(
                    cmd.user_id,
                    plan.id,
                    cmd.billing_cycle,
                    order.id.clone(),
                    order.amount,
                    order.currency.clone(),
                );
                self.payments
                    .insert(&record)
                    .await
                    .map_err(BillingError::from)?;

                Ok(CreateOrderResult {
                    order_id: order.id,
                    amount: order.amount,
                    currency: order.currency,
                })
            }
            Err(err) => {
                tracing::error!(
                    plan_id = %plan.id,
                    error = %err,
                    "gateway order creation failed"
                );
                // Keep the failed attempt visible in the payment log.
                let mut record = PaymentRecord::new_for_order(
                    cmd.user_id,
                    plan.id,
                    cmd.billing_cycle,
                    String::new(),
                    amount,
                    plan.currency,
                );
                record.gateway_order_id = None;
                record.error_description = Some(err.to_string());
                if record.apply_status(PaymentStatus::Failed).is_ok() {
                    self.payments
                        .insert(&record)
                        .await
                        .map_err(BillingError::from)?;
                }
                Err(BillingError::gateway_failed(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::billing::test_support::{
        MockPaymentGateway, MockPaymentRepository,
    };

    fn command(plan_id: &str, cycle: BillingCycle) -> CreateOrderCommand {
        CreateOrderCommand {
            user_id: UserId::new("user-1").unwrap(),
            plan_id: plan_id.to_string(),
            billing_cycle: cycle,
        }
    }

    #[tokio::test]
    async fn creates_order_and_created_record() {
        let payments = Arc::new(MockPaymentRepository::empty());
        let handler = CreateOrderHandler::new(Arc::new(MockPaymentGateway::healthy()), payments.clone());

        let result = handler
            .handle(command("pro", BillingCycle::Monthly))
            .await
            .unwrap();

        assert_eq!(result.order_id, "order_mock1");
        assert_eq!(result.amount, 999_00);
        assert_eq!(result.currency, "INR");

        let record = payments.by_order_id("order_mock1").unwrap();
        assert_eq!(record.status, PaymentStatus::Created);
        assert_eq!(record.plan_id, "pro");
        assert_eq!(record.billing_cycle, BillingCycle::Monthly);
    }

    #[tokio::test]
    async fn yearly_cycle_uses_the_yearly_price() {
        let payments = Arc::new(MockPaymentRepository::empty());
        let handler = CreateOrderHandler::new(Arc::new(MockPaymentGateway::healthy()), payments);

        let result = handler
            .handle(command("pro", BillingCycle::Yearly))
            .await
            .unwrap();

        assert_eq!(result.amount, 9990_00);
    }

    #[tokio::test]
    async fn unknown_plan_is_rejected_without_gateway_call() {
        let gateway = Arc::new(MockPaymentGateway::healthy());
        let handler = CreateOrderHandler::new(gateway.clone(), Arc::new(MockPaymentRepository::empty()));

        let result = handler.handle(command("platinum", BillingCycle::Monthly)).await;

        assert!(matches!(result, Err(BillingError::PlanNotFound { .. })));
        assert_eq!(gateway.order_calls(), 0);
    }

    #[tokio::test]
    async fn free_plan_cannot_be_ordered() {
        let handler = CreateOrderHandler::new(
            Arc::new(MockPaymentGateway::healthy()),
            Arc::new(MockPaymentRepository::empty()),
        );

        let result = handler.handle(command("free", BillingCycle::Monthly)).await;

        assert!(matches!(result, Err(BillingError::ValidationFailed { .. })));
    }

    #[tokio::test]
    async fn gateway_failure_records_failed_attempt_and_surfaces_error() {
        let payments = Arc::new(MockPaymentRepository::empty());
        let handler = CreateOrderHandler::new(Arc::new(MockPaymentGateway::failing()), payments.clone());

        let result = handler.handle(command("pro", BillingCycle::Monthly)).await;

        assert!(matches!(result, Err(BillingError::GatewayFailed { .. })));
        let records = payments.all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, PaymentStatus::Failed);
        assert!(records[0].error_description.is_some());
    }
}
