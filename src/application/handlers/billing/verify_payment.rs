//! VerifyPaymentHandler - synchronous checkout-callback verification.
//!
//! After the hosted widget completes, the frontend posts the order id,
//! payment id, and the widget's signature. The signature is checked
//! against `"{order_id}|{payment_id}"`, the authoritative payment
//! state is fetched from the gateway, the local record is updated, and
//! a subscription is created when the user has none. The webhook path
//! later redelivers the same facts; both paths are idempotent.

use std::sync::Arc;

use super::sync_profile_tier::SyncProfileTierHandler;
use crate::domain::billing::{
    BillingError, PaymentStatus, PlanTier, UserSubscription, WebhookVerifier,
};
use crate::domain::foundation::UserId;
use crate::ports::{PaymentGateway, PaymentRepository, SubscriptionRepository};

/// Command carrying the checkout callback fields.
#[derive(Debug, Clone)]
pub struct VerifyPaymentCommand {
    pub user_id: UserId,
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

/// Result of a successful verification.
#[derive(Debug, Clone)]
pub struct VerifyPaymentResult {
    pub payment_status: PaymentStatus,
    /// True when this call created the subscription row.
    pub subscription_created: bool,
    pub tier: PlanTier,
}

/// Handler for the verify-payment flow.
pub struct VerifyPaymentHandler {
    verifier: WebhookVerifier,
    gateway: Arc<dyn PaymentGateway>,
    payments: Arc<dyn PaymentRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    tier_sync: Arc<SyncProfileTierHandler>,
}

impl VerifyPaymentHandler {
    pub fn new(
        verifier: WebhookVerifier,
        gateway: Arc<dyn PaymentGateway>,
        payments: Arc<dyn PaymentRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        tier_sync: Arc<SyncProfileTierHandler>,
    ) -> Self {
        Self {
            verifier,
            gateway,
            payments,
            subscriptions,
            tier_sync,
        }
    }

    /// Verifies the callback and settles the payment.
    ///
    /// # Errors
    ///
    /// - `InvalidSignature` - the widget signature does not verify
    /// - `PaymentRecordNotFound` - no record matches the order id
    /// - `GatewayFailed` - the authoritative fetch failed
    pub async fn handle(
        &self,
        cmd: VerifyPaymentCommand,
    ) -> Result<VerifyPaymentResult, BillingError> {
        self.verifier
            .verify_payment_signature(
                &cmd.razorpay_order_id,
                &cmd.razorpay_payment_id,
                &cmd.razorpay_signature,
            )
            .map_err(|_| BillingError::InvalidSignature)?;

        // The signature proves the callback is genuine; the payment
        // state still comes from the gateway, never from the client.
        let gateway_payment = self
            .gateway
            .fetch_payment(&cmd.razorpay_payment_id)
            .await
            .map_err(|e| BillingError::gateway_failed(e.to_string()))?;

        let mut record = self
            .payments
            .find_by_gateway_order_id(&cmd.razorpay_order_id)
            .await
            .map_err(BillingError::from)?
            .ok_or_else(|| BillingError::payment_record_not_found(&cmd.razorpay_order_id))?;

        let target = if gateway_payment.captured {
            PaymentStatus::Captured
        } else {
            PaymentStatus::Authorized
        };
        record.gateway_payment_id = Some(gateway_payment.id.clone());
        record.method = gateway_payment.method.clone();
        record
            .apply_status(target)
            .map_err(|e| BillingError::invalid_state(e.to_string()))?;
        self.payments
            .update(&record)
            .await
            .map_err(BillingError::from)?;

        let existing = self
            .subscriptions
            .find_current_for_user(&cmd.user_id)
            .await
            .map_err(BillingError::from)?;

        let subscription_created = if existing.is_none() {
            let subscription = UserSubscription::new_active_from_payment(
                cmd.user_id.clone(),
                record.plan_id.clone(),
                record.billing_cycle,
            );
            self.subscriptions
                .insert(&subscription)
                .await
                .map_err(BillingError::from)?;
            tracing::info!(
                user_id = %cmd.user_id,
                plan_id = %record.plan_id,
                "created subscription from verified payment"
            );
            true
        } else {
            false
        };

        let tier = self.tier_sync.handle(&cmd.user_id).await?;

        Ok(VerifyPaymentResult {
            payment_status: record.status,
            subscription_created,
            tier,
        })
    }
}
