//! ProcessWebhookHandler - verifies, logs, and dispatches gateway
//! webhook deliveries.
//!
//! Processing order is fixed: verify the signature, parse the
//! envelope, insert the event log row with `processed = false`, run
//! the per-event handler, then update the same row with the outcome.
//! The delivery id is chosen once at ingress (gateway event id when
//! the header is present, otherwise a fresh UUID) and threaded
//! unchanged from insert to update.

use std::sync::Arc;

use uuid::Uuid;

use super::sync_profile_tier::SyncProfileTierHandler;
use crate::domain::billing::{
    GatewayEvent, GatewayEventType, SubscriptionEntity, SubscriptionStatus, UserSubscription,
    WebhookError, WebhookVerifier,
};
use crate::domain::foundation::Timestamp;
use crate::ports::{
    PaymentRepository, SaveResult, SubscriptionRepository, WebhookEventRecord,
    WebhookEventRepository, WebhookResult,
};
use crate::domain::billing::PaymentStatus;

/// Command to process one webhook delivery.
#[derive(Debug, Clone)]
pub struct ProcessWebhookCommand {
    /// Raw request body, exactly as signed by the gateway.
    pub payload: Vec<u8>,
    /// Value of the signature header, if the header was present.
    pub signature: Option<String>,
    /// Gateway event id header, if the gateway sent one.
    pub delivery_id: Option<String>,
}

/// Handler for gateway webhook deliveries.
pub struct ProcessWebhookHandler {
    verifier: WebhookVerifier,
    events: Arc<dyn WebhookEventRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    payments: Arc<dyn PaymentRepository>,
    tier_sync: Arc<SyncProfileTierHandler>,
}

impl ProcessWebhookHandler {
    pub fn new(
        verifier: WebhookVerifier,
        events: Arc<dyn WebhookEventRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        payments: Arc<dyn PaymentRepository>,
        tier_sync: Arc<SyncProfileTierHandler>,
    ) -> Self {
        Self {
            verifier,
            events,
            subscriptions,
            payments,
            tier_sync,
        }
    }

    /// Processes a delivery end to end.
    ///
    /// # Errors
    ///
    /// - `MissingSignature` / `InvalidSignature` / `ParseError` - the
    ///   request is rejected before any state mutation
    /// - `Database` - a handler failed mid-processing; the log row
    ///   records the error and the gateway is told to retry
    pub async fn handle(
        &self,
        cmd: ProcessWebhookCommand,
    ) -> Result<WebhookResult, WebhookError> {
        let signature = cmd.signature.ok_or(WebhookError::MissingSignature)?;
        self.verifier.verify_body(&cmd.payload, &signature)?;

        let event = GatewayEvent::parse(&cmd.payload)?;
        let raw_payload: serde_json::Value = serde_json::from_slice(&cmd.payload)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        let event_id = cmd
            .delivery_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let record = WebhookEventRecord::received(
            &event_id,
            &event.event,
            event.account_id.clone(),
            raw_payload,
        );
        if self.events.insert(record).await? == SaveResult::AlreadyExists {
            if let Some(existing) = self.events.find_by_event_id(&event_id).await? {
                if existing.succeeded() {
                    tracing::info!(event_id = %event_id, "duplicate delivery, already processed");
                    return Ok(WebhookResult::AlreadyProcessed);
                }
            }
            tracing::info!(event_id = %event_id, "reprocessing previously failed delivery");
        }

        match self.dispatch(&event).await {
            Ok(()) => {
                self.events.mark_processed(&event_id, None).await?;
                Ok(WebhookResult::Processed)
            }
            Err(WebhookError::Ignored(reason)) => {
                tracing::info!(
                    event_id = %event_id,
                    event = %event.event,
                    reason = %reason,
                    "webhook acknowledged without processing"
                );
                self.events.mark_processed(&event_id, None).await?;
                Ok(WebhookResult::Processed)
            }
            Err(WebhookError::InvalidTransition(reason)) => {
                tracing::warn!(
                    event_id = %event_id,
                    event = %event.event,
                    reason = %reason,
                    "illegal subscription transition rejected"
                );
                self.events.mark_processed(&event_id, Some(&reason)).await?;
                Ok(WebhookResult::Processed)
            }
            Err(err) => {
                tracing::error!(
                    event_id = %event_id,
                    event = %event.event,
                    error = %err,
                    "webhook processing failed"
                );
                let message = err.to_string();
                self.events.mark_processed(&event_id, Some(&message)).await?;
                Err(err)
            }
        }
    }

    async fn dispatch(&self, event: &GatewayEvent) -> Result<(), WebhookError> {
        match event.event_type() {
            GatewayEventType::PaymentAuthorized => self.handle_payment_authorized(event).await,
            GatewayEventType::PaymentCaptured => self.handle_payment_captured(event).await,
            GatewayEventType::PaymentFailed => self.handle_payment_failed(event).await,
            GatewayEventType::SubscriptionAuthenticated => {
                self.handle_subscription_authenticated(event).await
            }
            GatewayEventType::SubscriptionActivated => {
                self.handle_subscription_activated(event).await
            }
            GatewayEventType::SubscriptionCharged => self.handle_subscription_charged(event).await,
            GatewayEventType::SubscriptionCompleted => {
                self.handle_subscription_completed(event).await
            }
            GatewayEventType::SubscriptionCancelled => {
                self.handle_subscription_cancelled(event).await
            }
            GatewayEventType::SubscriptionPaused => self.handle_subscription_paused(event).await,
            GatewayEventType::SubscriptionResumed => self.handle_subscription_resumed(event).await,
            GatewayEventType::SubscriptionHalted => self.handle_subscription_halted(event).await,
            GatewayEventType::Unknown(name) => {
                Err(WebhookError::Ignored(format!("unknown event type '{}'", name)))
            }
        }
    }

    // ── payment events ────────────────────────────────────────────

    async fn handle_payment_authorized(&self, event: &GatewayEvent) -> Result<(), WebhookError> {
        let payment = event.payment()?;
        let Some(mut record) = self.find_payment_record(&payment.id, payment.order_id.as_deref()).await?
        else {
            return Err(WebhookError::Ignored(format!(
                "no payment record for payment {}",
                payment.id
            )));
        };

        record.gateway_payment_id = Some(payment.id.clone());
        record.method = payment.method.clone();
        transition_payment(&mut record, PaymentStatus::Authorized)?;
        self.payments.update(&record).await?;
        Ok(())
    }

    async fn handle_payment_captured(&self, event: &GatewayEvent) -> Result<(), WebhookError> {
        let payment = event.payment()?;

        if let Some(mut record) = self
            .find_payment_record(&payment.id, payment.order_id.as_deref())
            .await?
        {
            record.gateway_payment_id = Some(payment.id.clone());
            record.method = payment.method.clone();
            transition_payment(&mut record, PaymentStatus::Captured)?;
            self.payments.update(&record).await?;
        } else {
            tracing::warn!(payment_id = %payment.id, "captured payment has no local record");
        }

        // A capture against a subscription invoice carries the
        // subscription id in the notes; move the subscription to
        // active and resync the tier. No matching row is a no-op.
        if let Some(gateway_sub_id) = payment.note("subscriptionId") {
            match self
                .subscriptions
                .find_by_gateway_subscription_id(gateway_sub_id)
                .await?
            {
                Some(mut sub) => {
                    transition_subscription(&mut sub, SubscriptionStatus::Active)?;
                    self.subscriptions.update(&sub).await?;
                    self.sync_tier(&sub).await?;
                }
                None => {
                    tracing::warn!(
                        gateway_subscription_id = %gateway_sub_id,
                        "captured payment references unknown subscription"
                    );
                }
            }
        }
        Ok(())
    }

    async fn handle_payment_failed(&self, event: &GatewayEvent) -> Result<(), WebhookError> {
        let payment = event.payment()?;

        if let Some(mut record) = self
            .find_payment_record(&payment.id, payment.order_id.as_deref())
            .await?
        {
            record.gateway_payment_id = Some(payment.id.clone());
            record.error_description = payment.error_description.clone();
            transition_payment(&mut record, PaymentStatus::Failed)?;
            self.payments.update(&record).await?;
        } else {
            tracing::warn!(payment_id = %payment.id, "failed payment has no local record");
        }

        // Failed subscription charge halts the subscription. The tier
        // is left untouched until the gateway settles the retry cycle.
        if let Some(gateway_sub_id) = payment.note("subscriptionId") {
            if let Some(mut sub) = self
                .subscriptions
                .find_by_gateway_subscription_id(gateway_sub_id)
                .await?
            {
                transition_subscription(&mut sub, SubscriptionStatus::Halted)?;
                self.subscriptions.update(&sub).await?;
            }
        }
        Ok(())
    }

    // ── subscription events ───────────────────────────────────────

    async fn handle_subscription_authenticated(
        &self,
        event: &GatewayEvent,
    ) -> Result<(), WebhookError> {
        let entity = event.subscription()?;
        let mut sub = self.load_subscription(&entity.id).await?;

        transition_subscription(&mut sub, SubscriptionStatus::Authenticated)?;
        let (start, end) = entity_period(&entity);
        sub.set_period(start, end);
        self.subscriptions.update(&sub).await?;
        Ok(())
    }

    async fn handle_subscription_activated(
        &self,
        event: &GatewayEvent,
    ) -> Result<(), WebhookError> {
        let entity = event.subscription()?;
        let mut sub = self.load_subscription(&entity.id).await?;

        transition_subscription(&mut sub, SubscriptionStatus::Active)?;
        let (start, end) = entity_period(&entity);
        sub.set_period(start, end);
        self.subscriptions.update(&sub).await?;
        self.sync_tier(&sub).await?;
        Ok(())
    }

    async fn handle_subscription_charged(&self, event: &GatewayEvent) -> Result<(), WebhookError> {
        let entity = event.subscription()?;
        let mut sub = self.load_subscription(&entity.id).await?;

        // Renewal charge: the status does not change, only the period.
        let (start, end) = entity_period(&entity);
        sub.set_period(start, end);
        self.subscriptions.update(&sub).await?;
        Ok(())
    }

    async fn handle_subscription_completed(
        &self,
        event: &GatewayEvent,
    ) -> Result<(), WebhookError> {
        let entity = event.subscription()?;
        let mut sub = self.load_subscription(&entity.id).await?;

        transition_subscription(&mut sub, SubscriptionStatus::Expired)?;
        sub.ended_at = to_timestamp(entity.ended_at);
        self.subscriptions.update(&sub).await?;
        self.sync_tier(&sub).await?;
        Ok(())
    }

    async fn handle_subscription_cancelled(
        &self,
        event: &GatewayEvent,
    ) -> Result<(), WebhookError> {
        let entity = event.subscription()?;
        let mut sub = self.load_subscription(&entity.id).await?;

        // The gateway sends cancelled twice for cycle-end cancels:
        // once at the request (no ended_at) and once when the period
        // actually ends. The second delivery lands on an already
        // cancelled row, so only the timestamps are refreshed.
        if sub.status != SubscriptionStatus::Cancelled {
            transition_subscription(&mut sub, SubscriptionStatus::Cancelled)?;
        }
        let ended_at = to_timestamp(entity.ended_at);
        let cancelled_at = to_timestamp(event.created_at).or(sub.cancelled_at);
        sub.set_cancellation(cancelled_at, ended_at);
        self.subscriptions.update(&sub).await?;

        // Access lasts until the period actually ends.
        if ended_at.is_some() {
            self.sync_tier(&sub).await?;
        }
        Ok(())
    }

    async fn handle_subscription_paused(&self, event: &GatewayEvent) -> Result<(), WebhookError> {
        let entity = event.subscription()?;
        let mut sub = self.load_subscription(&entity.id).await?;

        transition_subscription(&mut sub, SubscriptionStatus::Paused)?;
        self.subscriptions.update(&sub).await?;
        Ok(())
    }

    async fn handle_subscription_resumed(&self, event: &GatewayEvent) -> Result<(), WebhookError> {
        let entity = event.subscription()?;
        let mut sub = self.load_subscription(&entity.id).await?;

        transition_subscription(&mut sub, SubscriptionStatus::Active)?;
        let (start, end) = entity_period(&entity);
        sub.set_period(start, end);
        self.subscriptions.update(&sub).await?;
        self.sync_tier(&sub).await?;
        Ok(())
    }

    async fn handle_subscription_halted(&self, event: &GatewayEvent) -> Result<(), WebhookError> {
        let entity = event.subscription()?;
        let mut sub = self.load_subscription(&entity.id).await?;

        transition_subscription(&mut sub, SubscriptionStatus::Halted)?;
        self.subscriptions.update(&sub).await?;
        self.sync_tier(&sub).await?;
        Ok(())
    }

    // ── helpers ───────────────────────────────────────────────────

    async fn load_subscription(
        &self,
        gateway_subscription_id: &str,
    ) -> Result<UserSubscription, WebhookError> {
        self.subscriptions
            .find_by_gateway_subscription_id(gateway_subscription_id)
            .await?
            .ok_or_else(|| {
                WebhookError::Ignored(format!(
                    "no subscription row for {}",
                    gateway_subscription_id
                ))
            })
    }

    async fn find_payment_record(
        &self,
        gateway_payment_id: &str,
        gateway_order_id: Option<&str>,
    ) -> Result<Option<crate::domain::billing::PaymentRecord>, WebhookError> {
        if let Some(record) = self
            .payments
            .find_by_gateway_payment_id(gateway_payment_id)
            .await?
        {
            return Ok(Some(record));
        }
        if let Some(order_id) = gateway_order_id {
            return Ok(self.payments.find_by_gateway_order_id(order_id).await?);
        }
        Ok(None)
    }

    async fn sync_tier(&self, sub: &UserSubscription) -> Result<(), WebhookError> {
        self.tier_sync
            .handle(&sub.user_id)
            .await
            .map_err(|e| WebhookError::Database(e.to_string()))?;
        Ok(())
    }
}

fn transition_subscription(
    sub: &mut UserSubscription,
    target: SubscriptionStatus,
) -> Result<(), WebhookError> {
    sub.apply_status(target)
        .map_err(|e| WebhookError::InvalidTransition(e.to_string()))
}

fn transition_payment(
    record: &mut crate::domain::billing::PaymentRecord,
    target: PaymentStatus,
) -> Result<(), WebhookError> {
    record
        .apply_status(target)
        .map_err(|e| WebhookError::InvalidTransition(e.to_string()))
}

fn entity_period(entity: &SubscriptionEntity) -> (Option<Timestamp>, Option<Timestamp>) {
    (
        to_timestamp(entity.current_start),
        to_timestamp(entity.current_end),
    )
}

/// Epoch seconds to timestamp; absent or unrepresentable values stay
/// absent rather than defaulting to now.
fn to_timestamp(secs: Option<i64>) -> Option<Timestamp> {
    secs.and_then(Timestamp::from_unix_secs)
}
