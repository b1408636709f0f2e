//! Billing domain: plan catalog, subscriptions, payments, and webhook
//! verification.

mod errors;
mod gateway_event;
mod payment;
mod plan;
mod status;
mod subscription;
mod webhook_errors;
mod webhook_verifier;

pub use errors::BillingError;
pub use gateway_event::{GatewayEvent, GatewayEventType, PaymentEntity, SubscriptionEntity};
pub use payment::{PaymentRecord, PaymentStatus};
pub use plan::{
    find_plan, BillingCycle, Plan, PlanLimits, PlanTier, UsageResource, PLAN_CATALOG, UNLIMITED,
};
pub use status::SubscriptionStatus;
pub use subscription::UserSubscription;
pub use webhook_errors::WebhookError;
pub use webhook_verifier::WebhookVerifier;

#[cfg(test)]
pub use gateway_event::fixtures as event_fixtures;
#[cfg(test)]
pub use webhook_verifier::compute_test_signature;
