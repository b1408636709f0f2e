//! Billing command and query handlers.

mod check_usage;
mod create_order;
mod create_subscription;
mod get_subscription;
mod process_webhook;
mod sync_profile_tier;
mod verify_payment;

#[cfg(test)]
pub mod test_support;

pub use check_usage::{CheckUsageHandler, CheckUsageQuery, CheckUsageResult};
pub use create_order::{CreateOrderCommand, CreateOrderHandler, CreateOrderResult};
pub use create_subscription::{
    CreateSubscriptionCommand, CreateSubscriptionHandler, CreateSubscriptionResult,
    GatewayPlanIds,
};
pub use get_subscription::{GetSubscriptionHandler, SubscriptionSummary};
pub use process_webhook::{ProcessWebhookCommand, ProcessWebhookHandler};
pub use sync_profile_tier::SyncProfileTierHandler;
pub use verify_payment::{VerifyPaymentCommand, VerifyPaymentHandler, VerifyPaymentResult};
