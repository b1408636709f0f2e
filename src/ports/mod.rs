//! Ports: async trait seams between the application layer and the
//! outside world.

mod payment_gateway;
mod payment_repository;
mod profile_repository;
mod subscription_repository;
mod usage_tracker;
mod webhook_event_repository;

pub use payment_gateway::{
    CreateOrderRequest, CreateSubscriptionRequest, GatewayError, GatewayOrder, GatewayPayment,
    GatewaySubscription, PaymentGateway,
};
pub use payment_repository::PaymentRepository;
pub use profile_repository::ProfileRepository;
pub use subscription_repository::SubscriptionRepository;
pub use usage_tracker::UsageTracker;
pub use webhook_event_repository::{
    SaveResult, WebhookEventRecord, WebhookEventRepository, WebhookResult,
};
