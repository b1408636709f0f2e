//! PostgreSQL adapters for the billing ports.

mod payment_repository;
mod profile_repository;
mod subscription_repository;
mod usage_tracker;
mod webhook_event_repository;

pub use payment_repository::PostgresPaymentRepository;
pub use profile_repository::PostgresProfileRepository;
pub use subscription_repository::PostgresSubscriptionRepository;
pub use usage_tracker::PostgresUsageTracker;
pub use webhook_event_repository::PostgresWebhookEventRepository;
