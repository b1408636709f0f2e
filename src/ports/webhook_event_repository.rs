//! WebhookEventRepository port - Interface for the gateway event log.
//!
//! The log serves two purposes: idempotent webhook handling (the
//! gateway redelivers on timeouts and 5xx responses) and an audit
//! trail of every delivery with its payload and outcome. A row is
//! inserted with `processed = false` before dispatch and updated once
//! the handler finishes, so a crash mid-dispatch leaves a visible
//! unprocessed row instead of a silent gap.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::foundation::DomainError;

/// One webhook delivery in the event log.
#[derive(Debug, Clone)]
pub struct WebhookEventRecord {
    /// Delivery id: the gateway's event id when present, otherwise a
    /// UUID minted once at ingress.
    pub event_id: String,

    /// Gateway event name (e.g. "subscription.activated").
    pub event_type: String,

    /// Gateway account the delivery belongs to.
    pub account_id: Option<String>,

    /// Full delivery payload for auditing.
    pub payload: serde_json::Value,

    /// False until the dispatcher has run the handler.
    pub processed: bool,

    /// When processing finished (success or failure).
    pub processed_at: Option<DateTime<Utc>>,

    /// Handler error, if processing failed.
    pub error_message: Option<String>,

    /// When the delivery arrived.
    pub received_at: DateTime<Utc>,
}

impl WebhookEventRecord {
    /// Creates the pre-dispatch row for a fresh delivery.
    pub fn received(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        account_id: Option<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            account_id,
            payload,
            processed: false,
            processed_at: None,
            error_message: None,
            received_at: Utc::now(),
        }
    }

    /// Returns true if this delivery completed without a handler error.
    pub fn succeeded(&self) -> bool {
        self.processed && self.error_message.is_none()
    }
}

/// Result of attempting to insert a webhook event record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Record was inserted (first time seeing this delivery).
    Inserted,
    /// Record already exists (redelivery).
    AlreadyExists,
}

/// Result of webhook processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookResult {
    /// Event was processed by this request.
    Processed,
    /// Event had already been processed (idempotent skip).
    AlreadyProcessed,
}

/// Port for the gateway event log.
///
/// Implementations rely on a PRIMARY KEY on `event_id` so concurrent
/// deliveries of the same event race safely.
#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    /// Insert the pre-dispatch row.
    ///
    /// Uses `ON CONFLICT DO NOTHING` semantics: returns
    /// `SaveResult::AlreadyExists` when the delivery id was seen
    /// before.
    async fn insert(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError>;

    /// Mark the row processed, recording the handler error if any.
    async fn mark_processed(
        &self,
        event_id: &str,
        error_message: Option<&str>,
    ) -> Result<(), DomainError>;

    /// Find a delivery by its id. Returns `None` when unseen.
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError>;
}
