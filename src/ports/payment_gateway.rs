//! PaymentGateway port - outbound interface to the payment provider.
//!
//! The application layer never talks to the vendor API directly; it
//! goes through this trait so handlers can be tested against a mock
//! and the vendor client stays swappable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from gateway API calls.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The gateway answered with a non-2xx status.
    #[error("gateway rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Transport failure: DNS, TLS, timeout, connection reset.
    #[error("gateway unreachable: {0}")]
    Unreachable(String),

    /// The gateway's response did not match the expected shape.
    #[error("unexpected gateway response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// Returns true if retrying the call could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Unreachable(_) => true,
            GatewayError::Rejected { status, .. } => *status >= 500,
            GatewayError::InvalidResponse(_) => false,
        }
    }
}

/// Request to create a gateway order for one-time checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest {
    /// Amount in the currency's smallest unit.
    pub amount: i64,
    pub currency: String,
    /// Caller-chosen receipt reference, echoed back by the gateway.
    pub receipt: String,
    /// Notes attached to the order (user id, plan id).
    pub notes: serde_json::Value,
}

/// Gateway order as returned by the create call.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Request to create a recurring gateway subscription.
#[derive(Debug, Clone, Serialize)]
pub struct CreateSubscriptionRequest {
    /// The gateway's plan id (`plan_...`), not our catalog slug.
    pub plan_id: String,
    /// Number of billing cycles to charge.
    pub total_count: u32,
    /// Notes attached to the subscription (user id, catalog slug).
    pub notes: serde_json::Value,
}

/// Gateway subscription as returned by the create call.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySubscription {
    pub id: String,
    pub plan_id: String,
    #[serde(default)]
    pub status: Option<String>,
    /// Hosted checkout URL for the payment widget.
    #[serde(default)]
    pub short_url: Option<String>,
}

/// Authoritative payment state fetched from the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayPayment {
    pub id: String,
    #[serde(default)]
    pub order_id: Option<String>,
    pub amount: i64,
    pub currency: String,
    /// True once funds are captured, false while only authorized.
    #[serde(default)]
    pub captured: bool,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Port for the payment gateway's REST API.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order for one-time checkout.
    async fn create_order(&self, request: CreateOrderRequest)
        -> Result<GatewayOrder, GatewayError>;

    /// Create a recurring subscription.
    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<GatewaySubscription, GatewayError>;

    /// Fetch the authoritative state of a payment.
    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError>;
}
