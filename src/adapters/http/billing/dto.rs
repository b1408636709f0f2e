//! HTTP DTOs (Data Transfer Objects) for billing endpoints.
//!
//! These types define the JSON request/response structure for the billing
//! API. They serve as the boundary between HTTP and the application layer.

use crate::domain::billing::{BillingCycle, Plan, PlanTier, SubscriptionStatus, UserSubscription};
use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to create a one-time checkout order.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    /// Catalog plan slug ("pro", "enterprise").
    pub plan_id: String,
    /// Billing cycle to charge for.
    pub billing_cycle: BillingCycle,
}

/// Request to create a recurring subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub plan_id: String,
    pub billing_cycle: BillingCycle,
}

/// Checkout callback fields posted by the payment widget.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Plan catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct PlanResponse {
    pub id: String,
    pub name: String,
    pub tier: PlanTier,
    /// Price per month in the currency's smallest unit.
    pub price_monthly: i64,
    pub price_yearly: i64,
    pub currency: String,
    pub features: Vec<String>,
    pub limits: PlanLimitsResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanLimitsResponse {
    /// `-1` means unlimited.
    pub transcription_hours: i64,
    pub max_file_size_mb: i64,
    pub max_projects: i64,
}

impl From<&Plan> for PlanResponse {
    fn from(plan: &Plan) -> Self {
        Self {
            id: plan.id.to_string(),
            name: plan.name.to_string(),
            tier: plan.tier,
            price_monthly: plan.price_monthly,
            price_yearly: plan.price_yearly,
            currency: plan.currency.to_string(),
            features: plan.features.iter().map(|f| f.to_string()).collect(),
            limits: PlanLimitsResponse {
                transcription_hours: plan.limits.transcription_hours,
                max_file_size_mb: plan.limits.max_file_size_mb,
                max_projects: plan.limits.max_projects,
            },
        }
    }
}

/// Response for order creation, consumed by the checkout widget.
#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
}

/// Response for subscription creation.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionCheckoutResponse {
    pub subscription_id: String,
    pub gateway_subscription_id: String,
    pub short_url: Option<String>,
}

/// Response for payment verification.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyPaymentResponse {
    pub payment_status: String,
    pub subscription_created: bool,
    pub tier: PlanTier,
}

/// Response for the current-subscription query.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    /// The current subscription, or null if none exists.
    pub subscription: Option<SubscriptionViewResponse>,
    pub tier: PlanTier,
}

/// Subscription view for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionViewResponse {
    pub id: String,
    pub plan_id: String,
    pub status: SubscriptionStatus,
    pub billing_cycle: BillingCycle,
    /// Start of the current billing period (ISO 8601).
    pub current_period_start: Option<String>,
    pub current_period_end: Option<String>,
    pub cancelled_at: Option<String>,
    pub created_at: String,
}

impl From<UserSubscription> for SubscriptionViewResponse {
    fn from(sub: UserSubscription) -> Self {
        Self {
            id: sub.id.to_string(),
            plan_id: sub.plan_id,
            status: sub.status,
            billing_cycle: sub.billing_cycle,
            current_period_start: sub
                .current_period_start
                .map(|t| t.as_datetime().to_rfc3339()),
            current_period_end: sub.current_period_end.map(|t| t.as_datetime().to_rfc3339()),
            cancelled_at: sub.cancelled_at.map(|t| t.as_datetime().to_rfc3339()),
            created_at: sub.created_at.as_datetime().to_rfc3339(),
        }
    }
}

/// Response for usage-limit checks.
#[derive(Debug, Clone, Serialize)]
pub struct UsageResponse {
    pub resource: String,
    pub can_use: bool,
    /// `-1` means unlimited.
    pub limit: i64,
    pub used: i64,
    pub unlimited: bool,
}

/// Acknowledgement returned to the webhook sender.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAckResponse {
    pub status: &'static str,
}

/// Standard error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error_code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}
