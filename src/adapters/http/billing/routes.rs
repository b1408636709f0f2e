//! Axum router configuration for billing endpoints.
//!
//! This module defines the route structure for billing-related API
//! endpoints and wires them to their corresponding handlers.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_order, create_subscription, get_subscription, get_usage, handle_razorpay_webhook,
    list_plans, verify_payment, BillingAppState,
};

/// Create the billing API router.
///
/// # Routes
///
/// ## User Endpoints (require authentication)
/// - `GET /subscription` - Get current user's subscription and tier
/// - `GET /usage/:resource` - Check a usage limit
/// - `POST /orders` - Create a gateway order for one-time checkout
/// - `POST /subscriptions` - Create a recurring subscription
/// - `POST /verify` - Verify a checkout callback
pub fn billing_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/subscription", get(get_subscription))
        .route("/usage/:resource", get(get_usage))
        .route("/orders", post(create_order))
        .route("/subscriptions", post(create_subscription))
        .route("/verify", post(verify_payment))
}

/// Create the public plan catalog router.
///
/// Plans are readable without authentication so the pricing page can
/// render before login.
pub fn plan_routes() -> Router<BillingAppState> {
    Router::new().route("/plans", get(list_plans))
}

/// Create the Razorpay webhook router.
///
/// This is separate from the main billing routes because webhooks
/// don't require user authentication (they're verified via signature).
pub fn webhook_routes() -> Router<BillingAppState> {
    Router::new().route("/razorpay", post(handle_razorpay_webhook))
}

/// Create the complete billing module router.
///
/// Combines user routes, the public catalog, and webhook routes into a
/// single router suitable for mounting at `/api`.
pub fn billing_router() -> Router<BillingAppState> {
    Router::new()
        .nest("/billing", billing_routes())
        .nest("/webhooks", webhook_routes())
        .merge(plan_routes())
}
