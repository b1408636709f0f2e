//! HTTP handlers for billing endpoints.
//!
//! These handlers connect Axum routes to application layer command/query
//! handlers.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::billing::{
    CheckUsageHandler, CheckUsageQuery, CreateOrderCommand, CreateOrderHandler,
    CreateSubscriptionCommand, CreateSubscriptionHandler, GatewayPlanIds, GetSubscriptionHandler,
    ProcessWebhookCommand, ProcessWebhookHandler, SyncProfileTierHandler, VerifyPaymentCommand,
    VerifyPaymentHandler,
};
use crate::domain::billing::{BillingError, WebhookError, WebhookVerifier, PLAN_CATALOG};
use crate::domain::foundation::UserId;
use crate::ports::{
    PaymentGateway, PaymentRepository, ProfileRepository, SubscriptionRepository, UsageTracker,
    WebhookEventRepository, WebhookResult,
};

use super::dto::{
    CreateOrderRequest, CreateSubscriptionRequest, ErrorResponse, OrderResponse, PlanResponse,
    SubscriptionCheckoutResponse, SubscriptionResponse, SubscriptionViewResponse, UsageResponse,
    VerifyPaymentRequest, VerifyPaymentResponse, WebhookAckResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// This struct is cloned for each request and contains Arc-wrapped
/// dependencies for efficient sharing across handlers.
#[derive(Clone)]
pub struct BillingAppState {
    pub subscription_repository: Arc<dyn SubscriptionRepository>,
    pub payment_repository: Arc<dyn PaymentRepository>,
    pub webhook_event_repository: Arc<dyn WebhookEventRepository>,
    pub profile_repository: Arc<dyn ProfileRepository>,
    pub usage_tracker: Arc<dyn UsageTracker>,
    pub payment_gateway: Arc<dyn PaymentGateway>,
    /// Secret the gateway signs webhook bodies with.
    pub webhook_secret: String,
    /// Razorpay key secret; the hosted checkout widget signs its
    /// callback with this, not with the webhook secret.
    pub checkout_secret: String,
    /// Gateway plan ids, keyed by catalog slug and cycle.
    pub gateway_plan_ids: GatewayPlanIds,
}

impl BillingAppState {
    /// Create handlers on demand from the shared state.
    pub fn tier_sync_handler(&self) -> Arc<SyncProfileTierHandler> {
        Arc::new(SyncProfileTierHandler::new(
            self.subscription_repository.clone(),
            self.profile_repository.clone(),
        ))
    }

    pub fn create_order_handler(&self) -> CreateOrderHandler {
        CreateOrderHandler::new(
            self.payment_gateway.clone(),
            self.payment_repository.clone(),
        )
    }

    pub fn create_subscription_handler(&self) -> CreateSubscriptionHandler {
        CreateSubscriptionHandler::new(
            self.payment_gateway.clone(),
            self.subscription_repository.clone(),
            self.gateway_plan_ids.clone(),
        )
    }

    pub fn verify_payment_handler(&self) -> VerifyPaymentHandler {
        VerifyPaymentHandler::new(
            WebhookVerifier::new(self.checkout_secret.clone()),
            self.payment_gateway.clone(),
            self.payment_repository.clone(),
            self.subscription_repository.clone(),
            self.tier_sync_handler(),
        )
    }

    pub fn get_subscription_handler(&self) -> GetSubscriptionHandler {
        GetSubscriptionHandler::new(
            self.subscription_repository.clone(),
            self.profile_repository.clone(),
        )
    }

    pub fn check_usage_handler(&self) -> CheckUsageHandler {
        CheckUsageHandler::new(
            self.subscription_repository.clone(),
            self.usage_tracker.clone(),
        )
    }

    pub fn webhook_handler(&self) -> ProcessWebhookHandler {
        ProcessWebhookHandler::new(
            WebhookVerifier::new(self.webhook_secret.clone()),
            self.webhook_event_repository.clone(),
            self.subscription_repository.clone(),
            self.payment_repository.clone(),
            self.tier_sync_handler(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// User Context (would come from auth middleware in production)
// ════════════════════════════════════════════════════════════════════════════════

/// Authenticated user context extracted from request.
///
/// In production, this would be extracted from JWT/session by auth
/// middleware. For now, uses a header-based extraction for
/// development/testing.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            // In production, this would validate the JWT from the
            // Authorization header. For development, we accept an
            // X-User-Id header.
            let user_id = parts
                .headers
                .get("X-User-Id")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| UserId::new(s).ok())
                .ok_or(AuthenticationRequired)?;

            Ok(AuthenticatedUser { user_id })
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/plans - List the plan catalog (no auth required)
pub async fn list_plans() -> impl IntoResponse {
    let plans: Vec<PlanResponse> = PLAN_CATALOG.iter().map(PlanResponse::from).collect();
    Json(plans)
}

/// GET /api/billing/subscription - Get current user's subscription
pub async fn get_subscription(
    State(state): State<BillingAppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.get_subscription_handler();
    let summary = handler.handle(&user.user_id).await?;

    let response = SubscriptionResponse {
        subscription: summary.subscription.map(SubscriptionViewResponse::from),
        tier: summary.tier,
    };

    Ok(Json(response))
}

/// GET /api/billing/usage/:resource - Check a usage limit
pub async fn get_usage(
    State(state): State<BillingAppState>,
    user: AuthenticatedUser,
    Path(resource): Path<String>,
) -> Result<impl IntoResponse, BillingApiError> {
    let resource = resource
        .parse()
        .map_err(|_| BillingError::validation("resource", format!("unknown resource '{}'", resource)))?;

    let handler = state.check_usage_handler();
    let query = CheckUsageQuery {
        user_id: user.user_id,
        resource,
    };

    let result = handler.handle(query).await?;

    let response = UsageResponse {
        resource: resource_name(resource),
        can_use: result.can_use,
        limit: result.limit,
        used: result.used,
        unlimited: result.unlimited,
    };

    Ok(Json(response))
}

fn resource_name(resource: crate::domain::billing::UsageResource) -> String {
    resource.as_str().to_string()
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/billing/orders - Create a gateway order for checkout
pub async fn create_order(
    State(state): State<BillingAppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.create_order_handler();
    let cmd = CreateOrderCommand {
        user_id: user.user_id,
        plan_id: request.plan_id,
        billing_cycle: request.billing_cycle,
    };

    let result = handler.handle(cmd).await?;

    let response = OrderResponse {
        order_id: result.order_id,
        amount: result.amount,
        currency: result.currency,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/billing/subscriptions - Create a recurring subscription
pub async fn create_subscription(
    State(state): State<BillingAppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateSubscriptionRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.create_subscription_handler();
    let cmd = CreateSubscriptionCommand {
        user_id: user.user_id,
        plan_id: request.plan_id,
        billing_cycle: request.billing_cycle,
    };

    let result = handler.handle(cmd).await?;

    let response = SubscriptionCheckoutResponse {
        subscription_id: result.subscription_id,
        gateway_subscription_id: result.gateway_subscription_id,
        short_url: result.short_url,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/billing/verify - Verify a checkout callback
pub async fn verify_payment(
    State(state): State<BillingAppState>,
    user: AuthenticatedUser,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.verify_payment_handler();
    let cmd = VerifyPaymentCommand {
        user_id: user.user_id,
        razorpay_order_id: request.razorpay_order_id,
        razorpay_payment_id: request.razorpay_payment_id,
        razorpay_signature: request.razorpay_signature,
    };

    let result = handler.handle(cmd).await?;

    let response = VerifyPaymentResponse {
        payment_status: result.payment_status.to_string(),
        subscription_created: result.subscription_created,
        tier: result.tier,
    };

    Ok(Json(response))
}

/// POST /api/webhooks/razorpay - Handle Razorpay webhook events
///
/// No user auth; deliveries are authenticated by signature.
pub async fn handle_razorpay_webhook(
    State(state): State<BillingAppState>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get("X-Razorpay-Signature")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let delivery_id = headers
        .get("X-Razorpay-Event-Id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let handler = state.webhook_handler();
    let cmd = ProcessWebhookCommand {
        payload: body.to_vec(),
        signature,
        delivery_id,
    };

    let result = handler.handle(cmd).await?;

    let response = WebhookAckResponse {
        status: match result {
            WebhookResult::Processed => "ok",
            WebhookResult::AlreadyProcessed => "already_processed",
        },
    };

    Ok(Json(response))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts billing errors to HTTP responses.
pub struct BillingApiError(BillingError);

impl From<BillingError> for BillingApiError {
    fn from(err: BillingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            BillingError::PlanNotFound { .. }
            | BillingError::SubscriptionNotFound { .. }
            | BillingError::PaymentRecordNotFound { .. }
            | BillingError::ProfileNotFound { .. } => StatusCode::NOT_FOUND,
            BillingError::SubscriptionExists { .. } | BillingError::InvalidState { .. } => {
                StatusCode::CONFLICT
            }
            BillingError::InvalidSignature | BillingError::ValidationFailed { .. } => {
                StatusCode::BAD_REQUEST
            }
            BillingError::GatewayFailed { .. } => StatusCode::BAD_GATEWAY,
            BillingError::Infrastructure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse::new(self.0.code().to_string(), self.0.message());
        (status, Json(body)).into_response()
    }
}

/// API error type for the webhook endpoint.
///
/// Status codes matter here: the gateway retries 5xx responses and
/// drops the delivery on 4xx.
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let error_code = match &self.0 {
            WebhookError::MissingSignature => "MISSING_SIGNATURE",
            WebhookError::InvalidSignature => "INVALID_SIGNATURE",
            WebhookError::ParseError(_) => "INVALID_PAYLOAD",
            WebhookError::MissingField(_) => "MISSING_FIELD",
            WebhookError::InvalidTransition(_) => "INVALID_STATE_TRANSITION",
            WebhookError::Ignored(_) => "EVENT_IGNORED",
            WebhookError::Database(_) => "INTERNAL_ERROR",
        };

        let body = ErrorResponse::new(error_code, self.0.to_string());
        (status, Json(body)).into_response()
    }
}
