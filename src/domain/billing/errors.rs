//! Billing operation errors.

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};
use std::fmt;

/// Errors surfaced by billing commands and queries.
#[derive(Debug, Clone, PartialEq)]
pub enum BillingError {
    /// The requested plan slug is not in the catalog.
    PlanNotFound { plan_id: String },

    /// The user has no current subscription.
    SubscriptionNotFound { user_id: String },

    /// No payment record matches the gateway order id.
    PaymentRecordNotFound { gateway_order_id: String },

    /// The user's profile row is missing.
    ProfileNotFound { user_id: String },

    /// The user already has a current subscription.
    SubscriptionExists { user_id: String },

    /// The checkout callback signature did not verify.
    InvalidSignature,

    /// The payment gateway rejected or failed a call.
    GatewayFailed { reason: String },

    /// A status transition the state machine forbids.
    InvalidState { reason: String },

    /// Request input failed validation.
    ValidationFailed { field: String, reason: String },

    /// Database or other infrastructure failure.
    Infrastructure { reason: String },
}

impl BillingError {
    pub fn plan_not_found(plan_id: impl Into<String>) -> Self {
        BillingError::PlanNotFound {
            plan_id: plan_id.into(),
        }
    }

    pub fn subscription_not_found(user_id: impl Into<String>) -> Self {
        BillingError::SubscriptionNotFound {
            user_id: user_id.into(),
        }
    }

    pub fn payment_record_not_found(gateway_order_id: impl Into<String>) -> Self {
        BillingError::PaymentRecordNotFound {
            gateway_order_id: gateway_order_id.into(),
        }
    }

    pub fn profile_not_found(user_id: impl Into<String>) -> Self {
        BillingError::ProfileNotFound {
            user_id: user_id.into(),
        }
    }

    pub fn subscription_exists(user_id: impl Into<String>) -> Self {
        BillingError::SubscriptionExists {
            user_id: user_id.into(),
        }
    }

    pub fn gateway_failed(reason: impl Into<String>) -> Self {
        BillingError::GatewayFailed {
            reason: reason.into(),
        }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        BillingError::InvalidState {
            reason: reason.into(),
        }
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        BillingError::ValidationFailed {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn infrastructure(reason: impl Into<String>) -> Self {
        BillingError::Infrastructure {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            BillingError::PlanNotFound { .. } => ErrorCode::PlanNotFound,
            BillingError::SubscriptionNotFound { .. } => ErrorCode::SubscriptionNotFound,
            BillingError::PaymentRecordNotFound { .. } => ErrorCode::PaymentNotFound,
            BillingError::ProfileNotFound { .. } => ErrorCode::ProfileNotFound,
            BillingError::SubscriptionExists { .. } => ErrorCode::SubscriptionExists,
            BillingError::InvalidSignature => ErrorCode::InvalidSignature,
            BillingError::GatewayFailed { .. } => ErrorCode::GatewayError,
            BillingError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            BillingError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            BillingError::Infrastructure { .. } => ErrorCode::DatabaseError,
        }
    }

    /// Human-readable message safe to return to clients.
    pub fn message(&self) -> String {
        match self {
            BillingError::PlanNotFound { plan_id } => {
                format!("Plan '{}' does not exist", plan_id)
            }
            BillingError::SubscriptionNotFound { user_id } => {
                format!("No current subscription for user {}", user_id)
            }
            BillingError::PaymentRecordNotFound { gateway_order_id } => {
                format!("No payment record for order {}", gateway_order_id)
            }
            BillingError::ProfileNotFound { user_id } => {
                format!("No profile for user {}", user_id)
            }
            BillingError::SubscriptionExists { user_id } => {
                format!("User {} already has a current subscription", user_id)
            }
            BillingError::InvalidSignature => "Payment signature verification failed".to_string(),
            BillingError::GatewayFailed { reason } => {
                format!("Payment gateway error: {}", reason)
            }
            BillingError::InvalidState { reason } => {
                format!("Invalid subscription state: {}", reason)
            }
            BillingError::ValidationFailed { field, reason } => {
                format!("Invalid {}: {}", field, reason)
            }
            BillingError::Infrastructure { reason } => {
                format!("Internal error: {}", reason)
            }
        }
    }

    /// Returns true if retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BillingError::GatewayFailed { .. } | BillingError::Infrastructure { .. }
        )
    }
}

impl fmt::Display for BillingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for BillingError {}

impl From<ValidationError> for BillingError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyField { field } => {
                BillingError::validation(field, "cannot be empty")
            }
            ValidationError::OutOfRange {
                field,
                min,
                max,
                actual,
            } => BillingError::validation(
                field,
                format!("must be between {} and {}, got {}", min, max, actual),
            ),
            ValidationError::InvalidFormat { field, reason } => {
                BillingError::validation(field, reason)
            }
        }
    }
}

impl From<DomainError> for BillingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::PlanNotFound => BillingError::plan_not_found(
                err.details.get("plan_id").cloned().unwrap_or_default(),
            ),
            ErrorCode::SubscriptionNotFound => BillingError::subscription_not_found(
                err.details.get("user_id").cloned().unwrap_or_default(),
            ),
            ErrorCode::SubscriptionExists => BillingError::subscription_exists(
                err.details.get("user_id").cloned().unwrap_or_default(),
            ),
            ErrorCode::DatabaseError => BillingError::infrastructure(err.message),
            _ => BillingError::infrastructure(err.message),
        }
    }
}

impl From<BillingError> for DomainError {
    fn from(err: BillingError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
