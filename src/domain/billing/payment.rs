//! Payment records and their status state machine.

use super::plan::BillingCycle;
use crate::domain::foundation::{PaymentRecordId, StateMachine, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a single payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Order created locally; no gateway outcome yet.
    Created,

    /// Funds reserved on the customer's instrument, not yet captured.
    Authorized,

    /// Funds captured. Terminal apart from redelivery.
    Captured,

    /// Payment failed at the gateway. Terminal.
    Failed,
}

impl StateMachine for PaymentStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use PaymentStatus::*;
        match self {
            Created => vec![Authorized, Captured, Failed],
            Authorized => vec![Authorized, Captured, Failed],
            Captured => vec![Captured],
            Failed => vec![],
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Created => "created",
            PaymentStatus::Authorized => "authorized",
            PaymentStatus::Captured => "captured",
            PaymentStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// A payment attempt tracked against gateway order and payment ids.
///
/// A row is written when an order is created and updated as the
/// gateway reports the outcome, either via webhook or via the
/// synchronous verify flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentRecordId,
    pub user_id: UserId,
    /// Plan catalog slug the payment is for; the verify flow reads it
    /// back when creating the subscription.
    pub plan_id: String,
    pub billing_cycle: BillingCycle,
    /// Gateway order id (`order_...`). Set at order creation.
    pub gateway_order_id: Option<String>,
    /// Gateway payment id (`pay_...`). Set once the gateway reports one.
    pub gateway_payment_id: Option<String>,
    /// Amount in the currency's smallest unit (paise for INR).
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
    /// Payment method reported by the gateway (card, upi, netbanking).
    pub method: Option<String>,
    /// Gateway error description for failed payments.
    pub error_description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PaymentRecord {
    /// Creates a new record in `Created` status for a fresh order.
    pub fn new_for_order(
        user_id: UserId,
        plan_id: impl Into<String>,
        billing_cycle: BillingCycle,
        gateway_order_id: impl Into<String>,
        amount: i64,
        currency: impl Into<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: PaymentRecordId::new(),
            user_id,
            plan_id: plan_id.into(),
            billing_cycle,
            gateway_order_id: Some(gateway_order_id.into()),
            gateway_payment_id: None,
            amount,
            currency: currency.into(),
            status: PaymentStatus::Created,
            method: None,
            error_description: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a status transition, updating `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns the state machine's error when the transition is not
    /// legal from the current status.
    pub fn apply_status(
        &mut self,
        target: PaymentStatus,
    ) -> Result<(), crate::domain::foundation::ValidationError> {
        self.status = self.status.transition_to(target)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PaymentRecord {
        PaymentRecord::new_for_order(
            UserId::new("user-1").unwrap(),
            "pro",
            BillingCycle::Monthly,
            "order_Abc123",
            999_00,
            "INR",
        )
    }

    #[test]
    fn new_order_record_starts_created() {
        let rec = record();
        assert_eq!(rec.status, PaymentStatus::Created);
        assert_eq!(rec.gateway_order_id.as_deref(), Some("order_Abc123"));
        assert!(rec.gateway_payment_id.is_none());
    }

    #[test]
    fn created_can_capture_directly() {
        let mut rec = record();
        assert!(rec.apply_status(PaymentStatus::Captured).is_ok());
        assert_eq!(rec.status, PaymentStatus::Captured);
    }

    #[test]
    fn authorized_then_captured_is_legal() {
        let mut rec = record();
        rec.apply_status(PaymentStatus::Authorized).unwrap();
        assert!(rec.apply_status(PaymentStatus::Captured).is_ok());
    }

    #[test]
    fn captured_redelivery_is_legal() {
        let mut rec = record();
        rec.apply_status(PaymentStatus::Captured).unwrap();
        assert!(rec.apply_status(PaymentStatus::Captured).is_ok());
    }

    #[test]
    fn failed_is_terminal() {
        let mut rec = record();
        rec.apply_status(PaymentStatus::Failed).unwrap();
        assert!(rec.apply_status(PaymentStatus::Captured).is_err());
        assert!(PaymentStatus::Failed.is_terminal());
    }

    #[test]
    fn captured_cannot_fail() {
        let mut rec = record();
        rec.apply_status(PaymentStatus::Captured).unwrap();
        assert!(rec.apply_status(PaymentStatus::Failed).is_err());
    }
}
