//! The user subscription aggregate.

use super::plan::BillingCycle;
use super::status::SubscriptionStatus;
use crate::domain::foundation::{StateMachine, SubscriptionId, Timestamp, UserId, ValidationError};
use serde::{Deserialize, Serialize};

/// A user's subscription to a plan.
///
/// The local row mirrors the gateway's subscription object; webhook
/// events drive its status through the state machine and refresh the
/// billing period. Terminal rows (cancelled, expired) are kept for
/// history and excluded from "current subscription" queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSubscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    /// Plan catalog slug ("free", "pro", "enterprise").
    pub plan_id: String,
    /// Gateway subscription id (`sub_...`). Absent for rows created by
    /// the one-time verify flow.
    pub gateway_subscription_id: Option<String>,
    /// Gateway customer id (`cust_...`).
    pub gateway_customer_id: Option<String>,
    pub status: SubscriptionStatus,
    pub billing_cycle: BillingCycle,
    pub current_period_start: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub ended_at: Option<Timestamp>,
    /// Gateway notes passthrough, kept verbatim.
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserSubscription {
    /// Creates a pending row for a gateway subscription awaiting its
    /// first webhook.
    pub fn new_pending(
        user_id: UserId,
        plan_id: impl Into<String>,
        billing_cycle: BillingCycle,
        gateway_subscription_id: impl Into<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: SubscriptionId::new(),
            user_id,
            plan_id: plan_id.into(),
            gateway_subscription_id: Some(gateway_subscription_id.into()),
            gateway_customer_id: None,
            status: SubscriptionStatus::Created,
            billing_cycle,
            current_period_start: None,
            current_period_end: None,
            cancelled_at: None,
            ended_at: None,
            metadata: serde_json::Value::Null,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates an active row for a verified one-time payment.
    ///
    /// The billing period starts now and ends one calendar month or
    /// one calendar year later, by cycle.
    pub fn new_active_from_payment(
        user_id: UserId,
        plan_id: impl Into<String>,
        billing_cycle: BillingCycle,
    ) -> Self {
        let now = Timestamp::now();
        let period_end = match billing_cycle {
            BillingCycle::Monthly => now.add_months(1),
            BillingCycle::Yearly => now.add_years(1),
        };
        Self {
            id: SubscriptionId::new(),
            user_id,
            plan_id: plan_id.into(),
            gateway_subscription_id: None,
            gateway_customer_id: None,
            status: SubscriptionStatus::Active,
            billing_cycle,
            current_period_start: Some(now),
            current_period_end: Some(period_end),
            cancelled_at: None,
            ended_at: None,
            metadata: serde_json::Value::Null,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a status transition through the state machine.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` when the transition is illegal from
    /// the current status; the row is left unchanged.
    pub fn apply_status(&mut self, target: SubscriptionStatus) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(target)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Replaces the billing period. Absent bounds stay `None`.
    pub fn set_period(&mut self, start: Option<Timestamp>, end: Option<Timestamp>) {
        self.current_period_start = start;
        self.current_period_end = end;
        self.updated_at = Timestamp::now();
    }

    /// Records cancellation timestamps from the gateway payload.
    pub fn set_cancellation(&mut self, cancelled_at: Option<Timestamp>, ended_at: Option<Timestamp>) {
        self.cancelled_at = cancelled_at;
        self.ended_at = ended_at;
        self.updated_at = Timestamp::now();
    }

    /// Returns true if this row is the user's current subscription.
    pub fn is_current(&self) -> bool {
        self.status.is_current()
    }
}
