//! Subscription status state machine.
//!
//! Defines the gateway-driven subscription lifecycle and the legal
//! transitions between its states.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a user's subscription as driven by gateway events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Local row exists but the gateway has not confirmed anything yet.
    Created,

    /// Mandate authorized; first charge not yet captured.
    Authenticated,

    /// Paid and in good standing.
    Active,

    /// Paused at the gateway; charges suspended.
    Paused,

    /// Payment failed; the gateway is retrying.
    Halted,

    /// Cancelled by the user or the gateway.
    Cancelled,

    /// All billing cycles completed. Terminal.
    Expired,
}

impl SubscriptionStatus {
    /// Returns true if this row counts as the user's current
    /// subscription.
    ///
    /// Halted is included: the gateway is still retrying the charge,
    /// so the subscription has not ended.
    pub fn is_current(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Active
                | SubscriptionStatus::Authenticated
                | SubscriptionStatus::Halted
        )
    }

    /// Returns true if this status grants the plan's paid tier.
    ///
    /// Halted does not: access drops to free while payment is failing.
    pub fn grants_paid_tier(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Active | SubscriptionStatus::Authenticated
        )
    }
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, target),
            // From CREATED
            (Created, Authenticated)
                | (Created, Active)
                | (Created, Halted)
                | (Created, Cancelled)
            // From AUTHENTICATED
                | (Authenticated, Authenticated) // Redelivery
                | (Authenticated, Active)
                | (Authenticated, Halted)
                | (Authenticated, Cancelled)
            // From ACTIVE
                | (Active, Active) // Renewal / redelivery
                | (Active, Paused)
                | (Active, Halted)
                | (Active, Cancelled)
                | (Active, Expired)
            // From PAUSED
                | (Paused, Paused) // Redelivery
                | (Paused, Active)
                | (Paused, Halted)
                | (Paused, Cancelled)
            // From HALTED
                | (Halted, Halted) // Repeated failures
                | (Halted, Active)
                | (Halted, Cancelled)
                | (Halted, Expired)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            Created => vec![Authenticated, Active, Halted, Cancelled],
            Authenticated => vec![Authenticated, Active, Halted, Cancelled],
            Active => vec![Active, Paused, Halted, Cancelled, Expired],
            Paused => vec![Paused, Active, Halted, Cancelled],
            Halted => vec![Halted, Active, Cancelled, Expired],
            Cancelled => vec![],
            Expired => vec![],
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubscriptionStatus::Created => "created",
            SubscriptionStatus::Authenticated => "authenticated",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Halted => "halted",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Expired => "expired",
        };
        write!(f, "{}", s)
    }
}
