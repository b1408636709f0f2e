//! Generic state machine trait for status enums.

use super::errors::ValidationError;

/// Trait for types whose values form a finite state machine.
///
/// Implementors define the legal transitions; `transition_to` rejects
/// everything else with a `ValidationError`, so callers never overwrite
/// a status with an illegal successor.
pub trait StateMachine: Sized + Clone + PartialEq + std::fmt::Debug {
    /// Returns the states reachable from `self`.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Returns true if a transition from `self` to `target` is legal.
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Attempts the transition, returning the new state.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidFormat` when the transition is
    /// not in `valid_transitions`.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Returns true if no transitions leave this state.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum OrderState {
        Pending,
        Paid,
        Refunded,
    }

    impl StateMachine for OrderState {
        fn valid_transitions(&self) -> Vec<Self> {
            match self {
                OrderState::Pending => vec![OrderState::Paid],
                OrderState::Paid => vec![OrderState::Refunded],
                OrderState::Refunded => vec![],
            }
        }
    }

    #[test]
    fn allows_defined_transition() {
        let next = OrderState::Pending.transition_to(OrderState::Paid).unwrap();
        assert_eq!(next, OrderState::Paid);
    }

    #[test]
    fn rejects_undefined_transition() {
        let result = OrderState::Pending.transition_to(OrderState::Refunded);
        assert!(result.is_err());
    }

    #[test]
    fn terminal_state_has_no_transitions() {
        assert!(OrderState::Refunded.is_terminal());
        assert!(!OrderState::Pending.is_terminal());
    }

    #[test]
    fn can_transition_to_matches_valid_transitions() {
        assert!(OrderState::Paid.can_transition_to(&OrderState::Refunded));
        assert!(!OrderState::Refunded.can_transition_to(&OrderState::Pending));
    }
}
