//! Gateway webhook event envelope and typed payload entities.
//!
//! The gateway posts `{entity, account_id, event, created_at, payload}`
//! where `payload` nests each object under `<name>.entity`. Only the
//! fields the dispatcher reads are typed; the rest stay in the raw
//! JSON value that is persisted to the event log.

use super::webhook_errors::WebhookError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The event names the dispatcher routes on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEventType {
    PaymentAuthorized,
    PaymentCaptured,
    PaymentFailed,
    SubscriptionAuthenticated,
    SubscriptionActivated,
    SubscriptionCharged,
    SubscriptionCompleted,
    SubscriptionCancelled,
    SubscriptionPaused,
    SubscriptionResumed,
    SubscriptionHalted,
    /// Anything else; acknowledged without processing.
    Unknown(String),
}

impl GatewayEventType {
    pub fn parse(event: &str) -> Self {
        match event {
            "payment.authorized" => GatewayEventType::PaymentAuthorized,
            "payment.captured" => GatewayEventType::PaymentCaptured,
            "payment.failed" => GatewayEventType::PaymentFailed,
            "subscription.authenticated" => GatewayEventType::SubscriptionAuthenticated,
            "subscription.activated" => GatewayEventType::SubscriptionActivated,
            "subscription.charged" => GatewayEventType::SubscriptionCharged,
            "subscription.completed" => GatewayEventType::SubscriptionCompleted,
            "subscription.cancelled" => GatewayEventType::SubscriptionCancelled,
            "subscription.paused" => GatewayEventType::SubscriptionPaused,
            "subscription.resumed" => GatewayEventType::SubscriptionResumed,
            "subscription.halted" => GatewayEventType::SubscriptionHalted,
            other => GatewayEventType::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            GatewayEventType::PaymentAuthorized => "payment.authorized",
            GatewayEventType::PaymentCaptured => "payment.captured",
            GatewayEventType::PaymentFailed => "payment.failed",
            GatewayEventType::SubscriptionAuthenticated => "subscription.authenticated",
            GatewayEventType::SubscriptionActivated => "subscription.activated",
            GatewayEventType::SubscriptionCharged => "subscription.charged",
            GatewayEventType::SubscriptionCompleted => "subscription.completed",
            GatewayEventType::SubscriptionCancelled => "subscription.cancelled",
            GatewayEventType::SubscriptionPaused => "subscription.paused",
            GatewayEventType::SubscriptionResumed => "subscription.resumed",
            GatewayEventType::SubscriptionHalted => "subscription.halted",
            GatewayEventType::Unknown(s) => s,
        }
    }
}

impl fmt::Display for GatewayEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment object as delivered in webhook payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEntity {
    pub id: String,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    /// Gateway notes: an object for set notes, an empty array otherwise.
    #[serde(default)]
    pub notes: Value,
}

impl PaymentEntity {
    /// Reads a string note by key. The gateway sends `[]` when no
    /// notes were set, so non-object notes read as absent.
    pub fn note(&self, key: &str) -> Option<&str> {
        self.notes.get(key).and_then(Value::as_str)
    }
}

/// Subscription object as delivered in webhook payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionEntity {
    pub id: String,
    #[serde(default)]
    pub plan_id: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Epoch seconds; absent when the gateway has not set a period.
    #[serde(default)]
    pub current_start: Option<i64>,
    #[serde(default)]
    pub current_end: Option<i64>,
    #[serde(default)]
    pub ended_at: Option<i64>,
    #[serde(default)]
    pub notes: Value,
}

impl SubscriptionEntity {
    pub fn note(&self, key: &str) -> Option<&str> {
        self.notes.get(key).and_then(Value::as_str)
    }
}

/// Parsed webhook envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayEvent {
    pub event: String,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub payload: Value,
}

impl GatewayEvent {
    /// Parses the raw webhook body.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::ParseError` for malformed JSON or a
    /// missing `event` field.
    pub fn parse(body: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(body).map_err(|e| WebhookError::ParseError(e.to_string()))
    }

    /// Returns the routed event type.
    pub fn event_type(&self) -> GatewayEventType {
        GatewayEventType::parse(&self.event)
    }

    /// Extracts the nested payment entity (`payload.payment.entity`).
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::MissingField` when the entity is absent
    /// or does not deserialize.
    pub fn payment(&self) -> Result<PaymentEntity, WebhookError> {
        self.entity("payment")
    }

    /// Extracts the nested subscription entity
    /// (`payload.subscription.entity`).
    pub fn subscription(&self) -> Result<SubscriptionEntity, WebhookError> {
        self.entity("subscription")
    }

    fn entity<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<T, WebhookError> {
        let value = self
            .payload
            .get(name)
            .and_then(|v| v.get("entity"))
            .ok_or_else(|| WebhookError::MissingField(format!("payload.{}.entity", name)))?;
        serde_json::from_value(value.clone())
            .map_err(|e| WebhookError::MissingField(format!("payload.{}.entity: {}", name, e)))
    }
}

#[cfg(test)]
pub mod fixtures {
    use serde_json::{json, Value};

    /// Builds a webhook body with the given event name and payload
    /// entities.
    pub fn event_body(event: &str, payload: Value) -> Vec<u8> {
        json!({
            "entity": "event",
            "account_id": "acc_test",
            "event": event,
            "created_at": 1_700_000_000,
            "payload": payload,
        })
        .to_string()
        .into_bytes()
    }

    pub fn payment_entity(id: &str, notes: Value) -> Value {
        json!({
            "entity": {
                "id": id,
                "entity": "payment",
                "order_id": "order_test",
                "amount": 99900,
                "currency": "INR",
                "status": "captured",
                "method": "card",
                "notes": notes,
            }
        })
    }

    pub fn subscription_entity(id: &str, status: &str) -> Value {
        json!({
            "entity": {
                "id": id,
                "entity": "subscription",
                "plan_id": "plan_test",
                "customer_id": "cust_test",
                "status": status,
                "current_start": 1_700_000_000,
                "current_end": 1_702_592_000,
                "notes": { "userId": "user-1" },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_known_event_names() {
        assert_eq!(
            GatewayEventType::parse("payment.captured"),
            GatewayEventType::PaymentCaptured
        );
        assert_eq!(
            GatewayEventType::parse("subscription.halted"),
            GatewayEventType::SubscriptionHalted
        );
    }

    #[test]
    fn unknown_event_name_is_preserved() {
        let ty = GatewayEventType::parse("refund.created");
        assert_eq!(ty, GatewayEventType::Unknown("refund.created".to_string()));
        assert_eq!(ty.as_str(), "refund.created");
    }

    #[test]
    fn parses_envelope_and_payment_entity() {
        let body = fixtures::event_body(
            "payment.captured",
            json!({ "payment": fixtures::payment_entity("pay_1", json!({"userId": "user-1"})) }),
        );

        let event = GatewayEvent::parse(&body).unwrap();
        assert_eq!(event.event_type(), GatewayEventType::PaymentCaptured);
        assert_eq!(event.account_id.as_deref(), Some("acc_test"));

        let payment = event.payment().unwrap();
        assert_eq!(payment.id, "pay_1");
        assert_eq!(payment.order_id.as_deref(), Some("order_test"));
        assert_eq!(payment.note("userId"), Some("user-1"));
    }

    #[test]
    fn parses_subscription_entity_with_period() {
        let body = fixtures::event_body(
            "subscription.activated",
            json!({ "subscription": fixtures::subscription_entity("sub_1", "active") }),
        );

        let event = GatewayEvent::parse(&body).unwrap();
        let sub = event.subscription().unwrap();
        assert_eq!(sub.id, "sub_1");
        assert_eq!(sub.current_start, Some(1_700_000_000));
        assert_eq!(sub.note("userId"), Some("user-1"));
    }

    #[test]
    fn empty_array_notes_read_as_absent() {
        let body = fixtures::event_body(
            "payment.captured",
            json!({ "payment": fixtures::payment_entity("pay_1", json!([])) }),
        );

        let event = GatewayEvent::parse(&body).unwrap();
        let payment = event.payment().unwrap();
        assert_eq!(payment.note("userId"), None);
    }

    #[test]
    fn missing_entity_is_a_missing_field_error() {
        let body = fixtures::event_body("payment.captured", json!({}));
        let event = GatewayEvent::parse(&body).unwrap();
        assert!(matches!(event.payment(), Err(WebhookError::MissingField(_))));
    }

    #[test]
    fn malformed_body_is_a_parse_error() {
        assert!(matches!(
            GatewayEvent::parse(b"not json"),
            Err(WebhookError::ParseError(_))
        ));
    }
}
