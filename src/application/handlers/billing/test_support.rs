//! In-memory port implementations shared by the billing handler tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::billing::{PaymentRecord, PlanTier, UsageResource, UserSubscription};
use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, UserId};
use crate::ports::{
    CreateOrderRequest, CreateSubscriptionRequest, GatewayError, GatewayOrder, GatewayPayment,
    GatewaySubscription, PaymentGateway, PaymentRepository, ProfileRepository, SaveResult,
    SubscriptionRepository, UsageTracker, WebhookEventRecord, WebhookEventRepository,
};

// ══════════════════════════════════════════════════════════════
// Subscriptions
// ══════════════════════════════════════════════════════════════

pub struct MockSubscriptionRepository {
    rows: Mutex<Vec<UserSubscription>>,
}

impl MockSubscriptionRepository {
    pub fn empty() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
        }
    }

    pub fn with_subscription(subscription: UserSubscription) -> Self {
        Self {
            rows: Mutex::new(vec![subscription]),
        }
    }

    /// Returns the row with the given gateway subscription id.
    pub fn by_gateway_id(&self, gateway_subscription_id: &str) -> Option<UserSubscription> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.gateway_subscription_id.as_deref() == Some(gateway_subscription_id))
            .cloned()
    }

    /// Returns all rows for assertions.
    pub fn all(&self) -> Vec<UserSubscription> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubscriptionRepository for MockSubscriptionRepository {
    async fn insert(&self, subscription: &UserSubscription) -> Result<(), DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let conflict = rows
            .iter()
            .any(|s| s.user_id == subscription.user_id && s.is_current());
        if conflict && subscription.is_current() {
            return Err(DomainError::new(
                ErrorCode::SubscriptionExists,
                "user already has a current subscription",
            )
            .with_detail("user_id", subscription.user_id.as_str()));
        }
        rows.push(subscription.clone());
        Ok(())
    }

    async fn update(&self, subscription: &UserSubscription) -> Result<(), DomainError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|s| s.id == subscription.id) {
            *row = subscription.clone();
        }
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<UserSubscription>, DomainError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|s| &s.id == id)
            .cloned())
    }

    async fn find_current_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserSubscription>, DomainError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|s| &s.user_id == user_id && s.is_current())
            .cloned())
    }

    async fn find_by_gateway_subscription_id(
        &self,
        gateway_subscription_id: &str,
    ) -> Result<Option<UserSubscription>, DomainError> {
        Ok(self.by_gateway_id(gateway_subscription_id))
    }
}

// ══════════════════════════════════════════════════════════════
// Payments
// ══════════════════════════════════════════════════════════════

pub struct MockPaymentRepository {
    rows: Mutex<Vec<PaymentRecord>>,
}

impl MockPaymentRepository {
    pub fn empty() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
        }
    }

    pub fn with_record(record: PaymentRecord) -> Self {
        Self {
            rows: Mutex::new(vec![record]),
        }
    }

    pub fn by_order_id(&self, gateway_order_id: &str) -> Option<PaymentRecord> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.gateway_order_id.as_deref() == Some(gateway_order_id))
            .cloned()
    }

    pub fn all(&self) -> Vec<PaymentRecord> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentRepository for MockPaymentRepository {
    async fn insert(&self, record: &PaymentRecord) -> Result<(), DomainError> {
        self.rows.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn update(&self, record: &PaymentRecord) -> Result<(), DomainError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|r| r.id == record.id) {
            *row = record.clone();
        }
        Ok(())
    }

    async fn find_by_gateway_payment_id(
        &self,
        gateway_payment_id: &str,
    ) -> Result<Option<PaymentRecord>, DomainError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.gateway_payment_id.as_deref() == Some(gateway_payment_id))
            .cloned())
    }

    async fn find_by_gateway_order_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<PaymentRecord>, DomainError> {
        Ok(self.by_order_id(gateway_order_id))
    }
}

// ══════════════════════════════════════════════════════════════
// Webhook event log
// ══════════════════════════════════════════════════════════════

pub struct MockWebhookEventRepository {
    rows: Mutex<HashMap<String, WebhookEventRecord>>,
}

impl MockWebhookEventRepository {
    pub fn empty() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_record(record: WebhookEventRecord) -> Self {
        let mut rows = HashMap::new();
        rows.insert(record.event_id.clone(), record);
        Self {
            rows: Mutex::new(rows),
        }
    }

    pub fn get(&self, event_id: &str) -> Option<WebhookEventRecord> {
        self.rows.lock().unwrap().get(event_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl WebhookEventRepository for MockWebhookEventRepository {
    async fn insert(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&record.event_id) {
            Ok(SaveResult::AlreadyExists)
        } else {
            rows.insert(record.event_id.clone(), record);
            Ok(SaveResult::Inserted)
        }
    }

    async fn mark_processed(
        &self,
        event_id: &str,
        error_message: Option<&str>,
    ) -> Result<(), DomainError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(record) = rows.get_mut(event_id) {
            record.processed = true;
            record.processed_at = Some(Utc::now());
            record.error_message = error_message.map(String::from);
        }
        Ok(())
    }

    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError> {
        Ok(self.rows.lock().unwrap().get(event_id).cloned())
    }
}

// ══════════════════════════════════════════════════════════════
// Profiles
// ══════════════════════════════════════════════════════════════

pub struct MockProfileRepository {
    tiers: Mutex<HashMap<String, PlanTier>>,
    writes: Mutex<u32>,
}

impl MockProfileRepository {
    pub fn new() -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self {
            tiers: Mutex::new(HashMap::new()),
            writes: Mutex::new(0),
        })
    }

    pub fn tier_for(&self, user_id: &str) -> Option<PlanTier> {
        self.tiers.lock().unwrap().get(user_id).copied()
    }

    pub fn write_count(&self) -> u32 {
        *self.writes.lock().unwrap()
    }
}

#[async_trait]
impl ProfileRepository for MockProfileRepository {
    async fn set_subscription_tier(
        &self,
        user_id: &UserId,
        tier: PlanTier,
    ) -> Result<(), DomainError> {
        self.tiers
            .lock()
            .unwrap()
            .insert(user_id.as_str().to_string(), tier);
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }

    async fn find_tier(&self, user_id: &UserId) -> Result<Option<PlanTier>, DomainError> {
        Ok(self.tiers.lock().unwrap().get(user_id.as_str()).copied())
    }
}

// ══════════════════════════════════════════════════════════════
// Usage
// ══════════════════════════════════════════════════════════════

pub struct MockUsageTracker {
    usage: Mutex<HashMap<(String, &'static str), i64>>,
}

impl MockUsageTracker {
    pub fn empty() -> Self {
        Self {
            usage: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_usage(user_id: &str, resource: UsageResource, amount: i64) -> Self {
        let tracker = Self::empty();
        tracker
            .usage
            .lock()
            .unwrap()
            .insert((user_id.to_string(), resource.as_str()), amount);
        tracker
    }
}

#[async_trait]
impl UsageTracker for MockUsageTracker {
    async fn recorded_usage(
        &self,
        user_id: &UserId,
        resource: UsageResource,
    ) -> Result<i64, DomainError> {
        Ok(self
            .usage
            .lock()
            .unwrap()
            .get(&(user_id.as_str().to_string(), resource.as_str()))
            .copied()
            .unwrap_or(0))
    }
}

// ══════════════════════════════════════════════════════════════
// Gateway
// ══════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct MockPaymentGateway {
    pub fail_calls: bool,
    payment: Option<GatewayPayment>,
    order_calls: Mutex<Vec<CreateOrderRequest>>,
    subscription_calls: Mutex<Vec<CreateSubscriptionRequest>>,
}

impl MockPaymentGateway {
    pub fn healthy() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_calls: true,
            ..Self::default()
        }
    }

    pub fn with_payment(payment: GatewayPayment) -> Self {
        Self {
            payment: Some(payment),
            ..Self::default()
        }
    }

    pub fn order_calls(&self) -> usize {
        self.order_calls.lock().unwrap().len()
    }

    pub fn subscription_calls(&self) -> usize {
        self.subscription_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<GatewayOrder, GatewayError> {
        if self.fail_calls {
            return Err(GatewayError::Rejected {
                status: 503,
                message: "gateway unavailable".to_string(),
            });
        }
        let order = GatewayOrder {
            id: "order_mock1".to_string(),
            amount: request.amount,
            currency: request.currency.clone(),
            receipt: Some(request.receipt.clone()),
            status: Some("created".to_string()),
        };
        self.order_calls.lock().unwrap().push(request);
        Ok(order)
    }

    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<GatewaySubscription, GatewayError> {
        if self.fail_calls {
            return Err(GatewayError::Rejected {
                status: 503,
                message: "gateway unavailable".to_string(),
            });
        }
        let subscription = GatewaySubscription {
            id: "sub_mock1".to_string(),
            plan_id: request.plan_id.clone(),
            status: Some("created".to_string()),
            short_url: Some("https://rzp.io/i/mock".to_string()),
        };
        self.subscription_calls.lock().unwrap().push(request);
        Ok(subscription)
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        if self.fail_calls {
            return Err(GatewayError::Unreachable("connection refused".to_string()));
        }
        self.payment
            .clone()
            .ok_or_else(|| GatewayError::Rejected {
                status: 404,
                message: format!("payment {} not found", payment_id),
            })
    }
}
