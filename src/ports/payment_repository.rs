//! PaymentRepository port - persistence for payment records.

use async_trait::async_trait;

use crate::domain::billing::PaymentRecord;
use crate::domain::foundation::DomainError;

/// Port for storing and querying payment records.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Insert a new payment record.
    async fn insert(&self, record: &PaymentRecord) -> Result<(), DomainError>;

    /// Update an existing record in place.
    async fn update(&self, record: &PaymentRecord) -> Result<(), DomainError>;

    /// Find by the gateway's payment id (`pay_...`).
    async fn find_by_gateway_payment_id(
        &self,
        gateway_payment_id: &str,
    ) -> Result<Option<PaymentRecord>, DomainError>;

    /// Find by the gateway's order id (`order_...`).
    async fn find_by_gateway_order_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<PaymentRecord>, DomainError>;
}
