//! PostgreSQL implementation of PaymentRepository.

use crate::domain::billing::{BillingCycle, PaymentRecord, PaymentStatus};
use crate::domain::foundation::{DomainError, ErrorCode, PaymentRecordId, Timestamp, UserId};
use crate::ports::PaymentRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the PaymentRepository port.
pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    user_id: String,
    plan_id: String,
    billing_cycle: String,
    gateway_order_id: Option<String>,
    gateway_payment_id: Option<String>,
    amount: i64,
    currency: String,
    status: String,
    method: Option<String>,
    error_description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for PaymentRecord {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(PaymentRecord {
            id: PaymentRecordId::from_uuid(row.id),
            user_id: UserId::new(row.user_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
            })?,
            plan_id: row.plan_id,
            billing_cycle: parse_cycle(&row.billing_cycle)?,
            gateway_order_id: row.gateway_order_id,
            gateway_payment_id: row.gateway_payment_id,
            amount: row.amount,
            currency: row.currency,
            status: parse_status(&row.status)?,
            method: row.method,
            error_description: row.error_description,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_status(s: &str) -> Result<PaymentStatus, DomainError> {
    match s {
        "created" => Ok(PaymentStatus::Created),
        "authorized" => Ok(PaymentStatus::Authorized),
        "captured" => Ok(PaymentStatus::Captured),
        "failed" => Ok(PaymentStatus::Failed),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid payment status value: {}", s),
        )),
    }
}

fn status_to_string(status: &PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Created => "created",
        PaymentStatus::Authorized => "authorized",
        PaymentStatus::Captured => "captured",
        PaymentStatus::Failed => "failed",
    }
}

fn parse_cycle(s: &str) -> Result<BillingCycle, DomainError> {
    match s {
        "monthly" => Ok(BillingCycle::Monthly),
        "yearly" => Ok(BillingCycle::Yearly),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid billing_cycle value: {}", s),
        )),
    }
}

fn cycle_to_string(cycle: &BillingCycle) -> &'static str {
    match cycle {
        BillingCycle::Monthly => "monthly",
        BillingCycle::Yearly => "yearly",
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, plan_id, billing_cycle, gateway_order_id, gateway_payment_id,
           amount, currency, status, method, error_description, created_at, updated_at
    FROM payment_records
"#;

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn insert(&self, record: &PaymentRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payment_records (
                id, user_id, plan_id, billing_cycle, gateway_order_id, gateway_payment_id,
                amount, currency, status, method, error_description, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.user_id.as_str())
        .bind(&record.plan_id)
        .bind(cycle_to_string(&record.billing_cycle))
        .bind(&record.gateway_order_id)
        .bind(&record.gateway_payment_id)
        .bind(record.amount)
        .bind(&record.currency)
        .bind(status_to_string(&record.status))
        .bind(&record.method)
        .bind(&record.error_description)
        .bind(record.created_at.as_datetime())
        .bind(record.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert payment record: {}", e),
            )
        })?;

        Ok(())
    }

    async fn update(&self, record: &PaymentRecord) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payment_records SET
                gateway_order_id = $2,
                gateway_payment_id = $3,
                status = $4,
                method = $5,
                error_description = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.gateway_order_id)
        .bind(&record.gateway_payment_id)
        .bind(status_to_string(&record.status))
        .bind(&record.method)
        .bind(&record.error_description)
        .bind(record.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update payment record: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::PaymentNotFound,
                "Payment record not found",
            ));
        }

        Ok(())
    }

    async fn find_by_gateway_payment_id(
        &self,
        gateway_payment_id: &str,
    ) -> Result<Option<PaymentRecord>, DomainError> {
        let row: Option<PaymentRow> =
            sqlx::query_as(&format!("{} WHERE gateway_payment_id = $1", SELECT_COLUMNS))
                .bind(gateway_payment_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to find payment record: {}", e),
                    )
                })?;

        row.map(PaymentRecord::try_from).transpose()
    }

    async fn find_by_gateway_order_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<PaymentRecord>, DomainError> {
        let row: Option<PaymentRow> =
            sqlx::query_as(&format!("{} WHERE gateway_order_id = $1", SELECT_COLUMNS))
                .bind(gateway_order_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to find payment record: {}", e),
                    )
                })?;

        row.map(PaymentRecord::try_from).transpose()
    }
}
