//! Payment models and data structures
//!
//! The core does not own payment invariants; it records payments against
//! bookings and exposes the completed/refunded sums for balance display.

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

/// Payment status
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

/// Payment method
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    BankTransfer,
    Cash,
    Paypal,
    Other,
}

/// Payment type
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "payment_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Deposit,
    FullPayment,
    PartialPayment,
    Refund,
}

/// Payment model
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    /// Amount in minor units (cents)
    pub amount: i64,
    pub method: PaymentMethod,
    pub payment_type: PaymentType,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub payment_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for recording a payment
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    pub booking_id: Uuid,
    #[validate(range(min = 1))]
    pub amount: i64,
    pub method: PaymentMethod,
    pub payment_type: PaymentType,
    pub status: Option<PaymentStatus>,
    pub transaction_id: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Partial-field update DTO for a payment record
#[derive(Debug, Default, Clone, Deserialize, Validate)]
pub struct UpdatePaymentRequest {
    #[validate(range(min = 1))]
    pub amount: Option<i64>,
    pub method: Option<PaymentMethod>,
    pub payment_type: Option<PaymentType>,
    pub status: Option<PaymentStatus>,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
}

/// Store-level patch
#[derive(Debug, Default, Clone)]
pub struct PaymentPatch {
    pub amount: Option<i64>,
    pub method: Option<PaymentMethod>,
    pub payment_type: Option<PaymentType>,
    pub status: Option<PaymentStatus>,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
}

/// Typed query predicates for listing payments
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PaymentFilter {
    pub status: Option<PaymentStatus>,
    pub booking_id: Option<Uuid>,
    pub payment_type: Option<PaymentType>,
}

/// Derived balance view for a booking
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct PaymentSummary {
    pub total_paid: i64,
    pub total_refunded: i64,
    pub balance: i64,
}

impl Payment {
    /// Apply a patch, refreshing the update timestamp
    pub fn apply_patch(&mut self, patch: PaymentPatch) {
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(method) = patch.method {
            self.method = method;
        }
        if let Some(payment_type) = patch.payment_type {
            self.payment_type = payment_type;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(transaction_id) = patch.transaction_id {
            self.transaction_id = Some(transaction_id);
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
        self.updated_at = Utc::now();
    }

    /// Whether the payment matches a typed filter
    pub fn matches(&self, filter: &PaymentFilter) -> bool {
        if let Some(status) = filter.status {
            if self.status != status {
                return false;
            }
        }
        if let Some(booking_id) = filter.booking_id {
            if self.booking_id != booking_id {
                return false;
            }
        }
        if let Some(payment_type) = filter.payment_type {
            if self.payment_type != payment_type {
                return false;
            }
        }
        true
    }
}
