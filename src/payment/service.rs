//! Payment service
//!
//! Thin layer over the store: records payments against bookings and derives
//! the balance view. The only lifecycle coupling is the guard against
//! paying a cancelled booking.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::booking::model::BookingStatus;
use crate::error::{BookingError, BookingResult};
use crate::payment::model::{
    Payment, PaymentFilter, PaymentPatch, PaymentStatus, PaymentSummary, RecordPaymentRequest,
    UpdatePaymentRequest,
};
use crate::store::BookingStore;

#[derive(Clone)]
pub struct PaymentService {
    store: Arc<dyn BookingStore>,
}

impl PaymentService {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// Record a payment against a booking
    pub async fn record(&self, request: RecordPaymentRequest) -> BookingResult<Payment> {
        request.validate()?;

        let booking = self
            .store
            .find_booking(request.booking_id)
            .await?
            .ok_or_else(|| BookingError::NotFound("Booking not found".to_string()))?;

        if booking.status == BookingStatus::Cancelled {
            return Err(BookingError::InvalidState(
                "Cannot add payment to cancelled booking".to_string(),
            ));
        }

        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4(),
            booking_id: request.booking_id,
            amount: request.amount,
            method: request.method,
            payment_type: request.payment_type,
            status: request.status.unwrap_or(PaymentStatus::Pending),
            transaction_id: request.transaction_id,
            payment_date: request.payment_date.unwrap_or(now),
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };

        let created = self.store.insert_payment(payment).await?;
        tracing::info!(
            payment_id = %created.id,
            booking_id = %created.booking_id,
            amount = created.amount,
            "Payment recorded"
        );
        Ok(created)
    }

    /// Update payment fields; omitted fields retain prior values
    pub async fn update(&self, id: Uuid, request: UpdatePaymentRequest) -> BookingResult<Payment> {
        request.validate()?;

        self.get(id).await?;

        let patch = PaymentPatch {
            amount: request.amount,
            method: request.method,
            payment_type: request.payment_type,
            status: request.status,
            transaction_id: request.transaction_id,
            notes: request.notes,
        };
        self.store.update_payment(id, patch).await
    }

    /// Fetch a payment by id
    pub async fn get(&self, id: Uuid) -> BookingResult<Payment> {
        self.store
            .find_payment(id)
            .await?
            .ok_or_else(|| BookingError::NotFound("Payment not found".to_string()))
    }

    /// List payments matching the typed filter, newest payment date first
    pub async fn list(&self, filter: &PaymentFilter) -> BookingResult<Vec<Payment>> {
        self.store.list_payments(filter).await
    }

    /// Payments recorded against one booking
    pub async fn for_booking(&self, booking_id: Uuid) -> BookingResult<Vec<Payment>> {
        self.require_booking(booking_id).await?;
        self.store.payments_for_booking(booking_id).await
    }

    /// Balance view: completed sums count as paid, refunded sums flow back.
    ///
    /// balance = booking.total_amount - total_paid + total_refunded
    pub async fn summarize(&self, booking_id: Uuid) -> BookingResult<PaymentSummary> {
        let booking = self.require_booking(booking_id).await?;
        let payments = self.store.payments_for_booking(booking_id).await?;

        let total_paid: i64 = payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Completed)
            .map(|p| p.amount)
            .sum();
        let total_refunded: i64 = payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Refunded)
            .map(|p| p.amount)
            .sum();

        Ok(PaymentSummary {
            total_paid,
            total_refunded,
            balance: booking.total_amount - total_paid + total_refunded,
        })
    }

    async fn require_booking(&self, booking_id: Uuid) -> BookingResult<crate::booking::Booking> {
        self.store
            .find_booking(booking_id)
            .await?
            .ok_or_else(|| BookingError::NotFound("Booking not found".to_string()))
    }
}
