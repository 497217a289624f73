//! In-memory store
//!
//! Backs the test suites and embedders that do not need Postgres. All
//! writes go through a single `RwLock`, so the overlap re-check performed
//! inside `insert_booking` / `update_booking` happens under the same write
//! guard as the mutation: check-then-write is atomic in-process.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::accommodation::model::{Accommodation, AccommodationFilter, AccommodationPatch};
use crate::booking::availability::{ranges_conflict, TurnoverPolicy};
use crate::booking::model::{Booking, BookingFilter, BookingPatch};
use crate::error::{BookingError, BookingResult};
use crate::payment::model::{Payment, PaymentFilter, PaymentPatch};
use crate::store::BookingStore;

#[derive(Default)]
struct Inner {
    accommodations: HashMap<Uuid, Accommodation>,
    bookings: HashMap<Uuid, Booking>,
    payments: HashMap<Uuid, Payment>,
}

pub struct MemoryStore {
    inner: RwLock<Inner>,
    policy: TurnoverPolicy,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_policy(TurnoverPolicy::default())
    }

    /// Store enforcing the given turnover policy at commit time.
    ///
    /// Must match the policy of the engine driving it.
    pub fn with_policy(policy: TurnoverPolicy) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            policy,
        }
    }

    fn overlap_exists(
        &self,
        inner: &Inner,
        candidate: &Booking,
        exclude: Option<Uuid>,
    ) -> bool {
        inner.bookings.values().any(|other| {
            other.accommodation_id == candidate.accommodation_id
                && Some(other.id) != exclude
                && other.id != candidate.id
                && !other.status.is_terminal()
                && ranges_conflict(
                    self.policy,
                    candidate.check_in_date,
                    candidate.check_out_date,
                    other.check_in_date,
                    other.check_out_date,
                )
        })
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    // ===== Accommodations =====

    async fn insert_accommodation(
        &self,
        accommodation: Accommodation,
    ) -> BookingResult<Accommodation> {
        let mut inner = self.inner.write().await;
        if inner
            .accommodations
            .values()
            .any(|a| a.name == accommodation.name)
        {
            return Err(BookingError::InvalidState(format!(
                "Accommodation name '{}' is already in use",
                accommodation.name
            )));
        }
        inner
            .accommodations
            .insert(accommodation.id, accommodation.clone());
        Ok(accommodation)
    }

    async fn update_accommodation(
        &self,
        id: Uuid,
        patch: AccommodationPatch,
    ) -> BookingResult<Accommodation> {
        let mut inner = self.inner.write().await;
        if let Some(new_name) = &patch.name {
            if inner
                .accommodations
                .values()
                .any(|a| a.id != id && a.name == *new_name)
            {
                return Err(BookingError::InvalidState(format!(
                    "Accommodation name '{}' is already in use",
                    new_name
                )));
            }
        }
        let accommodation = inner
            .accommodations
            .get_mut(&id)
            .ok_or_else(|| BookingError::NotFound("Accommodation not found".to_string()))?;
        accommodation.apply_patch(patch);
        Ok(accommodation.clone())
    }

    async fn delete_accommodation(&self, id: Uuid) -> BookingResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .accommodations
            .remove(&id)
            .ok_or_else(|| BookingError::NotFound("Accommodation not found".to_string()))?;
        Ok(())
    }

    async fn find_accommodation(&self, id: Uuid) -> BookingResult<Option<Accommodation>> {
        let inner = self.inner.read().await;
        Ok(inner.accommodations.get(&id).cloned())
    }

    async fn find_accommodation_by_name(
        &self,
        name: &str,
    ) -> BookingResult<Option<Accommodation>> {
        let inner = self.inner.read().await;
        Ok(inner
            .accommodations
            .values()
            .find(|a| a.name == name)
            .cloned())
    }

    async fn list_accommodations(
        &self,
        filter: &AccommodationFilter,
    ) -> BookingResult<Vec<Accommodation>> {
        let inner = self.inner.read().await;
        let mut results: Vec<Accommodation> = inner
            .accommodations
            .values()
            .filter(|a| {
                filter.is_active.map_or(true, |active| a.is_active == active)
                    && filter.category.map_or(true, |c| a.category == c)
            })
            .cloned()
            .collect();
        results.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(results)
    }

    // ===== Bookings =====

    async fn insert_booking(&self, booking: Booking) -> BookingResult<Booking> {
        let mut inner = self.inner.write().await;
        if !booking.status.is_terminal() && self.overlap_exists(&inner, &booking, None) {
            return Err(BookingError::Conflict(
                "Accommodation is not available for the selected dates".to_string(),
            ));
        }
        inner.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn update_booking(&self, id: Uuid, patch: BookingPatch) -> BookingResult<Booking> {
        let mut inner = self.inner.write().await;

        let mut updated = inner
            .bookings
            .get(&id)
            .ok_or_else(|| BookingError::NotFound("Booking not found".to_string()))?
            .clone();

        let dates_change = patch
            .check_in_date
            .map_or(false, |d| d != updated.check_in_date)
            || patch
                .check_out_date
                .map_or(false, |d| d != updated.check_out_date);

        updated.apply_patch(patch);

        if dates_change && !updated.status.is_terminal() && self.overlap_exists(&inner, &updated, Some(id))
        {
            return Err(BookingError::Conflict(
                "Accommodation is not available for the selected dates".to_string(),
            ));
        }

        inner.bookings.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete_booking(&self, id: Uuid) -> BookingResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .bookings
            .remove(&id)
            .ok_or_else(|| BookingError::NotFound("Booking not found".to_string()))?;
        Ok(())
    }

    async fn find_booking(&self, id: Uuid) -> BookingResult<Option<Booking>> {
        let inner = self.inner.read().await;
        Ok(inner.bookings.get(&id).cloned())
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> BookingResult<Vec<Booking>> {
        let inner = self.inner.read().await;
        let mut results: Vec<Booking> = inner
            .bookings
            .values()
            .filter(|b| b.matches(filter))
            .cloned()
            .collect();
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(results)
    }

    async fn find_non_terminal_bookings(
        &self,
        accommodation_id: Uuid,
        exclude: Option<Uuid>,
    ) -> BookingResult<Vec<Booking>> {
        let inner = self.inner.read().await;
        Ok(inner
            .bookings
            .values()
            .filter(|b| {
                b.accommodation_id == accommodation_id
                    && !b.status.is_terminal()
                    && Some(b.id) != exclude
            })
            .cloned()
            .collect())
    }

    // ===== Payments =====

    async fn insert_payment(&self, payment: Payment) -> BookingResult<Payment> {
        let mut inner = self.inner.write().await;
        inner.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn update_payment(&self, id: Uuid, patch: PaymentPatch) -> BookingResult<Payment> {
        let mut inner = self.inner.write().await;
        let payment = inner
            .payments
            .get_mut(&id)
            .ok_or_else(|| BookingError::NotFound("Payment not found".to_string()))?;
        payment.apply_patch(patch);
        Ok(payment.clone())
    }

    async fn find_payment(&self, id: Uuid) -> BookingResult<Option<Payment>> {
        let inner = self.inner.read().await;
        Ok(inner.payments.get(&id).cloned())
    }

    async fn list_payments(&self, filter: &PaymentFilter) -> BookingResult<Vec<Payment>> {
        let inner = self.inner.read().await;
        let mut results: Vec<Payment> = inner
            .payments
            .values()
            .filter(|p| p.matches(filter))
            .cloned()
            .collect();
        results.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
        Ok(results)
    }

    async fn payments_for_booking(&self, booking_id: Uuid) -> BookingResult<Vec<Payment>> {
        self.list_payments(&PaymentFilter {
            booking_id: Some(booking_id),
            ..PaymentFilter::default()
        })
        .await
    }
}
