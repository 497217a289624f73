//! Booking lifecycle engine
//!
//! Owns the booking state machine and orchestrates creation, update,
//! confirmation, cancellation and check-in/out. Guards run here for typed
//! errors; the authoritative overlap check runs inside the store commit, so
//! concurrent writers cannot both claim overlapping dates. A storage
//! serialization failure is retried once with the same inputs before
//! surfacing as a conflict.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::accommodation::model::Accommodation;
use crate::booking::availability::{self, TurnoverPolicy};
use crate::booking::events::{BookingEvent, BookingSnapshot};
use crate::booking::model::{
    Booking, BookingFilter, BookingPatch, BookingSource, BookingStatus, CreateBookingRequest,
    UpdateBookingRequest,
};
use crate::error::{BookingError, BookingResult};
use crate::notify::Notifier;
use crate::store::BookingStore;

#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn BookingStore>,
    notifier: Arc<dyn Notifier>,
    policy: TurnoverPolicy,
}

impl BookingService {
    pub fn new(
        store: Arc<dyn BookingStore>,
        notifier: Arc<dyn Notifier>,
        policy: TurnoverPolicy,
    ) -> Self {
        Self {
            store,
            notifier,
            policy,
        }
    }

    /// The turnover policy this engine enforces
    pub fn policy(&self) -> TurnoverPolicy {
        self.policy
    }

    /// Pure availability query for preview callers; no side effects
    pub async fn has_conflict(
        &self,
        accommodation_id: Uuid,
        check_in_date: NaiveDate,
        check_out_date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> BookingResult<bool> {
        availability::has_conflict(
            self.store.as_ref(),
            self.policy,
            accommodation_id,
            check_in_date,
            check_out_date,
            exclude,
        )
        .await
    }

    /// Create a booking in status `pending`
    pub async fn create(&self, request: CreateBookingRequest) -> BookingResult<Booking> {
        request.validate()?;

        if request.check_in_date >= request.check_out_date {
            return Err(BookingError::InvalidRange(
                "Check-in date must be before check-out date".to_string(),
            ));
        }

        let accommodation = self.require_accommodation(request.accommodation_id).await?;

        if !accommodation.is_active {
            return Err(BookingError::InvalidState(format!(
                "Accommodation '{}' is not active",
                accommodation.name
            )));
        }

        if request.number_of_guests > accommodation.max_guests {
            return Err(BookingError::CapacityExceeded {
                max_guests: accommodation.max_guests,
                requested: request.number_of_guests,
            });
        }

        if self
            .has_conflict(
                request.accommodation_id,
                request.check_in_date,
                request.check_out_date,
                None,
            )
            .await?
        {
            return Err(BookingError::Conflict(
                "Accommodation is not available for the selected dates".to_string(),
            ));
        }

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            accommodation_id: request.accommodation_id,
            guest_name: request.guest_name,
            guest_email: request.guest_email,
            guest_phone: request.guest_phone,
            number_of_guests: request.number_of_guests,
            check_in_date: request.check_in_date,
            check_out_date: request.check_out_date,
            special_requests: request.special_requests,
            status: BookingStatus::Pending,
            total_amount: request.total_amount,
            source: request.source.unwrap_or(BookingSource::Manual),
            external_ref: request.external_ref,
            notes: request.notes,
            cancelled_at: None,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        };

        let created = self.insert_with_retry(booking).await?;

        tracing::info!(
            booking_id = %created.id,
            accommodation_id = %created.accommodation_id,
            check_in = %created.check_in_date,
            check_out = %created.check_out_date,
            "Booking created"
        );

        let snapshot = BookingSnapshot::from_booking(&created, accommodation.name);
        self.emit(BookingEvent::Created { snapshot });

        Ok(created)
    }

    /// Confirm a pending booking
    pub async fn confirm(&self, id: Uuid) -> BookingResult<Booking> {
        let booking = self.require_booking(id).await?;

        if booking.status != BookingStatus::Pending {
            return Err(BookingError::InvalidTransition(format!(
                "Only pending bookings can be confirmed (current status: {})",
                booking.status.as_str()
            )));
        }

        let updated = self
            .update_with_retry(id, BookingPatch::status_only(BookingStatus::Confirmed))
            .await?;

        tracing::info!(booking_id = %id, "Booking confirmed");

        let snapshot = self.snapshot(&updated).await;
        self.emit(BookingEvent::Confirmed { snapshot });

        Ok(updated)
    }

    /// Cancel a booking, recording when and why.
    ///
    /// Cancelling an already-cancelled booking is an explicit error, not a
    /// no-op, so operator mistakes surface.
    pub async fn cancel(&self, id: Uuid, reason: Option<String>) -> BookingResult<Booking> {
        let booking = self.require_booking(id).await?;

        if booking.status == BookingStatus::Cancelled {
            return Err(BookingError::InvalidTransition(
                "Booking is already cancelled".to_string(),
            ));
        }
        if !booking.status.can_transition_to(BookingStatus::Cancelled) {
            return Err(BookingError::InvalidTransition(format!(
                "Cannot cancel a booking in status {}",
                booking.status.as_str()
            )));
        }

        let patch = BookingPatch {
            status: Some(BookingStatus::Cancelled),
            cancelled_at: Some(Utc::now()),
            cancellation_reason: reason.clone(),
            ..BookingPatch::default()
        };
        let updated = self.update_with_retry(id, patch).await?;

        tracing::info!(booking_id = %id, "Booking cancelled");

        let snapshot = self.snapshot(&updated).await;
        self.emit(BookingEvent::Cancelled { snapshot, reason });

        Ok(updated)
    }

    /// Check a confirmed booking's guest in
    pub async fn check_in(&self, id: Uuid) -> BookingResult<Booking> {
        let booking = self.require_booking(id).await?;

        if booking.status != BookingStatus::Confirmed {
            return Err(BookingError::InvalidTransition(format!(
                "Only confirmed bookings can be checked in (current status: {})",
                booking.status.as_str()
            )));
        }

        let updated = self
            .update_with_retry(id, BookingPatch::status_only(BookingStatus::CheckedIn))
            .await?;

        tracing::info!(booking_id = %id, "Guest checked in");

        let snapshot = self.snapshot(&updated).await;
        self.emit(BookingEvent::CheckedIn { snapshot });

        Ok(updated)
    }

    /// Check a checked-in booking's guest out
    pub async fn check_out(&self, id: Uuid) -> BookingResult<Booking> {
        let booking = self.require_booking(id).await?;

        if booking.status != BookingStatus::CheckedIn {
            return Err(BookingError::InvalidTransition(format!(
                "Only checked-in bookings can be checked out (current status: {})",
                booking.status.as_str()
            )));
        }

        let updated = self
            .update_with_retry(id, BookingPatch::status_only(BookingStatus::CheckedOut))
            .await?;

        tracing::info!(booking_id = %id, "Guest checked out");

        let snapshot = self.snapshot(&updated).await;
        self.emit(BookingEvent::CheckedOut { snapshot });

        Ok(updated)
    }

    /// Partial-field update; omitted fields retain prior values.
    ///
    /// A date change re-runs the conflict check against the other
    /// non-terminal bookings for the accommodation, self excluded, over the
    /// merged candidate range. An explicitly supplied status must be a legal
    /// transition from the current one and emits the matching lifecycle
    /// event.
    pub async fn update(&self, id: Uuid, request: UpdateBookingRequest) -> BookingResult<Booking> {
        request.validate()?;

        let booking = self.require_booking(id).await?;

        let merged_check_in = request.check_in_date.unwrap_or(booking.check_in_date);
        let merged_check_out = request.check_out_date.unwrap_or(booking.check_out_date);
        if merged_check_in >= merged_check_out {
            return Err(BookingError::InvalidRange(
                "Check-in date must be before check-out date".to_string(),
            ));
        }

        let status_change = match request.status {
            Some(next) if next != booking.status => {
                if !booking.status.can_transition_to(next) {
                    return Err(BookingError::InvalidTransition(format!(
                        "Cannot move booking from {} to {}",
                        booking.status.as_str(),
                        next.as_str()
                    )));
                }
                Some(next)
            }
            _ => None,
        };

        if let Some(number_of_guests) = request.number_of_guests {
            let accommodation = self.require_accommodation(booking.accommodation_id).await?;
            if number_of_guests > accommodation.max_guests {
                return Err(BookingError::CapacityExceeded {
                    max_guests: accommodation.max_guests,
                    requested: number_of_guests,
                });
            }
        }

        let dates_change = merged_check_in != booking.check_in_date
            || merged_check_out != booking.check_out_date;
        let effective_status = status_change.unwrap_or(booking.status);

        if dates_change
            && !effective_status.is_terminal()
            && self
                .has_conflict(
                    booking.accommodation_id,
                    merged_check_in,
                    merged_check_out,
                    Some(id),
                )
                .await?
        {
            return Err(BookingError::Conflict(
                "Accommodation is not available for the selected dates".to_string(),
            ));
        }

        let patch = BookingPatch {
            guest_name: request.guest_name,
            guest_email: request.guest_email,
            guest_phone: request.guest_phone,
            number_of_guests: request.number_of_guests,
            check_in_date: request.check_in_date,
            check_out_date: request.check_out_date,
            special_requests: request.special_requests,
            status: status_change,
            total_amount: request.total_amount,
            notes: request.notes,
            cancelled_at: None,
            cancellation_reason: None,
        };
        let updated = self.update_with_retry(id, patch).await?;

        tracing::info!(booking_id = %id, "Booking updated");

        if let Some(next) = status_change {
            let snapshot = self.snapshot(&updated).await;
            let event = match next {
                BookingStatus::Confirmed => Some(BookingEvent::Confirmed { snapshot }),
                BookingStatus::Cancelled => Some(BookingEvent::Cancelled {
                    snapshot,
                    reason: None,
                }),
                BookingStatus::CheckedIn => Some(BookingEvent::CheckedIn { snapshot }),
                BookingStatus::CheckedOut => Some(BookingEvent::CheckedOut { snapshot }),
                BookingStatus::Pending => None,
            };
            if let Some(event) = event {
                self.emit(event);
            }
        }

        Ok(updated)
    }

    /// Fetch a booking by id
    pub async fn get(&self, id: Uuid) -> BookingResult<Booking> {
        self.require_booking(id).await
    }

    /// List bookings matching the typed filter, newest first
    pub async fn list(&self, filter: &BookingFilter) -> BookingResult<Vec<Booking>> {
        self.store.list_bookings(filter).await
    }

    /// Administrative hard delete; the business flow never removes rows
    pub async fn delete(&self, id: Uuid) -> BookingResult<()> {
        self.require_booking(id).await?;
        self.store.delete_booking(id).await?;
        tracing::info!(booking_id = %id, "Booking deleted");
        Ok(())
    }

    // ===== Private helpers =====

    async fn require_booking(&self, id: Uuid) -> BookingResult<Booking> {
        self.store
            .find_booking(id)
            .await?
            .ok_or_else(|| BookingError::NotFound("Booking not found".to_string()))
    }

    async fn require_accommodation(&self, id: Uuid) -> BookingResult<Accommodation> {
        self.store
            .find_accommodation(id)
            .await?
            .ok_or_else(|| BookingError::NotFound("Accommodation not found".to_string()))
    }

    async fn insert_with_retry(&self, booking: Booking) -> BookingResult<Booking> {
        match self.store.insert_booking(booking.clone()).await {
            Err(BookingError::Serialization) => {
                tracing::warn!(
                    booking_id = %booking.id,
                    "Serialization failure on booking insert, retrying once"
                );
                match self.store.insert_booking(booking).await {
                    Err(BookingError::Serialization) => Err(BookingError::Conflict(
                        "Accommodation is not available for the selected dates".to_string(),
                    )),
                    other => other,
                }
            }
            other => other,
        }
    }

    async fn update_with_retry(&self, id: Uuid, patch: BookingPatch) -> BookingResult<Booking> {
        match self.store.update_booking(id, patch.clone()).await {
            Err(BookingError::Serialization) => {
                tracing::warn!(
                    booking_id = %id,
                    "Serialization failure on booking update, retrying once"
                );
                match self.store.update_booking(id, patch).await {
                    Err(BookingError::Serialization) => Err(BookingError::Conflict(
                        "Accommodation is not available for the selected dates".to_string(),
                    )),
                    other => other,
                }
            }
            other => other,
        }
    }

    async fn snapshot(&self, booking: &Booking) -> BookingSnapshot {
        let accommodation_name = match self.store.find_accommodation(booking.accommodation_id).await
        {
            Ok(Some(accommodation)) => accommodation.name,
            _ => booking.accommodation_id.to_string(),
        };
        BookingSnapshot::from_booking(booking, accommodation_name)
    }

    /// Event emission is best-effort: a notifier failure is logged and never
    /// rolls back or blocks the committed transition.
    fn emit(&self, event: BookingEvent) {
        if let Err(e) = self.notifier.emit(&event) {
            tracing::warn!(
                kind = event.kind(),
                booking_id = %event.snapshot().booking_id,
                error = %e,
                "Failed to deliver lifecycle event"
            );
        }
    }
}
