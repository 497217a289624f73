//! Storage seam for the booking core
//!
//! The engine talks to a durable store only through [`BookingStore`]; the
//! handle is constructed explicitly at process start and passed in. Two
//! implementations ship here: [`MemoryStore`] for tests and embedders
//! without Postgres, and [`PgStore`] backed by `sqlx`.
//!
//! The safety-critical contract: `insert_booking`, and `update_booking`
//! when the patch carries a date change, re-run the overlap check
//! atomically inside the store's own lock or transaction scope. Two
//! concurrent writers claiming overlapping dates for the same accommodation
//! must never both commit.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::accommodation::model::{Accommodation, AccommodationFilter, AccommodationPatch};
use crate::booking::model::{Booking, BookingFilter, BookingPatch};
use crate::error::BookingResult;
use crate::payment::model::{Payment, PaymentFilter, PaymentPatch};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait BookingStore: Send + Sync {
    // ===== Accommodations =====

    /// Insert a new accommodation; fails with `InvalidState` on a duplicate name
    async fn insert_accommodation(
        &self,
        accommodation: Accommodation,
    ) -> BookingResult<Accommodation>;

    async fn update_accommodation(
        &self,
        id: Uuid,
        patch: AccommodationPatch,
    ) -> BookingResult<Accommodation>;

    async fn delete_accommodation(&self, id: Uuid) -> BookingResult<()>;

    async fn find_accommodation(&self, id: Uuid) -> BookingResult<Option<Accommodation>>;

    async fn find_accommodation_by_name(&self, name: &str)
        -> BookingResult<Option<Accommodation>>;

    /// List accommodations matching the filter, ordered by name
    async fn list_accommodations(
        &self,
        filter: &AccommodationFilter,
    ) -> BookingResult<Vec<Accommodation>>;

    // ===== Bookings =====

    /// Atomically claim the booking's date range and persist it.
    ///
    /// Fails with `Conflict` when a non-terminal booking already overlaps,
    /// or `Serialization` on a retryable transactional conflict.
    async fn insert_booking(&self, booking: Booking) -> BookingResult<Booking>;

    /// Apply a partial patch. When the patch changes either date the merged
    /// range is re-checked against the other non-terminal bookings (self
    /// excluded) in the same atomic scope as the write.
    async fn update_booking(&self, id: Uuid, patch: BookingPatch) -> BookingResult<Booking>;

    /// Administrative hard delete; not part of the business flow
    async fn delete_booking(&self, id: Uuid) -> BookingResult<()>;

    async fn find_booking(&self, id: Uuid) -> BookingResult<Option<Booking>>;

    /// List bookings matching the filter, newest first
    async fn list_bookings(&self, filter: &BookingFilter) -> BookingResult<Vec<Booking>>;

    /// All bookings on the accommodation still occupying dates
    /// (status pending/confirmed/checked_in), minus `exclude`
    async fn find_non_terminal_bookings(
        &self,
        accommodation_id: Uuid,
        exclude: Option<Uuid>,
    ) -> BookingResult<Vec<Booking>>;

    // ===== Payments =====

    async fn insert_payment(&self, payment: Payment) -> BookingResult<Payment>;

    async fn update_payment(&self, id: Uuid, patch: PaymentPatch) -> BookingResult<Payment>;

    async fn find_payment(&self, id: Uuid) -> BookingResult<Option<Payment>>;

    /// List payments matching the filter, newest payment date first
    async fn list_payments(&self, filter: &PaymentFilter) -> BookingResult<Vec<Payment>>;

    /// All payments recorded against a booking, newest payment date first
    async fn payments_for_booking(&self, booking_id: Uuid) -> BookingResult<Vec<Payment>>;
}
