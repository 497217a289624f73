//! Postgres store
//!
//! Queries follow the runtime-checked `sqlx` style throughout. The overlap
//! invariant is enforced by the database itself: the schema in
//! `migrations/0001_init.sql` carries a gist exclusion constraint on
//! (accommodation_id, daterange) over non-terminal statuses, so two
//! concurrent writers claiming overlapping dates cannot both commit.
//! Constraint violations surface as `Conflict`, serialization failures as
//! `Serialization` (see `error::BookingError`).

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::accommodation::model::{Accommodation, AccommodationFilter, AccommodationPatch};
use crate::booking::model::{Booking, BookingFilter, BookingPatch};
use crate::config::Config;
use crate::error::{BookingError, BookingResult};
use crate::payment::model::{Payment, PaymentFilter, PaymentPatch};
use crate::store::BookingStore;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool from the configured URL and connection limit
    pub async fn connect(config: &Config) -> BookingResult<Self> {
        tracing::info!(
            database = %config.database_url_masked(),
            "Connecting to database"
        );
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BookingStore for PgStore {
    // ===== Accommodations =====

    async fn insert_accommodation(
        &self,
        accommodation: Accommodation,
    ) -> BookingResult<Accommodation> {
        let created = sqlx::query_as::<_, Accommodation>(
            r#"
            INSERT INTO accommodations (
                id, name, description, category, max_guests, base_price,
                amenities, is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(accommodation.id)
        .bind(&accommodation.name)
        .bind(&accommodation.description)
        .bind(accommodation.category)
        .bind(accommodation.max_guests)
        .bind(accommodation.base_price)
        .bind(&accommodation.amenities)
        .bind(accommodation.is_active)
        .bind(accommodation.created_at)
        .bind(accommodation.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update_accommodation(
        &self,
        id: Uuid,
        patch: AccommodationPatch,
    ) -> BookingResult<Accommodation> {
        let mut tx = self.pool.begin().await?;

        let mut accommodation = sqlx::query_as::<_, Accommodation>(
            "SELECT * FROM accommodations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| BookingError::NotFound("Accommodation not found".to_string()))?;

        accommodation.apply_patch(patch);

        let updated = sqlx::query_as::<_, Accommodation>(
            r#"
            UPDATE accommodations
            SET name = $2, description = $3, category = $4, max_guests = $5,
                base_price = $6, amenities = $7, is_active = $8, updated_at = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&accommodation.name)
        .bind(&accommodation.description)
        .bind(accommodation.category)
        .bind(accommodation.max_guests)
        .bind(accommodation.base_price)
        .bind(&accommodation.amenities)
        .bind(accommodation.is_active)
        .bind(accommodation.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_accommodation(&self, id: Uuid) -> BookingResult<()> {
        let result = sqlx::query("DELETE FROM accommodations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(BookingError::NotFound("Accommodation not found".to_string()));
        }
        Ok(())
    }

    async fn find_accommodation(&self, id: Uuid) -> BookingResult<Option<Accommodation>> {
        let accommodation =
            sqlx::query_as::<_, Accommodation>("SELECT * FROM accommodations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(accommodation)
    }

    async fn find_accommodation_by_name(
        &self,
        name: &str,
    ) -> BookingResult<Option<Accommodation>> {
        let accommodation =
            sqlx::query_as::<_, Accommodation>("SELECT * FROM accommodations WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        Ok(accommodation)
    }

    async fn list_accommodations(
        &self,
        filter: &AccommodationFilter,
    ) -> BookingResult<Vec<Accommodation>> {
        let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> =
            sqlx::QueryBuilder::new("SELECT * FROM accommodations WHERE 1=1");

        if let Some(is_active) = filter.is_active {
            query_builder.push(" AND is_active = ");
            query_builder.push_bind(is_active);
        }
        if let Some(category) = filter.category {
            query_builder.push(" AND category = ");
            query_builder.push_bind(category);
        }

        query_builder.push(" ORDER BY name ASC");

        let accommodations = query_builder
            .build_query_as::<Accommodation>()
            .fetch_all(&self.pool)
            .await?;
        Ok(accommodations)
    }

    // ===== Bookings =====

    async fn insert_booking(&self, booking: Booking) -> BookingResult<Booking> {
        // The bookings_no_overlap exclusion constraint rejects the insert
        // when a non-terminal booking already claims an overlapping range.
        let created = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (
                id, accommodation_id, guest_name, guest_email, guest_phone,
                number_of_guests, check_in_date, check_out_date, special_requests,
                status, total_amount, source, external_ref, notes,
                cancelled_at, cancellation_reason, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING *
            "#,
        )
        .bind(booking.id)
        .bind(booking.accommodation_id)
        .bind(&booking.guest_name)
        .bind(&booking.guest_email)
        .bind(&booking.guest_phone)
        .bind(booking.number_of_guests)
        .bind(booking.check_in_date)
        .bind(booking.check_out_date)
        .bind(&booking.special_requests)
        .bind(booking.status)
        .bind(booking.total_amount)
        .bind(booking.source)
        .bind(&booking.external_ref)
        .bind(&booking.notes)
        .bind(booking.cancelled_at)
        .bind(&booking.cancellation_reason)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update_booking(&self, id: Uuid, patch: BookingPatch) -> BookingResult<Booking> {
        let mut tx = self.pool.begin().await?;

        let mut booking =
            sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| BookingError::NotFound("Booking not found".to_string()))?;

        booking.apply_patch(patch);

        // A date change re-fires the exclusion constraint inside this
        // transaction, closing the check-then-write window.
        let updated = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET guest_name = $2, guest_email = $3, guest_phone = $4,
                number_of_guests = $5, check_in_date = $6, check_out_date = $7,
                special_requests = $8, status = $9, total_amount = $10,
                notes = $11, cancelled_at = $12, cancellation_reason = $13,
                updated_at = $14
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&booking.guest_name)
        .bind(&booking.guest_email)
        .bind(&booking.guest_phone)
        .bind(booking.number_of_guests)
        .bind(booking.check_in_date)
        .bind(booking.check_out_date)
        .bind(&booking.special_requests)
        .bind(booking.status)
        .bind(booking.total_amount)
        .bind(&booking.notes)
        .bind(booking.cancelled_at)
        .bind(&booking.cancellation_reason)
        .bind(booking.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_booking(&self, id: Uuid) -> BookingResult<()> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(BookingError::NotFound("Booking not found".to_string()));
        }
        Ok(())
    }

    async fn find_booking(&self, id: Uuid) -> BookingResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(booking)
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> BookingResult<Vec<Booking>> {
        let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> =
            sqlx::QueryBuilder::new("SELECT * FROM bookings WHERE 1=1");

        if let Some(status) = filter.status {
            query_builder.push(" AND status = ");
            query_builder.push_bind(status);
        }
        if let Some(accommodation_id) = filter.accommodation_id {
            query_builder.push(" AND accommodation_id = ");
            query_builder.push_bind(accommodation_id);
        }
        if let Some(source) = filter.source {
            query_builder.push(" AND source = ");
            query_builder.push_bind(source);
        }
        if let Some(start_date) = filter.start_date {
            query_builder.push(" AND check_in_date >= ");
            query_builder.push_bind(start_date);
        }
        if let Some(end_date) = filter.end_date {
            query_builder.push(" AND check_out_date <= ");
            query_builder.push_bind(end_date);
        }

        query_builder.push(" ORDER BY created_at DESC");

        let bookings = query_builder
            .build_query_as::<Booking>()
            .fetch_all(&self.pool)
            .await?;
        Ok(bookings)
    }

    async fn find_non_terminal_bookings(
        &self,
        accommodation_id: Uuid,
        exclude: Option<Uuid>,
    ) -> BookingResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE accommodation_id = $1
              AND status NOT IN ('cancelled', 'checked_out')
              AND ($2::uuid IS NULL OR id <> $2)
            "#,
        )
        .bind(accommodation_id)
        .bind(exclude)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    // ===== Payments =====

    async fn insert_payment(&self, payment: Payment) -> BookingResult<Payment> {
        let created = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (
                id, booking_id, amount, method, payment_type, status,
                transaction_id, payment_date, notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(payment.id)
        .bind(payment.booking_id)
        .bind(payment.amount)
        .bind(payment.method)
        .bind(payment.payment_type)
        .bind(payment.status)
        .bind(&payment.transaction_id)
        .bind(payment.payment_date)
        .bind(&payment.notes)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update_payment(&self, id: Uuid, patch: PaymentPatch) -> BookingResult<Payment> {
        let mut tx = self.pool.begin().await?;

        let mut payment =
            sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| BookingError::NotFound("Payment not found".to_string()))?;

        payment.apply_patch(patch);

        let updated = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET amount = $2, method = $3, payment_type = $4, status = $5,
                transaction_id = $6, notes = $7, updated_at = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payment.amount)
        .bind(payment.method)
        .bind(payment.payment_type)
        .bind(payment.status)
        .bind(&payment.transaction_id)
        .bind(&payment.notes)
        .bind(payment.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn find_payment(&self, id: Uuid) -> BookingResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(payment)
    }

    async fn list_payments(&self, filter: &PaymentFilter) -> BookingResult<Vec<Payment>> {
        let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> =
            sqlx::QueryBuilder::new("SELECT * FROM payments WHERE 1=1");

        if let Some(status) = filter.status {
            query_builder.push(" AND status = ");
            query_builder.push_bind(status);
        }
        if let Some(booking_id) = filter.booking_id {
            query_builder.push(" AND booking_id = ");
            query_builder.push_bind(booking_id);
        }
        if let Some(payment_type) = filter.payment_type {
            query_builder.push(" AND payment_type = ");
            query_builder.push_bind(payment_type);
        }

        query_builder.push(" ORDER BY payment_date DESC");

        let payments = query_builder
            .build_query_as::<Payment>()
            .fetch_all(&self.pool)
            .await?;
        Ok(payments)
    }

    async fn payments_for_booking(&self, booking_id: Uuid) -> BookingResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE booking_id = $1 ORDER BY payment_date DESC",
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }
}
