//! Booking models and data structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

/// Booking status state machine
///
/// `Pending`, `Confirmed` and `CheckedIn` bookings occupy their
/// accommodation; `CheckedOut` and `Cancelled` are terminal and never
/// participate in conflict checks.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
}

impl BookingStatus {
    /// Terminal statuses admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::CheckedOut | BookingStatus::Cancelled)
    }

    /// Legal transitions of the booking state machine
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, CheckedIn)
                | (Confirmed, Cancelled)
                | (CheckedIn, CheckedOut)
                | (CheckedIn, Cancelled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::CheckedIn => "checked_in",
            BookingStatus::CheckedOut => "checked_out",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

/// Where the booking originated
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "booking_source", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingSource {
    Manual,
    Phone,
    WalkIn,
    ExternalForm,
}

/// Booking model
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Booking {
    pub id: Uuid,
    pub accommodation_id: Uuid,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: String,
    pub number_of_guests: i32,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub special_requests: Option<String>,
    pub status: BookingStatus,
    /// Total amount due in minor units (cents)
    pub total_amount: i64,
    pub source: BookingSource,
    /// Submission id when the booking arrived through an external form
    pub external_ref: Option<String>,
    pub notes: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating a booking
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub accommodation_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub guest_name: String,
    #[validate(email)]
    pub guest_email: String,
    #[validate(length(min = 1, max = 50))]
    pub guest_phone: String,
    #[validate(range(min = 1))]
    pub number_of_guests: i32,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub special_requests: Option<String>,
    #[validate(range(min = 0))]
    pub total_amount: i64,
    pub source: Option<BookingSource>,
    pub external_ref: Option<String>,
    pub notes: Option<String>,
}

/// Partial-field update DTO; omitted fields retain prior values.
///
/// A supplied status must be a legal transition from the current one.
#[derive(Debug, Default, Clone, Deserialize, Validate)]
pub struct UpdateBookingRequest {
    #[validate(length(min = 1, max = 200))]
    pub guest_name: Option<String>,
    #[validate(email)]
    pub guest_email: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub guest_phone: Option<String>,
    #[validate(range(min = 1))]
    pub number_of_guests: Option<i32>,
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    pub special_requests: Option<String>,
    pub status: Option<BookingStatus>,
    #[validate(range(min = 0))]
    pub total_amount: Option<i64>,
    pub notes: Option<String>,
}

/// Store-level patch applied atomically by the store.
///
/// When either date is present the store re-runs the overlap check for the
/// merged range (self excluded) inside its own lock/transaction scope.
#[derive(Debug, Default, Clone)]
pub struct BookingPatch {
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub number_of_guests: Option<i32>,
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    pub special_requests: Option<String>,
    pub status: Option<BookingStatus>,
    pub total_amount: Option<i64>,
    pub notes: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
}

impl BookingPatch {
    /// Patch carrying only a status change
    pub fn status_only(status: BookingStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Typed query predicates for listing bookings.
///
/// The date window keeps the admin-calendar semantics: bookings whose
/// check-in is on or after `start_date` and whose check-out is on or before
/// `end_date`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub accommodation_id: Option<Uuid>,
    pub source: Option<BookingSource>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Booking {
    /// Apply a patch, refreshing the update timestamp
    pub fn apply_patch(&mut self, patch: BookingPatch) {
        if let Some(guest_name) = patch.guest_name {
            self.guest_name = guest_name;
        }
        if let Some(guest_email) = patch.guest_email {
            self.guest_email = guest_email;
        }
        if let Some(guest_phone) = patch.guest_phone {
            self.guest_phone = guest_phone;
        }
        if let Some(number_of_guests) = patch.number_of_guests {
            self.number_of_guests = number_of_guests;
        }
        if let Some(check_in_date) = patch.check_in_date {
            self.check_in_date = check_in_date;
        }
        if let Some(check_out_date) = patch.check_out_date {
            self.check_out_date = check_out_date;
        }
        if let Some(special_requests) = patch.special_requests {
            self.special_requests = Some(special_requests);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(total_amount) = patch.total_amount {
            self.total_amount = total_amount;
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
        if let Some(cancelled_at) = patch.cancelled_at {
            self.cancelled_at = Some(cancelled_at);
        }
        if let Some(cancellation_reason) = patch.cancellation_reason {
            self.cancellation_reason = Some(cancellation_reason);
        }
        self.updated_at = Utc::now();
    }

    /// Whether the booking matches a typed filter
    pub fn matches(&self, filter: &BookingFilter) -> bool {
        if let Some(status) = filter.status {
            if self.status != status {
                return false;
            }
        }
        if let Some(accommodation_id) = filter.accommodation_id {
            if self.accommodation_id != accommodation_id {
                return false;
            }
        }
        if let Some(source) = filter.source {
            if self.source != source {
                return false;
            }
        }
        if let Some(start_date) = filter.start_date {
            if self.check_in_date < start_date {
                return false;
            }
        }
        if let Some(end_date) = filter.end_date {
            if self.check_out_date > end_date {
                return false;
            }
        }
        true
    }
}
