//! Lifecycle events raised on successful booking transitions
//!
//! Events are facts for external consumption (guest/admin notifications);
//! delivery is fire-and-forget and never affects the committed transition.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::booking::model::{Booking, BookingStatus};

/// Snapshot of the fields a notification needs
#[derive(Debug, Serialize, Clone)]
pub struct BookingSnapshot {
    pub booking_id: Uuid,
    pub accommodation_name: String,
    pub guest_name: String,
    pub guest_email: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub number_of_guests: i32,
    pub total_amount: i64,
    pub status: BookingStatus,
}

impl BookingSnapshot {
    pub fn from_booking(booking: &Booking, accommodation_name: String) -> Self {
        Self {
            booking_id: booking.id,
            accommodation_name,
            guest_name: booking.guest_name.clone(),
            guest_email: booking.guest_email.clone(),
            check_in_date: booking.check_in_date,
            check_out_date: booking.check_out_date,
            number_of_guests: booking.number_of_guests,
            total_amount: booking.total_amount,
            status: booking.status,
        }
    }
}

/// Booking lifecycle event
#[derive(Debug, Serialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookingEvent {
    Created {
        snapshot: BookingSnapshot,
    },
    Confirmed {
        snapshot: BookingSnapshot,
    },
    Cancelled {
        snapshot: BookingSnapshot,
        reason: Option<String>,
    },
    CheckedIn {
        snapshot: BookingSnapshot,
    },
    CheckedOut {
        snapshot: BookingSnapshot,
    },
}

impl BookingEvent {
    /// Event kind string for logging and dispatch
    pub fn kind(&self) -> &'static str {
        match self {
            BookingEvent::Created { .. } => "created",
            BookingEvent::Confirmed { .. } => "confirmed",
            BookingEvent::Cancelled { .. } => "cancelled",
            BookingEvent::CheckedIn { .. } => "checked_in",
            BookingEvent::CheckedOut { .. } => "checked_out",
        }
    }

    /// The snapshot carried by any event kind
    pub fn snapshot(&self) -> &BookingSnapshot {
        match self {
            BookingEvent::Created { snapshot }
            | BookingEvent::Confirmed { snapshot }
            | BookingEvent::Cancelled { snapshot, .. }
            | BookingEvent::CheckedIn { snapshot }
            | BookingEvent::CheckedOut { snapshot } => snapshot,
        }
    }
}
