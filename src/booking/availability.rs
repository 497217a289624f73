//! Date-range availability checking
//!
//! The overlap predicate here is the single source of truth: the pure
//! `has_conflict` query, the engine's pre-checks, and the stores'
//! commit-time re-checks all go through [`ranges_conflict`].

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{BookingError, BookingResult};
use crate::store::BookingStore;

/// Boundary policy for same-day check-out/check-in turnover.
///
/// Under `ClosedInterval` a candidate whose check-in equals an existing
/// booking's check-out conflicts: the property wants a vacant night between
/// stays. `ExclusiveCheckout` permits same-day turnover.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TurnoverPolicy {
    #[default]
    ClosedInterval,
    ExclusiveCheckout,
}

impl TurnoverPolicy {
    /// Parse a policy from its configuration string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "closed" | "closed_interval" => Ok(TurnoverPolicy::ClosedInterval),
            "exclusive" | "exclusive_checkout" => Ok(TurnoverPolicy::ExclusiveCheckout),
            _ => Err(format!(
                "Invalid turnover policy: '{}'. Expected: closed or exclusive",
                s
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TurnoverPolicy::ClosedInterval => "closed",
            TurnoverPolicy::ExclusiveCheckout => "exclusive",
        }
    }
}

/// Whether two [check-in, check-out] ranges conflict under the policy
pub fn ranges_conflict(
    policy: TurnoverPolicy,
    a_check_in: NaiveDate,
    a_check_out: NaiveDate,
    b_check_in: NaiveDate,
    b_check_out: NaiveDate,
) -> bool {
    match policy {
        TurnoverPolicy::ClosedInterval => a_check_in <= b_check_out && a_check_out >= b_check_in,
        TurnoverPolicy::ExclusiveCheckout => a_check_in < b_check_out && a_check_out > b_check_in,
    }
}

/// Whether any non-terminal booking on the accommodation overlaps the
/// candidate range. Pure query, no side effects.
///
/// `exclude` skips one booking id so a booking under update is not checked
/// against itself.
pub async fn has_conflict(
    store: &dyn BookingStore,
    policy: TurnoverPolicy,
    accommodation_id: Uuid,
    check_in_date: NaiveDate,
    check_out_date: NaiveDate,
    exclude: Option<Uuid>,
) -> BookingResult<bool> {
    if check_in_date >= check_out_date {
        return Err(BookingError::InvalidRange(
            "Check-in date must be before check-out date".to_string(),
        ));
    }

    let existing = store
        .find_non_terminal_bookings(accommodation_id, exclude)
        .await?;

    Ok(existing.iter().any(|other| {
        ranges_conflict(
            policy,
            check_in_date,
            check_out_date,
            other.check_in_date,
            other.check_out_date,
        )
    }))
}
