//! Lifecycle engine tests: state machine guards, update semantics, events

mod common;

use common::{booking_request, date, env, seed_accommodation};
use resort_booking::booking::{BookingEvent, BookingFilter, UpdateBookingRequest};
use resort_booking::{BookingError, BookingStatus};

#[tokio::test]
async fn test_create_starts_pending_and_emits_created() {
    let mut env = env().await;
    let villa = seed_accommodation(&env, "Sea Villa", 4).await;

    let booking = env
        .bookings
        .create(booking_request(villa.id, date(2025, 3, 1), date(2025, 3, 5)))
        .await
        .unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.accommodation_id, villa.id);

    let events = env.drain_events();
    assert_eq!(events.len(), 1);
    match &events[0] {
        BookingEvent::Created { snapshot } => {
            assert_eq!(snapshot.booking_id, booking.id);
            assert_eq!(snapshot.accommodation_name, "Sea Villa");
            assert_eq!(snapshot.guest_email, "ada@example.com");
        }
        other => panic!("expected created event, got {}", other.kind()),
    }
}

#[tokio::test]
async fn test_full_lifecycle_happy_path() {
    let mut env = env().await;
    let villa = seed_accommodation(&env, "Sea Villa", 4).await;

    let booking = env
        .bookings
        .create(booking_request(villa.id, date(2025, 3, 1), date(2025, 3, 5)))
        .await
        .unwrap();

    let confirmed = env.bookings.confirm(booking.id).await.unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    let checked_in = env.bookings.check_in(booking.id).await.unwrap();
    assert_eq!(checked_in.status, BookingStatus::CheckedIn);

    let checked_out = env.bookings.check_out(booking.id).await.unwrap();
    assert_eq!(checked_out.status, BookingStatus::CheckedOut);

    let kinds: Vec<&str> = env.drain_events().iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec!["created", "confirmed", "checked_in", "checked_out"]);
}

#[tokio::test]
async fn test_events_serialize_with_kind_tag() {
    let mut env = env().await;
    let villa = seed_accommodation(&env, "Sea Villa", 4).await;

    let booking = env
        .bookings
        .create(booking_request(villa.id, date(2025, 3, 1), date(2025, 3, 5)))
        .await
        .unwrap();
    env.bookings
        .cancel(booking.id, Some("guest request".to_string()))
        .await
        .unwrap();

    let events = env.drain_events();
    assert_eq!(events.len(), 2);

    // The wire shape notification consumers rely on: a "type" tag plus the
    // snapshot, with cancellation carrying its reason alongside
    let created = serde_json::to_value(&events[0]).unwrap();
    assert_eq!(created["type"], "created");
    assert_eq!(created["snapshot"]["accommodation_name"], "Sea Villa");
    assert_eq!(created["snapshot"]["status"], "pending");

    let cancelled = serde_json::to_value(&events[1]).unwrap();
    assert_eq!(cancelled["type"], "cancelled");
    assert_eq!(cancelled["reason"], "guest request");
    assert_eq!(cancelled["snapshot"]["status"], "cancelled");
}

#[tokio::test]
async fn test_notifier_failure_never_blocks_transitions() {
    let env = env().await;
    let villa = seed_accommodation(&env, "Sea Villa", 4).await;

    // With no receiver left, every emit fails with a closed channel
    drop(env.events);

    let booking = env
        .bookings
        .create(booking_request(villa.id, date(2025, 3, 1), date(2025, 3, 5)))
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Pending);

    let confirmed = env.bookings.confirm(booking.id).await.unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    // The transition was committed, not rolled back
    let fetched = env.bookings.get(booking.id).await.unwrap();
    assert_eq!(fetched.status, BookingStatus::Confirmed);
}

#[tokio::test]
async fn test_confirm_requires_pending() {
    let env = env().await;
    let villa = seed_accommodation(&env, "Sea Villa", 4).await;

    let booking = env
        .bookings
        .create(booking_request(villa.id, date(2025, 3, 1), date(2025, 3, 5)))
        .await
        .unwrap();
    env.bookings.confirm(booking.id).await.unwrap();

    // Confirming an already-confirmed booking is an illegal jump
    let err = env.bookings.confirm(booking.id).await.unwrap_err();
    assert!(matches!(err, BookingError::InvalidTransition(_)));
}

#[tokio::test]
async fn test_check_in_requires_confirmed() {
    let env = env().await;
    let villa = seed_accommodation(&env, "Sea Villa", 4).await;

    let booking = env
        .bookings
        .create(booking_request(villa.id, date(2025, 3, 1), date(2025, 3, 5)))
        .await
        .unwrap();

    let err = env.bookings.check_in(booking.id).await.unwrap_err();
    assert!(matches!(err, BookingError::InvalidTransition(_)));
}

#[tokio::test]
async fn test_check_out_requires_checked_in() {
    let env = env().await;
    let villa = seed_accommodation(&env, "Sea Villa", 4).await;

    let booking = env
        .bookings
        .create(booking_request(villa.id, date(2025, 3, 1), date(2025, 3, 5)))
        .await
        .unwrap();
    env.bookings.confirm(booking.id).await.unwrap();

    let err = env.bookings.check_out(booking.id).await.unwrap_err();
    assert!(matches!(err, BookingError::InvalidTransition(_)));
}

#[tokio::test]
async fn test_cancel_from_each_non_terminal_status() {
    let env = env().await;
    let villa = seed_accommodation(&env, "Sea Villa", 4).await;

    // Pending
    let a = env
        .bookings
        .create(booking_request(villa.id, date(2025, 3, 1), date(2025, 3, 5)))
        .await
        .unwrap();
    let cancelled = env
        .bookings
        .cancel(a.id, Some("guest request".to_string()))
        .await
        .unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert!(cancelled.cancelled_at.is_some());
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("guest request"));

    // Confirmed
    let b = env
        .bookings
        .create(booking_request(villa.id, date(2025, 4, 1), date(2025, 4, 5)))
        .await
        .unwrap();
    env.bookings.confirm(b.id).await.unwrap();
    assert_eq!(
        env.bookings.cancel(b.id, None).await.unwrap().status,
        BookingStatus::Cancelled
    );

    // Checked in
    let c = env
        .bookings
        .create(booking_request(villa.id, date(2025, 5, 1), date(2025, 5, 5)))
        .await
        .unwrap();
    env.bookings.confirm(c.id).await.unwrap();
    env.bookings.check_in(c.id).await.unwrap();
    assert_eq!(
        env.bookings.cancel(c.id, None).await.unwrap().status,
        BookingStatus::Cancelled
    );
}

#[tokio::test]
async fn test_cancel_is_idempotent_rejecting() {
    let env = env().await;
    let villa = seed_accommodation(&env, "Sea Villa", 4).await;

    let booking = env
        .bookings
        .create(booking_request(villa.id, date(2025, 3, 1), date(2025, 3, 5)))
        .await
        .unwrap();
    env.bookings.cancel(booking.id, None).await.unwrap();

    let err = env.bookings.cancel(booking.id, None).await.unwrap_err();
    match err {
        BookingError::InvalidTransition(message) => {
            assert!(message.contains("already cancelled"));
        }
        other => panic!("expected invalid transition, got {:?}", other),
    }
}

#[tokio::test]
async fn test_terminal_states_reject_every_operation() {
    let env = env().await;
    let villa = seed_accommodation(&env, "Sea Villa", 4).await;

    let booking = env
        .bookings
        .create(booking_request(villa.id, date(2025, 3, 1), date(2025, 3, 5)))
        .await
        .unwrap();
    env.bookings.confirm(booking.id).await.unwrap();
    env.bookings.check_in(booking.id).await.unwrap();
    env.bookings.check_out(booking.id).await.unwrap();

    assert!(matches!(
        env.bookings.confirm(booking.id).await.unwrap_err(),
        BookingError::InvalidTransition(_)
    ));
    assert!(matches!(
        env.bookings.check_in(booking.id).await.unwrap_err(),
        BookingError::InvalidTransition(_)
    ));
    assert!(matches!(
        env.bookings.check_out(booking.id).await.unwrap_err(),
        BookingError::InvalidTransition(_)
    ));
    assert!(matches!(
        env.bookings.cancel(booking.id, None).await.unwrap_err(),
        BookingError::InvalidTransition(_)
    ));
}

#[tokio::test]
async fn test_capacity_exceeded_creates_no_booking() {
    let env = env().await;
    let villa = seed_accommodation(&env, "Sea Villa", 4).await;

    let mut request = booking_request(villa.id, date(2025, 3, 1), date(2025, 3, 5));
    request.number_of_guests = 5;

    let err = env.bookings.create(request).await.unwrap_err();
    match err {
        BookingError::CapacityExceeded {
            max_guests,
            requested,
        } => {
            assert_eq!(max_guests, 4);
            assert_eq!(requested, 5);
        }
        other => panic!("expected capacity exceeded, got {:?}", other),
    }

    let all = env.bookings.list(&BookingFilter::default()).await.unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn test_inactive_accommodation_rejected() {
    let env = env().await;
    let villa = seed_accommodation(&env, "Sea Villa", 4).await;
    env.accommodations
        .update(
            villa.id,
            resort_booking::accommodation::UpdateAccommodationRequest {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = env
        .bookings
        .create(booking_request(villa.id, date(2025, 3, 1), date(2025, 3, 5)))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidState(_)));
}

#[tokio::test]
async fn test_unknown_accommodation_not_found() {
    let env = env().await;
    let err = env
        .bookings
        .create(booking_request(
            uuid::Uuid::new_v4(),
            date(2025, 3, 1),
            date(2025, 3, 5),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::NotFound(_)));
}

#[tokio::test]
async fn test_inverted_dates_rejected() {
    let env = env().await;
    let villa = seed_accommodation(&env, "Sea Villa", 4).await;

    let err = env
        .bookings
        .create(booking_request(villa.id, date(2025, 3, 5), date(2025, 3, 1)))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidRange(_)));

    // Zero-night stay is rejected too
    let err = env
        .bookings
        .create(booking_request(villa.id, date(2025, 3, 1), date(2025, 3, 1)))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidRange(_)));
}

#[tokio::test]
async fn test_update_rejects_inverted_merged_range() {
    let env = env().await;
    let villa = seed_accommodation(&env, "Sea Villa", 4).await;

    let booking = env
        .bookings
        .create(booking_request(villa.id, date(2025, 3, 10), date(2025, 3, 15)))
        .await
        .unwrap();

    // Only the check-out side moves, landing before the kept check-in
    let err = env
        .bookings
        .update(
            booking.id,
            UpdateBookingRequest {
                check_out_date: Some(date(2025, 3, 8)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidRange(_)));

    // And the mirror: only the check-in side moves, past the kept check-out
    let err = env
        .bookings
        .update(
            booking.id,
            UpdateBookingRequest {
                check_in_date: Some(date(2025, 3, 20)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidRange(_)));

    // The stored dates are untouched
    let fetched = env.bookings.get(booking.id).await.unwrap();
    assert_eq!(fetched.check_in_date, date(2025, 3, 10));
    assert_eq!(fetched.check_out_date, date(2025, 3, 15));
}

#[tokio::test]
async fn test_malformed_guest_email_rejected() {
    let env = env().await;
    let villa = seed_accommodation(&env, "Sea Villa", 4).await;

    let mut request = booking_request(villa.id, date(2025, 3, 1), date(2025, 3, 5));
    request.guest_email = "not-an-email".to_string();

    let err = env.bookings.create(request).await.unwrap_err();
    assert!(matches!(err, BookingError::Validation(_)));
}

#[tokio::test]
async fn test_update_retains_omitted_fields() {
    let env = env().await;
    let villa = seed_accommodation(&env, "Sea Villa", 4).await;

    let booking = env
        .bookings
        .create(booking_request(villa.id, date(2025, 3, 1), date(2025, 3, 5)))
        .await
        .unwrap();

    let updated = env
        .bookings
        .update(
            booking.id,
            UpdateBookingRequest {
                guest_name: Some("Grace Guest".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.guest_name, "Grace Guest");
    assert_eq!(updated.guest_email, booking.guest_email);
    assert_eq!(updated.check_in_date, booking.check_in_date);
    assert_eq!(updated.check_out_date, booking.check_out_date);
    assert_eq!(updated.status, BookingStatus::Pending);
}

#[tokio::test]
async fn test_update_date_change_checks_conflicts_excluding_self() {
    let env = env().await;
    let villa = seed_accommodation(&env, "Sea Villa", 4).await;

    let first = env
        .bookings
        .create(booking_request(villa.id, date(2025, 3, 1), date(2025, 3, 5)))
        .await
        .unwrap();
    let second = env
        .bookings
        .create(booking_request(villa.id, date(2025, 3, 10), date(2025, 3, 15)))
        .await
        .unwrap();

    // Moving the second booking onto the first conflicts
    let err = env
        .bookings
        .update(
            second.id,
            UpdateBookingRequest {
                check_in_date: Some(date(2025, 3, 3)),
                check_out_date: Some(date(2025, 3, 8)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Conflict(_)));

    // Extending a booking over its own range is fine: self is excluded
    let extended = env
        .bookings
        .update(
            first.id,
            UpdateBookingRequest {
                check_out_date: Some(date(2025, 3, 7)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(extended.check_out_date, date(2025, 3, 7));
}

#[tokio::test]
async fn test_update_merges_single_sided_date_change() {
    let env = env().await;
    let villa = seed_accommodation(&env, "Sea Villa", 4).await;

    env.bookings
        .create(booking_request(villa.id, date(2025, 3, 10), date(2025, 3, 15)))
        .await
        .unwrap();
    let movable = env
        .bookings
        .create(booking_request(villa.id, date(2025, 3, 1), date(2025, 3, 5)))
        .await
        .unwrap();

    // Only the check-out side moves; the merged range [3/1, 3/12] overlaps
    let err = env
        .bookings
        .update(
            movable.id,
            UpdateBookingRequest {
                check_out_date: Some(date(2025, 3, 12)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Conflict(_)));
}

#[tokio::test]
async fn test_update_with_legal_status_emits_event() {
    let mut env = env().await;
    let villa = seed_accommodation(&env, "Sea Villa", 4).await;

    let booking = env
        .bookings
        .create(booking_request(villa.id, date(2025, 3, 1), date(2025, 3, 5)))
        .await
        .unwrap();
    env.drain_events();

    let updated = env
        .bookings
        .update(
            booking.id,
            UpdateBookingRequest {
                status: Some(BookingStatus::Confirmed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, BookingStatus::Confirmed);

    let kinds: Vec<&str> = env.drain_events().iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec!["confirmed"]);
}

#[tokio::test]
async fn test_update_with_illegal_status_rejected() {
    let env = env().await;
    let villa = seed_accommodation(&env, "Sea Villa", 4).await;

    let booking = env
        .bookings
        .create(booking_request(villa.id, date(2025, 3, 1), date(2025, 3, 5)))
        .await
        .unwrap();

    // Pending cannot jump straight to checked_out
    let err = env
        .bookings
        .update(
            booking.id,
            UpdateBookingRequest {
                status: Some(BookingStatus::CheckedOut),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidTransition(_)));
}

#[tokio::test]
async fn test_update_guest_count_checked_against_capacity() {
    let env = env().await;
    let villa = seed_accommodation(&env, "Sea Villa", 4).await;

    let booking = env
        .bookings
        .create(booking_request(villa.id, date(2025, 3, 1), date(2025, 3, 5)))
        .await
        .unwrap();

    let err = env
        .bookings
        .update(
            booking.id,
            UpdateBookingRequest {
                number_of_guests: Some(6),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::CapacityExceeded { .. }));
}

#[tokio::test]
async fn test_list_filters_by_status_and_accommodation() {
    let env = env().await;
    let villa = seed_accommodation(&env, "Sea Villa", 4).await;
    let suite = seed_accommodation(&env, "Garden Suite", 2).await;

    let a = env
        .bookings
        .create(booking_request(villa.id, date(2025, 3, 1), date(2025, 3, 5)))
        .await
        .unwrap();
    env.bookings
        .create(booking_request(suite.id, date(2025, 3, 1), date(2025, 3, 5)))
        .await
        .unwrap();
    env.bookings.confirm(a.id).await.unwrap();

    let confirmed = env
        .bookings
        .list(&BookingFilter {
            status: Some(BookingStatus::Confirmed),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].id, a.id);

    let on_villa = env
        .bookings
        .list(&BookingFilter {
            accommodation_id: Some(villa.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(on_villa.len(), 1);
}

#[tokio::test]
async fn test_delete_is_an_escape_hatch() {
    let env = env().await;
    let villa = seed_accommodation(&env, "Sea Villa", 4).await;

    let booking = env
        .bookings
        .create(booking_request(villa.id, date(2025, 3, 1), date(2025, 3, 5)))
        .await
        .unwrap();

    env.bookings.delete(booking.id).await.unwrap();
    assert!(matches!(
        env.bookings.get(booking.id).await.unwrap_err(),
        BookingError::NotFound(_)
    ));
}
