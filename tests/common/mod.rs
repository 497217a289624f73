//! Shared helpers for the integration suites

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use resort_booking::accommodation::{
    AccommodationCategory, AccommodationService, CreateAccommodationRequest,
};
use resort_booking::booking::{
    BookingEvent, BookingService, CreateBookingRequest, TurnoverPolicy,
};
use resort_booking::notify::ChannelNotifier;
use resort_booking::payment::PaymentService;
use resort_booking::store::{BookingStore, MemoryStore};
use resort_booking::Accommodation;

pub struct TestEnv {
    pub store: Arc<MemoryStore>,
    pub bookings: BookingService,
    pub accommodations: AccommodationService,
    pub payments: PaymentService,
    pub events: UnboundedReceiver<BookingEvent>,
}

pub async fn env() -> TestEnv {
    env_with_policy(TurnoverPolicy::ClosedInterval).await
}

pub async fn env_with_policy(policy: TurnoverPolicy) -> TestEnv {
    let store = Arc::new(MemoryStore::with_policy(policy));
    let dyn_store: Arc<dyn BookingStore> = store.clone();
    let (notifier, events) = ChannelNotifier::new();

    TestEnv {
        store,
        bookings: BookingService::new(dyn_store.clone(), Arc::new(notifier), policy),
        accommodations: AccommodationService::new(dyn_store.clone()),
        payments: PaymentService::new(dyn_store),
        events,
    }
}

impl TestEnv {
    /// Drain every event emitted so far
    pub fn drain_events(&mut self) -> Vec<BookingEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Register a villa with the given capacity
pub async fn seed_accommodation(env: &TestEnv, name: &str, max_guests: i32) -> Accommodation {
    env.accommodations
        .create(CreateAccommodationRequest {
            name: name.to_string(),
            description: None,
            category: AccommodationCategory::Villa,
            max_guests,
            base_price: 25_000,
            amenities: vec![],
        })
        .await
        .unwrap()
}

/// Booking request for two guests with sensible guest details
pub fn booking_request(
    accommodation_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> CreateBookingRequest {
    CreateBookingRequest {
        accommodation_id,
        guest_name: "Ada Guest".to_string(),
        guest_email: "ada@example.com".to_string(),
        guest_phone: "+1-555-0100".to_string(),
        number_of_guests: 2,
        check_in_date: check_in,
        check_out_date: check_out,
        special_requests: None,
        total_amount: 50_000,
        source: None,
        external_ref: None,
        notes: None,
    }
}
