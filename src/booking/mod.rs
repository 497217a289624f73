//! Booking domain: model, availability checking, and the lifecycle engine

pub mod availability;
pub mod events;
pub mod model;
pub mod service;

pub use availability::{ranges_conflict, TurnoverPolicy};
pub use events::{BookingEvent, BookingSnapshot};
pub use model::{
    Booking, BookingFilter, BookingPatch, BookingSource, BookingStatus, CreateBookingRequest,
    UpdateBookingRequest,
};
pub use service::BookingService;
