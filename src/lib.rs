//! Resort booking core
//!
//! The booking availability and lifecycle engine for a resort accommodation
//! system: it decides whether a reservation may occupy an accommodation for
//! a date range and governs legal transitions of a booking's status. HTTP
//! routing, authentication, and notification delivery live outside this
//! crate; the engine reaches durable storage through the [`store`] seam and
//! raises lifecycle facts through the [`notify`] seam.

pub mod accommodation;
pub mod booking;
pub mod config;
pub mod error;
pub mod notify;
pub mod payment;
pub mod store;

pub use accommodation::{Accommodation, AccommodationCategory, AccommodationService};
pub use booking::{
    Booking, BookingEvent, BookingFilter, BookingService, BookingSource, BookingStatus,
    TurnoverPolicy,
};
pub use config::Config;
pub use error::{BookingError, BookingResult};
pub use notify::{ChannelNotifier, Notifier, TracingNotifier};
pub use payment::{Payment, PaymentService, PaymentStatus, PaymentSummary};
pub use store::{BookingStore, MemoryStore, PgStore};
