//! Accommodation registry: the catalog of bookable units

pub mod model;
pub mod service;

pub use model::{
    Accommodation, AccommodationCategory, AccommodationFilter, AccommodationPatch,
    CreateAccommodationRequest, UpdateAccommodationRequest,
};
pub use service::AccommodationService;
