//! Accommodation models and data structures

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

/// Accommodation category
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "accommodation_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccommodationCategory {
    Villa,
    Suite,
    Room,
    Bungalow,
}

/// Accommodation model
///
/// Catalog edits (name/description/price/active flag) never retroactively
/// invalidate bookings that already reference the unit.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Accommodation {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: AccommodationCategory,
    pub max_guests: i32,
    /// Base nightly price in minor units (cents)
    pub base_price: i64,
    pub amenities: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for registering an accommodation
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccommodationRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub category: AccommodationCategory,
    #[validate(range(min = 1))]
    pub max_guests: i32,
    #[validate(range(min = 0))]
    pub base_price: i64,
    #[serde(default)]
    pub amenities: Vec<String>,
}

/// Partial-field update DTO; omitted fields retain prior values
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateAccommodationRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<AccommodationCategory>,
    #[validate(range(min = 1))]
    pub max_guests: Option<i32>,
    #[validate(range(min = 0))]
    pub base_price: Option<i64>,
    pub amenities: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

/// Store-level patch, resolved by the service from an update request
#[derive(Debug, Default, Clone)]
pub struct AccommodationPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<AccommodationCategory>,
    pub max_guests: Option<i32>,
    pub base_price: Option<i64>,
    pub amenities: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

/// Typed query predicates for listing accommodations
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AccommodationFilter {
    pub is_active: Option<bool>,
    pub category: Option<AccommodationCategory>,
}

impl Accommodation {
    /// Apply a patch, refreshing the update timestamp
    pub fn apply_patch(&mut self, patch: AccommodationPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(max_guests) = patch.max_guests {
            self.max_guests = max_guests;
        }
        if let Some(base_price) = patch.base_price {
            self.base_price = base_price;
        }
        if let Some(amenities) = patch.amenities {
            self.amenities = amenities;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Utc::now();
    }
}
