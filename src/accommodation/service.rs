//! Accommodation registry service
//!
//! Read-mostly catalog. The read path (`get`, `is_active`, `capacity`) feeds
//! the lifecycle engine; writes are administrative and guarded only by name
//! uniqueness.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::accommodation::model::{
    Accommodation, AccommodationFilter, AccommodationPatch, CreateAccommodationRequest,
    UpdateAccommodationRequest,
};
use crate::error::{BookingError, BookingResult};
use crate::store::BookingStore;

#[derive(Clone)]
pub struct AccommodationService {
    store: Arc<dyn BookingStore>,
}

impl AccommodationService {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// Fetch an accommodation by id
    pub async fn get(&self, id: Uuid) -> BookingResult<Accommodation> {
        self.store
            .find_accommodation(id)
            .await?
            .ok_or_else(|| BookingError::NotFound("Accommodation not found".to_string()))
    }

    /// Whether the unit currently accepts new bookings
    pub async fn is_active(&self, id: Uuid) -> BookingResult<bool> {
        Ok(self.get(id).await?.is_active)
    }

    /// Maximum guest capacity of the unit
    pub async fn capacity(&self, id: Uuid) -> BookingResult<i32> {
        Ok(self.get(id).await?.max_guests)
    }

    /// List accommodations matching the filter, ordered by name
    pub async fn list(&self, filter: &AccommodationFilter) -> BookingResult<Vec<Accommodation>> {
        self.store.list_accommodations(filter).await
    }

    /// Register a new accommodation
    pub async fn create(&self, request: CreateAccommodationRequest) -> BookingResult<Accommodation> {
        request.validate()?;

        if self
            .store
            .find_accommodation_by_name(&request.name)
            .await?
            .is_some()
        {
            return Err(BookingError::InvalidState(format!(
                "Accommodation name '{}' is already in use",
                request.name
            )));
        }

        let now = Utc::now();
        let accommodation = Accommodation {
            id: Uuid::new_v4(),
            name: request.name,
            description: request.description,
            category: request.category,
            max_guests: request.max_guests,
            base_price: request.base_price,
            amenities: request.amenities,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let created = self.store.insert_accommodation(accommodation).await?;
        tracing::info!(accommodation_id = %created.id, name = %created.name, "Accommodation registered");
        Ok(created)
    }

    /// Update catalog fields; omitted fields retain prior values
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateAccommodationRequest,
    ) -> BookingResult<Accommodation> {
        request.validate()?;

        let existing = self.get(id).await?;

        if let Some(new_name) = &request.name {
            if *new_name != existing.name {
                if let Some(other) = self.store.find_accommodation_by_name(new_name).await? {
                    if other.id != id {
                        return Err(BookingError::InvalidState(format!(
                            "Accommodation name '{}' is already in use",
                            new_name
                        )));
                    }
                }
            }
        }

        let patch = AccommodationPatch {
            name: request.name,
            description: request.description,
            category: request.category,
            max_guests: request.max_guests,
            base_price: request.base_price,
            amenities: request.amenities,
            is_active: request.is_active,
        };

        self.store.update_accommodation(id, patch).await
    }

    /// Administrative removal; not part of the booking flow
    pub async fn delete(&self, id: Uuid) -> BookingResult<()> {
        self.get(id).await?;
        self.store.delete_accommodation(id).await?;
        tracing::info!(accommodation_id = %id, "Accommodation deleted");
        Ok(())
    }
}
