use crate::core::patch::Patch;
use crate::core::{FieldValue, Repository, Result};
use crate::entities::{NewPlace, Place};
use std::sync::Arc;
use uuid::Uuid;

use super::{fetch, validated_update};

/// Fields only the relation manager may change
const MANAGED_FIELDS: &[&str] = &["owner_id", "owner_first_name", "amenities", "reviews"];

#[derive(Clone)]
pub struct PlaceFacade {
    repo: Arc<dyn Repository<Place>>,
}

impl PlaceFacade {
    pub fn new(repo: Arc<dyn Repository<Place>>) -> Self {
        Self { repo }
    }

    pub(crate) fn repository(&self) -> &dyn Repository<Place> {
        self.repo.as_ref()
    }

    /// Validate and persist a place. The draft must already carry its owner;
    /// use `RelationManager::create_place_for_user` to keep the owner's list
    /// in step.
    pub async fn create_place(&self, draft: NewPlace) -> Result<Place> {
        let place = Place::from_draft(draft)?;
        place.check()?;

        let place = self.repo.add(place).await?;
        tracing::debug!(id = %place.id, owner = %place.owner_id, "place created");
        Ok(place)
    }

    pub async fn get_place(&self, id: &Uuid) -> Result<Place> {
        fetch(self.repository(), id).await
    }

    pub async fn get_all_places(&self) -> Result<Vec<Place>> {
        self.repo.get_all().await
    }

    /// Places whose `owner_id` is `owner_id`; empty when there are none
    pub async fn get_all_places_from_owner_id(&self, owner_id: &Uuid) -> Result<Vec<Place>> {
        self.repo
            .get_by_attribute("owner_id", &FieldValue::Uuid(*owner_id))
            .await
    }

    pub async fn update_place(&self, id: &Uuid, patch: Patch) -> Result<Place> {
        validated_update(self.repository(), id, &patch, MANAGED_FIELDS, Place::check).await
    }

    /// Delete the place record only; reviews and the owner's list are not touched
    pub async fn delete_place(&self, id: &Uuid) -> Result<()> {
        self.repo.delete(id).await?;
        tracing::debug!(id = %id, "place deleted");
        Ok(())
    }
}
