use crate::core::patch::Patch;
use crate::core::{FieldValue, HbnbError, Repository, Result};
use crate::entities::amenity::normalize_name;
use crate::entities::{Amenity, NewAmenity};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use super::{fetch, validated_update};

/// Amenity facade. Names are trimmed and unique across amenities.
#[derive(Clone)]
pub struct AmenityFacade {
    repo: Arc<dyn Repository<Amenity>>,
}

impl AmenityFacade {
    pub fn new(repo: Arc<dyn Repository<Amenity>>) -> Self {
        Self { repo }
    }

    pub async fn create_amenity(&self, draft: NewAmenity) -> Result<Amenity> {
        let amenity = Amenity::new(draft);
        amenity.check()?;
        self.ensure_name_free(&amenity.name, None).await?;

        let amenity = self.repo.add(amenity).await?;
        tracing::debug!(id = %amenity.id, name = %amenity.name, "amenity created");
        Ok(amenity)
    }

    pub async fn get_amenity(&self, id: &Uuid) -> Result<Amenity> {
        fetch(self.repo.as_ref(), id).await
    }

    pub async fn get_amenity_by_name(&self, name: &str) -> Result<Amenity> {
        self.find_by_name(name)
            .await?
            .ok_or_else(|| HbnbError::not_found("amenity", normalize_name(name)))
    }

    /// Canonical record for `name`, if one has been created
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Amenity>> {
        let mut found = self
            .repo
            .get_by_attribute("name", &FieldValue::String(normalize_name(name)))
            .await?;
        Ok(if found.is_empty() {
            None
        } else {
            Some(found.swap_remove(0))
        })
    }

    pub async fn get_all_amenities(&self) -> Result<Vec<Amenity>> {
        self.repo.get_all().await
    }

    /// Rename or otherwise patch an amenity. Places keep the names they
    /// were attached with.
    pub async fn update_amenity(&self, id: &Uuid, patch: Patch) -> Result<Amenity> {
        let mut patch = patch;

        if let Some(name) = patch.get("name") {
            let name = name
                .as_str()
                .map(normalize_name)
                .ok_or_else(|| HbnbError::invalid("name", "name must be a string"))?;
            self.ensure_name_free(&name, Some(id)).await?;
            patch.insert("name".to_string(), Value::String(name));
        }

        validated_update(self.repo.as_ref(), id, &patch, &[], Amenity::check).await
    }

    /// Delete the canonical record. Places that reference the name keep it.
    pub async fn delete_amenity(&self, id: &Uuid) -> Result<()> {
        self.repo.delete(id).await?;
        tracing::debug!(id = %id, "amenity deleted");
        Ok(())
    }

    async fn ensure_name_free(&self, name: &str, owner: Option<&Uuid>) -> Result<()> {
        if let Some(existing) = self.find_by_name(name).await? {
            if Some(&existing.id) != owner {
                return Err(HbnbError::invalid(
                    "name",
                    format!("amenity '{}' already exists", name),
                ));
            }
        }
        Ok(())
    }
}
