//! In-memory implementation of Repository for testing and development

use crate::core::patch::{Patch, merge_fields};
use crate::core::{Entity, FieldValue, HbnbError, Repository, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory repository implementation
///
/// Uses RwLock for thread-safe access. Updates merge under the write lock, so
/// a single `update` call is atomic.
#[derive(Clone)]
pub struct InMemoryRepository<T: Entity> {
    entities: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Entity> InMemoryRepository<T> {
    /// Create a new, empty in-memory repository
    pub fn new() -> Self {
        Self {
            entities: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned(e: impl std::fmt::Display) -> HbnbError {
    HbnbError::Storage(format!("repository lock poisoned: {}", e))
}

#[async_trait]
impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    async fn add(&self, entity: T) -> Result<T> {
        let mut entities = self.entities.write().map_err(poisoned)?;

        if entities.contains_key(&entity.id()) {
            return Err(HbnbError::DuplicateKey {
                entity_type: T::resource_name_singular(),
                id: entity.id().to_string(),
            });
        }
        entities.insert(entity.id(), entity.clone());

        Ok(entity)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<T>> {
        let entities = self.entities.read().map_err(poisoned)?;
        Ok(entities.get(id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<T>> {
        let entities = self.entities.read().map_err(poisoned)?;
        Ok(entities.values().cloned().collect())
    }

    async fn get_by_attribute(&self, name: &str, value: &FieldValue) -> Result<Vec<T>> {
        let entities = self.entities.read().map_err(poisoned)?;
        Ok(entities
            .values()
            .filter(|entity| value.matches(entity.attribute(name).as_ref()))
            .cloned()
            .collect())
    }

    async fn update(&self, id: &Uuid, fields: &Patch) -> Result<T> {
        let mut entities = self.entities.write().map_err(poisoned)?;

        let current = entities
            .get(id)
            .ok_or_else(|| HbnbError::not_found(T::resource_name_singular(), id))?;
        let merged = merge_fields(current, fields)?;
        entities.insert(*id, merged.clone());

        Ok(merged)
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        let mut entities = self.entities.write().map_err(poisoned)?;

        entities
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| HbnbError::not_found(T::resource_name_singular(), id))
    }
}
