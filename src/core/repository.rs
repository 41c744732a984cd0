//! Repository trait shared by every storage strategy

use crate::core::Entity;
use crate::core::error::Result;
use crate::core::field::FieldValue;
use crate::core::patch::Patch;
use async_trait::async_trait;
use uuid::Uuid;

/// Storage contract for one entity kind
///
/// Implementations only persist and retrieve; they never construct entities
/// from raw payloads. Every strategy applies the same policies:
/// - `add` fails with `DuplicateKey` when the id already exists
/// - `update` and `delete` fail with `NotFound` when the id is absent
/// - `get_all` order is unspecified
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Persist a new entity
    async fn add(&self, entity: T) -> Result<T>;

    /// Get an entity by ID
    async fn get(&self, id: &Uuid) -> Result<Option<T>>;

    /// List all entities
    async fn get_all(&self) -> Result<Vec<T>>;

    /// Entities whose attribute `name` equals `value`
    async fn get_by_attribute(&self, name: &str, value: &FieldValue) -> Result<Vec<T>>;

    /// Merge `fields` into the stored entity and refresh `updated_at`
    async fn update(&self, id: &Uuid, fields: &Patch) -> Result<T>;

    /// Remove an entity
    async fn delete(&self, id: &Uuid) -> Result<()>;
}
