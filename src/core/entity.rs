//! Entity trait defining the core abstraction for all stored records

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Base trait for all entities in the system.
///
/// Every entity has:
/// - id: Unique identifier, assigned at creation and never changed
/// - type: Entity type name (e.g., "user", "place")
/// - created_at: Creation timestamp
/// - updated_at: Last modification timestamp, refreshed on every mutation
///
/// Implementations are normally generated with [`impl_entity!`](crate::impl_entity).
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// The plural resource name (e.g., "users", "amenities")
    fn resource_name() -> &'static str;

    /// The singular resource name (e.g., "user", "amenity")
    fn resource_name_singular() -> &'static str;

    /// Get the unique identifier for this entity instance
    fn id(&self) -> Uuid;

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;

    /// Get the last update timestamp
    fn updated_at(&self) -> DateTime<Utc>;

    /// Refresh `updated_at`
    fn touch(&mut self);

    /// Read a serialized attribute by name.
    ///
    /// Used by repositories for `get_by_attribute` lookups.
    fn attribute(&self, name: &str) -> Option<serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(mut map)) => map.remove(name),
            _ => None,
        }
    }
}

/// Timestamp for a mutation that never precedes `created_at`
#[doc(hidden)]
pub fn next_timestamp(created_at: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(created_at)
}
