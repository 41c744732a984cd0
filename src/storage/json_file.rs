//! Serialized-file storage backend.
//!
//! Each entity kind is kept in its own JSON document, `{directory}/{plural}.json`,
//! holding an object keyed by id. The document is loaded once when the
//! repository is opened and rewritten after every mutation.
//!
//! # Durability
//!
//! Writes go to a sibling `.tmp` file which is then renamed over the
//! document, so a crash leaves either the old or the new state on disk.
//! The in-memory copy is only replaced once the write has succeeded.
//!
//! File I/O is synchronous and wrapped in `tokio::task::spawn_blocking`.

use crate::core::patch::{Patch, merge_fields};
use crate::core::{Entity, FieldValue, HbnbError, Repository, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Serialization helpers
// ---------------------------------------------------------------------------

fn file_encode<T: serde::Serialize>(item: &T) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(item)
        .map_err(|e| HbnbError::Storage(format!("json file encode: {}", e)))
}

fn file_decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| HbnbError::Storage(format!("json file decode: {}", e)))
}

// ---------------------------------------------------------------------------
// JsonFileRepository
// ---------------------------------------------------------------------------

/// File-backed implementation of `Repository<T>`.
///
/// # Example
///
/// ```rust,ignore
/// use hbnb::storage::JsonFileRepository;
///
/// let users = JsonFileRepository::<User>::open("/var/lib/hbnb")?;
/// let user = users.add(user).await?;
/// ```
pub struct JsonFileRepository<T: Entity> {
    path: PathBuf,
    entities: Arc<Mutex<BTreeMap<Uuid, T>>>,
}

impl<T: Entity> JsonFileRepository<T> {
    /// Open (or create) the document for `T` under `directory`
    pub fn open(directory: impl AsRef<Path>) -> Result<Self> {
        std::fs::create_dir_all(directory.as_ref())?;
        let path = directory
            .as_ref()
            .join(format!("{}.json", T::resource_name()));

        let entities = match std::fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => file_decode(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(
            path = %path.display(),
            count = entities.len(),
            "opened {} document",
            T::resource_name()
        );

        Ok(Self {
            path,
            entities: Arc::new(Mutex::new(entities)),
        })
    }

    /// Location of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, snapshot: &BTreeMap<Uuid, T>) -> Result<()> {
        let bytes = file_encode(snapshot)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let tmp = path.with_extension("json.tmp");
            std::fs::write(&tmp, &bytes)?;
            std::fs::rename(&tmp, &path)?;
            Ok(())
        })
        .await?
    }
}

impl<T: Entity> Clone for JsonFileRepository<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            entities: Arc::clone(&self.entities),
        }
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for JsonFileRepository<T> {
    async fn add(&self, entity: T) -> Result<T> {
        let mut entities = self.entities.lock().await;

        if entities.contains_key(&entity.id()) {
            return Err(HbnbError::DuplicateKey {
                entity_type: T::resource_name_singular(),
                id: entity.id().to_string(),
            });
        }

        let mut next = entities.clone();
        next.insert(entity.id(), entity.clone());
        self.persist(&next).await?;
        *entities = next;

        Ok(entity)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<T>> {
        Ok(self.entities.lock().await.get(id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<T>> {
        Ok(self.entities.lock().await.values().cloned().collect())
    }

    async fn get_by_attribute(&self, name: &str, value: &FieldValue) -> Result<Vec<T>> {
        let entities = self.entities.lock().await;
        Ok(entities
            .values()
            .filter(|entity| value.matches(entity.attribute(name).as_ref()))
            .cloned()
            .collect())
    }

    async fn update(&self, id: &Uuid, fields: &Patch) -> Result<T> {
        let mut entities = self.entities.lock().await;

        let current = entities
            .get(id)
            .ok_or_else(|| HbnbError::not_found(T::resource_name_singular(), id))?;
        let merged = merge_fields(current, fields)?;

        let mut next = entities.clone();
        next.insert(*id, merged.clone());
        self.persist(&next).await?;
        *entities = next;

        Ok(merged)
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        let mut entities = self.entities.lock().await;

        if !entities.contains_key(id) {
            return Err(HbnbError::not_found(T::resource_name_singular(), id));
        }

        let mut next = entities.clone();
        next.remove(id);
        self.persist(&next).await?;
        *entities = next;

        Ok(())
    }
}
