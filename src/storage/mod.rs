//! Storage implementations for different backends
//!
//! The backend is chosen once, at startup, from a [`StorageBackend`] value;
//! [`Repositories::from_backend`] builds one repository per entity kind.

pub mod in_memory;
pub mod json_file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemoryRepository;
pub use json_file::JsonFileRepository;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepository;

use crate::config::StorageBackend;
use crate::core::{Repository, Result};
use crate::entities::{Amenity, Place, Review, User};
use std::path::Path;
use std::sync::Arc;

/// One repository per entity kind, all on the same backend
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn Repository<User>>,
    pub places: Arc<dyn Repository<Place>>,
    pub amenities: Arc<dyn Repository<Amenity>>,
    pub reviews: Arc<dyn Repository<Review>>,
}

impl Repositories {
    /// Fresh in-memory repositories
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryRepository::<User>::new()),
            places: Arc::new(InMemoryRepository::<Place>::new()),
            amenities: Arc::new(InMemoryRepository::<Amenity>::new()),
            reviews: Arc::new(InMemoryRepository::<Review>::new()),
        }
    }

    /// File-backed repositories under `directory`
    pub fn json_file(directory: impl AsRef<Path>) -> Result<Self> {
        let directory = directory.as_ref();
        Ok(Self {
            users: Arc::new(JsonFileRepository::<User>::open(directory)?),
            places: Arc::new(JsonFileRepository::<Place>::open(directory)?),
            amenities: Arc::new(JsonFileRepository::<Amenity>::open(directory)?),
            reviews: Arc::new(JsonFileRepository::<Review>::open(directory)?),
        })
    }

    /// Relational repositories sharing one connection pool
    #[cfg(feature = "sqlite")]
    pub async fn sqlite(url: &str) -> Result<Self> {
        let pool = sqlite::connect(url).await?;
        Ok(Self {
            users: Arc::new(SqliteRepository::<User>::new(pool.clone())),
            places: Arc::new(SqliteRepository::<Place>::new(pool.clone())),
            amenities: Arc::new(SqliteRepository::<Amenity>::new(pool.clone())),
            reviews: Arc::new(SqliteRepository::<Review>::new(pool)),
        })
    }

    /// Build the repositories for `backend`
    pub async fn from_backend(backend: &StorageBackend) -> Result<Self> {
        tracing::info!(?backend, "initialising storage");
        match backend {
            StorageBackend::InMemory => Ok(Self::in_memory()),
            StorageBackend::JsonFile { directory } => Self::json_file(directory),
            #[cfg(feature = "sqlite")]
            StorageBackend::Sqlite { url } => Self::sqlite(url).await,
            #[cfg(not(feature = "sqlite"))]
            StorageBackend::Sqlite { .. } => Err(crate::core::HbnbError::Config(
                "relational storage requires the `sqlite` feature".to_string(),
            )),
        }
    }
}
