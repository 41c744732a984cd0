//! # hbnb
//!
//! Domain core of a lodging-rental service: users, places, amenities and
//! reviews, with their bidirectional relations kept consistent over a
//! pluggable storage backend.
//!
//! ## Features
//!
//! - **Repository abstraction**: one async trait, three backends (in-memory,
//!   JSON files, SQLite), chosen once at startup from configuration
//! - **Facades**: validated CRUD per entity kind, hashed passwords, unique
//!   emails and amenity names
//! - **Relation manager**: owner/place, place/review and place/amenity
//!   bookkeeping, with best-effort cascading deletes that report what they
//!   skipped
//! - **Per-entity locking**: concurrent list updates on the same record never
//!   lose a write
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hbnb::prelude::*;
//!
//! let hbnb = Hbnb::builder().with_config(AppConfig::in_memory()).build().await?;
//!
//! let ada = hbnb
//!     .users
//!     .create_user(NewUser::new("Ada", "Lovelace", "ada@calc.io", "secret"))
//!     .await?;
//! let loft = hbnb
//!     .relations
//!     .create_place_for_user(&ada.id, NewPlace::new("Loft", 90.0, 48.85, 2.35))
//!     .await?;
//! hbnb.relations
//!     .add_amenity_to_a_place(&loft.id, NewAmenity::new("Wifi"))
//!     .await?;
//!
//! let report = hbnb.relations.delete_user_and_associated_instances(&ada.id).await?;
//! assert!(report.is_complete());
//! ```

pub mod app;
pub mod config;
pub mod core;
pub mod entities;
pub mod facades;
pub mod logging;
pub mod relations;
pub mod storage;

pub use app::{Hbnb, HbnbBuilder};

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        Argon2Hasher, Entity, FieldValue, HbnbError, IdList, NameSet, Patch, PasswordHasher,
        Repository, Result, patch_from,
    };

    // === Entities ===
    pub use crate::entities::{
        Amenity, NewAmenity, NewPlace, NewReview, NewUser, Place, PublicUser, Review, User,
    };

    // === Services ===
    pub use crate::app::{Hbnb, HbnbBuilder};
    pub use crate::facades::{AmenityFacade, PlaceFacade, ReviewFacade, UserFacade};
    pub use crate::relations::{CascadeReport, EntityKind, RelationManager};

    // === Storage & config ===
    pub use crate::config::{AppConfig, Environment, StorageBackend};
    pub use crate::storage::{InMemoryRepository, JsonFileRepository, Repositories};
    #[cfg(feature = "sqlite")]
    pub use crate::storage::SqliteRepository;

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use uuid::Uuid;
}
