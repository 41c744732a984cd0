//! Explicit wiring of repositories, facades and the relation manager

use crate::config::AppConfig;
use crate::core::{Argon2Hasher, PasswordHasher, Result};
use crate::facades::{AmenityFacade, PlaceFacade, ReviewFacade, UserFacade};
use crate::relations::RelationManager;
use crate::storage::Repositories;
use std::sync::Arc;

/// The assembled core: one facade per entity kind plus the relation manager.
///
/// Built once at startup and handed to whatever layer calls into it. Cloning
/// is cheap; all clones share the same repositories and lock registry.
#[derive(Clone)]
pub struct Hbnb {
    pub users: UserFacade,
    pub places: PlaceFacade,
    pub amenities: AmenityFacade,
    pub reviews: ReviewFacade,
    pub relations: RelationManager,
}

impl Hbnb {
    pub fn builder() -> HbnbBuilder {
        HbnbBuilder::new()
    }

    /// Wire facades and the relation manager over existing repositories
    pub fn from_parts(repositories: Repositories, hasher: Arc<dyn PasswordHasher>) -> Self {
        let users = UserFacade::new(repositories.users, hasher);
        let places = PlaceFacade::new(repositories.places);
        let amenities = AmenityFacade::new(repositories.amenities);
        let reviews = ReviewFacade::new(repositories.reviews);
        let relations = RelationManager::new(
            users.clone(),
            places.clone(),
            amenities.clone(),
            reviews.clone(),
        );

        Self {
            users,
            places,
            amenities,
            reviews,
            relations,
        }
    }
}

/// Builder for [`Hbnb`]
///
/// # Example
///
/// ```ignore
/// let hbnb = Hbnb::builder()
///     .with_config(AppConfig::from_yaml_file("hbnb.yaml")?.with_env_overrides()?)
///     .build()
///     .await?;
/// ```
#[derive(Default)]
pub struct HbnbBuilder {
    config: AppConfig,
    hasher: Option<Arc<dyn PasswordHasher>>,
    repositories: Option<Repositories>,
}

impl HbnbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the Argon2 hasher derived from the configuration
    pub fn with_password_hasher(mut self, hasher: impl PasswordHasher + 'static) -> Self {
        self.hasher = Some(Arc::new(hasher));
        self
    }

    /// Use these repositories instead of the configured backend
    pub fn with_repositories(mut self, repositories: Repositories) -> Self {
        self.repositories = Some(repositories);
        self
    }

    pub async fn build(self) -> Result<Hbnb> {
        let hasher = match self.hasher {
            Some(hasher) => hasher,
            None => {
                let params = &self.config.password_hashing;
                Arc::new(Argon2Hasher::with_params(
                    params.memory_kib,
                    params.iterations,
                    params.parallelism,
                )?) as Arc<dyn PasswordHasher>
            }
        };

        let repositories = match self.repositories {
            Some(repositories) => repositories,
            None => Repositories::from_backend(&self.config.storage_backend()).await?,
        };

        tracing::info!(environment = ?self.config.environment, "hbnb core ready");
        Ok(Hbnb::from_parts(repositories, hasher))
    }
}
