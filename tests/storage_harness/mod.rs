//! Shared test harness for storage backend testing
//!
//! Provides fixtures for the four entity kinds, a cheap password hasher, and
//! two macro-generated suites that every backend must pass:
//!
//! - `repository_contract_tests!` checks the `Repository<T>` contract
//! - `relation_manager_tests!` checks the relation manager end to end
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//!
//! repository_contract_tests!(Repositories::in_memory());
//! relation_manager_tests!(Repositories::in_memory());
//! ```
//!
//! The factory expression is evaluated once per test, inside the async test
//! body, so it may `.await`.

#![allow(dead_code)]

#[macro_use]
mod relation_manager_tests;

use async_trait::async_trait;
use hbnb::Hbnb;
use hbnb::core::{
    Argon2Hasher, Entity, FieldValue, HbnbError, PasswordHasher, Patch, Repository, Result,
};
use hbnb::entities::{Amenity, NewAmenity, NewPlace, NewReview, NewUser, Place, Review, User};
use hbnb::relations::RelationManager;
use hbnb::storage::Repositories;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

/// Argon2 with the smallest accepted cost, so tests stay fast
pub fn cheap_hasher() -> Arc<dyn PasswordHasher> {
    Arc::new(Argon2Hasher::with_params(8, 1, 1).expect("valid argon2 parameters"))
}

/// Facades and relation manager over `repositories`
pub fn hbnb_over(repositories: Repositories) -> Hbnb {
    Hbnb::from_parts(repositories, cheap_hasher())
}

/// Number of users, places, amenities and reviews currently stored
pub async fn counts(hbnb: &Hbnb) -> (usize, usize, usize, usize) {
    (
        hbnb.users.get_all_users().await.unwrap().len(),
        hbnb.places.get_all_places().await.unwrap().len(),
        hbnb.amenities.get_all_amenities().await.unwrap().len(),
        hbnb.reviews.get_all_reviews().await.unwrap().len(),
    )
}

// ---------------------------------------------------------------------------
// Drafts
// ---------------------------------------------------------------------------

pub fn user_draft(first_name: &str, email: &str) -> NewUser {
    NewUser::new(first_name, "Tester", email, "correct horse")
}

pub fn place_draft(title: &str) -> NewPlace {
    NewPlace::new(title, 120.0, 48.8566, 2.3522).with_description("Close to everything")
}

pub fn review_draft(text: &str, rating: i32) -> NewReview {
    NewReview::new(text, rating)
}

// ---------------------------------------------------------------------------
// Fully formed entities, for repository-level tests
// ---------------------------------------------------------------------------

/// A user record with a placeholder hash
pub fn sample_user(first_name: &str, email: &str) -> User {
    User::new(user_draft(first_name, email), "$argon2id$placeholder".to_string())
}

pub fn sample_place(title: &str, owner_id: Uuid, price: f64) -> Place {
    Place::from_draft(NewPlace {
        price,
        owner_id: Some(owner_id),
        owner_first_name: Some("Owner".to_string()),
        ..place_draft(title)
    })
    .expect("stamped place draft")
}

pub fn sample_review(place_id: Uuid, user_id: Uuid, rating: i32) -> Review {
    Review::from_draft(NewReview {
        place_id: Some(place_id),
        place_name: Some("Somewhere".to_string()),
        user_id: Some(user_id),
        user_first_name: Some("Someone".to_string()),
        ..review_draft("Fine", rating)
    })
    .expect("stamped review draft")
}

pub fn sample_amenity(name: &str) -> Amenity {
    Amenity::new(NewAmenity::new(name))
}

/// A user created through the facade, with a place holding one review by
/// a second user
pub struct Neighbourhood {
    pub owner: User,
    pub guest: User,
    pub place: Place,
    pub review: Review,
}

pub async fn neighbourhood(hbnb: &Hbnb) -> Neighbourhood {
    let owner = hbnb
        .users
        .create_user(user_draft("Johnny", "johnny@rock.io"))
        .await
        .unwrap();
    let guest = hbnb
        .users
        .create_user(user_draft("Ada", "ada@calc.io"))
        .await
        .unwrap();
    let place = hbnb
        .relations
        .create_place_for_user(&owner.id, place_draft("Chez Johnny"))
        .await
        .unwrap();
    let review = hbnb
        .relations
        .create_review_for_place(&place.id, &guest.id, review_draft("Loved it", 5))
        .await
        .unwrap();

    Neighbourhood {
        owner,
        guest,
        place,
        review,
    }
}

// ---------------------------------------------------------------------------
// Repository wrappers
// ---------------------------------------------------------------------------

/// Delegates to `inner`, except that every `add` fails with a storage error
pub struct FailingAdds<T: Entity> {
    inner: Arc<dyn Repository<T>>,
}

impl<T: Entity> FailingAdds<T> {
    pub fn wrap(inner: Arc<dyn Repository<T>>) -> Arc<dyn Repository<T>> {
        Arc::new(Self { inner })
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for FailingAdds<T> {
    async fn add(&self, _entity: T) -> Result<T> {
        Err(HbnbError::Storage("disk full".to_string()))
    }

    async fn get(&self, id: &Uuid) -> Result<Option<T>> {
        self.inner.get(id).await
    }

    async fn get_all(&self) -> Result<Vec<T>> {
        self.inner.get_all().await
    }

    async fn get_by_attribute(&self, name: &str, value: &FieldValue) -> Result<Vec<T>> {
        self.inner.get_by_attribute(name, value).await
    }

    async fn update(&self, id: &Uuid, fields: &Patch) -> Result<T> {
        self.inner.update(id, fields).await
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        self.inner.delete(id).await
    }
}

/// Place repository that, once armed, creates one more place for a user
/// through the relation manager right before its next `delete`
pub struct PlaceCreatedOnDelete {
    inner: Arc<dyn Repository<Place>>,
    armed: Mutex<Option<(RelationManager, Uuid)>>,
}

impl PlaceCreatedOnDelete {
    pub fn new(inner: Arc<dyn Repository<Place>>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            armed: Mutex::new(None),
        })
    }

    pub fn arm(&self, relations: RelationManager, owner_id: Uuid) {
        *self.armed.lock().unwrap() = Some((relations, owner_id));
    }
}

#[async_trait]
impl Repository<Place> for PlaceCreatedOnDelete {
    async fn add(&self, entity: Place) -> Result<Place> {
        self.inner.add(entity).await
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Place>> {
        self.inner.get(id).await
    }

    async fn get_all(&self) -> Result<Vec<Place>> {
        self.inner.get_all().await
    }

    async fn get_by_attribute(&self, name: &str, value: &FieldValue) -> Result<Vec<Place>> {
        self.inner.get_by_attribute(name, value).await
    }

    async fn update(&self, id: &Uuid, fields: &Patch) -> Result<Place> {
        self.inner.update(id, fields).await
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        let armed = self.armed.lock().unwrap().take();
        if let Some((relations, owner_id)) = armed {
            relations
                .create_place_for_user(&owner_id, place_draft("Late arrival"))
                .await?;
        }
        self.inner.delete(id).await
    }
}
