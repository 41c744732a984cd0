//! Cross-entity operations
//!
//! [`RelationManager`] keeps the back-reference lists (`User::places`,
//! `Place::reviews`, `Place::amenities`) and the denormalized name copies
//! consistent with the records they point at. It owns no state besides the
//! per-entity lock registry; everything lives in the facades' repositories.
//!
//! Creation and attachment paths abort on the first error and leave nothing
//! behind. Cascading deletes are best-effort: a failed child step is recorded
//! in the returned [`CascadeReport`] and the root entity is deleted anyway.
//! Parent lists are always updated before the child record is deleted.

pub mod cascade;
pub mod locks;

pub use cascade::{CascadeFailure, CascadeReport, DeletedEntity, EntityKind};
pub use locks::EntityLocks;

use crate::core::patch::Patch;
use crate::core::{Entity, HbnbError, Repository, Result};
use crate::entities::amenity::normalize_name;
use crate::entities::{Amenity, NewAmenity, NewPlace, NewReview, Place, Review};
use crate::facades::{AmenityFacade, PlaceFacade, ReviewFacade, UserFacade};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Write one list field of `id`
async fn save_list<T: Entity>(
    repo: &dyn Repository<T>,
    id: &Uuid,
    field: &str,
    list: &impl Serialize,
) -> Result<T> {
    let mut patch = Patch::new();
    patch.insert(field.to_string(), serde_json::to_value(list)?);
    repo.update(id, &patch).await
}

#[derive(Clone)]
pub struct RelationManager {
    users: UserFacade,
    places: PlaceFacade,
    amenities: AmenityFacade,
    reviews: ReviewFacade,
    locks: Arc<EntityLocks>,
}

impl RelationManager {
    pub fn new(
        users: UserFacade,
        places: PlaceFacade,
        amenities: AmenityFacade,
        reviews: ReviewFacade,
    ) -> Self {
        Self {
            users,
            places,
            amenities,
            reviews,
            locks: Arc::new(EntityLocks::new()),
        }
    }

    // -----------------------------------------------------------------------
    // Places under users
    // -----------------------------------------------------------------------

    /// Create a place owned by `user_id` and append it to the user's list.
    ///
    /// `owner_id` and `owner_first_name` are taken from the user record,
    /// whatever the draft says.
    pub async fn create_place_for_user(&self, user_id: &Uuid, draft: NewPlace) -> Result<Place> {
        let user = self.users.get_user(user_id).await?;

        let draft = NewPlace {
            owner_id: Some(user.id),
            owner_first_name: Some(user.first_name.clone()),
            ..draft
        };
        let place = self.places.create_place(draft).await?;

        if let Err(e) = self.attach_place(user_id, &place.id).await {
            self.roll_back(EntityKind::Place, &place.id).await;
            return Err(e);
        }

        tracing::debug!(place_id = %place.id, user_id = %user_id, "place created for user");
        Ok(place)
    }

    async fn attach_place(&self, user_id: &Uuid, place_id: &Uuid) -> Result<()> {
        let _guard = self.locks.lock(user_id).await;
        let users = self.users.repository();

        let mut user = users
            .get(user_id)
            .await?
            .ok_or_else(|| HbnbError::not_found("user", user_id))?;
        if user.places.push_unique(*place_id) {
            save_list(users, user_id, "places", &user.places).await?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Amenities on places
    // -----------------------------------------------------------------------

    /// Attach the amenity name to the place, creating the canonical amenity
    /// the first time the name is used anywhere.
    ///
    /// Attaching a name the place already has is a `Conflict`.
    pub async fn add_amenity_to_a_place(
        &self,
        place_id: &Uuid,
        draft: NewAmenity,
    ) -> Result<Amenity> {
        let candidate = Amenity::new(draft);
        {
            let _guard = self.locks.lock(place_id).await;
            let places = self.places.repository();

            let mut place = places
                .get(place_id)
                .await?
                .ok_or_else(|| HbnbError::not_found("place", place_id))?;
            candidate.check()?;

            if !place.amenities.insert(candidate.name.clone()) {
                return Err(HbnbError::conflict(format!(
                    "amenity '{}' is already attached to place {}",
                    candidate.name, place_id
                )));
            }
            save_list(places, place_id, "amenities", &place.amenities).await?;
        }

        tracing::debug!(place_id = %place_id, amenity = %candidate.name, "amenity attached");

        match self.canonical_amenity(&candidate.name).await {
            Ok(amenity) => Ok(amenity),
            Err(e) => {
                self.unattach_amenity(place_id, &candidate.name).await;
                Err(e)
            }
        }
    }

    /// The amenity record named `name`, created if no place used it before
    async fn canonical_amenity(&self, name: &str) -> Result<Amenity> {
        if let Some(existing) = self.amenities.find_by_name(name).await? {
            return Ok(existing);
        }
        match self.amenities.create_amenity(NewAmenity::new(name)).await {
            Ok(amenity) => Ok(amenity),
            // Lost a race with a concurrent first attachment of the same name
            Err(e) => match self.amenities.find_by_name(name).await? {
                Some(existing) => Ok(existing),
                None => Err(e),
            },
        }
    }

    /// Undo an attachment whose canonical amenity could not be resolved
    async fn unattach_amenity(&self, place_id: &Uuid, name: &str) {
        let _guard = self.locks.lock(place_id).await;
        let places = self.places.repository();

        let result = match places.get(place_id).await {
            Ok(Some(mut place)) => {
                if place.amenities.remove(name) {
                    save_list(places, place_id, "amenities", &place.amenities)
                        .await
                        .map(|_| ())
                } else {
                    Ok(())
                }
            }
            Ok(None) => Ok(()),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            tracing::warn!(place_id = %place_id, amenity = %name, error = %e, "rollback failed, amenity name left on place");
        }
    }

    /// Detach `amenity_name` from the place. The canonical amenity stays.
    pub async fn delete_amenity_from_place_list(
        &self,
        amenity_name: &str,
        place_id: &Uuid,
    ) -> Result<()> {
        let name = normalize_name(amenity_name);
        let _guard = self.locks.lock(place_id).await;
        let places = self.places.repository();

        let mut place = places
            .get(place_id)
            .await?
            .ok_or_else(|| HbnbError::not_found("place", place_id))?;
        if !place.amenities.remove(&name) {
            return Err(HbnbError::not_found("amenity", name));
        }
        save_list(places, place_id, "amenities", &place.amenities).await?;

        tracing::debug!(place_id = %place_id, amenity = %name, "amenity detached");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reviews on places
    // -----------------------------------------------------------------------

    /// Create a review of `place_id` by `user_id` and append it to the
    /// place's list.
    ///
    /// The place and user fields of the draft are overwritten from the
    /// current records.
    pub async fn create_review_for_place(
        &self,
        place_id: &Uuid,
        user_id: &Uuid,
        draft: NewReview,
    ) -> Result<Review> {
        let place = self.places.get_place(place_id).await?;
        let user = self.users.get_user(user_id).await?;

        let draft = NewReview {
            place_id: Some(place.id),
            place_name: Some(place.title),
            user_id: Some(user.id),
            user_first_name: Some(user.first_name),
            ..draft
        };
        let review = self.reviews.create_review(draft).await?;

        if let Err(e) = self.attach_review(place_id, &review.id).await {
            self.roll_back(EntityKind::Review, &review.id).await;
            return Err(e);
        }

        tracing::debug!(review_id = %review.id, place_id = %place_id, user_id = %user_id, "review created for place");
        Ok(review)
    }

    async fn attach_review(&self, place_id: &Uuid, review_id: &Uuid) -> Result<()> {
        let _guard = self.locks.lock(place_id).await;
        let places = self.places.repository();

        let mut place = places
            .get(place_id)
            .await?
            .ok_or_else(|| HbnbError::not_found("place", place_id))?;
        if place.reviews.push_unique(*review_id) {
            save_list(places, place_id, "reviews", &place.reviews).await?;
        }
        Ok(())
    }

    /// Remove the review from the place's list, then delete the review.
    ///
    /// A review record that is already gone once the list is updated is
    /// logged and tolerated.
    pub async fn delete_review_from_place_list(
        &self,
        review_id: &Uuid,
        place_id: &Uuid,
    ) -> Result<()> {
        {
            let _guard = self.locks.lock(place_id).await;
            let places = self.places.repository();

            let mut place = places
                .get(place_id)
                .await?
                .ok_or_else(|| HbnbError::not_found("place", place_id))?;
            if !place.reviews.remove(review_id) {
                return Err(HbnbError::not_found("review", review_id));
            }
            save_list(places, place_id, "reviews", &place.reviews).await?;
        }

        match self.reviews.delete_review(review_id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::warn!(review_id = %review_id, place_id = %place_id, "listed review was already deleted");
            }
            Err(e) => return Err(e),
        }

        tracing::debug!(review_id = %review_id, place_id = %place_id, "review removed from place");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Cascading deletes
    // -----------------------------------------------------------------------

    /// Delete a place, its reviews, and its entry in the owner's list.
    ///
    /// Failures on the owner or the reviews are recorded in the report and
    /// skipped. Only a failure to delete the place itself is an error.
    pub async fn delete_place_and_associated_instances(
        &self,
        place_id: &Uuid,
    ) -> Result<CascadeReport> {
        let place = self.places.get_place(place_id).await?;
        let mut report = CascadeReport::default();

        if let Err(e) = self.detach_place(&place.owner_id, place_id).await {
            report.record_failure(EntityKind::User, place.owner_id, &e);
        }

        let _guard = self.locks.lock(place_id).await;
        let places = self.places.repository();

        let mut review_ids = place.reviews;
        match places.get(place_id).await {
            Ok(Some(mut current)) => {
                review_ids = current.reviews.clone();
                current.reviews.clear();
                if !review_ids.is_empty() {
                    if let Err(e) = save_list(places, place_id, "reviews", &current.reviews).await {
                        report.record_failure(EntityKind::Place, *place_id, &e);
                    }
                }
            }
            Ok(None) => {}
            Err(e) => report.record_failure(EntityKind::Place, *place_id, &e),
        }

        for review_id in &review_ids {
            match self.reviews.delete_review(review_id).await {
                Ok(()) => report.record_deleted(EntityKind::Review, *review_id),
                Err(e) => report.record_failure(EntityKind::Review, *review_id, &e),
            }
        }

        self.places.delete_place(place_id).await?;
        self.locks.forget(place_id);
        report.record_deleted(EntityKind::Place, *place_id);

        tracing::debug!(
            place_id = %place_id,
            deleted = report.deleted.len(),
            failures = report.failures.len(),
            "place cascade finished"
        );
        Ok(report)
    }

    /// Remove `place_id` from its owner's list. A missing owner is not an error.
    async fn detach_place(&self, owner_id: &Uuid, place_id: &Uuid) -> Result<()> {
        let _guard = self.locks.lock(owner_id).await;
        let users = self.users.repository();

        match users.get(owner_id).await? {
            Some(mut owner) => {
                if owner.places.remove(place_id) {
                    save_list(users, owner_id, "places", &owner.places).await?;
                }
            }
            None => {
                tracing::warn!(owner_id = %owner_id, place_id = %place_id, "place owner no longer exists");
            }
        }
        Ok(())
    }

    /// Delete a user, every place in its list, and their reviews.
    ///
    /// Places attached while the cascade runs are cascaded too: the user is
    /// only deleted, under its lock, once its list holds nothing that was not
    /// already attempted. Place cascades that fail are recorded in the
    /// report; the user record is deleted regardless. Only a failure to
    /// delete the user itself is an error.
    pub async fn delete_user_and_associated_instances(
        &self,
        user_id: &Uuid,
    ) -> Result<CascadeReport> {
        let mut user = self.users.get_user(user_id).await?;
        let mut report = CascadeReport::default();
        let mut attempted: HashSet<Uuid> = HashSet::new();

        loop {
            let pending: Vec<Uuid> = user
                .places
                .iter()
                .filter(|id| !attempted.contains(*id))
                .copied()
                .collect();

            // Each place cascade locks the user to update its list, so no
            // guard is held across this loop.
            for place_id in pending {
                attempted.insert(place_id);
                match self.delete_place_and_associated_instances(&place_id).await {
                    Ok(nested) => report.absorb(nested),
                    Err(e) => report.record_failure(EntityKind::Place, place_id, &e),
                }
            }

            let guard = self.locks.lock(user_id).await;
            user = self.users.get_user(user_id).await?;
            if user.places.iter().all(|id| attempted.contains(id)) {
                self.users.delete_user(user_id).await?;
                drop(guard);
                break;
            }
            tracing::debug!(user_id = %user_id, "places attached during cascade, continuing");
        }

        self.locks.forget(user_id);
        report.record_deleted(EntityKind::User, *user_id);

        tracing::debug!(
            user_id = %user_id,
            deleted = report.deleted.len(),
            failures = report.failures.len(),
            "user cascade finished"
        );
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Places in the user's list, in list order. Dangling ids are skipped.
    pub async fn get_places_for_user(&self, user_id: &Uuid) -> Result<Vec<Place>> {
        let user = self.users.get_user(user_id).await?;
        let places = self.places.repository();

        let mut found = Vec::with_capacity(user.places.len());
        for place_id in &user.places {
            match places.get(place_id).await? {
                Some(place) => found.push(place),
                None => tracing::debug!(user_id = %user_id, place_id = %place_id, "dangling place id"),
            }
        }
        Ok(found)
    }

    pub async fn get_all_reviews_from_user(&self, user_id: &Uuid) -> Result<Vec<Review>> {
        self.users.get_user(user_id).await?;
        self.reviews.get_reviews_by_user(user_id).await
    }

    /// Reviews in the place's list, in list order. Dangling ids are skipped.
    pub async fn get_all_reviews_from_place(&self, place_id: &Uuid) -> Result<Vec<Review>> {
        let place = self.places.get_place(place_id).await?;
        let reviews = self.reviews.repository();

        let mut found = Vec::with_capacity(place.reviews.len());
        for review_id in &place.reviews {
            match reviews.get(review_id).await? {
                Some(review) => found.push(review),
                None => tracing::debug!(place_id = %place_id, review_id = %review_id, "dangling review id"),
            }
        }
        Ok(found)
    }

    /// Canonical amenity records for the names attached to the place
    pub async fn get_amenities_for_place(&self, place_id: &Uuid) -> Result<Vec<Amenity>> {
        let place = self.places.get_place(place_id).await?;

        let mut found = Vec::with_capacity(place.amenities.len());
        for name in place.amenities.iter() {
            if let Some(amenity) = self.amenities.find_by_name(name).await? {
                found.push(amenity);
            }
        }
        Ok(found)
    }

    /// Undo a creation whose back-reference could not be written
    async fn roll_back(&self, kind: EntityKind, id: &Uuid) {
        let result = match kind {
            EntityKind::Place => self.places.delete_place(id).await,
            EntityKind::Review => self.reviews.delete_review(id).await,
            EntityKind::User => self.users.delete_user(id).await,
        };
        if let Err(e) = result {
            tracing::warn!(%kind, %id, error = %e, "rollback failed, record left without back-reference");
        }
    }
}
