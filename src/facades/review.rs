use crate::core::patch::Patch;
use crate::core::{FieldValue, Repository, Result};
use crate::entities::{NewReview, Review};
use std::sync::Arc;
use uuid::Uuid;

use super::{fetch, validated_update};

/// Fields only the relation manager may change
const MANAGED_FIELDS: &[&str] = &["place_id", "place_name", "user_id", "user_first_name"];

#[derive(Clone)]
pub struct ReviewFacade {
    repo: Arc<dyn Repository<Review>>,
}

impl ReviewFacade {
    pub fn new(repo: Arc<dyn Repository<Review>>) -> Self {
        Self { repo }
    }

    pub(crate) fn repository(&self) -> &dyn Repository<Review> {
        self.repo.as_ref()
    }

    /// Validate and persist a review whose place and user fields are stamped
    pub async fn create_review(&self, draft: NewReview) -> Result<Review> {
        let review = Review::from_draft(draft)?;
        review.check()?;

        let review = self.repo.add(review).await?;
        tracing::debug!(id = %review.id, place = %review.place_id, "review created");
        Ok(review)
    }

    pub async fn get_review(&self, id: &Uuid) -> Result<Review> {
        fetch(self.repository(), id).await
    }

    pub async fn get_all_reviews(&self) -> Result<Vec<Review>> {
        self.repo.get_all().await
    }

    /// Reviews written by `user_id`
    pub async fn get_reviews_by_user(&self, user_id: &Uuid) -> Result<Vec<Review>> {
        self.repo
            .get_by_attribute("user_id", &FieldValue::Uuid(*user_id))
            .await
    }

    pub async fn update_review(&self, id: &Uuid, patch: Patch) -> Result<Review> {
        validated_update(self.repository(), id, &patch, MANAGED_FIELDS, Review::check).await
    }

    /// Delete the review record only; the place's list keeps the id
    pub async fn delete_review(&self, id: &Uuid) -> Result<()> {
        self.repo.delete(id).await?;
        tracing::debug!(id = %id, "review deleted");
        Ok(())
    }
}
