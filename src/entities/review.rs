//! Review entity

use crate::core::{HbnbError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A user's review of a place. `place_name` and `user_first_name` are
/// copied at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Review {
    pub id: Uuid,

    #[serde(rename = "type")]
    pub entity_type: String,

    #[validate(custom(function = "super::not_blank"))]
    #[validate(length(max = 1024, message = "text must not exceed 1024 characters"))]
    pub text: String,

    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,

    pub place_id: Uuid,

    #[validate(length(min = 1, message = "place_name must not be empty"))]
    pub place_name: String,

    pub user_id: Uuid,

    #[validate(length(min = 1, message = "user_first_name must not be empty"))]
    pub user_first_name: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

crate::impl_entity!(Review, "review", "reviews");
crate::impl_checked!(Review);

impl Review {
    /// Build a review from a draft. Place and user fields must be stamped.
    pub fn from_draft(draft: NewReview) -> Result<Self> {
        fn required<T>(value: Option<T>, field: &'static str) -> Result<T> {
            value.ok_or_else(|| HbnbError::invalid(field, format!("{} is required", field)))
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            entity_type: "review".to_string(),
            text: draft.text,
            rating: draft.rating,
            place_id: required(draft.place_id, "place_id")?,
            place_name: required(draft.place_name, "place_name")?,
            user_id: required(draft.user_id, "user_id")?,
            user_first_name: required(draft.user_first_name, "user_first_name")?,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Payload for creating a review
///
/// The place and user fields are stamped by the relation manager; values
/// supplied by callers are overwritten there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
    pub text: String,
    pub rating: i32,
    #[serde(default)]
    pub place_id: Option<Uuid>,
    #[serde(default)]
    pub place_name: Option<String>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub user_first_name: Option<String>,
}

impl NewReview {
    pub fn new(text: impl Into<String>, rating: i32) -> Self {
        Self {
            text: text.into(),
            rating,
            place_id: None,
            place_name: None,
            user_id: None,
            user_first_name: None,
        }
    }
}
