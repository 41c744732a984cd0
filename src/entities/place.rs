//! Place entity

use crate::core::{HbnbError, IdList, NameSet, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A rentable place owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Place {
    pub id: Uuid,

    #[serde(rename = "type")]
    pub entity_type: String,

    #[validate(length(min = 1, max = 100, message = "title must be 1 to 100 characters"))]
    pub title: String,

    #[validate(length(max = 1024, message = "description must not exceed 1024 characters"))]
    pub description: String,

    #[validate(custom(function = "super::finite"))]
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,

    #[validate(custom(function = "super::finite"))]
    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be within -90 and 90"))]
    pub latitude: f64,

    #[validate(custom(function = "super::finite"))]
    #[validate(range(min = -180.0, max = 180.0, message = "longitude must be within -180 and 180"))]
    pub longitude: f64,

    pub owner_id: Uuid,

    /// Owner's first name at creation time; not kept in sync with renames
    #[validate(length(min = 1, message = "owner_first_name must not be empty"))]
    pub owner_first_name: String,

    /// Names of attached amenities
    pub amenities: NameSet,

    /// Reviews of this place, in creation order
    pub reviews: IdList,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

crate::impl_entity!(Place, "place", "places");
crate::impl_checked!(Place);

impl Place {
    /// Build a place from a draft. The owner fields must be stamped.
    pub fn from_draft(draft: NewPlace) -> Result<Self> {
        let owner_id = draft
            .owner_id
            .ok_or_else(|| HbnbError::invalid("owner_id", "owner_id is required"))?;
        let owner_first_name = draft
            .owner_first_name
            .ok_or_else(|| HbnbError::invalid("owner_first_name", "owner_first_name is required"))?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            entity_type: "place".to_string(),
            title: draft.title,
            description: draft.description,
            price: draft.price,
            latitude: draft.latitude,
            longitude: draft.longitude,
            owner_id,
            owner_first_name,
            amenities: NameSet::new(),
            reviews: IdList::new(),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Payload for creating a place
///
/// `owner_id` and `owner_first_name` are stamped by the relation manager;
/// values supplied by callers are overwritten there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlace {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    #[serde(default)]
    pub owner_first_name: Option<String>,
}

impl NewPlace {
    pub fn new(title: impl Into<String>, price: f64, latitude: f64, longitude: f64) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            price,
            latitude,
            longitude,
            owner_id: None,
            owner_first_name: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
