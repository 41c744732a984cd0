//! Amenity entity
//!
//! Amenities are a shared vocabulary: places refer to them by name, and a
//! canonical record is created lazily the first time a name is attached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Maximum amenity name length, counted after trimming
pub const MAX_NAME_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Amenity {
    pub id: Uuid,

    #[serde(rename = "type")]
    pub entity_type: String,

    #[validate(custom(function = "validate_name"))]
    pub name: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

crate::impl_entity!(Amenity, "amenity", "amenities");
crate::impl_checked!(Amenity);

impl Amenity {
    pub fn new(draft: NewAmenity) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            entity_type: "amenity".to_string(),
            name: normalize_name(&draft.name),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Payload for creating (or attaching) an amenity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAmenity {
    pub name: String,
}

impl NewAmenity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Canonical form of an amenity name
pub fn normalize_name(name: &str) -> String {
    name.trim().to_string()
}

fn validate_name(name: &str) -> Result<(), validator::ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(validator::ValidationError::new("empty")
            .with_message("name must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(validator::ValidationError::new("too_long")
            .with_message(format!("name must not exceed {} characters", MAX_NAME_LEN).into()));
    }
    Ok(())
}
