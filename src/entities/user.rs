//! User entity

use crate::core::IdList;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A registered user. `password` always holds a hash, never plaintext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct User {
    pub id: Uuid,

    #[serde(rename = "type")]
    pub entity_type: String,

    #[validate(length(min = 1, max = 50, message = "first_name must be 1 to 50 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 50, message = "last_name must be 1 to 50 characters"))]
    pub last_name: String,

    #[validate(email(message = "email must be a valid address"))]
    pub email: String,

    #[validate(length(min = 1, message = "password hash missing"))]
    pub password: String,

    pub is_admin: bool,

    /// Places owned by this user, in creation order
    pub places: IdList,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

crate::impl_entity!(User, "user", "users");
crate::impl_checked!(User);

impl User {
    /// Build a user from a draft and an already-hashed password
    pub fn new(draft: NewUser, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            entity_type: "user".to_string(),
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            password: password_hash,
            is_admin: draft.is_admin,
            places: IdList::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Masked view safe to hand to external callers
    pub fn public(&self) -> PublicUser {
        PublicUser::from(self)
    }
}

/// Payload for creating a user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,

    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,

    #[serde(default)]
    pub is_admin: bool,
}

impl NewUser {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            password: password.into(),
            is_admin: false,
        }
    }
}

/// User snapshot without the password hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
    pub places: IdList,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            entity_type: user.entity_type.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            places: user.places.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
