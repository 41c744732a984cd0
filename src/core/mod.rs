//! Core module containing fundamental traits and types of the crate

pub mod auth;
pub mod entity;
pub mod error;
pub mod field;
pub mod patch;
pub mod refs;
pub mod repository;

pub use auth::{Argon2Hasher, PasswordHasher};
pub use entity::Entity;
pub use error::{FieldError, HbnbError, Result, ValidationError};
pub use field::FieldValue;
pub use patch::{Patch, patch_from};
pub use refs::{IdList, NameSet};
pub use repository::Repository;
