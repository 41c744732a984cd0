//! Domain entities: users, places, amenities and reviews

pub mod amenity;
pub mod macros;
pub mod place;
pub mod review;
pub mod user;

pub use amenity::{Amenity, NewAmenity};
pub use place::{NewPlace, Place};
pub use review::{NewReview, Review};
pub use user::{NewUser, PublicUser, User};

fn finite(value: f64) -> Result<(), validator::ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(validator::ValidationError::new("not_finite")
            .with_message("must be a finite number".into()))
    }
}

fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        Err(validator::ValidationError::new("blank").with_message("must not be empty".into()))
    } else {
        Ok(())
    }
}
