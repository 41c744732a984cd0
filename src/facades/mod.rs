//! Per-entity facades
//!
//! A facade wraps one repository and adds domain validation before
//! delegating. Facades never cascade: deleting a user through
//! [`UserFacade::delete_user`] leaves its places behind. Cascading deletes
//! go through [`RelationManager`](crate::relations::RelationManager).

pub mod amenity;
pub mod place;
pub mod review;
pub mod user;

pub use amenity::AmenityFacade;
pub use place::PlaceFacade;
pub use review::ReviewFacade;
pub use user::UserFacade;

use crate::core::patch::{PROTECTED_FIELDS, Patch, ensure_absent, merge_fields};
use crate::core::{Entity, HbnbError, Repository, Result};
use uuid::Uuid;

/// Load `id` or fail with `NotFound`
pub(crate) async fn fetch<T: Entity>(repo: &dyn Repository<T>, id: &Uuid) -> Result<T> {
    repo.get(id)
        .await?
        .ok_or_else(|| HbnbError::not_found(T::resource_name_singular(), id))
}

/// Merge `patch` into `id`, re-validate the result, then persist.
///
/// `managed` lists fields that only the relation manager may change.
/// Nothing is written when validation fails.
pub(crate) async fn validated_update<T: Entity>(
    repo: &dyn Repository<T>,
    id: &Uuid,
    patch: &Patch,
    managed: &[&str],
    check: impl Fn(&T) -> Result<()>,
) -> Result<T> {
    ensure_absent(patch, PROTECTED_FIELDS)?;
    ensure_absent(patch, managed)?;

    let current = fetch(repo, id).await?;
    let candidate = merge_fields(&current, patch)?;
    check(&candidate)?;

    let updated = repo.update(id, patch).await?;
    tracing::debug!(id = %id, fields = ?patch.keys().collect::<Vec<_>>(), "{} updated", T::resource_name_singular());
    Ok(updated)
}
