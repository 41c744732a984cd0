//! Partial field updates
//!
//! A [`Patch`] is a set of field/value pairs merged into the serialized form of
//! an entity. Repositories apply patches through [`merge_fields`], which refuses
//! to touch the identity and timestamp fields and refreshes `updated_at`.

use crate::core::Entity;
use crate::core::error::{HbnbError, Result};
use serde_json::{Map, Value};

/// Field/value pairs to merge into a stored entity
pub type Patch = Map<String, Value>;

/// Fields no patch may set directly
pub const PROTECTED_FIELDS: &[&str] = &["id", "type", "created_at", "updated_at"];

/// Build a patch from a JSON object literal.
///
/// Non-object values produce an empty patch.
pub fn patch_from(value: Value) -> Patch {
    match value {
        Value::Object(map) => map,
        _ => Patch::new(),
    }
}

/// Reject patches touching any of `forbidden`
pub fn ensure_absent(patch: &Patch, forbidden: &[&str]) -> Result<()> {
    if let Some(field) = forbidden.iter().find(|f| patch.contains_key(**f)) {
        return Err(HbnbError::invalid(
            *field,
            format!("'{}' cannot be modified through an update", field),
        ));
    }
    Ok(())
}

/// Merge `patch` into `entity`, returning the updated copy.
///
/// Unknown fields are rejected, as are values the entity cannot deserialize.
pub fn merge_fields<T: Entity>(entity: &T, patch: &Patch) -> Result<T> {
    ensure_absent(patch, PROTECTED_FIELDS)?;

    let Value::Object(mut current) = serde_json::to_value(entity)? else {
        return Err(HbnbError::Storage(format!(
            "{} does not serialize to an object",
            T::resource_name_singular()
        )));
    };

    for (field, value) in patch {
        if !current.contains_key(field) {
            return Err(HbnbError::invalid(
                field.as_str(),
                format!("unknown {} field", T::resource_name_singular()),
            ));
        }
        current.insert(field.clone(), value.clone());
    }

    let mut merged: T = serde_json::from_value(Value::Object(current))
        .map_err(|e| HbnbError::invalid("patch", e.to_string()))?;
    merged.touch();
    Ok(merged)
}
