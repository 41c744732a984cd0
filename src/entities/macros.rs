//! Macros for reducing boilerplate when defining entities

/// Implement [`Entity`](crate::core::Entity) for a struct carrying the base
/// fields `id`, `created_at` and `updated_at`.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Amenity {
///     pub id: Uuid,
///     pub created_at: DateTime<Utc>,
///     pub updated_at: DateTime<Utc>,
///     pub name: String,
/// }
///
/// impl_entity!(Amenity, "amenity", "amenities");
/// ```
#[macro_export]
macro_rules! impl_entity {
    ($type:ident, $singular:expr, $plural:expr) => {
        impl $crate::core::entity::Entity for $type {
            fn resource_name() -> &'static str {
                $plural
            }

            fn resource_name_singular() -> &'static str {
                $singular
            }

            fn id(&self) -> ::uuid::Uuid {
                self.id
            }

            fn created_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.created_at
            }

            fn updated_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.updated_at
            }

            fn touch(&mut self) {
                self.updated_at = $crate::core::entity::next_timestamp(self.created_at);
            }
        }
    };
}

/// Validate an entity with its `validator` derive, mapping failures into
/// [`HbnbError::Validation`](crate::core::HbnbError).
#[macro_export]
macro_rules! impl_checked {
    ($type:ident) => {
        impl $type {
            /// Run every field constraint of this entity
            pub fn check(&self) -> $crate::core::Result<()> {
                ::validator::Validate::validate(self)?;
                Ok(())
            }
        }
    };
}
