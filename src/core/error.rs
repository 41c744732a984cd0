//! Typed error handling for the hbnb core
//!
//! Every core operation returns [`HbnbError`] so that callers can tell a
//! missing record apart from a rejected payload or a broken invariant.
//!
//! # Error Categories
//!
//! - `NotFound`: a referenced id (or name) does not resolve
//! - `Validation`: a field constraint is violated (type, range, emptiness, uniqueness)
//! - `Conflict`: the operation would break a set/list invariant
//! - `DuplicateKey`: a repository already holds a record with that id
//! - `InvalidCredentials`: email/password pair rejected
//! - `Storage` / `Config`: backend or configuration failures
//!
//! # Example
//!
//! ```rust,ignore
//! match relations.create_place_for_user(user_id, draft).await {
//!     Ok(place) => println!("created {}", place.id),
//!     Err(HbnbError::NotFound { entity_type, key }) => {
//!         println!("{} {} does not exist", entity_type, key);
//!     }
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// Result alias used across the crate
pub type Result<T, E = HbnbError> = std::result::Result<T, E>;

/// The main error type of the crate
#[derive(Debug, thiserror::Error)]
pub enum HbnbError {
    /// Referenced record does not resolve
    #[error("{entity_type} '{key}' not found")]
    NotFound {
        entity_type: &'static str,
        key: String,
    },

    /// Field-level constraint violated
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Set/list invariant would be broken
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// Record id already present in the repository
    #[error("{entity_type} with id '{id}' already exists")]
    DuplicateKey {
        entity_type: &'static str,
        id: String,
    },

    /// Email/password pair rejected
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Storage backend failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration failure
    #[error("configuration error: {0}")]
    Config(String),
}

/// Error response body for HTTP layers built on top of the core
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl HbnbError {
    /// Shorthand for a `NotFound` keyed by any displayable value
    pub fn not_found(entity_type: &'static str, key: impl fmt::Display) -> Self {
        HbnbError::NotFound {
            entity_type,
            key: key.to_string(),
        }
    }

    /// Shorthand for a `Conflict`
    pub fn conflict(message: impl Into<String>) -> Self {
        HbnbError::Conflict {
            message: message.into(),
        }
    }

    /// Shorthand for a single-field `Validation` error
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        HbnbError::Validation(ValidationError::field(field, message))
    }

    /// Wrap any backend error as `Storage`
    pub fn storage(err: impl fmt::Display) -> Self {
        HbnbError::Storage(err.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, HbnbError::NotFound { .. })
    }

    /// HTTP status an outer REST layer should answer with
    pub fn status_code(&self) -> StatusCode {
        match self {
            HbnbError::NotFound { .. } => StatusCode::NOT_FOUND,
            HbnbError::Validation(_) => StatusCode::BAD_REQUEST,
            HbnbError::Conflict { .. } => StatusCode::BAD_REQUEST,
            HbnbError::DuplicateKey { .. } => StatusCode::BAD_REQUEST,
            HbnbError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            HbnbError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HbnbError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            HbnbError::NotFound { .. } => "NOT_FOUND",
            HbnbError::Validation(_) => "VALIDATION_ERROR",
            HbnbError::Conflict { .. } => "CONFLICT",
            HbnbError::DuplicateKey { .. } => "DUPLICATE_KEY",
            HbnbError::InvalidCredentials => "INVALID_CREDENTIALS",
            HbnbError::Storage(_) => "STORAGE_ERROR",
            HbnbError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            HbnbError::NotFound { entity_type, key } => Some(serde_json::json!({
                "entity_type": entity_type,
                "key": key,
            })),
            HbnbError::Validation(ValidationError { fields }) => {
                Some(serde_json::json!({ "fields": fields }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for HbnbError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

impl From<serde_json::Error> for HbnbError {
    fn from(err: serde_json::Error) -> Self {
        HbnbError::Storage(format!("serialization failed: {}", err))
    }
}

impl From<std::io::Error> for HbnbError {
    fn from(err: std::io::Error) -> Self {
        HbnbError::Storage(format!("i/o failed: {}", err))
    }
}

impl From<tokio::task::JoinError> for HbnbError {
    fn from(err: tokio::task::JoinError) -> Self {
        HbnbError::Storage(format!("blocking task failed: {}", err))
    }
}

#[cfg(feature = "sqlite")]
impl From<sqlx::Error> for HbnbError {
    fn from(err: sqlx::Error) -> Self {
        HbnbError::Storage(err.to_string())
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// One or more rejected fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldError {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    /// Whether `field` is among the rejected fields
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        for (i, err) in self.fields.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}: {}", sep, err.field, err.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        // field_errors() is backed by a HashMap
        fields.sort_by(|a, b| a.field.cmp(&b.field).then(a.message.cmp(&b.message)));
        Self { fields }
    }
}

impl From<validator::ValidationErrors> for HbnbError {
    fn from(errors: validator::ValidationErrors) -> Self {
        HbnbError::Validation(errors.into())
    }
}
