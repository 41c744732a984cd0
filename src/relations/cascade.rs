//! Outcome of a cascading delete

use crate::core::HbnbError;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Entity kinds a cascade can reach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Place,
    Review,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::User => "user",
            EntityKind::Place => "place",
            EntityKind::Review => "review",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedEntity {
    pub kind: EntityKind,
    pub id: Uuid,
}

/// A step of the cascade that failed and was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeFailure {
    pub kind: EntityKind,
    pub id: Uuid,
    pub reason: String,
}

/// What a cascading delete removed, and what it had to skip
///
/// A report is only returned once the root entity is gone; skipped steps may
/// leave orphaned children behind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub deleted: Vec<DeletedEntity>,
    pub failures: Vec<CascadeFailure>,
}

impl CascadeReport {
    /// `true` when no step was skipped
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Ids of deleted entities of `kind`, in deletion order
    pub fn deleted_ids(&self, kind: EntityKind) -> Vec<Uuid> {
        self.deleted
            .iter()
            .filter(|d| d.kind == kind)
            .map(|d| d.id)
            .collect()
    }

    pub(crate) fn record_deleted(&mut self, kind: EntityKind, id: Uuid) {
        self.deleted.push(DeletedEntity { kind, id });
    }

    pub(crate) fn record_failure(&mut self, kind: EntityKind, id: Uuid, error: &HbnbError) {
        tracing::warn!(%kind, %id, error = %error, "cascade step skipped");
        self.failures.push(CascadeFailure {
            kind,
            id,
            reason: error.to_string(),
        });
    }

    pub(crate) fn absorb(&mut self, other: CascadeReport) {
        self.deleted.extend(other.deleted);
        self.failures.extend(other.failures);
    }
}
