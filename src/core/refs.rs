//! Back-reference containers
//!
//! Parents keep ordered lists of child ids (`User::places`, `Place::reviews`)
//! and a set of amenity names (`Place::amenities`). The mutating helpers are
//! crate-private so that only the relation manager splices these lists.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ordered sequence of child ids without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdList(Vec<Uuid>);

impl IdList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Uuid> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Uuid] {
        &self.0
    }

    /// Append `id` unless already present. Returns whether it was appended.
    pub(crate) fn push_unique(&mut self, id: Uuid) -> bool {
        if self.0.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    /// Remove `id`, keeping the order of the others. Returns whether it was present.
    pub(crate) fn remove(&mut self, id: &Uuid) -> bool {
        let before = self.0.len();
        self.0.retain(|existing| existing != id);
        self.0.len() != before
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}

impl<'a> IntoIterator for &'a IdList {
    type Item = &'a Uuid;
    type IntoIter = std::slice::Iter<'a, Uuid>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Insertion-ordered set of amenity names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameSet(Vec<String>);

impl NameSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|existing| existing == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Insert `name`. Returns `false` (and leaves the set untouched) if present.
    pub(crate) fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.0.push(name);
        true
    }

    pub(crate) fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|existing| existing != name);
        self.0.len() != before
    }
}
