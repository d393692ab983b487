//! Stable identifiers for scene objects and components.
//!
//! All parent/child/owner relations in the scene are id-based lookups,
//! never owning references, so the tree-with-back-references shape of the
//! data model cannot create ownership cycles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a game object within a [`Scene`](crate::Scene).
///
/// Ids are allocated by the scene and never reused within one scene's
/// lifetime. Snapshots carry source ids so that a restored subtree (e.g.
/// undo of a delete) keeps the identities the history refers to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u64);

impl ObjectId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric form, used for linked-id stamping and log output.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a component attached to a game object.
///
/// Unique across the whole scene, not just within the owning object.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(u64);

impl ComponentId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({})", self.0)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c#{}", self.0)
    }
}
