//! Entity types reported by the engine.
//!
//! These mirror the records an engine serializes into a snapshot.
//! Both engine and view must agree on these definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Simulation-side entity identity. Unique within one snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Returns the raw identity.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Payload of a `Tree` entity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeInfo {
    /// Top-left position in simulation space.
    pub position: (f64, f64),
    /// Engine-side size. Always finite and positive once decoded.
    pub size: f64,
}

impl TreeInfo {
    /// Creates a tree payload.
    #[must_use]
    pub const fn new(x: f64, y: f64, size: f64) -> Self {
        Self {
            position: (x, y),
            size,
        }
    }
}

/// Recognized entity variants.
///
/// Serialized externally tagged, i.e. `{"Tree": {"position": [x, y], "size": s}}`.
/// Variants the view does not know are classified during snapshot decoding
/// and never reach this enum.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ObjectInfo {
    /// A positioned, sized tree.
    Tree(TreeInfo),
}

impl ObjectInfo {
    /// Tag used on the wire for this variant.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Tree(_) => "Tree",
        }
    }

    /// Position of the entity.
    #[must_use]
    pub const fn position(&self) -> (f64, f64) {
        match self {
            Self::Tree(tree) => tree.position,
        }
    }

    /// Size of the entity.
    #[must_use]
    pub const fn size(&self) -> f64 {
        match self {
            Self::Tree(tree) => tree.size,
        }
    }
}

/// One entity in a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Identity.
    pub id: EntityId,
    /// Variant payload.
    pub object_info: ObjectInfo,
}

impl Entity {
    /// Creates a tree entity.
    #[must_use]
    pub const fn tree(id: u32, x: f64, y: f64, size: f64) -> Self {
        Self {
            id: EntityId(id),
            object_info: ObjectInfo::Tree(TreeInfo::new(x, y, size)),
        }
    }
}
