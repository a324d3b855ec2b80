//! Error type for contract violations in the physics core.
//!
//! Geometric degeneracies never produce errors; they degrade to "no contact".

use crate::physics::tags::BitTag;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PhysicsError>;

/// Misuse of the physics API. Each variant indicates a mis-wired scene.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhysicsError {
    #[error("the None tag cannot take part in collision registration")]
    NoneTag,
    #[error("tag {0:?} has not been registered")]
    UnregisteredTag(BitTag),
    #[error("tag {tag:?} is already registered as `{existing}`")]
    DuplicateTag { tag: BitTag, existing: &'static str },
    #[error("tag `{name}` has bits {bits:#x}, expected a single power of two")]
    InvalidTagBits { name: &'static str, bits: u64 },
    #[error("tag domain `{0}` is already registered")]
    DuplicateDomain(&'static str),
    #[error("polygon needs at least 3 vertices, got {0}")]
    DegeneratePolygon(usize),
    #[error("expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("tile id {0} has no polygon definition")]
    UnknownTile(u32),
    #[error("cell ({column}, {row}) is outside the grid")]
    CellOutOfBounds { column: usize, row: usize },
    #[error("entity {0:?} is missing the `{1}` component")]
    MissingComponent(hecs::Entity, &'static str),
    #[error("entity {0:?} does not exist")]
    NoSuchEntity(hecs::Entity),
}
