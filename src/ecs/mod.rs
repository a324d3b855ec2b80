//! hecs integration: body components and scene helpers.

pub mod bridge;
pub mod components;

pub use components::physics::{
    Collider, ConstraintHook, Material, Movement, RigidBody, RigidBodyType,
};
pub use components::transform::Transform2D;
