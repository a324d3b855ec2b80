pub mod physics;
pub mod transform;
