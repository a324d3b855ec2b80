//! Rein 2D
//!
//! 2D collision detection and rigid body resolution on top of hecs.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **geometry** - Value types (ranges, rectangles, segments, polygons)
//! 2. **physics** - Shapes, separating-axis tests, contact manifolds, the
//!    solver and the fixed-timestep [`PhysicsWorld`]
//! 3. **ecs** - hecs components and entity/body binding helpers
//!
//! ```no_run
//! use rein2d::ecs::{bridge, Collider, RigidBody};
//! use rein2d::physics::IgnoreCollisions;
//! use rein2d::{glam::Vec2, BitTag, PhysicsWorld, Shape};
//!
//! const PLAYER: BitTag = BitTag::bit(0);
//! const WALL: BitTag = BitTag::bit(1);
//!
//! # fn main() -> rein2d::Result<()> {
//! let mut world = hecs::World::new();
//! let mut physics = PhysicsWorld::default();
//! physics.register_tag(PLAYER, "Player")?;
//! physics.register_tag(WALL, "Wall")?;
//! physics.register_collision(PLAYER, WALL)?;
//!
//! bridge::spawn_body(
//!     &mut world,
//!     &mut physics,
//!     Vec2::new(40.0, 0.0),
//!     RigidBody::new_static(),
//!     Collider::new(Shape::rectangle(Vec2::new(8.0, 64.0)), WALL),
//! )?;
//! bridge::spawn_body(
//!     &mut world,
//!     &mut physics,
//!     Vec2::ZERO,
//!     RigidBody::new_dynamic(1.0).with_velocity(Vec2::new(120.0, 0.0)),
//!     Collider::new(Shape::rectangle(Vec2::splat(8.0)), PLAYER).with_movement(WALL),
//! )?;
//!
//! physics.step(&mut world, 1.0 / 60.0, &mut IgnoreCollisions);
//! # Ok(())
//! # }
//! ```

pub mod ecs;
pub mod error;
pub mod geometry;
pub mod physics;

pub use error::{PhysicsError, Result};

pub use physics::collider::Shape;
pub use physics::contact::{Contact, Manifold};
pub use physics::tags::{BitTag, TagDomain};
pub use physics::{PhysicsConfig, PhysicsWorld};

// Re-export glam for convenience
pub use glam;
