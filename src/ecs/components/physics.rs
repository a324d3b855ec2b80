//! Physics components for ECS entities.

use glam::Vec2;

use crate::physics::collider::Shape;
use crate::physics::rigid_body::Constraint;
use crate::physics::tags::BitTag;

/// Rigid body type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigidBodyType {
    /// Affected by forces and collisions.
    Dynamic,
    /// Never moves, whatever its velocity.
    Static,
    /// Moved by its velocity, but never pushed by impulses.
    Kinematic,
}

/// Surface response properties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Coefficient of restitution (0.0 - 1.0). A pair bounces with the
    /// smaller of the two values.
    pub restitution: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self { restitution: 0.0 }
    }
}

/// Rigid body component.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub body_type: RigidBodyType,
    pub velocity: Vec2,
    pub force: Vec2,
    /// Zero for static and kinematic bodies.
    pub inverse_mass: f32,
    /// Gravity scale (default: 1.0 for dynamic bodies).
    pub gravity_scale: f32,
    pub material: Material,
    /// Sub-pixel displacement carried to the next step.
    pub move_buffer: Vec2,
}

impl RigidBody {
    /// Create a new dynamic rigid body with the given mass. A non-positive
    /// mass gives an immovable body.
    pub fn new_dynamic(mass: f32) -> Self {
        Self {
            body_type: RigidBodyType::Dynamic,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            inverse_mass: if mass > 0.0 { 1.0 / mass } else { 0.0 },
            gravity_scale: 1.0,
            material: Material::default(),
            move_buffer: Vec2::ZERO,
        }
    }

    /// Create a new static rigid body.
    pub fn new_static() -> Self {
        Self {
            body_type: RigidBodyType::Static,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            inverse_mass: 0.0,
            gravity_scale: 0.0,
            material: Material::default(),
            move_buffer: Vec2::ZERO,
        }
    }

    /// Create a new kinematic rigid body.
    pub fn new_kinematic() -> Self {
        Self {
            body_type: RigidBodyType::Kinematic,
            ..Self::new_static()
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.material.restitution = restitution;
        self
    }

    pub fn with_gravity_scale(mut self, gravity_scale: f32) -> Self {
        self.gravity_scale = gravity_scale;
        self
    }

    /// Mass, infinite for immovable bodies.
    pub fn mass(&self) -> f32 {
        if self.inverse_mass > 0.0 {
            1.0 / self.inverse_mass
        } else {
            f32::INFINITY
        }
    }

    /// Accumulate a force, cleared after the next integration.
    pub fn apply_force(&mut self, force: Vec2) {
        self.force += force;
    }

    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.velocity += impulse * self.inverse_mass;
    }
}

/// Swept-movement settings. Bodies without one never move and do not
/// integrate forces or gravity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Movement {
    /// Tags that block this body's movement.
    pub collision_tags: BitTag,
}

/// Collision detection component.
#[derive(Debug, Clone)]
pub struct Collider {
    pub shape: Shape,
    /// The body's own categories.
    pub tags: BitTag,
    pub movement: Option<Movement>,
}

impl Collider {
    pub fn new(shape: impl Into<Shape>, tags: BitTag) -> Self {
        Self {
            shape: shape.into(),
            tags,
            movement: None,
        }
    }

    /// Enable swept movement, blocked by bodies carrying `collision_tags`.
    pub fn with_movement(mut self, collision_tags: BitTag) -> Self {
        self.movement = Some(Movement { collision_tags });
        self
    }

    pub fn collision_tags(&self) -> BitTag {
        self.movement.map_or(BitTag::NONE, |m| m.collision_tags)
    }
}

/// Per-body constraint run before movement on every fixed step.
pub struct ConstraintHook(pub Box<dyn Constraint + Send + Sync>);

impl ConstraintHook {
    pub fn new(constraint: impl Constraint + Send + Sync + 'static) -> Self {
        Self(Box::new(constraint))
    }
}

impl std::fmt::Debug for ConstraintHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintHook").finish_non_exhaustive()
    }
}
