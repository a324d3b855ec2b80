//! Manifold impulse resolution and positional correction.
//!
//! Both passes read a [`BodyState`] snapshot per entity, compute on plain
//! values and write the result back.

use glam::Vec2;

use crate::ecs::components::physics::RigidBody;
use crate::ecs::components::transform::Transform2D;

use super::contact::{Contact, Manifold};

/// Penetration allowed before position correction.
pub const PENETRATION_SLOP: f32 = 0.01;
/// Fraction of the remaining penetration removed per correction.
pub const CORRECTION_PERCENT: f32 = 0.2;

/// Snapshot of the body data the solver needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub inverse_mass: f32,
    pub restitution: f32,
}

impl BodyState {
    pub fn new(position: Vec2, velocity: Vec2, inverse_mass: f32, restitution: f32) -> Self {
        Self {
            position,
            velocity,
            inverse_mass,
            restitution,
        }
    }

    fn read(world: &hecs::World, entity: hecs::Entity) -> Option<Self> {
        let mut query = world
            .query_one::<(&Transform2D, &RigidBody)>(entity)
            .ok()?;
        let (transform, rb) = query.get()?;
        Some(Self {
            position: transform.position,
            velocity: rb.velocity,
            inverse_mass: rb.inverse_mass,
            restitution: rb.material.restitution,
        })
    }

    fn write_velocity(&self, world: &mut hecs::World, entity: hecs::Entity) {
        if let Ok(mut rb) = world.get::<&mut RigidBody>(entity) {
            rb.velocity = self.velocity;
        }
    }

    fn write_position(&self, world: &mut hecs::World, entity: hecs::Entity) {
        if let Ok(mut transform) = world.get::<&mut Transform2D>(entity) {
            transform.position = self.position;
        }
    }
}

/// Apply a restitution impulse along `contact.normal`, which points from `a`
/// to `b`. Returns false when the bodies are already separating or both are
/// immovable.
pub fn resolve_impulse(a: &mut BodyState, b: &mut BodyState, contact: &Contact) -> bool {
    let inv_mass_sum = a.inverse_mass + b.inverse_mass;
    if inv_mass_sum <= 0.0 {
        return false;
    }
    let normal = contact.normal;
    let velocity_along_normal = (b.velocity - a.velocity).dot(normal);
    if velocity_along_normal > 0.0 {
        return false;
    }

    let restitution = a.restitution.min(b.restitution);
    let j = -(1.0 + restitution) * velocity_along_normal / inv_mass_sum;
    let impulse = normal * j;
    a.velocity -= impulse * a.inverse_mass;
    b.velocity += impulse * b.inverse_mass;
    true
}

/// Push the bodies apart by `percent` of the penetration beyond `slop`,
/// split by inverse mass.
pub fn correct_positions(
    a: &mut BodyState,
    b: &mut BodyState,
    contact: &Contact,
    slop: f32,
    percent: f32,
) {
    let inv_mass_sum = a.inverse_mass + b.inverse_mass;
    if inv_mass_sum <= 0.0 {
        return;
    }
    let correction =
        contact.normal * ((contact.penetration - slop).max(0.0) / inv_mass_sum * percent);
    a.position -= correction * a.inverse_mass;
    b.position += correction * b.inverse_mass;
}

/// Resolve a manifold's impulse using its shallowest contact.
pub fn impulse_resolution(world: &mut hecs::World, manifold: &Manifold) -> bool {
    let Some(contact) = manifold.shallowest() else {
        return false;
    };
    let (Some(mut a), Some(mut b)) = (
        BodyState::read(world, manifold.entity_a),
        BodyState::read(world, manifold.entity_b),
    ) else {
        return false;
    };
    if !resolve_impulse(&mut a, &mut b, contact) {
        return false;
    }
    a.write_velocity(world, manifold.entity_a);
    b.write_velocity(world, manifold.entity_b);
    true
}

/// Correct positions for a manifold using its deepest contact.
pub fn position_correction(world: &mut hecs::World, manifold: &Manifold, slop: f32, percent: f32) {
    let Some(contact) = manifold.deepest() else {
        return;
    };
    let (Some(mut a), Some(mut b)) = (
        BodyState::read(world, manifold.entity_a),
        BodyState::read(world, manifold.entity_b),
    ) else {
        return;
    };
    correct_positions(&mut a, &mut b, contact, slop, percent);
    a.write_position(world, manifold.entity_a);
    b.write_position(world, manifold.entity_b);
}
