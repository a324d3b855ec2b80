//! Rigid body integration and per-body constraints.

use glam::Vec2;

use crate::ecs::components::physics::{ConstraintHook, RigidBody};
use crate::ecs::components::transform::Transform2D;
use crate::geometry::Rect;

/// Per-body constraint, relaxed a fixed number of times per step.
///
/// Implementations should converge when applied repeatedly in any order.
pub trait Constraint {
    fn solve(&mut self, transform: &mut Transform2D, body: &mut RigidBody);
}

impl<F> Constraint for F
where
    F: FnMut(&mut Transform2D, &mut RigidBody),
{
    fn solve(&mut self, transform: &mut Transform2D, body: &mut RigidBody) {
        self(transform, body)
    }
}

/// Keeps the body position inside a rectangle and kills velocity into its
/// walls.
#[derive(Debug, Clone, Copy)]
pub struct BoundsConstraint {
    pub bounds: Rect,
}

impl Constraint for BoundsConstraint {
    fn solve(&mut self, transform: &mut Transform2D, body: &mut RigidBody) {
        let clamped = transform.position.clamp(self.bounds.min, self.bounds.max);
        if clamped.x != transform.position.x {
            body.velocity.x = 0.0;
        }
        if clamped.y != transform.position.y {
            body.velocity.y = 0.0;
        }
        transform.position = clamped;
    }
}

/// Caps the speed of a body.
#[derive(Debug, Clone, Copy)]
pub struct SpeedLimit {
    pub max_speed: f32,
}

impl Constraint for SpeedLimit {
    fn solve(&mut self, _transform: &mut Transform2D, body: &mut RigidBody) {
        body.velocity = body.velocity.clamp_length_max(self.max_speed);
    }
}

/// Run every constraint hook on the given bodies `iterations` times.
pub fn solve_constraints(world: &mut hecs::World, bodies: &[hecs::Entity], iterations: u32) {
    for _ in 0..iterations {
        for &entity in bodies {
            let Ok((hook, transform, body)) = world
                .query_one_mut::<(&mut ConstraintHook, &mut Transform2D, &mut RigidBody)>(entity)
            else {
                continue;
            };
            hook.0.solve(transform, body);
        }
    }
}

/// Semi-implicit Euler velocity update. Returns this step's displacement.
///
/// Immovable bodies keep their velocity; every body's force accumulator is
/// cleared.
pub fn integrate(body: &mut RigidBody, gravity: Vec2, dt: f32) -> Vec2 {
    if body.inverse_mass > 0.0 {
        let acceleration = gravity * body.gravity_scale + body.force * body.inverse_mass;
        body.velocity += acceleration * dt;
    }
    body.force = Vec2::ZERO;
    body.velocity * dt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrate_applies_gravity_and_force() {
        let mut body = RigidBody::new_dynamic(2.0);
        body.apply_force(Vec2::new(4.0, 0.0));
        let displacement = integrate(&mut body, Vec2::new(0.0, -10.0), 0.5);
        assert_eq!(body.velocity, Vec2::new(1.0, -5.0));
        assert_eq!(displacement, Vec2::new(0.5, -2.5));
        assert_eq!(body.force, Vec2::ZERO);
    }

    #[test]
    fn test_static_body_ignores_gravity() {
        let mut body = RigidBody::new_static();
        body.apply_force(Vec2::X);
        let displacement = integrate(&mut body, Vec2::new(0.0, -10.0), 1.0);
        assert_eq!(displacement, Vec2::ZERO);
        assert_eq!(body.force, Vec2::ZERO);
    }

    #[test]
    fn test_constraint_hooks_iterate() {
        let mut world = hecs::World::new();
        let bounded = world.spawn((
            Transform2D::from_xy(50.0, 5.0),
            RigidBody::new_dynamic(1.0).with_velocity(Vec2::new(3.0, 1.0)),
            ConstraintHook::new(BoundsConstraint {
                bounds: Rect::new(Vec2::ZERO, Vec2::splat(10.0)),
            }),
        ));
        let counter = world.spawn((
            Transform2D::default(),
            RigidBody::new_dynamic(1.0),
            ConstraintHook::new(|transform: &mut Transform2D, _: &mut RigidBody| {
                transform.position.x += 1.0;
            }),
        ));
        let plain = world.spawn((Transform2D::default(), RigidBody::new_dynamic(1.0)));

        solve_constraints(&mut world, &[bounded, counter, plain], 3);

        assert_eq!(world.get::<&Transform2D>(bounded).unwrap().position, Vec2::new(10.0, 5.0));
        assert_eq!(world.get::<&RigidBody>(bounded).unwrap().velocity, Vec2::new(0.0, 1.0));
        assert_eq!(world.get::<&Transform2D>(counter).unwrap().position.x, 3.0);
    }

    #[test]
    fn test_speed_limit() {
        let mut transform = Transform2D::default();
        let mut body = RigidBody::new_dynamic(1.0).with_velocity(Vec2::new(30.0, 40.0));
        SpeedLimit { max_speed: 5.0 }.solve(&mut transform, &mut body);
        assert!((body.velocity - Vec2::new(3.0, 4.0)).length() < 1e-5);
    }
}
