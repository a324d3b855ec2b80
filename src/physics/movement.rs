//! Swept movement: bodies advance one pixel at a time so thin colliders
//! cannot be skipped.

use std::collections::HashSet;

use glam::Vec2;
use tracing::{debug, trace};

use crate::ecs::components::physics::{Collider, RigidBody, RigidBodyType};
use crate::ecs::components::transform::Transform2D;

use super::contact::Manifold;
use super::tags::BitTag;
use super::{narrowphase, rigid_body, solver};
use super::{CollisionEvent, CollisionListener, PhysicsWorld};

type Pair = (hecs::Entity, hecs::Entity);

/// Penetration gain that counts as pushing deeper into a starting overlap.
const DEEPEN_EPSILON: f32 = 1e-4;

fn pair(a: hecs::Entity, b: hecs::Entity) -> Pair {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Per-axis walk state.
#[derive(Debug, Clone, Copy)]
struct AxisWalk {
    unit: Vec2,
    steps: u32,
    moved: u32,
    frozen: bool,
}

impl AxisWalk {
    fn new(unit: Vec2, pixels: f32) -> Self {
        Self {
            unit: unit * pixels.signum(),
            steps: pixels.abs() as u32,
            moved: 0,
            frozen: false,
        }
    }

    fn done(&self) -> bool {
        self.frozen || self.moved >= self.steps
    }
}

enum Outcome {
    Moved,
    Blocked,
    Removed,
}

/// Penetration depth of a shape at `position` into a registered body, zero
/// when they do not overlap.
fn penetration_at(
    world: &hecs::World,
    collider: &Collider,
    position: Vec2,
    other: hecs::Entity,
) -> f32 {
    let (Ok(other_collider), Ok(other_transform)) = (
        world.get::<&Collider>(other),
        world.get::<&Transform2D>(other),
    ) else {
        return 0.0;
    };
    narrowphase::test(
        &collider.shape,
        position,
        &other_collider.shape,
        other_transform.position,
    )
    .map_or(0.0, |c| c.penetration.max(0.0))
}

fn manifold_at(
    world: &hecs::World,
    entity: hecs::Entity,
    position: Vec2,
    other: hecs::Entity,
) -> Option<Manifold> {
    let collider = world.get::<&Collider>(entity).ok()?;
    let other_collider = world.get::<&Collider>(other).ok()?;
    let other_position = world.get::<&Transform2D>(other).ok()?.position;
    let contacts = narrowphase::contacts(
        &collider.shape,
        position,
        &other_collider.shape,
        other_position,
    );
    (!contacts.is_empty()).then(|| Manifold::new(entity, other, contacts))
}

impl PhysicsWorld {
    fn alive(&self, world: &hecs::World, entity: hecs::Entity) -> bool {
        self.contains(entity) && world.contains(entity)
    }

    /// Working-set bodies `entity` can hit: those whose tags meet the
    /// collision-table rows of its own tags or its movement tags.
    fn candidates(&self, entity: hecs::Entity, tags: BitTag, movement: BitTag) -> Vec<hecs::Entity> {
        let filter = self.collidable_tags(tags) | movement;
        self.working_set
            .iter()
            .copied()
            .filter(|other| *other != entity && self.body_tags(*other).intersects(filter))
            .collect()
    }

    fn notify(
        &mut self,
        world: &mut hecs::World,
        listener: &mut impl CollisionListener,
        event: CollisionEvent,
    ) -> bool {
        listener.on_collide(world, self, &event);
        if self.alive(world, event.other) {
            let mirrored = CollisionEvent {
                entity: event.other,
                other: event.entity,
                axis: -event.axis,
                blocking: event.blocking,
            };
            listener.on_collide(world, self, &mirrored);
        }
        let alive = self.alive(world, event.entity);
        if !alive {
            debug!(entity = ?event.entity, "body removed during collision callback");
        }
        alive
    }

    /// Move `entity` by its velocity for one fixed step.
    pub(super) fn move_body(
        &mut self,
        world: &mut hecs::World,
        entity: hecs::Entity,
        dt: f32,
        listener: &mut impl CollisionListener,
        overlapping: &mut Vec<Pair>,
        notified: &mut HashSet<Pair>,
    ) {
        let gravity = self.config.gravity;
        let (start, total, movement) = {
            let Ok((transform, body, collider)) =
                world.query_one_mut::<(&Transform2D, &mut RigidBody, &Collider)>(entity)
            else {
                return;
            };
            let movement = match (body.body_type, collider.movement) {
                (RigidBodyType::Static, _) | (_, None) => {
                    body.force = Vec2::ZERO;
                    return;
                }
                (_, Some(movement)) => movement,
            };
            let displacement = rigid_body::integrate(body, gravity, dt);
            (transform.position, displacement + body.move_buffer, movement)
        };
        let pixels = total.trunc();
        let mut remainder = total - pixels;
        let tags = self.body_tags(entity);

        let candidates = self.candidates(entity, tags, movement.collision_tags);

        // Bodies already overlapping are queued for positional correction and
        // only block steps that push deeper into them.
        let initial: Vec<hecs::Entity> = match world.get::<&Collider>(entity) {
            Ok(collider) => candidates
                .iter()
                .copied()
                .filter(|other| penetration_at(world, &collider, start, *other) > 0.0)
                .collect(),
            Err(_) => return,
        };
        for other in &initial {
            let key = pair(entity, *other);
            if !overlapping.contains(&key) {
                overlapping.push(key);
            }
        }

        let mut x = AxisWalk::new(Vec2::X, pixels.x);
        let mut y = AxisWalk::new(Vec2::Y, pixels.y);
        let major = x.steps.max(y.steps);
        let x_is_major = x.steps >= y.steps;
        let mut position = start;

        for k in 1..=major {
            let order: [&mut AxisWalk; 2] = if x_is_major {
                [&mut x, &mut y]
            } else {
                [&mut y, &mut x]
            };
            for (i, axis) in order.into_iter().enumerate() {
                let target = if i == 0 {
                    k
                } else {
                    (k as f32 * axis.steps as f32 / major as f32).round() as u32
                };
                if axis.frozen || axis.moved >= target {
                    continue;
                }
                match self.advance(
                    world,
                    entity,
                    &mut position,
                    axis.unit,
                    movement.collision_tags,
                    &candidates,
                    &initial,
                    listener,
                    notified,
                ) {
                    Outcome::Moved => axis.moved += 1,
                    Outcome::Blocked => {
                        axis.frozen = true;
                        if axis.unit.x != 0.0 {
                            remainder.x = 0.0;
                        } else {
                            remainder.y = 0.0;
                        }
                    }
                    Outcome::Removed => return,
                }
            }
            if x.done() && y.done() {
                break;
            }
        }

        if let Ok(mut body) = world.get::<&mut RigidBody>(entity) {
            body.move_buffer = remainder;
        }
        trace!(?entity, from = ?start, to = ?position, "moved body");
    }

    /// Try one pixel step along `unit`.
    #[allow(clippy::too_many_arguments)]
    fn advance(
        &mut self,
        world: &mut hecs::World,
        entity: hecs::Entity,
        position: &mut Vec2,
        unit: Vec2,
        blocking_tags: BitTag,
        candidates: &[hecs::Entity],
        initial: &[hecs::Entity],
        listener: &mut impl CollisionListener,
        notified: &mut HashSet<Pair>,
    ) -> Outcome {
        let next = *position + unit;
        let (hits, blockers): (Vec<hecs::Entity>, Vec<hecs::Entity>) =
            match world.get::<&Collider>(entity) {
                Ok(collider) => {
                    let mut hits = Vec::new();
                    let mut blockers = Vec::new();
                    for &other in candidates {
                        if !self.alive(world, other) {
                            continue;
                        }
                        let depth = penetration_at(world, &collider, next, other);
                        if depth <= 0.0 {
                            continue;
                        }
                        hits.push(other);
                        let blocking = self.body_tags(other).intersects(blocking_tags)
                            && (!initial.contains(&other)
                                || depth
                                    > penetration_at(world, &collider, *position, other)
                                        + DEEPEN_EPSILON);
                        if blocking {
                            blockers.push(other);
                        }
                    }
                    (hits, blockers)
                }
                Err(_) => return Outcome::Removed,
            };

        if !blockers.is_empty() {
            for other in blockers {
                if let Some(manifold) = manifold_at(world, entity, next, other) {
                    solver::impulse_resolution(world, &manifold);
                    self.manifolds.push(manifold);
                }
                let event = CollisionEvent {
                    entity,
                    other,
                    axis: unit,
                    blocking: true,
                };
                if !self.notify(world, listener, event) {
                    return Outcome::Removed;
                }
            }
            return Outcome::Blocked;
        }

        *position = next;
        match world.get::<&mut Transform2D>(entity) {
            Ok(mut transform) => transform.position = next,
            Err(_) => return Outcome::Removed,
        }

        for other in hits {
            if !notified.insert(pair(entity, other)) || !self.alive(world, other) {
                continue;
            }
            let event = CollisionEvent {
                entity,
                other,
                axis: unit,
                blocking: false,
            };
            if !self.notify(world, listener, event) {
                return Outcome::Removed;
            }
        }
        Outcome::Moved
    }

    /// Positional correction for pairs that began the step overlapping.
    pub(super) fn correct_overlaps(&mut self, world: &mut hecs::World, pairs: &[Pair]) {
        let (slop, percent) = (self.config.penetration_slop, self.config.correction_percent);
        for &(a, b) in pairs {
            if !self.alive(world, a) || !self.alive(world, b) {
                continue;
            }
            let Ok(position) = world.get::<&Transform2D>(a).map(|t| t.position) else {
                continue;
            };
            if let Some(manifold) = manifold_at(world, a, position, b) {
                solver::position_correction(world, &manifold, slop, percent);
                self.manifolds.push(manifold);
            }
        }
    }
}
