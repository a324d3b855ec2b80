//! Spatial queries against registered bodies: shape overlap and raycasts.

use glam::Vec2;

use crate::ecs::components::physics::Collider;
use crate::ecs::components::transform::Transform2D;
use crate::error::Result;
use crate::geometry::Segment;

use super::collider::Shape;
use super::contact::Contact;
use super::narrowphase;
use super::tags::BitTag;
use super::PhysicsWorld;

/// Nearest point where a ray meets a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub entity: hecs::Entity,
    pub contact: Contact,
    /// Signed distance of the hit point along the ray direction.
    pub distance: f32,
}

impl PhysicsWorld {
    fn query_hits<'a>(
        &'a self,
        world: &'a hecs::World,
        shape: &'a Shape,
        position: Vec2,
        tags: BitTag,
    ) -> Result<impl Iterator<Item = hecs::Entity> + 'a> {
        self.registry.ensure_registered(tags)?;
        Ok(self.bodies_with_tags(tags).into_iter().filter(move |entity| {
            let (Ok(collider), Ok(transform)) = (
                world.get::<&Collider>(*entity),
                world.get::<&Transform2D>(*entity),
            ) else {
                return false;
            };
            // Identity, not equality: a body never reports its own shape.
            if std::ptr::eq(&collider.shape, shape) {
                return false;
            }
            narrowphase::overlaps(shape, position, &collider.shape, transform.position)
        }))
    }

    /// First body under `tags` whose shape overlaps `shape` at `position`.
    pub fn query_collision(
        &self,
        world: &hecs::World,
        shape: &Shape,
        position: Vec2,
        tags: BitTag,
    ) -> Result<Option<hecs::Entity>> {
        Ok(self.query_hits(world, shape, position, tags)?.next())
    }

    /// Every body under `tags` whose shape overlaps `shape` at `position`, in
    /// registration order.
    pub fn query_multiple_collision(
        &self,
        world: &hecs::World,
        shape: &Shape,
        position: Vec2,
        tags: BitTag,
    ) -> Result<Vec<hecs::Entity>> {
        Ok(self.query_hits(world, shape, position, tags)?.collect())
    }

    /// All ray hits against bodies under `tags`, nearest first.
    pub fn raycast_multiple(
        &self,
        world: &hecs::World,
        origin: Vec2,
        direction: Vec2,
        distance: f32,
        tags: BitTag,
    ) -> Result<Vec<RaycastHit>> {
        self.registry.ensure_registered(tags)?;
        let direction = direction.normalize_or_zero();
        let segment = Segment::from_ray(origin, direction, distance);

        let mut hits: Vec<RaycastHit> = self
            .bodies_with_tags(tags)
            .into_iter()
            .filter_map(|entity| {
                let collider = world.get::<&Collider>(entity).ok()?;
                let transform = world.get::<&Transform2D>(entity).ok()?;
                let contact = narrowphase::test_segment(&segment, &collider.shape, transform.position)?;
                Some(RaycastHit {
                    entity,
                    contact,
                    distance: (contact.position - origin).dot(direction),
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Ok(hits)
    }

    /// Nearest ray hit against bodies under `tags`.
    pub fn raycast(
        &self,
        world: &hecs::World,
        origin: Vec2,
        direction: Vec2,
        distance: f32,
        tags: BitTag,
    ) -> Result<Option<RaycastHit>> {
        Ok(self
            .raycast_multiple(world, origin, direction, distance, tags)?
            .into_iter()
            .next())
    }
}
