//! 2D collision detection and rigid body resolution.
//!
//! # Architecture
//!
//! The physics pipeline runs in a fixed timestep loop:
//!
//! 1. Broadphase (identity copy of the body registry)
//! 2. Constraint hooks
//! 3. Swept movement per body, 1 px at a time, resolving blocking hits with
//!    impulses and reporting every hit to a [`CollisionListener`]
//! 4. Positional correction for pairs that started the step overlapping
//!
//! Bodies are hecs entities carrying
//! [`Transform2D`](crate::ecs::components::transform::Transform2D),
//! [`RigidBody`](crate::ecs::components::physics::RigidBody) and [`Collider`].
//! The world only stores entity handles, indexed by tag.

pub mod broadphase;
pub mod clip;
pub mod collider;
pub mod contact;
pub mod debug;
pub mod grid;
mod movement;
pub mod narrowphase;
pub mod query;
pub mod rigid_body;
pub mod sat;
pub mod solver;
pub mod tags;

use std::collections::HashMap;

use glam::Vec2;
use tracing::{debug, trace, warn};

use crate::ecs::components::physics::Collider;
use crate::error::{PhysicsError, Result};

use self::broadphase::Broadphase;
use self::contact::Manifold;
use self::tags::{BitTag, CollisionTable, TagDomain, TagRegistry};

pub use self::query::RaycastHit;

/// Configuration for the physics simulation.
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// Gravity in pixels per second squared. Default: zero.
    pub gravity: Vec2,
    /// Fixed timestep for physics updates in seconds. Default: 1/60.
    pub fixed_timestep: f64,
    /// Maximum number of sub-steps per call to [`PhysicsWorld::step`]. Default: 5.
    pub max_substeps: u32,
    /// Passes over the constraint hooks per step. Default: 3.
    pub constraint_iterations: u32,
    /// Penetration left alone by positional correction. Default: 0.01.
    pub penetration_slop: f32,
    /// Fraction of penetration removed per correction. Default: 0.2.
    pub correction_percent: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::ZERO,
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 5,
            constraint_iterations: 3,
            penetration_slop: solver::PENETRATION_SLOP,
            correction_percent: solver::CORRECTION_PERCENT,
        }
    }
}

/// A hit reported during swept movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    /// The body receiving the notification.
    pub entity: hecs::Entity,
    pub other: hecs::Entity,
    /// Signed unit axis of the step that produced the hit, from `entity`'s
    /// point of view.
    pub axis: Vec2,
    /// Whether the hit stopped the mover on this axis.
    pub blocking: bool,
}

/// Receives collision notifications during a step. Both bodies of a pair are
/// notified. The listener may add or remove bodies and entities.
pub trait CollisionListener {
    fn on_collide(
        &mut self,
        world: &mut hecs::World,
        physics: &mut PhysicsWorld,
        event: &CollisionEvent,
    );
}

impl<F> CollisionListener for F
where
    F: FnMut(&mut hecs::World, &mut PhysicsWorld, &CollisionEvent),
{
    fn on_collide(
        &mut self,
        world: &mut hecs::World,
        physics: &mut PhysicsWorld,
        event: &CollisionEvent,
    ) {
        self(world, physics, event)
    }
}

/// Listener that drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreCollisions;

impl CollisionListener for IgnoreCollisions {
    fn on_collide(&mut self, _: &mut hecs::World, _: &mut PhysicsWorld, _: &CollisionEvent) {}
}

/// The main physics world: tag tables, body registry and stepping state.
pub struct PhysicsWorld {
    config: PhysicsConfig,
    accumulator: f64,
    registry: TagRegistry,
    table: CollisionTable,
    bodies: Vec<hecs::Entity>,
    body_tags: HashMap<hecs::Entity, BitTag>,
    by_tag: Vec<Vec<hecs::Entity>>,
    broadphase: Broadphase,
    working_set: Vec<hecs::Entity>,
    manifolds: Vec<Manifold>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl PhysicsWorld {
    /// Create a new physics world with the given configuration.
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            config,
            accumulator: 0.0,
            registry: TagRegistry::new(),
            table: CollisionTable::new(),
            bodies: Vec::new(),
            body_tags: HashMap::new(),
            by_tag: vec![Vec::new(); 64],
            broadphase: Broadphase::new(),
            working_set: Vec::new(),
            manifolds: Vec::new(),
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PhysicsConfig {
        &mut self.config
    }

    pub fn tags(&self) -> &TagRegistry {
        &self.registry
    }

    /// Manifolds resolved during the last fixed step.
    pub fn manifolds(&self) -> &[Manifold] {
        &self.manifolds
    }

    // Tags

    /// Register every variant of a tag domain.
    pub fn register_tags<T: TagDomain>(&mut self) -> Result<()> {
        self.registry.register_domain::<T>()?;
        debug!(domain = T::NAME, count = T::VARIANTS.len(), "registered tag domain");
        Ok(())
    }

    pub fn register_tag(&mut self, tag: BitTag, name: &'static str) -> Result<()> {
        self.registry.register(tag, name)?;
        debug!(tag = name, "registered tag");
        Ok(())
    }

    /// Make bodies tagged `a` and bodies tagged `b` collide, in both
    /// directions.
    pub fn register_collision(&mut self, a: BitTag, b: BitTag) -> Result<()> {
        self.registry.ensure_registered(a)?;
        self.registry.ensure_registered(b)?;
        self.table.register(a, b)?;
        debug!(
            a = %self.registry.describe(a),
            b = %self.registry.describe(b),
            "registered collision"
        );
        Ok(())
    }

    pub fn remove_collision(&mut self, a: BitTag, b: BitTag) -> Result<()> {
        self.table.remove(a, b)?;
        debug!(
            a = %self.registry.describe(a),
            b = %self.registry.describe(b),
            "removed collision"
        );
        Ok(())
    }

    pub fn is_collidable(&self, a: BitTag, b: BitTag) -> bool {
        self.table.is_collidable(a, b)
    }

    /// Union of the collision-table rows of every tag in `tags`.
    pub fn collidable_tags(&self, tags: BitTag) -> BitTag {
        self.table.collidable_with(tags)
    }

    // Bodies

    /// Register an entity's collider. Re-adding a registered body refreshes
    /// its tags.
    pub fn add_body(&mut self, world: &hecs::World, entity: hecs::Entity) -> Result<()> {
        if !world.contains(entity) {
            return Err(PhysicsError::NoSuchEntity(entity));
        }
        let tags = world
            .get::<&Collider>(entity)
            .map_err(|_| PhysicsError::MissingComponent(entity, "Collider"))?
            .tags;
        self.registry.ensure_registered(tags)?;

        if self.contains(entity) {
            self.unlink(entity);
        } else {
            self.bodies.push(entity);
        }
        self.link(entity, tags);
        debug!(?entity, tags = %self.registry.describe(tags), "added body");
        Ok(())
    }

    /// Unregister a body. Returns false if it was not registered.
    pub fn remove_body(&mut self, entity: hecs::Entity) -> bool {
        if !self.contains(entity) {
            return false;
        }
        self.unlink(entity);
        self.body_tags.remove(&entity);
        self.bodies.retain(|e| *e != entity);
        self.working_set.retain(|e| *e != entity);
        debug!(?entity, "removed body");
        true
    }

    /// Replace a registered body's tags, in both its collider and the tag
    /// lists.
    pub fn set_body_tags(
        &mut self,
        world: &mut hecs::World,
        entity: hecs::Entity,
        tags: BitTag,
    ) -> Result<()> {
        self.registry.ensure_registered(tags)?;
        if !self.contains(entity) {
            return Err(PhysicsError::NoSuchEntity(entity));
        }
        world
            .get::<&mut Collider>(entity)
            .map_err(|_| PhysicsError::MissingComponent(entity, "Collider"))?
            .tags = tags;
        self.unlink(entity);
        self.link(entity, tags);
        Ok(())
    }

    fn link(&mut self, entity: hecs::Entity, tags: BitTag) {
        for index in tags.iter().filter_map(BitTag::index) {
            self.by_tag[index as usize].push(entity);
        }
        self.body_tags.insert(entity, tags);
    }

    fn unlink(&mut self, entity: hecs::Entity) {
        let Some(tags) = self.body_tags.get(&entity).copied() else {
            return;
        };
        for index in tags.iter().filter_map(BitTag::index) {
            self.by_tag[index as usize].retain(|e| *e != entity);
        }
    }

    pub fn contains(&self, entity: hecs::Entity) -> bool {
        self.body_tags.contains_key(&entity)
    }

    /// Registered bodies in registration order.
    pub fn bodies(&self) -> &[hecs::Entity] {
        &self.bodies
    }

    /// Bodies carrying a single tag. Empty for multi-bit or `NONE` masks.
    pub fn bodies_with_tag(&self, tag: BitTag) -> &[hecs::Entity] {
        match tag.index() {
            Some(index) if tag.is_single() => &self.by_tag[index as usize],
            _ => &[],
        }
    }

    /// Bodies carrying any of `tags`, deduplicated, in registration order.
    pub fn bodies_with_tags(&self, tags: BitTag) -> Vec<hecs::Entity> {
        self.bodies
            .iter()
            .copied()
            .filter(|e| self.body_tags(*e).intersects(tags))
            .collect()
    }

    /// Tags a body was registered with.
    pub fn body_tags(&self, entity: hecs::Entity) -> BitTag {
        self.body_tags.get(&entity).copied().unwrap_or(BitTag::NONE)
    }

    /// Unregister every body.
    pub fn clear_colliders(&mut self) {
        self.bodies.clear();
        self.body_tags.clear();
        self.by_tag.iter_mut().for_each(Vec::clear);
        self.working_set.clear();
        self.manifolds.clear();
        debug!("cleared colliders");
    }

    /// Empty the collision table.
    pub fn clear_collision_tags(&mut self) {
        self.table.clear();
        debug!("cleared collision tags");
    }

    /// Forget every registered tag and domain.
    pub fn clear_tags(&mut self) {
        self.registry.clear();
        debug!("cleared tags");
    }

    // Stepping

    /// Step the physics simulation forward by `delta_seconds`.
    ///
    /// Runs whole fixed steps out of an accumulator, at most
    /// `max_substeps` per call. Unused time carries over to the next call.
    /// Returns the number of fixed steps run.
    pub fn step(
        &mut self,
        world: &mut hecs::World,
        delta_seconds: f64,
        listener: &mut impl CollisionListener,
    ) -> u32 {
        self.accumulator += delta_seconds;
        let fixed = self.config.fixed_timestep;
        if fixed <= 0.0 {
            return 0;
        }

        let mut substeps = 0u32;
        while self.accumulator >= fixed && substeps < self.config.max_substeps {
            self.fixed_step(world, fixed as f32, listener);
            self.accumulator -= fixed;
            substeps += 1;
        }

        if self.accumulator >= fixed {
            warn!(
                substeps,
                backlog = self.accumulator,
                "physics step capped; carrying backlog to the next frame"
            );
        }
        substeps
    }

    /// Run exactly one fixed step of `dt` seconds.
    pub fn fixed_step(
        &mut self,
        world: &mut hecs::World,
        dt: f32,
        listener: &mut impl CollisionListener,
    ) {
        // 1. Broadphase
        let mut working_set = std::mem::take(&mut self.working_set);
        self.broadphase.collect(&self.bodies, &mut working_set);
        self.working_set = working_set;
        self.manifolds.clear();
        trace!(bodies = self.working_set.len(), dt, "fixed step");

        // 2. Constraints
        rigid_body::solve_constraints(world, &self.working_set, self.config.constraint_iterations);

        // 3. Swept movement
        let mut overlapping = Vec::new();
        let mut notified = std::collections::HashSet::new();
        let movers = self.working_set.clone();
        for entity in movers {
            if !self.contains(entity) || !world.contains(entity) {
                continue;
            }
            self.move_body(world, entity, dt, listener, &mut overlapping, &mut notified);
        }

        // 4. Positional correction
        self.correct_overlaps(world, &overlapping);
    }

    /// Drop any time banked in the accumulator.
    pub fn reset_accumulator(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::physics::RigidBody;
    use crate::ecs::components::transform::Transform2D;
    use crate::physics::collider::Shape;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Layer {
        Player,
        Wall,
        Pickup,
    }

    impl TagDomain for Layer {
        const NAME: &'static str = "Layer";
        const VARIANTS: &'static [Self] = &[Layer::Player, Layer::Wall, Layer::Pickup];

        fn bits(self) -> u64 {
            1 << self as u32
        }

        fn name(self) -> &'static str {
            match self {
                Layer::Player => "Player",
                Layer::Wall => "Wall",
                Layer::Pickup => "Pickup",
            }
        }
    }

    fn setup() -> (hecs::World, PhysicsWorld) {
        let mut physics = PhysicsWorld::default();
        physics.register_tags::<Layer>().unwrap();
        physics
            .register_collision(Layer::Player.tag(), Layer::Pickup.tag())
            .unwrap();
        (hecs::World::new(), physics)
    }

    fn spawn(
        world: &mut hecs::World,
        physics: &mut PhysicsWorld,
        position: Vec2,
        body: RigidBody,
        collider: Collider,
    ) -> hecs::Entity {
        let entity = world.spawn((Transform2D::from_position(position), body, collider));
        physics.add_body(world, entity).unwrap();
        entity
    }

    fn position(world: &hecs::World, entity: hecs::Entity) -> Vec2 {
        world.get::<&Transform2D>(entity).unwrap().position
    }

    #[test]
    fn test_physics_config_default() {
        let config = PhysicsConfig::default();
        assert_eq!(config.gravity, Vec2::ZERO);
        assert!((config.fixed_timestep - 1.0 / 60.0).abs() < 1e-10);
        assert_eq!(config.max_substeps, 5);
        assert_eq!(config.constraint_iterations, 3);
        assert_eq!(config.penetration_slop, 0.01);
        assert_eq!(config.correction_percent, 0.2);
    }

    #[test]
    fn test_step_caps_substeps_and_carries_leftover() {
        let (mut world, mut physics) = setup();
        assert_eq!(physics.step(&mut world, 1.0, &mut IgnoreCollisions), 5);
        // The backlog is not dropped.
        assert_eq!(physics.step(&mut world, 0.0, &mut IgnoreCollisions), 5);

        let (mut world, mut physics) = setup();
        assert_eq!(physics.step(&mut world, 0.5 / 60.0, &mut IgnoreCollisions), 0);
        assert_eq!(physics.step(&mut world, 0.6 / 60.0, &mut IgnoreCollisions), 1);
    }

    #[test]
    fn test_add_body_validation() {
        let (mut world, mut physics) = setup();
        let untagged = world.spawn((
            Transform2D::default(),
            Collider::new(Shape::rectangle(Vec2::ONE), BitTag::NONE),
        ));
        assert_eq!(physics.add_body(&world, untagged), Err(PhysicsError::NoneTag));

        let unknown = world.spawn((
            Transform2D::default(),
            Collider::new(Shape::rectangle(Vec2::ONE), BitTag::bit(40)),
        ));
        assert_eq!(
            physics.add_body(&world, unknown),
            Err(PhysicsError::UnregisteredTag(BitTag::bit(40)))
        );

        let bare = world.spawn((Transform2D::default(),));
        assert_eq!(
            physics.add_body(&world, bare),
            Err(PhysicsError::MissingComponent(bare, "Collider"))
        );
        assert!(physics.bodies().is_empty());
    }

    #[test]
    fn test_tag_lists() {
        let (mut world, mut physics) = setup();
        let both = Layer::Player.tag() | Layer::Pickup.tag();
        let a = spawn(
            &mut world,
            &mut physics,
            Vec2::ZERO,
            RigidBody::new_static(),
            Collider::new(Shape::circle(1.0), both),
        );
        let b = spawn(
            &mut world,
            &mut physics,
            Vec2::ZERO,
            RigidBody::new_static(),
            Collider::new(Shape::circle(1.0), Layer::Wall.tag()),
        );

        assert_eq!(physics.bodies_with_tag(Layer::Player.tag()), &[a]);
        assert_eq!(physics.bodies_with_tag(Layer::Wall.tag()), &[b]);
        assert_eq!(physics.bodies_with_tags(both | Layer::Wall.tag()), vec![a, b]);

        physics.set_body_tags(&mut world, a, Layer::Wall.tag()).unwrap();
        assert!(physics.bodies_with_tag(Layer::Player.tag()).is_empty());
        assert_eq!(physics.bodies_with_tag(Layer::Wall.tag()), &[b, a]);
        assert_eq!(world.get::<&Collider>(a).unwrap().tags, Layer::Wall.tag());

        // Re-adding does not duplicate.
        physics.add_body(&world, b).unwrap();
        assert_eq!(physics.bodies(), &[a, b]);
        assert_eq!(physics.bodies_with_tag(Layer::Wall.tag()).len(), 2);

        assert!(physics.remove_body(a));
        assert!(!physics.remove_body(a));
        assert_eq!(physics.bodies(), &[b]);
    }

    #[test]
    fn test_register_collision_requires_registered_tags() {
        let (_, mut physics) = setup();
        assert_eq!(
            physics.register_collision(Layer::Player.tag(), BitTag::bit(20)),
            Err(PhysicsError::UnregisteredTag(BitTag::bit(20)))
        );
        assert_eq!(
            physics.register_collision(BitTag::NONE, Layer::Wall.tag()),
            Err(PhysicsError::NoneTag)
        );
        assert!(physics.is_collidable(Layer::Pickup.tag(), Layer::Player.tag()));
        physics
            .remove_collision(Layer::Pickup.tag(), Layer::Player.tag())
            .unwrap();
        assert!(!physics.is_collidable(Layer::Player.tag(), Layer::Pickup.tag()));
    }

    #[test]
    fn test_gravity_moves_body() {
        let (mut world, mut physics) = setup();
        physics.config_mut().gravity = Vec2::new(0.0, -600.0);
        let body = spawn(
            &mut world,
            &mut physics,
            Vec2::new(0.0, 100.0),
            RigidBody::new_dynamic(1.0),
            Collider::new(Shape::rectangle(Vec2::splat(4.0)), Layer::Player.tag())
                .with_movement(Layer::Wall.tag()),
        );
        for _ in 0..30 {
            physics.step(&mut world, 1.0 / 60.0, &mut IgnoreCollisions);
        }
        assert!(position(&world, body).y < 100.0);
    }

    #[test]
    fn test_body_rests_on_floor() {
        let (mut world, mut physics) = setup();
        physics.config_mut().gravity = Vec2::new(0.0, -600.0);
        let body = spawn(
            &mut world,
            &mut physics,
            Vec2::new(0.0, 20.0),
            RigidBody::new_dynamic(1.0),
            Collider::new(Shape::rectangle(Vec2::splat(10.0)), Layer::Player.tag())
                .with_movement(Layer::Wall.tag()),
        );
        spawn(
            &mut world,
            &mut physics,
            Vec2::ZERO,
            RigidBody::new_static(),
            Collider::new(Shape::rectangle(Vec2::new(100.0, 10.0)), Layer::Wall.tag()),
        );

        for _ in 0..120 {
            physics.step(&mut world, 1.0 / 60.0, &mut IgnoreCollisions);
        }
        let p = position(&world, body);
        // Floor top at y = 5, box half height 5.
        assert_eq!(p.y, 10.0);
        // Each landing zeroes the fall speed; only a few steps of gravity remain.
        assert!(world.get::<&RigidBody>(body).unwrap().velocity.y.abs() < 60.0);
    }
}
