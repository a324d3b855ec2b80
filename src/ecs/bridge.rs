//! Binding between hecs entities and the physics body registry.

use glam::Vec2;
use tracing::debug;

use crate::ecs::components::physics::{Collider, RigidBody};
use crate::ecs::components::transform::Transform2D;
use crate::error::{PhysicsError, Result};
use crate::physics::PhysicsWorld;

/// Spawn a body entity and register it.
///
/// The entity is despawned again if registration fails.
pub fn spawn_body(
    world: &mut hecs::World,
    physics: &mut PhysicsWorld,
    position: Vec2,
    body: RigidBody,
    collider: Collider,
) -> Result<hecs::Entity> {
    let entity = world.spawn((Transform2D::from_position(position), body, collider));
    if let Err(err) = physics.add_body(world, entity) {
        let _ = world.despawn(entity);
        return Err(err);
    }
    Ok(entity)
}

/// Unregister and despawn a body. Returns false if the entity did not exist.
pub fn despawn_body(world: &mut hecs::World, physics: &mut PhysicsWorld, entity: hecs::Entity) -> bool {
    physics.remove_body(entity);
    world.despawn(entity).is_ok()
}

/// Give an existing entity a collider and register it.
///
/// The entity needs a [`Transform2D`]; a static [`RigidBody`] is added when it
/// has none.
pub fn attach_collider(
    world: &mut hecs::World,
    physics: &mut PhysicsWorld,
    entity: hecs::Entity,
    collider: Collider,
) -> Result<()> {
    if !world.contains(entity) {
        return Err(PhysicsError::NoSuchEntity(entity));
    }
    if world.get::<&Transform2D>(entity).is_err() {
        return Err(PhysicsError::MissingComponent(entity, "Transform2D"));
    }
    physics.tags().ensure_registered(collider.tags)?;

    let needs_body = world.get::<&RigidBody>(entity).is_err();
    let inserted = if needs_body {
        world.insert(entity, (collider, RigidBody::new_static()))
    } else {
        world.insert_one(entity, collider)
    };
    inserted.map_err(|_| PhysicsError::NoSuchEntity(entity))?;
    physics.add_body(world, entity)
}

/// Remove an entity's collider and unregister it. The entity itself stays.
pub fn detach_collider(
    world: &mut hecs::World,
    physics: &mut PhysicsWorld,
    entity: hecs::Entity,
) -> Result<Collider> {
    let collider = world.remove_one::<Collider>(entity).map_err(|err| match err {
        hecs::ComponentError::NoSuchEntity => PhysicsError::NoSuchEntity(entity),
        hecs::ComponentError::MissingComponent(_) => {
            PhysicsError::MissingComponent(entity, "Collider")
        }
    })?;
    physics.remove_body(entity);
    Ok(collider)
}

/// Rebuild the body registry from every entity carrying a transform and a
/// collider, e.g. after a level reset. Returns the number of bodies.
pub fn sync_bodies(world: &hecs::World, physics: &mut PhysicsWorld) -> Result<usize> {
    physics.clear_colliders();
    let entities: Vec<hecs::Entity> = world
        .query::<(&Transform2D, &Collider)>()
        .iter()
        .map(|(entity, _)| entity)
        .collect();
    for &entity in &entities {
        physics.add_body(world, entity)?;
    }
    debug!(bodies = entities.len(), "synced bodies");
    Ok(entities.len())
}
