//! Shared setup helpers for rein2d benchmarks.
//!
//! ## Running
//!
//!   cargo bench --manifest-path benchmarks/Cargo.toml --bench physics
//!
//! Filter by group:
//!   cargo bench --manifest-path benchmarks/Cargo.toml --bench physics -- narrowphase

use glam::Vec2;
use rein2d::ecs::bridge;
use rein2d::ecs::components::physics::{Collider, RigidBody};
use rein2d::geometry::Polygon;
use rein2d::physics::grid::{GridShape, Tile};
use rein2d::{BitTag, PhysicsConfig, PhysicsWorld, Shape};

pub const BODY: BitTag = BitTag::bit(0);
pub const WALL: BitTag = BitTag::bit(1);

const SPACING: f32 = 12.0;
const TILE: f32 = 16.0;

/// Physics world with the benchmark tags registered and bodies blocked by
/// both bodies and walls.
pub fn physics_world(gravity: Vec2) -> anyhow::Result<PhysicsWorld> {
    let mut physics = PhysicsWorld::new(PhysicsConfig {
        gravity,
        ..Default::default()
    });
    physics.register_tag(BODY, "Body")?;
    physics.register_tag(WALL, "Wall")?;
    physics.register_collision(BODY, WALL)?;
    physics.register_collision(BODY, BODY)?;
    Ok(physics)
}

/// Tile floor spanning `columns` cells with its top edge at y = 0.
pub fn floor_grid(columns: usize) -> anyhow::Result<GridShape> {
    let mut grid = GridShape::new(columns, 2, Vec2::splat(TILE));
    for column in 0..columns {
        grid.set_tile(column, 0, Some(Tile::Solid))?;
        grid.set_tile(column, 1, Some(Tile::Solid))?;
    }
    Ok(grid)
}

/// `n` falling boxes and circles in a grid layout above a tile floor.
pub fn setup_scene(n: usize) -> anyhow::Result<(hecs::World, PhysicsWorld)> {
    let mut world = hecs::World::new();
    let mut physics = physics_world(Vec2::new(0.0, -600.0))?;
    let cols = (n as f32).sqrt().ceil() as usize;

    let width = cols.max(1) as f32 * SPACING;
    let floor_columns = (width / TILE).ceil() as usize + 2;
    bridge::spawn_body(
        &mut world,
        &mut physics,
        Vec2::new(-TILE, -2.0 * TILE),
        RigidBody::new_static(),
        Collider::new(Shape::Grid(floor_grid(floor_columns)?), WALL),
    )?;

    for i in 0..n {
        let x = (i % cols) as f32 * SPACING;
        let y = 40.0 + (i / cols) as f32 * SPACING;
        let shape = if i % 2 == 0 {
            Shape::rectangle(Vec2::splat(8.0))
        } else {
            Shape::circle(4.0)
        };
        bridge::spawn_body(
            &mut world,
            &mut physics,
            Vec2::new(x, y),
            RigidBody::new_dynamic(1.0),
            Collider::new(shape, BODY).with_movement(BODY | WALL),
        )?;
    }
    Ok((world, physics))
}

/// `n` static boxes scattered along a line for raycasts and queries.
pub fn setup_static_row(n: usize) -> anyhow::Result<(hecs::World, PhysicsWorld)> {
    let mut world = hecs::World::new();
    let mut physics = physics_world(Vec2::ZERO)?;
    for i in 0..n {
        let y = if i % 3 == 0 { 0.0 } else { 20.0 };
        bridge::spawn_body(
            &mut world,
            &mut physics,
            Vec2::new(20.0 + i as f32 * SPACING, y),
            RigidBody::new_static(),
            Collider::new(Shape::rectangle(Vec2::splat(6.0)), WALL),
        )?;
    }
    Ok((world, physics))
}

/// Concave L-shaped polygon.
pub fn l_shape() -> anyhow::Result<Polygon> {
    Ok(Polygon::new(vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(20.0, 0.0),
        Vec2::new(20.0, 6.0),
        Vec2::new(6.0, 6.0),
        Vec2::new(6.0, 20.0),
        Vec2::new(0.0, 20.0),
    ])?)
}

/// Shape pairs for batch narrowphase runs, about half of them touching.
pub fn mixed_pairs(n: usize) -> Vec<(Shape, Vec2, Shape, Vec2)> {
    (0..n)
        .map(|i| {
            let offset = if i % 2 == 0 { 6.0 } else { 20.0 };
            let (a, b) = match i % 3 {
                0 => (Shape::rectangle(Vec2::splat(8.0)), Shape::rectangle(Vec2::splat(8.0))),
                1 => (Shape::circle(4.0), Shape::rectangle(Vec2::splat(8.0))),
                _ => (Shape::circle(4.0), Shape::circle(4.0)),
            };
            (a, Vec2::ZERO, b, Vec2::new(offset, 1.0))
        })
        .collect()
}
