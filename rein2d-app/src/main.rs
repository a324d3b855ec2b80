use glam::Vec2;
use rein2d::ecs::bridge;
use rein2d::ecs::components::physics::{Collider, RigidBody};
use rein2d::ecs::components::transform::Transform2D;
use rein2d::geometry::Polygon;
use rein2d::physics::grid::{GridShape, TileFlip};
use rein2d::physics::CollisionEvent;
use rein2d::{PhysicsConfig, PhysicsWorld, Shape, TagDomain};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Player,
    Level,
    Pickup,
}

impl TagDomain for Layer {
    const NAME: &'static str = "Layer";
    const VARIANTS: &'static [Self] = &[Layer::Player, Layer::Level, Layer::Pickup];

    fn bits(self) -> u64 {
        1 << self as u32
    }

    fn name(self) -> &'static str {
        match self {
            Layer::Player => "Player",
            Layer::Level => "Level",
            Layer::Pickup => "Pickup",
        }
    }
}

const TILE: f32 = 16.0;
const SLOPE: u32 = 2;
const SLOPE_LEFT: u32 = SLOPE | TileFlip::HORIZONTAL_BIT;

// Top row first.
const LEVEL: &[&[u32]] = &[
    &[1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    &[1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    &[1, 0, 0, 0, 0, 0, 0, 0, SLOPE, 1, 1, SLOPE_LEFT, 0, 0, 0, 0, 0, 0, 0, 1],
    &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

fn build_level() -> anyhow::Result<GridShape> {
    let rows = LEVEL.len();
    let columns = LEVEL[0].len();
    let mut grid = GridShape::new(columns, rows, Vec2::splat(TILE));
    grid.define_polygon_tile(
        SLOPE,
        Polygon::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(TILE, 0.0),
            Vec2::new(TILE, TILE),
        ])?,
    );
    for (i, line) in LEVEL.iter().enumerate() {
        let row = rows - 1 - i;
        for (column, &gid) in line.iter().enumerate() {
            grid.set_gid(column, row, gid)?;
        }
    }
    Ok(grid)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut world = hecs::World::new();
    let mut physics = PhysicsWorld::new(PhysicsConfig {
        gravity: Vec2::new(0.0, -900.0),
        ..Default::default()
    });
    physics.register_tags::<Layer>()?;
    physics.register_collision(Layer::Player.tag(), Layer::Level.tag())?;
    physics.register_collision(Layer::Player.tag(), Layer::Pickup.tag())?;

    bridge::spawn_body(
        &mut world,
        &mut physics,
        Vec2::ZERO,
        RigidBody::new_static(),
        Collider::new(Shape::Grid(build_level()?), Layer::Level.tag()),
    )?;

    for x in [72.0, 200.0, 264.0] {
        bridge::spawn_body(
            &mut world,
            &mut physics,
            Vec2::new(x, 24.0),
            RigidBody::new_static(),
            Collider::new(Shape::circle(4.0), Layer::Pickup.tag()),
        )?;
    }

    let player = bridge::spawn_body(
        &mut world,
        &mut physics,
        Vec2::new(32.0, 48.0),
        RigidBody::new_dynamic(1.0).with_velocity(Vec2::new(90.0, 0.0)),
        Collider::new(Shape::rectangle(Vec2::new(10.0, 14.0)), Layer::Player.tag())
            .with_movement(Layer::Level.tag()),
    )?;

    let mut coins = 0u32;
    let mut on_collide = |world: &mut hecs::World, physics: &mut PhysicsWorld, event: &CollisionEvent| {
        if event.entity != player {
            return;
        }
        if physics.body_tags(event.other).contains(Layer::Pickup.tag()) {
            bridge::despawn_body(world, physics, event.other);
            coins += 1;
            log::info!("picked up coin {coins}");
        } else if event.blocking {
            log::debug!("player blocked along {:?}", event.axis);
        }
    };

    let dt = 1.0 / 60.0;
    for frame in 0..240u32 {
        // Walk right, then back left.
        if let Ok(mut body) = world.get::<&mut RigidBody>(player) {
            body.velocity.x = if frame < 120 { 90.0 } else { -90.0 };
        }

        physics.step(&mut world, dt, &mut on_collide);

        if frame % 30 == 0 {
            let position = world.get::<&Transform2D>(player)?.position;
            let ground = physics
                .raycast(&world, position, Vec2::NEG_Y, 16.0, Layer::Level.tag())?
                .map(|hit| hit.distance);
            log::info!("frame {frame}: player at {position:?}, ground {ground:?}");
        }
    }

    let lines = physics.debug_render(&world);
    log::info!(
        "done: {coins} coins, {} debug lines ({} bytes)",
        lines.line_count(),
        lines.as_bytes().len()
    );
    Ok(())
}
