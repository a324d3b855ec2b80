//! Line-list debug geometry for colliders and contacts.
//!
//! Nothing here touches a GPU. [`DebugLines`] collects vertex pairs that an
//! external renderer can upload as-is with [`DebugLines::as_bytes`].

use glam::Vec2;

use crate::ecs::components::physics::Collider;
use crate::ecs::components::transform::Transform2D;
use crate::geometry::Rect;

use super::collider::Shape;
use super::PhysicsWorld;

const CIRCLE_SEGMENTS: usize = 16;
const CONTACT_MARK: f32 = 2.0;
const NORMAL_LENGTH: f32 = 8.0;

/// Vertex with position and color.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DebugVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl DebugVertex {
    pub fn new(position: Vec2, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            color,
        }
    }
}

/// Line list: every two vertices form one segment.
#[derive(Debug, Clone, Default)]
pub struct DebugLines {
    vertices: Vec<DebugVertex>,
}

impl DebugLines {
    pub const SHAPE_COLOR: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
    pub const BOUNDS_COLOR: [f32; 4] = [0.3, 0.3, 0.3, 1.0];
    pub const CONTACT_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    pub const NORMAL_COLOR: [f32; 4] = [1.0, 1.0, 0.0, 1.0];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &[DebugVertex] {
        &self.vertices
    }

    pub fn line_count(&self) -> usize {
        self.vertices.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Raw vertex bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn line(&mut self, start: Vec2, end: Vec2, color: [f32; 4]) {
        self.vertices.push(DebugVertex::new(start, color));
        self.vertices.push(DebugVertex::new(end, color));
    }

    /// Closed outline through `points`.
    pub fn polygon(&mut self, points: &[Vec2], color: [f32; 4]) {
        if points.len() < 2 {
            return;
        }
        for (i, &start) in points.iter().enumerate() {
            self.line(start, points[(i + 1) % points.len()], color);
        }
    }

    pub fn rect(&mut self, rect: Rect, color: [f32; 4]) {
        self.polygon(&rect.corners(), color);
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        let points: Vec<Vec2> = (0..CIRCLE_SEGMENTS)
            .map(|i| {
                let angle = i as f32 / CIRCLE_SEGMENTS as f32 * std::f32::consts::TAU;
                center + Vec2::from_angle(angle) * radius
            })
            .collect();
        self.polygon(&points, color);
    }

    /// Small axis-aligned cross marking a point.
    pub fn cross(&mut self, center: Vec2, size: f32, color: [f32; 4]) {
        self.line(center - Vec2::X * size, center + Vec2::X * size, color);
        self.line(center - Vec2::Y * size, center + Vec2::Y * size, color);
    }
}

impl Shape {
    /// Draw the outline and the bounding box of the shape placed at
    /// `position`. Grids draw every occupied tile.
    pub fn debug_render(&self, position: Vec2, color: [f32; 4], lines: &mut DebugLines) {
        match self {
            Shape::Box(b) => lines.polygon(&b.vertices(position), color),
            Shape::Circle(c) => {
                lines.circle(position, c.radius, color);
                lines.line(position, position + Vec2::X * c.radius, color);
            }
            Shape::Polygon(p) => lines.polygon(p.translated(position).vertices(), color),
            Shape::Grid(g) => {
                let local = Rect::new(Vec2::ZERO, g.size());
                for (column, row) in g.cells_in(local) {
                    if let Some(tile) = g.tile_polygon(column, row) {
                        lines.polygon(tile.translated(position).vertices(), color);
                    }
                }
            }
        }
        lines.rect(self.bounding_box(position), DebugLines::BOUNDS_COLOR);
    }
}

impl PhysicsWorld {
    /// Draw every registered body and the contacts of the last step.
    pub fn debug_render(&self, world: &hecs::World) -> DebugLines {
        let mut lines = DebugLines::new();
        for &entity in self.bodies() {
            let (Ok(collider), Ok(transform)) = (
                world.get::<&Collider>(entity),
                world.get::<&Transform2D>(entity),
            ) else {
                continue;
            };
            collider
                .shape
                .debug_render(transform.position, DebugLines::SHAPE_COLOR, &mut lines);
        }
        for contact in self.manifolds().iter().flat_map(|m| m.contacts.iter()) {
            lines.cross(contact.position, CONTACT_MARK, DebugLines::CONTACT_COLOR);
            lines.line(
                contact.position,
                contact.position + contact.normal * NORMAL_LENGTH,
                DebugLines::NORMAL_COLOR,
            );
        }
        lines
    }
}
