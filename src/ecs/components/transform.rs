//! Transform components for ECS entities.

use glam::Vec2;

/// World-space position of a body. Shapes are placed relative to it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform2D {
    pub position: Vec2,
}

impl Transform2D {
    pub fn from_position(position: Vec2) -> Self {
        Self { position }
    }

    pub fn from_xy(x: f32, y: f32) -> Self {
        Self::from_position(Vec2::new(x, y))
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.position += offset;
    }
}
