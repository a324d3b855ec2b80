//! Collider shapes: bounding boxes, candidate axes and projections.

use glam::Vec2;

use crate::geometry::{Polygon, Range, Rect};

use super::grid::GridShape;

/// Rectangle centered on its body position, optionally rotated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxShape {
    pub half_extents: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
}

impl BoxShape {
    pub fn new(size: Vec2) -> Self {
        Self {
            half_extents: size.abs() * 0.5,
            rotation: 0.0,
        }
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn size(&self) -> Vec2 {
        self.half_extents * 2.0
    }

    /// Rotated boxes fall back to full polygon SAT.
    #[inline]
    pub fn is_axis_aligned(&self) -> bool {
        self.rotation == 0.0
    }

    /// Corners in world space, counter-clockwise for a y-up frame.
    pub fn vertices(&self, position: Vec2) -> [Vec2; 4] {
        let h = self.half_extents;
        let local = [
            Vec2::new(-h.x, -h.y),
            Vec2::new(h.x, -h.y),
            Vec2::new(h.x, h.y),
            Vec2::new(-h.x, h.y),
        ];
        if self.is_axis_aligned() {
            return local.map(|v| v + position);
        }
        let rotation = Vec2::from_angle(self.rotation);
        local.map(|v| position + rotation.rotate(v))
    }

    /// Face normals: the box's local x and y axes.
    pub fn axes(&self) -> [Vec2; 2] {
        let rotation = Vec2::from_angle(self.rotation);
        [rotation, rotation.perp()]
    }

    pub fn to_polygon(&self) -> Polygon {
        let mut polygon = Polygon::rectangle(self.size());
        if !self.is_axis_aligned() {
            polygon.rotate(self.rotation, Vec2::ZERO);
        }
        polygon
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleShape {
    pub radius: f32,
}

impl CircleShape {
    pub fn new(radius: f32) -> Self {
        Self {
            radius: radius.abs(),
        }
    }
}

/// Discriminant of [`Shape`], used for logging and dispatch diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Box,
    Circle,
    Polygon,
    Grid,
}

/// Collision geometry of a body, in coordinates relative to its position.
#[derive(Debug, Clone)]
pub enum Shape {
    Box(BoxShape),
    Circle(CircleShape),
    Polygon(Polygon),
    Grid(GridShape),
}

impl Shape {
    pub fn rectangle(size: Vec2) -> Self {
        Shape::Box(BoxShape::new(size))
    }

    pub fn circle(radius: f32) -> Self {
        Shape::Circle(CircleShape::new(radius))
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Box(_) => ShapeKind::Box,
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Polygon(_) => ShapeKind::Polygon,
            Shape::Grid(_) => ShapeKind::Grid,
        }
    }

    /// World-space bounding box with the shape placed at `position`.
    pub fn bounding_box(&self, position: Vec2) -> Rect {
        match self {
            Shape::Box(b) if b.is_axis_aligned() => {
                Rect::from_center_size(position, b.size())
            }
            Shape::Box(b) => Rect::from_points(b.vertices(position))
                .unwrap_or_else(|| Rect::new(position, position)),
            Shape::Circle(c) => Rect::from_center_size(position, Vec2::splat(c.radius * 2.0)),
            Shape::Polygon(p) => p.bounding_box().translate(position),
            Shape::Grid(g) => g.bounding_box(position),
        }
    }

    /// Candidate separating axes contributed by this shape alone.
    ///
    /// Circles contribute none here; their radial axis depends on the other
    /// shape and is built during the separating-axis test. Grids are tested
    /// per tile.
    pub fn axes(&self) -> Vec<Vec2> {
        match self {
            Shape::Box(b) => b.axes().to_vec(),
            Shape::Polygon(p) => p
                .normals()
                .iter()
                .copied()
                .filter(|n| *n != Vec2::ZERO)
                .collect(),
            Shape::Circle(_) | Shape::Grid(_) => Vec::new(),
        }
    }

    /// Projection onto `axis` with the shape placed at `position`.
    /// Undefined (`None`) for grids.
    pub fn project(&self, position: Vec2, axis: Vec2) -> Option<Range> {
        match self {
            Shape::Circle(c) => {
                let center = position.dot(axis);
                Some(Range::new(center - c.radius, center + c.radius))
            }
            Shape::Box(b) => Some(Range::from_values(
                b.vertices(position).iter().map(|v| v.dot(axis)),
            )),
            Shape::Polygon(p) => Some(p.project(position, axis)),
            Shape::Grid(_) => None,
        }
    }
}

impl From<BoxShape> for Shape {
    fn from(shape: BoxShape) -> Self {
        Shape::Box(shape)
    }
}

impl From<CircleShape> for Shape {
    fn from(shape: CircleShape) -> Self {
        Shape::Circle(shape)
    }
}

impl From<Polygon> for Shape {
    fn from(shape: Polygon) -> Self {
        Shape::Polygon(shape)
    }
}

impl From<GridShape> for Shape {
    fn from(shape: GridShape) -> Self {
        Shape::Grid(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_projection() {
        let shape = Shape::circle(5.0);
        let range = shape.project(Vec2::new(3.0, 4.0), Vec2::X).unwrap();
        assert_eq!(range, Range::new(-2.0, 8.0));
    }

    #[test]
    fn test_box_bounding_box_rotated() {
        let shape = Shape::Box(BoxShape::new(Vec2::new(2.0, 2.0)).with_rotation(std::f32::consts::FRAC_PI_4));
        let bounds = shape.bounding_box(Vec2::ZERO);
        let expected = 2.0f32.sqrt();
        assert!((bounds.max.x - expected).abs() < 1e-4);
        assert!((bounds.min.y + expected).abs() < 1e-4);
    }

    #[test]
    fn test_box_projection_matches_polygon() {
        let b = BoxShape::new(Vec2::new(4.0, 2.0)).with_rotation(0.3);
        let as_box = Shape::Box(b);
        let as_polygon = Shape::Polygon(b.to_polygon());
        let axis = Vec2::new(0.6, 0.8);
        let position = Vec2::new(7.0, -3.0);
        let r1 = as_box.project(position, axis).unwrap();
        let r2 = as_polygon.project(position, axis).unwrap();
        assert!((r1.min - r2.min).abs() < 1e-4);
        assert!((r1.max - r2.max).abs() < 1e-4);
    }

    #[test]
    fn test_axes() {
        assert_eq!(Shape::rectangle(Vec2::ONE).axes(), vec![Vec2::X, Vec2::Y]);
        assert!(Shape::circle(1.0).axes().is_empty());
        let triangle = Polygon::regular(3, 1.0).unwrap();
        let axes = Shape::Polygon(triangle).axes();
        assert_eq!(axes.len(), 3);
        assert!(axes.iter().all(|a| (a.length() - 1.0).abs() < 1e-5));
    }
}
