//! Polygons with cached convexity, outward normals and convex decomposition.

use std::sync::OnceLock;

use glam::Vec2;

use super::decompose;
use super::range::Range;
use super::rect::Rect;
use crate::error::{PhysicsError, Result};

/// Ordered vertex loop in shape space.
///
/// Convexity and per-edge outward normals are recomputed by [`Polygon::verify`]
/// after every mutation. The convex decomposition of a concave polygon is
/// built on first use and discarded on mutation.
#[derive(Debug, Clone)]
pub struct Polygon {
    vertices: Vec<Vec2>,
    normals: Vec<Vec2>,
    convex: bool,
    components: OnceLock<Vec<Polygon>>,
}

impl Polygon {
    /// Create a polygon. Fails with fewer than 3 vertices.
    pub fn new(vertices: Vec<Vec2>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(PhysicsError::DegeneratePolygon(vertices.len()));
        }
        Ok(Self::from_vertices(vertices))
    }

    fn from_vertices(vertices: Vec<Vec2>) -> Self {
        let mut polygon = Self {
            vertices,
            normals: Vec::new(),
            convex: true,
            components: OnceLock::new(),
        };
        polygon.verify();
        polygon
    }

    /// Axis-aligned rectangle of `size` centered on the origin.
    pub fn rectangle(size: Vec2) -> Self {
        Self::from_vertices(Rect::from_center_size(Vec2::ZERO, size).corners().to_vec())
    }

    /// Rectangle from `min` to `max`.
    pub fn from_rect(rect: Rect) -> Self {
        Self::from_vertices(rect.corners().to_vec())
    }

    /// Regular polygon with `sides` vertices on a circle of `radius`.
    pub fn regular(sides: usize, radius: f32) -> Result<Self> {
        let vertices = (0..sides)
            .map(|i| {
                let angle = i as f32 / sides as f32 * std::f32::consts::TAU;
                Vec2::from_angle(angle) * radius
            })
            .collect();
        Self::new(vertices)
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Unit outward normal of the edge from vertex `i` to vertex `i + 1`.
    /// Zero-length edges have a zero normal.
    pub fn normals(&self) -> &[Vec2] {
        &self.normals
    }

    pub fn is_convex(&self) -> bool {
        self.convex
    }

    /// Convex pieces of this polygon. A convex polygon is its own single piece.
    pub fn components(&self) -> &[Polygon] {
        if self.convex {
            return std::slice::from_ref(self);
        }
        self.components.get_or_init(|| {
            decompose::decompose(&self.vertices)
                .into_iter()
                .map(Self::from_vertices)
                .collect()
        })
    }

    /// Recompute convexity and normals and drop the cached decomposition.
    pub fn verify(&mut self) {
        self.convex = decompose::is_convex(&self.vertices);
        let outward = if decompose::signed_area(&self.vertices) >= 0.0 {
            1.0
        } else {
            -1.0
        };
        let n = self.vertices.len();
        self.normals = (0..n)
            .map(|i| {
                let edge = self.vertices[(i + 1) % n] - self.vertices[i];
                // perp() turns left; outward is to the right for a CCW loop.
                -edge.perp().normalize_or_zero() * outward
            })
            .collect();
        self.components = OnceLock::new();
    }

    pub fn signed_area(&self) -> f32 {
        decompose::signed_area(&self.vertices)
    }

    pub fn area(&self) -> f32 {
        self.signed_area().abs()
    }

    /// Vertices run counter-clockwise (positive signed area, y up).
    pub fn is_counter_clockwise(&self) -> bool {
        self.signed_area() >= 0.0
    }

    pub fn centroid(&self) -> Vec2 {
        let area = self.signed_area();
        if area.abs() < 1e-8 {
            return self.vertices.iter().copied().sum::<Vec2>() / self.vertices.len() as f32;
        }
        let n = self.vertices.len();
        let mut sum = Vec2::ZERO;
        for i in 0..n {
            let (a, b) = (self.vertices[i], self.vertices[(i + 1) % n]);
            sum += (a + b) * a.perp_dot(b);
        }
        sum / (6.0 * area)
    }

    pub fn bounding_box(&self) -> Rect {
        // At least 3 vertices by construction.
        Rect::from_points(self.vertices.iter().copied())
            .unwrap_or_else(|| Rect::new(Vec2::ZERO, Vec2::ZERO))
    }

    /// Projection onto `axis` with the polygon placed at `position`.
    pub fn project(&self, position: Vec2, axis: Vec2) -> Range {
        Range::from_values(self.vertices.iter().map(|v| v.dot(axis))).offset(position.dot(axis))
    }

    /// Even-odd point containment, in shape space.
    pub fn contains_point(&self, point: Vec2) -> bool {
        let n = self.vertices.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (vi, vj) = (self.vertices[i], self.vertices[j]);
            if (vi.y > point.y) != (vj.y > point.y)
                && point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Copy of this polygon moved by `offset`.
    pub fn translated(&self, offset: Vec2) -> Self {
        let mut polygon = self.clone();
        polygon.translate(offset);
        polygon
    }

    pub fn translate(&mut self, offset: Vec2) {
        for v in &mut self.vertices {
            *v += offset;
        }
        self.verify();
    }

    /// Rotate by `angle` radians around `origin`.
    pub fn rotate(&mut self, angle: f32, origin: Vec2) {
        let rotation = Vec2::from_angle(angle);
        for v in &mut self.vertices {
            *v = origin + rotation.rotate(*v - origin);
        }
        self.verify();
    }

    /// Mirror across the vertical line `x = axis_x`.
    pub fn reflect_horizontal(&mut self, axis_x: f32) {
        for v in &mut self.vertices {
            v.x = 2.0 * axis_x - v.x;
        }
        self.verify();
    }

    /// Mirror across the horizontal line `y = axis_y`.
    pub fn reflect_vertical(&mut self, axis_y: f32) {
        for v in &mut self.vertices {
            v.y = 2.0 * axis_y - v.y;
        }
        self.verify();
    }

    /// Scale by `factor` around `origin`.
    pub fn scale(&mut self, factor: Vec2, origin: Vec2) {
        for v in &mut self.vertices {
            *v = origin + (*v - origin) * factor;
        }
        self.verify();
    }

    /// Replace the vertex loop. Fails with fewer than 3 vertices.
    pub fn set_vertices(&mut self, vertices: Vec<Vec2>) -> Result<()> {
        if vertices.len() < 3 {
            return Err(PhysicsError::DegeneratePolygon(vertices.len()));
        }
        self.vertices = vertices;
        self.verify();
        Ok(())
    }

    /// Overwrite every vertex position in order. The slice must match the
    /// current vertex count.
    pub fn set_vertex_positions(&mut self, positions: &[Vec2]) -> Result<()> {
        if positions.len() != self.vertices.len() {
            return Err(PhysicsError::LengthMismatch {
                expected: self.vertices.len(),
                actual: positions.len(),
            });
        }
        self.vertices.copy_from_slice(positions);
        self.verify();
        Ok(())
    }

    pub fn insert_vertex(&mut self, index: usize, vertex: Vec2) {
        let index = index.min(self.vertices.len());
        self.vertices.insert(index, vertex);
        self.verify();
    }

    /// Remove a vertex. Fails if the polygon would drop below 3 vertices.
    pub fn remove_vertex(&mut self, index: usize) -> Result<Vec2> {
        if self.vertices.len() <= 3 {
            return Err(PhysicsError::DegeneratePolygon(self.vertices.len() - 1));
        }
        if index >= self.vertices.len() {
            return Err(PhysicsError::LengthMismatch {
                expected: self.vertices.len(),
                actual: index + 1,
            });
        }
        let removed = self.vertices.remove(index);
        self.verify();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_shape() -> Polygon {
        Polygon::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 2.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(2.0, 4.0),
            Vec2::new(0.0, 4.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_outward_normals_either_winding() {
        let square = Polygon::rectangle(Vec2::splat(2.0));
        // Each normal points away from the centroid.
        for (i, n) in square.normals().iter().enumerate() {
            let mid = (square.vertices()[i] + square.vertices()[(i + 1) % 4]) * 0.5;
            assert!(n.dot(mid) > 0.0);
        }

        let mut reversed = square.vertices().to_vec();
        reversed.reverse();
        let cw = Polygon::new(reversed).unwrap();
        assert!(square.is_counter_clockwise());
        assert!(!cw.is_counter_clockwise());
        for (i, n) in cw.normals().iter().enumerate() {
            let mid = (cw.vertices()[i] + cw.vertices()[(i + 1) % 4]) * 0.5;
            assert!(n.dot(mid) > 0.0);
        }
    }

    #[test]
    fn test_concave_components_cached_and_invalidated() {
        let mut shape = l_shape();
        assert!(!shape.is_convex());
        let count = shape.components().len();
        assert!(count >= 2);
        assert!(shape.components().iter().all(Polygon::is_convex));

        shape.translate(Vec2::new(10.0, 0.0));
        let min_x = shape
            .components()
            .iter()
            .flat_map(|c| c.vertices().iter().map(|v| v.x))
            .fold(f32::MAX, f32::min);
        assert!((min_x - 10.0).abs() < 1e-5, "decomposition follows mutation");
    }

    #[test]
    fn test_mutation_updates_convexity() {
        let mut shape = l_shape();
        shape
            .set_vertices(vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(4.0, 0.0),
                Vec2::new(4.0, 4.0),
                Vec2::new(0.0, 4.0),
            ])
            .unwrap();
        assert!(shape.is_convex());
        assert_eq!(shape.components().len(), 1);
    }

    #[test]
    fn test_too_few_vertices_rejected() {
        assert_eq!(
            Polygon::new(vec![Vec2::ZERO, Vec2::X]).unwrap_err(),
            PhysicsError::DegeneratePolygon(2)
        );
        let mut tri = Polygon::regular(3, 1.0).unwrap();
        assert!(tri.remove_vertex(0).is_err());
        assert_eq!(
            tri.set_vertex_positions(&[Vec2::ZERO]).unwrap_err(),
            PhysicsError::LengthMismatch { expected: 3, actual: 1 }
        );
    }

    #[test]
    fn test_rotate_and_reflect() {
        let mut square = Polygon::rectangle(Vec2::new(4.0, 2.0));
        square.rotate(std::f32::consts::FRAC_PI_2, Vec2::ZERO);
        let bounds = square.bounding_box();
        assert!((bounds.size() - Vec2::new(2.0, 4.0)).length() < 1e-4);

        let mut tri = Polygon::new(vec![Vec2::ZERO, Vec2::new(2.0, 0.0), Vec2::new(0.0, 1.0)]).unwrap();
        tri.reflect_horizontal(0.0);
        assert_eq!(tri.vertices()[1], Vec2::new(-2.0, 0.0));
        assert!(tri.is_convex());
    }

    #[test]
    fn test_contains_point_and_centroid() {
        let shape = l_shape();
        assert!(shape.contains_point(Vec2::new(1.0, 3.0)));
        assert!(!shape.contains_point(Vec2::new(3.0, 3.0)));
        let square = Polygon::from_rect(Rect::new(Vec2::ZERO, Vec2::splat(2.0)));
        assert!((square.centroid() - Vec2::ONE).length() < 1e-5);
    }
}
