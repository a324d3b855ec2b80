//! Separating-axis test over convex pieces in world space.

use glam::Vec2;

use crate::geometry::{Polygon, Range, Segment};

use super::clip::{self, Edge};
use super::collider::BoxShape;

/// A convex piece placed in world space.
#[derive(Debug, Clone)]
pub enum Convex {
    /// Vertex loop with one candidate axis per entry in `normals`. A segment is
    /// a two-vertex piece whose axes are its direction and its perpendicular.
    Polygon {
        vertices: Vec<Vec2>,
        normals: Vec<Vec2>,
    },
    Circle { center: Vec2, radius: f32 },
}

impl Convex {
    pub fn polygon(polygon: &Polygon, position: Vec2) -> Self {
        Convex::Polygon {
            vertices: polygon.vertices().iter().map(|v| *v + position).collect(),
            normals: polygon
                .normals()
                .iter()
                .copied()
                .filter(|n| *n != Vec2::ZERO)
                .collect(),
        }
    }

    pub fn from_box(shape: &BoxShape, position: Vec2) -> Self {
        let [x, y] = shape.axes();
        Convex::Polygon {
            vertices: shape.vertices(position).to_vec(),
            normals: vec![x, y],
        }
    }

    pub fn circle(center: Vec2, radius: f32) -> Self {
        Convex::Circle { center, radius }
    }

    pub fn segment(segment: &Segment) -> Self {
        let mut normals = vec![segment.direction(), segment.perpendicular()];
        normals.retain(|n| *n != Vec2::ZERO);
        Convex::Polygon {
            vertices: vec![segment.start, segment.end],
            normals,
        }
    }

    pub fn project(&self, axis: Vec2) -> Range {
        match self {
            Convex::Polygon { vertices, .. } => {
                Range::from_values(vertices.iter().map(|v| v.dot(axis)))
            }
            Convex::Circle { center, radius } => {
                let c = center.dot(axis);
                Range::new(c - radius, c + radius)
            }
        }
    }

    /// Farthest point along `direction`. First vertex wins ties.
    pub fn support(&self, direction: Vec2) -> Vec2 {
        match self {
            Convex::Polygon { vertices, .. } => {
                let mut best = vertices.first().copied().unwrap_or(Vec2::ZERO);
                let mut best_dot = best.dot(direction);
                for v in vertices.iter().skip(1) {
                    let d = v.dot(direction);
                    if d > best_dot {
                        best = *v;
                        best_dot = d;
                    }
                }
                best
            }
            Convex::Circle { center, radius } => {
                *center + direction.normalize_or_zero() * *radius
            }
        }
    }

    /// Edge most perpendicular to `normal` among those touching the farthest
    /// vertex along it. Circles have no edges.
    pub fn best_edge(&self, normal: Vec2) -> Option<Edge> {
        match self {
            Convex::Polygon { vertices, .. } => clip::best_edge(vertices, normal),
            Convex::Circle { .. } => None,
        }
    }

    /// Axes this piece contributes when tested against `other`.
    fn axes_against(&self, other: &Convex) -> Vec<Vec2> {
        match self {
            Convex::Polygon { normals, .. } => normals.clone(),
            Convex::Circle { center, .. } => {
                let toward = match other {
                    Convex::Circle { center: c, .. } => *c,
                    Convex::Polygon { vertices, .. } => vertices
                        .iter()
                        .copied()
                        .min_by(|a, b| {
                            a.distance_squared(*center)
                                .total_cmp(&b.distance_squared(*center))
                        })
                        .unwrap_or(*center),
                };
                let axis = (toward - *center).normalize_or_zero();
                if axis == Vec2::ZERO {
                    // Coincident centers: any axis separates equally.
                    vec![Vec2::X]
                } else {
                    vec![axis]
                }
            }
        }
    }
}

/// Minimum translation found by the separating-axis test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Separation {
    /// Unit axis oriented from the first piece toward the second.
    pub normal: Vec2,
    /// Overlap along `normal`.
    pub depth: f32,
}

/// Separating-axis test. `None` when some candidate axis separates the
/// pieces, otherwise the axis of least overlap with the first one found
/// winning ties.
pub fn separate(a: &Convex, b: &Convex) -> Option<Separation> {
    let mut best: Option<Separation> = None;
    let axes = a.axes_against(b).into_iter().chain(b.axes_against(a));
    for axis in axes {
        let pa = a.project(axis);
        let pb = b.project(axis);
        if !pa.intersects(&pb) {
            return None;
        }
        let depth = pa.overlap(&pb);
        if best.map_or(true, |s| depth < s.depth) {
            let normal = if pb.min >= pa.min { axis } else { -axis };
            best = Some(Separation { normal, depth });
        }
    }
    best
}

/// Projection-only overlap check.
pub fn intersects(a: &Convex, b: &Convex) -> bool {
    separate(a, b).is_some()
}
