//! Contact point generation by edge clipping.
//!
//! After the separating-axis test picks a normal, each piece contributes the
//! edge most perpendicular to it. The edge less aligned with the normal
//! becomes the reference face; the other is clipped against the reference
//! side planes, and points in front of the reference face are dropped.

use glam::Vec2;

use super::sat::{Convex, Separation};

const DEGENERATE_EDGE: f32 = 1e-8;

/// Edge `a -> b` together with the vertex farthest along the query normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub max: Vec2,
    pub a: Vec2,
    pub b: Vec2,
}

impl Edge {
    #[inline]
    pub fn vector(&self) -> Vec2 {
        self.b - self.a
    }

    pub fn is_degenerate(&self) -> bool {
        self.vector().length_squared() < DEGENERATE_EDGE
    }
}

/// Clipped contact point with its depth behind the reference face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPoint {
    pub position: Vec2,
    pub depth: f32,
}

/// Of the two edges touching the vertex farthest along `normal`, pick the one
/// more perpendicular to `normal`. Edges keep the loop's winding.
pub fn best_edge(vertices: &[Vec2], normal: Vec2) -> Option<Edge> {
    let n = vertices.len();
    if n < 2 {
        return None;
    }
    let mut index = 0;
    let mut max = vertices[0].dot(normal);
    for (i, v) in vertices.iter().enumerate().skip(1) {
        let d = v.dot(normal);
        if d > max {
            max = d;
            index = i;
        }
    }

    let v = vertices[index];
    let next = vertices[(index + 1) % n];
    let prev = vertices[(index + n - 1) % n];
    let left = (v - next).normalize_or_zero();
    let right = (v - prev).normalize_or_zero();

    if right.dot(normal) <= left.dot(normal) {
        Some(Edge { max: v, a: prev, b: v })
    } else {
        Some(Edge { max: v, a: v, b: next })
    }
}

/// Keep the part of `v1 -> v2` on the positive side of the plane
/// `direction . p = offset`.
fn clip(v1: Vec2, v2: Vec2, direction: Vec2, offset: f32) -> Vec<Vec2> {
    let mut points = Vec::with_capacity(2);
    let d1 = direction.dot(v1) - offset;
    let d2 = direction.dot(v2) - offset;
    if d1 >= 0.0 {
        points.push(v1);
    }
    if d2 >= 0.0 {
        points.push(v2);
    }
    if d1 * d2 < 0.0 {
        let t = d1 / (d1 - d2);
        points.push(v1 + (v2 - v1) * t);
    }
    points
}

/// Clip `incident` against the side planes of `reference`, then drop points
/// in front of the reference face. `normal` is the collision normal pointing
/// away from the reference piece. Fewer than two surviving side-clip points
/// yield no contacts.
pub fn clip_edges(reference: &Edge, incident: &Edge, normal: Vec2) -> Vec<ClipPoint> {
    if reference.is_degenerate() || incident.is_degenerate() {
        return Vec::new();
    }
    let direction = reference.vector().normalize_or_zero();

    let o1 = direction.dot(reference.a);
    let points = clip(incident.a, incident.b, direction, o1);
    if points.len() < 2 {
        return Vec::new();
    }

    let o2 = direction.dot(reference.b);
    let points = clip(points[0], points[1], -direction, -o2);
    if points.len() < 2 {
        return Vec::new();
    }

    let mut face = direction.perp();
    if face.dot(normal) < 0.0 {
        face = -face;
    }
    let max = face.dot(reference.max);

    points
        .into_iter()
        .filter_map(|p| {
            let depth = max - face.dot(p);
            (depth >= 0.0).then_some(ClipPoint { position: p, depth })
        })
        .collect()
}

/// Contact points for two pieces already known to overlap along `separation`.
/// Empty when either piece has no edges.
pub fn contact_points(a: &Convex, b: &Convex, separation: &Separation) -> Vec<ClipPoint> {
    let n = separation.normal;
    let (Some(e1), Some(e2)) = (a.best_edge(n), b.best_edge(-n)) else {
        return Vec::new();
    };
    let alignment = |e: &Edge| e.vector().normalize_or_zero().dot(n).abs();
    if alignment(&e1) <= alignment(&e2) {
        clip_edges(&e1, &e2, n)
    } else {
        clip_edges(&e2, &e1, -n)
    }
}
