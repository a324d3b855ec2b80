//! Narrowphase collision detection between shape pairs.
//!
//! Every pair reduces to convex pieces in world space: boxes and convex
//! polygons are one piece, concave polygons are their decomposition and grids
//! are one polygon per occupied cell. The separating-axis test picks the
//! normal and depth, then edge clipping refines contact points.

use glam::Vec2;

use crate::geometry::{decompose, Polygon, Segment};

use super::clip;
use super::collider::{BoxShape, CircleShape, Shape};
use super::contact::Contact;
use super::grid::GridShape;
use super::sat::{self, Convex, Separation};

/// A pair result before it is reported as one or many contacts.
#[derive(Debug, Clone)]
struct PairHit {
    normal: Vec2,
    depth: f32,
    /// Default contact position when clipping yields nothing.
    fallback: Vec2,
    points: Vec<clip::ClipPoint>,
}

impl PairHit {
    fn refine(a: &Convex, b: &Convex, separation: Separation) -> Self {
        Self {
            normal: separation.normal,
            depth: separation.depth,
            fallback: b.support(-separation.normal),
            points: clip::contact_points(a, b, &separation),
        }
    }

    fn between(a: &Convex, b: &Convex) -> Option<Self> {
        sat::separate(a, b).map(|s| Self::refine(a, b, s))
    }

    fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }

    /// SAT depth at the mean clipped point.
    fn summary(&self) -> Contact {
        let position = if self.points.is_empty() {
            self.fallback
        } else {
            self.points.iter().map(|p| p.position).sum::<Vec2>() / self.points.len() as f32
        };
        Contact::new(position, self.normal, self.depth)
    }

    /// One contact per clipped point, or the default contact.
    fn into_contacts(self) -> Vec<Contact> {
        if self.points.is_empty() {
            return vec![Contact::new(self.fallback, self.normal, self.depth)];
        }
        self.points
            .into_iter()
            .map(|p| Contact::new(p.position, self.normal, p.depth))
            .collect()
    }
}

/// Convex pieces of a non-grid shape placed at `position`.
fn pieces(shape: &Shape, position: Vec2) -> Vec<Convex> {
    match shape {
        Shape::Box(b) => vec![Convex::from_box(b, position)],
        Shape::Circle(c) => vec![Convex::circle(position, c.radius)],
        Shape::Polygon(p) => p
            .components()
            .iter()
            .map(|c| Convex::polygon(c, position))
            .collect(),
        Shape::Grid(_) => Vec::new(),
    }
}

/// First intersecting piece pair. Deeper pairs later in the decomposition
/// are not considered.
fn first_hit(a: &[Convex], b: &[Convex]) -> Option<PairHit> {
    a.iter()
        .flat_map(|pa| b.iter().map(move |pb| (pa, pb)))
        .find_map(|(pa, pb)| PairHit::between(pa, pb))
}

fn pair_hit(a: &Shape, pos_a: Vec2, b: &Shape, pos_b: Vec2) -> Option<PairHit> {
    match (a, b) {
        (Shape::Grid(_), Shape::Grid(_)) => None,
        (Shape::Grid(grid), other) => deepest(grid_hits(grid, pos_a, other, pos_b)),
        (other, Shape::Grid(grid)) => {
            deepest(grid_hits(grid, pos_b, other, pos_a)).map(PairHit::flipped)
        }
        (Shape::Box(ba), Shape::Box(bb)) if ba.is_axis_aligned() && bb.is_axis_aligned() => {
            let separation = aabb_separation(ba, pos_a, bb, pos_b)?;
            Some(PairHit::refine(
                &Convex::from_box(ba, pos_a),
                &Convex::from_box(bb, pos_b),
                separation,
            ))
        }
        _ => first_hit(&pieces(a, pos_a), &pieces(b, pos_b)),
    }
}

fn deepest(hits: Vec<PairHit>) -> Option<PairHit> {
    hits.into_iter().reduce(|best, hit| if hit.depth > best.depth { hit } else { best })
}

/// Test two shapes. The contact normal points from `a` to `b`.
pub fn test(a: &Shape, pos_a: Vec2, b: &Shape, pos_b: Vec2) -> Option<Contact> {
    pair_hit(a, pos_a, b, pos_b).map(|hit| hit.summary())
}

/// Whether two shapes overlap.
pub fn overlaps(a: &Shape, pos_a: Vec2, b: &Shape, pos_b: Vec2) -> bool {
    test(a, pos_a, b, pos_b).is_some()
}

/// Refined contacts between two shapes, empty when they do not touch.
/// Against a grid, each intersecting tile reports its own contact.
pub fn contacts(a: &Shape, pos_a: Vec2, b: &Shape, pos_b: Vec2) -> Vec<Contact> {
    match (a, b) {
        (Shape::Grid(_), Shape::Grid(_)) => Vec::new(),
        (Shape::Grid(grid), other) => test_grid(grid, pos_a, other, pos_b),
        (other, Shape::Grid(grid)) => test_grid(grid, pos_b, other, pos_a)
            .into_iter()
            .map(Contact::flipped)
            .collect(),
        _ => pair_hit(a, pos_a, b, pos_b)
            .map(PairHit::into_contacts)
            .unwrap_or_default(),
    }
}

fn aabb_separation(a: &BoxShape, pos_a: Vec2, b: &BoxShape, pos_b: Vec2) -> Option<Separation> {
    let delta = pos_b - pos_a;
    let overlap = a.half_extents + b.half_extents - delta.abs();
    if overlap.x <= 0.0 || overlap.y <= 0.0 {
        return None;
    }
    // Equal overlap keeps the x axis, which the polygon test visits first.
    if overlap.x <= overlap.y {
        let sign = if delta.x >= 0.0 { 1.0 } else { -1.0 };
        Some(Separation {
            normal: Vec2::new(sign, 0.0),
            depth: overlap.x,
        })
    } else {
        let sign = if delta.y >= 0.0 { 1.0 } else { -1.0 };
        Some(Separation {
            normal: Vec2::new(0.0, sign),
            depth: overlap.y,
        })
    }
}

/// Box against box. Axis-aligned pairs skip the general polygon test.
pub fn check_box_box(a: &BoxShape, pos_a: Vec2, b: &BoxShape, pos_b: Vec2) -> Option<Contact> {
    test(&Shape::Box(*a), pos_a, &Shape::Box(*b), pos_b)
}

pub fn check_circle_circle(
    a: &CircleShape,
    pos_a: Vec2,
    b: &CircleShape,
    pos_b: Vec2,
) -> Option<Contact> {
    let sa = Convex::circle(pos_a, a.radius);
    let sb = Convex::circle(pos_b, b.radius);
    PairHit::between(&sa, &sb).map(|hit| hit.summary())
}

pub fn check_circle_box(
    circle: &CircleShape,
    pos_circle: Vec2,
    shape: &BoxShape,
    pos_box: Vec2,
) -> Option<Contact> {
    let sa = Convex::circle(pos_circle, circle.radius);
    let sb = Convex::from_box(shape, pos_box);
    PairHit::between(&sa, &sb).map(|hit| hit.summary())
}

/// Any non-grid shape against a polygon, convex or not.
pub fn check_shape_polygon(
    shape: &Shape,
    pos_shape: Vec2,
    polygon: &Polygon,
    pos_polygon: Vec2,
) -> Option<Contact> {
    let b: Vec<Convex> = polygon
        .components()
        .iter()
        .map(|c| Convex::polygon(c, pos_polygon))
        .collect();
    first_hit(&pieces(shape, pos_shape), &b).map(|hit| hit.summary())
}

fn grid_hits(grid: &GridShape, pos_grid: Vec2, other: &Shape, pos_other: Vec2) -> Vec<PairHit> {
    if matches!(other, Shape::Grid(_)) {
        return Vec::new();
    }
    let area = other.bounding_box(pos_other).translate(-pos_grid);
    let other_pieces = pieces(other, pos_other);
    grid.cells_in(area)
        .filter_map(|(column, row)| {
            let tile = grid.tile_polygon(column, row)?;
            let tile_pieces: Vec<Convex> = tile
                .components()
                .iter()
                .map(|c| Convex::polygon(c, pos_grid))
                .collect();
            first_hit(&tile_pieces, &other_pieces)
        })
        .collect()
}

/// One contact per grid tile intersecting `other`, normals pointing from the
/// grid toward `other`.
pub fn test_grid(grid: &GridShape, pos_grid: Vec2, other: &Shape, pos_other: Vec2) -> Vec<Contact> {
    grid_hits(grid, pos_grid, other, pos_other)
        .iter()
        .map(PairHit::summary)
        .collect()
}

/// Segment intersection with a convex piece. `t` is the parameter along the
/// segment of the hit point.
fn segment_convex(segment: &Segment, piece: &Convex) -> Option<(f32, Contact)> {
    let separation = sat::separate(&Convex::segment(segment), piece)?;
    let length = segment.length();

    // Boundary crossing closest to the start, with the outward surface normal.
    let crossing = match piece {
        Convex::Polygon { vertices, .. } => {
            let n = vertices.len();
            (0..n)
                .filter_map(|i| {
                    let edge = Segment::new(vertices[i], vertices[(i + 1) % n]);
                    let t = segment.intersection(&edge)?;
                    let outward = -edge.perpendicular() * winding(vertices);
                    Some((t, outward))
                })
                .min_by(|a, b| a.0.total_cmp(&b.0))
        }
        Convex::Circle { center, radius } => {
            circle_crossing(segment, *center, *radius).map(|t| {
                let outward = (segment.point_at(t) - *center).normalize_or_zero();
                (t, outward)
            })
        }
    };

    let starts_inside = match piece {
        Convex::Polygon { vertices, .. } => contains_convex(vertices, segment.start),
        Convex::Circle { center, radius } => segment.start.distance_squared(*center) <= radius * radius,
    };

    let (t, normal) = match crossing {
        Some((t, outward)) if !starts_inside => (t, -outward),
        _ => (0.0, separation.normal),
    };
    Some((
        t,
        Contact::new(segment.point_at(t), normal, (1.0 - t) * length),
    ))
}

/// 1 for counter-clockwise loops, -1 otherwise.
fn winding(vertices: &[Vec2]) -> f32 {
    if decompose::signed_area(vertices) >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

fn contains_convex(vertices: &[Vec2], point: Vec2) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0.0f32;
    for i in 0..n {
        let (a, b) = (vertices[i], vertices[(i + 1) % n]);
        let cross = (b - a).perp_dot(point - a);
        if cross == 0.0 {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}

/// Smallest parameter in `[0, 1]` where the segment meets the circle boundary.
fn circle_crossing(segment: &Segment, center: Vec2, radius: f32) -> Option<f32> {
    let d = segment.vector();
    let f = segment.start - center;
    let a = d.dot(d);
    if a <= f32::EPSILON {
        return None;
    }
    let b = 2.0 * f.dot(d);
    let c = f.dot(f) - radius * radius;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    [(-b - root) / (2.0 * a), (-b + root) / (2.0 * a)]
        .into_iter()
        .filter(|t| (0.0..=1.0).contains(t))
        .min_by(f32::total_cmp)
}

fn nearest(hits: impl Iterator<Item = (f32, Contact)>) -> Option<(f32, Contact)> {
    hits.min_by(|a, b| a.0.total_cmp(&b.0))
}

/// Segment against a shape placed at `position`. The contact sits at the hit
/// point nearest the segment start, its normal points into the shape and its
/// penetration is the segment length left past the hit.
pub fn test_segment(segment: &Segment, shape: &Shape, position: Vec2) -> Option<Contact> {
    let hit = match shape {
        Shape::Grid(grid) => {
            let area = segment.bounding_box().translate(-position);
            nearest(grid.cells_in(area).filter_map(|(column, row)| {
                let tile = grid.tile_polygon(column, row)?;
                nearest(
                    tile.components()
                        .iter()
                        .filter_map(|c| segment_convex(segment, &Convex::polygon(c, position))),
                )
            }))
        }
        _ => nearest(
            pieces(shape, position)
                .iter()
                .filter_map(|piece| segment_convex(segment, piece)),
        ),
    };
    hit.map(|(_, contact)| contact)
}
