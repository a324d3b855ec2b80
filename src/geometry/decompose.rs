//! Convex decomposition of simple concave polygons.
//!
//! Ear-clipping triangulation followed by greedy merging of adjacent
//! triangles into larger convex pieces.

use glam::Vec2;

const EPSILON: f32 = 1e-6;

/// Twice the signed area. Positive for counter-clockwise winding in a y-up frame.
pub fn signed_area(vertices: &[Vec2]) -> f32 {
    let n = vertices.len();
    (0..n)
        .map(|i| vertices[i].perp_dot(vertices[(i + 1) % n]))
        .sum::<f32>()
        * 0.5
}

/// Cross-product sign consistency over consecutive vertex triples.
/// Collinear triples are ignored.
pub fn is_convex(vertices: &[Vec2]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0.0f32;
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let c = vertices[(i + 2) % n];
        let cross = (b - a).perp_dot(c - b);
        if cross.abs() < EPSILON {
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

/// Point-in-triangle test for either winding. Points on an edge count as
/// inside, so a vertex lying on a candidate diagonal rejects the ear.
fn triangle_contains(a: Vec2, b: Vec2, c: Vec2, p: Vec2) -> bool {
    let d1 = (b - a).perp_dot(p - a);
    let d2 = (c - b).perp_dot(p - b);
    let d3 = (a - c).perp_dot(p - c);
    let has_negative = d1 < -EPSILON || d2 < -EPSILON || d3 < -EPSILON;
    let has_positive = d1 > EPSILON || d2 > EPSILON || d3 > EPSILON;
    !(has_negative && has_positive)
}

/// Ear-clipping triangulation. Triangles keep the input winding.
pub fn triangulate(vertices: &[Vec2]) -> Vec<[Vec2; 3]> {
    let n = vertices.len();
    if n < 3 {
        return Vec::new();
    }
    let winding = if signed_area(vertices) >= 0.0 { 1.0 } else { -1.0 };

    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);
    let mut cursor = 0usize;
    let mut misses = 0usize;

    while remaining.len() > 3 {
        let len = remaining.len();
        cursor %= len;
        let prev = remaining[(cursor + len - 1) % len];
        let curr = remaining[cursor];
        let next = remaining[(cursor + 1) % len];
        let (a, b, c) = (vertices[prev], vertices[curr], vertices[next]);

        let convex_corner = (b - a).perp_dot(c - b) * winding > EPSILON;
        let is_ear = convex_corner
            && remaining
                .iter()
                .filter(|&&i| i != prev && i != curr && i != next)
                .all(|&i| !triangle_contains(a, b, c, vertices[i]));

        // A full pass without an ear means degenerate input; clip anyway.
        if is_ear || misses >= len {
            triangles.push([a, b, c]);
            remaining.remove(cursor);
            misses = 0;
        } else {
            cursor += 1;
            misses += 1;
        }
    }

    triangles.push([
        vertices[remaining[0]],
        vertices[remaining[1]],
        vertices[remaining[2]],
    ]);
    triangles
}

/// Merge two same-winding convex pieces sharing an edge. `None` when they
/// share no edge or the union would be concave.
fn merge_pieces(p: &[Vec2], q: &[Vec2]) -> Option<Vec<Vec2>> {
    let (np, nq) = (p.len(), q.len());
    for i in 0..np {
        let (pa, pb) = (p[i], p[(i + 1) % np]);
        for j in 0..nq {
            let (qa, qb) = (q[j], q[(j + 1) % nq]);
            if pa != qb || pb != qa {
                continue;
            }
            // Walk p from pb round to pa, then q's remaining vertices.
            let mut merged = Vec::with_capacity(np + nq - 2);
            for k in 0..np {
                merged.push(p[(i + 1 + k) % np]);
            }
            for k in 0..nq - 2 {
                merged.push(q[(j + 2 + k) % nq]);
            }
            return is_convex(&merged).then_some(merged);
        }
    }
    None
}

/// Split a polygon into convex pieces.
pub fn decompose(vertices: &[Vec2]) -> Vec<Vec<Vec2>> {
    let mut pieces: Vec<Vec<Vec2>> = triangulate(vertices)
        .into_iter()
        .map(|t| t.to_vec())
        .collect();

    loop {
        let mut merged_any = false;
        'search: for i in 0..pieces.len() {
            for j in (i + 1)..pieces.len() {
                if let Some(merged) = merge_pieces(&pieces[i], &pieces[j]) {
                    pieces[i] = merged;
                    pieces.remove(j);
                    merged_any = true;
                    break 'search;
                }
            }
        }
        if !merged_any {
            break;
        }
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_shape() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 2.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(2.0, 4.0),
            Vec2::new(0.0, 4.0),
        ]
    }

    #[test]
    fn test_convexity() {
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        assert!(is_convex(&square));
        assert!(!is_convex(&l_shape()));
    }

    #[test]
    fn test_triangulate_preserves_area() {
        let shape = l_shape();
        let triangles = triangulate(&shape);
        assert_eq!(triangles.len(), shape.len() - 2);
        let total: f32 = triangles.iter().map(|t| signed_area(t)).sum();
        assert!((total - signed_area(&shape)).abs() < 1e-4);
        assert!(triangles.iter().all(|t| signed_area(t) > 0.0));
    }

    #[test]
    fn test_decompose_l_shape() {
        let shape = l_shape();
        let pieces = decompose(&shape);
        assert!(pieces.len() >= 2 && pieces.len() < 4, "got {} pieces", pieces.len());
        assert!(pieces.iter().all(|p| is_convex(p)));
        let total: f32 = pieces.iter().map(|p| signed_area(p)).sum();
        assert!((total - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_decompose_clockwise_input() {
        let mut shape = l_shape();
        shape.reverse();
        let pieces = decompose(&shape);
        assert!(pieces.iter().all(|p| is_convex(p)));
        let total: f32 = pieces.iter().map(|p| signed_area(p)).sum();
        assert!((total + 12.0).abs() < 1e-4);
    }
}
