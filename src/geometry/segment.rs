//! Line segments, used by raycasts and segment queries.

use glam::Vec2;

use super::rect::Rect;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
}

impl Segment {
    pub const fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    /// Segment starting at `origin` and running `distance` along `direction`.
    pub fn from_ray(origin: Vec2, direction: Vec2, distance: f32) -> Self {
        Self::new(origin, origin + direction.normalize_or_zero() * distance)
    }

    #[inline]
    pub fn vector(&self) -> Vec2 {
        self.end - self.start
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.vector().length()
    }

    /// Unit direction, zero for a degenerate segment.
    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.vector().normalize_or_zero()
    }

    /// Unit perpendicular, zero for a degenerate segment.
    #[inline]
    pub fn perpendicular(&self) -> Vec2 {
        self.direction().perp()
    }

    #[inline]
    pub fn point_at(&self, t: f32) -> Vec2 {
        self.start + self.vector() * t
    }

    pub fn bounding_box(&self) -> Rect {
        Rect::new(self.start, self.end)
    }

    /// Closest point on the segment to `point`.
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        let v = self.vector();
        let len_sq = v.length_squared();
        if len_sq < 1e-12 {
            return self.start;
        }
        let t = ((point - self.start).dot(v) / len_sq).clamp(0.0, 1.0);
        self.start + v * t
    }

    /// Parameter `t` along this segment where it crosses `other`, if they cross.
    pub fn intersection(&self, other: &Segment) -> Option<f32> {
        let d1 = self.vector();
        let d2 = other.vector();
        let denominator = d1.perp_dot(d2);
        if denominator.abs() < 1e-10 {
            // Parallel or collinear: no single crossing point.
            return None;
        }
        let delta = other.start - self.start;
        let t = delta.perp_dot(d2) / denominator;
        let u = delta.perp_dot(d1) / denominator;
        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            Some(t)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_intersection() {
        let a = Segment::new(Vec2::ZERO, Vec2::new(10.0, 0.0));
        let b = Segment::new(Vec2::new(4.0, -1.0), Vec2::new(4.0, 1.0));
        let t = a.intersection(&b).unwrap();
        assert!((t - 0.4).abs() < 1e-5);

        let parallel = Segment::new(Vec2::new(0.0, 1.0), Vec2::new(10.0, 1.0));
        assert!(a.intersection(&parallel).is_none());

        let short = Segment::new(Vec2::new(12.0, -1.0), Vec2::new(12.0, 1.0));
        assert!(a.intersection(&short).is_none());
    }

    #[test]
    fn test_closest_point_clamps() {
        let s = Segment::new(Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert_eq!(s.closest_point(Vec2::new(5.0, 3.0)), Vec2::new(5.0, 0.0));
        assert_eq!(s.closest_point(Vec2::new(-4.0, 3.0)), Vec2::ZERO);
        assert_eq!(s.closest_point(Vec2::new(14.0, 0.0)), Vec2::new(10.0, 0.0));
    }
}
