//! Axis-aligned rectangles used as shape bounding boxes.

use glam::Vec2;

/// Axis-aligned rectangle described by its minimum and maximum corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Rectangle of the given size centered on `center`.
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() * 0.5;
        Self::new(center - half, center + half)
    }

    /// Smallest rectangle containing every point. `None` for an empty input.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), |rect, p| Self {
            min: rect.min.min(p),
            max: rect.max.max(p),
        }))
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Strict overlap test; rectangles sharing only an edge do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    #[inline]
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    #[inline]
    pub fn translate(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    pub fn union(&self, other: &Rect) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Corners in counter-clockwise order (for a y-up frame), starting at `min`.
    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_overlap() {
        let a = Rect::from_center_size(Vec2::ZERO, Vec2::splat(10.0));
        let b = Rect::from_center_size(Vec2::new(5.0, 0.0), Vec2::splat(10.0));
        let c = Rect::from_center_size(Vec2::new(10.0, 0.0), Vec2::splat(10.0));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c), "edge contact is not an overlap");
    }

    #[test]
    fn test_rect_from_points() {
        let rect = Rect::from_points([Vec2::new(1.0, 4.0), Vec2::new(-2.0, 0.5), Vec2::new(3.0, 2.0)])
            .unwrap();
        assert_eq!(rect.min, Vec2::new(-2.0, 0.5));
        assert_eq!(rect.max, Vec2::new(3.0, 4.0));
        assert!(Rect::from_points(Vec::new()).is_none());
    }

    #[test]
    fn test_new_normalizes_corners() {
        let rect = Rect::new(Vec2::new(4.0, 4.0), Vec2::new(0.0, 1.0));
        assert_eq!(rect.min, Vec2::new(0.0, 1.0));
        assert_eq!(rect.size(), Vec2::new(4.0, 3.0));
    }
}
