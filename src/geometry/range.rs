//! Scalar projection intervals used by separating-axis tests.

/// Closed interval `[min, max]` of a shape projected onto an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Interval spanning every value yielded by `values`. Returns a degenerate
    /// range at zero for an empty iterator.
    pub fn from_values(values: impl IntoIterator<Item = f32>) -> Self {
        let mut iter = values.into_iter();
        let Some(first) = iter.next() else {
            return Self::new(0.0, 0.0);
        };
        iter.fold(Self::new(first, first), |range, v| {
            Self::new(range.min.min(v), range.max.max(v))
        })
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> f32 {
        (self.min + self.max) * 0.5
    }

    /// Zero-length interval, produced by projecting a segment onto its normal.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.length() <= f32::EPSILON
    }

    /// Whether the intervals share interior. Touching ranges do not intersect,
    /// unless one of them is degenerate, in which case touching counts.
    #[inline]
    pub fn intersects(&self, other: &Range) -> bool {
        if self.is_degenerate() || other.is_degenerate() {
            self.min <= other.max && other.min <= self.max
        } else {
            self.min < other.max && other.min < self.max
        }
    }

    /// Length of the shared part of both intervals. Negative when disjoint.
    #[inline]
    pub fn overlap(&self, other: &Range) -> f32 {
        self.max.min(other.max) - self.min.max(other.min)
    }

    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Shift both ends by `offset`.
    #[inline]
    pub fn offset(&self, offset: f32) -> Self {
        Self::new(self.min + offset, self.max + offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_and_intersection() {
        let a = Range::new(0.0, 10.0);
        let b = Range::new(5.0, 15.0);
        let c = Range::new(10.0, 12.0);

        assert_eq!(a.overlap(&b), 5.0);
        assert!(a.intersects(&b));
        // Touching solid ranges do not intersect.
        assert!(!a.intersects(&c));
        assert!(a.overlap(&Range::new(11.0, 12.0)) < 0.0);
    }

    #[test]
    fn test_degenerate_touching_counts() {
        let solid = Range::new(-1.0, 1.0);
        let point = Range::new(1.0, 1.0);
        assert!(point.is_degenerate());
        assert!(solid.intersects(&point));
        assert!(!solid.intersects(&Range::new(1.5, 1.5)));
    }

    #[test]
    fn test_from_values() {
        let range = Range::from_values([3.0, -2.0, 7.5, 0.0]);
        assert_eq!(range, Range::new(-2.0, 7.5));
        assert_eq!(Range::from_values(std::iter::empty()), Range::new(0.0, 0.0));
    }
}
