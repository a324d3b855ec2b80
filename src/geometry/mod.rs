//! Geometry primitives: projection ranges, rectangles, segments and polygons.

pub mod decompose;
pub mod polygon;
pub mod range;
pub mod rect;
pub mod segment;

pub use polygon::Polygon;
pub use range::Range;
pub use rect::Rect;
pub use segment::Segment;
