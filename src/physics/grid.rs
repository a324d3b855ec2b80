//! Tile grid shape.
//!
//! A grid is a row-major array of cells, each empty, a solid box filling the
//! cell, or a polygon from a tile definition. Polygon tiles may carry flip bits
//! decoded from a packed tile id; the transformed polygon is cached per
//! `(id, flip)` when the tile is placed.

use std::collections::HashMap;

use glam::Vec2;

use crate::error::{PhysicsError, Result};
use crate::geometry::{Polygon, Rect};

/// Flip encoded in the top three bits of a packed tile id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TileFlip {
    pub horizontal: bool,
    pub vertical: bool,
    pub diagonal: bool,
}

impl TileFlip {
    pub const HORIZONTAL_BIT: u32 = 1 << 31;
    pub const VERTICAL_BIT: u32 = 1 << 30;
    pub const DIAGONAL_BIT: u32 = 1 << 29;
    const MASK: u32 = Self::HORIZONTAL_BIT | Self::VERTICAL_BIT | Self::DIAGONAL_BIT;

    pub const NONE: TileFlip = TileFlip {
        horizontal: false,
        vertical: false,
        diagonal: false,
    };

    /// Split a packed id into the base tile id and its flip.
    pub fn from_gid(gid: u32) -> (u32, TileFlip) {
        let flip = TileFlip {
            horizontal: gid & Self::HORIZONTAL_BIT != 0,
            vertical: gid & Self::VERTICAL_BIT != 0,
            diagonal: gid & Self::DIAGONAL_BIT != 0,
        };
        (gid & !Self::MASK, flip)
    }

    pub fn is_identity(self) -> bool {
        self == Self::NONE
    }

    fn key(self) -> u8 {
        (self.horizontal as u8) << 2 | (self.vertical as u8) << 1 | self.diagonal as u8
    }

    /// Transform a tile-local point. The diagonal flip swaps axes first, then
    /// the horizontal and vertical flips mirror within the tile.
    pub fn apply(self, point: Vec2, tile_size: Vec2) -> Vec2 {
        let mut p = point;
        if self.diagonal {
            // Normalize through the tile so non-square tiles stay in bounds.
            let n = p / tile_size;
            p = Vec2::new(n.y, n.x) * tile_size;
        }
        if self.horizontal {
            p.x = tile_size.x - p.x;
        }
        if self.vertical {
            p.y = tile_size.y - p.y;
        }
        p
    }

    fn transform(self, polygon: &Polygon, tile_size: Vec2) -> Polygon {
        let mut variant = polygon.clone();
        if self.is_identity() {
            return variant;
        }
        let positions: Vec<Vec2> = polygon
            .vertices()
            .iter()
            .map(|v| self.apply(*v, tile_size))
            .collect();
        // Same vertex count, so this cannot fail.
        let _ = variant.set_vertex_positions(&positions);
        variant
    }
}

/// Content of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    /// Solid box filling the cell.
    Solid,
    /// Polygon from a tile definition, optionally flipped.
    Polygon { id: u32, flip: TileFlip },
}

#[derive(Debug, Clone)]
pub struct GridShape {
    columns: usize,
    rows: usize,
    tile_size: Vec2,
    cells: Vec<Option<Tile>>,
    definitions: HashMap<u32, Polygon>,
    variants: HashMap<(u32, u8), Polygon>,
    solid: Polygon,
}

impl GridShape {
    pub fn new(columns: usize, rows: usize, tile_size: Vec2) -> Self {
        let tile_size = tile_size.abs();
        Self {
            columns,
            rows,
            tile_size,
            cells: vec![None; columns * rows],
            definitions: HashMap::new(),
            variants: HashMap::new(),
            solid: Polygon::from_rect(Rect::new(Vec2::ZERO, tile_size)),
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn tile_size(&self) -> Vec2 {
        self.tile_size
    }

    /// Extent of the whole grid.
    pub fn size(&self) -> Vec2 {
        self.tile_size * Vec2::new(self.columns as f32, self.rows as f32)
    }

    /// The grid's origin is its minimum corner.
    pub fn bounding_box(&self, position: Vec2) -> Rect {
        Rect::new(position, position + self.size())
    }

    /// Register the collision polygon for a tile id, in tile-local coordinates
    /// spanning `[0, tile_size]`. Cached flipped variants of a redefined id
    /// are rebuilt.
    pub fn define_polygon_tile(&mut self, id: u32, polygon: Polygon) {
        self.definitions.insert(id, polygon);
        self.variants.retain(|(variant_id, _), _| *variant_id != id);
        let placed: Vec<TileFlip> = self
            .cells
            .iter()
            .filter_map(|cell| match cell {
                Some(Tile::Polygon { id: tile_id, flip }) if *tile_id == id => Some(*flip),
                _ => None,
            })
            .collect();
        for flip in placed {
            self.cache_variant(id, flip);
        }
    }

    fn cache_variant(&mut self, id: u32, flip: TileFlip) {
        if self.variants.contains_key(&(id, flip.key())) {
            return;
        }
        if let Some(definition) = self.definitions.get(&id) {
            let variant = flip.transform(definition, self.tile_size);
            self.variants.insert((id, flip.key()), variant);
        }
    }

    fn index(&self, column: usize, row: usize) -> Result<usize> {
        if column >= self.columns || row >= self.rows {
            return Err(PhysicsError::CellOutOfBounds { column, row });
        }
        Ok(row * self.columns + column)
    }

    pub fn set_tile(&mut self, column: usize, row: usize, tile: Option<Tile>) -> Result<()> {
        let index = self.index(column, row)?;
        if let Some(Tile::Polygon { id, flip }) = tile {
            if !self.definitions.contains_key(&id) {
                return Err(PhysicsError::UnknownTile(id));
            }
            self.cache_variant(id, flip);
        }
        self.cells[index] = tile;
        Ok(())
    }

    /// Place a packed tile id. Id 0 clears the cell; ids without a polygon
    /// definition become solid boxes.
    pub fn set_gid(&mut self, column: usize, row: usize, gid: u32) -> Result<()> {
        let (id, flip) = TileFlip::from_gid(gid);
        let tile = if id == 0 {
            None
        } else if self.definitions.contains_key(&id) {
            Some(Tile::Polygon { id, flip })
        } else {
            Some(Tile::Solid)
        };
        self.set_tile(column, row, tile)
    }

    pub fn tile(&self, column: usize, row: usize) -> Option<Tile> {
        let index = self.index(column, row).ok()?;
        self.cells[index]
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
    }

    /// Minimum corner of a cell relative to the grid origin.
    pub fn cell_origin(&self, column: usize, row: usize) -> Vec2 {
        Vec2::new(column as f32, row as f32) * self.tile_size
    }

    /// Collision polygon of a cell in grid-local coordinates.
    pub fn tile_polygon(&self, column: usize, row: usize) -> Option<Polygon> {
        let origin = self.cell_origin(column, row);
        let local = match self.tile(column, row)? {
            Tile::Solid => &self.solid,
            Tile::Polygon { id, flip } => self.variants.get(&(id, flip.key()))?,
        };
        Some(local.translated(origin))
    }

    /// Occupied cells whose extent touches `area`, given in grid-local
    /// coordinates.
    pub fn cells_in(&self, area: Rect) -> impl Iterator<Item = (usize, usize)> + '_ {
        let (columns, rows) = self.cell_span(area);
        rows.flat_map(move |row| columns.clone().map(move |column| (column, row)))
            .filter(|&(column, row)| self.tile(column, row).is_some())
    }

    fn cell_span(&self, area: Rect) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
        if self.tile_size.x <= 0.0 || self.tile_size.y <= 0.0 {
            return (0..0, 0..0);
        }
        let span = |min: f32, max: f32, size: f32, count: usize| {
            let first = (min / size).floor().max(0.0) as usize;
            let last = ((max / size).floor() as i64 + 1).clamp(0, count as i64) as usize;
            first.min(last)..last
        };
        (
            span(area.min.x, area.max.x, self.tile_size.x, self.columns),
            span(area.min.y, area.max.y, self.tile_size.y, self.rows),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slope() -> Polygon {
        Polygon::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(16.0, 0.0),
            Vec2::new(16.0, 16.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_gid_decoding() {
        let (id, flip) = TileFlip::from_gid(TileFlip::HORIZONTAL_BIT | TileFlip::DIAGONAL_BIT | 7);
        assert_eq!(id, 7);
        assert!(flip.horizontal && flip.diagonal && !flip.vertical);
        assert_eq!(TileFlip::from_gid(3), (3, TileFlip::NONE));
    }

    #[test]
    fn test_flipped_variant_cached() {
        let mut grid = GridShape::new(4, 4, Vec2::splat(16.0));
        grid.define_polygon_tile(1, slope());
        grid.set_gid(1, 0, TileFlip::HORIZONTAL_BIT | 1).unwrap();

        let polygon = grid.tile_polygon(1, 0).unwrap();
        // Mirrored within the cell at x in [16, 32].
        assert!(polygon.vertices().contains(&Vec2::new(16.0, 16.0)));
        assert!(polygon.vertices().contains(&Vec2::new(32.0, 0.0)));
        assert!(polygon.is_convex());
    }

    #[test]
    fn test_unknown_ids_are_solid() {
        let mut grid = GridShape::new(2, 2, Vec2::splat(8.0));
        grid.set_gid(0, 1, 42).unwrap();
        assert_eq!(grid.tile(0, 1), Some(Tile::Solid));
        let polygon = grid.tile_polygon(0, 1).unwrap();
        assert_eq!(polygon.bounding_box(), Rect::new(Vec2::new(0.0, 8.0), Vec2::new(8.0, 16.0)));

        grid.set_gid(0, 1, 0).unwrap();
        assert_eq!(grid.tile(0, 1), None);
    }

    #[test]
    fn test_set_tile_errors() {
        let mut grid = GridShape::new(2, 2, Vec2::splat(8.0));
        assert_eq!(
            grid.set_tile(2, 0, Some(Tile::Solid)).unwrap_err(),
            PhysicsError::CellOutOfBounds { column: 2, row: 0 }
        );
        assert_eq!(
            grid.set_tile(0, 0, Some(Tile::Polygon { id: 9, flip: TileFlip::NONE }))
                .unwrap_err(),
            PhysicsError::UnknownTile(9)
        );
    }

    #[test]
    fn test_redefinition_refreshes_variants() {
        let mut grid = GridShape::new(1, 1, Vec2::splat(16.0));
        grid.define_polygon_tile(1, slope());
        grid.set_gid(0, 0, TileFlip::VERTICAL_BIT | 1).unwrap();
        grid.define_polygon_tile(1, Polygon::from_rect(Rect::new(Vec2::ZERO, Vec2::new(16.0, 8.0))));
        let bounds = grid.tile_polygon(0, 0).unwrap().bounding_box();
        assert_eq!(bounds, Rect::new(Vec2::new(0.0, 8.0), Vec2::new(16.0, 16.0)));
    }

    #[test]
    fn test_cells_in_area() {
        let mut grid = GridShape::new(4, 4, Vec2::splat(10.0));
        grid.set_tile(0, 0, Some(Tile::Solid)).unwrap();
        grid.set_tile(2, 1, Some(Tile::Solid)).unwrap();
        grid.set_tile(3, 3, Some(Tile::Solid)).unwrap();

        let cells: Vec<_> = grid
            .cells_in(Rect::new(Vec2::new(-5.0, -5.0), Vec2::new(25.0, 15.0)))
            .collect();
        assert_eq!(cells, vec![(0, 0), (2, 1)]);

        let outside: Vec<_> = grid
            .cells_in(Rect::new(Vec2::new(100.0, 100.0), Vec2::new(120.0, 120.0)))
            .collect();
        assert!(outside.is_empty());
    }
}
