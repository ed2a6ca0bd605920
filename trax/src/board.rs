//! Sparse, unbounded grid of placed tiles.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tile::{Direction, Tile};

/// Cell on the grid. `y` grows southward.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The adjacent cell on `direction`, or `None` past the edge of the
    /// coordinate range.
    pub fn neighbor(self, direction: Direction) -> Option<Coord> {
        let (dx, dy) = direction.offset();
        Some(Coord::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
    }

    pub fn neighbors(self) -> impl Iterator<Item = (Direction, Coord)> {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| Some((dir, self.neighbor(dir)?)))
    }

    /// Whether all four neighbors exist. Tiles may only go on such cells, so
    /// every track end on the board points at a real cell.
    pub fn is_playable(self) -> bool {
        self.neighbors().count() == Direction::ALL.len()
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl BoundingBox {
    pub fn horizontal_span(&self) -> i32 {
        self.max_x.saturating_sub(self.min_x)
    }

    pub fn vertical_span(&self) -> i32 {
        self.max_y.saturating_sub(self.min_y)
    }
}

/// Placed tiles keyed by coordinate. Cloning copies every entry, so a clone can
/// be mutated freely without touching the original.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Board {
    tiles: BTreeMap<Coord, Tile>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, coord: Coord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    pub fn is_occupied(&self, coord: Coord) -> bool {
        self.tiles.contains_key(&coord)
    }

    /// Unconditional write. Legality is checked by the caller.
    pub fn place(&mut self, coord: Coord, tile: Tile) {
        self.tiles.insert(coord, tile);
    }

    pub(crate) fn remove(&mut self, coord: Coord) -> Option<Tile> {
        self.tiles.remove(&coord)
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn occupied_coordinates(&self) -> impl Iterator<Item = Coord> + '_ {
        self.tiles.keys().copied()
    }

    pub fn tiles(&self) -> impl Iterator<Item = (Coord, &Tile)> + '_ {
        self.tiles.iter().map(|(coord, tile)| (*coord, tile))
    }

    /// Extent of every placed tile, or `None` on an empty board.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut coords = self.tiles.keys();
        let first = coords.next()?;
        let init = BoundingBox {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        Some(coords.fold(init, |bb, c| BoundingBox {
            min_x: bb.min_x.min(c.x),
            max_x: bb.max_x.max(c.x),
            min_y: bb.min_y.min(c.y),
            max_y: bb.max_y.max(c.y),
        }))
    }

    /// Empty cells sharing a side with at least one placed tile, in ascending
    /// coordinate order.
    pub fn frontier(&self) -> BTreeSet<Coord> {
        self.frontier_of(self.tiles.keys().copied())
    }

    /// Empty cells sharing a side with any of `coords`.
    pub fn frontier_of(&self, coords: impl IntoIterator<Item = Coord>) -> BTreeSet<Coord> {
        coords
            .into_iter()
            .flat_map(Coord::neighbors)
            .map(|(_, n)| n)
            .filter(|n| !self.is_occupied(*n))
            .collect()
    }
}
