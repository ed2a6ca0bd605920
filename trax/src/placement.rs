//! Legality of a single tile against its already-placed neighbors.
use crate::board::{Board, Coord};
use crate::error::GameError;
use crate::tile::{Color, Direction, Tile};

/// Per-color count of track ends pointing into a cell from its neighbors.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct IncomingCounts([u8; 2]);

impl IncomingCounts {
    pub fn get(&self, color: Color) -> u8 {
        self.0[color.idx()]
    }

    /// Color with exactly two incoming ends, preferring white when both do.
    pub fn forced_color(&self) -> Option<Color> {
        Color::ALL.into_iter().find(|&color| self.get(color) == 2)
    }

    /// First color with more than two incoming ends.
    pub fn overflow(&self) -> Option<(Color, u8)> {
        Color::ALL
            .into_iter()
            .map(|color| (color, self.get(color)))
            .find(|&(_, count)| count > 2)
    }
}

pub fn incoming_counts(board: &Board, coord: Coord) -> IncomingCounts {
    let mut counts = IncomingCounts::default();
    for (dir, neighbor) in coord.neighbors() {
        if let Some(tile) = board.get(neighbor) {
            counts.0[tile.side(dir.opposite()).idx()] += 1;
        }
    }
    counts
}

/// Checks `tile` at `coord` against the board, ignoring whether the cell is
/// already occupied. The first tile on an empty board fits on any playable
/// cell.
pub fn check_placement(board: &Board, coord: Coord, tile: &Tile) -> Result<(), GameError> {
    if !coord.is_playable() {
        return Err(GameError::OutOfBounds { coord });
    }
    if board.is_empty() {
        return Ok(());
    }
    let mut touches = false;
    for (dir, neighbor) in coord.neighbors() {
        let Some(existing) = board.get(neighbor) else {
            continue;
        };
        touches = true;
        if tile.side(dir) != existing.side(dir.opposite()) {
            return Err(GameError::ConnectionMismatch {
                coord,
                direction: dir,
            });
        }
    }
    if !touches {
        return Err(GameError::NotAdjacent { coord });
    }
    Ok(())
}

pub fn is_valid_placement(board: &Board, coord: Coord, tile: &Tile) -> bool {
    check_placement(board, coord, tile).is_ok()
}

/// Whether two tiles agree on the side they would share, `b` lying `direction`
/// of `a`.
pub fn sides_match(a: &Tile, direction: Direction, b: &Tile) -> bool {
    a.side(direction) == b.side(direction.opposite())
}
