//! Automatic filling of cells whose tile is dictated by their neighbors.
//!
//! A cell with exactly two incoming track ends of one color admits only one
//! tile face. Each pass finds every such cell against the current board and
//! then places them together, so sibling cells found in the same pass cannot
//! bias each other. Passes repeat until one finds nothing.
use tracing::{debug, warn};

use crate::board::{Board, Coord};
use crate::error::GameError;
use crate::placement::{check_placement, incoming_counts, is_valid_placement};
use crate::tile::{Tile, TILE_CONFIGURATIONS};

/// Resolves forced cells to a fixed point and returns them in placement order.
/// On error every tile this call placed is removed again.
pub fn resolve_forced_moves(board: &mut Board, cap: usize) -> Result<Vec<Coord>, GameError> {
    let mut placed = Vec::new();
    if let Err(err) = resolve_into(board, cap, &mut placed) {
        for coord in placed.into_iter().rev() {
            board.remove(coord);
        }
        return Err(err);
    }
    Ok(placed)
}

/// Like [`resolve_forced_moves`] but appends each write to `journal` as soon as
/// it lands, so a caller can undo a partial cascade after an error.
pub(crate) fn resolve_into(
    board: &mut Board,
    cap: usize,
    journal: &mut Vec<Coord>,
) -> Result<(), GameError> {
    for pass in 0..cap {
        let forced = find_forced_tiles(board)?;
        if forced.is_empty() {
            return Ok(());
        }
        debug!(pass, count = forced.len(), "placing forced tiles");
        for (coord, tile) in forced {
            // A sibling placed earlier in this pass may disagree with this tile.
            if check_placement(board, coord, &tile).is_err() {
                return Err(GameError::ForcedConflict { coord });
            }
            board.place(coord, tile);
            journal.push(coord);
        }
    }
    let err = GameError::IterationCapExceeded { cap };
    warn!(%err, "forced move resolution aborted");
    Err(err)
}

fn find_forced_tiles(board: &Board) -> Result<Vec<(Coord, Tile)>, GameError> {
    let mut forced = Vec::new();
    for coord in board.frontier() {
        if let Some(tile) = forced_tile(board, coord)? {
            forced.push((coord, tile));
        }
    }
    Ok(forced)
}

/// The tile `coord` must hold, if any.
pub fn forced_tile(board: &Board, coord: Coord) -> Result<Option<Tile>, GameError> {
    let Some(color) = incoming_counts(board, coord).forced_color() else {
        return Ok(None);
    };
    let tile = TILE_CONFIGURATIONS
        .iter()
        .map(|&(shape, rotation)| Tile::new(shape, rotation, color))
        .find(|tile| is_valid_placement(board, coord, tile));
    match tile {
        Some(tile) => Ok(Some(tile)),
        None => {
            let err = GameError::ForcedMoveDeadlock { coord, color };
            warn!(%err, "no tile fits a forced cell");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{Color, Direction, Rotation, Shape};

    fn board_with(tiles: &[(i32, i32, Shape, Rotation)]) -> Board {
        let mut board = Board::new();
        for &(x, y, shape, rotation) in tiles {
            board.place(Coord::new(x, y), Tile::new(shape, rotation, Color::White));
        }
        board
    }

    #[test]
    fn fills_cell_with_two_white_ends() {
        let mut board = board_with(&[
            (1, 0, Shape::Cross, Rotation::R90),
            (0, 1, Shape::Cross, Rotation::R0),
        ]);
        let placed = resolve_forced_moves(&mut board, 100).unwrap();
        assert!(placed.contains(&Coord::new(1, 1)));
        let tile = board.get(Coord::new(1, 1)).unwrap();
        assert_eq!(tile.owner, Color::White);
        assert_eq!(tile.side(Direction::North), Color::White);
        assert_eq!(tile.side(Direction::West), Color::White);
        // First configuration in canonical order with white north and west.
        assert_eq!((tile.shape, tile.rotation), (Shape::Curve, Rotation::R0));
    }

    #[test]
    fn second_run_is_a_no_op() {
        let mut board = board_with(&[
            (1, 0, Shape::Cross, Rotation::R90),
            (0, 1, Shape::Cross, Rotation::R0),
        ]);
        resolve_forced_moves(&mut board, 100).unwrap();
        let settled = board.clone();
        let again = resolve_forced_moves(&mut board, 100).unwrap();
        assert!(again.is_empty());
        assert_eq!(board, settled);
    }

    #[test]
    fn lone_tile_forces_nothing() {
        let mut board = board_with(&[(0, 0, Shape::Curve, Rotation::R0)]);
        assert!(resolve_forced_moves(&mut board, 100).unwrap().is_empty());
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn disagreeing_siblings_reject_and_roll_back() {
        // 1,1 and 2,1 are both forced in the first pass. Once 1,1 lands, its
        // east side no longer matches the tile 2,1 was given.
        let mut board = board_with(&[
            (1, 0, Shape::Cross, Rotation::R90),
            (2, 0, Shape::Curve, Rotation::R90),
            (0, 1, Shape::Cross, Rotation::R0),
            (3, 1, Shape::Cross, Rotation::R90),
        ]);
        let before = board.clone();
        let err = resolve_forced_moves(&mut board, 100).unwrap_err();
        assert_eq!(err, GameError::ForcedConflict { coord: Coord::new(2, 1) });
        assert!(!err.is_defect());
        assert_eq!(board, before);
    }

    #[test]
    fn exhausted_cap_is_a_defect() {
        let mut board = board_with(&[
            (1, 0, Shape::Cross, Rotation::R90),
            (0, 1, Shape::Cross, Rotation::R0),
        ]);
        let before = board.clone();
        let err = resolve_forced_moves(&mut board, 1).unwrap_err();
        assert_eq!(err, GameError::IterationCapExceeded { cap: 1 });
        assert!(err.is_defect());
        assert_eq!(board, before);
    }
}
