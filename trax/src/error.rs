use thiserror::Error;

use crate::board::Coord;
use crate::tile::{Color, Direction};

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum GameError {
    #[error("cell {coord} is already occupied")]
    Occupied { coord: Coord },
    #[error("cell {coord} lies on the edge of the coordinate range")]
    OutOfBounds { coord: Coord },
    #[error("cell {coord} does not touch any placed tile")]
    NotAdjacent { coord: Coord },
    #[error("tile at {coord} does not match its {direction} neighbor")]
    ConnectionMismatch { coord: Coord, direction: Direction },
    #[error("{count} {color} track ends would meet at {coord}")]
    Overflow { coord: Coord, color: Color, count: u8 },
    #[error("forced tiles disagree next to {coord}")]
    ForcedConflict { coord: Coord },
    #[error("the game is not in progress")]
    GameNotInProgress,
    #[error("it is not {0}'s turn")]
    NotYourTurn(Color),
    #[error("no legal moves remain")]
    NoMoves,
    #[error("invalid placement at position {position}: {reason}")]
    ParseMove { position: usize, reason: String },
    #[error("forced cell {coord} needs a {color} tile but none fits")]
    ForcedMoveDeadlock { coord: Coord, color: Color },
    #[error("forced moves did not settle within {cap} passes")]
    IterationCapExceeded { cap: usize },
}

impl GameError {
    /// True when the engine itself reached an inconsistent state, as opposed to
    /// a player attempting an illegal move.
    pub fn is_defect(&self) -> bool {
        matches!(
            self,
            GameError::ForcedMoveDeadlock { .. } | GameError::IterationCapExceeded { .. }
        )
    }
}
