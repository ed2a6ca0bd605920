//! Trax rules engine.
//!
//! Players alternately lay curve or cross tiles on an unbounded grid. Each
//! placement may trigger a cascade of forced tiles, is rejected if it leaves a
//! cell with more than two track ends of one color, and wins when it closes a
//! loop or stretches a line across the board. Sessions are plain values: every
//! accepted move returns a new [`GameSession`] and a rejected one leaves the
//! caller's session as it was.
//!
//! ```
//! use trax::{start_new_game, submit_human_move, Color, Coord, Rotation, Shape};
//!
//! let session = start_new_game(Color::White, false);
//! let session = submit_human_move(&session, Coord::new(0, 0), Shape::Curve, Rotation::R0).unwrap();
//! assert_eq!(session.active_player(), Color::Red);
//! ```
pub mod ai;
pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod forced;
pub mod notation;
pub mod placement;
pub mod tile;
pub mod win;

pub use ai::{can_win_next_move, legal_placements, Strategist};
pub use board::{Board, BoundingBox, Coord};
pub use config::{AiConfig, RuleConfig};
pub use engine::{
    attempt_move, restart, start_new_game, submit_human_move, GameSession, Phase, PlacedTile,
    SessionView, Speculation,
};
pub use error::GameError;
pub use forced::resolve_forced_moves;
pub use notation::{parse_history, Placement};
pub use placement::{incoming_counts, is_valid_placement};
pub use tile::{connections, Color, Connections, Direction, Rotation, Shape, Tile};
pub use win::{detect_win, LineOrientation, LineSpan, Win, WinKind};

/// Asks `strategist` for the AI's move on `session`.
pub fn request_ai_move(
    session: &GameSession,
    strategist: &mut Strategist,
) -> Result<GameSession, GameError> {
    strategist.play(session)
}
