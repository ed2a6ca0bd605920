//! Turn pipeline and the game session it advances.
//!
//! A move is validated, placed, followed by its forced cascade, checked for
//! overflow around every new tile and finally scored for a win. Sessions are
//! values: a committed move returns a new session and leaves the old one as
//! it was, so a rejected move needs no explicit rollback.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::{Board, Coord};
use crate::config::RuleConfig;
use crate::error::GameError;
use crate::forced::resolve_into;
use crate::notation::{parse_history, Placement};
use crate::placement::{check_placement, incoming_counts};
use crate::tile::{Color, Rotation, Shape, Tile};
use crate::win::{detect_win, Win};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Intro,
    Playing,
    GameOver,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSession {
    board: Board,
    active_player: Color,
    phase: Phase,
    human: Color,
    ai_enabled: bool,
    last_placed: Option<Coord>,
    forced: BTreeSet<Coord>,
    winner: Option<Win>,
    rules: RuleConfig,
}

impl GameSession {
    /// Fresh game on an empty board. White always moves first.
    pub fn start(human: Color, ai_enabled: bool, rules: RuleConfig) -> Self {
        Self {
            board: Board::new(),
            active_player: Color::White,
            phase: Phase::Playing,
            human,
            ai_enabled,
            last_placed: None,
            forced: BTreeSet::new(),
            winner: None,
            rules,
        }
    }

    /// Session waiting on the intro screen.
    pub fn intro() -> Self {
        Self {
            phase: Phase::Intro,
            ..Self::start(Color::White, false, RuleConfig::default())
        }
    }

    /// Two-player session resumed from an arbitrary position.
    pub fn from_board(board: Board, active_player: Color, rules: RuleConfig) -> Self {
        Self {
            board,
            active_player,
            ..Self::start(Color::White, false, rules)
        }
    }

    /// Replays a `;`-separated placement history from an empty board, players
    /// alternating from white.
    pub fn from_history(history: &str, rules: RuleConfig) -> Result<Self, GameError> {
        let mut session = Self::start(Color::White, false, rules);
        for placement in parse_history(history)? {
            session = session.submit(placement)?;
        }
        Ok(session)
    }

    /// Same position with the AI taking the color opposite `human`.
    pub fn with_ai(mut self, human: Color) -> Self {
        self.human = human;
        self.ai_enabled = true;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active_player(&self) -> Color {
        self.active_player
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn human(&self) -> Color {
        self.human
    }

    pub fn ai_color(&self) -> Option<Color> {
        self.ai_enabled.then(|| self.human.opponent())
    }

    pub fn last_placed(&self) -> Option<Coord> {
        self.last_placed
    }

    /// Cells filled by the most recent cascade.
    pub fn forced(&self) -> &BTreeSet<Coord> {
        &self.forced
    }

    pub fn winner(&self) -> Option<&Win> {
        self.winner.as_ref()
    }

    pub fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    /// The scheduler should wait the AI turn delay and then request its move.
    pub fn ai_turn_pending(&self) -> bool {
        self.phase == Phase::Playing && self.ai_color() == Some(self.active_player)
    }

    /// Places a tile for the active player.
    pub fn submit(&self, placement: Placement) -> Result<GameSession, GameError> {
        attempt_move(self, placement.coord, placement.tile(self.active_player))
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase,
            active_player: self.active_player,
            tiles: self
                .board
                .tiles()
                .map(|(coord, tile)| PlacedTile {
                    coord,
                    shape: tile.shape,
                    rotation: tile.rotation,
                    owner: tile.owner,
                })
                .collect(),
            forced: self.forced.iter().copied().collect(),
            last_placed: self.last_placed,
            winner: self.winner.clone(),
        }
    }
}

/// Read-only snapshot for a renderer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub phase: Phase,
    pub active_player: Color,
    pub tiles: Vec<PlacedTile>,
    pub forced: Vec<Coord>,
    pub last_placed: Option<Coord>,
    pub winner: Option<Win>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedTile {
    pub coord: Coord,
    pub shape: Shape,
    pub rotation: Rotation,
    pub owner: Color,
}

pub fn start_new_game(human: Color, ai_enabled: bool) -> GameSession {
    GameSession::start(human, ai_enabled, RuleConfig::default())
}

pub fn restart() -> GameSession {
    GameSession::intro()
}

/// Human placement for the active player. Refused while the AI holds the turn.
pub fn submit_human_move(
    session: &GameSession,
    coord: Coord,
    shape: Shape,
    rotation: Rotation,
) -> Result<GameSession, GameError> {
    if session.ai_turn_pending() {
        return Err(GameError::NotYourTurn(session.human));
    }
    session.submit(Placement::new(coord, shape, rotation))
}

/// Runs one full turn for `tile.owner` and returns the resulting session.
pub fn attempt_move(
    session: &GameSession,
    coord: Coord,
    tile: Tile,
) -> Result<GameSession, GameError> {
    if session.phase != Phase::Playing {
        return Err(GameError::GameNotInProgress);
    }
    if tile.owner != session.active_player {
        return Err(GameError::NotYourTurn(tile.owner));
    }

    let mut next = session.clone();
    let mut written = Vec::new();
    let winner = play(&mut next.board, coord, tile, &session.rules, &mut written)?;

    next.last_placed = Some(coord);
    next.forced = written.into_iter().filter(|&c| c != coord).collect();
    info!(
        player = %tile.owner,
        at = %coord,
        forced = next.forced.len(),
        "move accepted"
    );
    match winner {
        Some(win) => {
            info!(color = %win.color, kind = ?win.kind, "game over");
            next.phase = Phase::GameOver;
            next.winner = Some(win);
        }
        None => next.active_player = session.active_player.opponent(),
    }
    Ok(next)
}

/// Core pipeline on a bare board. Every cell written is appended to `written`,
/// including on error, so the caller can discard or revert them.
fn play(
    board: &mut Board,
    coord: Coord,
    tile: Tile,
    rules: &RuleConfig,
    written: &mut Vec<Coord>,
) -> Result<Option<Win>, GameError> {
    if board.is_occupied(coord) {
        return Err(GameError::Occupied { coord });
    }
    check_placement(board, coord, &tile)?;
    board.place(coord, tile);
    written.push(coord);
    resolve_into(board, rules.forced_move_cap, written)?;
    check_overflow(board, written)?;
    Ok(detect_win(board, rules.min_line_span))
}

/// Rejects the position if any empty cell next to `placed` now has more than
/// two incoming track ends of one color.
fn check_overflow(board: &Board, placed: &[Coord]) -> Result<(), GameError> {
    for cell in board.frontier_of(placed.iter().copied()) {
        if let Some((color, count)) = incoming_counts(board, cell).overflow() {
            debug!(at = %cell, %color, count, "overflow");
            return Err(GameError::Overflow {
                coord: cell,
                color,
                count,
            });
        }
    }
    Ok(())
}

/// A move played on a borrowed board and undone when dropped.
///
/// Only empty cells are ever written, so removing the journaled cells restores
/// the board exactly, whether the move was accepted or rejected.
pub struct Speculation<'a> {
    board: &'a mut Board,
    written: Vec<Coord>,
    outcome: Result<Option<Win>, GameError>,
}

impl<'a> Speculation<'a> {
    pub fn run(board: &'a mut Board, coord: Coord, tile: Tile, rules: &RuleConfig) -> Self {
        let mut written = Vec::new();
        let outcome = play(board, coord, tile, rules, &mut written);
        Self {
            board,
            written,
            outcome,
        }
    }

    pub fn outcome(&self) -> &Result<Option<Win>, GameError> {
        &self.outcome
    }

    /// The move was legal and did not end the game.
    pub fn is_quiet(&self) -> bool {
        matches!(self.outcome, Ok(None))
    }

    /// The move was legal and produced a win for `color`.
    pub fn wins_for(&self, color: Color) -> bool {
        matches!(&self.outcome, Ok(Some(win)) if win.color == color)
    }

    pub fn board(&self) -> &Board {
        &*self.board
    }

    /// Board with the move applied, for nested speculation.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut *self.board
    }
}

impl Drop for Speculation<'_> {
    fn drop(&mut self) {
        for coord in self.written.drain(..).rev() {
            self.board.remove(coord);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::win::WinKind;

    fn at(x: i32, y: i32) -> Coord {
        Coord::new(x, y)
    }

    #[test]
    fn first_move_is_accepted() {
        let session = start_new_game(Color::White, false);
        let next = submit_human_move(&session, at(0, 0), Shape::Curve, Rotation::R0).unwrap();
        assert_eq!(next.board().len(), 1);
        assert!(next.forced().is_empty());
        assert!(next.winner().is_none());
        assert_eq!(next.last_placed(), Some(at(0, 0)));
        assert_eq!(next.active_player(), Color::Red);
        assert_eq!(next.phase(), Phase::Playing);
        // The input session is untouched.
        assert!(session.board().is_empty());
    }

    #[test]
    fn rejects_occupied_cell() {
        let session = GameSession::from_history("0,0 c0", RuleConfig::default()).unwrap();
        let res = session.submit(Placement::new(at(0, 0), Shape::Curve, Rotation::R0));
        assert_eq!(res, Err(GameError::Occupied { coord: at(0, 0) }));
    }

    #[test]
    fn rejects_wrong_owner() {
        let session = start_new_game(Color::White, false);
        let res = attempt_move(&session, at(0, 0), Tile::new(Shape::Curve, Rotation::R0, Color::Red));
        assert_eq!(res, Err(GameError::NotYourTurn(Color::Red)));
    }

    #[test]
    fn human_cannot_move_on_ai_turn() {
        let session = start_new_game(Color::Red, true);
        assert!(session.ai_turn_pending());
        let res = submit_human_move(&session, at(0, 0), Shape::Curve, Rotation::R0);
        assert!(matches!(res, Err(GameError::NotYourTurn(Color::Red))));
    }

    #[test]
    fn cascade_is_recorded_as_forced() {
        // The white cross at 0,1 and the red cross at 1,0 both point a white
        // end into 1,1, which is then filled automatically.
        let session =
            GameSession::from_history("0,0 c0; 1,0 x90", RuleConfig::default()).unwrap();
        assert_eq!(session.active_player(), Color::White);
        let next = session
            .submit(Placement::new(at(0, 1), Shape::Cross, Rotation::R0))
            .unwrap();
        assert!(next.forced().contains(&at(1, 1)));
        assert_eq!(next.board().get(at(1, 1)).map(|t| t.owner), Some(Color::White));
        assert!(!next.forced().contains(&at(0, 1)));
    }

    #[test]
    fn overflow_rolls_back_whole_move() {
        let mut board = Board::new();
        board.place(at(1, 0), Tile::new(Shape::Cross, Rotation::R90, Color::Red));
        board.place(at(0, 1), Tile::new(Shape::Cross, Rotation::R0, Color::White));
        board.place(at(0, 2), Tile::new(Shape::Curve, Rotation::R270, Color::Red));
        let session = GameSession::from_board(board.clone(), Color::White, RuleConfig::default());

        // North side of a 90° cross is white: three white ends meet at 1,1.
        let res = session.submit(Placement::new(at(1, 2), Shape::Cross, Rotation::R90));
        assert_eq!(
            res,
            Err(GameError::Overflow {
                coord: at(1, 1),
                color: Color::White,
                count: 3
            })
        );
        assert_eq!(session.board(), &board);
    }

    #[test]
    fn forced_conflict_rolls_back_whole_move() {
        let mut board = Board::new();
        board.place(at(1, 0), Tile::new(Shape::Cross, Rotation::R90, Color::White));
        board.place(at(0, 1), Tile::new(Shape::Cross, Rotation::R0, Color::White));
        board.place(at(3, 1), Tile::new(Shape::Cross, Rotation::R90, Color::Red));
        let session = GameSession::from_board(board.clone(), Color::White, RuleConfig::default());

        // The curve forces 1,1 and 2,1 in one pass and they disagree on their
        // shared side.
        let res = session.submit(Placement::new(at(2, 0), Shape::Curve, Rotation::R90));
        assert_eq!(res, Err(GameError::ForcedConflict { coord: at(2, 1) }));
        assert_eq!(session.board(), &board);
        assert_eq!(session.active_player(), Color::White);
    }

    #[test]
    fn rejects_cells_without_four_neighbors() {
        let session = start_new_game(Color::White, false);
        for coord in [at(i32::MAX, 0), at(0, i32::MIN)] {
            let res = submit_human_move(&session, coord, Shape::Curve, Rotation::R0);
            assert_eq!(res, Err(GameError::OutOfBounds { coord }));
        }
        let next = submit_human_move(&session, at(i32::MAX - 1, 0), Shape::Curve, Rotation::R0)
            .unwrap();
        assert_eq!(next.board().frontier().len(), 4);
        let res = submit_human_move(&next, at(i32::MAX, 0), Shape::Cross, Rotation::R0);
        assert_eq!(res, Err(GameError::OutOfBounds { coord: at(i32::MAX, 0) }));
    }

    #[test]
    fn loop_ends_the_game() {
        let session = GameSession::from_history(
            "0,0 c180; 1,0 c270; 0,1 c90",
            RuleConfig::default(),
        );
        // The third tile forces the fourth and closes the ring.
        let session = session.unwrap();
        let win = session.winner().unwrap();
        assert_eq!(session.phase(), Phase::GameOver);
        assert_eq!(win.color, Color::White);
        assert_eq!(win.kind, WinKind::Loop);
        assert_eq!(win.path.len(), 4);
        assert_eq!(session.forced().iter().copied().collect::<Vec<_>>(), vec![at(1, 1)]);

        let res = session.submit(Placement::new(at(2, 0), Shape::Curve, Rotation::R0));
        assert_eq!(res, Err(GameError::GameNotInProgress));
    }

    #[test]
    fn speculation_restores_board() {
        let session =
            GameSession::from_history("0,0 c0; 1,0 x90", RuleConfig::default()).unwrap();
        let mut board = session.board().clone();
        {
            let spec = Speculation::run(
                &mut board,
                at(0, 1),
                Tile::new(Shape::Cross, Rotation::R0, Color::White),
                session.rules(),
            );
            assert!(spec.is_quiet());
            assert_eq!(spec.board().len(), 4);
        }
        assert_eq!(&board, session.board());

        {
            let spec = Speculation::run(
                &mut board,
                at(5, 5),
                Tile::new(Shape::Cross, Rotation::R0, Color::White),
                session.rules(),
            );
            assert!(matches!(spec.outcome(), Err(GameError::NotAdjacent { .. })));
        }
        assert_eq!(&board, session.board());
    }

    #[test]
    fn view_serializes_for_renderer() {
        let session = GameSession::from_history("0,0 c90", RuleConfig::default()).unwrap();
        let json = serde_json::to_value(session.view()).unwrap();
        assert_eq!(json["phase"], "playing");
        assert_eq!(json["active_player"], "red");
        assert_eq!(json["tiles"][0]["rotation"], 90);
        assert_eq!(json["tiles"][0]["shape"], "curve");
        assert_eq!(json["last_placed"]["x"], 0);
    }

    #[test]
    fn restart_returns_to_intro() {
        let session = restart();
        assert_eq!(session.phase(), Phase::Intro);
        assert!(session.board().is_empty());
        assert!(matches!(
            session.submit(Placement::new(at(0, 0), Shape::Curve, Rotation::R0)),
            Err(GameError::GameNotInProgress)
        ));
    }
}
