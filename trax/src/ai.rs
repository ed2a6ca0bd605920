//! Computer opponent.
//!
//! Tiers are tried in order and the first that yields a move wins:
//! an immediate win, a block when the opponent threatens one, a tile on a
//! cell that could close an opponent loop, then a random move that hands the
//! opponent no immediate win. Every candidate is played through the full turn
//! pipeline on a scratch board, forced cascade included.
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::board::{Board, Coord};
use crate::config::{AiConfig, RuleConfig};
use crate::engine::{attempt_move, GameSession, Speculation};
use crate::error::GameError;
use crate::notation::Placement;
use crate::placement::is_valid_placement;
use crate::tile::{Color, Rotation, Shape, Tile, TILE_CONFIGURATIONS};

/// Opening tile when the AI moves first.
const OPENING: Placement = Placement {
    coord: Coord::new(0, 0),
    shape: Shape::Curve,
    rotation: Rotation::R0,
};

#[derive(Debug)]
pub struct Strategist {
    config: AiConfig,
    rng: StdRng,
}

impl Strategist {
    pub fn new(config: AiConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { config, rng }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Chooses and commits a move for the session's AI color.
    pub fn play(&mut self, session: &GameSession) -> Result<GameSession, GameError> {
        let Some(ai) = session.ai_color() else {
            return Err(GameError::NotYourTurn(session.active_player()));
        };
        if !session.ai_turn_pending() {
            return Err(GameError::NotYourTurn(ai));
        }
        let placement = self.choose_move(session.board(), ai, session.rules())?;
        attempt_move(session, placement.coord, placement.tile(ai))
    }

    /// Picks a placement for `ai` without touching `board`.
    ///
    /// An engine defect hit while trying a candidate aborts the search.
    pub fn choose_move(
        &mut self,
        board: &Board,
        ai: Color,
        rules: &RuleConfig,
    ) -> Result<Placement, GameError> {
        if board.is_empty() {
            return Ok(OPENING);
        }
        let opponent = ai.opponent();
        let mut scratch = board.clone();
        let candidates = legal_placements(&scratch);

        if let Some(p) = winning_move(&mut scratch, &candidates, ai, rules)? {
            debug!(at = %p.coord, "ai: winning move");
            return Ok(p);
        }
        if opponent_wins_next(&mut scratch, opponent, rules)? {
            if let Some(p) = blocking_move(&mut scratch, &candidates, ai, rules)? {
                debug!(at = %p.coord, "ai: blocking move");
                return Ok(p);
            }
        }
        if let Some(p) = loop_blocking_move(&mut scratch, ai, rules)? {
            debug!(at = %p.coord, "ai: loop prevention");
            return Ok(p);
        }
        self.safe_random_move(&mut scratch, &candidates, ai, rules)
    }

    /// Random accepted move, preferring ones that leave the opponent no
    /// immediate win. Falls back to any accepted move when none is safe.
    fn safe_random_move(
        &mut self,
        board: &mut Board,
        candidates: &[Placement],
        ai: Color,
        rules: &RuleConfig,
    ) -> Result<Placement, GameError> {
        let opponent = ai.opponent();
        let mut legal = Vec::new();
        let mut safe = Vec::new();
        for &p in candidates {
            let mut spec = Speculation::run(board, p.coord, p.tile(ai), rules);
            surface_defect(&spec)?;
            if spec.outcome().is_err() {
                continue;
            }
            legal.push(p);
            if !spec.wins_for(opponent)
                && !opponent_wins_next(spec.board_mut(), opponent, rules)?
            {
                safe.push(p);
            }
        }
        debug!(legal = legal.len(), safe = safe.len(), "ai: random move");
        let pool = if safe.is_empty() { &legal } else { &safe };
        pool.choose(&mut self.rng).copied().ok_or(GameError::NoMoves)
    }
}

/// Every placement that fits its neighbors, cells in ascending order, curves
/// before crosses, rotations ascending. Ownership never affects fit.
pub fn legal_placements(board: &Board) -> Vec<Placement> {
    let mut placements = Vec::new();
    for coord in board.frontier() {
        for (shape, rotation) in TILE_CONFIGURATIONS {
            let tile = Tile::new(shape, rotation, Color::White);
            if is_valid_placement(board, coord, &tile) {
                placements.push(Placement::new(coord, shape, rotation));
            }
        }
    }
    placements
}

/// Whether `color`, moving next on `board`, has a move that wins outright.
pub fn can_win_next_move(
    board: &Board,
    color: Color,
    rules: &RuleConfig,
) -> Result<bool, GameError> {
    opponent_wins_next(&mut board.clone(), color, rules)
}

/// Passes plain rejections through as `Ok` and turns engine defects into errors.
fn surface_defect(spec: &Speculation<'_>) -> Result<(), GameError> {
    match spec.outcome() {
        Err(err) if err.is_defect() => Err(err.clone()),
        _ => Ok(()),
    }
}

fn opponent_wins_next(
    board: &mut Board,
    color: Color,
    rules: &RuleConfig,
) -> Result<bool, GameError> {
    let candidates = legal_placements(board);
    Ok(winning_move(board, &candidates, color, rules)?.is_some())
}

fn winning_move(
    board: &mut Board,
    candidates: &[Placement],
    color: Color,
    rules: &RuleConfig,
) -> Result<Option<Placement>, GameError> {
    for &p in candidates {
        let spec = Speculation::run(board, p.coord, p.tile(color), rules);
        surface_defect(&spec)?;
        if spec.wins_for(color) {
            return Ok(Some(p));
        }
    }
    Ok(None)
}

fn blocking_move(
    board: &mut Board,
    candidates: &[Placement],
    ai: Color,
    rules: &RuleConfig,
) -> Result<Option<Placement>, GameError> {
    let opponent = ai.opponent();
    for &p in candidates {
        let mut spec = Speculation::run(board, p.coord, p.tile(ai), rules);
        surface_defect(&spec)?;
        if spec.is_quiet() && !opponent_wins_next(spec.board_mut(), opponent, rules)? {
            return Ok(Some(p));
        }
    }
    Ok(None)
}

fn loop_blocking_move(
    board: &mut Board,
    ai: Color,
    rules: &RuleConfig,
) -> Result<Option<Placement>, GameError> {
    let opponent = ai.opponent();
    for cell in loop_threat_cells(board, opponent) {
        for (shape, rotation) in TILE_CONFIGURATIONS {
            let tile = Tile::new(shape, rotation, ai);
            if !is_valid_placement(board, cell, &tile) {
                continue;
            }
            let mut spec = Speculation::run(board, cell, tile, rules);
            surface_defect(&spec)?;
            if spec.outcome().is_ok()
                && !spec.wins_for(opponent)
                && !opponent_wins_next(spec.board_mut(), opponent, rules)?
            {
                return Ok(Some(Placement::new(cell, shape, rotation)));
            }
        }
    }
    Ok(None)
}

/// Empty cells where two of `color`'s curves could be joined: an open `color`
/// end of each points at the same empty cell.
pub fn loop_threat_cells(board: &Board, color: Color) -> Vec<Coord> {
    let curves: Vec<(Coord, Tile)> = board
        .tiles()
        .filter(|(_, tile)| tile.shape == Shape::Curve && tile.owner == color)
        .map(|(coord, tile)| (coord, *tile))
        .collect();

    let mut cells = Vec::new();
    for (i, &(a, tile_a)) in curves.iter().enumerate() {
        let ends_a = open_ends(board, a, &tile_a, color);
        for &(b, tile_b) in &curves[i + 1..] {
            for eb in open_ends(board, b, &tile_b, color) {
                if ends_a.contains(&eb) && !cells.contains(&eb) {
                    cells.push(eb);
                }
            }
        }
    }
    cells
}

/// Empty neighbors `color` track ends of the tile at `coord` point into.
fn open_ends(board: &Board, coord: Coord, tile: &Tile, color: Color) -> Vec<Coord> {
    tile.connections()
        .sides(color)
        .filter_map(|dir| coord.neighbor(dir))
        .filter(|n| !board.is_occupied(*n))
        .collect()
}
