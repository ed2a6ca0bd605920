//! Plain-text board for the terminal.
//!
//! Each tile is drawn as its white track: `┘ └ ┌ ┐` for curves, `─ │` for
//! crosses. The red track fills the remaining two sides.
use std::fmt::Write;

use trax::{Color, Coord, GameSession, Phase, Shape, Tile, WinKind};

fn glyph(tile: &Tile) -> char {
    use trax::Direction::*;
    let white = |dir| tile.side(dir) == Color::White;
    match tile.shape {
        Shape::Cross if white(North) => '│',
        Shape::Cross => '─',
        Shape::Curve => match (white(North), white(East)) {
            (true, false) => '┘',
            (true, true) => '└',
            (false, true) => '┌',
            (false, false) => '┐',
        },
    }
}

pub fn board(session: &GameSession) -> String {
    let board = session.board();
    let mut out = String::new();
    let Some(bounds) = board.bounding_box() else {
        let _ = writeln!(out, "(empty board: the first tile may go anywhere, e.g. `0,0 c0`)");
        return out;
    };
    let win_path: &[Coord] = session.winner().map(|w| w.path.as_slice()).unwrap_or(&[]);

    let _ = write!(out, "{:>5}", "");
    for x in bounds.min_x - 1..=bounds.max_x + 1 {
        let _ = write!(out, "{x:>4}");
    }
    out.push('\n');
    for y in bounds.min_y - 1..=bounds.max_y + 1 {
        let _ = write!(out, "{y:>5}");
        for x in bounds.min_x - 1..=bounds.max_x + 1 {
            let coord = Coord::new(x, y);
            let (sym, owner) = match board.get(coord) {
                Some(tile) => (glyph(tile), if tile.owner == Color::White { 'w' } else { 'r' }),
                None => ('·', ' '),
            };
            let mark = if win_path.contains(&coord) {
                '#'
            } else if session.last_placed() == Some(coord) {
                '!'
            } else if session.forced().contains(&coord) {
                '*'
            } else {
                ' '
            };
            let _ = write!(out, "  {sym}{}", if mark == ' ' { owner } else { mark });
        }
        out.push('\n');
    }
    out
}

pub fn status(session: &GameSession) -> String {
    match (session.phase(), session.winner()) {
        (Phase::GameOver, Some(win)) => {
            let how = match win.kind {
                WinKind::Loop => "loop",
                WinKind::Line => "line",
            };
            format!("{} wins with a {how}!", win.color)
        }
        (Phase::Playing, _) if session.ai_turn_pending() => {
            format!("{} (computer) is thinking...", session.active_player())
        }
        (Phase::Playing, _) => format!("{} to move", session.active_player()),
        _ => String::new(),
    }
}
