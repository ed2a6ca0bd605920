//! Loop and line detection over the same-color track graph.
//!
//! Two tiles are linked for a color when they are orthogonal neighbors and
//! both carry that color on their shared side. Every tile carries exactly two
//! sides of each color, so each color's graph is a set of disjoint paths and
//! cycles. Traversals use an explicit stack because the board is unbounded.
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::board::{Board, BoundingBox, Coord};
use crate::tile::{Color, Direction};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WinKind {
    Loop,
    Line,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineOrientation {
    Horizontal,
    Vertical,
}

/// The two tiles anchoring a line on opposite extremes of the board.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LineSpan {
    pub orientation: LineOrientation,
    pub start: Coord,
    pub end: Coord,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Win {
    pub color: Color,
    pub kind: WinKind,
    /// Loop cells in cycle order, or every cell of the winning line.
    pub path: Vec<Coord>,
    pub line: Option<LineSpan>,
}

/// Checks white loop, red loop, white line, red line, and reports the first hit.
pub fn detect_win(board: &Board, min_line_span: i32) -> Option<Win> {
    for color in Color::ALL {
        if let Some(path) = find_loop(board, color) {
            return Some(Win {
                color,
                kind: WinKind::Loop,
                path,
                line: None,
            });
        }
    }
    for color in Color::ALL {
        if let Some((path, span)) = find_line(board, color, min_line_span) {
            return Some(Win {
                color,
                kind: WinKind::Line,
                path,
                line: Some(span),
            });
        }
    }
    None
}

/// Neighbors of `coord` linked to it by a `color` track.
fn linked(board: &Board, coord: Coord, color: Color) -> impl Iterator<Item = Coord> + '_ {
    let tile = board.get(coord).copied();
    Direction::ALL.into_iter().filter_map(move |dir| {
        let tile = tile?;
        if tile.side(dir) != color {
            return None;
        }
        let next = coord.neighbor(dir)?;
        let other = board.get(next)?;
        (other.side(dir.opposite()) == color).then_some(next)
    })
}

/// Returns the cells of a `color` cycle, in traversal order, if one exists.
pub fn find_loop(board: &Board, color: Color) -> Option<Vec<Coord>> {
    // Cells whose component is already known to be acyclic.
    let mut explored: HashSet<Coord> = HashSet::new();
    for start in board.occupied_coordinates() {
        if explored.contains(&start) {
            continue;
        }
        if let Some(cycle) = trace_loop(board, start, color, &mut explored) {
            return Some(cycle);
        }
    }
    None
}

fn trace_loop(
    board: &Board,
    start: Coord,
    color: Color,
    explored: &mut HashSet<Coord>,
) -> Option<Vec<Coord>> {
    // Position of each visited cell within `path`.
    let mut visited: HashMap<Coord, usize> = HashMap::new();
    let mut path: Vec<Coord> = Vec::new();
    let mut stack: Vec<(Coord, Option<Coord>, usize)> = vec![(start, None, 0)];

    while let Some((coord, from, depth)) = stack.pop() {
        path.truncate(depth);
        if let Some(&idx) = visited.get(&coord) {
            if idx < path.len() && path[idx] == coord {
                return Some(path[idx..].to_vec());
            }
            continue;
        }
        visited.insert(coord, path.len());
        explored.insert(coord);
        path.push(coord);
        for next in linked(board, coord, color) {
            if Some(next) != from {
                stack.push((next, Some(coord), depth + 1));
            }
        }
    }
    None
}

/// Finds a `color` path touching both extremes of the board along an axis
/// spanning at least `min_span`. The extent is measured over every tile on the
/// board, whatever its color.
pub fn find_line(board: &Board, color: Color, min_span: i32) -> Option<(Vec<Coord>, LineSpan)> {
    let bounds = board.bounding_box()?;
    let horizontal = bounds.horizontal_span() >= min_span;
    let vertical = bounds.vertical_span() >= min_span;
    if !horizontal && !vertical {
        return None;
    }

    let mut explored: HashSet<Coord> = HashSet::new();
    for start in board.occupied_coordinates() {
        if explored.contains(&start) {
            continue;
        }
        let (cells, edges) = trace_component(board, start, color, &bounds, &mut explored);
        if horizontal {
            if let (Some(start), Some(end)) = (edges.west, edges.east) {
                let span = LineSpan {
                    orientation: LineOrientation::Horizontal,
                    start,
                    end,
                };
                return Some((cells, span));
            }
        }
        if vertical {
            if let (Some(start), Some(end)) = (edges.north, edges.south) {
                let span = LineSpan {
                    orientation: LineOrientation::Vertical,
                    start,
                    end,
                };
                return Some((cells, span));
            }
        }
    }
    None
}

/// Component cells that open onto each extreme of the board.
#[derive(Default)]
struct EdgeHits {
    west: Option<Coord>,
    east: Option<Coord>,
    north: Option<Coord>,
    south: Option<Coord>,
}

fn trace_component(
    board: &Board,
    start: Coord,
    color: Color,
    bounds: &BoundingBox,
    explored: &mut HashSet<Coord>,
) -> (Vec<Coord>, EdgeHits) {
    let mut cells = Vec::new();
    let mut edges = EdgeHits::default();
    let mut stack = vec![start];

    while let Some(coord) = stack.pop() {
        if !explored.insert(coord) {
            continue;
        }
        cells.push(coord);
        let Some(tile) = board.get(coord) else {
            continue;
        };
        let opens = |dir: Direction| tile.side(dir) == color;
        if coord.x == bounds.min_x && opens(Direction::West) {
            edges.west.get_or_insert(coord);
        }
        if coord.x == bounds.max_x && opens(Direction::East) {
            edges.east.get_or_insert(coord);
        }
        if coord.y == bounds.min_y && opens(Direction::North) {
            edges.north.get_or_insert(coord);
        }
        if coord.y == bounds.max_y && opens(Direction::South) {
            edges.south.get_or_insert(coord);
        }
        stack.extend(linked(board, coord, color).filter(|next| !explored.contains(next)));
    }
    (cells, edges)
}
