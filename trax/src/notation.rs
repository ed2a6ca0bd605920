//! Text form of a placement: `"<x>,<y> <c|x><degrees>"`, e.g. `"3,-1 c90"`.
//! Histories join placements with `;`.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::Coord;
use crate::error::GameError;
use crate::tile::{Color, Rotation, Shape, Tile};

/// A tile face chosen for a cell, before an owner is attached.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub coord: Coord,
    pub shape: Shape,
    pub rotation: Rotation,
}

impl Placement {
    pub fn new(coord: Coord, shape: Shape, rotation: Rotation) -> Self {
        Self {
            coord,
            shape,
            rotation,
        }
    }

    pub fn tile(&self, owner: Color) -> Tile {
        Tile::new(self.shape, self.rotation, owner)
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match self.shape {
            Shape::Curve => 'c',
            Shape::Cross => 'x',
        };
        write!(f, "{} {}{}", self.coord, shape, self.rotation.degrees())
    }
}

impl FromStr for Placement {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_placement(s, 0)
    }
}

/// Parses a `;`-separated list of placements.
pub fn parse_history(history: &str) -> Result<Vec<Placement>, GameError> {
    let mut placements = Vec::new();
    let mut offset = 0;
    for segment in history.split(';') {
        if !segment.trim().is_empty() {
            placements.push(parse_placement(segment, offset)?);
        }
        offset += segment.len() + 1;
    }
    Ok(placements)
}

/// `base` is the byte offset of `text` within the caller's input, so errors
/// point at the right place in a longer history.
fn parse_placement(text: &str, base: usize) -> Result<Placement, GameError> {
    let err = |at: usize, reason: String| GameError::ParseMove {
        position: base + at,
        reason,
    };
    let lead = text.len() - text.trim_start().len();
    let trimmed = text.trim();
    let Some((coord_part, tile_part)) = trimmed.split_once(char::is_whitespace) else {
        return Err(err(lead, "expected `<x>,<y> <tile>`".to_string()));
    };
    let Some((xs, ys)) = coord_part.split_once(',') else {
        return Err(err(lead, format!("expected `<x>,<y>`, found {coord_part}")));
    };
    let x: i32 = xs
        .trim()
        .parse()
        .map_err(|_| err(lead, format!("bad x coordinate {xs}")))?;
    let y: i32 = ys
        .trim()
        .parse()
        .map_err(|_| err(lead + xs.len() + 1, format!("bad y coordinate {ys}")))?;

    let tile_part = tile_part.trim();
    let tile_at = lead + trimmed.len() - tile_part.len();
    let mut chars = tile_part.chars();
    let shape = match chars.next() {
        Some('c' | 'C') => Shape::Curve,
        Some('x' | 'X') => Shape::Cross,
        other => {
            return Err(err(
                tile_at,
                format!("expected c or x, found {}", other.map(String::from).unwrap_or_default()),
            ))
        }
    };
    let degrees = chars.as_str();
    let rotation = degrees
        .parse::<u16>()
        .ok()
        .and_then(Rotation::from_degrees)
        .ok_or_else(|| err(tile_at + 1, format!("rotation must be 0, 90, 180 or 270, found {degrees}")))?;

    Ok(Placement::new(Coord::new(x, y), shape, rotation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays() {
        let p: Placement = "3,-1 c90".parse().unwrap();
        assert_eq!(p, Placement::new(Coord::new(3, -1), Shape::Curve, Rotation::R90));
        assert_eq!(p.to_string(), "3,-1 c90");

        let q: Placement = "  -2,4   X270 ".parse().unwrap();
        assert_eq!(q.shape, Shape::Cross);
        assert_eq!(q.rotation, Rotation::R270);
    }

    #[test]
    fn reports_error_position_in_history() {
        let res = parse_history("0,0 c0; 1,0 c45");
        match res {
            Err(GameError::ParseMove { position, .. }) => assert_eq!(position, 13),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<Placement>().is_err());
        assert!("1;2 c0".parse::<Placement>().is_err());
        assert!("1,2 q0".parse::<Placement>().is_err());
        assert!(parse_history("0,0 c0;;1,0 x90").unwrap().len() == 2);
    }
}
