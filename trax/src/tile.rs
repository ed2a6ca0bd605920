//! Tile faces and the colored track each side carries.
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Every (shape, rotation) pair with a distinct connection pattern, in the
/// order forced-move resolution and the AI try them.
pub const TILE_CONFIGURATIONS: [(Shape, Rotation); 6] = [
    (Shape::Curve, Rotation::R0),
    (Shape::Curve, Rotation::R90),
    (Shape::Curve, Rotation::R180),
    (Shape::Curve, Rotation::R270),
    (Shape::Cross, Rotation::R0),
    (Shape::Cross, Rotation::R90),
];

/// Connection patterns indexed by `[shape][rotation]`.
static CONNECTION_TABLE: Lazy<[[Connections; 4]; 2]> = Lazy::new(generate_connection_table);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Red,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Red];

    pub(crate) fn idx(self) -> usize {
        match self {
            Color::White => 0,
            Color::Red => 1,
        }
    }

    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Red,
            Color::Red => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => f.write_str("white"),
            Color::Red => f.write_str("red"),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Curve,
    Cross,
}

impl Shape {
    fn idx(self) -> usize {
        match self {
            Shape::Curve => 0,
            Shape::Cross => 1,
        }
    }
}

/// Clockwise rotation of a tile, in quarter turns.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum Rotation {
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    fn idx(self) -> usize {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }

    pub fn degrees(self) -> u16 {
        self.idx() as u16 * 90
    }

    pub fn from_degrees(degrees: u16) -> Option<Rotation> {
        match degrees {
            0 => Some(Rotation::R0),
            90 => Some(Rotation::R90),
            180 => Some(Rotation::R180),
            270 => Some(Rotation::R270),
            _ => None,
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        Rotation::from_degrees(degrees)
            .ok_or_else(|| format!("rotation must be 0, 90, 180 or 270, got {degrees}"))
    }
}

/// Side of a cell. North is toward negative `y`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    fn idx(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Grid offset `(dx, dy)` of the neighbor on this side.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        };
        f.write_str(name)
    }
}

/// Track color leaving each side of a tile.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Connections([Color; 4]);

impl Connections {
    /// Builds a pattern from the two sides carrying white; the rest carry red.
    const fn white_on(a: Direction, b: Direction) -> Self {
        let mut sides = [Color::Red; 4];
        sides[a as usize] = Color::White;
        sides[b as usize] = Color::White;
        Connections(sides)
    }

    pub fn get(&self, direction: Direction) -> Color {
        self.0[direction.idx()]
    }

    /// Sides carrying `color`. Always exactly two.
    pub fn sides(&self, color: Color) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL
            .into_iter()
            .filter(move |&dir| self.get(dir) == color)
    }
}

/// Connection pattern for a tile face. Total over every shape and rotation.
pub fn connections(shape: Shape, rotation: Rotation) -> Connections {
    CONNECTION_TABLE[shape.idx()][rotation.idx()]
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub shape: Shape,
    pub rotation: Rotation,
    pub owner: Color,
}

impl Tile {
    pub fn new(shape: Shape, rotation: Rotation, owner: Color) -> Self {
        Self {
            shape,
            rotation,
            owner,
        }
    }

    pub fn connections(&self) -> Connections {
        connections(self.shape, self.rotation)
    }

    pub fn side(&self, direction: Direction) -> Color {
        self.connections().get(direction)
    }
}

fn generate_connection_table() -> [[Connections; 4]; 2] {
    use Direction::*;
    let curve = [
        Connections::white_on(North, West),
        Connections::white_on(North, East),
        Connections::white_on(South, East),
        Connections::white_on(South, West),
    ];
    let vertical_red = Connections::white_on(East, West);
    let vertical_white = Connections::white_on(North, South);
    let cross = [vertical_red, vertical_white, vertical_red, vertical_white];
    [curve, cross]
}
