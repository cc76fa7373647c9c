//! Core types for the parking simulation
//!
//! Identifiers, grid cells, travel directions and rectangular footprints.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimId(pub usize);

impl fmt::Display for SimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A wrapper type for car IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CarId(pub SimId);

/// A wrapper type for traffic light IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LightId(pub SimId);

/// A wrapper type for crosswalk IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CrosswalkId(pub SimId);

/// A wrapper type for parking spot IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpotId(pub SimId);

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "car {}", self.0)
    }
}

/// An integer grid coordinate
///
/// `y` grows upwards, so `Direction::Up` adds one to `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one step in `direction`
    pub fn offset(self, direction: Direction) -> Cell {
        let (dx, dy) = direction.delta();
        Cell::new(self.x + dx, self.y + dy)
    }

    /// The four orthogonal neighbours, in right, left, up, down order
    pub fn neighbors(self) -> [(Direction, Cell); 4] {
        Direction::ALL.map(|direction| (direction, self.offset(direction)))
    }

    pub fn manhattan_distance(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Cell::new(x, y)
    }
}

impl From<Cell> for (i32, i32) {
    fn from(cell: Cell) -> Self {
        (cell.x, cell.y)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A legal travel direction on a lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Right,
    Left,
    Up,
    Down,
}

impl Direction {
    /// Neighbour scan order used by lane changes and parking adjacency
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Left,
        Direction::Up,
        Direction::Down,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Left => (-1, 0),
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Right => Direction::Left,
            Direction::Left => Direction::Right,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Arrow glyph used by the terminal map
    pub fn glyph(self) -> char {
        match self {
            Direction::Right => '>',
            Direction::Left => '<',
            Direction::Up => '^',
            Direction::Down => 'v',
        }
    }
}

/// An axis-aligned rectangle of cells anchored at its lower-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    pub x: i32,
    pub y: i32,
    #[serde(default = "one")]
    pub width: u32,
    #[serde(default = "one")]
    pub height: u32,
}

fn one() -> u32 {
    1
}

impl Footprint {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A vertical run of `height` cells starting at `(x, y)`
    pub const fn column(x: i32, y: i32, height: u32) -> Self {
        Self::new(x, y, 1, height)
    }

    /// A horizontal run of `width` cells starting at `(x, y)`
    pub const fn row(x: i32, y: i32, width: u32) -> Self {
        Self::new(x, y, width, 1)
    }

    /// Whether every covered cell lies inside a `width` x `height` grid
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        let (x, y) = (i64::from(self.x), i64::from(self.y));
        x >= 0
            && y >= 0
            && x + i64::from(self.width) <= i64::from(width)
            && y + i64::from(self.height) <= i64::from(height)
    }

    /// All covered cells, column by column. Only meaningful once the
    /// footprint is known to fit its grid.
    pub fn cells(&self) -> Vec<Cell> {
        let mut cells = Vec::new();
        for i in 0..self.width as i32 {
            for j in 0..self.height as i32 {
                cells.push(Cell::new(self.x + i, self.y + j));
            }
        }
        cells
    }
}

/// Largest grid area a configuration may ask for
pub const MAX_GRID_CELLS: u64 = 1 << 24;

/// Number of ticks between traffic light toggles in the reference configuration
pub const DEFAULT_LIGHT_PERIOD: u32 = 10;

/// Manhattan radius within which routed cars notice open parking spots
pub const DEFAULT_DETECTION_RADIUS: u32 = 3;

/// Probability that a rule-breaking car runs a stop light it is facing
pub const RED_LIGHT_IGNORE_PROBABILITY: f64 = 0.5;
