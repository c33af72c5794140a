use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::modules::config::ConfigError;

/// Smallest width that fits the starting body without overlapping the head.
pub const MIN_GRID_WIDTH: i32 = 3;
/// Smallest height that still leaves free cells for a target.
pub const MIN_GRID_HEIGHT: i32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Raw offset without wrapping; callers on a grid go through [`Grid::step`].
    pub const fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Plain Manhattan distance, blind to wrap-around.
    pub fn manhattan(self, other: Cell) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Canonical enumeration order shared by both move strategies.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Unit vector; y grows downwards.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" | "a" => Ok(Direction::Left),
            "right" | "d" => Ok(Direction::Right),
            "up" | "w" => Ok(Direction::Up),
            "down" | "s" => Ok(Direction::Down),
            other => Err(format!(
                "unknown direction '{}', use left|right|up|down",
                other
            )),
        }
    }
}

/// Toroidal `width x height` cell space. Every coordinate operation wraps on both axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Result<Self, ConfigError> {
        if width < MIN_GRID_WIDTH || height < MIN_GRID_HEIGHT {
            return Err(ConfigError::GridTooSmall { width, height });
        }
        Ok(Self { width, height })
    }

    pub const fn width(&self) -> i32 {
        self.width
    }

    pub const fn height(&self) -> i32 {
        self.height
    }

    pub const fn cell_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    pub const fn center(&self) -> Cell {
        Cell {
            x: self.width / 2,
            y: self.height / 2,
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        (0..self.width).contains(&cell.x) && (0..self.height).contains(&cell.y)
    }

    pub fn wrap(&self, cell: Cell) -> Cell {
        Cell {
            x: cell.x.rem_euclid(self.width),
            y: cell.y.rem_euclid(self.height),
        }
    }

    pub fn step(&self, cell: Cell, direction: Direction) -> Cell {
        self.wrap(cell.offset(direction))
    }

    /// Wrap-aware Manhattan distance: the shorter of the direct and wrapped offset per axis.
    pub fn distance(&self, a: Cell, b: Cell) -> i32 {
        let a = self.wrap(a);
        let b = self.wrap(b);
        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();
        dx.min(self.width - dx) + dy.min(self.height - dy)
    }

    /// The four wrapped neighbours, in [`Direction::ALL`] order.
    pub fn neighbors(&self, cell: Cell) -> [(Direction, Cell); 4] {
        Direction::ALL.map(|d| (d, self.step(cell, d)))
    }

    /// Collapses a raw delta between two adjacent cells into a unit step.
    ///
    /// Adjacent cells across a seam differ by `size - 1` on that axis, which reads as one
    /// step the other way.
    pub fn direction_between(&self, from: Cell, to: Cell) -> Option<Direction> {
        let dx = clamp_wrap_delta(to.x - from.x);
        let dy = clamp_wrap_delta(to.y - from.y);
        Direction::from_delta(dx, dy)
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Cell { x, y }))
    }
}

fn clamp_wrap_delta(delta: i32) -> i32 {
    if delta > 1 {
        -1
    } else if delta < -1 {
        1
    } else {
        delta
    }
}
