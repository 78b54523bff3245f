//! Tile grid geometry: positions, obstacle blocks and the level layout
//!
//! The battlefield is a `rows x cols` grid addressed by (row, col), 0-indexed
//! from the top-left. Obstacles are rectangular tile blocks fixed for the
//! whole session.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::consts::{EXIT, GRID_COLS, GRID_ROWS, START};
use crate::error::GameError;

/// A tile coordinate. Signed so that off-grid candidates are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Position shifted by the given deltas (no bounds handling)
    #[inline]
    pub fn offset(self, d_row: i32, d_col: i32) -> Self {
        Self::new(self.row + d_row, self.col + d_col)
    }
}

/// Player input direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit (d_row, d_col) delta. Up is toward row 0.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'w' => Some(Direction::Up),
            's' => Some(Direction::Down),
            'a' => Some(Direction::Left),
            'd' => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Axis-aligned obstacle block covering `[row, row+height) x [col, col+width)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRect {
    pub row: i32,
    pub col: i32,
    pub height: i32,
    pub width: i32,
}

impl TileRect {
    pub const fn new(row: i32, col: i32, height: i32, width: i32) -> Self {
        Self {
            row,
            col,
            height,
            width,
        }
    }

    /// Single-tile block
    pub const fn tile(row: i32, col: i32) -> Self {
        Self::new(row, col, 1, 1)
    }

    #[inline]
    pub fn contains(&self, p: Position) -> bool {
        p.row >= self.row
            && p.row < self.row + self.height
            && p.col >= self.col
            && p.col < self.col + self.width
    }
}

/// Rock layout of the prison yard: 13 single-tile blocks that break up the
/// direct routes from the bottom-left start to the top-right exit.
pub const REFERENCE_LAYOUT: [TileRect; 13] = [
    TileRect::tile(4, 0),
    TileRect::tile(5, 4),
    TileRect::tile(2, 6),
    TileRect::tile(5, 2),
    TileRect::tile(5, 7),
    TileRect::tile(7, 0),
    TileRect::tile(8, 4),
    TileRect::tile(0, 7),
    TileRect::tile(6, 2),
    TileRect::tile(1, 5),
    TileRect::tile(5, 3),
    TileRect::tile(6, 6),
    TileRect::tile(6, 8),
];

/// Static level data. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridModel {
    rows: i32,
    cols: i32,
    obstacles: Vec<TileRect>,
    start: Position,
    exit: Position,
}

impl Default for GridModel {
    fn default() -> Self {
        Self::reference()
    }
}

impl GridModel {
    /// Build and validate a layout.
    ///
    /// Fails if the grid is empty, start or exit lie off-grid or under a
    /// rock, start equals exit, or no 4-connected path joins them.
    pub fn new(
        rows: i32,
        cols: i32,
        obstacles: Vec<TileRect>,
        start: Position,
        exit: Position,
    ) -> Result<Self, GameError> {
        if rows <= 0 || cols <= 0 {
            return Err(GameError::InvalidLayout(format!(
                "grid must be non-empty, got {rows}x{cols}"
            )));
        }

        let grid = Self {
            rows,
            cols,
            obstacles,
            start,
            exit,
        };

        for (name, p) in [("start", start), ("exit", exit)] {
            if !grid.in_bounds(p) {
                return Err(GameError::InvalidLayout(format!(
                    "{name} {p:?} is outside the grid"
                )));
            }
            if grid.is_obstacle(p) {
                return Err(GameError::InvalidLayout(format!(
                    "{name} {p:?} is covered by an obstacle"
                )));
            }
        }
        if start == exit {
            return Err(GameError::InvalidLayout(
                "start and exit must differ".to_string(),
            ));
        }
        if !grid.has_path(start, exit) {
            return Err(GameError::InvalidLayout(
                "no traversable path from start to exit".to_string(),
            ));
        }

        Ok(grid)
    }

    /// The standard 10x10 prison yard
    pub fn reference() -> Self {
        Self {
            rows: GRID_ROWS,
            cols: GRID_COLS,
            obstacles: REFERENCE_LAYOUT.to_vec(),
            start: START,
            exit: EXIT,
        }
    }

    #[inline]
    pub fn rows(&self) -> i32 {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> i32 {
        self.cols
    }

    #[inline]
    pub fn start(&self) -> Position {
        self.start
    }

    #[inline]
    pub fn exit(&self) -> Position {
        self.exit
    }

    pub fn obstacles(&self) -> &[TileRect] {
        &self.obstacles
    }

    #[inline]
    pub fn in_bounds(&self, p: Position) -> bool {
        p.row >= 0 && p.row < self.rows && p.col >= 0 && p.col < self.cols
    }

    pub fn is_obstacle(&self, p: Position) -> bool {
        self.obstacles.iter().any(|rect| rect.contains(p))
    }

    /// All tiles in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Position::new(row, col)))
    }

    /// Breadth-first reachability over free tiles
    fn has_path(&self, from: Position, to: Position) -> bool {
        let width = self.cols as usize;
        let index = |p: Position| p.row as usize * width + p.col as usize;

        let mut seen = vec![false; self.rows as usize * width];
        let mut queue = VecDeque::from([from]);
        seen[index(from)] = true;

        while let Some(p) = queue.pop_front() {
            if p == to {
                return true;
            }
            for dir in Direction::ALL {
                let (d_row, d_col) = dir.delta();
                let next = p.offset(d_row, d_col);
                if self.in_bounds(next) && !self.is_obstacle(next) && !seen[index(next)] {
                    seen[index(next)] = true;
                    queue.push_back(next);
                }
            }
        }
        false
    }
}
