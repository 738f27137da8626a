use crate::nav::fixed_math::FixedNum;
use serde::{Serialize, Deserialize};
use std::fmt;
use std::time::Duration;

/// Expansion count above which a finished search logs a warning.
pub const HIGH_EXPANSION_WARNING: u64 = 1_000_000;

/// A grid position. Row 0 is the top row, column 0 the leftmost column.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The neighboring cell one step in `direction`, if it stays inside a
    /// `height` × `width` grid.
    #[inline]
    pub fn step(self, direction: Direction, height: usize, width: usize) -> Option<Cell> {
        let (dr, dc) = direction.delta();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        if row < height && col < width {
            Some(Cell { row, col })
        } else {
            None
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Cell { row, col }
    }
}

/// Movement directions on the grid.
///
/// Declaration order is the expansion order: the four cardinal moves first
/// (right, down, left, up), then the diagonals.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    East = 0,
    South = 1,
    West = 2,
    North = 3,
    SouthEast = 4,
    SouthWest = 5,
    NorthWest = 6,
    NorthEast = 7,
}

impl Direction {
    /// Cardinal moves in expansion order.
    pub const CARDINAL: [Direction; 4] = [
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::North,
    ];

    /// All eight moves in expansion order.
    pub const ALL: [Direction; 8] = [
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::North,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::NorthWest,
        Direction::NorthEast,
    ];

    /// (row delta, column delta)
    #[inline]
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
            Direction::North => (-1, 0),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (1, -1),
            Direction::NorthWest => (-1, -1),
            Direction::NorthEast => (-1, 1),
        }
    }

    #[inline]
    pub const fn is_diagonal(self) -> bool {
        (self as u8) >= 4
    }
}

/// Which moves are legal from a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Connectivity {
    /// Up, down, left, right.
    #[default]
    Four,
    /// Cardinal moves plus diagonals. A diagonal step never cuts a corner:
    /// both orthogonally adjacent cells must be walkable.
    Eight,
}

impl Connectivity {
    pub fn directions(self) -> &'static [Direction] {
        match self {
            Connectivity::Four => &Direction::CARDINAL,
            Connectivity::Eight => &Direction::ALL,
        }
    }
}

/// A solved route, start and goal included.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Path<S = Cell> {
    pub cells: Vec<S>,
    /// Sum of the step costs along `cells`.
    pub cost: FixedNum,
}

impl<S: Copy> Path<S> {
    /// Number of moves (one less than the number of cells).
    pub fn len(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn start(&self) -> Option<S> {
        self.cells.first().copied()
    }

    pub fn goal(&self) -> Option<S> {
        self.cells.last().copied()
    }
}

/// Counters collected while a search runs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Number of threshold passes started.
    pub iterations: u32,
    /// Nodes whose successors were generated, summed over all passes.
    pub nodes_expanded: u64,
    /// Threshold used by each pass, in order. Strictly increasing.
    pub thresholds: Vec<FixedNum>,
    pub elapsed: Duration,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SearchOutcome<S = Cell> {
    Found(Path<S>),
    /// The reachable space was exhausted without reaching the goal.
    NoPath,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchReport<S = Cell> {
    pub outcome: SearchOutcome<S>,
    pub stats: SearchStats,
}

impl<S> SearchReport<S> {
    pub fn path_exists(&self) -> bool {
        matches!(self.outcome, SearchOutcome::Found(_))
    }

    pub fn path(&self) -> Option<&Path<S>> {
        match &self.outcome {
            SearchOutcome::Found(path) => Some(path),
            SearchOutcome::NoPath => None,
        }
    }

    pub fn into_path(self) -> Option<Path<S>> {
        match self.outcome {
            SearchOutcome::Found(path) => Some(path),
            SearchOutcome::NoPath => None,
        }
    }
}

/// Reasons a search could not produce an answer.
///
/// An unreachable goal is not an error; it is reported as
/// [`SearchOutcome::NoPath`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchError {
    OutOfBounds { cell: Cell, width: usize, height: usize },
    NodeLimitExceeded { limit: u64 },
    IterationLimitExceeded { limit: u32 },
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::OutOfBounds { cell, width, height } => {
                write!(f, "cell {} is outside the {}x{} grid", cell, width, height)
            }
            SearchError::NodeLimitExceeded { limit } => {
                write!(f, "search expanded more than {} nodes", limit)
            }
            SearchError::IterationLimitExceeded { limit } => {
                write!(f, "search needed more than {} threshold passes", limit)
            }
        }
    }
}

impl std::error::Error for SearchError {}
