use crate::nav::fixed_math::FixedNum;
use crate::nav::pathfinding::{Cell, Connectivity, Successors};
use crate::nav::profiling::profile;
use fixedbitset::FixedBitSet;
use rand::Rng;
use serde::{Serialize, Deserialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Cost-field value marking an impassable cell.
pub const OBSTACLE: u8 = 255;

/// Cost-field value of a plain walkable cell.
pub const WALKABLE: u8 = 1;

/// Rectangular navigation grid stored as a row-major cost field.
///
/// Each cell holds the cost of *entering* it: [`WALKABLE`] (1) for open
/// ground, 2..=254 for weighted terrain, [`OBSTACLE`] (255) for walls. The
/// cost of the start cell is never paid.
///
/// # Text format
///
/// ```text
/// // comments and blank lines are skipped
/// S..#....
/// .#.#.##.
/// .#...#3G
/// ```
///
/// - `.` walkable, `#` obstacle, `1`-`9` weighted cell
/// - `S` / `G` walkable cells that also mark the start and goal
///
/// Weights above 9 cannot be written in text form and render as `9`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    width: usize,
    height: usize,
    cost_field: Vec<u8>,
}

/// Unchecked wire form of [`Grid`]; validated on the way in.
#[derive(Deserialize)]
struct RawGrid {
    width: usize,
    height: usize,
    cost_field: Vec<u8>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = GridError;

    fn try_from(raw: RawGrid) -> Result<Self, Self::Error> {
        let expected = raw
            .width
            .checked_mul(raw.height)
            .ok_or(GridError::SizeMismatch { expected: usize::MAX, found: raw.cost_field.len() })?;
        if raw.cost_field.len() != expected {
            return Err(GridError::SizeMismatch { expected, found: raw.cost_field.len() });
        }
        if let Some(index) = raw.cost_field.iter().position(|&cost| cost < WALKABLE) {
            return Err(GridError::InvalidCost { index, cost: raw.cost_field[index] });
        }
        Ok(Grid { width: raw.width, height: raw.height, cost_field: raw.cost_field })
    }
}

/// A grid parsed from text together with its optional `S` / `G` markers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedGrid {
    pub grid: Grid,
    pub start: Option<Cell>,
    pub goal: Option<Cell>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridError {
    Empty,
    RaggedRows { row: usize, expected: usize, found: usize },
    InvalidCell { row: usize, col: usize, found: char },
    DuplicateMarker { marker: char },
    SizeMismatch { expected: usize, found: usize },
    InvalidCost { index: usize, cost: u8 },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::Empty => write!(f, "grid has no cells"),
            GridError::RaggedRows { row, expected, found } => {
                write!(f, "row {} has {} cells, expected {}", row, found, expected)
            }
            GridError::InvalidCell { row, col, found } => {
                write!(f, "unexpected character {:?} at row {}, column {}", found, row, col)
            }
            GridError::DuplicateMarker { marker } => {
                write!(f, "marker '{}' appears more than once", marker)
            }
            GridError::SizeMismatch { expected, found } => {
                write!(f, "cost field has {} cells, expected {}", found, expected)
            }
            GridError::InvalidCost { index, cost } => {
                write!(f, "cell {} has cost {}, costs start at {}", index, cost, WALKABLE)
            }
        }
    }
}

impl std::error::Error for GridError {}

impl Grid {
    /// An all-walkable grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cost_field: vec![WALKABLE; width * height],
        }
    }

    /// Build from a 0/1 matrix, `1` meaning obstacle. Any other value is walkable.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if width == 0 {
            return Err(GridError::Empty);
        }

        let mut grid = Grid::new(width, height);
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != width {
                return Err(GridError::RaggedRows { row, expected: width, found: values.len() });
            }
            for (col, &value) in values.iter().enumerate() {
                if value == 1 {
                    grid.set_obstacle(Cell::new(row, col));
                }
            }
        }
        Ok(grid)
    }

    /// Parse the text format, keeping the `S` / `G` markers.
    pub fn parse_with_endpoints(text: &str) -> Result<ParsedGrid, GridError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("//"))
            .collect();

        let height = lines.len();
        let width = lines.first().map(|l| l.chars().count()).unwrap_or(0);
        if width == 0 {
            return Err(GridError::Empty);
        }

        let mut grid = Grid::new(width, height);
        let mut start = None;
        let mut goal = None;

        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(GridError::RaggedRows { row, expected: width, found });
            }
            for (col, ch) in line.chars().enumerate() {
                let cell = Cell::new(row, col);
                match ch {
                    '.' => {}
                    '#' => grid.set_obstacle(cell),
                    '1'..='9' => grid.set_cost(cell, ch as u8 - b'0'),
                    'S' | 's' => {
                        if start.replace(cell).is_some() {
                            return Err(GridError::DuplicateMarker { marker: 'S' });
                        }
                    }
                    'G' | 'g' => {
                        if goal.replace(cell).is_some() {
                            return Err(GridError::DuplicateMarker { marker: 'G' });
                        }
                    }
                    found => return Err(GridError::InvalidCell { row, col, found }),
                }
            }
        }

        Ok(ParsedGrid { grid, start, goal })
    }

    /// Random grid where each cell is an obstacle with probability `density`.
    ///
    /// The top-left and bottom-right corners are always walkable so they can
    /// serve as start and goal.
    pub fn random<R: Rng + ?Sized>(width: usize, height: usize, density: f64, rng: &mut R) -> Self {
        let density = if density.is_nan() { 0.0 } else { density.clamp(0.0, 1.0) };
        let mut grid = Grid::new(width, height);
        for cost in grid.cost_field.iter_mut() {
            if rng.random_bool(density) {
                *cost = OBSTACLE;
            }
        }
        if width > 0 && height > 0 {
            grid.clear(Cell::new(0, 0));
            grid.clear(Cell::new(height - 1, width - 1));
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cost_field(&self) -> &[u8] {
        &self.cost_field
    }

    #[inline]
    pub fn get_index(&self, cell: Cell) -> usize {
        cell.row * self.width + cell.col
    }

    #[inline]
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    /// Cost of entering `cell`, or `None` when it lies outside the grid.
    #[inline]
    pub fn cost_at(&self, cell: Cell) -> Option<u8> {
        if self.in_bounds(cell) {
            Some(self.cost_field[self.get_index(cell)])
        } else {
            None
        }
    }

    /// In bounds and not an obstacle.
    #[inline]
    pub fn is_walkable(&self, cell: Cell) -> bool {
        matches!(self.cost_at(cell), Some(cost) if cost != OBSTACLE)
    }

    /// Panics if `cell` is out of bounds.
    pub fn set_obstacle(&mut self, cell: Cell) {
        let idx = self.get_index(cell);
        self.cost_field[idx] = OBSTACLE;
    }

    /// Set the entry cost of `cell`. Zero is raised to [`WALKABLE`] so every
    /// step costs at least 1.
    ///
    /// Panics if `cell` is out of bounds.
    pub fn set_cost(&mut self, cell: Cell, cost: u8) {
        let idx = self.get_index(cell);
        self.cost_field[idx] = cost.max(WALKABLE);
    }

    /// Panics if `cell` is out of bounds.
    pub fn clear(&mut self, cell: Cell) {
        self.set_cost(cell, WALKABLE);
    }

    pub fn walkable_count(&self) -> usize {
        self.cost_field.iter().filter(|&&cost| cost != OBSTACLE).count()
    }

    /// Legal moves out of `cell` with their step costs, appended to `out` in
    /// expansion order (right, down, left, up, then diagonals).
    ///
    /// A step costs the entry cost of the target cell, multiplied by
    /// `diagonal_cost` for diagonal moves. Diagonals that would squeeze past
    /// an obstacle corner are skipped.
    pub fn neighbors_into(
        &self,
        cell: Cell,
        connectivity: Connectivity,
        diagonal_cost: FixedNum,
        out: &mut Successors<Cell>,
    ) {
        for &direction in connectivity.directions() {
            let Some(next) = cell.step(direction, self.height, self.width) else {
                continue;
            };

            let cost = self.cost_field[self.get_index(next)];
            if cost == OBSTACLE {
                continue;
            }

            if direction.is_diagonal() {
                let (dr, _) = direction.delta();
                let vertical = if dr > 0 { Cell::new(cell.row + 1, cell.col) } else { Cell::new(cell.row - 1, cell.col) };
                let horizontal = Cell::new(cell.row, next.col);
                if !self.is_walkable(vertical) || !self.is_walkable(horizontal) {
                    continue;
                }
                out.push((next, FixedNum::from_num(cost) * diagonal_cost));
            } else {
                out.push((next, FixedNum::from_num(cost)));
            }
        }
    }

    pub fn neighbors(&self, cell: Cell, connectivity: Connectivity, diagonal_cost: FixedNum) -> Successors<Cell> {
        let mut out = Successors::new();
        self.neighbors_into(cell, connectivity, diagonal_cost, &mut out);
        out
    }

    /// Flood fill from `start`; the returned set is indexed by [`Grid::get_index`].
    ///
    /// Empty when `start` is out of bounds or blocked.
    #[profile(5)]
    pub fn reachable(&self, start: Cell, connectivity: Connectivity) -> FixedBitSet {
        let mut visited = FixedBitSet::with_capacity(self.cost_field.len());
        if !self.is_walkable(start) {
            return visited;
        }

        visited.insert(self.get_index(start));
        let mut queue = VecDeque::new();
        queue.push_back(start);

        // Step costs are irrelevant here, only adjacency matters.
        let mut scratch = Successors::new();
        while let Some(current) = queue.pop_front() {
            scratch.clear();
            self.neighbors_into(current, connectivity, FixedNum::ONE, &mut scratch);
            for &(next, _) in scratch.iter() {
                let idx = self.get_index(next);
                if !visited.put(idx) {
                    queue.push_back(next);
                }
            }
        }

        visited
    }

    pub fn is_reachable(&self, start: Cell, goal: Cell, connectivity: Connectivity) -> bool {
        if !self.in_bounds(goal) {
            return false;
        }
        self.reachable(start, connectivity).contains(self.get_index(goal))
    }
}

impl FromStr for Grid {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grid::parse_with_endpoints(s).map(|parsed| parsed.grid)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height {
            for col in 0..self.width {
                let ch = match self.cost_field[self.get_index(Cell::new(row, col))] {
                    OBSTACLE => '#',
                    WALKABLE => '.',
                    cost => char::from(b'0' + cost.min(9)),
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
