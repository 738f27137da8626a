/// Shared data structures used by the search and map modules.
///
/// This module contains the grid representation that the pathfinding
/// engine, map persistence and the binary all operate on.

mod grid;


pub use grid::{Grid, GridError, ParsedGrid, OBSTACLE, WALKABLE};
