mod types;
mod heuristic;
mod space;
mod ida_star;

#[cfg(test)]
mod tests;

// ============================================================================
// PUBLIC API
// ============================================================================

pub use types::{Cell, Direction, Connectivity, Path, SearchStats, SearchOutcome, SearchReport, SearchError};
pub use heuristic::{manhattan, euclidean, chebyshev, octile, octile_with, zero, HeuristicKind};
pub use space::{SearchSpace, GridSpace, Successors};
pub use ida_star::{IdaStar, ida_star};
