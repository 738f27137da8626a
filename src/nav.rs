//! Grid pathfinding with Iterative Deepening A*.
//!
//! - [`structures::Grid`] holds the map as a cost field (255 = obstacle).
//! - [`pathfinding::IdaStar`] runs the threshold-deepening search over it.
//! - [`config::SearchConfig`] selects heuristic, movement model and limits.
//! - [`map`] persists grids together with their start and goal cells.

pub mod config;
pub mod fixed_math;
pub mod map;
pub mod pathfinding;
pub mod profiling;
pub mod structures;
