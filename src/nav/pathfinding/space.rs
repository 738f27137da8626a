use crate::nav::fixed_math::FixedNum;
use crate::nav::structures::Grid;
use smallvec::SmallVec;
use std::fmt::Debug;
use std::hash::Hash;
use super::types::{Cell, Connectivity};

/// Successor list: (state, step cost). Eight inline slots cover every grid move.
pub type Successors<S> = SmallVec<[(S, FixedNum); 8]>;

/// A graph the search engine can walk.
///
/// Step costs must be positive; a zero-cost cycle would let a pass run
/// without ever raising its threshold.
pub trait SearchSpace {
    type State: Copy + Eq + Hash + Debug;

    /// Append the successors of `state` to `out` in the order they should be tried.
    fn successors(&self, state: Self::State, out: &mut Successors<Self::State>);
}

/// A [`Grid`] viewed as a search space under a movement model.
#[derive(Clone, Copy, Debug)]
pub struct GridSpace<'a> {
    grid: &'a Grid,
    connectivity: Connectivity,
    diagonal_cost: FixedNum,
}

impl<'a> GridSpace<'a> {
    pub fn new(grid: &'a Grid, connectivity: Connectivity, diagonal_cost: FixedNum) -> Self {
        Self { grid, connectivity, diagonal_cost }
    }

    pub fn grid(&self) -> &'a Grid {
        self.grid
    }
}

impl SearchSpace for GridSpace<'_> {
    type State = Cell;

    #[inline]
    fn successors(&self, state: Cell, out: &mut Successors<Cell>) {
        self.grid.neighbors_into(state, self.connectivity, self.diagonal_cost, out);
    }
}
