use crate::nav::fixed_math::{cost_from_f64, FixedNum};
use serde::{Serialize, Deserialize};
use super::types::{Cell, Connectivity};

/// |Δrow| + |Δcol|. Exact on an open 4-connected grid.
pub fn manhattan(a: Cell, b: Cell) -> FixedNum {
    FixedNum::from_num(a.row.abs_diff(b.row) + a.col.abs_diff(b.col))
}

/// Straight-line distance.
pub fn euclidean(a: Cell, b: Cell) -> FixedNum {
    let dr = FixedNum::from_num(a.row.abs_diff(b.row));
    let dc = FixedNum::from_num(a.col.abs_diff(b.col));
    // Saturates past ~1.2e7 cells per axis, which only lowers the estimate
    let len_sq = dr.saturating_mul(dr).saturating_add(dc.saturating_mul(dc));
    if len_sq == FixedNum::ZERO {
        return FixedNum::ZERO;
    }
    len_sq.sqrt()
}

/// max(|Δrow|, |Δcol|). Exact on an open 8-connected grid with unit diagonals.
pub fn chebyshev(a: Cell, b: Cell) -> FixedNum {
    FixedNum::from_num(a.row.abs_diff(b.row).max(a.col.abs_diff(b.col)))
}

/// Octile distance with √2 diagonals.
pub fn octile(a: Cell, b: Cell) -> FixedNum {
    octile_with(a, b, cost_from_f64(std::f64::consts::SQRT_2))
}

/// Octile distance for a given diagonal step cost.
pub fn octile_with(a: Cell, b: Cell, diagonal_cost: FixedNum) -> FixedNum {
    let dr = a.row.abs_diff(b.row);
    let dc = a.col.abs_diff(b.col);
    let (long, short) = if dr > dc { (dr, dc) } else { (dc, dr) };
    FixedNum::from_num(long - short) + FixedNum::from_num(short) * diagonal_cost
}

/// Always zero; the search degrades to iterative-deepening uniform cost search.
pub fn zero(_a: Cell, _b: Cell) -> FixedNum {
    FixedNum::ZERO
}

/// Heuristic selectable from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeuristicKind {
    #[default]
    Manhattan,
    Euclidean,
    Chebyshev,
    Octile,
    Zero,
}

impl HeuristicKind {
    #[inline]
    pub fn estimate(self, a: Cell, b: Cell, diagonal_cost: FixedNum) -> FixedNum {
        match self {
            HeuristicKind::Manhattan => manhattan(a, b),
            HeuristicKind::Euclidean => euclidean(a, b),
            HeuristicKind::Chebyshev => chebyshev(a, b),
            HeuristicKind::Octile => octile_with(a, b, diagonal_cost),
            HeuristicKind::Zero => zero(a, b),
        }
    }

    /// Whether the estimate never exceeds the true cost under this movement
    /// model, which is what makes the returned path optimal.
    ///
    /// Assumes every cell costs at least 1 and `1 <= diagonal_cost <= 2`.
    pub fn is_admissible(self, connectivity: Connectivity, diagonal_cost: FixedNum) -> bool {
        match (self, connectivity) {
            (_, Connectivity::Four) => true,
            (HeuristicKind::Manhattan, Connectivity::Eight) => false,
            (HeuristicKind::Euclidean, Connectivity::Eight) => {
                diagonal_cost >= cost_from_f64(std::f64::consts::SQRT_2)
            }
            (HeuristicKind::Chebyshev | HeuristicKind::Octile | HeuristicKind::Zero, Connectivity::Eight) => true,
        }
    }
}
