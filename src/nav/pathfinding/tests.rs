/// Tests for IDA* correctness
///
/// Covers the classic demonstration grids, threshold progression, the
/// different heuristics and movement models, and the safety limits.

use super::*;
use crate::nav::config::SearchConfig;
use crate::nav::fixed_math::FixedNum;
use crate::nav::structures::Grid;
use std::collections::HashSet;

/// The 5x5 demonstration grid (1 = obstacle).
fn demo_grid() -> Grid {
    Grid::from_rows(&[
        [0u8, 0, 0, 0, 0],
        [1, 1, 0, 1, 0],
        [0, 0, 0, 1, 0],
        [0, 1, 1, 1, 0],
        [0, 0, 0, 0, 0],
    ])
    .unwrap()
}

fn maze_grid() -> Grid {
    Grid::from_rows(&[
        [0u8, 1, 0, 0, 0, 0, 0],
        [0, 1, 0, 1, 1, 1, 0],
        [0, 0, 0, 0, 0, 1, 0],
        [1, 1, 1, 1, 0, 1, 0],
        [0, 0, 0, 0, 0, 0, 0],
        [0, 1, 1, 1, 1, 1, 0],
        [0, 0, 0, 0, 0, 0, 0],
    ])
    .unwrap()
}

/// Start boxed in on the bottom row; the only way round is over the wall.
fn detour_grid() -> Grid {
    "...\n.#.\n.#.".parse().unwrap()
}

fn cell(row: usize, col: usize) -> Cell {
    Cell::new(row, col)
}

/// Every step is a legal move, no cell repeats, and the cost adds up.
fn assert_valid_path(grid: &Grid, path: &Path, connectivity: Connectivity, diagonal_cost: FixedNum) {
    let mut seen = HashSet::new();
    for c in &path.cells {
        assert!(seen.insert(*c), "cell {} visited twice in {:?}", c, path.cells);
    }

    let mut cost = FixedNum::ZERO;
    for pair in path.cells.windows(2) {
        let step = grid
            .neighbors(pair[0], connectivity, diagonal_cost)
            .into_iter()
            .find(|&(next, _)| next == pair[1]);
        let Some((_, step_cost)) = step else {
            panic!("illegal move {} -> {}", pair[0], pair[1]);
        };
        cost += step_cost;
    }
    assert_eq!(cost, path.cost, "path cost does not match its steps");
}

fn found(report: &SearchReport) -> &Path {
    report.path().expect("expected a path")
}

#[test]
fn test_demo_grid_clear_route() {
    let grid = demo_grid();
    let report = IdaStar::default().search(&grid, cell(0, 0), cell(4, 4)).unwrap();

    let path = found(&report);
    assert_eq!(path.cost, FixedNum::from_num(8));
    assert_eq!(path.start(), Some(cell(0, 0)));
    assert_eq!(path.goal(), Some(cell(4, 4)));
    assert_valid_path(&grid, path, Connectivity::Four, FixedNum::ONE);

    // Manhattan is exact here, so the first threshold already suffices
    assert_eq!(report.stats.thresholds, vec![FixedNum::from_num(8)]);
    assert_eq!(report.stats.iterations, 1);
}

#[test]
fn test_demo_grid_around_obstacles() {
    let grid = demo_grid();
    let report = IdaStar::default().search(&grid, cell(0, 0), cell(1, 2)).unwrap();

    let path = found(&report);
    assert_eq!(path.cells, vec![cell(0, 0), cell(0, 1), cell(0, 2), cell(1, 2)]);
    assert_eq!(path.cost, FixedNum::from_num(3));
}

#[test]
fn test_demo_grid_goal_on_obstacle() {
    let grid = demo_grid();
    let report = IdaStar::default().search(&grid, cell(0, 0), cell(3, 1)).unwrap();

    assert_eq!(report.outcome, SearchOutcome::NoPath);
    assert_eq!(report.stats.iterations, 0, "no pass should run for a blocked goal");
}

#[test]
fn test_demo_grid_reverse_route() {
    let grid = demo_grid();
    let report = IdaStar::default().search(&grid, cell(4, 4), cell(0, 0)).unwrap();

    let path = found(&report);
    assert_eq!(path.cost, FixedNum::from_num(8));
    assert_valid_path(&grid, path, Connectivity::Four, FixedNum::ONE);
}

#[test]
fn test_boolean_api_matches_demo_expectations() {
    let grid = demo_grid();
    assert_eq!(ida_star(&grid, cell(0, 0), cell(4, 4)), Ok(true));
    assert_eq!(ida_star(&grid, cell(0, 0), cell(1, 2)), Ok(true));
    assert_eq!(ida_star(&grid, cell(0, 0), cell(3, 1)), Ok(false));
    assert_eq!(ida_star(&grid, cell(4, 4), cell(0, 0)), Ok(true));

    let small = Grid::from_rows(&[[0u8, 0, 0], [0, 1, 0], [0, 0, 0]]).unwrap();
    assert_eq!(ida_star(&small, cell(0, 0), cell(2, 2)), Ok(true));
}

#[test]
fn test_threshold_rises_to_smallest_exceeded_cost() {
    let grid = detour_grid();
    let report = IdaStar::default().search(&grid, cell(2, 0), cell(2, 2)).unwrap();

    let path = found(&report);
    assert_eq!(path.cost, FixedNum::from_num(6));
    assert_valid_path(&grid, path, Connectivity::Four, FixedNum::ONE);

    // h(start) = 2, then each failed pass exposes the next cheapest frontier
    let expected: Vec<FixedNum> = [2, 4, 6].iter().map(|&t| FixedNum::from_num(t)).collect();
    assert_eq!(report.stats.thresholds, expected);
    assert_eq!(report.stats.iterations, 3);
    assert!(report.stats.thresholds.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_maze_is_solved_optimally() {
    let grid = maze_grid();
    let report = IdaStar::default().search(&grid, cell(0, 0), cell(6, 6)).unwrap();

    let path = found(&report);
    assert_eq!(path.cost, FixedNum::from_num(12));
    assert_eq!(path.len(), 12);
    assert_valid_path(&grid, path, Connectivity::Four, FixedNum::ONE);
    assert!(report.stats.nodes_expanded > 0);
}

#[test]
fn test_all_heuristics_agree_on_cost() {
    let grid = Grid::from_rows(&[
        [0u8, 0, 0, 0, 0],
        [0, 1, 0, 1, 0],
        [0, 0, 0, 0, 0],
        [0, 1, 0, 1, 0],
        [0, 0, 0, 0, 0],
    ])
    .unwrap();

    for heuristic in [
        HeuristicKind::Manhattan,
        HeuristicKind::Euclidean,
        HeuristicKind::Chebyshev,
        HeuristicKind::Octile,
        HeuristicKind::Zero,
    ] {
        let search = IdaStar::new(SearchConfig { heuristic, ..Default::default() });
        let report = search.search(&grid, cell(0, 0), cell(4, 4)).unwrap();
        let path = report.path().unwrap_or_else(|| panic!("{:?} found no path", heuristic));
        assert_eq!(path.cost, FixedNum::from_num(8), "{:?} returned a suboptimal path", heuristic);
    }
}

#[test]
fn test_zero_heuristic_needs_more_passes() {
    let grid = maze_grid();
    let informed = IdaStar::default().search(&grid, cell(0, 0), cell(6, 6)).unwrap();
    let blind = IdaStar::new(SearchConfig { heuristic: HeuristicKind::Zero, ..Default::default() })
        .search(&grid, cell(0, 0), cell(6, 6))
        .unwrap();

    assert_eq!(found(&informed).cost, found(&blind).cost);
    // Zero starts at threshold 0 and climbs one unit per pass
    assert_eq!(blind.stats.iterations, 13);
    assert!(blind.stats.nodes_expanded > informed.stats.nodes_expanded);
}

#[test]
fn test_sealed_barrier_has_no_path() {
    let grid: Grid = ".....\n#####\n.....".parse().unwrap();
    let report = IdaStar::default().search(&grid, cell(0, 0), cell(2, 4)).unwrap();

    assert_eq!(report.outcome, SearchOutcome::NoPath);
    assert_eq!(report.stats.iterations, 0, "flood fill should answer before searching");
}

#[test]
fn test_exhaustion_without_precheck() {
    let grid: Grid = ".....\n#####\n.....".parse().unwrap();
    let search = IdaStar::new(SearchConfig { precheck_connectivity: false, ..Default::default() });
    let report = search.search(&grid, cell(0, 0), cell(2, 4)).unwrap();

    assert_eq!(report.outcome, SearchOutcome::NoPath);
    assert!(report.stats.iterations >= 1);
    assert!(report.stats.thresholds.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_start_equals_goal() {
    let grid = demo_grid();
    let report = IdaStar::default().search(&grid, cell(2, 2), cell(2, 2)).unwrap();

    let path = found(&report);
    assert_eq!(path.cells, vec![cell(2, 2)]);
    assert_eq!(path.cost, FixedNum::ZERO);
    assert!(path.is_empty());
}

#[test]
fn test_start_on_obstacle_may_leave() {
    let grid: Grid = "#..\n...".parse().unwrap();
    let report = IdaStar::default().search(&grid, cell(0, 0), cell(0, 2)).unwrap();

    assert_eq!(found(&report).cost, FixedNum::from_num(2));
}

#[test]
fn test_start_on_obstacle_walled_off() {
    let grid: Grid = "#.#\n###\n...".parse().unwrap();
    let report = IdaStar::default().search(&grid, cell(0, 0), cell(2, 2)).unwrap();

    // (0,1) is the only way out of the start and it is sealed from row 2
    assert_eq!(report.outcome, SearchOutcome::NoPath);
    assert_eq!(report.stats.iterations, 0);
}

#[test]
fn test_out_of_bounds_is_error() {
    let grid = demo_grid();
    let err = IdaStar::default().search(&grid, cell(0, 0), cell(5, 0)).unwrap_err();

    assert_eq!(err, SearchError::OutOfBounds { cell: cell(5, 0), width: 5, height: 5 });
}

#[test]
fn test_node_limit() {
    let grid = Grid::new(30, 30);
    let search = IdaStar::new(SearchConfig {
        heuristic: HeuristicKind::Zero,
        max_nodes: Some(50),
        ..Default::default()
    });

    let err = search.search(&grid, cell(0, 0), cell(29, 29)).unwrap_err();
    assert_eq!(err, SearchError::NodeLimitExceeded { limit: 50 });
}

#[test]
fn test_iteration_limit() {
    let grid = detour_grid();
    let search = IdaStar::new(SearchConfig { max_iterations: Some(2), ..Default::default() });

    let err = search.search(&grid, cell(2, 0), cell(2, 2)).unwrap_err();
    assert_eq!(err, SearchError::IterationLimitExceeded { limit: 2 });

    // One more pass is enough
    let search = IdaStar::new(SearchConfig { max_iterations: Some(3), ..Default::default() });
    assert!(search.search(&grid, cell(2, 0), cell(2, 2)).unwrap().path_exists());
}

#[test]
fn test_weighted_cells_are_avoided() {
    let grid: Grid = "S9G\n...".parse().unwrap();
    let report = IdaStar::default().search(&grid, cell(0, 0), cell(0, 2)).unwrap();

    let path = found(&report);
    assert_eq!(path.cells, vec![cell(0, 0), cell(1, 0), cell(1, 1), cell(1, 2), cell(0, 2)]);
    assert_eq!(path.cost, FixedNum::from_num(4));
}

#[test]
fn test_eight_connected_octile_takes_diagonal() {
    let grid = Grid::new(5, 5);
    let config = SearchConfig {
        heuristic: HeuristicKind::Octile,
        connectivity: Connectivity::Eight,
        ..Default::default()
    };
    let diagonal = config.diagonal_step_cost();
    let report = IdaStar::new(config).search(&grid, cell(0, 0), cell(4, 4)).unwrap();

    let path = found(&report);
    assert_eq!(path.cells, (0..5).map(|i| cell(i, i)).collect::<Vec<_>>());
    assert_eq!(path.cost, diagonal * FixedNum::from_num(4));
    assert_valid_path(&grid, path, Connectivity::Eight, diagonal);
}

#[test]
fn test_diagonal_never_cuts_corners() {
    let grid: Grid = ".#\n#.".parse().unwrap();
    let config = SearchConfig {
        heuristic: HeuristicKind::Octile,
        connectivity: Connectivity::Eight,
        precheck_connectivity: false,
        ..Default::default()
    };

    let report = IdaStar::new(config).search(&grid, cell(0, 0), cell(1, 1)).unwrap();
    assert_eq!(report.outcome, SearchOutcome::NoPath);
}

#[test]
fn test_successor_ordering_keeps_cost() {
    let grid = maze_grid();
    let plain = IdaStar::default().search(&grid, cell(0, 0), cell(6, 6)).unwrap();
    let ordered = IdaStar::new(SearchConfig { order_successors: true, ..Default::default() })
        .search(&grid, cell(0, 0), cell(6, 6))
        .unwrap();

    assert_eq!(found(&plain).cost, found(&ordered).cost);
    assert_valid_path(&grid, found(&ordered), Connectivity::Four, FixedNum::ONE);
}

#[test]
fn test_custom_heuristic_closure() {
    let grid = maze_grid();
    let report = IdaStar::default()
        .search_with(&grid, cell(0, 0), cell(6, 6), |a, b| manhattan(a, b) / FixedNum::from_num(2))
        .unwrap();

    assert_eq!(found(&report).cost, FixedNum::from_num(12));
}

/// Integers 0..=len joined to their neighbors.
struct LineSpace {
    len: u32,
}

impl SearchSpace for LineSpace {
    type State = u32;

    fn successors(&self, state: u32, out: &mut Successors<u32>) {
        if state < self.len {
            out.push((state + 1, FixedNum::ONE));
        }
        if state > 0 {
            out.push((state - 1, FixedNum::ONE));
        }
    }
}

#[test]
fn test_generic_search_space() {
    let space = LineSpace { len: 10 };
    let report = IdaStar::default()
        .search_space(&space, 2, 7, |a: u32, b: u32| FixedNum::from_num(a.abs_diff(b)))
        .unwrap();

    let path = report.into_path().unwrap();
    assert_eq!(path.cells, (2..=7).collect::<Vec<u32>>());
    assert_eq!(path.cost, FixedNum::from_num(5));
}

#[test]
fn test_heuristic_values() {
    let a = cell(1, 1);
    let b = cell(4, 5);

    assert_eq!(manhattan(a, b), FixedNum::from_num(7));
    assert_eq!(chebyshev(a, b), FixedNum::from_num(4));
    assert_eq!(euclidean(a, b), FixedNum::from_num(5));
    assert_eq!(zero(a, b), FixedNum::ZERO);
    assert_eq!(octile_with(a, b, FixedNum::ONE), FixedNum::from_num(4));
    assert_eq!(octile_with(a, b, FixedNum::from_num(2)), FixedNum::from_num(7));
}

#[test]
fn test_euclidean_on_long_rows_stays_below_true_distance() {
    let a = cell(0, 0);
    let b = cell(0, 20_000_000);
    let estimate = euclidean(a, b);

    assert!(estimate > FixedNum::from_num(11_000_000));
    assert!(estimate <= manhattan(a, b));
    assert_eq!(euclidean(cell(0, 0), cell(30_000, 40_000)), FixedNum::from_num(50_000));
}

#[test]
fn test_admissibility_table() {
    let sqrt2 = SearchConfig::default().diagonal_step_cost();

    assert!(HeuristicKind::Manhattan.is_admissible(Connectivity::Four, sqrt2));
    assert!(!HeuristicKind::Manhattan.is_admissible(Connectivity::Eight, sqrt2));
    assert!(HeuristicKind::Octile.is_admissible(Connectivity::Eight, sqrt2));
    assert!(HeuristicKind::Euclidean.is_admissible(Connectivity::Eight, sqrt2));
    assert!(!HeuristicKind::Euclidean.is_admissible(Connectivity::Eight, FixedNum::ONE));
}
