use crate::nav::config::SearchConfig;
use crate::nav::fixed_math::FixedNum;
use crate::nav::profiling::profile;
use crate::nav::structures::Grid;
use crate::profile_log;
use rustc_hash::FxHashSet;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use super::space::{GridSpace, SearchSpace, Successors};
use super::types::{Cell, Path, SearchError, SearchOutcome, SearchReport, SearchStats, HIGH_EXPANSION_WARNING};

/// Iterative Deepening A*.
///
/// Repeats a depth-first search bounded by a cost threshold. A branch is cut
/// as soon as `f = g + h` exceeds the threshold; the smallest `f` that was cut
/// becomes the next threshold. When a pass cuts nothing and misses the goal,
/// every reachable state has been tried and the goal is unreachable.
///
/// # Memory
///
/// Only the current path is stored: one frame per depth level plus a set of
/// the states on it, so memory is O(depth) regardless of map size. The
/// traversal uses an explicit stack, so long corridors cannot overflow the
/// call stack.
///
/// # Example
///
/// ```rust,ignore
/// let grid: Grid = "S..\n.#.\n..G".parse()?;
/// let report = IdaStar::default().search(&grid, Cell::new(0, 0), Cell::new(2, 2))?;
/// assert_eq!(report.path().map(|p| p.len()), Some(4));
/// ```
#[derive(Clone, Debug, Default)]
pub struct IdaStar {
    config: SearchConfig,
}

/// One level of the depth-first stack.
struct Frame<S> {
    state: S,
    g: FixedNum,
    successors: Successors<S>,
    next: usize,
}

enum PassResult<S> {
    Found(Path<S>),
    /// Goal not found; smallest f that exceeded the threshold.
    Exceeded(FixedNum),
    /// Goal not found and nothing was cut.
    Exhausted,
}

/// Buffers reused across passes.
struct PassScratch<S> {
    frames: Vec<Frame<S>>,
    on_path: FxHashSet<S>,
}

impl IdaStar {
    pub fn new(config: SearchConfig) -> Self {
        let diagonal_cost = config.diagonal_step_cost();
        if !config.heuristic.is_admissible(config.connectivity, diagonal_cost) {
            warn!(
                "[IDA*] {:?} heuristic overestimates under {:?} movement, paths may not be optimal",
                config.heuristic, config.connectivity
            );
        }
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search `grid` with the configured heuristic.
    pub fn search(&self, grid: &Grid, start: Cell, goal: Cell) -> Result<SearchReport, SearchError> {
        let heuristic = self.config.heuristic;
        let diagonal_cost = self.config.diagonal_step_cost();
        self.search_with(grid, start, goal, move |a, b| heuristic.estimate(a, b, diagonal_cost))
    }

    /// Search `grid` with a caller-supplied heuristic `h(cell, goal)`.
    ///
    /// A goal on an obstacle is reported as [`SearchOutcome::NoPath`]. The
    /// start cell may be an obstacle; its own cost is never paid.
    pub fn search_with<H>(&self, grid: &Grid, start: Cell, goal: Cell, heuristic: H) -> Result<SearchReport, SearchError>
    where
        H: Fn(Cell, Cell) -> FixedNum,
    {
        for cell in [start, goal] {
            if !grid.in_bounds(cell) {
                return Err(SearchError::OutOfBounds { cell, width: grid.width(), height: grid.height() });
            }
        }

        if !grid.is_walkable(goal) {
            info!("[IDA*] Goal {} is an obstacle, no path", goal);
            return Ok(SearchReport { outcome: SearchOutcome::NoPath, stats: SearchStats::default() });
        }

        let connectivity = self.config.connectivity;
        if self.config.precheck_connectivity && start != goal && !grid.is_reachable(start, goal, connectivity) {
            // Flood fill starts from walkable cells only; an obstacle start
            // can still step onto walkable neighbors.
            let disconnected = if grid.is_walkable(start) {
                true
            } else {
                let reachable = grid.reachable(goal, connectivity);
                !grid
                    .neighbors(start, connectivity, FixedNum::ONE)
                    .iter()
                    .any(|&(cell, _)| reachable.contains(grid.get_index(cell)))
            };
            if disconnected {
                info!("[IDA*] Goal {} is not connected to start {}, no path", goal, start);
                return Ok(SearchReport { outcome: SearchOutcome::NoPath, stats: SearchStats::default() });
            }
        }

        let space = GridSpace::new(grid, connectivity, self.config.diagonal_step_cost());
        self.search_space(&space, start, goal, heuristic)
    }

    /// Run the search over any [`SearchSpace`].
    #[profile]
    pub fn search_space<Sp, H>(
        &self,
        space: &Sp,
        start: Sp::State,
        goal: Sp::State,
        heuristic: H,
    ) -> Result<SearchReport<Sp::State>, SearchError>
    where
        Sp: SearchSpace,
        H: Fn(Sp::State, Sp::State) -> FixedNum,
    {
        let started = Instant::now();
        let mut stats = SearchStats::default();
        let mut scratch = PassScratch { frames: Vec::new(), on_path: FxHashSet::default() };

        let mut threshold = heuristic(start, goal);

        loop {
            if let Some(limit) = self.config.max_iterations {
                if stats.iterations >= limit {
                    error!(
                        "[IDA*] Exceeded max passes ({}) - start: {:?}, goal: {:?}, last threshold: {}",
                        limit, start, goal, threshold
                    );
                    return Err(SearchError::IterationLimitExceeded { limit });
                }
            }

            stats.iterations += 1;
            stats.thresholds.push(threshold);
            debug!("[IDA*] Pass {} with threshold {}", stats.iterations, threshold);

            let outcome = match self.bounded_pass(space, start, goal, &heuristic, threshold, &mut scratch, &mut stats)? {
                PassResult::Found(path) => SearchOutcome::Found(path),
                PassResult::Exceeded(next) => {
                    debug_assert!(next > threshold);
                    threshold = next;
                    continue;
                }
                PassResult::Exhausted => SearchOutcome::NoPath,
            };

            stats.elapsed = started.elapsed();
            if stats.nodes_expanded > HIGH_EXPANSION_WARNING {
                warn!("[IDA*] Search expanded {} nodes (high!)", stats.nodes_expanded);
            }
            match &outcome {
                SearchOutcome::Found(path) => info!(
                    "[IDA*] Path found: {} moves, cost {}, {} passes, {} nodes in {:?}",
                    path.len(), path.cost, stats.iterations, stats.nodes_expanded, stats.elapsed
                ),
                SearchOutcome::NoPath => info!(
                    "[IDA*] Search space exhausted after {} passes, {} nodes in {:?}",
                    stats.iterations, stats.nodes_expanded, stats.elapsed
                ),
            }
            return Ok(SearchReport { outcome, stats });
        }
    }

    /// One depth-first pass that never enters a state whose f exceeds `threshold`.
    #[allow(clippy::too_many_arguments)]
    fn bounded_pass<Sp, H>(
        &self,
        space: &Sp,
        start: Sp::State,
        goal: Sp::State,
        heuristic: &H,
        threshold: FixedNum,
        scratch: &mut PassScratch<Sp::State>,
        stats: &mut SearchStats,
    ) -> Result<PassResult<Sp::State>, SearchError>
    where
        Sp: SearchSpace,
        H: Fn(Sp::State, Sp::State) -> FixedNum,
    {
        let PassScratch { frames, on_path } = scratch;
        frames.clear();
        on_path.clear();

        let root_f = heuristic(start, goal);
        if root_f > threshold {
            return Ok(PassResult::Exceeded(root_f));
        }
        if start == goal {
            return Ok(PassResult::Found(Path { cells: vec![start], cost: FixedNum::ZERO }));
        }

        let successors = self.expand(space, start, goal, heuristic, stats)?;
        on_path.insert(start);
        frames.push(Frame { state: start, g: FixedNum::ZERO, successors, next: 0 });

        let mut min_exceeded: Option<FixedNum> = None;

        while let Some(frame) = frames.last_mut() {
            if frame.next == frame.successors.len() {
                // Backtrack
                if let Some(done) = frames.pop() {
                    on_path.remove(&done.state);
                }
                continue;
            }

            let (next, step_cost) = frame.successors[frame.next];
            frame.next += 1;
            let g = frame.g + step_cost;

            if on_path.contains(&next) {
                continue;
            }

            let f = g + heuristic(next, goal);
            if f > threshold {
                min_exceeded = Some(min_exceeded.map_or(f, |m| m.min(f)));
                continue;
            }

            if next == goal {
                let mut cells: Vec<Sp::State> = frames.iter().map(|frame| frame.state).collect();
                cells.push(next);
                return Ok(PassResult::Found(Path { cells, cost: g }));
            }

            let successors = self.expand(space, next, goal, heuristic, stats)?;
            on_path.insert(next);
            frames.push(Frame { state: next, g, successors, next: 0 });
        }

        Ok(match min_exceeded {
            Some(f) => PassResult::Exceeded(f),
            None => PassResult::Exhausted,
        })
    }

    fn expand<Sp, H>(
        &self,
        space: &Sp,
        state: Sp::State,
        goal: Sp::State,
        heuristic: &H,
        stats: &mut SearchStats,
    ) -> Result<Successors<Sp::State>, SearchError>
    where
        Sp: SearchSpace,
        H: Fn(Sp::State, Sp::State) -> FixedNum,
    {
        stats.nodes_expanded += 1;
        profile_log!(stats.nodes_expanded, "[IDA*] {} nodes expanded, now at {:?}", stats.nodes_expanded, state);

        if let Some(limit) = self.config.max_nodes {
            if stats.nodes_expanded > limit {
                error!(
                    "[IDA*] Exceeded max node expansions ({}) at pass {} - state: {:?}, goal: {:?}",
                    limit, stats.iterations, state, goal
                );
                return Err(SearchError::NodeLimitExceeded { limit });
            }
        }

        let mut successors = Successors::new();
        space.successors(state, &mut successors);

        if self.config.order_successors {
            successors.sort_by_key(|&(next, step_cost)| step_cost + heuristic(next, goal));
        }

        Ok(successors)
    }
}

/// Whether a 4-connected path exists, using Manhattan distance and default settings.
pub fn ida_star(grid: &Grid, start: Cell, goal: Cell) -> Result<bool, SearchError> {
    IdaStar::default()
        .search(grid, start, goal)
        .map(|report| report.path_exists())
}
