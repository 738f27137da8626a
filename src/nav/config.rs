use crate::nav::fixed_math::{cost_from_f64, FixedNum};
use crate::nav::pathfinding::{Connectivity, HeuristicKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{error, info, warn};

/// Config file read by the binary at startup.
pub const DEFAULT_CONFIG_PATH: &str = "assets/search_config.ron";

/// Diagonal step multiplier range that keeps octile and Chebyshev estimates admissible.
const MIN_DIAGONAL_COST: f64 = 1.0;
const MAX_DIAGONAL_COST: f64 = 2.0;

/// Search settings. Every field has a default, so a config file only needs
/// to name what it changes.
///
/// ```ron
/// (
///     heuristic: Octile,
///     connectivity: Eight,
///     max_nodes: Some(5000000),
/// )
/// ```
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub heuristic: HeuristicKind,
    pub connectivity: Connectivity,
    /// Multiplier applied to the entry cost of a diagonal step. Clamped to [1, 2].
    pub diagonal_cost: f64,
    /// Abort after this many node expansions, summed over all passes.
    pub max_nodes: Option<u64>,
    /// Abort after this many threshold passes.
    pub max_iterations: Option<u32>,
    /// Flood-fill the grid first and answer "no path" without searching
    /// when the goal is disconnected from the start.
    pub precheck_connectivity: bool,
    /// Try successors in ascending `f` order instead of the fixed
    /// right/down/left/up order. Does not change path cost.
    pub order_successors: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            heuristic: HeuristicKind::Manhattan,
            connectivity: Connectivity::Four,
            diagonal_cost: std::f64::consts::SQRT_2,
            max_nodes: None,
            max_iterations: None,
            precheck_connectivity: true,
            order_successors: false,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(ron::error::SpannedError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::Parse(e)
    }
}

impl SearchConfig {
    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str::<SearchConfig>(contents)?)
    }

    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON file, falling back to defaults when the file is
    /// missing or malformed.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(config) => {
                info!("Loaded search config from {}", path.display());
                config
            }
            Err(e) => {
                error!("{} ({})", e, path.display());
                error!("Using default SearchConfig");
                Self::default()
            }
        }
    }

    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Diagonal multiplier as a cost, clamped to the admissible range.
    pub fn diagonal_step_cost(&self) -> FixedNum {
        let value = if self.diagonal_cost.is_nan() {
            warn!("diagonal_cost is NaN, using {}", MIN_DIAGONAL_COST);
            MIN_DIAGONAL_COST
        } else if !(MIN_DIAGONAL_COST..=MAX_DIAGONAL_COST).contains(&self.diagonal_cost) {
            let clamped = self.diagonal_cost.clamp(MIN_DIAGONAL_COST, MAX_DIAGONAL_COST);
            warn!("diagonal_cost {} out of range, clamped to {}", self.diagonal_cost, clamped);
            clamped
        } else {
            self.diagonal_cost
        };
        cost_from_f64(value)
    }
}
