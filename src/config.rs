//! Configuration parameters for the MPVRP-CC solver.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scale applied to distances before handing them to the VRP oracle.
pub const DISTANCE_SCALE: f64 = 1000.0;

/// Scale applied to demands and capacities before handing them to the VRP oracle.
pub const DEMAND_SCALE: f64 = 100.0;

/// Which product a new complete route measures its first changeover from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChangeoverBaseline {
    /// Always the truck's declared initial product.
    #[default]
    PerRound,
    /// The product the truck delivered last in an earlier round.
    CarryForward,
}

/// Settings for the built-in local search oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Number of nearest neighbours considered per node
    pub granularity: usize,
    /// Upper bound on improvement passes per oracle call
    pub max_passes: u32,
    /// Seed of the neighbourhood exploration order
    pub seed: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        OracleConfig {
            granularity: 20,
            max_passes: 2000,
            seed: 42,
        }
    }
}

/// Configuration settings for a solver run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Time allotted to the run
    pub time_limit: Duration,
    /// Share of `time_limit` granted to the oracle in each product round
    pub oracle_time_fraction: f64,
    /// Log the run banner and per-round summaries at info level
    pub verbose: bool,
    /// Changeover baseline for newly assembled routes
    pub changeover_baseline: ChangeoverBaseline,
    /// Built-in oracle settings
    pub oracle: OracleConfig,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            time_limit: Duration::from_secs(60),
            oracle_time_fraction: 0.5,
            verbose: true,
            changeover_baseline: ChangeoverBaseline::PerRound,
            oracle: OracleConfig::default(),
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        SolverConfig::default()
    }

    /// Set the time limit.
    pub fn with_time_limit(mut self, duration: Duration) -> Self {
        self.time_limit = duration;
        self
    }

    /// Set the share of the time limit given to each oracle call.
    pub fn with_oracle_time_fraction(mut self, fraction: f64) -> Self {
        self.oracle_time_fraction = fraction;
        self
    }

    /// Set whether run and round summaries are logged at info level.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the changeover baseline policy.
    pub fn with_changeover_baseline(mut self, baseline: ChangeoverBaseline) -> Self {
        self.changeover_baseline = baseline;
        self
    }

    /// Set the oracle neighbour-list size.
    pub fn with_granularity(mut self, granularity: usize) -> Self {
        self.oracle.granularity = granularity;
        self
    }

    /// Set the maximum number of oracle improvement passes.
    pub fn with_max_passes(mut self, passes: u32) -> Self {
        self.oracle.max_passes = passes;
        self
    }

    /// Set the oracle seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.oracle.seed = seed;
        self
    }

    /// Time budget of a single oracle invocation.
    pub fn oracle_budget(&self) -> Duration {
        self.time_limit
            .mul_f64(self.oracle_time_fraction.clamp(0.0, 1.0))
    }
}
