//! Built-in oracle: construction followed by granular local search.

use log::{debug, trace};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::{Duration, Instant};

use super::construction::{best_fit_decreasing, path_cheapest_arc};
use super::utils::neighbor_lists;
use super::{OracleRoutes, SubProblem, VrpOracle};
use crate::config::OracleConfig;

/// Working solution explored by the local search moves.
pub struct SearchState<'p> {
    pub problem: &'p SubProblem,
    /// One sequence per vehicle
    pub routes: Vec<Vec<usize>>,
    /// Current load per vehicle
    pub loads: Vec<i64>,
    /// Preprocessed closest nodes of every node
    pub(crate) neighbors: Vec<Vec<usize>>,
}

impl<'p> SearchState<'p> {
    /// Create a search state from a feasible set of routes.
    pub fn new(problem: &'p SubProblem, routes: OracleRoutes, granularity: usize) -> Self {
        let loads = routes.iter().map(|r| problem.route_load(r)).collect();
        SearchState {
            problem,
            routes,
            loads,
            neighbors: neighbor_lists(problem, granularity),
        }
    }

    /// Total cost of the current routes.
    pub fn cost(&self) -> i64 {
        self.problem.solution_cost(&self.routes)
    }

    /// Spare capacity of a vehicle.
    pub(crate) fn spare(&self, vehicle: usize) -> i64 {
        self.problem.capacities[vehicle] - self.loads[vehicle]
    }

    /// Run one pass over all neighbourhoods. Returns true if a move was applied.
    pub fn improve(&mut self, rng: &mut ChaCha8Rng) -> bool {
        self.relocate_neighborhood(rng)
            || self.swap_neighborhood(rng)
            || self.two_opt_neighborhood(rng)
    }

    pub fn into_routes(self) -> OracleRoutes {
        self.routes
    }
}

/// Capacitated VRP search used by default in every product round.
pub struct LocalSearchOracle {
    pub config: OracleConfig,
}

impl LocalSearchOracle {
    pub fn new(config: OracleConfig) -> Self {
        LocalSearchOracle { config }
    }

    /// Build a first feasible solution, if any.
    pub fn construct(problem: &SubProblem) -> Option<OracleRoutes> {
        path_cheapest_arc(problem).or_else(|| {
            trace!("Path cheapest arc failed, trying best-fit decreasing packing");
            best_fit_decreasing(problem)
        })
    }
}

impl Default for LocalSearchOracle {
    fn default() -> Self {
        LocalSearchOracle::new(OracleConfig::default())
    }
}

impl VrpOracle for LocalSearchOracle {
    fn solve(&mut self, problem: &SubProblem, budget: Duration) -> Option<OracleRoutes> {
        let deadline = Instant::now() + budget;

        let routes = Self::construct(problem)?;
        let mut state = SearchState::new(problem, routes, self.config.granularity);
        let initial_cost = state.cost();

        // Fresh generator per call so equal inputs give equal answers
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let mut passes = 0;

        while passes < self.config.max_passes && Instant::now() < deadline {
            if !state.improve(&mut rng) {
                break;
            }
            passes += 1;
        }

        debug!(
            "Oracle improved cost {} -> {} in {} passes",
            initial_cost,
            state.cost(),
            passes
        );

        Some(state.into_routes())
    }
}
