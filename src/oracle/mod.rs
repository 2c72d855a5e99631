//! Single-product capacitated VRP oracle interface and its built-in implementation.
//!
//! The decomposition engine only depends on [`VrpOracle`]: given an integer
//! weighted sub-problem and a time budget, return one visiting sequence per
//! vehicle or `None` when no solution was found.

pub mod construction;
pub mod relocate;
pub mod search;
pub mod swap;
pub mod two_opt;
pub mod utils;

use std::time::Duration;

pub use self::search::LocalSearchOracle;

/// Per-vehicle visiting sequences of station nodes (`1..=N`), aligned with the fleet.
pub type OracleRoutes = Vec<Vec<usize>>;

/// A single-depot, single-product CVRP in fixed-point integers.
///
/// Node 0 is the depot, nodes `1..=N` are stations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubProblem {
    /// Full `(N+1) x (N+1)` distance matrix
    pub distances: Vec<Vec<i64>>,
    /// Demand per node, `demands[0] == 0`
    pub demands: Vec<i64>,
    /// Capacity per vehicle
    pub capacities: Vec<i64>,
}

impl SubProblem {
    /// Number of nodes including the depot.
    pub fn node_count(&self) -> usize {
        self.demands.len()
    }

    /// Number of station nodes.
    pub fn station_count(&self) -> usize {
        self.demands.len().saturating_sub(1)
    }

    pub fn vehicle_count(&self) -> usize {
        self.capacities.len()
    }

    pub fn distance(&self, from: usize, to: usize) -> i64 {
        self.distances[from][to]
    }

    /// Depot -> nodes -> depot cost of one sequence.
    pub fn route_cost(&self, route: &[usize]) -> i64 {
        if route.is_empty() {
            return 0;
        }

        let mut cost = self.distance(0, route[0]);
        for pair in route.windows(2) {
            cost += self.distance(pair[0], pair[1]);
        }
        cost + self.distance(route[route.len() - 1], 0)
    }

    /// Sum of node demands along a sequence.
    pub fn route_load(&self, route: &[usize]) -> i64 {
        route.iter().map(|&node| self.demands[node]).sum()
    }

    /// Total cost of a set of sequences.
    pub fn solution_cost(&self, routes: &[Vec<usize>]) -> i64 {
        routes.iter().map(|r| self.route_cost(r)).sum()
    }
}

/// External capacitated routing search.
pub trait VrpOracle {
    /// Partition the stations of `problem` into per-vehicle sequences, or
    /// return `None` if no feasible solution was found within `budget`.
    fn solve(&mut self, problem: &SubProblem, budget: Duration) -> Option<OracleRoutes>;
}

impl<F> VrpOracle for F
where
    F: FnMut(&SubProblem, Duration) -> Option<OracleRoutes>,
{
    fn solve(&mut self, problem: &SubProblem, budget: Duration) -> Option<OracleRoutes> {
        self(problem, budget)
    }
}
