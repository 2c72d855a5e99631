//! Bridge between a product round and the VRP oracle.
//!
//! Builds the fixed-point sub-problem, invokes the oracle and turns its
//! answer into complete routes. A round is either entirely solved by the
//! oracle or entirely handed to the greedy assigner.

use log::{log, warn, Level};
use std::time::Duration;

use crate::assembler::RouteAssembler;
use crate::config::{DEMAND_SCALE, DISTANCE_SCALE};
use crate::error::LookupError;
use crate::geometry::{DistanceCache, Site};
use crate::greedy::GreedyAssigner;
use crate::instance::{Depot, Instance, ProductId, Station, Truck};
use crate::oracle::{OracleRoutes, SubProblem, VrpOracle};
use crate::solution::{CompleteRoute, RemainingDemand};

/// Everything needed to solve one product round.
#[derive(Debug, Clone)]
pub struct Round<'r> {
    pub product: ProductId,
    /// Stations with pending demand for `product`
    pub stations: Vec<&'r Station>,
    /// The single depot supplying the round
    pub depot: &'r Depot,
    pub trucks: Vec<&'r Truck>,
    /// Product each truck carries when leaving its garage, aligned with `trucks`
    pub start_products: Vec<ProductId>,
    pub budget: Duration,
    pub verbose: bool,
}

/// Who produced the routes of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundSource {
    Oracle,
    Fallback,
}

/// Routes produced for one round.
#[derive(Debug, Clone)]
pub struct RoundResult {
    pub routes: Vec<CompleteRoute>,
    pub source: RoundSource,
}

pub struct OracleAdapter<'a> {
    instance: &'a Instance,
    distances: &'a DistanceCache,
}

impl<'a> OracleAdapter<'a> {
    pub fn new(instance: &'a Instance, distances: &'a DistanceCache) -> Self {
        OracleAdapter {
            instance,
            distances,
        }
    }

    /// Build the integer sub-problem of a round.
    ///
    /// Node 0 is the depot and node `k` the `k`-th station of the round.
    /// Distances are scaled by 1000 and truncated. Demands are scaled by 100
    /// and rounded up, capacities scaled by 100 and rounded down, so a
    /// capacity-feasible answer never overloads a real truck.
    pub fn build_subproblem(
        &self,
        round: &Round,
        remaining: &RemainingDemand,
    ) -> Result<SubProblem, LookupError> {
        let mut sites = Vec::with_capacity(round.stations.len() + 1);
        sites.push(Site::Depot(round.depot.id));
        sites.extend(round.stations.iter().map(|s| Site::Station(s.id)));

        let n = sites.len();
        let mut distances = vec![vec![0i64; n]; n];
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    let dist = self.distances.distance(self.instance, sites[i], sites[j])?;
                    distances[i][j] = (dist * DISTANCE_SCALE) as i64;
                }
            }
        }

        let mut demands = Vec::with_capacity(n);
        demands.push(0);
        demands.extend(
            round
                .stations
                .iter()
                .map(|s| scale_demand(remaining.get(s.id, round.product))),
        );

        let capacities = round
            .trucks
            .iter()
            .map(|t| (t.capacity * DEMAND_SCALE).floor() as i64)
            .collect();

        Ok(SubProblem {
            distances,
            demands,
            capacities,
        })
    }

    /// Solve a round with the oracle, falling back to the greedy assigner
    /// when it finds nothing or answers with an unusable partition.
    pub fn solve_round(
        &self,
        oracle: &mut dyn VrpOracle,
        round: &Round,
        remaining: &RemainingDemand,
    ) -> Result<RoundResult, LookupError> {
        if round.trucks.is_empty() || round.stations.is_empty() {
            return Ok(RoundResult {
                routes: Vec::new(),
                source: RoundSource::Oracle,
            });
        }

        let problem = self.build_subproblem(round, remaining)?;
        let level = if round.verbose {
            Level::Info
        } else {
            Level::Debug
        };
        log!(
            level,
            "Product {}: sub-problem with {} stations and {} vehicles from depot {}",
            round.product,
            problem.station_count(),
            problem.vehicle_count(),
            round.depot.id
        );

        let answer = oracle
            .solve(&problem, round.budget)
            .filter(|routes| Self::is_well_formed(&problem, routes));

        match answer {
            Some(routes) => Ok(RoundResult {
                routes: self.assemble(round, remaining, &routes)?,
                source: RoundSource::Oracle,
            }),
            None => {
                warn!(
                    "Product {}: no oracle solution, using greedy assignment",
                    round.product
                );
                Ok(RoundResult {
                    routes: self.fallback(round, remaining)?,
                    source: RoundSource::Fallback,
                })
            }
        }
    }

    /// Hand the whole round to the greedy assigner.
    pub fn fallback(
        &self,
        round: &Round,
        remaining: &RemainingDemand,
    ) -> Result<Vec<CompleteRoute>, LookupError> {
        GreedyAssigner::new(self.instance, self.distances).solve(
            round.product,
            &round.stations,
            &round.trucks,
            round.depot,
            remaining,
            &round.start_products,
        )
    }

    /// One route per vehicle that visits at least one station.
    fn assemble(
        &self,
        round: &Round,
        remaining: &RemainingDemand,
        routes: &OracleRoutes,
    ) -> Result<Vec<CompleteRoute>, LookupError> {
        let assembler = RouteAssembler::new(self.instance, self.distances);
        let mut assembled = Vec::new();

        for (vehicle, nodes) in routes.iter().enumerate() {
            if nodes.is_empty() {
                continue;
            }

            let stations: Vec<&Station> = nodes.iter().map(|&node| round.stations[node - 1]).collect();
            if let Some(route) = assembler.assemble(
                round.trucks[vehicle],
                round.depot,
                round.product,
                &stations,
                remaining,
                round.start_products[vehicle],
            )? {
                assembled.push(route);
            }
        }

        Ok(assembled)
    }

    /// One sequence per vehicle, every station visited exactly once and no
    /// vehicle loaded beyond its capacity.
    fn is_well_formed(problem: &SubProblem, routes: &OracleRoutes) -> bool {
        if routes.len() != problem.vehicle_count() {
            warn!(
                "Oracle returned {} sequences for {} vehicles",
                routes.len(),
                problem.vehicle_count()
            );
            return false;
        }

        let mut seen = vec![false; problem.node_count()];
        for &node in routes.iter().flatten() {
            if node == 0 || node >= problem.node_count() || seen[node] {
                warn!("Oracle returned invalid or repeated node {}", node);
                return false;
            }
            seen[node] = true;
        }

        let missing = seen.iter().skip(1).filter(|&&visited| !visited).count();
        if missing > 0 {
            warn!("Oracle left {} stations unvisited", missing);
            return false;
        }

        for (vehicle, route) in routes.iter().enumerate() {
            let load = problem.route_load(route);
            if load > problem.capacities[vehicle] {
                warn!(
                    "Oracle loaded vehicle {} with {} over capacity {}",
                    vehicle, load, problem.capacities[vehicle]
                );
                return false;
            }
        }

        true
    }
}

/// Fixed-point demand, rounded up. The offset absorbs float noise such as
/// `0.07 * 100 == 7.000000000000001`.
fn scale_demand(quantity: f64) -> i64 {
    (quantity * DEMAND_SCALE - 1e-9).ceil().max(0.0) as i64
}
