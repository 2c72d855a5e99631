//! # MPVRP-CC
//!
//! A Rust solver for the Multi-Product Vehicle Routing Problem with
//! Changeover Cost: trucks leave their garage, load a product at a depot,
//! deliver it to service stations and return, paying travel distance plus a
//! tank-cleaning cost whenever the carried product changes.
//!
//! The problem is decomposed product by product into single-depot capacitated
//! VRPs. Each sub-problem is handed to a [`oracle::VrpOracle`]; when it finds
//! nothing, a deterministic greedy assignment takes over. Assignments are
//! assembled into costed routes and the final solution is validated.

pub mod adapter;
pub mod assembler;
pub mod config;
pub mod decomposition;
pub mod error;
pub mod geometry;
pub mod greedy;
pub mod instance;
pub mod io;
pub mod oracle;
pub mod solution;
pub mod utils;
pub mod validation;

use crate::config::SolverConfig;
use crate::decomposition::{decompose, RoundSummary};
use crate::error::LookupError;
use crate::geometry::DistanceCache;
use crate::instance::Instance;
use crate::oracle::{LocalSearchOracle, VrpOracle};
use crate::solution::{CompleteRoute, RemainingDemand};
use crate::validation::{InstanceIssue, Metrics, SolutionIssue, ValidationReport};

use log::{info, warn};
use std::time::{Duration, Instant};

/// The main structure that runs the decomposition on an instance.
pub struct Solver {
    pub instance: Instance,
    pub config: SolverConfig,
    pub solution: Vec<CompleteRoute>,
    pub rounds: Vec<RoundSummary>,
    pub remaining: RemainingDemand,
    pub run_time: Duration,
    distances: DistanceCache,
    oracle: Box<dyn VrpOracle>,
}

impl Solver {
    /// Create a solver using the built-in local search oracle.
    pub fn new(instance: Instance, config: SolverConfig) -> Self {
        let oracle = LocalSearchOracle::new(config.oracle.clone());
        Self::with_oracle(instance, config, Box::new(oracle))
    }

    /// Create a solver with a custom oracle.
    pub fn with_oracle(instance: Instance, config: SolverConfig, oracle: Box<dyn VrpOracle>) -> Self {
        let remaining = RemainingDemand::from_instance(&instance);
        Solver {
            instance,
            config,
            solution: Vec::new(),
            rounds: Vec::new(),
            remaining,
            run_time: Duration::from_secs(0),
            distances: DistanceCache::new(),
            oracle,
        }
    }

    /// Pre-solve structural checks.
    pub fn validate_instance(&self) -> ValidationReport<InstanceIssue> {
        validation::validate_instance(&self.instance)
    }

    /// Run the decomposition and return the routes found.
    pub fn solve(&mut self) -> Result<&[CompleteRoute], LookupError> {
        let start_time = Instant::now();

        if self.config.verbose {
            info!("Solving MPVRP-CC instance {}", self.instance.name);
            info!(
                "Trucks: {}, depots: {}, stations: {}, products: {}",
                self.instance.trucks.len(),
                self.instance.depots.len(),
                self.instance.stations.len(),
                self.instance.products.len()
            );
        }

        let result = decompose(
            &self.instance,
            &self.distances,
            self.oracle.as_mut(),
            &self.config,
        )?;

        self.solution = result.routes;
        self.rounds = result.rounds;
        self.remaining = result.remaining;
        self.run_time = start_time.elapsed();

        if self.config.verbose {
            info!(
                "Solution with {} routes found in {:.3}s",
                self.solution.len(),
                self.run_time.as_secs_f64()
            );
        }

        Ok(&self.solution)
    }

    /// Validate the instance and solve it only if no issue was found.
    ///
    /// Returns the issues of an invalid instance without touching the solution.
    pub fn solve_validated(
        &mut self,
    ) -> Result<Result<&[CompleteRoute], ValidationReport<InstanceIssue>>, LookupError> {
        let report = self.validate_instance();
        if !report.is_valid() {
            for message in report.messages() {
                warn!("{}", message);
            }
            return Ok(Err(report));
        }

        self.solve().map(Ok)
    }

    /// Post-solve checks of the current solution.
    pub fn validate_solution(&self) -> Result<ValidationReport<SolutionIssue>, LookupError> {
        validation::validate_solution(&self.instance, &self.solution)
    }

    /// Metrics of the current solution.
    pub fn metrics(&self) -> Metrics {
        Metrics::from_routes(&self.solution, self.run_time)
    }

    /// The distance cache filled during solving.
    pub fn distances(&self) -> &DistanceCache {
        &self.distances
    }
}
