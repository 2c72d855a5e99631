//! Product-by-product decomposition of the multi-product problem.
//!
//! Products are processed in increasing id order. Each round routes the
//! stations that still need the product from the first depot stocking it,
//! using every truck of the instance, then records the deliveries in the
//! remaining-demand ledger before moving on.

use log::{debug, log, Level};
use std::collections::BTreeMap;

use crate::adapter::{OracleAdapter, Round, RoundSource};
use crate::config::{ChangeoverBaseline, SolverConfig};
use crate::error::LookupError;
use crate::geometry::DistanceCache;
use crate::instance::{Instance, ProductId, Station, Truck};
use crate::oracle::VrpOracle;
use crate::solution::{CompleteRoute, RemainingDemand};

/// What happened in one product round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStatus {
    /// No station had pending demand for the product
    NoDemand,
    /// No depot stocks the product
    NoSupply,
    Solved(RoundSource),
}

/// Summary of one product round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSummary {
    pub product: ProductId,
    pub status: RoundStatus,
    pub depot_id: Option<usize>,
    /// Stations with pending demand at the start of the round
    pub stations: usize,
    pub routes: usize,
    pub delivered: f64,
}

impl RoundSummary {
    fn skipped(product: ProductId, status: RoundStatus, stations: usize) -> Self {
        RoundSummary {
            product,
            status,
            depot_id: None,
            stations,
            routes: 0,
            delivered: 0.0,
        }
    }
}

/// Result of a full decomposition run.
#[derive(Debug, Clone)]
pub struct Decomposition {
    pub routes: Vec<CompleteRoute>,
    pub rounds: Vec<RoundSummary>,
    /// Demand still owed after the last round
    pub remaining: RemainingDemand,
}

/// Run every product round in order and collect the routes.
pub fn decompose(
    instance: &Instance,
    distances: &DistanceCache,
    oracle: &mut dyn VrpOracle,
    config: &SolverConfig,
) -> Result<Decomposition, LookupError> {
    let level = if config.verbose {
        Level::Info
    } else {
        Level::Debug
    };

    let adapter = OracleAdapter::new(instance, distances);
    let mut remaining = RemainingDemand::from_instance(instance);
    let mut routes = Vec::new();
    let mut rounds = Vec::new();
    // Product each truck delivered last, for the carry-forward baseline
    let mut last_product: BTreeMap<usize, ProductId> = BTreeMap::new();

    for &product in &instance.products {
        let stations: Vec<&Station> = instance
            .stations
            .iter()
            .filter(|s| remaining.is_pending(s.id, product))
            .collect();

        if stations.is_empty() {
            debug!("Product {}: no pending demand, skipping", product);
            rounds.push(RoundSummary::skipped(product, RoundStatus::NoDemand, 0));
            continue;
        }

        // Only the first stocking depot supplies the whole round
        let depot = match instance.depots.iter().find(|d| d.stock_of(product) > 0.0) {
            Some(depot) => depot,
            None => {
                debug!("Product {}: no depot stocks it, skipping", product);
                rounds.push(RoundSummary::skipped(
                    product,
                    RoundStatus::NoSupply,
                    stations.len(),
                ));
                continue;
            }
        };

        // Trucks are reused freely across rounds
        let trucks: Vec<&Truck> = instance.trucks.iter().collect();
        let start_products = trucks
            .iter()
            .map(|t| match config.changeover_baseline {
                ChangeoverBaseline::PerRound => t.initial_product,
                ChangeoverBaseline::CarryForward => {
                    last_product.get(&t.id).copied().unwrap_or(t.initial_product)
                }
            })
            .collect();

        log!(
            level,
            "[Product {}] routing {} stations from depot {}",
            product,
            stations.len(),
            depot.id
        );

        let round = Round {
            product,
            stations,
            depot,
            trucks,
            start_products,
            budget: config.oracle_budget(),
            verbose: config.verbose,
        };

        let result = adapter.solve_round(oracle, &round, &remaining)?;

        let mut delivered = 0.0;
        for route in &result.routes {
            remaining.apply(route);
            last_product.insert(route.truck_id(), route.final_product());
            delivered += route
                .mini_routes()
                .iter()
                .map(|m| m.delivered())
                .sum::<f64>();
        }

        log!(
            level,
            "[Product {}] {} routes ({:?}), delivered {:.2}",
            product,
            result.routes.len(),
            result.source,
            delivered
        );

        rounds.push(RoundSummary {
            product,
            status: RoundStatus::Solved(result.source),
            depot_id: Some(depot.id),
            stations: round.stations.len(),
            routes: result.routes.len(),
            delivered,
        });
        routes.extend(result.routes);
    }

    Ok(Decomposition {
        routes,
        rounds,
        remaining,
    })
}
