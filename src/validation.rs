//! Instance feasibility checks, solution checks and run metrics.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::error::LookupError;
use crate::instance::{Instance, ProductId};
use crate::solution::CompleteRoute;

/// Absolute tolerance when comparing delivered and declared quantities.
pub const DEMAND_TOLERANCE: f64 = 0.01;

/// Outcome of a validation pass. Issues are reported, never raised.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport<T> {
    pub issues: Vec<T>,
}

impl<T: fmt::Display> ValidationReport<T> {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues rendered as error strings.
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(|issue| issue.to_string()).collect()
    }
}

/// Structural problem of an instance that prevents solving.
#[derive(Debug, Clone, PartialEq)]
pub enum InstanceIssue {
    NoGarages,
    NoDepots,
    NoStations,
    NoTrucks,
    InsufficientStock {
        product: ProductId,
        stock: f64,
        demand: f64,
    },
    InsufficientCapacity {
        capacity: f64,
        largest_demand: f64,
    },
}

impl fmt::Display for InstanceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceIssue::NoGarages => write!(f, "No garage defined"),
            InstanceIssue::NoDepots => write!(f, "No depot defined"),
            InstanceIssue::NoStations => write!(f, "No station defined"),
            InstanceIssue::NoTrucks => write!(f, "No truck defined"),
            InstanceIssue::InsufficientStock {
                product,
                stock,
                demand,
            } => write!(
                f,
                "Insufficient stock for product {}: {} < {}",
                product, stock, demand
            ),
            InstanceIssue::InsufficientCapacity {
                capacity,
                largest_demand,
            } => write!(
                f,
                "Insufficient total capacity: {} < {}",
                capacity, largest_demand
            ),
        }
    }
}

/// Constraint violated by a solution.
#[derive(Debug, Clone, PartialEq)]
pub enum SolutionIssue {
    UnmetDemand {
        station: usize,
        product: ProductId,
        delivered: f64,
        demand: f64,
    },
    CapacityExceeded {
        truck: usize,
        load: f64,
        capacity: f64,
    },
}

impl fmt::Display for SolutionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolutionIssue::UnmetDemand {
                station,
                product,
                delivered,
                demand,
            } => write!(
                f,
                "Demand not met at station {} for product {}: {} != {}",
                station, product, delivered, demand
            ),
            SolutionIssue::CapacityExceeded {
                truck,
                load,
                capacity,
            } => write!(
                f,
                "Capacity exceeded for truck {}: {} > {}",
                truck, load, capacity
            ),
        }
    }
}

/// Check that an instance can be attempted at all.
pub fn validate_instance(instance: &Instance) -> ValidationReport<InstanceIssue> {
    let mut issues = Vec::new();

    if instance.garages.is_empty() {
        issues.push(InstanceIssue::NoGarages);
    }
    if instance.depots.is_empty() {
        issues.push(InstanceIssue::NoDepots);
    }
    if instance.stations.is_empty() {
        issues.push(InstanceIssue::NoStations);
    }
    if instance.trucks.is_empty() {
        issues.push(InstanceIssue::NoTrucks);
    }

    let total_demand = instance.total_demand();
    for (&product, &demand) in &total_demand {
        let stock = instance.total_stock(product);
        if stock < demand {
            issues.push(InstanceIssue::InsufficientStock {
                product,
                stock,
                demand,
            });
        }
    }

    let capacity = instance.total_capacity();
    let largest_demand = total_demand.values().copied().fold(0.0, f64::max);
    if capacity < largest_demand {
        issues.push(InstanceIssue::InsufficientCapacity {
            capacity,
            largest_demand,
        });
    }

    ValidationReport { issues }
}

/// Check demand satisfaction and per-mini-route capacity of a solution.
///
/// Fails only when a route references a truck unknown to the instance.
pub fn validate_solution(
    instance: &Instance,
    routes: &[CompleteRoute],
) -> Result<ValidationReport<SolutionIssue>, LookupError> {
    let mut issues = Vec::new();

    let mut delivered: BTreeMap<(usize, ProductId), f64> = BTreeMap::new();
    for route in routes {
        for mini_route in route.mini_routes() {
            for &(station_id, qty) in &mini_route.stations {
                *delivered
                    .entry((station_id, mini_route.product_id))
                    .or_insert(0.0) += qty;
            }
        }
    }

    for station in &instance.stations {
        for (&product, &demand) in &station.demand {
            let qty = delivered.get(&(station.id, product)).copied().unwrap_or(0.0);
            if (qty - demand).abs() > DEMAND_TOLERANCE {
                issues.push(SolutionIssue::UnmetDemand {
                    station: station.id,
                    product,
                    delivered: qty,
                    demand,
                });
            }
        }
    }

    for route in routes {
        let truck = instance.truck(route.truck_id())?;
        for mini_route in route.mini_routes() {
            if mini_route.load_quantity > truck.capacity {
                issues.push(SolutionIssue::CapacityExceeded {
                    truck: truck.id,
                    load: mini_route.load_quantity,
                    capacity: truck.capacity,
                });
            }
        }
    }

    Ok(ValidationReport { issues })
}

/// Aggregate figures of a solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Distinct trucks appearing in the solution
    pub num_vehicles: usize,
    /// Adjacent mini-routes of a route carrying different products
    pub num_product_changes: usize,
    pub total_changeover_cost: f64,
    pub total_distance: f64,
    /// Wall-clock solve time in seconds
    pub computation_time: f64,
    pub total_cost: f64,
}

impl Metrics {
    pub fn from_routes(routes: &[CompleteRoute], computation_time: Duration) -> Self {
        let total_distance: f64 = routes.iter().map(|r| r.total_distance()).sum();
        let total_changeover_cost: f64 = routes.iter().map(|r| r.total_changeover_cost()).sum();

        Metrics {
            num_vehicles: routes.iter().map(|r| r.truck_id()).unique().count(),
            num_product_changes: routes.iter().map(|r| r.product_changes()).sum(),
            total_changeover_cost,
            total_distance,
            computation_time: computation_time.as_secs_f64(),
            total_cost: total_distance + total_changeover_cost,
        }
    }
}
