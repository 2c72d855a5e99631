//! Solution representation: mini-routes, complete truck routes and the
//! remaining-demand ledger shared across product rounds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::geometry::Site;
use crate::instance::{Instance, ProductId};

/// One depot visit for one product followed by deliveries to stations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiniRoute {
    pub depot_id: usize,
    pub product_id: ProductId,
    /// Quantity loaded at the depot.
    pub load_quantity: f64,
    /// Visited stations in order with the quantity delivered to each.
    pub stations: Vec<(usize, f64)>,
}

impl MiniRoute {
    /// Sum of the quantities delivered along this mini-route.
    pub fn delivered(&self) -> f64 {
        self.stations.iter().map(|&(_, qty)| qty).sum()
    }
}

/// A truck's full garage-to-garage trip.
///
/// Never empty: the assembler discards routes without mini-routes. Cost
/// fields are computed once at construction.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteRoute {
    truck_id: usize,
    garage_id: usize,
    /// Product the truck carries before the first mini-route.
    start_product: ProductId,
    mini_routes: Vec<MiniRoute>,
    total_distance: f64,
    total_changeover_cost: f64,
    total_cost: f64,
}

impl CompleteRoute {
    pub(crate) fn new(
        truck_id: usize,
        garage_id: usize,
        start_product: ProductId,
        mini_routes: Vec<MiniRoute>,
        total_distance: f64,
        total_changeover_cost: f64,
    ) -> Self {
        CompleteRoute {
            truck_id,
            garage_id,
            start_product,
            mini_routes,
            total_distance,
            total_changeover_cost,
            total_cost: total_distance + total_changeover_cost,
        }
    }

    pub fn truck_id(&self) -> usize {
        self.truck_id
    }

    pub fn garage_id(&self) -> usize {
        self.garage_id
    }

    pub fn start_product(&self) -> ProductId {
        self.start_product
    }

    pub fn mini_routes(&self) -> &[MiniRoute] {
        &self.mini_routes
    }

    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    pub fn total_changeover_cost(&self) -> f64 {
        self.total_changeover_cost
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Product the truck holds when it returns to the garage.
    pub fn final_product(&self) -> ProductId {
        self.mini_routes
            .last()
            .map_or(self.start_product, |m| m.product_id)
    }

    /// Number of adjacent mini-route pairs carrying different products.
    pub fn product_changes(&self) -> usize {
        self.mini_routes
            .windows(2)
            .filter(|pair| pair[0].product_id != pair[1].product_id)
            .count()
    }

    /// Flatten the route into its stop sequence.
    ///
    /// The sequence starts and ends at the garage. Each stop carries the
    /// product on board and the changeover cost accumulated so far.
    pub fn stops(&self, instance: &Instance) -> Vec<Stop> {
        let mut stops = Vec::new();
        let mut current_product = self.start_product;
        let mut cumulative = 0.0;

        stops.push(Stop {
            site: Site::Garage(self.garage_id),
            quantity: None,
            product: current_product,
            cumulative_changeover: cumulative,
        });

        for mini_route in &self.mini_routes {
            if current_product != mini_route.product_id {
                cumulative += instance.changeover_cost(current_product, mini_route.product_id);
                current_product = mini_route.product_id;
            }

            stops.push(Stop {
                site: Site::Depot(mini_route.depot_id),
                quantity: Some(mini_route.load_quantity),
                product: current_product,
                cumulative_changeover: cumulative,
            });

            for &(station_id, qty) in &mini_route.stations {
                stops.push(Stop {
                    site: Site::Station(station_id),
                    quantity: Some(qty),
                    product: current_product,
                    cumulative_changeover: cumulative,
                });
            }
        }

        stops.push(Stop {
            site: Site::Garage(self.garage_id),
            quantity: None,
            product: current_product,
            cumulative_changeover: cumulative,
        });

        stops
    }
}

impl fmt::Debug for CompleteRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Route of truck {} (garage {}):", self.truck_id, self.garage_id)?;
        writeln!(f, "  Distance: {:.2}", self.total_distance)?;
        writeln!(f, "  Changeover: {:.2}", self.total_changeover_cost)?;
        writeln!(f, "  Total: {:.2}", self.total_cost)?;

        for (i, mini_route) in self.mini_routes.iter().enumerate() {
            writeln!(
                f,
                "  Mini-route {}: depot {} product {} load {:.2} stations {:?}",
                i + 1,
                mini_route.depot_id,
                mini_route.product_id,
                mini_route.load_quantity,
                mini_route.stations
            )?;
        }

        Ok(())
    }
}

/// One stop of a flattened route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub site: Site,
    /// Load taken at a depot or quantity delivered at a station.
    pub quantity: Option<f64>,
    pub product: ProductId,
    pub cumulative_changeover: f64,
}

/// Quantity still owed per `(station, product)`.
///
/// Owned by the decomposition engine and lent to a single round at a time.
/// Quantities never go below zero; pairs at zero are no longer pending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemainingDemand {
    quantities: BTreeMap<(usize, ProductId), f64>,
}

impl RemainingDemand {
    /// Initialise from every station's declared demand.
    pub fn from_instance(instance: &Instance) -> Self {
        let mut quantities = BTreeMap::new();
        for station in &instance.stations {
            for (&product, &qty) in &station.demand {
                quantities.insert((station.id, product), qty);
            }
        }
        RemainingDemand { quantities }
    }

    /// Remaining quantity for a pair (0 when unknown).
    pub fn get(&self, station_id: usize, product: ProductId) -> f64 {
        self.quantities
            .get(&(station_id, product))
            .copied()
            .unwrap_or(0.0)
    }

    /// Set the remaining quantity for a pair, clamped at zero.
    pub fn set(&mut self, station_id: usize, product: ProductId, qty: f64) {
        self.quantities.insert((station_id, product), qty.max(0.0));
    }

    /// Whether a pair still needs a delivery.
    pub fn is_pending(&self, station_id: usize, product: ProductId) -> bool {
        self.get(station_id, product) > 0.0
    }

    /// Record a delivery against a pair.
    pub fn deliver(&mut self, station_id: usize, product: ProductId, qty: f64) {
        if let Some(remaining) = self.quantities.get_mut(&(station_id, product)) {
            *remaining = (*remaining - qty).max(0.0);
        }
    }

    /// Record every delivery made along a route.
    pub fn apply(&mut self, route: &CompleteRoute) {
        for mini_route in route.mini_routes() {
            for &(station_id, qty) in &mini_route.stations {
                self.deliver(station_id, mini_route.product_id, qty);
            }
        }
    }

    /// Total remaining quantity over all pairs.
    pub fn total(&self) -> f64 {
        self.quantities.values().sum()
    }

    /// Pairs that are still pending, in `(station, product)` order.
    pub fn pending(&self) -> impl Iterator<Item = ((usize, ProductId), f64)> + '_ {
        self.quantities
            .iter()
            .filter(|(_, &qty)| qty > 0.0)
            .map(|(&key, &qty)| (key, qty))
    }
}
