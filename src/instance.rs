//! Problem definition and data structures for the MPVRP-CC.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::LookupError;
use crate::geometry::Site;

/// Products are identified by a plain index (0-based).
pub type ProductId = usize;

/// A fixed point of the network (garage, depot or station).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub name: String,
}

impl Location {
    /// Create a new location.
    pub fn new(id: usize, x: f64, y: f64, name: impl Into<String>) -> Self {
        Location {
            id,
            x,
            y,
            name: name.into(),
        }
    }

    /// Calculate the Euclidean distance between two locations.
    pub fn distance(&self, other: &Location) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A truck with its capacity and home garage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Truck {
    pub id: usize,
    pub capacity: f64,
    pub garage_id: usize,
    /// Product assumed loaded before the first mini-route.
    pub initial_product: ProductId,
}

/// A depot holding stock per product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Depot {
    pub id: usize,
    pub location: Location,
    pub stock: BTreeMap<ProductId, f64>,
}

impl Depot {
    /// Stock available for a product (0 when the depot does not carry it).
    pub fn stock_of(&self, product: ProductId) -> f64 {
        self.stock.get(&product).copied().unwrap_or(0.0)
    }
}

/// A service station with demand per product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: usize,
    pub location: Location,
    pub demand: BTreeMap<ProductId, f64>,
}

impl Station {
    /// Declared demand for a product (0 when absent).
    pub fn demand_of(&self, product: ProductId) -> f64 {
        self.demand.get(&product).copied().unwrap_or(0.0)
    }
}

/// A complete MPVRP-CC instance.
///
/// Entities receive sequential 1-based ids in insertion order. The set of
/// products is the union of every stock and demand key.
#[derive(Debug, Clone, Default)]
pub struct Instance {
    pub name: String,
    pub garages: Vec<Location>,
    pub depots: Vec<Depot>,
    pub stations: Vec<Station>,
    pub trucks: Vec<Truck>,
    pub products: BTreeSet<ProductId>,
    /// Cost of switching the carried product, keyed by `(from, to)`.
    pub changeover_costs: BTreeMap<(ProductId, ProductId), f64>,
}

impl Instance {
    /// Create an empty instance.
    pub fn new(name: impl Into<String>) -> Self {
        Instance {
            name: name.into(),
            ..Instance::default()
        }
    }

    /// Add a garage and return its id.
    pub fn add_garage(&mut self, x: f64, y: f64, name: &str) -> usize {
        let id = self.garages.len() + 1;
        let name = Self::name_or(name, "Garage", id);
        self.garages.push(Location::new(id, x, y, name));
        id
    }

    /// Add a depot with its stock per product and return its id.
    pub fn add_depot(
        &mut self,
        x: f64,
        y: f64,
        stock: BTreeMap<ProductId, f64>,
        name: &str,
    ) -> usize {
        let id = self.depots.len() + 1;
        let location = Location::new(id, x, y, Self::name_or(name, "Depot", id));
        self.products.extend(stock.keys().copied());
        self.depots.push(Depot {
            id,
            location,
            stock,
        });
        id
    }

    /// Add a station with its demand per product and return its id.
    pub fn add_station(
        &mut self,
        x: f64,
        y: f64,
        demand: BTreeMap<ProductId, f64>,
        name: &str,
    ) -> usize {
        let id = self.stations.len() + 1;
        let location = Location::new(id, x, y, Self::name_or(name, "Station", id));
        self.products.extend(demand.keys().copied());
        self.stations.push(Station {
            id,
            location,
            demand,
        });
        id
    }

    /// Add a truck and return its id.
    pub fn add_truck(&mut self, capacity: f64, garage_id: usize, initial_product: ProductId) -> usize {
        let id = self.trucks.len() + 1;
        self.trucks.push(Truck {
            id,
            capacity,
            garage_id,
            initial_product,
        });
        id
    }

    /// Replace the changeover cost table.
    pub fn set_changeover_costs(&mut self, costs: BTreeMap<(ProductId, ProductId), f64>) {
        self.changeover_costs = costs;
    }

    /// Cost of switching from one product to another.
    ///
    /// Zero for identical products. Pairs missing from the table cost nothing;
    /// the table is not assumed to be symmetric.
    pub fn changeover_cost(&self, from: ProductId, to: ProductId) -> f64 {
        if from == to {
            return 0.0;
        }
        self.changeover_costs.get(&(from, to)).copied().unwrap_or(0.0)
    }

    pub fn garage(&self, id: usize) -> Result<&Location, LookupError> {
        self.garages
            .iter()
            .find(|g| g.id == id)
            .ok_or(LookupError::Garage(id))
    }

    pub fn depot(&self, id: usize) -> Result<&Depot, LookupError> {
        self.depots
            .iter()
            .find(|d| d.id == id)
            .ok_or(LookupError::Depot(id))
    }

    pub fn station(&self, id: usize) -> Result<&Station, LookupError> {
        self.stations
            .iter()
            .find(|s| s.id == id)
            .ok_or(LookupError::Station(id))
    }

    pub fn truck(&self, id: usize) -> Result<&Truck, LookupError> {
        self.trucks
            .iter()
            .find(|t| t.id == id)
            .ok_or(LookupError::Truck(id))
    }

    /// Resolve a site to its location.
    pub fn location(&self, site: Site) -> Result<&Location, LookupError> {
        match site {
            Site::Garage(id) => self.garage(id),
            Site::Depot(id) => self.depot(id).map(|d| &d.location),
            Site::Station(id) => self.station(id).map(|s| &s.location),
        }
    }

    /// Total declared demand per product over all stations.
    pub fn total_demand(&self) -> BTreeMap<ProductId, f64> {
        let mut total = BTreeMap::new();
        for station in &self.stations {
            for (&product, &quantity) in &station.demand {
                *total.entry(product).or_insert(0.0) += quantity;
            }
        }
        total
    }

    /// Total stock of a product over all depots.
    pub fn total_stock(&self, product: ProductId) -> f64 {
        self.depots.iter().map(|d| d.stock_of(product)).sum()
    }

    /// Sum of all truck capacities.
    pub fn total_capacity(&self) -> f64 {
        self.trucks.iter().map(|t| t.capacity).sum()
    }

    fn name_or(name: &str, prefix: &str, id: usize) -> String {
        if name.is_empty() {
            format!("{}_{}", prefix, id)
        } else {
            name.to_string()
        }
    }
}
