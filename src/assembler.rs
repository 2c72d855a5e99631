//! Route assembly: turns a set of stations assigned to a truck into a costed
//! garage-to-garage route.

use log::trace;

use crate::error::LookupError;
use crate::geometry::{DistanceCache, Site};
use crate::instance::{Depot, Instance, ProductId, Station, Truck};
use crate::solution::{CompleteRoute, MiniRoute, RemainingDemand};

/// Builds mini-routes and complete routes against an instance and its distance cache.
pub struct RouteAssembler<'a> {
    instance: &'a Instance,
    distances: &'a DistanceCache,
}

impl<'a> RouteAssembler<'a> {
    pub fn new(instance: &'a Instance, distances: &'a DistanceCache) -> Self {
        RouteAssembler {
            instance,
            distances,
        }
    }

    /// Build a single-product route for `truck` serving `stations` from `depot`.
    ///
    /// `start_product` is the product the truck is assumed to carry when it
    /// leaves the garage. Returns `None` when nothing can be delivered.
    pub fn assemble(
        &self,
        truck: &Truck,
        depot: &Depot,
        product: ProductId,
        stations: &[&Station],
        remaining: &RemainingDemand,
        start_product: ProductId,
    ) -> Result<Option<CompleteRoute>, LookupError> {
        let mini_route = match self.build_mini_route(truck, depot, product, stations, remaining)? {
            Some(mini_route) => mini_route,
            None => return Ok(None),
        };

        self.complete(truck, start_product, vec![mini_route])
    }

    /// Build the mini-route of one truck for one product.
    ///
    /// The load is bounded by the truck capacity, the depot stock and the
    /// total remaining demand. Stations are served in increasing distance
    /// from the depot until the load runs out.
    pub fn build_mini_route(
        &self,
        truck: &Truck,
        depot: &Depot,
        product: ProductId,
        stations: &[&Station],
        remaining: &RemainingDemand,
    ) -> Result<Option<MiniRoute>, LookupError> {
        let total_demand: f64 = stations.iter().map(|s| remaining.get(s.id, product)).sum();
        let load_quantity = truck
            .capacity
            .min(total_demand)
            .min(depot.stock_of(product));

        if load_quantity <= 0.0 {
            return Ok(None);
        }

        // Distance from the depot decides the order, not from the previous stop
        let depot_site = Site::Depot(depot.id);
        let mut unvisited = Vec::with_capacity(stations.len());
        for station in stations {
            let dist = self
                .distances
                .distance(self.instance, depot_site, Site::Station(station.id))?;
            unvisited.push((station.id, dist));
        }

        let mut served = Vec::new();
        let mut remaining_capacity = load_quantity;

        while !unvisited.is_empty() && remaining_capacity > 0.0 {
            let mut nearest = 0;
            for i in 1..unvisited.len() {
                if unvisited[i].1 < unvisited[nearest].1 {
                    nearest = i;
                }
            }
            let (station_id, _) = unvisited.remove(nearest);

            let delivery = remaining_capacity.min(remaining.get(station_id, product));
            if delivery > 0.0 {
                served.push((station_id, delivery));
                remaining_capacity -= delivery;
            }
        }

        if served.is_empty() {
            return Ok(None);
        }

        trace!(
            "Truck {} loads {:.2} of product {} at depot {} for {} stations",
            truck.id,
            load_quantity,
            product,
            depot.id,
            served.len()
        );

        Ok(Some(MiniRoute {
            depot_id: depot.id,
            product_id: product,
            load_quantity,
            stations: served,
        }))
    }

    /// Wrap mini-routes into a costed complete route.
    ///
    /// Returns `None` for an empty mini-route list, which is never a valid route.
    pub fn complete(
        &self,
        truck: &Truck,
        start_product: ProductId,
        mini_routes: Vec<MiniRoute>,
    ) -> Result<Option<CompleteRoute>, LookupError> {
        if mini_routes.is_empty() {
            return Ok(None);
        }

        let distance = self.route_distance(truck.garage_id, &mini_routes)?;
        let changeover = self.changeover_cost(start_product, &mini_routes);

        Ok(Some(CompleteRoute::new(
            truck.id,
            truck.garage_id,
            start_product,
            mini_routes,
            distance,
            changeover,
        )))
    }

    /// Distance of garage -> depot -> stations ... -> garage.
    ///
    /// Consecutive mini-routes from the same depot do not pay a depot-to-depot leg
    /// when the truck is already standing there.
    pub fn route_distance(
        &self,
        garage_id: usize,
        mini_routes: &[MiniRoute],
    ) -> Result<f64, LookupError> {
        let first = match mini_routes.first() {
            Some(first) => first,
            None => return Ok(0.0),
        };

        let garage = Site::Garage(garage_id);
        let mut total = self
            .distances
            .distance(self.instance, garage, Site::Depot(first.depot_id))?;
        let mut previous = Site::Depot(first.depot_id);

        for mini_route in mini_routes {
            let depot = Site::Depot(mini_route.depot_id);
            if previous != depot {
                total += self.distances.distance(self.instance, previous, depot)?;
            }
            previous = depot;

            for &(station_id, _) in &mini_route.stations {
                let station = Site::Station(station_id);
                total += self.distances.distance(self.instance, previous, station)?;
                previous = station;
            }
        }

        total += self.distances.distance(self.instance, previous, garage)?;
        Ok(total)
    }

    /// Changeover cost accumulated along the mini-routes.
    pub fn changeover_cost(&self, start_product: ProductId, mini_routes: &[MiniRoute]) -> f64 {
        let mut total = 0.0;
        let mut current = start_product;

        for mini_route in mini_routes {
            if current != mini_route.product_id {
                total += self.instance.changeover_cost(current, mini_route.product_id);
                current = mini_route.product_id;
            }
        }

        total
    }
}
