//! Greedy fallback assignment of stations to trucks for one product round.

use log::debug;

use crate::assembler::RouteAssembler;
use crate::error::LookupError;
use crate::geometry::{DistanceCache, Site};
use crate::instance::{Depot, Instance, ProductId, Station, Truck};
use crate::solution::{CompleteRoute, RemainingDemand};

/// Nearest-to-depot, capacity-bounded greedy assigner.
///
/// Deterministic: ties go to the first station, then the first truck, in the
/// order the caller supplies them.
pub struct GreedyAssigner<'a> {
    instance: &'a Instance,
    distances: &'a DistanceCache,
}

impl<'a> GreedyAssigner<'a> {
    pub fn new(instance: &'a Instance, distances: &'a DistanceCache) -> Self {
        GreedyAssigner {
            instance,
            distances,
        }
    }

    /// Partition `stations` among `trucks` without exceeding any capacity.
    ///
    /// Returns one list of stations per truck, aligned with `trucks`. Stations
    /// that fit no truck are left out.
    pub fn assign<'s>(
        &self,
        product: ProductId,
        stations: &[&'s Station],
        trucks: &[&Truck],
        depot: &Depot,
        remaining: &RemainingDemand,
    ) -> Result<Vec<Vec<&'s Station>>, LookupError> {
        let depot_site = Site::Depot(depot.id);
        let mut assigned: Vec<Vec<&Station>> = vec![Vec::new(); trucks.len()];
        let mut truck_load = vec![0.0; trucks.len()];

        let mut unvisited = Vec::with_capacity(stations.len());
        for &station in stations {
            let demand = remaining.get(station.id, product);
            if demand > 0.0 {
                let dist = self
                    .distances
                    .distance(self.instance, depot_site, Site::Station(station.id))?;
                unvisited.push((station, demand, dist));
            }
        }

        while !unvisited.is_empty() {
            let mut best: Option<(usize, usize)> = None;
            let mut best_cost = f64::INFINITY;

            for (s_idx, &(_, demand, dist)) in unvisited.iter().enumerate() {
                for (t_idx, truck) in trucks.iter().enumerate() {
                    if truck_load[t_idx] + demand <= truck.capacity && dist < best_cost {
                        best_cost = dist;
                        best = Some((s_idx, t_idx));
                    }
                }
            }

            let (s_idx, t_idx) = match best {
                Some(pair) => pair,
                None => break,
            };

            let (station, demand, _) = unvisited.remove(s_idx);
            truck_load[t_idx] += demand;
            assigned[t_idx].push(station);
        }

        if !unvisited.is_empty() {
            debug!(
                "Greedy assignment left {} stations without a truck for product {}",
                unvisited.len(),
                product
            );
        }

        Ok(assigned)
    }

    /// Assign stations greedily and assemble one route per used truck.
    ///
    /// `start_products` gives, per truck, the product it is assumed to carry
    /// when leaving the garage.
    pub fn solve(
        &self,
        product: ProductId,
        stations: &[&Station],
        trucks: &[&Truck],
        depot: &Depot,
        remaining: &RemainingDemand,
        start_products: &[ProductId],
    ) -> Result<Vec<CompleteRoute>, LookupError> {
        let assigned = self.assign(product, stations, trucks, depot, remaining)?;
        let assembler = RouteAssembler::new(self.instance, self.distances);

        let mut routes = Vec::new();
        for ((truck, truck_stations), &start_product) in
            trucks.iter().zip(&assigned).zip(start_products)
        {
            if truck_stations.is_empty() {
                continue;
            }
            if let Some(route) = assembler.assemble(
                truck,
                depot,
                product,
                truck_stations,
                remaining,
                start_product,
            )? {
                routes.push(route);
            }
        }

        Ok(routes)
    }
}
