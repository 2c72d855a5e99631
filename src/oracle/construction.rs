//! Construction heuristics producing a first feasible solution.

use itertools::Itertools;

use super::{OracleRoutes, SubProblem};

/// Fill vehicles one after another, each time extending the current vehicle
/// with the nearest unvisited node that still fits.
///
/// Returns `None` if some node could not be placed.
pub fn path_cheapest_arc(problem: &SubProblem) -> Option<OracleRoutes> {
    let n = problem.node_count();
    let mut visited = vec![false; n];
    visited[0] = true;
    let mut unvisited_count = problem.station_count();
    let mut routes = vec![Vec::new(); problem.vehicle_count()];

    for (vehicle, route) in routes.iter_mut().enumerate() {
        let capacity = problem.capacities[vehicle];
        let mut load = 0;
        let mut current = 0;

        while unvisited_count > 0 {
            let mut best: Option<usize> = None;
            for node in 1..n {
                if visited[node] || load + problem.demands[node] > capacity {
                    continue;
                }
                match best {
                    Some(b) if problem.distance(current, node) >= problem.distance(current, b) => {}
                    _ => best = Some(node),
                }
            }

            let node = match best {
                Some(node) => node,
                None => break,
            };

            visited[node] = true;
            unvisited_count -= 1;
            load += problem.demands[node];
            route.push(node);
            current = node;
        }
    }

    if unvisited_count > 0 {
        return None;
    }
    Some(routes)
}

/// Pack nodes by decreasing demand into the vehicle with the least spare
/// capacity that still fits, then order each vehicle nearest-neighbour.
///
/// Returns `None` if some node fits no vehicle.
pub fn best_fit_decreasing(problem: &SubProblem) -> Option<OracleRoutes> {
    let mut spare = problem.capacities.clone();
    let mut routes: OracleRoutes = vec![Vec::new(); problem.vehicle_count()];

    let order = (1..problem.node_count())
        .sorted_by(|&a, &b| problem.demands[b].cmp(&problem.demands[a]))
        .collect_vec();

    for node in order {
        let demand = problem.demands[node];
        let vehicle = (0..spare.len())
            .filter(|&v| spare[v] >= demand)
            .min_by_key(|&v| spare[v])?;
        spare[vehicle] -= demand;
        routes[vehicle].push(node);
    }

    for route in routes.iter_mut() {
        *route = nearest_neighbor_order(problem, route);
    }

    Some(routes)
}

/// Order nodes by repeatedly moving to the closest remaining one, starting at the depot.
pub fn nearest_neighbor_order(problem: &SubProblem, nodes: &[usize]) -> Vec<usize> {
    let mut remaining = nodes.to_vec();
    let mut ordered = Vec::with_capacity(nodes.len());
    let mut current = 0;

    while !remaining.is_empty() {
        let mut idx = 0;
        for i in 1..remaining.len() {
            if problem.distance(current, remaining[i]) < problem.distance(current, remaining[idx]) {
                idx = i;
            }
        }
        current = remaining.remove(idx);
        ordered.push(current);
    }

    ordered
}
