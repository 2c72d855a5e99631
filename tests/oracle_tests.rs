//! Tests for the built-in VRP oracle and its construction heuristics.

use mpvrp_cc::config::OracleConfig;
use mpvrp_cc::oracle::construction::{best_fit_decreasing, nearest_neighbor_order, path_cheapest_arc};
use mpvrp_cc::oracle::search::SearchState;
use mpvrp_cc::oracle::{LocalSearchOracle, SubProblem, VrpOracle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

/// Creates a sub-problem with nodes on a line at `positions` (depot at 0).
fn create_line_problem(positions: &[i64], demands: &[i64], capacities: &[i64]) -> SubProblem {
    let mut coords = vec![0];
    coords.extend_from_slice(positions);

    let n = coords.len();
    let mut distances = vec![vec![0; n]; n];
    for i in 0..n {
        for j in 0..n {
            distances[i][j] = (coords[i] - coords[j]).abs() * 1000;
        }
    }

    let mut all_demands = vec![0];
    all_demands.extend_from_slice(demands);

    SubProblem {
        distances,
        demands: all_demands,
        capacities: capacities.to_vec(),
    }
}

/// Creates a sub-problem on a 4x5 grid around a central depot.
fn create_grid_problem() -> SubProblem {
    let mut coords = vec![(50i64, 50i64)];
    for i in 0..4 {
        for j in 0..5 {
            coords.push((i * 20 + 10, j * 20 + 10));
        }
    }

    let n = coords.len();
    let mut distances = vec![vec![0; n]; n];
    for i in 0..n {
        for j in 0..n {
            let dx = (coords[i].0 - coords[j].0) as f64;
            let dy = (coords[i].1 - coords[j].1) as f64;
            distances[i][j] = ((dx * dx + dy * dy).sqrt() * 1000.0) as i64;
        }
    }

    let mut demands = vec![0];
    demands.extend((1..n).map(|i| 100 + 10 * (i as i64 % 3)));

    SubProblem {
        distances,
        demands,
        capacities: vec![1000, 1000, 800, 600],
    }
}

fn assert_valid_partition(problem: &SubProblem, routes: &[Vec<usize>]) {
    assert_eq!(routes.len(), problem.vehicle_count());

    let mut visited = vec![false; problem.node_count()];
    for (vehicle, route) in routes.iter().enumerate() {
        assert!(problem.route_load(route) <= problem.capacities[vehicle]);
        for &node in route {
            assert!(node >= 1 && node < problem.node_count());
            assert!(!visited[node], "node {} visited twice", node);
            visited[node] = true;
        }
    }
    assert!(visited.iter().skip(1).all(|&v| v));
}

#[test]
fn test_route_cost_and_load() {
    let problem = create_line_problem(&[1, 2, 3], &[10, 20, 30], &[100]);

    assert_eq!(problem.route_cost(&[1, 2, 3]), 6000);
    assert_eq!(problem.route_cost(&[3, 1]), 3000 + 2000 + 1000);
    assert_eq!(problem.route_cost(&[]), 0);
    assert_eq!(problem.route_load(&[1, 3]), 40);
    assert_eq!(problem.station_count(), 3);
}

#[test]
fn test_path_cheapest_arc_fills_vehicles_in_order() {
    let problem = create_line_problem(&[1, 2, 3, 4], &[10, 10, 10, 10], &[20, 20]);

    let routes = path_cheapest_arc(&problem).unwrap();
    assert_eq!(routes, vec![vec![1, 2], vec![3, 4]]);
}

#[test]
fn test_best_fit_decreasing_rescues_construction() {
    // Filling by distance strands node 4
    let problem = create_line_problem(&[1, 2, 3, 4], &[20, 20, 30, 30], &[50, 50]);
    assert!(path_cheapest_arc(&problem).is_none());

    let routes = best_fit_decreasing(&problem).unwrap();
    assert_eq!(routes, vec![vec![1, 3], vec![2, 4]]);

    let constructed = LocalSearchOracle::construct(&problem).unwrap();
    assert_valid_partition(&problem, &constructed);
}

#[test]
fn test_nearest_neighbor_order() {
    let problem = create_line_problem(&[5, 1, 3], &[1, 1, 1], &[10]);

    assert_eq!(nearest_neighbor_order(&problem, &[1, 2, 3]), vec![2, 3, 1]);
    assert!(nearest_neighbor_order(&problem, &[]).is_empty());
}

#[test]
fn test_oracle_returns_feasible_partition() {
    let problem = create_grid_problem();
    let mut oracle = LocalSearchOracle::default();

    let routes = oracle.solve(&problem, Duration::from_secs(1)).unwrap();
    assert_valid_partition(&problem, &routes);
}

#[test]
fn test_oracle_never_worse_than_construction() {
    let problem = create_grid_problem();
    let constructed = LocalSearchOracle::construct(&problem).unwrap();
    let mut oracle = LocalSearchOracle::default();

    let routes = oracle.solve(&problem, Duration::from_secs(1)).unwrap();
    assert!(problem.solution_cost(&routes) <= problem.solution_cost(&constructed));
}

#[test]
fn test_oracle_is_deterministic() {
    let problem = create_grid_problem();
    let config = OracleConfig {
        seed: 7,
        ..OracleConfig::default()
    };

    let mut first = LocalSearchOracle::new(config.clone());
    let mut second = LocalSearchOracle::new(config);

    let a = first.solve(&problem, Duration::from_secs(5));
    let b = second.solve(&problem, Duration::from_secs(5));
    assert_eq!(a, b);

    // Same oracle, same input, same answer
    let c = first.solve(&problem, Duration::from_secs(5));
    assert_eq!(a, c);
}

#[test]
fn test_oracle_reports_no_solution() {
    // Node 2 exceeds every vehicle capacity
    let problem = create_line_problem(&[1, 2], &[10, 500], &[100, 200]);
    let mut oracle = LocalSearchOracle::default();

    assert!(oracle.solve(&problem, Duration::from_secs(1)).is_none());
}

#[test]
fn test_oracle_without_stations() {
    let problem = create_line_problem(&[], &[], &[100, 100]);
    let mut oracle = LocalSearchOracle::default();

    let routes = oracle.solve(&problem, Duration::from_secs(1)).unwrap();
    assert_eq!(routes, vec![Vec::<usize>::new(), Vec::new()]);
}

#[test]
fn test_zero_budget_still_returns_construction() {
    let problem = create_grid_problem();
    let mut oracle = LocalSearchOracle::default();

    let routes = oracle.solve(&problem, Duration::ZERO).unwrap();
    assert_valid_partition(&problem, &routes);
}

#[test]
fn test_improve_merges_crossing_routes() {
    let problem = create_line_problem(&[1, 2, 3, 4], &[10, 10, 10, 10], &[40, 40]);

    // Interleaved routes cost 6 + 8 = 14 units, a single sweep costs 8
    let mut state = SearchState::new(&problem, vec![vec![1, 3], vec![2, 4]], 20);
    let initial_cost = state.cost();
    assert_eq!(initial_cost, 14000);

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    assert!(state.improve(&mut rng));
    assert!(state.cost() < initial_cost);

    while state.improve(&mut rng) {}
    assert_eq!(state.cost(), 8000);

    for (vehicle, route) in state.routes.iter().enumerate() {
        assert_eq!(state.loads[vehicle], problem.route_load(route));
        assert!(state.loads[vehicle] <= problem.capacities[vehicle]);
    }
}

#[test]
fn test_closure_as_oracle() {
    let problem = create_line_problem(&[1], &[10], &[100]);
    let mut calls = 0;
    let mut oracle = |p: &SubProblem, _budget: Duration| {
        calls += 1;
        Some(vec![(1..p.node_count()).collect::<Vec<usize>>()])
    };

    let routes = VrpOracle::solve(&mut oracle, &problem, Duration::ZERO).unwrap();
    assert_eq!(routes, vec![vec![1]]);
    assert_eq!(calls, 1);
}
