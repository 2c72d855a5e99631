//! End-to-end tests of the product-by-product decomposition.

use mpvrp_cc::adapter::RoundSource;
use mpvrp_cc::config::{ChangeoverBaseline, SolverConfig};
use mpvrp_cc::decomposition::{decompose, RoundStatus};
use mpvrp_cc::error::LookupError;
use mpvrp_cc::geometry::DistanceCache;
use mpvrp_cc::greedy::GreedyAssigner;
use mpvrp_cc::instance::Instance;
use mpvrp_cc::oracle::{LocalSearchOracle, OracleRoutes, SubProblem};
use mpvrp_cc::solution::RemainingDemand;
use mpvrp_cc::validation::{InstanceIssue, SolutionIssue};
use mpvrp_cc::Solver;
use std::collections::BTreeMap;
use std::time::Duration;

/// Creates a one-station instance: garage (0,0), depot (3,4), station (6,8).
fn create_single_instance(stock: f64) -> Instance {
    let mut instance = Instance::new("single");

    instance.add_garage(0.0, 0.0, "");
    instance.add_depot(3.0, 4.0, BTreeMap::from([(0, stock)]), "");
    instance.add_station(6.0, 8.0, BTreeMap::from([(0, 40.0)]), "");
    instance.add_truck(50.0, 1, 0);

    instance
}

/// Creates a two-product instance served by one truck starting on product 1.
fn create_two_product_instance() -> Instance {
    let mut instance = Instance::new("two-products");

    instance.add_garage(0.0, 0.0, "");
    instance.add_depot(0.0, 0.0, BTreeMap::from([(0, 100.0), (1, 100.0)]), "");
    instance.add_station(3.0, 4.0, BTreeMap::from([(0, 10.0)]), "");
    instance.add_station(0.0, 5.0, BTreeMap::from([(1, 10.0)]), "");
    instance.add_truck(50.0, 1, 1);

    instance.set_changeover_costs(BTreeMap::from([((1, 0), 8.0), ((0, 1), 5.0)]));
    instance
}

/// Creates a grid of stations with mixed demand over three products.
fn create_mixed_instance() -> Instance {
    let mut instance = Instance::new("mixed");

    instance.add_garage(0.0, 0.0, "");
    instance.add_garage(100.0, 100.0, "");
    instance.add_depot(
        50.0,
        50.0,
        BTreeMap::from([(0, 1000.0), (1, 1000.0), (2, 1000.0)]),
        "",
    );

    for i in 0..4 {
        for j in 0..4 {
            let product = (i + j) % 3;
            let demand = BTreeMap::from([(product, 10.0 + (i * 4 + j) as f64)]);
            instance.add_station(i as f64 * 25.0, j as f64 * 25.0, demand, "");
        }
    }

    instance.add_truck(80.0, 1, 0);
    instance.add_truck(80.0, 2, 1);
    instance.add_truck(120.0, 1, 2);

    instance.set_changeover_costs(BTreeMap::from([
        ((0, 1), 10.0),
        ((1, 0), 10.0),
        ((0, 2), 20.0),
        ((2, 0), 20.0),
        ((1, 2), 15.0),
        ((2, 1), 15.0),
    ]));
    instance
}

fn create_test_config() -> SolverConfig {
    SolverConfig::new()
        .with_time_limit(Duration::from_secs(2))
        .with_verbose(false)
}

#[test]
fn test_single_station_route() {
    let mut solver = Solver::new(create_single_instance(100.0), create_test_config());

    let routes = solver.solve().unwrap();
    assert_eq!(routes.len(), 1);

    let route = &routes[0];
    assert_eq!(route.truck_id(), 1);
    assert_eq!(route.mini_routes().len(), 1);
    assert_eq!(route.mini_routes()[0].load_quantity, 40.0);
    assert_eq!(route.mini_routes()[0].stations, vec![(1, 40.0)]);

    // 5 to the depot, 5 to the station, 10 home
    assert!((route.total_distance() - 20.0).abs() < 1e-9);
    assert_eq!(route.total_changeover_cost(), 0.0);

    assert!(solver.validate_solution().unwrap().is_valid());
    assert_eq!(solver.remaining.total(), 0.0);
}

#[test]
fn test_insufficient_stock_leaves_demand() {
    let instance = create_single_instance(30.0);
    let mut solver = Solver::new(instance, create_test_config());

    // Flagged before solving but the solver still does what it can
    assert!(!solver.validate_instance().is_valid());

    let routes = solver.solve().unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].mini_routes()[0].load_quantity, 30.0);
    assert_eq!(solver.remaining.get(1, 0), 10.0);

    let report = solver.validate_solution().unwrap();
    assert_eq!(
        report.issues,
        vec![SolutionIssue::UnmetDemand {
            station: 1,
            product: 0,
            delivered: 30.0,
            demand: 40.0,
        }]
    );
}

#[test]
fn test_validated_solve_refuses_invalid_instance() {
    let mut solver = Solver::new(create_single_instance(10.0), create_test_config());

    let report = solver.solve_validated().unwrap().unwrap_err();
    assert_eq!(
        report.issues,
        vec![InstanceIssue::InsufficientStock {
            product: 0,
            stock: 10.0,
            demand: 40.0,
        }]
    );

    // Nothing was attempted
    assert!(solver.solution.is_empty());
    assert!(solver.rounds.is_empty());
    assert_eq!(solver.remaining.get(1, 0), 40.0);
}

#[test]
fn test_validated_solve_runs_valid_instance() {
    let mut solver = Solver::new(create_single_instance(100.0), create_test_config());

    let routes = solver.solve_validated().unwrap().unwrap();
    assert_eq!(routes.len(), 1);
}

#[test]
fn test_oracle_failure_falls_back_to_greedy() {
    let instance = create_mixed_instance();
    let oracle = |_: &SubProblem, _: Duration| -> Option<OracleRoutes> { None };
    let mut solver = Solver::with_oracle(instance, create_test_config(), Box::new(oracle));

    solver.solve().unwrap();

    assert!(!solver.solution.is_empty());
    for round in &solver.rounds {
        assert_eq!(round.status, RoundStatus::Solved(RoundSource::Fallback));
    }

    // Every route still respects the truck capacity
    let report = solver.validate_solution().unwrap();
    assert!(!report
        .issues
        .iter()
        .any(|issue| matches!(issue, SolutionIssue::CapacityExceeded { .. })));
}

#[test]
fn test_fallback_matches_standalone_greedy() {
    let mut instance = Instance::new("fallback");
    instance.add_garage(0.0, 0.0, "");
    instance.add_depot(1.0, 0.0, BTreeMap::from([(0, 100.0)]), "");
    instance.add_station(4.0, 0.0, BTreeMap::from([(0, 20.0)]), "");
    instance.add_station(1.0, 3.0, BTreeMap::from([(0, 25.0)]), "");
    instance.add_truck(60.0, 1, 0);

    let cache = DistanceCache::new();
    let mut oracle = |_: &SubProblem, _: Duration| -> Option<OracleRoutes> { None };
    let result = decompose(&instance, &cache, &mut oracle, &create_test_config()).unwrap();

    let greedy = GreedyAssigner::new(&instance, &cache);
    let expected = greedy
        .solve(
            0,
            &instance.stations.iter().collect::<Vec<_>>(),
            &instance.trucks.iter().collect::<Vec<_>>(),
            &instance.depots[0],
            &RemainingDemand::from_instance(&instance),
            &[0],
        )
        .unwrap();

    // One route covering both stations, identical to the greedy result
    assert_eq!(result.routes, expected);
    assert_eq!(result.routes.len(), 1);
    assert_eq!(result.routes[0].mini_routes()[0].stations.len(), 2);
    assert_eq!(result.remaining.total(), 0.0);
}

#[test]
fn test_fractional_demand_is_fully_served() {
    let mut instance = Instance::new("fractional");
    instance.add_garage(0.0, 0.0, "");
    instance.add_depot(0.0, 0.0, BTreeMap::from([(0, 100.0)]), "");
    for x in 1..=3 {
        instance.add_station(x as f64, 0.0, BTreeMap::from([(0, 3.339)]), "");
    }
    instance.add_truck(10.0, 1, 0);
    instance.add_truck(10.0, 1, 0);

    let mut solver = Solver::new(instance, create_test_config());
    solver.solve().unwrap();

    // 3 x 3.339 exceeds one truck, so both are needed
    assert_eq!(solver.solution.len(), 2);
    assert_eq!(
        solver.rounds[0].status,
        RoundStatus::Solved(RoundSource::Oracle)
    );
    assert!(solver.validate_solution().unwrap().is_valid());
}

#[test]
fn test_partial_oracle_answer_falls_back() {
    let mut instance = Instance::new("partial");
    instance.add_garage(0.0, 0.0, "");
    instance.add_depot(0.0, 0.0, BTreeMap::from([(0, 100.0)]), "");
    instance.add_station(1.0, 0.0, BTreeMap::from([(0, 10.0)]), "");
    instance.add_station(2.0, 0.0, BTreeMap::from([(0, 10.0)]), "");
    instance.add_truck(50.0, 1, 0);

    // Only the first station is routed
    let oracle = |_: &SubProblem, _: Duration| -> Option<OracleRoutes> { Some(vec![vec![1]]) };
    let mut solver = Solver::with_oracle(instance, create_test_config(), Box::new(oracle));
    solver.solve().unwrap();

    assert_eq!(
        solver.rounds[0].status,
        RoundStatus::Solved(RoundSource::Fallback)
    );
    assert_eq!(solver.remaining.get(2, 0), 0.0);
    assert!(solver.validate_solution().unwrap().is_valid());
}

#[test]
fn test_per_round_changeover_baseline() {
    let mut solver = Solver::new(create_two_product_instance(), create_test_config());
    solver.solve().unwrap();

    // Each round starts from the declared initial product 1
    let metrics = solver.metrics();
    assert_eq!(solver.solution.len(), 2);
    assert_eq!(metrics.total_changeover_cost, 8.0);
    assert_eq!(metrics.num_vehicles, 1);
    assert_eq!(metrics.num_product_changes, 0);
}

#[test]
fn test_carry_forward_changeover_baseline() {
    let config = create_test_config().with_changeover_baseline(ChangeoverBaseline::CarryForward);
    let mut solver = Solver::new(create_two_product_instance(), config);
    solver.solve().unwrap();

    // 1 -> 0 in the first round, then 0 -> 1 in the second
    let metrics = solver.metrics();
    assert_eq!(metrics.total_changeover_cost, 13.0);
    assert_eq!(solver.solution[1].start_product(), 0);
}

#[test]
fn test_products_processed_in_order() {
    let mut solver = Solver::new(create_mixed_instance(), create_test_config());
    solver.solve().unwrap();

    let products: Vec<usize> = solver.rounds.iter().map(|r| r.product).collect();
    assert_eq!(products, vec![0, 1, 2]);

    let mut last_product = 0;
    for route in &solver.solution {
        let product = route.mini_routes()[0].product_id;
        assert!(product >= last_product);
        last_product = product;
    }

    assert!(solver.validate_solution().unwrap().is_valid());
}

#[test]
fn test_decomposition_is_deterministic() {
    let first = {
        let mut solver = Solver::new(create_mixed_instance(), create_test_config());
        solver.solve().unwrap().to_vec()
    };
    let second = {
        let mut solver = Solver::new(create_mixed_instance(), create_test_config());
        solver.solve().unwrap().to_vec()
    };

    assert_eq!(first, second);
}

#[test]
fn test_skipped_rounds() {
    let mut instance = Instance::new("skipped");
    instance.add_garage(0.0, 0.0, "");
    // Product 1 is stocked but nobody wants it
    instance.add_depot(0.0, 0.0, BTreeMap::from([(0, 100.0), (1, 100.0)]), "");
    instance.add_station(1.0, 0.0, BTreeMap::from([(0, 10.0)]), "");
    // Product 2 is wanted but nobody stocks it
    instance.add_station(2.0, 0.0, BTreeMap::from([(2, 10.0)]), "");
    instance.add_truck(50.0, 1, 0);

    let cache = DistanceCache::new();
    let mut oracle = LocalSearchOracle::default();
    let result = decompose(&instance, &cache, &mut oracle, &create_test_config()).unwrap();

    let statuses: Vec<RoundStatus> = result.rounds.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            RoundStatus::Solved(RoundSource::Oracle),
            RoundStatus::NoDemand,
            RoundStatus::NoSupply,
        ]
    );
    assert_eq!(result.rounds[2].stations, 1);
    assert_eq!(result.routes.len(), 1);
    assert_eq!(result.remaining.get(2, 2), 10.0);
}

#[test]
fn test_trucks_reused_across_rounds() {
    let mut instance = create_two_product_instance();
    instance.set_changeover_costs(BTreeMap::new());

    let cache = DistanceCache::new();
    let mut oracle = LocalSearchOracle::default();
    let result = decompose(&instance, &cache, &mut oracle, &create_test_config()).unwrap();

    // The only truck serves both rounds
    assert_eq!(result.routes.len(), 2);
    assert!(result.routes.iter().all(|r| r.truck_id() == 1));
    assert_eq!(result.rounds[0].depot_id, Some(1));
    assert_eq!(result.rounds[1].delivered, 10.0);
}

#[test]
fn test_unknown_garage_is_an_error() {
    let mut instance = create_single_instance(100.0);
    instance.trucks[0].garage_id = 9;

    let mut solver = Solver::new(instance, create_test_config());
    assert_eq!(solver.solve().unwrap_err(), LookupError::Garage(9));
}
