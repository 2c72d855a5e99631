//! Unit tests for the instance model.

use mpvrp_cc::error::LookupError;
use mpvrp_cc::geometry::Site;
use mpvrp_cc::instance::Instance;
use std::collections::{BTreeMap, BTreeSet};

/// Creates an instance with two depots, three stations and two trucks.
fn create_test_instance() -> Instance {
    let mut instance = Instance::new("instance");

    instance.add_garage(0.0, 0.0, "Home");
    instance.add_depot(10.0, 0.0, BTreeMap::from([(0, 100.0), (1, 0.0)]), "");
    instance.add_depot(0.0, 10.0, BTreeMap::from([(1, 50.0)]), "North");
    instance.add_station(5.0, 5.0, BTreeMap::from([(0, 20.0)]), "");
    instance.add_station(6.0, 5.0, BTreeMap::from([(0, 15.0), (2, 5.0)]), "");
    instance.add_station(7.0, 5.0, BTreeMap::from([(1, 30.0)]), "");
    instance.add_truck(40.0, 1, 0);
    instance.add_truck(25.0, 1, 1);

    instance.set_changeover_costs(BTreeMap::from([((0, 1), 5.0), ((1, 2), 2.5)]));

    instance
}

#[test]
fn test_sequential_ids_and_names() {
    let instance = create_test_instance();

    assert_eq!(instance.garages[0].id, 1);
    assert_eq!(instance.garages[0].name, "Home");
    assert_eq!(instance.depots[0].location.name, "Depot_1");
    assert_eq!(instance.depots[1].id, 2);
    assert_eq!(instance.depots[1].location.name, "North");
    assert_eq!(instance.stations[2].id, 3);
    assert_eq!(instance.stations[2].location.name, "Station_3");
    assert_eq!(instance.trucks[1].id, 2);
    assert_eq!(instance.trucks[1].initial_product, 1);
}

#[test]
fn test_products_are_union_of_stock_and_demand() {
    let instance = create_test_instance();

    // Product 2 only appears as a demand
    assert_eq!(instance.products, BTreeSet::from([0, 1, 2]));
}

#[test]
fn test_changeover_identity_and_defaults() {
    let instance = create_test_instance();

    for &p in &instance.products {
        assert_eq!(instance.changeover_cost(p, p), 0.0);
    }

    assert_eq!(instance.changeover_cost(0, 1), 5.0);
    assert_eq!(instance.changeover_cost(1, 2), 2.5);

    // Missing reverse entries cost nothing
    assert_eq!(instance.changeover_cost(1, 0), 0.0);
    assert_eq!(instance.changeover_cost(2, 0), 0.0);
}

#[test]
fn test_aggregates() {
    let instance = create_test_instance();

    let demand = instance.total_demand();
    assert_eq!(demand.get(&0), Some(&35.0));
    assert_eq!(demand.get(&1), Some(&30.0));
    assert_eq!(demand.get(&2), Some(&5.0));

    assert_eq!(instance.total_stock(0), 100.0);
    assert_eq!(instance.total_stock(1), 50.0);
    assert_eq!(instance.total_stock(2), 0.0);
    assert_eq!(instance.total_capacity(), 65.0);
}

#[test]
fn test_stock_and_demand_accessors() {
    let instance = create_test_instance();

    assert_eq!(instance.depots[0].stock_of(0), 100.0);
    assert_eq!(instance.depots[0].stock_of(5), 0.0);
    assert_eq!(instance.stations[1].demand_of(2), 5.0);
    assert_eq!(instance.stations[1].demand_of(1), 0.0);
}

#[test]
fn test_lookups() {
    let instance = create_test_instance();

    assert_eq!(instance.depot(2).unwrap().location.name, "North");
    assert_eq!(instance.truck(1).unwrap().capacity, 40.0);
    assert_eq!(instance.location(Site::Station(2)).unwrap().x, 6.0);

    assert_eq!(instance.garage(2).unwrap_err(), LookupError::Garage(2));
    assert_eq!(instance.depot(0).unwrap_err(), LookupError::Depot(0));
    assert_eq!(instance.station(4).unwrap_err(), LookupError::Station(4));
    assert_eq!(instance.truck(3).unwrap_err(), LookupError::Truck(3));
}
