use std::collections::{BTreeMap, BTreeSet};

use parking_sim::simulation::{
    reference_config, Activation, ActivationOrder, CarVariant, Cell, Direction, Footprint,
    SimConfig, SimError, SimWorld, REFERENCE_HEIGHT, REFERENCE_WIDTH,
};

fn is_inconsistent<T>(result: Result<T, SimError>) -> bool {
    matches!(result, Err(SimError::ConfigurationInconsistent(_)))
}

#[test]
fn test_reference_world_setup() {
    let world = SimWorld::create_reference_world_with_seed(42).unwrap();
    let snapshot = world.snapshot();

    assert_eq!(world.tick_count(), 0);
    assert_eq!(snapshot.cars.len(), 9);
    assert_eq!(snapshot.lights.len(), 5);
    assert_eq!(snapshot.crosswalks.len(), 5);
    assert_eq!(snapshot.parking_spots.len(), 17);
    assert!(snapshot.parking_spots.iter().all(|spot| !spot.occupied));

    let mut per_variant: BTreeMap<String, usize> = BTreeMap::new();
    for car in &snapshot.cars {
        *per_variant.entry(format!("{:?}", car.variant)).or_default() += 1;
    }
    assert_eq!(per_variant["Patient"], 2);
    assert_eq!(per_variant["Fast"], 2);
    assert_eq!(per_variant["Slow"], 2);
    assert_eq!(per_variant["RuleBreaking"], 1);
    assert_eq!(per_variant["Routed"], 2);

    let starts: BTreeSet<Cell> = snapshot.cars.iter().map(|car| car.position).collect();
    assert_eq!(starts.len(), 9);
    for start in &starts {
        assert!(world.streets().is_drivable(*start));
    }

    let map = world.render_map();
    assert_eq!(map.lines().count(), REFERENCE_HEIGHT as usize);
    assert!(map.lines().all(|line| line.chars().count() == REFERENCE_WIDTH as usize));
}

#[test]
fn test_no_two_cars_share_a_cell() {
    for order in [ActivationOrder::Fixed, ActivationOrder::Shuffled] {
        let config = reference_config().with_seed(42).with_order(order);
        let mut world = SimWorld::from_config(&config).unwrap();

        for _ in 0..300 {
            world.advance(1).unwrap();
            let snapshot = world.snapshot();
            assert!(
                snapshot.shared_car_cells().is_empty(),
                "cars share {:?} at tick {} with {:?} order",
                snapshot.shared_car_cells(),
                snapshot.tick,
                order
            );
        }
    }
}

#[test]
fn test_parking_is_monotonic_and_parked_cars_stay() {
    let mut world = SimWorld::create_reference_world_with_seed(9).unwrap();
    let mut occupied: BTreeSet<u32> = BTreeSet::new();
    let mut parked_at: BTreeMap<String, Cell> = BTreeMap::new();

    for _ in 0..400 {
        world.advance(1).unwrap();
        let snapshot = world.snapshot();

        let now: BTreeSet<u32> = snapshot
            .parking_spots
            .iter()
            .filter(|spot| spot.occupied)
            .map(|spot| spot.number)
            .collect();
        assert!(now.is_superset(&occupied), "a spot was vacated at tick {}", snapshot.tick);
        occupied = now;

        for car in snapshot.cars.iter().filter(|car| car.parked) {
            let cell = *parked_at.entry(car.id.to_string()).or_insert(car.position);
            assert_eq!(cell, car.position, "{} moved after parking", car.id);
        }
    }

    assert_eq!(occupied.len(), world.snapshot().parked_count());
    assert_eq!(world.stats().cars_parked as usize, occupied.len());
}

#[test]
fn test_snapshot_is_idempotent() {
    let mut world = SimWorld::create_reference_world_with_seed(3).unwrap();
    world.advance(25).unwrap();

    let first = world.snapshot();
    let second = world.snapshot();
    assert_eq!(first, second);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    assert_eq!(first.tick, 25);
}

#[test]
fn test_same_seed_same_run() {
    for order in [ActivationOrder::Fixed, ActivationOrder::Shuffled] {
        let config = reference_config().with_seed(1234).with_order(order);
        let mut a = SimWorld::from_config(&config).unwrap();
        let mut b = SimWorld::from_config(&config).unwrap();

        a.advance(120).unwrap();
        b.advance(120).unwrap();
        assert_eq!(a.snapshot(), b.snapshot());
        assert_eq!(a.stats(), b.stats());
    }
}

#[test]
fn test_fixed_schedule_puts_signals_before_cars() {
    let world = SimWorld::create_reference_world_with_seed(5).unwrap();
    let schedule = world.schedule();

    let first_car = schedule
        .iter()
        .position(|a| matches!(a, Activation::Car(_)))
        .unwrap();
    assert_eq!(first_car, 10);
    assert!(schedule[first_car..]
        .iter()
        .all(|a| matches!(a, Activation::Car(_))));
    assert!(matches!(schedule[0], Activation::Light(_)));
    assert!(matches!(schedule[1], Activation::Crosswalk(_)));
}

#[test]
fn test_snapshot_json_shape() {
    let world = SimWorld::create_reference_world_with_seed(8).unwrap();
    let json: serde_json::Value = serde_json::from_str(&world.snapshot().to_json().unwrap()).unwrap();

    assert_eq!(json["tick"], 0);
    let car = &json["cars"][0];
    for key in ["id", "variant", "position", "mood", "parked", "heading"] {
        assert!(car.get(key).is_some(), "car view is missing {}", key);
    }
    assert_eq!(json["lights"][0]["state"], "stop");
    assert_eq!(json["crosswalks"][0]["state"], "go");
    assert!(json["parking_spots"][0]["number"].is_u64());
}

#[test]
fn test_config_round_trips_through_json() {
    let config = reference_config().with_seed(77);
    let json = config.to_json_string().unwrap();
    let parsed = SimConfig::from_json_str(&json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_hand_written_json_config() {
    let json = r#"{
        "width": 6,
        "height": 2,
        "seed": 1,
        "streets": [
            { "from": [0, 0], "to": [5, 0], "entry": "right" },
            { "from": [3, 0], "entry": ["right", "up"] }
        ],
        "parking": [ { "cell": [3, 1], "number": 9 } ],
        "cars": [ { "variant": "patient", "start": [0, 0] } ]
    }"#;
    let config = SimConfig::from_json_str(json).unwrap();
    assert_eq!(config.activation_order, ActivationOrder::Fixed);
    assert_eq!(config.light_period, 10);
    assert_eq!(config.detection_radius, Some(3));

    let world = SimWorld::from_config(&config).unwrap();
    let entry = world.streets().directions_at(Cell::new(3, 0)).unwrap();
    assert!(entry.is_decision_point());
    assert!(world.routing().successors(Cell::new(3, 0)).contains(&Cell::new(3, 1)));
    assert_eq!(world.parking().spots().next().unwrap().number, 9);
}

#[test]
fn test_malformed_json_is_a_parse_error() {
    assert!(matches!(
        SimConfig::from_json_str("{ \"width\": 3 "),
        Err(SimError::ConfigParse(_))
    ));
}

#[test]
fn test_inconsistent_configurations_are_rejected() {
    let base = || {
        SimConfig::new(6, 4).with_street(Cell::new(0, 0), Cell::new(5, 0), Direction::Right)
    };

    // Building on a street
    let config = base().with_building(Footprint::new(2, 0, 2, 2));
    assert!(is_inconsistent(SimWorld::from_config(&config)));

    // Spot outside the grid
    let config = base().with_parking(Cell::new(6, 1), 1);
    assert!(is_inconsistent(SimWorld::from_config(&config)));

    // Duplicate spot numbers
    let config = base()
        .with_parking(Cell::new(1, 1), 1)
        .with_parking(Cell::new(2, 1), 1);
    assert!(is_inconsistent(SimWorld::from_config(&config)));

    // Two spots on one cell
    let config = base()
        .with_parking(Cell::new(1, 1), 1)
        .with_parking(Cell::new(1, 1), 2);
    assert!(is_inconsistent(SimWorld::from_config(&config)));

    // Light inside a building
    let config = base()
        .with_building(Footprint::new(0, 2, 3, 2))
        .with_signal(Footprint::column(1, 2, 1), vec![]);
    assert!(is_inconsistent(SimWorld::from_config(&config)));

    // Crosswalk on a parking spot
    let config = base()
        .with_parking(Cell::new(4, 1), 1)
        .with_signal(Footprint::column(3, 0, 1), vec![Footprint::row(4, 1, 1)]);
    assert!(is_inconsistent(SimWorld::from_config(&config)));

    // Car starting off the street network
    let config = base().with_car(CarVariant::Patient, Cell::new(2, 2));
    assert!(is_inconsistent(SimWorld::from_config(&config)));

    // Two cars on one start cell
    let config = base()
        .with_car(CarVariant::Patient, Cell::new(2, 0))
        .with_car(CarVariant::Fast, Cell::new(2, 0));
    assert!(is_inconsistent(SimWorld::from_config(&config)));

    // Diagonal street run
    let config = SimConfig::new(6, 4).with_street(Cell::new(0, 0), Cell::new(2, 2), Direction::Up);
    assert!(is_inconsistent(SimWorld::from_config(&config)));

    // Footprint far wider than the grid
    let config = SimConfig::new(10, 3).with_building(Footprint::new(0, 2, u32::MAX, 2));
    assert!(is_inconsistent(SimWorld::from_config(&config)));

    // Roundabout hanging off the top edge
    let mut config = base();
    config.roundabouts.push(Footprint::new(4, 3, 2, 2));
    assert!(is_inconsistent(SimWorld::from_config(&config)));

    // Crosswalk starting left of the grid
    let config = base().with_signal(Footprint::column(3, 0, 1), vec![Footprint::row(-1, 2, 2)]);
    assert!(is_inconsistent(SimWorld::from_config(&config)));

    // Street run reaching far past the grid
    let config = SimConfig::new(6, 4).with_street(
        Cell::new(0, 0),
        Cell::new(i32::MAX, 0),
        Direction::Right,
    );
    assert!(is_inconsistent(SimWorld::from_config(&config)));

    // Grid too large to allocate
    assert!(is_inconsistent(SimWorld::from_config(&SimConfig::new(100_000, 100_000))));
    assert!(is_inconsistent(SimWorld::from_config(&SimConfig::new(u32::MAX, u32::MAX))));

    // Empty grid
    assert!(is_inconsistent(SimWorld::from_config(&SimConfig::new(0, 4))));

    // A spot carved out of a building is fine
    let config = base()
        .with_building(Footprint::new(0, 1, 3, 2))
        .with_parking(Cell::new(1, 1), 1);
    assert!(SimWorld::from_config(&config).is_ok());
}

#[test]
fn test_spawn_car_validates_start() {
    let config =
        SimConfig::new(6, 2).with_street(Cell::new(0, 0), Cell::new(5, 0), Direction::Right);
    let mut world = SimWorld::from_config(&config).unwrap();

    let id = world.spawn_car(CarVariant::Slow, Cell::new(1, 0)).unwrap();
    assert_eq!(world.car(id).unwrap().position, Cell::new(1, 0));
    assert_eq!(world.schedule().last(), Some(&Activation::Car(id)));

    assert!(is_inconsistent(world.spawn_car(CarVariant::Fast, Cell::new(1, 0))));
    assert!(is_inconsistent(world.spawn_car(CarVariant::Fast, Cell::new(1, 1))));
    assert!(matches!(
        world.spawn_car(CarVariant::Fast, Cell::new(9, 0)),
        Err(SimError::OutOfBounds { .. })
    ));
    assert_eq!(world.cars().count(), 1);
}

#[test]
fn test_fleet_pool_exhaustion_skips_cars() {
    let mut config = reference_config().with_seed(2);
    if let Some(fleet) = config.fleet.as_mut() {
        fleet.start_positions.truncate(4);
    }
    let world = SimWorld::from_config(&config).unwrap();
    assert_eq!(world.cars().count(), 4);
}
