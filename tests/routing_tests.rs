use std::collections::{HashMap, VecDeque};

use parking_sim::simulation::{
    reference_config, Cell, Direction, RoutingGraph, SimWorld, StreetDirectionMap,
};

/// Plain breadth-first distances over the routing graph's successor lists
fn bfs_distances(routing: &RoutingGraph, start: Cell) -> HashMap<Cell, u32> {
    let mut distances = HashMap::from([(start, 0)]);
    let mut queue = VecDeque::from([start]);
    while let Some(cell) = queue.pop_front() {
        let distance = distances[&cell];
        for next in routing.successors(cell) {
            if !distances.contains_key(&next) {
                distances.insert(next, distance + 1);
                queue.push_back(next);
            }
        }
    }
    distances
}

fn straight_lane(length: i32) -> StreetDirectionMap {
    let mut streets = StreetDirectionMap::new();
    for x in 0..length {
        streets.set(Cell::new(x, 0), Direction::Right.into());
    }
    streets
}

#[test]
fn test_shortest_path_matches_bfs_on_reference_map() {
    let world = SimWorld::create_reference_world_with_seed(1).unwrap();
    let routing = world.routing();
    let spots = world.parking().cells();

    for start in world.streets().drivable_cells() {
        let distances = bfs_distances(routing, start);
        let expected = spots.iter().filter_map(|spot| distances.get(spot)).min().copied();

        let found = routing.shortest_path_to_any(start, &spots);
        match (expected, found) {
            (None, None) => {}
            (Some(distance), Some(route)) => {
                assert_eq!(route.length, distance, "wrong length from {}", start);
                assert_eq!(route.path.len() as u32, distance + 1);
                assert_eq!(route.path.first(), Some(&start));
                assert!(spots.contains(&route.target().unwrap()));
                for pair in route.path.windows(2) {
                    assert!(
                        routing.successors(pair[0]).contains(&pair[1]),
                        "path from {} uses a missing edge {} -> {}",
                        start,
                        pair[0],
                        pair[1]
                    );
                }
            }
            (expected, found) => panic!(
                "reachability mismatch from {}: bfs {:?}, search {:?}",
                start, expected, found
            ),
        }
    }
}

#[test]
fn test_every_reference_spot_is_reachable() {
    let config = reference_config();
    let streets = config.street_directions().unwrap();
    let spots: Vec<Cell> = config.parking.iter().map(|p| p.cell).collect();
    let routing = RoutingGraph::build(&streets, &spots);

    let start = Cell::new(0, 0);
    let distances = bfs_distances(&routing, start);
    for spot in &spots {
        assert!(distances.contains_key(spot), "spot at {} cannot be reached", spot);
    }
}

#[test]
fn test_decision_points_contribute_every_exit() {
    let config = reference_config();
    let streets = config.street_directions().unwrap();
    let routing = RoutingGraph::build(&streets, &[]);

    let mut exits = routing.successors(Cell::new(12, 8));
    exits.sort();
    assert_eq!(exits, vec![Cell::new(12, 7), Cell::new(13, 8)]);
}

#[test]
fn test_unreachable_target_yields_none() {
    let streets = straight_lane(5);
    let behind = Cell::new(0, 1);
    let routing = RoutingGraph::build(&streets, &[behind]);

    // The spot hangs off (0, 0), which nothing downstream can return to
    assert!(routing.shortest_path_to_any(Cell::new(2, 0), &[behind]).is_none());
    assert!(routing.shortest_path_to_any(Cell::new(2, 0), &[]).is_none());
    assert!(routing
        .shortest_path_to_any(Cell::new(9, 9), &[Cell::new(4, 0)])
        .is_none());
}

#[test]
fn test_spot_access_edges_and_tie_order() {
    let streets = straight_lane(6);
    let above = Cell::new(3, 1);
    let below = Cell::new(3, -1);
    let routing = RoutingGraph::build(&streets, &[above, below]);

    let route = routing
        .shortest_path_to_any(Cell::new(1, 0), &[below, above])
        .unwrap();
    assert_eq!(route.length, 3);
    assert_eq!(route.target(), Some(below));
    assert_eq!(
        route.path,
        vec![Cell::new(1, 0), Cell::new(2, 0), Cell::new(3, 0), below]
    );

    let route = routing
        .shortest_path_to_any(Cell::new(1, 0), &[above, below])
        .unwrap();
    assert_eq!(route.target(), Some(above));
}

#[test]
fn test_nearest_target_wins_over_listing_order() {
    let streets = straight_lane(8);
    let near = Cell::new(2, 1);
    let far = Cell::new(6, 1);
    let routing = RoutingGraph::build(&streets, &[near, far]);

    let route = routing
        .shortest_path_to_any(Cell::new(0, 0), &[far, near])
        .unwrap();
    assert_eq!(route.target(), Some(near));
    assert_eq!(route.length, 3);
}

#[test]
fn test_start_on_target_is_zero_length() {
    let streets = straight_lane(3);
    let routing = RoutingGraph::build(&streets, &[Cell::new(1, 0)]);

    let route = routing
        .shortest_path_to_any(Cell::new(1, 0), &[Cell::new(1, 0)])
        .unwrap();
    assert_eq!(route.length, 0);
    assert_eq!(route.path, vec![Cell::new(1, 0)]);
}
