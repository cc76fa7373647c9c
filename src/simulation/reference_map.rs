//! The built-in 24x24 city block map
//!
//! A ring road of two-lane streets around a grid of building blocks, with a
//! central roundabout, five signalised junctions and seventeen numbered
//! parking spots. The nine-car fleet is drawn at random from fixed entry cells.

use super::config::{FleetGroup, FleetSpec, ScarcityRule, SimConfig, StreetRun};
use super::street_map::DirectionEntry;
use super::types::{Cell, Direction, Footprint};
use super::variant::CarVariant;

use super::types::Direction::{Down, Left, Right, Up};

pub const REFERENCE_WIDTH: u32 = 24;
pub const REFERENCE_HEIGHT: u32 = 24;

/// Lane runs as (x0, y0, x1, y1, direction), inclusive, applied in order
const LANES: &[(i32, i32, i32, i32, Direction)] = &[
    // Outer ring
    (0, 0, 22, 0, Right),
    (1, 1, 21, 1, Right),
    (0, 1, 0, 23, Down),
    (1, 2, 1, 22, Down),
    (23, 0, 23, 23, Up),
    (22, 1, 22, 21, Up),
    (1, 23, 23, 23, Left),
    (2, 22, 22, 22, Left),
    // Side streets between parking blocks
    (2, 4, 5, 4, Left),
    (2, 5, 5, 5, Left),
    (8, 4, 11, 4, Right),
    (8, 5, 11, 5, Right),
    (8, 17, 11, 17, Left),
    (8, 18, 11, 18, Left),
    (6, 2, 6, 7, Down),
    (7, 2, 7, 7, Down),
    (6, 12, 6, 21, Up),
    (7, 12, 7, 21, Up),
    (16, 17, 21, 17, Left),
    (16, 16, 21, 16, Left),
    (18, 2, 18, 7, Up),
    (19, 2, 19, 7, Up),
    // Avenues into the roundabout
    (2, 8, 11, 8, Right),
    (2, 9, 11, 9, Right),
    (2, 11, 11, 11, Left),
    (2, 10, 11, 10, Left),
    (16, 11, 21, 11, Left),
    (16, 10, 21, 10, Left),
    (16, 8, 21, 8, Right),
    (16, 9, 21, 9, Right),
    (12, 12, 12, 21, Down),
    (13, 12, 13, 21, Down),
    (14, 12, 14, 21, Up),
    (15, 12, 15, 21, Up),
    (15, 2, 15, 7, Up),
    (14, 2, 14, 7, Up),
    (12, 2, 12, 7, Down),
    (13, 2, 13, 7, Down),
    // Roundabout ring
    (13, 8, 14, 8, Right),
    (13, 11, 14, 11, Left),
    (12, 9, 12, 11, Down),
    (15, 9, 15, 11, Up),
];

/// Decision points as (x, y, first, second), applied after the lanes
const DECISIONS: &[(i32, i32, Direction, Direction)] = &[
    (12, 8, Right, Down),
    (12, 11, Left, Down),
    (15, 8, Up, Right),
    (15, 11, Up, Left),
    (1, 9, Down, Right),
    (1, 8, Down, Right),
    (6, 7, Right, Down),
    (7, 7, Right, Down),
    (6, 5, Left, Down),
    (6, 4, Left, Down),
    (7, 5, Right, Down),
    (7, 4, Right, Down),
    (6, 11, Left, Up),
    (7, 11, Left, Up),
    (12, 17, Left, Down),
    (12, 18, Left, Down),
    (12, 22, Left, Down),
    (13, 22, Left, Down),
    (18, 1, Right, Up),
    (19, 1, Right, Up),
    (22, 16, Left, Up),
    (22, 17, Left, Up),
    (22, 10, Left, Up),
    (22, 11, Left, Up),
    (14, 1, Right, Up),
    (15, 1, Right, Up),
    (6, 8, Right, Down),
    (7, 8, Right, Down),
    (23, 17, Left, Up),
    (12, 23, Left, Down),
    (0, 8, Right, Down),
];

/// Building blocks as (x, y, width, height)
const BUILDINGS: &[(i32, i32, u32, u32)] = &[
    (2, 2, 4, 2),
    (2, 6, 4, 2),
    (8, 2, 4, 2),
    (8, 6, 4, 2),
    (2, 12, 4, 10),
    (8, 12, 4, 5),
    (8, 19, 4, 3),
    (16, 2, 2, 6),
    (20, 2, 2, 6),
    (16, 12, 6, 4),
    (16, 18, 6, 4),
];

/// Parking spots as (x, y, number)
const PARKING: &[(i32, i32, u32)] = &[
    (3, 21, 2),
    (5, 17, 6),
    (2, 14, 1),
    (4, 12, 4),
    (4, 3, 5),
    (3, 6, 3),
    (9, 2, 8),
    (10, 7, 11),
    (8, 15, 7),
    (10, 19, 9),
    (10, 12, 10),
    (17, 6, 13),
    (17, 4, 14),
    (20, 4, 17),
    (20, 15, 16),
    (20, 18, 15),
    (17, 21, 12),
];

/// Signals as (light x, light y, light height, crosswalk x, crosswalk y, crosswalk width)
const SIGNALS: &[(i32, i32, u32, i32, i32, u32)] = &[
    (5, 0, 2, 6, 2, 2),
    (2, 4, 2, 0, 6, 2),
    (8, 17, 2, 6, 16, 2),
    (8, 22, 2, 6, 21, 2),
    (17, 8, 2, 18, 7, 2),
];

const FLEET_STARTS: &[(i32, i32)] = &[
    (0, 23),
    (23, 0),
    (23, 23),
    (0, 0),
    (7, 5),
    (12, 17),
    (13, 22),
    (18, 1),
    (22, 16),
];

const FLEET: &[(CarVariant, usize)] = &[
    (CarVariant::Patient, 2),
    (CarVariant::Fast, 2),
    (CarVariant::Slow, 2),
    (CarVariant::RuleBreaking, 1),
    (CarVariant::Routed, 2),
];

/// Build the reference map configuration
pub fn reference_config() -> SimConfig {
    let mut config = SimConfig::new(REFERENCE_WIDTH, REFERENCE_HEIGHT);

    for &(x0, y0, x1, y1, direction) in LANES {
        config = config.with_street(Cell::new(x0, y0), Cell::new(x1, y1), direction);
    }
    for &(x, y, first, second) in DECISIONS {
        config.streets.push(StreetRun {
            from: Cell::new(x, y),
            to: None,
            entry: DirectionEntry::Choice(vec![first, second]),
        });
    }

    for &(x, y, width, height) in BUILDINGS {
        config = config.with_building(Footprint::new(x, y, width, height));
    }
    for &(x, y, number) in PARKING {
        config = config.with_parking(Cell::new(x, y), number);
    }
    for &(lx, ly, lh, cx, cy, cw) in SIGNALS {
        config = config.with_signal(Footprint::column(lx, ly, lh), vec![Footprint::row(cx, cy, cw)]);
    }
    config.roundabouts.push(Footprint::new(13, 9, 2, 2));

    config.fleet = Some(FleetSpec {
        start_positions: FLEET_STARTS.iter().map(|&(x, y)| Cell::new(x, y)).collect(),
        groups: FLEET
            .iter()
            .map(|&(variant, count)| FleetGroup { variant, count })
            .collect(),
    });
    config.scarcity = Some(ScarcityRule::default());
    config
}
