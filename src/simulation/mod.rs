//! Standalone grid parking simulation
//!
//! This module contains the complete simulation: the multi-occupancy grid,
//! static street data, traffic signals, parking spots and the car behavior
//! variants. It runs headless and can be driven tick by tick from tests.

mod car;
mod car_manager;
mod config;
mod error;
mod grid;
mod parking;
mod reference_map;
mod routing;
mod signal;
mod snapshot;
mod stats;
mod street_map;
mod types;
mod variant;
mod world;

// Re-export public types for external use
pub use car::{CarUpdateResult, Mood, Obstruction, SimCar, StepReport};
pub use config::{
    ActivationOrder, BehaviorTuning, CarPlacement, FleetGroup, FleetSpec, ParkingPlacement,
    ScarcityRule, SignalPlacement, SimConfig, StreetRun,
};
pub use error::{SimError, SimResult};
pub use grid::{Capability, Occupant, SimGrid};
pub use parking::{ParkingRegistry, ParkingSpot};
pub use reference_map::{reference_config, REFERENCE_HEIGHT, REFERENCE_WIDTH};
pub use routing::{EdgeKind, ParkingRoute, RouteEdge, RoutingGraph};
pub use signal::{Crosswalk, SignalState, TrafficLight};
pub use snapshot::{CarView, CrosswalkView, LightView, SpotView, WorldSnapshot};
pub use stats::SimStats;
pub use street_map::{DirectionEntry, StreetDirectionMap};
pub use types::{
    CarId, Cell, CrosswalkId, Direction, Footprint, LightId, SimId, SpotId,
    DEFAULT_DETECTION_RADIUS, DEFAULT_LIGHT_PERIOD, MAX_GRID_CELLS, RED_LIGHT_IGNORE_PROBABILITY,
};
pub use variant::CarVariant;
pub use world::{Activation, SimWorld};
