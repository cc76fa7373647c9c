//! Read-only view of the world between ticks
//!
//! Front ends poll this instead of reaching into simulation state.

use serde::Serialize;

use super::car::Mood;
use super::signal::SignalState;
use super::types::{Cell, CarId, CrosswalkId, Direction, LightId};
use super::variant::CarVariant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarView {
    pub id: CarId,
    pub variant: CarVariant,
    pub position: Cell,
    pub mood: Mood,
    pub parked: bool,
    /// First permitted direction of the current cell
    pub heading: Option<Direction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LightView {
    pub id: LightId,
    pub cells: Vec<Cell>,
    pub state: SignalState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrosswalkView {
    pub id: CrosswalkId,
    pub cells: Vec<Cell>,
    pub state: SignalState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpotView {
    pub number: u32,
    pub cell: Cell,
    pub occupied: bool,
}

/// Full observable state after `tick` ticks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub cars: Vec<CarView>,
    pub lights: Vec<LightView>,
    pub crosswalks: Vec<CrosswalkView>,
    pub parking_spots: Vec<SpotView>,
}

impl WorldSnapshot {
    pub fn car(&self, id: CarId) -> Option<&CarView> {
        self.cars.iter().find(|car| car.id == id)
    }

    pub fn parked_count(&self) -> usize {
        self.cars.iter().filter(|car| car.parked).count()
    }

    /// Cells holding more than one car, which must never happen
    pub fn shared_car_cells(&self) -> Vec<Cell> {
        let mut cells: Vec<Cell> = self.cars.iter().map(|car| car.position).collect();
        cells.sort();
        let mut shared: Vec<Cell> = cells
            .windows(2)
            .filter(|pair| pair[0] == pair[1])
            .map(|pair| pair[0])
            .collect();
        shared.dedup();
        shared
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
