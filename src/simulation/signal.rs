//! Traffic light and crosswalk signals
//!
//! Lights run on a fixed timer and ignore traffic. A crosswalk has no timer
//! of its own and always shows the opposite of its light.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::{Cell, CrosswalkId, LightId};

/// The two states of a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalState {
    Stop,
    Go,
}

impl SignalState {
    pub fn opposite(self) -> SignalState {
        match self {
            SignalState::Stop => SignalState::Go,
            SignalState::Go => SignalState::Stop,
        }
    }
}

/// A traffic light covering a run of lane cells
#[derive(Debug, Clone)]
pub struct TrafficLight {
    pub id: LightId,
    pub cells: Vec<Cell>,
    pub state: SignalState,
    pub ticks_since_toggle: u32,
    /// Ticks between toggles
    pub period: u32,
}

impl TrafficLight {
    pub fn new(id: LightId, cells: Vec<Cell>, period: u32) -> Self {
        Self {
            id,
            cells,
            state: SignalState::Stop,
            ticks_since_toggle: 0,
            period: period.max(1),
        }
    }

    /// Advance the timer by one tick, flipping state when the period elapses
    pub fn step(&mut self) {
        self.ticks_since_toggle += 1;
        if self.ticks_since_toggle >= self.period {
            self.state = self.state.opposite();
            self.ticks_since_toggle = 0;
        }
    }

    pub fn is_stop(&self) -> bool {
        self.state == SignalState::Stop
    }
}

/// A crosswalk slaved to one traffic light
#[derive(Debug, Clone)]
pub struct Crosswalk {
    pub id: CrosswalkId,
    pub cells: Vec<Cell>,
    pub linked_light: LightId,
}

impl Crosswalk {
    pub fn new(id: CrosswalkId, cells: Vec<Cell>, linked_light: LightId) -> Self {
        Self {
            id,
            cells,
            linked_light,
        }
    }

    /// Complement of the linked light; pedestrians cross while cars are stopped.
    /// A dangling link reads as `Go` so it never blocks traffic.
    pub fn state(&self, lights: &BTreeMap<LightId, TrafficLight>) -> SignalState {
        lights
            .get(&self.linked_light)
            .map(|light| light.state.opposite())
            .unwrap_or(SignalState::Go)
    }
}
