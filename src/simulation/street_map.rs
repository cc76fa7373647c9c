//! Lane directions for every drivable cell
//!
//! A cell with more than one permitted direction is a decision point where a
//! wandering car picks its exit at random.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::types::{Cell, Direction};

/// The legal travel direction(s) of a cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DirectionEntry {
    Single(Direction),
    Choice(Vec<Direction>),
}

impl DirectionEntry {
    pub fn directions(&self) -> &[Direction] {
        match self {
            DirectionEntry::Single(direction) => std::slice::from_ref(direction),
            DirectionEntry::Choice(directions) => directions,
        }
    }

    pub fn is_decision_point(&self) -> bool {
        self.directions().len() > 1
    }

    pub fn allows(&self, direction: Direction) -> bool {
        self.directions().contains(&direction)
    }

    /// True when both entries permit at least one common direction
    pub fn shares_direction_with(&self, other: &DirectionEntry) -> bool {
        self.directions().iter().any(|d| other.allows(*d))
    }
}

impl From<Direction> for DirectionEntry {
    fn from(direction: Direction) -> Self {
        DirectionEntry::Single(direction)
    }
}

/// Mapping from cell to its permitted directions
#[derive(Debug, Clone, Default)]
pub struct StreetDirectionMap {
    entries: HashMap<Cell, DirectionEntry>,
}

impl StreetDirectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry for a cell, replacing any earlier one
    pub fn set(&mut self, cell: Cell, entry: DirectionEntry) {
        self.entries.insert(cell, entry);
    }

    pub fn directions_at(&self, cell: Cell) -> Option<&DirectionEntry> {
        self.entries.get(&cell)
    }

    pub fn is_drivable(&self, cell: Cell) -> bool {
        self.entries.contains_key(&cell)
    }

    /// Cells reachable in one step, in entry order. This is the only legal-move
    /// generator for cars that are not following a route.
    pub fn candidate_next_cells(&self, cell: Cell) -> Vec<Cell> {
        self.directions_at(cell)
            .map(|entry| {
                entry
                    .directions()
                    .iter()
                    .map(|direction| cell.offset(*direction))
                    .filter(|next| self.is_drivable(*next))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All drivable cells, sorted for deterministic iteration
    pub fn drivable_cells(&self) -> Vec<Cell> {
        let mut cells: Vec<Cell> = self.entries.keys().copied().collect();
        cells.sort();
        cells
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
