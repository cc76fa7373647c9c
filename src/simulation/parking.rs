//! Parking spots and their occupancy
//!
//! A spot is claimed at most once per run; there is no un-parking.

use std::collections::{BTreeMap, HashMap};

use super::types::{CarId, Cell, SpotId};

/// A numbered parking spot
#[derive(Debug, Clone)]
pub struct ParkingSpot {
    pub id: SpotId,
    pub cell: Cell,
    /// Externally visible spot number
    pub number: u32,
    pub occupied_by: Option<CarId>,
}

impl ParkingSpot {
    pub fn new(id: SpotId, cell: Cell, number: u32) -> Self {
        Self {
            id,
            cell,
            number,
            occupied_by: None,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied_by.is_some()
    }
}

/// Tracks every spot in the map
#[derive(Debug, Clone, Default)]
pub struct ParkingRegistry {
    spots: BTreeMap<SpotId, ParkingSpot>,
    by_cell: HashMap<Cell, SpotId>,
}

impl ParkingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, spot: ParkingSpot) {
        self.by_cell.insert(spot.cell, spot.id);
        self.spots.insert(spot.id, spot);
    }

    pub fn get(&self, id: SpotId) -> Option<&ParkingSpot> {
        self.spots.get(&id)
    }

    pub fn spot_at(&self, cell: Cell) -> Option<&ParkingSpot> {
        self.by_cell.get(&cell).and_then(|id| self.spots.get(id))
    }

    /// The open spot on `cell`, if there is one
    pub fn open_spot_at(&self, cell: Cell) -> Option<SpotId> {
        self.spot_at(cell)
            .filter(|spot| !spot.is_occupied())
            .map(|spot| spot.id)
    }

    pub fn is_open(&self, id: SpotId) -> bool {
        self.spots.get(&id).is_some_and(|spot| !spot.is_occupied())
    }

    /// Claim a spot for a car. Returns false when the spot is unknown or taken.
    pub fn occupy(&mut self, id: SpotId, car: CarId) -> bool {
        match self.spots.get_mut(&id) {
            Some(spot) if spot.occupied_by.is_none() => {
                spot.occupied_by = Some(car);
                true
            }
            _ => false,
        }
    }

    /// Spots in registration order
    pub fn spots(&self) -> impl Iterator<Item = &ParkingSpot> {
        self.spots.values()
    }

    pub fn open_spots(&self) -> impl Iterator<Item = &ParkingSpot> {
        self.spots.values().filter(|spot| !spot.is_occupied())
    }

    pub fn open_count(&self) -> usize {
        self.open_spots().count()
    }

    pub fn cells(&self) -> Vec<Cell> {
        self.spots.values().map(|spot| spot.cell).collect()
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }
}
