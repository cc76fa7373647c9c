//! Occupancy grid for the parking simulation
//!
//! The grid is the authoritative record of which entity sits on which cell.
//! It never refuses a second occupant; collision policy belongs to the cars.

use std::collections::HashMap;

use super::error::{SimError, SimResult};
use super::types::{CarId, Cell, CrosswalkId, LightId, SimId, SpotId};

/// What an occupant is able to do, used for dispatch instead of a type hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Movable,
    SignalControlled,
    Occupiable,
    Static,
}

/// An entity sitting on a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occupant {
    Car(CarId),
    TrafficLight(LightId),
    Crosswalk(CrosswalkId),
    ParkingSpot(SpotId),
    Building(SimId),
    Roundabout(SimId),
}

impl Occupant {
    pub fn id(&self) -> SimId {
        match *self {
            Occupant::Car(CarId(id))
            | Occupant::TrafficLight(LightId(id))
            | Occupant::Crosswalk(CrosswalkId(id))
            | Occupant::ParkingSpot(SpotId(id))
            | Occupant::Building(id)
            | Occupant::Roundabout(id) => id,
        }
    }

    pub fn capability(&self) -> Capability {
        match self {
            Occupant::Car(_) => Capability::Movable,
            Occupant::TrafficLight(_) | Occupant::Crosswalk(_) => Capability::SignalControlled,
            Occupant::ParkingSpot(_) => Capability::Occupiable,
            Occupant::Building(_) | Occupant::Roundabout(_) => Capability::Static,
        }
    }
}

/// A fixed-size multi-occupancy grid
#[derive(Debug, Clone)]
pub struct SimGrid {
    width: u32,
    height: u32,
    /// Row-major occupant lists, indexed by `y * width + x`
    cells: Vec<Vec<Occupant>>,
    /// Every cell each entity currently covers
    footprints: HashMap<SimId, (Occupant, Vec<Cell>)>,
}

impl SimGrid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![Vec::new(); width as usize * height as usize],
            footprints: HashMap::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.width && (cell.y as u32) < self.height
    }

    fn index(&self, cell: Cell) -> SimResult<usize> {
        if !self.in_bounds(cell) {
            return Err(SimError::OutOfBounds {
                cell,
                width: self.width,
                height: self.height,
            });
        }
        Ok(cell.y as usize * self.width as usize + cell.x as usize)
    }

    /// Add an occupant to a cell. Placing the same entity again extends its footprint.
    pub fn place(&mut self, occupant: Occupant, cell: Cell) -> SimResult<()> {
        let index = self.index(cell)?;
        self.cells[index].push(occupant);
        self.footprints
            .entry(occupant.id())
            .or_insert_with(|| (occupant, Vec::new()))
            .1
            .push(cell);
        Ok(())
    }

    /// Take an entity off every cell it covers, returning those cells
    pub fn remove(&mut self, id: SimId) -> SimResult<Vec<Cell>> {
        let (_, cells) = self
            .footprints
            .remove(&id)
            .ok_or(SimError::UnknownEntity(id))?;
        for cell in &cells {
            let index = self.index(*cell)?;
            self.cells[index].retain(|occupant| occupant.id() != id);
        }
        Ok(cells)
    }

    /// Relocate an entity to `to`, collapsing its footprint to that single cell
    pub fn move_to(&mut self, id: SimId, to: Cell) -> SimResult<()> {
        let target = self.index(to)?;
        let (occupant, cells) = self
            .footprints
            .get_mut(&id)
            .ok_or(SimError::UnknownEntity(id))?;
        let occupant = *occupant;
        let previous = std::mem::replace(cells, vec![to]);

        for cell in previous {
            let index = cell.y as usize * self.width as usize + cell.x as usize;
            self.cells[index].retain(|o| o.id() != id);
        }
        self.cells[target].push(occupant);
        Ok(())
    }

    /// Occupants of a cell; empty for out-of-bounds cells
    pub fn contents_at(&self, cell: Cell) -> &[Occupant] {
        match self.index(cell) {
            Ok(index) => self.cells[index].as_slice(),
            Err(_) => &[],
        }
    }

    pub fn is_empty(&self, cell: Cell) -> bool {
        self.contents_at(cell).is_empty()
    }

    /// First cell an entity covers
    pub fn position_of(&self, id: SimId) -> Option<Cell> {
        self.footprints
            .get(&id)
            .and_then(|(_, cells)| cells.first().copied())
    }

    /// All cells an entity covers
    pub fn footprint_of(&self, id: SimId) -> &[Cell] {
        self.footprints
            .get(&id)
            .map(|(_, cells)| cells.as_slice())
            .unwrap_or(&[])
    }

    /// Cars on a cell
    pub fn cars_at(&self, cell: Cell) -> impl Iterator<Item = CarId> + '_ {
        self.contents_at(cell).iter().filter_map(|occupant| match occupant {
            Occupant::Car(id) => Some(*id),
            _ => None,
        })
    }

    /// True when a car other than `except` sits on `cell`
    pub fn has_other_car(&self, cell: Cell, except: CarId) -> bool {
        self.cars_at(cell).any(|car| car != except)
    }
}
