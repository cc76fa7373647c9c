//! Static map and run configuration
//!
//! Everything about a particular map is data: lane runs, building footprints,
//! parking placements, signal pairings and the initial roster. The config is
//! validated as a whole before a world is built from it.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::error::{SimError, SimResult};
use super::street_map::{DirectionEntry, StreetDirectionMap};
use super::types::{
    Cell, Footprint, DEFAULT_DETECTION_RADIUS, DEFAULT_LIGHT_PERIOD, MAX_GRID_CELLS,
};
use super::variant::CarVariant;

/// A straight, axis-aligned run of lane cells sharing one entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreetRun {
    pub from: Cell,
    /// Inclusive end of the run; a single cell when absent
    #[serde(default)]
    pub to: Option<Cell>,
    pub entry: DirectionEntry,
}

impl StreetRun {
    pub fn cells(&self) -> SimResult<Vec<Cell>> {
        let to = self.to.unwrap_or(self.from);
        if self.from.x != to.x && self.from.y != to.y {
            return Err(inconsistent(format!(
                "street run {} -> {} is not axis-aligned",
                self.from, to
            )));
        }
        let (x0, x1) = (self.from.x.min(to.x), self.from.x.max(to.x));
        let (y0, y1) = (self.from.y.min(to.y), self.from.y.max(to.y));
        let mut cells = Vec::new();
        for x in x0..=x1 {
            for y in y0..=y1 {
                cells.push(Cell::new(x, y));
            }
        }
        Ok(cells)
    }
}

/// A numbered parking spot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingPlacement {
    pub cell: Cell,
    pub number: u32,
}

/// A traffic light and the crosswalks slaved to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalPlacement {
    pub light: Footprint,
    #[serde(default)]
    pub crosswalks: Vec<Footprint>,
    /// Overrides the map-wide light period
    #[serde(default)]
    pub period: Option<u32>,
}

/// A car in the initial roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarPlacement {
    pub variant: CarVariant,
    pub start: Cell,
}

/// How many cars of one variant to draw from the fleet pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetGroup {
    pub variant: CarVariant,
    pub count: usize,
}

/// Randomly assigned roster: each car takes a distinct start cell drawn from
/// the pool. Cars that find the pool exhausted are not spawned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetSpec {
    pub start_positions: Vec<Cell>,
    pub groups: Vec<FleetGroup>,
}

/// Order in which scheduled entities are activated within a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationOrder {
    /// Each light followed by its crosswalks in map order, then cars in
    /// roster order
    #[default]
    Fixed,
    /// A fresh random permutation every tick
    Shuffled,
}

/// Behavior adjustments once open parking runs low
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScarcityRule {
    /// Rule applies while fewer than this many spots are open
    pub open_spot_threshold: usize,
    pub fast_speed: u32,
    pub routed_detection_radius: u32,
}

impl Default for ScarcityRule {
    fn default() -> Self {
        Self {
            open_spot_threshold: 5,
            fast_speed: 3,
            routed_detection_radius: 2,
        }
    }
}

/// Tunables shared by every car during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BehaviorTuning {
    /// Manhattan radius for routed spot detection; `None` sees the whole map
    pub detection_radius: Option<u32>,
    pub scarcity: Option<ScarcityRule>,
}

/// Complete configuration for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub width: u32,
    pub height: u32,
    /// Applied in order; a later run overrides earlier entries on shared cells
    pub streets: Vec<StreetRun>,
    #[serde(default)]
    pub buildings: Vec<Footprint>,
    #[serde(default)]
    pub parking: Vec<ParkingPlacement>,
    #[serde(default)]
    pub signals: Vec<SignalPlacement>,
    #[serde(default)]
    pub roundabouts: Vec<Footprint>,
    #[serde(default)]
    pub cars: Vec<CarPlacement>,
    #[serde(default)]
    pub fleet: Option<FleetSpec>,
    #[serde(default)]
    pub activation_order: ActivationOrder,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_detection_radius")]
    pub detection_radius: Option<u32>,
    #[serde(default)]
    pub scarcity: Option<ScarcityRule>,
    #[serde(default = "default_light_period")]
    pub light_period: u32,
}

fn default_detection_radius() -> Option<u32> {
    Some(DEFAULT_DETECTION_RADIUS)
}

fn default_light_period() -> u32 {
    DEFAULT_LIGHT_PERIOD
}

fn inconsistent(message: String) -> SimError {
    SimError::ConfigurationInconsistent(message)
}

impl SimConfig {
    /// An empty map of the given size with default tunables
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            streets: Vec::new(),
            buildings: Vec::new(),
            parking: Vec::new(),
            signals: Vec::new(),
            roundabouts: Vec::new(),
            cars: Vec::new(),
            fleet: None,
            activation_order: ActivationOrder::Fixed,
            seed: None,
            detection_radius: default_detection_radius(),
            scarcity: None,
            light_period: DEFAULT_LIGHT_PERIOD,
        }
    }

    pub fn from_json_str(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_street(mut self, from: Cell, to: Cell, entry: impl Into<DirectionEntry>) -> Self {
        self.streets.push(StreetRun {
            from,
            to: Some(to),
            entry: entry.into(),
        });
        self
    }

    pub fn with_building(mut self, footprint: Footprint) -> Self {
        self.buildings.push(footprint);
        self
    }

    pub fn with_parking(mut self, cell: Cell, number: u32) -> Self {
        self.parking.push(ParkingPlacement { cell, number });
        self
    }

    pub fn with_signal(mut self, light: Footprint, crosswalks: Vec<Footprint>) -> Self {
        self.signals.push(SignalPlacement {
            light,
            crosswalks,
            period: None,
        });
        self
    }

    pub fn with_car(mut self, variant: CarVariant, start: Cell) -> Self {
        self.cars.push(CarPlacement { variant, start });
        self
    }

    pub fn with_order(mut self, order: ActivationOrder) -> Self {
        self.activation_order = order;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn behavior_tuning(&self) -> BehaviorTuning {
        BehaviorTuning {
            detection_radius: self.detection_radius,
            scarcity: self.scarcity,
        }
    }

    fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.width && (cell.y as u32) < self.height
    }

    fn check_bounds(&self, what: &str, cell: Cell) -> SimResult<()> {
        if self.in_bounds(cell) {
            Ok(())
        } else {
            Err(inconsistent(format!(
                "{what} at {cell} is outside the {}x{} grid",
                self.width, self.height
            )))
        }
    }

    fn check_footprint(&self, what: &str, footprint: &Footprint) -> SimResult<()> {
        if footprint.fits_within(self.width, self.height) {
            Ok(())
        } else {
            Err(inconsistent(format!(
                "{what} {}x{} at {} does not fit the {}x{} grid",
                footprint.width,
                footprint.height,
                Cell::new(footprint.x, footprint.y),
                self.width,
                self.height
            )))
        }
    }

    /// Apply the street runs in order
    pub fn street_directions(&self) -> SimResult<StreetDirectionMap> {
        let mut streets = StreetDirectionMap::new();
        for run in &self.streets {
            if run.entry.directions().is_empty() {
                return Err(inconsistent(format!(
                    "street run at {} has no directions",
                    run.from
                )));
            }
            self.check_bounds("street", run.from)?;
            if let Some(to) = run.to {
                self.check_bounds("street", to)?;
            }
            for cell in run.cells()? {
                streets.set(cell, run.entry.clone());
            }
        }
        Ok(streets)
    }

    /// Reject placements that collide or leave the grid
    pub fn validate(&self) -> SimResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(inconsistent("grid dimensions must be non-zero".into()));
        }
        if u64::from(self.width) * u64::from(self.height) > MAX_GRID_CELLS {
            return Err(inconsistent(format!(
                "a {}x{} grid exceeds {MAX_GRID_CELLS} cells",
                self.width, self.height
            )));
        }
        let streets = self.street_directions()?;

        // Static placements that may not share a cell with one another
        let mut claimed: HashMap<Cell, &'static str> = HashMap::new();
        let mut claim = |what: &'static str, cell: Cell| -> SimResult<()> {
            if let Some(existing) = claimed.insert(cell, what) {
                return Err(inconsistent(format!("{what} at {cell} collides with {existing}")));
            }
            Ok(())
        };

        let mut building_cells = HashSet::new();
        for footprint in &self.buildings {
            self.check_footprint("building", footprint)?;
            for cell in footprint.cells() {
                if streets.is_drivable(cell) {
                    return Err(inconsistent(format!("building at {cell} covers a street")));
                }
                // Overlapping footprints are merged rather than rejected
                building_cells.insert(cell);
            }
        }

        // Spots may be carved out of a building block
        let mut numbers = HashSet::new();
        for spot in &self.parking {
            self.check_bounds("parking spot", spot.cell)?;
            if !numbers.insert(spot.number) {
                return Err(inconsistent(format!(
                    "parking spot number {} is used twice",
                    spot.number
                )));
            }
            claim("parking spot", spot.cell)?;
        }

        for signal in &self.signals {
            self.check_footprint("traffic light", &signal.light)?;
            for cell in signal.light.cells() {
                if building_cells.contains(&cell) {
                    return Err(inconsistent(format!("traffic light at {cell} is inside a building")));
                }
                claim("traffic light", cell)?;
            }
            for footprint in &signal.crosswalks {
                self.check_footprint("crosswalk", footprint)?;
                for cell in footprint.cells() {
                    if building_cells.contains(&cell) {
                        return Err(inconsistent(format!("crosswalk at {cell} is inside a building")));
                    }
                    claim("crosswalk", cell)?;
                }
            }
            if signal.period == Some(0) {
                return Err(inconsistent("traffic light period must be positive".into()));
            }
        }

        for footprint in &self.roundabouts {
            self.check_footprint("roundabout", footprint)?;
            for cell in footprint.cells() {
                if streets.is_drivable(cell) || building_cells.contains(&cell) {
                    return Err(inconsistent(format!(
                        "roundabout at {cell} overlaps a street or building"
                    )));
                }
                claim("roundabout", cell)?;
            }
        }

        let mut starts = HashSet::new();
        for car in &self.cars {
            self.check_bounds("car start", car.start)?;
            if !streets.is_drivable(car.start) {
                return Err(inconsistent(format!(
                    "car start {} is not a drivable cell",
                    car.start
                )));
            }
            if !starts.insert(car.start) {
                return Err(inconsistent(format!("two cars start at {}", car.start)));
            }
        }

        if let Some(fleet) = &self.fleet {
            for cell in &fleet.start_positions {
                self.check_bounds("fleet start", *cell)?;
                if !streets.is_drivable(*cell) {
                    return Err(inconsistent(format!("fleet start {cell} is not a drivable cell")));
                }
            }
        }

        if self.light_period == 0 {
            return Err(inconsistent("traffic light period must be positive".into()));
        }

        Ok(())
    }
}
