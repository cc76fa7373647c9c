//! Main simulation world that ties everything together
//!
//! Owns the grid, the static street data, every signal, spot and car, and the
//! tick loop that activates them.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

use super::car::{SimCar, StepContext};
use super::car_manager;
use super::config::{ActivationOrder, BehaviorTuning, SimConfig};
use super::error::SimResult;
use super::grid::{Occupant, SimGrid};
use super::parking::{ParkingRegistry, ParkingSpot};
use super::reference_map;
use super::routing::RoutingGraph;
use super::signal::{Crosswalk, SignalState, TrafficLight};
use super::snapshot::{CarView, CrosswalkView, LightView, SpotView, WorldSnapshot};
use super::stats::SimStats;
use super::street_map::StreetDirectionMap;
use super::types::{CarId, Cell, CrosswalkId, LightId, SimId, SpotId};
use super::variant::CarVariant;

/// One entry in the per-tick activation schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Light(LightId),
    Crosswalk(CrosswalkId),
    Car(CarId),
}

/// The main simulation world
pub struct SimWorld {
    grid: SimGrid,
    streets: StreetDirectionMap,
    routing: RoutingGraph,
    lights: BTreeMap<LightId, TrafficLight>,
    crosswalks: BTreeMap<CrosswalkId, Crosswalk>,
    parking: ParkingRegistry,
    cars: BTreeMap<CarId, SimCar>,

    /// Scheduled entities in insertion order
    schedule: Vec<Activation>,
    activation_order: ActivationOrder,
    tuning: BehaviorTuning,

    /// Next ID to assign
    next_id: usize,

    /// Ticks completed so far
    tick: u64,

    /// Seeded RNG shared by every random decision in the run
    rng: StdRng,

    stats: SimStats,
}

impl SimWorld {
    /// Build a world from a validated configuration
    pub fn from_config(config: &SimConfig) -> SimResult<Self> {
        config.validate()?;
        let streets = config.street_directions()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut world = Self {
            grid: SimGrid::new(config.width, config.height),
            streets,
            routing: RoutingGraph::default(),
            lights: BTreeMap::new(),
            crosswalks: BTreeMap::new(),
            parking: ParkingRegistry::new(),
            cars: BTreeMap::new(),
            schedule: Vec::new(),
            activation_order: config.activation_order,
            tuning: config.behavior_tuning(),
            next_id: 0,
            tick: 0,
            rng,
            stats: SimStats::default(),
        };

        for footprint in &config.buildings {
            let id = world.next_sim_id();
            for cell in footprint.cells() {
                world.grid.place(Occupant::Building(id), cell)?;
            }
        }

        for placement in &config.parking {
            let id = SpotId(world.next_sim_id());
            world.grid.place(Occupant::ParkingSpot(id), placement.cell)?;
            world
                .parking
                .add(ParkingSpot::new(id, placement.cell, placement.number));
        }

        for signal in &config.signals {
            let light_id = LightId(world.next_sim_id());
            let cells = signal.light.cells();
            for cell in &cells {
                world.grid.place(Occupant::TrafficLight(light_id), *cell)?;
            }
            let period = signal.period.unwrap_or(config.light_period);
            world
                .lights
                .insert(light_id, TrafficLight::new(light_id, cells, period));
            world.schedule.push(Activation::Light(light_id));

            for footprint in &signal.crosswalks {
                let crosswalk_id = CrosswalkId(world.next_sim_id());
                let cells = footprint.cells();
                for cell in &cells {
                    world.grid.place(Occupant::Crosswalk(crosswalk_id), *cell)?;
                }
                world
                    .crosswalks
                    .insert(crosswalk_id, Crosswalk::new(crosswalk_id, cells, light_id));
                world.schedule.push(Activation::Crosswalk(crosswalk_id));
            }
        }

        for footprint in &config.roundabouts {
            let id = world.next_sim_id();
            for cell in footprint.cells() {
                world.grid.place(Occupant::Roundabout(id), cell)?;
            }
        }

        world.routing = RoutingGraph::build(&world.streets, &world.parking.cells());

        for car in &config.cars {
            world.spawn_car(car.variant, car.start)?;
        }

        if let Some(fleet) = &config.fleet {
            let starts = car_manager::draw_fleet_starts(fleet, &world.grid, &mut world.rng);
            for (variant, start) in starts {
                world.spawn_car(variant, start)?;
            }
        }

        info!(
            "world ready: {}x{} grid, {} drivable cells, {} spots, {} lights, {} cars",
            config.width,
            config.height,
            world.streets.len(),
            world.parking.len(),
            world.lights.len(),
            world.cars.len()
        );
        Ok(world)
    }

    /// The reference 24x24 map with a random seed
    pub fn create_reference_world() -> SimResult<Self> {
        Self::from_config(&reference_map::reference_config())
    }

    /// The reference map with a fixed seed for reproducible runs
    pub fn create_reference_world_with_seed(seed: u64) -> SimResult<Self> {
        Self::from_config(&reference_map::reference_config().with_seed(seed))
    }

    fn next_sim_id(&mut self) -> SimId {
        let id = SimId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a car to the grid and the end of the schedule
    pub fn spawn_car(&mut self, variant: CarVariant, start: Cell) -> SimResult<CarId> {
        let id = CarId(self.next_sim_id());
        let car = car_manager::spawn_car(id, variant, start, &mut self.grid, &self.streets)?;
        self.cars.insert(id, car);
        self.schedule.push(Activation::Car(id));
        Ok(id)
    }

    /// Main simulation tick: every scheduled entity is activated exactly once
    pub fn tick(&mut self) -> SimResult<()> {
        self.tick += 1;
        self.stats.ticks = self.tick;

        let mut order = self.schedule.clone();
        if self.activation_order == ActivationOrder::Shuffled {
            order.shuffle(&mut self.rng);
        }

        for activation in order {
            match activation {
                Activation::Light(id) => self.update_light(id),
                // Crosswalk state is derived from its light on demand
                Activation::Crosswalk(_) => {}
                Activation::Car(id) => self.update_car(id)?,
            }
        }
        Ok(())
    }

    /// Run `ticks` ticks back to back
    pub fn advance(&mut self, ticks: u64) -> SimResult<()> {
        for _ in 0..ticks {
            self.tick()?;
        }
        Ok(())
    }

    fn update_light(&mut self, id: LightId) {
        if let Some(light) = self.lights.get_mut(&id) {
            let before = light.state;
            light.step();
            if light.state != before {
                debug!("light {} switched to {:?}", id.0, light.state);
            }
        }
    }

    fn update_car(&mut self, id: CarId) -> SimResult<()> {
        let Some(car) = self.cars.get_mut(&id) else {
            return Ok(());
        };
        let mut ctx = StepContext {
            grid: &mut self.grid,
            streets: &self.streets,
            routing: &self.routing,
            lights: &self.lights,
            crosswalks: &self.crosswalks,
            parking: &mut self.parking,
            tuning: self.tuning,
            rng: &mut self.rng,
        };
        car_manager::update_car(car, &mut ctx, &mut self.stats)?;
        Ok(())
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn car(&self, id: CarId) -> Option<&SimCar> {
        self.cars.get(&id)
    }

    pub fn cars(&self) -> impl Iterator<Item = &SimCar> {
        self.cars.values()
    }

    pub fn light(&self, id: LightId) -> Option<&TrafficLight> {
        self.lights.get(&id)
    }

    pub fn lights(&self) -> impl Iterator<Item = &TrafficLight> {
        self.lights.values()
    }

    pub fn crosswalks(&self) -> impl Iterator<Item = &Crosswalk> {
        self.crosswalks.values()
    }

    /// Derived state of a crosswalk
    pub fn crosswalk_state(&self, id: CrosswalkId) -> Option<SignalState> {
        self.crosswalks.get(&id).map(|c| c.state(&self.lights))
    }

    pub fn parking(&self) -> &ParkingRegistry {
        &self.parking
    }

    pub fn streets(&self) -> &StreetDirectionMap {
        &self.streets
    }

    pub fn routing(&self) -> &RoutingGraph {
        &self.routing
    }

    pub fn grid(&self) -> &SimGrid {
        &self.grid
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    pub fn schedule(&self) -> &[Activation] {
        &self.schedule
    }

    pub fn activation_order(&self) -> ActivationOrder {
        self.activation_order
    }

    /// Observable state between ticks
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.tick,
            cars: self
                .cars
                .values()
                .map(|car| CarView {
                    id: car.id,
                    variant: car.variant,
                    position: car.position,
                    mood: car.mood,
                    parked: car.parked,
                    heading: car.heading(&self.streets),
                })
                .collect(),
            lights: self
                .lights
                .values()
                .map(|light| LightView {
                    id: light.id,
                    cells: light.cells.clone(),
                    state: light.state,
                })
                .collect(),
            crosswalks: self
                .crosswalks
                .values()
                .map(|crosswalk| CrosswalkView {
                    id: crosswalk.id,
                    cells: crosswalk.cells.clone(),
                    state: crosswalk.state(&self.lights),
                })
                .collect(),
            parking_spots: self
                .parking
                .spots()
                .map(|spot| SpotView {
                    number: spot.number,
                    cell: spot.cell,
                    occupied: spot.is_occupied(),
                })
                .collect(),
        }
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== Parking Simulation Summary ===");
        println!("Tick: {}", self.tick);
        println!(
            "Drivable cells: {}, Routing nodes: {}, Routing edges: {}",
            self.streets.len(),
            self.routing.node_count(),
            self.routing.edge_count()
        );
        println!(
            "Parking spots: {} ({} open)",
            self.parking.len(),
            self.parking.open_count()
        );
        println!();

        println!("--- Traffic Lights ---");
        for light in self.lights.values() {
            println!(
                "  Light {:?}: state={:?}, cells={}",
                light.id.0 .0,
                light.state,
                light.cells.len()
            );
        }

        println!("--- Cars ---");
        for car in self.cars.values() {
            println!(
                "  Car {:?} [{:?}]: position={}, mood={:?}, waiting={}, {}",
                car.id.0 .0,
                car.variant,
                car.position,
                car.mood,
                car.wait_ticks,
                if car.parked {
                    "parked".to_string()
                } else {
                    match car.route_target() {
                        Some(target) => format!("routing to {}", target),
                        None => "driving".to_string(),
                    }
                }
            );
        }
    }

    /// Render the grid as text, top row first
    pub fn render_map(&self) -> String {
        let width = self.grid.width() as i32;
        let height = self.grid.height() as i32;
        let mut out = String::with_capacity(((width + 1) * height) as usize);

        for y in (0..height).rev() {
            for x in 0..width {
                out.push(self.cell_glyph(Cell::new(x, y)));
            }
            out.push('\n');
        }
        out
    }

    fn cell_glyph(&self, cell: Cell) -> char {
        let contents = self.grid.contents_at(cell);

        if let Some(car) = self.grid.cars_at(cell).next().and_then(|id| self.cars.get(&id)) {
            return if car.is_angry() {
                car.variant.glyph().to_ascii_uppercase()
            } else {
                car.variant.glyph()
            };
        }

        for occupant in contents {
            match occupant {
                Occupant::TrafficLight(id) => {
                    return match self.lights.get(id).map(|l| l.state) {
                        Some(SignalState::Go) => 'G',
                        _ => 'R',
                    };
                }
                Occupant::Crosswalk(id) => {
                    return match self.crosswalk_state(*id) {
                        Some(SignalState::Go) => '=',
                        _ => '-',
                    };
                }
                _ => {}
            }
        }

        for occupant in contents {
            match occupant {
                Occupant::ParkingSpot(_) => return 'P',
                Occupant::Roundabout(_) => return 'O',
                _ => {}
            }
        }

        if contents.iter().any(|o| matches!(o, Occupant::Building(_))) {
            return '#';
        }

        match self.streets.directions_at(cell) {
            Some(entry) if entry.is_decision_point() => '+',
            Some(entry) => entry.directions().first().map_or(' ', |d| d.glyph()),
            None => ' ',
        }
    }

    /// Draw a visual map of the world in the terminal
    pub fn draw_map(&self) {
        println!("\n=== World Map ===");
        println!(
            "Legend: c/f/s/x/r=Patient/Fast/Slow/RuleBreaking/Routed car (upper case = angry), \
             R/G=Light, -/= Crosswalk stop/go, P=Parking, O=Roundabout, #=Building, +=Decision"
        );
        println!();
        print!("{}", self.render_map());
        println!();
    }
}
