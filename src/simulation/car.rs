//! Car movement logic for the parking simulation
//!
//! One `SimCar` type covers every behavioral variant. The step procedure is
//! shared; `CarVariant` supplies the thresholds and overrides.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use super::config::{BehaviorTuning, ScarcityRule};
use super::error::{SimError, SimResult};
use super::grid::{Occupant, SimGrid};
use super::parking::ParkingRegistry;
use super::routing::RoutingGraph;
use super::signal::{Crosswalk, SignalState, TrafficLight};
use super::street_map::StreetDirectionMap;
use super::types::{CarId, Cell, CrosswalkId, Direction, LightId, SpotId};
use super::variant::CarVariant;

/// Escalation state driven by time spent blocked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Calm,
    Angry,
}

/// Why a move attempt did not happen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Obstruction {
    StopLight(LightId),
    RedCrosswalk(CrosswalkId),
    Car(CarId),
    /// Every permitted direction leads off the street network
    NoExit,
}

/// Result of a car update indicating what happened this activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarUpdateResult {
    /// Already parked, or not this car's turn to move
    Idle,
    /// Advanced this many cells
    Moved(u32),
    /// Every attempt was obstructed; the first obstruction is reported
    Blocked(Obstruction),
    /// Claimed a spot and will never move again
    Parked(SpotId),
    /// The current cell has no street direction
    NoRouteDefined,
}

/// What a car did during one activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    pub lane_changed: bool,
    pub result: CarUpdateResult,
}

impl StepReport {
    fn idle() -> Self {
        Self {
            lane_changed: false,
            result: CarUpdateResult::Idle,
        }
    }
}

/// Everything a car may read or touch during its turn
pub struct StepContext<'a> {
    pub grid: &'a mut SimGrid,
    pub streets: &'a StreetDirectionMap,
    pub routing: &'a RoutingGraph,
    pub lights: &'a BTreeMap<LightId, TrafficLight>,
    pub crosswalks: &'a BTreeMap<CrosswalkId, Crosswalk>,
    pub parking: &'a mut ParkingRegistry,
    pub tuning: BehaviorTuning,
    pub rng: &'a mut StdRng,
}

impl StepContext<'_> {
    /// The scarcity rule, if it is currently in force
    fn active_scarcity(&self) -> Option<ScarcityRule> {
        self.tuning
            .scarcity
            .filter(|rule| self.parking.open_count() < rule.open_spot_threshold)
    }
}

/// Outcome of a single move attempt
#[derive(Debug, Clone, Copy)]
enum Attempt {
    Moved,
    Parked(SpotId),
    Blocked(Obstruction),
    NoRoute,
}

/// How a destination cell looks to the car about to enter it
enum Destination {
    Clear,
    Parking(SpotId),
    Blocked(Obstruction),
}

/// A car in the parking simulation
#[derive(Debug, Clone)]
pub struct SimCar {
    pub id: CarId,
    pub variant: CarVariant,
    pub position: Cell,
    pub mood: Mood,
    /// Consecutive blocked activations
    pub wait_ticks: u32,
    pub parked: bool,
    /// Move attempts per activation
    pub speed: u32,
    /// Remaining cells to a parking spot, front first (routed cars only)
    pub route: Option<VecDeque<Cell>>,
    pub parked_at: Option<SpotId>,
    /// Activations received, used by variants that do not move every tick
    activations: u32,
}

impl SimCar {
    pub fn new(id: CarId, variant: CarVariant, position: Cell) -> Self {
        Self {
            id,
            variant,
            position,
            mood: if variant.always_angry() {
                Mood::Angry
            } else {
                Mood::Calm
            },
            wait_ticks: 0,
            parked: false,
            speed: variant.base_speed(),
            route: None,
            parked_at: None,
            activations: 0,
        }
    }

    pub fn is_angry(&self) -> bool {
        self.mood == Mood::Angry
    }

    /// Cell the current route ends on
    pub fn route_target(&self) -> Option<Cell> {
        self.route.as_ref().and_then(|route| route.back().copied())
    }

    /// Drop the route when its terminal spot is no longer open.
    /// Returns true if a route was discarded.
    pub fn invalidate_stale_route(&mut self, parking: &ParkingRegistry) -> bool {
        let Some(target) = self.route_target() else {
            return false;
        };
        if parking.open_spot_at(target).is_some() {
            return false;
        }
        debug!("{} drops its route: spot at {} is gone", self.id, target);
        self.route = None;
        true
    }

    /// Direction the car is facing, for front ends
    pub fn heading(&self, streets: &StreetDirectionMap) -> Option<Direction> {
        streets
            .directions_at(self.position)
            .and_then(|entry| entry.directions().first().copied())
    }

    /// Run one activation
    pub fn step(&mut self, ctx: &mut StepContext<'_>) -> SimResult<StepReport> {
        if self.parked {
            return Ok(StepReport::idle());
        }
        self.activations += 1;

        // An angry car tries to switch lanes before anything else
        let lane_changed = if self.variant.changes_lane_every_tick() || self.is_angry() {
            self.change_lane(ctx)?
        } else {
            false
        };

        // Standing on an open spot parks the car even when the move is gated
        if let Some(spot) = ctx.parking.open_spot_at(self.position) {
            self.park(spot, ctx);
            if self.parked {
                self.record_progress();
                return Ok(StepReport {
                    lane_changed,
                    result: CarUpdateResult::Parked(spot),
                });
            }
        }

        if self.activations % self.variant.move_interval() != 0 {
            return Ok(StepReport {
                lane_changed,
                result: CarUpdateResult::Idle,
            });
        }

        let attempts = self.effective_speed(ctx);
        let mut moved = 0;
        let mut first_obstruction = None;
        let mut parked = None;
        let mut no_route = false;

        for _ in 0..attempts {
            match self.attempt_move(ctx)? {
                Attempt::Moved => moved += 1,
                Attempt::Parked(spot) => {
                    parked = Some(spot);
                    break;
                }
                Attempt::Blocked(obstruction) => {
                    first_obstruction.get_or_insert(obstruction);
                }
                Attempt::NoRoute => {
                    no_route = true;
                    break;
                }
            }
        }

        let result = if let Some(spot) = parked {
            self.record_progress();
            CarUpdateResult::Parked(spot)
        } else if moved > 0 {
            self.record_progress();
            CarUpdateResult::Moved(moved)
        } else if let Some(obstruction) = first_obstruction {
            self.record_blocked();
            CarUpdateResult::Blocked(obstruction)
        } else if no_route {
            CarUpdateResult::NoRouteDefined
        } else {
            CarUpdateResult::Idle
        };

        Ok(StepReport {
            lane_changed,
            result,
        })
    }

    fn effective_speed(&self, ctx: &StepContext<'_>) -> u32 {
        match (self.variant, ctx.active_scarcity()) {
            (CarVariant::Fast, Some(rule)) => rule.fast_speed.max(1),
            _ => self.speed.max(1),
        }
    }

    fn detection_radius(&self, ctx: &StepContext<'_>) -> Option<u32> {
        match ctx.active_scarcity() {
            Some(rule) => Some(rule.routed_detection_radius),
            None => ctx.tuning.detection_radius,
        }
    }

    fn record_progress(&mut self) {
        self.wait_ticks = 0;
        if !self.variant.always_angry() {
            self.mood = Mood::Calm;
        }
    }

    fn record_blocked(&mut self) {
        self.wait_ticks = self.wait_ticks.saturating_add(1);
        if self.wait_ticks > self.variant.anger_threshold() {
            self.mood = Mood::Angry;
        }
    }

    fn attempt_move(&mut self, ctx: &mut StepContext<'_>) -> SimResult<Attempt> {
        if let Some(spot) = ctx.parking.open_spot_at(self.position) {
            self.park(spot, ctx);
            return Ok(Attempt::Parked(spot));
        }

        if self.variant.plans_routes() {
            if let Some(attempt) = self.follow_route(ctx)? {
                return Ok(attempt);
            }
        }

        self.wander(ctx)
    }

    /// Move along the lane, picking at random at decision points
    fn wander(&mut self, ctx: &mut StepContext<'_>) -> SimResult<Attempt> {
        let streets = ctx.streets;
        if streets.directions_at(self.position).is_none() {
            warn!(
                "{}",
                SimError::NoRouteDefined {
                    car: self.id,
                    cell: self.position,
                }
            );
            return Ok(Attempt::NoRoute);
        }

        let candidates = streets.candidate_next_cells(self.position);
        let Some(&next) = candidates.choose(ctx.rng) else {
            return Ok(Attempt::Blocked(Obstruction::NoExit));
        };
        self.enter(next, ctx)
    }

    /// Take the next route step, planning a route first if there is none.
    /// Returns `None` when no route could be planned.
    fn follow_route(&mut self, ctx: &mut StepContext<'_>) -> SimResult<Option<Attempt>> {
        self.invalidate_stale_route(ctx.parking);
        if self.route.is_none() {
            self.plan_route(ctx);
        }

        let Some(next) = self.route.as_ref().and_then(|route| route.front().copied()) else {
            return Ok(None);
        };

        let attempt = self.enter(next, ctx)?;
        if matches!(attempt, Attempt::Moved) {
            let finished = match self.route.as_mut() {
                Some(route) => {
                    route.pop_front();
                    route.is_empty()
                }
                None => false,
            };
            if finished {
                self.route = None;
            }
        }
        Ok(Some(attempt))
    }

    fn plan_route(&mut self, ctx: &mut StepContext<'_>) {
        let radius = self.detection_radius(ctx);
        let targets: Vec<Cell> = ctx
            .parking
            .open_spots()
            .filter(|spot| radius.map_or(true, |r| spot.cell.manhattan_distance(self.position) <= r))
            .map(|spot| spot.cell)
            .collect();
        if targets.is_empty() {
            return;
        }

        match ctx.routing.shortest_path_to_any(self.position, &targets) {
            Some(found) => {
                debug!(
                    "{} routes to spot at {:?} in {} steps",
                    self.id,
                    found.target(),
                    found.length
                );
                let remaining: VecDeque<Cell> = found.path.into_iter().skip(1).collect();
                self.route = (!remaining.is_empty()).then_some(remaining);
            }
            None => debug!(
                "{}",
                SimError::NoPathToParking {
                    car: self.id,
                    from: self.position,
                }
            ),
        }
    }

    /// Try to drive into `next`
    fn enter(&mut self, next: Cell, ctx: &mut StepContext<'_>) -> SimResult<Attempt> {
        match self.assess(next, ctx) {
            Destination::Blocked(obstruction) => {
                debug!("{} at {} blocked by {:?}", self.id, self.position, obstruction);
                Ok(Attempt::Blocked(obstruction))
            }
            Destination::Parking(spot) => {
                self.relocate(next, ctx.grid)?;
                self.park(spot, ctx);
                Ok(Attempt::Parked(spot))
            }
            Destination::Clear => {
                self.relocate(next, ctx.grid)?;
                Ok(Attempt::Moved)
            }
        }
    }

    fn assess(&self, cell: Cell, ctx: &mut StepContext<'_>) -> Destination {
        if let Some(other) = ctx.grid.cars_at(cell).find(|car| *car != self.id) {
            return Destination::Blocked(Obstruction::Car(other));
        }

        let mut open_spot = None;
        for occupant in ctx.grid.contents_at(cell) {
            match *occupant {
                Occupant::TrafficLight(light) => {
                    let is_stop = ctx.lights.get(&light).is_some_and(TrafficLight::is_stop);
                    if is_stop {
                        if !self.variant.ignores_stop_light(ctx.rng) {
                            return Destination::Blocked(Obstruction::StopLight(light));
                        }
                        debug!("{} runs the stop light at {}", self.id, cell);
                    }
                }
                Occupant::Crosswalk(crosswalk) => {
                    let state = ctx
                        .crosswalks
                        .get(&crosswalk)
                        .map(|c| c.state(ctx.lights))
                        .unwrap_or(SignalState::Go);
                    if state == SignalState::Stop {
                        return Destination::Blocked(Obstruction::RedCrosswalk(crosswalk));
                    }
                }
                Occupant::ParkingSpot(spot) if ctx.parking.is_open(spot) => {
                    open_spot.get_or_insert(spot);
                }
                _ => {}
            }
        }

        match open_spot {
            Some(spot) => Destination::Parking(spot),
            None => Destination::Clear,
        }
    }

    fn relocate(&mut self, to: Cell, grid: &mut SimGrid) -> SimResult<()> {
        grid.move_to(self.id.0, to)?;
        debug!("{} moved {} -> {}", self.id, self.position, to);
        self.position = to;
        Ok(())
    }

    fn park(&mut self, spot: SpotId, ctx: &mut StepContext<'_>) {
        if !ctx.parking.occupy(spot, self.id) {
            return;
        }
        self.parked = true;
        self.parked_at = Some(spot);
        self.route = None;
        let number = ctx.parking.get(spot).map(|s| s.number).unwrap_or_default();
        info!("{} parked in spot {} at {}", self.id, number, self.position);
    }

    /// Sidestep into a parallel lane. Returns true if the car moved.
    fn change_lane(&mut self, ctx: &mut StepContext<'_>) -> SimResult<bool> {
        let streets = ctx.streets;
        let Some(current) = streets.directions_at(self.position) else {
            return Ok(false);
        };
        let travel = current.directions();

        for (offset, neighbor) in self.position.neighbors() {
            // Only sideways: never along or against the direction of travel
            if travel.iter().any(|d| *d == offset || d.opposite() == offset) {
                continue;
            }
            let Some(entry) = streets.directions_at(neighbor) else {
                continue;
            };
            if !entry.shares_direction_with(current) || ctx.grid.has_other_car(neighbor, self.id) {
                continue;
            }

            ctx.grid.move_to(self.id.0, neighbor)?;
            debug!("{} changed lane {} -> {}", self.id, self.position, neighbor);
            self.position = neighbor;
            self.route = None;
            return Ok(true);
        }

        debug!("{} found no free lane beside {}", self.id, self.position);
        Ok(false)
    }
}
