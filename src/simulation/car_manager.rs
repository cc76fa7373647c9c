//! Car spawning and activation for the parking simulation
//!
//! Separates roster handling from the world's tick loop.

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::Rng;

use super::car::{SimCar, StepContext, StepReport};
use super::config::FleetSpec;
use super::error::{SimError, SimResult};
use super::grid::{Occupant, SimGrid};
use super::stats::SimStats;
use super::street_map::StreetDirectionMap;
use super::types::{CarId, Cell};
use super::variant::CarVariant;

/// Put a new car on the grid
///
/// The start cell must be drivable and free of other cars.
pub fn spawn_car(
    car_id: CarId,
    variant: CarVariant,
    start: Cell,
    grid: &mut SimGrid,
    streets: &StreetDirectionMap,
) -> SimResult<SimCar> {
    if !grid.in_bounds(start) {
        return Err(SimError::OutOfBounds {
            cell: start,
            width: grid.width(),
            height: grid.height(),
        });
    }
    if !streets.is_drivable(start) {
        return Err(SimError::ConfigurationInconsistent(format!(
            "{car_id} cannot start on non-drivable cell {start}"
        )));
    }
    if grid.cars_at(start).next().is_some() {
        return Err(SimError::ConfigurationInconsistent(format!(
            "{car_id} cannot start on occupied cell {start}"
        )));
    }

    grid.place(Occupant::Car(car_id), start)?;
    debug!("spawned {:?} {} at {}", variant, car_id, start);
    Ok(SimCar::new(car_id, variant, start))
}

/// Draw start cells for a randomly placed fleet
///
/// Each car takes a cell picked at random from the remaining pool. Cells that
/// already hold a car are discarded; once the pool is empty the rest of the
/// fleet is skipped.
pub fn draw_fleet_starts(fleet: &FleetSpec, grid: &SimGrid, rng: &mut StdRng) -> Vec<(CarVariant, Cell)> {
    let mut pool = fleet.start_positions.clone();
    pool.sort();
    pool.dedup();
    let mut starts = Vec::new();

    for group in &fleet.groups {
        for _ in 0..group.count {
            let start = loop {
                if pool.is_empty() {
                    break None;
                }
                let cell = pool.swap_remove(rng.random_range(0..pool.len()));
                if grid.cars_at(cell).next().is_none() {
                    break Some(cell);
                }
            };
            match start {
                Some(cell) => starts.push((group.variant, cell)),
                None => {
                    warn!("fleet start pool exhausted; skipping {:?} car", group.variant);
                }
            }
        }
    }

    starts
}

/// Activate one car, applying the stale-route rule first
pub fn update_car(car: &mut SimCar, ctx: &mut StepContext<'_>, stats: &mut SimStats) -> SimResult<StepReport> {
    if car.variant.plans_routes() && car.invalidate_stale_route(ctx.parking) {
        stats.routes_discarded += 1;
    }
    let report = car.step(ctx)?;
    stats.record(&report);
    Ok(report)
}
