//! Run statistics
//!
//! Counters accumulated by the world each tick, and the summary logged when a
//! headless run finishes.

use log::info;

use super::car::{CarUpdateResult, StepReport};

/// Cumulative counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimStats {
    pub ticks: u64,
    pub cells_moved: u64,
    pub blocked_activations: u64,
    pub lane_changes: u64,
    pub cars_parked: u64,
    pub routes_discarded: u64,
    pub no_route_events: u64,
}

impl SimStats {
    pub fn record(&mut self, report: &StepReport) {
        if report.lane_changed {
            self.lane_changes += 1;
        }
        match report.result {
            CarUpdateResult::Moved(cells) => self.cells_moved += u64::from(cells),
            CarUpdateResult::Blocked(_) => self.blocked_activations += 1,
            CarUpdateResult::Parked(_) => self.cars_parked += 1,
            CarUpdateResult::NoRouteDefined => self.no_route_events += 1,
            CarUpdateResult::Idle => {}
        }
    }

    /// Log the end-of-run summary
    pub fn log_summary(&self, total_cars: usize, total_spots: usize) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Ticks: {}", self.ticks);
        info!("Total cars: {}", total_cars);
        info!("Total cars parked: {}", self.cars_parked);
        info!("Open spots: {}", total_spots.saturating_sub(self.cars_parked as usize));
        info!("Cells moved: {}", self.cells_moved);
        info!("Blocked activations: {}", self.blocked_activations);
        info!("Lane changes: {}", self.lane_changes);
        info!("Routes discarded: {}", self.routes_discarded);
        info!(
            "Parking rate: {:.1}%",
            if total_cars > 0 {
                self.cars_parked as f32 / total_cars as f32 * 100.0
            } else {
                0.0
            }
        );
    }
}
