//! Simulation error type.
//!
//! `OutOfBounds` and `ConfigurationInconsistent` are fatal. `NoRouteDefined`
//! and `NoPathToParking` are recoverable: cars log them and carry on.

use thiserror::Error;

use super::types::{Cell, CarId, SimId};

/// Errors produced by the simulation core.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("cell {cell} is outside the {width}x{height} grid")]
    OutOfBounds { cell: Cell, width: u32, height: u32 },

    #[error("{car} at {cell} has no street direction defined")]
    NoRouteDefined { car: CarId, cell: Cell },

    #[error("{car} at {from} found no path to an open parking spot")]
    NoPathToParking { car: CarId, from: Cell },

    #[error("inconsistent configuration: {0}")]
    ConfigurationInconsistent(String),

    #[error("entity {0} is not on the grid")]
    UnknownEntity(SimId),

    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Shorthand result type for the simulation core.
pub type SimResult<T> = Result<T, SimError>;
