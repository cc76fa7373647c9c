//! Behavioral variants of a car
//!
//! Every variant runs the same step procedure; these hooks are the only
//! places where they differ.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::types::RED_LIGHT_IGNORE_PROBABILITY;

/// Which policy a car follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarVariant {
    /// Baseline driver
    Patient,
    /// Attempts two moves per tick and angers quickly
    Fast,
    /// Moves every other tick and tolerates long waits
    Slow,
    /// Runs stop lights half the time and weaves constantly
    RuleBreaking,
    /// Plans shortest paths to open parking spots
    Routed,
}

impl CarVariant {
    /// Blocked ticks a car tolerates before it turns angry
    pub fn anger_threshold(self) -> u32 {
        match self {
            CarVariant::Fast => 2,
            CarVariant::Slow => 5,
            CarVariant::Patient | CarVariant::RuleBreaking | CarVariant::Routed => 3,
        }
    }

    /// Move attempts per activation
    pub fn base_speed(self) -> u32 {
        match self {
            CarVariant::Fast => 2,
            _ => 1,
        }
    }

    /// Mood is pinned to angry for the whole run
    pub fn always_angry(self) -> bool {
        self == CarVariant::RuleBreaking
    }

    /// Lane change attempted on every activation, not only when angry
    pub fn changes_lane_every_tick(self) -> bool {
        self == CarVariant::RuleBreaking
    }

    pub fn plans_routes(self) -> bool {
        self == CarVariant::Routed
    }

    /// Activations between move procedures
    pub fn move_interval(self) -> u32 {
        match self {
            CarVariant::Slow => 2,
            _ => 1,
        }
    }

    /// Roll whether a stop light ahead is ignored this attempt
    pub fn ignores_stop_light<R: Rng + ?Sized>(self, rng: &mut R) -> bool {
        match self {
            CarVariant::RuleBreaking => rng.random_bool(RED_LIGHT_IGNORE_PROBABILITY),
            _ => false,
        }
    }

    /// Single-letter tag for the terminal map
    pub fn glyph(self) -> char {
        match self {
            CarVariant::Patient => 'c',
            CarVariant::Fast => 'f',
            CarVariant::Slow => 's',
            CarVariant::RuleBreaking => 'x',
            CarVariant::Routed => 'r',
        }
    }
}
