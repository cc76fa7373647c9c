//! Parking Simulation Library
//!
//! A discrete-time grid simulation of cars looking for parking in a small
//! city block, with traffic lights, crosswalks and several driver behaviors.

pub mod simulation;
