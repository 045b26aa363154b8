//! # Cavern Core
//!
//! Deterministic simulation of a turn-based melee battle between elves and
//! goblins on a walled grid.
//!
//! This crate contains **only** deterministic logic:
//! - No IO
//! - No randomness
//! - No threads
//!
//! Every tie (turn order, movement target, first step, attack target) is
//! broken by reading order, so a battlefield and a pair of attack powers
//! fully determine the outcome.
//!
//! ## Crate Structure
//!
//! - [`grid`] - Positions, cells and battlefield parsing
//! - [`unit`] - Factions, health and attack powers
//! - [`pathfinding`] - A* shortest paths with reading-order tie-breaks
//! - [`combat`] - Target selection and damage
//! - [`simulation`] - Turn order, turns and the round loop
//! - [`boost`] - Minimum attack boost for a flawless win
//! - [`render`] - Text rendering of a battle

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod boost;
pub mod combat;
pub mod error;
pub mod grid;
pub mod pathfinding;
pub mod render;
pub mod simulation;
pub mod unit;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::boost::{find_minimum_boost, BoostOutcome, BoostSearch};
    pub use crate::error::{CombatError, MalformedGrid, Result};
    pub use crate::grid::{Battlefield, Cell, Grid, Position};
    pub use crate::simulation::{CombatEvent, CombatReport, RoundEvents, Simulation};
    pub use crate::unit::{AttackPowers, Faction, Unit, UnitId};
}
