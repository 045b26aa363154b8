//! Error types for the combat simulation.

use thiserror::Error;

use crate::unit::UnitId;

/// Result type alias using [`CombatError`].
pub type Result<T> = std::result::Result<T, CombatError>;

/// Reasons a battlefield description can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedGrid {
    /// The input contained no rows.
    #[error("battlefield has no rows")]
    Empty,

    /// A row does not match the width of the first row.
    #[error("row {row} is {found} cells wide, expected {expected}")]
    Ragged {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },

    /// A character outside the battlefield vocabulary.
    #[error("unknown marker {marker:?} at ({x}, {y})")]
    UnknownMarker {
        /// The offending character.
        marker: char,
        /// Column of the character.
        x: usize,
        /// Row of the character.
        y: usize,
    },
}

/// Top-level error type for all combat simulation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    /// The battlefield text could not be parsed.
    #[error("Malformed battlefield: {0}")]
    MalformedGrid(#[from] MalformedGrid),

    /// A coordinate query fell outside the grid.
    #[error("Position ({x}, {y}) is outside the {width}x{height} battlefield")]
    OutOfBounds {
        /// Column queried.
        x: u32,
        /// Row queried.
        y: u32,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },

    /// Invalid unit identifier.
    #[error("Invalid unit ID: {0}")]
    InvalidUnitId(UnitId),

    /// Grid occupancy and the unit roster disagree.
    #[error("Invalid battle state: {0}")]
    InvalidState(String),

    /// A full round passed with nobody moving or attacking.
    #[error("Combat stalled after {rounds} rounds with both factions alive")]
    Stalemate {
        /// Rounds completed before the stall was detected.
        rounds: u32,
    },

    /// The configured round limit was reached before combat ended.
    #[error("Combat did not end within {limit} rounds")]
    RoundLimitExceeded {
        /// The configured limit.
        limit: u32,
    },
}
