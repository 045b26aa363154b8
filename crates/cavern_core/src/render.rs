//! Text rendering of a battlefield in its input notation.
//!
//! Each row is followed by the units standing on it and their health:
//!
//! ```text
//! #######
//! #G....#   G(200)
//! #.E.#.#   E(197)
//! #######
//! ```

use std::fmt::{self, Write};

use crate::grid::{Cell, Grid, Position};
use crate::simulation::{CombatReport, Simulation};
use crate::unit::Unit;

/// Separator between a map row and its unit annotations.
const ANNOTATION_GAP: &str = "   ";

/// Render a grid with the given roster standing on it.
///
/// Only units whose id occupies a cell are drawn, so dead units never
/// show up.
#[must_use]
pub fn render_map(grid: &Grid, units: &[Unit]) -> String {
    let mut out = String::with_capacity((grid.width() as usize + 16) * grid.height() as usize);

    for y in 0..grid.height() {
        let mut annotations = Vec::new();

        for x in 0..grid.width() {
            let marker = match grid.cell_at(Position::new(x, y)) {
                Ok(Cell::Wall) | Err(_) => '#',
                Ok(Cell::Floor { occupant: None }) => '.',
                Ok(Cell::Floor { occupant: Some(id) }) => match units.get(id as usize) {
                    Some(unit) => {
                        annotations.push(format!(
                            "{}({})",
                            unit.faction.marker(),
                            unit.health.current
                        ));
                        unit.faction.marker()
                    }
                    None => '?',
                },
            };
            out.push(marker);
        }

        if !annotations.is_empty() {
            out.push_str(ANNOTATION_GAP);
            out.push_str(&annotations.join(", "));
        }
        if y + 1 < grid.height() {
            out.push('\n');
        }
    }

    out
}

impl fmt::Display for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_map(self.grid(), self.units()))
    }
}

/// One-line summary of a finished combat, e.g.
/// `Combat ends after 47 full rounds. Goblins win with 590 total hit points left. Outcome: 27730`.
#[must_use]
pub fn summary_line(report: &CombatReport) -> String {
    let mut line = format!("Combat ends after {} full rounds. ", report.rounds);
    match report.winner {
        Some(faction) => {
            let _ = write!(
                line,
                "{faction} win with {} total hit points left. ",
                report.remaining_health
            );
        }
        None => line.push_str("Nobody is left standing. "),
    }
    let _ = write!(line, "Outcome: {}", report.outcome);
    line
}
