//! Minimum attack-power boost search.
//!
//! Finds the smallest attack power for one faction that lets it win
//! without losing a single unit. Candidate powers are independent full
//! simulations, scanned upward from the faction's base power.
//!
//! Once a single hit kills any enemy, raising the power further cannot
//! change the battle, so the scan stops at the largest starting health
//! among the enemy units.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CombatError, Result};
use crate::grid::Battlefield;
use crate::simulation::{CombatReport, Simulation};
use crate::unit::{AttackPowers, Faction};

/// Parameters of a boost search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostSearch {
    /// Faction that must win without casualties.
    pub faction: Faction,
    /// Starting powers; the favoured faction's entry is the first candidate.
    pub base: AttackPowers,
    /// Upper bound on the scanned power. Defaults to the one-shot power.
    pub max_power: Option<u32>,
    /// Round limit applied to every candidate run.
    pub round_limit: Option<u32>,
}

impl BoostSearch {
    /// Search for `faction` starting from default attack powers.
    #[must_use]
    pub fn new(faction: Faction) -> Self {
        Self {
            faction,
            base: AttackPowers::default(),
            max_power: None,
            round_limit: None,
        }
    }

    /// Builder method for the starting powers.
    #[must_use]
    pub const fn with_base(mut self, base: AttackPowers) -> Self {
        self.base = base;
        self
    }

    /// Builder method for the scan upper bound.
    #[must_use]
    pub const fn with_max_power(mut self, max_power: u32) -> Self {
        self.max_power = Some(max_power);
        self
    }

    /// Builder method for the per-run round limit.
    #[must_use]
    pub const fn with_round_limit(mut self, limit: u32) -> Self {
        self.round_limit = Some(limit);
        self
    }

    /// Attack powers to try, smallest first.
    pub fn candidate_powers(&self, battlefield: &Battlefield) -> Result<RangeInclusive<u32>> {
        let start = self.base.of(self.faction);
        let cap = match self.max_power {
            Some(max) => max,
            None => one_shot_power(battlefield, self.faction, self.base)?,
        };
        Ok(start..=cap.max(start))
    }
}

/// A successful boost search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostOutcome {
    /// Faction that was boosted.
    pub faction: Faction,
    /// Smallest attack power that wins without casualties.
    pub attack_power: u32,
    /// `attack_power` minus the base power.
    pub boost: u32,
    /// Result of the winning run.
    pub report: CombatReport,
}

/// Largest starting health among units opposing `faction`.
fn one_shot_power(battlefield: &Battlefield, faction: Faction, base: AttackPowers) -> Result<u32> {
    let sim = Simulation::new(battlefield, base)?;
    Ok(sim
        .units()
        .iter()
        .filter(|unit| unit.faction == faction.enemy())
        .map(|unit| unit.health.max)
        .max()
        .unwrap_or_else(|| base.of(faction)))
}

/// Run one candidate power.
///
/// Returns the report if `faction` won with no casualties. A stalemate or
/// hitting the round limit counts as a failed candidate.
pub fn evaluate_power(
    battlefield: &Battlefield,
    search: &BoostSearch,
    power: u32,
) -> Result<Option<CombatReport>> {
    let powers = search.base.with(search.faction, power);
    let mut sim = Simulation::new(battlefield, powers)?;
    if let Some(limit) = search.round_limit {
        sim = sim.with_round_limit(limit);
    }

    let report = match sim.run_without_losses(search.faction) {
        Ok(report) => report,
        Err(err @ (CombatError::Stalemate { .. } | CombatError::RoundLimitExceeded { .. })) => {
            debug!(power, error = %err, "Candidate did not finish");
            None
        }
        Err(err) => return Err(err),
    };

    let won = report.filter(|report| report.winner == Some(search.faction));
    debug!(faction = %search.faction, power, won = won.is_some(), "Evaluated attack power");
    Ok(won)
}

/// Scan attack powers upward and return the first one that wins without
/// casualties, or `None` if none in range does.
pub fn find_minimum_boost(
    battlefield: &Battlefield,
    search: &BoostSearch,
) -> Result<Option<BoostOutcome>> {
    let base = search.base.of(search.faction);

    for power in search.candidate_powers(battlefield)? {
        if let Some(report) = evaluate_power(battlefield, search, power)? {
            info!(
                faction = %search.faction,
                attack_power = power,
                boost = power - base,
                outcome = report.outcome,
                "Found minimum boost"
            );
            return Ok(Some(BoostOutcome {
                faction: search.faction,
                attack_power: power,
                boost: power - base,
                report,
            }));
        }
    }

    info!(faction = %search.faction, "No attack power wins without casualties");
    Ok(None)
}
