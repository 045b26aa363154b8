//! Melee target selection and damage resolution.
//!
//! Units only ever fight orthogonal neighbours. Target choice is a pure
//! function of the grid and the roster: weakest adjacent enemy first,
//! reading order of its position breaking health ties.

use serde::{Deserialize, Serialize};

use crate::grid::{Grid, Position};
use crate::unit::{Unit, UnitId};

/// Result of one attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOutcome {
    /// Who attacked.
    pub attacker: UnitId,
    /// Who was hit.
    pub target: UnitId,
    /// Health actually removed.
    pub damage: u32,
    /// Target health after the hit.
    pub remaining: u32,
    /// Whether the hit was lethal.
    pub killed: bool,
}

/// Living enemies standing next to `unit`, in reading order.
pub fn adjacent_enemies<'a>(
    grid: &'a Grid,
    units: &'a [Unit],
    unit: &'a Unit,
) -> impl Iterator<Item = &'a Unit> + 'a {
    grid.neighbors(unit.position)
        .filter_map(move |pos| grid.occupant(pos))
        .filter_map(move |id| units.get(id as usize))
        .filter(move |other| other.is_alive() && other.is_enemy_of(unit))
}

/// Whether `unit` can attack without moving.
#[must_use]
pub fn has_adjacent_enemy(grid: &Grid, units: &[Unit], unit: &Unit) -> bool {
    adjacent_enemies(grid, units, unit).next().is_some()
}

/// Pick the adjacent enemy to attack: lowest health, then reading order.
#[must_use]
pub fn select_target(grid: &Grid, units: &[Unit], attacker: &Unit) -> Option<UnitId> {
    adjacent_enemies(grid, units, attacker)
        .min_by_key(|enemy| (enemy.health.current, enemy.position))
        .map(|enemy| enemy.id)
}

/// Apply one hit from `attacker` to `target`.
///
/// Removing a killed unit from the grid is left to the caller, which owns
/// both the grid and the roster.
pub fn resolve_attack(attacker: &Unit, target: &mut Unit) -> AttackOutcome {
    let damage = target.health.apply_damage(attacker.attack_power);
    AttackOutcome {
        attacker: attacker.id,
        target: target.id,
        damage,
        remaining: target.health.current,
        killed: !target.is_alive(),
    }
}

/// Empty floor cells next to any living unit of the opposing faction,
/// sorted in reading order and without duplicates.
#[must_use]
pub fn cells_in_range_of_enemies(grid: &Grid, units: &[Unit], unit: &Unit) -> Vec<Position> {
    let mut cells: Vec<Position> = units
        .iter()
        .filter(|other| other.is_alive() && other.is_enemy_of(unit))
        .flat_map(|enemy| grid.neighbors(enemy.position))
        .filter(|&pos| grid.is_occupiable(pos))
        .collect();
    cells.sort_unstable();
    cells.dedup();
    cells
}
