//! Round-based combat loop.
//!
//! Each round, every living unit takes one turn in the reading order of
//! its position at the start of the round. A turn is:
//!
//! 1. skip if the unit died earlier this round;
//! 2. end combat if no enemies are left;
//! 3. unless already next to an enemy, take one step towards the nearest
//!    reachable cell in range of an enemy;
//! 4. attack the weakest adjacent enemy, if any.
//!
//! Deaths take effect immediately: the dead unit's cell is freed and it
//! will not act later in the same round.
//!
//! # Round counting
//!
//! A round counts once every unit in its turn order has acted or been
//! skipped. When a unit finds no enemies at the start of its turn, the
//! round in progress is not counted.
//!
//! # Example
//!
//! ```
//! use cavern_core::simulation::Simulation;
//! use cavern_core::unit::{AttackPowers, Faction};
//!
//! let text = "#######\n#G.E.G#\n#######";
//! let mut sim = Simulation::parse(text, AttackPowers::new(200, 3))?;
//!
//! let report = sim.run()?;
//! assert_eq!(report.winner, Some(Faction::Elf));
//! assert_eq!(report.rounds, 2);
//! assert_eq!(report.remaining_health, 194);
//! assert_eq!(report.outcome, 388);
//! # Ok::<(), cavern_core::error::CombatError>(())
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::combat::{self, AttackOutcome};
use crate::error::{CombatError, Result};
use crate::grid::{Battlefield, Cell, Grid, Position};
use crate::pathfinding::{self, steps};
use crate::unit::{AttackPowers, Faction, Unit, UnitId};

/// Something that happened during a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// A unit stepped to an adjacent cell.
    Moved {
        /// Who moved.
        unit: UnitId,
        /// Cell left.
        from: Position,
        /// Cell entered.
        to: Position,
    },
    /// A unit hit an adjacent enemy.
    Attacked(AttackOutcome),
    /// A unit's health reached zero and it left the battlefield.
    Died {
        /// Who died.
        unit: UnitId,
        /// Side it fought for.
        faction: Faction,
        /// Cell it was freed from.
        position: Position,
    },
}

/// Everything that happened during one call to [`Simulation::round`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundEvents {
    /// One-based number of the round that was played.
    pub round: u32,
    /// Moves, attacks and deaths in the order they happened.
    pub events: Vec<CombatEvent>,
    /// Set when a unit found no enemies; the round was not counted.
    pub combat_ended: bool,
}

/// How a single turn went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnOutcome {
    /// The unit died before its turn came up.
    Skipped,
    /// The unit moved and/or attacked, or had nothing to do.
    Acted,
    /// The unit found no enemies left.
    CombatOver,
}

/// Units lost per faction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Casualties {
    /// Elves killed.
    pub elves: u32,
    /// Goblins killed.
    pub goblins: u32,
}

impl Casualties {
    /// Units lost by `faction`.
    #[must_use]
    pub const fn of(&self, faction: Faction) -> u32 {
        match faction {
            Faction::Elf => self.elves,
            Faction::Goblin => self.goblins,
        }
    }

    fn record(&mut self, faction: Faction) {
        match faction {
            Faction::Elf => self.elves += 1,
            Faction::Goblin => self.goblins += 1,
        }
    }
}

/// Summary of a finished (or interrupted) combat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatReport {
    /// Fully completed rounds.
    pub rounds: u32,
    /// Surviving faction, once combat has ended with units left.
    pub winner: Option<Faction>,
    /// Sum of survivor health.
    pub remaining_health: u32,
    /// `rounds * remaining_health`.
    pub outcome: u64,
    /// Number of living units.
    pub survivors: usize,
    /// Units lost per faction.
    pub casualties: Casualties,
    /// Attack powers the combat was fought with.
    pub attack_powers: AttackPowers,
}

/// A combat in progress.
///
/// Owns the grid and the unit roster. Dead units stay in the roster with
/// zero health so that [`UnitId`]s remain valid indices; only living units
/// occupy grid cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simulation {
    grid: Grid,
    units: Vec<Unit>,
    attack_powers: AttackPowers,
    rounds: u32,
    casualties: Casualties,
    finished: bool,
    round_limit: Option<u32>,
}

impl Simulation {
    /// Set up a combat on a parsed battlefield.
    ///
    /// Units are numbered in reading order of their starting cells.
    pub fn new(battlefield: &Battlefield, attack_powers: AttackPowers) -> Result<Self> {
        let mut grid = battlefield.grid.clone();
        let mut units = Vec::with_capacity(battlefield.spawns.len());

        for (index, spawn) in battlefield.spawns.iter().enumerate() {
            let id = index as UnitId;
            grid.place(spawn.position, id)?;
            units.push(Unit::new(
                id,
                spawn.faction,
                spawn.position,
                attack_powers.of(spawn.faction),
            ));
        }

        debug!(
            width = grid.width(),
            height = grid.height(),
            units = units.len(),
            elf_attack = attack_powers.elf,
            goblin_attack = attack_powers.goblin,
            "Simulation created"
        );

        Ok(Self {
            grid,
            units,
            attack_powers,
            rounds: 0,
            casualties: Casualties::default(),
            finished: false,
            round_limit: None,
        })
    }

    /// Parse battlefield text and set up a combat on it.
    pub fn parse(text: &str, attack_powers: AttackPowers) -> Result<Self> {
        Self::new(&Battlefield::parse(text)?, attack_powers)
    }

    /// Builder method capping how many full rounds [`run`](Self::run) may
    /// play. A battle that ends after exactly `limit` full rounds still wins.
    #[must_use]
    pub fn with_round_limit(mut self, limit: u32) -> Self {
        self.round_limit = Some(limit);
        self
    }

    /// The battlefield grid with current occupancy.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// All units ever placed, including the dead.
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Get a unit by ID.
    pub fn unit(&self, id: UnitId) -> Result<&Unit> {
        self.units
            .get(id as usize)
            .ok_or(CombatError::InvalidUnitId(id))
    }

    /// Living units in roster order.
    pub fn living_units(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.units.iter().filter(|unit| unit.is_alive())
    }

    /// Number of fully completed rounds.
    #[must_use]
    pub const fn completed_rounds(&self) -> u32 {
        self.rounds
    }

    /// Units lost so far, per faction.
    #[must_use]
    pub const fn casualties(&self) -> Casualties {
        self.casualties
    }

    /// Attack powers in use.
    #[must_use]
    pub const fn attack_powers(&self) -> AttackPowers {
        self.attack_powers
    }

    /// Whether combat has ended.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// The surviving faction once combat has ended.
    #[must_use]
    pub fn winner(&self) -> Option<Faction> {
        if !self.finished {
            return None;
        }
        let mut living = self.living_units();
        let faction = living.next()?.faction;
        living.all(|unit| unit.faction == faction).then_some(faction)
    }

    /// Sum of health over living units.
    #[must_use]
    pub fn remaining_health(&self) -> u32 {
        self.living_units().map(|unit| unit.health.current).sum()
    }

    /// Turn order for a round starting now: living units in reading order
    /// of their cells.
    #[must_use]
    pub fn turn_order(&self) -> Vec<UnitId> {
        self.grid.occupied().map(|(_, id)| id).collect()
    }

    /// Play one round.
    ///
    /// The turn order is fixed when the round starts; units that move
    /// earlier in reading order keep their slot. Calling this after combat
    /// has ended changes nothing and reports `combat_ended`.
    pub fn round(&mut self) -> Result<RoundEvents> {
        self.play_round(None)
    }

    /// Play one round, stopping right after the turn in which `guard`
    /// loses a unit. A round cut short this way is not counted.
    fn play_round(&mut self, guard: Option<Faction>) -> Result<RoundEvents> {
        let mut events = RoundEvents {
            round: self.rounds + 1,
            ..RoundEvents::default()
        };

        if self.finished {
            events.combat_ended = true;
            return Ok(events);
        }

        let order = self.turn_order();
        if order.is_empty() {
            self.finish();
            events.combat_ended = true;
            return Ok(events);
        }

        for id in order {
            let outcome = self.take_turn(id, &mut events.events)?;

            #[cfg(feature = "debug-validation")]
            self.check_invariants()?;

            if outcome == TurnOutcome::CombatOver {
                self.finish();
                events.combat_ended = true;
                return Ok(events);
            }

            if guard.is_some_and(|faction| self.casualties.of(faction) > 0) {
                return Ok(events);
            }
        }

        self.rounds += 1;
        debug!(
            round = self.rounds,
            events = events.events.len(),
            survivors = self.living_units().count(),
            "Round complete"
        );

        Ok(events)
    }

    fn finish(&mut self) {
        self.finished = true;
        info!(
            rounds = self.rounds,
            winner = ?self.winner(),
            remaining_health = self.remaining_health(),
            outcome = u64::from(self.rounds) * u64::from(self.remaining_health()),
            "Combat over"
        );
    }

    /// Resolve one unit's turn: check alive, look for enemies, move, attack.
    fn take_turn(&mut self, id: UnitId, events: &mut Vec<CombatEvent>) -> Result<TurnOutcome> {
        let index = id as usize;
        let unit = self.unit(id)?;

        if !unit.is_alive() {
            debug!(unit = id, "Dead before its turn");
            return Ok(TurnOutcome::Skipped);
        }

        let faction = unit.faction;
        let enemies_left = self
            .living_units()
            .any(|other| other.faction != faction);
        if !enemies_left {
            debug!(unit = id, faction = %faction, "No enemies left");
            return Ok(TurnOutcome::CombatOver);
        }

        if !combat::has_adjacent_enemy(&self.grid, &self.units, unit) {
            if let Some(step) = self.choose_step(unit) {
                let from = unit.position;
                self.grid.move_occupant(from, step)?;
                self.units[index].position = step;
                debug!(unit = id, from = %from, to = %step, "Moved");
                events.push(CombatEvent::Moved {
                    unit: id,
                    from,
                    to: step,
                });
            }
        }

        let attacker = self.units[index].clone();
        if let Some(target_id) = combat::select_target(&self.grid, &self.units, &attacker) {
            let target = &mut self.units[target_id as usize];
            let hit = combat::resolve_attack(&attacker, target);
            debug!(
                attacker = hit.attacker,
                target = hit.target,
                damage = hit.damage,
                remaining = hit.remaining,
                "Attacked"
            );
            events.push(CombatEvent::Attacked(hit));

            if hit.killed {
                let position = target.position;
                let faction = target.faction;
                self.grid.vacate(position)?;
                self.casualties.record(faction);
                debug!(unit = target_id, faction = %faction, position = %position, "Died");
                events.push(CombatEvent::Died {
                    unit: target_id,
                    faction,
                    position,
                });
            }
        }

        Ok(TurnOutcome::Acted)
    }

    /// Pick the first step towards the closest reachable cell in range of an
    /// enemy. Ties on distance go to the cell first in reading order.
    fn choose_step(&self, unit: &Unit) -> Option<Position> {
        let candidates = combat::cells_in_range_of_enemies(&self.grid, &self.units, unit);

        let mut best: Option<(usize, Position)> = None;
        for candidate in candidates {
            // Candidates come in reading order, so only a strictly shorter
            // path can displace the current best.
            if let Some((best_steps, _)) = best {
                if unit.position.manhattan(candidate) as usize >= best_steps {
                    continue;
                }
            }
            if let Some(path) = pathfinding::shortest_path(&self.grid, unit.position, candidate) {
                let length = steps(&path);
                if best.map_or(true, |(best_steps, _)| length < best_steps) {
                    best = Some((length, candidate));
                }
            }
        }

        let Some((distance, target)) = best else {
            debug!(unit = unit.id, "No reachable target cell");
            return None;
        };

        let path = pathfinding::best_path(&self.grid, unit.position, target)?;
        debug!(unit = unit.id, target = %target, distance, "Chose target cell");
        path.get(1).copied()
    }

    /// Run until one faction is left.
    ///
    /// # Errors
    ///
    /// [`CombatError::Stalemate`] if a round passes with no moves and no
    /// attacks while both factions stand, and
    /// [`CombatError::RoundLimitExceeded`] if a round limit is set and the
    /// battle is still going after more than that many full rounds.
    pub fn run(&mut self) -> Result<CombatReport> {
        self.run_guarded(None)
            .map(|report| report.unwrap_or_else(|| self.report()))
    }

    /// Run until one faction is left, giving up as soon as `faction` loses
    /// a unit.
    ///
    /// Returns `Ok(None)` when the run was abandoned.
    pub fn run_without_losses(&mut self, faction: Faction) -> Result<Option<CombatReport>> {
        self.run_guarded(Some(faction))
    }

    fn run_guarded(&mut self, guard: Option<Faction>) -> Result<Option<CombatReport>> {
        loop {
            let events = self.play_round(guard)?;

            if let Some(faction) = guard {
                if self.casualties.of(faction) > 0 {
                    debug!(faction = %faction, round = events.round, "Guarded faction lost a unit");
                    return Ok(None);
                }
            }

            if events.combat_ended {
                return Ok(Some(self.report()));
            }

            if events.events.is_empty() {
                return Err(CombatError::Stalemate {
                    rounds: self.rounds,
                });
            }

            // A battle lasting exactly `limit` rounds ends during the next one.
            if let Some(limit) = self.round_limit {
                if self.rounds > limit {
                    return Err(CombatError::RoundLimitExceeded { limit });
                }
            }
        }
    }

    /// Summarise the current state.
    #[must_use]
    pub fn report(&self) -> CombatReport {
        let remaining_health = self.remaining_health();
        CombatReport {
            rounds: self.rounds,
            winner: self.winner(),
            remaining_health,
            outcome: u64::from(self.rounds) * u64::from(remaining_health),
            survivors: self.living_units().count(),
            casualties: self.casualties,
            attack_powers: self.attack_powers,
        }
    }

    /// Verify that grid occupancy and the roster agree: every living unit
    /// occupies exactly its own cell and every occupant is a living unit
    /// standing there.
    pub fn check_invariants(&self) -> Result<()> {
        for (pos, id) in self.grid.occupied() {
            let unit = self.unit(id)?;
            if !unit.is_alive() {
                return Err(CombatError::InvalidState(format!(
                    "dead unit {id} still occupies {pos}"
                )));
            }
            if unit.position != pos {
                return Err(CombatError::InvalidState(format!(
                    "unit {id} occupies {pos} but thinks it is at {}",
                    unit.position
                )));
            }
        }

        for unit in self.living_units() {
            match self.grid.cell_at(unit.position)? {
                Cell::Floor { occupant: Some(id) } if id == unit.id => {}
                cell => {
                    return Err(CombatError::InvalidState(format!(
                        "living unit {} is missing from {} (found {cell:?})",
                        unit.id, unit.position
                    )));
                }
            }
        }

        Ok(())
    }

    /// Calculate a hash of the current combat state.
    ///
    /// Two simulations with identical state produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.rounds.hash(&mut hasher);
        self.finished.hash(&mut hasher);
        self.units.len().hash(&mut hasher);

        for unit in &self.units {
            unit.id.hash(&mut hasher);
            unit.faction.hash(&mut hasher);
            unit.position.hash(&mut hasher);
            unit.health.current.hash(&mut hasher);
        }

        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: u32, y: u32) -> Position {
        Position::new(x, y)
    }

    fn moves(events: &RoundEvents) -> usize {
        events
            .events
            .iter()
            .filter(|event| matches!(event, CombatEvent::Moved { .. }))
            .count()
    }

    fn attacks(events: &RoundEvents) -> usize {
        events
            .events
            .iter()
            .filter(|event| matches!(event, CombatEvent::Attacked(_)))
            .count()
    }

    #[test]
    fn test_simulation_new() {
        let sim = Simulation::parse("#####\n#E.G#\n#####", AttackPowers::new(5, 7)).unwrap();
        assert_eq!(sim.completed_rounds(), 0);
        assert!(!sim.is_finished());
        assert_eq!(sim.units().len(), 2);
        assert_eq!(sim.unit(0).unwrap().attack_power, 5);
        assert_eq!(sim.unit(1).unwrap().attack_power, 7);
        assert_eq!(sim.grid().occupant(pos(3, 1)), Some(1));
        assert!(sim.unit(2).is_err());
        sim.check_invariants().unwrap();
    }

    #[test]
    fn test_turn_order_is_reading_order() {
        let sim = Simulation::parse(
            "#######\n\
             #.G.E.#\n\
             #E.G.E#\n\
             #.G.E.#\n\
             #######",
            AttackPowers::default(),
        )
        .unwrap();
        let order: Vec<_> = sim
            .turn_order()
            .into_iter()
            .map(|id| sim.unit(id).unwrap().position)
            .collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);
        assert_eq!(order.len(), 7);
    }

    #[test]
    fn test_corridor_one_hit_kills() {
        let mut sim =
            Simulation::parse("#######\n#G.E.G#\n#######", AttackPowers::new(200, 3)).unwrap();

        let first = sim.round().unwrap();
        assert!(!first.combat_ended);
        assert_eq!(moves(&first), 2);
        assert_eq!(sim.casualties().goblins, 1);
        assert_eq!(sim.unit(2).unwrap().position, pos(4, 1));

        let report = sim.run().unwrap();
        assert_eq!(report.rounds, 2);
        assert_eq!(report.winner, Some(Faction::Elf));
        assert_eq!(report.remaining_health, 194);
        assert_eq!(report.outcome, 388);
        assert_eq!(report.casualties.goblins, 2);

        let elf = sim.living_units().next().unwrap();
        assert_eq!(elf.position, pos(3, 1));
    }

    #[test]
    fn test_adjacent_units_attack_without_moving() {
        let mut sim = Simulation::parse("#####\n#GE.#\n#####", AttackPowers::default()).unwrap();
        let events = sim.round().unwrap();

        assert_eq!(moves(&events), 0);
        assert_eq!(attacks(&events), 2);
        assert_eq!(sim.unit(0).unwrap().health.current, 197);
        assert_eq!(sim.unit(1).unwrap().health.current, 197);
        assert_eq!(sim.unit(0).unwrap().position, pos(1, 1));
    }

    #[test]
    fn test_dead_unit_skips_turn_and_others_retarget() {
        let mut sim =
            Simulation::parse("#########\n#.EGE..G#\n#########", AttackPowers::new(200, 3))
                .unwrap();
        let events = sim.round().unwrap();
        assert!(!events.combat_ended);
        assert_eq!(sim.completed_rounds(), 1);

        // The goblin between the elves died before its own turn
        assert!(!sim.unit(1).unwrap().is_alive());
        assert_eq!(sim.grid().occupant(pos(3, 1)), None);

        // The right elf lost its neighbour and walked towards the far goblin
        assert_eq!(sim.unit(2).unwrap().position, pos(5, 1));
        assert_eq!(sim.unit(3).unwrap().position, pos(6, 1));
        assert_eq!(sim.unit(2).unwrap().health.current, 197);
        assert_eq!(sim.unit(0).unwrap().position, pos(2, 1));
        sim.check_invariants().unwrap();
    }

    #[test]
    fn test_combat_ends_mid_round() {
        let mut sim =
            Simulation::parse("#######\n#.EGE.#\n#######", AttackPowers::new(200, 3)).unwrap();
        let events = sim.round().unwrap();

        assert!(events.combat_ended);
        assert!(sim.is_finished());
        // The second elf found nobody left, so the round does not count
        assert_eq!(sim.completed_rounds(), 0);
        assert_eq!(sim.winner(), Some(Faction::Elf));
        assert_eq!(sim.report().outcome, 0);
    }

    #[test]
    fn test_single_faction_ends_immediately() {
        let mut sim = Simulation::parse("#####\n#E.E#\n#####", AttackPowers::default()).unwrap();
        let report = sim.run().unwrap();
        assert_eq!(report.rounds, 0);
        assert_eq!(report.winner, Some(Faction::Elf));
        assert_eq!(report.remaining_health, 400);
    }

    #[test]
    fn test_empty_battlefield_has_no_winner() {
        let mut sim = Simulation::parse("###\n#.#\n###", AttackPowers::default()).unwrap();
        let report = sim.run().unwrap();
        assert_eq!(report.rounds, 0);
        assert_eq!(report.winner, None);
        assert_eq!(report.survivors, 0);
    }

    #[test]
    fn test_round_after_finish_is_noop() {
        let mut sim = Simulation::parse("#####\n#E.E#\n#####", AttackPowers::default()).unwrap();
        sim.run().unwrap();
        let hash = sim.state_hash();
        let events = sim.round().unwrap();
        assert!(events.combat_ended);
        assert!(events.events.is_empty());
        assert_eq!(sim.state_hash(), hash);
    }

    #[test]
    fn test_walled_off_factions_stalemate() {
        let mut sim = Simulation::parse("#####\n#E#G#\n#####", AttackPowers::default()).unwrap();
        assert_eq!(sim.run(), Err(CombatError::Stalemate { rounds: 1 }));
    }

    #[test]
    fn test_round_limit() {
        let mut sim = Simulation::parse("#######\n#G.E.G#\n#######", AttackPowers::new(200, 3))
            .unwrap()
            .with_round_limit(1);
        assert_eq!(sim.run(), Err(CombatError::RoundLimitExceeded { limit: 1 }));
        assert_eq!(sim.completed_rounds(), 2);
    }

    #[test]
    fn test_battle_ending_at_round_limit() {
        let mut sim = Simulation::parse("#######\n#G.E.G#\n#######", AttackPowers::new(200, 3))
            .unwrap()
            .with_round_limit(2);
        let report = sim.run().unwrap();
        assert_eq!(report.rounds, 2);
        assert_eq!(report.winner, Some(Faction::Elf));
        assert_eq!(report.outcome, 388);
    }

    #[test]
    fn test_guard_stops_mid_round() {
        // Both elves are next to a goblin; the first elf dies on the
        // opening turn, so the later goblin never gets to act.
        let mut sim = Simulation::parse("######\n#GEGE#\n######", AttackPowers::new(3, 200))
            .unwrap();
        assert_eq!(sim.run_without_losses(Faction::Elf), Ok(None));
        assert_eq!(sim.casualties().elves, 1);
        assert_eq!(sim.completed_rounds(), 0);
        assert_eq!(sim.unit(2).unwrap().health.current, 200);
        assert_eq!(sim.living_units().count(), 3);
    }

    #[test]
    fn test_run_without_losses() {
        let text = "####\n#EG#\n####";

        let mut weak = Simulation::parse(text, AttackPowers::new(3, 4)).unwrap();
        assert_eq!(weak.run_without_losses(Faction::Elf), Ok(None));
        assert_eq!(weak.casualties().elves, 1);

        let mut strong = Simulation::parse(text, AttackPowers::new(200, 4)).unwrap();
        let report = strong.run_without_losses(Faction::Elf).unwrap().unwrap();
        assert_eq!(report.rounds, 1);
        assert_eq!(report.remaining_health, 200);
        assert_eq!(report.winner, Some(Faction::Elf));
    }

    #[test]
    fn test_deterministic_hash() {
        let text = "#######\n#.G...#\n#...EG#\n#.#.#G#\n#..G#E#\n#.....#\n#######";
        let mut sim1 = Simulation::parse(text, AttackPowers::default()).unwrap();
        let mut sim2 = Simulation::parse(text, AttackPowers::default()).unwrap();
        assert_eq!(sim1.state_hash(), sim2.state_hash());

        for _ in 0..10 {
            sim1.round().unwrap();
            sim2.round().unwrap();
            assert_eq!(sim1.state_hash(), sim2.state_hash());
        }
    }

    #[test]
    fn test_check_invariants_detects_drift() {
        let mut sim = Simulation::parse("#####\n#E.G#\n#####", AttackPowers::default()).unwrap();
        sim.units[0].position = pos(2, 1);
        assert!(matches!(
            sim.check_invariants(),
            Err(CombatError::InvalidState(_))
        ));
    }
}
