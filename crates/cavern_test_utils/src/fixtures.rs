//! Test fixtures and helpers.
//!
//! Battle maps with hand-checked or well-known outcomes, for consistent
//! testing across crates.

use cavern_core::grid::Battlefield;
use cavern_core::simulation::Simulation;
use cavern_core::unit::{AttackPowers, Faction};

/// Expected result of a battle fought to the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedOutcome {
    /// Full rounds completed.
    pub rounds: u32,
    /// Sum of survivor health.
    pub remaining_health: u32,
    /// `rounds * remaining_health`.
    pub outcome: u64,
    /// Surviving faction.
    pub winner: Faction,
}

/// Expected result of the elf boost search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedBoost {
    /// Smallest elf attack power with no elf casualties.
    pub attack_power: u32,
    /// Full rounds completed at that power.
    pub rounds: u32,
    /// Sum of survivor health at that power.
    pub remaining_health: u32,
    /// `rounds * remaining_health` at that power.
    pub outcome: u64,
}

/// A sample battle and what it should produce.
#[derive(Debug, Clone, Copy)]
pub struct SampleBattle {
    /// Short label for test output.
    pub name: &'static str,
    /// Battlefield text.
    pub map: &'static str,
    /// Outcome with default attack powers.
    pub expected: ExpectedOutcome,
    /// Outcome of the elf boost search, when the sample has one.
    pub boost: Option<ExpectedBoost>,
}

/// The six well-known sample battles.
pub const SAMPLE_BATTLES: [SampleBattle; 6] = [
    SampleBattle {
        name: "mixed_melee",
        map: "#######\n\
              #.G...#\n\
              #...EG#\n\
              #.#.#G#\n\
              #..G#E#\n\
              #.....#\n\
              #######",
        expected: ExpectedOutcome {
            rounds: 47,
            remaining_health: 590,
            outcome: 27730,
            winner: Faction::Goblin,
        },
        boost: Some(ExpectedBoost {
            attack_power: 15,
            rounds: 29,
            remaining_health: 172,
            outcome: 4988,
        }),
    },
    SampleBattle {
        name: "elves_hold",
        map: "#######\n\
              #G..#E#\n\
              #E#E.E#\n\
              #G.##.#\n\
              #...#E#\n\
              #...E.#\n\
              #######",
        expected: ExpectedOutcome {
            rounds: 37,
            remaining_health: 982,
            outcome: 36334,
            winner: Faction::Elf,
        },
        boost: None,
    },
    SampleBattle {
        name: "elves_outnumber",
        map: "#######\n\
              #E..EG#\n\
              #.#G.E#\n\
              #E.##E#\n\
              #G..#.#\n\
              #..E#.#\n\
              #######",
        expected: ExpectedOutcome {
            rounds: 46,
            remaining_health: 859,
            outcome: 39514,
            winner: Faction::Elf,
        },
        boost: Some(ExpectedBoost {
            attack_power: 4,
            rounds: 33,
            remaining_health: 948,
            outcome: 31284,
        }),
    },
    SampleBattle {
        name: "goblin_column",
        map: "#######\n\
              #E.G#.#\n\
              #.#G..#\n\
              #G.#.G#\n\
              #G..#.#\n\
              #...E.#\n\
              #######",
        expected: ExpectedOutcome {
            rounds: 35,
            remaining_health: 793,
            outcome: 27755,
            winner: Faction::Goblin,
        },
        boost: Some(ExpectedBoost {
            attack_power: 15,
            rounds: 37,
            remaining_health: 94,
            outcome: 3478,
        }),
    },
    SampleBattle {
        name: "walled_pockets",
        map: "#######\n\
              #.E...#\n\
              #.#..G#\n\
              #.###.#\n\
              #E#G#G#\n\
              #...#G#\n\
              #######",
        expected: ExpectedOutcome {
            rounds: 54,
            remaining_health: 536,
            outcome: 28944,
            winner: Faction::Goblin,
        },
        boost: Some(ExpectedBoost {
            attack_power: 12,
            rounds: 39,
            remaining_health: 166,
            outcome: 6474,
        }),
    },
    SampleBattle {
        name: "large_cavern",
        map: "#########\n\
              #G......#\n\
              #.E.#...#\n\
              #..##..G#\n\
              #...##..#\n\
              #...#...#\n\
              #.G...G.#\n\
              #.....G.#\n\
              #########",
        expected: ExpectedOutcome {
            rounds: 20,
            remaining_health: 937,
            outcome: 18740,
            winner: Faction::Goblin,
        },
        boost: Some(ExpectedBoost {
            attack_power: 34,
            rounds: 30,
            remaining_health: 38,
            outcome: 1140,
        }),
    },
];

/// Two goblins flank an elf in a corridor.
pub const CORRIDOR: &str = "#######\n#G.E.G#\n#######";

/// A goblin and an elf already touching.
pub const ADJACENT: &str = "#####\n#GE.#\n#####";

/// The middle goblin dies before its turn comes up.
pub const MID_ROUND_DEATH: &str = "#########\n#.EGE..G#\n#########";

/// Only elves, so combat is over before it starts.
pub const SINGLE_FACTION: &str = "#####\n#E.E#\n#####";

/// The two factions can never meet.
pub const WALLED_OFF: &str = "#####\n#E#G#\n#####";

/// An elf with two equally close target cells.
pub const MOVEMENT: &str = "#######\n\
                            #.E...#\n\
                            #.....#\n\
                            #...G.#\n\
                            #######";

/// Parse a battlefield.
///
/// # Panics
///
/// Panics if `text` is not a valid battlefield.
#[must_use]
pub fn battlefield(text: &str) -> Battlefield {
    match Battlefield::parse(text) {
        Ok(field) => field,
        Err(err) => panic!("fixture map does not parse: {err}"),
    }
}

/// Set up a simulation with default attack powers.
///
/// # Panics
///
/// Panics if `text` is not a valid battlefield.
#[must_use]
pub fn simulation(text: &str) -> Simulation {
    simulation_with(text, AttackPowers::default())
}

/// Set up a simulation with the given attack powers.
///
/// # Panics
///
/// Panics if `text` is not a valid battlefield.
#[must_use]
pub fn simulation_with(text: &str, powers: AttackPowers) -> Simulation {
    match Simulation::new(&battlefield(text), powers) {
        Ok(sim) => sim,
        Err(err) => panic!("fixture map does not load: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_parse() {
        for sample in &SAMPLE_BATTLES {
            let field = battlefield(sample.map);
            assert!(!field.spawns.is_empty(), "{} has no units", sample.name);
        }
    }

    #[test]
    fn test_expected_outcomes_are_consistent() {
        for sample in &SAMPLE_BATTLES {
            let expected = sample.expected;
            assert_eq!(
                expected.outcome,
                u64::from(expected.rounds) * u64::from(expected.remaining_health),
                "{}",
                sample.name
            );
            if let Some(boost) = sample.boost {
                assert_eq!(
                    boost.outcome,
                    u64::from(boost.rounds) * u64::from(boost.remaining_health),
                    "{}",
                    sample.name
                );
            }
        }
    }

    #[test]
    fn test_scenario_maps_parse() {
        for map in [CORRIDOR, ADJACENT, MID_ROUND_DEATH, SINGLE_FACTION, WALLED_OFF, MOVEMENT] {
            let _ = simulation(map);
        }
    }
}
