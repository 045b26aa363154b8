//! End-to-end battles for cavern_core.
//!
//! Sample battles with known outcomes, plus hand-traced scenarios for the
//! turn rules that are easy to get subtly wrong.

use cavern_core::boost::{find_minimum_boost, BoostSearch};
use cavern_core::error::{CombatError, MalformedGrid};
use cavern_core::grid::{Battlefield, Position};
use cavern_core::simulation::{CombatEvent, Simulation};
use cavern_core::unit::{AttackPowers, Faction};
use cavern_test_utils::fixtures::{
    battlefield, simulation, simulation_with, ADJACENT, CORRIDOR, MID_ROUND_DEATH, MOVEMENT,
    SAMPLE_BATTLES, SINGLE_FACTION, WALLED_OFF,
};

// =============================================================================
// Sample battles
// =============================================================================

mod samples {
    use super::*;

    #[test]
    fn test_sample_outcomes() {
        for sample in &SAMPLE_BATTLES {
            let report = simulation(sample.map).run().unwrap();
            let expected = sample.expected;

            assert_eq!(report.rounds, expected.rounds, "{}: rounds", sample.name);
            assert_eq!(
                report.remaining_health, expected.remaining_health,
                "{}: remaining health",
                sample.name
            );
            assert_eq!(report.outcome, expected.outcome, "{}: outcome", sample.name);
            assert_eq!(report.winner, Some(expected.winner), "{}: winner", sample.name);
        }
    }

    #[test]
    fn test_sample_minimum_boosts() {
        let boosted = SAMPLE_BATTLES
            .iter()
            .filter_map(|sample| sample.boost.map(|expected| (sample, expected)));
        for (sample, expected) in boosted {
            let outcome = find_minimum_boost(&battlefield(sample.map), &BoostSearch::new(Faction::Elf))
                .unwrap()
                .unwrap_or_else(|| panic!("{}: no boost found", sample.name));

            assert_eq!(outcome.attack_power, expected.attack_power, "{}: power", sample.name);
            assert_eq!(outcome.boost, expected.attack_power - 3, "{}: boost", sample.name);
            assert_eq!(outcome.report.rounds, expected.rounds, "{}: rounds", sample.name);
            assert_eq!(
                outcome.report.remaining_health, expected.remaining_health,
                "{}: remaining health",
                sample.name
            );
            assert_eq!(outcome.report.outcome, expected.outcome, "{}: outcome", sample.name);
            assert_eq!(outcome.report.casualties.elves, 0, "{}: casualties", sample.name);
        }
    }

    #[test]
    fn test_first_sample_opening_rounds() {
        let mut sim = simulation(SAMPLE_BATTLES[0].map);

        sim.round().unwrap();
        assert_eq!(
            sim.to_string(),
            "#######\n\
             #..G..#   G(200)\n\
             #...EG#   E(197), G(197)\n\
             #.#G#G#   G(200), G(197)\n\
             #...#E#   E(197)\n\
             #.....#\n\
             #######"
        );

        sim.round().unwrap();
        assert_eq!(
            sim.to_string(),
            "#######\n\
             #...G.#   G(200)\n\
             #..GEG#   G(200), E(188), G(194)\n\
             #.#.#G#   G(194)\n\
             #...#E#   E(194)\n\
             #.....#\n\
             #######"
        );
    }

    #[test]
    fn test_casualties_match_survivors() {
        for sample in &SAMPLE_BATTLES {
            let mut sim = simulation(sample.map);
            let starting = sim.units().len();
            let report = sim.run().unwrap();
            let lost = report.casualties.elves + report.casualties.goblins;
            assert_eq!(starting, report.survivors + lost as usize, "{}", sample.name);
        }
    }
}

// =============================================================================
// Turn rules
// =============================================================================

mod turns {
    use super::*;

    #[test]
    fn test_movement_prefers_reading_order_target() {
        let mut sim = simulation(MOVEMENT);
        let events = sim.round().unwrap();

        assert_eq!(
            events.events.first(),
            Some(&CombatEvent::Moved {
                unit: 0,
                from: Position::new(2, 1),
                to: Position::new(3, 1),
            })
        );
    }

    #[test]
    fn test_adjacent_units_do_not_move() {
        let mut sim = simulation(ADJACENT);
        let events = sim.round().unwrap();
        assert!(events
            .events
            .iter()
            .all(|event| matches!(event, CombatEvent::Attacked(_))));
        assert_eq!(events.events.len(), 2);
    }

    #[test]
    fn test_each_unit_acts_once_per_round() {
        let mut sim = simulation(SAMPLE_BATTLES[0].map);

        for _ in 0..20 {
            let order = sim.turn_order();
            let events = sim.round().unwrap();

            for id in order {
                let moves = events
                    .events
                    .iter()
                    .filter(|event| matches!(event, CombatEvent::Moved { unit, .. } if *unit == id))
                    .count();
                let attacks = events
                    .events
                    .iter()
                    .filter(|event| matches!(event, CombatEvent::Attacked(hit) if hit.attacker == id))
                    .count();
                assert!(moves <= 1, "unit {id} moved {moves} times");
                assert!(attacks <= 1, "unit {id} attacked {attacks} times");
            }
        }
    }

    #[test]
    fn test_mid_round_death_is_immediate() {
        let mut sim = simulation_with(MID_ROUND_DEATH, AttackPowers::new(200, 3));
        let events = sim.round().unwrap();

        let died_at = events
            .events
            .iter()
            .position(|event| matches!(event, CombatEvent::Died { unit: 1, .. }))
            .unwrap();
        // Nothing after the death involves the dead goblin
        for event in &events.events[died_at + 1..] {
            match event {
                CombatEvent::Moved { unit, .. } => assert_ne!(*unit, 1),
                CombatEvent::Attacked(hit) => {
                    assert_ne!(hit.attacker, 1);
                    assert_ne!(hit.target, 1);
                }
                CombatEvent::Died { unit, .. } => assert_ne!(*unit, 1),
            }
        }
        assert_eq!(sim.grid().occupant(Position::new(3, 1)), None);
    }

    #[test]
    fn test_corridor_battle() {
        let report = simulation_with(CORRIDOR, AttackPowers::new(200, 3)).run().unwrap();
        assert_eq!(report.rounds, 2);
        assert_eq!(report.remaining_health, 194);
        assert_eq!(report.outcome, 388);
        assert_eq!(report.winner, Some(Faction::Elf));
    }

    #[test]
    fn test_single_faction() {
        let report = simulation(SINGLE_FACTION).run().unwrap();
        assert_eq!(report.rounds, 0);
        assert_eq!(report.winner, Some(Faction::Elf));
        assert_eq!(report.remaining_health, 400);
    }

    #[test]
    fn test_unreachable_enemies_stalemate() {
        let mut sim = simulation(WALLED_OFF);
        assert!(matches!(sim.run(), Err(CombatError::Stalemate { .. })));
        assert!(!sim.is_finished());
    }
}

// =============================================================================
// Input errors
// =============================================================================

mod parsing {
    use super::*;

    #[test]
    fn test_malformed_maps_are_rejected() {
        assert_eq!(
            Battlefield::parse(""),
            Err(CombatError::MalformedGrid(MalformedGrid::Empty))
        );
        assert!(matches!(
            Battlefield::parse("####\n#E#\n####"),
            Err(CombatError::MalformedGrid(MalformedGrid::Ragged { row: 1, .. }))
        ));
        assert!(matches!(
            Battlefield::parse("####\n#EX#\n####"),
            Err(CombatError::MalformedGrid(MalformedGrid::UnknownMarker { marker: 'X', .. }))
        ));
    }

    #[test]
    fn test_simulation_parse_matches_new() {
        let text = SAMPLE_BATTLES[1].map;
        let parsed = Simulation::parse(text, AttackPowers::default()).unwrap();
        let built = Simulation::new(&battlefield(text), AttackPowers::default()).unwrap();
        assert_eq!(parsed.state_hash(), built.state_hash());
    }
}
