//! Runs scenarios and assembles reports.

use cavern_core::boost::{find_minimum_boost, BoostSearch};
use cavern_core::error::CombatError;
use cavern_core::grid::Battlefield;
use cavern_core::simulation::Simulation;
use cavern_core::unit::Faction;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{info, warn};

use crate::batch::find_minimum_boost_parallel;
use crate::report::{BoostReport, RunReport, SolveReport, VerifyReport};
use crate::scenario::{Scenario, ScenarioError};

/// Error type for runner operations.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Scenario could not be loaded.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    /// The battle could not be fought to the end.
    #[error("Combat failed: {0}")]
    Combat(#[from] CombatError),
    /// Report could not be encoded.
    #[error("Failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
    /// Worker pool could not be started.
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

fn simulation(scenario: &Scenario, battlefield: &Battlefield) -> Result<Simulation, CombatError> {
    let sim = Simulation::new(battlefield, scenario.attack_powers)?;
    Ok(match scenario.round_limit {
        Some(limit) => sim.with_round_limit(limit),
        None => sim,
    })
}

/// Fight the scenario's battle to the end.
pub fn run(scenario: &Scenario, show_map: bool) -> Result<RunReport, RunnerError> {
    let battlefield = scenario.battlefield()?;
    let mut sim = simulation(scenario, &battlefield)?;

    info!(
        scenario = %scenario.name,
        units = sim.units().len(),
        elf_attack = scenario.attack_powers.elf,
        goblin_attack = scenario.attack_powers.goblin,
        "Starting battle"
    );

    let combat = sim.run()?;
    Ok(RunReport {
        scenario: scenario.name.clone(),
        combat,
        final_map: show_map.then(|| sim.to_string()),
    })
}

/// Find the smallest attack power that lets `faction` win without losses.
///
/// `parallel` selects the rayon search with that many threads
/// (0 = rayon default); `None` scans sequentially.
pub fn boost(
    scenario: &Scenario,
    faction: Faction,
    parallel: Option<usize>,
) -> Result<BoostReport, RunnerError> {
    let battlefield = scenario.battlefield()?;
    let mut search = BoostSearch::new(faction).with_base(scenario.attack_powers);
    if let Some(limit) = scenario.round_limit {
        search = search.with_round_limit(limit);
    }

    let outcome = match parallel {
        Some(threads) => find_minimum_boost_parallel(&battlefield, &search, threads)?,
        None => find_minimum_boost(&battlefield, &search)?,
    };

    Ok(BoostReport {
        scenario: scenario.name.clone(),
        faction,
        outcome,
    })
}

/// Default-power outcome plus the smallest flawless elf boost.
pub fn solve(scenario: &Scenario) -> Result<SolveReport, RunnerError> {
    let battle = run(scenario, false)?.combat;
    let flawless = boost(scenario, Faction::Elf, None)?.outcome;
    Ok(SolveReport {
        scenario: scenario.name.clone(),
        battle,
        boost: flawless,
    })
}

/// Fight the same battle `runs` times in parallel and compare the results.
pub fn verify(scenario: &Scenario, runs: usize) -> Result<VerifyReport, RunnerError> {
    let battlefield = scenario.battlefield()?;
    info!(scenario = %scenario.name, runs, "Verifying determinism");

    let results: Vec<(u64, Option<u64>)> = (0..runs)
        .into_par_iter()
        .map(|_| -> Result<(u64, Option<u64>), CombatError> {
            let mut sim = simulation(scenario, &battlefield)?;
            let outcome = match sim.run() {
                Ok(report) => Some(report.outcome),
                Err(err) => {
                    warn!(error = %err, "Run ended without a winner");
                    None
                }
            };
            Ok((sim.state_hash(), outcome))
        })
        .collect::<Result<_, CombatError>>()?;

    let (hashes, outcomes): (Vec<u64>, Vec<Option<u64>>) = results.into_iter().unzip();
    let deterministic = hashes.windows(2).all(|w| w[0] == w[1])
        && outcomes.windows(2).all(|w| w[0] == w[1]);

    Ok(VerifyReport {
        scenario: scenario.name.clone(),
        hashes,
        outcomes,
        deterministic,
    })
}
