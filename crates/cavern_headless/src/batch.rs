//! Parallel minimum boost search.
//!
//! Candidate attack powers are independent battles, so they are evaluated
//! in batches on a rayon thread pool. Batches are scanned in ascending
//! order and each batch keeps its input order, so the first success is
//! still the smallest power that works.

use cavern_core::boost::{evaluate_power, BoostOutcome, BoostSearch};
use cavern_core::error::CombatError;
use cavern_core::grid::Battlefield;
use cavern_core::simulation::CombatReport;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::runner::RunnerError;

/// Find the smallest flawless attack power using `threads` workers
/// (0 = rayon default).
pub fn find_minimum_boost_parallel(
    battlefield: &Battlefield,
    search: &BoostSearch,
    threads: usize,
) -> Result<Option<BoostOutcome>, RunnerError> {
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    let batch_size = pool.current_num_threads().max(1);
    let candidates: Vec<u32> = search.candidate_powers(battlefield)?.collect();
    let base = search.base.of(search.faction);

    info!(
        faction = %search.faction,
        candidates = candidates.len(),
        threads = batch_size,
        "Starting parallel boost search"
    );

    for batch in candidates.chunks(batch_size) {
        let results: Vec<Option<(u32, CombatReport)>> = pool.install(|| {
            batch
                .par_iter()
                .map(|&power| {
                    evaluate_power(battlefield, search, power)
                        .map(|report| report.map(|report| (power, report)))
                })
                .collect::<Result<_, CombatError>>()
        })?;

        if let Some((power, report)) = results.into_iter().flatten().next() {
            info!(
                faction = %search.faction,
                attack_power = power,
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

        debug!(
            first = batch.first().copied(),
            last = batch.last().copied(),
            "No flawless win in batch"
        );
    }

    info!(faction = %search.faction, "No attack power wins without casualties");
    Ok(None)
}
