//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Every tie in the combat rules is broken by reading order, so a battle
//! must replay identically. Sources of non-determinism to watch for:
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Pathfinding keeps its hash maps as lookups only; every choice goes
//!   through an explicit ordering.
//!
//! - **Roster order vs. grid order**: turn order comes from the grid scan,
//!   never from the order units were pushed into the roster.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual rules (pathing, targeting) are pure
//! 2. **Property tests**: Random maps must still replay identically
//! 3. **Integration tests**: Sample battles reproduce known outcomes
//! 4. **Parallel tests**: Running N simulations on threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use cavern_core::simulation::Simulation;
use tracing::warn;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps simulated.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `steps` - Number of steps to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one step
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    if !is_deterministic {
        warn!(runs, steps, "Runs diverged");
    }

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Advance a simulation by one round.
///
/// A finished battle stays put, and an invariant error leaves the state as
/// it was when the error was raised; both show up in the hash.
pub fn step_round(sim: &mut Simulation) {
    if let Err(err) = sim.round() {
        warn!(error = %err, "Round failed");
    }
}

/// Run `runs` copies of a simulation for `rounds` rounds each.
///
/// # Example
///
/// ```
/// use cavern_core::simulation::Simulation;
/// use cavern_core::unit::AttackPowers;
/// use cavern_test_utils::determinism::run_simulations;
///
/// let result = run_simulations(
///     || Simulation::parse("#####\n#GE.#\n#####", AttackPowers::default()).unwrap(),
///     3,
///     10,
/// );
/// result.assert_deterministic();
/// ```
pub fn run_simulations<F>(setup_fn: F, runs: usize, rounds: u64) -> DeterminismResult
where
    F: Fn() -> Simulation,
{
    verify_determinism(runs, rounds, setup_fn, step_round, Simulation::state_hash)
}

/// Simplified determinism verification for [`Simulation`].
///
/// Runs the simulation twice with identical setup and verifies the final
/// state hashes match exactly.
#[must_use]
pub fn verify_simulation_determinism<F>(setup_fn: F, rounds: u64) -> bool
where
    F: Fn() -> Simulation,
{
    run_simulations(setup_fn, 2, rounds).is_deterministic
}

/// Run N simulations on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling or
/// memory layout differences.
#[must_use]
pub fn run_parallel_simulations<F>(setup_fn: F, num_sims: usize, rounds: u64) -> DeterminismResult
where
    F: Fn() -> Simulation + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    for _ in 0..rounds {
                        step_round(&mut sim);
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        steps: rounds,
    }
}

/// Compare two simulation runs round by round, finding first divergence.
///
/// # Returns
///
/// `None` if simulations are deterministic, `Some(round)` if they diverge
/// at that round (0 means the initial states differ).
pub fn find_first_divergence<F>(setup_fn: F, rounds: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for round in 1..=rounds {
        step_round(&mut sim1);
        step_round(&mut sim2);

        if sim1.state_hash() != sim2.state_hash() {
            return Some(round);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for combat testing.
///
/// These strategies generate random but reproducible battlefields for
/// property-based testing of the simulation.
pub mod strategies {
    use cavern_core::unit::AttackPowers;
    use proptest::prelude::*;

    /// Generate one interior cell marker, mostly open floor.
    pub fn arb_cell() -> impl Strategy<Value = char> {
        prop_oneof![
            6 => Just('.'),
            2 => Just('#'),
            1 => Just('E'),
            1 => Just('G'),
        ]
    }

    /// Surround interior markers with a wall border.
    ///
    /// `interior` holds `(width - 2) * (height - 2)` markers in reading order.
    #[must_use]
    pub fn walled_map(width: usize, height: usize, interior: &[char]) -> String {
        let inner = width - 2;
        let mut rows = Vec::with_capacity(height);
        rows.push("#".repeat(width));
        for chunk in interior.chunks(inner).take(height - 2) {
            let mut row = String::with_capacity(width);
            row.push('#');
            row.extend(chunk);
            row.push('#');
            rows.push(row);
        }
        rows.push("#".repeat(width));
        rows.join("\n")
    }

    /// Generate a walled battlefield between 3x3 and the given size.
    pub fn arb_battlefield_text(
        max_width: usize,
        max_height: usize,
    ) -> impl Strategy<Value = String> {
        (3..=max_width.max(3), 3..=max_height.max(3)).prop_flat_map(|(width, height)| {
            proptest::collection::vec(arb_cell(), (width - 2) * (height - 2))
                .prop_map(move |interior| walled_map(width, height, &interior))
        })
    }

    /// Generate an attack power between the default and a strong boost.
    pub fn arb_attack_power() -> impl Strategy<Value = u32> {
        3u32..=40u32
    }

    /// Generate attack powers for both factions.
    pub fn arb_attack_powers() -> impl Strategy<Value = AttackPowers> {
        (arb_attack_power(), arb_attack_power())
            .prop_map(|(elf, goblin)| AttackPowers::new(elf, goblin))
    }
}
