//! Headless battle runner for CI and batch analysis.
//!
//! Loads a battlefield (plain map file or RON scenario), fights it with
//! [`cavern_core`], and prints reports on stdout:
//!
//! - **Run**: one battle at given attack powers
//! - **Boost**: smallest flawless attack power, optionally in parallel
//! - **Solve**: default outcome plus the flawless elf outcome
//! - **Verify**: replay a battle and compare state hashes
//!
//! Logs go to stderr so stdout stays machine-readable.
//!
//! # Example
//!
//! ```bash
//! cargo run -p cavern_headless -- solve --input maps/cavern.txt
//! cargo run -p cavern_headless -- run --scenario scenarios/duel.ron --format json
//! cargo run -p cavern_headless -- boost --input maps/cavern.txt --parallel 8
//! ```

pub mod batch;
pub mod report;
pub mod runner;
pub mod scenario;

pub use batch::find_minimum_boost_parallel;
pub use report::{BoostReport, OutputFormat, Report, RunReport, SolveReport, VerifyReport};
pub use runner::RunnerError;
pub use scenario::{MapSource, Scenario, ScenarioError};
