//! Text and JSON reports printed on stdout.

use cavern_core::boost::BoostOutcome;
use cavern_core::render::summary_line;
use cavern_core::simulation::CombatReport;
use cavern_core::unit::Faction;
use serde::{Deserialize, Serialize};

/// How reports are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// A report that can be printed in either format.
pub trait Report: Serialize {
    /// Human-readable rendering.
    fn to_text(&self) -> String;

    /// Render in the requested format.
    fn render(&self, format: OutputFormat) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Text => Ok(self.to_text()),
            OutputFormat::Json => serde_json::to_string_pretty(self),
        }
    }
}

fn casualties_line(combat: &CombatReport) -> String {
    format!(
        "Casualties: {} elves, {} goblins",
        combat.casualties.elves, combat.casualties.goblins
    )
}

/// Result of fighting one battle to the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Scenario name.
    pub scenario: String,
    /// Combat summary.
    #[serde(flatten)]
    pub combat: CombatReport,
    /// Rendered battlefield after the last round, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_map: Option<String>,
}

impl Report for RunReport {
    fn to_text(&self) -> String {
        let mut lines = vec![format!("== {} ==", self.scenario)];
        if let Some(map) = &self.final_map {
            lines.push(map.clone());
        }
        lines.push(summary_line(&self.combat));
        lines.push(casualties_line(&self.combat));
        lines.join("\n")
    }
}

/// Result of a minimum boost search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostReport {
    /// Scenario name.
    pub scenario: String,
    /// Faction that was boosted.
    pub faction: Faction,
    /// Winning power and battle, if any power in range works.
    pub outcome: Option<BoostOutcome>,
}

impl Report for BoostReport {
    fn to_text(&self) -> String {
        match &self.outcome {
            Some(outcome) => format!(
                "== {} ==\n{} need attack power {} (boost +{}) to win without losses.\n{}",
                self.scenario,
                self.faction,
                outcome.attack_power,
                outcome.boost,
                summary_line(&outcome.report)
            ),
            None => format!(
                "== {} ==\nNo attack power lets {} win without losses.",
                self.scenario, self.faction
            ),
        }
    }
}

/// Both headline numbers for a battlefield: the default-power outcome and
/// the outcome of the smallest flawless elf boost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveReport {
    /// Scenario name.
    pub scenario: String,
    /// Battle at the scenario's attack powers.
    pub battle: CombatReport,
    /// Smallest flawless elf boost.
    pub boost: Option<BoostOutcome>,
}

impl Report for SolveReport {
    fn to_text(&self) -> String {
        let flawless = match &self.boost {
            Some(boost) => format!(
                "Flawless elves outcome: {} (attack power {})",
                boost.report.outcome, boost.attack_power
            ),
            None => "Flawless elves outcome: none".to_string(),
        };
        format!("Outcome: {}\n{flawless}", self.battle.outcome)
    }
}

/// Result of replaying one battle several times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    /// Scenario name.
    pub scenario: String,
    /// Final state hash of each run.
    pub hashes: Vec<u64>,
    /// Outcome of each run, `None` when it ended in an error.
    pub outcomes: Vec<Option<u64>>,
    /// Whether every run agreed.
    pub deterministic: bool,
}

impl Report for VerifyReport {
    fn to_text(&self) -> String {
        if self.deterministic {
            format!(
                "PASS: all {} runs of '{}' produced identical results (hash {:#018x})",
                self.hashes.len(),
                self.scenario,
                self.hashes.first().copied().unwrap_or_default()
            )
        } else {
            let mut unique = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            format!(
                "FAIL: non-determinism detected in '{}' ({} unique hashes over {} runs)",
                self.scenario,
                unique.len(),
                self.hashes.len()
            )
        }
    }
}
