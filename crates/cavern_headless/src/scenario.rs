//! Scenario loading and configuration.
//!
//! A scenario names a battlefield and the settings to fight it with. It is
//! either read from a RON file or built around a plain map file:
//!
//! ```text
//! (
//!     name: "mixed_melee",
//!     description: "Goblins outnumber the elves",
//!     map: File("maps/mixed_melee.txt"),
//!     attack_powers: (elf: 3, goblin: 3),
//!     favored: elf,
//!     round_limit: Some(500),
//! )
//! ```
//!
//! Map paths in a RON file are relative to the file itself.

use std::path::{Path, PathBuf};

use cavern_core::error::CombatError;
use cavern_core::grid::Battlefield;
use cavern_core::unit::{AttackPowers, Faction};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The battlefield text is invalid.
    #[error("Invalid battlefield: {0}")]
    Battlefield(#[from] CombatError),
}

/// Where the battlefield text comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapSource {
    /// Map text embedded in the scenario.
    Inline(String),
    /// Path to a map file.
    File(PathBuf),
}

fn default_favored() -> Faction {
    Faction::Elf
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Battlefield text or file.
    pub map: MapSource,
    /// Attack power per faction.
    #[serde(default)]
    pub attack_powers: AttackPowers,
    /// Faction the boost search tries to win flawlessly with.
    #[serde(default = "default_favored")]
    pub favored: Faction,
    /// Stop runs after this many rounds.
    #[serde(default)]
    pub round_limit: Option<u32>,
    /// Directory relative map paths resolve against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Scenario {
    /// Wrap battlefield text in a scenario with default settings.
    #[must_use]
    pub fn from_map_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            map: MapSource::Inline(text.into()),
            attack_powers: AttackPowers::default(),
            favored: default_favored(),
            round_limit: None,
            base_dir: None,
        }
    }

    /// Read a plain map file into a scenario named after the file.
    pub fn from_map_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .map_or_else(|| path.display().to_string(), |stem| stem.to_string_lossy().into_owned());
        Ok(Self::from_map_text(name, text))
    }

    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let mut scenario = Self::from_ron_str(&contents)?;
        scenario.base_dir = path.parent().map(Path::to_path_buf);
        debug!(name = %scenario.name, path = %path.display(), "Loaded scenario");
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Builder method for attack powers.
    #[must_use]
    pub fn with_attack_powers(mut self, attack_powers: AttackPowers) -> Self {
        self.attack_powers = attack_powers;
        self
    }

    /// Full path of a file-backed map.
    #[must_use]
    pub fn map_path(&self) -> Option<PathBuf> {
        match &self.map {
            MapSource::Inline(_) => None,
            MapSource::File(path) => Some(self.resolve(path)),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Battlefield text, reading the map file if needed.
    pub fn map_text(&self) -> Result<String, ScenarioError> {
        match &self.map {
            MapSource::Inline(text) => Ok(text.clone()),
            MapSource::File(path) => {
                let path = self.resolve(path);
                if !path.exists() {
                    return Err(ScenarioError::FileNotFound(path.display().to_string()));
                }
                Ok(std::fs::read_to_string(path)?)
            }
        }
    }

    /// Parse the scenario's battlefield.
    pub fn battlefield(&self) -> Result<Battlefield, ScenarioError> {
        Ok(Battlefield::parse(&self.map_text()?)?)
    }
}
