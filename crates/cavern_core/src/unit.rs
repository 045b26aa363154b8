//! Factions and combat units.

use serde::{Deserialize, Serialize};

use crate::grid::Position;

/// Unique identifier for a unit within one simulation.
///
/// Identifiers are assigned in reading order of the starting positions
/// and double as indices into the simulation's unit roster.
pub type UnitId = u32;

/// Health every unit starts with.
pub const DEFAULT_HEALTH: u32 = 200;

/// Attack power used when none is configured.
pub const DEFAULT_ATTACK_POWER: u32 = 3;

/// One of the two opposing groups of units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    /// Elves, marked `E` on the battlefield.
    Elf,
    /// Goblins, marked `G` on the battlefield.
    Goblin,
}

impl Faction {
    /// Both factions, in a stable order.
    pub const ALL: [Self; 2] = [Self::Elf, Self::Goblin];

    /// Parse a battlefield marker character.
    #[must_use]
    pub const fn from_marker(marker: char) -> Option<Self> {
        match marker {
            'E' => Some(Self::Elf),
            'G' => Some(Self::Goblin),
            _ => None,
        }
    }

    /// The battlefield marker for this faction.
    #[must_use]
    pub const fn marker(self) -> char {
        match self {
            Self::Elf => 'E',
            Self::Goblin => 'G',
        }
    }

    /// The opposing faction.
    #[must_use]
    pub const fn enemy(self) -> Self {
        match self {
            Self::Elf => Self::Goblin,
            Self::Goblin => Self::Elf,
        }
    }

    /// Plural display name, as used in combat summaries.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Elf => "Elves",
            Self::Goblin => "Goblins",
        }
    }
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for Faction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "e" | "elf" | "elves" => Ok(Self::Elf),
            "g" | "goblin" | "goblins" => Ok(Self::Goblin),
            other => Err(format!("unknown faction '{other}'")),
        }
    }
}

/// Attack power per faction for one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttackPowers {
    /// Damage dealt by each elf attack.
    pub elf: u32,
    /// Damage dealt by each goblin attack.
    pub goblin: u32,
}

impl AttackPowers {
    /// Create attack powers for both factions.
    #[must_use]
    pub const fn new(elf: u32, goblin: u32) -> Self {
        Self { elf, goblin }
    }

    /// Attack power of the given faction.
    #[must_use]
    pub const fn of(&self, faction: Faction) -> u32 {
        match faction {
            Faction::Elf => self.elf,
            Faction::Goblin => self.goblin,
        }
    }

    /// Builder method replacing one faction's power.
    #[must_use]
    pub const fn with(mut self, faction: Faction, power: u32) -> Self {
        match faction {
            Faction::Elf => self.elf = power,
            Faction::Goblin => self.goblin = power,
        }
        self
    }
}

impl Default for AttackPowers {
    fn default() -> Self {
        Self::new(DEFAULT_ATTACK_POWER, DEFAULT_ATTACK_POWER)
    }
}

/// Health points of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Health {
    /// Current health points.
    pub current: u32,
    /// Starting health points.
    pub max: u32,
}

impl Health {
    /// Create health at full.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Check if the unit is dead (health == 0).
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Apply damage, returning actual damage dealt.
    /// Overkill clamps at zero.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.current);
        self.current -= actual;
        actual
    }
}

/// A combat unit standing on one floor cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Roster identifier.
    pub id: UnitId,
    /// Which side the unit fights for.
    pub faction: Faction,
    /// Current cell. Still holds the cell of death once the unit has died.
    pub position: Position,
    /// Remaining health.
    pub health: Health,
    /// Damage dealt per attack.
    pub attack_power: u32,
}

impl Unit {
    /// Create a unit at full health.
    #[must_use]
    pub const fn new(id: UnitId, faction: Faction, position: Position, attack_power: u32) -> Self {
        Self {
            id,
            faction,
            position,
            health: Health::new(DEFAULT_HEALTH),
            attack_power,
        }
    }

    /// Whether the unit still has health left.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.health.is_dead()
    }

    /// Whether `other` fights for the opposing faction.
    #[must_use]
    pub fn is_enemy_of(&self, other: &Unit) -> bool {
        self.faction != other.faction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faction_markers() {
        assert_eq!(Faction::from_marker('E'), Some(Faction::Elf));
        assert_eq!(Faction::from_marker('G'), Some(Faction::Goblin));
        assert_eq!(Faction::from_marker('.'), None);
        for faction in Faction::ALL {
            assert_eq!(Faction::from_marker(faction.marker()), Some(faction));
            assert_eq!(faction.enemy().enemy(), faction);
        }
    }

    #[test]
    fn test_faction_from_str() {
        assert_eq!("elves".parse::<Faction>(), Ok(Faction::Elf));
        assert_eq!("G".parse::<Faction>(), Ok(Faction::Goblin));
        assert!("orc".parse::<Faction>().is_err());
    }

    #[test]
    fn test_attack_powers() {
        let powers = AttackPowers::default();
        assert_eq!(powers.of(Faction::Elf), DEFAULT_ATTACK_POWER);

        let boosted = powers.with(Faction::Elf, 15);
        assert_eq!(boosted.of(Faction::Elf), 15);
        assert_eq!(boosted.of(Faction::Goblin), DEFAULT_ATTACK_POWER);
    }

    #[test]
    fn test_health_damage_clamps() {
        let mut health = Health::new(10);
        assert_eq!(health.apply_damage(4), 4);
        assert_eq!(health.current, 6);
        assert_eq!(health.apply_damage(100), 6);
        assert!(health.is_dead());
    }
}
