//! AI decision-making subsystem
//!
//! This module defines the [`AiPlayer`] trait, the personality and difficulty
//! tables that parameterize the computer opponent, and two implementations:
//! [`StrategicAi`] (the campaign opponent) and [`PassiveAi`] (never acts).
//!
//! An AI only proposes [`Command`]s. The turn controller runs them through
//! [`crate::step::execute_command`] exactly as it runs player commands, so the
//! AI cannot do anything the player could not.
//!
//! # Determinism
//!
//! AI implementations must be deterministic given the same RNG seed and the
//! same game state, so a whole game can be replayed from its seed. A decision
//! may depend on the seed, the state and nothing else: [`StrategicAi`] reseeds
//! for every call, which lets a game restored from an [`AiProfile`] continue
//! exactly where it left off.

pub mod strategic;

pub use strategic::StrategicAi;

use crate::config::RulesConfig;
use crate::input::Command;
use crate::state::{Faction, GameState};
use crate::units::{EquipmentLevel, WeaponLevel};
use serde::{Deserialize, Serialize};

/// AI decision-making trait.
///
/// `decide` is called once for every phase in which `faction` may act (see
/// [`crate::step::permitted_categories`]); the current phase is
/// `state.phase`. Returning an empty list passes.
pub trait AiPlayer: Send {
    /// Display name, e.g. the commander's name.
    fn name(&self) -> &str;

    /// Settings to store in a save so the same opponent can be rebuilt.
    fn profile(&self) -> Option<AiProfile> {
        None
    }

    fn decide(&mut self, state: &GameState, rules: &RulesConfig, faction: Faction) -> Vec<Command>;
}

/// Seed used when none is given.
pub const DEFAULT_SEED: u64 = 12345;

/// Everything needed to rebuild a [`StrategicAi`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AiProfile {
    pub personality: AiPersonality,
    pub difficulty: AiDifficulty,
    pub seed: u64,
}

impl Default for AiProfile {
    fn default() -> Self {
        Self {
            personality: AiPersonality::default(),
            difficulty: AiDifficulty::default(),
            seed: DEFAULT_SEED,
        }
    }
}

/// An opponent that never does anything. Useful for sandbox scenarios.
#[derive(Debug, Default)]
pub struct PassiveAi;

impl AiPlayer for PassiveAi {
    fn name(&self) -> &str {
        "Passive"
    }

    fn decide(&mut self, _state: &GameState, _rules: &RulesConfig, _faction: Faction) -> Vec<Command> {
        vec![]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiPersonality {
    Aggressive,
    #[default]
    Balanced,
    Defensive,
    Economic,
}

impl AiPersonality {
    pub const ALL: [AiPersonality; 4] = [
        AiPersonality::Aggressive,
        AiPersonality::Balanced,
        AiPersonality::Defensive,
        AiPersonality::Economic,
    ];

    pub fn commander(self) -> &'static str {
        match self {
            AiPersonality::Aggressive => "Commander Kratos",
            AiPersonality::Balanced => "General Nexus",
            AiPersonality::Defensive => "Overseer Aegis",
            AiPersonality::Economic => "Magistrate Midas",
        }
    }

    /// Aggression dial used when this personality invades.
    pub fn invasion_aggression(self) -> u8 {
        match self {
            AiPersonality::Aggressive => 75,
            AiPersonality::Balanced => 50,
            AiPersonality::Defensive => 30,
            AiPersonality::Economic => 40,
        }
    }

    /// Required attacker/defender strength ratio, in percent.
    pub fn strength_margin_percent(self) -> u32 {
        match self {
            AiPersonality::Aggressive => 105,
            AiPersonality::Balanced => 125,
            AiPersonality::Defensive => 160,
            AiPersonality::Economic => 200,
        }
    }

    /// Chance per owned planet of starting construction each economic turn.
    pub fn build_chance_percent(self) -> u32 {
        match self {
            AiPersonality::Economic => 80,
            _ => 40,
        }
    }

    /// Chance of going through with an invasion that clears the margin.
    pub fn attack_chance_percent(self) -> u32 {
        match self {
            AiPersonality::Defensive => 20,
            _ => 100,
        }
    }

    /// Platoons held back on the launching planet.
    pub fn home_guard(self) -> usize {
        match self {
            AiPersonality::Aggressive => 0,
            AiPersonality::Defensive => 2,
            _ => 1,
        }
    }
}

impl std::fmt::Display for AiPersonality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.commander())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiDifficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl AiDifficulty {
    /// Added to the personality's strength margin.
    pub fn margin_adjust_percent(self) -> i32 {
        match self {
            AiDifficulty::Easy => 25,
            AiDifficulty::Normal => 0,
            AiDifficulty::Hard => -10,
        }
    }

    /// Applied to the AI faction's income.
    pub fn income_multiplier_percent(self) -> u32 {
        match self {
            AiDifficulty::Easy => 80,
            AiDifficulty::Normal => 100,
            AiDifficulty::Hard => 120,
        }
    }

    /// Kit for newly commissioned platoons.
    pub fn loadout(self) -> (EquipmentLevel, WeaponLevel) {
        match self {
            AiDifficulty::Easy => (EquipmentLevel::Standard, WeaponLevel::Pistol),
            AiDifficulty::Normal => (EquipmentLevel::Standard, WeaponLevel::Rifle),
            AiDifficulty::Hard => (EquipmentLevel::Elite, WeaponLevel::Plasma),
        }
    }
}

/// Attacker/defender ratio, in percent, needed before attacking.
pub fn required_margin_percent(personality: AiPersonality, difficulty: AiDifficulty) -> u32 {
    let margin = personality.strength_margin_percent() as i32 + difficulty.margin_adjust_percent();
    margin.max(100) as u32
}

/// Combined strength of every platoon `faction` owns.
pub fn military_strength(state: &GameState, faction: Faction) -> u64 {
    state.platoons_of(faction).map(|p| p.strength()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TurnPhase;
    use crate::testing::GameStateBuilder;

    #[test]
    fn test_personality_table() {
        assert_eq!(AiPersonality::Aggressive.commander(), "Commander Kratos");
        assert_eq!(AiPersonality::Economic.invasion_aggression(), 40);
        assert_eq!(AiPersonality::Defensive.strength_margin_percent(), 160);
    }

    #[test]
    fn test_required_margin() {
        use AiDifficulty::*;
        use AiPersonality::*;
        assert_eq!(required_margin_percent(Balanced, Normal), 125);
        assert_eq!(required_margin_percent(Balanced, Easy), 150);
        assert_eq!(required_margin_percent(Defensive, Hard), 150);
        // Never attack below parity
        assert_eq!(required_margin_percent(Aggressive, Hard), 100);
    }

    #[test]
    fn test_profile_json() {
        let profile = AiProfile {
            personality: AiPersonality::Aggressive,
            difficulty: AiDifficulty::Hard,
            seed: 5,
        };
        let json = serde_json::to_string(&profile).unwrap();
        assert_eq!(json, r#"{"personality":"aggressive","difficulty":"hard","seed":5}"#);
        assert_eq!(serde_json::from_str::<AiProfile>(&json).unwrap(), profile);
        assert_eq!(PassiveAi.profile(), None);
    }

    #[test]
    fn test_passive_ai_passes() {
        let state = GameStateBuilder::new()
            .phase(TurnPhase::End)
            .with_planet(1, Some(Faction::Ai), 1000)
            .with_credits(Faction::Ai, 1_000_000)
            .build();
        let mut ai = PassiveAi;
        assert!(ai.decide(&state, &RulesConfig::default(), Faction::Ai).is_empty());
    }
}
