//! Scenario definitions: the starting galaxy, opponent and win conditions.
//!
//! Scenarios are plain JSON. Every field except `name` and `planets` has a
//! default, so a minimal file only lists the planets:
//!
//! ```json
//! {
//!   "name": "Skirmish",
//!   "planets": [
//!     { "id": 1, "name": "Starbase", "planet_type": "Metropolis", "owner": "player", "population": 1000 },
//!     { "id": 2, "name": "Hitotsu", "planet_type": "Metropolis", "owner": "ai", "population": 1000 }
//!   ]
//! }
//! ```

use crate::ai::{AiDifficulty, AiPersonality};
use crate::bounded::{Morale, TaxRate};
use crate::defines;
use crate::resources::ResourceLedger;
use crate::state::{Faction, GameState, Planet, PlanetId, PlanetType, StateError, TurnPhase};
use crate::units::{CraftType, EquipmentLevel, WeaponLevel};
use crate::victory::VictoryCondition;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Failed to read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed scenario: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("Invalid scenario: {0}")]
    Invalid(String),
}

fn default_morale() -> i32 {
    defines::economy::DEFAULT_MORALE
}

fn default_tax_rate() -> i32 {
    defines::economy::DEFAULT_TAX_RATE
}

fn first_turn() -> u32 {
    1
}

/// One planet of the starting galaxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetSetup {
    pub id: PlanetId,
    pub name: String,
    pub planet_type: PlanetType,
    #[serde(default)]
    pub owner: Option<Faction>,
    #[serde(default)]
    pub population: u32,
    #[serde(default = "default_morale")]
    pub morale: i32,
    #[serde(default = "default_tax_rate")]
    pub tax_rate: i32,
    #[serde(default)]
    pub stockpile: ResourceLedger,
    /// Troop counts of Basic/Rifle platoons garrisoned at the start.
    #[serde(default)]
    pub garrison: Vec<u32>,
    /// Craft docked at the start.
    #[serde(default)]
    pub craft: Vec<CraftType>,
}

impl PlanetSetup {
    fn to_planet(&self) -> Planet {
        let mut planet = Planet::new(self.id, self.name.clone(), self.planet_type);
        planet.owner = self.owner;
        planet.population = self.population;
        planet.morale = Morale::new(self.morale);
        planet.tax_rate = TaxRate::new(self.tax_rate);
        planet.stockpile = self.stockpile;
        planet
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub planets: Vec<PlanetSetup>,
    #[serde(default)]
    pub player_ledger: ResourceLedger,
    #[serde(default)]
    pub ai_ledger: ResourceLedger,
    #[serde(default)]
    pub ai_personality: AiPersonality,
    #[serde(default)]
    pub ai_difficulty: AiDifficulty,
    /// Empty means the game is decided by elimination.
    #[serde(default)]
    pub victory_conditions: Vec<VictoryCondition>,
    #[serde(default = "first_turn")]
    pub start_turn: u32,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let json = std::fs::read_to_string(path)?;
        let scenario = Self::from_json(&json)?;
        log::info!("Loaded scenario '{}' from {}", scenario.name, path.display());
        Ok(scenario)
    }

    /// The built-in campaign: the player's Starbase against the AI's
    /// Hitotsu, with four unclaimed worlds between them.
    pub fn default_campaign() -> Self {
        let home = |id, name: &str, owner| PlanetSetup {
            id,
            name: name.to_string(),
            planet_type: PlanetType::Metropolis,
            owner: Some(owner),
            population: 2000,
            morale: 80,
            tax_rate: 40,
            stockpile: ResourceLedger::new(0, 0, 200, 3000, 0),
            garrison: vec![100, 100],
            craft: vec![],
        };
        let neutral = |id, name: &str, planet_type, population| PlanetSetup {
            id,
            name: name.to_string(),
            planet_type,
            owner: None,
            population,
            morale: default_morale(),
            tax_rate: default_tax_rate(),
            stockpile: ResourceLedger::ZERO,
            garrison: vec![],
            craft: vec![],
        };
        let start = ResourceLedger::new(100_000, 20_000, 10_000, 5000, 1000);

        Self {
            name: "Overlord Campaign".to_string(),
            description: "Take Hitotsu before the enemy takes Starbase.".to_string(),
            planets: vec![
                home(1, "Starbase", Faction::Player),
                neutral(2, "Kessa", PlanetType::Volcanic, 400),
                neutral(3, "Ondine", PlanetType::Tropical, 600),
                neutral(4, "Dune", PlanetType::Desert, 300),
                neutral(5, "Vesper", PlanetType::Tropical, 500),
                home(6, "Hitotsu", Faction::Ai),
            ],
            player_ledger: start,
            ai_ledger: start,
            ai_personality: AiPersonality::default(),
            ai_difficulty: AiDifficulty::default(),
            victory_conditions: vec![VictoryCondition::DefeatEnemy],
            start_turn: first_turn(),
        }
    }

    /// Build the opening game state, waiting in the Income phase.
    pub fn build_state(&self) -> Result<GameState, ScenarioError> {
        if self.planets.is_empty() {
            return Err(ScenarioError::Invalid("no planets".into()));
        }
        if !self.planets.iter().any(|p| p.owner == Some(Faction::Player)) {
            return Err(ScenarioError::Invalid("player owns no planet".into()));
        }

        let mut state = GameState::new();
        state.turn = self.start_turn.max(1);
        state.phase = TurnPhase::Income;
        for setup in &self.planets {
            state.add_planet(setup.to_planet())?;
        }

        for setup in &self.planets {
            if (!setup.garrison.is_empty() || !setup.craft.is_empty()) && setup.owner.is_none() {
                return Err(ScenarioError::Invalid(format!(
                    "unowned planet '{}' cannot start with forces",
                    setup.name
                )));
            }
            let Some(owner) = setup.owner else {
                continue;
            };
            for &troops in &setup.garrison {
                if !(defines::military::MIN_TROOPS..=defines::military::MAX_TROOPS).contains(&troops) {
                    return Err(ScenarioError::Invalid(format!(
                        "garrison of {troops} troops on '{}'",
                        setup.name
                    )));
                }
                state.spawn_platoon(owner, setup.id, troops, EquipmentLevel::Basic, WeaponLevel::Rifle);
            }
            for &kind in &setup.craft {
                state.spawn_craft(owner, kind, setup.id);
            }
        }

        state.faction_mut(Faction::Player).ledger = self.player_ledger;
        let ai = state.faction_mut(Faction::Ai);
        ai.ledger = self.ai_ledger;
        ai.income_multiplier_percent = self.ai_difficulty.income_multiplier_percent();

        let problems = state.validate();
        if !problems.is_empty() {
            return Err(StateError::Invariant(problems.join("; ")).into());
        }
        Ok(state)
    }
}
