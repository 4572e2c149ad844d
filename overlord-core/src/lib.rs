//! # Overlord Simulation Core
//!
//! Deterministic turn-based simulation for a two-faction space-strategy game:
//! planets, a five-channel economy, construction, platoons, craft, fleet
//! battles, weapon research, invasion and a computer opponent.
//!
//! Each turn runs Income → Action → Combat → End. The player acts during
//! Action; the AI moves its forces during Combat and manages its economy
//! during End. Given the same scenario, rules and AI seed, a game replays
//! identically.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────────┐
//! │  AI Player  │────▶│   Command    │────▶│ execute_command │
//! │  (decide)   │     │ (validated)  │     │  (phase gated)  │
//! └─────────────┘     └──────────────┘     └────────┬────────┘
//!                                                   │
//! ┌─────────────┐     ┌──────────────┐     ┌────────▼────────┐
//! │  Observers  │◀────│  GameEvent   │◀────│ TurnController  │
//! │  (side fx)  │     │  (EventBus)  │     │ + GameState     │
//! └─────────────┘     └──────────────┘     └─────────────────┘
//! ```
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`GameState`] | Entity store: planets, platoons, craft, faction ledgers |
//! | [`Command`] | Player and AI actions (construction, platoons, craft, invasion) |
//! | [`execute_command`] | Phase check plus dispatch to the engines in [`systems`] |
//! | [`TurnController`] | Owns the state and sequences phases, AI turns and victory checks |
//! | [`AiPlayer`] | Trait for AI decision making |
//! | [`GameObserver`] | Trait for reacting to [`GameEvent`]s |
//!
//! ## AI System
//!
//! - [`StrategicAi`]: Personality-driven opponent with a seeded RNG
//! - [`PassiveAi`]: Never acts
//!
//! ## Observers
//!
//! Side effects are isolated to the observer layer:
//! - [`ConsoleObserver`]: Routes events to the `log` facade
//! - [`EventLogObserver`]: Writes events as JSON lines
//! - [`PhaseMetrics`]: Wall-clock time per phase

pub mod ai;
pub mod bounded;
pub mod buildings;
pub mod config;
pub mod defines;
pub mod events;
pub mod fixed;
pub mod input;
pub mod metrics;
pub mod observer;
pub mod persistence;
pub mod resources;
pub mod scenario;
pub mod state;
pub mod step;
pub mod systems;
pub mod testing;
pub mod turn;
pub mod units;
pub mod victory;

pub use ai::{AiDifficulty, AiPersonality, AiPlayer, AiProfile, PassiveAi, StrategicAi};
pub use bounded::{BoundedInt, Morale, Percentage, TaxRate, TrainingLevel};
pub use buildings::{BuildingStatus, BuildingType, Structure};
pub use config::RulesConfig;
pub use events::{EventKind, GameEvent};
pub use fixed::Fixed;
pub use input::{Command, CommandCategory};
pub use metrics::PhaseMetrics;
pub use observer::console::ConsoleObserver;
pub use observer::event_log::EventLogObserver;
pub use observer::{EventBus, FnObserver, GameObserver, ObserverError, SubscriptionId};
pub use persistence::{SaveError, SaveGame, SAVE_VERSION};
pub use resources::{LedgerError, Resource, ResourceLedger};
pub use scenario::{PlanetSetup, Scenario, ScenarioError};
pub use state::{
    Craft, CraftId, Faction, FactionState, GameState, Planet, PlanetId, PlanetType, Platoon,
    PlatoonId, PlatoonLocation, ResearchProject, StateError, TurnPhase, WeaponResearch,
};
pub use systems::{BombardmentReport, SpaceBattleReport};
pub use step::{execute_command, permitted_categories, ActionError, CommandOutcome};
pub use turn::TurnController;
pub use units::{CraftType, EquipmentLevel, WeaponLevel};
pub use victory::{ConditionReport, ConditionStatus, VictoryCondition, VictoryResult};
