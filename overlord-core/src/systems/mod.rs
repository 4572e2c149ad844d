//! Simulation engines.
//!
//! Each engine is a set of plain functions over `&mut GameState`. None of them
//! checks the turn phase; that gate lives in [`crate::step::execute_command`].

pub mod bombardment;
pub mod combat;
pub mod construction;
pub mod craft;
pub mod defense;
pub mod income;
pub mod navigation;
pub mod platoons;
pub mod population;
pub mod production;
pub mod space_combat;
pub mod taxation;
pub mod upgrades;

pub use bombardment::{bombard, BombardmentReport};
pub use combat::{invade, preview_invasion, resolve_invasion, InvasionReport, InvasionResult};
pub use construction::{can_build, scrap_building, start_construction, tick_construction};
pub use craft::{disembark_platoons, embark_platoons, purchase_craft, scrap_craft};
pub use income::{calculate_faction_income, run_income_tick, IncomeReport, IncomeWarning};
pub use navigation::move_ship;
pub use platoons::{commission_platoon, decommission_platoon, run_training_tick};
pub use population::run_population_tick;
pub use space_combat::{
    has_orbital_control, resolve_space_battle, resolve_space_battles, SpaceBattleReport,
};
pub use taxation::{estimate_tax_revenue, set_tax_rate, TaxCategory};
pub use upgrades::{run_research_tick, start_research};
