//! Command validation and dispatch.
//!
//! [`execute_command`] is the single entry point through which both factions
//! mutate the world. It checks that the current phase admits the command for
//! that faction, then hands off to the engine in [`crate::systems`].

use crate::buildings::BuildingType;
use crate::config::RulesConfig;
use crate::input::{Command, CommandCategory};
use crate::resources::{LedgerError, ResourceLedger};
use crate::state::{CraftId, Faction, GameState, PlanetId, PlatoonId, TurnPhase};
use crate::systems::bombardment::{self, BombardmentReport};
use crate::systems::combat::{self, InvasionReport};
use crate::systems::{construction, craft, navigation, platoons, taxation, upgrades};
use crate::units::{CraftType, WeaponLevel};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a command was rejected. A rejected command never mutates state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("{faction} cannot act during the {phase} phase")]
    WrongPhase { phase: TurnPhase, faction: Faction },
    #[error("The game is over")]
    GameOver,
    #[error(transparent)]
    Insufficient(#[from] LedgerError),
    #[error("Insufficient Population. Need {required} have {available}")]
    InsufficientPopulation { required: u32, available: u32 },
    #[error("{what} limit reached ({limit}/{limit})")]
    CapacityExceeded { what: &'static str, limit: usize },
    #[error("Construction already in progress on planet {planet}")]
    ConstructionInProgress { planet: PlanetId },
    #[error("Unknown planet {0}")]
    UnknownPlanet(PlanetId),
    #[error("Unknown platoon {0}")]
    UnknownPlatoon(PlatoonId),
    #[error("Unknown craft {0}")]
    UnknownCraft(CraftId),
    #[error("Troop count must be between 1 and 200, got {0}")]
    InvalidTroopCount(u32),
    #[error("Tax rate must be between 0 and 100, got {0}")]
    InvalidTaxRate(i32),
    #[error("Aggression must be between 0 and 100, got {0}")]
    InvalidAggression(u8),
    #[error("{entity} does not belong to {faction}")]
    NotOwner { faction: Faction, entity: String },
    #[error("No active {building} on planet {planet}")]
    NoSuchStructure {
        planet: PlanetId,
        building: BuildingType,
    },
    #[error("Craft {0} is in transit")]
    InTransit(CraftId),
    #[error("Craft {craft} is already at planet {planet}")]
    SameLocation { craft: CraftId, planet: PlanetId },
    #[error("{0} cannot carry platoons")]
    NotACarrier(CraftType),
    #[error("Platoon {platoon} is not garrisoned where craft {craft} is docked")]
    NotAtCraftPlanet { platoon: PlatoonId, craft: CraftId },
    #[error("Platoon {platoon} is not carried by craft {craft}")]
    NotCarried { platoon: PlatoonId, craft: CraftId },
    #[error("Craft {0} still carries platoons")]
    CraftNotEmpty(CraftId),
    #[error("Planet {0} already belongs to the invader")]
    AlreadyOwned(PlanetId),
    #[error("No loaded Battle Cruisers in orbit of planet {0}")]
    NoInvasionForce(PlanetId),
    #[error("Enemy warships hold the orbit of planet {0}")]
    NoOrbitalControl(PlanetId),
    #[error("No Battle Cruisers in orbit of planet {0}")]
    NoWarships(PlanetId),
    #[error("Weapon research already in progress")]
    ResearchInProgress,
    #[error("Every weapon tier has been researched")]
    FullyResearched,
    #[error("{weapon:?} weapons have not been researched")]
    WeaponNotResearched { weapon: WeaponLevel },
}

/// What a successful command did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandOutcome {
    ConstructionStarted {
        planet: PlanetId,
        building: BuildingType,
        turns: u32,
    },
    BuildingScrapped {
        planet: PlanetId,
        building: BuildingType,
        refund: ResourceLedger,
    },
    TaxRateSet {
        planet: PlanetId,
        rate: i32,
    },
    PlatoonCommissioned {
        platoon: PlatoonId,
        planet: PlanetId,
    },
    /// `troops_returned` is `None` when the platoon did not exist.
    PlatoonDecommissioned {
        platoon: PlatoonId,
        troops_returned: Option<u32>,
    },
    CraftPurchased {
        craft: CraftId,
        kind: CraftType,
        planet: PlanetId,
    },
    CraftScrapped {
        craft: CraftId,
        refund: ResourceLedger,
    },
    Embarked {
        craft: CraftId,
        platoons: Vec<PlatoonId>,
    },
    Disembarked {
        craft: CraftId,
        platoons: Vec<PlatoonId>,
    },
    ShipMoved {
        craft: CraftId,
        from: PlanetId,
        to: PlanetId,
        fuel_spent: u64,
    },
    Invasion(InvasionReport),
    ResearchStarted {
        weapon: WeaponLevel,
        turns: u32,
        cost: u64,
    },
    Bombardment(BombardmentReport),
}

/// Command categories `faction` may issue during `phase`.
///
/// The player acts only in the Action phase. The AI takes its military turn
/// on entering Combat and its economic turn on entering End.
pub fn permitted_categories(phase: TurnPhase, faction: Faction) -> &'static [CommandCategory] {
    match (phase, faction) {
        (TurnPhase::Action, Faction::Player) => {
            &[CommandCategory::Economic, CommandCategory::Military]
        }
        (TurnPhase::Combat, Faction::Ai) => &[CommandCategory::Military],
        (TurnPhase::End, Faction::Ai) => &[CommandCategory::Economic],
        _ => &[],
    }
}

pub fn check_phase(
    phase: TurnPhase,
    faction: Faction,
    category: CommandCategory,
) -> Result<(), ActionError> {
    if permitted_categories(phase, faction).contains(&category) {
        Ok(())
    } else {
        Err(ActionError::WrongPhase { phase, faction })
    }
}

/// Validate and apply one command for `faction`.
pub fn execute_command(
    state: &mut GameState,
    rules: &RulesConfig,
    faction: Faction,
    cmd: &Command,
) -> Result<CommandOutcome, ActionError> {
    check_phase(state.phase, faction, cmd.category())?;

    let outcome = match cmd {
        Command::StartConstruction { planet, building } => {
            let turns = construction::start_construction(state, faction, *planet, *building)?;
            CommandOutcome::ConstructionStarted {
                planet: *planet,
                building: *building,
                turns,
            }
        }
        Command::ScrapBuilding { planet, building } => {
            let refund = construction::scrap_building(state, rules, faction, *planet, *building)?;
            CommandOutcome::BuildingScrapped {
                planet: *planet,
                building: *building,
                refund,
            }
        }
        Command::SetTaxRate { planet, rate } => {
            taxation::set_tax_rate(state, faction, *planet, *rate)?;
            CommandOutcome::TaxRateSet {
                planet: *planet,
                rate: *rate,
            }
        }
        Command::CommissionPlatoon {
            planet,
            troops,
            equipment,
            weapon,
        } => {
            let platoon = platoons::commission_platoon(
                state, rules, faction, *planet, *troops, *equipment, *weapon,
            )?;
            CommandOutcome::PlatoonCommissioned {
                platoon,
                planet: *planet,
            }
        }
        Command::DecommissionPlatoon { platoon } => {
            let troops_returned = platoons::decommission_platoon(state, faction, *platoon)?;
            CommandOutcome::PlatoonDecommissioned {
                platoon: *platoon,
                troops_returned,
            }
        }
        Command::PurchaseCraft { planet, craft: kind } => {
            let id = craft::purchase_craft(state, rules, faction, *planet, *kind)?;
            CommandOutcome::CraftPurchased {
                craft: id,
                kind: *kind,
                planet: *planet,
            }
        }
        Command::ScrapCraft { craft: id } => {
            let refund = craft::scrap_craft(state, rules, faction, *id)?;
            CommandOutcome::CraftScrapped { craft: *id, refund }
        }
        Command::Embark {
            craft: id,
            platoons,
        } => {
            let platoons = craft::embark_platoons(state, rules, faction, *id, platoons)?;
            CommandOutcome::Embarked {
                craft: *id,
                platoons,
            }
        }
        Command::Disembark {
            craft: id,
            platoons,
        } => {
            let platoons = craft::disembark_platoons(state, rules, faction, *id, platoons)?;
            CommandOutcome::Disembarked {
                craft: *id,
                platoons,
            }
        }
        Command::MoveShip {
            craft: id,
            destination,
        } => {
            let jump = navigation::move_ship(state, rules, faction, *id, *destination)?;
            CommandOutcome::ShipMoved {
                craft: *id,
                from: jump.from,
                to: jump.to,
                fuel_spent: jump.fuel_spent,
            }
        }
        Command::Invade { planet, aggression } => {
            let report = combat::invade(state, rules, faction, *planet, *aggression)?;
            CommandOutcome::Invasion(report)
        }
        Command::ResearchWeapons => {
            let project = upgrades::start_research(state, faction)?;
            CommandOutcome::ResearchStarted {
                weapon: project.target,
                turns: project.turns_remaining,
                cost: project.target.research_cost(),
            }
        }
        Command::Bombard { planet } => {
            let report = bombardment::bombard(state, faction, *planet)?;
            CommandOutcome::Bombardment(report)
        }
    };

    Ok(outcome)
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
