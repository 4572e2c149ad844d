use crate::buildings::BuildingType;
use crate::state::{CraftId, PlanetId, PlatoonId};
use crate::units::{CraftType, EquipmentLevel, WeaponLevel};
use serde::{Deserialize, Serialize};

/// Commands a faction can issue, grouped by the window in which they are accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Command {
    // Economic
    StartConstruction {
        planet: PlanetId,
        building: BuildingType,
    },
    ScrapBuilding {
        planet: PlanetId,
        building: BuildingType,
    },
    SetTaxRate {
        planet: PlanetId,
        rate: i32,
    },
    CommissionPlatoon {
        planet: PlanetId,
        troops: u32,
        equipment: EquipmentLevel,
        weapon: WeaponLevel,
    },
    DecommissionPlatoon {
        platoon: PlatoonId,
    },
    PurchaseCraft {
        planet: PlanetId,
        craft: CraftType,
    },
    ScrapCraft {
        craft: CraftId,
    },
    /// Start researching the next weapon tier.
    ResearchWeapons,

    // Military
    Embark {
        craft: CraftId,
        platoons: Vec<PlatoonId>,
    },
    Disembark {
        craft: CraftId,
        platoons: Vec<PlatoonId>,
    },
    MoveShip {
        craft: CraftId,
        destination: PlanetId,
    },
    Invade {
        planet: PlanetId,
        aggression: u8,
    },
    Bombard {
        planet: PlanetId,
    },
}

/// Which part of a faction's turn a command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandCategory {
    Economic,
    Military,
}

impl Command {
    pub fn category(&self) -> CommandCategory {
        match self {
            Command::StartConstruction { .. }
            | Command::ScrapBuilding { .. }
            | Command::SetTaxRate { .. }
            | Command::CommissionPlatoon { .. }
            | Command::DecommissionPlatoon { .. }
            | Command::PurchaseCraft { .. }
            | Command::ScrapCraft { .. }
            | Command::ResearchWeapons => CommandCategory::Economic,
            Command::Embark { .. }
            | Command::Disembark { .. }
            | Command::MoveShip { .. }
            | Command::Invade { .. }
            | Command::Bombard { .. } => CommandCategory::Military,
        }
    }
}
