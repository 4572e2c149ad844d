//! Platoon equipment grades and the spacecraft catalogue.

use crate::bounded::TrainingLevel;
use crate::fixed::Fixed;
use crate::resources::ResourceLedger;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EquipmentLevel {
    Civilian,
    Basic,
    Standard,
    Advanced,
    Elite,
}

impl EquipmentLevel {
    pub const ALL: [EquipmentLevel; 5] = [
        EquipmentLevel::Civilian,
        EquipmentLevel::Basic,
        EquipmentLevel::Standard,
        EquipmentLevel::Advanced,
        EquipmentLevel::Elite,
    ];

    /// Credits per platoon.
    pub fn cost(self) -> u64 {
        match self {
            EquipmentLevel::Civilian => 2500,
            EquipmentLevel::Basic => 6000,
            EquipmentLevel::Standard => 10000,
            EquipmentLevel::Advanced => 16000,
            EquipmentLevel::Elite => 25000,
        }
    }

    pub fn modifier(self) -> Fixed {
        match self {
            EquipmentLevel::Civilian => Fixed::from_percent(50),
            EquipmentLevel::Basic => Fixed::from_percent(100),
            EquipmentLevel::Standard => Fixed::from_percent(150),
            EquipmentLevel::Advanced => Fixed::from_percent(200),
            EquipmentLevel::Elite => Fixed::from_percent(250),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WeaponLevel {
    Pistol,
    Rifle,
    AssaultRifle,
    Plasma,
}

impl WeaponLevel {
    pub const ALL: [WeaponLevel; 4] = [
        WeaponLevel::Pistol,
        WeaponLevel::Rifle,
        WeaponLevel::AssaultRifle,
        WeaponLevel::Plasma,
    ];

    /// Credits per platoon.
    pub fn cost(self) -> u64 {
        match self {
            WeaponLevel::Pistol => 500,
            WeaponLevel::Rifle => 2000,
            WeaponLevel::AssaultRifle => 3500,
            WeaponLevel::Plasma => 6000,
        }
    }

    pub fn modifier(self) -> Fixed {
        match self {
            WeaponLevel::Pistol => Fixed::from_percent(80),
            WeaponLevel::Rifle => Fixed::from_percent(100),
            WeaponLevel::AssaultRifle => Fixed::from_percent(130),
            WeaponLevel::Plasma => Fixed::from_percent(160),
        }
    }

    /// The tier research unlocks after this one.
    pub fn next(self) -> Option<WeaponLevel> {
        match self {
            WeaponLevel::Pistol => Some(WeaponLevel::Rifle),
            WeaponLevel::Rifle => Some(WeaponLevel::AssaultRifle),
            WeaponLevel::AssaultRifle => Some(WeaponLevel::Plasma),
            WeaponLevel::Plasma => None,
        }
    }

    /// Credits to research this tier.
    pub fn research_cost(self) -> u64 {
        match self {
            WeaponLevel::Pistol => 0,
            WeaponLevel::Rifle => 10_000,
            WeaponLevel::AssaultRifle => 30_000,
            WeaponLevel::Plasma => 60_000,
        }
    }

    /// Income ticks from starting research until the tier is available.
    pub fn research_turns(self) -> u32 {
        match self {
            WeaponLevel::Pistol => 0,
            WeaponLevel::Rifle => 3,
            WeaponLevel::AssaultRifle => 5,
            WeaponLevel::Plasma => 8,
        }
    }

    /// Battle Cruiser armament at this tier, as a percent of base space
    /// combat strength.
    pub fn space_modifier_percent(self) -> u64 {
        match self {
            WeaponLevel::Pistol | WeaponLevel::Rifle => 100,
            WeaponLevel::AssaultRifle => 150,
            WeaponLevel::Plasma => 200,
        }
    }
}

/// Credits needed to commission a platoon with this kit.
pub fn platoon_cost(equipment: EquipmentLevel, weapon: WeaponLevel) -> u64 {
    equipment.cost() + weapon.cost()
}

/// Combat strength of a platoon.
///
/// `floor(troops × equipment × weapon × (100 + training) / 200)`: raw recruits
/// fight at half strength and reach full strength at 100% training.
pub fn platoon_strength(
    troops: u32,
    equipment: EquipmentLevel,
    weapon: WeaponLevel,
    training: TrainingLevel,
) -> u64 {
    let readiness = Fixed::from_ratio(100 + training.get() as i64, 200);
    let factor = equipment.modifier() * weapon.modifier() * readiness;
    factor.apply(troops as i64).max(0) as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CraftType {
    BattleCruiser,
    CargoCruiser,
    SolarSatellite,
    AtmosphereProcessor,
}

impl CraftType {
    pub const ALL: [CraftType; 4] = [
        CraftType::BattleCruiser,
        CraftType::CargoCruiser,
        CraftType::SolarSatellite,
        CraftType::AtmosphereProcessor,
    ];

    pub fn cost(self) -> ResourceLedger {
        match self {
            CraftType::BattleCruiser => ResourceLedger::new(50000, 10000, 5000, 0, 0),
            CraftType::CargoCruiser => ResourceLedger::new(30000, 5000, 3000, 0, 0),
            CraftType::SolarSatellite => ResourceLedger::new(15000, 3000, 1000, 0, 0),
            CraftType::AtmosphereProcessor => ResourceLedger::new(10000, 5000, 2000, 0, 0),
        }
    }

    /// Population drawn from the purchasing planet as crew.
    pub fn crew(self) -> u32 {
        match self {
            CraftType::BattleCruiser => 50,
            CraftType::CargoCruiser => 30,
            CraftType::SolarSatellite => 5,
            CraftType::AtmosphereProcessor => 20,
        }
    }

    /// Whether the craft can carry platoons.
    pub fn carries_troops(self) -> bool {
        matches!(self, CraftType::BattleCruiser)
    }

    /// Base strength in a fleet engagement at full health. Zero for craft
    /// that take no part in space combat.
    pub fn space_strength(self) -> u64 {
        match self {
            CraftType::BattleCruiser => 100,
            CraftType::CargoCruiser => 30,
            CraftType::SolarSatellite | CraftType::AtmosphereProcessor => 0,
        }
    }

    /// Armed craft fight for orbit and deny it to the enemy.
    pub fn is_armed(self) -> bool {
        self.space_strength() > 0
    }

    pub fn name(self) -> &'static str {
        match self {
            CraftType::BattleCruiser => "Battle Cruiser",
            CraftType::CargoCruiser => "Cargo Cruiser",
            CraftType::SolarSatellite => "Solar Satellite",
            CraftType::AtmosphereProcessor => "Atmosphere Processor",
        }
    }
}

impl std::fmt::Display for CraftType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
