//! Building catalogue and the per-planet [`Structure`] record.

use crate::resources::ResourceLedger;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BuildingType {
    DockingBay,
    SurfacePlatform,
    MiningStation,
    HorticulturalStation,
    OrbitalDefense,
}

/// Which capacity pool a building draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotClass {
    Orbital,
    Surface,
}

impl SlotClass {
    /// Structures of this class a single planet can hold (any status).
    pub fn capacity(self) -> usize {
        match self {
            SlotClass::Orbital => 3,
            SlotClass::Surface => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SlotClass::Orbital => "orbital slots",
            SlotClass::Surface => "surface slots",
        }
    }
}

impl BuildingType {
    pub const ALL: [BuildingType; 5] = [
        BuildingType::DockingBay,
        BuildingType::SurfacePlatform,
        BuildingType::MiningStation,
        BuildingType::HorticulturalStation,
        BuildingType::OrbitalDefense,
    ];

    pub fn cost(self) -> ResourceLedger {
        match self {
            BuildingType::DockingBay => ResourceLedger::new(5000, 1000, 500, 0, 0),
            BuildingType::SurfacePlatform => ResourceLedger::new(2000, 500, 0, 0, 0),
            BuildingType::MiningStation => ResourceLedger::new(8000, 2000, 1000, 0, 0),
            BuildingType::HorticulturalStation => ResourceLedger::new(6000, 1500, 800, 0, 0),
            BuildingType::OrbitalDefense => ResourceLedger::new(12000, 3000, 2000, 0, 0),
        }
    }

    /// Income ticks from start to Active.
    pub fn construction_turns(self) -> u32 {
        match self {
            BuildingType::SurfacePlatform => 1,
            BuildingType::DockingBay | BuildingType::HorticulturalStation => 2,
            BuildingType::MiningStation | BuildingType::OrbitalDefense => 3,
        }
    }

    /// Population drawn as crew when construction starts.
    pub fn crew(self) -> u32 {
        match self {
            BuildingType::MiningStation => 15,
            BuildingType::HorticulturalStation => 10,
            _ => 0,
        }
    }

    pub fn slot_class(self) -> SlotClass {
        match self {
            BuildingType::DockingBay | BuildingType::OrbitalDefense => SlotClass::Orbital,
            BuildingType::SurfacePlatform
            | BuildingType::MiningStation
            | BuildingType::HorticulturalStation => SlotClass::Surface,
        }
    }

    /// Base per-turn output of one Active structure, before planet multipliers.
    pub fn base_production(self) -> ResourceLedger {
        match self {
            BuildingType::MiningStation => ResourceLedger::new(0, 50, 30, 0, 0),
            BuildingType::HorticulturalStation => ResourceLedger::new(0, 0, 0, 100, 0),
            _ => ResourceLedger::ZERO,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BuildingType::DockingBay => "Docking Bay",
            BuildingType::SurfacePlatform => "Surface Platform",
            BuildingType::MiningStation => "Mining Station",
            BuildingType::HorticulturalStation => "Horticultural Station",
            BuildingType::OrbitalDefense => "Orbital Defense",
        }
    }
}

impl std::fmt::Display for BuildingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingStatus {
    UnderConstruction,
    Active,
}

/// A building on a planet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Structure {
    pub building: BuildingType,
    pub status: BuildingStatus,
    pub turns_remaining: u32,
}

impl Structure {
    pub fn under_construction(building: BuildingType) -> Self {
        Self {
            building,
            status: BuildingStatus::UnderConstruction,
            turns_remaining: building.construction_turns(),
        }
    }

    pub fn active(building: BuildingType) -> Self {
        Self {
            building,
            status: BuildingStatus::Active,
            turns_remaining: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == BuildingStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_times_within_design_range() {
        for building in BuildingType::ALL {
            let turns = building.construction_turns();
            assert!((1..=3).contains(&turns), "{building} takes {turns}");
        }
    }

    #[test]
    fn test_slot_classes() {
        assert_eq!(BuildingType::OrbitalDefense.slot_class(), SlotClass::Orbital);
        assert_eq!(BuildingType::MiningStation.slot_class(), SlotClass::Surface);
        assert_eq!(SlotClass::Orbital.capacity(), 3);
    }

    #[test]
    fn test_new_structure_carries_full_timer() {
        let s = Structure::under_construction(BuildingType::MiningStation);
        assert_eq!(s.turns_remaining, 3);
        assert!(!s.is_active());
    }
}
