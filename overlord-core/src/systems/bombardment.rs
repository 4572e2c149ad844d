//! Orbital bombardment.
//!
//! Battle Cruisers holding an enemy or neutral planet's orbit can shell it
//! without landing. Every cruiser adds [`space::BOMBARD_STRENGTH_PER_CRUISER`]
//! strength; each full [`space::BOMBARD_STRENGTH_PER_STRUCTURE`] razes one
//! Active surface or production structure, newest first. Docking Bays and
//! Orbital Defense platforms are out of reach. The population suffers
//! casualties and loses morale either way.

use crate::buildings::BuildingType;
use crate::defines::space;
use crate::state::{Faction, GameState, PlanetId};
use crate::step::ActionError;
use crate::systems::space_combat;
use crate::units::CraftType;
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BombardmentReport {
    pub planet: PlanetId,
    pub faction: Faction,
    pub strength: u32,
    pub structures_destroyed: Vec<BuildingType>,
    pub casualties: u32,
    /// Planet morale after the shelling.
    pub morale: i32,
}

fn is_vulnerable(building: BuildingType) -> bool {
    !matches!(
        building,
        BuildingType::DockingBay | BuildingType::OrbitalDefense
    )
}

#[instrument(skip_all, name = "bombard")]
pub fn bombard(
    state: &mut GameState,
    faction: Faction,
    planet_id: PlanetId,
) -> Result<BombardmentReport, ActionError> {
    let planet = state
        .planet(planet_id)
        .ok_or(ActionError::UnknownPlanet(planet_id))?;
    if planet.is_owned_by(faction) {
        return Err(ActionError::AlreadyOwned(planet_id));
    }
    if !space_combat::has_orbital_control(state, faction, planet_id) {
        return Err(ActionError::NoOrbitalControl(planet_id));
    }
    let cruisers = state
        .craft_at(planet_id)
        .filter(|c| c.owner == faction && c.kind == CraftType::BattleCruiser)
        .count() as u32;
    if cruisers == 0 {
        return Err(ActionError::NoWarships(planet_id));
    }

    let strength = cruisers * space::BOMBARD_STRENGTH_PER_CRUISER;
    let quota = ((strength / space::BOMBARD_STRENGTH_PER_STRUCTURE) as usize)
        .min(space::MAX_STRUCTURES_PER_BOMBARDMENT);
    let casualty_percent = (strength * space::BOMBARD_CASUALTY_PERCENT / 100).min(100);

    let Some(planet) = state.planet_mut(planet_id) else {
        return Err(ActionError::UnknownPlanet(planet_id));
    };
    let targets: Vec<usize> = planet
        .structures
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, s)| s.is_active() && is_vulnerable(s.building))
        .map(|(i, _)| i)
        .take(quota)
        .collect();
    // Descending indices, so earlier removals leave later ones valid.
    let structures_destroyed: Vec<BuildingType> = targets
        .into_iter()
        .map(|i| planet.structures.remove(i).building)
        .collect();

    let casualties = (planet.population as u64 * casualty_percent as u64 / 100) as u32;
    planet.population -= casualties;
    planet.morale.add(space::BOMBARD_MORALE_CHANGE);

    let report = BombardmentReport {
        planet: planet_id,
        faction,
        strength,
        structures_destroyed,
        casualties,
        morale: planet.morale.get(),
    };
    log::info!(
        "{} bombarded planet {}: {} structures destroyed, {} casualties",
        faction,
        planet_id,
        report.structures_destroyed.len(),
        casualties
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildings::Structure;
    use crate::testing::GameStateBuilder;

    /// AI planet 2 (1000 population, 80 morale) with one of each building,
    /// oldest first, and a Mining Station still under construction.
    fn target(cruisers: usize) -> GameState {
        let mut builder = GameStateBuilder::new()
            .with_planet(1, Some(Faction::Player), 1000)
            .with_planet(2, Some(Faction::Ai), 1000);
        for building in [
            BuildingType::DockingBay,
            BuildingType::MiningStation,
            BuildingType::HorticulturalStation,
            BuildingType::SurfacePlatform,
            BuildingType::OrbitalDefense,
        ] {
            builder = builder.with_structure(2, Structure::active(building));
        }
        builder = builder.with_structure(
            2,
            Structure::under_construction(BuildingType::MiningStation),
        );
        for _ in 0..cruisers {
            builder = builder.with_craft(2, Faction::Player, CraftType::BattleCruiser);
        }
        builder.build()
    }

    fn buildings(state: &GameState, planet: PlanetId) -> Vec<BuildingType> {
        state
            .planet(planet)
            .unwrap()
            .structures
            .iter()
            .map(|s| s.building)
            .collect()
    }

    #[test]
    fn test_cruisers_raze_newest_active_structures() {
        let mut state = target(4);

        let report = bombard(&mut state, Faction::Player, 2).unwrap();

        assert_eq!(report.strength, 200);
        assert_eq!(
            report.structures_destroyed,
            vec![
                BuildingType::SurfacePlatform,
                BuildingType::HorticulturalStation
            ]
        );
        assert_eq!(report.casualties, 200);
        assert_eq!(report.morale, 60);
        assert_eq!(
            buildings(&state, 2),
            vec![
                BuildingType::DockingBay,
                BuildingType::MiningStation,
                BuildingType::OrbitalDefense,
                BuildingType::MiningStation,
            ]
        );
        assert_eq!(state.planet(2).unwrap().population, 800);
        assert!(state.validate().is_empty());
    }

    #[test]
    fn test_lone_cruiser_only_hurts_population() {
        let mut state = target(1);

        let report = bombard(&mut state, Faction::Player, 2).unwrap();

        assert!(report.structures_destroyed.is_empty());
        assert_eq!(report.casualties, 50);
        assert_eq!(buildings(&state, 2).len(), 6);
        assert_eq!(state.planet(2).unwrap().morale.get(), 60);
    }

    #[test]
    fn test_structures_destroyed_per_bombardment_capped() {
        let mut state = target(10);
        for _ in 0..3 {
            state
                .planet_mut(2)
                .unwrap()
                .structures
                .push(Structure::active(BuildingType::MiningStation));
        }

        let report = bombard(&mut state, Faction::Player, 2).unwrap();

        assert_eq!(report.structures_destroyed.len(), 3);
        assert_eq!(report.casualties, 500);
    }

    #[test]
    fn test_bombardment_rejections_leave_state_alone() {
        let mut state = GameStateBuilder::new()
            .with_planet(1, Some(Faction::Player), 1000)
            .with_planet(2, Some(Faction::Ai), 1000)
            .with_craft(2, Faction::Player, CraftType::CargoCruiser)
            .build();
        let before = state.checksum();

        assert_eq!(
            bombard(&mut state, Faction::Player, 9),
            Err(ActionError::UnknownPlanet(9))
        );
        assert_eq!(
            bombard(&mut state, Faction::Player, 1),
            Err(ActionError::AlreadyOwned(1))
        );
        assert_eq!(
            bombard(&mut state, Faction::Player, 2),
            Err(ActionError::NoWarships(2))
        );
        assert_eq!(state.checksum(), before);

        let mut contested = target(2);
        contested.spawn_craft(Faction::Ai, CraftType::BattleCruiser, 2);
        assert_eq!(
            bombard(&mut contested, Faction::Player, 2),
            Err(ActionError::NoOrbitalControl(2))
        );
    }
}
