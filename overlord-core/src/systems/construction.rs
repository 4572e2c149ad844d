//! Building construction and scrapping.
//!
//! One construction may be in progress per planet regardless of type, and
//! each slot class has a per-planet capacity counted over structures of any
//! status. Costs come out of the faction ledger, never the planet stockpile.

use crate::buildings::{BuildingStatus, BuildingType, Structure};
use crate::config::RulesConfig;
use crate::fixed::Fixed;
use crate::resources::ResourceLedger;
use crate::state::{Faction, GameState, PlanetId};
use crate::step::ActionError;
use crate::systems::defense;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A structure that became Active during a construction tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedStructure {
    pub planet: PlanetId,
    pub owner: Option<Faction>,
    pub building: BuildingType,
}

/// Check whether `building` may be started on `planet` right now.
///
/// Ownership and affordability are the caller's concern; see [`start_construction`].
pub fn check_can_build(
    state: &GameState,
    planet_id: PlanetId,
    building: BuildingType,
) -> Result<(), ActionError> {
    let planet = state
        .planet(planet_id)
        .ok_or(ActionError::UnknownPlanet(planet_id))?;

    if planet.construction().is_some() {
        return Err(ActionError::ConstructionInProgress { planet: planet_id });
    }

    let class = building.slot_class();
    let used = planet
        .structures
        .iter()
        .filter(|s| s.building.slot_class() == class)
        .count();
    if used >= class.capacity() {
        return Err(ActionError::CapacityExceeded {
            what: class.label(),
            limit: class.capacity(),
        });
    }
    if building == BuildingType::OrbitalDefense {
        defense::check_platform_limit(state, planet_id)?;
    }

    Ok(())
}

pub fn can_build(state: &GameState, planet_id: PlanetId, building: BuildingType) -> bool {
    check_can_build(state, planet_id, building).is_ok()
}

/// Start building on a planet owned by `faction`.
///
/// Validates everything before touching state: a rejected call leaves the
/// ledger, population and structure list unchanged. Returns the number of
/// Income ticks until the structure becomes Active.
pub fn start_construction(
    state: &mut GameState,
    faction: Faction,
    planet_id: PlanetId,
    building: BuildingType,
) -> Result<u32, ActionError> {
    check_can_build(state, planet_id, building)?;

    let planet = state
        .planet(planet_id)
        .ok_or(ActionError::UnknownPlanet(planet_id))?;
    if !planet.is_owned_by(faction) {
        return Err(ActionError::NotOwner {
            faction,
            entity: format!("planet {planet_id}"),
        });
    }

    let crew = building.crew();
    if planet.population < crew {
        return Err(ActionError::InsufficientPopulation {
            required: crew,
            available: planet.population,
        });
    }

    let cost = building.cost();
    state.faction_mut(faction).ledger.spend(&cost)?;

    let structure = Structure::under_construction(building);
    let turns = structure.turns_remaining;
    if let Some(planet) = state.planet_mut(planet_id) {
        planet.population -= crew;
        planet.structures.push(structure);
    }

    log::debug!(
        "{} started {} on planet {} ({} turns)",
        faction,
        building,
        planet_id,
        turns
    );
    Ok(turns)
}

/// Advance every construction by one Income tick.
#[instrument(skip_all, name = "construction")]
pub fn tick_construction(state: &mut GameState) -> Vec<CompletedStructure> {
    let mut completed = Vec::new();
    let planet_ids: Vec<PlanetId> = state.planets().iter().map(|p| p.id()).collect();

    for planet_id in planet_ids {
        let Some(planet) = state.planet_mut(planet_id) else {
            continue;
        };
        let owner = planet.owner();

        for structure in planet
            .structures
            .iter_mut()
            .filter(|s| s.status == BuildingStatus::UnderConstruction)
        {
            structure.turns_remaining = structure.turns_remaining.saturating_sub(1);
            if structure.turns_remaining == 0 {
                structure.status = BuildingStatus::Active;
                completed.push(CompletedStructure {
                    planet: planet_id,
                    owner,
                    building: structure.building,
                });
            }
        }
    }

    for done in &completed {
        log::info!("{} completed on planet {}", done.building, done.planet);
    }
    completed
}

/// Demolish an Active structure, refunding part of its credit cost.
///
/// Takes effect immediately. Returns the refund.
pub fn scrap_building(
    state: &mut GameState,
    rules: &RulesConfig,
    faction: Faction,
    planet_id: PlanetId,
    building: BuildingType,
) -> Result<ResourceLedger, ActionError> {
    let planet = state
        .planet(planet_id)
        .ok_or(ActionError::UnknownPlanet(planet_id))?;
    if !planet.is_owned_by(faction) {
        return Err(ActionError::NotOwner {
            faction,
            entity: format!("planet {planet_id}"),
        });
    }
    let index = planet
        .structures
        .iter()
        .position(|s| s.building == building && s.is_active())
        .ok_or(ActionError::NoSuchStructure {
            planet: planet_id,
            building,
        })?;

    let share = Fixed::from_percent(rules.scrap_refund_percent as i64);
    let refund = ResourceLedger::credits(share.apply(building.cost().credits as i64) as u64);

    if let Some(planet) = state.planet_mut(planet_id) {
        planet.structures.remove(index);
        planet.population = planet.population.saturating_add(building.crew());
    }
    state.faction_mut(faction).ledger.deposit(&refund);

    log::debug!(
        "{} scrapped {} on planet {}, refunded {} credits",
        faction,
        building,
        planet_id,
        refund.credits
    );
    Ok(refund)
}
