//! Spacecraft purchase, scrapping and troop transport.
//!
//! Embarking and disembarking move platoon membership between a planet
//! garrison and a Battle Cruiser hold; troop counts and strength are untouched.

use crate::config::RulesConfig;
use crate::fixed::Fixed;
use crate::resources::ResourceLedger;
use crate::state::{Craft, CraftId, Faction, GameState, PlanetId, PlatoonId, PlatoonLocation};
use crate::step::ActionError;
use crate::units::CraftType;
use rustc_hash::FxHashSet;

/// Buy a craft at an owned planet. The faction pays the cost and the planet
/// supplies the crew.
pub fn purchase_craft(
    state: &mut GameState,
    rules: &RulesConfig,
    faction: Faction,
    planet_id: PlanetId,
    kind: CraftType,
) -> Result<CraftId, ActionError> {
    let planet = state
        .planet(planet_id)
        .ok_or(ActionError::UnknownPlanet(planet_id))?;
    if !planet.is_owned_by(faction) {
        return Err(ActionError::NotOwner {
            faction,
            entity: format!("planet {planet_id}"),
        });
    }
    if state.fleet_count(faction) >= rules.max_craft_per_faction {
        return Err(ActionError::CapacityExceeded {
            what: "Fleet",
            limit: rules.max_craft_per_faction,
        });
    }

    let cost = kind.cost();
    if let Some(err) = state.faction(faction).ledger.shortfall(&cost) {
        return Err(err.into());
    }
    let crew = kind.crew();
    if planet.population < crew {
        return Err(ActionError::InsufficientPopulation {
            required: crew,
            available: planet.population,
        });
    }

    state.faction_mut(faction).ledger.spend(&cost)?;
    if let Some(planet) = state.planet_mut(planet_id) {
        planet.population -= crew;
    }
    let id = state.spawn_craft(faction, kind, planet_id);

    log::info!("{} purchased {} {} at planet {}", faction, kind, id, planet_id);
    Ok(id)
}

/// Break up an empty craft for a partial refund, returning its crew to the
/// planet it is docked at.
pub fn scrap_craft(
    state: &mut GameState,
    rules: &RulesConfig,
    faction: Faction,
    craft_id: CraftId,
) -> Result<ResourceLedger, ActionError> {
    let craft = owned_craft(state, faction, craft_id)?;
    if craft.in_transit() {
        return Err(ActionError::InTransit(craft_id));
    }
    if !craft.carried().is_empty() {
        return Err(ActionError::CraftNotEmpty(craft_id));
    }

    let kind = craft.kind;
    let planet_id = craft.planet();
    let refund = kind
        .cost()
        .scaled(Fixed::from_percent(rules.scrap_refund_percent as i64));

    state.remove_craft(craft_id);
    if let Some(planet) = state.planet_mut(planet_id) {
        planet.population = planet.population.saturating_add(kind.crew());
    }
    state.faction_mut(faction).ledger.deposit(&refund);

    log::debug!("{} scrapped {} {}, refund {}", faction, kind, craft_id, refund);
    Ok(refund)
}

/// Load garrisoned platoons into a docked Battle Cruiser. Returns the
/// platoons loaded, with repeated ids listed once.
///
/// All-or-nothing: every platoon must belong to `faction` and be garrisoned
/// on the craft's planet, and the hold must have room for all of them.
pub fn embark_platoons(
    state: &mut GameState,
    rules: &RulesConfig,
    faction: Faction,
    craft_id: CraftId,
    platoons: &[PlatoonId],
) -> Result<Vec<PlatoonId>, ActionError> {
    let platoons = distinct(platoons);
    let craft = docked_carrier(state, faction, craft_id)?;
    if craft.carried().len() + platoons.len() > rules.craft_platoon_capacity {
        return Err(ActionError::CapacityExceeded {
            what: "Cargo",
            limit: rules.craft_platoon_capacity,
        });
    }

    let at = PlatoonLocation::Planet(craft.planet());
    for &platoon_id in &platoons {
        let platoon = state
            .platoon(platoon_id)
            .ok_or(ActionError::UnknownPlatoon(platoon_id))?;
        if platoon.owner != faction {
            return Err(ActionError::NotOwner {
                faction,
                entity: format!("platoon {platoon_id}"),
            });
        }
        if platoon.location() != at {
            return Err(ActionError::NotAtCraftPlanet {
                platoon: platoon_id,
                craft: craft_id,
            });
        }
    }

    for &platoon_id in &platoons {
        state.embark(craft_id, platoon_id);
    }
    log::debug!("{} embarked {:?} onto craft {}", faction, platoons, craft_id);
    Ok(platoons)
}

/// Unload carried platoons onto the owned planet the craft is docked at.
/// They become that planet's garrison and it becomes their home.
pub fn disembark_platoons(
    state: &mut GameState,
    rules: &RulesConfig,
    faction: Faction,
    craft_id: CraftId,
    platoons: &[PlatoonId],
) -> Result<Vec<PlatoonId>, ActionError> {
    let platoons = distinct(platoons);
    let craft = docked_carrier(state, faction, craft_id)?;
    let planet_id = craft.planet();

    for &platoon_id in &platoons {
        if !craft.carried().contains(&platoon_id) {
            return Err(ActionError::NotCarried {
                platoon: platoon_id,
                craft: craft_id,
            });
        }
    }

    let planet = state
        .planet(planet_id)
        .ok_or(ActionError::UnknownPlanet(planet_id))?;
    if !planet.is_owned_by(faction) {
        return Err(ActionError::NotOwner {
            faction,
            entity: format!("planet {planet_id}"),
        });
    }
    if state.platoon_count_at(planet_id) + platoons.len() > rules.max_platoons_per_planet {
        return Err(ActionError::CapacityExceeded {
            what: "Platoon",
            limit: rules.max_platoons_per_planet,
        });
    }

    for &platoon_id in &platoons {
        state.disembark(craft_id, platoon_id, planet_id);
    }
    log::debug!(
        "{} disembarked {:?} from craft {} onto planet {}",
        faction,
        platoons,
        craft_id,
        planet_id
    );
    Ok(platoons)
}

/// `ids` with repeats dropped, first occurrence kept.
fn distinct(ids: &[PlatoonId]) -> Vec<PlatoonId> {
    let mut seen = FxHashSet::default();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn owned_craft(state: &GameState, faction: Faction, craft_id: CraftId) -> Result<&Craft, ActionError> {
    let craft = state
        .craft_by_id(craft_id)
        .ok_or(ActionError::UnknownCraft(craft_id))?;
    if craft.owner != faction {
        return Err(ActionError::NotOwner {
            faction,
            entity: format!("craft {craft_id}"),
        });
    }
    Ok(craft)
}

fn docked_carrier(
    state: &GameState,
    faction: Faction,
    craft_id: CraftId,
) -> Result<&Craft, ActionError> {
    let craft = owned_craft(state, faction, craft_id)?;
    if !craft.kind.carries_troops() {
        return Err(ActionError::NotACarrier(craft.kind));
    }
    if craft.in_transit() {
        return Err(ActionError::InTransit(craft_id));
    }
    Ok(craft)
}
