//! Interplanetary movement.
//!
//! Every pair of planets is one jump apart and travel completes immediately.
//! The jump's fuel comes out of the origin planet's stockpile.

use crate::config::RulesConfig;
use crate::resources::{LedgerError, Resource};
use crate::state::{CraftId, Faction, GameState, PlanetId};
use crate::step::ActionError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jump {
    pub from: PlanetId,
    pub to: PlanetId,
    pub fuel_spent: u64,
}

/// Check a jump without performing it.
pub fn check_move(
    state: &GameState,
    rules: &RulesConfig,
    faction: Faction,
    craft_id: CraftId,
    destination: PlanetId,
) -> Result<Jump, ActionError> {
    let craft = state
        .craft_by_id(craft_id)
        .ok_or(ActionError::UnknownCraft(craft_id))?;
    if craft.owner != faction {
        return Err(ActionError::NotOwner {
            faction,
            entity: format!("craft {craft_id}"),
        });
    }
    if craft.in_transit() {
        return Err(ActionError::InTransit(craft_id));
    }
    let from = craft.planet();
    if from == destination {
        return Err(ActionError::SameLocation {
            craft: craft_id,
            planet: destination,
        });
    }
    if state.planet(destination).is_none() {
        return Err(ActionError::UnknownPlanet(destination));
    }

    let origin = state
        .planet(from)
        .ok_or(ActionError::UnknownPlanet(from))?;
    if origin.stockpile.fuel < rules.fuel_per_jump {
        return Err(ActionError::Insufficient(LedgerError {
            resource: Resource::Fuel,
            required: rules.fuel_per_jump,
            available: origin.stockpile.fuel,
        }));
    }

    Ok(Jump {
        from,
        to: destination,
        fuel_spent: rules.fuel_per_jump,
    })
}

pub fn can_move_ship(
    state: &GameState,
    rules: &RulesConfig,
    faction: Faction,
    craft_id: CraftId,
    destination: PlanetId,
) -> bool {
    check_move(state, rules, faction, craft_id, destination).is_ok()
}

/// Jump a craft to `destination`, burning fuel at the origin.
pub fn move_ship(
    state: &mut GameState,
    rules: &RulesConfig,
    faction: Faction,
    craft_id: CraftId,
    destination: PlanetId,
) -> Result<Jump, ActionError> {
    let jump = check_move(state, rules, faction, craft_id, destination)?;

    if let Some(origin) = state.planet_mut(jump.from) {
        origin.stockpile.spend_one(Resource::Fuel, jump.fuel_spent)?;
    }
    if let Some(craft) = state.craft_mut(craft_id) {
        craft.planet = jump.to;
        craft.in_transit = false;
    }

    log::debug!(
        "{} moved craft {} from planet {} to {}",
        faction,
        craft_id,
        jump.from,
        jump.to
    );
    Ok(jump)
}
