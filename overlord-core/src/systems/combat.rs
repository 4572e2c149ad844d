//! Planetary invasion.
//!
//! [`resolve_invasion`] is a pure function of its [`InvasionInputs`]; both the
//! pre-invasion preview and the real invasion go through it, so an estimate
//! and the outcome it predicts always agree.
//!
//! The attacking force is every loaded Battle Cruiser the attacker has in
//! orbit of the target. No landing is possible while enemy armed craft
//! remain in orbit; they must be beaten in a space battle first. Aggression
//! scales the attacker's strength between 50% and 150% of nominal and raises
//! the attacker's casualty rate with it.

use crate::config::RulesConfig;
use crate::defines::military;
use crate::fixed::Fixed;
use crate::resources::ResourceLedger;
use crate::state::{CraftId, Faction, GameState, PlanetId, PlatoonId};
use crate::step::ActionError;
use crate::systems::{defense, space_combat};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Everything the combat formula looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvasionInputs {
    /// Sum of the attacking platoons' strength.
    pub attacker_strength: u64,
    /// Sum of the attacking platoons' troops.
    pub attacker_troops: u32,
    pub defender_population: u32,
    /// Percent added to defender strength by fortifications.
    pub defense_bonus_percent: u32,
    pub aggression: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvasionResult {
    pub attacker_effective_strength: u64,
    pub defender_strength: u64,
    pub victory: bool,
    pub attacker_loss_rate: Fixed,
    pub attacker_casualties: u32,
    pub defender_casualties: u32,
}

/// Attacker strength after the aggression dial: `strength × (50 + aggression)%`.
pub fn effective_strength(strength: u64, aggression: u8) -> u64 {
    let aggression = aggression.min(military::MAX_AGGRESSION) as i64;
    let factor = Fixed::from_percent(100 + aggression - military::NEUTRAL_AGGRESSION);
    factor.apply(strength as i64).max(0) as u64
}

pub fn defender_strength(population: u32, defense_bonus_percent: u32) -> u64 {
    let base = population as u64 * military::DEFENDER_STRENGTH_PER_POP;
    base * (100 + defense_bonus_percent as u64) / 100
}

/// Share of the attacking troops lost: `aggression / 200` on victory,
/// `aggression / 100` on defeat.
pub fn attacker_loss_rate(aggression: u8, victory: bool) -> Fixed {
    let aggression = aggression.min(military::MAX_AGGRESSION) as i64;
    if victory {
        Fixed::from_ratio(aggression, 200)
    } else {
        Fixed::from_ratio(aggression, 100)
    }
}

/// Resolve an invasion. Deterministic: identical inputs give identical results.
pub fn resolve_invasion(inputs: &InvasionInputs) -> InvasionResult {
    let attacker_effective_strength = effective_strength(inputs.attacker_strength, inputs.aggression);
    let defender_strength =
        defender_strength(inputs.defender_population, inputs.defense_bonus_percent);
    let victory = attacker_effective_strength > defender_strength;

    let loss_rate = attacker_loss_rate(inputs.aggression, victory);
    let attacker_casualties = loss_rate.apply(inputs.attacker_troops as i64).max(0) as u32;

    let defender_loss = if victory {
        military::DEFENDER_LOSS_PERCENT_ON_CAPTURE
    } else {
        military::DEFENDER_LOSS_PERCENT_ON_REPEL
    };
    let defender_casualties = Fixed::from_percent(defender_loss)
        .apply(inputs.defender_population as i64)
        .max(0) as u32;

    InvasionResult {
        attacker_effective_strength,
        defender_strength,
        victory,
        attacker_loss_rate: loss_rate,
        attacker_casualties: attacker_casualties.min(inputs.attacker_troops),
        defender_casualties: defender_casualties.min(inputs.defender_population),
    }
}

/// Resources seized with a planet, from its population before the assault.
pub fn capture_reward(population_before: u32) -> ResourceLedger {
    let pop = population_before as u64;
    ResourceLedger::new(
        pop * military::CAPTURE_CREDITS_PER_POP,
        pop * military::CAPTURE_MINERALS_PER_POP,
        pop * military::CAPTURE_FUEL_PER_POP,
        0,
        0,
    )
}

/// Split `casualties` across platoons in proportion to their troops.
///
/// Each platoon first loses the floor of its share; the remainder is taken one
/// troop at a time in platoon id order from platoons that still have troops.
pub fn distribute_casualties(platoons: &[(PlatoonId, u32)], casualties: u32) -> Vec<(PlatoonId, u32)> {
    let total: u64 = platoons.iter().map(|&(_, troops)| troops as u64).sum();
    if total == 0 {
        return platoons.iter().map(|&(id, _)| (id, 0)).collect();
    }
    let casualties = (casualties as u64).min(total);

    let mut losses: Vec<(PlatoonId, u32, u32)> = platoons
        .iter()
        .map(|&(id, troops)| (id, troops, (casualties * troops as u64 / total) as u32))
        .collect();
    losses.sort_by_key(|&(id, _, _)| id);

    let mut remainder = casualties - losses.iter().map(|&(_, _, l)| l as u64).sum::<u64>();
    while remainder > 0 {
        for (_, troops, lost) in losses.iter_mut() {
            if remainder == 0 {
                break;
            }
            if *lost < *troops {
                *lost += 1;
                remainder -= 1;
            }
        }
    }

    losses.into_iter().map(|(id, _, lost)| (id, lost)).collect()
}

/// A faction's invasion force over a planet, in craft then hold order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvasionForce {
    pub craft: Vec<CraftId>,
    pub platoons: Vec<(PlatoonId, u32)>,
    pub strength: u64,
}

impl InvasionForce {
    pub fn troops(&self) -> u32 {
        self.platoons.iter().map(|&(_, t)| t).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.platoons.is_empty()
    }
}

pub fn invasion_force(state: &GameState, faction: Faction, planet: PlanetId) -> InvasionForce {
    let mut force = InvasionForce::default();
    for craft in state
        .craft_at(planet)
        .filter(|c| c.owner == faction && c.kind.carries_troops() && !c.carried().is_empty())
    {
        force.craft.push(craft.id());
        for &platoon_id in craft.carried() {
            if let Some(platoon) = state.platoon(platoon_id) {
                force.platoons.push((platoon_id, platoon.troop_count()));
                force.strength += platoon.strength();
            }
        }
    }
    force
}

/// Defender strength bonus on `planet` from Active Orbital Defenses.
pub fn defense_bonus_percent(state: &GameState, rules: &RulesConfig, planet: PlanetId) -> u32 {
    defense::active_platforms(state, planet) as u32 * rules.orbital_defense_bonus_percent
}

fn gather_inputs(
    state: &GameState,
    rules: &RulesConfig,
    faction: Faction,
    planet_id: PlanetId,
    aggression: u8,
) -> Result<(InvasionForce, InvasionInputs), ActionError> {
    if aggression > military::MAX_AGGRESSION {
        return Err(ActionError::InvalidAggression(aggression));
    }
    let planet = state
        .planet(planet_id)
        .ok_or(ActionError::UnknownPlanet(planet_id))?;
    if planet.is_owned_by(faction) {
        return Err(ActionError::AlreadyOwned(planet_id));
    }

    let force = invasion_force(state, faction, planet_id);
    if force.is_empty() {
        return Err(ActionError::NoInvasionForce(planet_id));
    }
    if !space_combat::has_orbital_control(state, faction, planet_id) {
        return Err(ActionError::NoOrbitalControl(planet_id));
    }

    let inputs = InvasionInputs {
        attacker_strength: force.strength,
        attacker_troops: force.troops(),
        defender_population: planet.population,
        defense_bonus_percent: defense_bonus_percent(state, rules, planet_id),
        aggression,
    };
    Ok((force, inputs))
}

/// Estimate an invasion without changing anything.
pub fn preview_invasion(
    state: &GameState,
    rules: &RulesConfig,
    faction: Faction,
    planet_id: PlanetId,
    aggression: u8,
) -> Result<InvasionResult, ActionError> {
    let (_, inputs) = gather_inputs(state, rules, faction, planet_id, aggression)?;
    Ok(resolve_invasion(&inputs))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvasionReport {
    pub planet: PlanetId,
    pub attacker: Faction,
    /// Owner before the invasion; `None` for a neutral world.
    pub defender: Option<Faction>,
    pub aggression: u8,
    pub result: InvasionResult,
    /// Seized resources, zero unless the planet fell.
    pub reward: ResourceLedger,
    /// Attacking platoons wiped out.
    pub platoons_lost: Vec<PlatoonId>,
    /// Defending garrison platoons destroyed when the planet fell.
    pub garrison_destroyed: Vec<PlatoonId>,
    /// Defending craft destroyed in orbit when the planet fell.
    pub craft_destroyed: Vec<CraftId>,
}

/// Invade `planet_id` with every loaded Battle Cruiser `faction` has in orbit.
///
/// Validation happens up front; once the battle is resolved its casualties,
/// reward and ownership change are applied together.
#[instrument(skip_all, name = "invasion")]
pub fn invade(
    state: &mut GameState,
    rules: &RulesConfig,
    faction: Faction,
    planet_id: PlanetId,
    aggression: u8,
) -> Result<InvasionReport, ActionError> {
    let (force, inputs) = gather_inputs(state, rules, faction, planet_id, aggression)?;
    let result = resolve_invasion(&inputs);
    let defender = state.planet(planet_id).and_then(|p| p.owner());

    // Attacker casualties
    let mut platoons_lost = Vec::new();
    for (platoon_id, lost) in distribute_casualties(&force.platoons, result.attacker_casualties) {
        let Some(troops) = state.platoon(platoon_id).map(|p| p.troop_count()) else {
            continue;
        };
        let remaining = troops.saturating_sub(lost);
        if remaining == 0 {
            state.remove_platoon(platoon_id);
            platoons_lost.push(platoon_id);
        } else if let Some(platoon) = state.platoon_mut(platoon_id) {
            platoon.set_troops(remaining);
        }
    }

    // Defender casualties
    if let Some(planet) = state.planet_mut(planet_id) {
        planet.population = planet.population.saturating_sub(result.defender_casualties);
    }

    let mut reward = ResourceLedger::ZERO;
    let mut garrison_destroyed = Vec::new();
    let mut craft_destroyed = Vec::new();

    if result.victory {
        reward = capture_reward(inputs.defender_population);
        state.faction_mut(faction).ledger.deposit(&reward);

        garrison_destroyed = state
            .platoons_at(planet_id)
            .filter(|p| p.owner != faction)
            .map(|p| p.id())
            .collect();
        for &id in &garrison_destroyed {
            state.remove_platoon(id);
        }

        craft_destroyed = state
            .craft_at(planet_id)
            .filter(|c| c.owner != faction)
            .map(|c| c.id())
            .collect();
        for &craft_id in &craft_destroyed {
            let carried = state
                .craft_by_id(craft_id)
                .map(|c| c.carried().to_vec())
                .unwrap_or_default();
            for platoon_id in carried {
                state.remove_platoon(platoon_id);
            }
            state.remove_craft(craft_id);
        }

        if let Err(e) = state.set_planet_owner(planet_id, Some(faction)) {
            log::warn!("capture of planet {}: {}", planet_id, e);
        }
        if let Some(planet) = state.planet_mut(planet_id) {
            planet.morale.add(-rules.capture_morale_penalty);
        }

        // Survivors land as the new garrison
        let mut room = rules
            .max_platoons_per_planet
            .saturating_sub(state.platoon_count_at(planet_id));
        for &craft_id in &force.craft {
            let carried = state
                .craft_by_id(craft_id)
                .map(|c| c.carried().to_vec())
                .unwrap_or_default();
            for platoon_id in carried {
                if room == 0 {
                    break;
                }
                state.disembark(craft_id, platoon_id, planet_id);
                room -= 1;
            }
        }
    }

    log::info!(
        "{} invaded planet {} at aggression {}: {} ({} vs {}), {} attackers and {} defenders lost",
        faction,
        planet_id,
        aggression,
        if result.victory { "captured" } else { "repelled" },
        result.attacker_effective_strength,
        result.defender_strength,
        result.attacker_casualties,
        result.defender_casualties
    );

    Ok(InvasionReport {
        planet: planet_id,
        attacker: faction,
        defender,
        aggression,
        result,
        reward,
        platoons_lost,
        garrison_destroyed,
        craft_destroyed,
    })
}

#[cfg(test)]
#[path = "combat_tests.rs"]
mod tests;
