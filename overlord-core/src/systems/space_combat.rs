//! Fleet battles in orbit.
//!
//! Whenever both factions have armed craft over the same planet, a battle is
//! fought there at the start of the Combat phase. The planet's owner defends,
//! helped by its Active Orbital Defense platforms; over a neutral world the
//! AI defends. Ties go to the attacker.
//!
//! Only the losing side is hurt: each of its armed craft loses
//! `floor((winner / loser - 1) × 50)` hull points and is destroyed at zero,
//! together with any platoons in its hold.

use crate::config::RulesConfig;
use crate::defines::space;
use crate::state::{Craft, CraftId, Faction, GameState, PlanetId, PlatoonId};
use crate::systems::defense;
use crate::units::{CraftType, WeaponLevel};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Base strength, raised by the weapon tier for Battle Cruisers, scaled by
/// remaining hull.
pub fn craft_strength(kind: CraftType, weapon: WeaponLevel, health: u32) -> u64 {
    let mut base = kind.space_strength();
    if kind == CraftType::BattleCruiser {
        base = base * weapon.space_modifier_percent() / 100;
    }
    base * health.min(space::CRAFT_MAX_HEALTH) as u64 / space::CRAFT_MAX_HEALTH as u64
}

fn armed_in_orbit(
    state: &GameState,
    faction: Faction,
    planet: PlanetId,
) -> impl Iterator<Item = &Craft> {
    state
        .craft_at(planet)
        .filter(move |c| c.owner == faction && c.kind.is_armed())
}

/// Combined strength of `faction`'s armed craft over `planet`, before any
/// platform bonus.
pub fn fleet_strength(state: &GameState, faction: Faction, planet: PlanetId) -> u64 {
    let weapon = state.faction(faction).research.level;
    armed_in_orbit(state, faction, planet)
        .map(|c| craft_strength(c.kind, weapon, c.health()))
        .sum()
}

/// True when no enemy armed craft are over `planet`.
pub fn has_orbital_control(state: &GameState, faction: Faction, planet: PlanetId) -> bool {
    armed_in_orbit(state, faction.opponent(), planet)
        .next()
        .is_none()
}

/// Planets with armed craft of both factions in orbit, in id order.
pub fn contested_planets(state: &GameState) -> Vec<PlanetId> {
    let mut planets: Vec<PlanetId> = state
        .planets()
        .iter()
        .map(|p| p.id())
        .filter(|&id| {
            Faction::BOTH
                .iter()
                .all(|&f| armed_in_orbit(state, f, id).next().is_some())
        })
        .collect();
    planets.sort_unstable();
    planets
}

/// `(attacker, defender)` for a battle over `planet`.
pub fn sides(state: &GameState, planet: PlanetId) -> (Faction, Faction) {
    match state.planet(planet).and_then(|p| p.owner()) {
        Some(owner) => (owner.opponent(), owner),
        None => (Faction::Player, Faction::Ai),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngagementResult {
    pub attacker_won: bool,
    /// Hull damage dealt to each craft on the losing side.
    pub damage_per_craft: u32,
}

/// Resolve an engagement between two fleet strengths.
pub fn resolve_engagement(attacker_strength: u64, defender_strength: u64) -> EngagementResult {
    let attacker_won = attacker_strength >= defender_strength;
    let (winner, loser) = if attacker_won {
        (attacker_strength, defender_strength)
    } else {
        (defender_strength, attacker_strength)
    };
    let loser = loser.max(1);
    let damage = winner.saturating_sub(loser) * space::DAMAGE_PER_RATIO / loser;
    EngagementResult {
        attacker_won,
        damage_per_craft: damage.min(u32::MAX as u64) as u32,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceBattleReport {
    pub planet: PlanetId,
    pub attacker: Faction,
    pub defender: Faction,
    pub attacker_strength: u64,
    /// Includes the platform bonus when the planet's owner defends.
    pub defender_strength: u64,
    pub result: EngagementResult,
    /// Losing craft that survived with hull damage.
    pub damaged: Vec<CraftId>,
    pub destroyed: Vec<CraftId>,
    /// Platoons lost aboard destroyed craft.
    pub platoons_lost: Vec<PlatoonId>,
}

impl SpaceBattleReport {
    pub fn winner(&self) -> Faction {
        if self.result.attacker_won {
            self.attacker
        } else {
            self.defender
        }
    }
}

/// Fight the battle over `planet`. `None` unless both sides have armed craft
/// there.
#[instrument(skip_all, name = "space_battle")]
pub fn resolve_space_battle(
    state: &mut GameState,
    rules: &RulesConfig,
    planet: PlanetId,
) -> Option<SpaceBattleReport> {
    let (attacker, defender) = sides(state, planet);
    let attacker_craft: Vec<CraftId> = armed_in_orbit(state, attacker, planet)
        .map(|c| c.id())
        .collect();
    let defender_craft: Vec<CraftId> = armed_in_orbit(state, defender, planet)
        .map(|c| c.id())
        .collect();
    if attacker_craft.is_empty() || defender_craft.is_empty() {
        return None;
    }

    let attacker_strength = fleet_strength(state, attacker, planet);
    let mut defender_strength = fleet_strength(state, defender, planet);
    if state.planet(planet).is_some_and(|p| p.is_owned_by(defender)) {
        defender_strength =
            defender_strength * defense::fleet_defense_percent(state, rules, planet) / 100;
    }
    let result = resolve_engagement(attacker_strength, defender_strength);

    let losers = if result.attacker_won {
        defender_craft
    } else {
        attacker_craft
    };
    let mut damaged = Vec::new();
    let mut destroyed = Vec::new();
    let mut platoons_lost = Vec::new();
    if result.damage_per_craft > 0 {
        for craft_id in losers {
            let Some(craft) = state.craft_mut(craft_id) else {
                continue;
            };
            craft.health = craft.health.saturating_sub(result.damage_per_craft);
            if craft.health > 0 {
                damaged.push(craft_id);
                continue;
            }
            let carried = craft.carried().to_vec();
            for platoon_id in carried {
                state.remove_platoon(platoon_id);
                platoons_lost.push(platoon_id);
            }
            state.remove_craft(craft_id);
            destroyed.push(craft_id);
        }
    }

    let report = SpaceBattleReport {
        planet,
        attacker,
        defender,
        attacker_strength,
        defender_strength,
        result,
        damaged,
        destroyed,
        platoons_lost,
    };
    log::info!(
        "Space battle over planet {}: {} wins ({} vs {}), {} craft destroyed",
        planet,
        report.winner(),
        attacker_strength,
        defender_strength,
        report.destroyed.len()
    );
    Some(report)
}

/// Fight every battle due at the start of the Combat phase.
pub fn resolve_space_battles(state: &mut GameState, rules: &RulesConfig) -> Vec<SpaceBattleReport> {
    contested_planets(state)
        .into_iter()
        .filter_map(|planet| resolve_space_battle(state, rules, planet))
        .collect()
}

#[cfg(test)]
#[path = "space_combat_tests.rs"]
mod tests;
