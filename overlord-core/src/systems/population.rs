//! Population growth and food consumption on owned planets.

use crate::config::RulesConfig;
use crate::defines::population;
use crate::fixed::Fixed;
use crate::state::{GameState, PlanetId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoodShortage {
    /// Some food, but less than the population needs.
    Rationing,
    /// No food at all.
    Starvation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationChange {
    pub planet: PlanetId,
    pub growth: u32,
    pub food_eaten: u64,
    pub shortage: Option<FoodShortage>,
}

/// Food a population eats per turn.
pub fn food_required(population: u32) -> u64 {
    Fixed::from_percent(population::FOOD_PERCENT_PER_PERSON).apply(population as i64) as u64
}

/// Growth a planet would see this turn if it has food.
pub fn estimated_growth(population: u32, morale: Fixed) -> u32 {
    let rate = morale * Fixed::from_percent(population::GROWTH_PERCENT_AT_FULL_MORALE);
    rate.apply(population as i64).max(0) as u32
}

/// Grow, feed and apply food morale effects for every owned planet.
///
/// Growth happens only while the planet's stockpile holds food; the grown
/// population then eats. Does nothing when population growth is disabled.
#[instrument(skip_all, name = "population")]
pub fn run_population_tick(state: &mut GameState, rules: &RulesConfig) -> Vec<PopulationChange> {
    if !rules.population_growth {
        return Vec::new();
    }

    let owned: Vec<PlanetId> = state
        .planets()
        .iter()
        .filter(|p| p.owner().is_some() && p.population > 0)
        .map(|p| p.id())
        .collect();

    let mut changes = Vec::with_capacity(owned.len());
    for planet_id in owned {
        let Some(planet) = state.planet_mut(planet_id) else {
            continue;
        };

        let before = planet.population;
        if planet.stockpile.food > 0 && planet.morale.get() > 0 {
            let grown = before.saturating_add(estimated_growth(before, planet.morale.ratio()));
            planet.population = grown.min(population::MAX_POPULATION).max(before);
        }
        let growth = planet.population - before;

        let required = food_required(planet.population);
        let available = planet.stockpile.food;
        let food_eaten = required.min(available);
        planet.stockpile.food -= food_eaten;

        let shortage = if available >= required {
            None
        } else if available > 0 {
            planet.morale.add(population::RATIONING_MORALE_CHANGE);
            Some(FoodShortage::Rationing)
        } else {
            planet.morale.add(population::STARVATION_MORALE_CHANGE);
            Some(FoodShortage::Starvation)
        };

        if let Some(kind) = shortage {
            log::debug!("{} is short of food: {:?}", planet.name, kind);
        }

        changes.push(PopulationChange {
            planet: planet_id,
            growth,
            food_eaten,
            shortage,
        });
    }
    changes
}
