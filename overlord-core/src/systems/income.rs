//! Per-turn faction income.
//!
//! Income is computed for both factions from the same pre-tick snapshot and
//! only then applied, so neither faction's processing can observe the other's.
//! Each faction ledger receives its whole turn's income in a single deposit.

use crate::config::RulesConfig;
use crate::fixed::Fixed;
use crate::resources::{ResourceDelta, ResourceLedger};
use crate::state::{Faction, GameState, PlanetId};
use crate::systems::production::{morale_penalty_percent, planet_production};
use crate::systems::taxation::{estimate_tax_revenue, morale_drift};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One planet's contribution to its owner's income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetIncome {
    pub planet: PlanetId,
    pub tax: u64,
    pub production: ResourceLedger,
    /// Percent of income lost to low morale, if any.
    pub morale_penalty_percent: Option<u32>,
}

impl PlanetIncome {
    pub fn total(&self) -> ResourceLedger {
        self.production + ResourceLedger::credits(self.tax)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionIncome {
    pub faction: Faction,
    pub planets: Vec<PlanetIncome>,
    /// Sum over planets after the faction's income multiplier.
    pub total: ResourceLedger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomeWarning {
    NoPlanetsOwned {
        faction: Faction,
    },
    LowMorale {
        faction: Faction,
        planet: PlanetId,
        penalty_percent: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeReport {
    pub player: FactionIncome,
    pub ai: FactionIncome,
    pub warnings: Vec<IncomeWarning>,
}

impl IncomeReport {
    pub fn delta(&self, faction: Faction) -> ResourceDelta {
        match faction {
            Faction::Player => self.player.total.into(),
            Faction::Ai => self.ai.total.into(),
        }
    }
}

/// What `faction` would earn if an Income tick ran now.
pub fn calculate_faction_income(
    state: &GameState,
    rules: &RulesConfig,
    faction: Faction,
) -> FactionIncome {
    let mut planets = Vec::new();
    let mut sum = ResourceLedger::ZERO;

    for &planet_id in state.owned_planets(faction) {
        let Some(planet) = state.planet(planet_id) else {
            continue;
        };
        let income = PlanetIncome {
            planet: planet_id,
            tax: estimate_tax_revenue(planet, rules),
            production: planet_production(state, planet, rules),
            morale_penalty_percent: morale_penalty_percent(planet, rules),
        };
        sum += income.total();
        planets.push(income);
    }

    let multiplier = state.faction(faction).income_multiplier_percent;
    let total = if multiplier == 100 {
        sum
    } else {
        sum.scaled(Fixed::from_percent(multiplier as i64))
    };

    FactionIncome {
        faction,
        planets,
        total,
    }
}

/// Credit both factions' income, stock each planet's output and apply tax
/// morale drift.
#[instrument(skip_all, name = "income")]
pub fn run_income_tick(state: &mut GameState, rules: &RulesConfig) -> IncomeReport {
    let player = calculate_faction_income(state, rules, Faction::Player);
    let ai = calculate_faction_income(state, rules, Faction::Ai);

    let mut warnings = Vec::new();
    for income in [&player, &ai] {
        if income.planets.is_empty() {
            if income.faction == Faction::Player {
                log::warn!("Player owns no planets and receives no income");
            }
            warnings.push(IncomeWarning::NoPlanetsOwned {
                faction: income.faction,
            });
        }
        for planet in &income.planets {
            if let Some(penalty_percent) = planet.morale_penalty_percent {
                warnings.push(IncomeWarning::LowMorale {
                    faction: income.faction,
                    planet: planet.planet,
                    penalty_percent,
                });
            }
        }
    }

    for income in [&player, &ai] {
        state.faction_mut(income.faction).ledger.deposit(&income.total);
        for planet_income in &income.planets {
            if let Some(planet) = state.planet_mut(planet_income.planet) {
                planet.stockpile.deposit(&planet_income.production);
                let drift = morale_drift(planet.tax_rate.get());
                planet.morale.add(drift);
            }
        }
        log::debug!("{} income: {}", income.faction, income.total);
    }

    IncomeReport {
        player,
        ai,
        warnings,
    }
}
