//! Tax revenue, tax-rate controls and tax-driven morale drift.

use crate::config::RulesConfig;
use crate::defines::economy;
use crate::resources::Resource;
use crate::state::{Faction, GameState, Planet, PlanetId};
use crate::step::ActionError;
use crate::systems::production::morale_factor;
use serde::{Deserialize, Serialize};

/// Player-facing band a tax rate falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxCategory {
    NoTaxes,
    Low,
    Moderate,
    High,
}

impl TaxCategory {
    pub fn from_rate(rate: i32) -> Self {
        if rate <= 0 {
            TaxCategory::NoTaxes
        } else if rate < economy::LOW_TAX_THRESHOLD {
            TaxCategory::Low
        } else if rate <= economy::HIGH_TAX_THRESHOLD {
            TaxCategory::Moderate
        } else {
            TaxCategory::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaxCategory::NoTaxes => "No Taxes",
            TaxCategory::Low => "Low",
            TaxCategory::Moderate => "Moderate",
            TaxCategory::High => "High",
        }
    }
}

impl std::fmt::Display for TaxCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Credits raised by a planet this turn before any morale penalty.
///
/// `floor(population / 10 × rate%)`, scaled by the planet's credit multiplier.
pub fn tax_revenue(planet: &Planet) -> u64 {
    let rate = planet.tax_rate.get().max(0) as u64;
    let base = planet.population as u64 * rate / (economy::TAX_POPULATION_DIVISOR * 100);
    planet
        .planet_type
        .multiplier(Resource::Credits)
        .apply(base as i64)
        .max(0) as u64
}

/// Credits the planet will actually yield next Income tick, morale penalty included.
pub fn estimate_tax_revenue(planet: &Planet, rules: &RulesConfig) -> u64 {
    let revenue = tax_revenue(planet);
    match morale_factor(planet, rules) {
        Some(factor) => factor.apply(revenue as i64).max(0) as u64,
        None => revenue,
    }
}

/// Per-turn morale change caused by a tax rate.
pub fn morale_drift(tax_rate: i32) -> i32 {
    if tax_rate > economy::HIGH_TAX_THRESHOLD {
        economy::HIGH_TAX_MORALE_CHANGE
    } else if tax_rate < economy::LOW_TAX_THRESHOLD {
        economy::LOW_TAX_MORALE_CHANGE
    } else {
        0
    }
}

pub fn set_tax_rate(
    state: &mut GameState,
    faction: Faction,
    planet_id: PlanetId,
    rate: i32,
) -> Result<TaxCategory, ActionError> {
    if !(0..=100).contains(&rate) {
        return Err(ActionError::InvalidTaxRate(rate));
    }
    let planet = state
        .planet_mut(planet_id)
        .ok_or(ActionError::UnknownPlanet(planet_id))?;
    if !planet.is_owned_by(faction) {
        return Err(ActionError::NotOwner {
            faction,
            entity: format!("planet {planet_id}"),
        });
    }

    planet.tax_rate.set(rate);
    let category = TaxCategory::from_rate(rate);
    log::debug!("{} set tax on {} to {}% ({})", faction, planet.name, rate, category);
    Ok(category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounded::{Morale, TaxRate};
    use crate::state::PlanetType;
    use crate::testing::GameStateBuilder;

    #[test]
    fn test_reference_planet_revenue() {
        let state = GameStateBuilder::new()
            .with_planet(1, Some(Faction::Player), 1000)
            .build();
        // pop 1000, morale 80, tax 50% → floor(1000 / 10 × 0.5)
        assert_eq!(tax_revenue(state.planet(1).unwrap()), 50);
        assert_eq!(
            estimate_tax_revenue(state.planet(1).unwrap(), &RulesConfig::default()),
            50
        );
    }

    #[test]
    fn test_revenue_floors() {
        let mut planet = Planet::new(1, "A", PlanetType::Desert);
        planet.population = 999;
        planet.tax_rate = TaxRate::new(33);
        // 999 × 33 / 1000 = 32.967
        assert_eq!(tax_revenue(&planet), 32);
    }

    #[test]
    fn test_metropolis_doubles_credits() {
        let mut planet = Planet::new(1, "Starbase", PlanetType::Metropolis);
        planet.population = 1000;
        planet.tax_rate = TaxRate::new(50);
        assert_eq!(tax_revenue(&planet), 100);
    }

    #[test]
    fn test_low_morale_scales_estimate() {
        let mut planet = Planet::new(1, "A", PlanetType::Tropical);
        planet.population = 1000;
        planet.tax_rate = TaxRate::new(50);
        planet.morale = Morale::new(40);
        assert_eq!(estimate_tax_revenue(&planet, &RulesConfig::default()), 20);
    }

    #[test]
    fn test_morale_drift_thresholds() {
        assert_eq!(morale_drift(76), -5);
        assert_eq!(morale_drift(75), 0);
        assert_eq!(morale_drift(25), 0);
        assert_eq!(morale_drift(24), 2);
    }

    #[test]
    fn test_categories() {
        assert_eq!(TaxCategory::from_rate(0), TaxCategory::NoTaxes);
        assert_eq!(TaxCategory::from_rate(10), TaxCategory::Low);
        assert_eq!(TaxCategory::from_rate(75), TaxCategory::Moderate);
        assert_eq!(TaxCategory::from_rate(90).label(), "High");
    }

    #[test]
    fn test_set_tax_rate_validation() {
        let mut state = GameStateBuilder::new()
            .with_planet(1, Some(Faction::Player), 1000)
            .with_planet(2, Some(Faction::Ai), 1000)
            .build();

        assert_eq!(
            set_tax_rate(&mut state, Faction::Player, 1, 101),
            Err(ActionError::InvalidTaxRate(101))
        );
        assert!(matches!(
            set_tax_rate(&mut state, Faction::Player, 2, 10),
            Err(ActionError::NotOwner { .. })
        ));
        assert_eq!(
            set_tax_rate(&mut state, Faction::Player, 1, 80),
            Ok(TaxCategory::High)
        );
        assert_eq!(state.planet(1).unwrap().tax_rate.get(), 80);
    }
}
