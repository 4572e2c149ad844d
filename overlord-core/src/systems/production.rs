//! Building and satellite output of a single planet.

use crate::config::RulesConfig;
use crate::defines::economy;
use crate::fixed::Fixed;
use crate::resources::{Resource, ResourceLedger};
use crate::state::{GameState, Planet};
use crate::units::CraftType;

/// Output scale for a low-morale planet, or `None` at or above the threshold.
pub fn morale_factor(planet: &Planet, rules: &RulesConfig) -> Option<Fixed> {
    (planet.morale.get() < rules.morale_penalty_threshold).then(|| planet.morale.ratio())
}

/// Income reduction in percent caused by low morale.
pub fn morale_penalty_percent(planet: &Planet, rules: &RulesConfig) -> Option<u32> {
    morale_factor(planet, rules).map(|_| (100 - planet.morale.get()).max(0) as u32)
}

/// Everything the planet's Active structures and stationed Solar Satellites
/// produce this turn, after planet multipliers and the morale penalty.
pub fn planet_production(state: &GameState, planet: &Planet, rules: &RulesConfig) -> ResourceLedger {
    let mut base = ResourceLedger::ZERO;
    for structure in planet.structures.iter().filter(|s| s.is_active()) {
        base += structure.building.base_production();
    }

    if let Some(owner) = planet.owner() {
        let satellites = state
            .craft_at(planet.id())
            .filter(|c| c.owner == owner && c.kind == CraftType::SolarSatellite)
            .count() as u64;
        base.energy += satellites * economy::SOLAR_SATELLITE_ENERGY;
    }

    let mut output = ResourceLedger::ZERO;
    for resource in Resource::ALL {
        let amount = planet
            .planet_type
            .multiplier(resource)
            .apply(base.get(resource) as i64)
            .max(0) as u64;
        output.set(resource, amount);
    }

    match morale_factor(planet, rules) {
        Some(factor) => output.scaled(factor),
        None => output,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounded::Morale;
    use crate::buildings::{BuildingType, Structure};
    use crate::state::{Faction, PlanetType};
    use crate::testing::GameStateBuilder;

    #[test]
    fn test_volcanic_mining_multipliers() {
        let state = GameStateBuilder::new()
            .with_planet(1, Some(Faction::Player), 1000)
            .configure_planet(1, |p| p.planet_type = PlanetType::Volcanic)
            .with_structure(1, Structure::active(BuildingType::MiningStation))
            .build();

        let out = planet_production(&state, state.planet(1).unwrap(), &RulesConfig::default());
        assert_eq!(out, ResourceLedger::new(0, 250, 90, 0, 0));
    }

    #[test]
    fn test_under_construction_produces_nothing() {
        let state = GameStateBuilder::new()
            .with_planet(1, Some(Faction::Player), 1000)
            .with_structure(
                1,
                Structure::under_construction(BuildingType::HorticulturalStation),
            )
            .build();

        let out = planet_production(&state, state.planet(1).unwrap(), &RulesConfig::default());
        assert!(out.is_zero());
    }

    #[test]
    fn test_solar_satellite_energy() {
        let state = GameStateBuilder::new()
            .with_planet(1, Some(Faction::Player), 1000)
            .configure_planet(1, |p| p.planet_type = PlanetType::Desert)
            .with_craft(1, Faction::Player, CraftType::SolarSatellite)
            .build();

        let out = planet_production(&state, state.planet(1).unwrap(), &RulesConfig::default());
        assert_eq!(out.energy, 160);
    }

    #[test]
    fn test_morale_penalty_scales_output() {
        let state = GameStateBuilder::new()
            .with_planet(1, Some(Faction::Player), 1000)
            .configure_planet(1, |p| p.morale = Morale::new(30))
            .with_structure(1, Structure::active(BuildingType::HorticulturalStation))
            .build();
        let planet = state.planet(1).unwrap();
        let rules = RulesConfig::default();

        // Tropical food ×2 then ×0.30
        assert_eq!(planet_production(&state, planet, &rules).food, 60);
        assert_eq!(morale_penalty_percent(planet, &rules), Some(70));
    }

    #[test]
    fn test_no_penalty_at_threshold() {
        let state = GameStateBuilder::new()
            .with_planet(1, Some(Faction::Player), 1000)
            .configure_planet(1, |p| p.morale = Morale::new(50))
            .build();
        assert_eq!(
            morale_penalty_percent(state.planet(1).unwrap(), &RulesConfig::default()),
            None
        );
    }
}
