//! Orbital Defense platforms.
//!
//! A planet holds at most [`space::MAX_ORBITAL_DEFENSES`] platforms. Each
//! Active one strengthens the owner's fleet when it defends the planet's
//! orbit, and optionally the ground defenders (see
//! [`crate::systems::combat::defense_bonus_percent`]).

use crate::buildings::BuildingType;
use crate::config::RulesConfig;
use crate::defines::space;
use crate::state::{GameState, PlanetId};
use crate::step::ActionError;

/// Platforms on `planet` in any state, including one under construction.
pub fn platform_count(state: &GameState, planet: PlanetId) -> usize {
    state.planet(planet).map_or(0, |p| {
        p.structures
            .iter()
            .filter(|s| s.building == BuildingType::OrbitalDefense)
            .count()
    })
}

pub fn active_platforms(state: &GameState, planet: PlanetId) -> usize {
    state
        .planet(planet)
        .map_or(0, |p| p.count_active(BuildingType::OrbitalDefense))
}

pub fn check_platform_limit(state: &GameState, planet: PlanetId) -> Result<(), ActionError> {
    if platform_count(state, planet) >= space::MAX_ORBITAL_DEFENSES {
        return Err(ActionError::CapacityExceeded {
            what: "Orbital Defense",
            limit: space::MAX_ORBITAL_DEFENSES,
        });
    }
    Ok(())
}

/// Multiplier, in percent, on the owner's fleet strength over `planet`.
pub fn fleet_defense_percent(state: &GameState, rules: &RulesConfig, planet: PlanetId) -> u64 {
    100 + active_platforms(state, planet) as u64 * rules.platform_space_bonus_percent as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildings::Structure;
    use crate::state::Faction;
    use crate::testing::GameStateBuilder;

    #[test]
    fn test_only_active_platforms_count() {
        let state = GameStateBuilder::new()
            .with_planet(1, Some(Faction::Player), 1000)
            .with_structure(1, Structure::active(BuildingType::OrbitalDefense))
            .with_structure(1, Structure::under_construction(BuildingType::OrbitalDefense))
            .build();
        let rules = RulesConfig::default();

        assert_eq!(platform_count(&state, 1), 2);
        assert_eq!(active_platforms(&state, 1), 1);
        assert_eq!(fleet_defense_percent(&state, &rules, 1), 120);
        assert_eq!(fleet_defense_percent(&state, &rules, 9), 100);
    }

    #[test]
    fn test_platform_limit() {
        let mut state = GameStateBuilder::new()
            .with_planet(1, Some(Faction::Player), 1000)
            .with_structure(1, Structure::active(BuildingType::OrbitalDefense))
            .build();
        assert!(check_platform_limit(&state, 1).is_ok());

        state
            .planet_mut(1)
            .unwrap()
            .structures
            .push(Structure::active(BuildingType::OrbitalDefense));
        assert_eq!(
            check_platform_limit(&state, 1),
            Err(ActionError::CapacityExceeded {
                what: "Orbital Defense",
                limit: 2
            })
        );
    }
}
