//! Commissioning, decommissioning and training of ground platoons.

use crate::config::RulesConfig;
use crate::defines::military;
use crate::resources::ResourceLedger;
use crate::state::{Faction, GameState, PlanetId, PlatoonId, PlatoonLocation};
use crate::step::ActionError;
use crate::units::{platoon_cost, EquipmentLevel, WeaponLevel};
use tracing::instrument;

/// Raise a platoon on an owned planet, paying credits and drafting population.
/// The weapon must already be researched.
pub fn commission_platoon(
    state: &mut GameState,
    rules: &RulesConfig,
    faction: Faction,
    planet_id: PlanetId,
    troops: u32,
    equipment: EquipmentLevel,
    weapon: WeaponLevel,
) -> Result<PlatoonId, ActionError> {
    if !(military::MIN_TROOPS..=military::MAX_TROOPS).contains(&troops) {
        return Err(ActionError::InvalidTroopCount(troops));
    }

    if !state.faction(faction).research.allows(weapon) {
        return Err(ActionError::WeaponNotResearched { weapon });
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
    if state.platoon_count_at(planet_id) >= rules.max_platoons_per_planet {
        return Err(ActionError::CapacityExceeded {
            what: "Platoon",
            limit: rules.max_platoons_per_planet,
        });
    }

    let cost = ResourceLedger::credits(platoon_cost(equipment, weapon));
    if let Some(err) = state.faction(faction).ledger.shortfall(&cost) {
        return Err(err.into());
    }
    if planet.population < troops {
        return Err(ActionError::InsufficientPopulation {
            required: troops,
            available: planet.population,
        });
    }

    state.faction_mut(faction).ledger.spend(&cost)?;
    if let Some(planet) = state.planet_mut(planet_id) {
        planet.population -= troops;
    }
    let id = state.spawn_platoon(faction, planet_id, troops, equipment, weapon);

    log::info!(
        "{} commissioned platoon {} ({} troops, {:?}/{:?}) on planet {}",
        faction,
        id,
        troops,
        equipment,
        weapon,
        planet_id
    );
    Ok(id)
}

/// Disband a platoon, returning its troops to its home planet.
///
/// An unknown id is not an error: nothing happens and `None` is returned.
pub fn decommission_platoon(
    state: &mut GameState,
    faction: Faction,
    platoon_id: PlatoonId,
) -> Result<Option<u32>, ActionError> {
    let Some(platoon) = state.platoon(platoon_id) else {
        log::debug!("decommission of unknown platoon {} ignored", platoon_id);
        return Ok(None);
    };
    if platoon.owner != faction {
        return Err(ActionError::NotOwner {
            faction,
            entity: format!("platoon {platoon_id}"),
        });
    }

    let home = platoon.home_planet;
    let troops = platoon.troop_count();
    state.remove_platoon(platoon_id);
    if let Some(planet) = state.planet_mut(home) {
        planet.population = planet.population.saturating_add(troops);
    }

    log::debug!(
        "{} decommissioned platoon {}, {} troops back to planet {}",
        faction,
        platoon_id,
        troops,
        home
    );
    Ok(Some(troops))
}

/// Drill every platoon garrisoned on a planet its faction owns.
///
/// Returns how many platoons gained training.
#[instrument(skip_all, name = "training")]
pub fn run_training_tick(state: &mut GameState, rules: &RulesConfig) -> usize {
    let drilling: Vec<PlatoonId> = state
        .platoons()
        .iter()
        .filter(|p| !p.training().is_max())
        .filter(|p| match p.location() {
            PlatoonLocation::Planet(planet) => state
                .planet(planet)
                .is_some_and(|pl| pl.is_owned_by(p.owner)),
            PlatoonLocation::Craft(_) => false,
        })
        .map(|p| p.id())
        .collect();

    for &id in &drilling {
        if let Some(platoon) = state.platoon_mut(id) {
            let next = platoon.training().get() + rules.training_per_turn;
            platoon.set_training(next);
        }
    }
    drilling.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Resource;
    use crate::testing::GameStateBuilder;
    use crate::units::CraftType;

    fn garrison_state() -> GameState {
        GameStateBuilder::new()
            .with_planet(1, Some(Faction::Player), 1000)
            .with_planet(2, Some(Faction::Ai), 1000)
            .with_credits(Faction::Player, 100_000)
            .build()
    }

    #[test]
    fn test_commission_costs_kit_and_population() {
        let mut state = garrison_state();
        let rules = RulesConfig::default();

        let id = commission_platoon(
            &mut state,
            &rules,
            Faction::Player,
            1,
            100,
            EquipmentLevel::Basic,
            WeaponLevel::Rifle,
        )
        .unwrap();

        assert_eq!(state.faction(Faction::Player).ledger.credits, 100_000 - 8000);
        assert_eq!(state.planet(1).unwrap().population, 900);
        let platoon = state.platoon(id).unwrap();
        assert_eq!(platoon.troop_count(), 100);
        assert_eq!(platoon.location(), PlatoonLocation::Planet(1));
        assert_eq!(platoon.strength(), 50);
    }

    #[test]
    fn test_commission_validation() {
        let mut state = garrison_state();
        let rules = RulesConfig::default();
        let kit = (EquipmentLevel::Basic, WeaponLevel::Rifle);

        assert_eq!(
            commission_platoon(&mut state, &rules, Faction::Player, 1, 0, kit.0, kit.1),
            Err(ActionError::InvalidTroopCount(0))
        );
        assert_eq!(
            commission_platoon(&mut state, &rules, Faction::Player, 1, 201, kit.0, kit.1),
            Err(ActionError::InvalidTroopCount(201))
        );
        assert_eq!(
            commission_platoon(&mut state, &rules, Faction::Player, 9, 10, kit.0, kit.1),
            Err(ActionError::UnknownPlanet(9))
        );
        assert!(matches!(
            commission_platoon(&mut state, &rules, Faction::Player, 2, 10, kit.0, kit.1),
            Err(ActionError::NotOwner { .. })
        ));
        assert!(state.platoons().is_empty());
    }

    #[test]
    fn test_weapon_must_be_researched() {
        let mut state = garrison_state();
        let rules = RulesConfig::default();

        assert_eq!(
            commission_platoon(
                &mut state,
                &rules,
                Faction::Player,
                1,
                10,
                EquipmentLevel::Basic,
                WeaponLevel::AssaultRifle,
            ),
            Err(ActionError::WeaponNotResearched {
                weapon: WeaponLevel::AssaultRifle
            })
        );
        assert_eq!(state.faction(Faction::Player).ledger.credits, 100_000);

        state.faction_mut(Faction::Player).research.level = WeaponLevel::AssaultRifle;
        assert!(commission_platoon(
            &mut state,
            &rules,
            Faction::Player,
            1,
            10,
            EquipmentLevel::Basic,
            WeaponLevel::AssaultRifle,
        )
        .is_ok());
    }

    #[test]
    fn test_insufficient_credits_message() {
        let mut state = garrison_state();
        state.faction_mut(Faction::Player).ledger.credits = 3000;

        let err = commission_platoon(
            &mut state,
            &RulesConfig::default(),
            Faction::Player,
            1,
            10,
            EquipmentLevel::Basic,
            WeaponLevel::Rifle,
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "Insufficient Credits. Need 8000 have 3000");
        assert_eq!(state.planet(1).unwrap().population, 1000);
    }

    #[test]
    fn test_insufficient_population() {
        let mut state = garrison_state();
        state.planet_mut(1).unwrap().population = 40;

        let err = commission_platoon(
            &mut state,
            &RulesConfig::default(),
            Faction::Player,
            1,
            50,
            EquipmentLevel::Civilian,
            WeaponLevel::Pistol,
        )
        .unwrap_err();

        assert_eq!(
            err,
            ActionError::InsufficientPopulation {
                required: 50,
                available: 40
            }
        );
        assert_eq!(state.faction(Faction::Player).ledger.credits, 100_000);
    }

    #[test]
    fn test_garrison_capacity() {
        let mut state = garrison_state();
        let rules = RulesConfig {
            max_platoons_per_planet: 2,
            ..Default::default()
        };
        for _ in 0..2 {
            commission_platoon(
                &mut state,
                &rules,
                Faction::Player,
                1,
                10,
                EquipmentLevel::Civilian,
                WeaponLevel::Pistol,
            )
            .unwrap();
        }

        assert_eq!(
            commission_platoon(
                &mut state,
                &rules,
                Faction::Player,
                1,
                10,
                EquipmentLevel::Civilian,
                WeaponLevel::Pistol
            ),
            Err(ActionError::CapacityExceeded {
                what: "Platoon",
                limit: 2
            })
        );
    }

    #[test]
    fn test_decommission_returns_troops_home() {
        let mut state = garrison_state();
        let id = commission_platoon(
            &mut state,
            &RulesConfig::default(),
            Faction::Player,
            1,
            75,
            EquipmentLevel::Basic,
            WeaponLevel::Pistol,
        )
        .unwrap();

        assert_eq!(decommission_platoon(&mut state, Faction::Player, id), Ok(Some(75)));
        assert_eq!(state.planet(1).unwrap().population, 1000);
        assert!(state.platoon(id).is_none());
    }

    #[test]
    fn test_decommission_unknown_is_silent() {
        let mut state = garrison_state();
        let before = state.checksum();
        assert_eq!(decommission_platoon(&mut state, Faction::Player, 42), Ok(None));
        assert_eq!(state.checksum(), before);
    }

    #[test]
    fn test_decommission_foreign_platoon_rejected() {
        let mut state = GameStateBuilder::new()
            .with_planet(2, Some(Faction::Ai), 1000)
            .with_platoon(2, Faction::Ai, 30)
            .build();
        let id = state.platoons()[0].id();

        assert!(matches!(
            decommission_platoon(&mut state, Faction::Player, id),
            Err(ActionError::NotOwner { .. })
        ));
    }

    #[test]
    fn test_training_only_on_own_soil() {
        let mut state = GameStateBuilder::new()
            .with_planet(1, Some(Faction::Player), 1000)
            .with_planet(2, Some(Faction::Ai), 1000)
            .with_platoon(1, Faction::Player, 100)
            .with_platoon(1, Faction::Player, 100)
            .with_craft(1, Faction::Player, CraftType::BattleCruiser)
            .embarked(1, 2)
            .with_platoon_kit(
                1,
                Faction::Player,
                100,
                EquipmentLevel::Basic,
                WeaponLevel::Rifle,
                100,
            )
            .build();

        let trained = run_training_tick(&mut state, &RulesConfig::default());

        assert_eq!(trained, 1);
        assert_eq!(state.platoon(1).unwrap().training().get(), 10);
        assert_eq!(state.platoon(1).unwrap().strength(), 55);
        assert_eq!(state.platoon(2).unwrap().training().get(), 0);
        assert_eq!(state.platoon(3).unwrap().training().get(), 100);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Commission(u32),
            Decommission(usize),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (1..=200u32).prop_map(Op::Commission),
                (0..8usize).prop_map(Op::Decommission),
            ]
        }

        proptest! {
            /// Troops move between population and platoons without loss
            #[test]
            fn population_is_conserved(ops in prop::collection::vec(op(), 1..30)) {
                let mut state = GameStateBuilder::new()
                    .with_planet(1, Some(Faction::Player), 5000)
                    .with_credits(Faction::Player, 10_000_000)
                    .build();
                let rules = RulesConfig::default();
                let before = state.planet(1).unwrap().population;
                let mut commissioned: u64 = 0;
                let mut returned: u64 = 0;

                for op in ops {
                    match op {
                        Op::Commission(troops) => {
                            if commission_platoon(
                                &mut state, &rules, Faction::Player, 1, troops,
                                EquipmentLevel::Civilian, WeaponLevel::Pistol,
                            ).is_ok() {
                                commissioned += troops as u64;
                            }
                        }
                        Op::Decommission(n) => {
                            let ids: Vec<_> = state.platoons().iter().map(|p| p.id()).collect();
                            if let Some(&id) = ids.get(n) {
                                let back = decommission_platoon(&mut state, Faction::Player, id).unwrap();
                                returned += back.unwrap_or(0) as u64;
                            }
                        }
                    }
                }

                let after = state.planet(1).unwrap().population as u64;
                prop_assert_eq!(before as u64, after + commissioned - returned);
                let garrisoned: u64 = state.platoons().iter().map(|p| p.troop_count() as u64).sum();
                prop_assert_eq!(garrisoned, commissioned - returned);
                prop_assert!(state.faction(Faction::Player).ledger.get(Resource::Credits) <= 10_000_000);
            }
        }
    }
}
