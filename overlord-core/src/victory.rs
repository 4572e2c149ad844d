//! Scenario victory conditions and the defeat check.
//!
//! Conditions are evaluated from the player's point of view. Defeat is checked
//! separately and always wins: a player with no planets has lost, whatever the
//! condition list says.

use crate::buildings::{BuildingStatus, BuildingType};
use crate::resources::Resource;
use crate::state::{Faction, GameState};
use serde::{Deserialize, Serialize};

/// How a game ended, if it has.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VictoryResult {
    #[default]
    None,
    PlayerVictory,
    AiVictory,
}

impl VictoryResult {
    pub fn is_over(self) -> bool {
        self != VictoryResult::None
    }
}

/// A declarative scenario goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VictoryCondition {
    /// The AI owns no planets.
    DefeatEnemy,
    /// Active structures of `building` across player planets.
    BuildStructure {
        building: BuildingType,
        #[serde(default = "one")]
        count: u32,
    },
    /// A named planet, or failing that a number of owned planets.
    CapturePlanet {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        planet: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        count: Option<usize>,
    },
    /// Turns elapsed since the scenario started.
    SurviveTurns { turns: u32 },
    /// A player ledger channel at or above `amount`.
    ResourceTarget { resource: Resource, amount: u64 },
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionStatus {
    pub condition: VictoryCondition,
    pub met: bool,
    /// 0.0 to 1.0
    pub progress: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionReport {
    pub all_met: bool,
    pub conditions: Vec<ConditionStatus>,
}

fn fraction(have: f64, need: f64) -> f64 {
    if need <= 0.0 {
        1.0
    } else {
        (have / need).clamp(0.0, 1.0)
    }
}

pub fn evaluate(condition: &VictoryCondition, state: &GameState, start_turn: u32) -> ConditionStatus {
    let (met, progress, description) = match condition {
        VictoryCondition::DefeatEnemy => {
            let total = state.planets().len();
            let remaining = state.owned_planets(Faction::Ai).len();
            let met = remaining == 0;
            let progress = if met {
                1.0
            } else {
                fraction((total - remaining) as f64, total as f64)
            };
            let description = if met {
                "All enemies defeated!".to_string()
            } else {
                format!("Defeat all enemies ({remaining} remaining)")
            };
            (met, progress, description)
        }

        VictoryCondition::BuildStructure { building, count } => {
            let (mut active, mut building_now) = (0u32, 0u32);
            for &id in state.owned_planets(Faction::Player) {
                let Some(planet) = state.planet(id) else {
                    continue;
                };
                for s in planet.structures.iter().filter(|s| s.building == *building) {
                    match s.status {
                        BuildingStatus::Active => active += 1,
                        BuildingStatus::UnderConstruction => building_now += 1,
                    }
                }
            }
            let met = active >= *count;
            // Half credit for structures still being built
            let progress = if met {
                1.0
            } else {
                fraction(active as f64 + building_now as f64 * 0.5, *count as f64)
            };
            let description = if met {
                format!("Built {count} {building}!")
            } else {
                format!("Build {building} ({active}/{count})")
            };
            (met, progress, description)
        }

        VictoryCondition::CapturePlanet {
            planet: Some(name), ..
        } => match state.planet_by_name(name) {
            None => (false, 0.0, format!("Target planet \"{name}\" not found")),
            Some(planet) => {
                let met = planet.is_owned_by(Faction::Player);
                let description = if met {
                    format!("Captured {name}!")
                } else {
                    format!("Capture {name}")
                };
                (met, if met { 1.0 } else { 0.0 }, description)
            }
        },

        VictoryCondition::CapturePlanet {
            planet: None,
            count,
        } => {
            let required = count.unwrap_or(1);
            let owned = state.owned_planets(Faction::Player).len();
            let met = owned >= required;
            let description = if met {
                format!("Captured {required} planets!")
            } else {
                format!("Capture {required} planets ({owned}/{required})")
            };
            (met, fraction(owned as f64, required as f64), description)
        }

        VictoryCondition::SurviveTurns { turns } => {
            let survived = state.turn.saturating_sub(start_turn);
            let met = survived >= *turns;
            let description = if met {
                format!("Survived {turns} turns!")
            } else {
                format!("Survive {turns} turns ({survived}/{turns})")
            };
            (met, fraction(survived as f64, *turns as f64), description)
        }

        VictoryCondition::ResourceTarget { resource, amount } => {
            let have = state.faction(Faction::Player).ledger.get(*resource);
            let met = have >= *amount;
            let description = if met {
                format!("Stockpiled {amount} {resource}!")
            } else {
                format!("Stockpile {amount} {resource} ({have}/{amount})")
            };
            (met, fraction(have as f64, *amount as f64), description)
        }
    };

    ConditionStatus {
        condition: condition.clone(),
        met,
        progress,
        description,
    }
}

/// Evaluate every condition. `all_met` is the conjunction, so an empty list
/// is trivially met.
pub fn evaluate_all(conditions: &[VictoryCondition], state: &GameState, start_turn: u32) -> ConditionReport {
    let conditions: Vec<ConditionStatus> = conditions
        .iter()
        .map(|c| evaluate(c, state, start_turn))
        .collect();
    ConditionReport {
        all_met: conditions.iter().all(|c| c.met),
        conditions,
    }
}

/// True once the player has lost every planet.
pub fn check_defeat_conditions(state: &GameState) -> bool {
    state.owned_planets(Faction::Player).is_empty()
}

/// Decide whether the game is over.
///
/// With no scenario conditions the game ends when either side runs out of
/// planets. Defeat is checked first.
pub fn check_outcome(conditions: &[VictoryCondition], state: &GameState, start_turn: u32) -> VictoryResult {
    if check_defeat_conditions(state) {
        return VictoryResult::AiVictory;
    }
    let won = if conditions.is_empty() {
        state.owned_planets(Faction::Ai).is_empty()
    } else {
        evaluate_all(conditions, state, start_turn).all_met
    };
    if won {
        VictoryResult::PlayerVictory
    } else {
        VictoryResult::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildings::Structure;
    use crate::testing::GameStateBuilder;

    fn galaxy() -> GameState {
        GameStateBuilder::new()
            .turn(6)
            .with_planet(1, Some(Faction::Player), 500)
            .configure_planet(1, |p| p.name = "Starbase".into())
            .with_planet(2, Some(Faction::Ai), 500)
            .configure_planet(2, |p| p.name = "Hitotsu".into())
            .with_planet(3, None, 100)
            .with_planet(4, Some(Faction::Player), 100)
            .with_structure(1, Structure::active(BuildingType::MiningStation))
            .with_structure(4, Structure::under_construction(BuildingType::MiningStation))
            .build()
    }

    #[test]
    fn test_defeat_enemy_progress() {
        let status = evaluate(&VictoryCondition::DefeatEnemy, &galaxy(), 1);
        assert!(!status.met);
        assert_eq!(status.progress, 0.75);
        assert_eq!(status.description, "Defeat all enemies (1 remaining)");
    }

    #[test]
    fn test_build_structure_half_credit() {
        let status = evaluate(
            &VictoryCondition::BuildStructure {
                building: BuildingType::MiningStation,
                count: 3,
            },
            &galaxy(),
            1,
        );
        assert!(!status.met);
        assert_eq!(status.progress, 0.5);
        assert_eq!(status.description, "Build Mining Station (1/3)");
    }

    #[test]
    fn test_capture_named_and_counted() {
        let state = galaxy();
        let named = |name: &str| {
            evaluate(
                &VictoryCondition::CapturePlanet {
                    planet: Some(name.to_string()),
                    count: None,
                },
                &state,
                1,
            )
        };
        assert!(named("Starbase").met);
        assert!(!named("Hitotsu").met);
        assert_eq!(named("Nowhere").description, "Target planet \"Nowhere\" not found");

        let counted = evaluate(
            &VictoryCondition::CapturePlanet {
                planet: None,
                count: Some(4),
            },
            &state,
            1,
        );
        assert!(!counted.met);
        assert_eq!(counted.progress, 0.5);
    }

    #[test]
    fn test_survive_turns_from_start() {
        let state = galaxy();
        let condition = VictoryCondition::SurviveTurns { turns: 5 };
        assert!(evaluate(&condition, &state, 1).met);
        let late = evaluate(&condition, &state, 3);
        assert!(!late.met);
        assert_eq!(late.description, "Survive 5 turns (3/5)");
    }

    #[test]
    fn test_resource_target() {
        let mut state = galaxy();
        state.faction_mut(Faction::Player).ledger.credits = 2500;
        let status = evaluate(
            &VictoryCondition::ResourceTarget {
                resource: Resource::Credits,
                amount: 10_000,
            },
            &state,
            1,
        );
        assert!(!status.met);
        assert_eq!(status.progress, 0.25);
    }

    #[test]
    fn test_all_met_is_conjunction() {
        let state = galaxy();
        let report = evaluate_all(
            &[
                VictoryCondition::SurviveTurns { turns: 2 },
                VictoryCondition::DefeatEnemy,
            ],
            &state,
            1,
        );
        assert!(!report.all_met);
        assert!(report.conditions[0].met);
        assert!(evaluate_all(&[], &state, 1).all_met);
    }

    #[test]
    fn test_defeat_takes_precedence() {
        let mut state = galaxy();
        state.set_planet_owner(1, Some(Faction::Ai)).unwrap();
        state.set_planet_owner(4, None).unwrap();

        // Survival alone would already count as a win
        let conditions = [VictoryCondition::SurviveTurns { turns: 1 }];
        assert!(evaluate_all(&conditions, &state, 1).all_met);
        assert!(check_defeat_conditions(&state));
        assert_eq!(check_outcome(&conditions, &state, 1), VictoryResult::AiVictory);
    }

    #[test]
    fn test_default_outcome_is_elimination() {
        let mut state = galaxy();
        assert_eq!(check_outcome(&[], &state, 1), VictoryResult::None);
        state.set_planet_owner(2, Some(Faction::Player)).unwrap();
        assert_eq!(check_outcome(&[], &state, 1), VictoryResult::PlayerVictory);
    }

    #[test]
    fn test_condition_json() {
        let parsed: Vec<VictoryCondition> = serde_json::from_str(
            r#"[{"type":"capture_planet","planet":"Hitotsu"},
                {"type":"build_structure","building":"DockingBay"},
                {"type":"resource_target","resource":"credits","amount":5000}]"#,
        )
        .unwrap();
        assert_eq!(
            parsed[1],
            VictoryCondition::BuildStructure {
                building: BuildingType::DockingBay,
                count: 1
            }
        );
    }
}
