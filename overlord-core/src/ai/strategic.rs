use super::{
    military_strength, required_margin_percent, AiDifficulty, AiPersonality, AiPlayer, AiProfile,
};
use crate::buildings::BuildingType;
use crate::config::RulesConfig;
use crate::input::{Command, CommandCategory};
use crate::resources::ResourceLedger;
use crate::state::{Craft, Faction, GameState, Planet, PlanetId, PlanetType, PlatoonId};
use crate::step::permitted_categories;
use crate::systems::combat::{defender_strength, defense_bonus_percent, effective_strength};
use crate::systems::construction::can_build;
use crate::systems::{defense, space_combat};
use crate::systems::population::food_required;
use crate::units::{platoon_cost, CraftType, EquipmentLevel, WeaponLevel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use std::cmp::Reverse;

/// Population the AI will not draft below on its recruiting planet.
const RECRUITING_RESERVE: u32 = 100;

/// Personality-driven opponent.
///
/// Plans against a private copy of its ledger and planet populations, so the
/// commands it returns are affordable when executed in order.
///
/// The RNG is reseeded for every decision from the game seed, the turn, the
/// phase and the faction, so a game resumed from a save plays on exactly as
/// the uninterrupted game would have.
pub struct StrategicAi {
    personality: AiPersonality,
    difficulty: AiDifficulty,
    seed: u64,
    rng: StdRng,
}

/// Seed for one decision.
fn decision_seed(seed: u64, state: &GameState, faction: Faction) -> u64 {
    let salt = ((state.turn as u64) << 8)
        | ((state.phase as u64) << 1)
        | u64::from(faction == Faction::Ai);
    seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

impl StrategicAi {
    pub fn new(personality: AiPersonality, difficulty: AiDifficulty, seed: u64) -> Self {
        Self {
            personality,
            difficulty,
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_profile(profile: AiProfile) -> Self {
        Self::new(profile.personality, profile.difficulty, profile.seed)
    }

    pub fn personality(&self) -> AiPersonality {
        self.personality
    }

    pub fn difficulty(&self) -> AiDifficulty {
        self.difficulty
    }

    /// Heuristic value of building `building` on `planet`. Zero or less is
    /// never built.
    fn building_score(&self, planet: &Planet, building: BuildingType) -> i32 {
        match building {
            BuildingType::MiningStation => {
                let mut score = 100;
                if planet.planet_type == PlanetType::Volcanic {
                    score += 200;
                }
                if self.personality == AiPersonality::Economic {
                    score += 100;
                }
                score
            }
            BuildingType::HorticulturalStation => {
                let mut score = 60;
                if planet.planet_type == PlanetType::Tropical {
                    score += 200;
                }
                // Less than two turns of food left
                if planet.stockpile.food < food_required(planet.population) * 2 {
                    score += 150;
                }
                score
            }
            BuildingType::OrbitalDefense => match self.personality {
                AiPersonality::Defensive => 250,
                _ => 20,
            },
            BuildingType::DockingBay | BuildingType::SurfacePlatform => 0,
        }
    }

    fn plan_economy(&mut self, state: &GameState, rules: &RulesConfig, faction: Faction, out: &mut Vec<Command>) {
        let mut budget = state.faction(faction).ledger;
        let research = state.faction(faction).research;

        // Research only out of a comfortable surplus
        if let Some(next) = research.level.next().filter(|_| research.project.is_none()) {
            let cost = next.research_cost();
            if budget.credits >= cost * 2 && budget.spend(&ResourceLedger::credits(cost)).is_ok() {
                out.push(Command::ResearchWeapons);
            }
        }
        let mut population: FxHashMap<PlanetId, u32> = state
            .owned_planets(faction)
            .iter()
            .filter_map(|&id| state.planet(id).map(|p| (id, p.population)))
            .collect();

        // Construction
        for &id in state.owned_planets(faction) {
            let Some(planet) = state.planet(id) else {
                continue;
            };
            if self.rng.gen_range(0..100) >= self.personality.build_chance_percent() {
                continue;
            }
            let available = population.get(&id).copied().unwrap_or(0);
            let choice = BuildingType::ALL
                .iter()
                .copied()
                .filter(|&b| {
                    can_build(state, id, b) && b.crew() <= available && budget.can_afford(&b.cost())
                })
                .map(|b| (self.building_score(planet, b), b))
                .filter(|&(score, _)| score > 0)
                .max_by_key(|&(score, b)| (score, Reverse(b)));

            if let Some((_, building)) = choice {
                if budget.spend(&building.cost()).is_ok() {
                    population.insert(id, available - building.crew());
                    out.push(Command::StartConstruction {
                        planet: id,
                        building,
                    });
                }
            }
        }

        let Some(base) = population
            .iter()
            .max_by_key(|&(&id, &pop)| (pop, Reverse(id)))
            .map(|(&id, _)| id)
        else {
            return;
        };

        // A carrier comes first: without one the AI cannot attack at all
        let carriers = state
            .craft_of(faction)
            .filter(|c| c.kind.carries_troops())
            .count();
        let mut fleet = state.fleet_count(faction);
        let mut wanted_craft = Vec::new();
        if carriers == 0 {
            wanted_craft.push(CraftType::BattleCruiser);
        }
        if self.personality == AiPersonality::Economic
            && !state
                .craft_at(base)
                .any(|c| c.owner == faction && c.kind == CraftType::SolarSatellite)
        {
            wanted_craft.push(CraftType::SolarSatellite);
        }
        for kind in wanted_craft {
            let pop = population.get(&base).copied().unwrap_or(0);
            if fleet >= rules.max_craft_per_faction || pop < kind.crew() {
                break;
            }
            if budget.spend(&kind.cost()).is_err() {
                continue;
            }
            population.insert(base, pop - kind.crew());
            fleet += 1;
            out.push(Command::PurchaseCraft {
                planet: base,
                craft: kind,
            });
        }

        // Recruit harder when the opponent's army rivals ours
        let own = military_strength(state, faction);
        let threat = military_strength(state, faction.opponent());
        let threatened = own == 0 || threat * 100 >= own * 80;
        let wanted_platoons = match (self.personality, threatened) {
            (AiPersonality::Economic, _) | (_, false) => 1,
            (_, true) => 2,
        };

        let mut garrison = state.platoon_count_at(base);
        for _ in 0..wanted_platoons {
            let troops = self.rng.gen_range(100..=150);
            let pop = population.get(&base).copied().unwrap_or(0);
            if garrison >= rules.max_platoons_per_planet || pop < troops + RECRUITING_RESERVE {
                break;
            }
            let (equipment, weapon) = self.difficulty.loadout();
            let preferred = (equipment, weapon.min(research.level));
            let fallback = (EquipmentLevel::Basic, WeaponLevel::Rifle.min(research.level));
            let Some((equipment, weapon)) = [preferred, fallback]
                .into_iter()
                .find(|&(e, w)| budget.can_afford(&ResourceLedger::credits(platoon_cost(e, w))))
            else {
                break;
            };
            if budget
                .spend(&ResourceLedger::credits(platoon_cost(equipment, weapon)))
                .is_err()
            {
                break;
            }
            population.insert(base, pop - troops);
            garrison += 1;
            out.push(Command::CommissionPlatoon {
                planet: base,
                troops,
                equipment,
                weapon,
            });
        }
    }

    /// Enemy fleet strength over `planet`, with the platform bonus when the
    /// enemy owns it.
    fn orbit_guard(state: &GameState, rules: &RulesConfig, faction: Faction, planet: PlanetId) -> u64 {
        let enemy = faction.opponent();
        let strength = space_combat::fleet_strength(state, enemy, planet);
        if state.planet(planet).is_some_and(|p| p.is_owned_by(enemy)) {
            strength * defense::fleet_defense_percent(state, rules, planet) / 100
        } else {
            strength
        }
    }

    /// Our fleet strength over `planet` once `craft` has arrived.
    fn orbit_strength(state: &GameState, faction: Faction, craft: &Craft, planet: PlanetId) -> u64 {
        let present = space_combat::fleet_strength(state, faction, planet);
        if craft.planet() == planet {
            present
        } else {
            let weapon = state.faction(faction).research.level;
            present + space_combat::craft_strength(craft.kind, weapon, craft.health())
        }
    }

    fn plan_invasion(&mut self, state: &GameState, rules: &RulesConfig, faction: Faction, out: &mut Vec<Command>) {
        let margin = required_margin_percent(self.personality, self.difficulty) as u64;
        let aggression = self.personality.invasion_aggression();

        let mut targets: Vec<(u64, PlanetId)> = state
            .planets()
            .iter()
            .filter(|p| !p.is_owned_by(faction))
            .map(|p| {
                let bonus = defense_bonus_percent(state, rules, p.id());
                (defender_strength(p.population, bonus), p.id())
            })
            .collect();
        targets.sort_unstable();

        let mut carriers: Vec<_> = state
            .craft_of(faction)
            .filter(|c| c.kind.carries_troops() && !c.in_transit())
            .collect();
        carriers.sort_by_key(|c| c.id());

        for craft in carriers {
            let origin = craft.planet();
            let aboard: u64 = craft
                .carried()
                .iter()
                .filter_map(|&id| state.platoon(id))
                .map(|p| p.strength())
                .sum();

            let mut garrison: Vec<_> = state
                .platoons_at(origin)
                .filter(|p| p.owner == faction)
                .collect();
            garrison.sort_by_key(|p| (Reverse(p.strength()), p.id()));
            let room = rules.craft_platoon_capacity.saturating_sub(craft.carried().len());
            let spare = garrison.len().saturating_sub(self.personality.home_guard());
            let boarding: Vec<PlatoonId> = garrison.iter().take(spare.min(room)).map(|p| p.id()).collect();
            let boarding_strength: u64 = garrison.iter().take(boarding.len()).map(|p| p.strength()).sum();

            let total = aboard + boarding_strength;
            if total == 0 {
                continue;
            }
            let effective = effective_strength(total, aggression);
            let has_fuel = state
                .planet(origin)
                .is_some_and(|p| p.stockpile.fuel >= rules.fuel_per_jump);

            let Some(&(defense, target)) = targets.iter().find(|&&(defense, target)| {
                effective * 100 > defense * margin
                    && (target == origin || has_fuel)
                    && Self::orbit_strength(state, faction, craft, target)
                        > Self::orbit_guard(state, rules, faction, target)
            }) else {
                continue;
            };
            let contested = Self::orbit_guard(state, rules, faction, target) > 0;

            if self.rng.gen_range(0..100) >= self.personality.attack_chance_percent() {
                log::debug!("{} holds back from planet {}", self.name(), target);
                return;
            }

            log::debug!(
                "{} attacks planet {} with {} strength against {}",
                self.name(),
                target,
                effective,
                defense
            );
            if !boarding.is_empty() {
                out.push(Command::Embark {
                    craft: craft.id(),
                    platoons: boarding,
                });
            }
            if target != origin {
                out.push(Command::MoveShip {
                    craft: craft.id(),
                    destination: target,
                });
            }
            // The orbit must be won in battle before anyone can land
            if contested {
                log::debug!("{} moves to contest the orbit of planet {}", self.name(), target);
            } else {
                out.push(Command::Invade {
                    planet: target,
                    aggression,
                });
            }
            // One invasion per turn
            return;
        }
    }
}

impl AiPlayer for StrategicAi {
    fn name(&self) -> &str {
        self.personality.commander()
    }

    fn profile(&self) -> Option<AiProfile> {
        Some(AiProfile {
            personality: self.personality,
            difficulty: self.difficulty,
            seed: self.seed,
        })
    }

    #[tracing::instrument(skip_all, name = "ai")]
    fn decide(&mut self, state: &GameState, rules: &RulesConfig, faction: Faction) -> Vec<Command> {
        self.rng = StdRng::seed_from_u64(decision_seed(self.seed, state, faction));
        let categories = permitted_categories(state.phase, faction);
        let mut commands = Vec::new();
        if categories.contains(&CommandCategory::Economic) {
            self.plan_economy(state, rules, faction, &mut commands);
        }
        if categories.contains(&CommandCategory::Military) {
            self.plan_invasion(state, rules, faction, &mut commands);
        }
        log::trace!("{} plans {:?}", self.name(), commands);
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TurnPhase;
    use crate::step::execute_command;
    use crate::testing::GameStateBuilder;

    /// AI home planet 1 with a docked carrier and three veteran platoons
    /// (600 strength each). Player planets 2 (defense 1000) and 3 (5000).
    fn staging(fuel: u64) -> GameState {
        let mut builder = GameStateBuilder::new()
            .phase(TurnPhase::Combat)
            .with_planet(1, Some(Faction::Ai), 1000)
            .configure_planet(1, |p| p.stockpile.fuel = fuel)
            .with_planet(2, Some(Faction::Player), 100)
            .with_planet(3, Some(Faction::Player), 500)
            .with_craft(1, Faction::Ai, CraftType::BattleCruiser);
        for _ in 0..3 {
            builder = builder.with_platoon_kit(
                1,
                Faction::Ai,
                150,
                EquipmentLevel::Elite,
                WeaponLevel::Plasma,
                100,
            );
        }
        builder.build()
    }

    fn rich_end_phase() -> GameState {
        GameStateBuilder::new()
            .phase(TurnPhase::End)
            .with_planet(1, Some(Faction::Ai), 2000)
            .configure_planet(1, |p| p.planet_type = PlanetType::Volcanic)
            .with_planet(2, Some(Faction::Ai), 800)
            .with_planet(3, Some(Faction::Player), 1000)
            .with_ledger(Faction::Ai, ResourceLedger::new(200_000, 50_000, 20_000, 0, 0))
            .build()
    }

    #[test]
    fn test_aggressive_invades_weakest() {
        let state = staging(50);
        let mut ai = StrategicAi::new(AiPersonality::Aggressive, AiDifficulty::Normal, 7);

        let commands = ai.decide(&state, &RulesConfig::default(), Faction::Ai);

        assert_eq!(
            commands,
            vec![
                Command::Embark {
                    craft: 1,
                    platoons: vec![1, 2, 3]
                },
                Command::MoveShip {
                    craft: 1,
                    destination: 2
                },
                Command::Invade {
                    planet: 2,
                    aggression: 75
                },
            ]
        );
    }

    #[test]
    fn test_planned_invasion_executes() {
        let mut state = staging(50);
        let rules = RulesConfig::default();
        let mut ai = StrategicAi::new(AiPersonality::Aggressive, AiDifficulty::Normal, 7);

        for cmd in ai.decide(&state, &rules, Faction::Ai) {
            execute_command(&mut state, &rules, Faction::Ai, &cmd).unwrap();
        }

        assert_eq!(state.planet(2).unwrap().owner(), Some(Faction::Ai));
        assert!(state.validate().is_empty());
    }

    #[test]
    fn test_no_fuel_no_attack() {
        let state = staging(5);
        let mut ai = StrategicAi::new(AiPersonality::Aggressive, AiDifficulty::Hard, 7);
        assert!(ai.decide(&state, &RulesConfig::default(), Faction::Ai).is_empty());
    }

    #[test]
    fn test_defensive_keeps_guard_and_waits() {
        // Only one platoon may leave: 600 × 0.8 = 480 is far below 1000 × 1.6
        let state = staging(50);
        let mut ai = StrategicAi::new(AiPersonality::Defensive, AiDifficulty::Normal, 7);
        assert!(ai.decide(&state, &RulesConfig::default(), Faction::Ai).is_empty());
    }

    #[test]
    fn test_no_military_orders_in_end_phase() {
        let mut state = staging(50);
        state.phase = TurnPhase::End;
        let mut ai = StrategicAi::new(AiPersonality::Aggressive, AiDifficulty::Normal, 7);

        let commands = ai.decide(&state, &RulesConfig::default(), Faction::Ai);

        assert!(commands
            .iter()
            .all(|c| c.category() == CommandCategory::Economic));
    }

    #[test]
    fn test_economy_buys_carrier_and_recruits() {
        let state = rich_end_phase();
        let mut ai = StrategicAi::new(AiPersonality::Balanced, AiDifficulty::Normal, 3);

        let commands = ai.decide(&state, &RulesConfig::default(), Faction::Ai);

        assert!(commands.contains(&Command::PurchaseCraft {
            planet: 1,
            craft: CraftType::BattleCruiser
        }));
        let recruits: Vec<_> = commands
            .iter()
            .filter_map(|c| match c {
                Command::CommissionPlatoon {
                    planet,
                    troops,
                    equipment,
                    weapon,
                } => Some((*planet, *troops, *equipment, *weapon)),
                _ => None,
            })
            .collect();
        // No army on either side counts as threatened
        assert_eq!(recruits.len(), 2);
        for (planet, troops, equipment, weapon) in recruits {
            assert_eq!(planet, 1);
            assert!((100..=150).contains(&troops));
            assert_eq!((equipment, weapon), (EquipmentLevel::Standard, WeaponLevel::Rifle));
        }
    }

    #[test]
    fn test_orbit_must_be_won_before_landing() {
        let mut state = staging(50);
        state.spawn_craft(Faction::Player, CraftType::BattleCruiser, 2);
        let rules = RulesConfig::default();

        // 100 against 100 is no advantage, and planet 3 is out of reach
        let mut ai = StrategicAi::new(AiPersonality::Aggressive, AiDifficulty::Normal, 7);
        assert!(ai.decide(&state, &rules, Faction::Ai).is_empty());

        state.faction_mut(Faction::Ai).research.level = WeaponLevel::Plasma;
        assert_eq!(
            ai.decide(&state, &rules, Faction::Ai),
            vec![
                Command::Embark {
                    craft: 1,
                    platoons: vec![1, 2, 3]
                },
                Command::MoveShip {
                    craft: 1,
                    destination: 2
                },
            ]
        );
    }

    #[test]
    fn test_research_out_of_surplus() {
        let state = rich_end_phase();
        let mut ai = StrategicAi::new(AiPersonality::Balanced, AiDifficulty::Hard, 3);

        let commands = ai.decide(&state, &RulesConfig::default(), Faction::Ai);

        assert_eq!(commands[0], Command::ResearchWeapons);
        // Hard prefers Plasma but only Rifles are available yet
        assert!(commands.iter().any(|c| matches!(
            c,
            Command::CommissionPlatoon {
                equipment: EquipmentLevel::Elite,
                weapon: WeaponLevel::Rifle,
                ..
            }
        )));

        let mut poor = rich_end_phase();
        poor.faction_mut(Faction::Ai).ledger.credits = 59_999;
        assert!(!ai
            .decide(&poor, &RulesConfig::default(), Faction::Ai)
            .contains(&Command::ResearchWeapons));
    }

    #[test]
    fn test_researched_loadout_is_used() {
        let mut state = rich_end_phase();
        state.faction_mut(Faction::Ai).research.level = WeaponLevel::Plasma;
        let mut ai = StrategicAi::new(AiPersonality::Balanced, AiDifficulty::Hard, 3);

        let commands = ai.decide(&state, &RulesConfig::default(), Faction::Ai);

        assert!(!commands.contains(&Command::ResearchWeapons));
        assert!(commands.iter().any(|c| matches!(
            c,
            Command::CommissionPlatoon {
                equipment: EquipmentLevel::Elite,
                weapon: WeaponLevel::Plasma,
                ..
            }
        )));
    }

    #[test]
    fn test_restored_ai_plays_on_identically() {
        let state = rich_end_phase();
        let rules = RulesConfig::default();
        let mut veteran = StrategicAi::new(AiPersonality::Economic, AiDifficulty::Hard, 99);
        let mut earlier = rich_end_phase();
        for turn in 1..4 {
            earlier.turn = turn;
            veteran.decide(&earlier, &rules, Faction::Ai);
        }

        let profile = veteran.profile().unwrap();
        let mut restored = StrategicAi::from_profile(profile);

        assert_eq!(
            profile,
            AiProfile {
                personality: AiPersonality::Economic,
                difficulty: AiDifficulty::Hard,
                seed: 99
            }
        );
        assert_eq!(
            veteran.decide(&state, &rules, Faction::Ai),
            restored.decide(&state, &rules, Faction::Ai)
        );
    }

    #[test]
    fn test_same_seed_same_plan() {
        let state = rich_end_phase();
        let rules = RulesConfig::default();
        let mut a = StrategicAi::new(AiPersonality::Economic, AiDifficulty::Hard, 99);
        let mut b = StrategicAi::new(AiPersonality::Economic, AiDifficulty::Hard, 99);

        for _ in 0..5 {
            assert_eq!(a.decide(&state, &rules, Faction::Ai), b.decide(&state, &rules, Faction::Ai));
        }
    }

    #[test]
    fn test_player_autoplay_in_action_phase() {
        let mut state = rich_end_phase();
        state.phase = TurnPhase::Action;
        state.faction_mut(Faction::Player).ledger = ResourceLedger::credits(50_000);
        let mut ai = StrategicAi::new(AiPersonality::Balanced, AiDifficulty::Normal, 1);

        assert!(ai.decide(&state, &RulesConfig::default(), Faction::Ai).is_empty());
        assert!(!ai.decide(&state, &RulesConfig::default(), Faction::Player).is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn personality() -> impl Strategy<Value = AiPersonality> {
            prop::sample::select(AiPersonality::ALL.to_vec())
        }

        fn difficulty() -> impl Strategy<Value = AiDifficulty> {
            prop::sample::select(vec![AiDifficulty::Easy, AiDifficulty::Normal, AiDifficulty::Hard])
        }

        proptest! {
            /// Every command of an economic plan is accepted when executed in order
            #[test]
            fn economic_plan_is_affordable(
                seed in any::<u64>(),
                p in personality(),
                d in difficulty(),
                credits in 0u64..250_000,
                minerals in 0u64..60_000,
            ) {
                let mut state = rich_end_phase();
                state.faction_mut(Faction::Ai).ledger = ResourceLedger::new(credits, minerals, 20_000, 0, 0);
                let rules = RulesConfig::default();
                let mut ai = StrategicAi::new(p, d, seed);

                for cmd in ai.decide(&state, &rules, Faction::Ai) {
                    prop_assert!(execute_command(&mut state, &rules, Faction::Ai, &cmd).is_ok(), "{:?}", cmd);
                }
                prop_assert!(state.validate().is_empty());
            }
        }
    }
}
