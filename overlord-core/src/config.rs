use serde::{Deserialize, Serialize};

/// Tunable game rules.
///
/// Every field has a default, so a rules file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Fuel drawn from the origin planet per jump.
    pub fuel_per_jump: u64,
    /// Platoons that may garrison a single planet.
    pub max_platoons_per_planet: usize,
    /// Craft a single faction may own.
    pub max_craft_per_faction: usize,
    /// Platoons a Battle Cruiser can carry.
    pub craft_platoon_capacity: usize,

    /// Morale below which tax and building output are scaled by morale%.
    pub morale_penalty_threshold: i32,
    /// Defender strength bonus, in percent, per Active Orbital Defense on the
    /// target planet. Zero leaves the base combat formula untouched.
    pub orbital_defense_bonus_percent: u32,
    /// Fleet strength bonus, in percent, per Active Orbital Defense when the
    /// planet's owner defends its orbit.
    pub platform_space_bonus_percent: u32,

    /// Share of the original cost returned when scrapping.
    pub scrap_refund_percent: u32,
    /// Training gained per Income tick by garrisoned platoons.
    pub training_per_turn: i32,
    /// Morale lost by a planet when it is captured.
    pub capture_morale_penalty: i32,
    /// Run population growth and food consumption each Income tick.
    pub population_growth: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            fuel_per_jump: 10,
            max_platoons_per_planet: 24,
            max_craft_per_faction: 32,
            craft_platoon_capacity: 4,
            morale_penalty_threshold: 50,
            orbital_defense_bonus_percent: 0,
            platform_space_bonus_percent: 20,
            scrap_refund_percent: 50,
            training_per_turn: 10,
            capture_morale_penalty: 30,
            population_growth: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RulesConfig::default();
        assert_eq!(config.fuel_per_jump, 10);
        assert_eq!(config.max_craft_per_faction, 32);
        assert_eq!(config.orbital_defense_bonus_percent, 0);
        assert_eq!(config.platform_space_bonus_percent, 20);
    }

    #[test]
    fn test_partial_rules_file() {
        let config: RulesConfig =
            serde_json::from_str(r#"{ "orbital_defense_bonus_percent": 20 }"#).unwrap();
        assert_eq!(config.orbital_defense_bonus_percent, 20);
        assert_eq!(config.fuel_per_jump, 10);
    }
}
