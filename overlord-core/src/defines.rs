//! Fixed game constants.
//!
//! Anything a scenario designer is expected to tune lives in
//! [`RulesConfig`](crate::config::RulesConfig) instead.

pub mod economy {
    /// Tax revenue is `population / TAX_POPULATION_DIVISOR × rate%`.
    pub const TAX_POPULATION_DIVISOR: u64 = 10;

    /// Tax rate above which morale falls each turn.
    pub const HIGH_TAX_THRESHOLD: i32 = 75;
    /// Tax rate below which morale recovers each turn.
    pub const LOW_TAX_THRESHOLD: i32 = 25;

    pub const HIGH_TAX_MORALE_CHANGE: i32 = -5;
    pub const LOW_TAX_MORALE_CHANGE: i32 = 2;

    pub const DEFAULT_TAX_RATE: i32 = 50;
    pub const DEFAULT_MORALE: i32 = 75;

    /// Energy yielded by a Solar Satellite stationed over an owned planet.
    pub const SOLAR_SATELLITE_ENERGY: u64 = 80;
}

pub mod population {
    pub const MAX_POPULATION: u32 = 99_999;

    /// Growth at 100% morale, in percent per turn.
    pub const GROWTH_PERCENT_AT_FULL_MORALE: i64 = 5;

    /// Food eaten per person per turn, in percent (0.5 food each).
    pub const FOOD_PERCENT_PER_PERSON: i64 = 50;

    pub const RATIONING_MORALE_CHANGE: i32 = -3;
    pub const STARVATION_MORALE_CHANGE: i32 = -10;
}

pub mod military {
    pub const MIN_TROOPS: u32 = 1;
    pub const MAX_TROOPS: u32 = 200;

    pub const MAX_AGGRESSION: u8 = 100;
    /// Aggression at which the attacker fights at nominal strength.
    pub const NEUTRAL_AGGRESSION: i64 = 50;

    /// Defender strength per head of planet population.
    pub const DEFENDER_STRENGTH_PER_POP: u64 = 10;

    /// Share of planet population lost when the planet falls.
    pub const DEFENDER_LOSS_PERCENT_ON_CAPTURE: i64 = 80;
    /// Share of planet population lost when an invasion is repelled.
    pub const DEFENDER_LOSS_PERCENT_ON_REPEL: i64 = 30;

    /// Captured-resource reward per head of pre-capture population.
    pub const CAPTURE_CREDITS_PER_POP: u64 = 10;
    pub const CAPTURE_MINERALS_PER_POP: u64 = 5;
    pub const CAPTURE_FUEL_PER_POP: u64 = 2;
}

pub mod space {
    pub const CRAFT_MAX_HEALTH: u32 = 100;

    /// Hull damage dealt to each losing craft per whole strength ratio above
    /// parity: `floor((winner / loser - 1) × 50)`.
    pub const DAMAGE_PER_RATIO: u64 = 50;

    /// Orbital Defense platforms a planet may hold.
    pub const MAX_ORBITAL_DEFENSES: usize = 2;

    /// Bombardment strength contributed by each Battle Cruiser.
    pub const BOMBARD_STRENGTH_PER_CRUISER: u32 = 50;
    /// Bombardment strength needed per structure destroyed.
    pub const BOMBARD_STRENGTH_PER_STRUCTURE: u32 = 100;
    pub const MAX_STRUCTURES_PER_BOMBARDMENT: usize = 3;
    /// Share of the population killed per 100 points of bombardment
    /// strength, in percent.
    pub const BOMBARD_CASUALTY_PERCENT: u32 = 10;
    pub const BOMBARD_MORALE_CHANGE: i32 = -20;
}
