use crate::bounded::{Morale, TaxRate};
use crate::buildings::Structure;
use crate::resources::ResourceLedger;
use crate::state::{
    CraftId, Faction, GameState, Planet, PlanetId, PlanetType, PlatoonId, TurnPhase,
};
use crate::units::{CraftType, EquipmentLevel, WeaponLevel};

/// Fluent fixture builder for [`GameState`].
///
/// Starts at turn 1 in the Action phase. Planets default to Tropical worlds
/// with 80 morale and a 50% tax rate.
pub struct GameStateBuilder {
    state: GameState,
}

impl GameStateBuilder {
    pub fn new() -> Self {
        let mut state = GameState::new();
        state.phase = TurnPhase::Action;
        Self { state }
    }

    pub fn turn(mut self, turn: u32) -> Self {
        self.state.turn = turn;
        self
    }

    pub fn phase(mut self, phase: TurnPhase) -> Self {
        self.state.phase = phase;
        self
    }

    pub fn with_planet(mut self, id: PlanetId, owner: Option<Faction>, population: u32) -> Self {
        let mut planet = Planet::new(id, format!("Planet {id}"), PlanetType::Tropical);
        planet.owner = owner;
        planet.population = population;
        planet.morale = Morale::new(80);
        planet.tax_rate = TaxRate::new(50);
        if let Err(e) = self.state.add_planet(planet) {
            log::warn!("GameStateBuilder: {}", e);
        }
        self
    }

    /// Edit a planet added earlier.
    pub fn configure_planet(mut self, id: PlanetId, f: impl FnOnce(&mut Planet)) -> Self {
        if let Some(planet) = self.state.planet_mut(id) {
            f(planet);
        }
        self
    }

    pub fn with_structure(self, id: PlanetId, structure: Structure) -> Self {
        self.configure_planet(id, |p| p.structures.push(structure))
    }

    pub fn with_ledger(mut self, faction: Faction, ledger: ResourceLedger) -> Self {
        self.state.faction_mut(faction).ledger = ledger;
        self
    }

    pub fn with_credits(mut self, faction: Faction, credits: u64) -> Self {
        self.state.faction_mut(faction).ledger.credits = credits;
        self
    }

    /// Basic/Rifle platoon with no training.
    pub fn with_platoon(self, planet: PlanetId, owner: Faction, troops: u32) -> Self {
        self.with_platoon_kit(
            planet,
            owner,
            troops,
            EquipmentLevel::Basic,
            WeaponLevel::Rifle,
            0,
        )
    }

    pub fn with_platoon_kit(
        mut self,
        planet: PlanetId,
        owner: Faction,
        troops: u32,
        equipment: EquipmentLevel,
        weapon: WeaponLevel,
        training: i32,
    ) -> Self {
        let id = self
            .state
            .spawn_platoon(owner, planet, troops, equipment, weapon);
        if let Some(p) = self.state.platoon_mut(id) {
            p.set_training(training);
        }
        self
    }

    /// Weapon tier `faction` has already researched.
    pub fn with_weapon_level(mut self, faction: Faction, level: WeaponLevel) -> Self {
        self.state.faction_mut(faction).research.level = level;
        self
    }

    pub fn with_craft(mut self, planet: PlanetId, owner: Faction, kind: CraftType) -> Self {
        self.state.spawn_craft(owner, kind, planet);
        self
    }

    /// Put a platoon in a craft's hold.
    pub fn embarked(mut self, craft: CraftId, platoon: PlatoonId) -> Self {
        self.state.embark(craft, platoon);
        self
    }

    pub fn build(self) -> GameState {
        self.state
    }
}

impl Default for GameStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
