//! The entity store.
//!
//! [`GameState`] owns every planet, platoon and craft plus the two faction
//! records. Collections are ordered `Vec`s with id → index maps kept beside
//! them; all insertions, removals and ownership changes go through methods on
//! `GameState` so the maps and each faction's owned-planet list never drift
//! from the backing lists.

use crate::bounded::{Morale, TaxRate, TrainingLevel};
use crate::buildings::{BuildingStatus, BuildingType, Structure};
use crate::defines;
use crate::fixed::Fixed;
use crate::resources::{Resource, ResourceLedger};
use crate::units::{platoon_strength, CraftType, EquipmentLevel, WeaponLevel};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type PlanetId = u32;
pub type PlatoonId = u32;
pub type CraftId = u32;

/// A top-level actor that owns planets and a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Player,
    Ai,
}

impl Faction {
    pub const BOTH: [Faction; 2] = [Faction::Player, Faction::Ai];

    pub fn opponent(self) -> Faction {
        match self {
            Faction::Player => Faction::Ai,
            Faction::Ai => Faction::Player,
        }
    }
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Faction::Player => f.write_str("Player"),
            Faction::Ai => f.write_str("AI"),
        }
    }
}

/// Sub-steps of a turn, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    Income,
    Action,
    Combat,
    End,
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TurnPhase::Income => "Income",
            TurnPhase::Action => "Action",
            TurnPhase::Combat => "Combat",
            TurnPhase::End => "End",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanetType {
    Volcanic,
    Desert,
    Tropical,
    Metropolis,
}

impl PlanetType {
    /// Yield multiplier for a resource channel on this world.
    pub fn multiplier(self, resource: Resource) -> Fixed {
        let pct = match (self, resource) {
            (PlanetType::Volcanic, Resource::Minerals) => 500,
            (PlanetType::Volcanic, Resource::Fuel) => 300,
            (PlanetType::Volcanic, Resource::Food) => 50,
            (PlanetType::Desert, Resource::Energy) => 200,
            (PlanetType::Desert, Resource::Food) => 25,
            (PlanetType::Tropical, Resource::Food) => 200,
            (PlanetType::Tropical, Resource::Energy) => 75,
            (PlanetType::Metropolis, Resource::Credits) => 200,
            _ => 100,
        };
        Fixed::from_percent(pct)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Planet {
    pub(crate) id: PlanetId,
    pub name: String,
    pub planet_type: PlanetType,
    pub(crate) owner: Option<Faction>,
    pub population: u32,
    pub morale: Morale,
    pub tax_rate: TaxRate,
    pub stockpile: ResourceLedger,
    pub structures: Vec<Structure>,
}

impl Planet {
    pub fn new(id: PlanetId, name: impl Into<String>, planet_type: PlanetType) -> Self {
        Self {
            id,
            name: name.into(),
            planet_type,
            owner: None,
            population: 0,
            morale: Morale::new(defines::economy::DEFAULT_MORALE),
            tax_rate: TaxRate::new(defines::economy::DEFAULT_TAX_RATE),
            stockpile: ResourceLedger::ZERO,
            structures: Vec::new(),
        }
    }

    pub fn id(&self) -> PlanetId {
        self.id
    }

    /// `None` for neutral worlds.
    pub fn owner(&self) -> Option<Faction> {
        self.owner
    }

    pub fn is_owned_by(&self, faction: Faction) -> bool {
        self.owner == Some(faction)
    }

    /// The structure currently under construction, if any.
    pub fn construction(&self) -> Option<&Structure> {
        self.structures
            .iter()
            .find(|s| s.status == BuildingStatus::UnderConstruction)
    }

    pub fn count_active(&self, building: BuildingType) -> usize {
        self.structures
            .iter()
            .filter(|s| s.building == building && s.is_active())
            .count()
    }
}

/// Where a platoon currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "at", content = "id", rename_all = "snake_case")]
pub enum PlatoonLocation {
    Planet(PlanetId),
    Craft(CraftId),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platoon {
    pub(crate) id: PlatoonId,
    pub owner: Faction,
    pub(crate) location: PlatoonLocation,
    /// Planet that receives the troops back on decommission.
    pub home_planet: PlanetId,
    pub(crate) troop_count: u32,
    pub equipment: EquipmentLevel,
    pub weapon: WeaponLevel,
    pub(crate) training: TrainingLevel,
    pub(crate) strength: u64,
    /// High-water mark of `troop_count`, for casualty reporting.
    pub max_troop_count: u32,
}

impl Platoon {
    pub fn new(
        id: PlatoonId,
        owner: Faction,
        planet: PlanetId,
        troops: u32,
        equipment: EquipmentLevel,
        weapon: WeaponLevel,
    ) -> Self {
        let mut platoon = Self {
            id,
            owner,
            location: PlatoonLocation::Planet(planet),
            home_planet: planet,
            troop_count: troops,
            equipment,
            weapon,
            training: TrainingLevel::new(0),
            strength: 0,
            max_troop_count: troops,
        };
        platoon.recompute_strength();
        platoon
    }

    pub fn id(&self) -> PlatoonId {
        self.id
    }

    pub fn location(&self) -> PlatoonLocation {
        self.location
    }

    pub fn troop_count(&self) -> u32 {
        self.troop_count
    }

    pub fn training(&self) -> TrainingLevel {
        self.training
    }

    pub fn strength(&self) -> u64 {
        self.strength
    }

    pub fn casualties(&self) -> u32 {
        self.max_troop_count.saturating_sub(self.troop_count)
    }

    pub(crate) fn set_troops(&mut self, troops: u32) {
        self.troop_count = troops;
        self.max_troop_count = self.max_troop_count.max(troops);
        self.recompute_strength();
    }

    pub(crate) fn set_training(&mut self, training: i32) {
        self.training.set(training);
        self.recompute_strength();
    }

    fn recompute_strength(&mut self) {
        self.strength =
            platoon_strength(self.troop_count, self.equipment, self.weapon, self.training);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Craft {
    pub(crate) id: CraftId,
    pub kind: CraftType,
    pub owner: Faction,
    pub(crate) planet: PlanetId,
    pub(crate) in_transit: bool,
    pub(crate) carried: Vec<PlatoonId>,
    /// Hull points out of [`defines::space::CRAFT_MAX_HEALTH`].
    #[serde(default = "full_health")]
    pub(crate) health: u32,
}

fn full_health() -> u32 {
    defines::space::CRAFT_MAX_HEALTH
}

impl Craft {
    pub fn id(&self) -> CraftId {
        self.id
    }

    pub fn planet(&self) -> PlanetId {
        self.planet
    }

    pub fn in_transit(&self) -> bool {
        self.in_transit
    }

    pub fn carried(&self) -> &[PlatoonId] {
        &self.carried
    }

    pub fn health(&self) -> u32 {
        self.health
    }
}

/// Weapon research in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResearchProject {
    pub target: WeaponLevel,
    pub turns_remaining: u32,
}

/// A faction's weapon technology: the best tier its platoons may be issued
/// and its Battle Cruisers are armed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeaponResearch {
    pub level: WeaponLevel,
    #[serde(default)]
    pub project: Option<ResearchProject>,
}

impl Default for WeaponResearch {
    fn default() -> Self {
        Self {
            level: WeaponLevel::Rifle,
            project: None,
        }
    }
}

impl WeaponResearch {
    pub fn allows(&self, weapon: WeaponLevel) -> bool {
        weapon <= self.level
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactionState {
    pub ledger: ResourceLedger,
    pub(crate) owned_planets: Vec<PlanetId>,
    /// Percent applied to this faction's income (difficulty scaling).
    pub income_multiplier_percent: u32,
    #[serde(default)]
    pub research: WeaponResearch,
}

impl Default for FactionState {
    fn default() -> Self {
        Self {
            ledger: ResourceLedger::ZERO,
            owned_planets: Vec::new(),
            income_multiplier_percent: 100,
            research: WeaponResearch::default(),
        }
    }
}

impl FactionState {
    pub fn owned_planets(&self) -> &[PlanetId] {
        &self.owned_planets
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("duplicate planet id {0}")]
    DuplicatePlanet(PlanetId),
    #[error("unknown planet id {0}")]
    UnknownPlanet(PlanetId),
    #[error("invalid game state: {0}")]
    Invariant(String),
}

#[derive(Debug, Clone, Default)]
struct EntityIndex {
    planets: FxHashMap<PlanetId, usize>,
    platoons: FxHashMap<PlatoonId, usize>,
    craft: FxHashMap<CraftId, usize>,
}

fn index_of<T>(items: &[T], id: impl Fn(&T) -> u32) -> FxHashMap<u32, usize> {
    items.iter().enumerate().map(|(i, item)| (id(item), i)).collect()
}

/// Root aggregate of the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "GameStateRecord")]
pub struct GameState {
    pub turn: u32,
    pub phase: TurnPhase,
    player: FactionState,
    ai: FactionState,
    planets: Vec<Planet>,
    platoons: Vec<Platoon>,
    craft: Vec<Craft>,
    next_platoon_id: PlatoonId,
    next_craft_id: CraftId,
    #[serde(skip)]
    index: EntityIndex,
}

/// Persisted shape of [`GameState`]; lookups are rebuilt from the lists.
#[derive(Deserialize)]
struct GameStateRecord {
    turn: u32,
    phase: TurnPhase,
    player: FactionState,
    ai: FactionState,
    planets: Vec<Planet>,
    #[serde(default)]
    platoons: Vec<Platoon>,
    #[serde(default)]
    craft: Vec<Craft>,
    next_platoon_id: PlatoonId,
    next_craft_id: CraftId,
}

impl TryFrom<GameStateRecord> for GameState {
    type Error = StateError;

    fn try_from(r: GameStateRecord) -> Result<Self, Self::Error> {
        let mut state = GameState {
            turn: r.turn,
            phase: r.phase,
            player: r.player,
            ai: r.ai,
            planets: r.planets,
            platoons: r.platoons,
            craft: r.craft,
            next_platoon_id: r.next_platoon_id,
            next_craft_id: r.next_craft_id,
            index: EntityIndex::default(),
        };
        state.rebuild_index();
        let problems = state.validate();
        if !problems.is_empty() {
            return Err(StateError::Invariant(problems.join("; ")));
        }
        Ok(state)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Empty galaxy at turn 1, Income phase.
    pub fn new() -> Self {
        Self {
            turn: 1,
            phase: TurnPhase::Income,
            player: FactionState::default(),
            ai: FactionState::default(),
            planets: Vec::new(),
            platoons: Vec::new(),
            craft: Vec::new(),
            next_platoon_id: 1,
            next_craft_id: 1,
            index: EntityIndex::default(),
        }
    }

    // --- factions ---

    pub fn faction(&self, faction: Faction) -> &FactionState {
        match faction {
            Faction::Player => &self.player,
            Faction::Ai => &self.ai,
        }
    }

    pub fn faction_mut(&mut self, faction: Faction) -> &mut FactionState {
        match faction {
            Faction::Player => &mut self.player,
            Faction::Ai => &mut self.ai,
        }
    }

    pub fn owned_planets(&self, faction: Faction) -> &[PlanetId] {
        &self.faction(faction).owned_planets
    }

    // --- planets ---

    pub fn planets(&self) -> &[Planet] {
        &self.planets
    }

    pub fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.index.planets.get(&id).map(|&i| &self.planets[i])
    }

    pub fn planet_mut(&mut self, id: PlanetId) -> Option<&mut Planet> {
        let i = *self.index.planets.get(&id)?;
        Some(&mut self.planets[i])
    }

    pub fn planet_by_name(&self, name: &str) -> Option<&Planet> {
        self.planets.iter().find(|p| p.name == name)
    }

    /// Insert a planet, registering it with its owner.
    pub fn add_planet(&mut self, planet: Planet) -> Result<PlanetId, StateError> {
        let id = planet.id;
        if self.index.planets.contains_key(&id) {
            return Err(StateError::DuplicatePlanet(id));
        }
        let owner = planet.owner;
        self.index.planets.insert(id, self.planets.len());
        self.planets.push(planet);
        if let Some(faction) = owner {
            insert_sorted(&mut self.faction_mut(faction).owned_planets, id);
        }
        Ok(id)
    }

    /// Transfer a planet; the only way ownership changes.
    pub fn set_planet_owner(
        &mut self,
        id: PlanetId,
        owner: Option<Faction>,
    ) -> Result<Option<Faction>, StateError> {
        let planet = self.planet_mut(id).ok_or(StateError::UnknownPlanet(id))?;
        let previous = std::mem::replace(&mut planet.owner, owner);
        if previous == owner {
            return Ok(previous);
        }
        if let Some(old) = previous {
            self.faction_mut(old).owned_planets.retain(|&p| p != id);
        }
        if let Some(new) = owner {
            insert_sorted(&mut self.faction_mut(new).owned_planets, id);
        }
        Ok(previous)
    }

    // --- platoons ---

    pub fn platoons(&self) -> &[Platoon] {
        &self.platoons
    }

    pub fn platoon(&self, id: PlatoonId) -> Option<&Platoon> {
        self.index.platoons.get(&id).map(|&i| &self.platoons[i])
    }

    pub(crate) fn platoon_mut(&mut self, id: PlatoonId) -> Option<&mut Platoon> {
        let i = *self.index.platoons.get(&id)?;
        Some(&mut self.platoons[i])
    }

    /// Create a platoon garrisoned on `planet` and return its id.
    pub(crate) fn spawn_platoon(
        &mut self,
        owner: Faction,
        planet: PlanetId,
        troops: u32,
        equipment: EquipmentLevel,
        weapon: WeaponLevel,
    ) -> PlatoonId {
        let id = self.next_platoon_id;
        self.next_platoon_id += 1;
        self.index.platoons.insert(id, self.platoons.len());
        self.platoons
            .push(Platoon::new(id, owner, planet, troops, equipment, weapon));
        id
    }

    /// Remove a platoon, detaching it from any craft carrying it.
    pub(crate) fn remove_platoon(&mut self, id: PlatoonId) -> Option<Platoon> {
        let i = self.index.platoons.remove(&id)?;
        let platoon = self.platoons.remove(i);
        self.index.platoons = index_of(&self.platoons, |p| p.id);
        if let PlatoonLocation::Craft(craft_id) = platoon.location {
            if let Some(craft) = self.craft_mut(craft_id) {
                craft.carried.retain(|&p| p != id);
            }
        }
        Some(platoon)
    }

    /// Platoons garrisoned on a planet (not embarked).
    pub fn platoons_at(&self, planet: PlanetId) -> impl Iterator<Item = &Platoon> {
        self.platoons
            .iter()
            .filter(move |p| p.location == PlatoonLocation::Planet(planet))
    }

    pub fn platoon_count_at(&self, planet: PlanetId) -> usize {
        self.platoons_at(planet).count()
    }

    pub fn platoons_of(&self, faction: Faction) -> impl Iterator<Item = &Platoon> {
        self.platoons.iter().filter(move |p| p.owner == faction)
    }

    // --- craft ---

    pub fn craft(&self) -> &[Craft] {
        &self.craft
    }

    pub fn craft_by_id(&self, id: CraftId) -> Option<&Craft> {
        self.index.craft.get(&id).map(|&i| &self.craft[i])
    }

    pub(crate) fn craft_mut(&mut self, id: CraftId) -> Option<&mut Craft> {
        let i = *self.index.craft.get(&id)?;
        Some(&mut self.craft[i])
    }

    pub(crate) fn spawn_craft(
        &mut self,
        owner: Faction,
        kind: CraftType,
        planet: PlanetId,
    ) -> CraftId {
        let id = self.next_craft_id;
        self.next_craft_id += 1;
        self.index.craft.insert(id, self.craft.len());
        self.craft.push(Craft {
            id,
            kind,
            owner,
            planet,
            in_transit: false,
            carried: Vec::new(),
            health: defines::space::CRAFT_MAX_HEALTH,
        });
        id
    }

    /// Remove a craft. Callers must have emptied its hold first.
    pub(crate) fn remove_craft(&mut self, id: CraftId) -> Option<Craft> {
        let i = self.index.craft.remove(&id)?;
        let craft = self.craft.remove(i);
        self.index.craft = index_of(&self.craft, |c| c.id);
        Some(craft)
    }

    pub fn craft_at(&self, planet: PlanetId) -> impl Iterator<Item = &Craft> {
        self.craft
            .iter()
            .filter(move |c| c.planet == planet && !c.in_transit)
    }

    pub fn craft_of(&self, faction: Faction) -> impl Iterator<Item = &Craft> {
        self.craft.iter().filter(move |c| c.owner == faction)
    }

    pub fn fleet_count(&self, faction: Faction) -> usize {
        self.craft_of(faction).count()
    }

    /// Move platoons between a planet garrison and a craft hold.
    pub(crate) fn embark(&mut self, craft: CraftId, platoon: PlatoonId) {
        if let Some(p) = self.platoon_mut(platoon) {
            p.location = PlatoonLocation::Craft(craft);
        }
        if let Some(c) = self.craft_mut(craft) {
            if !c.carried.contains(&platoon) {
                c.carried.push(platoon);
            }
        }
    }

    pub(crate) fn disembark(&mut self, craft: CraftId, platoon: PlatoonId, planet: PlanetId) {
        if let Some(c) = self.craft_mut(craft) {
            c.carried.retain(|&p| p != platoon);
        }
        if let Some(p) = self.platoon_mut(platoon) {
            p.location = PlatoonLocation::Planet(planet);
            p.home_planet = planet;
        }
    }

    // --- queries ---

    pub fn construction_in_progress(&self, planet: PlanetId) -> Option<&Structure> {
        self.planet(planet).and_then(Planet::construction)
    }

    /// Rebuild every id → index map from the backing lists.
    pub fn rebuild_index(&mut self) {
        self.index = EntityIndex {
            planets: index_of(&self.planets, |p| p.id),
            platoons: index_of(&self.platoons, |p| p.id),
            craft: index_of(&self.craft, |c| c.id),
        };
    }

    /// Recompute both factions' owned-planet lists from planet owners.
    pub(crate) fn resync_ownership(&mut self) {
        for faction in Faction::BOTH {
            let mut owned: Vec<PlanetId> = self
                .planets
                .iter()
                .filter(|p| p.owner == Some(faction))
                .map(|p| p.id)
                .collect();
            owned.sort_unstable();
            self.faction_mut(faction).owned_planets = owned;
        }
    }

    /// Check every structural invariant. Returns one message per violation.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.index.planets.len() != self.planets.len() {
            problems.push("duplicate planet ids".to_string());
        }
        if self.index.platoons.len() != self.platoons.len() {
            problems.push("duplicate platoon ids".to_string());
        }
        if self.index.craft.len() != self.craft.len() {
            problems.push("duplicate craft ids".to_string());
        }

        for faction in Faction::BOTH {
            let mut expected: Vec<PlanetId> = self
                .planets
                .iter()
                .filter(|p| p.owner == Some(faction))
                .map(|p| p.id)
                .collect();
            expected.sort_unstable();
            let mut actual = self.faction(faction).owned_planets.clone();
            actual.sort_unstable();
            if expected != actual {
                problems.push(format!(
                    "{faction} owned planets {actual:?} != planets owned {expected:?}"
                ));
            }
            let research = self.faction(faction).research;
            if let Some(project) = research.project {
                if Some(project.target) != research.level.next() {
                    problems.push(format!(
                        "{faction} researching {:?} from {:?}",
                        project.target, research.level
                    ));
                }
            }
        }

        for planet in &self.planets {
            let building = planet
                .structures
                .iter()
                .filter(|s| s.status == BuildingStatus::UnderConstruction)
                .count();
            if building > 1 {
                problems.push(format!(
                    "planet {} has {building} constructions in progress",
                    planet.id
                ));
            }
        }

        for platoon in &self.platoons {
            match platoon.location {
                PlatoonLocation::Planet(p) if self.planet(p).is_none() => {
                    problems.push(format!("platoon {} on missing planet {p}", platoon.id))
                }
                PlatoonLocation::Craft(c) => match self.craft_by_id(c) {
                    Some(craft) if craft.carried.contains(&platoon.id) => {}
                    _ => problems.push(format!(
                        "platoon {} not in hold of craft {c}",
                        platoon.id
                    )),
                },
                _ => {}
            }
            if platoon.troop_count == 0 {
                problems.push(format!("platoon {} has no troops", platoon.id));
            }
            if platoon.id >= self.next_platoon_id {
                problems.push(format!("platoon id {} not below next id", platoon.id));
            }
        }

        for craft in &self.craft {
            if self.planet(craft.planet).is_none() {
                problems.push(format!("craft {} at missing planet {}", craft.id, craft.planet));
            }
            for &p in &craft.carried {
                match self.platoon(p) {
                    Some(platoon) if platoon.location == PlatoonLocation::Craft(craft.id) => {}
                    _ => problems.push(format!("craft {} carries stray platoon {p}", craft.id)),
                }
            }
            if craft.id >= self.next_craft_id {
                problems.push(format!("craft id {} not below next id", craft.id));
            }
            if craft.health == 0 || craft.health > defines::space::CRAFT_MAX_HEALTH {
                problems.push(format!("craft {} has health {}", craft.id, craft.health));
            }
        }

        problems
    }

    /// Compute a deterministic checksum of the game state.
    ///
    /// Identical states produce identical checksums; used to verify saves and
    /// replay determinism. FxHasher has a fixed algorithm, so a checksum
    /// written by one build verifies under another.
    pub fn checksum(&self) -> u64 {
        use rustc_hash::FxHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = FxHasher::default();
        self.turn.hash(&mut hasher);
        self.phase.hash(&mut hasher);
        self.player.hash(&mut hasher);
        self.ai.hash(&mut hasher);
        self.planets.hash(&mut hasher);
        self.platoons.hash(&mut hasher);
        self.craft.hash(&mut hasher);
        self.next_platoon_id.hash(&mut hasher);
        self.next_craft_id.hash(&mut hasher);
        hasher.finish()
    }
}

fn insert_sorted(list: &mut Vec<PlanetId>, id: PlanetId) {
    if let Err(pos) = list.binary_search(&id) {
        list.insert(pos, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::GameStateBuilder;

    #[test]
    fn test_add_planet_registers_owner() {
        let mut state = GameState::new();
        let mut planet = Planet::new(7, "Starbase", PlanetType::Metropolis);
        planet.owner = Some(Faction::Player);
        state.add_planet(planet).unwrap();

        assert_eq!(state.owned_planets(Faction::Player), &[7]);
        assert!(state.owned_planets(Faction::Ai).is_empty());
        assert_eq!(state.planet(7).unwrap().name, "Starbase");
        assert!(state.validate().is_empty());
    }

    #[test]
    fn test_duplicate_planet_rejected() {
        let mut state = GameState::new();
        state
            .add_planet(Planet::new(1, "A", PlanetType::Desert))
            .unwrap();
        assert_eq!(
            state.add_planet(Planet::new(1, "B", PlanetType::Desert)),
            Err(StateError::DuplicatePlanet(1))
        );
        assert_eq!(state.planets().len(), 1);
    }

    #[test]
    fn test_set_owner_keeps_lists_consistent() {
        let mut state = GameStateBuilder::new()
            .with_planet(1, Some(Faction::Player), 1000)
            .with_planet(2, Some(Faction::Ai), 1000)
            .with_planet(3, None, 0)
            .build();

        state.set_planet_owner(2, Some(Faction::Player)).unwrap();
        assert_eq!(state.owned_planets(Faction::Player), &[1, 2]);
        assert!(state.owned_planets(Faction::Ai).is_empty());

        state.set_planet_owner(1, None).unwrap();
        assert_eq!(state.owned_planets(Faction::Player), &[2]);
        assert!(state.validate().is_empty());

        assert_eq!(
            state.set_planet_owner(99, None),
            Err(StateError::UnknownPlanet(99))
        );
    }

    #[test]
    fn test_lookups_survive_removal() {
        let mut state = GameStateBuilder::new()
            .with_planet(1, Some(Faction::Player), 1000)
            .with_platoon(1, Faction::Player, 50)
            .with_platoon(1, Faction::Player, 60)
            .with_platoon(1, Faction::Player, 70)
            .build();

        let ids: Vec<_> = state.platoons().iter().map(|p| p.id()).collect();
        state.remove_platoon(ids[0]).unwrap();

        assert!(state.platoon(ids[0]).is_none());
        assert_eq!(state.platoon(ids[2]).unwrap().troop_count(), 70);
        assert!(state.validate().is_empty());
    }

    #[test]
    fn test_remove_embarked_platoon_clears_hold() {
        let mut state = GameStateBuilder::new()
            .with_planet(1, Some(Faction::Player), 1000)
            .with_craft(1, Faction::Player, CraftType::BattleCruiser)
            .with_platoon(1, Faction::Player, 50)
            .build();
        let craft = state.craft()[0].id();
        let platoon = state.platoons()[0].id();

        state.embark(craft, platoon);
        assert_eq!(state.craft_by_id(craft).unwrap().carried(), &[platoon]);

        state.remove_platoon(platoon);
        assert!(state.craft_by_id(craft).unwrap().carried().is_empty());
        assert!(state.validate().is_empty());
    }

    #[test]
    fn test_validate_detects_stale_owner_list() {
        let mut state = GameStateBuilder::new()
            .with_planet(1, Some(Faction::Player), 1000)
            .build();
        state.faction_mut(Faction::Player).owned_planets.clear();

        let problems = state.validate();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("owned planets"));
    }

    #[test]
    fn test_checksum_determinism() {
        let build = || {
            GameStateBuilder::new()
                .with_planet(1, Some(Faction::Player), 1000)
                .with_planet(2, Some(Faction::Ai), 800)
                .build()
        };
        let a = build();
        let b = build();
        assert_eq!(a.checksum(), b.checksum());

        let mut c = build();
        c.planet_mut(2).unwrap().population += 1;
        assert_ne!(a.checksum(), c.checksum());
    }

    #[test]
    fn test_checksum_is_fxhash_of_fields() {
        use rustc_hash::FxHasher;
        use std::hash::{Hash, Hasher};

        let state = GameStateBuilder::new()
            .turn(4)
            .with_planet(1, Some(Faction::Player), 1000)
            .with_craft(1, Faction::Player, CraftType::CargoCruiser)
            .with_platoon(1, Faction::Player, 25)
            .build();

        let mut hasher = FxHasher::default();
        state.turn.hash(&mut hasher);
        state.phase.hash(&mut hasher);
        state.player.hash(&mut hasher);
        state.ai.hash(&mut hasher);
        state.planets.hash(&mut hasher);
        state.platoons.hash(&mut hasher);
        state.craft.hash(&mut hasher);
        state.next_platoon_id.hash(&mut hasher);
        state.next_craft_id.hash(&mut hasher);

        assert_eq!(state.checksum(), hasher.finish());
    }

    #[test]
    fn test_serde_rebuilds_lookups() {
        let state = GameStateBuilder::new()
            .with_planet(1, Some(Faction::Player), 1000)
            .with_planet(2, Some(Faction::Ai), 800)
            .with_craft(1, Faction::Player, CraftType::BattleCruiser)
            .with_platoon(2, Faction::Ai, 40)
            .build();

        let json = serde_json::to_string(&state).unwrap();
        let loaded: GameState = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded.checksum(), state.checksum());
        assert!(loaded.planet(2).is_some());
        assert!(loaded.craft_by_id(state.craft()[0].id()).is_some());
    }

    #[test]
    fn test_deserialize_rejects_inconsistent_snapshot() {
        let state = GameStateBuilder::new()
            .with_planet(1, Some(Faction::Player), 1000)
            .build();
        let mut value = serde_json::to_value(&state).unwrap();
        value["player"]["owned_planets"] = serde_json::json!([]);

        let err = serde_json::from_value::<GameState>(value).unwrap_err();
        assert!(err.to_string().contains("owned planets"));
    }
}
