//! Lifecycle events published by the turn controller.
//!
//! Every event carries the turn it happened in. Events serialize as tagged
//! JSON objects so a log can be replayed or filtered line by line:
//!
//! ```json
//! {"type":"building_completed","turn":4,"planet":2,"owner":"ai","building":"MiningStation"}
//! ```

use crate::buildings::BuildingType;
use crate::input::Command;
use crate::resources::ResourceDelta;
use crate::state::{Faction, PlanetId, TurnPhase};
use crate::step::CommandOutcome;
use crate::systems::population::FoodShortage;
use crate::systems::space_combat::SpaceBattleReport;
use crate::units::WeaponLevel;
use crate::victory::VictoryResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    TurnStarted {
        turn: u32,
    },
    TurnEnded {
        turn: u32,
    },
    PhaseChanged {
        turn: u32,
        phase: TurnPhase,
    },
    BuildingCompleted {
        turn: u32,
        planet: PlanetId,
        #[serde(skip_serializing_if = "Option::is_none")]
        owner: Option<Faction>,
        building: BuildingType,
    },
    /// Both factions' income for the turn, after the difficulty multiplier.
    IncomeProcessed {
        turn: u32,
        player: ResourceDelta,
        ai: ResourceDelta,
    },
    LowMoralePenalty {
        turn: u32,
        faction: Faction,
        planet: PlanetId,
        penalty_percent: u32,
    },
    NoPlanetsOwned {
        turn: u32,
        faction: Faction,
    },
    FoodShortage {
        turn: u32,
        planet: PlanetId,
        shortage: FoodShortage,
    },
    CommandExecuted {
        turn: u32,
        faction: Faction,
        outcome: CommandOutcome,
    },
    CommandRejected {
        turn: u32,
        faction: Faction,
        command: Command,
        reason: String,
    },
    PlanetCaptured {
        turn: u32,
        planet: PlanetId,
        #[serde(skip_serializing_if = "Option::is_none")]
        from: Option<Faction>,
        to: Faction,
    },
    AiTurnStarted {
        turn: u32,
        phase: TurnPhase,
        commander: String,
    },
    AiTurnCompleted {
        turn: u32,
        phase: TurnPhase,
        /// Commands that the engines accepted.
        actions: usize,
    },
    SpaceBattleFought {
        turn: u32,
        report: SpaceBattleReport,
    },
    ResearchCompleted {
        turn: u32,
        faction: Faction,
        weapon: WeaponLevel,
    },
    AiBuilding {
        turn: u32,
        planet: PlanetId,
        building: BuildingType,
    },
    AiAttacking {
        turn: u32,
        planet: PlanetId,
        aggression: u8,
    },
    VictoryAchieved {
        turn: u32,
        result: VictoryResult,
    },
}

/// Payload-free discriminant of [`GameEvent`], used to subscribe by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    TurnStarted,
    TurnEnded,
    PhaseChanged,
    BuildingCompleted,
    IncomeProcessed,
    LowMoralePenalty,
    NoPlanetsOwned,
    FoodShortage,
    CommandExecuted,
    CommandRejected,
    PlanetCaptured,
    AiTurnStarted,
    AiTurnCompleted,
    SpaceBattleFought,
    ResearchCompleted,
    AiBuilding,
    AiAttacking,
    VictoryAchieved,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::TurnStarted { .. } => EventKind::TurnStarted,
            GameEvent::TurnEnded { .. } => EventKind::TurnEnded,
            GameEvent::PhaseChanged { .. } => EventKind::PhaseChanged,
            GameEvent::BuildingCompleted { .. } => EventKind::BuildingCompleted,
            GameEvent::IncomeProcessed { .. } => EventKind::IncomeProcessed,
            GameEvent::LowMoralePenalty { .. } => EventKind::LowMoralePenalty,
            GameEvent::NoPlanetsOwned { .. } => EventKind::NoPlanetsOwned,
            GameEvent::FoodShortage { .. } => EventKind::FoodShortage,
            GameEvent::CommandExecuted { .. } => EventKind::CommandExecuted,
            GameEvent::CommandRejected { .. } => EventKind::CommandRejected,
            GameEvent::PlanetCaptured { .. } => EventKind::PlanetCaptured,
            GameEvent::AiTurnStarted { .. } => EventKind::AiTurnStarted,
            GameEvent::AiTurnCompleted { .. } => EventKind::AiTurnCompleted,
            GameEvent::SpaceBattleFought { .. } => EventKind::SpaceBattleFought,
            GameEvent::ResearchCompleted { .. } => EventKind::ResearchCompleted,
            GameEvent::AiBuilding { .. } => EventKind::AiBuilding,
            GameEvent::AiAttacking { .. } => EventKind::AiAttacking,
            GameEvent::VictoryAchieved { .. } => EventKind::VictoryAchieved,
        }
    }

    pub fn turn(&self) -> u32 {
        match self {
            GameEvent::TurnStarted { turn }
            | GameEvent::TurnEnded { turn }
            | GameEvent::PhaseChanged { turn, .. }
            | GameEvent::BuildingCompleted { turn, .. }
            | GameEvent::IncomeProcessed { turn, .. }
            | GameEvent::LowMoralePenalty { turn, .. }
            | GameEvent::NoPlanetsOwned { turn, .. }
            | GameEvent::FoodShortage { turn, .. }
            | GameEvent::CommandExecuted { turn, .. }
            | GameEvent::CommandRejected { turn, .. }
            | GameEvent::PlanetCaptured { turn, .. }
            | GameEvent::AiTurnStarted { turn, .. }
            | GameEvent::AiTurnCompleted { turn, .. }
            | GameEvent::SpaceBattleFought { turn, .. }
            | GameEvent::ResearchCompleted { turn, .. }
            | GameEvent::AiBuilding { turn, .. }
            | GameEvent::AiAttacking { turn, .. }
            | GameEvent::VictoryAchieved { turn, .. } => *turn,
        }
    }

    /// Warnings the shell should surface prominently.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            GameEvent::LowMoralePenalty { .. }
                | GameEvent::NoPlanetsOwned { .. }
                | GameEvent::FoodShortage { .. }
        )
    }
}

impl std::fmt::Display for GameEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameEvent::TurnStarted { turn } => write!(f, "Turn {turn} started"),
            GameEvent::TurnEnded { turn } => write!(f, "Turn {turn} ended"),
            GameEvent::PhaseChanged { turn, phase } => write!(f, "Turn {turn}: {phase} phase"),
            GameEvent::BuildingCompleted {
                planet,
                owner,
                building,
                ..
            } => match owner {
                Some(owner) => write!(f, "{owner} completed {building} on planet {planet}"),
                None => write!(f, "{building} completed on planet {planet}"),
            },
            GameEvent::IncomeProcessed { player, ai, .. } => write!(
                f,
                "Income: Player {} credits, AI {} credits",
                player.credits, ai.credits
            ),
            GameEvent::LowMoralePenalty {
                faction,
                planet,
                penalty_percent,
                ..
            } => write!(
                f,
                "Low morale on {faction} planet {planet}: income reduced by {penalty_percent}%"
            ),
            GameEvent::NoPlanetsOwned { faction, .. } => {
                write!(f, "{faction} owns no planets and has no income")
            }
            GameEvent::FoodShortage {
                planet, shortage, ..
            } => write!(f, "Planet {planet}: {shortage:?}"),
            GameEvent::CommandExecuted {
                faction, outcome, ..
            } => write!(f, "{faction}: {outcome:?}"),
            GameEvent::CommandRejected {
                faction, reason, ..
            } => write!(f, "{faction} command rejected: {reason}"),
            GameEvent::PlanetCaptured { planet, to, .. } => {
                write!(f, "Planet {planet} captured by {to}")
            }
            GameEvent::AiTurnStarted {
                phase, commander, ..
            } => write!(f, "{commander} begins the {phase} turn"),
            GameEvent::AiTurnCompleted { phase, actions, .. } => {
                write!(f, "AI {phase} turn complete ({actions} actions)")
            }
            GameEvent::SpaceBattleFought { report, .. } => write!(
                f,
                "{} won the battle over planet {} ({} vs {}), {} craft destroyed",
                report.winner(),
                report.planet,
                report.attacker_strength,
                report.defender_strength,
                report.destroyed.len()
            ),
            GameEvent::ResearchCompleted {
                faction, weapon, ..
            } => write!(f, "{faction} completed {weapon:?} weapons research"),
            GameEvent::AiBuilding {
                planet, building, ..
            } => write!(f, "AI constructing {building} on planet {planet}"),
            GameEvent::AiAttacking {
                planet, aggression, ..
            } => write!(f, "AI attacking planet {planet} at {aggression}% aggression"),
            GameEvent::VictoryAchieved { turn, result } => {
                write!(f, "Game over on turn {turn}: {result:?}")
            }
        }
    }
}
