//! The turn/phase controller.
//!
//! [`TurnController`] owns the canonical [`GameState`] and is the only thing
//! that moves the game forward:
//!
//! ```text
//! Income ──auto──► Action ──advance──► Combat ──advance──► End ──advance──► Income (turn + 1)
//!                  player acts         AI military         AI economy
//! ```
//!
//! Entering Income runs every per-turn engine and immediately continues into
//! Action. Entering Combat first fights the space battles over every contested
//! orbit. Entering Combat or End then runs the AI's turn for that phase; the shell
//! decides how long to linger before calling [`TurnController::advance_phase`]
//! again. Once a [`VictoryResult`] other than `None` is reached the controller
//! refuses to advance.

use crate::ai::{AiPlayer, AiProfile};
use crate::config::RulesConfig;
use crate::events::GameEvent;
use crate::input::Command;
use crate::metrics::PhaseMetrics;
use crate::observer::EventBus;
use crate::state::{Faction, GameState, TurnPhase};
use crate::step::{execute_command, ActionError, CommandOutcome};
use crate::systems::income::IncomeWarning;
use crate::systems::{
    resolve_space_battles, run_income_tick, run_population_tick, run_research_tick,
    run_training_tick, tick_construction,
};
use crate::victory::{check_outcome, evaluate_all, ConditionReport, VictoryCondition, VictoryResult};
use std::time::Instant;

pub struct TurnController {
    state: GameState,
    rules: RulesConfig,
    bus: EventBus,
    ai: Box<dyn AiPlayer>,
    conditions: Vec<VictoryCondition>,
    /// Turn the scenario began on, for `survive_turns`.
    start_turn: u32,
    outcome: VictoryResult,
    metrics: PhaseMetrics,
}

impl TurnController {
    pub fn new(state: GameState, rules: RulesConfig, ai: Box<dyn AiPlayer>) -> Self {
        let start_turn = state.turn;
        Self {
            state,
            rules,
            bus: EventBus::new(),
            ai,
            conditions: Vec::new(),
            start_turn,
            outcome: VictoryResult::None,
            metrics: PhaseMetrics::default(),
        }
    }

    pub fn with_conditions(mut self, conditions: Vec<VictoryCondition>, start_turn: u32) -> Self {
        self.conditions = conditions;
        self.start_turn = start_turn;
        self
    }

    /// Resume a finished game without re-announcing the result.
    pub fn with_outcome(mut self, outcome: VictoryResult) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn ai_name(&self) -> &str {
        self.ai.name()
    }

    pub fn ai_profile(&self) -> Option<AiProfile> {
        self.ai.profile()
    }

    pub fn conditions(&self) -> &[VictoryCondition] {
        &self.conditions
    }

    pub fn start_turn(&self) -> u32 {
        self.start_turn
    }

    pub fn outcome(&self) -> VictoryResult {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_over()
    }

    pub fn metrics(&self) -> &PhaseMetrics {
        &self.metrics
    }

    pub fn condition_report(&self) -> ConditionReport {
        evaluate_all(&self.conditions, &self.state, self.start_turn)
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Begin play. A fresh game sits in the Income phase: announce the turn,
    /// process income and open the Action phase. Any other phase (a loaded
    /// game) is left as is.
    pub fn start(&mut self) {
        if self.state.phase != TurnPhase::Income || self.is_over() {
            return;
        }
        self.publish(GameEvent::TurnStarted {
            turn: self.state.turn,
        });
        self.enter(TurnPhase::Income);
        self.process_income();
        self.enter(TurnPhase::Action);
        self.refresh_outcome();
    }

    /// Move to the next phase, running whatever that phase entails. Returns
    /// the phase the game is now waiting in.
    pub fn advance_phase(&mut self) -> Result<TurnPhase, ActionError> {
        if self.is_over() {
            return Err(ActionError::GameOver);
        }

        match self.state.phase {
            TurnPhase::Income => {
                self.process_income();
                self.enter(TurnPhase::Action);
            }
            TurnPhase::Action => {
                self.enter(TurnPhase::Combat);
                self.fight_space_battles();
                self.run_ai_turn();
            }
            TurnPhase::Combat => {
                self.enter(TurnPhase::End);
                self.run_ai_turn();
            }
            TurnPhase::End => self.complete_turn(),
        }

        self.refresh_outcome();
        Ok(self.state.phase)
    }

    /// Advance until the player's next Action phase, or the end of the game.
    pub fn advance_to_next_turn(&mut self) -> Result<u32, ActionError> {
        loop {
            if self.advance_phase()? == TurnPhase::Action || self.is_over() {
                return Ok(self.state.turn);
            }
        }
    }

    /// Issue a player command.
    pub fn execute(&mut self, cmd: &Command) -> Result<CommandOutcome, ActionError> {
        if self.is_over() {
            return Err(ActionError::GameOver);
        }
        let started = Instant::now();
        let result = self.apply(Faction::Player, cmd);
        self.metrics.record(self.state.phase, started.elapsed());
        self.refresh_outcome();
        result
    }

    /// Let `autopilot` play the player's Action phase. Returns the number of
    /// accepted commands.
    pub fn autoplay_player(&mut self, autopilot: &mut dyn AiPlayer) -> usize {
        if self.state.phase != TurnPhase::Action {
            return 0;
        }
        let commands = autopilot.decide(&self.state, &self.rules, Faction::Player);
        commands
            .iter()
            .filter(|cmd| self.execute(cmd).is_ok())
            .count()
    }

    fn publish(&self, event: GameEvent) {
        self.bus.publish(&event);
    }

    fn enter(&mut self, phase: TurnPhase) {
        self.state.phase = phase;
        log::debug!("Turn {}: entering {} phase", self.state.turn, phase);
        self.publish(GameEvent::PhaseChanged {
            turn: self.state.turn,
            phase,
        });
    }

    fn complete_turn(&mut self) {
        let started = Instant::now();
        self.publish(GameEvent::TurnEnded {
            turn: self.state.turn,
        });
        self.state.turn += 1;
        self.metrics.turns += 1;
        self.metrics.record(TurnPhase::End, started.elapsed());

        self.publish(GameEvent::TurnStarted {
            turn: self.state.turn,
        });
        self.enter(TurnPhase::Income);
        self.process_income();
        self.enter(TurnPhase::Action);
    }

    #[tracing::instrument(skip_all, name = "income_phase")]
    fn process_income(&mut self) {
        let started = Instant::now();
        let turn = self.state.turn;

        let report = run_income_tick(&mut self.state, &self.rules);
        self.publish(GameEvent::IncomeProcessed {
            turn,
            player: report.delta(Faction::Player),
            ai: report.delta(Faction::Ai),
        });
        for warning in &report.warnings {
            let event = match *warning {
                IncomeWarning::NoPlanetsOwned { faction } => GameEvent::NoPlanetsOwned { turn, faction },
                IncomeWarning::LowMorale {
                    faction,
                    planet,
                    penalty_percent,
                } => GameEvent::LowMoralePenalty {
                    turn,
                    faction,
                    planet,
                    penalty_percent,
                },
            };
            self.publish(event);
        }

        for done in tick_construction(&mut self.state) {
            self.publish(GameEvent::BuildingCompleted {
                turn,
                planet: done.planet,
                owner: done.owner,
                building: done.building,
            });
        }

        for change in run_population_tick(&mut self.state, &self.rules) {
            if let Some(shortage) = change.shortage {
                self.publish(GameEvent::FoodShortage {
                    turn,
                    planet: change.planet,
                    shortage,
                });
            }
        }

        run_training_tick(&mut self.state, &self.rules);

        for (faction, weapon) in run_research_tick(&mut self.state) {
            self.publish(GameEvent::ResearchCompleted {
                turn,
                faction,
                weapon,
            });
        }

        debug_assert!(self.state.validate().is_empty());
        self.metrics.record(TurnPhase::Income, started.elapsed());
    }

    fn fight_space_battles(&mut self) {
        let started = Instant::now();
        let turn = self.state.turn;
        for report in resolve_space_battles(&mut self.state, &self.rules) {
            self.publish(GameEvent::SpaceBattleFought { turn, report });
        }
        debug_assert!(self.state.validate().is_empty());
        self.metrics.record(TurnPhase::Combat, started.elapsed());
    }

    #[tracing::instrument(skip_all, name = "ai_turn")]
    fn run_ai_turn(&mut self) {
        let started = Instant::now();
        let turn = self.state.turn;
        let phase = self.state.phase;

        self.publish(GameEvent::AiTurnStarted {
            turn,
            phase,
            commander: self.ai.name().to_string(),
        });

        let commands = self.ai.decide(&self.state, &self.rules, Faction::Ai);
        let mut accepted = 0;
        for cmd in &commands {
            match self.apply(Faction::Ai, cmd) {
                Ok(CommandOutcome::ConstructionStarted {
                    planet, building, ..
                }) => {
                    accepted += 1;
                    self.publish(GameEvent::AiBuilding {
                        turn,
                        planet,
                        building,
                    });
                }
                Ok(CommandOutcome::Invasion(report)) => {
                    accepted += 1;
                    self.publish(GameEvent::AiAttacking {
                        turn,
                        planet: report.planet,
                        aggression: report.aggression,
                    });
                }
                Ok(_) => accepted += 1,
                Err(_) => {}
            }
        }

        self.publish(GameEvent::AiTurnCompleted {
            turn,
            phase,
            actions: accepted,
        });

        let elapsed = started.elapsed();
        self.metrics.ai_time += elapsed;
        self.metrics.record(phase, elapsed);
    }

    /// Execute a command for either faction and publish the result.
    fn apply(&mut self, faction: Faction, cmd: &Command) -> Result<CommandOutcome, ActionError> {
        let turn = self.state.turn;
        match execute_command(&mut self.state, &self.rules, faction, cmd) {
            Ok(outcome) => {
                self.metrics.commands += 1;
                if let CommandOutcome::Invasion(report) = &outcome {
                    if report.result.victory {
                        self.publish(GameEvent::PlanetCaptured {
                            turn,
                            planet: report.planet,
                            from: report.defender,
                            to: report.attacker,
                        });
                    }
                }
                self.publish(GameEvent::CommandExecuted {
                    turn,
                    faction,
                    outcome: outcome.clone(),
                });
                Ok(outcome)
            }
            Err(e) => {
                self.metrics.rejected_commands += 1;
                log::debug!("{} command {:?} rejected: {}", faction, cmd, e);
                self.publish(GameEvent::CommandRejected {
                    turn,
                    faction,
                    command: cmd.clone(),
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn refresh_outcome(&mut self) {
        if self.is_over() {
            return;
        }
        let outcome = check_outcome(&self.conditions, &self.state, self.start_turn);
        if outcome.is_over() {
            log::info!("Game over on turn {}: {:?}", self.state.turn, outcome);
            self.outcome = outcome;
            self.publish(GameEvent::VictoryAchieved {
                turn: self.state.turn,
                result: outcome,
            });
        }
    }
}

#[cfg(test)]
#[path = "turn_tests.rs"]
mod tests;
