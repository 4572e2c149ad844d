use crate::state::TurnPhase;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Accumulated wall-clock time per phase of the turn loop.
#[derive(Default, Clone, Debug, Serialize, Deserialize)]
pub struct PhaseMetrics {
    pub turns: u64,
    pub income_time: Duration,
    pub action_time: Duration,
    pub combat_time: Duration,
    pub end_time: Duration,
    /// AI planning and execution, also counted in its phase
    pub ai_time: Duration,
    /// Commands executed, by either faction
    pub commands: u64,
    pub rejected_commands: u64,
}

impl PhaseMetrics {
    pub fn record(&mut self, phase: TurnPhase, elapsed: Duration) {
        match phase {
            TurnPhase::Income => self.income_time += elapsed,
            TurnPhase::Action => self.action_time += elapsed,
            TurnPhase::Combat => self.combat_time += elapsed,
            TurnPhase::End => self.end_time += elapsed,
        }
    }

    pub fn total_time(&self) -> Duration {
        self.income_time + self.action_time + self.combat_time + self.end_time
    }

    pub fn turn_avg_ms(&self) -> f64 {
        if self.turns == 0 {
            0.0
        } else {
            self.total_time().as_secs_f64() * 1000.0 / self.turns as f64
        }
    }
}
