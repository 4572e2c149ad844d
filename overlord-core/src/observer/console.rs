//! Console observer that narrates the game through the `log` facade.

use super::{GameObserver, ObserverError};
use crate::events::GameEvent;

/// Logs each event as a single human-readable line.
///
/// Warnings go out at `warn`, rejected commands at `debug` and everything else
/// at `info`, so `--log-level warn` leaves only the problems.
#[derive(Debug, Default)]
pub struct ConsoleObserver {
    /// Also log every accepted command.
    verbose: bool,
}

impl ConsoleObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn level(&self, event: &GameEvent) -> Option<log::Level> {
        match event {
            e if e.is_warning() => Some(log::Level::Warn),
            GameEvent::CommandRejected { .. } => Some(log::Level::Debug),
            GameEvent::CommandExecuted { .. } if !self.verbose => None,
            GameEvent::PhaseChanged { .. } => Some(log::Level::Debug),
            _ => Some(log::Level::Info),
        }
    }
}

impl GameObserver for ConsoleObserver {
    fn on_event(&self, event: &GameEvent) -> Result<(), ObserverError> {
        if let Some(level) = self.level(event) {
            log::log!(level, "{}", event);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "ConsoleObserver"
    }
}
