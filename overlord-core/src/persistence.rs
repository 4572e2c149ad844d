//! Save and load a game in progress.
//!
//! A save is a single pretty-printed JSON document holding the full
//! [`GameState`], the scenario's win conditions, the game's outcome and the
//! opponent's [`AiProfile`], plus a checksum of the state. Writes go to a sibling `.tmp` file that is renamed
//! over the target only once it is complete.

use crate::ai::{AiPlayer, AiProfile, StrategicAi};
use crate::config::RulesConfig;
use crate::state::{Faction, GameState};
use crate::turn::TurnController;
use crate::victory::{VictoryCondition, VictoryResult};
use serde::{Deserialize, Serialize};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

pub const SAVE_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed save: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported save version {found} (expected {SAVE_VERSION})")]
    UnsupportedVersion { found: u32 },
    #[error("Checksum mismatch: file says {stored:#x}, state hashes to {actual:#x}")]
    ChecksumMismatch { stored: u64, actual: u64 },
    #[error("Invalid game state: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct SaveGame {
    pub version: u32,
    /// Unix seconds.
    pub saved_at: u64,
    pub state: GameState,
    pub outcome: VictoryResult,
    pub conditions: Vec<VictoryCondition>,
    pub start_turn: u32,
    /// `None` for opponents that cannot be rebuilt, such as [`crate::ai::PassiveAi`].
    pub ai: Option<AiProfile>,
    pub checksum: u64,
}

/// On-disk shape before the state is checked.
#[derive(Deserialize)]
struct SaveRecord {
    version: u32,
    saved_at: u64,
    state: serde_json::Value,
    #[serde(default)]
    outcome: VictoryResult,
    #[serde(default)]
    conditions: Vec<VictoryCondition>,
    start_turn: u32,
    #[serde(default)]
    ai: Option<AiProfile>,
    checksum: u64,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

impl SaveGame {
    pub fn capture(controller: &TurnController) -> Self {
        let state = controller.state().clone();
        let checksum = state.checksum();
        let saved_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            version: SAVE_VERSION,
            saved_at,
            state,
            outcome: controller.outcome(),
            conditions: controller.conditions().to_vec(),
            start_turn: controller.start_turn(),
            ai: controller.ai_profile(),
            checksum,
        }
    }

    pub fn write(&self, path: &Path) -> Result<(), SaveError> {
        let tmp = tmp_path(path);
        if let Err(e) = self.write_to(&tmp) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e);
        }
        std::fs::rename(&tmp, path)?;
        log::info!(
            "Saved turn {} ({:?}) to {}",
            self.state.turn,
            self.state.phase,
            path.display()
        );
        Ok(())
    }

    fn write_to(&self, path: &Path) -> Result<(), SaveError> {
        let file = std::fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self, SaveError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        let probe: VersionProbe = serde_json::from_str(json)?;
        if probe.version != SAVE_VERSION {
            return Err(SaveError::UnsupportedVersion {
                found: probe.version,
            });
        }

        let record: SaveRecord = serde_json::from_str(json)?;
        let state =
            GameState::deserialize(record.state).map_err(|e| SaveError::Invalid(e.to_string()))?;
        let actual = state.checksum();
        if actual != record.checksum {
            return Err(SaveError::ChecksumMismatch {
                stored: record.checksum,
                actual,
            });
        }

        Ok(Self {
            version: record.version,
            saved_at: record.saved_at,
            state,
            outcome: record.outcome,
            conditions: record.conditions,
            start_turn: record.start_turn,
            ai: record.ai,
            checksum: record.checksum,
        })
    }

    /// The saved opponent, or the default one for saves that do not name it.
    pub fn opponent(&self) -> StrategicAi {
        StrategicAi::from_profile(self.ai.unwrap_or_default())
    }

    /// Replace the saved opponent. The AI faction's income follows the new
    /// difficulty.
    pub fn set_ai_profile(&mut self, profile: AiProfile) {
        self.state.faction_mut(Faction::Ai).income_multiplier_percent =
            profile.difficulty.income_multiplier_percent();
        self.checksum = self.state.checksum();
        self.ai = Some(profile);
    }

    /// Resume play. The outcome is restored silently, so a finished game
    /// stays finished without announcing its result again.
    pub fn into_controller(self, rules: RulesConfig, ai: Box<dyn AiPlayer>) -> TurnController {
        TurnController::new(self.state, rules, ai)
            .with_conditions(self.conditions, self.start_turn)
            .with_outcome(self.outcome)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
