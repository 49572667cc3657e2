//! Save data for the persistence collaborator.
//!
//! [`SaveData`] is a plain mirror of the session's mutable state, with no
//! behavior and every field defaulted so an older or hand-trimmed save still
//! reconstructs. The engine never decides *when* to save; it just produces
//! and consumes these.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::player::Player;
use crate::room::{Room, RoomId};
use crate::session::MapMode;

/// Errors reading or writing a save file. Callers report these and fall
/// back to a new game; nothing here is fatal.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("could not access save file: {0}")]
    Io(#[from] std::io::Error),

    #[error("save data is corrupted: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Everything a run needs to resume. Absent fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SaveData {
    /// The run's seed, recorded so a resumed session keeps a deterministic
    /// random source (the stream restarts; see DESIGN notes).
    pub seed: u64,
    pub player: Player,
    pub rooms: Vec<Room>,
    pub current_room: RoomId,
    pub start_room: RoomId,
    pub history: Vec<RoomId>,
    pub travelled: u32,
    pub mode: MapMode,
    /// Name of the winning item, once carried.
    pub artifact: Option<String>,
}

impl SaveData {
    /// Write the save as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SaveError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Read a save from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SaveError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
