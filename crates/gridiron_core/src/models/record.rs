use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::boxscore::Boxscore;
use super::events::GameEvent;
use super::game_state::GameState;
use super::team::{TeamId, TeamSide};

/// Final, serializable record of a completed game.
///
/// Handed to the persistence layer once the game is final; the encoding is
/// up to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GameRecord {
    pub schema_version: u32,
    pub seed: u64,
    pub home: TeamEntry,
    pub away: TeamEntry,
    pub final_state: GameState,
    /// `None` for a tie
    pub winner: Option<TeamSide>,
    pub boxscore: Boxscore,
    /// SHA-256 of the full event log
    pub fingerprint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<GameEvent>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TeamEntry {
    pub id: TeamId,
    pub name: String,
    pub abbr: String,
}

impl GameRecord {
    pub fn total_drives(&self) -> usize {
        self.boxscore.drives.len()
    }

    pub fn without_events(mut self) -> Self {
        self.events = None;
        self
    }
}
