use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::boxscore::DriveSummary;
use super::game_state::{GameState, Period, PlayPhase, Score};
use super::play::{PlayOutcome, PlayResult, PlayType, ScoreKind};
use super::team::TeamSide;
use crate::engine::momentum::MomentumState;

/// One entry of the game's event stream.
///
/// Events are append-only; `sequence` is the position in the log and
/// `play_index` the number of plays applied when the event was emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GameEvent {
    pub sequence: u32,
    pub play_index: u32,
    #[serde(flatten)]
    pub kind: GameEventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEventKind {
    PlayApplied {
        offense: TeamSide,
        outcome: PlayOutcome,
        /// Result after rules were applied (e.g. a short 4th-down gain
        /// becomes `turnover_on_downs`)
        ruling: PlayResult,
        first_down: bool,
        /// Possession flipped on this play (turnovers, kicks, tries)
        possession_changed: bool,
        after: Situation,
        momentum: MomentumState,
    },
    QuarterChanged {
        from: Period,
        to: Period,
    },
    ScoreChanged {
        team: TeamSide,
        kind: ScoreKind,
        points: u8,
        score: Score,
    },
    DriveEnded {
        drive: DriveSummary,
    },
    TwoMinuteWarning {
        period: Period,
    },
    TimeoutCalled {
        team: TeamSide,
        remaining: u8,
    },
    /// The play was refused and the state left untouched.
    PlayRejected {
        play_type: PlayType,
        reason: String,
    },
    GameEnded {
        score: Score,
        #[serde(skip_serializing_if = "Option::is_none")]
        winner: Option<TeamSide>,
    },
}

/// Compact post-play situation for renderers that only follow the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Situation {
    pub period: Period,
    pub clock: u32,
    pub possession: TeamSide,
    pub phase: PlayPhase,
    pub down: u8,
    pub distance: u8,
    pub yard_line: u8,
    pub score: Score,
}

impl Situation {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            period: state.period,
            clock: state.clock,
            possession: state.possession,
            phase: state.phase,
            down: state.down,
            distance: state.distance,
            yard_line: state.yard_line,
            score: state.score,
        }
    }
}

impl GameEvent {
    pub fn is_scoring(&self) -> bool {
        matches!(self.kind, GameEventKind::ScoreChanged { .. })
    }

    /// Short label for text logs.
    pub fn label(&self) -> String {
        match &self.kind {
            GameEventKind::PlayApplied { offense, outcome, ruling, .. } => {
                format!("{:?} {:?}: {:?} {:+} yds", offense, outcome.play_type, ruling, outcome.yards)
            }
            GameEventKind::QuarterChanged { to, .. } => format!("Start of {}", to.label()),
            GameEventKind::ScoreChanged { team, kind, score, .. } => {
                format!("{:?} {:?} ({}-{})", team, kind, score.home, score.away)
            }
            GameEventKind::DriveEnded { drive } => {
                format!("Drive {} ended: {:?}", drive.id, drive.result)
            }
            GameEventKind::TwoMinuteWarning { period } => {
                format!("Two-minute warning ({})", period.label())
            }
            GameEventKind::TimeoutCalled { team, remaining } => {
                format!("Timeout {:?} ({} left)", team, remaining)
            }
            GameEventKind::PlayRejected { play_type, reason } => {
                format!("Rejected {:?}: {}", play_type, reason)
            }
            GameEventKind::GameEnded { score, .. } => {
                format!("Final {}-{}", score.home, score.away)
            }
        }
    }
}
