pub mod boxscore;
pub mod events;
pub mod game_state;
pub mod play;
pub mod record;
pub mod team;

pub use boxscore::{
    Boxscore, DefensiveStats, DriveResult, DriveSummary, KickingStats, Leaders, PassingStats,
    PlayerStatLine, ReceivingStats, ReturnStats, RushingStats, TeamStatLine,
};
pub use events::{GameEvent, GameEventKind, Situation};
pub use game_state::{
    GameState, Period, PlayPhase, Score, Timeouts, FIELD_LENGTH, FIRST_DOWN_DISTANCE,
};
pub use play::{
    Participants, PenaltyKind, PlayContext, PlayOutcome, PlayRequest, PlayResult, PlayType,
    ScoreKind, ScoringPlay,
};
pub use record::{GameRecord, TeamEntry};
pub use team::{PlayerId, Position, RosterPlayer, TeamCapability, TeamId, TeamProfile, TeamSide};
