use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::game_state::{GameState, Period, PlayPhase};
use super::team::{PlayerId, TeamId, TeamSide};

/// Closed set of play calls accepted at the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "snake_case")]
pub enum PlayType {
    PassShort,
    PassMedium,
    PassLong,
    RunInside,
    RunOutside,
    Punt,
    FieldGoal,
    Kneel,
    Spike,
    Kickoff,
    ExtraPoint,
    TwoPoint,
}

impl PlayType {
    /// Phase in which this play may be called.
    pub fn phase(self) -> PlayPhase {
        match self {
            PlayType::Kickoff => PlayPhase::Kickoff,
            PlayType::ExtraPoint | PlayType::TwoPoint => PlayPhase::Try,
            _ => PlayPhase::Scrimmage,
        }
    }

    pub fn is_pass(self) -> bool {
        matches!(self, PlayType::PassShort | PlayType::PassMedium | PlayType::PassLong)
    }

    pub fn is_run(self) -> bool {
        matches!(self, PlayType::RunInside | PlayType::RunOutside)
    }

    pub fn is_kick(self) -> bool {
        matches!(
            self,
            PlayType::Punt | PlayType::FieldGoal | PlayType::Kickoff | PlayType::ExtraPoint
        )
    }
}

impl std::str::FromStr for PlayType {
    type Err = String;

    /// Parses the snake_case wire name; anything else is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("unknown play type: {s}"))
    }
}

/// Situation a request was computed against.
///
/// The state machine compares it with the live state; any difference means the
/// request is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlayContext {
    pub offense: TeamSide,
    pub phase: PlayPhase,
    pub period: Period,
    pub clock: u32,
    pub down: u8,
    pub distance: u8,
    pub yard_line: u8,
    /// Offense score minus defense score
    pub score_margin: i32,
}

impl PlayContext {
    pub fn from_state(state: &GameState) -> Self {
        let offense = state.offense();
        Self {
            offense,
            phase: state.phase,
            period: state.period,
            clock: state.clock,
            down: state.down,
            distance: state.distance,
            yard_line: state.yard_line,
            score_margin: state.score.margin_for(offense),
        }
    }

    pub fn defense(&self) -> TeamSide {
        self.offense.opponent()
    }

    pub fn yards_to_goal(&self) -> u8 {
        100 - self.yard_line
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlayRequest {
    pub offense: TeamId,
    pub defense: TeamId,
    pub play_type: PlayType,
    pub context: PlayContext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlayResult {
    Complete,
    Incomplete,
    Rush,
    Sack,
    Interception,
    FumbleLost,
    FumbleRecovered,
    Touchdown,
    Safety,
    /// Only ever produced by the state machine's ruling
    TurnoverOnDowns,
    FieldGoalGood,
    FieldGoalMissed,
    Punt,
    KickReturn,
    Touchback,
    Penalty,
    Kneel,
    Spike,
    ExtraPointGood,
    ExtraPointMissed,
    TwoPointGood,
    TwoPointFailed,
}

impl PlayResult {
    pub fn is_turnover(self) -> bool {
        matches!(
            self,
            PlayResult::Interception | PlayResult::FumbleLost | PlayResult::TurnoverOnDowns
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    Touchdown,
    FieldGoal,
    Safety,
    ExtraPoint,
    TwoPoint,
}

impl ScoreKind {
    pub fn points(self) -> u8 {
        match self {
            ScoreKind::Touchdown => 6,
            ScoreKind::FieldGoal => 3,
            ScoreKind::Safety => 2,
            ScoreKind::ExtraPoint => 1,
            ScoreKind::TwoPoint => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScoringPlay {
    pub team: TeamSide,
    pub kind: ScoreKind,
    pub points: u8,
}

impl ScoringPlay {
    pub fn new(team: TeamSide, kind: ScoreKind) -> Self {
        Self { team, kind, points: kind.points() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyKind {
    FalseStart,
    OffensiveHolding,
    Offside,
    DefensiveHolding,
}

impl PenaltyKind {
    /// Full enforcement before the half-the-distance rule.
    pub fn base_yards(self) -> u8 {
        match self {
            PenaltyKind::FalseStart => 5,
            PenaltyKind::OffensiveHolding => 10,
            PenaltyKind::Offside => 5,
            PenaltyKind::DefensiveHolding => 5,
        }
    }

    pub fn against_offense(self) -> bool {
        matches!(self, PenaltyKind::FalseStart | PenaltyKind::OffensiveHolding)
    }

    /// Signed yards for the offense at a spot, half the distance to the
    /// goal when the full walk-off would not fit.
    pub fn enforced_yards(self, yard_line: u8) -> i32 {
        let base = self.base_yards() as i32;
        if self.against_offense() {
            -base.min(yard_line as i32 / 2)
        } else {
            base.min((100 - yard_line as i32) / 2)
        }
    }

    /// Awards a first down regardless of distance.
    pub fn automatic_first_down(self) -> bool {
        matches!(self, PenaltyKind::DefensiveHolding)
    }
}

/// Players credited on a play. Any slot may be empty when the roster has
/// nobody at the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Participants {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passer: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ball_carrier: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tackler: Option<PlayerId>,
    /// Sacker, interceptor, or fumble recoverer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defender: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kicker: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returner: Option<PlayerId>,
}

/// Resolved result of one micro-play, before it is applied.
///
/// `yards` is the offense's gain from the line of scrimmage to where the play
/// ended or the ball changed hands (kick distance for kicks). `return_yards`
/// is gained by the team taking over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlayOutcome {
    pub play_type: PlayType,
    pub context: PlayContext,
    pub result: PlayResult,
    pub yards: i32,
    #[serde(default)]
    pub return_yards: i32,
    pub clock_elapsed: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scoring: Option<ScoringPlay>,
    pub change_possession: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penalty: Option<PenaltyKind>,
    #[serde(default)]
    pub participants: Participants,
}

impl PlayOutcome {
    pub fn offense(&self) -> TeamSide {
        self.context.offense
    }

    pub fn points(&self) -> u8 {
        self.scoring.map(|s| s.points).unwrap_or(0)
    }
}
