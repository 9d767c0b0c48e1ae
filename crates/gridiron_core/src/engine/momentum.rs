//! Momentum / streak tracker
//!
//! Presentation-only indicator of which team has the recent edge. Rules
//! never read it; the only way it reaches play odds is the explicit
//! [`PlayModifiers`] value, and only when `momentum_affects_odds` is set.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::play_resolver::PlayModifiers;
use crate::models::{PlayOutcome, PlayResult, ScoreKind, TeamSide};

/// Momentum trend direction, from the home team's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MomentumTrend {
    Rising,
    Falling,
    #[default]
    Stable,
}

/// Home-perspective momentum.
///
/// Value range: 0.0 (away dominant) to 100.0 (home dominant), neutral 50.0.
/// `streak` is positive while plays keep favoring home, negative for away.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MomentumState {
    pub value: f32,
    pub streak: i32,
    pub trend: MomentumTrend,
}

impl Default for MomentumState {
    fn default() -> Self {
        Self { value: 50.0, streak: 0, trend: MomentumTrend::Stable }
    }
}

impl MomentumState {
    /// Next momentum after one applied play.
    ///
    /// `ruling` is the state machine's ruling, which can differ from the
    /// resolver's result (turnover on downs).
    pub fn update(&self, outcome: &PlayOutcome, ruling: PlayResult, first_down: bool) -> Self {
        let Some((favored, weight)) = swing(outcome, ruling, first_down) else {
            return Self { trend: MomentumTrend::Stable, ..*self };
        };

        let delta = if favored.is_home() { weight } else { -weight };
        let value = (self.value + delta).clamp(0.0, 100.0);
        let streak = match favored {
            TeamSide::Home if self.streak > 0 => self.streak + 1,
            TeamSide::Home => 1,
            TeamSide::Away if self.streak < 0 => self.streak - 1,
            TeamSide::Away => -1,
        };
        let applied = value - self.value;
        let trend = if applied > 0.01 {
            MomentumTrend::Rising
        } else if applied < -0.01 {
            MomentumTrend::Falling
        } else {
            MomentumTrend::Stable
        };
        Self { value, streak, trend }
    }

    /// Momentum seen from one side, 0-100.
    pub fn value_for(&self, side: TeamSide) -> f32 {
        match side {
            TeamSide::Home => self.value,
            TeamSide::Away => 100.0 - self.value,
        }
    }

    /// Explicit resolver input for the team snapping the ball.
    pub fn as_modifier(&self, offense: TeamSide) -> PlayModifiers {
        PlayModifiers { offense_momentum: (self.value_for(offense) - 50.0) / 50.0 }
    }

    pub fn is_high(&self, side: TeamSide) -> bool {
        self.value_for(side) >= 65.0
    }

    #[doc(hidden)]
    pub fn with_value(value: f32) -> Self {
        Self { value: value.clamp(0.0, 100.0), ..Default::default() }
    }
}

/// Favored side and magnitude of a play, or `None` when it is neutral.
fn swing(outcome: &PlayOutcome, ruling: PlayResult, first_down: bool) -> Option<(TeamSide, f32)> {
    let offense = outcome.offense();
    let defense = offense.opponent();

    if let Some(scoring) = outcome.scoring {
        let weight = match scoring.kind {
            ScoreKind::Touchdown if scoring.team == defense => events::RETURN_TOUCHDOWN,
            ScoreKind::Touchdown => events::TOUCHDOWN,
            ScoreKind::FieldGoal => events::FIELD_GOAL,
            ScoreKind::Safety => events::SAFETY,
            ScoreKind::ExtraPoint => events::EXTRA_POINT,
            ScoreKind::TwoPoint => events::TWO_POINT,
        };
        return Some((scoring.team, weight));
    }

    match ruling {
        PlayResult::Interception | PlayResult::FumbleLost => Some((defense, events::TAKEAWAY)),
        PlayResult::TurnoverOnDowns => Some((defense, events::DOWNS_STOP)),
        PlayResult::FieldGoalMissed => Some((defense, events::MISSED_KICK)),
        PlayResult::TwoPointFailed | PlayResult::ExtraPointMissed => {
            Some((defense, events::MISSED_KICK))
        }
        PlayResult::Sack => Some((defense, events::SACK)),
        PlayResult::Complete | PlayResult::Rush | PlayResult::FumbleRecovered => {
            if outcome.yards >= 20 {
                Some((offense, events::BIG_PLAY))
            } else if first_down {
                Some((offense, events::FIRST_DOWN))
            } else if outcome.yards >= 4 {
                Some((offense, events::GOOD_GAIN))
            } else {
                Some((defense, events::STUFFED))
            }
        }
        PlayResult::Incomplete => Some((defense, events::STUFFED)),
        PlayResult::KickReturn if outcome.return_yards >= 40 => {
            Some((defense, events::BIG_PLAY))
        }
        _ => None,
    }
}

/// Momentum swing constants
pub mod events {
    pub const TOUCHDOWN: f32 = 12.0;
    /// Defensive or special-teams return for a score
    pub const RETURN_TOUCHDOWN: f32 = 16.0;
    pub const FIELD_GOAL: f32 = 5.0;
    pub const SAFETY: f32 = 9.0;
    pub const EXTRA_POINT: f32 = 1.0;
    pub const TWO_POINT: f32 = 3.0;
    pub const TAKEAWAY: f32 = 10.0;
    pub const DOWNS_STOP: f32 = 8.0;
    pub const MISSED_KICK: f32 = 4.0;
    pub const SACK: f32 = 3.0;
    pub const BIG_PLAY: f32 = 6.0;
    pub const FIRST_DOWN: f32 = 2.0;
    pub const GOOD_GAIN: f32 = 1.0;
    pub const STUFFED: f32 = 1.0;
}
