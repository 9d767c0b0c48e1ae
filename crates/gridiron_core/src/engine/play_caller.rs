//! Play selection for unattended simulation.

use super::config::GameConfig;
use super::play_resolver::kick_distance;
use crate::models::{GameState, Period, PlayPhase, PlayType};

/// Chooses the next play call for whoever is snapping the ball.
///
/// The session builds the request from the returned type; an illegal choice
/// comes back as an error rather than being replaced.
pub trait PlayCaller {
    fn call_play(&mut self, state: &GameState, config: &GameConfig) -> PlayType;
}

impl<F> PlayCaller for F
where
    F: FnMut(&GameState, &GameConfig) -> PlayType,
{
    fn call_play(&mut self, state: &GameState, config: &GameConfig) -> PlayType {
        self(state, config)
    }
}

/// Down-and-distance play caller with fixed tendencies.
///
/// Deterministic: the same state always gets the same call, so seeded games
/// replay exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SituationalPlayCaller {
    /// Longest 4th-down distance worth going for in opponent territory
    pub go_for_it_distance: u8,
    /// Kick distance below which a field goal is preferred on 4th down
    pub comfortable_kick: u8,
}

impl Default for SituationalPlayCaller {
    fn default() -> Self {
        Self { go_for_it_distance: 2, comfortable_kick: 52 }
    }
}

impl SituationalPlayCaller {
    pub fn new() -> Self {
        Self::default()
    }

    fn try_call(state: &GameState) -> PlayType {
        // Down two after the touchdown: a two-point try ties it
        if state.score.margin_for(state.possession) == -2 {
            PlayType::TwoPoint
        } else {
            PlayType::ExtraPoint
        }
    }

    fn fourth_down(&self, state: &GameState, config: &GameConfig) -> Option<PlayType> {
        if state.down < 4 {
            return None;
        }
        let distance = kick_distance(state.yard_line);
        let in_range = distance <= config.max_field_goal_distance;
        let trailing_late = state.score.margin_for(state.possession) < -3
            && matches!(state.period, Period::Quarter(4))
            && state.clock <= 300;

        if trailing_late || (state.yard_line >= 50 && state.distance <= self.go_for_it_distance) {
            return Some(if state.distance <= 3 { PlayType::RunInside } else { PlayType::PassMedium });
        }
        if in_range && distance <= self.comfortable_kick {
            return Some(PlayType::FieldGoal);
        }
        Some(PlayType::Punt)
    }

    fn can_kneel(state: &GameState, config: &GameConfig) -> bool {
        let late = matches!(state.period, Period::Quarter(2) | Period::Quarter(4))
            || state.period.is_overtime();
        late && state.clock <= config.kneel_window_secs && state.score.margin_for(state.possession) > 0
    }

    fn scrimmage(&self, state: &GameState, config: &GameConfig) -> PlayType {
        if Self::can_kneel(state, config) && matches!(state.period, Period::Quarter(4)) {
            return PlayType::Kneel;
        }
        if let Some(call) = self.fourth_down(state, config) {
            return call;
        }

        // Spread calls by down, distance and clock so a game mixes runs and passes
        let variety = (state.play_index + state.clock) % 4;
        match (state.down, state.distance) {
            (_, d) if d >= 15 => PlayType::PassLong,
            (1, _) if variety < 2 => PlayType::RunInside,
            (1, _) if variety == 2 => PlayType::RunOutside,
            (1, _) => PlayType::PassShort,
            (2, d) if d <= 4 => {
                if variety % 2 == 0 {
                    PlayType::RunInside
                } else {
                    PlayType::PassShort
                }
            }
            (2, _) if variety == 0 => PlayType::PassLong,
            (2, _) => PlayType::PassMedium,
            (3, d) if d <= 2 => PlayType::RunInside,
            (3, d) if d <= 6 => PlayType::PassShort,
            _ => PlayType::PassMedium,
        }
    }
}

impl PlayCaller for SituationalPlayCaller {
    fn call_play(&mut self, state: &GameState, config: &GameConfig) -> PlayType {
        match state.phase {
            PlayPhase::Kickoff => PlayType::Kickoff,
            PlayPhase::Try => Self::try_call(state),
            PlayPhase::Scrimmage => self.scrimmage(state, config),
        }
    }
}
