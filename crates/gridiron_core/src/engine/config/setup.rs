use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{GameConfig, OvertimeMode};
use crate::error::{EngineError, Result};
use crate::models::{
    GameState, Period, PlayPhase, Score, TeamProfile, TeamSide, Timeouts, FIELD_LENGTH,
};

/// Highest score a game may be started with.
pub const MAX_STARTING_SCORE: i32 = 999;

/// Everything needed to start one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSetup {
    pub seed: u64,
    pub home: TeamProfile,
    pub away: TeamProfile,
    #[serde(default)]
    pub config: GameConfig,
    /// Start mid-game instead of at the opening kickoff.
    #[serde(default)]
    pub start: Option<StartingSituation>,
}

/// Mid-game starting point (scenario replays, two-minute drills).
///
/// Scores are signed so that a bad seed is reported instead of wrapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartingSituation {
    pub period: Period,
    pub clock: u32,
    pub possession: TeamSide,
    #[serde(default = "default_phase")]
    pub phase: PlayPhase,
    #[serde(default = "default_down")]
    pub down: u8,
    #[serde(default = "default_distance")]
    pub distance: u8,
    #[serde(default = "default_yard_line")]
    pub yard_line: u8,
    #[serde(default)]
    pub home_score: i32,
    #[serde(default)]
    pub away_score: i32,
    #[serde(default)]
    pub timeouts: Option<Timeouts>,
}

fn default_phase() -> PlayPhase {
    PlayPhase::Scrimmage
}

fn default_down() -> u8 {
    1
}

fn default_distance() -> u8 {
    10
}

fn default_yard_line() -> u8 {
    25
}

impl StartingSituation {
    pub fn scrimmage(period: Period, clock: u32, possession: TeamSide, yard_line: u8) -> Self {
        Self {
            period,
            clock,
            possession,
            phase: PlayPhase::Scrimmage,
            down: 1,
            distance: GameState::line_to_gain(yard_line),
            yard_line,
            home_score: 0,
            away_score: 0,
            timeouts: None,
        }
    }

    pub fn with_down(mut self, down: u8, distance: u8) -> Self {
        self.down = down;
        self.distance = distance;
        self
    }

    pub fn with_score(mut self, home: i32, away: i32) -> Self {
        self.home_score = home;
        self.away_score = away;
        self
    }

    fn validate(&self, config: &GameConfig) -> Result<()> {
        if self.home_score < 0 || self.away_score < 0 {
            return Err(EngineError::config(format!(
                "scores cannot be negative ({}-{})",
                self.home_score, self.away_score
            )));
        }
        if self.home_score > MAX_STARTING_SCORE || self.away_score > MAX_STARTING_SCORE {
            return Err(EngineError::config(format!(
                "starting scores must be 0..={MAX_STARTING_SCORE} ({}-{})",
                self.home_score, self.away_score
            )));
        }
        match self.period {
            Period::Quarter(q) if (1..=4).contains(&q) => {}
            Period::Overtime(n) => {
                if config.overtime_mode == OvertimeMode::None {
                    return Err(EngineError::config("overtime start with overtime disabled"));
                }
                if n == 0 || n > config.max_overtime_periods {
                    return Err(EngineError::config(format!("overtime period {n} out of range")));
                }
                if self.home_score != self.away_score {
                    return Err(EngineError::config("overtime start requires a tied score"));
                }
            }
            other => {
                return Err(EngineError::config(format!("invalid period {other:?}")));
            }
        }
        let length = config.period_length(self.period);
        if self.clock == 0 || self.clock > length {
            return Err(EngineError::config(format!(
                "clock must be 1..={length}, got {}",
                self.clock
            )));
        }
        if !(1..=4).contains(&self.down) {
            return Err(EngineError::config(format!("down must be 1..=4, got {}", self.down)));
        }
        if !(1..FIELD_LENGTH).contains(&self.yard_line) {
            return Err(EngineError::config(format!(
                "yard_line must be 1..=99, got {}",
                self.yard_line
            )));
        }
        if self.distance == 0 || self.distance > FIELD_LENGTH - self.yard_line {
            return Err(EngineError::config(format!(
                "distance {} does not fit at yard line {}",
                self.distance, self.yard_line
            )));
        }
        if let Some(timeouts) = self.timeouts {
            let cap = if self.period.is_overtime() {
                config.overtime_timeouts
            } else {
                config.timeouts_per_half
            };
            if timeouts.home > cap || timeouts.away > cap {
                return Err(EngineError::config(format!("timeouts exceed {cap}")));
            }
        }
        Ok(())
    }
}

impl GameSetup {
    pub fn new(seed: u64, home: TeamProfile, away: TeamProfile) -> Self {
        Self { seed, home, away, config: GameConfig::default(), start: None }
    }

    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    pub fn starting_at(mut self, start: StartingSituation) -> Self {
        self.start = Some(start);
        self
    }

    pub fn team(&self, side: TeamSide) -> &TeamProfile {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }

    /// Reject anything that would make the first play ambiguous.
    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;

        if self.home.id == self.away.id {
            return Err(EngineError::config(format!(
                "home and away share team id {}",
                self.home.id.0
            )));
        }

        let mut seen = HashSet::new();
        for team in [&self.home, &self.away] {
            if let Some(capability) = team.capability {
                if capability.ratings().iter().any(|r| !(1..=99).contains(r)) {
                    return Err(EngineError::config(format!(
                        "ratings for {} must be 1..=99",
                        team.name
                    )));
                }
            }
            for player in &team.roster {
                if !seen.insert(player.id) {
                    return Err(EngineError::config(format!(
                        "duplicate player id {}",
                        player.id.0
                    )));
                }
            }
        }

        if let Some(start) = &self.start {
            start.validate(&self.config)?;
        }
        Ok(())
    }

    /// Opening state. Call after `validate`.
    pub fn initial_state(&self) -> GameState {
        let config = &self.config;
        match &self.start {
            None => GameState {
                period: Period::Quarter(1),
                clock: config.quarter_length_secs,
                possession: config.opening_receiver,
                phase: PlayPhase::Kickoff,
                down: 1,
                distance: 10,
                yard_line: config.touchback_yard_line,
                score: Score::default(),
                timeouts: Timeouts::both(config.timeouts_per_half),
                drive_id: 1,
                play_index: 0,
                two_minute_warning_given: false,
                is_final: false,
            },
            Some(start) => {
                let default_timeouts = if start.period.is_overtime() {
                    config.overtime_timeouts
                } else {
                    config.timeouts_per_half
                };
                GameState {
                    period: start.period,
                    clock: start.clock,
                    possession: start.possession,
                    phase: start.phase,
                    down: start.down,
                    distance: start.distance,
                    yard_line: start.yard_line,
                    score: Score::new(start.home_score as u16, start.away_score as u16),
                    timeouts: start.timeouts.unwrap_or(Timeouts::both(default_timeouts)),
                    drive_id: 1,
                    play_index: 0,
                    two_minute_warning_given: start.period.ends_half()
                        && !start.period.is_overtime()
                        && start.clock <= 120,
                    is_final: false,
                }
            }
        }
    }
}
