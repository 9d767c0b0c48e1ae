//! # Game Configuration
//!
//! Rule knobs for a single game, validated once before the first play.
//!
//! ```rust
//! use gridiron_core::engine::config::{GameConfig, OvertimeMode};
//!
//! let config = GameConfig { overtime_mode: OvertimeMode::TimedPeriod, ..GameConfig::default() };
//! assert!(config.validate().is_ok());
//! ```

mod setup;

pub use setup::{GameSetup, StartingSituation, MAX_STARTING_SCORE};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::models::{Period, TeamSide};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OvertimeMode {
    /// First score of any kind ends the game
    SuddenDeath,
    /// The whole period is played; higher score at expiry wins
    TimedPeriod,
    /// A tie after regulation is final
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Regulation quarter length (default: 900)
    pub quarter_length_secs: u32,
    pub overtime_mode: OvertimeMode,
    /// Overtime period length (default: 600)
    pub overtime_length_secs: u32,
    /// Overtime periods before a tie is final (default: 1)
    pub max_overtime_periods: u8,
    /// Spot for touchbacks and post-safety possessions (default: 25)
    pub touchback_yard_line: u8,
    /// Kickoff spot, from the kicking team's goal line (default: 35)
    pub kickoff_yard_line: u8,
    pub timeouts_per_half: u8,
    pub overtime_timeouts: u8,
    /// Longest attempt allowed, snap distance + 17 (default: 63)
    pub max_field_goal_distance: u8,
    /// Kneel-downs are legal only inside this many seconds of a half (default: 120)
    pub kneel_window_secs: u32,
    pub two_minute_warning: bool,
    /// Feed momentum into play odds (off by default)
    pub momentum_affects_odds: bool,
    /// Receives the opening kickoff
    pub opening_receiver: TeamSide,
    /// Defaults to the team that kicked off to open the game
    pub second_half_receiver: Option<TeamSide>,
    /// Defaults to the opening receiver
    pub overtime_receiver: Option<TeamSide>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            quarter_length_secs: 900,
            overtime_mode: OvertimeMode::SuddenDeath,
            overtime_length_secs: 600,
            max_overtime_periods: 1,
            touchback_yard_line: 25,
            kickoff_yard_line: 35,
            timeouts_per_half: 3,
            overtime_timeouts: 2,
            max_field_goal_distance: 63,
            kneel_window_secs: 120,
            two_minute_warning: true,
            momentum_affects_odds: false,
            opening_receiver: TeamSide::Away,
            second_half_receiver: None,
            overtime_receiver: None,
        }
    }
}

impl GameConfig {
    /// Professional rules
    pub fn professional() -> Self {
        Self::default()
    }

    /// Short quarters for quick sims and tests.
    pub fn quick() -> Self {
        Self { quarter_length_secs: 300, overtime_length_secs: 300, ..Self::default() }
    }

    /// Touchbacks at the 20, timed overtime, no two-minute warning.
    pub fn classic() -> Self {
        Self {
            touchback_yard_line: 20,
            overtime_mode: OvertimeMode::TimedPeriod,
            two_minute_warning: false,
            ..Self::default()
        }
    }

    pub fn period_length(&self, period: Period) -> u32 {
        match period {
            Period::Quarter(_) => self.quarter_length_secs,
            Period::Overtime(_) => self.overtime_length_secs,
        }
    }

    pub fn second_half_receiver(&self) -> TeamSide {
        self.second_half_receiver.unwrap_or(self.opening_receiver.opponent())
    }

    pub fn overtime_receiver(&self) -> TeamSide {
        self.overtime_receiver.unwrap_or(self.opening_receiver)
    }

    pub fn validate(&self) -> Result<()> {
        if !(60..=3600).contains(&self.quarter_length_secs) {
            return Err(EngineError::config(format!(
                "quarter_length_secs must be 60..=3600, got {}",
                self.quarter_length_secs
            )));
        }
        if self.overtime_mode != OvertimeMode::None {
            if !(60..=3600).contains(&self.overtime_length_secs) {
                return Err(EngineError::config(format!(
                    "overtime_length_secs must be 60..=3600, got {}",
                    self.overtime_length_secs
                )));
            }
            if !(1..=10).contains(&self.max_overtime_periods) {
                return Err(EngineError::config(format!(
                    "max_overtime_periods must be 1..=10, got {}",
                    self.max_overtime_periods
                )));
            }
        }
        if !(10..=40).contains(&self.touchback_yard_line) {
            return Err(EngineError::config(format!(
                "touchback_yard_line must be 10..=40, got {}",
                self.touchback_yard_line
            )));
        }
        if !(20..=50).contains(&self.kickoff_yard_line) {
            return Err(EngineError::config(format!(
                "kickoff_yard_line must be 20..=50, got {}",
                self.kickoff_yard_line
            )));
        }
        if self.timeouts_per_half > 3 || self.overtime_timeouts > 3 {
            return Err(EngineError::config("at most 3 timeouts per half or overtime period"));
        }
        if !(18..=80).contains(&self.max_field_goal_distance) {
            return Err(EngineError::config(format!(
                "max_field_goal_distance must be 18..=80, got {}",
                self.max_field_goal_distance
            )));
        }
        if self.kneel_window_secs > self.quarter_length_secs {
            return Err(EngineError::config("kneel_window_secs exceeds quarter length"));
        }
        Ok(())
    }
}
