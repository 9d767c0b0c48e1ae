use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::team::TeamSide;

/// Field length between goal lines, in yards.
pub const FIELD_LENGTH: u8 = 100;
/// Standard line to gain.
pub const FIRST_DOWN_DISTANCE: u8 = 10;

/// Game period. Ordering follows game time, so a transition is legal only
/// when the new period compares greater than the old one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    /// Regulation quarter 1-4
    Quarter(u8),
    /// Overtime period, 1-based
    Overtime(u8),
}

impl Period {
    pub fn is_overtime(self) -> bool {
        matches!(self, Period::Overtime(_))
    }

    /// Last period of a half (Q2, Q4) or any overtime period.
    pub fn ends_half(self) -> bool {
        matches!(self, Period::Quarter(2) | Period::Quarter(4) | Period::Overtime(_))
    }

    pub fn label(self) -> String {
        match self {
            Period::Quarter(q) => format!("Q{q}"),
            Period::Overtime(1) => "OT".to_string(),
            Period::Overtime(n) => format!("OT{n}"),
        }
    }
}

/// Which micro-play is due next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlayPhase {
    /// Kick to the team in possession (the receiver).
    Kickoff,
    /// Down-and-distance football.
    Scrimmage,
    /// Untimed conversion attempt by the team in possession.
    Try,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Score {
    pub home: u16,
    pub away: u16,
}

impl Score {
    pub fn new(home: u16, away: u16) -> Self {
        Self { home, away }
    }

    pub fn get(&self, side: TeamSide) -> u16 {
        match side {
            TeamSide::Home => self.home,
            TeamSide::Away => self.away,
        }
    }

    /// Add points for `side`; `None` (and no change) if the total would
    /// overflow.
    pub(crate) fn add(&mut self, side: TeamSide, points: u8) -> Option<u16> {
        let total = match side {
            TeamSide::Home => &mut self.home,
            TeamSide::Away => &mut self.away,
        };
        *total = total.checked_add(points as u16)?;
        Some(*total)
    }

    /// Points ahead (negative when trailing).
    pub fn margin_for(&self, side: TeamSide) -> i32 {
        self.get(side) as i32 - self.get(side.opponent()) as i32
    }

    pub fn leader(&self) -> Option<TeamSide> {
        match self.home.cmp(&self.away) {
            std::cmp::Ordering::Greater => Some(TeamSide::Home),
            std::cmp::Ordering::Less => Some(TeamSide::Away),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn is_tied(&self) -> bool {
        self.home == self.away
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Timeouts {
    pub home: u8,
    pub away: u8,
}

impl Timeouts {
    pub fn both(count: u8) -> Self {
        Self { home: count, away: count }
    }

    pub fn get(&self, side: TeamSide) -> u8 {
        match side {
            TeamSide::Home => self.home,
            TeamSide::Away => self.away,
        }
    }

    pub(crate) fn spend(&mut self, side: TeamSide) -> bool {
        let slot = match side {
            TeamSide::Home => &mut self.home,
            TeamSide::Away => &mut self.away,
        };
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }
}

/// Canonical game state snapshot.
///
/// Produced only by the drive/clock state machine; every applied play yields
/// a new value and the previous one stays valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GameState {
    pub period: Period,
    /// Seconds remaining in the period
    pub clock: u32,
    pub possession: TeamSide,
    pub phase: PlayPhase,
    /// 1-4
    pub down: u8,
    /// Yards to gain, capped at the distance to the goal line
    pub distance: u8,
    /// 0-100 measured from the possession team's own goal line
    pub yard_line: u8,
    pub score: Score,
    pub timeouts: Timeouts,
    /// Monotonic drive counter, 1-based
    pub drive_id: u32,
    /// Number of plays applied so far
    pub play_index: u32,
    /// Two-minute warning already given in the current half
    pub two_minute_warning_given: bool,
    pub is_final: bool,
}

impl GameState {
    /// Team snapping (or kicking) the next micro-play.
    pub fn offense(&self) -> TeamSide {
        match self.phase {
            PlayPhase::Kickoff => self.possession.opponent(),
            PlayPhase::Scrimmage | PlayPhase::Try => self.possession,
        }
    }

    pub fn defense(&self) -> TeamSide {
        self.offense().opponent()
    }

    pub fn yards_to_goal(&self) -> u8 {
        FIELD_LENGTH - self.yard_line
    }

    pub fn is_goal_to_go(&self) -> bool {
        self.phase == PlayPhase::Scrimmage && self.distance == self.yards_to_goal()
    }

    pub fn winner(&self) -> Option<TeamSide> {
        if self.is_final {
            self.score.leader()
        } else {
            None
        }
    }

    /// Short down-and-distance label, e.g. "3rd & 4 at own 35".
    pub fn situation_label(&self) -> String {
        match self.phase {
            PlayPhase::Kickoff => "kickoff".to_string(),
            PlayPhase::Try => "try".to_string(),
            PlayPhase::Scrimmage => {
                let ordinal = match self.down {
                    1 => "1st",
                    2 => "2nd",
                    3 => "3rd",
                    _ => "4th",
                };
                let distance = if self.is_goal_to_go() {
                    "goal".to_string()
                } else {
                    self.distance.to_string()
                };
                let spot = if self.yard_line > 50 {
                    format!("opp {}", FIELD_LENGTH - self.yard_line)
                } else if self.yard_line == 50 {
                    "midfield".to_string()
                } else {
                    format!("own {}", self.yard_line)
                };
                format!("{ordinal} & {distance} at {spot}")
            }
        }
    }

    /// First-down distance from a spot: 10, or goal-to-go inside the 10.
    pub fn line_to_gain(yard_line: u8) -> u8 {
        FIRST_DOWN_DISTANCE.min(FIELD_LENGTH - yard_line).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scrimmage(yard_line: u8, down: u8, distance: u8) -> GameState {
        GameState {
            period: Period::Quarter(1),
            clock: 900,
            possession: TeamSide::Home,
            phase: PlayPhase::Scrimmage,
            down,
            distance,
            yard_line,
            score: Score::default(),
            timeouts: Timeouts::both(3),
            drive_id: 1,
            play_index: 0,
            two_minute_warning_given: false,
            is_final: false,
        }
    }

    #[test]
    fn test_period_ordering() {
        assert!(Period::Quarter(1) < Period::Quarter(2));
        assert!(Period::Quarter(4) < Period::Overtime(1));
        assert!(Period::Overtime(1) < Period::Overtime(2));
    }

    #[test]
    fn test_line_to_gain_goal_to_go() {
        assert_eq!(GameState::line_to_gain(25), 10);
        assert_eq!(GameState::line_to_gain(95), 5);
        assert_eq!(GameState::line_to_gain(99), 1);
    }

    #[test]
    fn test_offense_during_kickoff_is_kicking_team() {
        let mut state = scrimmage(25, 1, 10);
        state.phase = PlayPhase::Kickoff;
        assert_eq!(state.offense(), TeamSide::Away);
        assert_eq!(state.defense(), TeamSide::Home);
    }

    #[test]
    fn test_situation_label() {
        assert_eq!(scrimmage(35, 3, 4).situation_label(), "3rd & 4 at own 35");
        assert_eq!(scrimmage(95, 1, 5).situation_label(), "1st & goal at opp 5");
    }

    #[test]
    fn test_timeouts_spend() {
        let mut t = Timeouts::both(1);
        assert!(t.spend(TeamSide::Away));
        assert!(!t.spend(TeamSide::Away));
        assert_eq!(t.get(TeamSide::Home), 1);
    }

    #[test]
    fn test_score_margin() {
        let s = Score::new(14, 10);
        assert_eq!(s.margin_for(TeamSide::Home), 4);
        assert_eq!(s.margin_for(TeamSide::Away), -4);
        assert_eq!(s.leader(), Some(TeamSide::Home));
    }

    #[test]
    fn test_score_add_refuses_overflow() {
        let mut s = Score::new(u16::MAX - 1, 0);
        assert_eq!(s.add(TeamSide::Home, 3), None);
        assert_eq!(s.home, u16::MAX - 1);
        assert_eq!(s.add(TeamSide::Away, 7), Some(7));
    }
}
