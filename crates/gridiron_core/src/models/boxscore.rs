use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::game_state::Period;
use super::team::{PlayerId, TeamSide};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DriveResult {
    Punt,
    Score,
    /// The drive ended with the defense scoring (return touchdown)
    DefensiveScore,
    Turnover,
    TurnoverOnDowns,
    MissedFieldGoal,
    Safety,
    EndOfHalf,
    EndOfGame,
}

impl DriveResult {
    pub fn is_score(self) -> bool {
        matches!(self, DriveResult::Score | DriveResult::DefensiveScore)
    }
}

/// One team's possession, from a possession reset to the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DriveSummary {
    pub id: u32,
    pub team: TeamSide,
    pub start_period: Period,
    pub start_clock: u32,
    pub start_yard_line: u8,
    pub end_yard_line: u8,
    pub plays: u32,
    /// Net scrimmage yards (penalties excluded)
    pub yards: i32,
    /// Points scored by `team` during the drive, tries included
    pub points: u32,
    /// Decided when the deciding event happens; may precede sealing
    pub result: Option<DriveResult>,
    pub sealed: bool,
}

impl DriveSummary {
    pub fn open(id: u32, team: TeamSide, period: Period, clock: u32, yard_line: u8) -> Self {
        Self {
            id,
            team,
            start_period: period,
            start_clock: clock,
            start_yard_line: yard_line,
            end_yard_line: yard_line,
            plays: 0,
            yards: 0,
            points: 0,
            result: None,
            sealed: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PassingStats {
    pub attempts: u32,
    pub completions: u32,
    pub yards: i32,
    pub touchdowns: u32,
    pub interceptions: u32,
    pub sacks_taken: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RushingStats {
    pub attempts: u32,
    pub yards: i32,
    pub touchdowns: u32,
    pub long: i32,
    pub fumbles_lost: u32,
    #[serde(default)]
    pub two_point_attempts: u32,
    #[serde(default)]
    pub two_point_conversions: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReceivingStats {
    pub targets: u32,
    pub receptions: u32,
    pub yards: i32,
    pub touchdowns: u32,
    pub long: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DefensiveStats {
    pub tackles: u32,
    pub sacks: u32,
    pub interceptions: u32,
    pub fumble_recoveries: u32,
    pub touchdowns: u32,
    pub safeties: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KickingStats {
    pub field_goals_made: u32,
    pub field_goals_attempted: u32,
    pub extra_points_made: u32,
    pub extra_points_attempted: u32,
    pub punts: u32,
    pub punt_yards: i32,
    pub kickoffs: u32,
    pub touchbacks: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReturnStats {
    pub returns: u32,
    pub yards: i32,
    pub touchdowns: u32,
}

/// Per-player line. Created on first contribution and only ever added to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlayerStatLine {
    pub player_id: PlayerId,
    pub team: TeamSide,
    #[serde(default)]
    pub passing: PassingStats,
    #[serde(default)]
    pub rushing: RushingStats,
    #[serde(default)]
    pub receiving: ReceivingStats,
    #[serde(default)]
    pub defense: DefensiveStats,
    #[serde(default)]
    pub kicking: KickingStats,
    #[serde(default)]
    pub returns: ReturnStats,
}

impl PlayerStatLine {
    pub fn new(player_id: PlayerId, team: TeamSide) -> Self {
        Self {
            player_id,
            team,
            passing: PassingStats::default(),
            rushing: RushingStats::default(),
            receiving: ReceivingStats::default(),
            defense: DefensiveStats::default(),
            kicking: KickingStats::default(),
            returns: ReturnStats::default(),
        }
    }
}

/// Team totals, maintained incrementally as plays are folded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TeamStatLine {
    pub points: u32,
    pub plays: u32,
    pub total_yards: i32,
    pub passing_yards: i32,
    pub rushing_yards: i32,
    pub first_downs: u32,
    pub third_down_attempts: u32,
    pub third_down_conversions: u32,
    pub fourth_down_attempts: u32,
    pub fourth_down_conversions: u32,
    pub sacks_allowed: u32,
    /// Sacks recorded by this team's defense
    pub sacks: u32,
    pub turnovers: u32,
    pub takeaways: u32,
    pub penalties: u32,
    pub penalty_yards: u32,
    pub punts: u32,
    pub time_of_possession_secs: u32,
    pub timeouts_used: u32,
}

/// Aggregated game statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Boxscore {
    pub home: TeamStatLine,
    pub away: TeamStatLine,
    pub players: BTreeMap<PlayerId, PlayerStatLine>,
    pub drives: Vec<DriveSummary>,
    /// Highest play index folded so far
    pub last_folded_play: Option<u32>,
}

impl Boxscore {
    pub fn team(&self, side: TeamSide) -> &TeamStatLine {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }

    pub fn team_mut(&mut self, side: TeamSide) -> &mut TeamStatLine {
        match side {
            TeamSide::Home => &mut self.home,
            TeamSide::Away => &mut self.away,
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerStatLine> {
        self.players.get(&id)
    }

    /// Lazily creates the player's line on first contribution.
    pub fn player_mut(&mut self, id: PlayerId, team: TeamSide) -> &mut PlayerStatLine {
        self.players.entry(id).or_insert_with(|| PlayerStatLine::new(id, team))
    }

    pub fn open_drive(&self) -> Option<&DriveSummary> {
        self.drives.last().filter(|d| !d.sealed)
    }

    pub fn sealed_drives(&self) -> impl Iterator<Item = &DriveSummary> {
        self.drives.iter().filter(|d| d.sealed)
    }

    /// Leading passer/rusher/receiver for a side, by yards.
    pub fn leaders(&self, side: TeamSide) -> Leaders {
        let team_lines = || self.players.values().filter(move |p| p.team == side);
        Leaders {
            passing: team_lines()
                .filter(|p| p.passing.attempts > 0)
                .max_by_key(|p| (p.passing.yards, std::cmp::Reverse(p.player_id)))
                .map(|p| p.player_id),
            rushing: team_lines()
                .filter(|p| p.rushing.attempts > 0)
                .max_by_key(|p| (p.rushing.yards, std::cmp::Reverse(p.player_id)))
                .map(|p| p.player_id),
            receiving: team_lines()
                .filter(|p| p.receiving.receptions > 0)
                .max_by_key(|p| (p.receiving.yards, std::cmp::Reverse(p.player_id)))
                .map(|p| p.player_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Leaders {
    pub passing: Option<PlayerId>,
    pub rushing: Option<PlayerId>,
    pub receiving: Option<PlayerId>,
}
