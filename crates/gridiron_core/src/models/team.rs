use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Caller-assigned team identifier (league layer owns the numbering).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct TeamId(pub u32);

/// Caller-assigned player identifier, unique within a game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub fn opponent(self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }

    pub fn is_home(self) -> bool {
        matches!(self, TeamSide::Home)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    OL,
    DL,
    LB,
    CB,
    S,
    K,
    P,
}

impl Position {
    pub fn is_defense(self) -> bool {
        matches!(self, Position::DL | Position::LB | Position::CB | Position::S)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RosterPlayer {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    /// Overall rating (1-99)
    pub overall: u8,
}

/// Unit ratings that drive play resolution.
///
/// All values are on a 1-99 scale, 50 = league average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TeamCapability {
    pub passing: u8,
    pub rushing: u8,
    pub receiving: u8,
    pub blocking: u8,
    pub pass_rush: u8,
    pub coverage: u8,
    pub run_defense: u8,
    pub kicking: u8,
    pub punting: u8,
    pub returning: u8,
    pub ball_security: u8,
}

impl Default for TeamCapability {
    fn default() -> Self {
        Self::uniform(50)
    }
}

impl TeamCapability {
    pub fn uniform(rating: u8) -> Self {
        Self {
            passing: rating,
            rushing: rating,
            receiving: rating,
            blocking: rating,
            pass_rush: rating,
            coverage: rating,
            run_defense: rating,
            kicking: rating,
            punting: rating,
            returning: rating,
            ball_security: rating,
        }
    }

    /// Derive unit ratings from position-group averages.
    ///
    /// Groups missing from the roster fall back to 50.
    pub fn from_roster(roster: &[RosterPlayer]) -> Self {
        let avg = |positions: &[Position]| -> u8 {
            let (sum, count) = roster
                .iter()
                .filter(|p| positions.contains(&p.position))
                .fold((0u32, 0u32), |(s, c), p| (s + p.overall as u32, c + 1));
            if count == 0 {
                50
            } else {
                (sum / count).clamp(1, 99) as u8
            }
        };

        Self {
            passing: avg(&[Position::QB]),
            rushing: avg(&[Position::RB]),
            receiving: avg(&[Position::WR, Position::TE]),
            blocking: avg(&[Position::OL, Position::TE]),
            pass_rush: avg(&[Position::DL, Position::LB]),
            coverage: avg(&[Position::CB, Position::S]),
            run_defense: avg(&[Position::DL, Position::LB, Position::S]),
            kicking: avg(&[Position::K]),
            punting: avg(&[Position::P]),
            returning: avg(&[Position::WR, Position::RB, Position::CB]),
            ball_security: avg(&[Position::QB, Position::RB, Position::WR]),
        }
    }

    pub(crate) fn ratings(&self) -> [u8; 11] {
        [
            self.passing,
            self.rushing,
            self.receiving,
            self.blocking,
            self.pass_rush,
            self.coverage,
            self.run_defense,
            self.kicking,
            self.punting,
            self.returning,
            self.ball_security,
        ]
    }
}

/// Everything the engine knows about one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TeamProfile {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub abbr: String,
    /// Explicit ratings; derived from the roster when absent.
    #[serde(default)]
    pub capability: Option<TeamCapability>,
    #[serde(default)]
    pub roster: Vec<RosterPlayer>,
}

impl TeamProfile {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id: TeamId(id),
            name: name.into(),
            abbr: String::new(),
            capability: None,
            roster: Vec::new(),
        }
    }

    pub fn with_capability(mut self, capability: TeamCapability) -> Self {
        self.capability = Some(capability);
        self
    }

    pub fn with_roster(mut self, roster: Vec<RosterPlayer>) -> Self {
        self.roster = roster;
        self
    }

    pub fn effective_capability(&self) -> TeamCapability {
        self.capability.unwrap_or_else(|| TeamCapability::from_roster(&self.roster))
    }

    pub fn players_at(&self, position: Position) -> impl Iterator<Item = &RosterPlayer> {
        self.roster.iter().filter(move |p| p.position == position)
    }
}
