//! Drive / clock state machine
//!
//! `apply` is the only producer of new [`GameState`] values. It checks that
//! the outcome was computed against the state it is applied to, then runs
//! the clock, down-and-distance, possession, scoring, period and overtime
//! rules. The input state is never modified; a rejected outcome leaves the
//! caller holding the prior state.

use super::config::{GameConfig, OvertimeMode};
use crate::error::{EngineError, Result};
use crate::models::{
    DriveResult, GameState, Period, PlayContext, PlayOutcome, PlayPhase, PlayResult, PlayType,
    Score, ScoreKind, ScoringPlay, TeamSide, Timeouts, FIELD_LENGTH, FIRST_DOWN_DISTANCE,
};

/// Spot of the conversion attempt after a touchdown.
pub const TRY_YARD_LINE: u8 = 98;
/// Clock reading that triggers the two-minute warning.
pub const TWO_MINUTE_MARK: u32 = 120;

/// Drive opened at a possession reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveStart {
    pub id: u32,
    pub team: TeamSide,
    pub period: Period,
    pub clock: u32,
    pub yard_line: u8,
    /// Already decided when the drive opens with a return touchdown
    pub result: Option<DriveResult>,
}

/// A possession reset: the open drive is sealed, and unless the game ended
/// a new one opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveBoundary {
    /// Result for the sealed drive when none was decided earlier
    pub result: DriveResult,
    pub next: Option<DriveStart>,
}

/// Everything one applied play changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: GameState,
    /// Outcome result after the rules (a short 4th down becomes a turnover)
    pub ruling: PlayResult,
    pub first_down: bool,
    pub possession_changed: bool,
    /// Seconds actually taken off the clock
    pub elapsed: u32,
    /// Where the snapping team's play ended, 0-100
    pub end_spot: u8,
    pub score: Option<(ScoringPlay, Score)>,
    /// Result decided for the open drive without sealing it (try pending)
    pub drive_result: Option<DriveResult>,
    pub boundaries: Vec<DriveBoundary>,
    pub two_minute_warning: Option<Period>,
    pub period_change: Option<(Period, Period)>,
    pub game_over: bool,
}

/// Apply one resolved outcome to a state.
pub fn apply(state: &GameState, outcome: &PlayOutcome, config: &GameConfig) -> Result<Transition> {
    if state.is_final {
        return Err(EngineError::illegal("game is already final"));
    }
    let expected = PlayContext::from_state(state);
    if outcome.context != expected {
        return Err(EngineError::illegal(format!(
            "stale play: computed for {:?} {:?} {}s down {} & {} at {}, game is at {:?} {:?} {}s {}",
            outcome.context.phase,
            outcome.context.period,
            outcome.context.clock,
            outcome.context.down,
            outcome.context.distance,
            outcome.context.yard_line,
            state.phase,
            state.period,
            state.clock,
            state.situation_label(),
        )));
    }
    if !allowed_results(outcome.play_type).contains(&outcome.result) {
        return Err(EngineError::illegal(format!(
            "{:?} cannot produce {:?}",
            outcome.play_type, outcome.result
        )));
    }
    check_scoring(outcome)?;

    let mut step = Step::new(state, outcome, config);
    step.run_clock();
    match state.phase {
        PlayPhase::Kickoff => step.kickoff()?,
        PlayPhase::Scrimmage => match outcome.play_type {
            PlayType::Punt => step.punt()?,
            PlayType::FieldGoal => step.field_goal()?,
            _ => step.snap()?,
        },
        PlayPhase::Try => step.conversion()?,
    }
    step.walk_off();
    step.end_of_period();
    Ok(step.finish())
}

fn allowed_results(play_type: PlayType) -> &'static [PlayResult] {
    use PlayResult::*;
    match play_type {
        PlayType::PassShort | PlayType::PassMedium | PlayType::PassLong => &[
            Complete,
            Incomplete,
            Sack,
            Interception,
            FumbleLost,
            FumbleRecovered,
            Touchdown,
            Safety,
            Penalty,
        ],
        PlayType::RunInside | PlayType::RunOutside => {
            &[Rush, FumbleLost, FumbleRecovered, Touchdown, Safety, Penalty]
        }
        PlayType::Kneel => &[Kneel],
        PlayType::Spike => &[Spike],
        PlayType::Punt => &[Punt, Touchback, Touchdown],
        PlayType::FieldGoal => &[FieldGoalGood, FieldGoalMissed],
        PlayType::Kickoff => &[KickReturn, Touchback, Touchdown],
        PlayType::ExtraPoint => &[ExtraPointGood, ExtraPointMissed],
        PlayType::TwoPoint => &[TwoPointGood, TwoPointFailed],
    }
}

/// Points must agree with the result that produced them.
fn check_scoring(outcome: &PlayOutcome) -> Result<()> {
    let Some(scoring) = outcome.scoring else {
        return Ok(());
    };
    if scoring.points != scoring.kind.points() {
        return Err(EngineError::illegal(format!(
            "{:?} is worth {}, not {}",
            scoring.kind,
            scoring.kind.points(),
            scoring.points
        )));
    }
    let consistent = match scoring.kind {
        ScoreKind::Touchdown => matches!(
            outcome.result,
            PlayResult::Touchdown | PlayResult::Interception | PlayResult::FumbleLost
        ),
        ScoreKind::FieldGoal => outcome.result == PlayResult::FieldGoalGood,
        ScoreKind::Safety => outcome.result == PlayResult::Safety,
        ScoreKind::ExtraPoint => outcome.result == PlayResult::ExtraPointGood,
        ScoreKind::TwoPoint => outcome.result == PlayResult::TwoPointGood,
    };
    if !consistent {
        return Err(EngineError::illegal(format!(
            "{:?} scored on a {:?} result",
            scoring.kind, outcome.result
        )));
    }
    Ok(())
}

/// Spot inside the field of play, or an error naming what was inconsistent.
fn field_spot(value: i32, what: &str) -> Result<u8> {
    if value >= FIELD_LENGTH as i32 {
        return Err(EngineError::illegal(format!(
            "{what} reaches the goal line ({value}) without a touchdown"
        )));
    }
    if value <= 0 {
        return Err(EngineError::illegal(format!(
            "{what} ends in the end zone ({value}) without a safety"
        )));
    }
    Ok(value as u8)
}

struct Step<'a> {
    config: &'a GameConfig,
    before: &'a GameState,
    outcome: &'a PlayOutcome,
    state: GameState,
    ruling: PlayResult,
    first_down: bool,
    possession_changed: bool,
    elapsed: u32,
    end_spot: u8,
    scored: Option<ScoringPlay>,
    drive_result: Option<DriveResult>,
    boundaries: Vec<DriveBoundary>,
    two_minute_warning: Option<Period>,
    period_change: Option<(Period, Period)>,
    game_over: bool,
}

impl<'a> Step<'a> {
    fn new(before: &'a GameState, outcome: &'a PlayOutcome, config: &'a GameConfig) -> Self {
        let mut state = before.clone();
        state.play_index += 1;
        Self {
            config,
            before,
            outcome,
            state,
            ruling: outcome.result,
            first_down: false,
            possession_changed: false,
            elapsed: 0,
            end_spot: before.yard_line,
            scored: None,
            drive_result: None,
            boundaries: Vec::new(),
            two_minute_warning: None,
            period_change: None,
            game_over: false,
        }
    }

    fn finish(self) -> Transition {
        Transition {
            score: self.scored.map(|play| (play, self.state.score)),
            state: self.state,
            ruling: self.ruling,
            first_down: self.first_down,
            possession_changed: self.possession_changed,
            elapsed: self.elapsed,
            end_spot: self.end_spot,
            drive_result: self.drive_result,
            boundaries: self.boundaries,
            two_minute_warning: self.two_minute_warning,
            period_change: self.period_change,
            game_over: self.game_over,
        }
    }

    // ------------------------------------------------------------------
    // Clock
    // ------------------------------------------------------------------

    /// Tries are untimed; every other snap takes at least a second.
    fn run_clock(&mut self) {
        let elapsed = if self.before.phase == PlayPhase::Try {
            0
        } else {
            self.outcome.clock_elapsed.max(1).min(self.before.clock)
        };
        self.elapsed = elapsed;
        self.state.clock = self.before.clock - elapsed;

        let period = self.state.period;
        if self.config.two_minute_warning
            && matches!(period, Period::Quarter(2) | Period::Quarter(4))
            && !self.state.two_minute_warning_given
            && self.before.clock > TWO_MINUTE_MARK
            && self.state.clock <= TWO_MINUTE_MARK
        {
            self.state.two_minute_warning_given = true;
            self.two_minute_warning = Some(period);
        }
    }

    fn end_of_period(&mut self) {
        // A pending try is played before the period ends
        if self.game_over || self.state.clock > 0 || self.state.phase == PlayPhase::Try {
            return;
        }
        let from = self.state.period;
        let half_over = !matches!(from, Period::Quarter(1) | Period::Quarter(3));
        // The kickoff after a score at the gun is never played
        if half_over && self.state.phase == PlayPhase::Kickoff {
            self.drop_opened_drive();
        }
        match from {
            Period::Quarter(q) if q == 1 || q == 3 => {
                let to = Period::Quarter(q + 1);
                self.state.period = to;
                self.state.clock = self.config.quarter_length_secs;
                self.period_change = Some((from, to));
            }
            Period::Quarter(2) => {
                let to = Period::Quarter(3);
                self.state.period = to;
                self.state.clock = self.config.quarter_length_secs;
                self.period_change = Some((from, to));
                self.reset_possession(
                    self.config.second_half_receiver(),
                    self.config.timeouts_per_half,
                );
            }
            _ => {
                if !self.state.score.is_tied() {
                    self.finish_game();
                    return;
                }
                let next_overtime = match from {
                    Period::Overtime(n) => n + 1,
                    _ => 1,
                };
                if self.config.overtime_mode == OvertimeMode::None
                    || next_overtime > self.config.max_overtime_periods
                {
                    self.finish_game();
                    return;
                }
                let to = Period::Overtime(next_overtime);
                self.state.period = to;
                self.state.clock = self.config.overtime_length_secs;
                self.period_change = Some((from, to));
                self.reset_possession(self.config.overtime_receiver(), self.config.overtime_timeouts);
            }
        }
    }

    /// Half or overtime start: seal the open drive, kick to `receiver`.
    fn reset_possession(&mut self, receiver: TeamSide, timeouts: u8) {
        self.state.drive_id += 1;
        self.state.possession = receiver;
        self.set_spot(self.config.touchback_yard_line, PlayPhase::Kickoff);
        self.state.timeouts = Timeouts::both(timeouts);
        self.state.two_minute_warning_given = false;
        self.boundaries.push(DriveBoundary {
            result: DriveResult::EndOfHalf,
            next: Some(DriveStart {
                id: self.state.drive_id,
                team: receiver,
                period: self.state.period,
                clock: self.state.clock,
                yard_line: self.config.touchback_yard_line,
                result: None,
            }),
        });
    }

    fn finish_game(&mut self) {
        self.boundaries.push(DriveBoundary { result: DriveResult::EndOfGame, next: None });
        self.state.is_final = true;
        self.game_over = true;
    }

    /// Any score breaking an overtime tie ends a sudden-death game.
    fn walk_off(&mut self) {
        if self.scored.is_none()
            || !self.state.period.is_overtime()
            || self.config.overtime_mode != OvertimeMode::SuddenDeath
            || self.state.score.is_tied()
        {
            return;
        }
        if self.drop_opened_drive() {
            self.state.is_final = true;
            self.game_over = true;
        } else {
            self.finish_game();
        }
    }

    /// Drop a drive opened by this play with nothing decided on it.
    fn drop_opened_drive(&mut self) -> bool {
        let opened_empty = matches!(
            self.boundaries.last(),
            Some(DriveBoundary { next: Some(start), .. }) if start.result.is_none()
        );
        if opened_empty {
            if let Some(boundary) = self.boundaries.last_mut() {
                boundary.next = None;
            }
            self.state.drive_id -= 1;
        }
        opened_empty
    }

    // ------------------------------------------------------------------
    // Possession and spots
    // ------------------------------------------------------------------

    fn set_spot(&mut self, yard_line: u8, phase: PlayPhase) {
        self.state.phase = phase;
        self.state.yard_line = yard_line;
        self.state.down = 1;
        self.state.distance = match phase {
            PlayPhase::Scrimmage => GameState::line_to_gain(yard_line),
            PlayPhase::Try => FIELD_LENGTH - yard_line,
            PlayPhase::Kickoff => FIRST_DOWN_DISTANCE,
        };
    }

    fn flip(&mut self, sealed: DriveResult, spot: u8, phase: PlayPhase, opened: Option<DriveResult>) {
        let team = self.state.possession.opponent();
        self.state.possession = team;
        self.state.drive_id += 1;
        self.possession_changed = true;
        self.set_spot(spot, phase);
        self.boundaries.push(DriveBoundary {
            result: sealed,
            next: Some(DriveStart {
                id: self.state.drive_id,
                team,
                period: self.state.period,
                clock: self.state.clock,
                yard_line: spot,
                result: opened,
            }),
        });
    }

    fn expect_change(&self, expected: bool) -> Result<()> {
        if self.outcome.change_possession != expected {
            return Err(EngineError::illegal(format!(
                "{:?} must {}change possession",
                self.outcome.result,
                if expected { "" } else { "not " }
            )));
        }
        Ok(())
    }

    fn no_score(&self) -> Result<()> {
        if self.outcome.scoring.is_some() {
            return Err(EngineError::illegal(format!(
                "points on a non-scoring {:?}",
                self.outcome.result
            )));
        }
        Ok(())
    }

    fn score(&mut self, team: TeamSide) -> Result<()> {
        let Some(play) = self.outcome.scoring else {
            return Err(EngineError::illegal(format!(
                "{:?} without a scoring play",
                self.outcome.result
            )));
        };
        if play.team != team {
            return Err(EngineError::illegal(format!(
                "{:?} credited to {:?}, expected {:?}",
                play.kind, play.team, team
            )));
        }
        if self.state.score.add(play.team, play.points).is_none() {
            return Err(EngineError::illegal(format!(
                "{:?} score overflows at {}",
                play.team,
                self.state.score.get(play.team)
            )));
        }
        self.scored = Some(play);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Phases
    // ------------------------------------------------------------------

    fn kickoff(&mut self) -> Result<()> {
        self.expect_change(false)?;
        let receiver = self.before.possession;
        let land = self.config.kickoff_yard_line as i32 + self.outcome.yards;
        let returned_to = FIELD_LENGTH as i32 - land + self.outcome.return_yards;
        match self.outcome.result {
            PlayResult::Touchback => {
                self.no_score()?;
                if land < FIELD_LENGTH as i32 {
                    return Err(EngineError::illegal(format!("touchback on a kick landing at {land}")));
                }
                self.set_spot(self.config.touchback_yard_line, PlayPhase::Scrimmage);
            }
            PlayResult::KickReturn => {
                self.no_score()?;
                field_spot(land, "kickoff")?;
                let spot = field_spot(returned_to, "kickoff return")?;
                self.set_spot(spot, PlayPhase::Scrimmage);
            }
            _ => {
                field_spot(land, "kickoff")?;
                if returned_to != FIELD_LENGTH as i32 {
                    return Err(EngineError::illegal("return touchdown short of the goal line"));
                }
                self.score(receiver)?;
                self.drive_result = Some(DriveResult::Score);
                self.set_spot(TRY_YARD_LINE, PlayPhase::Try);
            }
        }
        self.end_spot = self.state.yard_line;
        Ok(())
    }

    fn snap(&mut self) -> Result<()> {
        let offense = self.before.possession;
        let yard_line = self.before.yard_line as i32;
        let end = yard_line + self.outcome.yards;

        match self.outcome.result {
            PlayResult::Penalty => self.penalty(),
            PlayResult::Touchdown => {
                self.expect_change(false)?;
                if end != FIELD_LENGTH as i32 {
                    return Err(EngineError::illegal(format!(
                        "touchdown must end at the goal line, got {end}"
                    )));
                }
                self.score(offense)?;
                self.end_spot = FIELD_LENGTH;
                self.drive_result = Some(DriveResult::Score);
                self.set_spot(TRY_YARD_LINE, PlayPhase::Try);
                Ok(())
            }
            PlayResult::Safety => {
                self.expect_change(true)?;
                if end > 0 {
                    return Err(EngineError::illegal(format!("safety with the ball at {end}")));
                }
                self.score(offense.opponent())?;
                self.end_spot = 0;
                self.flip(
                    DriveResult::Safety,
                    self.config.touchback_yard_line,
                    PlayPhase::Scrimmage,
                    None,
                );
                Ok(())
            }
            PlayResult::Interception | PlayResult::FumbleLost => {
                self.expect_change(true)?;
                let lost_at = field_spot(end, "turnover spot")?;
                self.end_spot = lost_at;
                let takeover = FIELD_LENGTH as i32 - lost_at as i32 + self.outcome.return_yards;
                if self.outcome.scoring.is_some() {
                    if takeover != FIELD_LENGTH as i32 {
                        return Err(EngineError::illegal("return touchdown short of the goal line"));
                    }
                    self.score(offense.opponent())?;
                    self.flip(
                        DriveResult::DefensiveScore,
                        TRY_YARD_LINE,
                        PlayPhase::Try,
                        Some(DriveResult::Score),
                    );
                } else {
                    let spot = field_spot(takeover, "return")?;
                    self.flip(DriveResult::Turnover, spot, PlayPhase::Scrimmage, None);
                }
                Ok(())
            }
            _ => {
                self.expect_change(false)?;
                self.no_score()?;
                let spot = field_spot(end, "play")?;
                self.end_spot = spot;
                self.advance_downs(spot);
                Ok(())
            }
        }
    }

    fn advance_downs(&mut self, spot: u8) {
        let yards = self.outcome.yards;
        let distance = self.before.distance as i32;
        if yards >= distance {
            self.first_down = true;
            self.set_spot(spot, PlayPhase::Scrimmage);
        } else if self.before.down >= 4 {
            self.ruling = PlayResult::TurnoverOnDowns;
            self.flip(
                DriveResult::TurnoverOnDowns,
                FIELD_LENGTH - spot,
                PlayPhase::Scrimmage,
                None,
            );
        } else {
            self.state.yard_line = spot;
            self.state.down = self.before.down + 1;
            self.state.distance = (distance - yards).min((FIELD_LENGTH - spot) as i32) as u8;
        }
    }

    /// Replay the down from the enforcement spot.
    fn penalty(&mut self) -> Result<()> {
        self.expect_change(false)?;
        self.no_score()?;
        let Some(kind) = self.outcome.penalty else {
            return Err(EngineError::illegal("penalty result without a foul"));
        };
        let enforced = kind.enforced_yards(self.before.yard_line);
        if self.outcome.yards != enforced {
            return Err(EngineError::illegal(format!(
                "{:?} enforces {enforced} yards, outcome says {}",
                kind, self.outcome.yards
            )));
        }
        let spot = field_spot(self.before.yard_line as i32 + enforced, "penalty")?;
        self.end_spot = spot;
        let remaining = self.before.distance as i32 - enforced;
        if kind.automatic_first_down() || remaining <= 0 {
            self.first_down = true;
            self.set_spot(spot, PlayPhase::Scrimmage);
        } else {
            self.state.yard_line = spot;
            self.state.distance = remaining.min((FIELD_LENGTH - spot) as i32) as u8;
        }
        Ok(())
    }

    fn punt(&mut self) -> Result<()> {
        self.expect_change(true)?;
        let offense = self.before.possession;
        let land = self.before.yard_line as i32 + self.outcome.yards;
        match self.outcome.result {
            PlayResult::Touchback => {
                self.no_score()?;
                if land < FIELD_LENGTH as i32 {
                    return Err(EngineError::illegal(format!("touchback on a punt landing at {land}")));
                }
                self.flip(
                    DriveResult::Punt,
                    self.config.touchback_yard_line,
                    PlayPhase::Scrimmage,
                    None,
                );
            }
            PlayResult::Punt => {
                self.no_score()?;
                let land = field_spot(land, "punt")?;
                let spot = field_spot(
                    FIELD_LENGTH as i32 - land as i32 + self.outcome.return_yards,
                    "punt return",
                )?;
                self.flip(DriveResult::Punt, spot, PlayPhase::Scrimmage, None);
            }
            _ => {
                let land = field_spot(land, "punt")?;
                if FIELD_LENGTH as i32 - land as i32 + self.outcome.return_yards
                    != FIELD_LENGTH as i32
                {
                    return Err(EngineError::illegal("return touchdown short of the goal line"));
                }
                self.score(offense.opponent())?;
                self.flip(
                    DriveResult::DefensiveScore,
                    TRY_YARD_LINE,
                    PlayPhase::Try,
                    Some(DriveResult::Score),
                );
            }
        }
        Ok(())
    }

    fn field_goal(&mut self) -> Result<()> {
        self.expect_change(true)?;
        if self.outcome.result == PlayResult::FieldGoalGood {
            self.score(self.before.possession)?;
            self.flip(
                DriveResult::Score,
                self.config.touchback_yard_line,
                PlayPhase::Kickoff,
                None,
            );
        } else {
            self.no_score()?;
            // Ball goes over at the spot of the kick, never inside the 20
            let spot = (107 - self.before.yard_line as i32).clamp(20, 99) as u8;
            self.flip(DriveResult::MissedFieldGoal, spot, PlayPhase::Scrimmage, None);
        }
        Ok(())
    }

    fn conversion(&mut self) -> Result<()> {
        self.expect_change(true)?;
        match self.outcome.result {
            PlayResult::ExtraPointGood | PlayResult::TwoPointGood => {
                self.score(self.before.possession)?
            }
            _ => self.no_score()?,
        }
        self.flip(
            DriveResult::Score,
            self.config.touchback_yard_line,
            PlayPhase::Kickoff,
            None,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Participants, PenaltyKind};

    fn scrimmage(possession: TeamSide, yard_line: u8, down: u8, distance: u8) -> GameState {
        GameState {
            period: Period::Quarter(1),
            clock: 600,
            possession,
            phase: PlayPhase::Scrimmage,
            down,
            distance,
            yard_line,
            score: Score::default(),
            timeouts: Timeouts::both(3),
            drive_id: 1,
            play_index: 10,
            two_minute_warning_given: false,
            is_final: false,
        }
    }

    fn outcome(
        state: &GameState,
        play_type: PlayType,
        result: PlayResult,
        yards: i32,
        clock_elapsed: u32,
    ) -> PlayOutcome {
        PlayOutcome {
            play_type,
            context: PlayContext::from_state(state),
            result,
            yards,
            return_yards: 0,
            clock_elapsed,
            scoring: None,
            change_possession: false,
            penalty: None,
            participants: Participants::default(),
        }
    }

    #[test]
    fn test_fourth_down_short_is_turnover_on_downs() {
        // 4th-and-2 at the defense's 35, one-yard gain
        let state = scrimmage(TeamSide::Home, 65, 4, 2);
        let out = outcome(&state, PlayType::RunInside, PlayResult::Rush, 1, 30);
        let t = apply(&state, &out, &GameConfig::default()).unwrap();
        assert_eq!(t.ruling, PlayResult::TurnoverOnDowns);
        assert!(t.possession_changed);
        assert_eq!(t.state.possession, TeamSide::Away);
        assert_eq!(t.state.yard_line, 34);
        assert_eq!((t.state.down, t.state.distance), (1, 10));
        assert_eq!(t.state.drive_id, 2);
        assert_eq!(t.boundaries.len(), 1);
        assert_eq!(t.boundaries[0].result, DriveResult::TurnoverOnDowns);
        // Input state untouched
        assert_eq!(state.possession, TeamSide::Home);
    }

    #[test]
    fn test_non_converting_play_advances_down() {
        let state = scrimmage(TeamSide::Home, 30, 2, 7);
        let out = outcome(&state, PlayType::RunOutside, PlayResult::Rush, -3, 30);
        let t = apply(&state, &out, &GameConfig::default()).unwrap();
        assert_eq!((t.state.down, t.state.distance, t.state.yard_line), (3, 10, 27));
        assert!(!t.first_down);
    }

    #[test]
    fn test_first_down_inside_ten_is_goal_to_go() {
        let state = scrimmage(TeamSide::Away, 85, 3, 10);
        let out = outcome(&state, PlayType::PassMedium, PlayResult::Complete, 10, 30);
        let t = apply(&state, &out, &GameConfig::default()).unwrap();
        assert!(t.first_down);
        assert_eq!((t.state.down, t.state.distance, t.state.yard_line), (1, 5, 95));
        assert!(t.state.is_goal_to_go());
    }

    #[test]
    fn test_pick_six_flips_possession_and_opens_try() {
        let state = scrimmage(TeamSide::Home, 20, 2, 10);
        let mut out = outcome(&state, PlayType::PassShort, PlayResult::Interception, 15, 12);
        out.return_yards = 35;
        out.change_possession = true;
        out.scoring = Some(ScoringPlay::new(TeamSide::Away, ScoreKind::Touchdown));
        let t = apply(&state, &out, &GameConfig::default()).unwrap();
        assert_eq!(t.state.possession, TeamSide::Away);
        assert_eq!(t.state.phase, PlayPhase::Try);
        assert_eq!(t.state.score, Score::new(0, 6));
        assert_eq!(t.state.drive_id, 2);
        assert_eq!(t.boundaries.len(), 1);
        assert_eq!(t.boundaries[0].result, DriveResult::DefensiveScore);
        assert_eq!(t.boundaries[0].next.and_then(|d| d.result), Some(DriveResult::Score));

        let mut kick = outcome(&t.state, PlayType::ExtraPoint, PlayResult::ExtraPointGood, 0, 0);
        kick.change_possession = true;
        kick.scoring = Some(ScoringPlay::new(TeamSide::Away, ScoreKind::ExtraPoint));
        let after = apply(&t.state, &kick, &GameConfig::default()).unwrap();
        assert_eq!(after.state.score, Score::new(0, 7));
        assert_eq!(after.state.possession, TeamSide::Home);
        assert_eq!(after.state.phase, PlayPhase::Kickoff);
        assert_eq!(after.state.drive_id, 3);
        assert_eq!(after.elapsed, 0);
    }

    #[test]
    fn test_clock_expiry_in_fourth_quarter() {
        let mut state = scrimmage(TeamSide::Home, 50, 1, 10);
        state.period = Period::Quarter(4);
        state.clock = 3;
        state.two_minute_warning_given = true;
        state.score = Score::new(10, 14);
        let out = outcome(&state, PlayType::PassShort, PlayResult::Complete, 10, 3);

        let t = apply(&state, &out, &GameConfig::default()).unwrap();
        assert_eq!(t.state.clock, 0);
        assert_eq!(t.state.period, Period::Quarter(4));
        assert!(t.state.is_final);
        assert_eq!(t.state.winner(), Some(TeamSide::Away));
        assert_eq!(t.boundaries.last().map(|b| b.next), Some(None));

        let mut tied = state.clone();
        tied.score = Score::new(14, 14);
        let out = outcome(&tied, PlayType::PassShort, PlayResult::Complete, 10, 3);
        let t = apply(&tied, &out, &GameConfig::default()).unwrap();
        assert!(!t.state.is_final);
        assert_eq!(t.state.period, Period::Overtime(1));
        assert_eq!(t.state.clock, 600);
        assert_eq!(t.state.phase, PlayPhase::Kickoff);
        assert_eq!(t.state.possession, GameConfig::default().overtime_receiver());
        assert_eq!(t.state.timeouts, Timeouts::both(2));

        let no_overtime = GameConfig { overtime_mode: OvertimeMode::None, ..GameConfig::default() };
        let t = apply(&tied, &out, &no_overtime).unwrap();
        assert!(t.state.is_final);
        assert_eq!(t.state.winner(), None);
    }

    #[test]
    fn test_halftime_resets_possession_and_timeouts() {
        let mut state = scrimmage(TeamSide::Away, 40, 1, 10);
        state.period = Period::Quarter(2);
        state.clock = 5;
        state.timeouts = Timeouts { home: 0, away: 1 };
        state.two_minute_warning_given = true;
        let out = outcome(&state, PlayType::RunInside, PlayResult::Rush, 4, 30);
        let t = apply(&state, &out, &GameConfig::default()).unwrap();
        assert_eq!(t.period_change, Some((Period::Quarter(2), Period::Quarter(3))));
        assert_eq!(t.state.possession, GameConfig::default().second_half_receiver());
        assert_eq!(t.state.phase, PlayPhase::Kickoff);
        assert_eq!(t.state.timeouts, Timeouts::both(3));
        assert!(!t.state.two_minute_warning_given);
        assert_eq!(t.state.drive_id, 2);
        assert_eq!(t.boundaries[0].result, DriveResult::EndOfHalf);
    }

    #[test]
    fn test_try_is_played_before_period_ends() {
        let mut state = scrimmage(TeamSide::Home, 92, 1, 8);
        state.period = Period::Quarter(2);
        state.clock = 4;
        let mut td = outcome(&state, PlayType::PassShort, PlayResult::Touchdown, 8, 9);
        td.scoring = Some(ScoringPlay::new(TeamSide::Home, ScoreKind::Touchdown));
        let t = apply(&state, &td, &GameConfig::default()).unwrap();
        assert_eq!(t.state.clock, 0);
        assert_eq!(t.state.period, Period::Quarter(2));
        assert_eq!(t.state.phase, PlayPhase::Try);
        assert_eq!(t.drive_result, Some(DriveResult::Score));

        let mut kick = outcome(&t.state, PlayType::ExtraPoint, PlayResult::ExtraPointMissed, 0, 0);
        kick.change_possession = true;
        let after = apply(&t.state, &kick, &GameConfig::default()).unwrap();
        assert_eq!(after.state.period, Period::Quarter(3));
        assert_eq!(after.state.score, Score::new(6, 0));
        // No empty drive for the kickoff that never happens
        assert_eq!(after.state.drive_id, 2);
        assert_eq!(after.boundaries.len(), 2);
        assert_eq!(after.boundaries[0].result, DriveResult::Score);
        assert!(after.boundaries[0].next.is_none());
        assert_eq!(after.boundaries[1].result, DriveResult::EndOfHalf);
        assert_eq!(after.boundaries[1].next.map(|d| d.id), Some(2));
    }

    #[test]
    fn test_field_goal_at_the_gun_opens_no_drive() {
        let mut state = scrimmage(TeamSide::Home, 70, 4, 3);
        state.period = Period::Quarter(4);
        state.clock = 4;
        state.two_minute_warning_given = true;
        state.score = Score::new(17, 17);
        state.drive_id = 19;
        let mut fg = outcome(&state, PlayType::FieldGoal, PlayResult::FieldGoalGood, 0, 5);
        fg.change_possession = true;
        fg.scoring = Some(ScoringPlay::new(TeamSide::Home, ScoreKind::FieldGoal));
        let t = apply(&state, &fg, &GameConfig::default()).unwrap();
        assert!(t.state.is_final);
        assert_eq!(t.state.winner(), Some(TeamSide::Home));
        assert_eq!(t.state.drive_id, 19);
        assert!(t.boundaries.iter().all(|b| b.next.is_none()));

        // Early quarters keep the pending kickoff
        state.period = Period::Quarter(1);
        let mut fg = outcome(&state, PlayType::FieldGoal, PlayResult::FieldGoalGood, 0, 5);
        fg.change_possession = true;
        fg.scoring = Some(ScoringPlay::new(TeamSide::Home, ScoreKind::FieldGoal));
        let t = apply(&state, &fg, &GameConfig::default()).unwrap();
        assert_eq!(t.state.period, Period::Quarter(2));
        assert_eq!(t.state.phase, PlayPhase::Kickoff);
        assert_eq!(t.state.drive_id, 20);
    }

    #[test]
    fn test_score_overflow_is_illegal() {
        let mut state = scrimmage(TeamSide::Home, 70, 4, 3);
        state.score = Score::new(u16::MAX - 1, 0);
        let mut fg = outcome(&state, PlayType::FieldGoal, PlayResult::FieldGoalGood, 0, 5);
        fg.change_possession = true;
        fg.scoring = Some(ScoringPlay::new(TeamSide::Home, ScoreKind::FieldGoal));
        let err = apply(&state, &fg, &GameConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::IllegalTransition { .. }));
    }

    #[test]
    fn test_sudden_death_field_goal_ends_game() {
        let mut state = scrimmage(TeamSide::Home, 70, 4, 3);
        state.period = Period::Overtime(1);
        state.score = Score::new(20, 20);
        state.drive_id = 24;
        let mut fg = outcome(&state, PlayType::FieldGoal, PlayResult::FieldGoalGood, 0, 5);
        fg.change_possession = true;
        fg.scoring = Some(ScoringPlay::new(TeamSide::Home, ScoreKind::FieldGoal));
        let t = apply(&state, &fg, &GameConfig::default()).unwrap();
        assert!(t.game_over);
        assert_eq!(t.state.winner(), Some(TeamSide::Home));
        assert_eq!(t.state.drive_id, 24);
        assert_eq!(t.boundaries.len(), 1);
        assert!(t.boundaries[0].next.is_none());

        let timed = GameConfig { overtime_mode: OvertimeMode::TimedPeriod, ..GameConfig::default() };
        let t = apply(&state, &fg, &timed).unwrap();
        assert!(!t.game_over);
        assert_eq!(t.state.phase, PlayPhase::Kickoff);
    }

    #[test]
    fn test_safety_gives_defense_the_ball() {
        let state = scrimmage(TeamSide::Home, 3, 2, 10);
        let mut out = outcome(&state, PlayType::PassLong, PlayResult::Safety, -3, 30);
        out.change_possession = true;
        out.scoring = Some(ScoringPlay::new(TeamSide::Away, ScoreKind::Safety));
        let t = apply(&state, &out, &GameConfig::default()).unwrap();
        assert_eq!(t.state.score, Score::new(0, 2));
        assert_eq!(t.state.possession, TeamSide::Away);
        assert_eq!(t.state.yard_line, 25);
        assert_eq!(t.boundaries[0].result, DriveResult::Safety);
    }

    #[test]
    fn test_holding_near_goal_is_half_the_distance() {
        let state = scrimmage(TeamSide::Home, 8, 2, 6);
        let mut out = outcome(&state, PlayType::RunInside, PlayResult::Penalty, -4, 5);
        out.penalty = Some(PenaltyKind::OffensiveHolding);
        let t = apply(&state, &out, &GameConfig::default()).unwrap();
        assert_eq!((t.state.down, t.state.distance, t.state.yard_line), (2, 10, 4));

        out.yards = -10;
        assert!(matches!(
            apply(&state, &out, &GameConfig::default()),
            Err(EngineError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn test_stale_context_is_rejected() {
        let state = scrimmage(TeamSide::Home, 30, 1, 10);
        let mut out = outcome(&state, PlayType::RunInside, PlayResult::Rush, 3, 30);
        out.context.down = 2;
        let err = apply(&state, &out, &GameConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::IllegalTransition { .. }));
    }

    #[test]
    fn test_gain_past_goal_line_must_be_touchdown() {
        let state = scrimmage(TeamSide::Home, 95, 1, 5);
        let out = outcome(&state, PlayType::RunInside, PlayResult::Rush, 7, 30);
        assert!(apply(&state, &out, &GameConfig::default()).is_err());

        let mut td = outcome(&state, PlayType::RunInside, PlayResult::Touchdown, 7, 30);
        td.scoring = Some(ScoringPlay::new(TeamSide::Home, ScoreKind::Touchdown));
        assert!(apply(&state, &td, &GameConfig::default()).is_err());
        td.yards = 5;
        assert!(apply(&state, &td, &GameConfig::default()).is_ok());
    }

    #[test]
    fn test_turnover_on_downs_is_never_an_input() {
        let state = scrimmage(TeamSide::Home, 30, 4, 1);
        let out = outcome(&state, PlayType::RunInside, PlayResult::TurnoverOnDowns, 0, 30);
        assert!(apply(&state, &out, &GameConfig::default()).is_err());
    }

    #[test]
    fn test_two_minute_warning_once_per_half() {
        let mut state = scrimmage(TeamSide::Home, 30, 1, 10);
        state.period = Period::Quarter(4);
        state.clock = 125;
        let out = outcome(&state, PlayType::RunInside, PlayResult::Rush, 2, 10);
        let t = apply(&state, &out, &GameConfig::default()).unwrap();
        assert_eq!(t.two_minute_warning, Some(Period::Quarter(4)));
        assert_eq!(t.state.clock, 115);

        let out = outcome(&t.state, PlayType::RunInside, PlayResult::Rush, 2, 10);
        let again = apply(&t.state, &out, &GameConfig::default()).unwrap();
        assert_eq!(again.two_minute_warning, None);
    }

    #[test]
    fn test_kickoff_return_sets_receiver_spot() {
        let mut state = scrimmage(TeamSide::Away, 25, 1, 10);
        state.phase = PlayPhase::Kickoff;
        let mut out = outcome(&state, PlayType::Kickoff, PlayResult::KickReturn, 60, 6);
        out.return_yards = 22;
        let t = apply(&state, &out, &GameConfig::default()).unwrap();
        // Lands at the receiver's 5, returned 22
        assert_eq!(t.state.yard_line, 27);
        assert_eq!(t.state.possession, TeamSide::Away);
        assert_eq!(t.state.phase, PlayPhase::Scrimmage);
        assert!(!t.possession_changed);
    }

    #[test]
    fn test_missed_field_goal_spot() {
        let state = scrimmage(TeamSide::Home, 60, 4, 8);
        let mut out = outcome(&state, PlayType::FieldGoal, PlayResult::FieldGoalMissed, 0, 5);
        out.change_possession = true;
        let t = apply(&state, &out, &GameConfig::default()).unwrap();
        assert_eq!(t.state.possession, TeamSide::Away);
        assert_eq!(t.state.yard_line, 47);

        let close = scrimmage(TeamSide::Home, 95, 4, 5);
        let mut out = outcome(&close, PlayType::FieldGoal, PlayResult::FieldGoalMissed, 0, 5);
        out.change_possession = true;
        let t = apply(&close, &out, &GameConfig::default()).unwrap();
        assert_eq!(t.state.yard_line, 20);
    }
}
