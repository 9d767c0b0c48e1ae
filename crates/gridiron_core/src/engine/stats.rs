//! Scoring & boxscore aggregation
//!
//! Folds one applied play into the boxscore. Team totals are kept
//! incrementally so a fold never rescans earlier plays. Each play index may
//! be folded once; a repeat is rejected instead of double counting.

use super::drive::Transition;
use crate::error::{EngineError, Result};
use crate::models::{
    Boxscore, DriveSummary, GameState, PlayOutcome, PlayPhase, PlayResult, PlayType, PlayerId,
    PlayerStatLine, ScoreKind, TeamSide,
};

pub struct BoxscoreAggregator;

impl BoxscoreAggregator {
    /// Boxscore for a game opening at `state`: points carried in from the
    /// starting score, the opening drive open.
    pub fn start(state: &GameState) -> Boxscore {
        let mut boxscore = Boxscore::default();
        boxscore.home.points = state.score.home as u32;
        boxscore.away.points = state.score.away as u32;
        boxscore.drives.push(DriveSummary::open(
            state.drive_id,
            state.possession,
            state.period,
            state.clock,
            state.yard_line,
        ));
        boxscore
    }

    /// Fold one applied play in place.
    ///
    /// Every precondition is checked before anything is written, so an
    /// error leaves the boxscore as it was.
    pub fn fold(boxscore: &mut Boxscore, outcome: &PlayOutcome, transition: &Transition) -> Result<()> {
        Self::check(boxscore, transition)?;

        Self::credit_drive(boxscore, outcome, transition);
        Self::apply_boundaries(boxscore, transition);
        Self::credit_points(boxscore, transition);
        Self::team_totals(boxscore, outcome, transition);
        Self::player_lines(boxscore, outcome);

        boxscore.last_folded_play = Some(transition.state.play_index);
        Ok(())
    }

    /// Whether `transition` can be folded into `boxscore`.
    pub fn check(boxscore: &Boxscore, transition: &Transition) -> Result<()> {
        let play_index = transition.state.play_index;
        if let Some(last) = boxscore.last_folded_play {
            if play_index <= last {
                return Err(EngineError::illegal(format!(
                    "play {play_index} already folded (last {last})"
                )));
            }
        }
        if boxscore.open_drive().is_none() {
            return Err(EngineError::illegal("no open drive to credit"));
        }
        Ok(())
    }

    pub fn record_timeout(boxscore: &mut Boxscore, team: TeamSide) {
        boxscore.team_mut(team).timeouts_used += 1;
    }

    fn credit_drive(boxscore: &mut Boxscore, outcome: &PlayOutcome, transition: &Transition) {
        let Some(drive) = boxscore.drives.last_mut() else {
            return;
        };
        match outcome.context.phase {
            PlayPhase::Kickoff => {
                // The receiver's drive really starts where the return ends
                if drive.plays == 0 && transition.state.phase == PlayPhase::Scrimmage {
                    drive.start_yard_line = transition.state.yard_line;
                    drive.end_yard_line = transition.state.yard_line;
                }
            }
            PlayPhase::Scrimmage => {
                drive.plays += 1;
                if counts_scrimmage_yards(outcome) {
                    drive.yards += outcome.yards;
                }
                drive.end_yard_line = transition.end_spot;
            }
            PlayPhase::Try => {}
        }
        if let Some(result) = transition.drive_result {
            drive.result.get_or_insert(result);
        }
    }

    fn apply_boundaries(boxscore: &mut Boxscore, transition: &Transition) {
        for boundary in &transition.boundaries {
            if let Some(drive) = boxscore.drives.last_mut().filter(|d| !d.sealed) {
                drive.result.get_or_insert(boundary.result);
                drive.sealed = true;
            }
            if let Some(start) = boundary.next {
                let mut drive = DriveSummary::open(
                    start.id,
                    start.team,
                    start.period,
                    start.clock,
                    start.yard_line,
                );
                drive.result = start.result;
                boxscore.drives.push(drive);
            }
        }
    }

    /// Points go to the scoring team's latest drive; safeties belong to
    /// the team that lost the ball, so they are not credited to a drive.
    fn credit_points(boxscore: &mut Boxscore, transition: &Transition) {
        let Some((play, _)) = transition.score else {
            return;
        };
        boxscore.team_mut(play.team).points += play.points as u32;
        if play.kind == ScoreKind::Safety {
            return;
        }
        if let Some(drive) = boxscore.drives.iter_mut().rev().find(|d| d.team == play.team) {
            drive.points += play.points as u32;
        }
    }

    fn team_totals(boxscore: &mut Boxscore, outcome: &PlayOutcome, transition: &Transition) {
        let offense = outcome.offense();
        let defense = offense.opponent();
        let play_type = outcome.play_type;
        let result = outcome.result;
        let scrimmage = outcome.context.phase == PlayPhase::Scrimmage;

        if let Some(kind) = outcome.penalty {
            let team = if kind.against_offense() { offense } else { defense };
            let line = boxscore.team_mut(team);
            line.penalties += 1;
            line.penalty_yards += outcome.yards.unsigned_abs();
        }

        let off = boxscore.team_mut(offense);
        if scrimmage {
            off.time_of_possession_secs += transition.elapsed;
        }
        if scrimmage && is_snap(play_type) && result != PlayResult::Penalty {
            off.plays += 1;
        }
        if is_sack(outcome) {
            off.passing_yards += outcome.yards;
            off.total_yards += outcome.yards;
            off.sacks_allowed += 1;
        } else if counts_scrimmage_yards(outcome) {
            if play_type.is_pass() {
                off.passing_yards += outcome.yards;
            } else {
                off.rushing_yards += outcome.yards;
            }
            off.total_yards += outcome.yards;
        }
        if scrimmage && transition.first_down {
            off.first_downs += 1;
        }

        let converted = transition.first_down
            || outcome.scoring.is_some_and(|s| s.team == offense && s.kind == ScoreKind::Touchdown);
        let down_attempt = scrimmage
            && result != PlayResult::Penalty
            && !matches!(play_type, PlayType::Punt | PlayType::FieldGoal);
        if down_attempt && outcome.context.down == 3 {
            off.third_down_attempts += 1;
            off.third_down_conversions += converted as u32;
        }
        if down_attempt && outcome.context.down == 4 {
            off.fourth_down_attempts += 1;
            off.fourth_down_conversions += converted as u32;
        }
        if play_type == PlayType::Punt {
            off.punts += 1;
        }
        let turnover = matches!(result, PlayResult::Interception | PlayResult::FumbleLost);
        if turnover {
            off.turnovers += 1;
        }

        let def = boxscore.team_mut(defense);
        if is_sack(outcome) {
            def.sacks += 1;
        }
        if turnover {
            def.takeaways += 1;
        }
    }

    fn player_lines(boxscore: &mut Boxscore, outcome: &PlayOutcome) {
        let offense = outcome.offense();
        let defense = offense.opponent();
        let p = outcome.participants;
        let yards = outcome.yards;
        let result = outcome.result;
        let defensive_td = outcome.scoring.is_some_and(|s| s.team == defense);
        let offensive_td = outcome.scoring.is_some_and(|s| s.team == offense)
            && result == PlayResult::Touchdown;

        if result == PlayResult::Penalty {
            return;
        }

        match outcome.play_type {
            PlayType::PassShort | PlayType::PassMedium | PlayType::PassLong => {
                if is_sack(outcome) {
                    credit(boxscore, p.passer, offense, |l| l.passing.sacks_taken += 1);
                    credit(boxscore, p.defender, defense, |l| {
                        l.defense.sacks += 1;
                        if result == PlayResult::Safety {
                            l.defense.safeties += 1;
                        }
                    });
                } else {
                    let caught = matches!(result, PlayResult::Complete | PlayResult::Touchdown);
                    credit(boxscore, p.passer, offense, |l| {
                        l.passing.attempts += 1;
                        if caught {
                            l.passing.completions += 1;
                            l.passing.yards += yards;
                        }
                        l.passing.touchdowns += offensive_td as u32;
                        l.passing.interceptions += (result == PlayResult::Interception) as u32;
                    });
                    credit(boxscore, p.receiver, offense, |l| {
                        l.receiving.targets += 1;
                        if caught {
                            l.receiving.receptions += 1;
                            l.receiving.yards += yards;
                            l.receiving.long = l.receiving.long.max(yards);
                        }
                        l.receiving.touchdowns += offensive_td as u32;
                    });
                    if result == PlayResult::Interception {
                        credit(boxscore, p.defender, defense, |l| {
                            l.defense.interceptions += 1;
                            l.defense.touchdowns += defensive_td as u32;
                        });
                    }
                }
            }
            PlayType::RunInside | PlayType::RunOutside | PlayType::Kneel => {
                credit(boxscore, p.ball_carrier, offense, |l| {
                    l.rushing.attempts += 1;
                    l.rushing.yards += yards;
                    l.rushing.long = l.rushing.long.max(yards);
                    l.rushing.touchdowns += offensive_td as u32;
                    l.rushing.fumbles_lost += (result == PlayResult::FumbleLost) as u32;
                });
                if result == PlayResult::FumbleLost {
                    credit(boxscore, p.defender, defense, |l| {
                        l.defense.fumble_recoveries += 1;
                        l.defense.touchdowns += defensive_td as u32;
                    });
                }
                if result == PlayResult::Safety {
                    credit(boxscore, p.tackler, defense, |l| l.defense.safeties += 1);
                }
            }
            PlayType::Punt => {
                credit(boxscore, p.kicker, offense, |l| {
                    l.kicking.punts += 1;
                    l.kicking.punt_yards += yards;
                });
                credit(boxscore, p.returner, defense, |l| {
                    l.returns.returns += 1;
                    l.returns.yards += outcome.return_yards;
                    l.returns.touchdowns += defensive_td as u32;
                });
            }
            PlayType::Kickoff => {
                credit(boxscore, p.kicker, offense, |l| {
                    l.kicking.kickoffs += 1;
                    l.kicking.touchbacks += (result == PlayResult::Touchback) as u32;
                });
                credit(boxscore, p.returner, defense, |l| {
                    l.returns.returns += 1;
                    l.returns.yards += outcome.return_yards;
                    l.returns.touchdowns += defensive_td as u32;
                });
            }
            PlayType::FieldGoal => credit(boxscore, p.kicker, offense, |l| {
                l.kicking.field_goals_attempted += 1;
                l.kicking.field_goals_made += (result == PlayResult::FieldGoalGood) as u32;
            }),
            PlayType::ExtraPoint => credit(boxscore, p.kicker, offense, |l| {
                l.kicking.extra_points_attempted += 1;
                l.kicking.extra_points_made += (result == PlayResult::ExtraPointGood) as u32;
            }),
            PlayType::Spike => credit(boxscore, p.passer, offense, |l| l.passing.attempts += 1),
            PlayType::TwoPoint => credit(boxscore, p.ball_carrier, offense, |l| {
                l.rushing.two_point_attempts += 1;
                l.rushing.two_point_conversions += (result == PlayResult::TwoPointGood) as u32;
            }),
        }

        // Kick coverage tackles belong to the kicking team
        let tackling_team = if matches!(outcome.play_type, PlayType::Punt | PlayType::Kickoff) {
            offense
        } else {
            defense
        };
        credit(boxscore, p.tackler, tackling_team, |l| l.defense.tackles += 1);
    }
}

fn credit(
    boxscore: &mut Boxscore,
    player: Option<PlayerId>,
    team: TeamSide,
    update: impl FnOnce(&mut PlayerStatLine),
) {
    if let Some(id) = player {
        update(boxscore.player_mut(id, team));
    }
}

fn is_snap(play_type: PlayType) -> bool {
    play_type.is_pass() || play_type.is_run() || matches!(play_type, PlayType::Kneel | PlayType::Spike)
}

fn is_sack(outcome: &PlayOutcome) -> bool {
    outcome.play_type.is_pass() && matches!(outcome.result, PlayResult::Sack | PlayResult::Safety)
}

/// Gains from scrimmage that count toward offensive yardage.
fn counts_scrimmage_yards(outcome: &PlayOutcome) -> bool {
    if outcome.context.phase != PlayPhase::Scrimmage {
        return false;
    }
    let play_type = outcome.play_type;
    if play_type.is_pass() {
        return matches!(
            outcome.result,
            PlayResult::Complete | PlayResult::Touchdown | PlayResult::Sack | PlayResult::Safety
        );
    }
    (play_type.is_run() || play_type == PlayType::Kneel)
        && matches!(
            outcome.result,
            PlayResult::Rush
                | PlayResult::Touchdown
                | PlayResult::FumbleRecovered
                | PlayResult::FumbleLost
                | PlayResult::Safety
                | PlayResult::Kneel
        )
}
