//! Play resolver
//!
//! Turns a legal [`PlayRequest`] into a [`PlayOutcome`]. Pure: the only
//! inputs are the two team profiles, the request, the explicit modifiers,
//! the rule config and the injected RNG. It keeps no memory of prior plays.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::config::GameConfig;
use super::probability::{self, blend, differential};
use crate::error::{EngineError, Result};
use crate::models::{
    Participants, PenaltyKind, Period, PlayOutcome, PlayPhase, PlayRequest, PlayResult, PlayType,
    PlayerId, Position, ScoreKind, ScoringPlay, TeamProfile, TeamSide, FIELD_LENGTH,
};

/// Snap spot to kick distance (end zone + holder depth).
pub const FIELD_GOAL_OFFSET: u8 = 17;

/// Situational inputs supplied by the caller, kept separate from the
/// request so they can be tested in isolation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayModifiers {
    /// Offense momentum edge in [-1, 1]; 0 when momentum is not fed into odds
    pub offense_momentum: f32,
}

impl PlayModifiers {
    pub fn neutral() -> Self {
        Self::default()
    }
}

/// Rejects play calls that are not legal for the request's situation.
///
/// Nothing is ever substituted; the caller gets the reason and re-prompts.
pub fn check_legality(request: &PlayRequest, config: &GameConfig) -> Result<()> {
    let ctx = &request.context;
    let play_type = request.play_type;

    if request.offense == request.defense {
        return Err(EngineError::invalid_request(play_type, "offense and defense are the same team"));
    }
    check_context(request)?;
    if play_type.phase() != ctx.phase {
        return Err(EngineError::invalid_request(
            play_type,
            format!("not a {:?} play", ctx.phase),
        ));
    }

    match play_type {
        PlayType::FieldGoal => {
            let distance = kick_distance(ctx.yard_line);
            if distance > config.max_field_goal_distance {
                return Err(EngineError::invalid_request(
                    play_type,
                    format!(
                        "{distance}-yard attempt beyond range ({})",
                        config.max_field_goal_distance
                    ),
                ));
            }
        }
        PlayType::Kneel => {
            if ctx.score_margin <= 0 {
                return Err(EngineError::invalid_request(play_type, "offense is not leading"));
            }
            let late_period = matches!(ctx.period, Period::Quarter(2) | Period::Quarter(4))
                || ctx.period.is_overtime();
            if !late_period || ctx.clock > config.kneel_window_secs {
                return Err(EngineError::invalid_request(
                    play_type,
                    format!("clock does not favor a kneel ({}s left)", ctx.clock),
                ));
            }
        }
        PlayType::Spike => {
            if ctx.down >= 4 {
                return Err(EngineError::invalid_request(play_type, "no spike on 4th down"));
            }
        }
        _ => {}
    }
    Ok(())
}

/// Down, distance and spot must describe a real snap.
fn check_context(request: &PlayRequest) -> Result<()> {
    let ctx = &request.context;
    let bad = |reason: String| Err(EngineError::invalid_request(request.play_type, reason));
    if !(1..=4).contains(&ctx.down) {
        return bad(format!("down must be 1..=4, got {}", ctx.down));
    }
    if !(1..FIELD_LENGTH).contains(&ctx.yard_line) {
        return bad(format!("yard line must be 1..=99, got {}", ctx.yard_line));
    }
    if ctx.distance == 0 {
        return bad("distance must be at least 1".to_string());
    }
    if ctx.phase == PlayPhase::Scrimmage && ctx.distance > FIELD_LENGTH - ctx.yard_line {
        return bad(format!(
            "distance {} runs past the goal line from {}",
            ctx.distance, ctx.yard_line
        ));
    }
    Ok(())
}

pub fn kick_distance(yard_line: u8) -> u8 {
    FIELD_LENGTH.saturating_sub(yard_line).saturating_add(FIELD_GOAL_OFFSET)
}

/// Resolve one micro-play.
pub fn resolve<R: Rng + ?Sized>(
    offense: &TeamProfile,
    defense: &TeamProfile,
    request: &PlayRequest,
    modifiers: PlayModifiers,
    config: &GameConfig,
    rng: &mut R,
) -> Result<PlayOutcome> {
    if request.offense != offense.id || request.defense != defense.id {
        return Err(EngineError::invalid_request(
            request.play_type,
            format!(
                "teams {}/{} do not match the snapping teams {}/{}",
                request.offense.0, request.defense.0, offense.id.0, defense.id.0
            ),
        ));
    }
    check_legality(request, config)?;

    let momentum = if config.momentum_affects_odds {
        modifiers.offense_momentum.clamp(-1.0, 1.0)
    } else {
        0.0
    };
    let mut resolver = Resolver { offense, defense, request, config, momentum, rng };

    let outcome = match request.play_type {
        PlayType::PassShort | PlayType::PassMedium | PlayType::PassLong => resolver.pass(),
        PlayType::RunInside | PlayType::RunOutside => resolver.run(),
        PlayType::Punt => resolver.punt(),
        PlayType::FieldGoal => resolver.field_goal(),
        PlayType::Kneel => resolver.kneel(),
        PlayType::Spike => resolver.spike(),
        PlayType::Kickoff => resolver.kickoff(),
        PlayType::ExtraPoint => resolver.extra_point(),
        PlayType::TwoPoint => resolver.two_point(),
    };
    Ok(outcome)
}

struct Resolver<'a, R: Rng + ?Sized> {
    offense: &'a TeamProfile,
    defense: &'a TeamProfile,
    request: &'a PlayRequest,
    config: &'a GameConfig,
    momentum: f32,
    rng: &'a mut R,
}

impl<'a, R: Rng + ?Sized> Resolver<'a, R> {
    fn base(&self, result: PlayResult, yards: i32, clock_elapsed: u32) -> PlayOutcome {
        PlayOutcome {
            play_type: self.request.play_type,
            context: self.request.context,
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

    fn yard_line(&self) -> i32 {
        self.request.context.yard_line as i32
    }

    fn offense_side(&self) -> TeamSide {
        self.request.context.offense
    }

    fn sample(&mut self, mean: f32, sd: f32) -> i32 {
        match Normal::new(mean, sd) {
            Ok(dist) => dist.sample(&mut *self.rng).round() as i32,
            Err(_) => mean.round() as i32,
        }
    }

    fn roll(&mut self, probability: f32) -> bool {
        self.rng.gen::<f32>() < probability
    }

    fn clock(&mut self, low: u32, high: u32) -> u32 {
        self.rng.gen_range(low..=high)
    }

    /// Starter at a position (highest overall, lowest id on ties).
    fn starter(team: &TeamProfile, positions: &[Position]) -> Option<PlayerId> {
        team.roster
            .iter()
            .filter(|p| positions.contains(&p.position))
            .max_by_key(|p| (p.overall, std::cmp::Reverse(p.id)))
            .map(|p| p.id)
    }

    fn any_of(&mut self, team: &TeamProfile, positions: &[Position]) -> Option<PlayerId> {
        let candidates: Vec<_> =
            team.roster.iter().filter(|p| positions.contains(&p.position)).collect();
        candidates.choose(&mut *self.rng).map(|p| p.id)
    }

    /// Pre-snap or live-ball foul on a scrimmage snap.
    fn penalty(&mut self) -> Option<PlayOutcome> {
        if !self.roll(probability::PENALTY_RATE) {
            return None;
        }
        let kind = match self.rng.gen_range(0..4) {
            0 => PenaltyKind::FalseStart,
            1 => PenaltyKind::OffensiveHolding,
            2 => PenaltyKind::Offside,
            _ => PenaltyKind::DefensiveHolding,
        };
        let clock = match kind {
            PenaltyKind::FalseStart | PenaltyKind::Offside => 1,
            _ => self.clock(4, 8),
        };
        let mut outcome =
            self.base(PlayResult::Penalty, kind.enforced_yards(self.request.context.yard_line), clock);
        outcome.penalty = Some(kind);
        Some(outcome)
    }

    fn touchdown(&self, mut outcome: PlayOutcome) -> PlayOutcome {
        outcome.result = PlayResult::Touchdown;
        outcome.yards = FIELD_LENGTH as i32 - self.yard_line();
        outcome.scoring = Some(ScoringPlay::new(self.offense_side(), ScoreKind::Touchdown));
        outcome.participants.tackler = None;
        outcome
    }

    fn safety(&self, mut outcome: PlayOutcome) -> PlayOutcome {
        outcome.result = PlayResult::Safety;
        outcome.yards = -self.yard_line();
        outcome.scoring = Some(ScoringPlay::new(self.offense_side().opponent(), ScoreKind::Safety));
        outcome.change_possession = true;
        outcome
    }

    /// Defense takes over where the ball changed hands, then returns it.
    fn takeaway(&mut self, mut outcome: PlayOutcome, return_mean: f32) -> PlayOutcome {
        let spot = self.yard_line() + outcome.yards;
        let max_return = spot;
        let ret = self.sample(return_mean, 6.0).clamp(0, max_return);
        outcome.return_yards = ret;
        outcome.change_possession = true;
        if FIELD_LENGTH as i32 - spot + ret >= FIELD_LENGTH as i32 {
            outcome.return_yards = max_return;
            outcome.scoring =
                Some(ScoringPlay::new(self.offense_side().opponent(), ScoreKind::Touchdown));
        }
        outcome
    }

    fn pass(&mut self) -> PlayOutcome {
        if let Some(flag) = self.penalty() {
            return flag;
        }
        let Some(profile) = probability::pass_profile(self.request.play_type) else {
            return self.base(PlayResult::Incomplete, 0, 5);
        };
        let off = self.offense.effective_capability();
        let def = self.defense.effective_capability();
        let ctx = self.request.context;
        let yl = self.yard_line();
        let edge = differential(blend(off.passing, off.receiving), def.coverage);
        let protection = differential(off.blocking, def.pass_rush);
        let obvious_pass = ctx.down >= 3 && ctx.distance >= 8;

        let passer = Self::starter(self.offense, &[Position::QB]);
        let target = self.any_of(self.offense, &[Position::WR, Position::TE, Position::RB]);

        let sack_chance = probability::sack_probability(profile.sack, protection)
            + if obvious_pass { 0.01 } else { 0.0 };
        if self.roll(sack_chance) {
            let loss = self.sample(7.0, 2.0).clamp(1, 15);
            let clock = self.clock(25, 35);
            let mut outcome = self.base(PlayResult::Sack, -loss, clock);
            outcome.participants.passer = passer;
            outcome.participants.defender = self.any_of(self.defense, &[Position::DL, Position::LB]);
            if yl - loss <= 0 {
                return self.safety(outcome);
            }
            return outcome;
        }

        let room = FIELD_LENGTH as i32 - 1 - yl;
        if self.roll(probability::interception_probability(profile.interception, edge)) {
            let air = self.sample(profile.air_mean, profile.air_sd).clamp(0, room);
            let clock = self.clock(6, 15);
            let mut outcome = self.base(PlayResult::Interception, air, clock);
            outcome.participants.passer = passer;
            outcome.participants.receiver = target;
            outcome.participants.defender = self.any_of(self.defense, &[Position::CB, Position::S]);
            return self.takeaway(outcome, 8.0);
        }

        let completion =
            probability::completion_probability(profile.completion, edge, self.momentum);
        if !self.roll(completion) {
            let clock = self.clock(5, 8);
            let mut outcome = self.base(PlayResult::Incomplete, 0, clock);
            outcome.participants.passer = passer;
            outcome.participants.receiver = target;
            return outcome;
        }

        let air = self.sample(profile.air_mean + self.momentum, profile.air_sd).max(-3);
        let after_catch = self.sample(3.0 + edge * 4.0, 3.0).max(0);
        let gained = (air + after_catch).max(1 - yl);
        let clock = self.clock(25, 40);
        let mut outcome = self.base(PlayResult::Complete, gained, clock);
        outcome.participants.passer = passer;
        outcome.participants.receiver = target;
        outcome.participants.tackler =
            self.any_of(self.defense, &[Position::LB, Position::CB, Position::S]);
        if yl + gained >= FIELD_LENGTH as i32 {
            return self.touchdown(outcome);
        }
        outcome
    }

    fn run(&mut self) -> PlayOutcome {
        if let Some(flag) = self.penalty() {
            return flag;
        }
        let off = self.offense.effective_capability();
        let def = self.defense.effective_capability();
        let yl = self.yard_line();
        let edge = differential(blend(off.rushing, off.blocking), def.run_defense);
        let (mean, sd) = probability::run_distribution(self.request.play_type, edge);
        let gained = self.sample(mean + self.momentum * 0.5, sd).max(-8);
        let clock = self.clock(25, 40);

        let carrier = Self::starter(self.offense, &[Position::RB])
            .or_else(|| Self::starter(self.offense, &[Position::QB]));
        let mut outcome = self.base(PlayResult::Rush, gained, clock);
        outcome.participants.ball_carrier = carrier;
        outcome.participants.tackler =
            self.any_of(self.defense, &[Position::DL, Position::LB, Position::S]);

        if yl + gained >= FIELD_LENGTH as i32 {
            return self.touchdown(outcome);
        }
        if yl + gained <= 0 {
            return self.safety(outcome);
        }

        if self.roll(probability::fumble_probability(off.ball_security)) {
            if self.roll(probability::FUMBLE_RECOVERY_OFFENSE) {
                outcome.result = PlayResult::FumbleRecovered;
                return outcome;
            }
            outcome.result = PlayResult::FumbleLost;
            outcome.participants.defender =
                self.any_of(self.defense, &[Position::DL, Position::LB, Position::CB, Position::S]);
            return self.takeaway(outcome, 2.0);
        }
        outcome
    }

    fn kneel(&mut self) -> PlayOutcome {
        let yards = if self.yard_line() > 1 { -1 } else { 0 };
        let mut outcome = self.base(PlayResult::Kneel, yards, 40);
        outcome.participants.ball_carrier = Self::starter(self.offense, &[Position::QB]);
        outcome
    }

    fn spike(&mut self) -> PlayOutcome {
        let mut outcome = self.base(PlayResult::Spike, 0, 1);
        outcome.participants.passer = Self::starter(self.offense, &[Position::QB]);
        outcome
    }

    fn punt(&mut self) -> PlayOutcome {
        let off = self.offense.effective_capability();
        let def = self.defense.effective_capability();
        let yl = self.yard_line();
        let (mean, sd) = probability::punt_distribution(off.punting);
        let gross = self
            .sample(mean, sd)
            .clamp(probability::PUNT_MIN_GROSS, probability::PUNT_MAX_GROSS);
        let clock = self.clock(8, 12);

        let mut outcome = self.base(PlayResult::Punt, gross, clock);
        outcome.change_possession = true;
        outcome.participants.kicker = Self::starter(self.offense, &[Position::P]);

        let land = yl + gross;
        if land >= FIELD_LENGTH as i32 {
            outcome.result = PlayResult::Touchback;
            return outcome;
        }

        outcome.participants.returner =
            Self::starter(self.defense, &[Position::WR, Position::CB, Position::RB]);
        // Fair catch
        if self.roll(0.3) {
            return outcome;
        }
        let (ret_mean, ret_sd) =
            probability::return_distribution(def.returning, off.coverage, false);
        let ret = self.sample(ret_mean, ret_sd).clamp(0, land);
        outcome.return_yards = ret;
        outcome.participants.tackler = self.any_of(self.offense, &[Position::LB, Position::S]);
        if ret == land {
            outcome.result = PlayResult::Touchdown;
            outcome.participants.tackler = None;
            outcome.scoring =
                Some(ScoringPlay::new(self.offense_side().opponent(), ScoreKind::Touchdown));
        }
        outcome
    }

    fn field_goal(&mut self) -> PlayOutcome {
        let off = self.offense.effective_capability();
        let distance = kick_distance(self.request.context.yard_line);
        let good = self.roll(probability::field_goal_probability(distance, off.kicking));
        let mut outcome = self.base(PlayResult::FieldGoalMissed, 0, 5);
        outcome.change_possession = true;
        outcome.participants.kicker = Self::starter(self.offense, &[Position::K]);
        if good {
            outcome.result = PlayResult::FieldGoalGood;
            outcome.scoring = Some(ScoringPlay::new(self.offense_side(), ScoreKind::FieldGoal));
        }
        outcome
    }

    fn kickoff(&mut self) -> PlayOutcome {
        let off = self.offense.effective_capability();
        let def = self.defense.effective_capability();
        let (mean, sd) = probability::kickoff_distribution(off.kicking);
        let gross = self.sample(mean, sd).clamp(40, 75);
        let land = self.config.kickoff_yard_line as i32 + gross;

        let mut outcome = self.base(PlayResult::KickReturn, gross, 1);
        outcome.participants.kicker = Self::starter(self.offense, &[Position::K]);
        if land >= FIELD_LENGTH as i32 {
            outcome.result = PlayResult::Touchback;
            return outcome;
        }

        outcome.participants.returner =
            Self::starter(self.defense, &[Position::WR, Position::CB, Position::RB]);
        outcome.clock_elapsed = self.clock(5, 8);
        let (ret_mean, ret_sd) =
            probability::return_distribution(def.returning, off.coverage, true);
        let ret = if self.roll(0.006) {
            land
        } else {
            self.sample(ret_mean, ret_sd).clamp(0, land)
        };
        outcome.return_yards = ret;
        if ret == land {
            outcome.result = PlayResult::Touchdown;
            outcome.scoring =
                Some(ScoringPlay::new(self.offense_side().opponent(), ScoreKind::Touchdown));
        } else {
            outcome.participants.tackler = self.any_of(self.offense, &[Position::LB, Position::S]);
        }
        outcome
    }

    fn extra_point(&mut self) -> PlayOutcome {
        let off = self.offense.effective_capability();
        let good = self.roll(probability::extra_point_probability(off.kicking));
        let mut outcome = self.base(PlayResult::ExtraPointMissed, 0, 0);
        outcome.change_possession = true;
        outcome.participants.kicker = Self::starter(self.offense, &[Position::K]);
        if good {
            outcome.result = PlayResult::ExtraPointGood;
            outcome.scoring = Some(ScoringPlay::new(self.offense_side(), ScoreKind::ExtraPoint));
        }
        outcome
    }

    fn two_point(&mut self) -> PlayOutcome {
        let off = self.offense.effective_capability();
        let def = self.defense.effective_capability();
        let edge = differential(
            blend(off.passing, off.rushing),
            blend(def.coverage, def.run_defense),
        );
        let good = self.roll(probability::two_point_probability(edge));
        let mut outcome = self.base(PlayResult::TwoPointFailed, 0, 0);
        outcome.change_possession = true;
        outcome.participants.ball_carrier = Self::starter(self.offense, &[Position::RB]);
        if good {
            outcome.result = PlayResult::TwoPointGood;
            outcome.scoring = Some(ScoringPlay::new(self.offense_side(), ScoreKind::TwoPoint));
        }
        outcome
    }
}
