//! Whole-game scenarios and invariant sweeps through the session.

use super::config::{GameConfig, GameSetup, OvertimeMode, StartingSituation};
use super::play_caller::{PlayCaller, SituationalPlayCaller};
use super::session::GameSession;
use crate::models::{
    DriveResult, GameEvent, GameEventKind, GameState, Participants, Period, PlayContext,
    PlayOutcome, PlayPhase, PlayResult, PlayType, Score, ScoreKind, ScoringPlay, TeamCapability,
    TeamProfile, TeamSide,
};

fn teams(seed: u64) -> GameSetup {
    GameSetup::new(
        seed,
        TeamProfile::new(1, "Harbor Gulls").with_capability(TeamCapability::uniform(62)),
        TeamProfile::new(2, "Summit Elk").with_capability(TeamCapability::uniform(58)),
    )
}

fn outcome(state: &GameState, play_type: PlayType, result: PlayResult, yards: i32, secs: u32) -> PlayOutcome {
    PlayOutcome {
        play_type,
        context: PlayContext::from_state(state),
        result,
        yards,
        return_yards: 0,
        clock_elapsed: secs,
        scoring: None,
        change_possession: false,
        penalty: None,
        participants: Participants::default(),
    }
}

fn kinds(events: &[GameEvent]) -> Vec<&'static str> {
    events
        .iter()
        .map(|e| match e.kind {
            GameEventKind::PlayApplied { .. } => "play",
            GameEventKind::QuarterChanged { .. } => "quarter",
            GameEventKind::ScoreChanged { .. } => "score",
            GameEventKind::DriveEnded { .. } => "drive",
            GameEventKind::TwoMinuteWarning { .. } => "two_minute",
            GameEventKind::TimeoutCalled { .. } => "timeout",
            GameEventKind::PlayRejected { .. } => "rejected",
            GameEventKind::GameEnded { .. } => "end",
        })
        .collect()
}

/// Asserts every per-snapshot invariant of a running game.
fn check_snapshot(session: &GameSession) {
    let state = session.state();
    let config = session.config();
    assert!(state.clock <= config.period_length(state.period));
    assert!((1..=4).contains(&state.down), "down {}", state.down);
    assert!(state.distance >= 1);
    assert!((1..=99).contains(&state.yard_line), "yard line {}", state.yard_line);
    if state.phase == PlayPhase::Scrimmage {
        assert!(state.distance <= state.yards_to_goal());
    }

    let boxscore = session.boxscore();
    let open = boxscore.drives.iter().filter(|d| !d.sealed).count();
    let sealed = boxscore.sealed_drives().count();
    if state.is_final {
        assert_eq!(open, 0);
    } else {
        assert_eq!(open, 1);
        assert_eq!(boxscore.open_drive().map(|d| d.team), Some(state.possession));
    }
    assert_eq!((sealed + open) as u32, state.drive_id);
    assert_eq!(boxscore.home.points, state.score.home as u32);
    assert_eq!(boxscore.away.points, state.score.away as u32);
}

/// Plays a game to the end one call at a time, checking invariants after
/// every snapshot.
fn play_checked(mut session: GameSession) -> GameSession {
    let mut caller = SituationalPlayCaller::new();
    let mut last_score = session.state().score;
    let mut plays = 0;
    while !session.is_final() {
        let play_type = caller.call_play(session.state(), session.config());
        let request = session.request_for(play_type);
        let result = session.advance_play(&request).expect("default caller makes legal calls");
        assert!(result.state.score.home >= last_score.home);
        assert!(result.state.score.away >= last_score.away);
        last_score = result.state.score;
        check_snapshot(&session);
        plays += 1;
        assert!(plays < 2_000, "game did not terminate");
    }
    session
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_fourth_down_stop_starts_new_drive() {
    let start = StartingSituation::scrimmage(Period::Quarter(2), 500, TeamSide::Home, 65).with_down(4, 2);
    let mut session = GameSession::start_game(teams(1).starting_at(start)).unwrap();
    let play = outcome(session.state(), PlayType::RunInside, PlayResult::Rush, 1, 28);

    let result = session.advance_outcome(&play).unwrap();
    assert_eq!(kinds(&result.events), vec!["play", "drive"]);
    assert_eq!(result.state.possession, TeamSide::Away);
    assert_eq!(result.state.yard_line, 34);
    assert_eq!((result.state.down, result.state.distance), (1, 10));
    match &result.events[0].kind {
        GameEventKind::PlayApplied { ruling, first_down, possession_changed, .. } => {
            assert_eq!(*ruling, PlayResult::TurnoverOnDowns);
            assert!(!*first_down);
            assert!(*possession_changed);
        }
        other => panic!("unexpected {other:?}"),
    }
    let drives = &session.boxscore().drives;
    assert_eq!(drives.len(), 2);
    assert_eq!(drives[0].result, Some(DriveResult::TurnoverOnDowns));
    assert_eq!(drives[1].start_yard_line, 34);
    check_snapshot(&session);
}

#[test]
fn test_pick_six_seals_drive_as_defensive_score() {
    let start = StartingSituation::scrimmage(Period::Quarter(1), 700, TeamSide::Home, 20);
    let mut session = GameSession::start_game(teams(2).starting_at(start)).unwrap();
    let mut pick = outcome(session.state(), PlayType::PassMedium, PlayResult::Interception, 12, 9);
    pick.return_yards = 32;
    pick.change_possession = true;
    pick.scoring = Some(ScoringPlay::new(TeamSide::Away, ScoreKind::Touchdown));

    let result = session.advance_outcome(&pick).unwrap();
    assert_eq!(kinds(&result.events), vec!["play", "score", "drive"]);
    assert_eq!(result.state.score, Score::new(0, 6));
    assert_eq!(result.state.possession, TeamSide::Away);
    assert_eq!(result.state.phase, PlayPhase::Try);
    match &result.events[2].kind {
        GameEventKind::DriveEnded { drive } => {
            assert_eq!(drive.team, TeamSide::Home);
            assert_eq!(drive.result, Some(DriveResult::DefensiveScore));
        }
        other => panic!("unexpected {other:?}"),
    }

    let mut kick = outcome(session.state(), PlayType::ExtraPoint, PlayResult::ExtraPointGood, 0, 0);
    kick.change_possession = true;
    kick.scoring = Some(ScoringPlay::new(TeamSide::Away, ScoreKind::ExtraPoint));
    let result = session.advance_outcome(&kick).unwrap();
    assert_eq!(kinds(&result.events), vec!["play", "score", "drive"]);
    assert_eq!(result.state.phase, PlayPhase::Kickoff);
    assert_eq!(result.state.possession, TeamSide::Home);

    let drives = &session.boxscore().drives;
    assert_eq!(drives.len(), 3);
    assert_eq!(drives[1].team, TeamSide::Away);
    assert_eq!(drives[1].result, Some(DriveResult::Score));
    assert_eq!(drives[1].points, 7);
    check_snapshot(&session);
}

#[test]
fn test_last_play_of_regulation_decides_or_extends() {
    let late = |score: (i32, i32)| {
        StartingSituation::scrimmage(Period::Quarter(4), 3, TeamSide::Away, 45).with_score(score.0, score.1)
    };

    // Trailing team completes the pass but the clock runs out
    let mut session = GameSession::start_game(teams(3).starting_at(late((17, 13)))).unwrap();
    let pass = outcome(session.state(), PlayType::PassShort, PlayResult::Complete, 10, 3);
    let result = session.advance_outcome(&pass).unwrap();
    assert!(result.state.is_final);
    assert_eq!(result.state.period, Period::Quarter(4));
    assert_eq!(result.state.clock, 0);
    assert_eq!(kinds(&result.events).last(), Some(&"end"));
    assert_eq!(result.state.winner(), Some(TeamSide::Home));

    // Tied: sudden death overtime
    let mut session = GameSession::start_game(teams(3).starting_at(late((17, 17)))).unwrap();
    let pass = outcome(session.state(), PlayType::PassShort, PlayResult::Complete, 10, 3);
    let result = session.advance_outcome(&pass).unwrap();
    assert!(!result.state.is_final);
    assert_eq!(result.state.period, Period::Overtime(1));
    assert_eq!(result.state.phase, PlayPhase::Kickoff);
    assert!(kinds(&result.events).contains(&"quarter"));

    // Tied without overtime: final as a tie
    let config = GameConfig { overtime_mode: OvertimeMode::None, ..GameConfig::default() };
    let setup = teams(3).with_config(config).starting_at(late((17, 17)));
    let mut session = GameSession::start_game(setup).unwrap();
    let pass = outcome(session.state(), PlayType::PassShort, PlayResult::Complete, 10, 3);
    let result = session.advance_outcome(&pass).unwrap();
    assert!(result.state.is_final);
    assert_eq!(result.state.winner(), None);
    check_snapshot(&session);
}

#[test]
fn test_interleaved_sessions_do_not_interact() {
    let alone_a = play_checked(GameSession::start_game(teams(41)).unwrap());
    let alone_b = play_checked(GameSession::start_game(teams(42)).unwrap());

    let mut a = GameSession::start_game(teams(41)).unwrap();
    let mut b = GameSession::start_game(teams(42)).unwrap();
    let mut caller_a = SituationalPlayCaller::new();
    let mut caller_b = SituationalPlayCaller::new();
    while !a.is_final() || !b.is_final() {
        for (session, caller) in [(&mut a, &mut caller_a), (&mut b, &mut caller_b)] {
            if session.is_final() {
                continue;
            }
            let play_type = caller.call_play(session.state(), session.config());
            let request = session.request_for(play_type);
            session.advance_play(&request).unwrap();
        }
    }

    assert_eq!(a.fingerprint(), alone_a.fingerprint());
    assert_eq!(b.fingerprint(), alone_b.fingerprint());
    assert_eq!(a.boxscore(), alone_a.boxscore());
    assert_eq!(b.boxscore(), alone_b.boxscore());
}

#[test]
fn test_halftime_kickoff_goes_to_second_half_receiver() {
    let session = play_checked(GameSession::start_game(teams(8)).unwrap());
    let events = session.events();
    let halftime = events
        .iter()
        .position(|e| {
            matches!(e.kind, GameEventKind::QuarterChanged { to: Period::Quarter(3), .. })
        })
        .expect("game reaches the third quarter");
    let next_play = events[halftime..]
        .iter()
        .find_map(|e| match &e.kind {
            GameEventKind::PlayApplied { outcome, .. } => Some(outcome),
            _ => None,
        })
        .expect("a play follows halftime");
    assert_eq!(next_play.play_type, PlayType::Kickoff);
    // The away team received the opening kick, so it kicks to start the half
    assert_eq!(next_play.offense(), TeamSide::Away);
    assert_eq!(next_play.context.clock, session.config().quarter_length_secs);
}

// ============================================================================
// Invariant sweeps
// ============================================================================

#[test]
fn test_seed_sweep_invariants() {
    for seed in 0..24 {
        let config = if seed % 2 == 0 { GameConfig::default() } else { GameConfig::quick() };
        let session = play_checked(GameSession::start_game(teams(seed).with_config(config)).unwrap());
        let events = session.events();

        for (i, event) in events.iter().enumerate() {
            assert_eq!(event.sequence as usize, i);
        }
        assert_eq!(kinds(events).iter().filter(|k| **k == "end").count(), 1);
        assert_eq!(kinds(events).last(), Some(&"end"));

        let warnings = |period: Period| {
            events
                .iter()
                .filter(|e| matches!(e.kind, GameEventKind::TwoMinuteWarning { period: p } if p == period))
                .count()
        };
        assert!(warnings(Period::Quarter(2)) <= 1);
        assert!(warnings(Period::Quarter(4)) <= 1);

        let mut last = Score::default();
        for event in events {
            if let GameEventKind::ScoreChanged { score, .. } = event.kind {
                assert!(score.home >= last.home && score.away >= last.away);
                last = score;
            }
        }
        assert_eq!(last, session.state().score);

        let drive_ended = kinds(events).iter().filter(|k| **k == "drive").count();
        assert_eq!(drive_ended, session.boxscore().drives.len());
    }
}

#[test]
fn test_same_seed_replays_identically() {
    for seed in [5_u64, 77, 1_000_003] {
        let first = play_checked(GameSession::start_game(teams(seed)).unwrap());
        let second = play_checked(GameSession::start_game(teams(seed)).unwrap());
        assert_eq!(first.events(), second.events());
        assert_eq!(first.fingerprint(), second.fingerprint());
        assert_eq!(first.boxscore(), second.boxscore());
        assert_eq!(first.state(), second.state());
    }
    let a = play_checked(GameSession::start_game(teams(1)).unwrap());
    let b = play_checked(GameSession::start_game(teams(2)).unwrap());
    assert_ne!(a.fingerprint(), b.fingerprint());
}

#[test]
fn test_overtime_modes_always_finish() {
    for mode in [OvertimeMode::SuddenDeath, OvertimeMode::TimedPeriod, OvertimeMode::None] {
        for seed in 0..6 {
            let config = GameConfig { overtime_mode: mode, max_overtime_periods: 2, ..GameConfig::quick() };
            let start = StartingSituation::scrimmage(Period::Quarter(4), 30, TeamSide::Home, 30)
                .with_score(10, 10);
            let setup = teams(seed).with_config(config).starting_at(start);
            let session = play_checked(GameSession::start_game(setup).unwrap());
            let period = session.state().period;
            match mode {
                OvertimeMode::None => assert_eq!(period, Period::Quarter(4)),
                _ => assert!(period <= Period::Overtime(2)),
            }
        }
    }
}

#[test]
fn test_momentum_feeding_odds_stays_deterministic() {
    let config = GameConfig { momentum_affects_odds: true, ..GameConfig::quick() };
    let a = play_checked(GameSession::start_game(teams(12).with_config(config.clone())).unwrap());
    let b = play_checked(GameSession::start_game(teams(12).with_config(config)).unwrap());
    assert_eq!(a.fingerprint(), b.fingerprint());
    let value = a.momentum().value;
    assert!((0.0..=100.0).contains(&value));
}

#[cfg(all(test, feature = "proptest"))]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        /// Property: every reachable snapshot satisfies the field invariants
        #[test]
        fn prop_games_keep_invariants(seed in any::<u64>(), quarter in 60u32..=900) {
            let config = GameConfig {
                quarter_length_secs: quarter,
                overtime_length_secs: quarter.min(600),
                kneel_window_secs: quarter.min(120),
                ..GameConfig::default()
            };
            let session = play_checked(GameSession::start_game(teams(seed).with_config(config)).unwrap());
            prop_assert!(session.is_final());
            prop_assert!(session.final_record().is_some());
        }

        /// Property: replays with the same seed are identical
        #[test]
        fn prop_replay_is_deterministic(seed in any::<u64>()) {
            let config = GameConfig::quick();
            let a = play_checked(GameSession::start_game(teams(seed).with_config(config.clone())).unwrap());
            let b = play_checked(GameSession::start_game(teams(seed).with_config(config)).unwrap());
            prop_assert_eq!(a.fingerprint(), b.fingerprint());
        }
    }
}
