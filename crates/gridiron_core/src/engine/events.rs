//! Event emitter
//!
//! Packages each applied play and the clock/score/drive changes it caused
//! into ordered, append-only [`GameEvent`]s.

use sha2::{Digest, Sha256};

use super::drive::Transition;
use super::momentum::MomentumState;
use crate::models::{
    Boxscore, GameEvent, GameEventKind, GameState, PlayOutcome, PlayType, Situation, TeamSide,
};

/// Append-only event log for one game.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, assigning the next sequence number.
    pub fn push(&mut self, play_index: u32, kind: GameEventKind) -> &GameEvent {
        let sequence = self.events.len() as u32;
        self.events.push(GameEvent { sequence, play_index, kind });
        &self.events[sequence as usize]
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Events appended at or after `sequence`.
    pub fn since(&self, sequence: usize) -> &[GameEvent] {
        self.events.get(sequence..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_events(self) -> Vec<GameEvent> {
        self.events
    }

    /// SHA-256 hex digest of the serialized log; equal digests mean
    /// identical replays.
    pub fn fingerprint(&self) -> String {
        let bytes = serde_json::to_vec(&self.events).unwrap_or_default();
        let digest = Sha256::digest(&bytes);
        let mut out = String::with_capacity(digest.len() * 2);
        for b in digest.iter() {
            out.push_str(&format!("{:02x}", b));
        }
        out
    }
}

pub struct EventEmitter;

impl EventEmitter {
    /// Emit the events of one applied play, in order: the play, any score,
    /// the two-minute warning, sealed drives, the period change and the
    /// end of the game. `first_drive` indexes the drive that was open
    /// before the play. Returns the sequence of the first event.
    pub fn play(
        log: &mut EventLog,
        outcome: &PlayOutcome,
        transition: &Transition,
        momentum: MomentumState,
        boxscore: &Boxscore,
        first_drive: usize,
    ) -> usize {
        let first = log.len();
        let state = &transition.state;
        let play_index = state.play_index;

        log.push(
            play_index,
            GameEventKind::PlayApplied {
                offense: outcome.offense(),
                outcome: *outcome,
                ruling: transition.ruling,
                first_down: transition.first_down,
                possession_changed: transition.possession_changed,
                after: Situation::from_state(state),
                momentum,
            },
        );

        if let Some((play, score)) = transition.score {
            log.push(
                play_index,
                GameEventKind::ScoreChanged {
                    team: play.team,
                    kind: play.kind,
                    points: play.points,
                    score,
                },
            );
        }

        if let Some(period) = transition.two_minute_warning {
            log.push(play_index, GameEventKind::TwoMinuteWarning { period });
        }

        let touched = boxscore.drives.get(first_drive..).unwrap_or(&[]);
        for drive in touched.iter().filter(|d| d.sealed) {
            log.push(play_index, GameEventKind::DriveEnded { drive: drive.clone() });
        }

        if let Some((from, to)) = transition.period_change {
            log.push(play_index, GameEventKind::QuarterChanged { from, to });
        }

        if transition.game_over {
            Self::game_ended(log, state);
        }
        first
    }

    pub fn game_ended(log: &mut EventLog, state: &GameState) {
        log.push(
            state.play_index,
            GameEventKind::GameEnded { score: state.score, winner: state.winner() },
        );
    }

    pub fn rejected(log: &mut EventLog, state: &GameState, play_type: PlayType, reason: String) {
        log.push(state.play_index, GameEventKind::PlayRejected { play_type, reason });
    }

    pub fn timeout(log: &mut EventLog, state: &GameState, team: TeamSide) {
        log.push(
            state.play_index,
            GameEventKind::TimeoutCalled { team, remaining: state.timeouts.get(team) },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Period, Score};

    #[test]
    fn test_sequence_numbers_are_dense() {
        let mut log = EventLog::new();
        log.push(0, GameEventKind::QuarterChanged { from: Period::Quarter(1), to: Period::Quarter(2) });
        log.push(3, GameEventKind::TwoMinuteWarning { period: Period::Quarter(2) });
        let seqs: Vec<u32> = log.events().iter().map(|e| e.sequence).collect();
        assert_eq!(seqs, vec![0, 1]);
        assert_eq!(log.since(1).len(), 1);
        assert!(log.since(5).is_empty());
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let mut a = EventLog::new();
        let mut b = EventLog::new();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
        a.push(1, GameEventKind::GameEnded { score: Score::new(3, 0), winner: Some(TeamSide::Home) });
        b.push(1, GameEventKind::GameEnded { score: Score::new(0, 3), winner: Some(TeamSide::Away) });
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_event_json_is_tagged() {
        let mut log = EventLog::new();
        let event = log.push(2, GameEventKind::TwoMinuteWarning { period: Period::Quarter(4) });
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["type"], "two_minute_warning");
        assert_eq!(json["sequence"], 0);
        assert_eq!(json["play_index"], 2);
    }
}
