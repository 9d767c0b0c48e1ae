//! Game session controller
//!
//! One session owns one game: its state snapshot, boxscore, momentum, event
//! log and RNG. `advance_play` is the single entry point that moves the game
//! forward; it resolves one micro-play, applies it, folds stats and returns
//! the new snapshot together with the events it produced.

use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::config::{GameConfig, GameSetup};
use super::drive;
use super::events::{EventEmitter, EventLog};
use super::momentum::MomentumState;
use super::play_caller::PlayCaller;
use super::play_resolver;
use super::stats::BoxscoreAggregator;
use crate::error::{EngineError, Result};
use crate::models::{
    Boxscore, GameEvent, GameRecord, GameState, PlayContext, PlayOutcome, PlayRequest, PlayType,
    TeamEntry, TeamId, TeamSide,
};

/// Result of one `advance_play` / `call_timeout` call.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvanceResult {
    pub state: GameState,
    /// Events appended by this call, in order
    pub events: Vec<GameEvent>,
}

/// Controller for a single game.
///
/// Calls must be serialized; independent games use independent sessions.
#[derive(Debug, Clone)]
pub struct GameSession {
    setup: GameSetup,
    state: GameState,
    boxscore: Boxscore,
    momentum: MomentumState,
    log: EventLog,
    rng: ChaCha8Rng,
}

impl GameSession {
    /// Validate the setup and open the game. Configuration errors are
    /// reported here, before any play is simulated.
    pub fn start_game(setup: GameSetup) -> Result<Self> {
        setup.validate()?;
        let state = setup.initial_state();
        let boxscore = BoxscoreAggregator::start(&state);
        let rng = ChaCha8Rng::seed_from_u64(setup.seed);

        info!(
            "game start: {} (home) vs {} (away), seed {}, {}",
            setup.home.name,
            setup.away.name,
            setup.seed,
            state.situation_label()
        );

        Ok(Self {
            setup,
            state,
            boxscore,
            momentum: MomentumState::default(),
            log: EventLog::new(),
            rng,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn boxscore(&self) -> &Boxscore {
        &self.boxscore
    }

    pub fn momentum(&self) -> MomentumState {
        self.momentum
    }

    pub fn events(&self) -> &[GameEvent] {
        self.log.events()
    }

    pub fn config(&self) -> &GameConfig {
        &self.setup.config
    }

    pub fn setup(&self) -> &GameSetup {
        &self.setup
    }

    pub fn is_final(&self) -> bool {
        self.state.is_final
    }

    pub fn fingerprint(&self) -> String {
        self.log.fingerprint()
    }

    pub fn team_id(&self, side: TeamSide) -> TeamId {
        self.setup.team(side).id
    }

    /// Independent copy for what-if branches; nothing done to the fork
    /// reaches this session.
    pub fn fork(&self) -> Self {
        self.clone()
    }

    /// Request for `play_type` against the current snapshot.
    pub fn request_for(&self, play_type: PlayType) -> PlayRequest {
        let context = PlayContext::from_state(&self.state);
        PlayRequest {
            offense: self.team_id(context.offense),
            defense: self.team_id(context.defense()),
            play_type,
            context,
        }
    }

    // =========================================================================
    // Play flow
    // =========================================================================

    /// Resolve and apply one play.
    ///
    /// A request computed against another snapshot returns
    /// `IllegalTransition`; an illegal call or wrong teams for the current
    /// snapshot return `InvalidPlayRequest`. Either way a
    /// `PlayRejected` event is logged and the state, boxscore and RNG are
    /// left exactly as they were.
    pub fn advance_play(&mut self, request: &PlayRequest) -> Result<AdvanceResult> {
        if self.state.is_final {
            return Err(self.reject(request.play_type, EngineError::illegal("game is already final")));
        }
        if request.context != PlayContext::from_state(&self.state) {
            let err = EngineError::illegal(format!(
                "request computed for a different situation (game is at {} {}s, {})",
                self.state.period.label(),
                self.state.clock,
                self.state.situation_label()
            ));
            return Err(self.reject(request.play_type, err));
        }
        let offense = self.state.offense();
        let expected = (self.team_id(offense), self.team_id(offense.opponent()));
        if (request.offense, request.defense) != expected {
            let err = EngineError::invalid_request(
                request.play_type,
                format!(
                    "team {} is not on offense against {} (expected {} vs {})",
                    request.offense.0, request.defense.0, expected.0 .0, expected.1 .0
                ),
            );
            return Err(self.reject(request.play_type, err));
        }

        let mut rng = self.rng.clone();
        let resolved = play_resolver::resolve(
            self.setup.team(offense),
            self.setup.team(offense.opponent()),
            request,
            self.momentum.as_modifier(offense),
            &self.setup.config,
            &mut rng,
        );
        let outcome = match resolved {
            Ok(outcome) => outcome,
            Err(err) => return Err(self.reject(request.play_type, err)),
        };

        let result = self.commit(&outcome)?;
        self.rng = rng;
        Ok(result)
    }

    /// Apply an outcome resolved elsewhere (replays, scripted scenarios).
    /// Runs the same state-machine checks as `advance_play`.
    pub fn advance_outcome(&mut self, outcome: &PlayOutcome) -> Result<AdvanceResult> {
        self.commit(outcome)
    }

    /// Spend a timeout for `team`.
    pub fn call_timeout(&mut self, team: TeamSide) -> Result<AdvanceResult> {
        if self.state.is_final {
            return Err(self.reject_timeout(team, EngineError::invalid_call("game is already final")));
        }
        let mut next = self.state.clone();
        if !next.timeouts.spend(team) {
            let err = EngineError::invalid_call(format!("{team:?} has no timeouts left"));
            return Err(self.reject_timeout(team, err));
        }
        self.state = next;
        BoxscoreAggregator::record_timeout(&mut self.boxscore, team);

        let first = self.log.len();
        EventEmitter::timeout(&mut self.log, &self.state, team);
        debug!("timeout {:?}, {} left", team, self.state.timeouts.get(team));
        Ok(AdvanceResult { state: self.state.clone(), events: self.log.since(first).to_vec() })
    }

    /// Play the game out with `caller` choosing every play. Returns the
    /// full event log.
    pub fn advance_to_end<C: PlayCaller + ?Sized>(&mut self, caller: &mut C) -> Result<Vec<GameEvent>> {
        while !self.state.is_final {
            let play_type = caller.call_play(&self.state, &self.setup.config);
            let request = self.request_for(play_type);
            self.advance_play(&request)?;
        }
        Ok(self.log.events().to_vec())
    }

    /// Persistence record, available once the game is final.
    pub fn final_record(&self) -> Option<GameRecord> {
        if !self.state.is_final {
            return None;
        }
        let entry = |side: TeamSide| {
            let team = self.setup.team(side);
            TeamEntry { id: team.id, name: team.name.clone(), abbr: team.abbr.clone() }
        };
        Some(GameRecord {
            schema_version: crate::SCHEMA_VERSION,
            seed: self.setup.seed,
            home: entry(TeamSide::Home),
            away: entry(TeamSide::Away),
            final_state: self.state.clone(),
            winner: self.state.winner(),
            boxscore: self.boxscore.clone(),
            fingerprint: self.log.fingerprint(),
            events: None,
        })
    }

    /// Apply, fold and emit. Every fallible check runs before the boxscore
    /// is touched, so a rejection writes nothing back.
    fn commit(&mut self, outcome: &PlayOutcome) -> Result<AdvanceResult> {
        let checked = drive::apply(&self.state, outcome, &self.setup.config).and_then(|transition| {
            BoxscoreAggregator::check(&self.boxscore, &transition)?;
            Ok(transition)
        });
        let transition = match checked {
            Ok(transition) => transition,
            Err(err) => return Err(self.reject(outcome.play_type, err)),
        };

        // The drive open before the play; anything sealed from here on is new
        let first_drive = self.boxscore.drives.len().saturating_sub(1);
        BoxscoreAggregator::fold(&mut self.boxscore, outcome, &transition)?;
        let momentum = self.momentum.update(outcome, transition.ruling, transition.first_down);

        let first = EventEmitter::play(
            &mut self.log,
            outcome,
            &transition,
            momentum,
            &self.boxscore,
            first_drive,
        );

        debug!(
            "play {}: {:?} {:?} {:+} -> {} {}s {}",
            transition.state.play_index,
            outcome.play_type,
            transition.ruling,
            outcome.yards,
            transition.state.period.label(),
            transition.state.clock,
            transition.state.situation_label()
        );
        if let Some((from, to)) = transition.period_change {
            debug!("period change {} -> {}", from.label(), to.label());
        }

        self.state = transition.state;
        self.momentum = momentum;

        if self.state.is_final {
            info!(
                "game final: {} {} - {} {} after {} plays",
                self.setup.home.name,
                self.state.score.home,
                self.state.score.away,
                self.setup.away.name,
                self.state.play_index
            );
        }

        Ok(AdvanceResult { state: self.state.clone(), events: self.log.since(first).to_vec() })
    }

    /// No play was requested, so nothing is appended to the event log.
    fn reject_timeout(&self, team: TeamSide, err: EngineError) -> EngineError {
        warn!("rejected timeout for {:?} at play {}: {}", team, self.state.play_index, err);
        err
    }

    fn reject(&mut self, play_type: PlayType, err: EngineError) -> EngineError {
        warn!("rejected {:?} at play {}: {}", play_type, self.state.play_index, err);
        EventEmitter::rejected(&mut self.log, &self.state, play_type, err.to_string());
        err
    }
}
