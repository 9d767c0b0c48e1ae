//! Parallel slate simulation
//!
//! Each game gets its own session, RNG, boxscore and event log; nothing is
//! shared between games, so results match a sequential run.

use rayon::prelude::*;

use super::config::GameSetup;
use super::play_caller::SituationalPlayCaller;
use super::session::GameSession;
use crate::error::{EngineError, Result};
use crate::models::GameRecord;

/// Play one game to the end with the default play caller.
pub fn simulate_game(setup: GameSetup) -> Result<GameRecord> {
    let mut session = GameSession::start_game(setup)?;
    session.advance_to_end(&mut SituationalPlayCaller::new())?;
    session.final_record().ok_or_else(|| EngineError::illegal("game did not reach a final state"))
}

/// Simulate a slate of independent games. Results are in input order.
pub fn simulate_slate(setups: Vec<GameSetup>) -> Vec<Result<GameRecord>> {
    // Small slates are not worth the thread hand-off
    if setups.len() > 2 {
        setups.into_par_iter().map(simulate_game).collect()
    } else {
        setups.into_iter().map(simulate_game).collect()
    }
}
