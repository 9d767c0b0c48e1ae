use schemars::schema_for;
use serde::{Deserialize, Serialize};

use crate::engine::{GameSession, GameSetup, SituationalPlayCaller};
use crate::error::EngineError;
use crate::models::GameRecord;
use crate::SCHEMA_VERSION;

pub mod error_codes {
    pub const INVALID_JSON: &str = "E_JSON";
    pub const SCHEMA_VERSION: &str = "E_SCHEMA_VERSION";
    pub const SERIALIZE: &str = "E_SERIALIZE";
}

fn err_code(code: &str, message: impl std::fmt::Display) -> String {
    format!("{code}: {message}")
}

fn engine_err(err: EngineError) -> String {
    err_code(err.code(), err)
}

/// Game request: a `GameSetup` plus the request schema version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRequest {
    pub schema_version: u32,
    #[serde(flatten)]
    pub setup: GameSetup,
}

impl GameRequest {
    pub fn new(setup: GameSetup) -> Self {
        Self { schema_version: SCHEMA_VERSION, setup }
    }
}

fn parse_request(request_json: &str) -> Result<GameSetup, String> {
    let request: GameRequest = serde_json::from_str(request_json)
        .map_err(|e| err_code(error_codes::INVALID_JSON, format!("invalid game request: {e}")))?;
    if request.schema_version != SCHEMA_VERSION {
        return Err(err_code(
            error_codes::SCHEMA_VERSION,
            format!(
                "unsupported schema version {} (expected {SCHEMA_VERSION})",
                request.schema_version
            ),
        ));
    }
    Ok(request.setup)
}

/// Play a full game with the default play caller.
pub fn simulate_record(setup: GameSetup, with_events: bool) -> Result<GameRecord, String> {
    let mut session = GameSession::start_game(setup).map_err(engine_err)?;
    let events = session
        .advance_to_end(&mut SituationalPlayCaller::new())
        .map_err(engine_err)?;
    let mut record = session
        .final_record()
        .ok_or_else(|| engine_err(EngineError::illegal("game did not reach a final state")))?;
    if with_events {
        record.events = Some(events);
    }
    Ok(record)
}

fn to_json(record: &GameRecord) -> Result<String, String> {
    serde_json::to_string(record).map_err(|e| err_code(error_codes::SERIALIZE, e))
}

/// Main entry point: JSON game request in, JSON `GameRecord` out.
pub fn simulate_game_json(request_json: &str) -> Result<String, String> {
    let setup = parse_request(request_json)?;
    to_json(&simulate_record(setup, false)?)
}

/// Same as [`simulate_game_json`], with the full event log in the record.
pub fn simulate_game_json_with_events(request_json: &str) -> Result<String, String> {
    let setup = parse_request(request_json)?;
    to_json(&simulate_record(setup, true)?)
}

/// JSON Schema of the persistence record.
pub fn game_record_schema_json() -> Result<String, String> {
    let schema = schema_for!(GameRecord);
    serde_json::to_string_pretty(&schema).map_err(|e| err_code(error_codes::SERIALIZE, e))
}
