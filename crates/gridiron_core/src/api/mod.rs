pub mod json_api;

pub use json_api::{
    game_record_schema_json, simulate_game_json, simulate_game_json_with_events, simulate_record,
    GameRequest,
};
