use thiserror::Error;

use crate::models::PlayType;

/// Errors surfaced by the simulation core.
///
/// Everything else (unusual but legal plays, rare scoring sequences) is
/// handled inside the state machine and never reaches the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The requested play (or timeout) is not legal for the current
    /// situation. The caller should pick another call; nothing is substituted.
    #[error(
        "Invalid play request{}: {reason}",
        .play_type.map(|p| format!(" ({p:?})")).unwrap_or_default()
    )]
    InvalidPlayRequest { play_type: Option<PlayType>, reason: String },

    /// The outcome does not match the state it is being applied to
    /// (stale request, wrong phase, inconsistent spot).
    #[error("Illegal transition: {reason}")]
    IllegalTransition { reason: String },

    /// Rejected at game start, before any play is simulated.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl EngineError {
    pub fn invalid_request(play_type: PlayType, reason: impl Into<String>) -> Self {
        EngineError::InvalidPlayRequest { play_type: Some(play_type), reason: reason.into() }
    }

    /// Rejected call that is not a play (timeouts).
    pub fn invalid_call(reason: impl Into<String>) -> Self {
        EngineError::InvalidPlayRequest { play_type: None, reason: reason.into() }
    }

    pub fn illegal(reason: impl Into<String>) -> Self {
        EngineError::IllegalTransition { reason: reason.into() }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        EngineError::Configuration(reason.into())
    }

    /// Whether the game can continue after this error.
    pub fn is_recoverable(&self) -> bool {
        match self {
            EngineError::InvalidPlayRequest { .. } => true,
            // Fatal to the play only; the prior state is kept.
            EngineError::IllegalTransition { .. } => true,
            EngineError::Configuration(_) => false,
        }
    }

    /// Stable code used at the JSON boundary.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidPlayRequest { .. } => "E_INVALID_PLAY",
            EngineError::IllegalTransition { .. } => "E_ILLEGAL_TRANSITION",
            EngineError::Configuration(_) => "E_CONFIG",
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverability() {
        assert!(EngineError::invalid_request(PlayType::Kneel, "not leading").is_recoverable());
        assert!(EngineError::illegal("stale").is_recoverable());
        assert!(!EngineError::config("quarter length").is_recoverable());
    }

    #[test]
    fn test_display_includes_reason() {
        let err = EngineError::invalid_request(PlayType::FieldGoal, "out of range");
        let msg = err.to_string();
        assert!(msg.contains("FieldGoal"));
        assert!(msg.contains("out of range"));
        assert_eq!(err.code(), "E_INVALID_PLAY");
        assert_eq!(msg, "Invalid play request (FieldGoal): out of range");
    }

    #[test]
    fn test_timeout_rejection_has_no_play_type() {
        let err = EngineError::invalid_call("no timeouts left");
        assert_eq!(err.to_string(), "Invalid play request: no timeouts left");
        assert!(err.is_recoverable());
    }
}
