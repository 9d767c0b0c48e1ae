pub mod config;
pub mod drive;
pub mod events;
pub mod momentum;
pub mod play_caller;
pub mod play_resolver;
pub mod probability;
pub mod session;
pub mod slate;
pub mod stats;

#[cfg(test)]
mod scenario_tests;

pub use config::{GameConfig, GameSetup, OvertimeMode, StartingSituation};
pub use drive::{Transition, TRY_YARD_LINE, TWO_MINUTE_MARK};
pub use events::{EventEmitter, EventLog};
pub use momentum::{MomentumState, MomentumTrend};
pub use play_caller::{PlayCaller, SituationalPlayCaller};
pub use play_resolver::{check_legality, resolve, PlayModifiers};
pub use session::{AdvanceResult, GameSession};
pub use slate::{simulate_game, simulate_slate};
pub use stats::BoxscoreAggregator;
