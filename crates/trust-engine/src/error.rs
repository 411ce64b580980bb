//! Engine error type

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("unknown strategy id `{id}`")]
    UnknownStrategy { id: String },

    #[error("strategy `{id}` appears more than once in the population")]
    DuplicateStrategy { id: String },

    #[error("match already finished after {total_rounds} rounds")]
    MatchComplete { total_rounds: usize },

    #[error("invalid move `{value}` (expected cooperate or cheat)")]
    InvalidMove { value: String },
}
