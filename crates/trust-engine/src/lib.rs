//! Trust Game Engine
//!
//! Simulation core for the Iterated Prisoner's Dilemma explainer: payoff
//! rule, built-in strategies, matches, round-robin tournaments and
//! population evolution. Everything here is synchronous, allocation-light
//! and free of global state; randomness comes in through [`SeededRng`].
//!
//! This crate is compiled to:
//! - Native (for the command-line front end)
//! - WASM (for the browser front end, behind the `wasm` feature)

mod config;
mod error;
mod evolution;
mod game;
mod random;
mod strategy;
mod tournament;

#[cfg(feature = "wasm")]
mod wasm;

pub use config::{EngineConfig, EvolutionConfig, MatchConfig, SandboxConfig, TournamentConfig};
pub use error::EngineError;
pub use evolution::{
    average_fitness, evolve_population, EvolutionRun, Population, PopulationEntry, FITNESS_OFFSET,
};
pub use game::{
    play_interactive_round, play_match, play_round, InteractiveMatch, MatchResult, RoundResult,
};
pub use random::SeededRng;
pub use strategy::{
    find_strategy, get_strategy_by_id, AlwaysCheat, AlwaysCooperate, Copycat, Copykitten,
    Detective, Grudger, Move, RandomPlayer, Strategy, StrategyInfo, ALL_STRATEGIES,
    DETECTIVE_OPENING,
};
pub use tournament::{
    round_robin_pairings, run_tournament, tournament_match_count, ScoreEntry, Scoreboard,
};

/// Both put the coin in
pub const BOTH_COOPERATE: u32 = 3;
/// Neither puts the coin in
pub const BOTH_CHEAT: u32 = 1;
/// You cheat, they cooperate
pub const CHEATER_WINS: u32 = 5;
/// You cooperate, they cheat
pub const SUCKER_LOSES: u32 = 0;

/// Payoff for the player making `my_move` against `opponent_move`
pub fn payoff(my_move: Move, opponent_move: Move) -> u32 {
    match (my_move, opponent_move) {
        (Move::Cooperate, Move::Cooperate) => BOTH_COOPERATE,
        (Move::Cheat, Move::Cheat) => BOTH_CHEAT,
        (Move::Cheat, Move::Cooperate) => CHEATER_WINS,
        (Move::Cooperate, Move::Cheat) => SUCKER_LOSES,
    }
}
