//! Simulation parameters
//!
//! Defaults mirror the explainer's screens: 10-round matches, 5 matches per
//! tournament pairing, 30 generations over a population of 100.

use serde::{Deserialize, Serialize};

/// A single exhibition match
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub rounds: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { rounds: 10 }
    }
}

/// Round-robin tournament
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    pub rounds_per_match: usize,
    pub matches_per_pairing: usize,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            rounds_per_match: 10,
            matches_per_pairing: 5,
        }
    }
}

/// Population dynamics
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub rounds_per_match: usize,
    pub max_generations: u32,
    /// Target size of the uniform starting population
    pub population_size: u32,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            rounds_per_match: 10,
            max_generations: 30,
            population_size: 100,
        }
    }
}

/// Human-vs-strategy sandbox
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub total_rounds: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self { total_rounds: 10 }
    }
}

/// Everything a front end can tune
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed seed for reproducible runs; `None` lets the front end pick one
    pub seed: Option<u64>,
    #[serde(rename = "match")]
    pub single_match: MatchConfig,
    pub tournament: TournamentConfig,
    pub evolution: EvolutionConfig,
    pub sandbox: SandboxConfig,
}
