//! WASM bindings for the browser front end

#![cfg(feature = "wasm")]

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::{
    evolve_population, get_strategy_by_id, play_interactive_round, play_match, run_tournament,
    Move, Population, SeededRng, Strategy, StrategyInfo, ALL_STRATEGIES,
};

fn lookup(id: &str) -> Result<&'static dyn Strategy, JsError> {
    get_strategy_by_id(id).ok_or_else(|| JsError::new(&format!("Unknown strategy: {}", id)))
}

/// Seed bytes from the caller, or a fresh seed from `Math.random`
fn make_rng(seed: Option<Vec<u8>>) -> Result<SeededRng, JsError> {
    match seed {
        Some(bytes) => {
            let seed_arr: [u8; 32] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| JsError::new("Seed must be exactly 32 bytes"))?;
            Ok(SeededRng::new(&seed_arr, 0))
        }
        None => {
            let fresh = (js_sys::Math::random() * u32::MAX as f64) as u64
                ^ ((js_sys::Date::now() as u64) << 20);
            Ok(SeededRng::from_u64(fresh))
        }
    }
}

/// Negative round counts from JS mean "no rounds"
fn clamp_count(n: i32) -> usize {
    n.max(0) as usize
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// All built-in strategies with their display metadata
#[wasm_bindgen]
pub fn get_strategies() -> Result<JsValue, JsError> {
    let infos: Vec<StrategyInfo> = ALL_STRATEGIES.iter().map(|s| *s.info()).collect();
    to_js(&infos)
}

/// Replay a match with full round-by-round details
///
/// # Returns
/// Serialized MatchResult
#[wasm_bindgen]
pub fn replay_match(
    player1_id: &str,
    player2_id: &str,
    num_rounds: i32,
    seed: Option<Vec<u8>>,
) -> Result<JsValue, JsError> {
    let player1 = lookup(player1_id)?;
    let player2 = lookup(player2_id)?;
    let mut rng = make_rng(seed)?;

    let result = play_match(player1, player2, clamp_count(num_rounds), &mut rng);
    to_js(&result)
}

#[derive(Deserialize)]
struct InteractiveState {
    human_history: Vec<Move>,
    opponent_history: Vec<Move>,
}

/// Play one sandbox round: the human's move against a built-in opponent.
///
/// `histories` is `{human_history: [...], opponent_history: [...]}`; the
/// round index is taken from the length of the human history.
#[wasm_bindgen]
pub fn play_sandbox_round(
    human_move: &str,
    opponent_id: &str,
    histories: JsValue,
    seed: Option<Vec<u8>>,
) -> Result<JsValue, JsError> {
    let human_move: Move = human_move
        .parse()
        .map_err(|e: crate::EngineError| JsError::new(&e.to_string()))?;
    let opponent = lookup(opponent_id)?;
    let state: InteractiveState = serde_wasm_bindgen::from_value(histories)
        .map_err(|e| JsError::new(&format!("Invalid histories: {}", e)))?;
    let mut rng = make_rng(seed)?;

    let result = play_interactive_round(
        human_move,
        opponent,
        &state.human_history,
        &state.opponent_history,
        state.human_history.len(),
        &mut rng,
    );
    to_js(&result)
}

/// Run the full-catalog tournament and return standings, best first
#[wasm_bindgen]
pub fn get_tournament_standings(
    rounds_per_match: i32,
    matches_per_pairing: i32,
    seed: Option<Vec<u8>>,
) -> Result<JsValue, JsError> {
    let mut rng = make_rng(seed)?;
    let board = run_tournament(
        &ALL_STRATEGIES,
        clamp_count(rounds_per_match),
        clamp_count(matches_per_pairing),
        &mut rng,
    );
    to_js(&board.standings())
}

/// Uniform starting population over the catalog
#[wasm_bindgen]
pub fn get_initial_population(size: u32) -> Result<JsValue, JsError> {
    to_js(&Population::uniform(&ALL_STRATEGIES, size))
}

/// Advance a population (array of `{strategy_id, count}`) by one generation
#[wasm_bindgen]
pub fn step_population(
    population: JsValue,
    rounds_per_match: i32,
    seed: Option<Vec<u8>>,
) -> Result<JsValue, JsError> {
    let population: Population = serde_wasm_bindgen::from_value(population)
        .map_err(|e| JsError::new(&format!("Invalid population: {}", e)))?;
    let mut rng = make_rng(seed)?;

    let next = evolve_population(
        &population,
        &ALL_STRATEGIES,
        clamp_count(rounds_per_match),
        &mut rng,
    )
    .map_err(|e| JsError::new(&e.to_string()))?;
    to_js(&next)
}
