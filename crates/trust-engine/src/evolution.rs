//! Population dynamics
//!
//! One generation: every strategy present plays a match against every
//! strategy present (itself included), its fitness is the population-weighted
//! average of those scores, and the population is redistributed in
//! proportion to `max(0, fitness + FITNESS_OFFSET) × count`. The total head
//! count never changes.

use std::fmt;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::config::EvolutionConfig;
use crate::error::EngineError;
use crate::game::play_match;
use crate::random::SeededRng;
use crate::strategy::{find_strategy, Strategy};

/// Added to average fitness before selection. Changing it changes outcomes.
pub const FITNESS_OFFSET: f64 = 10.0;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationEntry {
    pub strategy_id: String,
    pub count: u32,
}

impl PopulationEntry {
    pub fn new(strategy_id: impl Into<String>, count: u32) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            count,
        }
    }
}

/// Head count per strategy. Strategy ids are unique.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PopulationEntry>", into = "Vec<PopulationEntry>")]
pub struct Population {
    entries: Vec<PopulationEntry>,
}

impl Population {
    pub fn new(entries: Vec<PopulationEntry>) -> Result<Self, EngineError> {
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|e| e.strategy_id == entry.strategy_id) {
                return Err(EngineError::DuplicateStrategy {
                    id: entry.strategy_id.clone(),
                });
            }
        }
        Ok(Self { entries })
    }

    /// Equal shares: each strategy gets `round(size / n)` members, so the
    /// total may differ slightly from `size` (100 over 7 strategies is 98).
    pub fn uniform(strategies: &[&dyn Strategy], size: u32) -> Self {
        let mut entries: Vec<PopulationEntry> = Vec::with_capacity(strategies.len());
        if strategies.is_empty() {
            return Self { entries };
        }

        let share = (size as f64 / strategies.len() as f64).round() as u32;
        for s in strategies {
            if entries.iter().all(|e| e.strategy_id != s.id()) {
                entries.push(PopulationEntry::new(s.id(), share));
            }
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[PopulationEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &PopulationEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.count as u64).sum()
    }

    pub fn count_of(&self, strategy_id: &str) -> u32 {
        self.entries
            .iter()
            .find(|e| e.strategy_id == strategy_id)
            .map_or(0, |e| e.count)
    }

    /// Fraction of the population playing `strategy_id`
    pub fn share(&self, strategy_id: &str) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.count_of(strategy_id) as f64 / total as f64
    }

    /// Largest group first; equal counts keep entry order
    pub fn by_count_desc(&self) -> Vec<&PopulationEntry> {
        let mut sorted: Vec<&PopulationEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.count.cmp(&a.count));
        sorted
    }

    /// The most populous strategy, first one on ties. `None` if nobody is left.
    pub fn leader(&self) -> Option<&PopulationEntry> {
        self.entries
            .iter()
            .filter(|e| e.count > 0)
            .fold(None, |best: Option<&PopulationEntry>, e| match best {
                Some(b) if b.count >= e.count => Some(b),
                _ => Some(e),
            })
    }
}

impl TryFrom<Vec<PopulationEntry>> for Population {
    type Error = EngineError;

    fn try_from(entries: Vec<PopulationEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<Population> for Vec<PopulationEntry> {
    fn from(population: Population) -> Self {
        population.entries
    }
}

/// `id=count` pairs in entry order
impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", entry.strategy_id, entry.count)?;
        }
        Ok(())
    }
}

/// Population-weighted average match score for each entry, aligned with
/// `population.entries()`.
///
/// Against its own kind an individual faces `count - 1` others; against any
/// other strategy it faces that strategy's full count. Entries with a zero
/// count, and entries with nobody to play, get 0.
pub fn average_fitness(
    population: &Population,
    strategies: &[&dyn Strategy],
    rounds_per_match: usize,
    rng: &SeededRng,
) -> Result<Vec<f64>, EngineError> {
    let resolved = population
        .iter()
        .map(|entry| {
            if entry.count == 0 {
                return Ok(None);
            }
            find_strategy(strategies, &entry.strategy_id)
                .map(Some)
                .ok_or_else(|| EngineError::UnknownStrategy {
                    id: entry.strategy_id.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut fitness = vec![0.0; population.len()];
    let mut match_index = 0u32;

    for (i, player) in resolved.iter().enumerate() {
        let Some(player) = player else { continue };
        let mut weighted_score = 0.0;
        let mut total_weight = 0u64;

        for (j, opponent) in resolved.iter().enumerate() {
            let Some(opponent) = opponent else { continue };
            let count = population.entries[j].count as u64;
            let weight = if i == j { count - 1 } else { count };
            if weight == 0 {
                continue;
            }

            let mut match_rng = rng.fork(match_index);
            match_index = match_index.wrapping_add(1);
            let result = play_match(*player, *opponent, rounds_per_match, &mut match_rng);

            weighted_score += result.player1_total_score as f64 * weight as f64;
            total_weight += weight;
        }

        if total_weight > 0 {
            fitness[i] = weighted_score / total_weight as f64;
        }
        trace!("Fitness {}: {:.3}", population.entries[i].strategy_id, fitness[i]);
    }

    Ok(fitness)
}

/// Advance the population by exactly one generation.
///
/// The total head count is conserved: independent rounding drift is
/// absorbed by the largest new group (first one on ties). A population whose
/// selection mass is zero (empty, or nobody alive) comes back unchanged.
pub fn evolve_population(
    population: &Population,
    strategies: &[&dyn Strategy],
    rounds_per_match: usize,
    rng: &mut SeededRng,
) -> Result<Population, EngineError> {
    let stream = rng.next_u32();
    let generation_rng = rng.fork(stream);

    let fitness = average_fitness(population, strategies, rounds_per_match, &generation_rng)?;
    let weights: Vec<f64> = fitness
        .iter()
        .map(|f| (f + FITNESS_OFFSET).max(0.0))
        .collect();

    let total_mass: f64 = population
        .iter()
        .zip(&weights)
        .map(|(entry, w)| w * entry.count as f64)
        .sum();

    if total_mass == 0.0 {
        return Ok(population.clone());
    }

    let total = population.total();
    let mut entries: Vec<PopulationEntry> = population
        .iter()
        .zip(&weights)
        .map(|(entry, w)| {
            let proportion = (w * entry.count as f64) / total_mass;
            let count = (proportion * total as f64).round().max(0.0) as u32;
            PopulationEntry::new(entry.strategy_id.clone(), count)
        })
        .collect();

    absorb_rounding_drift(&mut entries, total);

    let next = Population { entries };
    debug!("Next generation: {}", next);
    Ok(next)
}

/// Bring the head count back to `target`.
///
/// A shortfall goes to the largest group, first one on ties. An excess is
/// taken from the largest group first and then from the next largest, so no
/// count goes below zero.
fn absorb_rounding_drift(entries: &mut [PopulationEntry], target: u64) {
    let new_total: u64 = entries.iter().map(|e| e.count as u64).sum();
    if new_total == target || entries.is_empty() {
        return;
    }

    // stable sort keeps entry order on ties
    let mut by_size: Vec<usize> = (0..entries.len()).collect();
    by_size.sort_by(|a, b| entries[*b].count.cmp(&entries[*a].count));

    if new_total < target {
        let largest = by_size[0];
        let shortfall = target - new_total;
        debug!("Rounding correction of +{} applied to {}", shortfall, entries[largest].strategy_id);
        entries[largest].count += shortfall as u32;
        return;
    }

    let mut excess = new_total - target;
    for i in by_size {
        if excess == 0 {
            break;
        }
        let taken = excess.min(entries[i].count as u64);
        if taken == 0 {
            continue;
        }
        debug!("Rounding correction of -{} applied to {}", taken, entries[i].strategy_id);
        entries[i].count -= taken as u32;
        excess -= taken;
    }
}

/// A sequence of generations with a cap, keeping the full history.
#[derive(Debug)]
pub struct EvolutionRun<'a> {
    strategies: Vec<&'a dyn Strategy>,
    rounds_per_match: usize,
    max_generations: u32,
    history: Vec<Population>,
    rng: SeededRng,
}

impl<'a> EvolutionRun<'a> {
    pub fn new(
        initial: Population,
        strategies: &[&'a dyn Strategy],
        config: &EvolutionConfig,
        rng: SeededRng,
    ) -> Self {
        Self {
            strategies: strategies.to_vec(),
            rounds_per_match: config.rounds_per_match,
            max_generations: config.max_generations,
            history: vec![initial],
            rng,
        }
    }

    /// Start from a uniform population of `config.population_size`
    pub fn uniform(strategies: &[&'a dyn Strategy], config: &EvolutionConfig, rng: SeededRng) -> Self {
        let initial = Population::uniform(strategies, config.population_size);
        Self::new(initial, strategies, config, rng)
    }

    pub fn generation(&self) -> u32 {
        (self.history.len() - 1) as u32
    }

    pub fn max_generations(&self) -> u32 {
        self.max_generations
    }

    pub fn is_done(&self) -> bool {
        self.generation() >= self.max_generations
    }

    pub fn current(&self) -> &Population {
        // history always holds the initial population
        &self.history[self.history.len() - 1]
    }

    /// Every generation so far, starting with the initial population
    pub fn history(&self) -> &[Population] {
        &self.history
    }

    pub fn leader(&self) -> Option<&PopulationEntry> {
        self.current().leader()
    }

    /// Advance one generation. Returns `None` once the cap is reached.
    pub fn step(&mut self) -> Result<Option<&Population>, EngineError> {
        if self.is_done() {
            return Ok(None);
        }

        let mut generation_rng = self.rng.fork(self.generation());
        let next = evolve_population(
            self.current(),
            &self.strategies,
            self.rounds_per_match,
            &mut generation_rng,
        )?;

        debug!("Generation {} of {}", self.generation() + 1, self.max_generations);

        self.history.push(next);
        Ok(Some(self.current()))
    }

    /// Play all remaining generations
    pub fn run_to_end(&mut self) -> Result<&Population, EngineError> {
        while self.step()?.is_some() {}
        Ok(self.current())
    }
}
