//! Configuration loading
//!
//! Reads an optional TOML file into [`EngineConfig`]. Missing sections and
//! fields fall back to the engine defaults.

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use log::info;
use trust_engine::EngineConfig;

pub fn load(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };

    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    parse(&content).with_context(|| format!("parsing config file {}", path.display()))
}

pub fn parse(content: &str) -> Result<EngineConfig> {
    Ok(toml::from_str(content)?)
}

/// Flag beats file; with neither, take one from the clock and log it
pub fn resolve_seed(flag: Option<u64>, config: &EngineConfig) -> u64 {
    if let Some(seed) = flag.or(config.seed) {
        return seed;
    }

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    info!("No seed given, using {} (pass --seed {} to replay)", seed, seed);
    seed
}
