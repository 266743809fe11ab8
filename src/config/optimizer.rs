//! Optimizer settings loading from optimizer.toml
//!
//! This module provides the settings for the external genetic-algorithm
//! optimization service: its endpoint, the request timeout and the search
//! hyper-parameters sent with every request. Settings can be loaded from a
//! TOML file, with the endpoint overridable via the `OPTIMIZER_URL`
//! environment variable; every field has a sensible default.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Settings for the external optimization service
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OptimizerSettings {
    /// Endpoint of the optimization service
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// GA population size sent with every request
    pub population_size: u32,
    /// GA generation count sent with every request
    pub generations: u32,
    /// GA mutation rate sent with every request
    pub mutation_rate: f64,
    /// GA crossover rate sent with every request
    pub crossover_rate: f64,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            endpoint: std::env::var("OPTIMIZER_URL")
                .unwrap_or_else(|_| "http://localhost:8001/optimize".to_string()),
            timeout_secs: 120,
            population_size: 100,
            generations: 500,
            mutation_rate: 0.1,
            crossover_rate: 0.8,
        }
    }
}

/// Loads optimizer settings from a TOML file
///
/// # Arguments
/// * `path` - Path to the optimizer.toml file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<OptimizerSettings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read optimizer settings file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse optimizer.toml: {e}"),
    })
}

/// Loads optimizer settings from the default location (./optimizer.toml),
/// falling back to defaults when the file does not exist.
pub fn load_default_settings() -> Result<OptimizerSettings> {
    if Path::new("optimizer.toml").exists() {
        load_settings("optimizer.toml")
    } else {
        Ok(OptimizerSettings::default())
    }
}
