//! Reproducible description of a simulation run.
//!
//! A [`Seed`] captures everything needed to replay a run: engine name,
//! parameter overrides, PRNG seed, tick count and the fixed time step. Two
//! identical seeds fed to the same binary produce bit-identical trajectories.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Default fixed time step (60 Hz).
pub const DEFAULT_DT: f32 = 1.0 / 60.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seed {
    pub engine: String,
    #[serde(default = "empty_params")]
    pub params: serde_json::Value,
    pub seed: u64,
    #[serde(default)]
    pub ticks: usize,
    #[serde(default = "default_dt")]
    pub dt: f32,
}

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

fn default_dt() -> f32 {
    DEFAULT_DT
}

impl Seed {
    /// Creates a seed with empty params, zero ticks and a 60 Hz time step.
    pub fn new(engine: &str, seed: u64) -> Self {
        Self {
            engine: engine.to_string(),
            params: empty_params(),
            seed,
            ticks: 0,
            dt: DEFAULT_DT,
        }
    }

    /// Checks the engine name is non-empty, params is an object and `dt` is
    /// finite and non-negative.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.engine.trim().is_empty() {
            return Err(EngineError::invalid_param("engine", "must not be empty"));
        }
        if !self.params.is_object() {
            return Err(EngineError::invalid_param("params", "must be a JSON object"));
        }
        if !self.dt.is_finite() || self.dt < 0.0 {
            return Err(EngineError::InvalidTimeStep(self.dt));
        }
        Ok(())
    }
}
