use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

// Every tunable of the model lives here. Defaults reproduce the classic football setup,
// so a run without a config file is bit-compatible with the reference iteration counts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RatingContext {
    pub k_factor: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
    pub progress_interval: u32,

    pub initial_rating: f64,
    pub initial_std_dev: f64,

    pub score_factor: f64,  // adj(s) = s - s^2 / score_factor
    pub point_unit: f64,    // Largest single score (a touchdown)
}

impl Default for RatingContext {
    fn default() -> Self {
        Self {
            k_factor: 10.0,
            tolerance: 1e-9,
            max_iterations: 25_000,
            progress_interval: 250,

            initial_rating: 50.0,
            initial_std_dev: 1.0,

            score_factor: 400.0,
            point_unit: 6.0,
        }
    }
}

impl RatingContext {
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let data = fs::read_to_string(path).map_err(|source| Error::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&data).map_err(|source| Error::ParseConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }
}
