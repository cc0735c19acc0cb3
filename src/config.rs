use std::env;
use std::path::{Path, PathBuf};

use anyhow::Result;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. CLI flags
/// take precedence over everything here.
pub struct Config {
    /// Explicit model file path (PEAKVEC_MODEL_PATH). When unset, the model
    /// lands in the cache directory under a name derived from the input file.
    pub model_path: Option<PathBuf>,
    /// Training RNG seed (PEAKVEC_SEED, default 1).
    pub seed: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let seed = match env::var("PEAKVEC_SEED") {
            Ok(v) => v.parse().map_err(|_| {
                anyhow::anyhow!("PEAKVEC_SEED must be an unsigned integer, got: {v}")
            })?,
            Err(_) => 1,
        };

        Ok(Self {
            model_path: env::var("PEAKVEC_MODEL_PATH").map(PathBuf::from).ok(),
            seed,
        })
    }

    /// Where a model for `input` should live when no explicit path is set:
    /// `<data dir>/peakvec/<input stem>.model.json`.
    pub fn model_path_for(&self, input: &Path) -> PathBuf {
        if let Some(path) = &self.model_path {
            return path.clone();
        }
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "spectra".to_string());
        default_model_dir().join(format!("{stem}.model.json"))
    }
}

/// Platform data directory for trained models.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("peakvec"))
        .unwrap_or_else(|| PathBuf::from("./peakvec-models"))
}
