use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "CROSSFILTER_CONFIG";
/// Config file looked up in the working directory when the variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "crossfilter.json";

/// A named dataset offered in the viewer's dataset selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetEntry {
    /// Source identifier handed to the dataset provider (a file name).
    pub name: String,
    pub label: String,
}

/// Viewer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub data_dir: PathBuf,
    pub datasets: Vec<DatasetEntry>,
    pub initial_dataset: Option<String>,
    pub items_per_page: usize,
    pub debounce_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            data_dir: PathBuf::from("data"),
            datasets: vec![
                DatasetEntry {
                    name: "dataset_small.csv".into(),
                    label: "Small Dataset (~10K rows)".into(),
                },
                DatasetEntry {
                    name: "dataset_large.csv".into(),
                    label: "Large Dataset (~50K rows)".into(),
                },
            ],
            initial_dataset: Some("dataset_small.csv".into()),
            items_per_page: 100,
            debounce_ms: 100,
        }
    }
}

impl ViewerConfig {
    /// Read a config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `$CROSSFILTER_CONFIG`, else `./crossfilter.json`; defaults
    /// when that file does not exist.
    pub fn discover() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_or_default(&path)
    }

    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            log::info!("Reading config from {}", path.display());
            Self::load(path)
        } else {
            log::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
