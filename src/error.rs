use std::path::PathBuf;

use thiserror::Error;

/// Why a dataset could not be adopted. The store keeps its previous state
/// whenever one of these is returned.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Empty input, header-only input, or every data line malformed.
    #[error("No data found in the CSV input")]
    EmptyDataset,

    #[error("Failed to load {name}")]
    Acquisition {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Loading {name} was interrupted before any data arrived")]
    Disconnected { name: String },
}

/// Rejected selection updates. State is left untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("no dataset is loaded")]
    NoDataset,

    #[error("unknown column `{0}`")]
    UnknownColumn(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
