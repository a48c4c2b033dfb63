use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod compress;
pub mod config;
pub mod measurements;
pub mod reference;

pub use config::load_params;
pub use measurements::{group_by_patient, load_visits};
pub use reference::load_reference_rows;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{}: missing required column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("{}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Header column lookup, case-insensitive over a list of accepted names.
pub(crate) struct Header {
    names: Vec<String>,
}

impl Header {
    pub(crate) fn parse(line: &str) -> Self {
        let names = line
            .trim_end_matches(['\r', '\n'])
            .split('\t')
            .map(|s| s.trim().trim_start_matches('\u{feff}').to_ascii_lowercase())
            .collect();
        Self { names }
    }

    pub(crate) fn find(&self, aliases: &[&str]) -> Option<usize> {
        self.names
            .iter()
            .position(|n| aliases.iter().any(|a| n == a))
    }

    pub(crate) fn require(&self, path: &Path, column: &'static str, aliases: &[&str]) -> Result<usize, InputError> {
        self.find(aliases).ok_or_else(|| InputError::MissingColumn {
            path: path.to_path_buf(),
            column,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
