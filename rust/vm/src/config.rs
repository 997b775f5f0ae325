//! Explorer configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::loader::read_document;

/// Settings for the exploration scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Worker threads used by `step_all` and `run_all`.
    pub workers: usize,
    /// Stop `run_all` as soon as a round produces a new output class.
    pub stop_on_halt: bool,
    /// Steps each worker may take per `run_all` round before shards are
    /// rebalanced.
    pub round_budget: u64,
    /// Global cap on steps taken by one `run`/`run_all` call.
    pub step_limit: Option<u64>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get),
            stop_on_halt: false,
            round_budget: 4096,
            step_limit: None,
        }
    }
}

impl ExplorerConfig {
    /// Load a configuration from a `.toml` or `.json` file. Missing keys
    /// take their defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        read_document(path)
    }

    /// Same configuration with `workers` threads.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}
