//! Executor module for vectorized expression evaluation.
//!
//! This module holds the executor configuration and the vectorized batch
//! machinery built on it.

pub mod vectorized;

use serde::{Deserialize, Serialize};

use self::vectorized::DEFAULT_BATCH_SIZE;

/// Configuration for the vectorized executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Number of rows per batch for vectorized execution.
    pub batch_size: usize,
    /// Compile every cast as an adaptor step, even when a kernel exists.
    pub force_adaptor: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            force_adaptor: false,
        }
    }
}

impl ExecutorConfig {
    /// Creates a new executor configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets whether casts are forced through adaptor steps.
    #[must_use]
    pub fn with_force_adaptor(mut self, force_adaptor: bool) -> Self {
        self.force_adaptor = force_adaptor;
        self
    }
}
