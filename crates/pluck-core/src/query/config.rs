//! Projection limits.

use crate::error::Error;

/// Limits applied to a single projection.
///
/// The default config is unlimited. Limits are opt-in through the builder
/// methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionConfig {
    /// Maximum number of relation hops in any one path.
    pub max_depth: usize,
    /// Maximum number of root rows the root fetch may return.
    pub max_root_rows: usize,
    /// Maximum total rows across all batched relation fetches.
    pub max_fetched_rows: usize,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self::unlimited()
    }
}

impl ProjectionConfig {
    /// Create a config with custom limits.
    pub fn new(max_depth: usize, max_root_rows: usize, max_fetched_rows: usize) -> Self {
        Self {
            max_depth,
            max_root_rows,
            max_fetched_rows,
        }
    }

    /// Create a config without limits.
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
            max_root_rows: usize::MAX,
            max_fetched_rows: usize::MAX,
        }
    }

    /// Set the maximum path depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the maximum number of root rows.
    pub fn with_max_root_rows(mut self, max_root_rows: usize) -> Self {
        self.max_root_rows = max_root_rows;
        self
    }

    /// Set the maximum number of rows fetched across relation batches.
    pub fn with_max_fetched_rows(mut self, max_fetched_rows: usize) -> Self {
        self.max_fetched_rows = max_fetched_rows;
        self
    }

    pub(crate) fn check_depth(&self, path: &str, depth: usize) -> Result<(), Error> {
        if depth > self.max_depth {
            return Err(Error::BudgetExceeded(format!(
                "path '{}' has depth {}, exceeding limit of {}",
                path, depth, self.max_depth
            )));
        }
        Ok(())
    }

    pub(crate) fn check_root_rows(&self, count: usize) -> Result<(), Error> {
        if count > self.max_root_rows {
            return Err(Error::BudgetExceeded(format!(
                "root fetch returned {} rows, exceeding limit of {}",
                count, self.max_root_rows
            )));
        }
        Ok(())
    }

    pub(crate) fn check_fetched_rows(&self, count: usize) -> Result<(), Error> {
        if count > self.max_fetched_rows {
            return Err(Error::BudgetExceeded(format!(
                "relation fetches returned {} rows, exceeding limit of {}",
                count, self.max_fetched_rows
            )));
        }
        Ok(())
    }
}
