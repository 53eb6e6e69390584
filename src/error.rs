//! Error types for loading the tourism table and building chart views.

use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading data or computing the dashboard view.
///
/// Every variant is fatal for the page: the dashboard renders the error in place of the
/// charts and nothing is drawn partially.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A column the requested chart reads is absent from the table
    #[error("Required column '{column}' not found in dataset")]
    MissingColumn { column: String },

    /// The data file could not be opened or parsed
    #[error("Failed to load dataset from {}: {source}", path.display())]
    DataLoad {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    /// Two or more headers are identical once surrounding whitespace is trimmed
    #[error("Columns {columns:?} all trim to the same name '{name}'")]
    DuplicateColumn { name: String, columns: Vec<String> },

    /// Polars failed while evaluating an aggregation
    #[error("Aggregation failed: {0}")]
    Polars(#[from] PolarsError),

    /// Chart export failed inside the drawing backend
    #[error("Chart export failed: {0}")]
    Export(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    pub fn missing_column(column: &str) -> Self {
        Self::MissingColumn {
            column: column.to_string(),
        }
    }
}

pub type DashboardResult<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_message_names_the_column() {
        let err = DashboardError::missing_column("Total number of hotels");
        assert_eq!(
            err.to_string(),
            "Required column 'Total number of hotels' not found in dataset"
        );
    }
}
