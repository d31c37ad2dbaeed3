//! Error types for flightrisk.
//!
//! Every error here is a startup condition: once the [`RiskService`] is
//! assembled, predictions cannot fail. An out-of-range record identifier is
//! reported as `None`, not as an error.
//!
//! [`RiskService`]: crate::service::RiskService

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for flightrisk operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Data Errors ===
    /// No file in the data directory matched the naming convention.
    #[error("no file matching '{prefix}*{suffix}' in {dir}")]
    DataFileNotFound {
        /// Directory that was searched.
        dir: PathBuf,
        /// Required file name prefix.
        prefix: String,
        /// Required file name suffix.
        suffix: String,
    },

    /// A table could not be parsed.
    #[error("failed to read table {path}: {source}")]
    TableRead {
        /// Path of the table file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: csv::Error,
    },

    /// A required column is absent from a table.
    #[error("{table} table has no '{column}' column")]
    MissingColumn {
        /// Which table was inspected.
        table: &'static str,
        /// Name of the missing column.
        column: String,
    },

    /// A cell could not be interpreted.
    #[error("{table} table row {row}, column '{column}': invalid value '{value}'")]
    InvalidValue {
        /// Which table the cell belongs to.
        table: &'static str,
        /// Zero-based data row.
        row: usize,
        /// Column name.
        column: String,
        /// The raw cell text.
        value: String,
    },

    /// The record and feature tables do not line up row for row.
    #[error("record table has {records} rows but feature table has {features}")]
    MisalignedStores {
        /// Rows in the record table.
        records: usize,
        /// Rows in the feature table.
        features: usize,
    },

    // === Training Errors ===
    /// The label column has no value for a row.
    #[error("label column '{column}' is empty at row {row}")]
    MissingLabel {
        /// Label column name.
        column: String,
        /// Zero-based data row.
        row: usize,
    },

    /// A label is not one of the known risk classes.
    #[error("label '{value}' at row {row} is not a risk class (expected 0, 1 or 2)")]
    InvalidLabel {
        /// Zero-based data row.
        row: usize,
        /// The raw label text.
        value: String,
    },

    /// The feature matrix has no rows or no columns.
    #[error("feature matrix is empty ({rows} rows x {columns} columns)")]
    EmptyFeatureMatrix {
        /// Number of rows.
        rows: usize,
        /// Number of feature columns.
        columns: usize,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for flightrisk operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create an invalid cell error.
    #[must_use]
    pub fn invalid_value(
        table: &'static str,
        row: usize,
        column: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            table,
            row,
            column: column.into(),
            value: value.into(),
        }
    }

    /// Check if this error comes from the input tables rather than from
    /// configuration or the environment.
    #[must_use]
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::DataFileNotFound { .. }
                | Self::TableRead { .. }
                | Self::MissingColumn { .. }
                | Self::InvalidValue { .. }
                | Self::MisalignedStores { .. }
                | Self::MissingLabel { .. }
                | Self::InvalidLabel { .. }
                | Self::EmptyFeatureMatrix { .. }
        )
    }
}
