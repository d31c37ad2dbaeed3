//! Input tables for flightrisk.
//!
//! Two CSV tables feed the service: the record table with human-readable
//! flight attributes and the feature table the classifier is trained on.
//! They are aligned row for row; the row position is the record identifier.

pub mod discovery;
pub mod features;
pub mod records;
pub mod table;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::DataConfig;
use crate::error::Result;

pub use discovery::find_table;
pub use features::{FeatureMatrix, FeatureStore};
pub use records::RecordStore;
pub use table::Table;

/// Resolved locations of the two input tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    /// Record table path.
    pub records: PathBuf,
    /// Feature table path.
    pub features: PathBuf,
}

impl DataSources {
    /// Locate both tables in `dir` using the configured prefixes and suffix.
    ///
    /// # Errors
    ///
    /// Returns an error if either table cannot be found.
    pub fn discover(dir: &Path, config: &DataConfig) -> Result<Self> {
        let records = find_table(dir, &config.records_prefix, &config.suffix)?;
        let features = find_table(dir, &config.features_prefix, &config.suffix)?;
        Ok(Self { records, features })
    }

    /// Read and decode both tables.
    ///
    /// Row alignment is not checked here; that is the service's job.
    ///
    /// # Errors
    ///
    /// Returns an error if either table is unreadable or malformed.
    pub fn load(&self, label_column: &str) -> Result<(RecordStore, FeatureStore)> {
        let record_table = Table::from_path("record", &self.records)?;
        log_table(&record_table);
        let records = RecordStore::from_table(&record_table)?;

        let feature_table = Table::from_path("feature", &self.features)?;
        log_table(&feature_table);
        let features = FeatureStore::from_table(&feature_table, label_column)?;

        info!(
            "Loaded {} records and {} feature rows ({} features)",
            records.len(),
            features.len(),
            features.names().len()
        );
        Ok((records, features))
    }
}

fn log_table(table: &Table) {
    debug!(
        "{} table {}: {} rows, {} columns",
        table.name(),
        table.path().display(),
        table.len(),
        table.headers().len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const RECORDS: &str = "Airline,Source_Airport_Full,Destination_Airport_Full,Wind_Speed,Visibility_km,Storm\n\
                           0,Delhi,Mumbai,10,5,0\n\
                           4,Goa,Pune,40,0.8,1\n";
    const FEATURES: &str = "Wind,Vis,Storm,Risk_Level_Num\n-1.0,0.5,0,0\n1.0,-0.5,1,2\n";

    #[test]
    fn test_discover_and_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Aircraft_Cleaned_Preprocessed.csv"), RECORDS).unwrap();
        std::fs::write(dir.path().join("Aircraft_Cleaned_Standardized.csv"), FEATURES).unwrap();

        let config = DataConfig::default();
        let sources = DataSources::discover(dir.path(), &config).unwrap();
        assert!(sources.records.ends_with("Aircraft_Cleaned_Preprocessed.csv"));
        assert!(sources.features.ends_with("Aircraft_Cleaned_Standardized.csv"));

        let (records, features) = sources.load(&config.label_column).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(features.len(), 2);
        assert_eq!(features.names(), ["Wind", "Vis", "Storm"]);
    }

    #[test]
    fn test_discover_missing_feature_table() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Aircraft_Cleaned_Preprocessed.csv"), RECORDS).unwrap();

        let err = DataSources::discover(dir.path(), &DataConfig::default()).unwrap_err();
        match err {
            Error::DataFileNotFound { prefix, .. } => {
                assert_eq!(prefix, "Aircraft_Cleaned_Standardized");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
