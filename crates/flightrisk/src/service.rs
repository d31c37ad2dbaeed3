//! The flight risk service.
//!
//! A [`RiskService`] is assembled once at startup: the record and feature
//! tables are joined by row position, the classifier is trained on the
//! labelled features, and from then on the service answers lookups without
//! any further I/O. It is immutable after construction, so it can be shared
//! between threads by reference.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::dataset::{DataSources, FeatureStore, RecordStore};
use crate::error::{Error, Result};
use crate::flight::{round2, FlightRecord, Prediction, RiskLevel, N_CLASSES};
use crate::forest::{sampling, ClassProbabilities, ForestParams, RandomForest};

/// A record joined with its feature row.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightEntry {
    /// Human-readable attributes.
    pub record: FlightRecord,
    /// Model features.
    pub features: Vec<f64>,
}

/// Overview of the loaded data and trained model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceSummary {
    /// Number of flight records.
    pub records: usize,
    /// Feature column names.
    pub features: Vec<String>,
    /// Training rows per risk class.
    pub label_counts: LabelCounts,
    /// Number of trees in the forest.
    pub n_trees: usize,
    /// Per-class training weights.
    pub class_weights: [f64; N_CLASSES],
}

/// Training rows per risk class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct LabelCounts {
    /// Rows labelled LOW.
    pub low: usize,
    /// Rows labelled MEDIUM.
    pub medium: usize,
    /// Rows labelled HIGH.
    pub high: usize,
}

impl LabelCounts {
    /// Count for one class.
    #[must_use]
    pub fn get(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
        }
    }
}

impl From<[usize; N_CLASSES]> for LabelCounts {
    fn from([low, medium, high]: [usize; N_CLASSES]) -> Self {
        Self { low, medium, high }
    }
}

/// Trained classifier plus the joined flight table.
#[derive(Debug, Clone)]
pub struct RiskService {
    entries: Vec<FlightEntry>,
    classifier: RandomForest,
    feature_names: Vec<String>,
    label_counts: LabelCounts,
}

impl RiskService {
    /// Join the two stores and train the classifier.
    ///
    /// # Errors
    ///
    /// - [`Error::MisalignedStores`] if the stores differ in row count
    /// - [`Error::MissingColumn`], [`Error::MissingLabel`] or
    ///   [`Error::InvalidLabel`] if the labels are unusable
    /// - [`Error::EmptyFeatureMatrix`] if there is nothing to train on
    pub fn new(
        records: RecordStore,
        features: FeatureStore,
        params: &ForestParams,
    ) -> Result<Self> {
        if records.len() != features.len() {
            return Err(Error::MisalignedStores {
                records: records.len(),
                features: features.len(),
            });
        }

        let labels = features.labels()?;
        let classifier = RandomForest::fit(features.matrix(), &labels, params)?;
        let label_counts = LabelCounts::from(sampling::class_counts(&labels));

        let (feature_names, matrix) = features.into_parts();
        let entries = records
            .into_records()
            .into_iter()
            .zip(matrix.rows())
            .map(|(record, row)| FlightEntry {
                record,
                features: row.to_vec(),
            })
            .collect::<Vec<_>>();

        info!("Risk service ready: {} flights, {} trees", entries.len(), classifier.n_trees());

        Ok(Self {
            entries,
            classifier,
            feature_names,
            label_counts,
        })
    }

    /// Discover, load and train from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the tables cannot be found or loaded, or if
    /// training fails.
    pub fn from_config(config: &Config) -> Result<Self> {
        let sources = DataSources::discover(&config.data_dir(), &config.data)?;
        Self::from_sources(&sources, config)
    }

    /// Load already located tables and train.
    ///
    /// # Errors
    ///
    /// Returns an error if the tables cannot be loaded or training fails.
    pub fn from_sources(sources: &DataSources, config: &Config) -> Result<Self> {
        info!(
            "Using records {} and features {}",
            sources.records.display(),
            sources.features.display()
        );
        let (records, features) = sources.load(&config.data.label_column)?;
        Self::new(records, features, &ForestParams::from(&config.model))
    }

    /// Number of flights.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no flights.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Joined entry for an identifier.
    #[must_use]
    pub fn entry(&self, record_id: i64) -> Option<&FlightEntry> {
        let idx = usize::try_from(record_id).ok()?;
        self.entries.get(idx)
    }

    /// Class probabilities for an identifier.
    #[must_use]
    pub fn probabilities(&self, record_id: i64) -> Option<ClassProbabilities> {
        self.entry(record_id).map(|entry| self.classifier.predict_proba(&entry.features))
    }

    /// Assess one flight.
    ///
    /// Returns `None` when `record_id` is negative or past the last record.
    #[must_use]
    pub fn predict(&self, record_id: i64) -> Option<Prediction> {
        let entry = self.entry(record_id)?;
        let proba = self.classifier.predict_proba(&entry.features);
        let risk_level = proba.most_likely();

        debug!("Flight {}: {:?} -> {}", record_id, proba.as_array(), risk_level);

        let record = &entry.record;
        Some(Prediction {
            airline: record.airline().to_string(),
            source: record.source.clone(),
            destination: record.destination.clone(),
            wind: round2(record.wind_speed),
            visibility: round2(record.visibility_km),
            storm: record.storm_label().to_string(),
            risk_level,
            crash_probability: proba.percent(RiskLevel::High),
        })
    }

    /// Overview for status reporting.
    #[must_use]
    pub fn summary(&self) -> ServiceSummary {
        ServiceSummary {
            records: self.entries.len(),
            features: self.feature_names.clone(),
            label_counts: self.label_counts,
            n_trees: self.classifier.n_trees(),
            class_weights: *self.classifier.class_weights(),
        }
    }
}
