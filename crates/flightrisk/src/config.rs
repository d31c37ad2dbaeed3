//! Configuration management for flightrisk.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "flightrisk";

/// Environment variable prefix.
const ENV_PREFIX: &str = "FLIGHTRISK_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FLIGHTRISK_`, sections split on `__`,
///    e.g. `FLIGHTRISK_MODEL__N_TREES=100`)
/// 2. TOML config file at `~/.config/flightrisk/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input table configuration.
    pub data: DataConfig,
    /// Classifier training configuration.
    pub model: ModelConfig,
}

/// Where the record and feature tables live and how they are named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding both tables.
    /// Defaults to `~/.local/share/flightrisk`
    pub dir: Option<PathBuf>,
    /// File name prefix of the human-readable record table.
    pub records_prefix: String,
    /// File name prefix of the model feature table.
    pub features_prefix: String,
    /// File name suffix shared by both tables.
    pub suffix: String,
    /// Name of the risk label column in the feature table.
    pub label_column: String,
}

/// Random forest training parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Number of trees in the ensemble.
    pub n_trees: usize,
    /// Master seed for bootstrap and feature sampling.
    pub seed: u64,
    /// Weight classes inversely to their frequency.
    pub class_balance: bool,
    /// Maximum tree depth. Unlimited when unset.
    pub max_depth: Option<usize>,
    /// Minimum number of distinct rows a node needs to be split.
    pub min_samples_split: usize,
    /// Features drawn per split. `floor(sqrt(n_features))` when unset.
    pub max_features: Option<usize>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: None, // Will be resolved to default at runtime
            records_prefix: "Aircraft_Cleaned_Preprocessed".to_string(),
            features_prefix: "Aircraft_Cleaned_Standardized".to_string(),
            suffix: ".csv".to_string(),
            label_column: "Risk_Level_Num".to_string(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_trees: 300,
            seed: 42,
            class_balance: true,
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
        }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = Self::resolve_path(config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// The config file that [`Config::load_from`] reads: `config_path` when
    /// given, the default path otherwise.
    #[must_use]
    pub fn resolve_path(config_path: Option<PathBuf>) -> PathBuf {
        config_path.unwrap_or_else(Self::default_config_path)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.model.n_trees == 0 {
            return Err(Error::config_validation("n_trees must be greater than 0"));
        }

        if self.model.min_samples_split < 2 {
            return Err(Error::config_validation(format!(
                "min_samples_split must be at least 2 (got {})",
                self.model.min_samples_split
            )));
        }

        if self.model.max_depth == Some(0) {
            return Err(Error::config_validation("max_depth must be greater than 0 when set"));
        }

        if self.model.max_features == Some(0) {
            return Err(Error::config_validation("max_features must be greater than 0 when set"));
        }

        for (name, value) in [
            ("records_prefix", &self.data.records_prefix),
            ("features_prefix", &self.data.features_prefix),
            ("label_column", &self.data.label_column),
        ] {
            if value.trim().is_empty() {
                return Err(Error::config_validation(format!("{name} must not be empty")));
            }
        }

        if self.data.records_prefix == self.data.features_prefix {
            return Err(Error::config_validation(format!(
                "records_prefix and features_prefix are both '{}'",
                self.data.records_prefix
            )));
        }

        Ok(())
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data.dir.clone().unwrap_or_else(Self::default_data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.model.n_trees, 300);
        assert_eq!(config.model.seed, 42);
        assert!(config.model.class_balance);
        assert_eq!(config.data.label_column, "Risk_Level_Num");
    }

    #[test]
    fn test_default_data_config() {
        let data = DataConfig::default();

        assert!(data.dir.is_none());
        assert_eq!(data.records_prefix, "Aircraft_Cleaned_Preprocessed");
        assert_eq!(data.features_prefix, "Aircraft_Cleaned_Standardized");
        assert_eq!(data.suffix, ".csv");
    }

    #[test]
    fn test_default_model_config() {
        let model = ModelConfig::default();

        assert!(model.max_depth.is_none());
        assert!(model.max_features.is_none());
        assert_eq!(model.min_samples_split, 2);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_trees() {
        let mut config = Config::default();
        config.model.n_trees = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("n_trees"));
    }

    #[test]
    fn test_validate_min_samples_split() {
        let mut config = Config::default();
        config.model.min_samples_split = 1;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("min_samples_split"));
    }

    #[test]
    fn test_validate_zero_depth() {
        let mut config = Config::default();
        config.model.max_depth = Some(0);

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_depth"));
    }

    #[test]
    fn test_validate_zero_max_features() {
        let mut config = Config::default();
        config.model.max_features = Some(0);

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_features"));
    }

    #[test]
    fn test_validate_empty_label_column() {
        let mut config = Config::default();
        config.data.label_column = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("label_column"));
    }

    #[test]
    fn test_validate_identical_prefixes() {
        let mut config = Config::default();
        config.data.features_prefix = config.data.records_prefix.clone();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("records_prefix and features_prefix"));
    }

    #[test]
    fn test_data_dir_default() {
        let config = Config::default();
        assert!(config.data_dir().to_string_lossy().contains("flightrisk"));
    }

    #[test]
    fn test_data_dir_custom() {
        let mut config = Config::default();
        config.data.dir = Some(PathBuf::from("/srv/flights"));

        assert_eq!(config.data_dir(), PathBuf::from("/srv/flights"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("flightrisk"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        figment::Jail::expect_with(|_| {
            let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_load_from_toml_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                "[data]\ndir = \"/srv/flights\"\n\n[model]\nn_trees = 25\nmax_depth = 8\n",
            )?;

            let config = Config::load_from(Some(PathBuf::from("config.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.data.dir, Some(PathBuf::from("/srv/flights")));
            assert_eq!(config.data_dir(), PathBuf::from("/srv/flights"));
            assert_eq!(config.model.n_trees, 25);
            assert_eq!(config.model.max_depth, Some(8));
            assert_eq!(config.model.seed, 42);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[model]\nn_trees = 0\n")?;

            let result = Config::load_from(Some(PathBuf::from("config.toml")));
            assert!(matches!(result, Err(Error::ConfigValidation { .. })));
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file_and_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                "[data]\nlabel_column = \"Risk\"\n\n[model]\nn_trees = 25\nseed = 7\n",
            )?;
            jail.set_env("FLIGHTRISK_MODEL__N_TREES", "100");
            jail.set_env("FLIGHTRISK_DATA__LABEL_COLUMN", "Risk_Class");

            let config = Config::load_from(Some(PathBuf::from("config.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.model.n_trees, 100);
            assert_eq!(config.data.label_column, "Risk_Class");
            // Keys not set in the environment still come from the file
            assert_eq!(config.model.seed, 7);
            assert_eq!(config.data.records_prefix, "Aircraft_Cleaned_Preprocessed");
            Ok(())
        });
    }

    #[test]
    fn test_env_override_is_validated() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("FLIGHTRISK_MODEL__MIN_SAMPLES_SPLIT", "1");

            let result = Config::load_from(Some(PathBuf::from("missing.toml")));
            assert!(matches!(result, Err(Error::ConfigValidation { .. })));
            Ok(())
        });
    }

    #[test]
    fn test_resolve_path() {
        let custom = PathBuf::from("/etc/flightrisk.toml");
        assert_eq!(Config::resolve_path(Some(custom.clone())), custom);
        assert_eq!(Config::resolve_path(None), Config::default_config_path());
    }

    #[test]
    fn test_model_config_deserialize() {
        let json = r#"{"n_trees": 50, "seed": 7}"#;
        let model: ModelConfig = serde_json::from_str(json).unwrap();
        assert_eq!(model.n_trees, 50);
        assert_eq!(model.seed, 7);
        assert!(model.class_balance);
    }

    #[test]
    fn test_data_config_serialize() {
        let data = DataConfig::default();
        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("label_column"));
    }
}
