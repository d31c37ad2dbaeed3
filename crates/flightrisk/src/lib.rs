//! `flightrisk` - Flight record risk assessment
//!
//! This library loads a table of flight records and an aligned table of model
//! features, trains a random forest risk classifier on the labelled features,
//! and answers lookups by record number with a risk level and crash
//! probability.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod flight;
pub mod forest;
pub mod logging;
pub mod report;
pub mod service;

pub use config::Config;
pub use error::{Error, Result};
pub use flight::{FlightRecord, Prediction, RiskLevel};
pub use logging::init_logging;
pub use service::RiskService;
