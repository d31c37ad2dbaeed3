//! Command-line interface for flightrisk.
//!
//! This module provides the CLI structure for the `flrisk` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::logging::Verbosity;

pub use commands::{ConfigCommand, InteractiveCommand, PredictCommand, StatusCommand};

/// flrisk - Flight risk assessment
///
/// Looks up a flight record by number and reports its predicted risk level
/// and crash probability from a random forest trained at startup.
#[derive(Debug, Parser)]
#[command(name = "flrisk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Assess one flight record
    Predict(PredictCommand),

    /// Assess flights one after another, reading numbers from stdin
    Interactive(InteractiveCommand),

    /// Show loaded data and model status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// The config file in effect: `--config` when given, the default path
    /// otherwise.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        Config::resolve_path(self.config.clone())
    }

    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                2 => Verbosity::Debug,
                _ => Verbosity::Trace,
            }
        }
    }
}
