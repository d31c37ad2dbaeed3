//! `flrisk` - CLI for flightrisk
//!
//! This binary loads the flight tables, trains the risk classifier and
//! answers lookups by flight record number.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use flightrisk::cli::{Cli, Command, ConfigCommand, PredictCommand};
use flightrisk::dataset::DataSources;
use flightrisk::flight::RiskLevel;
use flightrisk::report::{self, INVALID_RECORD};
use flightrisk::{init_logging, Config, RiskService};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Config subcommands must work even when the active config is broken
    let config_path = cli.config_path();

    // Execute the command
    match cli.command {
        Command::Predict(cmd) => handle_predict(&load_config(&config_path)?, &cmd),
        Command::Interactive(cmd) => handle_interactive(&load_config(&config_path)?, cmd.json),
        Command::Status(cmd) => handle_status(&load_config(&config_path)?, cmd.json),
        Command::Config(cmd) => handle_config(config_path, cmd),
    }
}

fn load_config(path: &Path) -> Result<Config> {
    Config::load_from(Some(path.to_path_buf()))
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}

fn load_service(config: &Config) -> Result<RiskService> {
    let data_dir = config.data_dir();
    RiskService::from_config(config).map_err(|err| {
        let message = if err.is_data_error() {
            format!("unusable flight tables in {}", data_dir.display())
        } else {
            format!("failed to prepare risk service from {}", data_dir.display())
        };
        anyhow::Error::new(err).context(message)
    })
}

fn handle_predict(config: &Config, cmd: &PredictCommand) -> Result<ExitCode> {
    let service = load_service(config)?;

    let Some(prediction) = service.predict(cmd.id) else {
        eprintln!("{INVALID_RECORD}");
        return Ok(ExitCode::FAILURE);
    };

    if cmd.json {
        println!("{}", report::render_json(&prediction)?);
    } else {
        print!("{}", report::render_text(cmd.id, &prediction));
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_interactive(config: &Config, json: bool) -> Result<ExitCode> {
    let service = load_service(config)?;
    let stdin = io::stdin();
    report::run_session(&service, stdin.lock(), io::stdout().lock(), json)?;
    Ok(ExitCode::SUCCESS)
}

fn handle_status(config: &Config, json: bool) -> Result<ExitCode> {
    let data_dir = config.data_dir();
    let sources = DataSources::discover(&data_dir, &config.data)
        .with_context(|| format!("failed to locate tables in {}", data_dir.display()))?;
    let service = RiskService::from_sources(&sources, config)
        .context("failed to prepare risk service")?;
    let summary = service.summary();

    if json {
        let status = serde_json::json!({
            "data_dir": data_dir,
            "records_file": sources.records,
            "features_file": sources.features,
            "summary": summary,
            "model": config.model,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("flrisk status");
        println!("-------------");
        println!("Data directory: {}", data_dir.display());
        println!("Records file:   {}", sources.records.display());
        println!("Features file:  {}", sources.features.display());
        println!("Flights:        {}", summary.records);
        println!("Features:       {} ({})", summary.features.len(), summary.features.join(", "));
        println!();
        println!("[Labels]");
        for level in RiskLevel::ALL {
            println!(
                "  {:<8} {:>6}  (weight {:.3})",
                level.label(),
                summary.label_counts.get(level),
                summary.class_weights[level.index()]
            );
        }
        println!();
        println!("[Model]");
        println!("  Trees:             {}", summary.n_trees);
        println!("  Seed:              {}", config.model.seed);
        println!("  Class balance:     {}", config.model.class_balance);
        println!("  Max depth:         {}", describe(config.model.max_depth, "unlimited"));
        println!("  Min samples split: {}", config.model.min_samples_split);
        println!("  Max features:      {}", describe(config.model.max_features, "sqrt"));
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_config(config_path: PathBuf, cmd: ConfigCommand) -> Result<ExitCode> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = load_config(&config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Data]");
                println!("  Directory:          {}", config.data_dir().display());
                println!("  Records prefix:     {}", config.data.records_prefix);
                println!("  Features prefix:    {}", config.data.features_prefix);
                println!("  Suffix:             {}", config.data.suffix);
                println!("  Label column:       {}", config.data.label_column);
                println!();
                println!("[Model]");
                println!("  Trees:              {}", config.model.n_trees);
                println!("  Seed:               {}", config.model.seed);
                println!("  Class balance:      {}", config.model.class_balance);
                println!("  Max depth:          {}", describe(config.model.max_depth, "unlimited"));
                println!("  Min samples split:  {}", config.model.min_samples_split);
                println!("  Max features:       {}", describe(config.model.max_features, "sqrt"));
            }
        }
        ConfigCommand::Path => {
            println!("{}", config_path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or(config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => {
                    println!("Configuration error: {e}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn describe(value: Option<usize>, unset: &str) -> String {
    value.map_or_else(|| unset.to_string(), |v| v.to_string())
}
