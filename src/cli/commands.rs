//! CLI command handlers.
//!
//! Each handler turns engine errors into a message on stderr and a non-zero
//! exit code; none of them panic on bad input.

use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

use crate::catalog::parameter_spec;
use crate::config::{OutputFormat, ScenarioConfig};
use crate::error::QueueResult;
use crate::model::QueueVariant;
use crate::request::{handle_request, Report, Response, DEFAULT_PRECISION};

use super::output::{
    print_help, print_json, print_models, print_report, print_version, render_params,
};
use super::{Args, CalcArgs, Command};

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Calc(calc) => calculate(&calc),
        Command::Run { scenario_path } => run_scenario(&scenario_path),
        Command::Request { source } => answer_request(&source),
        Command::Params { model } => show_params(&model),
        Command::Models => {
            print_models();
            ExitCode::SUCCESS
        }
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Version => {
            print_version();
            ExitCode::SUCCESS
        }
    }
}

/// Compute one model from command-line flags.
#[must_use]
pub fn calculate(calc: &CalcArgs) -> ExitCode {
    let request = calc.to_request();
    let outcome = request.evaluate(DEFAULT_PRECISION);

    if calc.json {
        let response = match outcome {
            Ok(report) => Response::Success(report),
            Err(e) => Response::from_error(&e),
        };
        print_json(&response);
        return if response.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(1)
        };
    }

    match outcome {
        Ok(report) => {
            let title = request
                .variant()
                .map_or_else(|_| calc.model.clone(), |v| v.to_string());
            print_report(&title, &report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Compute a YAML scenario.
#[must_use]
pub fn run_scenario(path: &Path) -> ExitCode {
    match scenario_report(path) {
        Ok((config, report)) => {
            match config.output.format {
                OutputFormat::Table => {
                    let title = if config.name.is_empty() {
                        config.model.variant.to_string()
                    } else {
                        format!("{} - {}", config.name, config.model.variant)
                    };
                    print_report(&title, &report);
                }
                OutputFormat::Json => print_json(&Response::Success(report)),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error in {}: {e}", path.display());
            ExitCode::from(1)
        }
    }
}

/// Load and evaluate a scenario file.
///
/// # Errors
///
/// Propagates configuration and calculation failures.
pub fn scenario_report(path: &Path) -> QueueResult<(ScenarioConfig, Report)> {
    let config = ScenarioConfig::load(path)?;
    let metrics = config
        .model()?
        .calculate(config.query_state, config.costs.as_ref())?;
    let report = Report::from_metrics(&metrics, config.output.precision);
    Ok((config, report))
}

/// Answer a JSON request read from a file or stdin (`-`).
#[must_use]
pub fn answer_request(source: &Path) -> ExitCode {
    let body = if source.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map(|_| buffer)
    } else {
        std::fs::read_to_string(source)
    };

    let body = match body {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error reading {}: {e}", source.display());
            return ExitCode::from(1);
        }
    };

    let response = handle_request(&body);
    print_json(&response);
    if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

/// Print the parameters a model accepts.
#[must_use]
pub fn show_params(model: &str) -> ExitCode {
    match model.parse::<QueueVariant>() {
        Ok(variant) => {
            print!("{}", render_params(&parameter_spec(variant)));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}
