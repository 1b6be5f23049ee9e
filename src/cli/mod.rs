//! CLI module for queuecalc.
//!
//! All CLI logic lives here rather than in main.rs so it can be tested. The
//! entry point `run_cli` is called from main.rs with parsed arguments.

mod args;
mod commands;
mod output;

pub use args::{Args, CalcArgs, Command};
pub use commands::{
    answer_request, calculate, run_cli, run_scenario, scenario_report, show_params,
};
pub use output::{
    print_help, print_json, print_models, print_report, print_version, render_models,
    render_params, render_report, version_string,
};
