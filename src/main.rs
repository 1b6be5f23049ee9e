//! queuecalc CLI - steady-state queueing metrics
//!
//! Command-line interface over the queuecalc engine.

use queuecalc::cli::{run_cli, Args};
use queuecalc::logging::{init_logging_with_level, level_for_verbosity};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging_with_level(level_for_verbosity(args.verbose));
    run_cli(args)
}
