//! CLI argument parsing.
//!
//! Hand-rolled parser so that every branch is testable with plain string
//! slices; see `Args::parse_from`.

use std::path::PathBuf;

use crate::request::{CalculationRequest, Numeric};

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
    /// Enable debug logging.
    pub verbose: bool,
}

/// Inputs of the `calc` command, kept as text until the request layer
/// parses them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalcArgs {
    /// Model tag.
    pub model: String,
    /// `--lambda`
    pub lambda: Option<String>,
    /// `--mu`
    pub mu: Option<String>,
    /// `--k`
    pub servers: Option<String>,
    /// `--M` / `--population`
    pub population: Option<String>,
    /// `--n`
    pub query_state: Option<String>,
    /// `--cost-wait`
    pub cost_wait: Option<String>,
    /// `--cost-server`
    pub cost_server: Option<String>,
    /// `--hours`
    pub hours: Option<String>,
    /// `--json`
    pub json: bool,
}

impl CalcArgs {
    /// Convert into a calculation request.
    #[must_use]
    pub fn to_request(&self) -> CalculationRequest {
        let text = |v: &Option<String>| v.clone().map(Numeric::Text);
        CalculationRequest {
            model: Some(self.model.clone()),
            lambda: text(&self.lambda),
            mu: text(&self.mu),
            k: text(&self.servers),
            population: text(&self.population),
            n_clients: text(&self.query_state),
            cost_wait: text(&self.cost_wait),
            cost_server: text(&self.cost_server),
            hours: text(&self.hours),
        }
    }
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Compute the metrics of one model from flags
    Calc(CalcArgs),
    /// Compute a YAML scenario
    Run {
        /// Path to the scenario YAML file.
        scenario_path: PathBuf,
    },
    /// Answer a JSON request (`-` reads stdin)
    Request {
        /// Path to the request file.
        source: PathBuf,
    },
    /// Show the parameters a model accepts
    Params {
        /// Model tag.
        model: String,
    },
    /// List supported models
    Models,
    /// Show help
    Help,
    /// Show version
    Version,
}

impl Args {
    /// Parse command-line arguments from an iterator.
    ///
    /// This method is testable as it accepts any iterator of strings,
    /// not just `std::env::args()`.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    fn parse_from_vec(args: &[String]) -> Self {
        let verbose = args
            .iter()
            .skip(1)
            .any(|a| a == "-v" || a == "--verbose");
        let args: Vec<String> = args
            .iter()
            .filter(|a| *a != "-v" && *a != "--verbose")
            .cloned()
            .collect();

        if args.len() < 2 {
            return Self {
                command: Command::Help,
                verbose,
            };
        }

        let command = match args[1].as_str() {
            "calc" => Self::parse_calc_command(&args),
            "run" => Self::parse_path_command(&args, "run")
                .map_or(Command::Help, |scenario_path| Command::Run { scenario_path }),
            "request" => Self::parse_path_command(&args, "request")
                .map_or(Command::Help, |source| Command::Request { source }),
            "params" => match args.get(2) {
                Some(model) => Command::Params {
                    model: model.clone(),
                },
                None => {
                    eprintln!("Error: 'params' command requires a model tag");
                    Command::Help
                }
            },
            "models" => Command::Models,
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => {
                eprintln!("Unknown command: {unknown}");
                Command::Help
            }
        };

        Self { command, verbose }
    }

    fn parse_path_command(args: &[String], name: &str) -> Option<PathBuf> {
        if let Some(path) = args.get(2) {
            Some(PathBuf::from(path))
        } else {
            eprintln!("Error: '{name}' command requires a file path");
            None
        }
    }

    /// Parse the 'calc' command arguments.
    fn parse_calc_command(args: &[String]) -> Command {
        let Some(model) = args.get(2) else {
            eprintln!("Error: 'calc' command requires a model tag");
            return Command::Help;
        };

        let mut calc = CalcArgs {
            model: model.clone(),
            ..CalcArgs::default()
        };

        let mut i = 3;
        while i < args.len() {
            let slot = match args[i].as_str() {
                "--json" => {
                    calc.json = true;
                    i += 1;
                    continue;
                }
                "--lambda" | "-l" => &mut calc.lambda,
                "--mu" | "-m" => &mut calc.mu,
                "--k" | "-k" | "--servers" => &mut calc.servers,
                "--M" | "--population" => &mut calc.population,
                "--n" | "-n" => &mut calc.query_state,
                "--cost-wait" => &mut calc.cost_wait,
                "--cost-server" => &mut calc.cost_server,
                "--hours" => &mut calc.hours,
                other => {
                    eprintln!("Warning: ignoring unknown option {other}");
                    i += 1;
                    continue;
                }
            };
            if let Some(value) = args.get(i + 1) {
                *slot = Some(value.clone());
                i += 2;
            } else {
                eprintln!("Warning: option {} requires a value", args[i]);
                i += 1;
            }
        }

        Command::Calc(calc)
    }
}
