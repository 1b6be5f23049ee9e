//! CLI output formatting.
//!
//! Rendering is split from printing so tests can inspect the text.

use crate::catalog::ParameterSpec;
use crate::model::QueueVariant;
use crate::request::Report;

/// Version string, including the git revision when known at build time.
#[must_use]
pub fn version_string() -> String {
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => {
            format!("queuecalc {} ({hash})", env!("CARGO_PKG_VERSION"))
        }
        _ => format!("queuecalc {}", env!("CARGO_PKG_VERSION")),
    }
}

/// Print version information.
pub fn print_version() {
    println!("{}", version_string());
}

/// Print help message.
pub fn print_help() {
    println!(
        r#"queuecalc - Steady-state metrics for Markovian queueing models

USAGE:
    queuecalc <COMMAND> [OPTIONS] [-v]

COMMANDS:
    calc <MODEL>                Compute all metrics of a model
        --lambda <X>            Arrival rate λ (required)
        --mu <X>                Service rate μ (required)
        --k <N>                 Number of servers (PICM, PFCM)
        --M <N>                 Population size (PFCS, PFCM)
        --n <N>                 Also report P(n)
        --cost-wait <X>         Unit cost of waiting time
        --cost-server <X>       Daily cost per server
        --hours <X>             Working hours per day (default: 8)
        --json                  Print the JSON response payload

    run <scenario.yaml>         Compute a YAML scenario
    request <file.json | ->     Answer a JSON calculation request
    params <MODEL>              Show the parameters a model accepts
    models                      List supported models

    help                        Show this help message
    version                     Show version information

    -v, --verbose               Log evaluation steps to stderr

MODELS:
    PICS    M/M/1       single server, infinite population
    PICM    M/M/k       multiple servers, infinite population
    PFCS    M/M/1/M/M   single server, finite population
    PFCM    M/M/k/M/M   multiple servers, finite population

EXAMPLES:
    queuecalc calc PICS --lambda 2 --mu 5
    queuecalc calc PICM --lambda 8 --mu 5 --k 2 --n 3
    queuecalc calc PFCM --lambda 1 --mu 4 --k 2 --M 5 --cost-wait 10 --cost-server 80
    echo '{{"model": "PICS", "lambda": 2, "mu": 5}}' | queuecalc request -
"#
    );
}

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Render a report as an aligned table.
#[must_use]
pub fn render_report(title: &str, report: &Report) -> String {
    let mut out = format!("{RULE}\n{title}\n{RULE}\n");

    let width = report.results.keys().map(String::len).max().unwrap_or(0);
    for (key, value) in &report.results {
        let label = report.descriptions.get(key).map_or("", String::as_str);
        out.push_str(&format!("  {key:<width$}  {:>14}  {label}\n", value.to_string()));
    }
    out
}

/// Print a report as an aligned table.
pub fn print_report(title: &str, report: &Report) {
    print!("{}", render_report(title, report));
}

/// Print any serializable value as pretty JSON.
pub fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error: failed to serialize output: {e}"),
    }
}

/// Render the model list.
#[must_use]
pub fn render_models() -> String {
    let mut out = String::new();
    for variant in QueueVariant::ALL {
        out.push_str(&format!(
            "{:<6}{:<12}{}\n",
            variant.tag(),
            variant.kendall(),
            variant.description()
        ));
    }
    out
}

/// Print the model list.
pub fn print_models() {
    print!("{}", render_models());
}

/// Render parameter discovery as text.
#[must_use]
pub fn render_params(spec: &ParameterSpec) -> String {
    let mut out = format!("Model {}\n\nRequired:\n", spec.model);
    for (name, description) in &spec.descriptions {
        out.push_str(&format!("  {name:<12} {description}\n"));
    }
    out.push_str("\nOptional:\n");
    for (name, description) in &spec.optional_descriptions {
        out.push_str(&format!("  {name:<12} {description}\n"));
    }
    out
}
