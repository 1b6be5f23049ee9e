//! Request/response adapter for presentation layers.
//!
//! A front end posts a loosely typed JSON object (numbers may arrive as
//! strings) and gets back either `{results, descriptions}` or `{error}`.
//! Nothing in here panics on bad input.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::describe;
use crate::cost::CostParams;
use crate::error::{QueueError, QueueResult};
use crate::metrics::Metrics;
use crate::model::{QueueModel, QueueParams, QueueVariant};

/// Decimal places kept in formatted results.
pub const DEFAULT_PRECISION: u32 = 6;

/// A number that may be sent as JSON number or numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    /// JSON number.
    Number(f64),
    /// Numeric text such as `"2.5"`.
    Text(String),
}

impl Numeric {
    fn parse(&self, field: &str) -> QueueResult<Option<f64>> {
        match self {
            Self::Number(v) => Ok(Some(*v)),
            Self::Text(s) if s.trim().is_empty() => Ok(None),
            Self::Text(s) => s.trim().parse::<f64>().map(Some).map_err(|_| {
                QueueError::invalid_parameter(field, format!("'{s}' is not a number"))
            }),
        }
    }
}

fn real(field: &str, value: Option<&Numeric>) -> QueueResult<Option<f64>> {
    value.map_or(Ok(None), |v| v.parse(field))
}

fn whole(field: &str, value: Option<&Numeric>) -> QueueResult<Option<u64>> {
    match real(field, value)? {
        None => Ok(None),
        Some(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 => {
            Ok(Some(v as u64))
        }
        Some(v) => Err(QueueError::invalid_parameter(
            field,
            format!("expected a non-negative integer, got {v}"),
        )),
    }
}

fn whole_u32(field: &str, value: Option<&Numeric>) -> QueueResult<Option<u32>> {
    whole(field, value)?
        .map(|v| u32::try_from(v).map_err(|_| QueueError::invalid_parameter(field, "too large")))
        .transpose()
}

/// Loosely typed calculation request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalculationRequest {
    /// Model tag (`PICS`, `PICM`, `PFCS`, `PFCM`).
    #[serde(default)]
    pub model: Option<String>,
    /// Arrival rate λ.
    #[serde(default)]
    pub lambda: Option<Numeric>,
    /// Service rate μ.
    #[serde(default)]
    pub mu: Option<Numeric>,
    /// Number of servers (default 1).
    #[serde(default)]
    pub k: Option<Numeric>,
    /// Population size.
    #[serde(default, rename = "M")]
    pub population: Option<Numeric>,
    /// State for which `P{n}` is requested.
    #[serde(default)]
    pub n_clients: Option<Numeric>,
    /// Unit cost of waiting time.
    #[serde(default)]
    pub cost_wait: Option<Numeric>,
    /// Daily cost per server.
    #[serde(default)]
    pub cost_server: Option<Numeric>,
    /// Working hours per day (default 8).
    #[serde(default)]
    pub hours: Option<Numeric>,
}

/// Successful calculation with formatted values and labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Rounded results keyed by metric name.
    pub results: IndexMap<String, serde_json::Value>,
    /// Label of every key in `results`.
    pub descriptions: IndexMap<String, String>,
}

impl Report {
    /// Format a result mapping.
    #[must_use]
    pub fn from_metrics(metrics: &Metrics, precision: u32) -> Self {
        let results = metrics
            .iter()
            .map(|(k, v)| (k.to_string(), format_value(v, precision)))
            .collect();
        let descriptions = metrics
            .keys()
            .filter_map(|k| describe(k).map(|d| (k.to_string(), d)))
            .collect();
        Self {
            results,
            descriptions,
        }
    }
}

/// Response payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    /// Calculation succeeded.
    Success(Report),
    /// Calculation failed; `error` is user-facing text.
    Failure {
        /// Error message.
        error: String,
    },
}

impl Response {
    /// Build a failure payload from an engine error.
    #[must_use]
    pub fn from_error(err: &QueueError) -> Self {
        let error = if err.is_input_error() || err.is_instability() {
            format!("Invalid input values: {err}")
        } else {
            format!("Unexpected error: {err}")
        };
        Self::Failure { error }
    }

    /// Whether this is a success payload.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl CalculationRequest {
    /// Parse a request from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Json`] for malformed JSON.
    pub fn from_json(body: &str) -> QueueResult<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Resolve the model tag.
    ///
    /// # Errors
    ///
    /// Fails when no model is given or the tag is unknown.
    pub fn variant(&self) -> QueueResult<QueueVariant> {
        match self.model.as_deref().map(str::trim) {
            None | Some("") => Err(QueueError::config("no model selected")),
            Some(tag) => tag.parse(),
        }
    }

    /// Convert into typed model parameters.
    ///
    /// # Errors
    ///
    /// Fails on unparsable numbers or invalid parameter domains.
    pub fn params(&self) -> QueueResult<QueueParams> {
        let variant = self.variant()?;
        let lambda = real("lambda", self.lambda.as_ref())?.unwrap_or(0.0);
        let mu = real("mu", self.mu.as_ref())?.unwrap_or(0.0);
        let servers = whole_u32("k", self.k.as_ref())?.unwrap_or(1);
        let mut params = QueueParams::new(variant, lambda, mu).with_servers(servers);
        if let Some(m) = whole_u32("M", self.population.as_ref())? {
            params = params.with_population(m);
        }
        params.check()?;
        Ok(params)
    }

    /// Cost inputs, or `None` when no cost is set.
    ///
    /// # Errors
    ///
    /// Fails on unparsable or negative numbers.
    pub fn costs(&self) -> QueueResult<Option<CostParams>> {
        let costs = CostParams::new(
            real("cost_wait", self.cost_wait.as_ref())?.unwrap_or(0.0),
            real("cost_server", self.cost_server.as_ref())?.unwrap_or(0.0),
        )
        .with_working_hours(real("hours", self.hours.as_ref())?.unwrap_or(8.0));
        costs.check()?;
        Ok(costs.is_active().then_some(costs))
    }

    /// State for which `P{n}` is requested.
    ///
    /// # Errors
    ///
    /// Fails if `n_clients` is not a non-negative integer.
    pub fn query_state(&self) -> QueueResult<Option<u64>> {
        whole("n_clients", self.n_clients.as_ref())
    }

    /// Run the calculation.
    ///
    /// # Errors
    ///
    /// Propagates parsing, validation, stability and computation failures.
    pub fn evaluate(&self, precision: u32) -> QueueResult<Report> {
        let params = self.params()?;
        let costs = self.costs()?;
        let query_state = self.query_state()?;
        debug!(variant = params.variant.tag(), ?query_state, "evaluating request");
        let metrics = QueueModel::new(params)?.calculate(query_state, costs.as_ref())?;
        Ok(Report::from_metrics(&metrics, precision))
    }
}

/// Handle a JSON request body end to end.
#[must_use]
pub fn handle_request(body: &str) -> Response {
    match CalculationRequest::from_json(body).and_then(|r| r.evaluate(DEFAULT_PRECISION)) {
        Ok(report) => Response::Success(report),
        Err(err) => {
            warn!(error = %err, "request failed");
            Response::from_error(&err)
        }
    }
}

/// Round to `precision` decimals, shown as an integer when whole.
#[must_use]
pub fn format_value(value: f64, precision: u32) -> serde_json::Value {
    let scale = 10f64.powi(i32::try_from(precision).unwrap_or(i32::MAX).min(15));
    let rounded = (value * scale).round() / scale;
    if rounded.fract() == 0.0 && rounded.abs() < 9.0e15 {
        serde_json::Value::from(rounded as i64)
    } else {
        serde_json::Value::from(rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_value_rounds() {
        assert_eq!(format_value(0.666_666_666, 6), json!(0.666_667));
        assert_eq!(format_value(0.123_456_4, 6), json!(0.123_456));
    }

    #[test]
    fn test_format_value_whole_becomes_integer() {
        assert_eq!(format_value(3.0, 6), json!(3));
        assert_eq!(format_value(2.000_000_1, 6), json!(2));
        assert_eq!(format_value(0.0, 6), json!(0));
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let request = CalculationRequest::from_json(
            r#"{"model": "PICS", "lambda": "2", "mu": " 5.0 ", "n_clients": "3"}"#,
        )
        .unwrap();
        let params = request.params().unwrap();
        assert!((params.arrival_rate - 2.0).abs() < f64::EPSILON);
        assert!((params.service_rate - 5.0).abs() < f64::EPSILON);
        assert_eq!(request.query_state().unwrap(), Some(3));
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let request =
            CalculationRequest::from_json(r#"{"model": "PICS", "lambda": 2, "mu": 5, "M": ""}"#)
                .unwrap();
        assert_eq!(request.params().unwrap().population, None);
    }

    #[test]
    fn test_malformed_number_rejected() {
        let request =
            CalculationRequest::from_json(r#"{"model": "PICS", "lambda": "abc", "mu": 5}"#)
                .unwrap();
        let err = request.params().unwrap_err();
        assert!(err.to_string().contains("lambda"));
    }

    #[test]
    fn test_fractional_servers_rejected() {
        let request =
            CalculationRequest::from_json(r#"{"model": "PICM", "lambda": 2, "mu": 5, "k": 1.5}"#)
                .unwrap();
        assert!(request.params().is_err());
    }

    #[test]
    fn test_missing_model() {
        let response = handle_request(r#"{"lambda": 2, "mu": 5}"#);
        match response {
            Response::Failure { error } => assert!(error.contains("no model selected")),
            Response::Success(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn test_unknown_model() {
        let response = handle_request(r#"{"model": "XYZ", "lambda": 2, "mu": 5}"#);
        assert!(!response.is_success());
    }

    #[test]
    fn test_invalid_json_never_panics() {
        let response = handle_request("{not json");
        assert!(!response.is_success());
    }

    #[test]
    fn test_costs_only_when_active() {
        let request = CalculationRequest::from_json(
            r#"{"model": "PICS", "lambda": 2, "mu": 5, "cost_wait": 0, "cost_server": "0"}"#,
        )
        .unwrap();
        assert_eq!(request.costs().unwrap(), None);

        let request = CalculationRequest::from_json(
            r#"{"model": "PICS", "lambda": 2, "mu": 5, "cost_server": 40}"#,
        )
        .unwrap();
        let costs = request.costs().unwrap().unwrap();
        assert!((costs.server_daily_cost - 40.0).abs() < f64::EPSILON);
        assert!((costs.working_hours - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_success_payload_shape() {
        let response = handle_request(r#"{"model": "PICS", "lambda": 2, "mu": 5, "n_clients": 2}"#);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["results"]["ro"], json!(0.4));
        assert_eq!(json["results"]["P0"], json!(0.6));
        assert_eq!(json["results"]["P2"], json!(0.096));
        assert_eq!(
            json["descriptions"]["P2"],
            json!("Probability of 2 customers in the system")
        );
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_unstable_payload() {
        let response = handle_request(r#"{"model": "PICS", "lambda": 6, "mu": 5}"#);
        let json = serde_json::to_value(&response).unwrap();
        let error = json["error"].as_str().unwrap_or_default();
        assert!(error.starts_with("Invalid input values"));
        assert!(error.contains("not stable"));
        assert!(json.get("results").is_none());
    }
}
