//! Scenario files with YAML schema and validation.
//!
//! A scenario bundles a model configuration with optional cost inputs, a
//! requested state and output preferences:
//!
//! ```yaml
//! schema_version: "1.0"
//! name: "bank tellers"
//! model:
//!   variant: PICM
//!   arrival_rate: 8.0
//!   service_rate: 5.0
//!   servers: 2
//! query_state: 3
//! costs:
//!   unit_wait_cost: 10.0
//!   server_daily_cost: 100.0
//! output:
//!   precision: 6
//!   format: table
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::cost::CostParams;
use crate::error::{QueueError, QueueResult};
use crate::model::{QueueModel, QueueParams, QueueVariant};

/// Top-level scenario configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Scenario name.
    #[serde(default)]
    pub name: String,

    /// Model parameters.
    #[validate(nested)]
    pub model: QueueParams,

    /// State for which `P{n}` is reported.
    #[serde(default)]
    pub query_state: Option<u64>,

    /// Optional cost inputs.
    #[serde(default)]
    pub costs: Option<CostParams>,

    /// Output preferences.
    #[validate(nested)]
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl ScenarioConfig {
    /// Load a scenario from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> QueueResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a scenario from YAML text.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> QueueResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        config.validate_semantic()?;
        Ok(config)
    }

    /// Create a builder.
    #[must_use]
    pub fn builder(variant: QueueVariant, arrival_rate: f64, service_rate: f64) -> ScenarioBuilder {
        ScenarioBuilder::new(variant, arrival_rate, service_rate)
    }

    fn validate_semantic(&self) -> QueueResult<()> {
        if self.schema_version.split('.').next() != Some("1") {
            return Err(QueueError::config(format!(
                "unsupported schema version {}",
                self.schema_version
            )));
        }
        self.model.check()?;
        if let Some(costs) = &self.costs {
            costs.check()?;
        }
        if let Some(n) = self.query_state {
            self.model.check_query_state(n)?;
        }
        Ok(())
    }

    /// Build the engine for this scenario.
    ///
    /// # Errors
    ///
    /// Returns error if the model parameters are invalid.
    pub fn model(&self) -> QueueResult<QueueModel> {
        QueueModel::new(self.model)
    }
}

/// Output format for command-line reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned text table.
    #[default]
    Table,
    /// JSON response payload.
    Json,
}

/// Output preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct OutputConfig {
    /// Decimal places in reported values.
    #[validate(range(max = 15))]
    #[serde(default = "default_precision")]
    pub precision: u32,
    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,
}

const fn default_precision() -> u32 {
    crate::request::DEFAULT_PRECISION
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            format: OutputFormat::default(),
        }
    }
}

/// Programmatic scenario construction.
#[derive(Debug)]
pub struct ScenarioBuilder {
    name: String,
    params: QueueParams,
    query_state: Option<u64>,
    costs: Option<CostParams>,
    output: OutputConfig,
}

impl ScenarioBuilder {
    fn new(variant: QueueVariant, arrival_rate: f64, service_rate: f64) -> Self {
        Self {
            name: String::new(),
            params: QueueParams::new(variant, arrival_rate, service_rate),
            query_state: None,
            costs: None,
            output: OutputConfig::default(),
        }
    }

    /// Set the scenario name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the number of servers.
    #[must_use]
    pub const fn servers(mut self, servers: u32) -> Self {
        self.params = self.params.with_servers(servers);
        self
    }

    /// Set the population size.
    #[must_use]
    pub const fn population(mut self, population: u32) -> Self {
        self.params = self.params.with_population(population);
        self
    }

    /// Request `P{n}`.
    #[must_use]
    pub const fn query_state(mut self, n: u64) -> Self {
        self.query_state = Some(n);
        self
    }

    /// Set cost inputs.
    #[must_use]
    pub const fn costs(mut self, costs: CostParams) -> Self {
        self.costs = Some(costs);
        self
    }

    /// Set the output format.
    #[must_use]
    pub const fn format(mut self, format: OutputFormat) -> Self {
        self.output.format = format;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ScenarioConfig {
        ScenarioConfig {
            schema_version: default_schema_version(),
            name: self.name,
            model: self.params,
            query_state: self.query_state,
            costs: self.costs,
            output: self.output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MMK_YAML: &str = r#"
schema_version: "1.0"
name: "bank tellers"
model:
  variant: PICM
  arrival_rate: 8.0
  service_rate: 5.0
  servers: 2
query_state: 3
costs:
  unit_wait_cost: 10.0
  server_daily_cost: 100.0
output:
  precision: 4
  format: json
"#;

    #[test]
    fn test_from_yaml_full() {
        let config = ScenarioConfig::from_yaml(MMK_YAML).unwrap();
        assert_eq!(config.name, "bank tellers");
        assert_eq!(config.model.variant, QueueVariant::MultiServerInfinite);
        assert_eq!(config.model.servers, 2);
        assert_eq!(config.query_state, Some(3));
        assert_eq!(config.output.precision, 4);
        assert_eq!(config.output.format, OutputFormat::Json);
        let costs = config.costs.unwrap();
        assert!((costs.working_hours - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_yaml_defaults() {
        let yaml = "model:\n  variant: M/M/1\n  arrival_rate: 2\n  service_rate: 5\n";
        let config = ScenarioConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.schema_version, "1.0");
        assert_eq!(config.model.servers, 1);
        assert_eq!(config.output, OutputConfig::default());
        assert!(config.costs.is_none());
        assert!(config.model().is_ok());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let yaml = "model:\n  variant: PICS\n  arrival_rate: 2\n  service_rate: 5\nextra: 1\n";
        assert!(matches!(
            ScenarioConfig::from_yaml(yaml),
            Err(QueueError::YamlParse(_))
        ));
    }

    #[test]
    fn test_unknown_variant_rejected() {
        let yaml = "model:\n  variant: QQQ\n  arrival_rate: 2\n  service_rate: 5\n";
        assert!(ScenarioConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_zero_servers_rejected() {
        let yaml = "model:\n  variant: PICM\n  arrival_rate: 2\n  service_rate: 5\n  servers: 0\n";
        assert!(matches!(
            ScenarioConfig::from_yaml(yaml),
            Err(QueueError::Validation(_))
        ));
    }

    #[test]
    fn test_finite_requires_population() {
        let yaml = "model:\n  variant: PFCS\n  arrival_rate: 1\n  service_rate: 4\n";
        let err = ScenarioConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("population"));
    }

    #[test]
    fn test_query_state_beyond_population_rejected() {
        let yaml = "model:\n  variant: PFCS\n  arrival_rate: 1\n  service_rate: 4\n  population: 5\nquery_state: 6\n";
        let err = ScenarioConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("exceeds population"));
    }

    #[test]
    fn test_unsupported_schema_version() {
        let yaml = "schema_version: \"2.0\"\nmodel:\n  variant: PICS\n  arrival_rate: 2\n  service_rate: 5\n";
        assert!(matches!(
            ScenarioConfig::from_yaml(yaml),
            Err(QueueError::Config { .. })
        ));
    }

    #[test]
    fn test_builder() {
        let config = ScenarioConfig::builder(QueueVariant::MultiServerFinite, 1.0, 4.0)
            .name("machines")
            .servers(2)
            .population(5)
            .query_state(5)
            .costs(CostParams::new(2.0, 50.0))
            .format(OutputFormat::Json)
            .build();
        assert_eq!(config.name, "machines");
        assert_eq!(config.model.population, Some(5));
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.model().is_ok());
    }

    #[test]
    fn test_round_trip_yaml() {
        let config = ScenarioConfig::builder(QueueVariant::SingleServerInfinite, 2.0, 5.0).build();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("variant: PICS"));
        let restored = ScenarioConfig::from_yaml(&yaml).unwrap();
        assert_eq!(restored.model, config.model);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ScenarioConfig::load("/nonexistent/scenario.yaml").unwrap_err();
        assert!(matches!(err, QueueError::Io(_)));
    }
}
