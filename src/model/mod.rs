//! The queueing engine.
//!
//! A [`QueueModel`] is an immutable value built from validated
//! [`QueueParams`]. Every measure is derived by walking the evaluation plan in
//! [`plan`], so the dependency chain
//! `ρ → P0 → Pk/PE → Lq → L → Ln → Wq → W → Wn` is a contract rather than an
//! accident of call order.
//!
//! ```rust
//! use queuecalc::prelude::*;
//!
//! let params = QueueParams::new(QueueVariant::SingleServerInfinite, 2.0, 5.0);
//! let model = QueueModel::new(params).unwrap();
//! assert!((model.p0().unwrap() - 0.6).abs() < 1e-12);
//! ```

mod formulas;
pub mod plan;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};
use validator::Validate;

use crate::cost::{CostBreakdown, CostParams};
use crate::error::{QueueError, QueueResult};
use crate::metrics::Metrics;

use formulas::{Mm1, Mm1Finite, Mmk, MmkFinite, SteadyState};
pub use plan::{Measures, Stage, EVALUATION_ORDER};

// =============================================================================
// Variant
// =============================================================================

/// The four classical Markovian queueing models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum QueueVariant {
    /// M/M/1: single server, infinite population (`PICS`).
    SingleServerInfinite,
    /// M/M/k: multiple servers, infinite population (`PICM`).
    MultiServerInfinite,
    /// M/M/1/M/M: single server, finite population (`PFCS`).
    SingleServerFinite,
    /// M/M/k/M/M: multiple servers, finite population (`PFCM`).
    MultiServerFinite,
}

impl QueueVariant {
    /// All variants in option order.
    pub const ALL: [Self; 4] = [
        Self::SingleServerInfinite,
        Self::MultiServerInfinite,
        Self::SingleServerFinite,
        Self::MultiServerFinite,
    ];

    /// Short model tag.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::SingleServerInfinite => "PICS",
            Self::MultiServerInfinite => "PICM",
            Self::SingleServerFinite => "PFCS",
            Self::MultiServerFinite => "PFCM",
        }
    }

    /// Kendall notation.
    #[must_use]
    pub const fn kendall(self) -> &'static str {
        match self {
            Self::SingleServerInfinite => "M/M/1",
            Self::MultiServerInfinite => "M/M/k",
            Self::SingleServerFinite => "M/M/1/M/M",
            Self::MultiServerFinite => "M/M/k/M/M",
        }
    }

    /// Human-readable description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::SingleServerInfinite => "Single server, infinite population",
            Self::MultiServerInfinite => "Multiple servers, infinite population",
            Self::SingleServerFinite => "Single server, finite population",
            Self::MultiServerFinite => "Multiple servers, finite population",
        }
    }

    /// Look up a variant by its numeric option (1..=4).
    #[must_use]
    pub const fn from_option(option: u8) -> Option<Self> {
        match option {
            1 => Some(Self::SingleServerInfinite),
            2 => Some(Self::MultiServerInfinite),
            3 => Some(Self::SingleServerFinite),
            4 => Some(Self::MultiServerFinite),
            _ => None,
        }
    }

    /// Whether the customer source is bounded by a population size `M`.
    #[must_use]
    pub const fn is_finite_population(self) -> bool {
        matches!(self, Self::SingleServerFinite | Self::MultiServerFinite)
    }

    /// Whether the server count `k` is a free parameter.
    #[must_use]
    pub const fn is_multi_server(self) -> bool {
        matches!(self, Self::MultiServerInfinite | Self::MultiServerFinite)
    }
}

impl fmt::Display for QueueVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kendall(), self.tag())
    }
}

impl FromStr for QueueVariant {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        if let Some(variant) = normalized.parse().ok().and_then(Self::from_option) {
            return Ok(variant);
        }
        let variant = match normalized.as_str() {
            "pics" | "m/m/1" | "mm1" | "single_server_infinite" => Self::SingleServerInfinite,
            "picm" | "m/m/k" | "mmk" | "multi_server_infinite" => Self::MultiServerInfinite,
            "pfcs" | "m/m/1/m/m" | "mm1mm" | "single_server_finite" => Self::SingleServerFinite,
            "pfcm" | "m/m/k/m/m" | "mmkmm" | "multi_server_finite" => Self::MultiServerFinite,
            _ => return Err(QueueError::InvalidModel(s.trim().to_string())),
        };
        Ok(variant)
    }
}

impl TryFrom<String> for QueueVariant {
    type Error = QueueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QueueVariant> for &'static str {
    fn from(variant: QueueVariant) -> Self {
        variant.tag()
    }
}

// =============================================================================
// Parameters
// =============================================================================

/// Model configuration: the variant plus its rates and sizes.
///
/// Single-server variants always run with one server; any `servers` value
/// is ignored for them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct QueueParams {
    /// Model variant.
    pub variant: QueueVariant,
    /// Arrival rate λ (customers per unit time).
    pub arrival_rate: f64,
    /// Service rate μ per server (customers per unit time).
    pub service_rate: f64,
    /// Number of parallel servers k.
    #[validate(range(min = 1))]
    #[serde(default = "default_servers")]
    pub servers: u32,
    /// Source population M (finite variants only).
    #[serde(default)]
    pub population: Option<u32>,
}

const fn default_servers() -> u32 {
    1
}

/// Largest accepted source population `M`.
///
/// Finite-population measures walk all `M + 1` states.
pub const MAX_POPULATION: u32 = 10_000;

/// Largest accepted server count `k`.
pub const MAX_SERVERS: u32 = 10_000;

impl QueueParams {
    /// Create parameters with one server and no population.
    #[must_use]
    pub const fn new(variant: QueueVariant, arrival_rate: f64, service_rate: f64) -> Self {
        Self {
            variant,
            arrival_rate,
            service_rate,
            servers: 1,
            population: None,
        }
    }

    /// Set the number of servers.
    #[must_use]
    pub const fn with_servers(mut self, servers: u32) -> Self {
        self.servers = servers;
        self
    }

    /// Set the source population size.
    #[must_use]
    pub const fn with_population(mut self, population: u32) -> Self {
        self.population = Some(population);
        self
    }

    /// Server count the formulas use.
    #[must_use]
    pub const fn effective_servers(&self) -> u32 {
        if self.variant.is_multi_server() {
            self.servers
        } else {
            1
        }
    }

    /// Validate parameter domains.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidParameter`] when a rate is not a positive
    /// finite number, the server count is zero or above [`MAX_SERVERS`], or a
    /// finite-population model lacks a population with
    /// `max(1, k) ≤ M ≤ MAX_POPULATION`.
    pub fn check(&self) -> QueueResult<()> {
        if !self.arrival_rate.is_finite() || self.arrival_rate <= 0.0 {
            return Err(QueueError::invalid_parameter(
                "lambda",
                format!("arrival rate must be positive, got {}", self.arrival_rate),
            ));
        }
        if !self.service_rate.is_finite() || self.service_rate <= 0.0 {
            return Err(QueueError::invalid_parameter(
                "mu",
                format!("service rate must be positive, got {}", self.service_rate),
            ));
        }
        if self.validate().is_err() {
            return Err(QueueError::invalid_parameter(
                "k",
                "server count must be at least 1",
            ));
        }
        if self.effective_servers() > MAX_SERVERS {
            return Err(QueueError::invalid_parameter(
                "k",
                format!("server count must not exceed {MAX_SERVERS}"),
            ));
        }

        let servers = self.effective_servers();
        if self.variant.is_finite_population() {
            match self.population {
                None => {
                    return Err(QueueError::invalid_parameter(
                        "M",
                        format!("population size is required for {}", self.variant),
                    ));
                }
                Some(0) => {
                    return Err(QueueError::invalid_parameter(
                        "M",
                        "population size must be at least 1",
                    ));
                }
                Some(m) if m > MAX_POPULATION => {
                    return Err(QueueError::invalid_parameter(
                        "M",
                        format!("population size must not exceed {MAX_POPULATION}"),
                    ));
                }
                Some(m) if m < servers => {
                    return Err(QueueError::invalid_parameter(
                        "M",
                        format!("population size {m} is smaller than server count {servers}"),
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Validate a state requested for `P{n}`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidParameter`] for a finite-population model
    /// when `n` exceeds the population, since that state is unreachable.
    pub fn check_query_state(&self, n: u64) -> QueueResult<()> {
        match self.population {
            Some(m) if self.variant.is_finite_population() && n > u64::from(m) => {
                Err(QueueError::invalid_parameter(
                    "n_clients",
                    format!("state {n} exceeds population size {m}"),
                ))
            }
            _ => Ok(()),
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Formula family selected by the variant.
#[derive(Debug, Clone)]
enum System {
    SingleServerInfinite(Mm1),
    MultiServerInfinite(Mmk),
    SingleServerFinite(Mm1Finite),
    MultiServerFinite(MmkFinite),
}

impl System {
    fn build(params: &QueueParams) -> Self {
        let lambda = params.arrival_rate;
        let mu = params.service_rate;
        let servers = params.effective_servers();
        let population = params.population.unwrap_or(0);
        match params.variant {
            QueueVariant::SingleServerInfinite => Self::SingleServerInfinite(Mm1::new(lambda, mu)),
            QueueVariant::MultiServerInfinite => {
                Self::MultiServerInfinite(Mmk::new(lambda, mu, servers))
            }
            QueueVariant::SingleServerFinite => {
                Self::SingleServerFinite(Mm1Finite::new(lambda, mu, population))
            }
            QueueVariant::MultiServerFinite => {
                Self::MultiServerFinite(MmkFinite::new(lambda, mu, servers, population))
            }
        }
    }

    fn formulas(&self) -> &dyn SteadyState {
        match self {
            Self::SingleServerInfinite(s) => s,
            Self::MultiServerInfinite(s) => s,
            Self::SingleServerFinite(s) => s,
            Self::MultiServerFinite(s) => s,
        }
    }
}

/// Steady-state queueing engine for one configured model.
#[derive(Debug, Clone)]
pub struct QueueModel {
    params: QueueParams,
    system: System,
}

impl QueueModel {
    /// Build an engine from parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters fail [`QueueParams::check`].
    pub fn new(params: QueueParams) -> QueueResult<Self> {
        params.check()?;
        debug!(
            variant = params.variant.tag(),
            lambda = params.arrival_rate,
            mu = params.service_rate,
            servers = params.effective_servers(),
            population = ?params.population,
            "configured queue model"
        );
        Ok(Self {
            system: System::build(&params),
            params,
        })
    }

    /// Model variant.
    #[must_use]
    pub const fn variant(&self) -> QueueVariant {
        self.params.variant
    }

    /// Model parameters.
    #[must_use]
    pub const fn params(&self) -> &QueueParams {
        &self.params
    }

    /// Whether steady-state measures exist.
    ///
    /// Infinite-population models require `λ/(kμ) < 1`; finite-population
    /// models are always stable.
    #[must_use]
    pub fn is_stable(&self) -> bool {
        self.system.formulas().is_stable()
    }

    /// Utilization ρ. Zero for finite-population models.
    #[must_use]
    pub fn utilization(&self) -> f64 {
        self.system.formulas().utilization()
    }

    /// Evaluate the plan up to and including `target`.
    fn evaluate(&self, target: Stage) -> QueueResult<plan::Computed> {
        let formulas = self.system.formulas();
        if target != Stage::Utilization && !formulas.is_stable() {
            let utilization = formulas.utilization();
            warn!(
                variant = self.params.variant.tag(),
                utilization, "refusing to evaluate unstable system"
            );
            return Err(QueueError::Instability {
                utilization,
                servers: self.params.effective_servers(),
            });
        }
        plan::evaluate(formulas, target)
    }

    fn stage(&self, stage: Stage) -> QueueResult<f64> {
        self.evaluate(stage)?.get(stage)
    }

    /// Probability the system is empty.
    ///
    /// # Errors
    ///
    /// Fails with [`QueueError::Instability`] for an unstable
    /// infinite-population model.
    pub fn p0(&self) -> QueueResult<f64> {
        self.stage(Stage::EmptyProbability)
    }

    /// Probability of exactly `n` customers in the system.
    ///
    /// States beyond the population of a finite model have probability zero.
    ///
    /// # Errors
    ///
    /// Fails with [`QueueError::Instability`] for an unstable
    /// infinite-population model.
    pub fn pn(&self, n: u64) -> QueueResult<f64> {
        let p0 = self.p0()?;
        let value = p0 * self.system.formulas().state_ratio(n);
        plan::ensure_finite(&format!("P{n}"), value)
    }

    fn require(&self, measure: &'static str, applies: bool) -> QueueResult<()> {
        if applies {
            Ok(())
        } else {
            Err(QueueError::NotApplicable {
                measure,
                variant: self.params.variant,
            })
        }
    }

    /// Probability that all `k` servers are busy (Erlang C).
    ///
    /// # Errors
    ///
    /// Fails with [`QueueError::NotApplicable`] unless the model is M/M/k, and
    /// with [`QueueError::Instability`] if it is unstable.
    pub fn pk(&self) -> QueueResult<f64> {
        self.require(
            "Pk",
            self.params.variant == QueueVariant::MultiServerInfinite,
        )?;
        self.stage(Stage::WaitProbability)
    }

    /// Probability an arriving customer has to wait (finite models).
    ///
    /// # Errors
    ///
    /// Fails with [`QueueError::NotApplicable`] for infinite-population models.
    pub fn pe(&self) -> QueueResult<f64> {
        self.require("PE", self.params.variant.is_finite_population())?;
        self.stage(Stage::WaitProbability)
    }

    /// Probability an arriving customer does not wait (finite models).
    ///
    /// # Errors
    ///
    /// Same conditions as [`QueueModel::pe`].
    pub fn pne(&self) -> QueueResult<f64> {
        self.require("PNE", self.params.variant.is_finite_population())?;
        Ok(1.0 - self.stage(Stage::WaitProbability)?)
    }

    /// Expected number of customers in the system.
    ///
    /// # Errors
    ///
    /// Fails with [`QueueError::Instability`] for an unstable
    /// infinite-population model.
    pub fn l(&self) -> QueueResult<f64> {
        self.stage(Stage::SystemLength)
    }

    /// Expected number of customers in the queue.
    ///
    /// # Errors
    ///
    /// See [`QueueModel::l`].
    pub fn lq(&self) -> QueueResult<f64> {
        self.stage(Stage::QueueLength)
    }

    /// Expected queue length given the queue is not empty.
    ///
    /// # Errors
    ///
    /// See [`QueueModel::l`].
    pub fn ln(&self) -> QueueResult<f64> {
        self.stage(Stage::NonEmptyQueueLength)
    }

    /// Expected time in the system.
    ///
    /// # Errors
    ///
    /// See [`QueueModel::l`].
    pub fn w(&self) -> QueueResult<f64> {
        self.stage(Stage::SystemWait)
    }

    /// Expected time in the queue.
    ///
    /// # Errors
    ///
    /// See [`QueueModel::l`].
    pub fn wq(&self) -> QueueResult<f64> {
        self.stage(Stage::QueueWait)
    }

    /// Expected wait for customers who do wait.
    ///
    /// # Errors
    ///
    /// See [`QueueModel::l`].
    pub fn wn(&self) -> QueueResult<f64> {
        self.stage(Stage::NonEmptyQueueWait)
    }

    /// Evaluate the complete plan.
    ///
    /// # Errors
    ///
    /// Fails with [`QueueError::Instability`] for an unstable
    /// infinite-population model, or [`QueueError::Computation`] if a formula
    /// produces a non-finite value.
    pub fn measures(&self) -> QueueResult<Measures> {
        let computed = self.evaluate(Stage::NonEmptyQueueWait)?;
        Measures::from_computed(&self.params, &computed)
    }

    /// Labor-cost rollup for this model.
    ///
    /// # Errors
    ///
    /// Propagates any failure of [`QueueModel::measures`].
    pub fn costs(&self, costs: &CostParams) -> QueueResult<CostBreakdown> {
        costs.check()?;
        let measures = self.measures()?;
        Ok(CostBreakdown::compute(&self.params, &measures, costs))
    }

    /// Compute the full result mapping for this model.
    ///
    /// Keys always include `ro` and `P0`; `P{n}` is added for a requested
    /// state; `Pk` (M/M/k) or `PE`/`PNE` (finite models) precede the six
    /// performance measures; cost keys follow when `costs` is active.
    ///
    /// # Errors
    ///
    /// Fails as a whole, never with partial results, if the requested state
    /// is unreachable, the cost inputs are invalid, the system is unstable,
    /// or any formula fails.
    pub fn calculate(
        &self,
        query_state: Option<u64>,
        costs: Option<&CostParams>,
    ) -> QueueResult<Metrics> {
        if let Some(n) = query_state {
            self.params.check_query_state(n)?;
        }
        let measures = self.measures()?;
        let mut metrics = Metrics::new();

        metrics.insert("ro", measures.utilization);
        metrics.insert("P0", measures.p0);
        if let Some(n) = query_state {
            metrics.insert(format!("P{n}"), self.pn(n)?);
        }

        match self.params.variant {
            QueueVariant::SingleServerInfinite => {}
            QueueVariant::MultiServerInfinite => {
                metrics.insert("Pk", measures.wait_probability);
            }
            QueueVariant::SingleServerFinite | QueueVariant::MultiServerFinite => {
                metrics.insert("PE", measures.wait_probability);
                metrics.insert("PNE", 1.0 - measures.wait_probability);
            }
        }

        metrics.insert("L", measures.l);
        metrics.insert("Lq", measures.lq);
        metrics.insert("Ln", measures.ln);
        metrics.insert("W", measures.w);
        metrics.insert("Wq", measures.wq);
        metrics.insert("Wn", measures.wn);

        if let Some(costs) = costs {
            costs.check()?;
            if costs.is_active() {
                let breakdown = CostBreakdown::compute(&self.params, &measures, costs);
                breakdown.extend_metrics(&mut metrics);
            }
        }

        debug!(
            variant = self.params.variant.tag(),
            keys = metrics.len(),
            "calculation complete"
        );
        Ok(metrics)
    }
}
