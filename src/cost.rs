//! Labor-cost rollups.
//!
//! Costs are independent of the queueing math: they only scale the waiting
//! and system times by the arrival volume of one working day.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{QueueError, QueueResult};
use crate::metrics::Metrics;
use crate::model::{Measures, QueueParams};

/// Cost inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CostParams {
    /// Cost per customer per unit of time spent waiting (Cw).
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub unit_wait_cost: f64,
    /// Daily cost of one server (Cs).
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub server_daily_cost: f64,
    /// Working hours per day (H).
    #[validate(range(min = 0.0))]
    #[serde(default = "default_working_hours")]
    pub working_hours: f64,
}

const fn default_working_hours() -> f64 {
    8.0
}

impl Default for CostParams {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl CostParams {
    /// Create cost inputs for an eight-hour working day.
    #[must_use]
    pub const fn new(unit_wait_cost: f64, server_daily_cost: f64) -> Self {
        Self {
            unit_wait_cost,
            server_daily_cost,
            working_hours: default_working_hours(),
        }
    }

    /// Set the working hours per day.
    #[must_use]
    pub const fn with_working_hours(mut self, hours: f64) -> Self {
        self.working_hours = hours;
        self
    }

    /// Whether any cost input is set.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.unit_wait_cost > 0.0 || self.server_daily_cost > 0.0
    }

    /// Validate that every component is a finite, non-negative number.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidParameter`] naming the offending field.
    pub fn check(&self) -> QueueResult<()> {
        let fields = [
            ("unit_wait_cost", self.unit_wait_cost),
            ("server_daily_cost", self.server_daily_cost),
            ("working_hours", self.working_hours),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(QueueError::invalid_parameter(
                    name,
                    format!("must be a finite number, got {value}"),
                ));
            }
        }
        if let Err(errors) = self.validate() {
            let name = errors
                .field_errors()
                .keys()
                .next()
                .map_or_else(|| "costs".to_string(), ToString::to_string);
            return Err(QueueError::invalid_parameter(name, "must not be negative"));
        }
        Ok(())
    }
}

/// Cost totals for one working day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostBreakdown {
    /// CTte: `λ · H · Wq · Cw`.
    pub waiting_time: f64,
    /// CTts: `λ · H · W · Cw`.
    pub system_time: f64,
    /// CTse: `λ · H · (1/μ) · Cw`.
    pub service_time: f64,
    /// CTs: `k · Cs`.
    pub servers: f64,
    /// CT: `CTts + CTs`.
    pub total: f64,
}

impl CostBreakdown {
    /// Roll measures up into daily costs.
    #[must_use]
    pub fn compute(params: &QueueParams, measures: &Measures, costs: &CostParams) -> Self {
        let daily_arrivals = params.arrival_rate * costs.working_hours;
        let waiting_time = daily_arrivals * measures.wq * costs.unit_wait_cost;
        let system_time = daily_arrivals * measures.w * costs.unit_wait_cost;
        let service_time = daily_arrivals * (1.0 / params.service_rate) * costs.unit_wait_cost;
        let servers = f64::from(params.effective_servers()) * costs.server_daily_cost;
        Self {
            waiting_time,
            system_time,
            service_time,
            servers,
            total: system_time + servers,
        }
    }

    /// Append the cost keys to a result mapping.
    pub fn extend_metrics(&self, metrics: &mut Metrics) {
        metrics.insert("CTte", self.waiting_time);
        metrics.insert("CTts", self.system_time);
        metrics.insert("CTse", self.service_time);
        metrics.insert("CTs", self.servers);
        metrics.insert("CT", self.total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QueueModel, QueueVariant};

    fn mm1_measures() -> (QueueParams, Measures) {
        let params = QueueParams::new(QueueVariant::SingleServerInfinite, 2.0, 5.0);
        let measures = QueueModel::new(params).unwrap().measures().unwrap();
        (params, measures)
    }

    #[test]
    fn test_default_working_hours() {
        let costs = CostParams::new(1.0, 2.0);
        assert!((costs.working_hours - 8.0).abs() < f64::EPSILON);
        assert!(!CostParams::default().is_active());
    }

    #[test]
    fn test_is_active() {
        assert!(CostParams::new(1.0, 0.0).is_active());
        assert!(CostParams::new(0.0, 1.0).is_active());
        assert!(!CostParams::new(0.0, 0.0).with_working_hours(10.0).is_active());
    }

    #[test]
    fn test_compute_mm1() {
        let (params, measures) = mm1_measures();
        let costs = CostParams::new(10.0, 100.0);
        let breakdown = CostBreakdown::compute(&params, &measures, &costs);

        // λH = 16 arrivals per day
        assert!((breakdown.waiting_time - 16.0 * (2.0 / 15.0) * 10.0).abs() < 1e-9);
        assert!((breakdown.system_time - 16.0 * (1.0 / 3.0) * 10.0).abs() < 1e-9);
        assert!((breakdown.service_time - 16.0 * 0.2 * 10.0).abs() < 1e-9);
        assert!((breakdown.servers - 100.0).abs() < 1e-9);
        assert!((breakdown.total - (breakdown.system_time + breakdown.servers)).abs() < 1e-9);
    }

    #[test]
    fn test_waiting_cost_never_exceeds_system_cost() {
        let (params, measures) = mm1_measures();
        let breakdown = CostBreakdown::compute(&params, &measures, &CostParams::new(3.5, 0.0));
        assert!(breakdown.waiting_time <= breakdown.system_time);
    }

    #[test]
    fn test_servers_cost_uses_effective_servers() {
        let params = QueueParams::new(QueueVariant::MultiServerInfinite, 8.0, 5.0).with_servers(3);
        let measures = QueueModel::new(params).unwrap().measures().unwrap();
        let breakdown = CostBreakdown::compute(&params, &measures, &CostParams::new(0.0, 50.0));
        assert!((breakdown.servers - 150.0).abs() < 1e-9);
        assert!(breakdown.waiting_time.abs() < f64::EPSILON);
    }

    #[test]
    fn test_extend_metrics_keys() {
        let (params, measures) = mm1_measures();
        let breakdown = CostBreakdown::compute(&params, &measures, &CostParams::new(1.0, 1.0));
        let mut metrics = Metrics::new();
        breakdown.extend_metrics(&mut metrics);
        let keys: Vec<&str> = metrics.keys().collect();
        assert_eq!(keys, ["CTte", "CTts", "CTse", "CTs", "CT"]);
    }

    #[test]
    fn test_check_rejects_negative() {
        let err = CostParams::new(-1.0, 0.0).check().unwrap_err();
        assert!(err.to_string().contains("unit_wait_cost"));
        assert!(CostParams::new(1.0, 1.0).with_working_hours(-2.0).check().is_err());
    }

    #[test]
    fn test_check_rejects_non_finite() {
        let err = CostParams::new(f64::NAN, 0.0).check().unwrap_err();
        assert!(err.to_string().contains("unit_wait_cost"));
    }

    #[test]
    fn test_deserialize_defaults_hours() {
        let costs: CostParams =
            serde_yaml::from_str("unit_wait_cost: 2.0\nserver_daily_cost: 30.0\n").unwrap();
        assert!((costs.working_hours - 8.0).abs() < f64::EPSILON);
    }
}
