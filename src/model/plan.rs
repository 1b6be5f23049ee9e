//! Evaluation plan for steady-state measures.
//!
//! Measures form a small dependency graph. [`EVALUATION_ORDER`] is a
//! topological order of that graph; every [`Stage`] lists the stages it
//! reads, and [`evaluate`] refuses to read a stage that has not run yet.

use serde::Serialize;
use tracing::trace;

use crate::error::{QueueError, QueueResult};

use super::formulas::SteadyState;
use super::{QueueParams, QueueVariant};

/// One node of the evaluation plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    /// ρ
    Utilization,
    /// P0
    EmptyProbability,
    /// Pk for M/M/k, PE for finite models, ρ for M/M/1.
    WaitProbability,
    /// Lq
    QueueLength,
    /// L
    SystemLength,
    /// Ln
    NonEmptyQueueLength,
    /// Wq
    QueueWait,
    /// W
    SystemWait,
    /// Wn
    NonEmptyQueueWait,
}

/// Number of stages in the plan.
pub const STAGE_COUNT: usize = 9;

/// Stages in dependency order.
pub const EVALUATION_ORDER: [Stage; STAGE_COUNT] = [
    Stage::Utilization,
    Stage::EmptyProbability,
    Stage::WaitProbability,
    Stage::QueueLength,
    Stage::SystemLength,
    Stage::NonEmptyQueueLength,
    Stage::QueueWait,
    Stage::SystemWait,
    Stage::NonEmptyQueueWait,
];

impl Stage {
    /// Stages whose values this stage may read.
    #[must_use]
    pub const fn dependencies(self) -> &'static [Self] {
        match self {
            Self::Utilization => &[],
            Self::EmptyProbability => &[Self::Utilization],
            Self::WaitProbability | Self::QueueLength => &[Self::EmptyProbability],
            Self::SystemLength => &[Self::EmptyProbability, Self::QueueLength],
            Self::NonEmptyQueueLength => {
                &[Self::QueueLength, Self::SystemLength, Self::WaitProbability]
            }
            Self::QueueWait => &[Self::QueueLength, Self::SystemLength],
            Self::SystemWait => &[Self::QueueWait],
            Self::NonEmptyQueueWait => &[Self::QueueWait, Self::SystemWait, Self::WaitProbability],
        }
    }

    /// Conventional symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Utilization => "ro",
            Self::EmptyProbability => "P0",
            Self::WaitProbability => "P(wait)",
            Self::QueueLength => "Lq",
            Self::SystemLength => "L",
            Self::NonEmptyQueueLength => "Ln",
            Self::QueueWait => "Wq",
            Self::SystemWait => "W",
            Self::NonEmptyQueueWait => "Wn",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Values produced so far by a plan walk.
#[derive(Debug, Clone, Copy, Default)]
pub struct Computed {
    values: [Option<f64>; STAGE_COUNT],
}

impl Computed {
    /// Read the value of an already evaluated stage.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Computation`] if `stage` has not been evaluated.
    pub fn get(&self, stage: Stage) -> QueueResult<f64> {
        self.values[stage.index()].ok_or_else(|| {
            QueueError::computation(stage.symbol(), "read before it was evaluated")
        })
    }

    fn set(&mut self, stage: Stage, value: f64) {
        self.values[stage.index()] = Some(value);
    }
}

/// Reject NaN and infinities.
pub(crate) fn ensure_finite(measure: &str, value: f64) -> QueueResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(QueueError::computation(
            measure,
            format!("formula produced non-finite value {value}"),
        ))
    }
}

/// Walk [`EVALUATION_ORDER`] up to and including `target`.
pub(crate) fn evaluate(system: &dyn SteadyState, target: Stage) -> QueueResult<Computed> {
    let mut computed = Computed::default();
    for stage in EVALUATION_ORDER {
        for dep in stage.dependencies() {
            computed.get(*dep)?;
        }
        let value = match stage {
            Stage::Utilization => system.utilization(),
            Stage::EmptyProbability => system.empty_probability(&computed)?,
            Stage::WaitProbability => system.wait_probability(&computed)?,
            Stage::QueueLength => system.queue_length(&computed)?,
            Stage::SystemLength => system.system_length(&computed)?,
            Stage::NonEmptyQueueLength => system.non_empty_queue_length(&computed)?,
            Stage::QueueWait => system.queue_wait(&computed)?,
            Stage::SystemWait => system.system_wait(&computed)?,
            Stage::NonEmptyQueueWait => system.non_empty_queue_wait(&computed)?,
        };
        let value = ensure_finite(stage.symbol(), value)?;
        trace!(stage = stage.symbol(), value, "evaluated stage");
        computed.set(stage, value);
        if stage == target {
            break;
        }
    }
    Ok(computed)
}

/// Complete set of steady-state measures for one model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measures {
    /// Model variant.
    pub variant: QueueVariant,
    /// Utilization ρ (zero for finite models).
    pub utilization: f64,
    /// Probability of an empty system.
    pub p0: f64,
    /// Probability an arrival has to wait.
    pub wait_probability: f64,
    /// Expected number in queue.
    pub lq: f64,
    /// Expected number in system.
    pub l: f64,
    /// Expected queue length when a queue exists.
    pub ln: f64,
    /// Expected time in queue.
    pub wq: f64,
    /// Expected time in system.
    pub w: f64,
    /// Expected wait of customers who wait.
    pub wn: f64,
    /// Arrival rate actually entering the system.
    pub effective_arrival_rate: f64,
}

impl Measures {
    pub(crate) fn from_computed(params: &QueueParams, computed: &Computed) -> QueueResult<Self> {
        let l = computed.get(Stage::SystemLength)?;
        let effective_arrival_rate = match params.population {
            Some(m) if params.variant.is_finite_population() => {
                params.arrival_rate * (f64::from(m) - l)
            }
            _ => params.arrival_rate,
        };
        Ok(Self {
            variant: params.variant,
            utilization: computed.get(Stage::Utilization)?,
            p0: computed.get(Stage::EmptyProbability)?,
            wait_probability: computed.get(Stage::WaitProbability)?,
            lq: computed.get(Stage::QueueLength)?,
            l,
            ln: computed.get(Stage::NonEmptyQueueLength)?,
            wq: computed.get(Stage::QueueWait)?,
            w: computed.get(Stage::SystemWait)?,
            wn: computed.get(Stage::NonEmptyQueueWait)?,
            effective_arrival_rate,
        })
    }

    /// Relative residual of Little's Law `L = λ_eff · W`.
    #[must_use]
    pub fn littles_law_error(&self) -> f64 {
        let expected = self.effective_arrival_rate * self.w;
        if self.l.abs() > f64::EPSILON {
            (self.l - expected).abs() / self.l
        } else if expected.abs() > f64::EPSILON {
            (self.l - expected).abs() / expected
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_covers_every_stage_once() {
        for (i, stage) in EVALUATION_ORDER.iter().enumerate() {
            assert_eq!(stage.index(), i);
            assert_eq!(
                EVALUATION_ORDER.iter().filter(|s| *s == stage).count(),
                1
            );
        }
    }

    #[test]
    fn test_dependencies_precede_dependents() {
        for (position, stage) in EVALUATION_ORDER.iter().enumerate() {
            for dep in stage.dependencies() {
                let dep_position = EVALUATION_ORDER
                    .iter()
                    .position(|s| s == dep)
                    .unwrap_or(usize::MAX);
                assert!(
                    dep_position < position,
                    "{} depends on {} which is evaluated later",
                    stage.symbol(),
                    dep.symbol()
                );
            }
        }
    }

    #[test]
    fn test_documented_order() {
        let symbols: Vec<&str> = EVALUATION_ORDER.iter().map(|s| s.symbol()).collect();
        assert_eq!(
            symbols,
            ["ro", "P0", "P(wait)", "Lq", "L", "Ln", "Wq", "W", "Wn"]
        );
    }

    #[test]
    fn test_computed_get_unset_stage_fails() {
        let computed = Computed::default();
        let err = computed.get(Stage::QueueLength).unwrap_err();
        assert!(err.to_string().contains("Lq"));
    }

    #[test]
    fn test_computed_set_then_get() {
        let mut computed = Computed::default();
        computed.set(Stage::SystemWait, 0.25);
        assert!((computed.get(Stage::SystemWait).unwrap() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ensure_finite() {
        assert!(ensure_finite("L", 1.5).is_ok());
        assert!(ensure_finite("L", f64::NAN).is_err());
        assert!(ensure_finite("L", f64::INFINITY).is_err());
    }

    #[test]
    fn test_littles_law_error_zero_when_consistent() {
        let measures = Measures {
            variant: QueueVariant::SingleServerInfinite,
            utilization: 0.4,
            p0: 0.6,
            wait_probability: 0.4,
            lq: 4.0 / 15.0,
            l: 2.0 / 3.0,
            ln: 2.0 / 3.0,
            wq: 2.0 / 15.0,
            w: 1.0 / 3.0,
            wn: 1.0 / 3.0,
            effective_arrival_rate: 2.0,
        };
        assert!(measures.littles_law_error() < 1e-12);
    }
}
