//! # queuecalc
//!
//! Steady-state performance metrics for the four classical Markovian
//! queueing models:
//! - M/M/1 (`PICS`): single server, infinite population
//! - M/M/k (`PICM`): multiple servers, infinite population
//! - M/M/1/M/M (`PFCS`): single server, finite population
//! - M/M/k/M/M (`PFCM`): multiple servers, finite population
//!
//! Every stability-dependent measure returns a [`QueueResult`]; an unstable
//! infinite-population system yields [`QueueError::Instability`] rather than
//! a meaningless number.
//!
//! ## Example
//!
//! ```rust
//! use queuecalc::prelude::*;
//!
//! let params = QueueParams::new(QueueVariant::MultiServerInfinite, 8.0, 5.0).with_servers(2);
//! let model = QueueModel::new(params).unwrap();
//! let metrics = model.calculate(Some(3), None).unwrap();
//! assert!((metrics.get("ro").unwrap() - 0.8).abs() < 1e-12);
//! assert!(metrics.contains("Pk"));
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::suboptimal_flops,  // Formulas are written as they appear in queueing texts
    clippy::imprecise_flops,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,  // Many functions can't be const in stable Rust
    clippy::float_cmp,
)]

pub mod catalog;
pub mod cli;
pub mod config;
pub mod cost;
pub mod error;
pub mod logging;
pub mod math;
pub mod metrics;
pub mod model;
pub mod request;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{OutputFormat, ScenarioBuilder, ScenarioConfig};
    pub use crate::cost::{CostBreakdown, CostParams};
    pub use crate::error::{QueueError, QueueResult};
    pub use crate::metrics::Metrics;
    pub use crate::model::{Measures, QueueModel, QueueParams, QueueVariant, Stage};
    pub use crate::request::{handle_request, CalculationRequest, Report, Response};
}

/// Re-export for public API
pub use error::{QueueError, QueueResult};
