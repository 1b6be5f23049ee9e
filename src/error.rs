//! Error types for queuecalc.
//!
//! Every stability-dependent computation returns `Result<T, QueueError>`
//! instead of panicking or substituting a default for an undefined measure.

use thiserror::Error;

use crate::model::QueueVariant;

/// Result type alias for queuecalc operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Unified error type for all queuecalc operations.
#[derive(Debug, Error)]
pub enum QueueError {
    // ===== Model Errors =====
    /// Infinite-population system whose utilization is not below one.
    #[error(
        "System is not stable: utilization ρ = λ/(kμ) = {utilization:.6} with k = {servers} \
         must be strictly less than 1"
    )]
    Instability {
        /// Observed utilization λ/(kμ).
        utilization: f64,
        /// Number of parallel servers.
        servers: u32,
    },

    /// Unrecognized model tag.
    #[error("Invalid model '{0}': expected one of PICS, PICM, PFCS, PFCM")]
    InvalidModel(String),

    /// A formula produced a value that is not a finite real number.
    #[error("Computation error in {measure}: {reason}")]
    Computation {
        /// Measure being evaluated.
        measure: String,
        /// Description of the underlying failure.
        reason: String,
    },

    /// A model parameter is outside its domain.
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Why the value was rejected.
        message: String,
    },

    /// Measure requested from a variant that does not define it.
    #[error("{measure} is not defined for the {variant} model")]
    NotApplicable {
        /// Requested measure.
        measure: &'static str,
        /// Variant that was asked.
        variant: QueueVariant,
    },

    // ===== Configuration Errors =====
    /// Invalid scenario configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl QueueError {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid-parameter error.
    #[must_use]
    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a computation error for `measure`.
    #[must_use]
    pub fn computation(measure: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Computation {
            measure: measure.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error reports an unstable system.
    #[must_use]
    pub const fn is_instability(&self) -> bool {
        matches!(self, Self::Instability { .. })
    }

    /// Check if this error was caused by caller input rather than arithmetic.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidModel(_)
                | Self::InvalidParameter { .. }
                | Self::NotApplicable { .. }
                | Self::Config { .. }
                | Self::YamlParse(_)
                | Self::Json(_)
                | Self::Validation(_)
        )
    }
}
