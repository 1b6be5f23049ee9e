//! Static metadata for presentation layers.
//!
//! Parameter discovery tells a front end which inputs a model needs, and
//! [`describe`] gives a human-readable label for every result key.

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::QueueVariant;

/// An input accepted by the calculation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Parameter {
    /// Request field name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
}

const LAMBDA: Parameter = Parameter {
    name: "lambda",
    description: "Arrival rate (λ)",
};
const MU: Parameter = Parameter {
    name: "mu",
    description: "Service rate (μ)",
};
const SERVERS: Parameter = Parameter {
    name: "k",
    description: "Number of servers",
};
const POPULATION: Parameter = Parameter {
    name: "M",
    description: "Population size",
};

const OPTIONAL: [Parameter; 4] = [
    Parameter {
        name: "n_clients",
        description: "Number of customers for P(n)",
    },
    Parameter {
        name: "cost_wait",
        description: "Unit cost of waiting time",
    },
    Parameter {
        name: "cost_server",
        description: "Daily cost per server",
    },
    Parameter {
        name: "hours",
        description: "Working hours per day",
    },
];

/// Required and optional inputs of one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSpec {
    /// Model tag.
    pub model: &'static str,
    /// Names of the required inputs.
    pub required_params: Vec<&'static str>,
    /// Descriptions of the required inputs.
    pub descriptions: IndexMap<&'static str, &'static str>,
    /// Names of the optional inputs.
    pub optional_params: Vec<&'static str>,
    /// Descriptions of the optional inputs.
    pub optional_descriptions: IndexMap<&'static str, &'static str>,
}

/// Required inputs for `variant`.
#[must_use]
pub fn required_parameters(variant: QueueVariant) -> Vec<Parameter> {
    match variant {
        QueueVariant::SingleServerInfinite => vec![LAMBDA, MU],
        QueueVariant::MultiServerInfinite => vec![LAMBDA, MU, SERVERS],
        QueueVariant::SingleServerFinite => vec![LAMBDA, MU, POPULATION],
        QueueVariant::MultiServerFinite => vec![LAMBDA, MU, SERVERS, POPULATION],
    }
}

/// Optional inputs shared by every model.
#[must_use]
pub fn optional_parameters() -> &'static [Parameter] {
    &OPTIONAL
}

/// Parameter discovery for `variant`.
#[must_use]
pub fn parameter_spec(variant: QueueVariant) -> ParameterSpec {
    let required = required_parameters(variant);
    let optional = optional_parameters();
    ParameterSpec {
        model: variant.tag(),
        required_params: required.iter().map(|p| p.name).collect(),
        descriptions: required.iter().map(|p| (p.name, p.description)).collect(),
        optional_params: optional.iter().map(|p| p.name).collect(),
        optional_descriptions: optional.iter().map(|p| (p.name, p.description)).collect(),
    }
}

/// Human-readable label for a result key.
///
/// `P{n}` keys produced for a requested state are recognized as well.
#[must_use]
pub fn describe(key: &str) -> Option<String> {
    let label = match key {
        "ro" => "Utilization factor (ρ)",
        "P0" => "Probability of an empty system",
        "Pk" => "Probability that all k servers are busy",
        "PE" => "Probability that an arriving customer waits",
        "PNE" => "Probability that an arriving customer does not wait",
        "L" => "Expected number of customers in the system (L)",
        "Lq" => "Expected number of customers in the queue (Lq)",
        "Ln" => "Expected queue length when there is a queue (Ln)",
        "W" => "Expected time in the system (W)",
        "Wq" => "Expected time in the queue (Wq)",
        "Wn" => "Expected wait when there is a queue (Wn)",
        "CTte" => "Total cost of waiting time",
        "CTts" => "Total cost of time in the system",
        "CTse" => "Total cost of service time",
        "CTs" => "Total cost of servers",
        "CT" => "Total system cost",
        _ => {
            let n = key.strip_prefix('P')?.parse::<u64>().ok()?;
            return Some(format!("Probability of {n} customers in the system"));
        }
    };
    Some(label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_parameters_per_variant() {
        let names = |v| {
            required_parameters(v)
                .iter()
                .map(|p| p.name)
                .collect::<Vec<_>>()
        };
        assert_eq!(names(QueueVariant::SingleServerInfinite), ["lambda", "mu"]);
        assert_eq!(names(QueueVariant::MultiServerInfinite), ["lambda", "mu", "k"]);
        assert_eq!(names(QueueVariant::SingleServerFinite), ["lambda", "mu", "M"]);
        assert_eq!(
            names(QueueVariant::MultiServerFinite),
            ["lambda", "mu", "k", "M"]
        );
    }

    #[test]
    fn test_parameter_spec_shape() {
        let spec = parameter_spec(QueueVariant::MultiServerFinite);
        assert_eq!(spec.model, "PFCM");
        assert_eq!(spec.descriptions.len(), spec.required_params.len());
        assert_eq!(spec.descriptions.get("M"), Some(&"Population size"));
        assert_eq!(
            spec.optional_params,
            ["n_clients", "cost_wait", "cost_server", "hours"]
        );
        assert!(!spec.descriptions.contains_key("hours"));
    }

    #[test]
    fn test_parameter_spec_serializes() {
        let spec = parameter_spec(QueueVariant::SingleServerInfinite);
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["required_params"], serde_json::json!(["lambda", "mu"]));
        assert_eq!(json["optional_descriptions"]["hours"], "Working hours per day");
    }

    #[test]
    fn test_describe_known_keys() {
        for key in [
            "ro", "P0", "Pk", "PE", "PNE", "L", "Lq", "Ln", "W", "Wq", "Wn", "CTte", "CTts",
            "CTse", "CTs", "CT",
        ] {
            assert!(describe(key).is_some(), "missing label for {key}");
        }
    }

    #[test]
    fn test_describe_state_probability() {
        assert_eq!(
            describe("P7").as_deref(),
            Some("Probability of 7 customers in the system")
        );
        assert!(describe("Pfoo").is_none());
        assert!(describe("unknown").is_none());
    }
}
