use serde::Serialize;

use parley_core::{evaluate, Catalog, Evaluation, Irdi, ValueSet};

use super::CommandResult;

#[derive(Debug, Serialize)]
struct EvaluateOutcome {
    irdi: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

pub fn run(catalog: &Catalog, irdi: &str, values: &str) -> CommandResult {
    let values: ValueSet = match serde_json::from_str(values) {
        Ok(values) => values,
        Err(error) => {
            return CommandResult::failure("evaluate", "invalid_values_json", error.to_string(), 2)
        }
    };

    match evaluate(catalog, &Irdi::from(irdi), &values) {
        Ok(Evaluation::Valid) => CommandResult::payload(&EvaluateOutcome {
            irdi: irdi.to_owned(),
            status: "valid",
            reason: None,
        }),
        Ok(Evaluation::Invalid(failure)) => CommandResult::payload_with_code(
            &EvaluateOutcome {
                irdi: irdi.to_owned(),
                status: "invalid",
                reason: Some(failure.to_string()),
            },
            1,
        ),
        Err(error) => CommandResult::failure("evaluate", "catalog_not_found", error.to_string(), 1),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use parley_core::{CapabilitySchema, Catalog, Element, Irdi, ValueType};

    fn catalog() -> Catalog {
        let schema = CapabilitySchema {
            submodel_elements: vec![Element {
                id_short: "power".to_owned(),
                semantic_id: "s1".to_owned(),
                value_type: ValueType::Integer,
                value: None,
            }],
        };
        let mut capabilities = BTreeMap::new();
        capabilities.insert(Irdi::from("X"), schema);
        Catalog::new(capabilities, Vec::new())
    }

    #[test]
    fn valid_value_set_exits_zero() {
        let result = super::run(&catalog(), "X", r#"{ "s1": 42 }"#);
        assert_eq!(result.exit_code, 0);
        assert!(result.output.contains("valid"));
    }

    #[test]
    fn invalid_value_set_reports_the_first_failure() {
        let result = super::run(&catalog(), "X", r#"{ "s1": "42" }"#);
        assert_eq!(result.exit_code, 1);
        assert!(result.output.contains("type for power (s1) is invalid"));
    }

    #[test]
    fn malformed_values_json_is_a_usage_error() {
        let result = super::run(&catalog(), "X", "{ not json");
        assert_eq!(result.exit_code, 2);
        assert!(result.output.contains("invalid_values_json"));
    }
}
