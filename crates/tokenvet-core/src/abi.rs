//! Structural validation of contract ABI definitions.
//!
//! The ABI arrives as an untrusted JSON tree. Hard rules (unknown item
//! types, malformed or reserved identifiers) short-circuit with a single
//! error; soft omissions (missing `inputs`/`outputs`) accumulate as
//! warnings. Reserved identifiers are rejected even though the JSON layer
//! already suppresses them as keys: a parameter *name* is plain string data
//! here, but becomes a property key the moment a consumer decodes calldata
//! into an object.
//!
//! Tuple components recurse without a depth ceiling; a hostile,
//! pathologically deep ABI costs recursion time. Known limitation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::limits::is_reserved_key;
use crate::result::Validation;

/// Accepted ABI item types.
const ITEM_TYPES: &[&str] = &[
    "function",
    "constructor",
    "event",
    "fallback",
    "receive",
    "error",
];

/// Accepted state mutability values.
const STATE_MUTABILITY: &[&str] = &["pure", "view", "nonpayable", "payable"];

/// Conservative identifier shape for names.
static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap());

/// Allowed characters in a parameter type string (`uint256`, `bytes32[4]`,
/// `tuple[]`, ...).
static TYPE_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9\[\]]+$").unwrap());

/// Validate one ABI parameter, recursing into tuple components.
pub fn validate_parameter(param: &Value, context: &str) -> Validation {
    let Some(object) = param.as_object() else {
        return Validation::fail(format!("{context}: parameter must be an object"));
    };

    let Some(type_str) = object.get("type").and_then(Value::as_str) else {
        return Validation::fail(format!("{context}: parameter is missing a type string"));
    };

    if !TYPE_SHAPE.is_match(type_str) {
        return Validation::fail(format!(
            "{context}: parameter type contains invalid characters: {type_str}"
        ));
    }

    if let Some(name_value) = object.get("name") {
        let Some(name) = name_value.as_str() else {
            return Validation::fail(format!("{context}: parameter name must be a string"));
        };

        if !name.is_empty() {
            if is_reserved_key(name) {
                return Validation::fail(format!(
                    "{context}: parameter name {name} is not allowed"
                ));
            }
            if !IDENTIFIER.is_match(name) {
                return Validation::fail(format!(
                    "{context}: parameter name is not a valid identifier: {name}"
                ));
            }
        }
    }

    let mut result = Validation::ok();

    if type_str.starts_with("tuple") {
        match object.get("components") {
            Some(Value::Array(components)) => {
                for (i, component) in components.iter().enumerate() {
                    let child =
                        validate_parameter(component, &format!("{context} component {i}"));
                    if !child.valid {
                        return child;
                    }
                    result.warnings.extend(child.warnings);
                }
            }
            Some(_) => {
                return Validation::fail(format!(
                    "{context}: tuple components must be an array"
                ));
            }
            None => {
                result = result.warn(format!(
                    "{context}: tuple parameter has no components array"
                ));
            }
        }
    }

    result
}

/// Validate one ABI item (function, constructor, event, ...).
pub fn validate_item(item: &Value, context: &str) -> Validation {
    let Some(object) = item.as_object() else {
        return Validation::fail(format!("{context}: ABI item must be an object"));
    };

    let Some(item_type) = object.get("type").and_then(Value::as_str) else {
        return Validation::fail(format!("{context}: ABI item is missing a type"));
    };

    if !ITEM_TYPES.contains(&item_type) {
        return Validation::fail(format!(
            "{context}: unknown ABI item type: {item_type}"
        ));
    }

    if matches!(item_type, "function" | "event" | "error") {
        let Some(name) = object.get("name").and_then(Value::as_str) else {
            return Validation::fail(format!(
                "{context}: {item_type} item requires a name"
            ));
        };
        if is_reserved_key(name) {
            return Validation::fail(format!("{context}: item name {name} is not allowed"));
        }
        if !IDENTIFIER.is_match(name) {
            return Validation::fail(format!(
                "{context}: item name is not a valid identifier: {name}"
            ));
        }
    }

    let mut result = Validation::ok();

    if matches!(item_type, "function" | "constructor") {
        match object.get("inputs") {
            Some(Value::Array(inputs)) => {
                for (i, input) in inputs.iter().enumerate() {
                    let checked = validate_parameter(input, &format!("{context} input {i}"));
                    if !checked.valid {
                        return checked;
                    }
                    result.warnings.extend(checked.warnings);
                }
            }
            Some(_) => {
                return Validation::fail(format!("{context}: inputs must be an array"));
            }
            None => {
                result = result.warn(format!("{context}: {item_type} has no inputs array"));
            }
        }
    } else if let Some(Value::Array(inputs)) = object.get("inputs") {
        // Events and errors carry parameters too; absence is fine but
        // present ones follow the same rules.
        for (i, input) in inputs.iter().enumerate() {
            let checked = validate_parameter(input, &format!("{context} input {i}"));
            if !checked.valid {
                return checked;
            }
            result.warnings.extend(checked.warnings);
        }
    }

    if item_type == "function" {
        match object.get("outputs") {
            Some(Value::Array(outputs)) => {
                for (i, output) in outputs.iter().enumerate() {
                    let checked = validate_parameter(output, &format!("{context} output {i}"));
                    if !checked.valid {
                        return checked;
                    }
                    result.warnings.extend(checked.warnings);
                }
            }
            Some(_) => {
                return Validation::fail(format!("{context}: outputs must be an array"));
            }
            None => {
                result = result.warn(format!("{context}: function has no outputs array"));
            }
        }
    }

    if let Some(mutability) = object.get("stateMutability") {
        match mutability.as_str() {
            Some(m) if STATE_MUTABILITY.contains(&m) => {}
            Some(m) => {
                return Validation::fail(format!(
                    "{context}: unknown stateMutability: {m}"
                ));
            }
            None => {
                return Validation::fail(format!(
                    "{context}: stateMutability must be a string"
                ));
            }
        }
    }

    result
}

/// Validate a whole ABI document.
///
/// Hard failures short-circuit with that single error; warnings from every
/// item accumulate in order. An ABI with no constructor or function item is
/// flagged (interface/library heuristic) but not rejected.
pub fn validate_abi(abi: &Value) -> Validation {
    let Some(items) = abi.as_array() else {
        return Validation::fail("ABI must be an array");
    };

    if items.is_empty() {
        return Validation::fail("ABI must not be empty");
    }

    let mut result = Validation::ok();

    for (i, item) in items.iter().enumerate() {
        let checked = validate_item(item, &format!("ABI item {i}"));
        if !checked.valid {
            return checked;
        }
        result.warnings.extend(checked.warnings);
    }

    let has_callable = items.iter().any(|item| {
        matches!(
            item.get("type").and_then(Value::as_str),
            Some("constructor") | Some("function")
        )
    });
    if !has_callable {
        result = result.warn(
            "ABI has no constructor or function items; this may be an interface or library",
        );
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_function_item() {
        let abi = json!([{
            "type": "function",
            "name": "transfer",
            "inputs": [
                { "name": "to", "type": "address" },
                { "name": "amount", "type": "uint256" }
            ],
            "outputs": [ { "name": "", "type": "bool" } ],
            "stateMutability": "nonpayable"
        }]);
        let result = validate_abi(&abi);
        assert!(result.valid, "{:?}", result.error);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_reserved_parameter_name_rejected() {
        let abi = json!([{
            "type": "function",
            "name": "f",
            "inputs": [ { "name": "__proto__", "type": "uint256" } ],
            "outputs": []
        }]);
        let result = validate_abi(&abi);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("not allowed"));
    }

    #[test]
    fn test_reserved_names_all_rejected() {
        for name in ["__proto__", "constructor", "prototype"] {
            let param = json!({ "name": name, "type": "uint256" });
            let result = validate_parameter(&param, "input 0");
            assert!(!result.valid, "{name}");
        }
    }

    #[test]
    fn test_empty_parameter_name_allowed() {
        let param = json!({ "name": "", "type": "uint256" });
        assert!(validate_parameter(&param, "output 0").valid);
    }

    #[test]
    fn test_parameter_type_required_and_shaped() {
        let missing = json!({ "name": "x" });
        assert!(!validate_parameter(&missing, "input 0").valid);

        let injected = json!({ "name": "x", "type": "uint256; DROP TABLE" });
        assert!(!validate_parameter(&injected, "input 0").valid);

        let array_type = json!({ "name": "x", "type": "uint256[2]" });
        assert!(validate_parameter(&array_type, "input 0").valid);
    }

    #[test]
    fn test_tuple_components_recurse() {
        let param = json!({
            "name": "order",
            "type": "tuple",
            "components": [
                { "name": "maker", "type": "address" },
                {
                    "name": "nested",
                    "type": "tuple[]",
                    "components": [ { "name": "__proto__", "type": "uint8" } ]
                }
            ]
        });
        let result = validate_parameter(&param, "input 0");
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("not allowed"));
    }

    #[test]
    fn test_tuple_without_components_warns() {
        let param = json!({ "name": "t", "type": "tuple" });
        let result = validate_parameter(&param, "input 0");
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_unknown_item_type_rejected() {
        let abi = json!([{ "type": "virus", "name": "x" }]);
        assert!(!validate_abi(&abi).valid);
    }

    #[test]
    fn test_function_requires_name() {
        let abi = json!([{ "type": "function", "inputs": [], "outputs": [] }]);
        let result = validate_abi(&abi);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("requires a name"));
    }

    #[test]
    fn test_fallback_needs_no_name() {
        let abi = json!([
            { "type": "fallback", "stateMutability": "payable" },
            { "type": "receive", "stateMutability": "payable" }
        ]);
        let result = validate_abi(&abi);
        assert!(result.valid, "{:?}", result.error);
        // No constructor/function item -> interface heuristic warning.
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_missing_inputs_and_outputs_warn() {
        let abi = json!([{ "type": "function", "name": "f" }]);
        let result = validate_abi(&abi);
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_bad_state_mutability_rejected() {
        let abi = json!([{
            "type": "function",
            "name": "f",
            "inputs": [],
            "outputs": [],
            "stateMutability": "magic"
        }]);
        let result = validate_abi(&abi);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("stateMutability"));
    }

    #[test]
    fn test_abi_must_be_non_empty_array() {
        assert!(!validate_abi(&json!({})).valid);
        assert!(!validate_abi(&json!([])).valid);
    }
}
