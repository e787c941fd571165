//! The uniform result record returned by every validator.

use serde::Serialize;

/// Outcome of a single validation.
///
/// Invariants: `valid == true` implies `error` is `None`; `valid == false`
/// implies `error` is `Some` and non-empty. `warnings` may be present either
/// way and never affect `valid`.
#[derive(Debug, Clone, Serialize)]
pub struct Validation {
    /// Whether the input is accepted.
    pub valid: bool,

    /// Human-readable, context-qualified rejection reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Non-fatal quality signals, in the order they were produced.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// Canonical rendering produced by the validator, when one exists
    /// (checksummed address, joined path).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Validation {
    /// Accepted, with no canonical value.
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
            warnings: Vec::new(),
            value: None,
        }
    }

    /// Accepted, carrying a canonical value.
    pub fn ok_with(value: impl Into<String>) -> Self {
        Self {
            valid: true,
            error: None,
            warnings: Vec::new(),
            value: Some(value.into()),
        }
    }

    /// Rejected with a reason.
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
            warnings: Vec::new(),
            value: None,
        }
    }

    /// Append a warning, keeping order.
    pub fn warn(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}
