//! Explicit result accumulator for a validation run.
//!
//! Errors and warnings are threaded through this value rather than global
//! counters, so runs stay independently testable and parallel-safe.

use serde::Serialize;
use tokenvet_core::safe_json::sanitize_for_display;
use tokenvet_core::Validation;

use crate::args::OutputFormat;
use crate::exit_codes;

#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub checked: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Report {
    /// Fold one validation outcome into the report.
    pub fn record(&mut self, context: &str, validation: Validation) {
        if let Some(error) = validation.error {
            self.errors.push(format!("{context}: {error}"));
        }
        for warning in validation.warnings {
            self.warnings.push(format!("{context}: {warning}"));
        }
    }

    /// Record a resource error (file not found, too large, bad JSON).
    pub fn record_error(&mut self, context: &str, message: impl std::fmt::Display) {
        self.errors.push(format!("{context}: {message}"));
    }

    pub fn exit_code(&self) -> i32 {
        if self.errors.is_empty() {
            exit_codes::SUCCESS
        } else {
            exit_codes::VALIDATION_FAILED
        }
    }

    /// Print the report. Every line passes through the display sanitizer:
    /// messages echo attacker-supplied substrings verbatim.
    pub fn print(&self, format: OutputFormat) {
        match format {
            OutputFormat::Json => {
                let sanitized = Report {
                    checked: self.checked,
                    errors: self.errors.iter().map(|e| sanitize_for_display(e)).collect(),
                    warnings: self
                        .warnings
                        .iter()
                        .map(|w| sanitize_for_display(w))
                        .collect(),
                };
                println!(
                    "{}",
                    serde_json::to_string_pretty(&sanitized)
                        .unwrap_or_else(|_| "{}".to_string())
                );
            }
            OutputFormat::Text => {
                for error in &self.errors {
                    println!("error: {}", sanitize_for_display(error));
                }
                for warning in &self.warnings {
                    println!("warning: {}", sanitize_for_display(warning));
                }
                println!(
                    "checked {} submission(s): {} error(s), {} warning(s)",
                    self.checked,
                    self.errors.len(),
                    self.warnings.len()
                );
            }
        }
    }
}
