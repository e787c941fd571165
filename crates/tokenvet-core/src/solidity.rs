//! Structural validation of Solidity source submissions.
//!
//! All checks are textual. The dangerous-pattern table flags code for
//! review; it does not prove safety, and a pattern inside a comment or
//! string literal will still match. Known limitation.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::limits::MAX_SOLIDITY_BYTES;
use crate::paths::validate_contract_name;
use crate::result::Validation;

/// Oldest pragma version that does not draw a warning.
const MIN_PRAGMA: (u32, u32) = (0, 8);

/// `pragma solidity <expr>;`
static PRAGMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"pragma\s+solidity\s+([^;]+);").unwrap());

/// First `x.y.z` inside a pragma expression.
static VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\.(\d+)\.(\d+)").unwrap());

/// Declarative table of dangerous syntactic patterns. Matches produce
/// warnings, never failures.
static DANGEROUS_PATTERNS: Lazy<Vec<(&'static str, Regex, &'static str)>> = Lazy::new(|| {
    [
        (
            "selfdestruct",
            r"\bselfdestruct\s*\(",
            "selfdestruct can remove the contract and drain funds",
        ),
        (
            "suicide",
            r"\bsuicide\s*\(",
            "suicide is deprecated; behaves like selfdestruct",
        ),
        (
            "delegatecall",
            r"\bdelegatecall\b",
            "delegatecall executes foreign code in this contract's storage context",
        ),
        (
            "tx.origin",
            r"tx\.origin",
            "tx.origin authorization is phishable; use msg.sender",
        ),
        (
            "blockhash",
            r"\bblockhash\s*\(",
            "blockhash is miner-influenced; unsafe as a randomness source",
        ),
        (
            "callcode",
            r"\bcallcode\b",
            "callcode is deprecated; use delegatecall semantics deliberately",
        ),
        (
            "inline assembly",
            r"\bassembly\s*\{",
            "inline assembly bypasses Solidity safety checks",
        ),
        (
            "low-level call",
            r"\.call\s*[({]",
            "low-level .call forwards all gas and ignores return types",
        ),
        (
            "ecrecover",
            r"\becrecover\s*\(",
            "ecrecover is malleable without EIP-2 guard checks",
        ),
        (
            ".transfer(",
            r"\.transfer\s*\(",
            ".transfer's 2300 gas stipend breaks with gas repricing",
        ),
    ]
    .into_iter()
    .map(|(name, pattern, message)| (name, Regex::new(pattern).unwrap(), message))
    .collect()
});

/// Validate Solidity source against an expected declaration identifier.
///
/// Hard failures: empty/oversize content, missing pragma, no
/// contract/interface/library/abstract-contract declaration matching
/// `expected_name`. Everything else (missing SPDX, old or exact pragma,
/// dangerous patterns) accumulates as warnings.
pub fn validate_solidity(content: &str, expected_name: &str) -> Validation {
    let name_check = validate_contract_name(expected_name);
    if !name_check.valid {
        return name_check;
    }

    if content.trim().is_empty() {
        return Validation::fail(format!("{expected_name}.sol: source file is empty"));
    }

    if content.len() as u64 > MAX_SOLIDITY_BYTES {
        return Validation::fail(format!(
            "{expected_name}.sol: source exceeds {MAX_SOLIDITY_BYTES} bytes"
        ));
    }

    let Some(pragma) = PRAGMA.captures(content) else {
        return Validation::fail(format!(
            "{expected_name}.sol: missing pragma solidity directive"
        ));
    };

    // expected_name is PascalCase alphanumeric, but escape anyway before it
    // enters a pattern.
    let declaration = Regex::new(&format!(
        r"\b(?:abstract\s+contract|contract|interface|library)\s+{}\b",
        regex::escape(expected_name)
    ))
    .expect("escaped identifier always forms a valid pattern");

    if !declaration.is_match(content) {
        return Validation::fail(format!(
            "No declaration found for {expected_name} (expected contract, interface, library or abstract contract)"
        ));
    }

    let mut result = Validation::ok();

    if !content.contains("SPDX-License-Identifier:") {
        result = result.warn(format!("{expected_name}.sol: missing SPDX license identifier"));
    }

    let pragma_expr = pragma[1].trim();
    if VERSION.is_match(pragma_expr) && !pragma_expr.contains(['^', '>', '<', '~', '=', '*']) {
        result = result.warn(format!(
            "{expected_name}.sol: exact pragma version {pragma_expr} pins the compiler; consider a range"
        ));
    }
    if let Some(version) = VERSION.captures(pragma_expr) {
        let major: u32 = version[1].parse().unwrap_or(0);
        let minor: u32 = version[2].parse().unwrap_or(0);
        if (major, minor) < MIN_PRAGMA {
            result = result.warn(format!(
                "{expected_name}.sol: pragma version {major}.{minor} is below 0.8; arithmetic is unchecked"
            ));
        }
    }

    for (name, pattern, message) in DANGEROUS_PATTERNS.iter() {
        if pattern.is_match(content) {
            result = result.warn(format!("{expected_name}.sol: uses {name}: {message}"));
        }
    }

    result
}
