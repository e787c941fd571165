//! Ethereum-style address validation.
//!
//! Three layers, composed by [`validate_token_address`] in a fixed order:
//!
//! 1. directory safety — the submission directory name must not be able to
//!    escape its parent, checked both by character blacklist and by resolved
//!    path containment
//! 2. checksum — the address must be byte-identical to its own EIP-55
//!    canonical rendering and must not be the zero address
//! 3. match — the address field must equal the directory name exactly
//!
//! An unsafe directory name never reaches checksum computation.

use std::path::Path;

use sha3::{Digest, Keccak256};

use crate::paths;
use crate::result::Validation;

/// The all-zero address, rejected unconditionally.
const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// True iff `s` is exactly `0x` + 40 hex digits (case-insensitive).
///
/// Pure syntactic check; no checksum semantics.
pub fn is_valid_format(s: &str) -> bool {
    let Some(body) = s.strip_prefix("0x") else {
        return false;
    };
    body.len() == 40 && body.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Compute the canonical EIP-55 checksummed rendering of `address`.
///
/// Returns `None` when the input is not a valid-format address.
pub fn to_checksum_address(address: &str) -> Option<String> {
    if !is_valid_format(address) {
        return None;
    }

    let body = address[2..].to_ascii_lowercase();
    let digest = Keccak256::digest(body.as_bytes());
    let hash = hex::encode(digest);

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (ch, nibble) in body.chars().zip(hash.chars()) {
        if ch.is_ascii_alphabetic() && nibble.to_digit(16).unwrap_or(0) >= 8 {
            out.push(ch.to_ascii_uppercase());
        } else {
            out.push(ch);
        }
    }
    Some(out)
}

/// Validate that `address` is in canonical EIP-55 form.
///
/// Rejects the zero address, and any rendering (including an all-lowercase
/// but otherwise correct one) that differs from the canonical form — the
/// expected form is named in the error, never silently substituted. On
/// success `value` carries the checksummed address.
pub fn validate_checksum(address: &str, context: &str) -> Validation {
    if !is_valid_format(address) {
        return Validation::fail(format!(
            "{context}: invalid address format: {address}"
        ));
    }

    if address.eq_ignore_ascii_case(ZERO_ADDRESS) {
        return Validation::fail(format!("{context}: zero address not allowed"));
    }

    match to_checksum_address(address) {
        Some(checksummed) if checksummed == address => Validation::ok_with(checksummed),
        Some(checksummed) => Validation::fail(format!(
            "{context}: address checksum mismatch: expected {checksummed}, got {address}"
        )),
        // Format was already checked; treat a failure here as an address
        // error rather than propagating a fault.
        None => Validation::fail(format!(
            "{context}: unable to compute checksum for {address}"
        )),
    }
}

/// Validate a submission directory name against its parent.
///
/// The character blacklist rejects the common traversal vectors; the
/// resolved-path containment check is performed independently because it
/// catches vectors the blacklist cannot anticipate (symlinked parents,
/// platform separator handling).
pub fn validate_directory(dir_name: &str, parent: &Path) -> Validation {
    if !is_valid_format(dir_name) {
        return Validation::fail(format!(
            "directory name is not a valid address: {dir_name}"
        ));
    }

    if dir_name.contains("..") || dir_name.contains('/') || dir_name.contains('\\') {
        return Validation::fail(format!(
            "directory name contains path traversal characters: {dir_name}"
        ));
    }

    let resolved_parent = paths::resolve_lexical(parent);
    // Compare against the parent's real path when it exists, so a symlinked
    // parent cannot shift the containment boundary.
    let resolved_parent = std::fs::canonicalize(&resolved_parent).unwrap_or(resolved_parent);
    let resolved_child = paths::resolve_lexical(&resolved_parent.join(dir_name));

    if !paths::is_strict_descendant(&resolved_child, &resolved_parent) {
        tracing::warn!(
            dir = dir_name,
            parent = %resolved_parent.display(),
            "directory name passed the blacklist but escaped on resolution"
        );
        return Validation::fail(format!(
            "directory {dir_name} resolves outside its parent directory"
        ));
    }

    Validation::ok()
}

/// Require the `address` field to equal the directory name exactly.
pub fn validate_matches_directory(address: &str, dir_name: &str) -> Validation {
    if address == dir_name {
        Validation::ok()
    } else {
        Validation::fail(format!(
            "address {address} does not match directory name {dir_name}"
        ))
    }
}

/// Full token-address validation: directory safety, then checksum, then
/// directory match, short-circuiting on the first failure.
pub fn validate_token_address(
    address: &str,
    dir_name: &str,
    parent: &Path,
    context: &str,
) -> Validation {
    let dir = validate_directory(dir_name, parent);
    if !dir.valid {
        return dir;
    }

    let checksum = validate_checksum(address, context);
    if !checksum.valid {
        return checksum;
    }

    let matches = validate_matches_directory(address, dir_name);
    if !matches.valid {
        return matches;
    }

    checksum
}
