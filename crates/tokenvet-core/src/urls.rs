//! SSRF-safe URL validation.
//!
//! URLs in submissions are validated, never fetched. A URL is accepted only
//! if it is well-formed `https://`, within the length ceiling, free of
//! whitespace and control characters, resolves to a hostname outside the
//! blocked literal and network-range sets, and uses the default HTTPS port.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::limits::MAX_URL_LENGTH;
use crate::result::Validation;

/// Literal hostnames that are never acceptable targets.
const BLOCKED_HOSTS: &[&str] = &[
    "localhost",
    "127.0.0.1",
    "0.0.0.0",
    "::1",
    "[::1]",
    "169.254.169.254",
    "metadata.google.internal",
    "metadata.goog",
];

/// Address-range patterns covering private, loopback, link-local and
/// unique-local space, IPv4 and IPv6.
static BLOCKED_IP_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^10\.",                      // 10/8
        r"^172\.(1[6-9]|2[0-9]|3[01])\.", // 172.16/12
        r"^192\.168\.",                // 192.168/16
        r"^127\.",                     // 127/8 loopback
        r"^0\.",                       // 0/8 "this network"
        r"^169\.254\.",                // IPv4 link-local
        r"^::1$",                      // IPv6 loopback
        r"^fe80:",                     // IPv6 link-local
        r"^fc00:",                     // IPv6 unique-local
        r"^fd00:",                     // IPv6 unique-local
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Strict shape: https scheme followed by non-whitespace only.
static URL_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https://\S+$").unwrap());

/// Syntactic checks that must pass before the string is handed to a parser.
///
/// Rejecting whitespace and CR/LF here defeats header/response-splitting
/// style payloads outright.
pub fn validate_format(url: &str) -> Validation {
    if url.is_empty() {
        return Validation::fail("URL must not be empty");
    }

    if url.len() > MAX_URL_LENGTH {
        return Validation::fail(format!(
            "URL exceeds maximum length of {MAX_URL_LENGTH} characters"
        ));
    }

    // Control characters would survive the shape regex (`\S` matches them)
    // and the parser percent-encodes rather than rejects, so gate them here.
    if url.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Validation::fail("URL contains whitespace or control characters");
    }

    if !URL_SHAPE.is_match(url) {
        return Validation::fail(format!("URL must start with https://: {url}"));
    }

    Validation::ok()
}

/// True iff `hostname` is a blocked literal or matches a blocked range.
///
/// Case-insensitive; IPv6 hosts are checked with and without brackets.
pub fn is_blocked_host(hostname: &str) -> bool {
    let host = hostname.to_ascii_lowercase();
    let host = host.trim_start_matches('[').trim_end_matches(']');

    if BLOCKED_HOSTS
        .iter()
        .any(|blocked| blocked.trim_matches(['[', ']']) == host)
    {
        return true;
    }

    BLOCKED_IP_PATTERNS.iter().any(|p| p.is_match(host))
}

/// Validate a single URL field.
pub fn validate(url: &str, field: &str) -> Validation {
    let format = validate_format(url);
    if !format.valid {
        return Validation::fail(format!("{field}: {}", format.error.unwrap_or_default()));
    }

    // Format passed, so a parser failure here is still just an invalid URL.
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => return Validation::fail(format!("{field}: invalid URL: {e}")),
    };

    if parsed.scheme() != "https" {
        return Validation::fail(format!(
            "{field}: only https URLs are allowed, got {}",
            parsed.scheme()
        ));
    }

    let Some(host) = parsed.host_str() else {
        return Validation::fail(format!("{field}: URL has no hostname"));
    };

    if is_blocked_host(host) {
        return Validation::fail(format!(
            "{field}: URL targets a blocked or internal host: {host}"
        ));
    }

    // The url crate drops an explicit default port, so any remaining port
    // is non-standard. Pinning to 443 also defeats port scanning through
    // otherwise-allowed hosts.
    if let Some(port) = parsed.port() {
        return Validation::fail(format!(
            "{field}: non-standard port {port} is not allowed"
        ));
    }

    Validation::ok()
}

/// Validate a named subset of object fields, skipping absent ones and
/// aggregating every failure instead of stopping at the first.
pub fn validate_fields(object: &Value, fields: &[&str]) -> Validation {
    let mut failures = Vec::new();

    for field in fields {
        let Some(value) = object.get(field) else {
            continue; // optional fields are not required
        };

        match value.as_str() {
            Some(url) => {
                let result = validate(url, field);
                if let Some(error) = result.error {
                    failures.push(error);
                }
            }
            None => failures.push(format!("{field}: must be a string")),
        }
    }

    if failures.is_empty() {
        Validation::ok()
    } else {
        Validation::fail(failures.join("; "))
    }
}
