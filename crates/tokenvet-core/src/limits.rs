//! Size ceilings and reserved identifiers shared across validators.
//! These constants are part of the public contract.

/// Maximum size of a JSON artifact (metadata, ABI) in bytes.
pub const MAX_JSON_BYTES: u64 = 100 * 1024;

/// Maximum size of a Solidity source file in bytes.
pub const MAX_SOLIDITY_BYTES: u64 = 500 * 1024;

/// Maximum accepted URL length.
pub const MAX_URL_LENGTH: usize = 2048;

/// Keys that must never be assigned onto a parsed object or used as
/// identifiers: the prototype-pollution vector set.
pub const RESERVED_KEYS: &[&str] = &["__proto__", "constructor", "prototype"];

/// True if `name` is one of the reserved pollution-vector identifiers.
pub fn is_reserved_key(name: &str) -> bool {
    RESERVED_KEYS.contains(&name)
}
