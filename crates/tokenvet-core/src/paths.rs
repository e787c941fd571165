//! Filename/identifier safety and contained path construction.
//!
//! Two complementary disciplines, applied together wherever an untrusted
//! string becomes part of a file-system path: a character blacklist on each
//! component, and a resolved-prefix containment check on the constructed
//! path. Neither alone is sufficient; both are cheap.

use std::path::{Component, Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::result::Validation;

/// Strict PascalCase identifier: uppercase first letter, alphanumeric rest.
static CONTRACT_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][a-zA-Z0-9]*$").unwrap());

/// Validate a string intended to become a single path component.
///
/// Rejects traversal sequences, separators, NUL and every other C0 or C1
/// control character, and DEL.
pub fn validate_safe_filename(name: &str) -> Validation {
    if name.is_empty() {
        return Validation::fail("filename must not be empty");
    }

    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return Validation::fail(format!(
            "filename contains path traversal characters: {name}"
        ));
    }

    // Cc covers C0, DEL and the C1 range; U+009B alone is a CSI introducer
    // on some terminals.
    if name.chars().any(|c| c.is_control()) {
        return Validation::fail("filename contains control characters");
    }

    Validation::ok()
}

/// Validate a contract identifier: strict PascalCase.
///
/// The single pattern simultaneously enforces the naming convention and
/// rules out every traversal or injection character, since none of those is
/// alphanumeric.
pub fn validate_contract_name(name: &str) -> Validation {
    if CONTRACT_NAME.is_match(name) {
        Validation::ok()
    } else {
        Validation::fail(format!(
            "contract name must be PascalCase alphanumeric: {name}"
        ))
    }
}

/// Join untrusted parts onto a base directory, proving containment.
///
/// Every part must pass [`validate_safe_filename`]; the joined path and the
/// base are then both resolved to absolute form and the joined path must
/// equal the base or be a strict descendant of it. On success `value`
/// carries the joined path.
pub fn safe_join(base: &Path, parts: &[&str]) -> Validation {
    for part in parts {
        let checked = validate_safe_filename(part);
        if !checked.valid {
            return checked;
        }
    }

    let mut joined = base.to_path_buf();
    for part in parts {
        joined.push(part);
    }

    let resolved_base = resolve_lexical(base);
    let resolved_joined = resolve_lexical(&joined);

    if resolved_joined != resolved_base && !is_strict_descendant(&resolved_joined, &resolved_base)
    {
        return Validation::fail(format!(
            "joined path escapes base directory: {}",
            joined.display()
        ));
    }

    Validation::ok_with(joined.display().to_string())
}

/// Resolve a path to absolute form lexically: prepend the working directory
/// when relative, then fold `.` and `..` components without touching the
/// file system. `..` at the root stays at the root.
pub fn resolve_lexical(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::Prefix(prefix) => resolved.push(prefix.as_os_str()),
            Component::RootDir => resolved.push(std::path::MAIN_SEPARATOR_STR),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => resolved.push(name),
        }
    }
    resolved
}

/// True iff `child` is strictly below `base` (component-wise prefix match,
/// never equality).
pub fn is_strict_descendant(child: &Path, base: &Path) -> bool {
    child != base && child.starts_with(base)
}
