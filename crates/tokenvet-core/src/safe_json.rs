//! Pollution-safe JSON parsing and display sanitization.
//!
//! Untrusted JSON is parsed into a [`serde_json::Value`] tree through a
//! custom visitor that refuses to assign the reserved keys `__proto__`,
//! `constructor` and `prototype` at any nesting level. Suppression happens
//! while the tree is built, not as a post-hoc delete, so there is no window
//! in which a reserved key exists on the tree. A second pass strips the same
//! keys from the top-level object as defense in depth.

use std::fmt;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Number, Value};

use crate::error::{ValidatorError, ValidatorResult};
use crate::limits;

/// Seed that deserializes any JSON value while dropping reserved map keys.
struct ScrubbedValue;

impl<'de> DeserializeSeed<'de> for ScrubbedValue {
    type Value = Value;

    fn deserialize<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_any(ScrubbedVisitor)
    }
}

struct ScrubbedVisitor;

impl<'de> Visitor<'de> for ScrubbedVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("any JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Value, E> {
        Ok(Number::from_f64(v).map_or(Value::Null, Value::Number))
    }

    fn visit_str<E>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_owned()))
    }

    fn visit_string<E>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut values = Vec::new();
        while let Some(value) = seq.next_element_seed(ScrubbedValue)? {
            values.push(value);
        }
        Ok(Value::Array(values))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut object = Map::new();
        while let Some(key) = map.next_key::<String>()? {
            if limits::is_reserved_key(&key) {
                // Consume the value without ever assigning it.
                map.next_value::<IgnoredAny>()?;
                continue;
            }
            let value = map.next_value_seed(ScrubbedValue)?;
            object.insert(key, value);
        }
        Ok(Value::Object(object))
    }
}

/// Parse untrusted JSON text, suppressing reserved keys at every level.
///
/// Fails with the underlying syntax error when `text` is not well-formed
/// JSON. On success the returned tree contains no `__proto__`,
/// `constructor` or `prototype` key anywhere.
pub fn parse_untrusted(text: &str) -> Result<Value, serde_json::Error> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    let mut value = ScrubbedValue.deserialize(&mut deserializer)?;
    deserializer.end()?;

    // Defense in depth: the visitor already dropped these, but strip the
    // top-level object again in case the tree was built elsewhere.
    if let Value::Object(object) = &mut value {
        for key in limits::RESERVED_KEYS {
            object.remove(*key);
        }
    }

    Ok(value)
}

/// Read a file and parse it as untrusted JSON, enforcing a byte ceiling.
///
/// The ceiling is checked twice: against the file metadata before any
/// content is read, and against the decoded content length after the read
/// (a symlink swap or sparse file can defeat the first check).
pub fn read_and_parse(path: &Path, max_bytes: u64) -> ValidatorResult<Value> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ValidatorError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ValidatorError::Io(e)
        }
    })?;

    if metadata.len() > max_bytes {
        return Err(ValidatorError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max: max_bytes,
        });
    }

    let text = std::fs::read_to_string(path)?;
    if text.len() as u64 > max_bytes {
        // Metadata said the file fit; the content does not. Symlink swap or
        // sparse file.
        tracing::warn!(
            path = %path.display(),
            reported = metadata.len(),
            actual = text.len(),
            "file grew between stat and read"
        );
        return Err(ValidatorError::FileTooLarge {
            path: path.to_path_buf(),
            size: text.len() as u64,
            max: max_bytes,
        });
    }

    parse_untrusted(&text).map_err(|e| ValidatorError::Json {
        file: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
        message: e.to_string(),
    })
}

/// ANSI CSI sequences (`ESC [ ... m` and relatives).
static ANSI_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").unwrap());

/// Strip ANSI escape sequences and C0/C1 control characters.
///
/// Validation error messages echo attacker-supplied substrings verbatim;
/// this must run before any such string reaches a terminal or log sink so
/// the attacker cannot inject terminal control sequences.
pub fn sanitize_for_display(text: &str) -> String {
    let stripped = ANSI_ESCAPE.replace_all(text, "");
    stripped.chars().filter(|c| !c.is_control()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_object() {
        let value = parse_untrusted(r#"{"name":"Token","decimals":18}"#).unwrap();
        assert_eq!(value["name"], "Token");
        assert_eq!(value["decimals"], 18);
    }

    #[test]
    fn test_parse_drops_proto_at_top_level() {
        let value = parse_untrusted(r#"{"__proto__":{"polluted":true},"ok":1}"#).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("__proto__"));
        assert_eq!(object["ok"], 1);
    }

    #[test]
    fn test_parse_drops_reserved_keys_nested() {
        let value = parse_untrusted(
            r#"{"a":{"constructor":{"x":1},"b":[{"prototype":2,"keep":3}]}}"#,
        )
        .unwrap();
        assert!(!value["a"].as_object().unwrap().contains_key("constructor"));
        let inner = value["a"]["b"][0].as_object().unwrap();
        assert!(!inner.contains_key("prototype"));
        assert_eq!(inner["keep"], 3);
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(parse_untrusted("{not json").is_err());
        assert!(parse_untrusted(r#"{"a":1} trailing"#).is_err());
    }

    #[test]
    fn test_parse_scalars_and_arrays() {
        assert_eq!(parse_untrusted("null").unwrap(), Value::Null);
        assert_eq!(parse_untrusted("[1,2.5,\"x\"]").unwrap()[1], 2.5);
    }

    #[test]
    fn test_read_and_parse_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let err = read_and_parse(&missing, limits::MAX_JSON_BYTES).unwrap_err();
        assert!(matches!(err, ValidatorError::FileNotFound { .. }));
        assert!(err.to_string().starts_with("File not found: "));
    }

    #[test]
    fn test_read_and_parse_too_large_before_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.json");
        std::fs::write(&path, "x".repeat(64)).unwrap();
        let err = read_and_parse(&path, 16).unwrap_err();
        assert!(matches!(err, ValidatorError::FileTooLarge { size: 64, .. }));
    }

    #[test]
    fn test_read_and_parse_wraps_syntax_error_with_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{oops").unwrap();
        let err = read_and_parse(&path, limits::MAX_JSON_BYTES).unwrap_err();
        match err {
            ValidatorError::Json { file, .. } => assert_eq!(file, "broken.json"),
            other => panic!("expected Json error, got {other:?}"),
        }
    }

    #[test]
    fn test_read_and_parse_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("info.json");
        std::fs::write(&path, r#"{"address":"0xabc"}"#).unwrap();
        let value = read_and_parse(&path, limits::MAX_JSON_BYTES).unwrap();
        assert_eq!(value["address"], "0xabc");
    }

    #[test]
    fn test_sanitize_strips_ansi() {
        let dirty = "\x1b[31mred\x1b[0m text";
        assert_eq!(sanitize_for_display(dirty), "red text");
    }

    #[test]
    fn test_sanitize_strips_control_chars() {
        let dirty = "a\x00b\x07c\rd\ne\x7ff\u{9b}g";
        assert_eq!(sanitize_for_display(dirty), "abcdefg");
    }

    #[test]
    fn test_sanitize_keeps_plain_text() {
        assert_eq!(sanitize_for_display("plain message"), "plain message");
    }
}
