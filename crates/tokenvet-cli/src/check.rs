//! Submission tree walking and validation sequencing.
//!
//! The fixed order per submission directory is: directory-name safety, then
//! metadata read and field validation, then optional artifacts (ABI,
//! Solidity). A directory that fails the safety check is rejected before
//! any of its files are read.

use std::path::{Path, PathBuf};

use tokenvet_core::{abi, address, limits, paths, safe_json, solidity, urls, ValidatorError};

use crate::args::OutputFormat;
use crate::report::Report;

/// Metadata fields holding URLs, all optional.
const URL_FIELDS: &[&str] = &["website", "explorer", "research", "twitter", "discord"];

/// Validate every submission directory under `assets_dir`.
pub fn run_check(assets_dir: &Path, format: OutputFormat) -> anyhow::Result<i32> {
    let report = check_tree(assets_dir)?;
    report.print(format);
    Ok(report.exit_code())
}

/// Walk an assets tree and accumulate the report.
fn check_tree(assets_dir: &Path) -> anyhow::Result<Report> {
    let mut report = Report::default();

    let entries = std::fs::read_dir(assets_dir)
        .map_err(|e| anyhow::anyhow!("cannot read assets directory {}: {e}", assets_dir.display()))?;

    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        // Every directory entry counts as inspected, even one whose name is
        // rejected before its files are touched.
        report.checked += 1;

        let Some(dir_name) = entry.file_name().to_str().map(str::to_owned) else {
            report.record_error("assets", "submission directory name is not valid UTF-8");
            continue;
        };

        check_submission(assets_dir, &dir_name, &mut report);
    }

    tracing::info!(
        checked = report.checked,
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validation run complete"
    );

    Ok(report)
}

fn check_submission(assets_dir: &Path, dir_name: &str, report: &mut Report) {
    tracing::debug!(dir = dir_name, "checking submission");

    // Directory safety gates everything: no file under an unsafe name is
    // ever opened.
    let dir_check = address::validate_directory(dir_name, assets_dir);
    if !dir_check.valid {
        report.record(dir_name, dir_check);
        return;
    }

    let dir = assets_dir.join(dir_name);

    let info = match safe_json::read_and_parse(&dir.join("info.json"), limits::MAX_JSON_BYTES) {
        Ok(info) => info,
        Err(e) => {
            report.record_error(dir_name, e);
            return;
        }
    };

    match info.get("address").and_then(|v| v.as_str()) {
        Some(addr) => {
            let result = address::validate_token_address(addr, dir_name, assets_dir, "info.json");
            report.record(dir_name, result);
        }
        None => report.record_error(dir_name, "info.json: missing address field"),
    }

    report.record(dir_name, urls::validate_fields(&info, URL_FIELDS));

    let abi_path = dir.join("abi.json");
    if abi_path.exists() {
        match safe_json::read_and_parse(&abi_path, limits::MAX_JSON_BYTES) {
            Ok(doc) => report.record(&format!("{dir_name}/abi.json"), abi::validate_abi(&doc)),
            Err(e) => report.record_error(&format!("{dir_name}/abi.json"), e),
        }
    }

    for source in solidity_files(&dir) {
        let Some(stem) = source.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let context = format!("{dir_name}/{stem}.sol");

        let name_check = paths::validate_contract_name(stem);
        if !name_check.valid {
            report.record(&context, name_check);
            continue;
        }

        match read_source(&source, limits::MAX_SOLIDITY_BYTES) {
            Ok(content) => report.record(&context, solidity::validate_solidity(&content, stem)),
            Err(e) => report.record_error(&context, e),
        }
    }
}

/// Validate a single metadata file outside a submission tree.
pub fn run_check_file(path: &Path, format: OutputFormat) -> anyhow::Result<i32> {
    let mut report = Report::default();
    report.checked = 1;

    let context = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    match safe_json::read_and_parse(path, limits::MAX_JSON_BYTES) {
        Ok(info) => {
            match info.get("address").and_then(|v| v.as_str()) {
                Some(addr) => report.record(&context, address::validate_checksum(addr, "address")),
                None => report.record_error(&context, "missing address field"),
            }
            report.record(&context, urls::validate_fields(&info, URL_FIELDS));
        }
        Err(e) => report.record_error(&context, e),
    }

    report.print(format);
    Ok(report.exit_code())
}

fn solidity_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "sol"))
        .collect();
    files.sort();
    files
}

/// Read a text file with the same size-then-read-then-recheck discipline as
/// the JSON reader.
fn read_source(path: &Path, max_bytes: u64) -> Result<String, ValidatorError> {
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

    let content = std::fs::read_to_string(path)?;
    if content.len() as u64 > max_bytes {
        return Err(ValidatorError::FileTooLarge {
            path: path.to_path_buf(),
            size: content.len() as u64,
            max: max_bytes,
        });
    }

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ADDR: &str = "0x00c1E515EA9579856304198EFb15f525A0bb50f6";

    fn submission(root: &Path, dir_name: &str, info: &serde_json::Value) -> PathBuf {
        let dir = root.join(dir_name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("info.json"), serde_json::to_vec(info).unwrap()).unwrap();
        dir
    }

    #[test]
    fn test_clean_submission_passes() {
        let root = tempfile::tempdir().unwrap();
        submission(
            root.path(),
            ADDR,
            &json!({ "address": ADDR, "website": "https://example.com" }),
        );

        let mut report = Report::default();
        check_submission(root.path(), ADDR, &mut report);
        assert!(report.errors.is_empty(), "{:?}", report.errors);
    }

    #[test]
    fn test_missing_info_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join(ADDR)).unwrap();

        let mut report = Report::default();
        check_submission(root.path(), ADDR, &mut report);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("File not found"));
    }

    #[test]
    fn test_address_mismatch_reported() {
        let root = tempfile::tempdir().unwrap();
        submission(
            root.path(),
            ADDR,
            &json!({ "address": "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed" }),
        );

        let mut report = Report::default();
        check_submission(root.path(), ADDR, &mut report);
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("does not match directory")));
    }

    #[test]
    fn test_abi_and_solidity_artifacts_checked() {
        let root = tempfile::tempdir().unwrap();
        let dir = submission(root.path(), ADDR, &json!({ "address": ADDR }));

        std::fs::write(
            dir.join("abi.json"),
            r#"[{"type":"function","name":"f","inputs":[{"name":"__proto__","type":"uint256"}]}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("Token.sol"),
            "// SPDX-License-Identifier: MIT\npragma solidity ^0.8.0;\ncontract Other {}",
        )
        .unwrap();

        let mut report = Report::default();
        check_submission(root.path(), ADDR, &mut report);
        assert!(report.errors.iter().any(|e| e.contains("not allowed")));
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("No declaration found")));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_directory_is_counted_and_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let root = tempfile::tempdir().unwrap();
        let bad_name = OsStr::from_bytes(b"0x\xff\xfe");
        std::fs::create_dir(root.path().join(bad_name)).unwrap();
        submission(root.path(), ADDR, &json!({ "address": ADDR }));

        let report = check_tree(root.path()).unwrap();
        assert_eq!(report.checked, 2);
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("not valid UTF-8")));
    }

    #[test]
    fn test_bad_url_field_reported() {
        let root = tempfile::tempdir().unwrap();
        submission(
            root.path(),
            ADDR,
            &json!({ "address": ADDR, "website": "https://169.254.169.254/" }),
        );

        let mut report = Report::default();
        check_submission(root.path(), ADDR, &mut report);
        assert!(report.errors.iter().any(|e| e.contains("blocked")));
    }
}
