//! CLI smoke tests.

use assert_cmd::Command;
use predicates::prelude::*;

const ADDR: &str = "0x00c1E515EA9579856304198EFb15f525A0bb50f6";

fn tokenvet() -> Command {
    Command::cargo_bin("tokenvet").unwrap()
}

#[test]
fn check_passes_on_clean_tree() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join(ADDR);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("info.json"),
        format!(r#"{{"address":"{ADDR}","website":"https://example.com"}}"#),
    )
    .unwrap();

    tokenvet()
        .arg("check")
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0 error(s)"));
}

#[test]
fn check_fails_on_checksum_mismatch() {
    let root = tempfile::tempdir().unwrap();
    let lower = ADDR.to_lowercase();
    let dir = root.path().join(&lower);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("info.json"),
        format!(r#"{{"address":"{lower}"}}"#),
    )
    .unwrap();

    tokenvet()
        .arg("check")
        .arg(root.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("checksum mismatch"));
}

#[test]
fn check_file_validates_single_metadata() {
    let root = tempfile::tempdir().unwrap();
    let path = root.path().join("info.json");
    std::fs::write(
        &path,
        format!(r#"{{"address":"{ADDR}","website":"http://insecure.example"}}"#),
    )
    .unwrap();

    tokenvet()
        .arg("check-file")
        .arg(&path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("https://"));
}

#[test]
fn check_reports_json_format() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join(ADDR);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("info.json"), format!(r#"{{"address":"{ADDR}"}}"#)).unwrap();

    tokenvet()
        .arg("check")
        .arg(root.path())
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"checked\": 1"));
}

#[test]
fn missing_assets_dir_is_fatal() {
    tokenvet()
        .arg("check")
        .arg("/nonexistent/assets")
        .assert()
        .code(2);
}
