//! Integration tests for the `stackvars` command-line inspector

use super::common::fixtures::write_document;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use stackvars::config::ENV_CAPTURE_LOCALS;
use tempfile::TempDir;

/// Run `stackvars` against an isolated data directory
fn stackvars(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stackvars").expect("Binary should build");
    cmd.arg("--data-dir")
        .arg(dir.path())
        .env_remove(ENV_CAPTURE_LOCALS)
        .env_remove("RUST_LOG");
    cmd
}

fn sample_document() -> Value {
    json!({
        "frames": [
            { "module": "A", "function": "f", "file_name": "A.src", "line_number": 10 },
            { "module": "B", "function": "g", "file_name": "B.src", "line_number": 20 }
        ],
        "capture": [
            {
                "routine": "A.f",
                "locals": [
                    { "name": "x", "declared_type": "int", "value": 42 },
                    { "name": "gone", "declared_type": "int", "live": false },
                    null
                ],
                "location": 3,
                "line_number": 10
            },
            { "routine": "B.g", "locals": [], "line_number": 20 }
        ]
    })
}

fn run_convert(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("Output should be JSON")
}

/// Converting an aligned document attaches the captured locals
#[test]
fn test_convert_attaches_locals() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let input = write_document(dir.path(), &sample_document());

    let elements = run_convert(stackvars(&dir).arg("convert").arg(&input));

    assert_eq!(elements.as_array().map(Vec::len), Some(2));
    assert_eq!(elements[0]["variables"]["x"], 42);
    assert_eq!(elements[0]["variables"]["gone"], Value::Null);
    assert_eq!(elements[1]["variables"], Value::Null);
    assert_eq!(elements[1]["file_name"], "B.src");
}

/// `--no-locals` and the environment override both disable capture
#[test]
fn test_convert_without_locals() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let input = write_document(dir.path(), &sample_document());

    let flagged = run_convert(
        stackvars(&dir)
            .arg("convert")
            .arg(&input)
            .arg("--no-locals"),
    );
    assert_eq!(flagged[0]["variables"], Value::Null);

    let from_env = run_convert(
        stackvars(&dir)
            .env(ENV_CAPTURE_LOCALS, "0")
            .arg("convert")
            .arg(&input),
    );
    assert_eq!(from_env[0]["variables"], Value::Null);
}

/// Locals can be disabled from the config file in the data directory
#[test]
fn test_convert_respects_config_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("config.toml"), "[capture]\nlocals = false\n")
        .expect("Write config");
    let input = write_document(dir.path(), &sample_document());

    let elements = run_convert(stackvars(&dir).arg("convert").arg(&input));
    assert_eq!(elements[0]["variables"], Value::Null);
}

/// A capture that does not line up with the trace is dropped
#[test]
fn test_convert_mismatched_capture() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut document = sample_document();
    document["capture"]
        .as_array_mut()
        .expect("Capture array")
        .pop();
    let input = write_document(dir.path(), &document);

    let elements = run_convert(stackvars(&dir).arg("convert").arg(&input));
    assert_eq!(elements.as_array().map(Vec::len), Some(2));
    assert_eq!(elements[0]["variables"], Value::Null);
}

/// Documents without a capture convert the plain trace, read from stdin
#[test]
fn test_convert_from_stdin_without_capture() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let document = json!({
        "frames": [{ "module": "A", "function": "f", "line_number": -1 }]
    });

    let elements = run_convert(
        stackvars(&dir)
            .arg("convert")
            .arg("-")
            .write_stdin(document.to_string()),
    );
    assert_eq!(elements[0]["module"], "A");
    assert_eq!(elements[0]["file_name"], Value::Null);
    assert_eq!(elements[0]["line_number"], -1);
}

/// Invalid documents fail with a readable error
#[test]
fn test_convert_rejects_invalid_documents() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut document = sample_document();
    document["capture"][0]["routine"] = json!("no_separator");
    let input = write_document(dir.path(), &document);

    stackvars(&dir)
        .arg("convert")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid routine"));

    let empty_module = json!({
        "frames": [{ "module": "", "function": "f", "line_number": 1 }]
    });
    let input = write_document(dir.path(), &empty_module);
    stackvars(&dir)
        .arg("convert")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid capture document"));
}

/// `config` prints the effective configuration as TOML
#[test]
fn test_config_command() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[event]\nrelease = \"9.9.9\"\n").expect("Write config");

    stackvars(&dir)
        .arg("--config")
        .arg(&path)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"))
        .stdout(predicate::str::contains("release = \"9.9.9\""))
        .stdout(predicate::str::contains("locals = true"));
}

/// An unreadable config file falls back to defaults and says so on stderr
#[test]
fn test_invalid_config_file_is_reported() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(
        dir.path().join("config.toml"),
        "[capture]\nlocals = \"sometimes\"\n",
    )
    .expect("Write config");

    stackvars(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("locals = true"))
        .stderr(predicate::str::contains("Ignoring invalid config file"));
}

/// An unrecognized capture override is ignored and reported on stderr
#[test]
fn test_unrecognized_env_override_is_reported() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    stackvars(&dir)
        .env(ENV_CAPTURE_LOCALS, "sometimes")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("locals = true"))
        .stderr(predicate::str::contains("Ignoring unrecognized value"));
}
