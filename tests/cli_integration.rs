//! Command-line interface: apply and check.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

const SOURCE: &str = "pub fn hello() {\n    println!(\"Hello\");\n}\n";

/// Helper to create a workspace holding a source file and an edit script
fn setup_workspace(script: &str) -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();

    let source = dir.path().join("hello.rs");
    fs::write(&source, SOURCE).unwrap();

    let script_path = dir.path().join("edits.toml");
    fs::write(&script_path, script).unwrap();

    (dir, source, script_path)
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_span-rewriter"))
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .unwrap()
}

const RENAME: &str = r#"
[[edits]]
id = "rename"
kind = "replace"
begin = 7
end = 12
text = "greet"
expected = "hello"

[[edits]]
kind = "replace"
begin = 31
end = 36
text = "Howdy"
"#;

#[test]
fn test_apply_help() {
    let output = run(&["apply", "--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Apply an edit script to a source file"));
}

#[test]
fn test_apply_prints_rewritten_source() {
    let (_dir, source, script) = setup_workspace(RENAME);

    let output = run(&[
        "apply",
        "--source",
        source.to_str().unwrap(),
        "--script",
        script.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "pub fn greet() {\n    println!(\"Howdy\");\n}\n");

    // Not written back without --in-place
    assert_eq!(fs::read_to_string(&source).unwrap(), SOURCE);
}

#[test]
fn test_apply_in_place() {
    let (_dir, source, script) = setup_workspace(RENAME);

    let output = run(&[
        "apply",
        "-s",
        source.to_str().unwrap(),
        "-e",
        script.to_str().unwrap(),
        "--in-place",
    ]);

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("2 edit(s) applied"));
    assert_eq!(
        fs::read_to_string(&source).unwrap(),
        "pub fn greet() {\n    println!(\"Howdy\");\n}\n"
    );
}

#[test]
fn test_apply_conflict_fails_with_diagnostics() {
    let (_dir, source, script) = setup_workspace(
        r#"
[[edits]]
kind = "replace"
begin = 7
end = 12
text = "greet"

[[edits]]
id = "clash"
kind = "remove"
begin = 10
end = 14
"#,
    );

    let output = run(&[
        "apply",
        "--source",
        source.to_str().unwrap(),
        "--script",
        script.to_str().unwrap(),
        "--in-place",
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: cannot remove 4 character(s)"));
    assert!(stderr.contains("note: clobbered by: replace 5 character(s) with \"greet\""));
    assert!(stderr.contains("clash"));

    // Nothing written on abort
    assert_eq!(fs::read_to_string(&source).unwrap(), SOURCE);
}

#[test]
fn test_check_reports_summary() {
    let (_dir, source, script) = setup_workspace(RENAME);

    let output = run(&[
        "check",
        "--source",
        source.to_str().unwrap(),
        "--script",
        script.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Summary:"));
    assert!(stdout.contains("2 scheduled"));
    assert!(stdout.contains("0 failed"));
    assert_eq!(fs::read_to_string(&source).unwrap(), SOURCE);
}

#[test]
fn test_check_with_stale_expectation_fails() {
    let (_dir, source, script) = setup_workspace(
        "[[edits]]\nkind = \"remove\"\nbegin = 7\nend = 12\nexpected = \"world\"\n",
    );

    let output = run(&[
        "check",
        "--source",
        source.to_str().unwrap(),
        "--script",
        script.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 failed"));
}

#[test]
fn test_missing_script_is_an_error() {
    let (dir, source, _script) = setup_workspace(RENAME);
    let missing = dir.path().join("nope.toml");

    let output = run(&[
        "check",
        "--source",
        source.to_str().unwrap(),
        "--script",
        missing.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
}
