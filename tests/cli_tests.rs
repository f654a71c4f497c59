//! CLI integration tests for the `sck` binary.
//!
//! These runs never need a real Sass compiler: they cover skipped
//! triggers, compiler spawn failures, configuration errors and the
//! `stamp` command.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Run sck inside `dir` with an isolated config home.
fn run_sck(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sck"))
        .args(args)
        .current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env_remove("SCK_LOG")
        .output()
        .expect("Failed to execute sck")
}

fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("valid JSON line"))
        .collect()
}

// ============================================================================
// compile
// ============================================================================

#[test]
fn test_compile_non_sass_file_is_skipped() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("readme.md"), "").unwrap();

    let output = run_sck(temp.path(), &["compile", "readme.md", "--json"]);
    assert!(output.status.success(), "skipped run should exit 0");

    let events = json_lines(&output);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["event"], "skipped");
}

#[test]
fn test_compile_reports_missing_compiler() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("sck.toml"), "[sass]\ncommand = \"sck-test-no-such-sass\"\n")
        .unwrap();
    fs::write(temp.path().join("app.scss"), ".a { color: red; }").unwrap();

    let output = run_sck(temp.path(), &["compile", "app.scss", "--json"]);
    assert_eq!(output.status.code(), Some(1), "per-file failure should exit 1");

    let events = json_lines(&output);
    let kinds: Vec<_> = events.iter().map(|e| e["event"].as_str().unwrap().to_string()).collect();
    assert_eq!(kinds, vec!["start", "error", "finished"]);
    assert_eq!(events[1]["name"], "app");
    assert!(events[1]["error"].as_str().unwrap().contains("sck-test-no-such-sass"));
    assert!(!temp.path().join("app.css").exists());
}

#[test]
fn test_compile_sass_flag_overrides_config() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("app.scss"), ".a { color: red; }").unwrap();

    let output =
        run_sck(temp.path(), &["compile", "app.scss", "--json", "--sass", "sck-test-other-sass"]);
    assert_eq!(output.status.code(), Some(1));

    let events = json_lines(&output);
    assert!(events[1]["error"].as_str().unwrap().contains("sck-test-other-sass"));
}

#[test]
fn test_compile_invalid_config_exits_2() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("sck.toml"), "[watch]\ndebounce_ms = 0\n").unwrap();
    fs::write(temp.path().join("app.scss"), "").unwrap();

    let output = run_sck(temp.path(), &["compile", "app.scss"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("watch.debounce_ms"));
}

#[test]
fn test_compile_invalid_style_exits_2() {
    let temp = TempDir::new().unwrap();
    let output = run_sck(temp.path(), &["compile", "app.scss", "--style", "loud"]);
    assert_eq!(output.status.code(), Some(2));
}

// ============================================================================
// stamp
// ============================================================================

#[test]
fn test_stamp_and_unstamp() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("icons.scss");
    fs::write(&file, ".i { background: url('../img/icon.svg'); }").unwrap();

    let output = run_sck(temp.path(), &["stamp", "icons.scss"]);
    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        ".i { background: url('../img/icon.svg?v=#{$version}'); }"
    );

    let output = run_sck(temp.path(), &["stamp", "icons.scss", "--remove"]);
    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&file).unwrap(), ".i { background: url('../img/icon.svg'); }");
}

#[test]
fn test_stamp_rejects_css() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("app.css"), "").unwrap();

    let output = run_sck(temp.path(), &["stamp", "app.css"]);
    assert_eq!(output.status.code(), Some(2));
}
