//! Integration tests for the meta CLI commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CUBE: &str = "entity Cube {
  components: [Transform, Physics];

  on Tick(dt) {
    rotateX(0.01);
    rotateY(0.015);
    rotateZ(0.02);
  }
}
";

const PLANE: &str = "entity Plane { components: [Physics]; on Tick(dt) { move(velocity*dt); } }";

/// Write `source` to `name` inside a fresh temp directory.
fn script(name: &str, source: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, source).unwrap();
    (dir, path)
}

fn meta() -> Command {
    Command::cargo_bin("meta").unwrap()
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_passes_valid_script() {
    let (_dir, path) = script("cube.meta", CUBE);
    meta()
        .args(["check", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("All checks passed")
                .and(predicate::str::contains("1 entities, 1 handlers, 3 statements")),
        );
}

#[test]
fn check_warns_on_repeated_component() {
    let (_dir, path) = script(
        "cube.meta",
        "entity Cube { components: [Transform, Transform]; on Tick(dt) { rotateX(dt); } }",
    );
    meta()
        .args(["check", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("All checks passed"))
        .stderr(
            predicate::str::contains("declared more than once")
                .and(predicate::str::contains("0 errors, 1 warning")),
        );
}

#[test]
fn check_out_of_range_literal() {
    let source = format!(
        "entity A {{ components: [Physics]; on Tick(dt) {{ move({}); }} }}",
        "9".repeat(400)
    );
    let (_dir, path) = script("big.meta", &source);
    meta()
        .args(["check", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("number literal out of range"));
}

#[test]
fn check_rejects_deep_expression() {
    let source = format!(
        "entity A {{ components: [Physics]; on Tick(dt) {{ move({}); }} }}",
        vec!["dt"; 1000].join(" + ")
    );
    let (_dir, path) = script("deep.meta", &source);
    meta()
        .args(["check", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expression nested too deeply"));
}

#[test]
fn check_reports_missing_component() {
    let (_dir, path) = script(
        "plane.meta",
        "entity Plane { components: [Physics]; on Tick(dt) { rotateX(0.1); } }",
    );
    meta()
        .args(["check", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("Plane")
                .and(predicate::str::contains("Transform"))
                .and(predicate::str::contains("1 error")),
        );
}

#[test]
fn check_reports_syntax_error() {
    let (_dir, path) = script("bad.meta", "entity A { components: [Physics] }");
    meta()
        .args(["check", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("syntax error"));
}

#[test]
fn check_missing_file() {
    meta()
        .args(["check", "does-not-exist.meta"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

// ---------------------------------------------------------------------------
// fmt
// ---------------------------------------------------------------------------

#[test]
fn fmt_prints_canonical_form() {
    let (_dir, path) = script("plane.meta", PLANE);
    meta()
        .args(["fmt", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("    move(velocity * dt);\n"));
}

#[test]
fn fmt_write_rewrites_file() {
    let (_dir, path) = script("plane.meta", PLANE);
    meta()
        .args(["fmt", "--write", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Formatted"));
    let rewritten = fs::read_to_string(&path).unwrap();
    assert!(rewritten.starts_with("entity Plane {\n  components: [Physics];\n"));

    meta()
        .args(["fmt", "--check", path.to_str().unwrap()])
        .assert()
        .success();
}

#[test]
fn fmt_check_fails_on_unformatted() {
    let (_dir, path) = script("plane.meta", PLANE);
    meta()
        .args(["fmt", "--check", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not formatted"));
}

#[test]
fn fmt_already_canonical() {
    let (_dir, path) = script("cube.meta", CUBE);
    meta()
        .args(["fmt", "--check", path.to_str().unwrap()])
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_cube_for_ten_frames() {
    let (_dir, path) = script("cube.meta", CUBE);
    meta()
        .args(["run", path.to_str().unwrap(), "--frames", "10", "--dt", "1"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Cube")
                .and(predicate::str::contains("(0.100, 0.150, 0.200)"))
                .and(predicate::str::contains("10 frames")),
        );
}

#[test]
fn run_plane_with_velocity() {
    let (_dir, path) = script("plane.meta", PLANE);
    meta()
        .args([
            "run",
            path.to_str().unwrap(),
            "--frames",
            "4",
            "--dt",
            "0.5",
            "--velocity",
            "1,0,0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("(2.000, 0.000, 0.000)"));
}

#[test]
fn run_json_output() {
    let (_dir, path) = script("plane.meta", PLANE);
    let output = meta()
        .args([
            "run",
            path.to_str().unwrap(),
            "--frames",
            "2",
            "--dt",
            "0.5",
            "--velocity",
            "0,2,0",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["frame"], 2);
    assert_eq!(json["entities"][0]["name"], "Plane");
    assert_eq!(json["entities"][0]["position"]["y"], 2.0);
}

#[test]
fn run_with_config_file() {
    let (dir, path) = script("plane.meta", PLANE);
    let config = dir.path().join("engine.json");
    fs::write(
        &config,
        r#"{ "defaults": { "overrides": { "Plane": { "velocity": { "x": 0.0, "y": 0.0, "z": 3.0 } } } } }"#,
    )
    .unwrap();
    meta()
        .args([
            "run",
            path.to_str().unwrap(),
            "--frames",
            "1",
            "--dt",
            "1",
            "--config",
            config.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("(0.000, 0.000, 3.000)"));
}

#[test]
fn run_verbose_prints_frames() {
    let (_dir, path) = script("cube.meta", CUBE);
    meta()
        .args(["run", path.to_str().unwrap(), "--frames", "3", "--verbose"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[frame    3]"));
}

#[test]
fn run_rejects_unknown_component() {
    let (_dir, path) = script("ghost.meta", "entity Ghost { components: [Sprite]; }");
    meta()
        .args(["run", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Sprite").and(predicate::str::contains("failed to resolve")));
}

#[test]
fn run_rejects_bad_velocity() {
    let (_dir, path) = script("plane.meta", PLANE);
    meta()
        .args(["run", path.to_str().unwrap(), "--velocity", "1,2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("three comma-separated numbers"));
}

// ---------------------------------------------------------------------------
// stats
// ---------------------------------------------------------------------------

#[test]
fn stats_over_directory() {
    let (dir, _) = script("cube.meta", CUBE);
    fs::write(dir.path().join("plane.meta"), PLANE).unwrap();
    fs::write(dir.path().join("notes.txt"), "not a script").unwrap();
    meta()
        .args(["stats", "-d", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("2 scripts, 2 entities, 2 handlers, 4 statements")
                .and(predicate::str::contains("Physics"))
                .and(predicate::str::contains("rotateX")),
        );
}

#[test]
fn stats_json_skips_broken_scripts() {
    let (dir, _) = script("cube.meta", CUBE);
    fs::write(dir.path().join("broken.meta"), "entity {").unwrap();
    let output = meta()
        .args(["stats", "-d", dir.path().to_str().unwrap(), "--json", "--top", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["scripts"], 1);
    assert_eq!(json["skipped"], 1);
    assert_eq!(json["top"]["components"].as_array().unwrap().len(), 1);
}

#[test]
fn stats_empty_dir() {
    let dir = TempDir::new().unwrap();
    meta()
        .args(["stats", "-d", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no .meta files"));
}
