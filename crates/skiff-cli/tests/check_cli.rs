//! End-to-end tests for the `skiff` binary's non-building commands.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn skiff() -> Command {
    Command::cargo_bin("skiff").unwrap()
}

/// Write a minimal crate at `dir` so manifest validation passes.
fn write_crate(dir: &Path, name: &str) {
    fs::create_dir_all(dir.join("src")).unwrap();
    fs::write(
        dir.join("Cargo.toml"),
        format!(
            "[package]\nname = \"{name}\"\nversion = \"0.1.0\"\nedition = \"2021\"\n\n[dependencies]\n"
        ),
    )
    .unwrap();
    fs::write(dir.join("src/lib.rs"), "pub fn start() {}\n").unwrap();
}

#[test]
fn check_accepts_a_two_target_project() {
    let temp = TempDir::new().unwrap();
    write_crate(&temp.path().join("index"), "index");
    write_crate(&temp.path().join("why-ui"), "why-ui");
    fs::write(
        temp.path().join("skiff.toml"),
        r#"
[targets.index]
manifest = "index/Cargo.toml"
out_dir = "dist/js"

[targets.why-ui]
manifest = "why-ui/Cargo.toml"
out_dir = "dist/why-ui"
"#,
    )
    .unwrap();

    skiff()
        .args(["check", "--cwd"])
        .arg(temp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Configuration ok: 2 target(s)"));
}

#[test]
fn check_rejects_a_missing_manifest() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("skiff.toml"),
        r#"
[targets.index]
manifest = "missing/Cargo.toml"
out_dir = "dist/js"
"#,
    )
    .unwrap();

    skiff()
        .args(["check", "--cwd"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("manifest"));
}

#[test]
fn check_rejects_an_empty_configuration() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("skiff.toml"), "").unwrap();

    skiff()
        .args(["check", "--cwd"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no targets defined"));
}

#[test]
fn check_rejects_targets_sharing_an_output_directory() {
    let temp = TempDir::new().unwrap();
    write_crate(&temp.path().join("index"), "index");
    write_crate(&temp.path().join("why-ui"), "why-ui");
    fs::write(
        temp.path().join("skiff.toml"),
        r#"
[targets.index]
manifest = "index/Cargo.toml"
out_dir = "dist"

[targets.why-ui]
manifest = "why-ui/Cargo.toml"
out_dir = "dist"
"#,
    )
    .unwrap();

    skiff()
        .args(["check", "--cwd"])
        .arg(temp.path())
        .assert()
        .failure();
}

#[test]
fn explicit_missing_config_file_fails() {
    let temp = TempDir::new().unwrap();

    skiff()
        .args(["check", "--config", "nowhere.toml", "--cwd"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("nowhere.toml"));
}

#[test]
fn unknown_subcommand_is_an_error() {
    skiff().arg("bundle").assert().failure();
}

#[test]
fn help_names_the_three_subcommands() {
    skiff()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("dev"))
        .stdout(predicate::str::contains("check"));
}
