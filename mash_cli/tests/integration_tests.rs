//! Integration tests for the mash binary.
//!
//! These tests verify end-to-end behavior including:
//! - Payload loading and parameter overrides
//! - Stepped schedules and the rest cap
//! - CSV export
//! - The interactive edit loop

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to create an isolated config directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI binary, isolated from the user's config
fn cli(config_home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mash"));
    cmd.env("XDG_CONFIG_HOME", config_home).env_remove("RUST_LOG");
    cmd
}

/// Helper to write the worked-example payload
fn write_payload(dir: &Path) -> PathBuf {
    let path = dir.join("payload.json");
    let payload = serde_json::json!({
        "mash_thickness": 2.5,
        "grain_temp": 20.0,
        "batch_volume": 20.0,
        "evaporation_rate": 3.0,
        "equipment_loss": 1.0,
        "trub_loss": 1.0,
        "mash_tun_volume": 40.0
    });
    fs::write(&path, payload.to_string()).expect("Failed to write payload");
    path
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mash water calculator"));
}

#[test]
fn test_default_command_uses_builtin_payload() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("68.00"))
        .stdout(predicate::str::contains("Total mash volume"));
}

#[test]
fn test_single_rest_worked_example() {
    let temp_dir = setup_test_dir();
    let payload = write_payload(temp_dir.path());

    cli(temp_dir.path())
        .arg("calc")
        .arg("--payload")
        .arg(&payload)
        .arg("--grain-mass")
        .arg("5")
        .arg("--boil-length")
        .arg("90")
        .arg("--rest")
        .arg("67")
        .assert()
        .success()
        .stdout(predicate::str::contains("74.71"))
        .stdout(predicate::str::contains("12.50"))
        .stdout(predicate::str::contains("✓ fits"));
}

#[test]
fn test_stepped_schedule() {
    let temp_dir = setup_test_dir();
    let payload = write_payload(temp_dir.path());

    let output = cli(temp_dir.path())
        .arg("calc")
        .arg("--payload")
        .arg(&payload)
        .arg("--grain-mass")
        .arg("5")
        .args(["--rest", "50", "--rest", "65", "--rest", "72"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8_lossy(&output);
    assert_eq!(stdout.matches("100.00").count(), 2);
    assert!(stdout.contains("72.00"));
}

#[test]
fn test_extra_rests_are_ignored() {
    let temp_dir = setup_test_dir();

    let mut cmd = cli(temp_dir.path());
    cmd.arg("calc");
    for temp in ["50", "55", "60", "65", "70", "75"] {
        cmd.arg("--rest").arg(temp);
    }

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARN"))
        .stderr(predicate::str::contains("at most 5 rests, ignoring 1 extra"))
        .stdout(predicate::str::contains("75.00").not());
}

#[test]
fn test_tun_too_small() {
    let temp_dir = setup_test_dir();
    let payload = write_payload(temp_dir.path());

    cli(temp_dir.path())
        .arg("calc")
        .arg("--payload")
        .arg(&payload)
        .arg("--grain-mass")
        .arg("10")
        .arg("--mash-tun-volume")
        .arg("20")
        .assert()
        .success()
        .stdout(predicate::str::contains("too big"));
}

#[test]
fn test_csv_export() {
    let temp_dir = setup_test_dir();
    let csv_path = temp_dir.path().join("out/mash.csv");

    cli(temp_dir.path())
        .arg("calc")
        .arg("--grain-mass")
        .arg("5")
        .arg("--csv")
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported"));

    let content = fs::read_to_string(&csv_path).expect("Failed to read CSV");
    assert!(content.starts_with("slot,label,value,gallons,status"));
    assert!(content.contains("sparge_volume"));
    assert!(content.contains("infusion_1_volume"));
}

#[test]
fn test_config_disables_hops() {
    let temp_dir = setup_test_dir();
    let config_dir = temp_dir.path().join("mashcalc");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[mash]\ntrack_hops = false\n").unwrap();

    cli(temp_dir.path())
        .arg("calc")
        .arg("--total-hops")
        .arg("100")
        .assert()
        .success()
        .stdout(predicate::str::contains("1.43").not());
}

#[test]
fn test_malformed_payload_fails() {
    let temp_dir = setup_test_dir();
    let payload = temp_dir.path().join("payload.json");
    fs::write(&payload, "{ not json").unwrap();

    cli(temp_dir.path())
        .arg("calc")
        .arg("--payload")
        .arg(&payload)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Json"));
}

#[test]
fn test_interactive_session() {
    let temp_dir = setup_test_dir();
    let payload = write_payload(temp_dir.path());

    cli(temp_dir.path())
        .arg("interactive")
        .arg("--payload")
        .arg(&payload)
        .arg("--grain-mass")
        .arg("5")
        .write_stdin("rest 1 67\nadd\nrest 2 72\nshow\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("74.71"))
        .stdout(predicate::str::contains("72.00"));
}

#[test]
fn test_interactive_reports_recoverable_errors() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("interactive")
        .write_stdin("rest 4 70\nset hops 5\ndel\nfly\nset boil_length soon\nquit\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Rest 4 does not exist"))
        .stderr(predicate::str::contains("Unknown parameter"))
        .stderr(predicate::str::contains("Unknown command: fly"))
        .stderr(predicate::str::contains("using 0"));
}

#[test]
fn test_interactive_rest_cap_warns() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("interactive")
        .write_stdin("add\nadd\nadd\nadd\nadd\nquit\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Already at 5 rests"))
        .stdout(predicate::str::contains("  6 ").not());
}
