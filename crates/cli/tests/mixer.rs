use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn configs() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../configs")
}

fn mixer() -> Command {
    let mut cmd = Command::cargo_bin("mixer").unwrap();
    cmd.arg("--config-dir").arg(configs());
    cmd
}

#[test]
fn resolve_prints_authored_combination() {
    mixer()
        .args(["resolve", "--thruster", "lv-t45"])
        .assert()
        .success()
        .stdout(predicate::str::contains("9 LiquidFuel : 11 Oxidizer"))
        .stdout(predicate::str::contains("authored combination LFO"))
        .stdout(predicate::str::contains("(always consumed)"));
}

#[test]
fn scaled_engine_sizes_ignitors_from_scaled_thrust() {
    // 0.001 * 1000 * 860 / (9.80665 * 250) = 0.35 -> 0.4
    mixer()
        .args(["resolve", "--thruster", "LV-T45", "--scale", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("860.0kN"))
        .stdout(predicate::str::contains("0.4 ElectricCharge (always consumed)"));
}

#[test]
fn resolve_with_swaps_rescales_stats() {
    mixer()
        .args([
            "resolve",
            "--thruster",
            "LV-T45",
            "--swap",
            "LiquidFuel=Kerosene",
            "--swap",
            "Oxidizer=LqdOxygen",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 Kerosene : 5 LqdOxygen"))
        .stdout(predicate::str::contains("fuel/oxidizer pair"))
        .stdout(predicate::str::contains("219.3kN (+2%)"))
        .stdout(predicate::str::contains("247.0s / 317.0s (-1%)"));
}

#[test]
fn resolve_writes_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("report.json");
    mixer()
        .args(["resolve", "--thruster", "RV-105", "--json"])
        .arg(&report)
        .assert()
        .success();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(value["kind"], "rcs");
    assert_eq!(value["current"]["ratios"], "MonoPropellant");
    assert_eq!(value["stats"]["max_thrust"], 1.0);
}

#[test]
fn unknown_swap_is_rejected() {
    mixer()
        .args(["resolve", "--thruster", "LV-T45", "--swap", "Xenon=Argon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("holds Xenon"));
}

#[test]
fn unknown_thruster_is_rejected() {
    mixer()
        .args(["resolve", "--thruster", "Mainsail"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn ignition_uses_optional_ignitor() {
    mixer()
        .args([
            "ignite",
            "--thruster",
            "LV-T45",
            "--available",
            "ElectricCharge=10",
            "--available",
            "TEATEB=2",
            "--ticks",
            "2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ignition!"))
        .stdout(predicate::str::contains("remaining TEATEB: 1"))
        .stdout(predicate::str::contains("final state: ignited"));
}

#[test]
fn ignition_without_ignitor_retries_and_fails() {
    mixer()
        .args([
            "ignite",
            "--thruster",
            "LV-T45",
            "--available",
            "ElectricCharge=10",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ignition failed: not enough TEATEB").count(3))
        .stdout(predicate::str::contains("drained").not())
        .stdout(predicate::str::contains("final state: unignited"));
}

#[test]
fn throttle_locked_motor_lights_from_its_catalog_flags() {
    mixer()
        .args(["ignite", "--thruster", "RT-10", "--ticks", "1", "--throttle", "0.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("final state: ignited"))
        .stdout(predicate::str::contains("Ignition failed").not());
}

#[test]
fn hypergolic_engine_lights_without_ignitors() {
    mixer()
        .args(["ignite", "--thruster", "AJ10", "--ticks", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ignition!"))
        .stdout(predicate::str::contains("final state: ignited"));
}
