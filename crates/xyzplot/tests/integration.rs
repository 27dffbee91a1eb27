//! Integration tests for the `xyzplot` CLI binary.
//!
//! Each test runs the binary in a fresh temp directory.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const BASE: &str = r#"// render settings
{
    "W": 512,
    "H": 512,
    "seed": 42,
    "steps": 25,
    "cfg_scale": "0: (7)",
    "sampler": "euler_a",
    "use_init": true,
    "init_image": "start.png",
    "strength": 0.65,
    "prompts": {"0": "a lighthouse at dusk"}
}
"#;

fn xyzplot(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("xyzplot").unwrap();
    cmd.current_dir(dir)
        .env_remove("XYZPLOT_DIR")
        .env_remove("XYZPLOT_NAMING__TEMPLATE")
        .env("NO_COLOR", "1");
    cmd
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("base.json"), BASE).unwrap();
    dir
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn version_prints() {
    let dir = TempDir::new().unwrap();
    xyzplot(dir.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("xyzplot version"));
}

#[test]
fn parse_shows_values() {
    let dir = TempDir::new().unwrap();
    let output = xyzplot(dir.path())
        .args(["parse", "0-1 [3]", "10-20 (+5)", "5-1 (+1)", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let items = parsed.as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["values"], serde_json::json!([0, 0.5, 1]));
    assert_eq!(items[1]["values"], serde_json::json!([10, 15, 20]));
    assert_eq!(items[2]["values"], serde_json::json!([]));
    assert!(items[2]["warning"].is_string());
}

#[test]
fn parse_resolves_a_choice_field() {
    let dir = TempDir::new().unwrap();
    xyzplot(dir.path())
        .args(["parse", "--field", "sampler", "euler, ddim", "ddim", "warp"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sampler (choice): 3 values"))
        .stderr(predicate::str::contains("'warp' is not a known option"));
}

#[test]
fn params_lists_fields() {
    let dir = project();
    let output = xyzplot(dir.path())
        .args(["params", "base.json", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let params: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    let find = |name: &str| params.iter().find(|p| p["name"] == name).cloned();
    assert_eq!(find("steps").unwrap()["kind"], "numeric");
    assert_eq!(find("cfg_scale").unwrap()["kind"], "schedule");
    assert_eq!(find("sampler").unwrap()["kind"], "enumerated_choice");
    assert_eq!(find("use_init").unwrap()["kind"], "boolean");
    assert!(find("rotation_2d").is_some());
}

#[test]
fn params_table_filters_by_kind() {
    let dir = project();
    xyzplot(dir.path())
        .args(["params", "base.json", "--kind", "boolean"])
        .assert()
        .success()
        .stdout(predicate::str::contains("use_init"))
        .stdout(predicate::str::contains("steps").not());
}

#[test]
fn generate_writes_one_file_per_combination() {
    let dir = project();
    xyzplot(dir.path())
        .args([
            "generate", "base.json", "--x", "steps", "--x-values", "10, 20", "--y", "seed",
            "--y-values", "1-3", "--template", "{x_param}-{x_value}_{y_param}-{y_value}",
            "--out", "out",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 6 files"));

    let out = dir.path().join("out");
    assert_eq!(
        files_in(&out),
        vec![
            "steps-10_seed-1.txt",
            "steps-10_seed-2.txt",
            "steps-10_seed-3.txt",
            "steps-20_seed-1.txt",
            "steps-20_seed-2.txt",
            "steps-20_seed-3.txt",
        ]
    );

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("steps-20_seed-3.txt")).unwrap())
            .unwrap();
    assert_eq!(doc["steps"], 20);
    assert_eq!(doc["seed"], 3);
    assert_eq!(doc["meta"]["generated_by"], "xyzplot");
    assert_eq!(doc["meta"]["plot_params"]["x_axis"]["param"], "steps");
    assert_eq!(doc["meta"]["plot_params"]["x_axis"]["value"], 20);
    assert!(doc["meta"]["plot_params"].get("z_axis").is_none());
}

#[test]
fn generate_dry_run_writes_nothing() {
    let dir = project();
    let output = xyzplot(dir.path())
        .args([
            "generate", "base.json", "--x", "steps", "--x-values", "10", "--y", "sampler",
            "--y-values", "euler, ddim", "--dry-run", "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["files"].as_array().unwrap().len(), 2);
    assert_eq!(report["axes"][1]["values"], serde_json::json!(["euler", "ddim"]));
    assert!(!dir.path().join("plot_settings").exists());
}

#[test]
fn generate_groups_by_z() {
    let dir = project();
    xyzplot(dir.path())
        .args([
            "generate", "base.json", "--x", "steps", "--x-values", "10", "--y", "seed",
            "--y-values", "1", "--z", "sampler", "--z-choice", "euler", "--z-choice", "ddim",
            "--template", "{x_value}_{y_value}", "--out", "out", "--group-by-z",
        ])
        .assert()
        .success();

    let out = dir.path().join("out");
    assert_eq!(files_in(&out), vec!["z_sampler_ddim", "z_sampler_euler"]);
    assert_eq!(files_in(&out.join("z_sampler_euler")), vec!["10_1.txt"]);
}

#[test]
fn generate_without_y_fails() {
    let dir = project();
    xyzplot(dir.path())
        .args(["generate", "base.json", "--x", "steps", "--x-values", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Y-Axis parameter must be selected"));
}

#[test]
fn generate_error_as_json() {
    let dir = project();
    let output = xyzplot(dir.path())
        .args([
            "generate", "base.json", "--x", "steps", "--x-values", "5-1", "--y", "seed",
            "--y-values", "1", "--json",
        ])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let err: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert!(
        err["error"]
            .as_str()
            .unwrap()
            .contains("X-Axis parameter 'steps' has no values defined")
    );
}

#[test]
fn generate_missing_base_fails() {
    let dir = TempDir::new().unwrap();
    xyzplot(dir.path())
        .args(["generate", "nope.json", "--x", "steps", "--y", "seed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load base settings"));
}

#[test]
fn config_init_then_show() {
    let dir = TempDir::new().unwrap();
    xyzplot(dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.yaml"));
    assert!(dir.path().join(".xyzplot").join("config.yaml").exists());

    // A second init without --force refuses to overwrite.
    xyzplot(dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    xyzplot(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("generated_by: xyzplot"));
}

#[test]
fn config_file_is_discovered_from_subdirectory() {
    let dir = project();
    let plot_dir = dir.path().join(".xyzplot");
    fs::create_dir(&plot_dir).unwrap();
    fs::write(
        plot_dir.join("config.yaml"),
        "naming:\n  template: \"{y_value}-{x_value}\"\n  extension: .json\n",
    )
    .unwrap();
    let sub = dir.path().join("runs");
    fs::create_dir(&sub).unwrap();

    xyzplot(&sub)
        .args([
            "generate", "../base.json", "--x", "steps", "--x-values", "10", "--y", "seed",
            "--y-values", "7", "--out", "out",
        ])
        .assert()
        .success();
    assert_eq!(files_in(&sub.join("out")), vec!["7-10.json"]);
}

#[test]
fn env_overrides_template() {
    let dir = project();
    xyzplot(dir.path())
        .env("XYZPLOT_NAMING__TEMPLATE", "plot-{x_value}")
        .args([
            "generate", "base.json", "--x", "steps", "--x-values", "10, 20", "--y", "seed",
            "--y-values", "1", "--out", "out",
        ])
        .assert()
        .success();
    assert_eq!(
        files_in(&dir.path().join("out")),
        vec!["plot-10.txt", "plot-20.txt"]
    );
}

#[test]
fn name_previews_template() {
    let dir = project();
    let output = xyzplot(dir.path())
        .args([
            "name", "base.json", "--x", "cfg_scale", "--x-values", "5, 9", "--y", "seed",
            "--template", "{x_param}-{x_value}_{y_param}-{y_value}_{seed}_{mystery}", "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let preview: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(preview["preview"], "cfg_scale-5_seed-[y_val]_42_{mystery}.txt");
    assert_eq!(preview["unknown"], serde_json::json!(["mystery"]));
}

#[test]
fn completion_generates_script() {
    let dir = TempDir::new().unwrap();
    xyzplot(dir.path())
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("xyzplot"));
}
