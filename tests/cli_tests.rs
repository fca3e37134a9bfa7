//! Integration tests for the runner binaries

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn kitti() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("run-kitti"))
}

fn mot() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("run-mot-challenge"))
}

fn write_fixture(root: &Path) {
    let dir = root.join("CIWT").join("data");
    fs::create_dir_all(&dir).expect("mkdir");
    fs::write(
        dir.join("0001.json"),
        r#"{"num_tracker_dets": 3, "num_gt_dets": 2,
            "similarity_scores": [[[0.1, 0.5], [0.7, 0.9]], [[0.4]]]}"#,
    )
    .expect("write 0001");
    fs::write(
        dir.join("0002.json"),
        r#"{"num_tracker_dets": 4, "num_gt_dets": 0, "similarity_scores": [[[0.8]]]}"#,
    )
    .expect("write 0002");
}

#[test]
fn test_cli_version() {
    kitti().arg("--version").assert().success().stdout(predicate::str::contains("run-kitti"));
}

#[test]
fn test_cli_help_lists_every_key() {
    kitti()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--USE_PARALLEL"))
        .stdout(predicate::str::contains("--TRACKERS_FOLDER"))
        .stdout(predicate::str::contains("--METRICS"))
        .stdout(predicate::str::contains("--COMBINE_METHOD"));

    mot().arg("--help").assert().success().stdout(predicate::str::contains("--SEQ_INFO"));
}

#[test]
fn test_unknown_flag_fails() {
    kitti()
        .args(["--NOT_A_KEY", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--NOT_A_KEY"));
}

#[test]
fn test_bad_boolean_fails() {
    kitti()
        .args(["--USE_PARALLEL", "maybe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("USE_PARALLEL must be True or False"));
}

#[test]
fn test_bad_integer_fails() {
    kitti()
        .args(["--NUM_PARALLEL_CORES", "many"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NUM_PARALLEL_CORES must be an integer"));
}

#[test]
fn test_empty_metrics_fails() {
    kitti()
        .args(["--METRICS", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No metrics selected for evaluation"));
}

#[test]
fn test_mot_defaults_select_no_available_metric() {
    mot().assert().failure().stderr(predicate::str::contains("No metrics selected"));
}

#[test]
fn test_unknown_combine_method_fails() {
    let trackers = TempDir::new().expect("trackers dir");
    write_fixture(trackers.path());
    kitti()
        .args([
            "--TRACKERS_FOLDER",
            trackers.path().to_str().expect("utf8 path"),
            "--COMBINE_METHOD",
            "median",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown combination method: median"));
}

#[test]
fn test_full_run_prints_results() {
    let trackers = TempDir::new().expect("trackers dir");
    write_fixture(trackers.path());
    kitti()
        .args([
            "--TRACKERS_FOLDER",
            trackers.path().to_str().expect("utf8 path"),
            "--METRICS",
            "MaxSim",
            "--COMBINE_METHOD",
            "average",
            "--USE_PARALLEL",
            "True",
            "--NUM_PARALLEL_CORES",
            "2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("MaxSim: CIWT"))
        .stdout(predicate::str::contains("0.6500"))
        .stdout(predicate::str::contains("COMBINED"))
        .stdout(predicate::str::contains("0.3250"));

    let summary = fs::read_to_string(trackers.path().join("CIWT").join("summary.txt"))
        .expect("summary written");
    assert_eq!(summary, "MaxSim\n0.325\n");
    let detailed = fs::read_to_string(trackers.path().join("CIWT").join("detailed.csv"))
        .expect("detailed written");
    assert!(detailed.starts_with("seq,MaxSim\n0001,0.65"));
}

#[test]
fn test_empty_tracker_folder_fails() {
    let trackers = TempDir::new().expect("trackers dir");
    fs::create_dir_all(trackers.path().join("CIWT").join("data")).expect("mkdir");
    kitti()
        .args(["--TRACKERS_FOLDER", trackers.path().to_str().expect("utf8 path")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no sequences found"))
        .stderr(predicate::str::contains("no values to combine").not());
}

#[test]
fn test_print_only_combined() {
    let trackers = TempDir::new().expect("trackers dir");
    write_fixture(trackers.path());
    kitti()
        .args([
            "--TRACKERS_FOLDER",
            trackers.path().to_str().expect("utf8 path"),
            "--PRINT_ONLY_COMBINED",
            "true",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("COMBINED"))
        .stdout(predicate::str::contains("0001").not());
}

#[test]
fn test_config_file_layer_is_overridden_by_cli() {
    let trackers = TempDir::new().expect("trackers dir");
    write_fixture(trackers.path());
    let cfg_dir = TempDir::new().expect("config dir");
    let cfg = cfg_dir.path().join("eval.toml");
    fs::write(
        &cfg,
        format!(
            "TRACKERS_FOLDER = '{}'\nCOMBINE_METHOD = 'median'\n",
            trackers.path().to_str().expect("utf8 path")
        ),
    )
    .expect("write config");

    kitti()
        .env("TRACK_EVAL_CONFIG", &cfg)
        .args(["--COMBINE_METHOD", "sum"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MaxSim: CIWT"));
}
