//! Edge case and error handling tests for treecheck


use assert_cmd::Command;
use harness::{TestDataset, run_treecheck};
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::symlink;

fn treecheck(dataset: &TestDataset) -> Command {
    let mut cmd = Command::cargo_bin("treecheck").expect("binary built");
    cmd.current_dir(dataset.path())
        .env_remove("RUST_LOG")
        .arg("--color=never");
    cmd
}

fn root_arg(dataset: &TestDataset) -> String {
    dataset.path().to_string_lossy().to_string()
}

// ============================================================================
// Fatal errors
// ============================================================================

#[test]
fn test_missing_root_fails() {
    let dataset = TestDataset::new();
    treecheck(&dataset)
        .arg(dataset.path().join("not-here"))
        .arg("--tree")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("treecheck: "))
        .stderr(predicate::str::contains("not an existing directory"));
}

#[test]
fn test_no_root_fails() {
    let dataset = TestDataset::new();
    treecheck(&dataset)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no root directory given"));
}

#[test]
fn test_invalid_identifier_expression_fails_before_traversal() {
    let dataset = TestDataset::bids(1);
    dataset.add_file(
        "settings.toml",
        "[categorization]\nfile_expression = \"([\"\n",
    );
    treecheck(&dataset)
        .args([root_arg(&dataset).as_str(), "--config", "settings.toml", "--tree"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("invalid regular expression '(['"));
}

#[test]
fn test_unknown_settings_key_fails() {
    let dataset = TestDataset::bids(1);
    dataset.add_file("settings.toml", "[measures]\nline_count = true\n");
    treecheck(&dataset)
        .args([root_arg(&dataset).as_str(), "--config", "settings.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse configuration file"));
}

#[test]
fn test_missing_settings_file_fails() {
    let dataset = TestDataset::bids(1);
    treecheck(&dataset)
        .args([root_arg(&dataset).as_str(), "--config", "nowhere.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read settings"));
}

#[test]
fn test_reversed_depth_range_fails() {
    let dataset = TestDataset::bids(1);
    treecheck(&dataset)
        .args([
            root_arg(&dataset).as_str(),
            "--get-configurations",
            "--depth-range",
            "3",
            "1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("greater than"));
}

#[test]
fn test_verbose_and_debug_conflict() {
    let dataset = TestDataset::bids(1);
    treecheck(&dataset)
        .args([root_arg(&dataset).as_str(), "-v", "-d"])
        .assert()
        .failure();
}

#[test]
fn test_bad_time_round_rejected() {
    let dataset = TestDataset::bids(1);
    treecheck(&dataset)
        .args([root_arg(&dataset).as_str(), "--time-round", "soon"])
        .assert()
        .failure();
}

// ============================================================================
// Recoverable conditions
// ============================================================================

#[test]
fn test_invalid_search_warns_and_continues() {
    let dataset = TestDataset::bids(1);
    treecheck(&dataset)
        .args([root_arg(&dataset).as_str(), "--tree", "--search", "sub-("])
        .assert()
        .success()
        .stdout(predicate::str::contains("sub-01_T1w.nii.gz"))
        .stderr(predicate::str::contains("resuming without criteria"));
}

#[test]
fn test_search_keeps_matching_names_only() {
    let dataset = TestDataset::bids(2);
    dataset.add_file("code/run.sh", "#!/bin/sh");
    let root = root_arg(&dataset);

    let (stdout, _stderr, success) = run_treecheck(
        dataset.path(),
        &[&root, "--tree", "--search", "sub-", "--filter-directories"],
    );
    assert!(success);
    assert!(stdout.contains("sub-02"));
    assert!(!stdout.contains("code"), "tree: {}", stdout);
    // files are not filtered
    assert!(stdout.contains("dataset_description.json"));
}

#[test]
fn test_empty_root() {
    let dataset = TestDataset::new();
    let root = root_arg(&dataset);
    let (stdout, _stderr, success) = run_treecheck(dataset.path(), &[&root, "--tree"]);
    assert!(success);
    assert!(stdout.ends_with("0 directories, 0 files\n"));
}

#[test]
fn test_symlinked_directory_not_descended() {
    let dataset = TestDataset::bids(1);
    symlink(dataset.path().join("sub-01"), dataset.path().join("sub-99")).unwrap();
    let root = root_arg(&dataset);

    let (stdout, _stderr, success) = run_treecheck(dataset.path(), &[&root, "--tree"]);
    assert!(success);
    assert!(stdout.contains("sub-99"));
    assert_eq!(stdout.matches("anat").count(), 1, "tree: {}", stdout);
}

#[test]
fn test_symlink_loop_terminates() {
    let dataset = TestDataset::bids(1);
    symlink(dataset.path(), dataset.path().join("sub-01/loop")).unwrap();
    let root = root_arg(&dataset);

    let (stdout, _stderr, success) = run_treecheck(dataset.path(), &[&root, "--tree"]);
    assert!(success);
    assert!(stdout.contains("loop"));
}

#[test]
fn test_dangling_symlink_listed_as_file() {
    let dataset = TestDataset::bids(1);
    symlink(
        dataset.path().join("gone.nii.gz"),
        dataset.path().join("sub-01/sub-01_old.nii.gz"),
    )
    .unwrap();
    let root = root_arg(&dataset);

    let (stdout, _stderr, success) = run_treecheck(dataset.path(), &[&root, "--tree"]);
    assert!(success);
    assert!(stdout.contains("sub-01_old.nii.gz"));
}

// ============================================================================
// Depth handling
// ============================================================================

#[test]
fn test_depth_limit_stops_descent() {
    let dataset = TestDataset::bids(1);
    let root = root_arg(&dataset);

    let (stdout, _stderr, success) =
        run_treecheck(dataset.path(), &[&root, "--tree", "--depth-limit", "1"]);
    assert!(success);
    assert!(stdout.contains("sub-01"));
    assert!(!stdout.contains("anat"), "tree: {}", stdout);
}

#[test]
fn test_depth_range_selects_levels() {
    let dataset = TestDataset::bids(2);
    let root = root_arg(&dataset);

    let (stdout, _stderr, success) = run_treecheck(
        dataset.path(),
        &[&root, "--summary", "--get-configurations", "--depth-range", "2", "2"],
    );
    assert!(success);
    assert!(stdout.contains("Configurations for directory **anat**"));
    assert!(stdout.contains("Configurations for directory **dwi**"));
    assert!(!stdout.contains("**sub-**"), "summary: {}", stdout);
}

// ============================================================================
// Settings and logging
// ============================================================================

#[test]
fn test_prefix_with_parent_from_settings() {
    let dataset = TestDataset::bids(1);
    dataset.add_file(
        "settings.toml",
        "[categorization]\nprefix_with_parent = true\n\n[measures]\nfile_size = true\n",
    );
    let root = root_arg(&dataset);

    let (stdout, stderr, success) = run_treecheck(
        dataset.path(),
        &[&root, "--config", "settings.toml", "--pipe-data"],
    );
    assert!(success, "stderr: {}", stderr);
    assert!(stdout.contains(",anat/_T1w.nii.gz,10,"), "{}", stdout);
}

#[test]
fn test_cli_overrides_settings_file() {
    let dataset = TestDataset::bids(1);
    let other = TestDataset::bids(2);
    dataset.add_file(
        "settings.toml",
        &format!("[input]\nroot_path = {:?}\n", root_arg(&other)),
    );
    let root = root_arg(&dataset);

    let (stdout, _stderr, success) = run_treecheck(
        dataset.path(),
        &[&root, "--config", "settings.toml", "--tree"],
    );
    assert!(success);
    assert!(!stdout.contains("sub-02"));
}

#[test]
fn test_log_file_written_without_color() {
    let dataset = TestDataset::bids(1);
    let logs = TestDataset::new();
    let log_path = logs.path().join("treecheck.log");
    let log_arg = log_path.to_string_lossy().to_string();
    let root = root_arg(&dataset);

    treecheck(&dataset)
        .args([root.as_str(), "--log", log_arg.as_str(), "--log-level", "debug"])
        .assert()
        .success();

    let log = fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("checking"), "log: {}", log);
    assert!(!log.contains('\u{1b}'));
}

#[test]
fn test_verbose_reports_progress_on_stderr() {
    let dataset = TestDataset::bids(1);
    treecheck(&dataset)
        .args([root_arg(&dataset).as_str(), "-v"])
        .assert()
        .success()
        // root, description, subject, anat, dwi and two files
        .stderr(predicate::str::contains("visited 7 nodes"));
}
