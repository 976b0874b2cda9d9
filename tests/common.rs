#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Binary under test, isolated from the user's configuration directory and
/// pinned to UTC.
pub fn rtt() -> Command {
    let mut cmd = cargo_bin_cmd!("rtagtracker");
    let mut cfg_dir: PathBuf = env::temp_dir();
    cfg_dir.push("rtagtracker_test_config");
    cmd.env("RTAGTRACKER_CONFIG_DIR", cfg_dir);
    cmd.env_remove("RUST_LOG");
    cmd.args(["--tz", "UTC"]);
    cmd
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rtagtracker.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

pub fn init_db(db_path: &str) {
    rtt()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
}

pub fn record(db_path: &str, tag: &str, kind: &str, at: &str) {
    rtt()
        .args([
            "--db", db_path, "event", "--tag", tag, "--device", "reader-01", "--type", kind,
            "--at", at,
        ])
        .assert()
        .success();
}

/// T1 → Work/Email, on the reader 09:00-09:45 and 10:00-10:30 on 2025-03-10.
pub fn init_db_with_data(db_path: &str) {
    init_db(db_path);

    rtt()
        .args([
            "--db", db_path, "tag", "set", "T1", "--project", "Work", "--task", "Email",
        ])
        .assert()
        .success();

    record(db_path, "T1", "tag_insert", "2025-03-10 09:00");
    record(db_path, "T1", "tag_removed", "2025-03-10 09:45");
    record(db_path, "T1", "tag_insert", "2025-03-10 10:00");
    record(db_path, "T1", "tag_removed", "2025-03-10 10:30");
}
