use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{init_db, init_db_with_data, record, rtt, setup_test_db, temp_out};

#[test]
fn test_init_creates_database() {
    let db_path = setup_test_db("init_creates_database");

    rtt()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));

    assert!(std::path::Path::new(&db_path).exists());
}

#[test]
fn test_blocks_for_a_day() {
    let db_path = setup_test_db("blocks_for_a_day");
    init_db_with_data(&db_path);

    rtt()
        .args(["--db", &db_path, "blocks", "--period", "2025-03-10"])
        .assert()
        .success()
        .stdout(
            contains("2025-03-10")
                .and(contains("Work"))
                .and(contains("Email"))
                .and(contains("09:00:00"))
                .and(contains("09:45:00"))
                .and(contains("45m"))
                .and(contains("30m"))
                .and(contains("Total: 1h 15m")),
        );
}

#[test]
fn test_blocks_cross_midnight_stays_on_start_day() {
    let db_path = setup_test_db("blocks_cross_midnight");
    init_db(&db_path);

    record(&db_path, "T9", "tag_insert", "2025-03-10 23:50");
    record(&db_path, "T9", "tag_removed", "2025-03-11 00:20");

    rtt()
        .args(["--db", &db_path, "blocks", "--period", "2025-03-10"])
        .assert()
        .success()
        .stdout(contains("T9").and(contains("Total: 30m")));

    rtt()
        .args(["--db", &db_path, "blocks", "--period", "2025-03-11"])
        .assert()
        .success()
        .stdout(contains("T9").not());
}

#[test]
fn test_blocks_open_session_and_anomalies() {
    let db_path = setup_test_db("blocks_open_session");
    init_db(&db_path);

    record(&db_path, "T2", "tag_removed", "2025-03-10 08:00");
    record(&db_path, "T2", "tag_insert", "2025-03-10 09:00");
    record(&db_path, "T2", "tag_insert", "2025-03-10 09:10");

    rtt()
        .args(["--db", &db_path, "blocks", "--period", "2025-03-10"])
        .assert()
        .success()
        .stdout(contains("Open sessions").and(contains("2025-03-10 09:00")))
        .stderr(contains("1 duplicate insert(s) and 1 orphan remove(s)"));
}

#[test]
fn test_blocks_tag_filter() {
    let db_path = setup_test_db("blocks_tag_filter");
    init_db_with_data(&db_path);

    record(&db_path, "T7", "tag_insert", "2025-03-10 11:00");
    record(&db_path, "T7", "tag_removed", "2025-03-10 11:20");

    rtt()
        .args(["--db", &db_path, "blocks", "--period", "2025-03-10", "--tag", "T7"])
        .assert()
        .success()
        .stdout(contains("T7").and(contains("Total: 20m")).and(contains("Work").not()));
}

#[test]
fn test_events_listing() {
    let db_path = setup_test_db("events_listing");
    init_db_with_data(&db_path);

    rtt()
        .args(["--db", &db_path, "events", "--period", "2025-03-10"])
        .assert()
        .success()
        .stdout(
            contains("2025-03-10 09:00:00")
                .and(contains("Insert"))
                .and(contains("Remove"))
                .and(contains("reader-01"))
                .and(contains("Work/Email")),
        );
}

#[test]
fn test_event_rejects_unknown_type() {
    let db_path = setup_test_db("event_unknown_type");
    init_db(&db_path);

    rtt()
        .args([
            "--db", &db_path, "event", "--tag", "T1", "--device", "reader-01", "--type",
            "tag_moved",
        ])
        .assert()
        .failure();
}

#[test]
fn test_event_from_unregistered_device_is_rejected() {
    let db_path = setup_test_db("event_unknown_device");
    init_db(&db_path);

    rtt()
        .args(["--db", &db_path, "device", "set", "reader-01", "--name", "Desk"])
        .assert()
        .success();

    rtt()
        .args([
            "--db", &db_path, "event", "--tag", "T1", "--device", "reader-99", "--type",
            "tag_insert", "--at", "2025-03-10 09:00",
        ])
        .assert()
        .failure()
        .stderr(contains("Unknown device"));

    record(&db_path, "T1", "tag_insert", "2025-03-10 09:00");
}

#[test]
fn test_tag_and_device_management() {
    let db_path = setup_test_db("tag_device_management");
    init_db(&db_path);

    rtt()
        .args(["--db", &db_path, "tag", "set", "T1", "--project", "Work", "--reflection"])
        .assert()
        .success()
        .stdout(contains("Tag T1 assigned"));

    rtt()
        .args(["--db", &db_path, "tag", "set", "T1", "--project", "Home", "--task", "Chores"])
        .assert()
        .success()
        .stdout(contains("Tag T1 updated"));

    rtt()
        .args(["--db", &db_path, "tag", "list"])
        .assert()
        .success()
        .stdout(contains("Home").and(contains("Chores")).and(contains("Work").not()));

    rtt()
        .args(["--db", &db_path, "tag", "del", "T1"])
        .assert()
        .success();

    rtt()
        .args(["--db", &db_path, "tag", "del", "T1"])
        .assert()
        .failure()
        .stderr(contains("Tag not found"));

    rtt()
        .args(["--db", &db_path, "device", "set", "reader-01", "--location", "Office"])
        .assert()
        .success();

    rtt()
        .args(["--db", &db_path, "device", "list"])
        .assert()
        .success()
        .stdout(contains("reader-01").and(contains("Office")));

    rtt()
        .args(["--db", &db_path, "device", "del", "reader-02"])
        .assert()
        .failure()
        .stderr(contains("Device not found"));
}

#[test]
fn test_ingest_keeps_valid_records() {
    let db_path = setup_test_db("ingest_valid_records");
    init_db(&db_path);

    let input = temp_out("ingest_valid_records", "json");
    fs::write(
        &input,
        r#"[
  {"timestamp": "2025-03-10T09:00:00Z", "event_type": "tag_insert", "tag_present": true,
   "tag_id": "T1", "device_id": "reader-01", "tag_type": "NTAG215"},
  {"timestamp": "2025-03-10T09:30:00Z", "event_type": "tag_removed", "tag_present": false,
   "tag_id": "T1", "device_id": "reader-01"},
  {"timestamp": "2025-03-10T09:40:00Z", "event_type": "tag_moved", "tag_present": true,
   "tag_id": "T1", "device_id": "reader-01"},
  {"timestamp": "yesterday", "event_type": "tag_insert", "tag_present": true,
   "tag_id": "T1", "device_id": "reader-01"}
]"#,
    )
    .expect("write ingest file");

    rtt()
        .args(["--db", &db_path, "ingest", "--file", &input])
        .assert()
        .success()
        .stdout(contains("Ingested 2 event(s), rejected 2."))
        .stderr(contains("Record #2 rejected").and(contains("Record #3 rejected")));

    rtt()
        .args(["--db", &db_path, "blocks", "--period", "2025-03-10"])
        .assert()
        .success()
        .stdout(contains("Total: 30m"));
}

#[test]
fn test_summary_json_for_today() {
    let db_path = setup_test_db("summary_json_today");
    init_db(&db_path);

    rtt()
        .args(["--db", &db_path, "tag", "set", "T1", "--project", "Work", "--task", "Email"])
        .assert()
        .success();

    let today = chrono::Utc::now().date_naive();
    record(&db_path, "T1", "tag_insert", &format!("{today}T00:01:00Z"));
    record(&db_path, "T1", "tag_removed", &format!("{today}T00:31:00Z"));
    // zero-duration block: counted in time, not as completed work
    record(&db_path, "T3", "tag_insert", &format!("{today}T00:40:00Z"));
    record(&db_path, "T3", "tag_removed", &format!("{today}T00:40:00Z"));

    let output = rtt()
        .args(["--db", &db_path, "summary", "--json"])
        .output()
        .expect("run summary");
    assert!(output.status.success());

    let metrics: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("summary prints JSON");
    assert_eq!(metrics["active_projects"], 1);
    assert_eq!(metrics["completed_tasks"], 1);
    assert_eq!(metrics["total_tags"], 1);
    assert_eq!(metrics["total_devices"], 0);
    assert_eq!(metrics["today_time_minutes"], 30.0);
    assert_eq!(metrics["week_time_minutes"], 30.0);
}

#[test]
fn test_summary_empty_database() {
    let db_path = setup_test_db("summary_empty");
    init_db(&db_path);

    rtt()
        .args(["--db", &db_path, "summary"])
        .assert()
        .success()
        .stdout(contains("Active projects:").and(contains("00h 00m")));
}

#[test]
fn test_log_print_records_operations() {
    let db_path = setup_test_db("log_print_operations");
    init_db_with_data(&db_path);

    rtt()
        .args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(
            contains("migration_applied")
                .and(contains("init"))
                .and(contains("tag_set"))
                .and(contains("event")),
        );
}

#[test]
fn test_invalid_timezone_override_fails() {
    let db_path = setup_test_db("invalid_tz_override");

    rtt()
        .args(["--db", &db_path, "--tz", "Mars/Olympus", "summary"])
        .assert()
        .failure()
        .stderr(contains("Invalid timezone"));
}
