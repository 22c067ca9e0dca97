//! Integration tests for the cafftrack binary.
//!
//! These tests drive the CLI end to end with fixture record files and a
//! fixed `--at` instant so every calculation is reproducible.

use assert_cmd::Command;
use chrono::{Local, TimeZone};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const HOUR_MS: i64 = 3_600_000;

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("cafftrack"))
}

/// Write a default config and the given records JSON into a temp dir.
fn fixture(records_json: &str) -> (TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[pharmacokinetics]
weight_kg = 60.0
half_life_hours = 4.0
volume_of_distribution_l_per_kg = 0.6
safe_sleep_threshold_mg_l = 1.5
"#,
    )
    .unwrap();
    let records_path = dir.path().join("records.json");
    fs::write(&records_path, records_json).unwrap();
    (dir, config_path, records_path)
}

fn status_at(config: &Path, records: &Path, at: i64) -> Command {
    let mut cmd = cli();
    cmd.arg("status")
        .arg("--config")
        .arg(config)
        .arg("--records")
        .arg(records)
        .arg("--at")
        .arg(at.to_string());
    cmd
}

/// Noon local time on a fixed date, so "today" is unambiguous.
fn local_noon(y: i32, mo: u32, d: u32) -> i64 {
    Local
        .with_ymd_and_hms(y, mo, d, 12, 0, 0)
        .unwrap()
        .timestamp_millis()
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Personal caffeine intake tracker"));
}

#[test]
fn test_status_one_half_life_later() {
    let now = local_noon(2024, 1, 3);
    let ingested = now - 4 * HOUR_MS;
    let (_dir, config, records) = fixture(&format!(
        r#"[{{ "id": "a", "amount": 100, "timestamp": {ingested} }}]"#
    ));

    // 100mg one 4h half-life ago: 50mg left, 50/36 = 1.39 mg/L, under the
    // 54mg sleep target.
    status_at(&config, &records, now)
        .assert()
        .success()
        .stdout(predicate::str::contains("Current caffeine: 50.0 mg"))
        .stdout(predicate::str::contains("Estimated concentration: 1.39 mg/L"))
        .stdout(predicate::str::contains("Today's intake: 100 mg"))
        .stdout(predicate::str::contains("Sleep: safe now"));
}

#[test]
fn test_status_above_threshold_estimates_sleep_time() {
    let now = local_noon(2024, 1, 3);
    let (_dir, config, records) = fixture(&format!(
        r#"[{{ "id": "a", "amount": 300, "timestamp": {now} }}]"#
    ));

    status_at(&config, &records, now)
        .assert()
        .success()
        .stdout(predicate::str::contains("Current caffeine: 300.0 mg"))
        .stdout(predicate::str::contains("Sleep: safe in"));
}

#[test]
fn test_status_with_no_records() {
    let now = local_noon(2024, 1, 3);
    let (_dir, config, records) = fixture("[]");

    status_at(&config, &records, now)
        .assert()
        .success()
        .stdout(predicate::str::contains("Current caffeine: 0.0 mg"))
        .stdout(predicate::str::contains("Today's intake: 0 mg"))
        .stdout(predicate::str::contains("Sleep: safe now"));
}

#[test]
fn test_status_accepts_backup_document() {
    let now = local_noon(2024, 1, 3);
    let (_dir, config, records) = fixture(&format!(
        r#"{{
            "records": [{{ "id": 1, "amount": 80, "timestamp": {now} }}],
            "userSettings": {{ "themeMode": "auto" }},
            "drinks": [],
            "exportTimestamp": {now},
            "version": "1.0"
        }}"#
    ));

    status_at(&config, &records, now)
        .assert()
        .success()
        .stdout(predicate::str::contains("Current caffeine: 80.0 mg"));
}

#[test]
fn test_malformed_records_are_skipped() {
    let now = local_noon(2024, 1, 3);
    let (_dir, config, records) = fixture(&format!(
        r#"[
            {{ "id": "good", "amount": 60, "timestamp": {now} }},
            {{ "id": "bad", "amount": "not-a-number", "timestamp": {now} }},
            {{ "id": "worse" }}
        ]"#
    ));

    status_at(&config, &records, now)
        .assert()
        .success()
        .stdout(predicate::str::contains("Current caffeine: 60.0 mg"));
}

#[test]
fn test_stats_week_buckets_and_sources() {
    // 2024-01-01 was a Monday.
    let monday = Local
        .with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
        .unwrap()
        .timestamp_millis();
    let wednesday = Local
        .with_ymd_and_hms(2024, 1, 3, 14, 0, 0)
        .unwrap()
        .timestamp_millis();
    let (_dir, config, records) = fixture(&format!(
        r#"[
            {{ "id": "m", "amount": 50, "timestamp": {monday},
               "drinkId": "espresso", "name": "Espresso" }},
            {{ "id": "w", "amount": 30, "timestamp": {wednesday},
               "customName": "Tea" }}
        ]"#
    ));

    cli()
        .arg("stats")
        .arg("--config")
        .arg(&config)
        .arg("--records")
        .arg(&records)
        .arg("--period")
        .arg("week")
        .arg("--date")
        .arg("2024-01-04")
        .assert()
        .success()
        .stdout(predicate::str::contains("Week total: 80 mg"))
        .stdout(predicate::str::contains("Mon"))
        .stdout(predicate::str::contains("Espresso"))
        .stdout(predicate::str::contains("Tea"))
        .stdout(predicate::str::contains("62.50%"));
}

#[test]
fn test_stats_sort_by_count() {
    let now = local_noon(2024, 1, 3);
    let (_dir, config, records) = fixture(&format!(
        r#"[
            {{ "id": 1, "amount": 10, "timestamp": {now}, "customName": "Tea" }},
            {{ "id": 2, "amount": 10, "timestamp": {now}, "customName": "Tea" }},
            {{ "id": 3, "amount": 500, "timestamp": {now}, "customName": "Espresso" }}
        ]"#
    ));

    // Ranked by count, Tea (2 records) leads despite the smaller amount.
    cli()
        .arg("stats")
        .arg("--config")
        .arg(&config)
        .arg("--records")
        .arg(&records)
        .arg("--period")
        .arg("day")
        .arg("--date")
        .arg("2024-01-03")
        .arg("--sort-by")
        .arg("count")
        .assert()
        .success()
        .stdout(predicate::str::contains("Day total: 520 mg"))
        .stdout(predicate::str::contains("66.67%"));
}

#[test]
fn test_stats_rejects_unknown_period() {
    let (_dir, config, records) = fixture("[]");

    cli()
        .arg("stats")
        .arg("--config")
        .arg(&config)
        .arg("--records")
        .arg(&records)
        .arg("--period")
        .arg("fortnight")
        .assert()
        .failure();
}

#[test]
fn test_curve_window_and_values() {
    let now = local_noon(2024, 1, 3);
    let (_dir, config, records) = fixture(&format!(
        r#"[{{ "id": "a", "amount": 100, "timestamp": {now} }}]"#
    ));

    let assert = cli()
        .arg("curve")
        .arg("--config")
        .arg(&config)
        .arg("--records")
        .arg(&records)
        .arg("--at")
        .arg(now.to_string())
        .arg("--hours-before")
        .arg("1")
        .arg("--hours-after")
        .arg("1")
        .arg("--points-per-hour")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("100.0 mg"));

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(stdout.lines().count(), 3);
}

#[test]
fn test_dose_per_100ml() {
    let (_dir, config, _records) = fixture("[]");

    // A 330ml can at 40mg/100ml.
    cli()
        .arg("dose")
        .arg("--config")
        .arg(&config)
        .arg("--per-100ml")
        .arg("40")
        .arg("--serving")
        .arg("330")
        .assert()
        .success()
        .stdout(predicate::str::contains("132 mg"));
}

#[test]
fn test_dose_per_gram() {
    let (_dir, config, _records) = fixture("[]");

    cli()
        .arg("dose")
        .arg("--config")
        .arg(&config)
        .arg("--per-gram")
        .arg("11")
        .arg("--serving")
        .arg("18")
        .assert()
        .success()
        .stdout(predicate::str::contains("198 mg"));
}

#[test]
fn test_dose_requires_a_spec() {
    let (_dir, config, _records) = fixture("[]");

    cli()
        .arg("dose")
        .arg("--config")
        .arg(&config)
        .arg("--serving")
        .arg("250")
        .assert()
        .failure();
}

#[test]
fn test_invalid_config_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[pharmacokinetics]
weight_kg = -10.0
"#,
    )
    .unwrap();
    let records_path = dir.path().join("records.json");
    fs::write(&records_path, "[]").unwrap();

    status_at(&config_path, &records_path, 0)
        .assert()
        .failure()
        .stderr(predicate::str::contains("weight"));
}
