use assert_cmd::Command;
use chrono::Utc;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn pomo(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pomo").unwrap();
    cmd.env("POMO_HOME", home).env_remove("RUST_LOG");
    cmd
}

fn settings_json(home: &Path) -> serde_json::Value {
    let output = pomo(home)
        .args(["settings", "show", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_defaults_without_saved_settings() {
    let home = TempDir::new().unwrap();
    let json = settings_json(home.path());

    assert_eq!(json["focusTime"], 25);
    assert_eq!(json["shortBreak"], 5);
    assert_eq!(json["longBreak"], 15);
    assert_eq!(json["sessionsBeforeLongBreak"], 4);
}

#[test]
fn test_set_then_show() {
    let home = TempDir::new().unwrap();

    pomo(home.path())
        .args(["settings", "set", "--focus", "50", "--every", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Settings saved"));

    let json = settings_json(home.path());
    assert_eq!(json["focusTime"], 50);
    assert_eq!(json["shortBreak"], 5);
    assert_eq!(json["sessionsBeforeLongBreak"], 2);

    assert!(home.path().join("config/settings.json").exists());
}

#[test]
fn test_set_rejects_zero_minutes() {
    let home = TempDir::new().unwrap();

    pomo(home.path())
        .args(["settings", "set", "--focus", "0"])
        .assert()
        .failure();

    assert!(!home.path().join("config/settings.json").exists());
}

#[test]
fn test_invalid_saved_fields_fall_back() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("config");
    fs::create_dir_all(&config).unwrap();
    fs::write(
        config.join("settings.json"),
        r#"{"focusTime": 0, "shortBreak": 10, "longBreak": "x"}"#,
    )
    .unwrap();

    let json = settings_json(home.path());
    assert_eq!(json["focusTime"], 25);
    assert_eq!(json["shortBreak"], 10);
    assert_eq!(json["longBreak"], 15);
}

#[test]
fn test_malformed_settings_use_defaults() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("config");
    fs::create_dir_all(&config).unwrap();
    fs::write(config.join("settings.json"), "not json at all").unwrap();

    let json = settings_json(home.path());
    assert_eq!(json["focusTime"], 25);
}

#[test]
fn test_settings_reset() {
    let home = TempDir::new().unwrap();

    pomo(home.path())
        .args(["settings", "set", "--short", "8"])
        .assert()
        .success();
    pomo(home.path())
        .args(["settings", "reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reset to defaults"));

    assert_eq!(settings_json(home.path())["shortBreak"], 5);
}

#[test]
fn test_stats_empty() {
    let home = TempDir::new().unwrap();

    pomo(home.path())
        .args(["stats", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Sessions:    0"));
}

#[test]
fn test_stats_reads_history() {
    let home = TempDir::new().unwrap();
    let history = home.path().join("data/history");
    fs::create_dir_all(&history).unwrap();

    let now = Utc::now();
    let lines = [
        format!(r#"{{"end":{},"kind":"focus","duration":1500,"session":1}}"#, now.timestamp()),
        format!(r#"{{"end":{},"kind":"short-break","duration":300,"session":2}}"#, now.timestamp()),
        format!(r#"{{"end":{},"kind":"focus","duration":1500,"session":2}}"#, now.timestamp()),
    ];
    fs::write(
        history.join(format!("sessions-{}.jsonl", now.date_naive())),
        lines.join("\n"),
    )
    .unwrap();

    pomo(home.path())
        .args(["stats", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Sessions:    3"))
        .stdout(predicate::str::contains("Focus Sessions:    2"))
        .stdout(predicate::str::contains("1 short, 0 long"))
        .stdout(predicate::str::contains("0h 50m"));
}

#[test]
fn test_run_quits_on_q() {
    let home = TempDir::new().unwrap();

    pomo(home.path())
        .args(["run", "--no-notify"])
        .write_stdin("q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("POMODORO TIMER"))
        .stdout(predicate::str::contains("25:00"))
        .stdout(predicate::str::contains("Ready"));
}

#[test]
fn test_run_keys_drive_the_timer() {
    let home = TempDir::new().unwrap();

    pomo(home.path())
        .args(["run", "--no-notify", "--short", "3"])
        .write_stdin("s\np\nm\nbogus\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Running"))
        .stdout(predicate::str::contains("Paused"))
        .stdout(predicate::str::contains("03:00"))
        .stdout(predicate::str::contains("Short Break"))
        .stdout(predicate::str::contains("Unknown key 'bogus'"));
}

#[test]
fn test_bad_config_is_reported() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("config");
    fs::create_dir_all(&config).unwrap();
    fs::write(config.join("config.toml"), "[notify\n").unwrap();

    pomo(home.path())
        .args(["settings", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}

#[test]
fn test_set_largest_every_value() {
    let home = TempDir::new().unwrap();

    pomo(home.path())
        .args(["settings", "set", "--every", "4294967295"])
        .assert()
        .success()
        .stdout(predicate::str::contains("every 4294967296 sessions"));

    pomo(home.path())
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("every 4294967296 sessions"));
    assert_eq!(
        settings_json(home.path())["sessionsBeforeLongBreak"],
        4294967295u64
    );
}

#[test]
fn test_run_with_largest_saved_session_count() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("config");
    fs::create_dir_all(&config).unwrap();
    fs::write(
        config.join("settings.json"),
        r#"{"sessionsBeforeLongBreak": 4294967295}"#,
    )
    .unwrap();

    pomo(home.path())
        .args(["run", "--no-notify"])
        .write_stdin("q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("every 4294967296 sessions"));
}
