use std::error::Error;
use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn config(data_dir: &Path) -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("skriv")?;
    cmd.arg("--data-dir").arg(data_dir).arg("config");
    Ok(cmd)
}

#[test]
fn shows_defaults_without_touching_the_session() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let data = dir.path().join("data");

    config(&data)?
        .assert()
        .success()
        .stdout(predicate::str::contains("autosave.enabled = true"))
        .stdout(predicate::str::contains("autosave.quiet_interval_ms = 500"))
        .stdout(predicate::str::contains("session.restore = true"));

    assert!(!data.join("preferences.json").exists());
    assert!(!data.join("session.json").exists());
    Ok(())
}

/// 修改後寫入偏好設定檔，靜止時間會被限制在範圍內。 /
/// Changes are written to preferences.json and the quiet interval is clamped.
#[test]
fn updates_are_saved_and_clamped() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let data = dir.path().join("data");

    config(&data)?
        .args(["--autosave", "false", "--quiet-interval-ms", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("saved"))
        .stdout(predicate::str::contains("autosave.enabled = false"))
        .stdout(predicate::str::contains("autosave.quiet_interval_ms = 50"));

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(data.join("preferences.json"))?)?;
    assert_eq!(saved["autosave"]["enabled"], false);
    assert_eq!(saved["autosave"]["quiet_interval_ms"], 50);
    assert_eq!(saved["session"]["restore"], true);

    config(&data)?
        .args(["--restore", "false"])
        .assert()
        .success()
        .stdout(predicate::str::contains("autosave.enabled = false"))
        .stdout(predicate::str::contains("session.restore = false"));
    Ok(())
}

#[test]
fn restore_switch_applies_to_the_next_launch() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let data = dir.path().join("data");
    let mut new = Command::cargo_bin("skriv")?;
    new.arg("--data-dir").arg(&data).arg("new").assert().success();

    config(&data)?.args(["--restore", "false"]).assert().success();

    let output = Command::cargo_bin("skriv")?
        .arg("--data-dir")
        .arg(&data)
        .arg("list")
        .output()?;
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout)?.lines().count(), 1);
    Ok(())
}

#[test]
fn rejects_non_boolean_switch() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    config(&dir.path().join("data"))?
        .args(["--autosave", "maybe"])
        .assert()
        .failure();
    Ok(())
}
