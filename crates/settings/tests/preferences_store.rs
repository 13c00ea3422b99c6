use skriv_settings::PreferencesStore;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn load_missing_file_returns_defaults() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("preferences.json");

    let store = PreferencesStore::load(&path).expect("load defaults");
    assert!(store.preferences().autosave.enabled);
    assert_eq!(store.preferences().autosave.quiet_interval_ms, 500);
    assert_eq!(
        store.preferences().autosave.quiet_interval(),
        Duration::from_millis(500)
    );
    assert!(store.preferences().session.restore);
    assert!(!path.exists());
}

#[test]
fn save_and_reload_roundtrip() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("nested").join("preferences.json");

    let mut store = PreferencesStore::load(&path).expect("defaults");
    store
        .update(|prefs| {
            prefs.autosave.enabled = false;
            prefs.autosave.quiet_interval_ms = 1200;
            prefs.session.restore = false;
        })
        .expect("save");

    let reloaded = PreferencesStore::load(&path).expect("reload");
    assert!(!reloaded.preferences().autosave.enabled);
    assert_eq!(reloaded.preferences().autosave.quiet_interval_ms, 1200);
    assert!(!reloaded.preferences().session.restore);
    assert!(!temp.path().join("nested").join("preferences.json.tmp").exists());
}

#[test]
fn quiet_interval_is_clamped() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("preferences.json");

    let mut store = PreferencesStore::load(&path).expect("default");
    store
        .update(|prefs| prefs.autosave.quiet_interval_ms = 0)
        .expect("save low");
    assert_eq!(store.preferences().autosave.quiet_interval_ms, 50);

    store
        .update(|prefs| prefs.autosave.quiet_interval_ms = 10_000_000)
        .expect("save high");
    assert_eq!(store.preferences().autosave.quiet_interval_ms, 60_000);
}

#[test]
fn partial_file_fills_in_defaults() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("preferences.json");
    fs::write(
        &path,
        r#"{
            "version": 0,
            "autosave": { "enabled": false }
        }"#,
    )
    .expect("write partial prefs");

    let store = PreferencesStore::load(&path).expect("load partial file");
    let prefs = store.preferences();
    assert_eq!(prefs.version, 1, "version zero should be upgraded");
    assert!(!prefs.autosave.enabled);
    assert_eq!(
        prefs.autosave.quiet_interval_ms, 500,
        "missing interval should fall back to default"
    );
    assert!(prefs.session.restore);
}

#[test]
fn malformed_file_is_reported() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("preferences.json");
    fs::write(&path, "not json").expect("write garbage");

    let err = PreferencesStore::load(&path).expect_err("parse failure");
    assert!(err.to_string().contains("failed to parse preferences"));
}
