//! Integration tests for the file-backed stores

use rusty_exr::currency::Currency;
use rusty_exr::data::store::{bundled_fixture, DatasetStore, FileDatasetStore};
use rusty_exr::error::ExrError;
use rusty_exr::settings::{load_or_default, ConversionConfig, JsonFileSettingsStore, SettingsStore};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_last_good_survives_a_new_store() {
    let dir = TempDir::new().unwrap();
    let response = bundled_fixture("exr_all").unwrap();
    FileDatasetStore::new(dir.path()).save_last_good(&response).unwrap();

    let reopened = FileDatasetStore::new(dir.path());
    assert_eq!(reopened.load_last_good().unwrap(), Some(response));
}

#[test]
fn test_save_replaces_previous() {
    let dir = TempDir::new().unwrap();
    let store = FileDatasetStore::new(dir.path());
    let first = bundled_fixture("exr_all").unwrap();
    let mut second = first.clone();
    second.meta.id = "SECOND".to_string();

    store.save_last_good(&first).unwrap();
    store.save_last_good(&second).unwrap();
    assert_eq!(store.load_last_good().unwrap().unwrap().meta.id, "SECOND");

    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_corrupt_last_good_reports_cache_error() {
    let dir = TempDir::new().unwrap();
    let store = FileDatasetStore::new(dir.path());
    fs::write(store.last_good_path(), b"\x00\x01").unwrap();
    assert!(matches!(store.load_last_good(), Err(ExrError::Cache(_))));
}

#[test]
fn test_settings_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileSettingsStore::new(dir.path().join("settings.json"));
    assert!(store.load().unwrap().is_none());

    let mut config = ConversionConfig::first_run();
    config.set_base_currency(Currency::EUR);
    config.update_selected_currencies(vec![Currency::NOK, Currency::USD, Currency::USD]);
    config.set_multiplier(250.0).unwrap();
    store.save(&config).unwrap();

    let loaded = JsonFileSettingsStore::new(dir.path().join("settings.json"))
        .load()
        .unwrap()
        .unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.selected_currencies, vec![Currency::NOK, Currency::USD]);
}

#[test]
fn test_corrupt_settings_use_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "not json").unwrap();
    let config = load_or_default(&JsonFileSettingsStore::new(&path));
    assert_eq!(config, ConversionConfig::first_run());
}
