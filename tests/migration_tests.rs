//! Integration tests for deprecated-key migration.

use keypath_config::{item, ConfigRegistry, Document};
use std::fs;
use tempfile::TempDir;

/// Helper to create a temporary directory for tests
fn temp_config_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

#[test]
fn test_sound_volume_migration_scenario() {
    // Store initially holds sound.vol = 0.5 and no sound.volume; after
    // initialize(), the value has moved to sound.volume and the old key is
    // gone.
    let dir = temp_config_dir();
    let config_path = dir.path().join("app.toml");
    fs::write(&config_path, "[sound]\nvol = 0.5\n").expect("Failed to seed config file");

    let volume = item("sound.volume", 1.0_f64).deprecated_keys(["sound.vol"]);
    let mut registry = ConfigRegistry::builder()
        .register(volume.clone())
        .open(&config_path)
        .expect("Failed to open registry");

    let affected = registry.initialize().expect("Failed to initialize");
    assert!(affected, "Migration must report a mutation");

    assert_eq!(volume.get(&registry).expect("Failed to get"), 0.5);
    assert!(volume.is_defined(&registry));
    assert!(!registry.document().contains("sound.vol"));

    // The migration was flushed.
    let on_disk = fs::read_to_string(&config_path).expect("Failed to read config file");
    assert!(on_disk.contains("volume = 0.5"));
    let reopened = ConfigRegistry::open(&config_path).expect("Failed to reopen registry");
    assert_eq!(volume.get(&reopened).expect("Failed to get"), 0.5);
    assert!(!reopened.document().contains("sound.vol"));
}

#[test]
fn test_later_alias_wins_over_earlier_and_default() {
    // Aliases are declared oldest first; with [A, B] both present, B's value
    // lands on the canonical path and both aliases are removed.
    let mut doc = Document::new();
    doc.set("speed.legacy", &10_i64).expect("Failed to set");
    doc.set("speed.old", &20_i64).expect("Failed to set");

    let speed = item("speed.current", 1_i64).deprecated_keys(["speed.legacy", "speed.old"]);
    let affected = speed.init(&mut doc).expect("Failed to init");

    assert!(affected);
    assert_eq!(
        doc.get_i64("speed.current", 0).expect("Failed to get"),
        20,
        "Last declared alias must win"
    );
    assert!(!doc.contains("speed.legacy"));
    assert!(!doc.contains("speed.old"));
}

#[test]
fn test_alias_overwrites_already_defined_canonical_value() {
    // A surviving deprecated key is authoritative even when the canonical
    // path already holds a value.
    let mut doc = Document::new();
    doc.set("limit", &50_i64).expect("Failed to set");
    doc.set("old_limit", &10_i64).expect("Failed to set");

    let limit = item("limit", 1_i64).deprecated_keys(["old_limit"]);
    let affected = limit.init(&mut doc).expect("Failed to init");

    assert!(affected);
    assert_eq!(doc.get_i64("limit", 0).expect("Failed to get"), 10);
    assert!(!doc.contains("old_limit"));
}

#[test]
fn test_init_seeds_default_when_nothing_present() {
    let mut doc = Document::new();
    let greeting = item("ui.greeting", String::from("hello"));

    let affected = greeting.init(&mut doc).expect("Failed to init");

    assert!(affected);
    assert_eq!(
        doc.get_str("ui.greeting", "").expect("Failed to get"),
        "hello"
    );
}

#[test]
fn test_init_is_idempotent() {
    let mut doc = Document::new();
    doc.set("old.key", &true).expect("Failed to set");
    let flag = item("flag", false).deprecated_keys(["old.key"]);

    assert!(flag.init(&mut doc).expect("Failed to init"));
    assert!(
        !flag.init(&mut doc).expect("Failed to init"),
        "Second init must be a no-op"
    );
    assert!(doc.get_bool("flag", false).expect("Failed to get"));
}

#[test]
fn test_initialize_is_idempotent_across_the_registry() {
    let dir = temp_config_dir();
    let config_path = dir.path().join("app.toml");

    let volume = item("sound.volume", 1.0_f64).deprecated_keys(["sound.vol"]);
    let limit = item("limit", 10_i64);
    let mut registry = ConfigRegistry::builder()
        .register(volume)
        .register(limit)
        .open(&config_path)
        .expect("Failed to open registry");

    assert!(registry.initialize().expect("Failed to initialize"));
    assert!(
        !registry.initialize().expect("Failed to initialize"),
        "Second initialize must report no mutation"
    );
}

#[test]
fn test_init_without_aliases_and_defined_path_reports_no_change() {
    let mut doc = Document::new();
    doc.set("limit", &99_i64).expect("Failed to set");

    let limit = item("limit", 10_i64);
    assert!(!limit.init(&mut doc).expect("Failed to init"));
    assert_eq!(doc.get_i64("limit", 0).expect("Failed to get"), 99);
}

#[test]
fn test_migration_across_unrelated_sections() {
    let dir = temp_config_dir();
    let config_path = dir.path().join("app.toml");
    fs::write(&config_path, "[legacy.sound]\nlevel = 0.3\n").expect("Failed to seed config file");

    let volume = item("audio.volume", 1.0_f64).deprecated_keys(["legacy.sound.level"]);
    let mut registry = ConfigRegistry::builder()
        .register(volume.clone())
        .open(&config_path)
        .expect("Failed to open registry");
    registry.initialize().expect("Failed to initialize");

    assert_eq!(volume.get(&registry).expect("Failed to get"), 0.3);
    assert!(!registry.document().contains("legacy.sound.level"));
}
