use std::fs;

use collection_literals::btree;

use entryview::access::LogSink;
use entryview::memory::MemoryLibrary;
use entryview::{AccessConfig, AccessError, BufferedLog, Services, Severity, Value};

fn config_in(dir: &tempfile::TempDir, extra: &str) -> AccessConfig {
    let file = dir.path().join("memento_log.txt");
    let json = format!(
        r#"{{ "logging": {{ "file": {} {} }} }}"#,
        serde_json::to_string(&file).unwrap(),
        extra
    );
    AccessConfig::from_json_str(&json).unwrap()
}

#[test]
fn test_flush_appends_and_clears() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, "");
    let services = Services::from_config(&config);

    let books = MemoryLibrary::new("Books", ["Title"]);
    let entry = books.insert(btree! { "Title".to_string() => Value::from("Dune") });
    assert!(services.resolver().read(entry.as_ref(), "Rating").is_none());
    assert_eq!(services.log().flush().unwrap(), 2);
    assert!(services.log().is_empty());

    assert!(!services.resolver().delete(entry.as_ref(), "Rating"));
    assert_eq!(services.log().flush().unwrap(), 1);

    let contents = fs::read_to_string(&config.logging.file).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("[INFO] ----- Log Initialized -----"));
    assert!(lines[1].ends_with("[WARNING] Field or property \"Rating\" not found for entry \"Dune\"."));
    assert!(lines[2].contains("[ERROR] Cannot delete field or property \"Rating\""));
}

#[test]
fn test_level_filters_what_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    let services = Services::from_config(&config_in(&dir, r#", "level": "ERROR""#));

    let books = MemoryLibrary::new("Books", ["Title"]);
    let entry = books.push(books.entry_builder().field("Title", "Dune"));
    services.resolver().read(entry.as_ref(), "Rating");
    services.resolver().write(entry.as_ref(), "Title", "Emma");
    assert!(services.log().is_empty());

    services.resolver().write(entry.as_ref(), "Rating", 3i64);
    assert_eq!(services.log().len(), 1);
}

#[test]
fn test_disabled_log_keeps_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, r#", "enabled": false"#);
    let services = Services::from_config(&config);
    services.log().log_object(&btree! { "a" => 1 }, Severity::Info);
    assert!(services.log().is_empty());

    drop(services);
    assert!(!config.logging.file.exists());
}

#[test]
fn test_drop_flushes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drop.log");
    {
        let log = BufferedLog::with_file(&path);
        log.log("bye", Severity::Warning);
    }
    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.trim_end().ends_with("[WARNING] bye"));
}

#[test]
fn test_config_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();

    match AccessConfig::from_file(&path) {
        Err(AccessError::Config { message }) => assert!(message.contains("config.json")),
        other => panic!("unexpected result: {:?}", other),
    }
}
