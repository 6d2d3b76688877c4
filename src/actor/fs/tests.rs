use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use super::Watcher;
use super::filter::ChangeFilter;
use super::types::ChangeKind;
use crate::config::{RunnerConfig, test_config_at};
use crate::core::{ChangeEvent, event_channel};

fn make_config(extra: &str) -> (TempDir, RunnerConfig) {
    let temp = TempDir::new().unwrap();
    let config = test_config_at(temp.path(), extra);
    (temp, config)
}

fn make_event(paths: &[PathBuf], kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: paths.to_vec(),
        attrs: Default::default(),
    }
}

fn modify_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Data(
        notify::event::DataChange::Any,
    ))
}

fn create_kind() -> notify::EventKind {
    notify::EventKind::Create(notify::event::CreateKind::File)
}

fn remove_kind() -> notify::EventKind {
    notify::EventKind::Remove(notify::event::RemoveKind::File)
}

#[test]
fn test_kind_mapping() {
    assert_eq!(ChangeKind::from_notify(&create_kind()), Some(ChangeKind::Created));
    assert_eq!(ChangeKind::from_notify(&modify_kind()), Some(ChangeKind::Modified));
    assert_eq!(ChangeKind::from_notify(&remove_kind()), Some(ChangeKind::Removed));
    assert_eq!(
        ChangeKind::from_notify(&notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
            notify::event::MetadataKind::WriteTime,
        ))),
        None
    );
    assert_eq!(
        ChangeKind::from_notify(&notify::EventKind::Access(notify::event::AccessKind::Any)),
        None
    );
}

#[test]
fn test_event_id_is_relative_path_and_kind() {
    let (_temp, config) = make_config("");
    let filter = ChangeFilter::new(&config);

    let event = make_event(&[config.root.join("handlers/user.go")], modify_kind());
    assert_eq!(
        filter.events(&event),
        vec![ChangeEvent::new("handlers/user.go:modified")]
    );
}

#[test]
fn test_extension_filter() {
    let (_temp, config) = make_config("");
    let filter = ChangeFilter::new(&config);

    assert!(filter.accepts(&config.root.join("main.go")));
    assert!(filter.accepts(&config.root.join("views/index.tmpl")));
    assert!(!filter.accepts(&config.root.join("README.md")));
    assert!(!filter.accepts(&config.root.join("Makefile")));
}

#[test]
fn test_empty_extension_list_accepts_all() {
    let (_temp, config) = make_config("[watch]\nextensions = []");
    let filter = ChangeFilter::new(&config);

    assert!(filter.accepts(&config.root.join("README.md")));
    assert!(filter.accepts(&config.root.join("Makefile")));
}

#[test]
fn test_ignored_dirs_filtered() {
    let (_temp, config) = make_config("");
    let filter = ChangeFilter::new(&config);

    assert!(!filter.accepts(&config.root.join("tmp/main.go")));
    assert!(!filter.accepts(&config.root.join("assets/page.html")));
    assert!(filter.accepts(&config.root.join("templates/page.html")));
}

#[test]
fn test_temp_files_filtered() {
    let (_temp, config) = make_config("[watch]\nextensions = []");
    let filter = ChangeFilter::new(&config);

    for name in ["main.go.swp", ".main.go.swx", "main.go~", "notes.bak", "x.tmp"] {
        assert!(!filter.accepts(&config.root.join(name)), "{name} should be ignored");
    }
}

#[test]
fn test_metadata_event_produces_nothing() {
    let (_temp, config) = make_config("");
    let filter = ChangeFilter::new(&config);

    let event = make_event(
        &[config.root.join("main.go")],
        notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
            notify::event::MetadataKind::Permissions,
        )),
    );
    assert!(filter.events(&event).is_empty());
}

#[test]
fn test_multi_path_event_keeps_order() {
    let (_temp, config) = make_config("");
    let filter = ChangeFilter::new(&config);

    let event = make_event(
        &[
            config.root.join("b.go"),
            config.root.join("skip.md"),
            config.root.join("a.go"),
        ],
        remove_kind(),
    );
    assert_eq!(
        filter.events(&event),
        vec![
            ChangeEvent::new("b.go:removed"),
            ChangeEvent::new("a.go:removed"),
        ]
    );
}

#[tokio::test]
async fn test_watcher_publishes_changes() {
    let (_temp, config) = make_config("");
    let root = config.root.clone();
    let (tx, mut rx) = event_channel();

    let _watcher = Watcher::start(Arc::new(config), tx).unwrap();
    std::fs::write(root.join("main.go"), "package main\n").unwrap();

    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no change event within 5s")
        .unwrap();
    assert!(event.as_str().starts_with("main.go:"));
}

#[tokio::test]
async fn test_watcher_skips_ignored_changes() {
    let (_temp, config) = make_config("");
    let root = config.root.clone();
    std::fs::create_dir_all(root.join("tmp")).unwrap();
    let (tx, mut rx) = event_channel();

    let _watcher = Watcher::start(Arc::new(config), tx).unwrap();
    std::fs::write(root.join("tmp/runner-build.go"), "x").unwrap();
    std::fs::write(root.join("notes.md"), "x").unwrap();

    let result = tokio::time::timeout(Duration::from_millis(500), rx.recv()).await;
    assert!(result.is_err(), "unexpected event: {result:?}");
}
