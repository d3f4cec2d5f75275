//! Integration tests for backup export and import between two data directories.

use aesvault::ops::{export, import, run, TransformRequest};
use aesvault::profiles::KeySet;
use aesvault::store::{EntryStore, Operation};
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_backup_moves_history_between_machines() {
    let source_dir = tempdir().unwrap();
    let target_dir = tempdir().unwrap();
    let backup = source_dir.path().join("backup.json");
    let keys = KeySet::default();

    let mut source = EntryStore::open(source_dir.path());
    run(&mut source, &keys, TransformRequest::new(Operation::Encrypt, "alpha")).unwrap();
    let mut favorite = TransformRequest::new(Operation::Encrypt, "beta");
    favorite.favorite = true;
    run(&mut source, &keys, favorite).unwrap();

    let report = export(&mut source, &backup, true, true).unwrap();
    assert_eq!(report.history_count, 2);
    assert_eq!(report.bookmark_count, 1);
    assert_eq!(report.checksum.len(), 64);

    let document: Value = serde_json::from_str(&fs::read_to_string(&backup).unwrap()).unwrap();
    assert_eq!(document["Version"], "1.0");
    assert!(document["ExportDate"].is_string());
    assert_eq!(document["History"].as_array().unwrap().len(), 2);

    let mut target = EntryStore::open(target_dir.path());
    let imported = import(&mut target, &backup).unwrap();
    assert_eq!(imported.total(), 3);
    assert_eq!(target.history(), source.history());
    assert_eq!(target.bookmarks(), source.bookmarks());

    // A second import of the same file adds nothing.
    assert_eq!(import(&mut target, &backup).unwrap().total(), 0);
    let mut reopened = EntryStore::open(target_dir.path());
    assert_eq!(reopened.history().len(), 2);
}

#[test]
fn test_import_merges_and_sorts_by_time() {
    let dir = tempdir().unwrap();
    let backup = dir.path().join("backup.json");
    let keys = KeySet::default();

    let mut older = EntryStore::open(dir.path().join("older"));
    run(&mut older, &keys, TransformRequest::new(Operation::Encrypt, "old")).unwrap();
    export(&mut older, &backup, true, false).unwrap();

    let mut newer = EntryStore::open(dir.path().join("newer"));
    run(&mut newer, &keys, TransformRequest::new(Operation::Encrypt, "new")).unwrap();
    import(&mut newer, &backup).unwrap();

    let inputs: Vec<_> = newer.history().iter().map(|e| e.input.clone()).collect();
    assert_eq!(inputs, vec!["new", "old"]);
}
