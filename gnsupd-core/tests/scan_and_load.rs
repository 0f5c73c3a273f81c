//! Directory scan and definition load against real files.

use assert_fs::prelude::*;
use gnsupd_core::{
    definition, scanner,
    types::SetName,
    LoadError,
};
use predicates::prelude::*;

fn names(list: &[&str]) -> Vec<SetName> {
    list.iter().map(|n| SetName::from(*n)).collect()
}

// ---------------------------------------------------------------------------
// 1. Scan
// ---------------------------------------------------------------------------

#[test]
fn scan_yields_only_json_stems() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    dir.child("b.json").write_str(r#"{"nets":[]}"#).expect("write");
    dir.child("a.json").write_str(r#"{"nets":[]}"#).expect("write");
    dir.child("ignore.txt").write_str("not a set").expect("write");

    let found = scanner::scan_dir(dir.path()).expect("scan");
    assert_eq!(found, names(&["a", "b"]));
}

#[test]
fn scan_does_not_recurse() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    dir.child("top.json").write_str("{}").expect("write");
    dir.child("sub/deep.json").write_str("{}").expect("write");

    let found = scanner::scan_dir(dir.path()).expect("scan");
    assert_eq!(found, names(&["top"]));
}

#[test]
fn scan_empty_directory_is_empty() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    assert!(scanner::scan_dir(dir.path()).expect("scan").is_empty());
}

#[test]
fn scan_error_names_directory() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let missing = dir.child("does-not-exist");
    let err = scanner::scan_dir(missing.path()).unwrap_err();
    assert!(predicate::str::contains("does-not-exist").eval(&err.to_string()));
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

#[test]
fn load_single_range() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("office.json");
    file.write_str(r#"{"nets":["10.0.0.0/24"]}"#).expect("write");

    let def = definition::load_definition(file.path(), SetName::from("office"), None)
        .expect("load");
    assert_eq!(def.name, SetName::from("office"));
    assert_eq!(def.networks, vec!["10.0.0.0/24"]);
    assert_eq!(def.extra_label, None);
}

#[test]
fn load_empty_object_is_empty_set() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("empty.json");
    file.write_str("{}").expect("write");

    let nets = definition::load_networks(file.path()).expect("load");
    assert!(nets.is_empty());
}

#[test]
fn load_preserves_order_and_duplicates() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("order.json");
    file.write_str(r#"{"nets":["192.168.7.0/24","10.0.0.0/8","192.168.7.0/24"]}"#)
        .expect("write");

    let nets = definition::load_networks(file.path()).expect("load");
    assert_eq!(nets, vec!["192.168.7.0/24", "10.0.0.0/8", "192.168.7.0/24"]);
}

#[test]
fn load_missing_file_is_read_error() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let err = definition::load_networks(&dir.path().join("gone.json")).unwrap_err();
    assert!(matches!(err, LoadError::Read { .. }), "got: {err}");
    assert!(err.path().ends_with("gone.json"));
}

#[test]
fn load_invalid_utf8_is_read_error() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("binary.json");
    file.write_binary(&[0xff, 0xfe, 0x00]).expect("write");

    let err = definition::load_networks(file.path()).unwrap_err();
    assert!(matches!(err, LoadError::Read { .. }), "got: {err}");
}

#[test]
fn load_malformed_json_is_parse_error_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("broken.json");
    file.write_str(r#"{"nets": ["10.0.0.0/24",}"#).expect("write");

    let err = definition::load_networks(file.path()).unwrap_err();
    assert!(matches!(err, LoadError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("broken.json"));
}
