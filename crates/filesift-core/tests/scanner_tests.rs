use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

use filesift_core::config::ScanSettings;
use filesift_core::scanner::scan;
use filesift_core::Error;

/// Layout:
///   root/
///     top.txt
///     .git/config
///     node_modules/pkg/index.js
///     music/album/01.mp3
///     music/cover.jpg
fn create_test_tree(root: &Path) {
    fs::create_dir_all(root.join(".git")).unwrap();
    fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
    fs::create_dir_all(root.join("music/album")).unwrap();
    fs::write(root.join("top.txt"), "top").unwrap();
    fs::write(root.join(".git/config"), "[core]").unwrap();
    fs::write(root.join("node_modules/pkg/index.js"), "js").unwrap();
    fs::write(root.join("music/album/01.mp3"), "track one").unwrap();
    fs::write(root.join("music/cover.jpg"), "jpg").unwrap();
}

fn relative_paths(root: &Path, settings: &ScanSettings) -> Vec<PathBuf> {
    scan(root, settings)
        .unwrap()
        .into_iter()
        .map(|r| r.relative_path)
        .collect()
}

#[test]
fn test_scan_applies_default_excludes() {
    let dir = tempdir().unwrap();
    create_test_tree(dir.path());

    let paths = relative_paths(dir.path(), &ScanSettings::default());
    assert_eq!(
        paths,
        vec![
            PathBuf::from("music/album/01.mp3"),
            PathBuf::from("music/cover.jpg"),
            PathBuf::from("top.txt"),
        ]
    );
}

#[test]
fn test_scan_non_recursive() {
    let dir = tempdir().unwrap();
    create_test_tree(dir.path());

    let settings = ScanSettings {
        recursive: false,
        ..ScanSettings::default()
    };
    assert_eq!(relative_paths(dir.path(), &settings), vec![PathBuf::from("top.txt")]);
}

#[test]
fn test_scan_without_excludes_sees_everything() {
    let dir = tempdir().unwrap();
    create_test_tree(dir.path());

    let settings = ScanSettings {
        exclude_patterns: Vec::new(),
        ..ScanSettings::default()
    };
    assert_eq!(relative_paths(dir.path(), &settings).len(), 5);
}

#[test]
fn test_scan_records_metadata_and_checksum() {
    let dir = tempdir().unwrap();
    create_test_tree(dir.path());

    let settings = ScanSettings {
        checksum: true,
        ..ScanSettings::default()
    };
    let records = scan(dir.path(), &settings).unwrap();
    let track = records
        .iter()
        .find(|r| r.file_name == "01.mp3")
        .unwrap();

    assert_eq!(track.size, 9);
    assert_eq!(track.key(), "music/album/01.mp3");
    assert!(track.modified.is_some());
    assert_eq!(
        track.checksum.as_deref(),
        Some(blake3::hash(b"track one").to_hex().as_str())
    );
}

#[test]
fn test_scan_is_read_only() {
    let dir = tempdir().unwrap();
    create_test_tree(dir.path());
    let before = fs::read_to_string(dir.path().join("top.txt")).unwrap();

    scan(dir.path(), &ScanSettings::default()).unwrap();
    scan(dir.path(), &ScanSettings::default()).unwrap();

    assert_eq!(fs::read_to_string(dir.path().join("top.txt")).unwrap(), before);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 4);
}

#[test]
fn test_scan_missing_root() {
    let dir = tempdir().unwrap();
    let err = scan(&dir.path().join("missing"), &ScanSettings::default()).unwrap_err();
    assert!(matches!(err, Error::SourceRootMissing(_)));
}

#[test]
fn test_scan_empty_root() {
    let dir = tempdir().unwrap();
    assert!(scan(dir.path(), &ScanSettings::default()).unwrap().is_empty());
}

#[test]
fn test_export_json_inventory() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    create_test_tree(&root);
    let settings = ScanSettings {
        checksum: true,
        ..ScanSettings::default()
    };
    let records = scan(&root, &settings).unwrap();

    let path = filesift_core::scanner::export_json(&records, &dir.path().join("exports")).unwrap();
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("files_") && name.ends_with(".json"));

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let items = raw.as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["path"], "music/album");
    assert_eq!(items[0]["filename"], "01.mp3");
    assert_eq!(items[0]["complete_path"], "music/album/01.mp3");
    assert_eq!(items[0]["size"], 9);
    assert_eq!(items[2]["path"], "");
    assert_eq!(items[2]["checksum"].as_str().unwrap().len(), 64);
}
