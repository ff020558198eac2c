use std::fs;
use tempfile::tempdir;

use filesift_core::storage::dataset::AnnotationMap;
use filesift_core::storage::DatasetStorage;
use filesift_core::{Category, Error, SemanticAnnotation};

fn sample() -> AnnotationMap {
    let mut episode = SemanticAnnotation::new(Category::Video, 0.92);
    episode.series = Some("Planet".to_string());
    episode.episode = Some(3);
    episode.tags = vec!["nature".to_string()];

    let mut map = AnnotationMap::new();
    map.insert("tv/p3.mkv".to_string(), episode);
    map.insert("notes.txt".to_string(), SemanticAnnotation::new(Category::Document, 0.81));
    map
}

#[test]
fn test_save_then_load() {
    let dir = tempdir().unwrap();
    let storage = DatasetStorage::new(dir.path().join("nested/annotations.json"));
    assert!(!storage.exists());

    storage.save(&sample()).unwrap();
    assert!(storage.exists());

    let loaded = storage.load().unwrap();
    assert_eq!(loaded.len(), 2);
    let episode = &loaded["tv/p3.mkv"];
    assert_eq!(episode.category, Category::Video);
    assert_eq!(episode.series.as_deref(), Some("Planet"));
    assert_eq!(episode.episode, Some(3));
    assert_eq!(loaded["notes.txt"].confidence, 0.81);
}

#[test]
fn test_document_layout() {
    let dir = tempdir().unwrap();
    let storage = DatasetStorage::new(dir.path().join("annotations.json"));
    storage.save(&sample()).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(storage.path()).unwrap()).unwrap();
    assert_eq!(raw["version"], "1.0");
    assert_eq!(raw["count"], 2);
    assert_eq!(raw["annotations"]["tv/p3.mkv"]["category"], "video");
}

#[test]
fn test_save_replaces_previous_dataset() {
    let dir = tempdir().unwrap();
    let storage = DatasetStorage::new(dir.path().join("annotations.json"));
    storage.save(&sample()).unwrap();
    storage.save(&AnnotationMap::new()).unwrap();

    assert!(storage.load().unwrap().is_empty());
    // No temp files left next to the dataset.
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_load_corrupt_dataset() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("annotations.json");
    fs::write(&path, "{ not json").unwrap();

    let err = DatasetStorage::new(&path).load().unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn test_load_missing_dataset() {
    let dir = tempdir().unwrap();
    let err = DatasetStorage::new(dir.path().join("nope.json")).load().unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
