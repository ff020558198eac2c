use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

use filesift_core::config::PathPolicy;
use filesift_core::planner::TargetSet;
use filesift_core::{
    ActionKind, Category, Decision, Error, FileRecord, Operation, PathPlanner, SemanticAnnotation,
};

fn record(relative: &str) -> FileRecord {
    let relative_path = PathBuf::from(relative);
    FileRecord {
        file_name: relative_path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned(),
        relative_path,
        size: 10,
        modified: None,
        checksum: None,
    }
}

fn doc(confidence: f64) -> SemanticAnnotation {
    SemanticAnnotation::new(Category::Document, confidence)
}

fn planner(policy: PathPolicy, output: &Path) -> PathPlanner {
    PathPlanner::new(policy, "/src", output, Operation::Move)
}

#[test]
fn test_same_name_from_different_dirs_gets_suffix() {
    let out = tempdir().unwrap();
    let output = out.path().join("output");
    let planner = planner(PathPolicy::default(), &output);
    let mut taken = TargetSet::new();

    let first = planner.plan(&record("inbox/report.pdf"), &doc(0.95), Decision::Approve, &mut taken);
    let second = planner.plan(&record("archive/2023/report.pdf"), &doc(0.95), Decision::Approve, &mut taken);

    assert_eq!(first.kind, ActionKind::Move);
    assert_eq!(first.target, output.join("documents/report.pdf"));
    assert_eq!(second.target, output.join("documents/report (1).pdf"));
}

#[test]
fn test_existing_file_on_disk_is_avoided() {
    let out = tempdir().unwrap();
    let output = out.path().to_path_buf();
    fs::create_dir_all(output.join("documents")).unwrap();
    fs::write(output.join("documents/report.pdf"), "old").unwrap();
    fs::write(output.join("documents/report (1).pdf"), "older").unwrap();

    let planner = planner(PathPolicy::default(), &output);
    let mut taken = TargetSet::new();
    let action = planner.plan(&record("report.pdf"), &doc(0.95), Decision::Approve, &mut taken);

    assert_eq!(action.target, output.join("documents/report (2).pdf"));
    assert!(taken.contains(&action.target));
}

#[test]
fn test_targets_unique_across_many_duplicates() {
    let out = tempdir().unwrap();
    let planner = planner(PathPolicy::default(), out.path());
    let mut taken = TargetSet::new();

    let mut seen = HashSet::new();
    for i in 0..25 {
        let action = planner.plan(
            &record(&format!("dir{}/notes.txt", i)),
            &doc(0.99),
            Decision::Approve,
            &mut taken,
        );
        assert_ne!(action.kind, ActionKind::Skip);
        assert!(seen.insert(action.target.clone()), "duplicate {:?}", action.target);
    }
}

#[test]
fn test_planning_is_deterministic() {
    let out = tempdir().unwrap();
    let planner = planner(PathPolicy::default(), out.path());
    let inputs = ["a/x.pdf", "b/x.pdf", "c/y.pdf"];

    let run = || {
        let mut taken = TargetSet::new();
        inputs
            .iter()
            .map(|p| planner.plan(&record(p), &doc(0.95), Decision::Approve, &mut taken).target)
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_preserve_structure_keeps_source_dirs() {
    let out = tempdir().unwrap();
    let policy = PathPolicy {
        preserve_structure: true,
        ..PathPolicy::default()
    };
    let planner = planner(policy, out.path());
    let mut taken = TargetSet::new();

    let action = planner.plan(&record("work/2024/q1.pdf"), &doc(0.95), Decision::Approve, &mut taken);
    assert_eq!(action.target, out.path().join("documents/work/2024/q1.pdf"));
}

#[test]
fn test_subcategory_nesting_and_rename() {
    let out = tempdir().unwrap();
    let policy = PathPolicy {
        allow_rename: true,
        ..PathPolicy::default()
    };
    let planner = planner(policy, out.path());
    let mut taken = TargetSet::new();

    let mut annotation = SemanticAnnotation::new(Category::Video, 0.97);
    annotation.subcategory = Some("Documentaries".to_string());
    annotation.series = Some("Planet".to_string());
    annotation.episode = Some(1);

    let action = planner.plan(&record("dl/p1.mkv"), &annotation, Decision::Approve, &mut taken);
    assert_eq!(
        action.target,
        out.path().join("videos/Documentaries/Planet/Planet - E01.mkv")
    );
}

#[test]
fn test_review_and_skip_produce_skip_actions() {
    let out = tempdir().unwrap();
    let planner = planner(PathPolicy::default(), out.path());
    let mut taken = TargetSet::new();

    let review = planner.plan(&record("a.pdf"), &doc(0.8), Decision::Review, &mut taken);
    let skip = planner.plan(&record("b.pdf"), &doc(0.5), Decision::Skip, &mut taken);

    assert_eq!(review.kind, ActionKind::Skip);
    assert_eq!(skip.kind, ActionKind::Skip);
    assert_eq!(skip.source, PathBuf::from("/src/b.pdf"));
    assert!(taken.is_empty());
}

#[test]
fn test_mapping_escaping_root_is_unsafe() {
    let out = tempdir().unwrap();
    let mut dirs = BTreeMap::new();
    dirs.insert("document".to_string(), "../../etc".to_string());
    let policy = PathPolicy {
        category_dirs: dirs,
        ..PathPolicy::default()
    };
    let planner = planner(policy, out.path());

    let err = planner.base_target(&record("passwd.txt"), &doc(0.99)).unwrap_err();
    assert!(matches!(err, Error::UnsafePath(_)));

    let mut taken = TargetSet::new();
    let action = planner.plan(&record("passwd.txt"), &doc(0.99), Decision::Approve, &mut taken);
    assert_eq!(action.kind, ActionKind::Skip);
    assert!(action.reason.contains("unsafe path"));
    assert!(taken.is_empty());
}

#[test]
fn test_unmapped_category_without_default() {
    let out = tempdir().unwrap();
    let policy = PathPolicy {
        category_dirs: BTreeMap::new(),
        default_dir: None,
        ..PathPolicy::default()
    };
    let planner = planner(policy, out.path());

    let err = planner.base_target(&record("a.pdf"), &doc(0.99)).unwrap_err();
    assert!(matches!(err, Error::UnknownCategory(_)));
}

#[test]
fn test_already_in_place_is_skipped() {
    let root = tempdir().unwrap();
    fs::create_dir_all(root.path().join("documents")).unwrap();
    fs::write(root.path().join("documents/a.pdf"), "x").unwrap();

    let planner = PathPlanner::new(PathPolicy::default(), root.path(), root.path(), Operation::Move);
    let mut taken = TargetSet::new();
    let action = planner.plan(&record("documents/a.pdf"), &doc(0.99), Decision::Approve, &mut taken);

    assert_eq!(action.kind, ActionKind::Skip);
    assert_eq!(action.reason, "already in place");
}
