use crate::error::Result;
use crate::model::{
    ActionKind, Decision, ExecutionResult, ExecutionStatus, FileRecord, PlannedAction,
    SemanticAnnotation,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything that happened to one scanned file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    pub record: FileRecord,
    pub annotation: Option<SemanticAnnotation>,
    /// `None` when no valid decision could be made (missing annotation or
    /// out-of-range confidence); the action's reason says why.
    pub decision: Option<Decision>,
    pub action: PlannedAction,
    pub result: ExecutionResult,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    pub scanned: usize,
    pub approved: usize,
    pub reviewed: usize,
    pub skipped: usize,
    pub invalid: usize,
    pub planned_moves: usize,
    pub planned_copies: usize,
    pub applied: usize,
    pub simulated: usize,
    pub skipped_actions: usize,
    pub failed: usize,
}

impl RunCounts {
    fn tally(entries: &[ReportEntry]) -> Self {
        let mut counts = RunCounts {
            scanned: entries.len(),
            ..RunCounts::default()
        };
        for entry in entries {
            match entry.decision {
                Some(Decision::Approve) => counts.approved += 1,
                Some(Decision::Review) => counts.reviewed += 1,
                Some(Decision::Skip) => counts.skipped += 1,
                None => counts.invalid += 1,
            }
            match entry.action.kind {
                ActionKind::Move => counts.planned_moves += 1,
                ActionKind::Copy => counts.planned_copies += 1,
                ActionKind::Skip => {}
            }
            match entry.result.status {
                ExecutionStatus::Applied => counts.applied += 1,
                ExecutionStatus::Simulated => counts.simulated += 1,
                ExecutionStatus::Skipped => counts.skipped_actions += 1,
                ExecutionStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }
}

/// Finalized audit record of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    dry_run: bool,
    source_root: PathBuf,
    output_root: PathBuf,
    counts: RunCounts,
    entries: Vec<ReportEntry>,
}

impl RunReport {
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn counts(&self) -> &RunCounts {
        &self.counts
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn failures(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|e| e.result.is_failed())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes `report_<YYYYmmdd_HHMMSS>.json` into `dir`, creating it if needed.
    pub fn write_json(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let file_name = format!("report_{}.json", self.started_at.format("%Y%m%d_%H%M%S"));
        let path = dir.join(file_name);

        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;

        info!("Report written to {}", path.display());
        Ok(path)
    }
}

/// Collects entries for a single run. Owned by the orchestrator and
/// consumed by `finish`.
#[derive(Debug)]
pub struct ReportBuilder {
    started_at: DateTime<Utc>,
    dry_run: bool,
    source_root: PathBuf,
    output_root: PathBuf,
    entries: Vec<ReportEntry>,
}

impl ReportBuilder {
    pub fn new(dry_run: bool, source_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            started_at: Utc::now(),
            dry_run,
            source_root: source_root.into(),
            output_root: output_root.into(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn finish(self) -> RunReport {
        let counts = RunCounts::tally(&self.entries);
        RunReport {
            started_at: self.started_at,
            finished_at: Utc::now(),
            dry_run: self.dry_run,
            source_root: self.source_root,
            output_root: self.output_root,
            counts,
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, SourceFingerprint};

    fn entry(name: &str, decision: Option<Decision>, kind: ActionKind, status: ExecutionStatus) -> ReportEntry {
        let record = FileRecord {
            relative_path: PathBuf::from(name),
            file_name: name.to_string(),
            size: 3,
            modified: None,
            checksum: None,
        };
        let action = PlannedAction {
            source: PathBuf::from("/src").join(name),
            target: PathBuf::from("/out/documents").join(name),
            kind,
            reason: "test".to_string(),
            fingerprint: Some(SourceFingerprint { size: 3, checksum: None }),
        };
        let result = ExecutionResult::new(&action, status, None);
        ReportEntry {
            record,
            annotation: Some(SemanticAnnotation::new(Category::Document, 0.9)),
            decision,
            action,
            result,
        }
    }

    #[test]
    fn test_counts_tally_every_stage() {
        let mut builder = ReportBuilder::new(false, "/src", "/out");
        builder.push(entry("a.pdf", Some(Decision::Approve), ActionKind::Move, ExecutionStatus::Applied));
        builder.push(entry("b.pdf", Some(Decision::Approve), ActionKind::Copy, ExecutionStatus::Failed));
        builder.push(entry("c.pdf", Some(Decision::Review), ActionKind::Skip, ExecutionStatus::Skipped));
        builder.push(entry("d.pdf", None, ActionKind::Skip, ExecutionStatus::Skipped));
        let report = builder.finish();

        let counts = report.counts();
        assert_eq!(counts.scanned, 4);
        assert_eq!(counts.approved, 2);
        assert_eq!(counts.reviewed, 1);
        assert_eq!(counts.invalid, 1);
        assert_eq!(counts.planned_moves, 1);
        assert_eq!(counts.planned_copies, 1);
        assert_eq!(counts.applied, 1);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.skipped_actions, 2);
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_write_json_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = ReportBuilder::new(true, "/src", "/out");
        builder.push(entry("a.pdf", Some(Decision::Approve), ActionKind::Move, ExecutionStatus::Simulated));
        let report = builder.finish();

        let path = report.write_json(dir.path()).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("report_") && name.ends_with(".json"));

        let loaded: RunReport = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(loaded.dry_run());
        assert_eq!(loaded.counts().simulated, 1);
        assert_eq!(loaded.entries()[0].action.target, PathBuf::from("/out/documents/a.pdf"));
    }
}
