use crate::annotator::Annotator;
use crate::config::Settings;
use crate::decision::DecisionEngine;
use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::hasher;
use crate::model::{Decision, FileRecord, PlannedAction};
use crate::planner::{PathPlanner, TargetSet};
use crate::progress::ProgressReporter;
use crate::report::{ReportBuilder, ReportEntry, RunReport};
use crate::scanner;
use crate::storage::dataset::AnnotationMap;
use crate::storage::DatasetStorage;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Annotator error text keyed like `AnnotationMap`.
type AnnotationFailures = BTreeMap<String, String>;

/// Runs one batch: scan, annotate (or replay), decide, plan, execute, report.
pub struct Organizer {
    settings: Settings,
    decision: DecisionEngine,
    planner: PathPlanner,
    executor: Executor,
}

impl Organizer {
    /// Fails with `InvalidPolicy` before anything touches the filesystem.
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let decision = DecisionEngine::new(&settings.thresholds)?;
        let planner = PathPlanner::from_settings(&settings);
        let executor = Executor::new(settings.retry.clone());
        Ok(Self {
            settings,
            decision,
            planner,
            executor,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Full pipeline over `settings.source_dir`. With `replay`, annotations
    /// come from the configured dataset when it exists.
    pub fn run(
        &self,
        annotator: &dyn Annotator,
        replay: bool,
        reporter: &dyn ProgressReporter,
    ) -> Result<RunReport> {
        let builder = self.report_builder();
        self.check_roots()?;
        let source_root = &self.settings.source_dir;
        let output_root = &self.settings.output_dir;

        info!("Scanning {}...", source_root.display());
        reporter.on_scan_start();
        let scan_start = Instant::now();
        let mut records = scanner::scan(source_root, &self.settings.scan)?;
        let before = records.len();
        records.retain(|r| !source_root.join(&r.relative_path).starts_with(output_root));
        if records.len() != before {
            debug!("Ignored {} files already under the output root", before - records.len());
        }
        reporter.on_scan_complete(records.len(), scan_start.elapsed().as_secs_f64());

        let (annotations, failures) = self.annotations_for(&records, annotator, replay, reporter)?;
        Ok(self.plan_and_execute(builder, records, &annotations, &failures, reporter))
    }

    /// Runs decision, planning and execution over pre-built inputs.
    pub fn run_records(
        &self,
        records: Vec<FileRecord>,
        annotations: &AnnotationMap,
        reporter: &dyn ProgressReporter,
    ) -> Result<RunReport> {
        let builder = self.report_builder();
        self.check_roots()?;
        Ok(self.plan_and_execute(builder, records, annotations, &BTreeMap::new(), reporter))
    }

    /// Opened before any check so `started_at` marks the start of the run.
    fn report_builder(&self) -> ReportBuilder {
        ReportBuilder::new(
            self.settings.dry_run,
            &self.settings.source_dir,
            &self.settings.output_dir,
        )
    }

    fn annotations_for(
        &self,
        records: &[FileRecord],
        annotator: &dyn Annotator,
        replay: bool,
        reporter: &dyn ProgressReporter,
    ) -> Result<(AnnotationMap, AnnotationFailures)> {
        let dataset = self.settings.dataset_path.as_ref().map(DatasetStorage::new);

        if replay {
            match &dataset {
                Some(storage) if storage.exists() => {
                    reporter.on_annotate_start(records.len(), true);
                    let loaded = storage.load()?;
                    let relevant: AnnotationMap = records
                        .iter()
                        .filter_map(|r| loaded.get(&r.key()).map(|a| (r.key(), a.clone())))
                        .collect();
                    info!("Replaying {} stored annotations", relevant.len());
                    reporter.on_annotate_complete(relevant.len(), records.len() - relevant.len());
                    return Ok((relevant, AnnotationFailures::new()));
                }
                _ => warn!("No stored annotations to replay; annotating instead"),
            }
        }

        reporter.on_annotate_start(records.len(), false);
        let done = AtomicUsize::new(0);
        let annotated: Vec<(String, Result<_>)> = records
            .par_iter()
            .map(|record| {
                let result = annotator.annotate(record);
                if let Err(e) = &result {
                    warn!("Annotation failed for {}: {}", record.key(), e);
                }
                let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                reporter.on_annotate_progress(n, records.len());
                (record.key(), result)
            })
            .collect();

        let mut annotations = AnnotationMap::new();
        let mut failures = AnnotationFailures::new();
        for (key, result) in annotated {
            match result {
                Ok(annotation) => {
                    annotations.insert(key, annotation);
                }
                Err(e) => {
                    failures.insert(key, e.to_string());
                }
            }
        }
        info!(
            "Annotated {}/{} files",
            annotations.len(),
            records.len()
        );
        reporter.on_annotate_complete(annotations.len(), failures.len());

        if let Some(storage) = dataset {
            storage.save(&annotations)?;
        }
        Ok((annotations, failures))
    }

    fn plan_and_execute(
        &self,
        mut builder: ReportBuilder,
        mut records: Vec<FileRecord>,
        annotations: &AnnotationMap,
        failures: &AnnotationFailures,
        reporter: &dyn ProgressReporter,
    ) -> RunReport {
        // Collision suffixes depend on order; sorting keeps runs reproducible.
        records.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        let mut taken = TargetSet::new();
        let mut planned = Vec::with_capacity(records.len());
        for record in &records {
            let annotation = annotations.get(&record.key());
            let source = self.planner.source_path(record);
            let (decision, action) = match annotation {
                None => {
                    let reason = match failures.get(&record.key()) {
                        Some(e) => format!("annotation failed: {}", e),
                        None => "no annotation available".to_string(),
                    };
                    (None, PlannedAction::skip(source.clone(), source, reason))
                }
                Some(annotation) => match self.decision.decide(annotation.confidence) {
                    Ok(Decision::Approve) => {
                        let action = match with_checksum(record, &source) {
                            Ok(fingerprinted) => self.planner.plan(
                                &fingerprinted,
                                annotation,
                                Decision::Approve,
                                &mut taken,
                            ),
                            Err(e) => {
                                warn!("Cannot checksum {}: {}", record.key(), e);
                                PlannedAction::skip(
                                    source.clone(),
                                    source,
                                    format!("checksum failed: {}", e),
                                )
                            }
                        };
                        (Some(Decision::Approve), action)
                    }
                    Ok(decision) => (
                        Some(decision),
                        self.planner.plan(record, annotation, decision, &mut taken),
                    ),
                    Err(e) => (
                        None,
                        PlannedAction::skip(source.clone(), source, e.to_string()),
                    ),
                },
            };
            planned.push((decision, action));
        }

        let actions: Vec<PlannedAction> = planned.iter().map(|(_, a)| a.clone()).collect();
        let skipped = actions.iter().filter(|a| a.is_skip()).count();
        info!(
            "Planned {} operations, {} skipped",
            actions.len() - skipped,
            skipped
        );
        reporter.on_plan_complete(actions.len() - skipped, skipped);

        let results = self
            .executor
            .execute_with(&actions, self.settings.dry_run, reporter);

        for ((record, (decision, action)), result) in records.into_iter().zip(planned).zip(results) {
            let annotation = annotations.get(&record.key()).cloned();
            builder.push(ReportEntry {
                record,
                annotation,
                decision,
                action,
                result,
            });
        }

        let report = builder.finish();
        let counts = report.counts();
        info!(
            "Run complete: {} scanned, {} approved, {} review, {} skipped, {} applied, {} simulated, {} failed",
            counts.scanned,
            counts.approved,
            counts.reviewed,
            counts.skipped,
            counts.applied,
            counts.simulated,
            counts.failed,
        );
        report
    }

    fn check_roots(&self) -> Result<()> {
        let source = &self.settings.source_dir;
        if !source.is_dir() {
            return Err(Error::SourceRootMissing(source.clone()));
        }
        check_output_root(&self.settings.output_dir, self.settings.dry_run)
    }
}

/// Record as planned: scan-time checksum, or one computed now. A moved
/// target can only be recognised later by its content hash.
fn with_checksum(record: &FileRecord, source: &Path) -> std::io::Result<FileRecord> {
    let mut fingerprinted = record.clone();
    if fingerprinted.checksum.is_none() {
        fingerprinted.checksum = Some(hasher::checksum_file(source)?);
    }
    Ok(fingerprinted)
}

/// In dry-run nothing is created; the nearest existing ancestor must accept
/// a new file. In live mode the root is created and checked the same way.
fn check_output_root(root: &Path, dry_run: bool) -> Result<()> {
    let unwritable = |reason: String| Error::OutputRootUnwritable {
        path: root.to_path_buf(),
        reason,
    };

    let check_dir = if dry_run {
        let existing = root
            .ancestors()
            .find(|p| p.exists())
            .ok_or_else(|| unwritable("no existing ancestor".to_string()))?;
        if !existing.is_dir() {
            return Err(unwritable(format!("{} is not a directory", existing.display())));
        }
        existing
    } else {
        fs::create_dir_all(root).map_err(|e| unwritable(e.to_string()))?;
        root
    };

    // Anonymous file: removed by the OS on drop, nothing left in the tree.
    tempfile::tempfile_in(check_dir)
        .map_err(|e| unwritable(format!("cannot create files in {}: {}", check_dir.display(), e)))?;
    debug!("Output root {} is writable", root.display());
    Ok(())
}
