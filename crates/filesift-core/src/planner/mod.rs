pub mod naming;
pub mod safety;

use crate::config::{PathPolicy, Settings};
use crate::error::{Error, Result};
use crate::model::{ActionKind, Decision, FileRecord, Operation, PlannedAction, SemanticAnnotation};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Targets already handed out during the current run.
pub type TargetSet = HashSet<PathBuf>;

const MAX_COLLISION_SUFFIX: u32 = 100_000;

/// Computes a unique, deterministic target path for each approved record.
#[derive(Debug, Clone)]
pub struct PathPlanner {
    policy: PathPolicy,
    source_root: PathBuf,
    output_root: PathBuf,
    operation: Operation,
}

impl PathPlanner {
    pub fn new(
        policy: PathPolicy,
        source_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        operation: Operation,
    ) -> Self {
        Self {
            policy,
            source_root: source_root.into(),
            output_root: output_root.into(),
            operation,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.paths.clone(),
            settings.source_dir.clone(),
            settings.output_dir.clone(),
            settings.operation,
        )
    }

    pub fn source_path(&self, record: &FileRecord) -> PathBuf {
        self.source_root.join(&record.relative_path)
    }

    /// Target before collision resolution.
    pub fn base_target(&self, record: &FileRecord, annotation: &SemanticAnnotation) -> Result<PathBuf> {
        let category_dir = self.policy.dir_for(annotation.category)?;
        if category_dir.trim().is_empty() {
            return Err(Error::UnsafePath(format!(
                "empty directory mapping for category '{}'",
                annotation.category
            )));
        }

        let mut target = self.output_root.clone();
        target.push(safety::relative_dir(Path::new(category_dir), "category directory")?);

        if self.policy.preserve_structure {
            target.push(safety::relative_dir(record.parent_dir(), "source directory")?);
        }

        if self.policy.nest_subcategory {
            for level in annotation.hierarchy() {
                safety::file_component(level, "annotation directory")?;
                target.push(level);
            }
        }

        target.push(naming::target_file_name(
            record,
            annotation,
            self.policy.allow_rename,
        )?);

        safety::ensure_within(&self.output_root, &target)?;
        Ok(target)
    }

    /// First candidate free both on disk and in `taken`, appending ` (n)` as needed.
    pub fn resolve_collision(&self, base: &Path, taken: &TargetSet) -> Result<PathBuf> {
        if is_free(base, taken) {
            return Ok(base.to_path_buf());
        }

        let file_name = base
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::UnsafePath(format!("no file name in '{}'", base.display())))?;

        for n in 1..=MAX_COLLISION_SUFFIX {
            let candidate = base.with_file_name(naming::with_suffix(&file_name, n));
            if is_free(&candidate, taken) {
                return Ok(candidate);
            }
        }
        Err(Error::TargetCollision(base.to_path_buf()))
    }

    /// Produces exactly one action for a record. Errors never escape: a
    /// record that cannot be planned becomes a SKIP carrying the reason.
    pub fn plan(
        &self,
        record: &FileRecord,
        annotation: &SemanticAnnotation,
        decision: Decision,
        taken: &mut TargetSet,
    ) -> PlannedAction {
        let source = self.source_path(record);

        match decision {
            Decision::Approve => {}
            Decision::Review => {
                let reason = format!("needs review: confidence {:.2}", annotation.confidence);
                return PlannedAction::skip(source.clone(), source, reason);
            }
            Decision::Skip => {
                let reason = format!("low confidence {:.2}", annotation.confidence);
                return PlannedAction::skip(source.clone(), source, reason);
            }
        }

        match self.plan_approved(record, annotation, &source, taken) {
            Ok(action) => {
                debug!(
                    "Planned {:?} {} -> {}",
                    action.kind,
                    action.source.display(),
                    action.target.display()
                );
                action
            }
            Err(e) => {
                warn!("Cannot plan {}: {}", record.key(), e);
                PlannedAction::skip(source.clone(), source, format!("planning failed: {}", e))
            }
        }
    }

    fn plan_approved(
        &self,
        record: &FileRecord,
        annotation: &SemanticAnnotation,
        source: &Path,
        taken: &mut TargetSet,
    ) -> Result<PlannedAction> {
        let base = self.base_target(record, annotation)?;
        if base == source {
            return Ok(PlannedAction::skip(
                source.to_path_buf(),
                base,
                "already in place",
            ));
        }

        let target = self.resolve_collision(&base, taken)?;
        taken.insert(target.clone());

        let kind = ActionKind::from(self.operation);
        let destination = target
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        Ok(PlannedAction {
            source: source.to_path_buf(),
            target,
            kind,
            reason: format!("organize {} file into {}", annotation.category, destination),
            fingerprint: Some(record.fingerprint()),
        })
    }
}

fn is_free(candidate: &Path, taken: &TargetSet) -> bool {
    !taken.contains(candidate) && fs::symlink_metadata(candidate).is_err()
}
