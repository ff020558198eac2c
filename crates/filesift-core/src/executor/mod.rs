pub mod fs_ops;
pub mod retry;

use crate::config::RetrySettings;
use crate::error::{Error, Result};
use crate::hasher;
use crate::model::{ActionKind, ExecutionResult, ExecutionStatus, PlannedAction};
use crate::progress::{ProgressReporter, SilentReporter};
use fs_ops::MoveMethod;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

const ALREADY_SATISFIED: &str = "already satisfied";

/// State of an action's source and target just before it is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preflight {
    Ready,
    AlreadySatisfied,
    Collision,
    SourceMissing,
}

/// Applies planned actions one at a time. A failure is recorded on its own
/// action and never stops the batch.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    retry: RetrySettings,
}

impl Executor {
    pub fn new(retry: RetrySettings) -> Self {
        Self { retry }
    }

    pub fn execute(&self, actions: &[PlannedAction], dry_run: bool) -> Vec<ExecutionResult> {
        self.execute_with(actions, dry_run, &SilentReporter)
    }

    /// One result per action, in input order.
    pub fn execute_with(
        &self,
        actions: &[PlannedAction],
        dry_run: bool,
        reporter: &dyn ProgressReporter,
    ) -> Vec<ExecutionResult> {
        if dry_run {
            info!("Dry-run: no files will be modified");
        }
        reporter.on_execute_start(actions.len(), dry_run);

        let mut results = Vec::with_capacity(actions.len());
        for (i, action) in actions.iter().enumerate() {
            let result = self.execute_one(action, dry_run);
            if result.is_failed() {
                warn!(
                    "Failed {} -> {}: {}",
                    action.source.display(),
                    action.target.display(),
                    result.detail.as_deref().unwrap_or("unknown error")
                );
            }
            results.push(result);
            reporter.on_execute_progress(i + 1, actions.len());
        }

        let failed = results.iter().filter(|r| r.is_failed()).count();
        info!(
            "Executed {} actions: {} succeeded, {} failed",
            results.len(),
            results.len() - failed,
            failed
        );
        reporter.on_execute_complete(results.len(), failed);
        results
    }

    pub fn execute_one(&self, action: &PlannedAction, dry_run: bool) -> ExecutionResult {
        if action.is_skip() {
            debug!("SKIP {}: {}", action.source.display(), action.reason);
            return ExecutionResult::new(
                action,
                ExecutionStatus::Skipped,
                Some(action.reason.clone()),
            );
        }

        let state = match preflight(action) {
            Ok(state) => state,
            Err(e) => return ExecutionResult::failed(action, &e),
        };

        match state {
            Preflight::SourceMissing => {
                ExecutionResult::failed(action, &Error::SourceMissing(action.source.clone()))
            }
            Preflight::Collision => {
                ExecutionResult::failed(action, &Error::TargetCollision(action.target.clone()))
            }
            Preflight::AlreadySatisfied => {
                let status = if dry_run {
                    ExecutionStatus::Simulated
                } else {
                    ExecutionStatus::Applied
                };
                ExecutionResult::new(action, status, Some(ALREADY_SATISFIED.to_string()))
            }
            Preflight::Ready if dry_run => {
                debug!(
                    "DRY-RUN {:?} {} -> {}",
                    action.kind,
                    action.source.display(),
                    action.target.display()
                );
                ExecutionResult::new(action, ExecutionStatus::Simulated, None)
            }
            Preflight::Ready => match self.apply(action) {
                Ok(detail) => {
                    info!(
                        "{} {} -> {}",
                        detail,
                        action.source.display(),
                        action.target.display()
                    );
                    ExecutionResult::new(action, ExecutionStatus::Applied, Some(detail.to_string()))
                }
                Err(e) => ExecutionResult::failed(action, &e),
            },
        }
    }

    fn apply(&self, action: &PlannedAction) -> Result<&'static str> {
        fs_ops::ensure_parent(&action.target, &self.retry)?;

        // Re-check right before writing: the target may have appeared since preflight.
        if fs::symlink_metadata(&action.target).is_ok() {
            return Err(Error::TargetCollision(action.target.clone()));
        }

        match action.kind {
            ActionKind::Move => {
                match fs_ops::move_file(&action.source, &action.target, &self.retry)? {
                    MoveMethod::Renamed => Ok("moved"),
                    MoveMethod::CopiedAcrossVolumes => Ok("moved across volumes"),
                }
            }
            ActionKind::Copy => {
                fs_ops::copy_verified(&action.source, &action.target, &self.retry)?;
                Ok("copied")
            }
            ActionKind::Skip => Ok("skipped"),
        }
    }
}

/// Inspects source and target without touching either.
pub fn preflight(action: &PlannedAction) -> Result<Preflight> {
    let source_exists = action.source.is_file();
    let target_meta = match fs::symlink_metadata(&action.target) {
        Ok(meta) => Some(meta),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };

    let Some(target_meta) = target_meta else {
        return Ok(if source_exists {
            Preflight::Ready
        } else {
            Preflight::SourceMissing
        });
    };

    if !target_meta.is_file() {
        return Ok(Preflight::Collision);
    }

    if source_exists {
        return Ok(if hasher::files_identical(&action.source, &action.target)? {
            Preflight::AlreadySatisfied
        } else {
            Preflight::Collision
        });
    }

    match action.kind {
        ActionKind::Move if matches_fingerprint(action, &action.target)? => {
            Ok(Preflight::AlreadySatisfied)
        }
        ActionKind::Move => Ok(Preflight::Collision),
        _ => Ok(Preflight::SourceMissing),
    }
}

/// Whether `target` holds exactly the bytes the source had when planned.
/// Size alone proves nothing, so a fingerprint without a checksum never matches.
fn matches_fingerprint(action: &PlannedAction, target: &Path) -> Result<bool> {
    let Some(fingerprint) = &action.fingerprint else {
        return Ok(false);
    };
    let Some(expected) = &fingerprint.checksum else {
        return Ok(false);
    };
    if fs::metadata(target)?.len() != fingerprint.size {
        return Ok(false);
    }
    Ok(&hasher::checksum_file(target)? == expected)
}
