/// Trait for reporting run progress.
///
/// The CLI implements it with indicatif bars. All methods have default
/// no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_scan_start(&self) {}
    fn on_scan_complete(&self, _total_files: usize, _duration_secs: f64) {}
    fn on_annotate_start(&self, _total_files: usize, _replayed: bool) {}
    fn on_annotate_progress(&self, _annotated: usize, _total_files: usize) {}
    fn on_annotate_complete(&self, _annotated: usize, _failed: usize) {}
    fn on_plan_complete(&self, _planned: usize, _skipped: usize) {}
    fn on_execute_start(&self, _total_actions: usize, _dry_run: bool) {}
    fn on_execute_progress(&self, _done: usize, _total_actions: usize) {}
    fn on_execute_complete(&self, _total_actions: usize, _failed: usize) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
