use filesift_core::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif progress bars.
///
/// - Scan phase: spinner (total unknown upfront)
/// - Annotate and execute phases: bar sized from the previous stage
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.slot();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn finish_bar(&self) {
        if let Some(pb) = self.slot().take() {
            pb.finish_and_clear();
        }
    }

    fn spinner(message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_chars(TICK_CHARS));
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    fn bar(label: &str, total: usize) -> ProgressBar {
        let pb = ProgressBar::new(total as u64);
        let template = format!(
            "  {{spinner:.cyan}} {} [{{bar:30.cyan/dim}}] {{pos}}/{{len}} ({{eta}} remaining)",
            label
        );
        if let Ok(style) = ProgressStyle::with_template(&template) {
            pb.set_style(style.progress_chars("━╸─").tick_chars(TICK_CHARS));
        }
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    fn set_position(&self, done: usize) {
        if let Some(pb) = self.slot().as_ref() {
            pb.set_position(done as u64);
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_scan_start(&self) {
        self.set_bar(Self::spinner("Scanning files..."));
    }

    fn on_scan_complete(&self, total_files: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Scan complete: {} files in {:.2}s",
            total_files, duration_secs
        );
    }

    fn on_annotate_start(&self, total_files: usize, replayed: bool) {
        if replayed {
            self.set_bar(Self::spinner("Loading stored annotations..."));
        } else {
            self.set_bar(Self::bar("Annotating", total_files));
        }
    }

    fn on_annotate_progress(&self, annotated: usize, _total_files: usize) {
        self.set_position(annotated);
    }

    fn on_annotate_complete(&self, annotated: usize, failed: usize) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Annotated {} files ({} without annotation)",
            annotated, failed
        );
    }

    fn on_plan_complete(&self, planned: usize, skipped: usize) {
        eprintln!(
            "  \x1b[32m✓\x1b[0m Planned {} operations, {} left in place",
            planned, skipped
        );
    }

    fn on_execute_start(&self, total_actions: usize, dry_run: bool) {
        let label = if dry_run { "Simulating" } else { "Applying" };
        self.set_bar(Self::bar(label, total_actions));
    }

    fn on_execute_progress(&self, done: usize, _total_actions: usize) {
        self.set_position(done);
    }

    fn on_execute_complete(&self, total_actions: usize, failed: usize) {
        self.finish_bar();
        if failed == 0 {
            eprintln!("  \x1b[32m✓\x1b[0m Executed {} actions", total_actions);
        } else {
            eprintln!(
                "  \x1b[31m✗\x1b[0m Executed {} actions, {} failed",
                total_actions, failed
            );
        }
    }
}
