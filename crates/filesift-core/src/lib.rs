pub mod annotator;
pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod executor;
pub mod hasher;
pub mod model;
pub mod planner;
pub mod platform;
pub mod progress;
pub mod report;
pub mod scanner;
pub mod storage;

pub use annotator::{Annotator, ExtensionAnnotator};
pub use config::Settings;
pub use decision::DecisionEngine;
pub use engine::Organizer;
pub use error::{Error, Result};
pub use executor::Executor;
pub use model::{
    ActionKind, Category, Decision, ExecutionResult, ExecutionStatus, FileRecord, Operation,
    PlannedAction, SemanticAnnotation,
};
pub use planner::PathPlanner;
pub use progress::{ProgressReporter, SilentReporter};
pub use report::{ReportEntry, RunCounts, RunReport};
