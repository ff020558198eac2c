use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Immutable snapshot of one scanned file. Identity is `relative_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub relative_path: PathBuf,
    pub file_name: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    pub checksum: Option<String>,
}

impl FileRecord {
    /// Directory part of the relative path, empty for files at the root.
    pub fn parent_dir(&self) -> &Path {
        self.relative_path.parent().unwrap_or_else(|| Path::new(""))
    }

    pub fn key(&self) -> String {
        self.relative_path.to_string_lossy().replace('\\', "/")
    }

    pub fn fingerprint(&self) -> SourceFingerprint {
        SourceFingerprint {
            size: self.size,
            checksum: self.checksum.clone(),
        }
    }
}

/// Closed set of classification categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Document,
    Image,
    Video,
    Audio,
    Code,
    Archive,
    Data,
    Unknown,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Document,
        Category::Image,
        Category::Video,
        Category::Audio,
        Category::Code,
        Category::Archive,
        Category::Data,
        Category::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Document => "document",
            Category::Image => "image",
            Category::Video => "video",
            Category::Audio => "audio",
            Category::Code => "code",
            Category::Archive => "archive",
            Category::Data => "data",
            Category::Unknown => "unknown",
        }
    }

    /// Directory name used when the policy does not override it.
    pub fn default_dir(&self) -> &'static str {
        match self {
            Category::Document => "documents",
            Category::Image => "images",
            Category::Video => "videos",
            Category::Audio => "audio",
            Category::Code => "code",
            Category::Archive => "archives",
            Category::Data => "data",
            Category::Unknown => "unsorted",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// Classification of one file as supplied by an annotator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticAnnotation {
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub confidence: f64,
}

impl SemanticAnnotation {
    pub fn new(category: Category, confidence: f64) -> Self {
        Self {
            category,
            subcategory: None,
            series: None,
            episode: None,
            episode_title: None,
            track: None,
            suggested_name: None,
            description: None,
            tags: Vec::new(),
            confidence,
        }
    }

    /// Non-empty hierarchical descriptors, outermost first.
    pub fn hierarchy(&self) -> Vec<&str> {
        [self.subcategory.as_deref(), self.series.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Approve,
    Review,
    Skip,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Decision::Approve => "APPROVE",
            Decision::Review => "REVIEW",
            Decision::Skip => "SKIP",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    #[default]
    Move,
    Copy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionKind {
    Move,
    Copy,
    Skip,
}

impl From<Operation> for ActionKind {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Move => ActionKind::Move,
            Operation::Copy => ActionKind::Copy,
        }
    }
}

/// Size and optional checksum of the source at scan time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFingerprint {
    pub size: u64,
    pub checksum: Option<String>,
}

/// One intended filesystem operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedAction {
    pub source: PathBuf,
    pub target: PathBuf,
    pub kind: ActionKind,
    pub reason: String,
    pub fingerprint: Option<SourceFingerprint>,
}

impl PlannedAction {
    pub fn skip(source: PathBuf, target: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            source,
            target,
            kind: ActionKind::Skip,
            reason: reason.into(),
            fingerprint: None,
        }
    }

    pub fn is_skip(&self) -> bool {
        self.kind == ActionKind::Skip
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecutionStatus {
    Applied,
    Simulated,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub source: PathBuf,
    pub target: PathBuf,
    pub status: ExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ExecutionResult {
    pub fn new(action: &PlannedAction, status: ExecutionStatus, detail: Option<String>) -> Self {
        Self {
            source: action.source.clone(),
            target: action.target.clone(),
            status,
            detail,
        }
    }

    pub fn failed(action: &PlannedAction, error: &crate::Error) -> Self {
        Self::new(action, ExecutionStatus::Failed, Some(error.to_string()))
    }

    pub fn is_failed(&self) -> bool {
        self.status == ExecutionStatus::Failed
    }
}
