use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("confidence {0} is outside [0.0, 1.0]")]
    InvalidConfidence(f64),

    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("no directory mapping for category '{0}' and no default configured")]
    UnknownCategory(String),

    #[error("unsafe path: {0}")]
    UnsafePath(String),

    #[error("target already exists with different content: {}", .0.display())]
    TargetCollision(PathBuf),

    #[error("source file not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("source root does not exist or is not a directory: {}", .0.display())]
    SourceRootMissing(PathBuf),

    #[error("output root is not writable: {}: {reason}", .path.display())]
    OutputRootUnwritable { path: PathBuf, reason: String },

    #[error("copy verification failed for {}", .0.display())]
    Verification(PathBuf),

    #[error("annotation error: {0}")]
    Annotation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
