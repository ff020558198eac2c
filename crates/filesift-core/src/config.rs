use crate::error::{Error, Result};
use crate::model::{Category, Operation};
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub operation: Operation,
    pub dataset_path: Option<PathBuf>,
    pub thresholds: Thresholds,
    pub paths: PathPolicy,
    pub scan: ScanSettings,
    pub retry: RetrySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::new(),
            output_dir: PathBuf::new(),
            dry_run: true,
            operation: Operation::Move,
            dataset_path: None,
            thresholds: Thresholds::default(),
            paths: PathPolicy::default(),
            scan: ScanSettings::default(),
            retry: RetrySettings::default(),
        }
    }
}

impl Settings {
    /// Checks everything that must hold before a run may start.
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        if !self.output_dir.is_absolute() {
            return Err(Error::InvalidPolicy(format!(
                "output root must be absolute: '{}'",
                self.output_dir.display()
            )));
        }
        self.paths.validate()?;
        self.retry.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub approve: f64,
    pub review: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            approve: 0.9,
            review: 0.75,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<()> {
        let ordered = 0.0 <= self.review && self.review <= self.approve && self.approve <= 1.0;
        if ordered {
            Ok(())
        } else {
            Err(Error::InvalidPolicy(format!(
                "thresholds must satisfy 0 <= review ({}) <= approve ({}) <= 1",
                self.review, self.approve
            )))
        }
    }
}

/// Rules for turning an approved annotation into a target path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathPolicy {
    /// Category name (lowercase) to subdirectory of the output root.
    pub category_dirs: BTreeMap<String, String>,
    /// Used for categories missing from `category_dirs`.
    pub default_dir: Option<String>,
    pub preserve_structure: bool,
    pub allow_rename: bool,
    pub nest_subcategory: bool,
}

impl Default for PathPolicy {
    fn default() -> Self {
        Self {
            category_dirs: default_category_dirs(),
            default_dir: None,
            preserve_structure: false,
            allow_rename: false,
            nest_subcategory: true,
        }
    }
}

impl PathPolicy {
    pub fn validate(&self) -> Result<()> {
        for key in self.category_dirs.keys() {
            key.parse::<Category>().map_err(Error::InvalidPolicy)?;
        }
        Ok(())
    }

    /// Subdirectory for a category, falling back to `default_dir`.
    pub fn dir_for(&self, category: Category) -> Result<&str> {
        self.category_dirs
            .iter()
            .find(|(key, _)| key.parse::<Category>().ok() == Some(category))
            .map(|(_, dir)| dir.as_str())
            .or(self.default_dir.as_deref())
            .ok_or_else(|| Error::UnknownCategory(category.to_string()))
    }
}

pub fn default_category_dirs() -> BTreeMap<String, String> {
    Category::ALL
        .iter()
        .map(|c| (c.as_str().to_string(), c.default_dir().to_string()))
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub exclude_patterns: Vec<String>,
    pub recursive: bool,
    pub checksum: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            exclude_patterns: vec![
                ".*".to_string(),
                "__pycache__".to_string(),
                "node_modules".to_string(),
            ],
            recursive: true,
            checksum: false,
        }
    }
}

/// Bounded retry budget for transient filesystem errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 25,
            max_backoff_ms: 500,
        }
    }
}

impl RetrySettings {
    pub fn validate(&self) -> Result<()> {
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(Error::InvalidPolicy(format!(
                "retry initial_backoff_ms ({}) exceeds max_backoff_ms ({})",
                self.initial_backoff_ms, self.max_backoff_ms
            )));
        }
        Ok(())
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

/// Layers an optional TOML file under `FILESIFT_*` environment variables.
///
/// Without an explicit path, `Filesift.toml` in the working directory is
/// used when present.
pub fn load_configuration(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let file_source = match path {
        Some(path) => ConfigFile::from(path).required(true),
        None => ConfigFile::with_name("Filesift").required(false),
    };

    let builder = Config::builder()
        .add_source(file_source)
        .add_source(
            Environment::with_prefix("FILESIFT")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    builder.try_deserialize::<Settings>()
}
