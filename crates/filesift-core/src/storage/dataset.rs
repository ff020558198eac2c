use crate::error::Result;
use crate::model::SemanticAnnotation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

const DATASET_VERSION: &str = "1.0";

/// Annotations keyed by relative source path.
pub type AnnotationMap = BTreeMap<String, SemanticAnnotation>;

#[derive(Debug, Serialize, Deserialize)]
struct DatasetDocument {
    version: String,
    count: usize,
    annotations: AnnotationMap,
}

/// Persists record/annotation pairings so a run can be replayed without
/// asking the annotator again.
#[derive(Debug, Clone)]
pub struct DatasetStorage {
    path: PathBuf,
}

impl DatasetStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Writes to a sibling temp file and renames it over the dataset.
    pub fn save(&self, annotations: &AnnotationMap) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let document = DatasetDocument {
            version: DATASET_VERSION.to_string(),
            count: annotations.len(),
            annotations: annotations.clone(),
        };

        let temp = self.path.with_extension(format!("tmp.{}", std::process::id()));
        let write_result = (|| -> Result<()> {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &document)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
            fs::rename(&temp, &self.path)?;
            Ok(())
        })();

        if write_result.is_err() {
            let _ = fs::remove_file(&temp);
        }
        write_result?;

        info!("Saved {} annotations to {}", annotations.len(), self.path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<AnnotationMap> {
        let reader = BufReader::new(File::open(&self.path)?);
        let document: DatasetDocument = serde_json::from_reader(reader)?;
        info!(
            "Loaded {} annotations (version {}) from {}",
            document.annotations.len(),
            document.version,
            self.path.display()
        );
        Ok(document.annotations)
    }
}
