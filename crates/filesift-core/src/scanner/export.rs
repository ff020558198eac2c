use crate::error::Result;
use crate::model::FileRecord;
use chrono::{Local, Utc};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Flat, inventory-style view of a scanned file.
#[derive(Debug, Serialize)]
pub struct ScanEntry<'a> {
    /// Parent directory relative to the scan root, forward slashes.
    pub path: String,
    pub filename: &'a str,
    pub complete_path: String,
    /// Empty when checksums were not requested.
    pub checksum: &'a str,
    pub size: u64,
    /// `YYYY-MM-DD` of the modification time, local time.
    pub date: String,
}

impl<'a> From<&'a FileRecord> for ScanEntry<'a> {
    fn from(record: &'a FileRecord) -> Self {
        Self {
            path: record.parent_dir().to_string_lossy().replace('\\', "/"),
            filename: &record.file_name,
            complete_path: record.key(),
            checksum: record.checksum.as_deref().unwrap_or(""),
            size: record.size,
            date: record
                .modified
                .map(|m| m.with_timezone(&Local).format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Writes `files_<YYYYmmdd_HHMMSS>.json` into `dir` as a JSON array.
pub fn export_json(records: &[FileRecord], dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("files_{}.json", Utc::now().format("%Y%m%d_%H%M%S")));

    let entries: Vec<ScanEntry> = records.iter().map(ScanEntry::from).collect();
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, &entries)?;
    writer.flush()?;

    info!("Exported {} records to {}", entries.len(), path.display());
    Ok(path)
}
