use crate::config::ScanSettings;
use crate::error::{Error, Result};
use crate::hasher;
use crate::model::FileRecord;
use chrono::{DateTime, Utc};
use glob::Pattern;
use rayon::prelude::*;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Read-only walk of `root`. Returns one record per regular file, sorted by
/// relative path. Unreadable entries are logged and skipped; symlinks are
/// never followed.
pub fn scan(root: &Path, settings: &ScanSettings) -> Result<Vec<FileRecord>> {
    if !root.is_dir() {
        return Err(Error::SourceRootMissing(root.to_path_buf()));
    }

    let patterns: Vec<Pattern> = settings
        .exclude_patterns
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect();

    let mut walker = WalkDir::new(root).follow_links(false).sort_by_file_name();
    if !settings.recursive {
        walker = walker.max_depth(1);
    }

    let mut candidates: Vec<(PathBuf, PathBuf, Metadata)> = Vec::new();
    let entries = walker
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry, root, &patterns));
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                warn!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };
        let relative = match entry.path().strip_prefix(root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => continue,
        };
        candidates.push((entry.path().to_path_buf(), relative, metadata));
    }
    debug!("{} candidate files under {}", candidates.len(), root.display());

    let mut records: Vec<FileRecord> = candidates
        .into_par_iter()
        .filter_map(|(path, relative, metadata)| {
            build_record(&path, relative, &metadata, settings.checksum)
        })
        .collect();
    records.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    info!("Scanned {} files from {}", records.len(), root.display());
    Ok(records)
}

fn is_excluded(entry: &DirEntry, root: &Path, patterns: &[Pattern]) -> bool {
    let name = entry.file_name().to_string_lossy();
    let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
    let excluded = patterns
        .iter()
        .any(|p| p.matches(&name) || p.matches_path(relative));
    if excluded {
        debug!("Excluding {}", entry.path().display());
    }
    excluded
}

fn build_record(
    path: &Path,
    relative_path: PathBuf,
    metadata: &Metadata,
    with_checksum: bool,
) -> Option<FileRecord> {
    let checksum = if with_checksum {
        match hasher::checksum_file(path) {
            Ok(sum) => Some(sum),
            Err(e) => {
                warn!("Skipping {}: checksum failed: {}", path.display(), e);
                return None;
            }
        }
    } else {
        None
    };

    let file_name = relative_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let modified = metadata.modified().ok().map(DateTime::<Utc>::from);

    Some(FileRecord {
        relative_path,
        file_name,
        size: metadata.len(),
        modified,
        checksum,
    })
}
