use super::safety;
use crate::error::Result;
use crate::model::{FileRecord, SemanticAnnotation};
use std::path::Path;

/// Name the file should carry at its target, before collision suffixes.
pub fn target_file_name(
    record: &FileRecord,
    annotation: &SemanticAnnotation,
    allow_rename: bool,
) -> Result<String> {
    let name = if allow_rename {
        renamed(record, annotation).unwrap_or_else(|| record.file_name.clone())
    } else {
        record.file_name.clone()
    };
    safety::file_component(&name, "file name")?;
    Ok(name)
}

fn renamed(record: &FileRecord, annotation: &SemanticAnnotation) -> Option<String> {
    let source = Path::new(&record.file_name);
    let ext = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    if let Some(suggested) = non_blank(annotation.suggested_name.as_deref()) {
        let has_ext = Path::new(suggested).extension().is_some();
        return Some(if has_ext {
            suggested.to_string()
        } else {
            format!("{}{}", suggested, ext)
        });
    }

    if let (Some(series), Some(episode)) = (non_blank(annotation.series.as_deref()), annotation.episode) {
        let title = non_blank(annotation.episode_title.as_deref())
            .map(|t| format!(" - {}", t))
            .unwrap_or_default();
        return Some(format!("{} - E{:02}{}{}", series, episode, title, ext));
    }

    if let Some(track) = annotation.track {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Some(format!("{:02} - {}{}", track, stem, ext));
    }

    None
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// `name.ext` -> `name (n).ext`; extensionless names get the suffix at the end.
pub fn with_suffix(file_name: &str, n: u32) -> String {
    let path = Path::new(file_name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => format!(
            "{} ({}).{}",
            stem.to_string_lossy(),
            n,
            ext.to_string_lossy()
        ),
        _ => format!("{} ({})", file_name, n),
    }
}
