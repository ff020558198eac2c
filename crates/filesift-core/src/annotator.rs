use crate::error::Result;
use crate::model::{Category, FileRecord, SemanticAnnotation};
use std::path::Path;

/// Supplies exactly one annotation per record. Implementations must not
/// touch the filesystem.
pub trait Annotator: Send + Sync {
    fn annotate(&self, record: &FileRecord) -> Result<SemanticAnnotation>;
}

const KNOWN_CONFIDENCE: f64 = 0.95;
const UNKNOWN_CONFIDENCE: f64 = 0.3;

/// Offline classifier keyed on the file extension.
#[derive(Debug, Clone, Default)]
pub struct ExtensionAnnotator;

impl ExtensionAnnotator {
    pub fn category_for(file_name: &str) -> Option<Category> {
        let ext = Path::new(file_name)
            .extension()?
            .to_string_lossy()
            .to_ascii_lowercase();
        let category = match ext.as_str() {
            "pdf" | "doc" | "docx" | "odt" | "rtf" | "txt" | "md" | "pages" | "tex" | "epub"
            | "ppt" | "pptx" | "odp" => Category::Document,
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "tif" | "tiff" | "webp" | "heic" | "svg"
            | "raw" | "cr2" | "nef" => Category::Image,
            "mp4" | "mkv" | "avi" | "mov" | "wmv" | "webm" | "m4v" | "flv" => Category::Video,
            "mp3" | "flac" | "wav" | "ogg" | "m4a" | "aac" | "opus" | "wma" => Category::Audio,
            "rs" | "py" | "js" | "ts" | "go" | "c" | "h" | "cpp" | "hpp" | "java" | "kt"
            | "swift" | "rb" | "sh" | "ps1" | "cs" | "php" | "html" | "css" => Category::Code,
            "zip" | "tar" | "gz" | "tgz" | "bz2" | "xz" | "7z" | "rar" | "zst" => {
                Category::Archive
            }
            "csv" | "tsv" | "json" | "xml" | "yaml" | "yml" | "toml" | "parquet" | "sqlite"
            | "db" | "xls" | "xlsx" | "ods" => Category::Data,
            _ => return None,
        };
        Some(category)
    }
}

impl Annotator for ExtensionAnnotator {
    fn annotate(&self, record: &FileRecord) -> Result<SemanticAnnotation> {
        let annotation = match Self::category_for(&record.file_name) {
            Some(category) => SemanticAnnotation::new(category, KNOWN_CONFIDENCE),
            None => SemanticAnnotation::new(Category::Unknown, UNKNOWN_CONFIDENCE),
        };
        Ok(annotation)
    }
}
