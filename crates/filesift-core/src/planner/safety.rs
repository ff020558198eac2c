use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Rebuilds `raw` from its normal components, rejecting anything that could
/// climb out of the directory it is joined onto.
pub fn relative_dir(raw: &Path, what: &str) -> Result<PathBuf> {
    let mut clean = PathBuf::new();
    for component in raw.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_string_lossy();
                check_characters(&part, what)?;
                clean.push(part.as_ref());
            }
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(Error::UnsafePath(format!(
                    "{} '{}' contains '..'",
                    what,
                    raw.display()
                )))
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(Error::UnsafePath(format!(
                    "{} '{}' is not relative",
                    what,
                    raw.display()
                )))
            }
        }
    }
    Ok(clean)
}

/// A single path component: non-empty, no separators, not `.` or `..`.
pub fn file_component(name: &str, what: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        return Err(Error::UnsafePath(format!("{} '{}' is not a valid name", what, name)));
    }
    if name.contains('/') {
        return Err(Error::UnsafePath(format!(
            "{} '{}' contains a path separator",
            what, name
        )));
    }
    check_characters(name, what)
}

/// Final guard: the composed target must sit strictly below the output root.
pub fn ensure_within(root: &Path, target: &Path) -> Result<()> {
    if target != root && target.starts_with(root) {
        Ok(())
    } else {
        Err(Error::UnsafePath(format!(
            "'{}' escapes output root '{}'",
            target.display(),
            root.display()
        )))
    }
}

fn check_characters(part: &str, what: &str) -> Result<()> {
    if part.contains('\0') || part.contains('\\') {
        return Err(Error::UnsafePath(format!(
            "{} '{}' contains a forbidden character",
            what,
            part.escape_default()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_dir_accepts_nested_normal_components() {
        let clean = relative_dir(Path::new("./media/images"), "dir").unwrap();
        assert_eq!(clean, PathBuf::from("media/images"));
    }

    #[test]
    fn test_relative_dir_rejects_escapes() {
        for raw in ["../../etc", "docs/../../x", "/etc", "a\\..\\b"] {
            assert!(
                matches!(relative_dir(Path::new(raw), "dir"), Err(Error::UnsafePath(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_file_component() {
        assert!(file_component("report.pdf", "name").is_ok());
        assert!(file_component("..", "name").is_err());
        assert!(file_component("", "name").is_err());
        assert!(file_component("a/b.txt", "name").is_err());
        assert!(file_component("nul\0.txt", "name").is_err());
    }

    #[test]
    fn test_ensure_within() {
        let root = Path::new("/out");
        assert!(ensure_within(root, Path::new("/out/docs/a.txt")).is_ok());
        assert!(ensure_within(root, Path::new("/out")).is_err());
        assert!(ensure_within(root, Path::new("/etc/passwd")).is_err());
    }
}
