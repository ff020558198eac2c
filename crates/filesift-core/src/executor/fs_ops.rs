use super::retry::with_retry;
use crate::config::RetrySettings;
use crate::error::{Error, Result};
use crate::hasher;
use crate::platform;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveMethod {
    Renamed,
    CopiedAcrossVolumes,
}

/// Creates whatever part of the target's parent chain is missing.
pub fn ensure_parent(target: &Path, retry: &RetrySettings) -> Result<()> {
    if let Some(parent) = target.parent() {
        if !parent.is_dir() {
            with_retry("create directory", retry, || fs::create_dir_all(parent))?;
            debug!("Created directory {}", parent.display());
        }
    }
    Ok(())
}

/// Within a volume the source is linked at the target and then unlinked, so
/// an existing target is never replaced. Across volumes it copies, verifies,
/// then removes the source.
pub fn move_file(source: &Path, target: &Path, retry: &RetrySettings) -> Result<MoveMethod> {
    match link_exclusive(source, target, retry) {
        Ok(Linked::Yes) => {
            with_retry("remove source", retry, || fs::remove_file(source))?;
            Ok(MoveMethod::Renamed)
        }
        Ok(Linked::Unsupported) => {
            with_retry("rename", retry, || fs::rename(source, target))?;
            Ok(MoveMethod::Renamed)
        }
        Err(Error::Io(e)) if platform::is_cross_device(&e) => {
            debug!(
                "{} and {} are on different volumes, falling back to copy",
                source.display(),
                target.display()
            );
            copy_verified(source, target, retry)?;
            with_retry("remove source", retry, || fs::remove_file(source))?;
            Ok(MoveMethod::CopiedAcrossVolumes)
        }
        Err(e) => Err(e),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Linked {
    Yes,
    /// The filesystem has no hard links; callers fall back to rename.
    Unsupported,
}

/// Creates `target` as a hard link to `from`. Fails with `TargetCollision`
/// when `target` already exists instead of overwriting it.
fn link_exclusive(from: &Path, target: &Path, retry: &RetrySettings) -> Result<Linked> {
    match with_retry("link", retry, || fs::hard_link(from, target)) {
        Ok(()) => Ok(Linked::Yes),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            Err(Error::TargetCollision(target.to_path_buf()))
        }
        Err(e) if platform::is_cross_device(&e) || e.kind() == io::ErrorKind::NotFound => {
            Err(e.into())
        }
        Err(e) => {
            debug!("Hard link to {} unavailable ({}), using rename", target.display(), e);
            Ok(Linked::Unsupported)
        }
    }
}

/// Copies into a hidden partial file beside the target, syncs and verifies
/// it against the source, then links it into place. The partial file is
/// removed on any failure so a truncated target is never left behind.
pub fn copy_verified(source: &Path, target: &Path, retry: &RetrySettings) -> Result<()> {
    let partial = partial_path(target)?;

    let result = (|| -> Result<()> {
        with_retry("copy", retry, || fs::copy(source, &partial))?;
        with_retry("sync", retry, || File::open(&partial)?.sync_all())?;

        if !hasher::files_identical(source, &partial)? {
            return Err(Error::Verification(target.to_path_buf()));
        }
        match link_exclusive(&partial, target, retry)? {
            Linked::Yes => {
                if let Err(e) = fs::remove_file(&partial) {
                    warn!("Could not remove partial copy {}: {}", partial.display(), e);
                }
            }
            Linked::Unsupported => {
                if fs::symlink_metadata(target).is_ok() {
                    return Err(Error::TargetCollision(target.to_path_buf()));
                }
                with_retry("rename partial", retry, || fs::rename(&partial, target))?;
            }
        }
        Ok(())
    })();

    if result.is_err() && partial.exists() {
        if let Err(e) = fs::remove_file(&partial) {
            warn!("Could not remove partial copy {}: {}", partial.display(), e);
        }
    }
    result
}

fn partial_path(target: &Path) -> Result<PathBuf> {
    let name = target
        .file_name()
        .ok_or_else(|| Error::UnsafePath(format!("no file name in '{}'", target.display())))?;
    Ok(target.with_file_name(format!(".{}.filesift-partial", name.to_string_lossy())))
}
