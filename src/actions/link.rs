//! Replacing duplicates with hard links.
//!
//! A duplicate is never unlinked before its replacement exists. Each
//! replacement runs three steps:
//!
//! 1. rename the duplicate to a fresh backup name in the same directory;
//! 2. hard-link the canonical file at the duplicate's original name;
//! 3. remove the backup.
//!
//! If step 2 fails the backup is renamed back. After any failure the content
//! is still reachable under either the original or the backup name.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::delete::DeleteError;
use super::fs_ops::{reclaimable_bytes, FileOps};

/// Suffix appended to a file's name while it is being replaced.
pub const BACKUP_SUFFIX: &str = ".sdd-bak";

/// Result of replacing one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The path now links to the canonical file; `freed` is the space its
    /// former content gave back (0 if that content had other links).
    Linked { freed: u64 },
    /// The path already was a hard link to the canonical file.
    AlreadyLinked,
}

/// First unused backup name for `path`: `<name>.sdd-bak`, then
/// `<name>.sdd-bak.1`, `<name>.sdd-bak.2`, ...
#[must_use]
pub fn backup_path(fs: &dyn FileOps, path: &Path) -> PathBuf {
    let mut base: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    base.push(BACKUP_SUFFIX);

    let candidate = path.with_file_name(&base);
    if !fs.exists(&candidate) {
        return candidate;
    }

    let mut n = 1u32;
    loop {
        let mut numbered = base.clone();
        numbered.push(format!(".{n}"));
        let candidate = path.with_file_name(numbered);
        if !fs.exists(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Replace `path` with a hard link to `canonical`.
///
/// # Errors
///
/// - `NotFound`/`PermissionDenied`/`Io` if `path` cannot be inspected or
///   moved aside, or if the backup cannot be removed afterwards
/// - `LinkFailed` if the link cannot be created; `restored` tells whether the
///   original was moved back
pub fn replace_with_link(
    fs: &dyn FileOps,
    canonical: &Path,
    path: &Path,
) -> Result<LinkOutcome, DeleteError> {
    if fs
        .same_file(canonical, path)
        .map_err(|e| DeleteError::from_io(path, e))?
    {
        log::debug!("Already linked: {}", path.display());
        return Ok(LinkOutcome::AlreadyLinked);
    }

    let size = reclaimable_bytes(fs, path).map_err(|e| DeleteError::from_io(path, e))?;
    let backup = backup_path(fs, path);

    fs.rename(path, &backup)
        .map_err(|e| DeleteError::from_io(path, e))?;

    if let Err(source) = fs.hard_link(canonical, path) {
        let restored = match fs.rename(&backup, path) {
            Ok(()) => true,
            Err(e) => {
                log::error!(
                    "Could not restore {} from {}: {}",
                    path.display(),
                    backup.display(),
                    e
                );
                false
            }
        };
        return Err(DeleteError::LinkFailed {
            path: path.to_path_buf(),
            source,
            restored,
        });
    }

    fs.remove_file(&backup)
        .map_err(|e| DeleteError::from_io(&backup, e))?;

    log::debug!("Linked {} -> {}", path.display(), canonical.display());
    Ok(LinkOutcome::Linked { freed: size })
}
