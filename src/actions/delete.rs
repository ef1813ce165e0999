//! File removal and the outcome of a deletion run.
//!
//! # Overview
//!
//! This module provides:
//! - [`DeleteError`], the per-path failure type of every policy
//! - [`delete_file`], a single removal through [`FileOps`]
//! - [`validate_preserves_copy`], the guard that keeps one copy per group
//! - [`Resolution`], the accumulated result of applying a policy
//!
//! # Safety
//!
//! Removal failures are reported per path and never stop the remaining
//! removals. At least one copy of every duplicate group is always preserved.
//!
//! # Example
//!
//! ```no_run
//! use sdd::actions::delete::delete_file;
//! use sdd::actions::RealFs;
//! use std::path::Path;
//!
//! match delete_file(&RealFs, Path::new("/path/to/duplicate.txt")) {
//!     Ok(size) => println!("Freed {} bytes", size),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

use std::io;
use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use thiserror::Error;

use super::fs_ops::{reclaimable_bytes, FileOps};

/// Error type for deletion and linking operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to change the file.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Replacing a file with a hard link failed.
    ///
    /// `restored` tells whether the original file was put back in place.
    #[error("hard link failed for {path}: {source} (original restored: {restored})")]
    LinkFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
        restored: bool,
    },

    /// Attempted to delete all copies (at least one must be preserved).
    #[error("cannot delete all copies - at least one file must be preserved")]
    AllCopiesWouldBeDeleted,

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::LinkFailed { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            Self::AllCopiesWouldBeDeleted => None,
        }
    }

    /// Classify an I/O error for `path`.
    pub(crate) fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Outcome of applying a deletion policy to every duplicate group.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Files removed.
    pub removed: Vec<PathBuf>,
    /// Files replaced by a hard link to their group's first file.
    pub linked: Vec<PathBuf>,
    /// Per-path failures; the run continued past each of them.
    pub failures: Vec<DeleteError>,
    /// Bytes no longer held by a separate copy.
    pub bytes_freed: u64,
    /// The user declined the confirmation; nothing was changed.
    pub declined: bool,
}

impl Resolution {
    /// Number of failed removals or links.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if every attempted change succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the run.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut summary = match (self.removed.len(), self.linked.len()) {
            (removed, 0) => format!("Deleted {removed} file(s)"),
            (0, linked) => format!("Linked {linked} file(s)"),
            (removed, linked) => format!("Deleted {removed} file(s), linked {linked} file(s)"),
        };
        if !self.all_succeeded() {
            summary.push_str(&format!(", {} failed", self.failure_count()));
        }
        format!("{summary}, freed {}", ByteSize::b(self.bytes_freed))
    }

    pub(crate) fn record_failure(&mut self, error: DeleteError) {
        log::warn!("{}", error);
        self.failures.push(error);
    }
}

/// Remove one file, returning the bytes this gives back: its size, or 0 if
/// other hard links to it remain.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if removal is not allowed
/// - `Io` for any other failure
pub fn delete_file(fs: &dyn FileOps, path: &Path) -> Result<u64, DeleteError> {
    let size = reclaimable_bytes(fs, path).map_err(|e| DeleteError::from_io(path, e))?;
    fs.remove_file(path)
        .map_err(|e| DeleteError::from_io(path, e))?;

    log::debug!("Deleted: {} ({} bytes)", path.display(), size);
    Ok(size)
}

/// Validate that a selection doesn't delete all copies.
///
/// At least one copy of each duplicate group must be preserved.
///
/// # Errors
///
/// Returns `AllCopiesWouldBeDeleted` if all copies would be deleted.
///
/// # Example
///
/// ```
/// use sdd::actions::delete::validate_preserves_copy;
/// use std::path::PathBuf;
///
/// let group = vec![
///     PathBuf::from("/original.txt"),
///     PathBuf::from("/copy1.txt"),
///     PathBuf::from("/copy2.txt"),
/// ];
///
/// // This is OK - one copy preserved
/// let selected = vec![PathBuf::from("/copy1.txt"), PathBuf::from("/copy2.txt")];
/// assert!(validate_preserves_copy(&selected, &group).is_ok());
///
/// // This would delete all copies - error
/// assert!(validate_preserves_copy(&group, &group).is_err());
/// ```
pub fn validate_preserves_copy(
    selected_paths: &[PathBuf],
    group_paths: &[PathBuf],
) -> Result<(), DeleteError> {
    use std::collections::HashSet;

    let selected_set: HashSet<&PathBuf> = selected_paths.iter().collect();
    let preserved_count = group_paths
        .iter()
        .filter(|p| !selected_set.contains(p))
        .count();

    if preserved_count == 0 {
        log::error!(
            "Attempted to delete all {} copies of a duplicate group",
            group_paths.len()
        );
        Err(DeleteError::AllCopiesWouldBeDeleted)
    } else {
        log::trace!(
            "Selection validated: {} files selected, {} preserved",
            selected_paths.len(),
            preserved_count
        );
        Ok(())
    }
}
