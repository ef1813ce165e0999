//! Filesystem mutation seam.
//!
//! Every change the deletion policies make to the filesystem goes through
//! [`FileOps`]. [`RealFs`] forwards to `std::fs`; tests substitute an
//! in-memory implementation to prove dry runs touch nothing and to inject
//! failures at any step.

use std::fs;
use std::io;
use std::path::Path;

use crate::scanner::hardlink::is_same_file;

/// Filesystem operations used by the deletion policies.
pub trait FileOps {
    /// Remove a single file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Rename `from` to `to` (same directory in practice).
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create `link` as a new hard link to `original`.
    fn hard_link(&self, original: &Path, link: &Path) -> io::Result<()>;

    /// Size of a file in bytes, without following symlinks.
    fn file_len(&self, path: &Path) -> io::Result<u64>;

    /// Number of hard links to the file at `path`.
    fn link_count(&self, path: &Path) -> io::Result<u64>;

    /// Whether two paths resolve to the same on-disk object.
    fn same_file(&self, a: &Path, b: &Path) -> io::Result<bool>;

    /// Whether anything exists at `path` (including dangling symlinks).
    fn exists(&self, path: &Path) -> bool;
}

/// Bytes given back to the filesystem once `path` is unlinked: its size if
/// this is the last link to the file, 0 otherwise.
///
/// # Errors
///
/// Returns the I/O error if `path` cannot be inspected.
pub fn reclaimable_bytes(fs: &dyn FileOps, path: &Path) -> io::Result<u64> {
    if fs.link_count(path)? > 1 {
        return Ok(0);
    }
    fs.file_len(path)
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl FileOps for RealFs {
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn hard_link(&self, original: &Path, link: &Path) -> io::Result<()> {
        fs::hard_link(original, link)
    }

    fn file_len(&self, path: &Path) -> io::Result<u64> {
        fs::symlink_metadata(path).map(|m| m.len())
    }

    #[cfg(unix)]
    fn link_count(&self, path: &Path) -> io::Result<u64> {
        use std::os::unix::fs::MetadataExt;
        fs::symlink_metadata(path).map(|m| m.nlink())
    }

    #[cfg(not(unix))]
    fn link_count(&self, path: &Path) -> io::Result<u64> {
        fs::symlink_metadata(path).map(|_| 1)
    }

    fn same_file(&self, a: &Path, b: &Path) -> io::Result<bool> {
        is_same_file(a, b)
    }

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }
}
