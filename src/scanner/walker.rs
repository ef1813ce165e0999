//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree and collecting the metadata the grouping index needs: path, size,
//! filesystem id and inode.
//!
//! # Behavior
//!
//! - Only regular files are yielded
//! - Symbolic links are never followed and are skipped silently
//! - Directory entries are visited in file-name order for deterministic output
//! - Any error while reading a directory or stat'ing a file is yielded as a
//!   [`ScanError`]; callers treat it as fatal
//!
//! # Example
//!
//! ```no_run
//! use sdd::scanner::Walker;
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"));
//! for entry in walker.walk() {
//!     let file = entry.unwrap();
//!     println!("{}: {} bytes", file.path.display(), file.size);
//! }
//! ```

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::hardlink::{Inode, InodeKey};
use super::{FileEntry, ScanError};

/// Directory walker for file discovery under a single root.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            root: path.to_path_buf(),
        }
    }

    /// Walk the directory tree, yielding file entries.
    ///
    /// Errors are yielded as [`ScanError`] values; iteration may continue
    /// after one but the scan is expected to stop there.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        // Synthetic inodes for platforms without inode identity
        let mut next_synthetic: Inode = 0;

        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry_result| {
                let entry = match entry_result {
                    Ok(entry) => entry,
                    Err(e) => {
                        let path = e
                            .path()
                            .map_or_else(|| self.root.clone(), Path::to_path_buf);
                        log::error!("Failed to scan {}: {}", path.display(), e);
                        return Some(Err(ScanError::Walk { path, source: e }));
                    }
                };

                let file_type = entry.file_type();
                if file_type.is_symlink() {
                    log::trace!("Skipping symlink: {}", entry.path().display());
                    return None;
                }
                if !file_type.is_file() {
                    return None;
                }

                let path = entry.into_path();
                let metadata = match std::fs::symlink_metadata(&path) {
                    Ok(m) => m,
                    Err(e) => {
                        log::error!("Failed to scan {}: {}", path.display(), e);
                        return Some(Err(ScanError::from_io(&path, e)));
                    }
                };

                let key = InodeKey::from_metadata(&metadata).unwrap_or_else(|| {
                    next_synthetic += 1;
                    InodeKey {
                        fs_id: 0,
                        inode: next_synthetic,
                    }
                });

                log::trace!(
                    "Found {} ({} bytes, fs {}, inode {})",
                    path.display(),
                    metadata.len(),
                    key.fs_id,
                    key.inode
                );

                Some(Ok(FileEntry::new(
                    path,
                    metadata.len(),
                    key.fs_id,
                    key.inode,
                )))
            })
    }
}
