//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Cleaning the list of root directories before a scan
//! - Directory walking using walkdir
//! - Content fingerprinting with MD5, SHA-1 or SHA-256
//! - Filesystem identity (device and inode) extraction
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`roots`]: Root validation and nested-root removal
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: Streaming whole-file fingerprinting
//! - [`hardlink`]: (filesystem id, inode) identity of a file
//!
//! # Example
//!
//! ```no_run
//! use sdd::scanner::{clean_roots, scan_roots};
//! use std::path::PathBuf;
//!
//! let roots = clean_roots(&[PathBuf::from(".")]).unwrap();
//! let index = scan_roots(&roots).unwrap();
//! println!("{} distinct sizes", index.len());
//! ```

pub mod hardlink;
pub mod hasher;
pub mod roots;
pub mod walker;

use std::path::{Path, PathBuf};

use crate::duplicates::SizeIndex;

// Re-export main types
pub use hardlink::{FsId, Inode};
pub use hasher::{Fingerprint, HashAlgorithm, Hasher};
pub use roots::clean_roots;
pub use walker::Walker;

/// Metadata for a discovered regular file.
///
/// Carries exactly what the grouping index needs: where the file is,
/// how big it is, and which on-disk object it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path to the file (below an absolute root)
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Identifier of the filesystem holding the file
    pub fs_id: FsId,
    /// Inode number within that filesystem
    pub inode: Inode,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, fs_id: FsId, inode: Inode) -> Self {
        Self {
            path,
            size,
            fs_id,
            inode,
        }
    }
}

/// Walk every root and group the regular files found by size.
///
/// Roots are processed in order; the first error aborts the whole scan.
///
/// # Errors
///
/// Returns the first [`ScanError`] reported by any walker.
pub fn scan_roots(roots: &[PathBuf]) -> Result<SizeIndex, ScanError> {
    let mut sizes = SizeIndex::new();
    for (idx, root) in roots.iter().enumerate() {
        log::info!("Scanning {} ({}/{})", root.display(), idx + 1, roots.len());
        let mut found = 0usize;
        for entry in Walker::new(root).walk() {
            let entry = entry?;
            sizes.add(entry.size, entry.fs_id, entry.inode, entry.path);
            found += 1;
        }
        log::debug!("Found {} files under {}", found, root.display());
    }
    Ok(sizes)
}

/// Errors that can occur while preparing roots or scanning them.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The directory walk itself failed.
    #[error("Walk failed under {path}: {source}")]
    Walk {
        /// Path where the walk failed
        path: PathBuf,
        /// The underlying walkdir error
        #[source]
        source: walkdir::Error,
    },
}

impl ScanError {
    /// Classify an I/O error for `path`.
    pub(crate) fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Whether this error comes from validating the roots rather than walking them.
    #[must_use]
    pub fn is_setup(&self) -> bool {
        matches!(self, Self::NotADirectory(_))
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A hashing thread panicked.
    #[error("Hash worker panicked")]
    WorkerPanicked,
}

impl HashError {
    /// Classify an I/O error for `path`.
    pub(crate) fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}
