//! Filesystem identity of files, used to recognise hard links.
//!
//! # Overview
//!
//! Hard links are multiple directory entries pointing to the same inode on
//! disk. They share content by construction, so the grouping index keys every
//! path by its (filesystem id, inode) pair and only one path per pair ever
//! needs hashing.
//!
//! # Platform Support
//!
//! - **Unix**: Uses (device_id, inode) pairs from file metadata
//! - **Other**: No identity is available; the walker assigns every path its
//!   own synthetic inode, so no two paths are ever treated as hard links
//!
//! # Example
//!
//! ```no_run
//! use sdd::scanner::hardlink::InodeKey;
//!
//! let meta = std::fs::metadata("/some/file.txt").unwrap();
//! if let Some(key) = InodeKey::from_metadata(&meta) {
//!     println!("fs {} inode {}", key.fs_id, key.inode);
//! }
//! ```

use std::fs::Metadata;
use std::io;
use std::path::Path;

/// Identifier of a filesystem (the `st_dev` of its files).
pub type FsId = u64;

/// Inode number within one filesystem.
pub type Inode = u64;

/// Identity of an on-disk file: the filesystem it lives on and its inode.
///
/// Two paths with equal keys are hard links to the same content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InodeKey {
    /// Filesystem identifier
    pub fs_id: FsId,
    /// Inode number
    pub inode: Inode,
}

impl InodeKey {
    /// Create an inode key from file metadata.
    ///
    /// Returns `None` if the platform doesn't expose inode information.
    #[cfg(unix)]
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            fs_id: metadata.dev(),
            inode: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    #[must_use]
    pub fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }

    /// Read the inode key of `path` without following a final symlink.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the path cannot be stat'ed.
    pub fn of_path(path: &Path) -> io::Result<Option<Self>> {
        let metadata = std::fs::symlink_metadata(path)?;
        Ok(Self::from_metadata(&metadata))
    }

    /// Check if inode identity is supported on this platform.
    #[must_use]
    pub const fn is_supported() -> bool {
        cfg!(unix)
    }
}

/// Whether two paths are hard links to the same on-disk file.
///
/// Always `false` on platforms without inode identity.
///
/// # Errors
///
/// Returns the underlying I/O error if either path cannot be stat'ed.
pub fn is_same_file(a: &Path, b: &Path) -> io::Result<bool> {
    match (InodeKey::of_path(a)?, InodeKey::of_path(b)?) {
        (Some(ka), Some(kb)) => Ok(ka == kb),
        _ => Ok(false),
    }
}
