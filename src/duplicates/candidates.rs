//! Candidate selection: which files are worth hashing.
//!
//! Files of different sizes cannot be duplicates, so only size buckets with
//! more than one leaf produce hashing jobs. Every (filesystem, inode) entry of
//! such a bucket becomes one [`HashJob`], even an entry with a single path:
//! another entry in the same bucket may share its content. Same-size files
//! with different content are resolved later by hashing.

use std::path::{Path, PathBuf};

use super::index::{LinkMode, SizeIndex};
use crate::scanner::{Fingerprint, FsId, Inode};

/// One distinct piece of on-disk content waiting to be fingerprinted.
///
/// `paths` are all hard links to the same inode; only the first one is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashJob {
    /// Filled in exactly once by a hash worker
    pub fingerprint: Option<Fingerprint>,
    /// Size shared by every path of the job
    pub size: u64,
    /// Filesystem holding the inode
    pub fs_id: FsId,
    /// Inode shared by every path of the job
    pub inode: Inode,
    /// Hard-linked paths to the content, in scan order
    pub paths: Vec<PathBuf>,
}

impl HashJob {
    /// Create an unhashed job.
    #[must_use]
    pub fn new(size: u64, fs_id: FsId, inode: Inode, paths: Vec<PathBuf>) -> Self {
        Self {
            fingerprint: None,
            size,
            fs_id,
            inode,
            paths,
        }
    }

    /// The path whose content stands for the whole job.
    #[must_use]
    pub fn representative(&self) -> Option<&Path> {
        self.paths.first().map(PathBuf::as_path)
    }
}

/// Iterate over the hashing jobs for every possibly-duplicated size bucket.
///
/// A bucket qualifies when its leaf count under `mode` exceeds one.
pub fn candidates(sizes: &SizeIndex, mode: LinkMode) -> impl Iterator<Item = HashJob> + '_ {
    sizes
        .iter()
        .filter(move |(size, _)| sizes.key_leaf_count(size, mode) > 1)
        .flat_map(|(size, filesystems)| {
            filesystems.iter().flat_map(move |(fs_id, inodes)| {
                inodes
                    .iter()
                    .filter(|(_, paths)| !paths.is_empty())
                    .map(move |(inode, paths)| HashJob::new(*size, *fs_id, *inode, paths.clone()))
            })
        })
}

/// Number of jobs [`candidates`] would produce, without cloning paths.
#[must_use]
pub fn candidate_count(sizes: &SizeIndex, mode: LinkMode) -> usize {
    sizes
        .iter()
        .filter(|(size, _)| sizes.key_leaf_count(size, mode) > 1)
        .map(|(_, filesystems)| {
            filesystems
                .values()
                .map(|inodes| inodes.values().filter(|p| !p.is_empty()).count())
                .sum::<usize>()
        })
        .sum()
}
