//! Four-level grouping index.
//!
//! # Overview
//!
//! The [`GroupingIndex`] maps `key → filesystem id → inode → paths`. It is used
//! twice during a run:
//!
//! - keyed by file size ([`SizeIndex`]), filled by the scanner, to find files
//!   that could be duplicates;
//! - keyed by content fingerprint ([`HashIndex`]), filled by the hash engine's
//!   merge step, to hold the final duplicate groups.
//!
//! All paths under one inode are hard links to the same on-disk content. The
//! index is write-once, read-many: there is no removal, and inserting requires
//! `&mut self`, so concurrent writers need external coordination.
//!
//! # Example
//!
//! ```
//! use sdd::duplicates::{LinkMode, SizeIndex};
//! use std::path::PathBuf;
//!
//! let mut index = SizeIndex::new();
//! index.add(42, 1, 100, PathBuf::from("/a"));
//! index.add(42, 1, 100, PathBuf::from("/a-link"));
//! index.add(42, 1, 101, PathBuf::from("/b"));
//!
//! assert_eq!(index.leaf_count(LinkMode::Fold), 2);
//! assert_eq!(index.leaf_count(LinkMode::Distinct), 3);
//! ```

use std::collections::HashMap;
use std::fmt::{Display, Write as _};
use std::hash::Hash;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::scanner::{Fingerprint, FsId, Inode};

/// How hard-linked paths are counted and reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    /// Hard links to one inode count as a single file (default).
    #[default]
    Fold,
    /// Every path counts as its own file, even when hard-linked.
    Distinct,
}

/// Paths sharing one inode, in insertion order.
pub type InodeMap = HashMap<Inode, Vec<PathBuf>>;

/// Inodes grouped by the filesystem holding them.
pub type FsMap = HashMap<FsId, InodeMap>;

/// Size-keyed index built by the scanner.
pub type SizeIndex = GroupingIndex<u64>;

/// Fingerprint-keyed index holding the final duplicate groups.
pub type HashIndex = GroupingIndex<Fingerprint>;

/// Count leaves of a filesystem level under the given link mode.
fn fs_leaf_count(filesystems: &FsMap, mode: LinkMode) -> usize {
    filesystems
        .values()
        .map(|inodes| match mode {
            LinkMode::Fold => inodes.values().filter(|paths| !paths.is_empty()).count(),
            LinkMode::Distinct => inodes.values().map(Vec::len).sum(),
        })
        .sum()
}

/// Hierarchical `key → fs → inode → paths` mapping.
#[derive(Debug, Clone)]
pub struct GroupingIndex<K> {
    buckets: HashMap<K, FsMap>,
}

impl<K> Default for GroupingIndex<K> {
    fn default() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> GroupingIndex<K> {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `path` under `key → fs_id → inode`, creating levels as needed.
    pub fn add(&mut self, key: K, fs_id: FsId, inode: Inode, path: PathBuf) {
        self.buckets
            .entry(key)
            .or_default()
            .entry(fs_id)
            .or_default()
            .entry(inode)
            .or_default()
            .push(path);
    }

    /// Number of distinct top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Check if the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Look up the filesystem level for one key.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&FsMap> {
        self.buckets.get(key)
    }

    /// Iterate over `(key, filesystem level)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &FsMap)> {
        self.buckets.iter()
    }

    /// Total leaf count across the whole index.
    ///
    /// With [`LinkMode::Fold`] every populated inode counts once; with
    /// [`LinkMode::Distinct`] every path counts.
    #[must_use]
    pub fn leaf_count(&self, mode: LinkMode) -> usize {
        self.buckets
            .values()
            .map(|filesystems| fs_leaf_count(filesystems, mode))
            .sum()
    }

    /// Leaf count of a single top-level bucket (0 if absent).
    #[must_use]
    pub fn key_leaf_count(&self, key: &K, mode: LinkMode) -> usize {
        self.buckets
            .get(key)
            .map_or(0, |filesystems| fs_leaf_count(filesystems, mode))
    }

    /// All paths of one bucket, flattened, in arbitrary order.
    #[must_use]
    pub fn group_paths(&self, key: &K) -> Vec<PathBuf> {
        self.buckets
            .get(key)
            .map(|filesystems| {
                filesystems
                    .values()
                    .flat_map(|inodes| inodes.values().flatten().cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every path in the index, flattened, in arbitrary order.
    #[must_use]
    pub fn all_paths(&self) -> Vec<PathBuf> {
        self.buckets
            .values()
            .flat_map(|filesystems| filesystems.values())
            .flat_map(|inodes| inodes.values().flatten().cloned())
            .collect()
    }
}

impl<K: Eq + Hash + Ord + Display> GroupingIndex<K> {
    /// Render the whole index as an indented report.
    ///
    /// Each nesting level is indented by one more space than its parent;
    /// keys, filesystem ids and inodes appear in ascending order.
    ///
    /// ```text
    /// 42:
    ///  FS: 2049
    ///   Inode: 131
    ///    0 - /data/a
    /// ```
    #[must_use]
    pub fn render(&self) -> String {
        let mut keys: Vec<&K> = self.buckets.keys().collect();
        keys.sort();
        keys.into_iter().map(|key| self.render_key(key)).collect()
    }

    /// Render one top-level bucket the way [`render`](Self::render) does;
    /// empty if `key` is absent.
    #[must_use]
    pub fn render_key(&self, key: &K) -> String {
        let Some(filesystems) = self.buckets.get(key) else {
            return String::new();
        };
        let mut out = format!("{key}:\n");
        write_filesystems(&mut out, filesystems, 1);
        out
    }
}

/// Render a filesystem level (`FS:` lines and everything below them).
#[must_use]
pub fn render_filesystems(filesystems: &FsMap) -> String {
    let mut out = String::new();
    write_filesystems(&mut out, filesystems, 0);
    out
}

/// Render an inode level (`Inode:` lines and their paths).
#[must_use]
pub fn render_inodes(inodes: &InodeMap) -> String {
    let mut out = String::new();
    write_inodes(&mut out, inodes, 0);
    out
}

fn write_filesystems(out: &mut String, filesystems: &FsMap, depth: usize) {
    let mut fs_ids: Vec<&FsId> = filesystems.keys().collect();
    fs_ids.sort();
    for fs_id in fs_ids {
        let _ = writeln!(out, "{}FS: {}", indent(depth), fs_id);
        write_inodes(out, &filesystems[fs_id], depth + 1);
    }
}

fn write_inodes(out: &mut String, inodes: &InodeMap, depth: usize) {
    let mut inode_ids: Vec<&Inode> = inodes.keys().collect();
    inode_ids.sort();
    for inode in inode_ids {
        let _ = writeln!(out, "{}Inode: {}", indent(depth), inode);
        for (i, path) in inodes[inode].iter().enumerate() {
            let _ = writeln!(out, "{}{} - {}", indent(depth + 1), i, path.display());
        }
    }
}

fn indent(level: usize) -> String {
    " ".repeat(level)
}
