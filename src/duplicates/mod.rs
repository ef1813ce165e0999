//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - The four-level grouping index (size or fingerprint → fs → inode → paths)
//! - Candidate selection from the size-keyed index
//! - Parallel content hashing into the fingerprint-keyed index
//!
//! # Example
//!
//! ```no_run
//! use sdd::duplicates::{EngineConfig, HashEngine, LinkMode};
//! use sdd::scanner::{scan_roots, Hasher};
//! use std::path::PathBuf;
//!
//! let sizes = scan_roots(&[PathBuf::from(".")]).unwrap();
//! let config = EngineConfig::default().with_link_mode(LinkMode::Fold);
//! let hashes = HashEngine::new(Hasher::default(), config)
//!     .find_duplicates(&sizes)
//!     .unwrap();
//! print!("{}", hashes.render());
//! ```

pub mod candidates;
pub mod engine;
pub mod index;

pub use candidates::{candidate_count, candidates, HashJob};
pub use engine::{default_workers, EngineConfig, HashEngine, HashFailurePolicy, HashStats};
pub use index::{
    render_filesystems, render_inodes, FsMap, GroupingIndex, HashIndex, InodeMap, LinkMode,
    SizeIndex,
};
