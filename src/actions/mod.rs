//! Deletion policies.
//!
//! This module provides functionality for:
//! - Turning the fingerprint index into sorted duplicate groups
//! - Automatic and interactive removal behind a single confirmation
//! - Dry runs that only report
//! - Replacing duplicates with hard links to one canonical copy
//!
//! # Example
//!
//! ```no_run
//! use sdd::actions::{duplicate_groups, DeletionPolicy, PolicyEngine, RealFs, TerminalPrompter};
//! use sdd::duplicates::HashIndex;
//!
//! # fn demo(hashes: &HashIndex) -> std::io::Result<()> {
//! let groups = duplicate_groups(hashes);
//! let mut prompter = TerminalPrompter::stdio();
//! let mut out = std::io::stdout();
//! let resolution = PolicyEngine::new(&RealFs, &mut prompter, &mut out)
//!     .apply(DeletionPolicy::DryRun, &groups)?;
//! println!("{}", resolution.summary());
//! # Ok(())
//! # }
//! ```

pub mod delete;
pub mod fs_ops;
pub mod link;
pub mod policy;
pub mod prompt;
pub mod select;

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::duplicates::HashIndex;

// Re-export commonly used types
pub use delete::{delete_file, validate_preserves_copy, DeleteError, Resolution};
pub use fs_ops::{reclaimable_bytes, FileOps, RealFs};
pub use link::{backup_path, replace_with_link, LinkOutcome, BACKUP_SUFFIX};
pub use policy::PolicyEngine;
pub use prompt::{Prompter, TerminalPrompter};

/// How duplicates are resolved once found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeletionPolicy {
    /// Ask which file of each group to keep (default).
    #[default]
    Interactive,
    /// Keep the first file of each group, remove the rest after one confirmation.
    Automatic,
    /// Report what automatic mode would do; change nothing.
    DryRun,
    /// Replace every duplicate with a hard link to the first file of its group.
    HardLink,
}

impl fmt::Display for DeletionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interactive => write!(f, "interactive"),
            Self::Automatic => write!(f, "automatic"),
            Self::DryRun => write!(f, "dry-run"),
            Self::HardLink => write!(f, "hard-link"),
        }
    }
}

/// Order two paths by their raw string bytes, not component by component,
/// so `/d/a-copy/f` comes before `/d/a/f`.
fn by_path_bytes(a: &Path, b: &Path) -> Ordering {
    a.as_os_str()
        .as_encoded_bytes()
        .cmp(b.as_os_str().as_encoded_bytes())
}

/// Flatten the fingerprint index into duplicate groups.
///
/// Each group's paths are sorted as strings; groups of a single path are
/// dropped; the groups themselves are ordered by their first path.
#[must_use]
pub fn duplicate_groups(hashes: &HashIndex) -> Vec<Vec<PathBuf>> {
    let mut groups: Vec<Vec<PathBuf>> = hashes
        .iter()
        .map(|(fingerprint, _)| {
            let mut paths = hashes.group_paths(fingerprint);
            paths.sort_by(|a, b| by_path_bytes(a, b));
            paths
        })
        .filter(|paths| paths.len() > 1)
        .collect();
    groups.sort_by(|a, b| {
        a.iter()
            .zip(b)
            .map(|(x, y)| by_path_bytes(x, y))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| a.len().cmp(&b.len()))
    });
    groups
}
