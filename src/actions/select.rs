//! Per-group selection rules.
//!
//! Groups are sorted by path before selection, so "first" means the
//! lexicographically smallest path. Every rule keeps at least one file of a
//! group; [`validate_preserves_copy`](super::delete::validate_preserves_copy)
//! double-checks that before anything is removed.

use std::path::PathBuf;

/// Automatic rule: keep the first path, mark every other one.
#[must_use]
pub fn automatic_marks(group: &[PathBuf]) -> Vec<PathBuf> {
    group.iter().skip(1).cloned().collect()
}

/// Interactive rule for a 1-based `kept` answer; `0` keeps the whole group.
///
/// An answer beyond the group length also keeps everything.
#[must_use]
pub fn interactive_marks(group: &[PathBuf], kept: usize) -> Vec<PathBuf> {
    if kept == 0 || kept > group.len() {
        return Vec::new();
    }
    group
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != kept - 1)
        .map(|(_, path)| path.clone())
        .collect()
}
