//! Validation of the root directories handed to a scan.
//!
//! Every root must be an existing directory. Roots are made absolute and a
//! root that lies inside another root (or repeats it) is dropped with a
//! warning, so no file is walked twice.

use std::path::{Path, PathBuf};

use super::ScanError;

/// Validate, absolutize and de-nest a list of scan roots.
///
/// The order of the surviving roots follows the input order.
///
/// # Errors
///
/// - `NotFound` if a root does not exist
/// - `NotADirectory` if a root exists but is not a directory
/// - `Io` if the current directory cannot be determined
///
/// # Example
///
/// ```no_run
/// use sdd::scanner::clean_roots;
/// use std::path::PathBuf;
///
/// let roots = clean_roots(&[PathBuf::from("/data"), PathBuf::from("/data/photos")]).unwrap();
/// assert_eq!(roots, vec![PathBuf::from("/data")]);
/// ```
pub fn clean_roots(roots: &[PathBuf]) -> Result<Vec<PathBuf>, ScanError> {
    let mut absolute = Vec::with_capacity(roots.len());
    for root in roots {
        let metadata = std::fs::metadata(root).map_err(|e| ScanError::from_io(root, e))?;
        if !metadata.is_dir() {
            log::error!("{} is not a directory!", root.display());
            return Err(ScanError::NotADirectory(root.clone()));
        }
        absolute.push(absolutize(root)?);
    }

    let mut cleaned: Vec<PathBuf> = Vec::with_capacity(absolute.len());
    for (i, dir) in absolute.iter().enumerate() {
        let container = absolute.iter().enumerate().find(|(j, other)| {
            if i == *j {
                return false;
            }
            // Identical roots: keep the first occurrence only.
            if dir == *other {
                return *j < i;
            }
            dir.starts_with(other)
        });
        match container {
            Some((_, other)) => {
                log::warn!(
                    "{} is a subdir of {}, ignoring it.",
                    dir.display(),
                    other.display()
                );
            }
            None => cleaned.push(dir.clone()),
        }
    }

    log::debug!("Scanning {} root(s)", cleaned.len());
    Ok(cleaned)
}

/// Make a path absolute and lexically normalized, without resolving symlinks.
fn absolutize(path: &Path) -> Result<PathBuf, ScanError> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| ScanError::from_io(path, e))?
            .join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}
