//! Run configuration.
//!
//! A run is configured once, at startup, into a [`Settings`] value that is
//! passed down explicitly. Its sources, lowest priority first:
//!
//! 1. built-in defaults (SHA-1, interactive, hard links folded);
//! 2. the optional defaults file `config.json` in the platform config
//!    directory, read into [`Defaults`];
//! 3. command-line flags.
//!
//! ```json
//! { "algorithm": "sha256", "policy": "dry-run", "link_mode": "distinct", "workers": 4 }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::actions::DeletionPolicy;
use crate::cli::Cli;
use crate::duplicates::{default_workers, EngineConfig, HashFailurePolicy, LinkMode};
use crate::scanner::HashAlgorithm;

/// Contents of the defaults file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Defaults {
    /// Default hash algorithm.
    pub algorithm: Option<HashAlgorithm>,
    /// Default deletion policy.
    pub policy: Option<DeletionPolicy>,
    /// Default hard-link handling.
    pub link_mode: Option<LinkMode>,
    /// Default number of hashing threads.
    pub workers: Option<usize>,
    /// Default behavior on unreadable files.
    pub on_unreadable: Option<HashFailurePolicy>,
}

impl Defaults {
    /// Load the defaults file from the platform-specific path.
    ///
    /// A missing or broken file yields empty defaults; the problem is logged
    /// at debug level.
    pub fn load() -> Self {
        match Self::config_path().and_then(|path| Self::load_from(&path)) {
            Ok(defaults) => defaults,
            Err(e) => {
                log::debug!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    /// Load defaults from a specific file; a missing file yields empty defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let defaults = serde_json::from_str(&content)?;
        log::debug!("Loaded defaults from {}", path.display());
        Ok(defaults)
    }

    /// Get the default platform-specific configuration path.
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("org", "sdd", "sdd")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(project_dirs.config_dir().join("config.json"))
    }
}

/// Fully resolved configuration of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Root directories as given (cleaned later).
    pub roots: Vec<PathBuf>,
    /// Content hash algorithm.
    pub algorithm: HashAlgorithm,
    /// Deletion policy.
    pub policy: DeletionPolicy,
    /// Hard-link handling.
    pub link_mode: LinkMode,
    /// Hashing threads (at least 1).
    pub workers: usize,
    /// Behavior on unreadable files.
    pub failure_policy: HashFailurePolicy,
    /// Errors only, no progress bar.
    pub quiet: bool,
    /// Colored labels in the report.
    pub color: bool,
}

impl Settings {
    /// Combine command-line flags with the defaults file.
    #[must_use]
    pub fn resolve(cli: &Cli, defaults: &Defaults) -> Self {
        let failure_policy = if cli.skip_unreadable {
            HashFailurePolicy::Skip
        } else {
            defaults.on_unreadable.unwrap_or_default()
        };

        Self {
            roots: cli.dirs.clone(),
            algorithm: cli
                .algorithm()
                .or(defaults.algorithm)
                .unwrap_or_default(),
            policy: cli.policy().or(defaults.policy).unwrap_or_default(),
            link_mode: cli
                .link_mode()
                .or(defaults.link_mode)
                .unwrap_or_default(),
            workers: cli
                .workers
                .map(usize::from)
                .or(defaults.workers)
                .unwrap_or_else(default_workers)
                .max(1),
            failure_policy,
            quiet: cli.quiet,
            color: !cli.no_color,
        }
    }

    /// Hash engine configuration for these settings.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_workers(self.workers)
            .with_link_mode(self.link_mode)
            .with_failure_policy(self.failure_policy)
    }
}
