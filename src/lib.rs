//! sdd - Super Duper Deduper
//!
//! Finds duplicate files across directory trees and resolves them with one of
//! four policies: interactive removal, automatic removal, a dry run, or
//! hard-link consolidation.
//!
//! The pipeline runs in three stages:
//!
//! 1. [`scanner`] walks the roots and groups regular files by size,
//!    filesystem and inode;
//! 2. [`duplicates`] hashes every file that shares its size with another one,
//!    on a pool of worker threads, into a fingerprint-keyed index;
//! 3. [`actions`] applies the chosen policy to the resulting groups.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod progress;
pub mod scanner;

use std::io::{self, Write};
use std::sync::Arc;

use crate::actions::{
    duplicate_groups, FileOps, PolicyEngine, Prompter, RealFs, Resolution, TerminalPrompter,
};
use crate::cli::Cli;
use crate::config::{Defaults, Settings};
use crate::duplicates::{HashEngine, HashIndex};
use crate::error::{ExitCode, SddError};
use crate::progress::{Progress, ProgressCallback};
use crate::scanner::{clean_roots, scan_roots, Hasher};

/// Scan the configured roots and return the fingerprint index of candidates.
///
/// # Errors
///
/// - `NoRoots`/`InvalidRoot` if the roots are unusable
/// - `Scan` if walking a root fails
/// - `Hash` if hashing fails and unreadable files are not skipped
pub fn find_duplicates(
    settings: &Settings,
    progress: Option<Arc<dyn ProgressCallback>>,
) -> Result<HashIndex, SddError> {
    if settings.roots.is_empty() {
        return Err(SddError::NoRoots);
    }
    let roots = clean_roots(&settings.roots).map_err(SddError::InvalidRoot)?;
    let sizes = scan_roots(&roots)?;
    log::info!("Looking for duplicates among {} distinct size(s)", sizes.len());

    let mut config = settings.engine_config();
    if let Some(progress) = progress {
        config = config.with_progress_callback(progress);
    }
    let engine = HashEngine::new(Hasher::new(settings.algorithm), config);
    let (hashes, stats) = engine.find_duplicates_with_stats(&sizes)?;

    if !stats.failures.is_empty() {
        log::warn!(
            "{} unreadable file(s) were left out of the comparison",
            stats.failures.len()
        );
    }
    log::debug!("Fingerprint index:\n{}", hashes.render());
    Ok(hashes)
}

/// Run the whole pipeline with the given filesystem, prompter and output.
///
/// # Errors
///
/// Any error of [`find_duplicates`], or `Input` if prompting or writing the
/// report fails. Per-file deletion failures are returned in the
/// [`Resolution`], not as an error.
pub fn run(
    settings: &Settings,
    fs: &dyn FileOps,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
    progress: Option<Arc<dyn ProgressCallback>>,
) -> Result<Resolution, SddError> {
    let hashes = find_duplicates(settings, progress)?;
    let groups = duplicate_groups(&hashes);
    log::info!("Found {} duplicate group(s)", groups.len());

    let resolution = PolicyEngine::new(fs, prompter, out)
        .with_color(settings.color)
        .apply(settings.policy, &groups)?;
    Ok(resolution)
}

/// Entry point used by the binary: configure, run against the real
/// filesystem and terminal, and map the outcome to an exit code.
///
/// # Errors
///
/// Returns an [`SddError`] (wrapped in `anyhow`) for fatal errors and for
/// runs where some removals or links failed.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let settings = Settings::resolve(&cli, &Defaults::load());
    if !settings.color {
        yansi::disable();
    }
    log::debug!("Settings: {:?}", settings);

    let progress: Arc<dyn ProgressCallback> = Arc::new(Progress::new(settings.quiet));
    let mut prompter = TerminalPrompter::stdio();
    let mut out = io::stdout();

    let resolution = run(&settings, &RealFs, &mut prompter, &mut out, Some(progress))?;

    let count = resolution.failure_count();
    if let Some(first) = resolution.failures.into_iter().next() {
        return Err(SddError::Deletion { count, first }.into());
    }
    Ok(ExitCode::Success)
}
