//! Command-line interface definitions for sdd.
//!
//! The option surface mirrors the classic usage line
//!
//! ```text
//! sdd [--md5 | --sha1 | --sha256] [--interactive | --dry-run | --auto | --link] [-H] DIR...
//! ```
//!
//! plus the usual global switches (verbosity, color, structured errors).
//! Hash and policy flags are mutually exclusive within their group; a flag
//! left unset falls back to the defaults file, then to the built-in default.
//!
//! # Example
//!
//! ```bash
//! # Review duplicates group by group (default)
//! sdd ~/Pictures ~/Backup
//!
//! # Show what automatic mode would delete
//! sdd --dry-run ~/Pictures
//!
//! # Replace duplicates with hard links, hashing with SHA-256
//! sdd --sha256 --link ~/Pictures
//! ```

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::actions::DeletionPolicy;
use crate::duplicates::LinkMode;
use crate::scanner::HashAlgorithm;

/// Super Duper Deduper: find duplicate files and get rid of them.
///
/// Files are grouped by size, then by a hash of their full content. Hard
/// links to the same file count as one file unless -H is given.
#[derive(Debug, Parser)]
#[command(name = "sdd")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("hash").args(["md5", "sha1", "sha256"])))]
#[command(group(ArgGroup::new("policy").args(["interactive", "dry_run", "auto", "link"])))]
pub struct Cli {
    /// Directories to scan
    #[arg(value_name = "DIR", required = true)]
    pub dirs: Vec<PathBuf>,

    /// Hash using MD5
    #[arg(short = '5', long)]
    pub md5: bool,

    /// Hash using SHA1 (default)
    #[arg(short = '1', long)]
    pub sha1: bool,

    /// Hash using SHA256
    #[arg(short = '6', long)]
    pub sha256: bool,

    /// Ask for each duplicate group (default)
    #[arg(short, long)]
    pub interactive: bool,

    /// Don't actually delete anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Automatically mark duplicates for deletion
    #[arg(short, long)]
    pub auto: bool,

    /// Hardlink all duplicate files
    #[arg(short, long)]
    pub link: bool,

    /// Consider hardlinks as different files
    #[arg(short = 'H', long)]
    pub hardlinks: bool,

    /// Number of hashing threads (default: number of CPUs)
    #[arg(short = 'j', long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: Option<u16>,

    /// Leave unreadable files out instead of aborting the run
    #[arg(long)]
    pub skip_unreadable: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print fatal errors as a JSON object on stderr
    #[arg(long)]
    pub json_errors: bool,
}

impl Cli {
    /// Hash algorithm chosen on the command line, if any.
    #[must_use]
    pub fn algorithm(&self) -> Option<HashAlgorithm> {
        if self.md5 {
            Some(HashAlgorithm::Md5)
        } else if self.sha256 {
            Some(HashAlgorithm::Sha256)
        } else if self.sha1 {
            Some(HashAlgorithm::Sha1)
        } else {
            None
        }
    }

    /// Deletion policy chosen on the command line, if any.
    #[must_use]
    pub fn policy(&self) -> Option<DeletionPolicy> {
        if self.link {
            Some(DeletionPolicy::HardLink)
        } else if self.auto {
            Some(DeletionPolicy::Automatic)
        } else if self.dry_run {
            Some(DeletionPolicy::DryRun)
        } else if self.interactive {
            Some(DeletionPolicy::Interactive)
        } else {
            None
        }
    }

    /// Link mode chosen on the command line, if any.
    #[must_use]
    pub fn link_mode(&self) -> Option<LinkMode> {
        self.hardlinks.then_some(LinkMode::Distinct)
    }
}
