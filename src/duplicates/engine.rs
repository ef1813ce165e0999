//! Parallel hash engine.
//!
//! # Overview
//!
//! The engine turns the size-keyed index into the fingerprint-keyed index of
//! duplicates. Three kinds of threads cooperate through two bounded
//! `crossbeam-channel` queues:
//!
//! ```text
//!  producer ──jobs──▶ worker × N ──results──▶ merge ──▶ HashIndex
//! ```
//!
//! - the **producer** feeds one [`HashJob`] per candidate (size, fs, inode)
//!   entry and closes the job queue when it runs out;
//! - each **worker** fingerprints the first path of a job and forwards the
//!   completed job; workers exit once the job queue is closed and empty;
//! - the **merge** thread is the only writer of the final index.
//!
//! The caller joins every worker, closes the result queue, then joins the
//! merge thread. That join handle is the completion signal: the index is
//! handed back only once the merge has drained every result.
//!
//! # Failure handling
//!
//! With [`HashFailurePolicy::Abort`] (the default) the first hashing error
//! raises a shared abort flag, the producer and workers stop taking new work,
//! and the engine returns that error without a partial index. With
//! [`HashFailurePolicy::Skip`] the failing file is logged, counted in
//! [`HashStats::failures`] and left out.
//!
//! # Example
//!
//! ```no_run
//! use sdd::duplicates::{EngineConfig, HashEngine};
//! use sdd::scanner::{scan_roots, Hasher};
//! use std::path::PathBuf;
//!
//! let sizes = scan_roots(&[PathBuf::from(".")]).unwrap();
//! let engine = HashEngine::new(Hasher::default(), EngineConfig::default());
//! let hashes = engine.find_duplicates(&sizes).unwrap();
//! println!("{} distinct contents among candidates", hashes.len());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use super::candidates::{candidate_count, candidates, HashJob};
use super::index::{HashIndex, LinkMode, SizeIndex};
use crate::progress::ProgressCallback;
use crate::scanner::{HashError, Hasher};

/// Queue slots per worker for both the job and the result queue.
pub const QUEUE_DEPTH_PER_WORKER: usize = 10;

/// What to do when a candidate file cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashFailurePolicy {
    /// Stop the whole run on the first failure (default).
    #[default]
    Abort,
    /// Report the file, leave it out, and keep going.
    Skip,
}

/// Number of available processing units, at least 1.
#[must_use]
pub fn default_workers() -> usize {
    thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

/// Configuration for the hash engine.
#[derive(Clone)]
pub struct EngineConfig {
    /// Number of hashing worker threads.
    pub workers: usize,
    /// Whether hard-linked paths are folded or reported individually.
    pub link_mode: LinkMode,
    /// Behavior on unreadable files.
    pub failure_policy: HashFailurePolicy,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("workers", &self.workers)
            .field("link_mode", &self.link_mode)
            .field("failure_policy", &self.failure_policy)
            .field("progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            link_mode: LinkMode::default(),
            failure_policy: HashFailurePolicy::default(),
            progress_callback: None,
        }
    }
}

impl EngineConfig {
    /// Set the worker count (minimum 1).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the hard-link mode.
    #[must_use]
    pub fn with_link_mode(mut self, mode: LinkMode) -> Self {
        self.link_mode = mode;
        self
    }

    /// Set the failure policy.
    #[must_use]
    pub fn with_failure_policy(mut self, policy: HashFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Statistics from a hash engine run.
#[derive(Debug, Default)]
pub struct HashStats {
    /// Number of jobs produced by the candidate filter
    pub candidates: usize,
    /// Number of jobs fingerprinted successfully
    pub hashed: usize,
    /// Bytes read while fingerprinting
    pub bytes_hashed: u64,
    /// Files left out under [`HashFailurePolicy::Skip`]
    pub failures: Vec<HashError>,
}

type Outcome = Result<HashJob, HashError>;

/// Worker-pool driver producing the fingerprint-keyed duplicate index.
#[derive(Debug, Clone)]
pub struct HashEngine {
    hasher: Hasher,
    config: EngineConfig,
}

impl HashEngine {
    /// Create an engine.
    #[must_use]
    pub fn new(hasher: Hasher, config: EngineConfig) -> Self {
        Self { hasher, config }
    }

    /// Fingerprint every candidate and return the fingerprint-keyed index.
    ///
    /// Blocks until all hashing and merging has completed.
    ///
    /// # Errors
    ///
    /// Under [`HashFailurePolicy::Abort`], the first [`HashError`] met by any
    /// worker. `WorkerPanicked` if a worker or the merge thread panicked.
    pub fn find_duplicates(&self, sizes: &SizeIndex) -> Result<HashIndex, HashError> {
        self.find_duplicates_with_stats(sizes).map(|(index, _)| index)
    }

    /// Like [`find_duplicates`](Self::find_duplicates), also returning run statistics.
    ///
    /// # Errors
    ///
    /// See [`find_duplicates`](Self::find_duplicates).
    pub fn find_duplicates_with_stats(
        &self,
        sizes: &SizeIndex,
    ) -> Result<(HashIndex, HashStats), HashError> {
        let workers = self.config.workers.max(1);
        let mode = self.config.link_mode;
        let total = candidate_count(sizes, mode);

        log::info!(
            "Hashing {} candidate file(s) with {} ({} worker(s))",
            total,
            self.hasher.algorithm(),
            workers
        );
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("hash", total);
        }

        let (job_tx, job_rx) = bounded::<HashJob>(workers * QUEUE_DEPTH_PER_WORKER);
        let (result_tx, result_rx) = bounded::<Outcome>(workers * QUEUE_DEPTH_PER_WORKER);
        let abort = AtomicBool::new(false);
        let abort = &abort;
        let hasher = &self.hasher;

        let merged = thread::scope(|scope| {
            scope.spawn(move || produce(sizes, mode, &job_tx, abort));

            let worker_handles: Vec<_> = (0..workers)
                .map(|_| {
                    let jobs = job_rx.clone();
                    let results = result_tx.clone();
                    scope.spawn(move || hash_worker(hasher, &jobs, &results, abort))
                })
                .collect();
            // Only workers hold the job receiver now; if they all stop, the producer does too.
            drop(job_rx);

            let merge = scope.spawn(move || self.merge_results(&result_rx, abort));

            let mut worker_panicked = false;
            for handle in worker_handles {
                if handle.join().is_err() {
                    worker_panicked = true;
                }
            }
            // Every worker is done: close the result queue so the merge can finish.
            drop(result_tx);

            let merged = merge.join().map_err(|_| HashError::WorkerPanicked)?;
            if worker_panicked {
                return Err(HashError::WorkerPanicked);
            }
            merged
        });

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("hash");
        }

        let (index, mut stats) = merged?;
        stats.candidates = total;
        log::info!(
            "Hashed {} file(s), {} bytes; {} distinct content(s)",
            stats.hashed,
            stats.bytes_hashed,
            index.len()
        );
        Ok((index, stats))
    }

    /// Drain the result queue into the final index.
    fn merge_results(
        &self,
        results: &Receiver<Outcome>,
        abort: &AtomicBool,
    ) -> Result<(HashIndex, HashStats), HashError> {
        let mut hashes = HashIndex::new();
        let mut stats = HashStats::default();
        let mut first_error: Option<HashError> = None;

        for outcome in results.iter() {
            match outcome {
                Ok(job) => {
                    stats.hashed += 1;
                    stats.bytes_hashed += job.size;
                    if let Some(ref callback) = self.config.progress_callback {
                        let shown = job
                            .representative()
                            .map(|p| p.to_string_lossy().into_owned())
                            .unwrap_or_default();
                        callback.on_progress(stats.hashed, &shown);
                    }
                    insert_job(&mut hashes, job, self.config.link_mode);
                }
                Err(e) => match self.config.failure_policy {
                    HashFailurePolicy::Skip => {
                        log::warn!("Skipping unreadable file: {}", e);
                        stats.failures.push(e);
                    }
                    HashFailurePolicy::Abort => {
                        if first_error.is_none() {
                            log::error!("Hashing failed, aborting: {}", e);
                            abort.store(true, Ordering::SeqCst);
                            first_error = Some(e);
                        } else {
                            log::debug!("Further hashing error after abort: {}", e);
                        }
                    }
                },
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok((hashes, stats)),
        }
    }
}

/// Feed candidate jobs into the job queue; dropping the sender closes it.
fn produce(sizes: &SizeIndex, mode: LinkMode, jobs: &Sender<HashJob>, abort: &AtomicBool) {
    let mut produced = 0usize;
    for job in candidates(sizes, mode) {
        if abort.load(Ordering::SeqCst) {
            log::debug!("Producer: abort requested after {} job(s)", produced);
            return;
        }
        if jobs.send(job).is_err() {
            return;
        }
        produced += 1;
    }
    log::debug!("Producer: queued {} job(s)", produced);
}

/// Fingerprint jobs until the job queue is closed and drained.
fn hash_worker(
    hasher: &Hasher,
    jobs: &Receiver<HashJob>,
    results: &Sender<Outcome>,
    abort: &AtomicBool,
) {
    for mut job in jobs.iter() {
        if abort.load(Ordering::SeqCst) {
            break;
        }

        let Some(path) = job.representative() else {
            continue;
        };
        let outcome = hasher.full_hash(path).map(|fingerprint| {
            job.fingerprint = Some(fingerprint);
            job
        });

        if results.send(outcome).is_err() {
            break;
        }
    }
}

/// Insert one completed job into the fingerprint index.
fn insert_job(hashes: &mut HashIndex, mut job: HashJob, mode: LinkMode) {
    let Some(fingerprint) = job.fingerprint.take() else {
        return;
    };
    match mode {
        LinkMode::Distinct => {
            for path in job.paths {
                hashes.add(fingerprint.clone(), job.fs_id, job.inode, path);
            }
        }
        LinkMode::Fold => {
            if let Some(path) = job.paths.into_iter().next() {
                hashes.add(fingerprint, job.fs_id, job.inode, path);
            }
        }
    }
}
