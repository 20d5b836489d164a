//! Duplicate finder implementation with multi-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection funnel:
//! 1. **Phase 1 - Size index**: walk the roots and bucket files by size
//! 2. **Phase 2 - Prehash**: hash the first 1 KiB of files in multi-member size buckets
//! 3. **Phase 3 - Full hash**: hash the entire content of files in multi-member prehash buckets
//! 4. **Report**: the first file of every multi-member full-hash bucket
//!    becomes the representative, the rest are its duplicates
//!
//! Each phase only ever looks at survivors of the previous one, so a file is
//! fully read only if another file shares both its size and its first
//! kilobyte.
//!
//! # Concurrency
//!
//! Hashing runs on a rayon pool of `io_threads` workers, one bucket per
//! task. Files inside a bucket are hashed in order and results are
//! collected in bucket order, so output never depends on scheduling. The
//! shutdown flag is checked before each bucket.
//!
//! # Example
//!
//! ```no_run
//! use dupfunnel::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (duplicates, summary) = finder.find_duplicates(&[PathBuf::from(".")]).unwrap();
//!
//! for entry in &duplicates {
//!     for dup in &entry.duplicates {
//!         println!("{} duplicates {}", dup.path.display(), entry.representative.path.display());
//!     }
//! }
//! println!("Reclaimable: {}", summary.reclaimable_display());
//! ```

use std::hash::Hash;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::groups::{
    group_by_size, Bucket, Buckets, DigestKey, DuplicateSet, FullHashGroups, GroupingStats,
    PartialHashGroups, SizeGroups,
};
use crate::progress::{Phase, ProgressCallback};
use crate::scanner::{
    Digest, FileHasher, FileRecord, HashError, MultiWalker, ScanError, WalkerConfig,
};

/// Default number of hashing threads.
pub const DEFAULT_IO_THREADS: usize = 4;

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of I/O threads for parallel hashing.
    pub io_threads: usize,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: DEFAULT_IO_THREADS,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of hashing threads (minimum 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Statistics from one hashing phase.
#[derive(Debug, Clone, Default)]
pub struct PhaseStats {
    /// Files in the multi-member buckets that entered the phase
    pub input_files: usize,
    /// Number of files successfully hashed
    pub hashed_files: usize,
    /// Number of files that failed to hash (I/O errors)
    pub failed_files: usize,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Hashed files that ended up alone in their bucket
    pub eliminated: usize,
    /// Files that survive into the next phase
    pub candidate_files: usize,
    /// Buckets with 2+ files after this phase
    pub candidate_groups: usize,
    /// Whether some buckets were skipped because of a shutdown request
    pub interrupted: bool,
    /// Errors encountered during the phase
    pub errors: Vec<ScanError>,
}

/// Build the size index for `walker` (Phase 1).
///
/// Files whose metadata cannot be read are left out; their errors, and the
/// errors for unusable roots, are returned alongside the groups.
pub fn phase1_size_index(
    walker: &MultiWalker,
    config: &FinderConfig,
) -> (SizeGroups, GroupingStats, Vec<ScanError>) {
    let mut errors: Vec<ScanError> = walker.missing().to_vec();

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start(Phase::Walking, 0);
        callback.on_message(&format!("Walking {} root(s)", walker.roots().len()));
    }

    let mut seen = 0usize;
    let records = walker.walk().filter_map(|result| match result {
        Ok(record) => {
            seen += 1;
            if let Some(ref callback) = config.progress_callback {
                callback.on_progress(seen, record.path.to_string_lossy().as_ref());
            }
            log::trace!("Found {} ({} bytes)", record.path.display(), record.size);
            Some(record)
        }
        Err(e) => {
            errors.push(e);
            None
        }
    });

    let (groups, stats) = group_by_size(records);

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end(Phase::Walking);
    }

    (groups, stats, errors)
}

/// Group size-group candidates by prefix digest (Phase 2).
///
/// Only buckets with 2+ members are hashed. The returned groups contain
/// only buckets that still have 2+ members.
#[must_use]
pub fn phase2_prehash(
    size_groups: &SizeGroups,
    hasher: &FileHasher,
    config: &FinderConfig,
) -> (PartialHashGroups, PhaseStats) {
    let prefix = hasher.prehash_size() as u64;
    log::info!(
        "Phase 2: Computing prehashes for {} files",
        size_groups.candidates().map(Bucket::len).sum::<usize>()
    );

    let (groups, stats) = hash_candidates(size_groups, config, Phase::Prehash, |file| {
        hasher
            .prehash(&file.path)
            .map(|digest| (digest, file.size.min(prefix)))
    });

    log::info!(
        "Phase 2 complete: {} files → {} potential duplicates ({} failed)",
        stats.input_files,
        stats.candidate_files,
        stats.failed_files
    );
    (groups, stats)
}

/// Group prehash candidates by full-content digest (Phase 3).
#[must_use]
pub fn phase3_fullhash(
    prehash_groups: &PartialHashGroups,
    hasher: &FileHasher,
    config: &FinderConfig,
) -> (FullHashGroups, PhaseStats) {
    log::info!(
        "Phase 3: Computing full hashes for {} files",
        prehash_groups.candidates().map(Bucket::len).sum::<usize>()
    );

    let (groups, stats) = hash_candidates(prehash_groups, config, Phase::Fullhash, |file| {
        hasher.full_hash(&file.path).map(|digest| (digest, file.size))
    });

    log::info!(
        "Phase 3 complete: {} groups, {} files confirmed ({} failed)",
        stats.candidate_groups,
        stats.candidate_files,
        stats.failed_files
    );
    (groups, stats)
}

type HashOutcome = (FileRecord, Result<(Digest, u64), HashError>);

/// Hash every file of every multi-member bucket and regroup by digest.
fn hash_candidates<K, F>(
    groups: &Buckets<K>,
    config: &FinderConfig,
    phase: Phase,
    hash: F,
) -> (Buckets<DigestKey>, PhaseStats)
where
    K: Eq + Hash + Clone + Sync,
    F: Fn(&FileRecord) -> Result<(Digest, u64), HashError> + Sync,
{
    let candidates: Vec<&Bucket<K>> = groups.candidates().collect();
    let mut stats = PhaseStats {
        input_files: candidates.iter().map(|b| b.len()).sum(),
        ..Default::default()
    };

    if candidates.is_empty() {
        log::debug!("{}: No files to process", phase);
        return (Buckets::new(), stats);
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start(phase, stats.input_files);
        callback.on_message(&format!("{} groups", candidates.len()));
    }

    let completed = AtomicUsize::new(0);
    let hash_bucket = |bucket: &&Bucket<K>| -> Option<Vec<HashOutcome>> {
        if config.is_shutdown_requested() {
            return None;
        }
        let outcomes = bucket
            .files
            .iter()
            .map(|file| {
                let result = hash(file);
                let current = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(ref callback) = config.progress_callback {
                    callback.on_progress(current, file.path.to_string_lossy().as_ref());
                }
                (file.clone(), result)
            })
            .collect();
        Some(outcomes)
    };

    let results: Vec<Option<Vec<HashOutcome>>> = match build_pool(config.io_threads) {
        Some(pool) => pool.install(|| candidates.par_iter().map(&hash_bucket).collect()),
        None => candidates.iter().map(&hash_bucket).collect(),
    };

    let mut regrouped = Buckets::new();
    for outcomes in results {
        let Some(outcomes) = outcomes else {
            stats.interrupted = true;
            continue;
        };
        for (file, result) in outcomes {
            match result {
                Ok((digest, bytes)) => {
                    stats.hashed_files += 1;
                    stats.bytes_hashed += bytes;
                    log::trace!("{} {}: {}", phase, digest, file.path.display());
                    regrouped.push(
                        DigestKey {
                            size: file.size,
                            digest,
                        },
                        file,
                    );
                }
                Err(e) => {
                    log::warn!("Failed to hash {}: {}", file.path.display(), e);
                    stats.failed_files += 1;
                    stats.errors.push(e.into());
                }
            }
        }
    }

    if stats.interrupted {
        log::info!("{}: Interrupted by shutdown signal", phase);
    }

    let survivors = regrouped.into_candidates();
    stats.candidate_groups = survivors.len();
    stats.candidate_files = survivors.file_count();
    stats.eliminated = stats.hashed_files - stats.candidate_files;

    for bucket in &survivors {
        log::debug!(
            "{} group {}: {} files of {} bytes",
            phase,
            bucket.key.digest,
            bucket.len(),
            bucket.key.size
        );
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end(phase);
    }

    (survivors, stats)
}

fn build_pool(threads: usize) -> Option<rayon::ThreadPool> {
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => Some(pool),
        Err(e) => {
            log::warn!("Failed to create hashing thread pool, hashing sequentially: {}", e);
            None
        }
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Roots that were actually walked
    pub roots: Vec<PathBuf>,
    /// Total number of files recorded
    pub total_files: usize,
    /// Total size of all recorded files in bytes
    pub total_size: u64,
    /// Files eliminated by size grouping (unique sizes)
    pub eliminated_by_size: usize,
    /// Files eliminated by prehash (different first kilobyte)
    pub eliminated_by_prehash: usize,
    /// Files eliminated by full hash (same prefix, different content)
    pub eliminated_by_fullhash: usize,
    /// Bytes read by both hashing phases
    pub bytes_hashed: u64,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding representatives)
    pub duplicate_files: usize,
    /// Space that removing every duplicate would free
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Non-fatal errors encountered during the scan
    pub errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Whether any files were skipped because of errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Percentage of scanned bytes taken by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Reclaimable space as a human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        bytesize::ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Total scanned size as a human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        bytesize::ByteSize::b(self.total_size).to_string()
    }
}

/// Errors that stop a scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// No root paths were supplied.
    #[error("No paths given")]
    NoPaths,

    /// None of the supplied root paths exist.
    #[error("No valid paths found: {}", format_paths(.0))]
    NoValidPaths(Vec<PathBuf>),

    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Duplicate finder that runs the complete funnel.
///
/// # Example
///
/// ```no_run
/// use dupfunnel::duplicates::{DuplicateFinder, FinderConfig};
/// use dupfunnel::scanner::{FileHasher, HashKind};
/// use std::path::PathBuf;
///
/// let finder = DuplicateFinder::new(
///     FinderConfig::default().with_io_threads(8),
///     FileHasher::new(HashKind::Blake3.algorithm()),
/// );
/// match finder.find_duplicates(&[PathBuf::from("/data")]) {
///     Ok((set, summary)) => println!("{} groups, {} reclaimable", set.len(), summary.reclaimable_display()),
///     Err(e) => eprintln!("Scan failed: {}", e),
/// }
/// ```
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: FileHasher,
}

impl DuplicateFinder {
    /// Create a finder with the given configuration and hasher.
    #[must_use]
    pub fn new(config: FinderConfig, hasher: FileHasher) -> Self {
        Self { config, hasher }
    }

    /// Create a finder with default configuration and xxHash64.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default(), FileHasher::default())
    }

    /// The finder's configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find all duplicate files under `roots`.
    ///
    /// Per-file failures never abort the scan; they are collected in
    /// [`ScanSummary::errors`].
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] if:
    /// - `roots` is empty
    /// - none of the roots exist
    /// - the shutdown flag was raised during the scan
    pub fn find_duplicates(
        &self,
        roots: &[PathBuf],
    ) -> Result<(DuplicateSet, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let mut summary = ScanSummary::default();

        if roots.is_empty() {
            return Err(FinderError::NoPaths);
        }
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let mut walker = MultiWalker::new(roots.to_vec(), self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }

        if walker.roots().is_empty() {
            log::warn!("None of the {} given path(s) exist", roots.len());
            return Err(FinderError::NoValidPaths(roots.to_vec()));
        }
        summary.roots = walker.roots().into_iter().map(PathBuf::from).collect();

        log::info!(
            "Starting duplicate scan of {} root(s) using {}",
            summary.roots.len(),
            self.hasher.algorithm_name()
        );

        let (size_groups, size_stats, walk_errors) = phase1_size_index(&walker, &self.config);
        summary.total_files = size_stats.total_files;
        summary.total_size = size_stats.total_size;
        summary.eliminated_by_size = size_stats.eliminated_unique;
        summary.errors = walk_errors;

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let (prehash_groups, prehash_stats) =
            phase2_prehash(&size_groups, &self.hasher, &self.config);
        summary.eliminated_by_prehash = prehash_stats.eliminated;
        summary.bytes_hashed += prehash_stats.bytes_hashed;
        summary.errors.extend(prehash_stats.errors);

        if prehash_stats.interrupted || self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let (fullhash_groups, fullhash_stats) =
            phase3_fullhash(&prehash_groups, &self.hasher, &self.config);
        summary.eliminated_by_fullhash = fullhash_stats.eliminated;
        summary.bytes_hashed += fullhash_stats.bytes_hashed;
        summary.errors.extend(fullhash_stats.errors);

        if fullhash_stats.interrupted {
            return Err(FinderError::Interrupted);
        }

        let duplicates = DuplicateSet::from_full_hash_groups(&fullhash_groups);
        summary.duplicate_groups = duplicates.len();
        summary.duplicate_files = duplicates.duplicate_files();
        summary.reclaimable_space = duplicates.reclaimable_space();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate groups, {} duplicate files, {} reclaimable, {} error(s)",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display(),
            summary.errors.len()
        );

        Ok((duplicates, summary))
    }
}
