//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! [`Walker`] turns one root path into a lazy stream of [`FileRecord`]s, one
//! per regular file, and [`MultiWalker`] chains several roots. Directory
//! entries are sorted by file name, so for a fixed tree the discovery order
//! (and with it the choice of representative in each duplicate group) never
//! changes between runs.
//!
//! # Features
//!
//! - Sorted, deterministic traversal
//! - Optional symlink following (walkdir detects cycles)
//! - Size filtering (min/max, empty files)
//! - Hidden file filtering
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use dupfunnel::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use super::{FileRecord, ScanError, WalkerConfig};

/// Directory walker for a single root.
#[derive(Debug, Clone)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// The root may be a directory or a single regular file.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Root path of this walker.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk the tree, yielding file records.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration; a file whose metadata cannot be read is simply not part
    /// of the output.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileRecord, ScanError>> + '_ {
        let skip_hidden = self.config.skip_hidden;

        WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| !(skip_hidden && entry.depth() > 0 && is_hidden(entry)))
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    false
                } else {
                    true
                }
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => self.process_entry(entry),
                Err(e) => Some(Err(self.handle_walk_error(e))),
            })
    }

    /// Turn a directory entry into a record, or skip it.
    fn process_entry(&self, entry: DirEntry) -> Option<Result<FileRecord, ScanError>> {
        let file_type = entry.file_type();

        if file_type.is_dir() {
            return None;
        }

        // Only reachable when not following links
        if file_type.is_symlink() {
            log::trace!("Skipping symlink: {}", entry.path().display());
            return None;
        }

        if !file_type.is_file() {
            log::trace!("Skipping special file: {}", entry.path().display());
            return None;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => return Some(Err(self.handle_walk_error(e))),
        };

        let size = metadata.len();
        if !self.config.accepts_size(size) {
            log::trace!(
                "Skipping file due to size filter ({}): {}",
                size,
                entry.path().display()
            );
            return None;
        }

        Some(Ok(FileRecord::new(entry.into_path(), size)))
    }

    fn handle_walk_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        let message = error.to_string();

        let scan_error = match error.into_io_error() {
            Some(io_error) => ScanError::from_io(&path, io_error),
            // walkdir only reports non-I/O errors for symlink loops
            None => ScanError::Io {
                path,
                source: Arc::new(std::io::Error::other(message)),
            },
        };

        match &scan_error {
            ScanError::NotFound(p) => {
                log::debug!("File not found (may have been deleted): {}", p.display());
            }
            other => log::warn!("{}", other),
        }
        scan_error
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Whether a walk of `outer` visits `inner`.
///
/// With `skip_hidden` the outer walk prunes hidden entries, so a root below
/// a hidden directory is never reached from above.
fn reaches(outer: &Path, inner: &Path, skip_hidden: bool) -> bool {
    match inner.strip_prefix(outer) {
        Ok(rest) => {
            !(skip_hidden
                && rest
                    .components()
                    .any(|c| c.as_os_str().to_str().is_some_and(|n| n.starts_with('.'))))
        }
        Err(_) => false,
    }
}

/// Walker over several roots, in the order they were given.
///
/// Roots that do not exist are dropped up front and reported through
/// [`MultiWalker::missing`]. A root that is the same as, or nested inside,
/// another root is dropped too, so no file is yielded twice. A nested root
/// the outer walk would prune as hidden is kept.
#[derive(Debug)]
pub struct MultiWalker {
    walkers: Vec<Walker>,
    missing: Vec<ScanError>,
    follow_symlinks: bool,
}

impl MultiWalker {
    /// Validate `roots` and prepare one walker per surviving root.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, config: WalkerConfig) -> Self {
        let mut missing = Vec::new();
        let mut existing: Vec<(PathBuf, PathBuf)> = Vec::new();

        for root in roots {
            match fs::canonicalize(&root) {
                Ok(canonical) => existing.push((root, canonical)),
                Err(e) => {
                    log::warn!("Skipping {}: {}", root.display(), e);
                    missing.push(ScanError::from_io(&root, e));
                }
            }
        }

        let mut walkers = Vec::new();
        for (idx, (root, canonical)) in existing.iter().enumerate() {
            let covered = existing.iter().enumerate().any(|(other_idx, (_, other))| {
                if other_idx == idx {
                    return false;
                }
                if other == canonical {
                    // Identical roots: keep the first occurrence only
                    other_idx < idx
                } else {
                    reaches(other, canonical, config.skip_hidden)
                }
            });

            if covered {
                log::info!(
                    "Skipping {}: already covered by another root",
                    root.display()
                );
            } else {
                walkers.push(Walker::new(root, config.clone()));
            }
        }

        Self {
            walkers,
            missing,
            follow_symlinks: config.follow_symlinks,
        }
    }

    /// Set the shutdown flag on every walker.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.walkers = self
            .walkers
            .into_iter()
            .map(|w| w.with_shutdown_flag(Arc::clone(&flag)))
            .collect();
        self
    }

    /// Roots that will actually be walked.
    #[must_use]
    pub fn roots(&self) -> Vec<&Path> {
        self.walkers.iter().map(Walker::root).collect()
    }

    /// Errors for roots that could not be used.
    #[must_use]
    pub fn missing(&self) -> &[ScanError] {
        &self.missing
    }

    /// Walk every root in order.
    ///
    /// When symlinks are followed the same file can be reached through more
    /// than one path; only the first path to a given canonical file is
    /// yielded in that case.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileRecord, ScanError>> + '_ {
        let dedupe = self.follow_symlinks;
        let mut seen: HashSet<PathBuf> = HashSet::new();

        self.walkers
            .iter()
            .flat_map(|walker| walker.walk())
            .filter(move |result| match result {
                Ok(record) if dedupe => {
                    let key = fs::canonicalize(&record.path).unwrap_or_else(|_| record.path.clone());
                    let first = seen.insert(key);
                    if !first {
                        log::trace!("Skipping already seen file: {}", record.path.display());
                    }
                    first
                }
                _ => true,
            })
    }
}
