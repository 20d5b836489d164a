//! Bucket collections for every stage of the funnel.
//!
//! # Overview
//!
//! Each stage of duplicate detection produces a [`Buckets`] collection: an
//! arena of buckets kept in first-seen order plus an index from key to
//! bucket. Stage outputs are built once and only read afterwards.
//!
//! - [`SizeGroups`]: every recorded file, keyed by byte size
//! - [`PartialHashGroups`]: candidates keyed by size and prefix digest
//! - [`FullHashGroups`]: candidates keyed by size and full digest
//! - [`DuplicateSet`]: representative plus duplicates, the final result
//!
//! # Example
//!
//! ```
//! use dupfunnel::scanner::FileRecord;
//! use dupfunnel::duplicates::group_by_size;
//!
//! let files = vec![
//!     FileRecord::new("/file1.txt", 1024),
//!     FileRecord::new("/file2.txt", 1024),
//!     FileRecord::new("/file3.txt", 2048),
//! ];
//!
//! let (groups, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(groups.len(), 2);
//! assert_eq!(groups.candidates().count(), 1);
//! ```

use std::collections::HashMap;
use std::hash::Hash;
use std::path::Path;

use serde::Serialize;

use crate::scanner::{Digest, FileRecord};

/// Files sharing one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket<K> {
    /// The shared key
    pub key: K,
    /// Members in the order they were added
    pub files: Vec<FileRecord>,
}

impl<K> Bucket<K> {
    /// Number of files in this bucket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if this bucket can still hold duplicates (2+ files).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.files.len() > 1
    }
}

/// Ordered collection of buckets.
///
/// Buckets appear in the order their key was first seen, and files within a
/// bucket in the order they were added, so iteration is deterministic for a
/// deterministic input.
#[derive(Debug, Clone)]
pub struct Buckets<K> {
    index: HashMap<K, usize>,
    buckets: Vec<Bucket<K>>,
}

impl<K> Default for Buckets<K> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            buckets: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> Buckets<K> {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, key: K, file: FileRecord) {
        match self.index.get(&key) {
            Some(&idx) => self.buckets[idx].files.push(file),
            None => {
                self.index.insert(key.clone(), self.buckets.len());
                self.buckets.push(Bucket {
                    key,
                    files: vec![file],
                });
            }
        }
    }

    /// Look up a bucket by key.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&Bucket<K>> {
        self.index.get(key).map(|&idx| &self.buckets[idx])
    }

    /// Drop every bucket with a single member.
    #[must_use]
    pub fn into_candidates(self) -> Self {
        self.buckets
            .into_iter()
            .filter(Bucket::has_duplicates)
            .flat_map(|bucket| {
                let key = bucket.key;
                bucket.files.into_iter().map(move |f| (key.clone(), f))
            })
            .collect()
    }
}

impl<K> Buckets<K> {
    /// Number of buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Check if there are no buckets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Iterate over all buckets in first-seen order.
    pub fn iter(&self) -> std::slice::Iter<'_, Bucket<K>> {
        self.buckets.iter()
    }

    /// Iterate over buckets with 2+ members.
    pub fn candidates(&self) -> impl Iterator<Item = &Bucket<K>> {
        self.buckets.iter().filter(|b| b.has_duplicates())
    }

    /// Total number of files across all buckets.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.buckets.iter().map(Bucket::len).sum()
    }
}

impl<K: Eq + Hash + Clone> FromIterator<(K, FileRecord)> for Buckets<K> {
    fn from_iter<I: IntoIterator<Item = (K, FileRecord)>>(iter: I) -> Self {
        let mut buckets = Self::new();
        for (key, file) in iter {
            buckets.push(key, file);
        }
        buckets
    }
}

impl<'a, K> IntoIterator for &'a Buckets<K> {
    type Item = &'a Bucket<K>;
    type IntoIter = std::slice::Iter<'a, Bucket<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}

/// Key for hash-stage buckets.
///
/// The size is part of the key so files from different size groups never
/// share a bucket, even if their digests collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DigestKey {
    /// File size in bytes
    pub size: u64,
    /// Prefix or full-content digest
    pub digest: Digest,
}

/// Stage 1 output: every recorded file keyed by size.
pub type SizeGroups = Buckets<u64>;

/// Stage 2 output: size-group candidates keyed by prefix digest.
pub type PartialHashGroups = Buckets<DigestKey>;

/// Stage 3 output: prefix-hash candidates keyed by full digest.
pub type FullHashGroups = Buckets<DigestKey>;

/// Statistics from size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton groups)
    pub eliminated_unique: usize,
    /// Number of size groups with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by size (Phase 1 of duplicate detection).
///
/// Unlike later stages, the result keeps singleton buckets: every input file
/// lands in exactly one bucket. Use [`Buckets::candidates`] to see the
/// buckets that go on to prefix hashing.
///
/// # Example
///
/// ```
/// use dupfunnel::scanner::FileRecord;
/// use dupfunnel::duplicates::group_by_size;
///
/// let files = vec![
///     FileRecord::new("/a.txt", 100),
///     FileRecord::new("/b.txt", 100),
///     FileRecord::new("/c.txt", 200),
/// ];
///
/// let (groups, stats) = group_by_size(files);
///
/// assert_eq!(groups.get(&100).unwrap().len(), 2);
/// assert_eq!(stats.eliminated_unique, 1);
/// ```
#[must_use]
pub fn group_by_size(files: impl IntoIterator<Item = FileRecord>) -> (SizeGroups, GroupingStats) {
    let mut stats = GroupingStats::default();

    let groups: SizeGroups = files
        .into_iter()
        .map(|file| {
            stats.total_files += 1;
            stats.total_size += file.size;
            (file.size, file)
        })
        .collect();

    stats.unique_sizes = groups.len();
    for bucket in &groups {
        if bucket.has_duplicates() {
            stats.potential_duplicates += bucket.len();
            stats.duplicate_groups += 1;
            log::debug!(
                "Size group {} bytes: {} potential duplicates",
                bucket.key,
                bucket.len()
            );
        } else {
            stats.eliminated_unique += 1;
        }
    }

    log::info!(
        "Phase 1 complete: {} files → {} potential duplicates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (groups, stats)
}

/// One confirmed group of identical files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateEntry {
    /// First file of the group in discovery order
    pub representative: FileRecord,
    /// Every other member, in discovery order
    pub duplicates: Vec<FileRecord>,
    /// Shared full-content digest
    pub digest: Digest,
    /// Shared file size in bytes
    pub size: u64,
}

impl DuplicateEntry {
    /// Number of files including the representative.
    #[must_use]
    pub fn len(&self) -> usize {
        self.duplicates.len() + 1
    }

    /// Always false; an entry has at least its representative.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Space taken by the copies beyond the representative.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicates.len() as u64
    }

    /// All member paths, representative first.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.representative.path.as_path())
            .chain(self.duplicates.iter().map(|f| f.path.as_path()))
    }
}

/// Final result of a scan: representative → duplicates.
///
/// An empty set means no duplicates were found; there is no such thing as
/// an entry without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateSet {
    entries: Vec<DuplicateEntry>,
}

impl DuplicateSet {
    /// Collate full-hash buckets with 2+ members into duplicate entries.
    ///
    /// The first member of each bucket becomes the representative.
    #[must_use]
    pub fn from_full_hash_groups(groups: &FullHashGroups) -> Self {
        let entries = groups
            .candidates()
            .filter_map(|bucket| {
                let (representative, duplicates) = bucket.files.split_first()?;
                Some(DuplicateEntry {
                    representative: representative.clone(),
                    duplicates: duplicates.to_vec(),
                    digest: bucket.key.digest.clone(),
                    size: bucket.key.size,
                })
            })
            .collect();
        Self { entries }
    }

    /// True when no duplicates were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of duplicate groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over entries in discovery order of their representatives.
    pub fn iter(&self) -> std::slice::Iter<'_, DuplicateEntry> {
        self.entries.iter()
    }

    /// Find the entry whose representative is `path`.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&DuplicateEntry> {
        self.entries
            .iter()
            .find(|entry| entry.representative.path == path)
    }

    /// Find the entry containing `path` in any position.
    #[must_use]
    pub fn group_of(&self, path: &Path) -> Option<&DuplicateEntry> {
        self.entries
            .iter()
            .find(|entry| entry.paths().any(|p| p == path))
    }

    /// Total number of duplicate files (excluding representatives).
    #[must_use]
    pub fn duplicate_files(&self) -> usize {
        self.entries.iter().map(|e| e.duplicates.len()).sum()
    }

    /// Total space that removing every duplicate would free.
    #[must_use]
    pub fn reclaimable_space(&self) -> u64 {
        self.entries.iter().map(DuplicateEntry::wasted_space).sum()
    }
}

impl<'a> IntoIterator for &'a DuplicateSet {
    type Item = &'a DuplicateEntry;
    type IntoIter = std::slice::Iter<'a, DuplicateEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
