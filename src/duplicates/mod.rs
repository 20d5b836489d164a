//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - Prehash comparison (Phase 2)
//! - Full hash comparison (Phase 3)
//! - Duplicate set assembly

pub mod finder;
pub mod groups;

pub use finder::{
    phase1_size_index, phase2_prehash, phase3_fullhash, DuplicateFinder, FinderConfig,
    FinderError, PhaseStats, ScanSummary, DEFAULT_IO_THREADS,
};
pub use groups::{
    group_by_size, Bucket, Buckets, DigestKey, DuplicateEntry, DuplicateSet, FullHashGroups,
    GroupingStats, PartialHashGroups, SizeGroups,
};
