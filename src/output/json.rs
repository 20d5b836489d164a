//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "algorithm": "xxh64",
//!   "duplicates": [
//!     {
//!       "hash": "9f1c...",
//!       "size": 1024,
//!       "representative": "/data/a.txt",
//!       "duplicates": ["/data/b.txt"]
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 100,
//!     "total_size": 1048576,
//!     "duplicate_groups": 5,
//!     "duplicate_files": 10,
//!     "reclaimable_space": 51200,
//!     "scan_duration_ms": 1234,
//!     "exit_code": 0,
//!     "exit_code_name": "DF000"
//!   },
//!   "errors": []
//! }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use dupfunnel::duplicates::DuplicateFinder;
//! use dupfunnel::output::json::JsonOutput;
//! use dupfunnel::error::ExitCode;
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (set, summary) = finder.find_duplicates(&[PathBuf::from(".")]).unwrap();
//!
//! let output = JsonOutput::new("xxh64", &set, &summary, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::duplicates::{DuplicateEntry, DuplicateSet, ScanSummary};
use crate::error::ExitCode;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Full-content digest as lowercase hex
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// The first-discovered file of the group
    pub representative: String,
    /// Every other file of the group, in discovery order
    pub duplicates: Vec<String>,
}

impl JsonDuplicateGroup {
    /// Create a JSON duplicate group from a [`DuplicateEntry`].
    #[must_use]
    pub fn from_entry(entry: &DuplicateEntry) -> Self {
        Self {
            hash: entry.digest.to_hex(),
            size: entry.size,
            representative: path_string(&entry.representative.path),
            duplicates: entry
                .duplicates
                .iter()
                .map(|f| path_string(&f.path))
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Roots that were walked
    pub roots: Vec<String>,
    /// Total number of files recorded
    pub total_files: usize,
    /// Total size of all recorded files in bytes
    pub total_size: u64,
    /// Files ruled out because their size was unique
    pub eliminated_by_size: usize,
    /// Files ruled out by the first-kilobyte hash
    pub eliminated_by_prehash: usize,
    /// Files ruled out by the full-content hash
    pub eliminated_by_fullhash: usize,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding representatives)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates (bytes)
    pub reclaimable_space: u64,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DF000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a [`ScanSummary`] and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            roots: summary.roots.iter().map(|p| path_string(p)).collect(),
            total_files: summary.total_files,
            total_size: summary.total_size,
            eliminated_by_size: summary.eliminated_by_size,
            eliminated_by_prehash: summary.eliminated_by_prehash,
            eliminated_by_fullhash: summary.eliminated_by_fullhash,
            bytes_hashed: summary.bytes_hashed,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Name of the hash algorithm used
    pub algorithm: String,
    /// List of duplicate groups
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Scan summary statistics
    pub summary: JsonSummary,
    /// Non-fatal errors, one message per skipped file or root
    pub errors: Vec<String>,
}

impl JsonOutput {
    /// Create a new JSON output from a duplicate set, summary and exit code.
    ///
    /// # Example
    ///
    /// ```
    /// use dupfunnel::duplicates::{DuplicateSet, ScanSummary};
    /// use dupfunnel::output::json::JsonOutput;
    /// use dupfunnel::error::ExitCode;
    ///
    /// let output = JsonOutput::new(
    ///     "xxh64",
    ///     &DuplicateSet::default(),
    ///     &ScanSummary::default(),
    ///     ExitCode::NoDuplicates,
    /// );
    /// assert!(output.duplicates.is_empty());
    /// assert_eq!(output.summary.exit_code, 2);
    /// ```
    #[must_use]
    pub fn new(
        algorithm: &str,
        set: &DuplicateSet,
        summary: &ScanSummary,
        exit_code: ExitCode,
    ) -> Self {
        Self {
            algorithm: algorithm.to_string(),
            duplicates: set.iter().map(JsonDuplicateGroup::from_entry).collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
            errors: summary.errors.iter().map(ToString::to_string).collect(),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
