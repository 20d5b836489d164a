//! Human-readable output for duplicate scan results.
//!
//! Each group starts with a header naming its digest and size, followed by
//! one line per duplicate:
//!
//! ```text
//! 2cf24dba5fb0a30e (5 B, 2 files)
//!   /data/b.txt duplicate of /data/a.txt
//! ```
//!
//! An empty set prints `No duplicate files found.` instead.

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::{Paint, Style};

use crate::duplicates::{DuplicateEntry, DuplicateSet, ScanSummary};

/// Message printed when a scan finds nothing.
pub const NO_DUPLICATES_MESSAGE: &str = "No duplicate files found.";

const HEADER: Style = Style::new().cyan().bold();
const PATH: Style = Style::new().green();
const DIM: Style = Style::new().dim();
const WARNING: Style = Style::new().yellow();

/// Plain text formatter.
pub struct TextOutput<'a> {
    set: &'a DuplicateSet,
    summary: Option<&'a ScanSummary>,
    color: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a formatter for `set` without colours or summary.
    #[must_use]
    pub fn new(set: &'a DuplicateSet) -> Self {
        Self {
            set,
            summary: None,
            color: false,
        }
    }

    /// Enable or disable ANSI colours.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Append a summary block after the groups.
    #[must_use]
    pub fn with_summary(mut self, summary: &'a ScanSummary) -> Self {
        self.summary = Some(summary);
        self
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.color {
            text.paint(style).to_string()
        } else {
            text.to_string()
        }
    }

    /// Write the report to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if self.set.is_empty() {
            writeln!(writer, "{NO_DUPLICATES_MESSAGE}")?;
        }

        for (idx, entry) in self.set.iter().enumerate() {
            if idx > 0 {
                writeln!(writer)?;
            }
            self.write_entry(writer, entry)?;
        }

        if let Some(summary) = self.summary {
            self.write_summary(writer, summary)?;
        }
        Ok(())
    }

    fn write_entry<W: Write>(&self, writer: &mut W, entry: &DuplicateEntry) -> io::Result<()> {
        let header = format!(
            "{} ({}, {} files)",
            entry.digest,
            ByteSize::b(entry.size),
            entry.len()
        );
        writeln!(writer, "{}", self.paint(&header, HEADER))?;

        let representative = entry.representative.path.display().to_string();
        for dup in &entry.duplicates {
            writeln!(
                writer,
                "  {} {} {}",
                self.paint(&dup.path.display().to_string(), PATH),
                self.paint("duplicate of", DIM),
                representative
            )?;
        }
        Ok(())
    }

    fn write_summary<W: Write>(&self, writer: &mut W, summary: &ScanSummary) -> io::Result<()> {
        writeln!(writer)?;
        writeln!(
            writer,
            "Scanned {} files ({}) in {:.2}s",
            summary.total_files,
            summary.total_size_display(),
            summary.scan_duration.as_secs_f64()
        )?;
        writeln!(
            writer,
            "Eliminated: {} by size, {} by first KiB, {} by full content",
            summary.eliminated_by_size,
            summary.eliminated_by_prehash,
            summary.eliminated_by_fullhash
        )?;
        writeln!(
            writer,
            "{} duplicate groups, {} duplicate files, {} reclaimable ({:.1}% of scanned)",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display(),
            summary.wasted_percentage()
        )?;
        if summary.has_errors() {
            let line = format!("{} file(s) skipped due to errors", summary.errors.len());
            writeln!(writer, "{}", self.paint(&line, WARNING))?;
        }
        Ok(())
    }
}
