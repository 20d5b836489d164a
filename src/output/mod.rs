//! Output formatters for duplicate scan results.
//!
//! This module provides two output formats for scan results:
//! - Plain text for people, one `duplicate of` line per duplicate
//! - JSON for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use dupfunnel::duplicates::DuplicateFinder;
//! use dupfunnel::output::text::TextOutput;
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (set, summary) = finder.find_duplicates(&[PathBuf::from(".")]).unwrap();
//!
//! let output = TextOutput::new(&set).with_summary(&summary);
//! output.write_to(&mut std::io::stdout()).unwrap();
//! ```

pub mod json;
pub mod text;

pub use json::JsonOutput;
pub use text::TextOutput;
