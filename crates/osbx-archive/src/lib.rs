//! Extraction of exported configuration archives into a staging tree.
//!
//! # Architecture
//!
//! - `entry.rs` - Entry metadata and the extraction report
//! - `extract.rs` - Sequential extraction over an [`EntrySource`]
//! - `sanitize.rs` - Entry path resolution (zip-slip prevention)
//! - `error.rs` - Extraction failures

pub use entry::{ArchiveEntry, EntryKind, ExtractionReport};
pub use error::{Error, Result};
pub use extract::{EntrySource, PendingEntry, PendingKind, ZipSource, extract, extract_bytes};

pub mod entry;
pub mod extract;
mod error;
mod sanitize;
