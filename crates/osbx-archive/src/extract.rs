//! Sequential, byte-exact extraction into a destination tree.
//!
//! Entries are written in the order their source yields them. The first
//! failure aborts the whole extraction; whatever was already written stays
//! on disk and is the caller's to discard.

use std::fs;
use std::io::{self, BufWriter, Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::entry::{ArchiveEntry, EntryKind, ExtractionReport};
use crate::error::{Error, Result};
use crate::sanitize::resolve_entry_path;

/// An entry read from the archive but not yet written.
pub struct PendingEntry<'a> {
    pub path: PathBuf,
    pub kind: PendingKind<'a>,
}

pub enum PendingKind<'a> {
    Directory,
    /// Payload stream of a file entry. It may deliver the payload in any
    /// number of reads.
    File(Box<dyn Read + 'a>),
}

/// Archive-specific entry source.
pub trait EntrySource {
    fn next_entry(&mut self) -> Option<Result<PendingEntry<'_>>>;
}

/// ZIP (and JAR) entries, in central directory order.
pub struct ZipSource<R: Read + Seek> {
    archive: zip::ZipArchive<R>,
    index: usize,
}

impl<R: Read + Seek> ZipSource<R> {
    pub fn new(reader: R) -> Result<Self> {
        let archive = zip::ZipArchive::new(reader).map_err(Error::Unreadable)?;
        Ok(Self { archive, index: 0 })
    }
}

impl<R: Read + Seek> EntrySource for ZipSource<R> {
    fn next_entry(&mut self) -> Option<Result<PendingEntry<'_>>> {
        if self.index >= self.archive.len() {
            return None;
        }

        let index = self.index;
        self.index += 1;

        let file = match self.archive.by_index(index) {
            Ok(f) => f,
            Err(source) => return Some(Err(Error::CorruptedEntry { index, source })),
        };

        let path = match file.enclosed_name() {
            Some(p) => p.to_path_buf(),
            None => {
                return Some(Err(Error::InvalidPath {
                    entry: file.name().to_string(),
                }));
            }
        };
        let kind = if file.is_dir() {
            PendingKind::Directory
        } else {
            PendingKind::File(Box::new(file))
        };

        Some(Ok(PendingEntry { path, kind }))
    }
}

/// Write every entry of `source` below `destination`.
///
/// Directories are created with any missing parents and may already exist.
/// Files get their missing parents created and replace whatever file was at
/// the target path.
pub fn extract<S: EntrySource>(
    source: &mut S,
    destination: impl AsRef<Path>,
) -> Result<ExtractionReport> {
    let destination = destination.as_ref();
    let mut report = ExtractionReport::default();

    while let Some(pending) = source.next_entry() {
        let PendingEntry { path, kind } = pending?;
        let target = resolve_entry_path(&path, destination)?;

        let (kind, size) = match kind {
            PendingKind::Directory => {
                ensure_directory(&target)?;
                (EntryKind::Directory, 0)
            }
            PendingKind::File(mut reader) => {
                let written = write_file(&mut reader, &target)?;
                (EntryKind::File, written)
            }
        };

        debug!(entry = %path.display(), bytes = size, "extracted");
        report.record(ArchiveEntry::new(path, target, size, kind));
    }

    Ok(report)
}

/// Extract an in-memory ZIP archive below `destination`.
pub fn extract_bytes(archive: &[u8], destination: impl AsRef<Path>) -> Result<ExtractionReport> {
    let destination = destination.as_ref();
    let mut source = ZipSource::new(Cursor::new(archive))?;
    let report = extract(&mut source, destination)?;

    info!(
        files = report.file_count(),
        directories = report.directory_count(),
        bytes = report.total_bytes,
        destination = %destination.display(),
        "archive extracted"
    );
    Ok(report)
}

fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::DirectoryCreationFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_file(reader: &mut dyn Read, target_path: &Path) -> Result<u64> {
    if let Some(parent) = target_path.parent() {
        if !parent.is_dir() {
            ensure_directory(parent)?;
        }
    }

    let file = fs::File::create(target_path).map_err(|e| Error::FileCreationFailed {
        path: target_path.to_path_buf(),
        source: e,
    })?;

    let mut writer = BufWriter::new(file);
    let copied = io::copy(reader, &mut writer)
        .and_then(|n| writer.flush().map(|_| n))
        .map_err(|e| Error::ExtractionFailed {
            path: target_path.to_path_buf(),
            source: e,
        })?;

    Ok(copied)
}
