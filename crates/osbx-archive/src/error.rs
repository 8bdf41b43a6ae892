use std::io;
use std::path::PathBuf;

/// Failure of the extraction stage. Any variant aborts the whole run and
/// may leave a partially populated destination behind.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("archive cannot be read: {0}")]
    Unreadable(#[source] zip::result::ZipError),

    #[error("entry #{index} cannot be read: {source}")]
    CorruptedEntry {
        index: usize,
        source: zip::result::ZipError,
    },

    #[error("entry path is not a safe relative path: '{entry}'")]
    InvalidPath { entry: String },

    #[error("zip-slip attack detected: entry '{entry}' resolves to '{resolved}'")]
    ZipSlip { entry: PathBuf, resolved: PathBuf },

    #[error("failed to create directory: {path}: {source}")]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    #[error("failed to open '{path}' for writing: {source}")]
    FileCreationFailed { path: PathBuf, source: io::Error },

    #[error("failed to extract '{path}': {source}")]
    ExtractionFailed { path: PathBuf, source: io::Error },
}

pub type Result<T> = std::result::Result<T, Error>;
