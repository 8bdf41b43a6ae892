//! Sources of raw project archives.

use std::io;
use std::path::PathBuf;

use tracing::debug;

/// How secret values inside the exported resources are protected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncryptionScope {
    #[default]
    None,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportRequest {
    pub include_dependencies: bool,
    pub encryption: EncryptionScope,
}

impl Default for ExportRequest {
    fn default() -> Self {
        Self {
            include_dependencies: true,
            encryption: EncryptionScope::None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("failed to read archive '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("archive '{path}' is empty")]
    Empty { path: PathBuf },
}

/// Produces the packaged archive of a project, dependencies included.
pub trait ArchiveProvider {
    fn export_archive(&self, project: &str, request: &ExportRequest) -> Result<Vec<u8>, ProviderError>;
}

/// An archive already exported to disk, for instance from the management
/// console.
pub struct FileArchiveProvider {
    path: PathBuf,
}

impl FileArchiveProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ArchiveProvider for FileArchiveProvider {
    fn export_archive(&self, project: &str, request: &ExportRequest) -> Result<Vec<u8>, ProviderError> {
        debug!(
            project,
            archive = %self.path.display(),
            include_dependencies = request.include_dependencies,
            encryption = ?request.encryption,
            "reading exported archive"
        );

        let bytes = std::fs::read(&self.path).map_err(|source| ProviderError::Read {
            path: self.path.clone(),
            source,
        })?;
        if bytes.is_empty() {
            return Err(ProviderError::Empty {
                path: self.path.clone(),
            });
        }
        Ok(bytes)
    }
}
