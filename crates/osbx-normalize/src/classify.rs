//! Classification of extracted files: sentinel deletion and renaming by
//! resource type.
//!
//! Each file is handled independently of its siblings. The file list is
//! taken before anything is touched, so renamed files are never visited
//! twice.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use osbx_fs::FileWalk;
use tracing::{debug, info, warn};

use crate::registry::ExtensionRegistry;

/// Base name of the export metadata file.
pub const EXPORT_INFO: &str = "ExportInfo";
/// Extension of the per-folder location metadata files.
pub const LOCATION_DATA: &str = "LocationData";

#[derive(Debug, thiserror::Error)]
#[error("failed to rename '{from}' to '{to}': {source}")]
pub struct FileOperationError {
    pub from: PathBuf,
    pub to: PathBuf,
    pub source: io::Error,
}

#[derive(Debug)]
pub enum FileOutcome {
    Renamed { from: PathBuf, to: PathBuf },
    Deleted { path: PathBuf },
    SkippedUnknown { path: PathBuf, extension: String },
    DeleteFailed { path: PathBuf, source: io::Error },
    RenameFailed(FileOperationError),
}

impl FileOutcome {
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::SkippedUnknown { .. } | Self::DeleteFailed { .. } | Self::RenameFailed(_)
        )
    }
}

#[derive(Debug, Default)]
pub struct ProcessingReport {
    pub outcomes: Vec<FileOutcome>,
    /// Parts of the tree that could not be listed.
    pub walk_errors: Vec<osbx_fs::Error>,
}

impl ProcessingReport {
    /// New paths of every renamed file.
    pub fn renamed(&self) -> impl Iterator<Item = &Path> {
        self.outcomes.iter().filter_map(|o| match o {
            FileOutcome::Renamed { to, .. } => Some(to.as_path()),
            _ => None,
        })
    }

    pub fn renamed_count(&self) -> usize {
        self.renamed().count()
    }

    pub fn deleted_count(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Deleted { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::SkippedUnknown { .. }))
    }

    pub fn warning_count(&self) -> usize {
        self.count(FileOutcome::is_warning) + self.walk_errors.len()
    }

    fn count(&self, predicate: impl Fn(&FileOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(o)).count()
    }
}

/// Text after the last `.` of `name`; empty when there is no `.` or the
/// only `.` starts the name.
pub fn file_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(i) if i > 0 => &name[i + 1..],
        _ => "",
    }
}

fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(i) if i > 0 => &name[..i],
        _ => name,
    }
}

/// Metadata files produced by the export format.
pub fn is_sentinel(name: &str) -> bool {
    file_stem(name) == EXPORT_INFO || file_extension(name) == LOCATION_DATA
}

/// `name` with its extension replaced by `extension`, or with `extension`
/// appended when there is no `.` at all.
pub fn renamed_file_name(name: &str, extension: &str) -> String {
    match name.rfind('.') {
        Some(i) => format!("{}.{}", &name[..i], extension),
        None => format!("{name}.{extension}"),
    }
}

pub struct Classifier<'r> {
    registry: &'r ExtensionRegistry,
}

impl<'r> Classifier<'r> {
    pub fn new(registry: &'r ExtensionRegistry) -> Self {
        Self { registry }
    }

    /// Classify every regular file below `root`.
    pub fn process_tree(&self, root: impl AsRef<Path>) -> ProcessingReport {
        let mut walk_errors = Vec::new();
        let files: Vec<PathBuf> = FileWalk::new(root.as_ref())
            .iter()
            .filter_map(|f| f.map_err(|e| walk_errors.push(e)).ok())
            .collect();

        for err in &walk_errors {
            warn!("{err}");
        }

        let mut report = self.process_paths(files);
        report.walk_errors = walk_errors;
        report
    }

    /// Classify the given file paths, in order.
    pub fn process_paths<I>(&self, paths: I) -> ProcessingReport
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let outcomes: Vec<FileOutcome> = paths.into_iter().map(|p| self.classify_file(p)).collect();
        let report = ProcessingReport {
            outcomes,
            walk_errors: Vec::new(),
        };

        info!(
            renamed = report.renamed_count(),
            deleted = report.deleted_count(),
            skipped = report.skipped_count(),
            warnings = report.warning_count(),
            "files classified"
        );
        report
    }

    pub fn classify_file(&self, path: PathBuf) -> FileOutcome {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            debug!(path = %path.display(), "skipping file with a non UTF-8 name");
            return FileOutcome::SkippedUnknown {
                path,
                extension: String::new(),
            };
        };

        if is_sentinel(name) {
            return match fs::remove_file(&path) {
                Ok(()) => {
                    debug!(path = %path.display(), "deleted export metadata");
                    FileOutcome::Deleted { path }
                }
                Err(source) => {
                    warn!(path = %path.display(), error = %source, "failed to delete export metadata");
                    FileOutcome::DeleteFailed { path, source }
                }
            };
        }

        let extension = file_extension(name);
        let Some(destination) = self.registry.destination(extension) else {
            debug!(path = %path.display(), extension, "unsupported extension, skipping");
            return FileOutcome::SkippedUnknown {
                extension: extension.to_string(),
                path,
            };
        };

        let to = path.with_file_name(renamed_file_name(name, destination));
        match fs::rename(&path, &to) {
            Ok(()) => {
                debug!(from = %path.display(), to = %to.display(), "renamed");
                FileOutcome::Renamed { from: path, to }
            }
            Err(source) => {
                let error = FileOperationError {
                    from: path,
                    to,
                    source,
                };
                warn!("{error}");
                FileOutcome::RenameFailed(error)
            }
        }
    }
}
