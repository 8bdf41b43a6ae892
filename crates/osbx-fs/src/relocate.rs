//! Merge a staging tree into a final tree, then remove the staging tree.
//!
//! Every path is handled on its own: a failure is recorded in the
//! [`RelocationReport`] and the remaining paths are still processed.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::primitives::move_file::rename_or_copy;

/// Non-fatal conditions met while relocating.
#[derive(Debug, thiserror::Error)]
pub enum RelocationWarning {
    #[error("'{path}' disappeared before it could be relocated")]
    MissingSource { path: PathBuf },

    #[error("staging tree could not be fully listed: {source}")]
    WalkFailed { source: walkdir::Error },

    #[error("failed to remove '{path}' from staging: {source}")]
    CleanupFailed { path: PathBuf, source: io::Error },
}

/// A path that could not be carried over into the final tree.
#[derive(Debug, thiserror::Error)]
pub enum RelocationError {
    #[error("failed to inspect '{path}': {source}")]
    Inspect { path: PathBuf, source: io::Error },

    #[error("failed to create directory '{path}': {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to move '{from}' to '{to}': {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

#[derive(Debug, Default)]
pub struct RelocationReport {
    /// Files moved, relative to both roots.
    pub moved: Vec<PathBuf>,
    pub directories: usize,
    pub warnings: Vec<RelocationWarning>,
    pub errors: Vec<RelocationError>,
    pub staging_removed: bool,
}

impl RelocationReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty() && self.staging_removed
    }

    fn warn(&mut self, warning: RelocationWarning) {
        warn!("{warning}");
        self.warnings.push(warning);
    }

    fn fail(&mut self, error: RelocationError) {
        warn!("{error}");
        self.errors.push(error);
    }
}

/// Move everything below `staging_root` to the same relative location below
/// `final_root`, overwriting files that already exist there, then delete
/// `staging_root`.
///
/// Content of `final_root` that does not overlap with the staging tree is
/// left alone.
pub fn relocate(staging_root: impl AsRef<Path>, final_root: impl AsRef<Path>) -> RelocationReport {
    let staging_root = staging_root.as_ref();
    let mut walk_warnings = Vec::new();

    // Pre-order: a directory always comes before its contents.
    let mut paths = Vec::new();
    for entry in WalkDir::new(staging_root).min_depth(1).sort_by_file_name() {
        match entry {
            Ok(entry) => paths.push(entry.into_path()),
            Err(source) => {
                let warning = RelocationWarning::WalkFailed { source };
                warn!("{warning}");
                walk_warnings.push(warning);
            }
        }
    }

    let mut report = relocate_paths(staging_root, final_root, paths);
    walk_warnings.append(&mut report.warnings);
    report.warnings = walk_warnings;
    report
}

/// [`relocate`] over an already listed set of paths below `staging_root`,
/// parents before their descendants.
///
/// Listed paths that are gone by the time they are visited are skipped with
/// a warning. Anything below `staging_root` that was not listed is removed
/// with it.
pub fn relocate_paths<I>(
    staging_root: impl AsRef<Path>,
    final_root: impl AsRef<Path>,
    paths: I,
) -> RelocationReport
where
    I: IntoIterator<Item = PathBuf>,
{
    let staging_root = staging_root.as_ref();
    let final_root = final_root.as_ref();
    let paths: Vec<PathBuf> = paths.into_iter().collect();
    let mut report = RelocationReport::default();

    if let Err(source) = fs::create_dir_all(final_root) {
        report.fail(RelocationError::CreateDir {
            path: final_root.to_path_buf(),
            source,
        });
    }

    for path in &paths {
        let Ok(relative) = path.strip_prefix(staging_root) else {
            continue;
        };
        let target = final_root.join(relative);

        let metadata = match fs::symlink_metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                report.warn(RelocationWarning::MissingSource { path: path.clone() });
                continue;
            }
            Err(source) => {
                report.fail(RelocationError::Inspect {
                    path: path.clone(),
                    source,
                });
                continue;
            }
        };

        if metadata.is_dir() {
            match fs::create_dir_all(&target) {
                Ok(()) => report.directories += 1,
                Err(source) => report.fail(RelocationError::CreateDir {
                    path: target,
                    source,
                }),
            }
            continue;
        }

        match rename_or_copy(path, &target) {
            Ok(()) => {
                debug!(path = %relative.display(), "relocated");
                report.moved.push(relative.to_path_buf());
            }
            Err(source) => report.fail(RelocationError::Move {
                from: path.clone(),
                to: target,
                source,
            }),
        }
    }

    // Deepest first, so directories are empty by the time they are removed.
    for path in paths.iter().rev() {
        let removed = match fs::symlink_metadata(path) {
            Ok(m) if m.is_dir() => fs::remove_dir(path),
            Ok(_) => fs::remove_file(path),
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => Err(e),
        };
        if let Err(source) = removed {
            report.warn(RelocationWarning::CleanupFailed {
                path: path.clone(),
                source,
            });
        }
    }

    match fs::remove_dir_all(staging_root) {
        Ok(()) => report.staging_removed = true,
        Err(e) if e.kind() == ErrorKind::NotFound => report.staging_removed = true,
        Err(source) => report.warn(RelocationWarning::CleanupFailed {
            path: staging_root.to_path_buf(),
            source,
        }),
    }

    info!(
        moved = report.moved.len(),
        directories = report.directories,
        warnings = report.warnings.len(),
        errors = report.errors.len(),
        destination = %final_root.display(),
        "staging tree relocated"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn merges_into_existing_tree() {
        let dir = tempdir().unwrap();
        let staging = dir.path().join("staging");
        let dest = dir.path().join("dest");
        fs::create_dir_all(staging.join("proj/sub")).unwrap();
        fs::write(staging.join("proj/a.xqy"), "new").unwrap();
        fs::write(staging.join("proj/sub/b.xsd"), "B").unwrap();
        fs::create_dir_all(dest.join("proj")).unwrap();
        fs::write(dest.join("proj/a.xqy"), "old").unwrap();
        fs::write(dest.join("proj/unrelated.txt"), "keep").unwrap();

        let report = relocate(&staging, &dest);

        assert!(report.is_clean(), "{report:?}");
        assert_eq!(report.moved.len(), 2);
        assert_eq!(report.directories, 2);
        assert!(!staging.exists());
        assert_eq!(fs::read(dest.join("proj/a.xqy")).unwrap(), b"new");
        assert_eq!(fs::read(dest.join("proj/sub/b.xsd")).unwrap(), b"B");
        assert_eq!(fs::read(dest.join("proj/unrelated.txt")).unwrap(), b"keep");
    }

    #[test]
    fn creates_missing_final_root() {
        let dir = tempdir().unwrap();
        let staging = dir.path().join("staging");
        let dest = dir.path().join("a/b/dest");
        fs::create_dir_all(&staging).unwrap();
        fs::write(staging.join("x.wsdl"), "W").unwrap();

        let report = relocate(&staging, &dest);

        assert!(report.is_clean());
        assert_eq!(fs::read(dest.join("x.wsdl")).unwrap(), b"W");
    }

    #[test]
    fn empty_directories_are_carried_over() {
        let dir = tempdir().unwrap();
        let staging = dir.path().join("staging");
        let dest = dir.path().join("dest");
        fs::create_dir_all(staging.join("proj/empty")).unwrap();

        let report = relocate(&staging, &dest);

        assert!(report.is_clean());
        assert!(dest.join("proj/empty").is_dir());
        assert!(report.moved.is_empty());
    }

    #[test]
    fn file_blocked_by_directory_is_reported() {
        let dir = tempdir().unwrap();
        let staging = dir.path().join("staging");
        let dest = dir.path().join("dest");
        fs::create_dir_all(&staging).unwrap();
        fs::write(staging.join("clash"), "file").unwrap();
        fs::write(staging.join("other.xml"), "ok").unwrap();
        fs::create_dir_all(dest.join("clash/inner")).unwrap();

        let report = relocate(&staging, &dest);

        assert_eq!(report.errors.len(), 1);
        assert!(matches!(report.errors[0], RelocationError::Move { .. }));
        assert_eq!(report.moved, vec![PathBuf::from("other.xml")]);
        assert!(!staging.exists());
        assert!(dest.join("clash/inner").is_dir());
    }

    #[test]
    fn vanished_path_is_a_warning() {
        let dir = tempdir().unwrap();
        let staging = dir.path().join("staging");
        let dest = dir.path().join("dest");
        fs::create_dir_all(&staging).unwrap();
        fs::write(staging.join("kept.xml"), "K").unwrap();

        let report = relocate_paths(
            &staging,
            &dest,
            vec![staging.join("gone.xqy"), staging.join("kept.xml")],
        );

        assert!(report.errors.is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert!(matches!(
            &report.warnings[0],
            RelocationWarning::MissingSource { path } if *path == staging.join("gone.xqy")
        ));
        assert_eq!(report.moved, vec![PathBuf::from("kept.xml")]);
        assert!(!dest.join("gone.xqy").exists());
        assert!(report.staging_removed);
    }

    #[test]
    fn cleanup_failure_is_a_warning() {
        let dir = tempdir().unwrap();
        let staging = dir.path().join("staging");
        let dest = dir.path().join("dest");
        fs::create_dir_all(staging.join("proj")).unwrap();
        fs::write(staging.join("proj/a.xqy"), "A").unwrap();
        // Appeared after listing, so `proj` is not empty at cleanup time.
        fs::write(staging.join("proj/late.xml"), "L").unwrap();

        let report = relocate_paths(
            &staging,
            &dest,
            vec![staging.join("proj"), staging.join("proj/a.xqy")],
        );

        assert!(report.errors.is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert!(matches!(
            &report.warnings[0],
            RelocationWarning::CleanupFailed { path, .. } if *path == staging.join("proj")
        ));
        assert_eq!(fs::read(dest.join("proj/a.xqy")).unwrap(), b"A");
        assert!(!dest.join("proj/late.xml").exists());
        assert!(report.staging_removed);
        assert!(!staging.exists());
        assert!(!report.is_clean());
    }

    #[test]
    fn missing_staging_root_is_not_fatal() {
        let dir = tempdir().unwrap();
        let report = relocate(dir.path().join("absent"), dir.path().join("dest"));

        assert!(report.moved.is_empty());
        assert!(report.staging_removed);
        assert!(report.errors.is_empty());
    }
}
