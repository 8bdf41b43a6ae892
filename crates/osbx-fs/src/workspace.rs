use std::path::Path;

use tempfile::TempDir;

use crate::relocate::{RelocationReport, relocate};
use crate::{Error, Result};

/// A freshly created, uniquely named staging directory owned by one run.
///
/// Dropping it without relocating removes the directory and everything
/// below it.
pub struct Staging {
    dir: TempDir,
}

impl Staging {
    pub fn new_in(parent: impl AsRef<Path>) -> Result<Self> {
        let parent = parent.as_ref();
        std::fs::create_dir_all(parent).map_err(|e| Error::Staging {
            parent: parent.to_path_buf(),
            source: e,
        })?;

        let dir = tempfile::Builder::new()
            .prefix(".osbx-staging-")
            .tempdir_in(parent)
            .map_err(|e| Error::Staging {
                parent: parent.to_path_buf(),
                source: e,
            })?;

        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Merge the staged tree into `final_root` and remove the staging
    /// directory.
    pub fn relocate_into(self, final_root: impl AsRef<Path>) -> RelocationReport {
        relocate(self.dir.path(), final_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_staging_is_unique() {
        let dir = tempdir().unwrap();
        let first = Staging::new_in(dir.path()).unwrap();
        let second = Staging::new_in(dir.path()).unwrap();
        assert_ne!(first.path(), second.path());
        assert!(first.path().starts_with(dir.path()));
    }

    #[test]
    fn test_staging_cleanup_on_drop() {
        let dir = tempdir().unwrap();
        let staged_path;
        {
            let staging = Staging::new_in(dir.path()).unwrap();
            staged_path = staging.path().to_path_buf();
            std::fs::create_dir_all(staged_path.join("proj")).unwrap();
            std::fs::write(staged_path.join("proj/a.xqy"), "X").unwrap();
        }
        assert!(!staged_path.exists());
    }

    #[test]
    fn test_staging_relocate_into() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("export");
        let staging = Staging::new_in(dir.path()).unwrap();
        let staged_path = staging.path().to_path_buf();
        std::fs::write(staged_path.join("file.txt"), "data").unwrap();

        let report = staging.relocate_into(&dest);

        assert!(report.is_clean());
        assert!(!staged_path.exists());
        assert_eq!(std::fs::read(dest.join("file.txt")).unwrap(), b"data");
    }
}
