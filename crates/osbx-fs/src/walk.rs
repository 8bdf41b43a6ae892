//! Lazy enumeration of the regular files below a root.
//!
//! A [`FileWalk`] only remembers its root; every call to [`FileWalk::iter`]
//! starts a fresh traversal, so the same walk can be replayed after the tree
//! changed.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::Result;

#[derive(Clone, Debug)]
pub struct FileWalk {
    root: PathBuf,
}

impl FileWalk {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn iter(&self) -> Files {
        Files {
            inner: WalkDir::new(&self.root).min_depth(1).into_iter(),
        }
    }
}

impl<'a> IntoIterator for &'a FileWalk {
    type Item = Result<PathBuf>;
    type IntoIter = Files;

    fn into_iter(self) -> Files {
        self.iter()
    }
}

/// Regular files below the walk root, in no particular order. Symlinks and
/// directories are not yielded.
pub struct Files {
    inner: walkdir::IntoIter,
}

impl Iterator for Files {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(entry) if entry.file_type().is_file() => return Some(Ok(entry.into_path())),
                Ok(_) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}
