use crate::{Error, Result};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;

/// Move a file to `dest`, replacing any file already there.
///
/// Falls back to copy-then-remove when `src` and `dest` live on different
/// devices.
pub fn move_file(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();
    rename_or_copy(src, dest).map_err(|source| Error::Move {
        from: src.to_path_buf(),
        to: dest.to_path_buf(),
        source,
    })
}

pub(crate) fn rename_or_copy(src: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(src, dest) {
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            fs::copy(src, dest)?;
            fs::remove_file(src)
        }
        result => result,
    }
}
