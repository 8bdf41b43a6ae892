use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Resolve an archive entry path below `base`, rejecting anything that
/// would land outside of it.
pub(crate) fn resolve_entry_path(entry_path: &Path, base: &Path) -> Result<PathBuf> {
    if entry_path.is_absolute() || entry_path.has_root() {
        return Err(Error::ZipSlip {
            entry: entry_path.to_path_buf(),
            resolved: normalize_path(entry_path),
        });
    }

    let resolved = normalize_path(&base.join(entry_path));
    if !resolved.starts_with(normalize_path(base)) {
        return Err(Error::ZipSlip {
            entry: entry_path.to_path_buf(),
            resolved,
        });
    }

    Ok(resolved)
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::Normal(part) => result.push(part),
            Component::RootDir => result.push(Component::RootDir.as_os_str()),
            Component::Prefix(prefix) => result.push(prefix.as_os_str()),
            Component::CurDir => {}
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> &'static Path {
        if cfg!(windows) {
            Path::new("C:/staging")
        } else {
            Path::new("/staging")
        }
    }

    #[test]
    fn nested_entry_resolves_below_base() {
        let resolved = resolve_entry_path(Path::new("proj/res/a.Xquery"), base()).unwrap();
        assert_eq!(resolved, base().join("proj").join("res").join("a.Xquery"));
    }

    #[test]
    fn current_dir_components_are_dropped() {
        let resolved = resolve_entry_path(Path::new("./proj/./a.XML"), base()).unwrap();
        assert_eq!(resolved, base().join("proj").join("a.XML"));
    }

    #[test]
    fn absolute_entry_is_rejected() {
        let malicious = if cfg!(windows) { "C:\\etc\\passwd" } else { "/etc/passwd" };
        let result = resolve_entry_path(Path::new(malicious), base());
        assert!(matches!(result, Err(Error::ZipSlip { .. })));
    }

    #[test]
    fn parent_escape_is_rejected() {
        let result = resolve_entry_path(Path::new("../../outside.txt"), base());
        assert!(matches!(result, Err(Error::ZipSlip { .. })));
    }
}
