use std::path::{Path, PathBuf};

/// An archive entry after it has been written below the destination root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Slash-separated path as stored in the archive.
    pub path: PathBuf,
    pub target_path: PathBuf,
    pub size: u64,
    pub kind: EntryKind,
}

impl ArchiveEntry {
    pub fn new(path: PathBuf, target_path: PathBuf, size: u64, kind: EntryKind) -> Self {
        Self {
            path,
            target_path,
            size,
            kind,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File)
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }

    pub fn target(&self) -> &Path {
        &self.target_path
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// Entries in the order the archive stores them.
#[derive(Clone, Debug, Default)]
pub struct ExtractionReport {
    pub entries: Vec<ArchiveEntry>,
    pub total_bytes: u64,
}

impl ExtractionReport {
    pub fn file_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_file()).count()
    }

    pub fn directory_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_directory()).count()
    }

    pub(crate) fn record(&mut self, entry: ArchiveEntry) {
        self.total_bytes += entry.size;
        self.entries.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, size: u64) -> ArchiveEntry {
        ArchiveEntry::new(
            PathBuf::from(path),
            PathBuf::from("/staging").join(path),
            size,
            EntryKind::File,
        )
    }

    #[test]
    fn entry_kind_predicates() {
        let entry = file("proj/a.Xquery", 12);
        assert!(entry.is_file());
        assert!(!entry.is_directory());
        assert_eq!(entry.target(), Path::new("/staging/proj/a.Xquery"));
    }

    #[test]
    fn report_counts_and_bytes() {
        let mut report = ExtractionReport::default();
        report.record(ArchiveEntry::new(
            PathBuf::from("proj"),
            PathBuf::from("/staging/proj"),
            0,
            EntryKind::Directory,
        ));
        report.record(file("proj/a.txt", 3));
        report.record(file("proj/b.txt", 4));

        assert_eq!(report.file_count(), 2);
        assert_eq!(report.directory_count(), 1);
        assert_eq!(report.total_bytes, 7);
        assert_eq!(report.entries[1].path, PathBuf::from("proj/a.txt"));
    }
}
