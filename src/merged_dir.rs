//! Virtual directory presenting the union of two directories.

use std::time::SystemTime;

use crate::traits::paginate;
use crate::{DirEntry, FileHandle, FsError, Metadata, Permissions};

/// A directory present in both sources of a [`MergedFs`](crate::MergedFs).
///
/// Holds the merged, name-sorted entry list and a read cursor. Its
/// permissions come from the primary source and its modification time is
/// the later of the two. Closing drops the entries and rewinds the cursor;
/// [`stat`](FileHandle::stat) keeps answering afterwards.
#[derive(Debug, Clone)]
pub struct MergedDirectory {
    name: String,
    permissions: Permissions,
    modified: SystemTime,
    entries: Vec<DirEntry>,
    cursor: usize,
}

impl MergedDirectory {
    /// Create a directory handle from already merged, sorted entries.
    pub fn new(
        name: impl Into<String>,
        metadata: &Metadata,
        entries: Vec<DirEntry>,
    ) -> Self {
        Self {
            name: name.into(),
            permissions: metadata.permissions,
            modified: metadata.modified,
            entries,
            cursor: 0,
        }
    }

    /// Final component of the directory's path.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The directory as an entry of its parent's listing.
    pub fn to_dir_entry(&self) -> DirEntry {
        DirEntry::from_metadata(self.name.clone(), &self.metadata())
    }

    fn metadata(&self) -> Metadata {
        Metadata::directory(self.permissions, self.modified)
    }
}

impl FileHandle for MergedDirectory {
    fn stat(&self) -> Result<Metadata, FsError> {
        Ok(self.metadata())
    }

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, FsError> {
        Err(FsError::IsADirectory {
            path: self.name.clone(),
        })
    }

    fn read_dir(&mut self, n: usize) -> Result<Option<Vec<DirEntry>>, FsError> {
        Ok(paginate(&self.entries, &mut self.cursor, n))
    }

    fn close(&mut self) -> Result<(), FsError> {
        self.entries = Vec::new();
        self.cursor = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample() -> MergedDirectory {
        let metadata = Metadata::directory(
            Permissions::from_mode(0o750),
            SystemTime::UNIX_EPOCH + Duration::from_secs(100),
        );
        let entries = ["a", "b", "c", "d", "e"]
            .into_iter()
            .map(|name| DirEntry::from_metadata(name, &Metadata::default()))
            .collect();
        MergedDirectory::new("docs", &metadata, entries)
    }

    fn names(page: Vec<DirEntry>) -> Vec<String> {
        page.into_iter().map(|e| e.name).collect()
    }

    #[test]
    fn stat_reports_directory() {
        let dir = sample();
        let meta = dir.stat().unwrap();
        assert!(meta.is_dir());
        assert_eq!(meta.permissions.mode(), 0o750);
        assert_eq!(meta.size, 0);
        assert_eq!(
            meta.modified,
            SystemTime::UNIX_EPOCH + Duration::from_secs(100)
        );
    }

    #[test]
    fn paginates_then_ends() {
        let mut dir = sample();
        assert_eq!(names(dir.read_dir(2).unwrap().unwrap()), ["a", "b"]);
        assert_eq!(names(dir.read_dir(2).unwrap().unwrap()), ["c", "d"]);
        assert_eq!(names(dir.read_dir(2).unwrap().unwrap()), ["e"]);
        assert!(dir.read_dir(2).unwrap().is_none());
    }

    #[test]
    fn zero_reads_everything_remaining() {
        let mut dir = sample();
        dir.read_dir(1).unwrap();
        assert_eq!(
            names(dir.read_dir(0).unwrap().unwrap()),
            ["b", "c", "d", "e"]
        );
        assert!(dir.read_dir(0).unwrap().unwrap().is_empty());
    }

    #[test]
    fn read_as_bytes_fails() {
        let mut dir = sample();
        let mut buf = [0u8; 8];
        assert!(matches!(
            dir.read(&mut buf),
            Err(FsError::IsADirectory { .. })
        ));
    }

    #[test]
    fn close_keeps_metadata() {
        let mut dir = sample();
        let before = dir.stat().unwrap();
        dir.read_dir(3).unwrap();
        dir.close().unwrap();
        assert_eq!(dir.stat().unwrap(), before);
        assert_eq!(dir.name(), "docs");
        assert!(dir.read_dir(1).unwrap().is_none());
        assert!(dir.read_dir(0).unwrap().unwrap().is_empty());
    }

    #[test]
    fn dir_entry_matches_stat() {
        let dir = sample();
        let entry = dir.to_dir_entry();
        assert_eq!(entry.name, "docs");
        assert_eq!(entry.metadata(), dir.stat().unwrap());
    }
}
