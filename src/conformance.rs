//! Behavioral checks for [`FileSource`] implementations.
//!
//! [`verify_source`] walks a whole source and checks the properties every
//! consumer of this crate relies on:
//!
//! - the root opens as a directory
//! - listings are sorted by name and free of duplicates
//! - paging through a listing one entry at a time yields the full listing,
//!   then end-of-stream
//! - every listed entry opens, and its metadata equals the entry's
//! - files read back the same bytes twice, whole or in small chunks, matching
//!   their reported size
//! - directories refuse byte reads and files refuse listings
//! - `*` globbing inside a directory returns exactly its listing
//!
//! It is meant for tests of custom sources and of compositions.

use thiserror::Error;

use crate::ext::FileSourceExt;
use crate::path::{join, ROOT};
use crate::{glob, DirEntry, FileHandle, FileSource, FsError};

/// A violated expectation found by [`verify_source`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VerifyError {
    /// The source behaved inconsistently at `path`.
    #[error("{path}: {details}")]
    Mismatch {
        /// Path where the inconsistency was observed.
        path: String,
        /// What was expected and what was seen.
        details: String,
    },

    /// An expected path was not reachable by walking from the root.
    #[error("expected path not found: {0}")]
    Missing(String),

    /// The source returned an error while being walked.
    #[error(transparent)]
    Fs(#[from] FsError),
}

/// Summary of a successful walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// Regular files (and other non-directories) visited.
    pub files: usize,
    /// Directories visited, the root included.
    pub directories: usize,
}

/// Walk `source` from the root, checking it behaves consistently, and
/// confirm every path in `expected` was reached.
///
/// # Example
///
/// ```rust
/// use merged_fs::conformance::verify_source;
/// use merged_fs::sources::MemorySource;
/// use merged_fs::MergedFs;
///
/// let merged = MergedFs::new(
///     MemorySource::new().with_file("a/1.txt", "one"),
///     MemorySource::new().with_file("a/2.txt", "two"),
/// );
/// let report = verify_source(&merged, &["a/1.txt", "a/2.txt"]).unwrap();
/// assert_eq!(report.files, 2);
/// ```
pub fn verify_source<S>(source: &S, expected: &[&str]) -> Result<VerifyReport, VerifyError>
where
    S: FileSource + ?Sized,
{
    let mut walker = Walker {
        source,
        report: VerifyReport::default(),
        seen: Vec::new(),
    };

    let root = source.stat(ROOT)?;
    if !root.is_dir() {
        return Err(mismatch(ROOT, "root is not a directory"));
    }
    walker.visit_dir(ROOT)?;

    for path in expected {
        if !walker.seen.iter().any(|seen| seen == path) {
            return Err(VerifyError::Missing((*path).to_string()));
        }
    }
    Ok(walker.report)
}

struct Walker<'a, S: ?Sized> {
    source: &'a S,
    report: VerifyReport,
    seen: Vec<String>,
}

impl<S: FileSource + ?Sized> Walker<'_, S> {
    fn visit_dir(&mut self, dir: &str) -> Result<(), VerifyError> {
        self.report.directories += 1;
        let entries = self.source.read_dir(dir)?;
        check_sorted(dir, &entries)?;
        self.check_paging(dir, &entries)?;
        self.check_dir_refuses_read(dir)?;
        self.check_glob(dir, &entries)?;

        for entry in &entries {
            let path = join(dir, &entry.name);
            let metadata = self.source.stat(&path)?;
            if metadata != entry.metadata() {
                return Err(mismatch(
                    &path,
                    format!(
                        "listed as {:?} but opens as {:?}",
                        entry.metadata(),
                        metadata
                    ),
                ));
            }
            self.seen.push(path.clone());
            if entry.is_dir() {
                self.visit_dir(&path)?;
            } else {
                self.visit_file(&path, metadata.size)?;
            }
        }
        Ok(())
    }

    fn visit_file(&mut self, path: &str, size: u64) -> Result<(), VerifyError> {
        self.report.files += 1;
        let first = self.source.read_file(path)?;
        let second = self.source.read_file(path)?;
        if first != second {
            return Err(mismatch(path, "two reads returned different contents"));
        }
        if first.len() as u64 != size {
            return Err(mismatch(
                path,
                format!("stat reports {size} bytes, read returned {}", first.len()),
            ));
        }

        let mut handle = self.source.open(path)?;
        let chunked = read_in_chunks(handle.as_mut());
        let listing = handle.read_dir(0);
        handle.close()?;
        if chunked? != first {
            return Err(mismatch(path, "chunked read differs from whole read"));
        }
        if listing.is_ok() {
            return Err(mismatch(path, "file handle accepted a directory read"));
        }
        Ok(())
    }

    fn check_paging(&self, dir: &str, entries: &[DirEntry]) -> Result<(), VerifyError> {
        let mut handle = self.source.open(dir)?;
        let paged = page_one_by_one(handle.as_mut(), entries.len())?;
        let after_end = handle.read_dir(1)?;
        let rest = handle.read_dir(0)?;
        handle.close()?;

        if paged.as_slice() != entries {
            return Err(mismatch(dir, "paged listing differs from full listing"));
        }
        if after_end.is_some() {
            return Err(mismatch(dir, "read past the end did not report end of stream"));
        }
        if !rest.is_some_and(|rest| rest.is_empty()) {
            return Err(mismatch(dir, "exhausted listing did not return an empty batch"));
        }
        Ok(())
    }

    fn check_dir_refuses_read(&self, dir: &str) -> Result<(), VerifyError> {
        let mut handle = self.source.open(dir)?;
        let mut buf = [0u8; 1];
        let read = handle.read(&mut buf);
        handle.close()?;
        if read.is_ok() {
            return Err(mismatch(dir, "directory handle accepted a byte read"));
        }
        Ok(())
    }

    fn check_glob(&self, dir: &str, entries: &[DirEntry]) -> Result<(), VerifyError> {
        if dir.contains(['*', '?', '[', '\\']) {
            return Ok(());
        }
        let pattern = if dir == ROOT {
            "*".to_string()
        } else {
            format!("{dir}/*")
        };
        let found = glob(self.source, &pattern)?;
        let listed: Vec<_> = entries.iter().map(|e| join(dir, &e.name)).collect();
        if found != listed {
            return Err(mismatch(
                dir,
                format!("glob {pattern:?} returned {found:?}, listing has {listed:?}"),
            ));
        }
        Ok(())
    }
}

fn read_in_chunks(handle: &mut dyn FileHandle) -> Result<Vec<u8>, FsError> {
    let mut data = Vec::new();
    let mut chunk = [0u8; 7];
    loop {
        let n = handle.read(&mut chunk)?;
        if n == 0 {
            return Ok(data);
        }
        data.extend_from_slice(&chunk[..n]);
    }
}

fn page_one_by_one(handle: &mut dyn FileHandle, limit: usize) -> Result<Vec<DirEntry>, FsError> {
    let mut paged = Vec::with_capacity(limit);
    // Stops at `limit` even if the handle never signals the end.
    while paged.len() < limit {
        match handle.read_dir(1)? {
            Some(batch) if !batch.is_empty() => paged.extend(batch),
            _ => break,
        }
    }
    Ok(paged)
}

fn check_sorted(dir: &str, entries: &[DirEntry]) -> Result<(), VerifyError> {
    for pair in entries.windows(2) {
        if pair[0].name.as_bytes() >= pair[1].name.as_bytes() {
            return Err(mismatch(
                dir,
                format!(
                    "entries {:?} and {:?} are out of order or duplicated",
                    pair[0].name, pair[1].name
                ),
            ));
        }
    }
    Ok(())
}

fn mismatch(path: &str, details: impl Into<String>) -> VerifyError {
    VerifyError::Mismatch {
        path: path.to_string(),
        details: details.into(),
    }
}
