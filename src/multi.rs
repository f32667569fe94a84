//! Many-way merges.

use tracing::debug;

use crate::path::{is_valid_path, ROOT};
use crate::{
    FileHandle, FileSource, FsError, MergeOptions, MergedDirectory, MergedFs, Metadata,
    Permissions,
};

/// Merge any number of sources, highest priority first.
///
/// The result behaves like `MergedFs::new(s0, MergedFs::new(s1, ...))`.
/// With no sources the result is an [`EmptySource`]; a single source is
/// returned unchanged.
///
/// ```rust
/// use merged_fs::sources::MemorySource;
/// use merged_fs::{merge_multiple, FileSource, FileSourceExt};
///
/// let sources: Vec<Box<dyn FileSource>> = vec![
///     Box::new(MemorySource::new().with_file("1.txt", "first")),
///     Box::new(MemorySource::new().with_file("1.txt", "second").with_file("2.txt", "2")),
/// ];
/// let merged = merge_multiple(sources);
/// assert_eq!(merged.read_to_string("1.txt").unwrap(), "first");
/// assert_eq!(merged.read_to_string("2.txt").unwrap(), "2");
/// ```
pub fn merge_multiple<I>(sources: I) -> Box<dyn FileSource>
where
    I: IntoIterator<Item = Box<dyn FileSource>>,
{
    merge_multiple_with(MergeOptions::default(), sources)
}

/// Like [`merge_multiple`], applying `options` to every node it creates.
pub fn merge_multiple_with<I>(options: MergeOptions, sources: I) -> Box<dyn FileSource>
where
    I: IntoIterator<Item = Box<dyn FileSource>>,
{
    let sources: Vec<_> = sources.into_iter().collect();
    debug!(sources = sources.len(), "building many-way merge");
    let mut lowest_first = sources.into_iter().rev();
    let Some(mut merged) = lowest_first.next() else {
        return Box::new(EmptySource);
    };
    for source in lowest_first {
        merged = Box::new(MergedFs::with_options(source, merged, options));
    }
    merged
}

/// A source containing only an empty root directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySource;

impl FileSource for EmptySource {
    fn open(&self, path: &str) -> Result<Box<dyn FileHandle>, FsError> {
        if !is_valid_path(path) {
            return Err(FsError::InvalidPath {
                path: path.to_string(),
            });
        }
        if path != ROOT {
            return Err(FsError::NotFound {
                path: path.to_string(),
            });
        }
        let metadata = Metadata::directory(Permissions::implicit_dir(), std::time::UNIX_EPOCH);
        Ok(Box::new(MergedDirectory::new(ROOT, &metadata, Vec::new())))
    }
}
