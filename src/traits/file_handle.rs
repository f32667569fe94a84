//! Handles returned by opening a path.

use crate::{DirEntry, FsError, Metadata};

/// An opened path.
///
/// Handles are owned by the caller that opened them. [`close`] releases any
/// underlying resource but never invalidates metadata already read, and
/// [`stat`] keeps working on a closed handle that only serves as a
/// metadata record.
///
/// A handle carries its own read cursor and is not meant to be shared
/// between threads; callers iterating a directory concurrently open
/// independent handles.
///
/// [`close`]: FileHandle::close
/// [`stat`]: FileHandle::stat
pub trait FileHandle: Send {
    /// Metadata of the opened path.
    fn stat(&self) -> Result<Metadata, FsError>;

    /// Read bytes from a regular file into `buf`, advancing the cursor.
    ///
    /// Returns the number of bytes read; `0` at end of file.
    ///
    /// # Errors
    ///
    /// - [`FsError::IsADirectory`] if the handle is a directory
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsError>;

    /// Paginated directory listing.
    ///
    /// Returns up to `n` entries starting at the internal cursor and
    /// advances it. `n == 0` returns every remaining entry, possibly none.
    /// With `n > 0` and the cursor exhausted, returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotADirectory`] if the handle is not a directory
    fn read_dir(&mut self, n: usize) -> Result<Option<Vec<DirEntry>>, FsError>;

    /// Release resources held by the handle.
    fn close(&mut self) -> Result<(), FsError>;
}

impl<H: FileHandle + ?Sized> FileHandle for Box<H> {
    fn stat(&self) -> Result<Metadata, FsError> {
        (**self).stat()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsError> {
        (**self).read(buf)
    }

    fn read_dir(&mut self, n: usize) -> Result<Option<Vec<DirEntry>>, FsError> {
        (**self).read_dir(n)
    }

    fn close(&mut self) -> Result<(), FsError> {
        (**self).close()
    }
}

/// Take a page of `n` entries (`0` = all) from `entries` at `*cursor`.
///
/// Shared pagination rule for every directory handle in this crate.
pub(crate) fn paginate(
    entries: &[DirEntry],
    cursor: &mut usize,
    n: usize,
) -> Option<Vec<DirEntry>> {
    if *cursor >= entries.len() {
        if n == 0 {
            return Some(Vec::new());
        }
        return None;
    }
    let end = if n == 0 {
        entries.len()
    } else {
        cursor.saturating_add(n).min(entries.len())
    };
    let page = entries[*cursor..end].to_vec();
    *cursor = end;
    Some(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Metadata;

    fn entries(names: &[&str]) -> Vec<DirEntry> {
        names
            .iter()
            .map(|name| DirEntry::from_metadata(*name, &Metadata::default()))
            .collect()
    }

    fn names(page: Option<Vec<DirEntry>>) -> Option<Vec<String>> {
        page.map(|entries| entries.into_iter().map(|e| e.name).collect())
    }

    #[test]
    fn paginate_in_chunks() {
        let list = entries(&["a", "b", "c"]);
        let mut cursor = 0;
        assert_eq!(
            names(paginate(&list, &mut cursor, 2)),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(names(paginate(&list, &mut cursor, 2)), Some(vec!["c".to_string()]));
        assert_eq!(names(paginate(&list, &mut cursor, 2)), None);
    }

    #[test]
    fn paginate_zero_returns_rest_then_empty() {
        let list = entries(&["a", "b", "c"]);
        let mut cursor = 1;
        assert_eq!(
            names(paginate(&list, &mut cursor, 0)),
            Some(vec!["b".to_string(), "c".to_string()])
        );
        assert_eq!(names(paginate(&list, &mut cursor, 0)), Some(vec![]));
        assert_eq!(names(paginate(&list, &mut cursor, 1)), None);
    }

    #[test]
    fn paginate_empty_list() {
        let mut cursor = 0;
        assert_eq!(names(paginate(&[], &mut cursor, 0)), Some(vec![]));
        assert_eq!(names(paginate(&[], &mut cursor, 5)), None);
    }

    #[test]
    fn file_handle_is_object_safe() {
        fn _check(_: &dyn FileHandle) {}
    }
}
