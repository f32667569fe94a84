//! The read-hierarchy capability.

use std::sync::Arc;

use crate::{FileHandle, FsError};

/// A read-only hierarchy of files and directories.
///
/// Every leaf source and every composition implements this trait, which is
/// what lets a [`MergedFs`](crate::MergedFs) take another `MergedFs` as
/// either of its sides.
///
/// # Error classes
///
/// `open` must report an absent path with [`FsError::NotFound`] and a
/// malformed path with [`FsError::InvalidPath`]. Compositions branch on
/// [`FsError::is_not_found`], so a genuine failure must never be reported as
/// one of those variants.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. `open` takes `&self` and may
/// be called concurrently; sources use interior mutability for any state.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FileSource`.
pub trait FileSource: Send + Sync {
    /// Open `path` and return a handle owned by the caller.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPath`] if `path` is not a valid source path
    /// - [`FsError::NotFound`] if the path does not exist
    fn open(&self, path: &str) -> Result<Box<dyn FileHandle>, FsError>;

    /// Enable or disable memoization of resolved path prefixes.
    ///
    /// Sources without such a cache ignore this. Compositions apply it to
    /// themselves and forward it to the sources they wrap. A source shared
    /// by several compositions (through an `Arc`) is toggled by whichever
    /// of them is toggled last.
    fn set_path_caching(&self, _enabled: bool) {}
}

impl<S: FileSource + ?Sized> FileSource for Box<S> {
    fn open(&self, path: &str) -> Result<Box<dyn FileHandle>, FsError> {
        (**self).open(path)
    }

    fn set_path_caching(&self, enabled: bool) {
        (**self).set_path_caching(enabled)
    }
}

impl<S: FileSource + ?Sized> FileSource for Arc<S> {
    fn open(&self, path: &str) -> Result<Box<dyn FileHandle>, FsError> {
        (**self).open(path)
    }

    fn set_path_caching(&self, enabled: bool) {
        (**self).set_path_caching(enabled)
    }
}

impl<S: FileSource + ?Sized> FileSource for &S {
    fn open(&self, path: &str) -> Result<Box<dyn FileHandle>, FsError> {
        (**self).open(path)
    }

    fn set_path_caching(&self, enabled: bool) {
        (**self).set_path_caching(enabled)
    }
}
