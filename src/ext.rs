//! # Extension Traits
//!
//! Whole-file and whole-directory conveniences on top of the handle API.
//!
//! ## Overview
//!
//! [`FileSourceExt`] wraps the open/read/close dance of [`FileSource`] and
//! [`FileHandle`](crate::FileHandle) into one call per question. It has a
//! blanket implementation, so every source (including `dyn FileSource` and
//! every [`MergedFs`](crate::MergedFs)) gets it for free.
//!
//! ## Available Methods
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`stat`](FileSourceExt::stat) | Metadata of a path |
//! | [`read_file`](FileSourceExt::read_file) | Whole file as bytes |
//! | [`read_to_string`](FileSourceExt::read_to_string) | Whole file as UTF-8 |
//! | [`read_dir`](FileSourceExt::read_dir) | Full listing of a directory |
//! | [`exists`](FileSourceExt::exists) | Whether a path resolves |
//! | [`is_file`](FileSourceExt::is_file) | Whether a path is a regular file |
//! | [`is_dir`](FileSourceExt::is_dir) | Whether a path is a directory |
//!
//! ## JSON Support (Feature-Gated)
//!
//! With the `serde` feature enabled, `FileSourceExtJson::read_json` reads
//! and deserializes a JSON file.

use crate::{DirEntry, FileHandle, FileSource, FsError, Metadata};

const READ_CHUNK: usize = 8 * 1024;

/// Extension methods for any file source.
///
/// # Example
///
/// ```rust
/// use merged_fs::sources::MemorySource;
/// use merged_fs::{FileSourceExt, MergedFs};
///
/// let merged = MergedFs::new(
///     MemorySource::new().with_file("etc/app.conf", "primary"),
///     MemorySource::new().with_file("etc/other.conf", "secondary"),
/// );
/// let names: Vec<_> = merged
///     .read_dir("etc")
///     .unwrap()
///     .into_iter()
///     .map(|e| e.name)
///     .collect();
/// assert_eq!(names, ["app.conf", "other.conf"]);
/// ```
pub trait FileSourceExt: FileSource {
    /// Metadata of the object at `path`.
    fn stat(&self, path: &str) -> Result<Metadata, FsError> {
        let mut handle = self.open(path)?;
        let metadata = handle.stat();
        handle.close()?;
        metadata
    }

    /// Read the whole file at `path`.
    ///
    /// # Errors
    ///
    /// - `FsError::IsADirectory` if `path` is a directory
    /// - any error from opening or reading
    fn read_file(&self, path: &str) -> Result<Vec<u8>, FsError> {
        let mut handle = self.open(path)?;
        let data = read_to_end(handle.as_mut());
        handle.close()?;
        data
    }

    /// Read the whole file at `path` as UTF-8 text.
    ///
    /// Invalid UTF-8 is reported as an `FsError::Io` with
    /// [`InvalidData`](std::io::ErrorKind::InvalidData).
    fn read_to_string(&self, path: &str) -> Result<String, FsError> {
        let data = self.read_file(path)?;
        String::from_utf8(data).map_err(|e| FsError::Io {
            operation: "read",
            path: path.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })
    }

    /// Every entry of the directory at `path`, sorted by name.
    fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        let mut handle = self.open(path)?;
        let entries = handle.read_dir(0);
        handle.close()?;
        Ok(entries?.unwrap_or_default())
    }

    /// Whether `path` resolves.
    ///
    /// Returns `Ok(false)` for any not-found error, shadowing included.
    /// Returns `Err` only for fatal errors.
    fn exists(&self, path: &str) -> Result<bool, FsError> {
        match self.stat(path) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Whether `path` is a regular file. `Ok(false)` if it doesn't exist.
    fn is_file(&self, path: &str) -> Result<bool, FsError> {
        match self.stat(path) {
            Ok(m) => Ok(m.is_file()),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Whether `path` is a directory. `Ok(false)` if it doesn't exist.
    fn is_dir(&self, path: &str) -> Result<bool, FsError> {
        match self.stat(path) {
            Ok(m) => Ok(m.is_dir()),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl<S: FileSource + ?Sized> FileSourceExt for S {}

fn read_to_end(handle: &mut dyn FileHandle) -> Result<Vec<u8>, FsError> {
    let mut data = Vec::new();
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        let n = handle.read(&mut chunk)?;
        if n == 0 {
            return Ok(data);
        }
        data.extend_from_slice(&chunk[..n]);
    }
}

#[cfg(feature = "serde")]
mod json {
    use super::*;
    use serde::de::DeserializeOwned;

    /// JSON deserialization extension methods.
    ///
    /// Available when the `serde` feature is enabled.
    pub trait FileSourceExtJson: FileSource {
        /// Read a file and deserialize it as JSON.
        ///
        /// # Errors
        ///
        /// - any error from [`FileSourceExt::read_to_string`]
        /// - `FsError::Deserialization` if parsing fails
        ///
        /// # Example
        ///
        /// ```rust
        /// use merged_fs::sources::MemorySource;
        /// use merged_fs::FileSourceExtJson;
        ///
        /// let source = MemorySource::new().with_file("conf.json", r#"{"level": 3}"#);
        /// let value: serde_json::Value = source.read_json("conf.json").unwrap();
        /// assert_eq!(value["level"], 3);
        /// ```
        fn read_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FsError> {
            let data = self.read_to_string(path)?;
            serde_json::from_str(&data).map_err(|e| FsError::Deserialization(e.to_string()))
        }
    }

    impl<S: FileSource + ?Sized> FileSourceExtJson for S {}
}

#[cfg(feature = "serde")]
pub use json::FileSourceExtJson;
