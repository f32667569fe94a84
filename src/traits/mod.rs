//! # Source Traits
//!
//! The two capabilities every participant in a union view provides.
//!
//! | Trait | Role |
//! |-------|------|
//! | [`FileSource`] | Open a path in a read-only hierarchy |
//! | [`FileHandle`] | Stat, read, list and close an opened path |
//!
//! Leaf sources ([`MemorySource`](crate::sources::MemorySource),
//! [`DirSource`](crate::sources::DirSource), or your own) and compositions
//! ([`MergedFs`](crate::MergedFs)) implement the same [`FileSource`] trait,
//! so a composition can wrap another composition.
//!
//! ## Thread Safety
//!
//! [`FileSource`] requires `Send + Sync` and takes `&self`. Handles are
//! `Send` and carry a private cursor.
//!
//! ## Object Safety
//!
//! Both traits are object-safe:
//!
//! ```rust
//! use merged_fs::{FileSource, FsError};
//!
//! fn is_directory(source: &dyn FileSource, path: &str) -> Result<bool, FsError> {
//!     let handle = source.open(path)?;
//!     Ok(handle.stat()?.is_dir())
//! }
//! ```

mod file_handle;
mod file_source;

pub(crate) use file_handle::paginate;
pub use file_handle::FileHandle;
pub use file_source::FileSource;
