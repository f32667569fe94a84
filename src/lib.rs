//! # merged-fs
//!
//! A **union view over read-only file sources**, resolving conflicts by
//! static priority.
//!
//! [`MergedFs`] composes a *primary* and a *secondary* [`FileSource`] into a
//! single source. Files in the primary win; directories present in both are
//! merged; anything the primary lacks falls through to the secondary, unless
//! a non-directory in the primary shadows it. Compositions are sources
//! themselves, so they nest to any depth.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use merged_fs::sources::MemorySource;
//! use merged_fs::{FileSourceExt, MergedFs};
//!
//! let primary = MemorySource::new()
//!     .with_file("a/1.txt", "primary")
//!     .with_file("b", "a file in primary");
//! let secondary = MemorySource::new()
//!     .with_file("a/1.txt", "secondary")
//!     .with_file("a/2.txt", "only here")
//!     .with_file("b/0.txt", "shadowed");
//!
//! let merged = MergedFs::new(primary, secondary);
//!
//! assert_eq!(merged.read_to_string("a/1.txt").unwrap(), "primary");
//! assert_eq!(merged.read_to_string("a/2.txt").unwrap(), "only here");
//! assert!(merged.is_file("b").unwrap());
//! assert!(!merged.exists("b/0.txt").unwrap());
//!
//! let names: Vec<_> = merged.read_dir("a").unwrap().into_iter().map(|e| e.name).collect();
//! assert_eq!(names, ["1.txt", "2.txt"]);
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`FileSource`] | Anything that can open a path |
//! | [`FileHandle`] | An opened file or directory: `stat`, `read`, paged `read_dir`, `close` |
//! | [`MergedFs`] | Two-source union with shadowing and directory merging |
//! | [`MergedDirectory`] | Handle for a directory present in both sources |
//! | [`merge_multiple`] | Right-nested union of any number of sources |
//! | [`FsError`] | Error type, split into a NotFound class and fatal errors |
//! | [`Metadata`] / [`DirEntry`] | What `stat` and listings report |
//!
//! ---
//!
//! ## Resolution Rules
//!
//! Opening `path` on a `MergedFs`:
//!
//! 1. primary has a non-directory at `path`: the primary's handle
//! 2. primary has a directory, secondary has none: the primary's handle
//! 3. both have directories: a [`MergedDirectory`] of both listings
//! 4. primary lacks `path` and no prefix of it is a primary non-directory:
//!    whatever the secondary answers
//! 5. otherwise: a not-found error
//!
//! Fatal errors never fall back to the other source.
//!
//! ---
//!
//! ## Error Handling
//!
//! ```rust
//! use merged_fs::FsError;
//!
//! let err = FsError::NotFound { path: "a/missing.txt".into() };
//! assert_eq!(err.to_string(), "not found: a/missing.txt");
//! assert!(err.is_not_found());
//!
//! let err = FsError::DuplicateEntry { path: "a".into(), name: "x".into() };
//! assert!(!err.is_not_found());
//! ```
//!
//! ---
//!
//! ## Thread Safety
//!
//! [`FileSource`] requires `Send + Sync` and takes `&self`. A `MergedFs`
//! can be shared across threads behind an `Arc`; its prefix cache uses
//! interior locking. Handles are `Send` and owned by one caller at a time.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialization for [`Metadata`], [`DirEntry`], [`Permissions`], [`MergeOptions`]; adds `FileSourceExtJson` |

mod error;
mod ext;
mod layer;
mod merge;
mod merged_dir;
mod merged_fs;
mod multi;
mod pattern;
mod prefix_cache;
mod traits;
mod types;

pub mod conformance;
pub mod path;
pub mod sources;

// Public re-exports - error types
pub use error::{FsError, SourceRole};

// Public re-exports - core types
pub use types::{DirEntry, FileType, MergeOptions, Metadata, Permissions};

// Public re-exports - traits
pub use traits::{FileHandle, FileSource};

// Public re-exports - composition
pub use merge::merge_entries;
pub use merged_dir::MergedDirectory;
pub use merged_fs::MergedFs;
pub use multi::{merge_multiple, merge_multiple_with, EmptySource};

// Public re-exports - infrastructure
pub use ext::FileSourceExt;
pub use layer::{Layer, LayerExt, Overlay, Underlay};
pub use pattern::glob;

// Conditional re-exports
#[cfg(feature = "serde")]
pub use ext::FileSourceExtJson;
