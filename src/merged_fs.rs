//! # MergedFs
//!
//! Composition of two sources into one union view.
//!
//! ## Resolution
//!
//! ```text
//! open(path)
//!   primary: non-directory  ──▶ primary handle (masks secondary entirely)
//!   primary: directory
//!       secondary: missing        ──▶ primary handle
//!       secondary: non-directory  ──▶ primary handle
//!       secondary: directory      ──▶ MergedDirectory (union of both)
//!   primary: missing
//!       ancestor is a non-directory in primary ──▶ Shadowed
//!       otherwise                              ──▶ secondary.open(path)
//! ```
//!
//! Because `MergedFs` is itself a [`FileSource`], either side can be another
//! `MergedFs`, building chains of any depth.

use tracing::{debug, info, trace, warn};

use crate::merge::{merge_entries, merged_dir_metadata};
use crate::path::{base_name, is_valid_path};
use crate::prefix_cache::ShadowPrefixCache;
use crate::{
    DirEntry, FileHandle, FileSource, FsError, MergeOptions, MergedDirectory, Metadata,
    SourceRole,
};

/// Two sources presented as one, with `primary` taking priority.
///
/// A non-directory in the primary source hides anything at the same path in
/// the secondary, including a whole subtree. Directories present in both are
/// merged recursively.
///
/// # Example
///
/// ```rust
/// use merged_fs::sources::MemorySource;
/// use merged_fs::{FileSourceExt, MergedFs};
///
/// let upper = MemorySource::new().with_file("a", "upper").with_file("b/x", "x");
/// let lower = MemorySource::new().with_file("a/y", "hidden").with_file("b/z", "z");
/// let merged = MergedFs::new(upper, lower);
///
/// assert_eq!(merged.read_to_string("a").unwrap(), "upper");
/// assert!(!merged.exists("a/y").unwrap());
/// let names: Vec<_> = merged.read_dir("b").unwrap().into_iter().map(|e| e.name).collect();
/// assert_eq!(names, ["x", "z"]);
/// ```
pub struct MergedFs<P, S> {
    primary: P,
    secondary: S,
    known_ok: ShadowPrefixCache,
}

impl<P: FileSource, S: FileSource> MergedFs<P, S> {
    /// Compose `primary` over `secondary` with default options.
    pub fn new(primary: P, secondary: S) -> Self {
        Self::with_options(primary, secondary, MergeOptions::default())
    }

    /// Compose `primary` over `secondary`.
    pub fn with_options(primary: P, secondary: S, options: MergeOptions) -> Self {
        Self {
            primary,
            secondary,
            known_ok: ShadowPrefixCache::new(options.path_caching),
        }
    }

    /// The higher-priority source.
    pub fn primary(&self) -> &P {
        &self.primary
    }

    /// The lower-priority source.
    pub fn secondary(&self) -> &S {
        &self.secondary
    }

    /// Whether this node memoizes unshadowed path prefixes.
    pub fn path_caching(&self) -> bool {
        self.known_ok.is_enabled()
    }

    /// Number of prefixes currently cached by this node.
    pub fn cached_prefix_count(&self) -> usize {
        self.known_ok.len()
    }

    fn open_merged(
        &self,
        path: &str,
        mut primary: Box<dyn FileHandle>,
        primary_meta: Metadata,
    ) -> Result<Box<dyn FileHandle>, FsError> {
        let mut secondary = match self.secondary.open(path) {
            Ok(handle) => handle,
            Err(e) if e.is_not_found() => {
                trace!(path, "directory only in primary");
                return Ok(primary);
            }
            Err(e) => return Err(e.in_source(SourceRole::Secondary, "open", path)),
        };
        let secondary_meta = match secondary.stat() {
            Ok(meta) => meta,
            Err(e) => {
                close_logged(primary, SourceRole::Primary, path);
                close_logged(secondary, SourceRole::Secondary, path);
                return Err(e.in_source(SourceRole::Secondary, "stat", path));
            }
        };
        if !secondary_meta.is_dir() {
            trace!(path, "primary directory masks secondary non-directory");
            close_logged(secondary, SourceRole::Secondary, path);
            return Ok(primary);
        }

        let entries_a = read_all(&mut *primary, SourceRole::Primary, path);
        let entries_b = read_all(&mut *secondary, SourceRole::Secondary, path);
        close_logged(primary, SourceRole::Primary, path);
        close_logged(secondary, SourceRole::Secondary, path);

        let entries = merge_entries(path, entries_a?, entries_b?)
            .map_err(|e| e.in_source(SourceRole::Primary, "read_dir", path))?;
        debug!(path, entries = entries.len(), "merged directory");
        let metadata = merged_dir_metadata(&primary_meta, &secondary_meta);
        Ok(Box::new(MergedDirectory::new(
            base_name(path),
            &metadata,
            entries,
        )))
    }
}

impl<P: FileSource, S: FileSource> FileSource for MergedFs<P, S> {
    fn open(&self, path: &str) -> Result<Box<dyn FileHandle>, FsError> {
        if !is_valid_path(path) {
            return Err(FsError::InvalidPath {
                path: path.to_string(),
            });
        }

        match self.primary.open(path) {
            Ok(handle) => {
                let metadata = match handle.stat() {
                    Ok(meta) => meta,
                    Err(e) => {
                        close_logged(handle, SourceRole::Primary, path);
                        return Err(e.in_source(SourceRole::Primary, "stat", path));
                    }
                };
                if !metadata.is_dir() {
                    trace!(path, "resolved in primary");
                    return Ok(handle);
                }
                self.open_merged(path, handle, metadata)
            }
            Err(e) if e.is_not_found() => {
                self.known_ok.validate(&self.primary, path)?;
                trace!(path, "delegating to secondary");
                self.secondary.open(path)
            }
            Err(e) => Err(e.in_source(SourceRole::Primary, "open", path)),
        }
    }

    /// Toggle prefix caching on this node and every composition beneath it.
    ///
    /// A child shared with another composition (through an `Arc`, say) is
    /// toggled too, so either parent can clear its cache.
    fn set_path_caching(&self, enabled: bool) {
        if self.known_ok.is_enabled() != enabled {
            info!(enabled, "path prefix caching toggled");
        }
        self.known_ok.set_enabled(enabled);
        self.primary.set_path_caching(enabled);
        self.secondary.set_path_caching(enabled);
    }
}

fn read_all(
    handle: &mut dyn FileHandle,
    role: SourceRole,
    path: &str,
) -> Result<Vec<DirEntry>, FsError> {
    let entries = handle
        .read_dir(0)
        .map_err(|e| e.in_source(role, "read_dir", path))?;
    Ok(entries.unwrap_or_default())
}

pub(crate) fn close_logged(mut handle: Box<dyn FileHandle>, role: SourceRole, path: &str) {
    if let Err(e) = handle.close() {
        warn!(path, %role, error = %e, "failed to close handle");
    }
}

impl<P, S> std::fmt::Debug for MergedFs<P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergedFs")
            .field("path_caching", &self.known_ok.is_enabled())
            .field("cached_prefixes", &self.known_ok.len())
            .finish_non_exhaustive()
    }
}
