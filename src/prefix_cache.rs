//! Memoized shadowing checks for one composition node.

use std::collections::HashSet;

use parking_lot::RwLock;

use crate::merged_fs::close_logged;
use crate::path::prefixes;
use crate::{FileSource, FsError, SourceRole};

struct CacheState {
    enabled: bool,
    known_ok: HashSet<String>,
}

/// Remembers which path prefixes are known not to be shadowed by a
/// non-directory in a node's primary source.
///
/// The enabled flag and the prefix set share one lock: a disable clears the
/// set atomically, and a validation racing with it cannot re-insert a stale
/// prefix afterwards. The lock is never held while the primary source is
/// queried, so two threads may validate the same prefix at once; both reach
/// the same answer.
pub(crate) struct ShadowPrefixCache {
    state: RwLock<CacheState>,
}

impl ShadowPrefixCache {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            state: RwLock::new(CacheState {
                enabled,
                known_ok: HashSet::new(),
            }),
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.state.read().enabled
    }

    /// Toggle caching. Disabling drops every cached prefix.
    pub(crate) fn set_enabled(&self, enabled: bool) {
        let mut state = self.state.write();
        state.enabled = enabled;
        if !enabled {
            state.known_ok.clear();
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.state.read().known_ok.len()
    }

    fn is_known_ok(&self, prefix: &str) -> bool {
        let state = self.state.read();
        state.enabled && state.known_ok.contains(prefix)
    }

    fn mark_ok<'a>(&self, paths: impl IntoIterator<Item = &'a str>) {
        let mut state = self.state.write();
        if !state.enabled {
            return;
        }
        for path in paths {
            if !state.known_ok.contains(path) {
                state.known_ok.insert(path.to_string());
            }
        }
    }

    /// Check that no prefix of `path` is a non-directory in `primary`.
    ///
    /// Called after `primary` reported `path` itself as not found.
    ///
    /// # Errors
    ///
    /// - [`FsError::Shadowed`] naming the blocking prefix
    /// - [`FsError::Inconsistent`], attributed to the primary source, if
    ///   `primary` now resolves `path` itself
    /// - any fatal error from `primary`, attributed to the primary source
    pub(crate) fn validate<S>(&self, primary: &S, path: &str) -> Result<(), FsError>
    where
        S: FileSource + ?Sized,
    {
        if self.is_known_ok(path) {
            return Ok(());
        }

        for prefix in prefixes(path) {
            if self.is_known_ok(prefix) {
                continue;
            }
            let handle = match primary.open(prefix) {
                Ok(handle) => handle,
                Err(e) if e.is_not_found() => {
                    // Nothing below a missing prefix exists in primary either.
                    self.mark_ok([prefix, path]);
                    return Ok(());
                }
                Err(e) => return Err(e.in_source(SourceRole::Primary, "open", prefix)),
            };
            let stat = handle.stat();
            close_logged(handle, SourceRole::Primary, prefix);
            let metadata = stat.map_err(|e| e.in_source(SourceRole::Primary, "stat", prefix))?;
            if !metadata.is_dir() {
                tracing::debug!(path, prefix, "path shadowed by non-directory in primary");
                return Err(FsError::Shadowed {
                    path: path.to_string(),
                    prefix: prefix.to_string(),
                });
            }
            if prefix == path {
                let inconsistent = FsError::Inconsistent {
                    path: path.to_string(),
                    details: "reported the path missing, then resolved it as a directory"
                        .to_string(),
                };
                return Err(inconsistent.in_source(SourceRole::Primary, "open", path));
            }
            self.mark_ok([prefix]);
        }

        Ok(())
    }
}
