//! Error types for merged file sources.

use std::fmt;

/// Which side of a composition raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceRole {
    /// The higher-priority source.
    Primary,
    /// The lower-priority source.
    Secondary,
}

impl fmt::Display for SourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRole::Primary => f.write_str("primary"),
            SourceRole::Secondary => f.write_str("secondary"),
        }
    }
}

/// Error type shared by every [`FileSource`](crate::FileSource) and
/// [`FileHandle`](crate::FileHandle).
///
/// Variants fall into two classes. The NotFound class ([`NotFound`],
/// [`InvalidPath`], [`Shadowed`]) means "this source has no answer for the
/// path" and drives fallback between sources. Everything else is fatal and
/// is never answered by trying another source.
///
/// [`NotFound`]: FsError::NotFound
/// [`InvalidPath`]: FsError::InvalidPath
/// [`Shadowed`]: FsError::Shadowed
///
/// # Examples
///
/// ```rust
/// use merged_fs::FsError;
///
/// let err = FsError::NotFound { path: "docs/missing.txt".into() };
/// assert!(err.is_not_found());
/// assert_eq!(err.to_string(), "not found: docs/missing.txt");
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    // NotFound class
    /// Path does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: String,
    },

    /// Path is not a valid source path.
    #[error("invalid path: {path:?}")]
    InvalidPath {
        /// The rejected path.
        path: String,
    },

    /// Path is unreachable because an ancestor is a non-directory in a
    /// higher-priority source.
    #[error("not found: {path} (shadowed by non-directory {prefix} in primary source)")]
    Shadowed {
        /// The path that was requested.
        path: String,
        /// The ancestor occupied by a non-directory.
        prefix: String,
    },

    // Fatal class
    /// Expected a directory but found something else.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The path that is not a directory.
        path: String,
    },

    /// Attempted to read a directory as a byte stream.
    #[error("is a directory: {path}")]
    IsADirectory {
        /// The directory path.
        path: String,
    },

    /// A source listed the same name twice in one directory.
    #[error("duplicate entry {name:?} in directory {path}")]
    DuplicateEntry {
        /// The directory being listed.
        path: String,
        /// The repeated name.
        name: String,
    },

    /// A source reported contradictory states for one path.
    #[error("inconsistent source state at {path}: {details}")]
    Inconsistent {
        /// The path with contradictory state.
        path: String,
        /// What was observed.
        details: String,
    },

    /// A fatal error raised by one side of a composition.
    #[error("{operation} {path} in {role} source: {source}")]
    Source {
        /// Which source raised the error.
        role: SourceRole,
        /// The operation that failed.
        operation: &'static str,
        /// The path involved.
        path: String,
        /// The underlying error.
        #[source]
        source: Box<FsError>,
    },

    /// I/O error with context.
    #[error("{operation} failed for {path}: {source}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved in the operation.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A glob pattern could not be compiled.
    #[error("invalid pattern {pattern:?}: {details}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Why it was rejected.
        details: String,
    },

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),
}

impl FsError {
    /// Returns `true` for the NotFound class: the path is absent, malformed,
    /// or shadowed.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FsError::NotFound { .. } | FsError::InvalidPath { .. } | FsError::Shadowed { .. }
        )
    }

    /// Attribute a fatal error to one side of a composition.
    ///
    /// NotFound-class errors are returned unchanged so callers can keep
    /// branching on them.
    pub fn in_source(self, role: SourceRole, operation: &'static str, path: &str) -> Self {
        if self.is_not_found() {
            return self;
        }
        FsError::Source {
            role,
            operation,
            path: path.to_string(),
            source: Box::new(self),
        }
    }

    /// Convert an I/O error, mapping common kinds to specific variants.
    pub fn io(operation: &'static str, path: &str, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound {
                path: path.to_string(),
            },
            std::io::ErrorKind::NotADirectory => FsError::NotFound {
                path: path.to_string(),
            },
            std::io::ErrorKind::IsADirectory => FsError::IsADirectory {
                path: path.to_string(),
            },
            _ => FsError::Io {
                operation,
                path: path.to_string(),
                source: error,
            },
        }
    }
}
