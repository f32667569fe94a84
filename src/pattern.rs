//! Shell-style pattern matching over a source's tree.

use ::glob::{MatchOptions, Pattern};
use tracing::trace;

use crate::ext::FileSourceExt;
use crate::path::{join, ROOT};
use crate::{FileSource, FsError};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Names of every path in `source` matching `pattern`.
///
/// Patterns use the syntax of [`glob::Pattern`] and are matched one path
/// component at a time, so `*` never crosses a `/`. Results come back in
/// lexical order. Directories that vanish or turn out to be files while
/// being listed are skipped.
///
/// # Errors
///
/// - [`FsError::InvalidPattern`] if `pattern` is malformed
/// - any fatal error raised by `source`
///
/// # Example
///
/// ```rust
/// use merged_fs::sources::MemorySource;
/// use merged_fs::{glob, MergedFs};
///
/// let merged = MergedFs::new(
///     MemorySource::new().with_file("logs/a.log", "").with_file("logs/b.txt", ""),
///     MemorySource::new().with_file("logs/c.log", ""),
/// );
/// assert_eq!(glob(&merged, "logs/*.log").unwrap(), ["logs/a.log", "logs/c.log"]);
/// ```
pub fn glob<S>(source: &S, pattern: &str) -> Result<Vec<String>, FsError>
where
    S: FileSource + ?Sized,
{
    compile(pattern)?;
    expand(source, pattern)
}

fn compile(pattern: &str) -> Result<Pattern, FsError> {
    Pattern::new(pattern).map_err(|e| FsError::InvalidPattern {
        pattern: pattern.to_string(),
        details: e.to_string(),
    })
}

fn has_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '\\'])
}

fn expand<S>(source: &S, pattern: &str) -> Result<Vec<String>, FsError>
where
    S: FileSource + ?Sized,
{
    if !has_meta(pattern) {
        return match source.stat(pattern) {
            Ok(_) => Ok(vec![pattern.to_string()]),
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(e),
        };
    }

    let (dir, name) = match pattern.rfind('/') {
        Some(idx) => (&pattern[..idx], &pattern[idx + 1..]),
        None => (ROOT, pattern),
    };
    let dirs = if has_meta(dir) {
        expand(source, dir)?
    } else {
        vec![dir.to_string()]
    };

    let name_pattern = compile(name)?;
    let mut matches = Vec::new();
    for dir in dirs {
        matches.extend(matches_in(source, &dir, &name_pattern)?);
    }
    Ok(matches)
}

fn matches_in<S>(source: &S, dir: &str, pattern: &Pattern) -> Result<Vec<String>, FsError>
where
    S: FileSource + ?Sized,
{
    let entries = match source.read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.is_not_found() || matches!(e, FsError::NotADirectory { .. }) => {
            trace!(dir, error = %e, "skipping unlistable directory");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };
    Ok(entries
        .into_iter()
        .filter(|entry| pattern.matches_with(&entry.name, MATCH_OPTIONS))
        .map(|entry| join(dir, &entry.name))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MemorySource;

    fn tree() -> MemorySource {
        MemorySource::new()
            .with_file("a.txt", "")
            .with_file("b.md", "")
            .with_file("src/lib.rs", "")
            .with_file("src/main.rs", "")
            .with_file("src/util/mod.rs", "")
            .with_file("tests/it.rs", "")
    }

    #[test]
    fn matches_at_root() {
        assert_eq!(glob(&tree(), "*.txt").unwrap(), ["a.txt"]);
        assert_eq!(glob(&tree(), "?.*").unwrap(), ["a.txt", "b.md"]);
    }

    #[test]
    fn star_does_not_cross_separators() {
        assert_eq!(
            glob(&tree(), "src/*.rs").unwrap(),
            ["src/lib.rs", "src/main.rs"]
        );
        assert_eq!(
            glob(&tree(), "*/*.rs").unwrap(),
            ["src/lib.rs", "src/main.rs", "tests/it.rs"]
        );
    }

    #[test]
    fn literal_pattern_checks_existence() {
        assert_eq!(glob(&tree(), "src/util").unwrap(), ["src/util"]);
        assert!(glob(&tree(), "nope").unwrap().is_empty());
    }

    #[test]
    fn files_in_directory_position_are_skipped() {
        assert!(glob(&tree(), "a.txt/*").unwrap().is_empty());
    }

    #[test]
    fn malformed_pattern_is_rejected() {
        assert!(matches!(
            glob(&tree(), "src/[").unwrap_err(),
            FsError::InvalidPattern { .. }
        ));
    }
}
