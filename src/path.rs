//! Source path syntax.
//!
//! Paths handed to a [`FileSource`](crate::FileSource) are `/`-separated,
//! relative to the source root, and already normalized: `"."` names the
//! root, and every other path is one or more non-empty components with no
//! leading or trailing separator and no `.` or `..` components.

/// The path of a source's root directory.
pub const ROOT: &str = ".";

/// Returns `true` if `path` is a valid source path.
///
/// ```rust
/// use merged_fs::path::is_valid_path;
///
/// assert!(is_valid_path("."));
/// assert!(is_valid_path("a/b.txt"));
/// assert!(!is_valid_path("/a"));
/// assert!(!is_valid_path("a/../b"));
/// ```
pub fn is_valid_path(path: &str) -> bool {
    if path == ROOT {
        return true;
    }
    !path.is_empty()
        && path
            .split('/')
            .all(|component| !component.is_empty() && component != "." && component != "..")
}

/// Final component of a valid path. The root's base name is `"."`.
pub fn base_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Join a directory path and an entry name.
pub fn join(dir: &str, name: &str) -> String {
    if dir == ROOT {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// Iterate over the prefixes of `path`, shortest first.
///
/// `"a/b/c"` yields `"a"`, `"a/b"`, `"a/b/c"`.
pub fn prefixes(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/')
        .map(move |(idx, _)| &path[..idx])
        .chain(std::iter::once(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_paths() {
        for path in [".", "a", "a/b", "a.txt", "a/b/c.d", "..a", "a..", ".hidden"] {
            assert!(is_valid_path(path), "{path} should be valid");
        }
    }

    #[test]
    fn invalid_paths() {
        for path in ["", "/", "/a", "a/", "a//b", "./a", "a/.", "..", "a/../b", "a/./b"] {
            assert!(!is_valid_path(path), "{path} should be invalid");
        }
    }

    #[test]
    fn base_name_of_nested_path() {
        assert_eq!(base_name("a/b/c.txt"), "c.txt");
        assert_eq!(base_name("top"), "top");
        assert_eq!(base_name(ROOT), ".");
    }

    #[test]
    fn join_handles_root() {
        assert_eq!(join(ROOT, "a"), "a");
        assert_eq!(join("a/b", "c"), "a/b/c");
    }

    #[test]
    fn prefixes_shortest_first() {
        let got: Vec<_> = prefixes("a/b/c").collect();
        assert_eq!(got, vec!["a", "a/b", "a/b/c"]);
        let single: Vec<_> = prefixes("a").collect();
        assert_eq!(single, vec!["a"]);
    }
}
