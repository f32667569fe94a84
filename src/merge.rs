//! Directory entry merging.

use std::collections::HashMap;

use crate::{DirEntry, FsError, Metadata};

/// Merge the listings of one directory from a primary and a secondary
/// source.
///
/// Every primary entry is kept. A secondary entry is appended when its name
/// is new. On a name conflict the primary entry wins, except that two
/// directories collapse into one reconciled entry: primary name and
/// permissions, the later of the two modification times, size zero. That is
/// exactly what opening the sub-directory through a
/// [`MergedFs`](crate::MergedFs) reports, so listing and opening agree.
///
/// The result is sorted by name in byte order and has unique names.
///
/// # Errors
///
/// - [`FsError::DuplicateEntry`] if `primary` lists a name twice
///
/// # Example
///
/// ```rust
/// use merged_fs::{merge_entries, DirEntry, Metadata};
///
/// let file = Metadata::default();
/// let primary = vec![DirEntry::from_metadata("b", &file)];
/// let secondary = vec![
///     DirEntry::from_metadata("a", &file),
///     DirEntry::from_metadata("b", &file),
/// ];
/// let merged = merge_entries("docs", primary, secondary).unwrap();
/// let names: Vec<_> = merged.iter().map(|e| e.name.as_str()).collect();
/// assert_eq!(names, ["a", "b"]);
/// ```
pub fn merge_entries(
    dir: &str,
    primary: Vec<DirEntry>,
    secondary: Vec<DirEntry>,
) -> Result<Vec<DirEntry>, FsError> {
    let mut positions: HashMap<String, usize> =
        HashMap::with_capacity(primary.len() + secondary.len());
    let mut merged = Vec::with_capacity(primary.len() + secondary.len());

    for entry in primary {
        if positions.contains_key(&entry.name) {
            return Err(FsError::DuplicateEntry {
                path: dir.to_string(),
                name: entry.name,
            });
        }
        positions.insert(entry.name.clone(), merged.len());
        merged.push(entry);
    }

    for entry in secondary {
        let Some(&idx) = positions.get(&entry.name) else {
            positions.insert(entry.name.clone(), merged.len());
            merged.push(entry);
            continue;
        };
        if !(merged[idx].is_dir() && entry.is_dir()) {
            continue;
        }
        let reconciled = reconcile_dirs(&merged[idx], &entry);
        merged[idx] = reconciled;
    }

    merged.sort_unstable_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
    Ok(merged)
}

/// Metadata of a directory present in both sources.
pub(crate) fn merged_dir_metadata(primary: &Metadata, secondary: &Metadata) -> Metadata {
    Metadata::directory(
        primary.permissions,
        primary.modified.max(secondary.modified),
    )
}

fn reconcile_dirs(primary: &DirEntry, secondary: &DirEntry) -> DirEntry {
    let metadata = merged_dir_metadata(&primary.metadata(), &secondary.metadata());
    DirEntry::from_metadata(primary.name.clone(), &metadata)
}
