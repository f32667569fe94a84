//! In-memory source.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::RwLock;

use crate::path::{base_name, is_valid_path, prefixes, ROOT};
use crate::traits::paginate;
use crate::{DirEntry, FileHandle, FileSource, FileType, FsError, Metadata, Permissions};

#[derive(Debug, Clone)]
struct Node {
    metadata: Metadata,
    data: Arc<[u8]>,
}

impl Node {
    fn implicit_dir() -> Self {
        Self::dir(Permissions::implicit_dir(), SystemTime::UNIX_EPOCH)
    }

    fn dir(permissions: Permissions, modified: SystemTime) -> Self {
        Self {
            metadata: Metadata::directory(permissions, modified),
            data: Arc::from(Vec::new()),
        }
    }

    fn file(data: Vec<u8>, permissions: Permissions, modified: SystemTime) -> Self {
        Self {
            metadata: Metadata {
                file_type: FileType::File,
                permissions,
                modified,
                size: data.len() as u64,
            },
            data: Arc::from(data),
        }
    }
}

/// A thread-safe in-memory tree of files and directories.
///
/// Parent directories of inserted paths are created implicitly with mode
/// `0o555` and an epoch modification time. Contents may be changed at any
/// time through `&self`, which makes this source handy for exercising how a
/// composition copes with sources that change between calls.
///
/// # Example
///
/// ```rust
/// use merged_fs::sources::MemorySource;
/// use merged_fs::FileSourceExt;
///
/// let source = MemorySource::new().with_file("docs/readme.md", "# hi");
/// assert!(source.is_dir("docs").unwrap());
/// assert_eq!(source.read_to_string("docs/readme.md").unwrap(), "# hi");
/// ```
#[derive(Debug)]
pub struct MemorySource {
    nodes: RwLock<BTreeMap<String, Node>>,
}

impl MemorySource {
    /// An empty source holding only the root directory.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(ROOT.to_string(), Node::implicit_dir());
        Self {
            nodes: RwLock::new(nodes),
        }
    }

    /// Builder form of [`insert_file`](Self::insert_file).
    ///
    /// # Panics
    ///
    /// Panics if the insert fails.
    pub fn with_file(self, path: &str, data: impl Into<Vec<u8>>) -> Self {
        if let Err(e) = self.insert_file(path, data) {
            panic!("MemorySource::with_file({path:?}): {e}");
        }
        self
    }

    /// Builder form of [`insert_file_with`](Self::insert_file_with).
    ///
    /// # Panics
    ///
    /// Panics if the insert fails.
    pub fn with_file_meta(
        self,
        path: &str,
        data: impl Into<Vec<u8>>,
        permissions: Permissions,
        modified: SystemTime,
    ) -> Self {
        if let Err(e) = self.insert_file_with(path, data, permissions, modified) {
            panic!("MemorySource::with_file_meta({path:?}): {e}");
        }
        self
    }

    /// Builder form of [`insert_dir`](Self::insert_dir).
    ///
    /// # Panics
    ///
    /// Panics if the insert fails.
    pub fn with_dir(self, path: &str, permissions: Permissions, modified: SystemTime) -> Self {
        if let Err(e) = self.insert_dir(path, permissions, modified) {
            panic!("MemorySource::with_dir({path:?}): {e}");
        }
        self
    }

    /// Insert or replace a regular file with default permissions and the
    /// current time.
    pub fn insert_file(&self, path: &str, data: impl Into<Vec<u8>>) -> Result<(), FsError> {
        self.insert_file_with(path, data, Permissions::default_file(), SystemTime::now())
    }

    /// Insert or replace a regular file.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPath`] for an invalid path or the root
    /// - [`FsError::NotADirectory`] if an ancestor is a file
    /// - [`FsError::IsADirectory`] if `path` is a directory
    pub fn insert_file_with(
        &self,
        path: &str,
        data: impl Into<Vec<u8>>,
        permissions: Permissions,
        modified: SystemTime,
    ) -> Result<(), FsError> {
        if path == ROOT {
            return Err(FsError::InvalidPath {
                path: path.to_string(),
            });
        }
        let mut nodes = self.nodes.write();
        ensure_parents(&mut nodes, path)?;
        if nodes.get(path).is_some_and(|n| n.metadata.is_dir()) {
            return Err(FsError::IsADirectory {
                path: path.to_string(),
            });
        }
        nodes.insert(path.to_string(), Node::file(data.into(), permissions, modified));
        Ok(())
    }

    /// Insert a directory, or update the metadata of an existing one.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPath`] for an invalid path
    /// - [`FsError::NotADirectory`] if `path` or an ancestor is a file
    pub fn insert_dir(
        &self,
        path: &str,
        permissions: Permissions,
        modified: SystemTime,
    ) -> Result<(), FsError> {
        let mut nodes = self.nodes.write();
        if path != ROOT {
            ensure_parents(&mut nodes, path)?;
        }
        if nodes.get(path).is_some_and(|n| !n.metadata.is_dir()) {
            return Err(FsError::NotADirectory {
                path: path.to_string(),
            });
        }
        nodes.insert(path.to_string(), Node::dir(permissions, modified));
        Ok(())
    }

    /// Remove a file, or a directory together with everything beneath it.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPath`] for an invalid path or the root
    /// - [`FsError::NotFound`] if nothing exists at `path`
    pub fn remove(&self, path: &str) -> Result<(), FsError> {
        if path == ROOT || !is_valid_path(path) {
            return Err(FsError::InvalidPath {
                path: path.to_string(),
            });
        }
        let mut nodes = self.nodes.write();
        if nodes.remove(path).is_none() {
            return Err(FsError::NotFound {
                path: path.to_string(),
            });
        }
        let descendant_prefix = format!("{path}/");
        nodes.retain(|key, _| !key.starts_with(&descendant_prefix));
        Ok(())
    }

    fn children(nodes: &BTreeMap<String, Node>, dir: &str) -> Vec<DirEntry> {
        if dir == ROOT {
            return nodes
                .iter()
                .filter(|(key, _)| key.as_str() != ROOT && !key.contains('/'))
                .map(|(key, node)| DirEntry::from_metadata(key.as_str(), &node.metadata))
                .collect();
        }
        let prefix = format!("{dir}/");
        nodes
            .range::<str, _>((Bound::Excluded(prefix.as_str()), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter_map(|(key, node)| {
                let name = &key[prefix.len()..];
                (!name.contains('/')).then(|| DirEntry::from_metadata(name, &node.metadata))
            })
            .collect()
    }
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_parents(nodes: &mut BTreeMap<String, Node>, path: &str) -> Result<(), FsError> {
    if !is_valid_path(path) {
        return Err(FsError::InvalidPath {
            path: path.to_string(),
        });
    }
    for parent in prefixes(path).filter(|p| *p != path) {
        match nodes.get(parent) {
            Some(node) if !node.metadata.is_dir() => {
                return Err(FsError::NotADirectory {
                    path: parent.to_string(),
                });
            }
            Some(_) => {}
            None => {
                nodes.insert(parent.to_string(), Node::implicit_dir());
            }
        }
    }
    Ok(())
}

impl FileSource for MemorySource {
    fn open(&self, path: &str) -> Result<Box<dyn FileHandle>, FsError> {
        if !is_valid_path(path) {
            return Err(FsError::InvalidPath {
                path: path.to_string(),
            });
        }
        let nodes = self.nodes.read();
        let node = nodes.get(path).ok_or_else(|| FsError::NotFound {
            path: path.to_string(),
        })?;
        if node.metadata.is_dir() {
            let entries = Self::children(&nodes, path);
            return Ok(Box::new(MemoryDir {
                path: path.to_string(),
                metadata: node.metadata.clone(),
                entries,
                cursor: 0,
            }));
        }
        Ok(Box::new(MemoryFile {
            path: path.to_string(),
            metadata: node.metadata.clone(),
            data: Arc::clone(&node.data),
            offset: 0,
        }))
    }
}

struct MemoryFile {
    path: String,
    metadata: Metadata,
    data: Arc<[u8]>,
    offset: usize,
}

impl FileHandle for MemoryFile {
    fn stat(&self) -> Result<Metadata, FsError> {
        Ok(self.metadata.clone())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsError> {
        let remaining = self.data.get(self.offset..).unwrap_or_default();
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.offset += n;
        Ok(n)
    }

    fn read_dir(&mut self, _n: usize) -> Result<Option<Vec<DirEntry>>, FsError> {
        Err(FsError::NotADirectory {
            path: self.path.clone(),
        })
    }

    fn close(&mut self) -> Result<(), FsError> {
        self.offset = 0;
        Ok(())
    }
}

struct MemoryDir {
    path: String,
    metadata: Metadata,
    entries: Vec<DirEntry>,
    cursor: usize,
}

impl FileHandle for MemoryDir {
    fn stat(&self) -> Result<Metadata, FsError> {
        Ok(self.metadata.clone())
    }

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, FsError> {
        Err(FsError::IsADirectory {
            path: base_name(&self.path).to_string(),
        })
    }

    fn read_dir(&mut self, n: usize) -> Result<Option<Vec<DirEntry>>, FsError> {
        Ok(paginate(&self.entries, &mut self.cursor, n))
    }

    fn close(&mut self) -> Result<(), FsError> {
        self.entries.clear();
        self.cursor = 0;
        Ok(())
    }
}
