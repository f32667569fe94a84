//! Source backed by a directory of the host filesystem.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, warn};

use crate::path::{base_name, is_valid_path, ROOT};
use crate::traits::paginate;
use crate::{DirEntry, FileHandle, FileSource, FileType, FsError, Metadata, Permissions};

/// Read-only view of a host directory tree.
///
/// Symbolic links are followed; entries whose target is missing are left
/// out of listings so that every listed name can also be opened. Listings
/// are sorted by name.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Serve the tree below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The host directory being served.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn host_path(&self, path: &str) -> PathBuf {
        if path == ROOT {
            self.root.clone()
        } else {
            path.split('/').fold(self.root.clone(), |acc, part| acc.join(part))
        }
    }

    fn list(&self, path: &str, host: &Path) -> Result<Vec<DirEntry>, FsError> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(host).map_err(|e| FsError::io("read_dir", path, e))? {
            let entry = entry.map_err(|e| FsError::io("read_dir", path, e))?;
            let Ok(name) = entry.file_name().into_string() else {
                warn!(path, name = ?entry.file_name(), "skipping non UTF-8 entry");
                continue;
            };
            match fs::metadata(entry.path()) {
                Ok(meta) => entries.push(DirEntry::from_metadata(name, &convert_metadata(&meta))),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(path, name = %name, "skipping dangling link");
                }
                Err(e) => return Err(FsError::io("stat", path, e)),
            }
        }
        entries.sort_unstable_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
        Ok(entries)
    }
}

impl FileSource for DirSource {
    fn open(&self, path: &str) -> Result<Box<dyn FileHandle>, FsError> {
        if !is_valid_path(path) {
            return Err(FsError::InvalidPath {
                path: path.to_string(),
            });
        }
        let host = self.host_path(path);
        let meta = fs::metadata(&host).map_err(|e| FsError::io("stat", path, e))?;
        let metadata = convert_metadata(&meta);
        if metadata.is_dir() {
            let entries = self.list(path, &host)?;
            return Ok(Box::new(NativeDir {
                path: path.to_string(),
                metadata,
                entries,
                cursor: 0,
            }));
        }
        let file = fs::File::open(&host).map_err(|e| FsError::io("open", path, e))?;
        Ok(Box::new(NativeFile {
            path: path.to_string(),
            metadata,
            file: Some(file),
        }))
    }
}

fn convert_metadata(meta: &fs::Metadata) -> Metadata {
    // `fs::metadata` follows links, so a link reports its target's type.
    let file_type = if meta.is_dir() {
        FileType::Directory
    } else {
        FileType::File
    };
    Metadata {
        file_type,
        permissions: host_permissions(meta),
        modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        size: meta.len(),
    }
}

#[cfg(unix)]
fn host_permissions(meta: &fs::Metadata) -> Permissions {
    use std::os::unix::fs::PermissionsExt;
    Permissions::from_mode(meta.permissions().mode())
}

#[cfg(not(unix))]
fn host_permissions(meta: &fs::Metadata) -> Permissions {
    let base = if meta.is_dir() { 0o755 } else { 0o644 };
    if meta.permissions().readonly() {
        Permissions::from_mode(base & 0o555)
    } else {
        Permissions::from_mode(base)
    }
}

struct NativeFile {
    path: String,
    metadata: Metadata,
    file: Option<fs::File>,
}

impl FileHandle for NativeFile {
    fn stat(&self) -> Result<Metadata, FsError> {
        Ok(self.metadata.clone())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsError> {
        let Some(file) = self.file.as_mut() else {
            return Err(FsError::Io {
                operation: "read",
                path: self.path.clone(),
                source: std::io::Error::other("file already closed"),
            });
        };
        file.read(buf).map_err(|e| FsError::io("read", &self.path, e))
    }

    fn read_dir(&mut self, _n: usize) -> Result<Option<Vec<DirEntry>>, FsError> {
        Err(FsError::NotADirectory {
            path: self.path.clone(),
        })
    }

    fn close(&mut self) -> Result<(), FsError> {
        self.file = None;
        Ok(())
    }
}

struct NativeDir {
    path: String,
    metadata: Metadata,
    entries: Vec<DirEntry>,
    cursor: usize,
}

impl FileHandle for NativeDir {
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
