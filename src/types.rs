//! Core types shared by file sources and handles.

use std::time::SystemTime;

/// Type of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link, as reported by a source that does not resolve links.
    Symlink,
}

/// Metadata reported by [`FileHandle::stat`](crate::FileHandle::stat).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metadata {
    /// Type of the entry.
    pub file_type: FileType,
    /// Permission bits.
    pub permissions: Permissions,
    /// Last modification time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub modified: SystemTime,
    /// Size in bytes. Zero for merged directories.
    pub size: u64,
}

impl Metadata {
    /// Metadata for a directory with the given permissions and mtime.
    pub fn directory(permissions: Permissions, modified: SystemTime) -> Self {
        Self {
            file_type: FileType::Directory,
            permissions,
            modified,
            size: 0,
        }
    }

    /// Returns `true` if this is a regular file.
    #[inline]
    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }

    /// Returns `true` if this is a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            file_type: FileType::File,
            permissions: Permissions::default_file(),
            modified: SystemTime::UNIX_EPOCH,
            size: 0,
        }
    }
}

/// A directory entry returned from [`FileHandle::read_dir`](crate::FileHandle::read_dir).
///
/// Carries the same metadata a direct open of the entry reports, so a
/// listing can be used without re-opening every child.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirEntry {
    /// Final path component.
    pub name: String,
    /// Type of the entry.
    pub file_type: FileType,
    /// Permission bits.
    pub permissions: Permissions,
    /// Last modification time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub modified: SystemTime,
    /// Size in bytes.
    pub size: u64,
}

impl DirEntry {
    /// Build an entry from a name and the metadata of the named path.
    pub fn from_metadata(name: impl Into<String>, metadata: &Metadata) -> Self {
        Self {
            name: name.into(),
            file_type: metadata.file_type,
            permissions: metadata.permissions,
            modified: metadata.modified,
            size: metadata.size,
        }
    }

    /// Returns `true` if the entry is a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }

    /// The metadata a direct open of this entry is expected to report.
    pub fn metadata(&self) -> Metadata {
        Metadata {
            file_type: self.file_type,
            permissions: self.permissions,
            modified: self.modified,
            size: self.size,
        }
    }
}

/// Unix-style permissions stored as a mode bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Permissions(u32);

impl Permissions {
    /// Create permissions from a Unix mode (e.g., 0o755).
    #[inline]
    pub const fn from_mode(mode: u32) -> Self {
        Self(mode & 0o7777)
    }

    /// Get the raw mode value.
    #[inline]
    pub const fn mode(&self) -> u32 {
        self.0
    }

    /// Returns `true` if these permissions deny writing.
    #[inline]
    pub const fn readonly(&self) -> bool {
        (self.0 & 0o222) == 0
    }

    /// Default permissions for a file (0o644 = rw-r--r--).
    #[inline]
    pub const fn default_file() -> Self {
        Self(0o644)
    }

    /// Default permissions for a directory (0o755 = rwxr-xr-x).
    #[inline]
    pub const fn default_dir() -> Self {
        Self(0o755)
    }

    /// Permissions of directories a source synthesizes (0o555 = r-xr-xr-x).
    #[inline]
    pub const fn implicit_dir() -> Self {
        Self(0o555)
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::default_file()
    }
}

/// Behavior applied to each [`MergedFs`](crate::MergedFs) node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MergeOptions {
    /// Memoize ancestor prefixes confirmed not to be shadowed.
    pub path_caching: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self { path_caching: true }
    }
}

/// Serde support for SystemTime (when serde feature is enabled).
#[cfg(feature = "serde")]
mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        (duration.as_secs(), duration.subsec_nanos()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (secs, nanos): (u64, u32) = Deserialize::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::new(secs, nanos))
    }
}
