//! Entry modes and their minimal octal encoding.

use arbor_store::ObjectKind;
use serde::{Deserialize, Serialize};

use crate::error::TreeError;

/// File mode for a tree entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileMode {
    /// Normal file (0o100644).
    Regular,
    /// Executable file (0o100755).
    Executable,
    /// Symbolic link (0o120000).
    Symlink,
    /// Subtree / directory (0o040000).
    Directory,
    /// Embedded repository, pointing at a commit (0o160000).
    Gitlink,
}

impl FileMode {
    /// Every supported mode.
    pub const ALL: [Self; 5] = [
        Self::Regular,
        Self::Executable,
        Self::Symlink,
        Self::Directory,
        Self::Gitlink,
    ];

    /// Octal mode value.
    pub fn mode_bits(&self) -> u32 {
        match self {
            Self::Regular => 0o100644,
            Self::Executable => 0o100755,
            Self::Symlink => 0o120000,
            Self::Directory => 0o040000,
            Self::Gitlink => 0o160000,
        }
    }

    /// Parse from an octal mode value.
    pub fn from_mode_bits(bits: u32) -> Option<Self> {
        match bits {
            0o100644 => Some(Self::Regular),
            0o100755 => Some(Self::Executable),
            0o120000 => Some(Self::Symlink),
            0o040000 => Some(Self::Directory),
            0o160000 => Some(Self::Gitlink),
            _ => None,
        }
    }

    /// Minimal ASCII octal form, as written in the tree encoding.
    pub fn as_octal(&self) -> &'static [u8] {
        match self {
            Self::Regular => b"100644",
            Self::Executable => b"100755",
            Self::Symlink => b"120000",
            Self::Directory => b"40000",
            Self::Gitlink => b"160000",
        }
    }

    /// Whether entries with this mode sort as directories.
    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Directory)
    }

    /// The kind of object an entry with this mode must point at.
    pub fn object_kind(&self) -> ObjectKind {
        match self {
            Self::Directory => ObjectKind::Tree,
            Self::Gitlink => ObjectKind::Commit,
            Self::Regular | Self::Executable | Self::Symlink => ObjectKind::Blob,
        }
    }
}

impl TryFrom<u32> for FileMode {
    type Error = TreeError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        Self::from_mode_bits(bits).ok_or(TreeError::InvalidMode(bits))
    }
}

impl From<FileMode> for u32 {
    fn from(mode: FileMode) -> Self {
        mode.mode_bits()
    }
}

impl std::fmt::Display for FileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06o}", self.mode_bits())
    }
}
