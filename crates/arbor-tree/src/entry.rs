//! Tree entries and the canonical name order.
//!
//! Directory names compare as if followed by `/`, so `"a.txt"` precedes a
//! directory `"a"` while a file `"a"` precedes both. Lookups rely on that
//! order and search both positions a name can take.

use std::cmp::Ordering;

use arbor_types::ObjectId;

use crate::error::{TreeError, TreeResult};
use crate::mode::FileMode;

/// A single entry in a tree object.
///
/// Entries are read-only from the outside; edits go through
/// [`Tree::entry_mut`](crate::Tree::entry_mut) so the owning tree can keep
/// its ordering and drop its identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TreeEntry {
    pub(crate) mode: FileMode,
    pub(crate) name: Vec<u8>,
    pub(crate) id: ObjectId,
}

impl TreeEntry {
    /// Create a new tree entry, validating the name.
    pub fn new(mode: FileMode, name: impl AsRef<[u8]>, id: ObjectId) -> TreeResult<Self> {
        let name = name.as_ref();
        validate_name(name)?;
        Ok(Self {
            mode,
            name: name.to_vec(),
            id,
        })
    }

    /// File mode of the entry.
    pub fn mode(&self) -> FileMode {
        self.mode
    }

    /// Raw mode bits, e.g. `0o100644`.
    pub fn attributes(&self) -> u32 {
        self.mode.mode_bits()
    }

    /// Entry name as raw bytes.
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Entry name, if it is valid UTF-8.
    pub fn name_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.name).ok()
    }

    /// ID of the object this entry points at.
    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    /// Whether this entry is a subdirectory.
    pub fn is_tree(&self) -> bool {
        self.mode.is_tree()
    }

    /// Compare two entries in canonical tree order.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        compare_names(&self.name, self.is_tree(), &other.name, other.is_tree())
    }

    pub(crate) fn display_name(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }
}

/// Canonical tree ordering of two names.
///
/// Names compare byte-wise, except that a directory name compares as if a
/// trailing `/` were appended. `"a.txt"` therefore sorts before a directory
/// `"a"` (`'.' < '/'`), while a file `"a"` sorts before both.
pub fn compare_names(a: &[u8], a_is_tree: bool, b: &[u8], b_is_tree: bool) -> Ordering {
    let a = a.iter().chain(a_is_tree.then_some(&b'/'));
    let b = b.iter().chain(b_is_tree.then_some(&b'/'));
    a.cmp(b)
}

/// Check that `name` can appear in a tree: non-empty, no NUL, no `/`.
pub fn validate_name(name: &[u8]) -> TreeResult<()> {
    let reason = if name.is_empty() {
        "must not be empty"
    } else if name.contains(&0) {
        "must not contain a NUL byte"
    } else if name.contains(&b'/') {
        "must not contain '/'"
    } else {
        return Ok(());
    };
    Err(TreeError::InvalidName {
        name: String::from_utf8_lossy(name).into_owned(),
        reason,
    })
}

/// Position of the entry named exactly `name`, whatever its mode.
///
/// `entries` must be in canonical order. A name can sit at two places in that
/// order (as a file key or a directory key), so both are searched. A directory
/// key also matches a query ending in `/`, so hits are checked byte for byte.
pub(crate) fn find(entries: &[TreeEntry], name: &[u8]) -> Option<usize> {
    [false, true].into_iter().find_map(|as_tree| {
        entries
            .binary_search_by(|e| compare_names(&e.name, e.is_tree(), name, as_tree))
            .ok()
            .filter(|&i| entries[i].name == name)
    })
}

/// Where `entry` belongs in `entries`, or `None` if its exact key is taken.
pub(crate) fn insertion_point(entries: &[TreeEntry], entry: &TreeEntry) -> Option<usize> {
    entries
        .binary_search_by(|e| e.canonical_cmp(entry))
        .err()
}
