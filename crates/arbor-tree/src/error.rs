//! Tree error type.

use arbor_store::StoreError;

/// Errors from tree construction, mutation, and decoding.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// An entry name is empty or contains a forbidden byte.
    #[error("invalid entry name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// A mode outside the supported set.
    #[error("invalid file mode: {0:o}")]
    InvalidMode(u32),

    /// An add or rename would give two entries the same name.
    #[error("duplicate entry name: {0}")]
    DuplicateName(String),

    /// No entry at the given index or with the given name.
    #[error("entry not found: {0}")]
    NotFound(String),

    /// The encoded tree is structurally invalid.
    #[error("corrupt tree at byte {offset}: {reason}")]
    Corrupt { offset: usize, reason: String },

    /// Failure surfaced from the object store during write-back.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result alias for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
