//! Repository error type.

use arbor_store::{ObjectKind, StoreError};
use arbor_tree::TreeError;
use arbor_types::ObjectId;
use thiserror::Error;

use crate::repository::TreeHandle;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("object {id} is a {actual}, expected a {expected}")]
    KindMismatch {
        id: ObjectId,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    #[error("corrupt tree {id}: {source}")]
    CorruptTree {
        id: ObjectId,
        #[source]
        source: TreeError,
    },

    #[error("stale or unknown tree handle: {0:?}")]
    InvalidHandle(TreeHandle),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type RepoResult<T> = Result<T, RepoError>;
