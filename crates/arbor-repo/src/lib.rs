//! Repository layer for Arbor.
//!
//! The [`Repository`] owns every tree it hands out. Callers receive a
//! [`TreeHandle`] and borrow the tree through the repository, so a tree can
//! only be dropped by the cache itself (eviction or an explicit
//! [`Repository::evict`]). Handles carry a generation and go stale rather
//! than dangling once their tree is gone.

pub mod config;
pub mod error;
pub mod repository;

pub use config::RepoConfig;
pub use error::{RepoError, RepoResult};
pub use repository::{Repository, ResolvedObject, TreeHandle};

// Re-export key types
pub use arbor_store::{Blob, Commit, InMemoryObjectStore, ObjectKind, ObjectStore};
pub use arbor_tree::{EntryMut, FileMode, Tree, TreeEntry, TreeState};
pub use arbor_types::ObjectId;
