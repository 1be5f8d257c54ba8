//! Content-addressed object storage for Arbor.
//!
//! This crate is the boundary between tree handling and whatever actually
//! persists objects (loose files, packs, a network remote). It defines the
//! unit of storage, the object kinds, and the [`ObjectStore`] trait the rest
//! of the workspace resolves identities through.
//!
//! # Object Types
//!
//! - [`Blob`] -- raw content (file contents, symlink targets)
//! - [`Commit`] -- opaque commit body, referenced by gitlink entries
//! - trees live in `arbor-tree`; the store only sees their encoded bytes
//!
//! # Storage Backends
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. The store computes the identity; callers never supply one on write.
//! 3. The store never interprets object contents.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod object;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryObjectStore;
pub use object::{Blob, Commit, ObjectKind, StoredObject};
pub use traits::ObjectStore;
