//! Tree objects for Arbor.
//!
//! A tree is one directory level of a snapshot: an ordered list of
//! `(mode, name, id)` entries. This crate owns the in-memory [`Tree`], its
//! canonical ordering, and the byte codec whose output the store hashes into
//! the tree's identity.
//!
//! # Encoding
//!
//! ```text
//! tree-body := record*
//! record    := mode SP name NUL id(20 bytes)
//! ```
//!
//! Modes are minimal-width ASCII octal (`40000`, `100644`, ...). Entries are
//! sorted by name, with directories compared as if their name ended in `/`.
//! Only one byte sequence is a valid encoding of a given set of entries, so
//! decoding rejects anything out of order rather than repairing it.
//!
//! # Mutation
//!
//! Every edit drops the tree's identity. A new identity only comes from
//! [`Tree::write`], which encodes the entries and stores them.

pub mod codec;
pub mod entry;
pub mod error;
pub mod mode;
pub mod tree;

pub use codec::{decode, encode};
pub use entry::{compare_names, validate_name, TreeEntry};
pub use error::{TreeError, TreeResult};
pub use mode::FileMode;
pub use tree::{EntryMut, Tree, TreeState};
