//! Object hashing for Arbor.
//!
//! Identities are SHA-1 digests over `"<kind> <len>\0"` followed by the object
//! body, the header convention shared by every object kind in the store.
//!
//! All digest work wraps an established library — no custom cryptography.

pub mod hasher;

pub use hasher::ObjectHasher;
