//! Foundation types for Arbor.
//!
//! Every other Arbor crate depends on `arbor-types` for the identity type
//! shared by trees, blobs, and commits.
//!
//! # Key Types
//!
//! - [`ObjectId`] — Content-addressed identifier (20-byte SHA-1 digest)
//! - [`TypeError`] — Parse failures for identities

pub mod error;
pub mod object;

pub use error::TypeError;
pub use object::{ObjectId, OBJECT_ID_LEN};
