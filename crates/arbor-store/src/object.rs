use arbor_crypto::ObjectHasher;
use arbor_types::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Raw content (file contents, symlink targets).
    Blob,
    /// Directory listing: ordered entries mapping names to object references.
    Tree,
    /// Snapshot commit; only referenced here through gitlink entries.
    Commit,
}

impl ObjectKind {
    /// The hasher whose header tag matches this kind.
    pub fn hasher(&self) -> &'static ObjectHasher {
        match self {
            Self::Blob => &ObjectHasher::BLOB,
            Self::Tree => &ObjectHasher::TREE,
            Self::Commit => &ObjectHasher::COMMIT,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hasher().kind())
    }
}

/// A stored object: kind tag + body bytes + cached size.
///
/// `StoredObject` is the unit of storage. The body excludes the object header;
/// the header is only materialized while hashing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// The type of this object.
    pub kind: ObjectKind,
    /// The body bytes of the object.
    pub data: Vec<u8>,
    /// The size of `data` in bytes.
    pub size: u64,
}

impl StoredObject {
    /// Create a new stored object from kind and data.
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// Compute the content-addressed ID for this object.
    pub fn compute_id(&self) -> ObjectId {
        self.kind.hasher().hash(&self.data)
    }

    /// Check that this object hashes to `id`.
    pub fn verify(&self, id: &ObjectId) -> StoreResult<()> {
        let computed = self.compute_id();
        if computed != *id {
            return Err(StoreError::HashMismatch { id: *id, computed });
        }
        Ok(())
    }

    fn expect_kind(&self, expected: ObjectKind) -> StoreResult<()> {
        if self.kind != expected {
            return Err(StoreError::CorruptObject {
                id: self.compute_id(),
                reason: format!("expected {expected}, got {}", self.kind),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw content object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    /// Create a new blob from raw bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Blob, self.data.clone())
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Blob)?;
        Ok(Self {
            data: obj.data.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// Commit object body, kept opaque.
///
/// Commit parsing belongs to a higher layer; trees only need to hand the
/// bytes back when a gitlink entry is resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    pub data: Vec<u8>,
}

impl Commit {
    /// Create a commit from its raw body.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Commit, self.data.clone())
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Commit)?;
        Ok(Self {
            data: obj.data.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_roundtrip() {
        let blob = Blob::new(b"hello world".to_vec());
        let stored = blob.to_stored_object();
        let decoded = Blob::from_stored_object(&stored).unwrap();
        assert_eq!(blob, decoded);
    }

    #[test]
    fn blob_kind_mismatch() {
        let stored = StoredObject::new(ObjectKind::Tree, b"not a blob".to_vec());
        let err = Blob::from_stored_object(&stored).unwrap_err();
        assert!(matches!(err, StoreError::CorruptObject { .. }));
    }

    #[test]
    fn commit_kind_mismatch() {
        let stored = Blob::new(b"x".to_vec()).to_stored_object();
        assert!(Commit::from_stored_object(&stored).is_err());
        let commit = Commit::new(b"tree 4b82\n".to_vec());
        let back = Commit::from_stored_object(&commit.to_stored_object()).unwrap();
        assert_eq!(back, commit);
    }

    #[test]
    fn stored_object_id_matches_git() {
        let obj = StoredObject::new(ObjectKind::Blob, b"hello\n".to_vec());
        assert_eq!(
            obj.compute_id().to_hex(),
            "ce013625030ba8dba906f756967f9e9ca394464a"
        );
        assert_eq!(obj.size, 6);
    }

    #[test]
    fn verify_detects_mismatch() {
        let obj = StoredObject::new(ObjectKind::Blob, b"content".to_vec());
        let id = obj.compute_id();
        assert!(obj.verify(&id).is_ok());
        let err = obj.verify(&ObjectId::null()).unwrap_err();
        assert!(matches!(err, StoreError::HashMismatch { computed, .. } if computed == id));
    }

    #[test]
    fn different_kinds_produce_different_ids() {
        let data = b"same data".to_vec();
        let blob = StoredObject::new(ObjectKind::Blob, data.clone());
        let tree = StoredObject::new(ObjectKind::Tree, data.clone());
        let commit = StoredObject::new(ObjectKind::Commit, data);
        assert_ne!(blob.compute_id(), tree.compute_id());
        assert_ne!(blob.compute_id(), commit.compute_id());
    }

    #[test]
    fn object_kind_display_and_serde() {
        assert_eq!(ObjectKind::Blob.to_string(), "blob");
        assert_eq!(ObjectKind::Tree.to_string(), "tree");
        assert_eq!(ObjectKind::Commit.to_string(), "commit");
        assert_eq!(serde_json::to_string(&ObjectKind::Tree).unwrap(), "\"tree\"");
    }
}
