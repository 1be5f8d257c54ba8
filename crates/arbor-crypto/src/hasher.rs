use arbor_types::ObjectId;
use sha1::{Digest, Sha1};

/// Header-prefixed SHA-1 object hasher.
///
/// Each hasher carries the kind tag (`"blob"`, `"tree"`, `"commit"`) written
/// into the object header before the body is digested. A blob and a tree with
/// identical bytes therefore produce different identities.
pub struct ObjectHasher {
    kind: &'static str,
}

impl ObjectHasher {
    /// Hasher for blob objects.
    pub const BLOB: Self = Self { kind: "blob" };
    /// Hasher for tree objects.
    pub const TREE: Self = Self { kind: "tree" };
    /// Hasher for commit objects.
    pub const COMMIT: Self = Self { kind: "commit" };

    /// The object header for a body of `len` bytes: `"<kind> <len>\0"`.
    pub fn header(&self, len: usize) -> Vec<u8> {
        format!("{} {}\0", self.kind, len).into_bytes()
    }

    /// Hash an object body, prefixing the header.
    pub fn hash(&self, data: &[u8]) -> ObjectId {
        let mut hasher = Sha1::new();
        hasher.update(self.header(data.len()));
        hasher.update(data);
        ObjectId::from_hash(hasher.finalize().into())
    }

    /// The kind tag used by this hasher.
    pub fn kind(&self) -> &str {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tree_has_well_known_id() {
        let id = ObjectHasher::TREE.hash(b"");
        assert_eq!(id.to_hex(), "4b825dc642cb6eb9a060e54bf8d69288fbee4904");
    }

    #[test]
    fn empty_blob_has_well_known_id() {
        let id = ObjectHasher::BLOB.hash(b"");
        assert_eq!(id.to_hex(), "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");
    }

    #[test]
    fn blob_matches_git_hash_object() {
        let id = ObjectHasher::BLOB.hash(b"hello\n");
        assert_eq!(id.to_hex(), "ce013625030ba8dba906f756967f9e9ca394464a");
    }

    #[test]
    fn header_format() {
        assert_eq!(ObjectHasher::TREE.header(37), b"tree 37\0".to_vec());
        assert_eq!(ObjectHasher::COMMIT.header(0), b"commit 0\0".to_vec());
    }

    #[test]
    fn different_kinds_produce_different_hashes() {
        let data = b"same content";
        let blob_hash = ObjectHasher::BLOB.hash(data);
        let tree_hash = ObjectHasher::TREE.hash(data);
        let commit_hash = ObjectHasher::COMMIT.hash(data);
        assert_ne!(blob_hash, tree_hash);
        assert_ne!(blob_hash, commit_hash);
        assert_ne!(tree_hash, commit_hash);
    }

    #[test]
    fn kind_tags() {
        assert_eq!(ObjectHasher::BLOB.kind(), "blob");
        assert_eq!(ObjectHasher::TREE.kind(), "tree");
        assert_eq!(ObjectHasher::COMMIT.kind(), "commit");
    }
}
