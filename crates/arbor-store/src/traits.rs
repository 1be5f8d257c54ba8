use arbor_types::ObjectId;

use crate::error::StoreResult;
use crate::object::StoredObject;

/// Content-addressed object store.
///
/// This is the resolver every tree operation goes through: `read` fetches the
/// raw bytes and kind for an identity, `write` persists bytes and hands back
/// the identity computed over them.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. The same kind and data always
///   produce the same ID.
/// - The returned ID is `StoredObject::compute_id` of what was written.
/// - Backend failures are propagated as errors, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read an object by its content-addressed ID.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    /// Returns `Err` on I/O failure or data corruption.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;

    /// Write an object and return its content-addressed ID.
    ///
    /// If the object already exists, this is a no-op (idempotent).
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;
}

impl<S: ObjectStore + ?Sized> ObjectStore for &S {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        (**self).read(id)
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        (**self).write(object)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        (**self).exists(id)
    }
}
