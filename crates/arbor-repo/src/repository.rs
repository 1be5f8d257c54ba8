//! Tree cache and handle arena.

use std::collections::{HashMap, VecDeque};

use arbor_store::{Blob, Commit, ObjectKind, ObjectStore, StoredObject};
use arbor_tree::{Tree, TreeEntry};
use arbor_types::ObjectId;
use tracing::{debug, warn};

use crate::config::RepoConfig;
use crate::error::{RepoError, RepoResult};

/// Reference to a tree owned by a [`Repository`].
///
/// Handles are cheap to copy and never keep a tree alive. Once the tree is
/// evicted, the handle is rejected with [`RepoError::InvalidHandle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TreeHandle {
    index: usize,
    generation: u64,
}

/// The object a tree entry points at, typed by the entry's mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedObject {
    /// File, executable, or symlink target.
    Blob(Blob),
    /// Subdirectory, loaded into the repository's cache.
    Tree(TreeHandle),
    /// Commit of an embedded repository.
    Commit(Commit),
}

#[derive(Debug)]
struct Slot {
    generation: u64,
    tree: Option<Tree>,
}

/// Tree cache over an object store.
///
/// Trees loaded with [`lookup`](Self::lookup) or created with
/// [`new_tree`](Self::new_tree) live in the repository; callers borrow them
/// through [`tree`](Self::tree) and [`tree_mut`](Self::tree_mut) and persist
/// changes with [`write`](Self::write). No internal locking: one owner
/// mutates at a time.
pub struct Repository<S> {
    store: S,
    config: RepoConfig,
    slots: Vec<Slot>,
    free: Vec<usize>,
    by_id: HashMap<ObjectId, TreeHandle>,
    order: VecDeque<TreeHandle>,
    live: usize,
}

impl<S: ObjectStore> Repository<S> {
    /// Open a repository over `store` with the default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, RepoConfig::default())
    }

    /// Open a repository over `store` with an explicit configuration.
    pub fn with_config(store: S, config: RepoConfig) -> Self {
        Self {
            store,
            config,
            slots: Vec::new(),
            free: Vec::new(),
            by_id: HashMap::new(),
            order: VecDeque::new(),
            live: 0,
        }
    }

    /// The underlying object store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The configuration this repository was opened with.
    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    /// Number of trees currently held in the cache.
    pub fn cached_trees(&self) -> usize {
        self.live
    }

    // ---- Tree access ----

    /// Load the tree stored under `id`, or return the cached copy.
    ///
    /// A cached tree that has been modified since it was loaded no longer
    /// represents `id`; in that case a fresh copy is decoded alongside it.
    pub fn lookup(&mut self, id: ObjectId) -> RepoResult<TreeHandle> {
        if let Some(&handle) = self.by_id.get(&id) {
            if self.get(handle).and_then(Tree::id) == Some(id) {
                debug!(id = %id.short_hex(), "tree cache hit");
                return Ok(handle);
            }
            self.by_id.remove(&id);
        }
        if let Some(handle) = self.adopt_written(id) {
            debug!(id = %id.short_hex(), ?handle, "tree cache re-keyed");
            return Ok(handle);
        }

        let object = self.fetch(&id, ObjectKind::Tree)?;
        let tree = Tree::decode(id, &object.data).map_err(|source| {
            warn!(id = %id.short_hex(), error = %source, "failed to decode tree");
            RepoError::CorruptTree { id, source }
        })?;
        debug!(id = %id.short_hex(), entries = tree.entry_count(), "tree loaded");

        let handle = self.insert(tree);
        self.by_id.insert(id, handle);
        self.enforce_capacity(handle);
        Ok(handle)
    }

    /// Load a tree and borrow it in one step.
    pub fn lookup_tree(&mut self, id: ObjectId) -> RepoResult<&Tree> {
        let handle = self.lookup(id)?;
        self.tree(handle)
    }

    /// Create an empty tree owned by the repository.
    pub fn new_tree(&mut self) -> TreeHandle {
        self.insert(Tree::new())
    }

    /// Borrow a cached tree. Fails with `InvalidHandle` once it is evicted.
    pub fn tree(&self, handle: TreeHandle) -> RepoResult<&Tree> {
        self.get(handle).ok_or(RepoError::InvalidHandle(handle))
    }

    /// Borrow a cached tree for mutation.
    ///
    /// Prefer [`write`](Self::write) over calling [`Tree::write`] on the
    /// borrowed tree; the latter is only picked up by the cache on the next
    /// `lookup` of the new ID.
    pub fn tree_mut(&mut self, handle: TreeHandle) -> RepoResult<&mut Tree> {
        slot_tree_mut(&mut self.slots, handle).ok_or(RepoError::InvalidHandle(handle))
    }

    /// Encode and store the tree, returning its new ID.
    ///
    /// The cache is re-keyed under the new ID, so a later `lookup` of it
    /// returns this same handle.
    pub fn write(&mut self, handle: TreeHandle) -> RepoResult<ObjectId> {
        let tree =
            slot_tree_mut(&mut self.slots, handle).ok_or(RepoError::InvalidHandle(handle))?;
        let id = tree.write(&self.store)?;
        self.by_id.retain(|key, h| *h != handle || *key == id);
        self.by_id.entry(id).or_insert(handle);
        Ok(id)
    }

    /// Drop a tree from the cache and hand it back.
    pub fn evict(&mut self, handle: TreeHandle) -> RepoResult<Tree> {
        let tree = self.remove(handle).ok_or(RepoError::InvalidHandle(handle))?;
        debug!(?handle, dirty = tree.is_dirty(), "tree evicted");
        Ok(tree)
    }

    /// Drop every cached tree. All outstanding handles become stale.
    pub fn clear_cache(&mut self) {
        for slot in &mut self.slots {
            if slot.tree.take().is_some() {
                slot.generation += 1;
            }
        }
        self.free = (0..self.slots.len()).collect();
        self.by_id.clear();
        self.order.clear();
        self.live = 0;
    }

    // ---- Entry resolution ----

    /// Fetch the object `entry` points at, typed by the entry's mode.
    ///
    /// Fails with `ObjectNotFound` if the store lacks the object and
    /// `KindMismatch` if the stored kind disagrees with the mode.
    pub fn entry_to_object(&mut self, entry: &TreeEntry) -> RepoResult<ResolvedObject> {
        let id = *entry.id();
        match entry.mode().object_kind() {
            ObjectKind::Tree => Ok(ResolvedObject::Tree(self.lookup(id)?)),
            ObjectKind::Blob => {
                let object = self.fetch(&id, ObjectKind::Blob)?;
                Ok(ResolvedObject::Blob(Blob::from_stored_object(&object)?))
            }
            ObjectKind::Commit => {
                let object = self.fetch(&id, ObjectKind::Commit)?;
                Ok(ResolvedObject::Commit(Commit::from_stored_object(&object)?))
            }
        }
    }

    /// Resolve the entry at `index` of a cached tree.
    pub fn resolve_entry(
        &mut self,
        handle: TreeHandle,
        index: usize,
    ) -> RepoResult<ResolvedObject> {
        let entry = self
            .tree(handle)?
            .entry_by_index(index)
            .cloned()
            .ok_or_else(|| {
                RepoError::Tree(arbor_tree::TreeError::NotFound(format!("index {index}")))
            })?;
        self.entry_to_object(&entry)
    }

    // ---- Internals ----

    fn fetch(&self, id: &ObjectId, expected: ObjectKind) -> RepoResult<StoredObject> {
        let object = self
            .store
            .read(id)?
            .ok_or(RepoError::ObjectNotFound(*id))?;
        if object.kind != expected {
            return Err(RepoError::KindMismatch {
                id: *id,
                expected,
                actual: object.kind,
            });
        }
        if self.config.verify_reads {
            object.verify(id)?;
        }
        Ok(object)
    }

    /// Find a cached tree that was written outside [`write`](Self::write) and
    /// now carries `id`, and key it under that ID.
    fn adopt_written(&mut self, id: ObjectId) -> Option<TreeHandle> {
        let handle = self
            .order
            .iter()
            .copied()
            .find(|&h| self.get(h).and_then(Tree::id) == Some(id))?;
        self.by_id.retain(|_, h| *h != handle);
        self.by_id.insert(id, handle);
        Some(handle)
    }

    fn get(&self, handle: TreeHandle) -> Option<&Tree> {
        self.slots
            .get(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.tree.as_ref())
    }

    fn insert(&mut self, tree: Tree) -> TreeHandle {
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.tree = Some(tree);
                TreeHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    tree: Some(tree),
                });
                TreeHandle {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        };
        self.order.push_back(handle);
        self.live += 1;
        handle
    }

    fn remove(&mut self, handle: TreeHandle) -> Option<Tree> {
        let slot = self.slots.get_mut(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        let tree = slot.tree.take()?;
        slot.generation += 1;
        self.free.push(handle.index);
        self.by_id.retain(|_, h| *h != handle);
        self.order.retain(|h| *h != handle);
        self.live -= 1;
        Some(tree)
    }

    /// Evict the oldest clean trees until the cache fits its capacity.
    fn enforce_capacity(&mut self, keep: TreeHandle) {
        let capacity = self.config.cache_capacity;
        if capacity == 0 {
            return;
        }
        for _ in 0..self.order.len() {
            if self.live <= capacity {
                break;
            }
            let Some(handle) = self.order.pop_front() else {
                break;
            };
            let evictable = handle != keep && self.get(handle).is_some_and(|t| !t.is_dirty());
            if !evictable {
                self.order.push_back(handle);
                continue;
            }
            if self.remove(handle).is_some() {
                debug!(?handle, capacity, "tree evicted to fit cache");
            }
        }
    }
}

fn slot_tree_mut(slots: &mut [Slot], handle: TreeHandle) -> Option<&mut Tree> {
    slots
        .get_mut(handle.index)
        .filter(|slot| slot.generation == handle.generation)
        .and_then(|slot| slot.tree.as_mut())
}

impl<S> std::fmt::Debug for Repository<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("config", &self.config)
            .field("cached_trees", &self.live)
            .finish()
    }
}
