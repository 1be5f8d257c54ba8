//! In-memory tree objects and mutation through the owning tree.

use arbor_store::{ObjectKind, ObjectStore, StoredObject};
use arbor_types::ObjectId;
use tracing::debug;

use crate::codec;
use crate::entry::{self, validate_name, TreeEntry};
use crate::error::{TreeError, TreeResult};
use crate::mode::FileMode;

/// Where a tree stands relative to its stored form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TreeState {
    /// Built in memory and never written.
    New,
    /// Entries match the stored object with this ID.
    Clean(ObjectId),
    /// Modified since it was loaded or last written.
    Dirty,
}

/// Directory listing object.
///
/// Entries are kept in canonical order at all times, and the tree only
/// reports an ID while it is [`TreeState::Clean`]. Any mutation drops the ID;
/// [`Tree::write`] is the only way to get a new one.
///
/// `Tree` does no locking. Mutation takes `&mut self`, so sharing one tree
/// across threads requires the caller's own synchronization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tree {
    state: TreeState,
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create an empty, never-written tree.
    pub fn new() -> Self {
        Self {
            state: TreeState::New,
            entries: Vec::new(),
        }
    }

    /// Decode a tree body that was fetched under `id`.
    ///
    /// The ID is trusted as given; decoding never hashes.
    pub fn decode(id: ObjectId, data: &[u8]) -> TreeResult<Self> {
        let entries = codec::decode(data)?;
        Ok(Self {
            state: TreeState::Clean(id),
            entries,
        })
    }

    /// The tree's ID, or `None` if it is new or has unwritten changes.
    pub fn id(&self) -> Option<ObjectId> {
        match self.state {
            TreeState::Clean(id) => Some(id),
            TreeState::New | TreeState::Dirty => None,
        }
    }

    /// Current write-back state.
    pub fn state(&self) -> TreeState {
        self.state
    }

    /// `true` unless the entries are known to match a stored object.
    pub fn is_dirty(&self) -> bool {
        !matches!(self.state, TreeState::Clean(_))
    }

    /// Number of entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in canonical order.
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// Iterate over entries in canonical order.
    pub fn iter(&self) -> std::slice::Iter<'_, TreeEntry> {
        self.entries.iter()
    }

    /// Entry at `index`, or `None` past the end.
    pub fn entry_by_index(&self, index: usize) -> Option<&TreeEntry> {
        self.entries.get(index)
    }

    /// Look up an entry by exact name (binary search).
    pub fn entry_by_name(&self, name: impl AsRef<[u8]>) -> Option<&TreeEntry> {
        self.position_by_name(name).map(|i| &self.entries[i])
    }

    /// Index of the entry with this name.
    pub fn position_by_name(&self, name: impl AsRef<[u8]>) -> Option<usize> {
        entry::find(&self.entries, name.as_ref())
    }

    /// Mutable handle to the entry at `index`.
    pub fn entry_mut(&mut self, index: usize) -> Option<EntryMut<'_>> {
        if index >= self.entries.len() {
            return None;
        }
        Some(EntryMut { tree: self, index })
    }

    /// Mutable handle to the entry named `name`.
    pub fn entry_mut_by_name(&mut self, name: impl AsRef<[u8]>) -> Option<EntryMut<'_>> {
        let index = self.position_by_name(name)?;
        self.entry_mut(index)
    }

    /// Add an entry and return the index it landed at.
    ///
    /// Fails with `InvalidMode`, `InvalidName`, or `DuplicateName` without
    /// touching the tree.
    pub fn add_entry(
        &mut self,
        id: ObjectId,
        name: impl AsRef<[u8]>,
        attributes: u32,
    ) -> TreeResult<usize> {
        let mode = FileMode::try_from(attributes)?;
        let entry = TreeEntry::new(mode, name, id)?;
        if self.position_by_name(&entry.name).is_some() {
            return Err(TreeError::DuplicateName(entry.display_name()));
        }
        let index = entry::insertion_point(&self.entries, &entry)
            .ok_or_else(|| TreeError::DuplicateName(entry.display_name()))?;
        self.entries.insert(index, entry);
        self.mark_dirty();
        Ok(index)
    }

    /// Remove and return the entry at `index`; later entries shift down.
    pub fn remove_entry_by_index(&mut self, index: usize) -> TreeResult<TreeEntry> {
        if index >= self.entries.len() {
            return Err(TreeError::NotFound(format!(
                "index {index} (tree has {} entries)",
                self.entries.len()
            )));
        }
        let removed = self.entries.remove(index);
        self.mark_dirty();
        Ok(removed)
    }

    /// Remove and return the entry named `name`.
    pub fn remove_entry_by_name(&mut self, name: impl AsRef<[u8]>) -> TreeResult<TreeEntry> {
        let name = name.as_ref();
        let index = self.position_by_name(name).ok_or_else(|| {
            TreeError::NotFound(format!("name {:?}", String::from_utf8_lossy(name)))
        })?;
        self.remove_entry_by_index(index)
    }

    /// Encode the entries as a tree body.
    pub fn encode(&self) -> Vec<u8> {
        codec::encode(&self.entries)
    }

    /// The encoded body wrapped for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Tree, self.encode())
    }

    /// Write the tree to `store` and adopt the ID the store computes.
    ///
    /// A clean tree is already stored and is returned as is.
    pub fn write<S: ObjectStore + ?Sized>(&mut self, store: &S) -> TreeResult<ObjectId> {
        if let TreeState::Clean(id) = self.state {
            return Ok(id);
        }
        let object = self.to_stored_object();
        let id = store.write(&object)?;
        debug!(
            id = %id.short_hex(),
            entries = self.entries.len(),
            size = object.size,
            "tree written"
        );
        self.state = TreeState::Clean(id);
        Ok(id)
    }

    fn mark_dirty(&mut self) {
        if let TreeState::Clean(_) = self.state {
            self.state = TreeState::Dirty;
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = &'a TreeEntry;
    type IntoIter = std::slice::Iter<'a, TreeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Mutable access to one entry of a [`Tree`].
///
/// Every setter marks the tree dirty. Setters that change the sort key move
/// the entry, and the handle follows it to its new index.
#[derive(Debug)]
pub struct EntryMut<'a> {
    tree: &'a mut Tree,
    index: usize,
}

impl EntryMut<'_> {
    /// Current index of the entry in its tree.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The entry as it currently stands.
    pub fn entry(&self) -> &TreeEntry {
        &self.tree.entries[self.index]
    }

    /// Point the entry at a different object.
    pub fn set_id(&mut self, id: ObjectId) {
        self.tree.entries[self.index].id = id;
        self.tree.mark_dirty();
    }

    /// Rename the entry.
    ///
    /// Fails with `InvalidName`, or `DuplicateName` if another entry already
    /// has the name. The tree is unchanged on failure.
    pub fn set_name(&mut self, name: impl AsRef<[u8]>) -> TreeResult<()> {
        let name = name.as_ref();
        validate_name(name)?;
        if let Some(other) = self.tree.position_by_name(name) {
            if other != self.index {
                return Err(TreeError::DuplicateName(
                    String::from_utf8_lossy(name).into_owned(),
                ));
            }
        }
        self.tree.entries[self.index].name = name.to_vec();
        self.reposition();
        self.tree.mark_dirty();
        Ok(())
    }

    /// Change the mode from raw bits. Fails with `InvalidMode`.
    pub fn set_attributes(&mut self, attributes: u32) -> TreeResult<()> {
        let mode = FileMode::try_from(attributes)?;
        self.set_mode(mode);
        Ok(())
    }

    /// Change the mode. Switching to or from a directory can move the entry.
    pub fn set_mode(&mut self, mode: FileMode) {
        self.tree.entries[self.index].mode = mode;
        self.reposition();
        self.tree.mark_dirty();
    }

    fn reposition(&mut self) {
        let entries = &mut self.tree.entries;
        let entry = entries.remove(self.index);
        // Names are unique, so the key is always free once the entry is out.
        let index = entry::insertion_point(entries, &entry).unwrap_or(self.index);
        entries.insert(index, entry);
        self.index = index;
    }
}
