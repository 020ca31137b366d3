// Path: crates/state/src/store.rs

//! The typed object store.
//!
//! Records of every kind share one [`UndoableState`]. A record kind owns the
//! key space under its table prefix:
//!
//! ```text
//! TABLE "o/" id_be              -> SCALE(record)
//! TABLE "u/" index "/" key      -> id_be            (unique indexes)
//! TABLE "n/" index "/" key id_be -> id_be           (ordered, non-unique indexes)
//! TABLE "next_id"               -> id_be
//! ```

use crate::undo::{Checkpoint, UndoableState};
use deip_api::state::{StateAccess, StateScanIter};
use deip_types::codec;
use deip_types::error::StoreError;
use deip_types::store::{IndexEntry, Object, ObjectId};
use std::collections::BTreeMap;
use std::sync::Arc;

const RECORD: &[u8] = b"o/";
const UNIQUE: &[u8] = b"u/";
const ORDERED: &[u8] = b"n/";
const NEXT_ID: &[u8] = b"next_id";

fn record_key<T: Object>(id: ObjectId) -> Vec<u8> {
    [T::TABLE, RECORD, &id.0.to_be_bytes()].concat()
}

fn index_prefix<T: Object>(unique: bool, name: &str) -> Vec<u8> {
    let space = if unique { UNIQUE } else { ORDERED };
    [T::TABLE, space, name.as_bytes(), b"/"].concat()
}

fn index_key<T: Object>(entry: &IndexEntry, id: ObjectId) -> Vec<u8> {
    let mut key = index_prefix::<T>(entry.unique, entry.name);
    key.extend_from_slice(&entry.key);
    if !entry.unique {
        key.extend_from_slice(&id.0.to_be_bytes());
    }
    key
}

fn decode_id(bytes: &[u8]) -> Result<ObjectId, StoreError> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| StoreError::Decode(format!("object id of {} bytes", bytes.len())))?;
    Ok(ObjectId(u64::from_be_bytes(raw)))
}

/// The multiply-indexed, undo-capable store of every persistent record.
#[derive(Debug, Default, Clone)]
pub struct ObjectStore {
    state: UndoableState,
}

impl ObjectStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // --- Undo sessions ---

    /// Opens a nested undo session.
    pub fn checkpoint(&mut self) -> Checkpoint {
        self.state.checkpoint()
    }

    /// Keeps the innermost session's writes, folding them into its parent.
    pub fn commit(&mut self, cp: Checkpoint) -> Result<(), StoreError> {
        self.state.commit(cp)
    }

    /// Discards the innermost session's writes.
    pub fn revert(&mut self, cp: Checkpoint) -> Result<(), StoreError> {
        log::debug!("reverting undo session at depth {}", cp.depth());
        self.state.revert(cp)
    }

    /// Keeps the innermost session on the undo stack for a later `undo_last`.
    pub fn retain(&mut self, cp: Checkpoint, revision: u64) -> Result<(), StoreError> {
        self.state.retain(cp, revision)
    }

    /// Reverts the most recently retained session and returns its revision.
    pub fn undo_last(&mut self) -> Result<u64, StoreError> {
        let revision = self.state.undo_last()?;
        log::info!("undid retained session for revision {}", revision);
        Ok(revision)
    }

    /// Makes every retained session up to `revision` permanent.
    pub fn set_irreversible(&mut self, revision: u64) -> usize {
        self.state.set_irreversible(revision)
    }

    /// Number of retained sessions.
    pub fn reversible_depth(&self) -> usize {
        self.state.retained_depth()
    }

    /// Runs `f` in a nested session: `Ok` commits it and `Err` reverts it.
    pub fn with_checkpoint<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<StoreError>,
    {
        let cp = self.checkpoint();
        match f(self) {
            Ok(value) => {
                self.commit(cp)?;
                Ok(value)
            }
            Err(e) => {
                self.revert(cp)?;
                Err(e)
            }
        }
    }

    /// A copy of every stored byte, for comparisons in tests and tooling.
    pub fn snapshot(&self) -> BTreeMap<Vec<u8>, Vec<u8>> {
        self.state.entries().clone()
    }

    // --- Typed records ---

    fn next_id<T: Object>(&mut self) -> Result<ObjectId, StoreError> {
        let key = [T::TABLE, NEXT_ID].concat();
        let id = match self.state.get(&key) {
            Some(bytes) => decode_id(bytes)?,
            None => ObjectId(0),
        };
        let next = id
            .0
            .checked_add(1)
            .ok_or_else(|| StoreError::InvariantViolation {
                table: T::NAME,
                reason: "object id space exhausted".into(),
            })?;
        self.state.write(&key, Some(next.to_be_bytes().to_vec()));
        Ok(id)
    }

    fn load<T: Object>(&self, id: ObjectId) -> Result<Option<T>, StoreError> {
        self.state
            .get(&record_key::<T>(id))
            .map(|bytes| codec::from_bytes_canonical(bytes).map_err(StoreError::Decode))
            .transpose()
    }

    fn write_record<T: Object>(&mut self, record: &T) -> Result<(), StoreError> {
        let bytes = codec::to_bytes_canonical(record).map_err(StoreError::Decode)?;
        self.state.write(&record_key::<T>(record.id()), Some(bytes));
        Ok(())
    }

    fn unique_owner<T: Object>(&self, entry: &IndexEntry) -> Result<Option<ObjectId>, StoreError> {
        self.state
            .get(&index_key::<T>(entry, ObjectId::default()))
            .map(|bytes| decode_id(bytes))
            .transpose()
    }

    fn is_declared<T: Object>(name: &str, unique: bool) -> Result<(), StoreError> {
        if T::default()
            .indexes()
            .iter()
            .any(|e| e.name == name && e.unique == unique)
        {
            Ok(())
        } else {
            Err(StoreError::InvariantViolation {
                table: T::NAME,
                reason: format!("no {} index named '{}'", if unique { "unique" } else { "ordered" }, name),
            })
        }
    }

    /// Creates a record: assigns the next id, runs `init` on a default draft
    /// and inserts it into every index.
    ///
    /// Fails with `DuplicateKey`, leaving the store unchanged, if a unique
    /// index already holds one of the draft's keys.
    pub fn create<T: Object>(&mut self, init: impl FnOnce(&mut T)) -> Result<T, StoreError> {
        let mut draft = T::default();
        init(&mut draft);
        let entries = draft.indexes();
        for entry in entries.iter().filter(|e| e.unique) {
            if self.unique_owner::<T>(entry)?.is_some() {
                return Err(StoreError::DuplicateKey {
                    table: T::NAME,
                    index: entry.name,
                    key: hex::encode(&entry.key),
                });
            }
        }
        let id = self.next_id::<T>()?;
        draft.set_id(id);
        for entry in &entries {
            self.state
                .write(&index_key::<T>(entry, id), Some(id.0.to_be_bytes().to_vec()));
        }
        self.write_record(&draft)?;
        Ok(draft)
    }

    /// Mutates a record in place and re-indexes it. Returns the new value.
    ///
    /// Fails with `InvariantViolation`, leaving the store unchanged, if the
    /// mutator changes the id or moves a unique key onto another record.
    pub fn modify<T: Object>(
        &mut self,
        id: ObjectId,
        mutate: impl FnOnce(&mut T),
    ) -> Result<T, StoreError> {
        let old = self.get::<T>(id)?;
        let mut new = old.clone();
        mutate(&mut new);
        if new.id() != id {
            return Err(StoreError::InvariantViolation {
                table: T::NAME,
                reason: format!("mutator changed id {} to {}", id, new.id()),
            });
        }
        let old_entries = old.indexes();
        let new_entries = new.indexes();
        for entry in new_entries.iter().filter(|e| e.unique) {
            match self.unique_owner::<T>(entry)? {
                Some(owner) if owner != id => {
                    return Err(StoreError::InvariantViolation {
                        table: T::NAME,
                        reason: format!(
                            "unique index '{}' already holds {}",
                            entry.name,
                            hex::encode(&entry.key)
                        ),
                    })
                }
                _ => {}
            }
        }
        for entry in old_entries.iter().filter(|e| !new_entries.contains(e)) {
            self.state.write(&index_key::<T>(entry, id), None);
        }
        for entry in new_entries.iter().filter(|e| !old_entries.contains(e)) {
            self.state
                .write(&index_key::<T>(entry, id), Some(id.0.to_be_bytes().to_vec()));
        }
        self.write_record(&new)?;
        Ok(new)
    }

    /// Deletes a record from the table and every index. Returns the removed value.
    pub fn remove<T: Object>(&mut self, id: ObjectId) -> Result<T, StoreError> {
        let old = self.get::<T>(id)?;
        for entry in old.indexes() {
            self.state.write(&index_key::<T>(&entry, id), None);
        }
        self.state.write(&record_key::<T>(id), None);
        Ok(old)
    }

    /// Reads a record by id.
    pub fn find<T: Object>(&self, id: ObjectId) -> Result<Option<T>, StoreError> {
        self.load(id)
    }

    /// Reads a record by id, failing with `NotFound` if it does not exist.
    pub fn get<T: Object>(&self, id: ObjectId) -> Result<T, StoreError> {
        self.load(id)?.ok_or_else(|| StoreError::NotFound {
            table: T::NAME,
            key: id.to_string(),
        })
    }

    /// Looks a record up by a unique index.
    pub fn find_by<T: Object>(&self, index: &'static str, key: &[u8]) -> Result<Option<T>, StoreError> {
        Self::is_declared::<T>(index, true)?;
        let lookup = IndexEntry::unique(index, key.to_vec());
        let Some(id) = self.unique_owner::<T>(&lookup)? else {
            return Ok(None);
        };
        match self.load(id)? {
            Some(record) => Ok(Some(record)),
            None => Err(StoreError::CorruptIndex {
                table: T::NAME,
                index,
                reason: format!("entry {} points at missing record {}", hex::encode(key), id),
            }),
        }
    }

    /// Looks a record up by a unique index, failing with `NotFound`.
    pub fn get_by<T: Object>(&self, index: &'static str, key: &[u8]) -> Result<T, StoreError> {
        self.find_by(index, key)?.ok_or_else(|| StoreError::NotFound {
            table: T::NAME,
            key: format!("{}={}", index, hex::encode(key)),
        })
    }

    fn collect_index<'a, T: Object>(
        &self,
        index: &'static str,
        entries: impl Iterator<Item = (&'a Vec<u8>, &'a Vec<u8>)>,
    ) -> Result<Vec<T>, StoreError> {
        entries
            .map(|(_, raw_id)| {
                let id = decode_id(raw_id)?;
                self.load(id)?.ok_or_else(|| StoreError::CorruptIndex {
                    table: T::NAME,
                    index,
                    reason: format!("entry points at missing record {}", id),
                })
            })
            .collect()
    }

    /// All records whose key in `index` starts with `prefix`, in key order.
    /// Works on unique and ordered indexes alike.
    pub fn scan_by<T: Object>(&self, index: &'static str, prefix: &[u8]) -> Result<Vec<T>, StoreError> {
        let unique = Self::is_declared::<T>(index, true).is_ok();
        if !unique {
            Self::is_declared::<T>(index, false)?;
        }
        let mut start = index_prefix::<T>(unique, index);
        start.extend_from_slice(prefix);
        self.collect_index(index, self.state.prefix(&start))
    }

    /// All records whose key in the ordered `index` is strictly below
    /// `bound`, in key order.
    pub fn scan_below<T: Object>(&self, index: &'static str, bound: &[u8]) -> Result<Vec<T>, StoreError> {
        Self::is_declared::<T>(index, false)?;
        let start = index_prefix::<T>(false, index);
        let mut end = start.clone();
        end.extend_from_slice(bound);
        self.collect_index(index, self.state.range(&start, &end))
    }

    /// Every record of a kind, in id order.
    pub fn all<T: Object>(&self) -> Result<Vec<T>, StoreError> {
        let prefix = [T::TABLE, RECORD].concat();
        self.state
            .prefix(&prefix)
            .map(|(_, bytes)| codec::from_bytes_canonical(bytes).map_err(StoreError::Decode))
            .collect()
    }
}

impl StateAccess for ObjectStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.state.get(key).cloned())
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.state.write(key, Some(value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.state.write(key, None);
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StoreError> {
        let iter = self
            .state
            .prefix(prefix)
            .map(|(k, v)| Ok((Arc::from(k.as_slice()), Arc::from(v.as_slice()))));
        Ok(Box::new(iter))
    }
}
