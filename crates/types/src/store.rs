// Path: crates/types/src/store.rs
//! The contract between persistent record kinds and the object store.

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The opaque, incrementing primary id of a record within its table.
#[derive(
    Encode,
    Decode,
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One secondary index entry declared by a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// The index name, unique within the table.
    pub name: &'static str,
    /// The key bytes. Keys compare bytewise, so ordered indexes should use
    /// big-endian integers.
    pub key: Vec<u8>,
    /// Whether two records may share the key.
    pub unique: bool,
}

impl IndexEntry {
    /// A unique secondary index entry.
    pub fn unique(name: &'static str, key: impl Into<Vec<u8>>) -> Self {
        Self {
            name,
            key: key.into(),
            unique: true,
        }
    }

    /// A non-unique, ordered secondary index entry.
    pub fn ordered(name: &'static str, key: impl Into<Vec<u8>>) -> Self {
        Self {
            name,
            key: key.into(),
            unique: false,
        }
    }
}

/// A persistent record kind kept in the object store.
///
/// Records are plain data. The store assigns `id` on creation, keeps the
/// record reachable by every entry returned from `indexes`, and re-indexes
/// it whenever it is modified.
pub trait Object: Encode + Decode + Clone + Default + fmt::Debug {
    /// The key-space prefix of this table.
    const TABLE: &'static [u8];
    /// A human-readable table name used in errors and logs.
    const NAME: &'static str;

    /// The primary id.
    fn id(&self) -> ObjectId;

    /// Sets the primary id. Only the store calls this.
    fn set_id(&mut self, id: ObjectId);

    /// The secondary index entries for the current field values.
    fn indexes(&self) -> Vec<IndexEntry> {
        Vec::new()
    }
}

/// Implements the id accessors of [`Object`] for a record with an `id: ObjectId` field.
#[macro_export]
macro_rules! object_id_accessors {
    () => {
        fn id(&self) -> $crate::store::ObjectId {
            self.id
        }
        fn set_id(&mut self, id: $crate::store::ObjectId) {
            self.id = id;
        }
    };
}
