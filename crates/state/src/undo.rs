// Path: crates/state/src/undo.rs

//! An ordered key-value map with a stack of undo layers.
//!
//! Each layer records the value every key had before the layer first touched
//! it (`None` for keys that did not exist). Reverting a layer writes those
//! values back; committing a layer folds its records into the layer below,
//! keeping the older value where both layers touched the same key.

use deip_types::error::StoreError;
use std::collections::btree_map::{self, Entry};
use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Included, Unbounded};

/// A handle to an open undo session.
///
/// Sessions nest and must be released innermost first, with exactly one of
/// `commit`, `revert` or `retain`.
#[must_use = "an undo session must be committed, reverted or retained"]
#[derive(Debug, PartialEq, Eq)]
pub struct Checkpoint {
    depth: usize,
}

impl Checkpoint {
    /// The nesting depth of this session, starting at one.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

#[derive(Debug, Default, Clone)]
struct UndoLayer {
    prior: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
    /// Set once the session is retained; the revision (block number) it
    /// belongs to.
    retained: Option<u64>,
}

/// An ordered byte map whose writes can be rolled back session by session.
#[derive(Debug, Default, Clone)]
pub struct UndoableState {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
    layers: Vec<UndoLayer>,
}

impl UndoableState {
    /// An empty state with no open sessions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of layers on the undo stack, open or retained.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Number of retained layers that `undo_last` can still pop.
    pub fn retained_depth(&self) -> usize {
        self.layers.iter().filter(|l| l.retained.is_some()).count()
    }

    /// Reads a value.
    pub fn get(&self, key: &[u8]) -> Option<&Vec<u8>> {
        self.data.get(key)
    }

    /// Iterates all entries whose key starts with `prefix`, in key order.
    pub fn prefix(&self, prefix: &[u8]) -> impl Iterator<Item = (&Vec<u8>, &Vec<u8>)> + Send + '_ {
        let owned = prefix.to_vec();
        self.range_from(prefix)
            .take_while(move |(k, _)| k.starts_with(&owned))
    }

    fn range_from(&self, start: &[u8]) -> btree_map::Range<'_, Vec<u8>, Vec<u8>> {
        self.data
            .range::<[u8], _>((Included(start), Unbounded))
    }

    /// Iterates entries in `[start, end)`.
    pub fn range(&self, start: &[u8], end: &[u8]) -> btree_map::Range<'_, Vec<u8>, Vec<u8>> {
        self.data
            .range::<[u8], _>((Included(start), Excluded(end)))
    }

    /// The full contents, for snapshots and comparisons.
    pub fn entries(&self) -> &BTreeMap<Vec<u8>, Vec<u8>> {
        &self.data
    }

    /// Writes `value`, or deletes the key when `None`, recording the prior
    /// value in the innermost layer.
    pub fn write(&mut self, key: &[u8], value: Option<Vec<u8>>) {
        let previous = match &value {
            Some(v) => self.data.insert(key.to_vec(), v.clone()),
            None => self.data.remove(key),
        };
        if let Some(layer) = self.layers.last_mut() {
            layer.prior.entry(key.to_vec()).or_insert(previous);
        }
    }

    /// Opens a nested session.
    pub fn checkpoint(&mut self) -> Checkpoint {
        self.layers.push(UndoLayer::default());
        Checkpoint {
            depth: self.layers.len(),
        }
    }

    fn pop_session(&mut self, cp: Checkpoint) -> Result<UndoLayer, StoreError> {
        let expected = self.layers.len();
        let is_open = self.layers.last().is_some_and(|l| l.retained.is_none());
        if cp.depth != expected || !is_open {
            return Err(StoreError::SessionOrder {
                expected,
                got: cp.depth,
            });
        }
        self.layers.pop().ok_or(StoreError::NoUndoSession)
    }

    /// Keeps the session's writes. Inside another session the records fold
    /// into it; at the outermost level they are discarded and the writes
    /// become permanent.
    pub fn commit(&mut self, cp: Checkpoint) -> Result<(), StoreError> {
        let layer = self.pop_session(cp)?;
        if let Some(parent) = self.layers.last_mut() {
            for (key, prior) in layer.prior {
                if let Entry::Vacant(slot) = parent.prior.entry(key) {
                    slot.insert(prior);
                }
            }
        }
        Ok(())
    }

    /// Discards the session's writes, restoring the exact prior bytes.
    pub fn revert(&mut self, cp: Checkpoint) -> Result<(), StoreError> {
        let layer = self.pop_session(cp)?;
        self.restore(layer);
        Ok(())
    }

    /// Closes the session but keeps its layer on the stack, tagged with
    /// `revision`, so `undo_last` can revert it later.
    pub fn retain(&mut self, cp: Checkpoint, revision: u64) -> Result<(), StoreError> {
        let expected = self.layers.len();
        match self.layers.last_mut() {
            Some(layer) if cp.depth == expected && layer.retained.is_none() => {
                layer.retained = Some(revision);
                Ok(())
            }
            _ => Err(StoreError::SessionOrder {
                expected,
                got: cp.depth,
            }),
        }
    }

    /// Reverts the most recently retained layer. Fails while a session is
    /// open above it.
    pub fn undo_last(&mut self) -> Result<u64, StoreError> {
        match self.layers.last() {
            Some(UndoLayer {
                retained: Some(_), ..
            }) => {}
            Some(_) => {
                return Err(StoreError::SessionOrder {
                    expected: self.layers.len(),
                    got: self.layers.len().saturating_sub(1),
                })
            }
            None => return Err(StoreError::NoUndoSession),
        }
        let layer = self.layers.pop().ok_or(StoreError::NoUndoSession)?;
        let revision = layer.retained.unwrap_or_default();
        self.restore(layer);
        Ok(revision)
    }

    /// Drops retained layers at the bottom of the stack whose revision is at
    /// or below `revision`. Their writes can no longer be undone.
    pub fn set_irreversible(&mut self, revision: u64) -> usize {
        let count = self
            .layers
            .iter()
            .take_while(|l| l.retained.is_some_and(|r| r <= revision))
            .count();
        self.layers.drain(..count);
        count
    }

    fn restore(&mut self, layer: UndoLayer) {
        for (key, prior) in layer.prior {
            match prior {
                Some(v) => {
                    self.data.insert(key, v);
                }
                None => {
                    self.data.remove(&key);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(s: &mut UndoableState, k: &str, v: &str) {
        s.write(k.as_bytes(), Some(v.as_bytes().to_vec()));
    }

    fn val(s: &UndoableState, k: &str) -> Option<String> {
        s.get(k.as_bytes())
            .map(|v| String::from_utf8(v.clone()).unwrap())
    }

    #[test]
    fn revert_restores_prior_bytes() {
        let mut s = UndoableState::new();
        put(&mut s, "a", "1");
        let cp = s.checkpoint();
        put(&mut s, "a", "2");
        put(&mut s, "b", "x");
        s.write(b"a", None);
        s.revert(cp).unwrap();
        assert_eq!(val(&s, "a").as_deref(), Some("1"));
        assert_eq!(val(&s, "b"), None);
        assert_eq!(s.depth(), 0);
    }

    #[test]
    fn commit_squashes_into_parent() {
        let mut s = UndoableState::new();
        put(&mut s, "a", "1");
        let outer = s.checkpoint();
        put(&mut s, "a", "2");
        let inner = s.checkpoint();
        put(&mut s, "a", "3");
        put(&mut s, "c", "z");
        s.commit(inner).unwrap();
        assert_eq!(val(&s, "a").as_deref(), Some("3"));
        s.revert(outer).unwrap();
        assert_eq!(val(&s, "a").as_deref(), Some("1"));
        assert_eq!(val(&s, "c"), None);
    }

    #[test]
    fn sessions_release_innermost_first() {
        let mut s = UndoableState::new();
        let outer = s.checkpoint();
        let inner = s.checkpoint();
        assert_eq!(
            s.commit(outer),
            Err(StoreError::SessionOrder {
                expected: 2,
                got: 1
            })
        );
        s.revert(inner).unwrap();
        assert_eq!(s.depth(), 1);
    }

    #[test]
    fn retained_layers_undo_and_become_irreversible() {
        let mut s = UndoableState::new();
        for (rev, v) in [(1u64, "1"), (2, "2"), (3, "3")] {
            let cp = s.checkpoint();
            put(&mut s, "head", v);
            s.retain(cp, rev).unwrap();
        }
        assert_eq!(s.retained_depth(), 3);
        assert_eq!(s.undo_last(), Ok(3));
        assert_eq!(val(&s, "head").as_deref(), Some("2"));

        assert_eq!(s.set_irreversible(1), 1);
        assert_eq!(s.undo_last(), Ok(2));
        assert_eq!(val(&s, "head").as_deref(), Some("1"));
        assert_eq!(s.undo_last(), Err(StoreError::NoUndoSession));
    }

    #[test]
    fn cannot_pop_block_under_open_session() {
        let mut s = UndoableState::new();
        let block = s.checkpoint();
        s.retain(block, 1).unwrap();
        let trx = s.checkpoint();
        assert!(matches!(s.undo_last(), Err(StoreError::SessionOrder { .. })));
        s.commit(trx).unwrap();
        assert_eq!(s.undo_last(), Ok(1));
    }
}
