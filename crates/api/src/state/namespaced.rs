// Path: crates/api/src/state/namespaced.rs

//! A state access wrapper that confines a custom operation interpreter to
//! its own key space.

use crate::state::{StateAccess, StateKey, StateScanIter};
use deip_types::error::StoreError;
use deip_types::keys::custom_namespace;
use std::sync::Arc;

/// Namespaced access to a `StateAccess` object.
///
/// Every key is prefixed with `custom/<id>/` on the way in and stripped on
/// the way out, so the interpreter sees a private key space and cannot name
/// ledger records or another interpreter's records.
pub struct NamespacedStateAccess<'a> {
    inner: &'a mut dyn StateAccess,
    prefix: Vec<u8>,
}

impl<'a> NamespacedStateAccess<'a> {
    /// Confines access through `inner` to the namespace of interpreter `id`.
    pub fn new(inner: &'a mut dyn StateAccess, id: &str) -> Self {
        Self {
            inner,
            prefix: custom_namespace(id),
        }
    }

    /// The raw key prefix every access is confined to.
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    #[inline]
    fn qualify(&self, key: &[u8]) -> Vec<u8> {
        [self.prefix.as_slice(), key].concat()
    }
}

impl<'a> StateAccess for NamespacedStateAccess<'a> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.get(&self.qualify(key))
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let key = self.qualify(key);
        self.inner.insert(&key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        let key = self.qualify(key);
        self.inner.delete(&key)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StoreError> {
        let strip = self.prefix.len();
        let iter = self.inner.prefix_scan(&self.qualify(prefix))?;
        Ok(Box::new(iter.map(move |item| {
            item.and_then(|(key, value)| {
                let local: StateKey = key
                    .get(strip..)
                    .map(Arc::from)
                    .ok_or_else(|| StoreError::InvariantViolation {
                        table: "custom",
                        reason: "scanned key outside its namespace".into(),
                    })?;
                Ok((local, value))
            })
        })))
    }
}
