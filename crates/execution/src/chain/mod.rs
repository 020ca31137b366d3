// Path: crates/execution/src/chain/mod.rs
//! The `Database`: the single writer over the object store.
//!
//! Every state change goes through `push_transaction`, `push_block`,
//! `apply_block`, `pop_block` or `set_irreversible`, each under the write
//! half of one `RwLock`. Readers take the read half through `with_view`.
//!
//! Pending transactions live in their own open undo session on top of the
//! retained block sessions. Block-level calls discard that session first,
//! act on the chain, and then re-apply the pending transactions that are
//! still valid. Only operations applied by a block reach the notification
//! bus.

mod block;
mod genesis;
mod housekeeping;
mod transaction;

use crate::interpreters::InterpreterRegistry;
use crate::notify::NotificationBus;
use deip_api::authority::AuthorityVerifier;
use deip_api::interpreter::CustomOperationInterpreter;
use deip_api::observer::OperationObserver;
use deip_services::{DbServices, DbView};
use deip_state::{Checkpoint, ObjectStore};
use deip_telemetry::{chain_metrics, error_metrics};
use deip_types::app::OperationNotification;
use deip_types::config::{ChainConfig, SkipFlags};
use deip_types::error::{BlockError, ChainError, ErrorCode, ObserverError, StoreError};
use deip_types::protocol::{BlockId, SignedBlock, SignedTransaction, TimePointSec};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Where the operations of one transaction land in the chain.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Slot {
    pub block: u32,
    pub trx_in_block: u32,
    pub timestamp: TimePointSec,
}

struct PendingTransactions {
    session: Checkpoint,
    transactions: Vec<(SignedTransaction, SkipFlags)>,
}

struct ChainState {
    store: ObjectStore,
    pending: Option<PendingTransactions>,
    last_irreversible: u32,
}

/// The chain core: store, pipeline, interpreters and notification bus.
///
/// Interpreters and observers are registered before the database is shared;
/// afterwards every entry point takes `&self`.
pub struct Database {
    state: RwLock<ChainState>,
    config: ChainConfig,
    verifier: Arc<dyn AuthorityVerifier>,
    interpreters: InterpreterRegistry,
    bus: NotificationBus,
    observer_errors: Mutex<Vec<ObserverError>>,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .field("interpreters", &self.interpreters)
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Builds the genesis state described by `config.genesis`.
    pub fn open(config: ChainConfig, verifier: Arc<dyn AuthorityVerifier>) -> Result<Self, ChainError> {
        let mut store = ObjectStore::new();
        genesis::initialize(&mut store, &config.genesis)?;
        log::info!(
            "chain database opened with {} genesis accounts at time {}",
            config.genesis.accounts.len(),
            config.genesis.time
        );
        Ok(Self {
            state: RwLock::new(ChainState {
                store,
                pending: None,
                last_irreversible: 0,
            }),
            config,
            verifier,
            interpreters: InterpreterRegistry::new(),
            bus: NotificationBus::new(),
            observer_errors: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Registers the interpreter for its custom operation id, returning the
    /// one it replaces.
    pub fn register_interpreter(
        &mut self,
        interpreter: Arc<dyn CustomOperationInterpreter>,
    ) -> Option<Arc<dyn CustomOperationInterpreter>> {
        self.interpreters.register(interpreter)
    }

    pub fn interpreters(&self) -> &InterpreterRegistry {
        &self.interpreters
    }

    /// Adds a notification subscriber. Subscribers run in registration order.
    pub fn subscribe<F>(&mut self, name: impl Into<String>, subscriber: F)
    where
        F: Fn(&OperationNotification) -> Result<(), String> + Send + Sync + 'static,
    {
        self.bus.subscribe(name, subscriber);
    }

    pub fn add_observer(&mut self, observer: Arc<dyn OperationObserver>) {
        self.bus.add_observer(observer);
    }

    // --- Reads ---

    /// Runs `f` against a read-only view of the current state, pending
    /// transactions included.
    pub fn with_view<R>(&self, f: impl FnOnce(DbView<'_>) -> R) -> R {
        let state = self.state.read();
        f(DbView::new(&state.store))
    }

    pub fn head_block_num(&self) -> Result<u32, ChainError> {
        self.with_view(|view| Ok(view.dynamic_global_properties().get()?.head_block_number))
    }

    pub fn head_block_id(&self) -> Result<BlockId, ChainError> {
        self.with_view(|view| Ok(view.dynamic_global_properties().get()?.head_block_id))
    }

    pub fn head_block_time(&self) -> Result<TimePointSec, ChainError> {
        self.with_view(|view| Ok(view.dynamic_global_properties().get()?.time))
    }

    /// Every stored byte, for state comparisons.
    pub fn snapshot(&self) -> BTreeMap<Vec<u8>, Vec<u8>> {
        self.state.read().store.snapshot()
    }

    /// Blocks that `pop_block` can still undo.
    pub fn reversible_blocks(&self) -> usize {
        self.state.read().store.reversible_depth()
    }

    pub fn last_irreversible_block(&self) -> u32 {
        self.state.read().last_irreversible
    }

    pub fn pending_transactions(&self) -> Vec<SignedTransaction> {
        self.state
            .read()
            .pending
            .as_ref()
            .map(|p| p.transactions.iter().map(|(trx, _)| trx.clone()).collect())
            .unwrap_or_default()
    }

    /// Drains the observer failures collected since the last call.
    pub fn take_observer_errors(&self) -> Vec<ObserverError> {
        std::mem::take(&mut *self.observer_errors.lock())
    }

    // --- Writes ---

    /// Applies `trx` on top of the pending transactions.
    ///
    /// A rejected transaction leaves no trace in the store. An accepted one
    /// stays pending until the next block-level call, which re-applies it.
    /// Pending effects are never published; observers hear about the
    /// transaction once a block that includes it is applied.
    pub fn push_transaction(&self, trx: SignedTransaction, skip: SkipFlags) -> Result<(), ChainError> {
        let result = {
            let mut state = self.state.write();
            self.push_pending(&mut state, trx, skip)
        };
        match result {
            Ok(()) => {
                chain_metrics().inc_transactions_applied();
                Ok(())
            }
            Err(e) => {
                chain_metrics().inc_transactions_rejected(e.code());
                error_metrics().inc_error("transaction", e.code());
                tracing::debug!(target: "execution", event = "transaction_rejected", error = %e);
                Err(e)
            }
        }
    }

    /// Applies `block` in its own undo session and keeps that session for
    /// `pop_block`. A failing block is reverted completely.
    pub fn push_block(&self, block: &SignedBlock, skip: SkipFlags) -> Result<(), ChainError> {
        let result = {
            let mut state = self.state.write();
            let pending = Self::discard_pending(&mut state)?;
            let result = self.push_block_in(&mut state, block, skip);
            self.restore_pending(&mut state, pending);
            result
        };
        let height = block.block_num();
        match result {
            Ok(notes) => {
                chain_metrics().inc_blocks_applied();
                chain_metrics().set_reversible_blocks(self.reversible_blocks() as u64);
                tracing::info!(
                    target: "execution",
                    event = "block_applied",
                    height,
                    transactions = block.transactions.len(),
                    operations = notes.len()
                );
                self.publish(&notes);
                Ok(())
            }
            Err(e) => {
                error_metrics().inc_error("block", e.code());
                tracing::warn!(target: "execution", event = "block_rejected", height, error = %e);
                Err(e)
            }
        }
    }

    /// Applies `block` without an enclosing session.
    ///
    /// Transactions that applied before a failing one keep their effects and
    /// their notifications are published. Callers wanting all-or-nothing use
    /// `push_block`.
    pub fn apply_block(&self, block: &SignedBlock, skip: SkipFlags) -> Result<(), ChainError> {
        let mut notes = Vec::new();
        let result = {
            let mut state = self.state.write();
            let pending = Self::discard_pending(&mut state)?;
            let lib = state.last_irreversible;
            let result = self.apply_block_in(&mut state.store, block, skip, lib, &mut notes);
            self.restore_pending(&mut state, pending);
            result
        };
        self.publish(&notes);
        if let Err(e) = &result {
            error_metrics().inc_error("block", e.code());
            tracing::warn!(
                target: "execution",
                event = "block_partially_applied",
                height = block.block_num(),
                error = %e
            );
        }
        result
    }

    /// Undoes the most recent reversible block and returns its height.
    pub fn pop_block(&self) -> Result<u32, ChainError> {
        let result = {
            let mut state = self.state.write();
            let pending = Self::discard_pending(&mut state)?;
            let result = state
                .store
                .undo_last()
                .map_err(|e| match e {
                    StoreError::NoUndoSession => ChainError::Block(BlockError::NothingToPop),
                    other => ChainError::Store(other),
                })
                .and_then(|revision| {
                    // The undone block may have journaled an older LIB.
                    Self::sync_irreversible(&mut state)?;
                    Ok(revision)
                });
            self.restore_pending(&mut state, pending);
            result
        };
        let revision = result?;
        let height = u32::try_from(revision).unwrap_or(u32::MAX);
        chain_metrics().inc_blocks_popped();
        chain_metrics().set_reversible_blocks(self.reversible_blocks() as u64);
        tracing::info!(target: "execution", event = "block_popped", height);
        Ok(height)
    }

    /// Makes every block up to `block_num` permanent and returns how many
    /// reversible blocks that released.
    pub fn set_irreversible(&self, block_num: u32) -> Result<usize, ChainError> {
        let released = {
            let mut state = self.state.write();
            let pending = Self::discard_pending(&mut state)?;
            let result = Self::mark_irreversible(&mut state, block_num);
            self.restore_pending(&mut state, pending);
            result?
        };
        chain_metrics().set_reversible_blocks(self.reversible_blocks() as u64);
        log::info!("blocks up to {} are irreversible, {} released", block_num, released);
        Ok(released)
    }

    /// Drops every pending transaction.
    pub fn clear_pending(&self) -> Result<usize, ChainError> {
        let mut state = self.state.write();
        Ok(Self::discard_pending(&mut state)?.len())
    }

    // --- Internals ---

    fn push_pending(
        &self,
        state: &mut ChainState,
        trx: SignedTransaction,
        skip: SkipFlags,
    ) -> Result<(), ChainError> {
        let mut pending = match state.pending.take() {
            Some(pending) => pending,
            None => PendingTransactions {
                session: state.store.checkpoint(),
                transactions: Vec::new(),
            },
        };
        let props = DbView::new(&state.store).dynamic_global_properties().get();
        let result = props.map_err(ChainError::from).and_then(|props| {
            let slot = Slot {
                block: props.head_block_number.saturating_add(1),
                trx_in_block: u32::try_from(pending.transactions.len()).unwrap_or(u32::MAX),
                timestamp: props.time,
            };
            let mut virtual_op = 0;
            self.apply_transaction(&mut state.store, &trx, skip, slot, &mut virtual_op)
        });
        match result {
            Ok(notes) => {
                tracing::trace!(target: "execution", event = "transaction_pending", operations = notes.len());
                pending.transactions.push((trx, skip));
                state.pending = Some(pending);
                Ok(())
            }
            Err(e) => {
                if pending.transactions.is_empty() {
                    state.store.revert(pending.session)?;
                } else {
                    state.pending = Some(pending);
                }
                Err(e)
            }
        }
    }

    fn discard_pending(state: &mut ChainState) -> Result<Vec<(SignedTransaction, SkipFlags)>, ChainError> {
        match state.pending.take() {
            Some(pending) => {
                state.store.revert(pending.session)?;
                Ok(pending.transactions)
            }
            None => Ok(Vec::new()),
        }
    }

    /// Re-applies previously pending transactions. Those no longer valid,
    /// e.g. because the new block already included them, are dropped.
    fn restore_pending(&self, state: &mut ChainState, transactions: Vec<(SignedTransaction, SkipFlags)>) {
        let total = transactions.len();
        let mut dropped = 0;
        for (trx, skip) in transactions {
            if let Err(e) = self.push_pending(state, trx, skip) {
                dropped += 1;
                tracing::debug!(target: "execution", event = "pending_dropped", error = %e);
            }
        }
        if dropped > 0 {
            log::info!("dropped {} of {} pending transactions", dropped, total);
        }
    }

    fn push_block_in(
        &self,
        state: &mut ChainState,
        block: &SignedBlock,
        skip: SkipFlags,
    ) -> Result<Vec<OperationNotification>, ChainError> {
        let cp = state.store.checkpoint();
        let mut notes = Vec::new();
        match self.apply_block_in(&mut state.store, block, skip, state.last_irreversible, &mut notes) {
            Ok(()) => {
                state.store.retain(cp, u64::from(block.block_num()))?;
                Ok(notes)
            }
            Err(e) => {
                state.store.revert(cp)?;
                Err(e)
            }
        }
    }

    fn mark_irreversible(state: &mut ChainState, block_num: u32) -> Result<usize, ChainError> {
        let head = DbView::new(&state.store)
            .dynamic_global_properties()
            .get()?
            .head_block_number;
        let block_num = block_num.min(head);
        if block_num <= state.last_irreversible {
            return Ok(0);
        }
        let released = state.store.set_irreversible(u64::from(block_num));
        state.last_irreversible = block_num;
        Self::sync_irreversible(state)?;
        Ok(released)
    }

    /// Writes the tracked LIB into the global properties if they disagree.
    fn sync_irreversible(state: &mut ChainState) -> Result<(), ChainError> {
        let mut db = DbServices::new(&mut state.store);
        let stored = db.dynamic_global_properties().get()?.last_irreversible_block_num;
        if stored != state.last_irreversible {
            db.dynamic_global_properties()
                .set_last_irreversible_block(state.last_irreversible)?;
        }
        Ok(())
    }

    fn publish(&self, notes: &[OperationNotification]) {
        if self.bus.is_empty() {
            return;
        }
        let mut failures = Vec::new();
        for note in notes {
            failures.extend(self.bus.publish(note));
        }
        if !failures.is_empty() {
            self.observer_errors.lock().extend(failures);
        }
    }
}
