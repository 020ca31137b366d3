// Path: crates/execution/tests/common/mod.rs
//! Builders shared by the pipeline integration tests.
#![allow(dead_code)]

use deip_api::test_utils::PlainKeyVerifier;
use deip_execution::Database;
use deip_types::app::OperationNotification;
use deip_types::config::{ChainConfig, GenesisAccount, GenesisConfig};
use deip_types::protocol::operations::TransferOperation;
use deip_types::protocol::{
    AccountName, Asset, BlockHeader, Operation, PublicKey, SignedBlock, SignedTransaction,
    TimePointSec, Transaction, DEIP_SYMBOL,
};
use parking_lot::Mutex;
use std::sync::Arc;

pub const GENESIS_TIME: u32 = 1_000;
pub const START_BALANCE: i64 = 1_000;

pub fn config() -> ChainConfig {
    let accounts = ["initminer", "alice", "bob", "lab"]
        .into_iter()
        .map(|name| GenesisAccount {
            name: AccountName::new(name),
            public_key: PublicKey::new(name),
            balance: START_BALANCE,
        })
        .collect();
    ChainConfig {
        genesis: GenesisConfig {
            time: TimePointSec::from_secs(GENESIS_TIME),
            accounts,
        },
        ..ChainConfig::default()
    }
}

/// A database whose verifier treats each signature as the signing key, and
/// whose accounts are keyed by their own names.
pub fn database(config: ChainConfig) -> Database {
    Database::open(config, Arc::new(PlainKeyVerifier)).unwrap()
}

/// Subscribes a collector and returns its buffer.
pub fn collect(db: &mut Database) -> Arc<Mutex<Vec<OperationNotification>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    db.subscribe("collector", move |note| {
        sink.lock().push(note.clone());
        Ok(())
    });
    seen
}

pub fn transfer(from: &str, to: &str, amount: i64, memo: &str) -> Operation {
    TransferOperation {
        from: from.into(),
        to: to.into(),
        amount: Asset::core(amount),
        memo: memo.into(),
    }
    .into()
}

/// A transaction referencing the current head, expiring a minute after it.
pub fn trx(db: &Database, ops: Vec<Operation>, signers: &[&str]) -> SignedTransaction {
    let head_time = db.head_block_time().unwrap();
    let mut transaction = Transaction {
        expiration: head_time.saturating_add(60),
        operations: ops,
        ..Transaction::default()
    };
    transaction.set_reference_block(&db.head_block_id().unwrap());
    let mut signed = SignedTransaction::new(transaction);
    signed.signatures = signers.iter().map(|s| s.to_string()).collect();
    signed
}

/// The next block on top of the head, `interval` seconds later.
pub fn block_at(db: &Database, interval: u32, transactions: Vec<SignedTransaction>) -> SignedBlock {
    let mut block = SignedBlock {
        header: BlockHeader {
            previous: db.head_block_id().unwrap(),
            timestamp: db.head_block_time().unwrap().saturating_add(interval),
            witness: "initminer".into(),
            ..BlockHeader::default()
        },
        witness_signature: String::new(),
        transactions,
    };
    block.header.transaction_merkle_root = block.calculate_merkle_root();
    block
}

pub fn block(db: &Database, transactions: Vec<SignedTransaction>) -> SignedBlock {
    block_at(db, 3, transactions)
}

pub fn balance(db: &Database, name: &str) -> i64 {
    db.with_view(|view| {
        view.assets()
            .get_balance(&name.into(), DEIP_SYMBOL)
            .unwrap()
            .amount
    })
}
