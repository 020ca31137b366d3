// Path: crates/execution/tests/pipeline.rs
//! Transaction and block pipeline behaviour through the `Database` API.

mod common;

use common::*;
use deip_api::test_utils::RecordingInterpreter;
use deip_execution::plugins::AccountHistory;
use deip_types::config::SkipFlags;
use deip_types::error::{
    AuthorityError, BlockError, ChainError, EvaluationError, StoreError, TransactionError, ValidationError,
};
use deip_types::protocol::operations::{
    AssessmentPhase, AssessmentStage, CreateAssessmentOperation, CustomJsonOperation,
    JoinResearchGroupMembershipOperation, ReserveAssetOperation, SignNdaContractOperation,
};
use deip_types::protocol::{Asset, BlockId, ExternalId, Operation, Percent, TimePointSec};
use std::collections::BTreeSet;
use std::sync::Arc;

const NONE: SkipFlags = SkipFlags::empty();

fn assessment() -> Operation {
    CreateAssessmentOperation {
        external_id: ExternalId::new("a".repeat(40)),
        creator: "alice".into(),
        stages: vec![AssessmentStage {
            phases: vec![AssessmentPhase {
                kind: 1,
                start_time: TimePointSec::from_secs(2_000),
                end_time: TimePointSec::from_secs(3_000),
            }],
        }],
    }
    .into()
}

fn custom_json(id: &str) -> Operation {
    CustomJsonOperation {
        required_auths: BTreeSet::from(["alice".into()]),
        required_owner_auths: BTreeSet::new(),
        id: id.into(),
        json: r#"{"who":"bob"}"#.into(),
    }
    .into()
}

// --- Scenarios ---

#[test]
fn membership_requires_both_parties() {
    let op: Operation = JoinResearchGroupMembershipOperation {
        member: "alice".into(),
        research_group: "bob".into(),
        weight: Percent::from_percent(5),
        is_invitation: true,
        researches: None,
    }
    .into();
    assert_eq!(op.validate(), Ok(()));
    let required = op.required_authorities();
    assert_eq!(
        required.active,
        BTreeSet::from(["alice".into(), "bob".into()])
    );
    assert!(required.owner.is_empty());
}

#[test]
fn zero_reserve_is_invalid() {
    let op: Operation = ReserveAssetOperation {
        owner: "alice".into(),
        amount: Asset::core(0),
    }
    .into();
    assert_eq!(
        op.validate(),
        Err(ValidationError::Constraint(
            "Amount to reserve must be greater than 0".into()
        ))
    );
}

#[test]
fn short_nda_signature_is_invalid() {
    let op: Operation = SignNdaContractOperation {
        external_id: ExternalId::new("e".repeat(40)),
        signer: "alice".into(),
        signature: "f".repeat(129),
    }
    .into();
    assert!(op.validate().is_err());
}

#[test]
fn second_assessment_is_a_duplicate_key() {
    let db = database(config());
    db.push_transaction(trx(&db, vec![assessment()], &["alice"]), NONE)
        .unwrap();

    let mut again = trx(&db, vec![assessment()], &["alice"]);
    again.transaction.expiration = again.expiration.saturating_add(1);
    let err = db.push_transaction(again, NONE).unwrap_err();
    assert!(matches!(
        err,
        ChainError::Transaction(TransactionError::Evaluation {
            index: 0,
            source: EvaluationError::Store(StoreError::DuplicateKey { .. }),
        })
    ));
}

#[test]
fn unregistered_custom_operation_changes_nothing() {
    let db = database(config());
    let before = db.snapshot();
    let err = db
        .push_transaction(trx(&db, vec![custom_json("follow")], &["alice"]), NONE)
        .unwrap_err();
    assert_eq!(
        err,
        ChainError::Transaction(TransactionError::Evaluation {
            index: 0,
            source: EvaluationError::UnknownCustomOperation("follow".into()),
        })
    );
    assert_eq!(db.snapshot(), before);
    assert!(db.pending_transactions().is_empty());
}

// --- Admission ---

#[test]
fn rejected_checks_leave_identical_state() {
    let db = database(config());
    let before = db.snapshot();

    let invalid = trx(&db, vec![transfer("alice", "bob", 0, "")], &["alice"]);
    assert!(matches!(
        db.push_transaction(invalid, NONE),
        Err(ChainError::Transaction(TransactionError::Validation { index: 0, .. }))
    ));
    assert_eq!(db.snapshot(), before);

    let unsigned = trx(&db, vec![transfer("alice", "bob", 10, "")], &["bob"]);
    assert_eq!(
        db.push_transaction(unsigned, NONE),
        Err(ChainError::Transaction(TransactionError::Authority(
            AuthorityError::MissingActive("alice".into())
        )))
    );
    assert_eq!(db.snapshot(), before);

    let failing = trx(&db, vec![transfer("alice", "bob", 5_000, "")], &["alice"]);
    assert!(db.push_transaction(failing, NONE).is_err());
    assert_eq!(db.snapshot(), before);
}

#[test]
fn expiration_tapos_and_duplicates_are_checked() {
    let db = database(config());
    let head = db.head_block_time().unwrap();

    let mut expired = trx(&db, vec![transfer("alice", "bob", 1, "")], &["alice"]);
    expired.transaction.expiration = head;
    assert!(matches!(
        db.push_transaction(expired, NONE),
        Err(ChainError::Transaction(TransactionError::Expired { .. }))
    ));

    let mut distant = trx(&db, vec![transfer("alice", "bob", 1, "")], &["alice"]);
    distant.transaction.expiration = head.saturating_add(db.config().max_time_until_expiration + 1);
    assert!(matches!(
        db.push_transaction(distant, NONE),
        Err(ChainError::Transaction(TransactionError::ExpirationTooFar { .. }))
    ));

    let mut unknown_ref = trx(&db, vec![transfer("alice", "bob", 1, "")], &["alice"]);
    unknown_ref.transaction.ref_block_num = 7;
    assert!(matches!(
        db.push_transaction(unknown_ref.clone(), NONE),
        Err(ChainError::Transaction(TransactionError::Tapos { ref_block_num: 7, .. }))
    ));
    db.push_transaction(unknown_ref, SkipFlags::SKIP_TAPOS_CHECK)
        .unwrap();

    let once = trx(&db, vec![transfer("alice", "bob", 2, "")], &["alice"]);
    db.push_transaction(once.clone(), NONE).unwrap();
    assert!(matches!(
        db.push_transaction(once, NONE),
        Err(ChainError::Transaction(TransactionError::Duplicate(_)))
    ));
    assert_eq!(balance(&db, "bob"), START_BALANCE + 3);
}

#[test]
fn skipping_authority_accepts_unsigned() {
    let db = database(config());
    let unsigned = trx(&db, vec![transfer("alice", "bob", 10, "")], &[]);
    db.push_transaction(unsigned, SkipFlags::SKIP_AUTHORITY_CHECK)
        .unwrap();
    assert_eq!(balance(&db, "bob"), START_BALANCE + 10);
}

// --- Blocks ---

#[test]
fn failing_transaction_keeps_earlier_effects() {
    let db = database(config());
    let t1 = trx(&db, vec![transfer("alice", "bob", 10, "one")], &["alice"]);
    let t2 = trx(&db, vec![transfer("bob", "lab", 20, "two")], &["bob"]);
    let t3 = trx(&db, vec![transfer("lab", "alice", 9_999, "three")], &["lab"]);

    let reference = database(config());
    reference.push_transaction(t1.clone(), NONE).unwrap();
    reference.push_transaction(t2.clone(), NONE).unwrap();

    let err = db
        .apply_block(&block(&db, vec![t1, t2, t3]), NONE)
        .unwrap_err();
    assert!(matches!(
        err,
        ChainError::Block(BlockError::TransactionFailed { index: 2, .. })
    ));
    assert_eq!(db.snapshot(), reference.snapshot());
    assert_eq!(db.head_block_num().unwrap(), 0);
}

#[test]
fn failing_block_is_reverted_entirely() {
    let db = database(config());
    let before = db.snapshot();
    let good = trx(&db, vec![transfer("alice", "bob", 10, "")], &["alice"]);
    let bad = trx(&db, vec![transfer("lab", "bob", 9_999, "")], &["lab"]);

    let err = db.push_block(&block(&db, vec![good, bad]), NONE).unwrap_err();
    assert!(matches!(
        err,
        ChainError::Block(BlockError::TransactionFailed { index: 1, .. })
    ));
    assert_eq!(db.snapshot(), before);
    assert_eq!(db.reversible_blocks(), 0);
}

#[test]
fn headers_are_checked() {
    let db = database(config());
    db.push_block(&block(&db, vec![]), NONE).unwrap();

    let mut orphan = block(&db, vec![]);
    orphan.header.previous = BlockId::default();
    assert!(matches!(
        db.push_block(&orphan, NONE),
        Err(ChainError::Block(BlockError::Unlinkable { .. }))
    ));

    let stale = block_at(&db, 0, vec![]);
    assert!(matches!(
        db.push_block(&stale, NONE),
        Err(ChainError::Block(BlockError::InvalidTimestamp { .. }))
    ));

    let t = trx(&db, vec![transfer("alice", "bob", 1, "")], &["alice"]);
    let mut tampered = block(&db, vec![t]);
    tampered.header.transaction_merkle_root = Default::default();
    assert!(matches!(
        db.push_block(&tampered, NONE),
        Err(ChainError::Block(BlockError::MerkleMismatch { .. }))
    ));
    db.push_block(&tampered, SkipFlags::SKIP_MERKLE_CHECK).unwrap();
    assert_eq!(db.head_block_num().unwrap(), 2);
}

#[test]
fn blocks_advance_the_head_and_pop_back() {
    let db = database(config());
    let genesis = db.snapshot();

    let t = trx(&db, vec![transfer("alice", "bob", 10, "")], &["alice"]);
    let b1 = block(&db, vec![t]);
    db.push_block(&b1, NONE).unwrap();
    assert_eq!(db.head_block_num().unwrap(), 1);
    assert_eq!(db.head_block_id().unwrap(), b1.id());
    assert_eq!(db.head_block_time().unwrap(), b1.header.timestamp);
    assert_eq!(balance(&db, "bob"), START_BALANCE + 10);

    // TaPoS now resolves against block 1.
    let t = trx(&db, vec![transfer("alice", "bob", 5, "")], &["alice"]);
    assert_eq!(t.ref_block_num, 1);
    db.push_block(&block(&db, vec![t]), NONE).unwrap();
    assert_eq!(db.reversible_blocks(), 2);

    assert_eq!(db.pop_block(), Ok(2));
    assert_eq!(db.pop_block(), Ok(1));
    assert_eq!(db.snapshot(), genesis);
    assert_eq!(
        db.pop_block(),
        Err(ChainError::Block(BlockError::NothingToPop))
    );
}

#[test]
fn irreversible_blocks_cannot_be_popped() {
    let db = database(config());
    for _ in 0..3 {
        db.push_block(&block(&db, vec![]), NONE).unwrap();
    }
    assert_eq!(db.set_irreversible(2), Ok(2));
    assert_eq!(db.last_irreversible_block(), 2);
    assert_eq!(db.reversible_blocks(), 1);
    assert_eq!(db.set_irreversible(1), Ok(0));

    assert_eq!(db.pop_block(), Ok(3));
    assert_eq!(
        db.pop_block(),
        Err(ChainError::Block(BlockError::NothingToPop))
    );
    db.push_block(&block(&db, vec![]), NONE).unwrap();
    assert_eq!(stored_lib(&db), 2);
}

fn stored_lib(db: &deip_execution::Database) -> u32 {
    db.with_view(|view| {
        view.dynamic_global_properties()
            .get()
            .unwrap()
            .last_irreversible_block_num
    })
}

#[test]
fn popping_keeps_the_stored_irreversible_block() {
    let db = database(config());
    for _ in 0..4 {
        db.push_block(&block(&db, vec![]), NONE).unwrap();
    }
    db.set_irreversible(2).unwrap();
    assert_eq!(stored_lib(&db), 2);

    assert_eq!(db.pop_block(), Ok(4));
    assert_eq!(db.last_irreversible_block(), 2);
    assert_eq!(stored_lib(&db), 2);
    assert_eq!(db.pop_block(), Ok(3));
    assert_eq!(stored_lib(&db), 2);
    assert_eq!(db.head_block_num(), Ok(2));
}

#[test]
fn pending_transactions_survive_blocks_until_included() {
    let db = database(config());
    let t = trx(&db, vec![transfer("alice", "bob", 10, "")], &["alice"]);
    db.push_transaction(t.clone(), NONE).unwrap();
    assert_eq!(db.pending_transactions().len(), 1);

    db.push_block(&block(&db, vec![]), NONE).unwrap();
    assert_eq!(db.pending_transactions(), vec![t.clone()]);
    assert_eq!(balance(&db, "bob"), START_BALANCE + 10);

    db.push_block(&block(&db, vec![t]), NONE).unwrap();
    assert!(db.pending_transactions().is_empty());
    assert_eq!(balance(&db, "bob"), START_BALANCE + 10);

    db.pop_block().unwrap();
    assert_eq!(balance(&db, "bob"), START_BALANCE);
}

#[test]
fn clearing_pending_restores_block_state() {
    let db = database(config());
    let before = db.snapshot();
    db.push_transaction(trx(&db, vec![transfer("alice", "bob", 10, "")], &["alice"]), NONE)
        .unwrap();
    assert_eq!(db.clear_pending(), Ok(1));
    assert_eq!(db.snapshot(), before);
}

#[test]
fn producer_is_rewarded_each_block() {
    let mut config = config();
    config.producer_reward = Asset::core(10);
    let mut db = database(config);
    let seen = collect(&mut db);
    let supply = |db: &deip_execution::Database| {
        db.with_view(|v| v.dynamic_global_properties().get().unwrap().current_supply)
    };
    let start = supply(&db);

    let t = trx(&db, vec![transfer("alice", "bob", 1, "")], &["alice"]);
    db.push_block(&block(&db, vec![t]), NONE).unwrap();
    assert_eq!(balance(&db, "initminer"), START_BALANCE + 10);
    assert_eq!(supply(&db).amount, start.amount + 10);

    let seen = seen.lock();
    let names: Vec<_> = seen.iter().map(|n| (n.op.name(), n.virtual_op)).collect();
    assert_eq!(names, vec![("transfer", 0), ("producer_reward", 1)]);
    assert_eq!(seen[1].trx_in_block, 1);
    assert_eq!(seen[1].block, 1);
}

// --- Custom operations and observers ---

#[test]
fn custom_operations_reach_their_interpreter() {
    let mut db = database(config());
    let recorder = Arc::new(RecordingInterpreter::new("follow"));
    db.register_interpreter(recorder.clone());

    db.push_transaction(trx(&db, vec![custom_json("follow")], &["alice"]), NONE)
        .unwrap();
    assert_eq!(recorder.applied().len(), 1);
    let prefix = recorder.prefix();
    assert_eq!(
        db.snapshot().keys().filter(|k| k.starts_with(&prefix)).count(),
        1
    );
}

#[test]
fn notifications_follow_commit_order() {
    let mut db = database(config());
    let seen = collect(&mut db);
    let t1 = trx(
        &db,
        vec![transfer("alice", "bob", 1, "a"), transfer("bob", "lab", 1, "b")],
        &["alice", "bob"],
    );
    let t2 = trx(&db, vec![transfer("lab", "alice", 1, "c")], &["lab"]);
    let failing = trx(&db, vec![transfer("lab", "alice", 9_999, "d")], &["lab"]);
    let b1 = block(&db, vec![t1.clone(), t2.clone()]);
    db.push_block(&b1, NONE).unwrap();
    assert!(db.push_transaction(failing, NONE).is_err());

    let seen = seen.lock();
    let positions: Vec<_> = seen
        .iter()
        .map(|n| (n.trx_id, n.trx_in_block, n.op_in_trx, n.block))
        .collect();
    assert_eq!(
        positions,
        vec![(t1.id(), 0, 0, 1), (t1.id(), 0, 1, 1), (t2.id(), 1, 0, 1)]
    );
    assert!(seen.iter().all(|n| n.timestamp == b1.header.timestamp));
}

#[test]
fn observer_failures_are_reported_not_rolled_back() {
    let mut db = database(config());
    db.subscribe("broken", |_| Err("index unavailable".to_string()));
    let history = Arc::new(AccountHistory::new(100));
    db.add_observer(history.clone());

    let t = trx(&db, vec![transfer("alice", "bob", 10, "")], &["alice"]);
    db.push_block(&block(&db, vec![t]), NONE).unwrap();
    assert_eq!(balance(&db, "bob"), START_BALANCE + 10);

    let errors = db.take_observer_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].observer, "broken");
    assert!(db.take_observer_errors().is_empty());

    let bob = history.history(&"bob".into());
    assert_eq!(bob.len(), 1);
    assert_eq!(bob[0].1.op.name(), "transfer");
    assert_eq!(bob[0].1.block, 1);
}

#[test]
fn pending_transactions_are_published_once_included() {
    let mut db = database(config());
    let seen = collect(&mut db);
    let history = Arc::new(AccountHistory::new(100));
    db.add_observer(history.clone());

    let t = trx(&db, vec![transfer("alice", "bob", 10, "")], &["alice"]);
    db.push_transaction(t.clone(), NONE).unwrap();
    assert!(seen.lock().is_empty());

    db.push_block(&block(&db, vec![]), NONE).unwrap();
    assert!(seen.lock().is_empty());

    db.push_block(&block(&db, vec![t.clone()]), NONE).unwrap();
    let notes: Vec<_> = seen.lock().iter().map(|n| (n.trx_id, n.block)).collect();
    assert_eq!(notes, vec![(t.id(), 2)]);
    assert_eq!(history.history(&"bob".into()).len(), 1);
}

#[test]
fn cleared_pending_transactions_are_never_published() {
    let mut db = database(config());
    let seen = collect(&mut db);
    db.push_transaction(trx(&db, vec![transfer("alice", "bob", 10, "")], &["alice"]), NONE)
        .unwrap();
    assert_eq!(db.clear_pending(), Ok(1));
    db.push_block(&block(&db, vec![]), NONE).unwrap();
    assert!(seen.lock().is_empty());
    assert_eq!(balance(&db, "bob"), START_BALANCE);
}
