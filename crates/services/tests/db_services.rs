// Path: crates/services/tests/db_services.rs
//! Facades handed out by one factory share one store.

use deip_services::{DbServices, DbView};
use deip_state::ObjectStore;
use deip_types::error::EvaluationError;
use deip_types::protocol::{AccountName, Asset, Authority, PublicKey, TimePointSec, DEIP_SYMBOL};

fn key() -> PublicKey {
    PublicKey::new("DEIP6LLegbAgLAy28EHrffBVuANFWcFgmqRMW13wBmTExqFE9SCkg4")
}

fn bootstrap(store: &mut ObjectStore) {
    let mut db = DbServices::new(store);
    db.dynamic_global_properties()
        .initialize(TimePointSec::from_secs(1_000), &"initminer".into(), Asset::core(0))
        .unwrap();
    db.expertise_stats().initialize().unwrap();
    for name in ["alice", "bob"] {
        db.accounts()
            .create_account(
                &name.into(),
                None,
                Authority::from_key(key()),
                Authority::from_key(key()),
                key(),
                None,
                TimePointSec::from_secs(1_000),
            )
            .unwrap();
    }
}

#[test]
fn writes_through_one_facade_are_visible_through_another() {
    let mut store = ObjectStore::new();
    bootstrap(&mut store);

    let alice = AccountName::from("alice");
    {
        let mut db = DbServices::new(&mut store);
        db.assets().adjust_balance(&alice, &Asset::core(75)).unwrap();
        db.dynamic_global_properties()
            .adjust_supply(&Asset::core(75))
            .unwrap();
        assert_eq!(
            db.view().assets().get_balance(&alice, DEIP_SYMBOL).unwrap(),
            Asset::core(75)
        );
    }

    let view = DbView::new(&store);
    assert_eq!(
        view.dynamic_global_properties().get().unwrap().current_supply,
        Asset::core(75)
    );
    assert!(view.accounts().find_account(&"bob".into()).unwrap().is_some());
    assert!(view.accounts().find_account(&"carol".into()).unwrap().is_none());
}

#[test]
fn failed_facade_call_inside_a_session_is_reverted() {
    let mut store = ObjectStore::new();
    bootstrap(&mut store);
    let before = store.snapshot();

    let result: Result<(), EvaluationError> = store.with_checkpoint(|s| {
        let mut db = DbServices::new(s);
        let bob = AccountName::from("bob");
        db.assets().adjust_balance(&bob, &Asset::core(10))?;
        db.assets().adjust_balance(&bob, &Asset::core(-11))?;
        Ok(())
    });

    assert!(matches!(
        result,
        Err(EvaluationError::InsufficientBalance { .. })
    ));
    assert_eq!(store.snapshot(), before);
}
