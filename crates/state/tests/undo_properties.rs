// Path: crates/state/tests/undo_properties.rs
//! Property tests for undo sessions over typed records.

use deip_state::ObjectStore;
use deip_types::object_id_accessors;
use deip_types::store::{IndexEntry, Object, ObjectId};
use parity_scale_codec::{Decode, Encode};
use proptest::prelude::*;

#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq, Default)]
struct Ledger {
    id: ObjectId,
    code: u8,
    holder: u8,
    amount: u32,
}

impl Object for Ledger {
    const TABLE: &'static [u8] = b"ledger/";
    const NAME: &'static str = "ledger";
    object_id_accessors!();

    fn indexes(&self) -> Vec<IndexEntry> {
        vec![
            IndexEntry::unique("code", vec![self.code]),
            IndexEntry::ordered("holder", vec![self.holder]),
        ]
    }
}

#[derive(Debug, Clone)]
enum Step {
    Create { code: u8, holder: u8 },
    Modify { pick: usize, holder: u8, amount: u32 },
    Remove { pick: usize },
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0u8..16, 0u8..4).prop_map(|(code, holder)| Step::Create { code, holder }),
        (any::<usize>(), 0u8..4, any::<u32>())
            .prop_map(|(pick, holder, amount)| Step::Modify { pick, holder, amount }),
        any::<usize>().prop_map(|pick| Step::Remove { pick }),
    ]
}

fn run(store: &mut ObjectStore, steps: &[Step]) {
    for s in steps {
        let live = store.all::<Ledger>().unwrap();
        match *s {
            Step::Create { code, holder } => {
                // Collisions are expected and must leave no trace.
                let _ = store.create::<Ledger>(|l| {
                    l.code = code;
                    l.holder = holder;
                });
            }
            Step::Modify { pick, holder, amount } if !live.is_empty() => {
                let id = live[pick % live.len()].id;
                store
                    .modify::<Ledger>(id, |l| {
                        l.holder = holder;
                        l.amount = amount;
                    })
                    .unwrap();
            }
            Step::Remove { pick } if !live.is_empty() => {
                let id = live[pick % live.len()].id;
                store.remove::<Ledger>(id).unwrap();
            }
            _ => {}
        }
    }
}

proptest! {
    #[test]
    fn revert_restores_identical_bytes(
        setup in proptest::collection::vec(step(), 0..12),
        session in proptest::collection::vec(step(), 0..24),
    ) {
        let mut store = ObjectStore::new();
        run(&mut store, &setup);
        let before = store.snapshot();

        let cp = store.checkpoint();
        run(&mut store, &session);
        store.revert(cp).unwrap();

        prop_assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn nested_commit_then_outer_revert_restores(
        outer in proptest::collection::vec(step(), 0..12),
        inner in proptest::collection::vec(step(), 0..12),
    ) {
        let mut store = ObjectStore::new();
        let before = store.snapshot();

        let a = store.checkpoint();
        run(&mut store, &outer);
        let b = store.checkpoint();
        run(&mut store, &inner);
        store.commit(b).unwrap();
        store.revert(a).unwrap();

        prop_assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn indexes_track_live_records(steps in proptest::collection::vec(step(), 0..32)) {
        let mut store = ObjectStore::new();
        run(&mut store, &steps);
        for record in store.all::<Ledger>().unwrap() {
            let by_code = store.get_by::<Ledger>("code", &[record.code]).unwrap();
            prop_assert_eq!(&by_code, &record);
            let holders = store.scan_by::<Ledger>("holder", &[record.holder]).unwrap();
            prop_assert!(holders.contains(&record));
        }
    }
}

#[test]
fn retained_sessions_pop_in_reverse_order() {
    let mut store = ObjectStore::new();
    let mut snapshots = vec![store.snapshot()];
    for block in 1..=3u64 {
        let cp = store.checkpoint();
        store
            .create::<Ledger>(|l| {
                l.code = block as u8;
                l.amount = block as u32;
            })
            .unwrap();
        store.retain(cp, block).unwrap();
        snapshots.push(store.snapshot());
    }
    assert_eq!(store.reversible_depth(), 3);

    assert_eq!(store.undo_last().unwrap(), 3);
    assert_eq!(store.snapshot(), snapshots[2]);

    assert_eq!(store.set_irreversible(1), 1);
    assert_eq!(store.undo_last().unwrap(), 2);
    assert_eq!(store.snapshot(), snapshots[1]);
    assert!(store.undo_last().is_err());
}
