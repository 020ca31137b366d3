// Path: crates/execution/src/authority.rs
//! Turns a transaction's declared authority requirements into verifier
//! questions.
//!
//! Owner requirements need the owner authority. Active requirements are met
//! by the active authority or, failing that, by the owner authority. Key
//! requirements need a signature by that exact key.

use deip_api::authority::AuthorityVerifier;
use deip_services::DbView;
use deip_types::error::{AuthorityError, ChainError, TransactionError};
use deip_types::protocol::{AuthorityLevel, SignedTransaction};

fn missing(e: AuthorityError) -> ChainError {
    ChainError::Transaction(TransactionError::Authority(e))
}

/// Checks every authority `trx` requires against the stored account
/// authorities. An unknown account counts as a missing authority.
pub fn verify_authority(
    view: DbView<'_>,
    verifier: &dyn AuthorityVerifier,
    trx: &SignedTransaction,
) -> Result<(), ChainError> {
    let required = trx.required_authorities();
    let accounts = view.accounts();

    for name in &required.owner {
        let account = accounts
            .find_account(name)?
            .ok_or_else(|| missing(AuthorityError::MissingOwner(name.to_string())))?;
        if !verifier.is_covered(trx, name, &account.owner, AuthorityLevel::Owner) {
            return Err(missing(AuthorityError::MissingOwner(name.to_string())));
        }
    }

    for name in &required.active {
        let account = accounts
            .find_account(name)?
            .ok_or_else(|| missing(AuthorityError::MissingActive(name.to_string())))?;
        let covered = verifier.is_covered(trx, name, &account.active, AuthorityLevel::Active)
            || verifier.is_covered(trx, name, &account.owner, AuthorityLevel::Owner);
        if !covered {
            return Err(missing(AuthorityError::MissingActive(name.to_string())));
        }
    }

    for key in &required.keys {
        if !verifier.has_key_signature(trx, key) {
            return Err(missing(AuthorityError::MissingKey(key.to_string())));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use deip_api::test_utils::PlainKeyVerifier;
    use deip_services::DbServices;
    use deip_state::ObjectStore;
    use deip_types::protocol::operations::{TransferOperation, UpdateAccountOperation};
    use deip_types::protocol::{AccountName, Asset, Authority, PublicKey, TimePointSec, Transaction};

    fn store_with(accounts: &[(&str, &str, &str)]) -> ObjectStore {
        let mut store = ObjectStore::new();
        let mut db = DbServices::new(&mut store);
        for (name, owner, active) in accounts {
            db.accounts()
                .create_account(
                    &AccountName::from(*name),
                    None,
                    Authority::from_key(PublicKey::new(*owner)),
                    Authority::from_key(PublicKey::new(*active)),
                    PublicKey::new(*active),
                    None,
                    TimePointSec::default(),
                )
                .unwrap();
        }
        store
    }

    fn signed(op: impl Into<deip_types::protocol::Operation>, keys: &[&str]) -> SignedTransaction {
        let mut trx = SignedTransaction::new(Transaction {
            operations: vec![op.into()],
            ..Default::default()
        });
        trx.signatures = keys.iter().map(|k| k.to_string()).collect();
        trx
    }

    fn transfer() -> TransferOperation {
        TransferOperation {
            from: "alice".into(),
            to: "bob".into(),
            amount: Asset::core(1),
            memo: String::new(),
        }
    }

    #[test]
    fn owner_key_covers_active_requirement() {
        let store = store_with(&[("alice", "OWNER", "ACTIVE")]);
        let view = DbView::new(&store);
        assert!(verify_authority(view, &PlainKeyVerifier, &signed(transfer(), &["ACTIVE"])).is_ok());
        assert!(verify_authority(view, &PlainKeyVerifier, &signed(transfer(), &["OWNER"])).is_ok());
        let err = verify_authority(view, &PlainKeyVerifier, &signed(transfer(), &["OTHER"])).unwrap_err();
        assert_eq!(
            err,
            missing(AuthorityError::MissingActive("alice".into()))
        );
    }

    #[test]
    fn active_key_does_not_cover_owner_requirement() {
        let store = store_with(&[("alice", "OWNER", "ACTIVE")]);
        let op = UpdateAccountOperation {
            account: "alice".into(),
            owner: Some(Authority::from_key(PublicKey::new("NEW"))),
            ..Default::default()
        };
        let view = DbView::new(&store);
        assert!(matches!(
            verify_authority(view, &PlainKeyVerifier, &signed(op.clone(), &["ACTIVE"])),
            Err(ChainError::Transaction(TransactionError::Authority(
                AuthorityError::MissingOwner(_)
            )))
        ));
        assert!(verify_authority(view, &PlainKeyVerifier, &signed(op, &["OWNER"])).is_ok());
    }

    #[test]
    fn unknown_account_is_missing_authority() {
        let store = store_with(&[]);
        assert!(matches!(
            verify_authority(DbView::new(&store), &PlainKeyVerifier, &signed(transfer(), &["ACTIVE"])),
            Err(ChainError::Transaction(TransactionError::Authority(
                AuthorityError::MissingActive(_)
            )))
        ));
    }
}
