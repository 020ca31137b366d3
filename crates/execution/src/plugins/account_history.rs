// Path: crates/execution/src/plugins/account_history.rs
//! Keeps the most recent operations that touched each account.
//!
//! Every notification is filed under each account in
//! `Operation::impacted_accounts`, with a per-account sequence number that
//! starts at zero and never repeats. Entries beyond the configured depth are
//! dropped oldest first.

use deip_api::observer::OperationObserver;
use deip_types::app::OperationNotification;
use deip_types::protocol::AccountName;
use parking_lot::RwLock;
use std::collections::{BTreeMap, VecDeque};
use thiserror::Error;

/// Largest `limit` a history query accepts.
pub const MAX_HISTORY_QUERY: u32 = 10_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountHistoryError {
    /// More entries were requested than a single query may return.
    #[error("Limit of {limit} is greater than maximum allowed {max}")]
    LimitTooLarge { limit: u32, max: u32 },
    /// The starting sequence is below the limit.
    #[error("From must be greater than limit")]
    FromBelowLimit { from: u64, limit: u32 },
}

#[derive(Debug, Default)]
struct AccountEntries {
    next_sequence: u64,
    entries: VecDeque<(u64, OperationNotification)>,
}

/// The account history observer.
#[derive(Debug)]
pub struct AccountHistory {
    max_per_account: usize,
    accounts: RwLock<BTreeMap<AccountName, AccountEntries>>,
}

impl AccountHistory {
    /// Keeps at most `max_per_account` entries per account.
    pub fn new(max_per_account: usize) -> Self {
        Self {
            max_per_account,
            accounts: RwLock::new(BTreeMap::new()),
        }
    }

    /// Every retained entry for `account`, oldest first.
    pub fn history(&self, account: &AccountName) -> Vec<(u64, OperationNotification)> {
        self.accounts
            .read()
            .get(account)
            .map(|a| a.entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Up to `limit` entries with a sequence at or below `from`, newest
    /// included. `u64::MAX` starts from the latest entry.
    pub fn get_history(
        &self,
        account: &AccountName,
        from: u64,
        limit: u32,
    ) -> Result<BTreeMap<u64, OperationNotification>, AccountHistoryError> {
        if limit > MAX_HISTORY_QUERY {
            return Err(AccountHistoryError::LimitTooLarge {
                limit,
                max: MAX_HISTORY_QUERY,
            });
        }
        if from < u64::from(limit) {
            return Err(AccountHistoryError::FromBelowLimit { from, limit });
        }
        let accounts = self.accounts.read();
        let Some(account) = accounts.get(account) else {
            return Ok(BTreeMap::new());
        };
        Ok(account
            .entries
            .iter()
            .rev()
            .filter(|(seq, _)| *seq <= from)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    /// The retained history of `account` as a JSON array.
    pub fn history_json(&self, account: &AccountName) -> serde_json::Value {
        let entries = self
            .history(account)
            .into_iter()
            .map(|(sequence, note)| serde_json::json!({ "sequence": sequence, "op": note }))
            .collect();
        serde_json::Value::Array(entries)
    }
}

impl OperationObserver for AccountHistory {
    fn name(&self) -> &str {
        "account_history"
    }

    fn on_operation(&self, notification: &OperationNotification) -> Result<(), String> {
        let impacted = notification.op.impacted_accounts();
        if impacted.is_empty() {
            return Ok(());
        }
        let mut accounts = self.accounts.write();
        for name in impacted {
            let account = accounts.entry(name).or_default();
            let sequence = account.next_sequence;
            account.next_sequence = sequence.saturating_add(1);
            account.entries.push_back((sequence, notification.clone()));
            while account.entries.len() > self.max_per_account {
                account.entries.pop_front();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deip_types::protocol::operations::TransferOperation;
    use deip_types::protocol::{Asset, TimePointSec, TransactionId};

    fn transfer(amount: i64) -> OperationNotification {
        OperationNotification {
            trx_id: TransactionId::default(),
            block: 1,
            trx_in_block: 0,
            op_in_trx: 0,
            virtual_op: 0,
            timestamp: TimePointSec::from_secs(3),
            op: TransferOperation {
                from: "alice".into(),
                to: "bob".into(),
                amount: Asset::core(amount),
                memo: String::new(),
            }
            .into(),
        }
    }

    #[test]
    fn files_under_every_impacted_account() {
        let history = AccountHistory::new(10);
        history.on_operation(&transfer(1)).unwrap();
        assert_eq!(history.history(&"alice".into()).len(), 1);
        assert_eq!(history.history(&"bob".into()).len(), 1);
        assert!(history.history(&"carol".into()).is_empty());
    }

    #[test]
    fn drops_oldest_beyond_depth() {
        let history = AccountHistory::new(2);
        for amount in 1..=3 {
            history.on_operation(&transfer(amount)).unwrap();
        }
        let kept: Vec<u64> = history
            .history(&"alice".into())
            .into_iter()
            .map(|(seq, _)| seq)
            .collect();
        assert_eq!(kept, vec![1, 2]);
    }

    #[test]
    fn queries_walk_back_from_a_sequence() {
        let history = AccountHistory::new(100);
        for amount in 1..=5 {
            history.on_operation(&transfer(amount)).unwrap();
        }
        let page = history.get_history(&"alice".into(), 3, 2).unwrap();
        assert_eq!(page.keys().copied().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(
            history.get_history(&"alice".into(), u64::MAX, 100).unwrap().len(),
            5
        );
        assert!(matches!(
            history.get_history(&"alice".into(), 1, 2),
            Err(AccountHistoryError::FromBelowLimit { .. })
        ));
        assert!(history
            .get_history(&"alice".into(), u64::MAX, MAX_HISTORY_QUERY + 1)
            .is_err());

        let json = history.history_json(&"bob".into());
        assert_eq!(json.as_array().map(Vec::len), Some(5));
        assert_eq!(json[0]["sequence"], 0);
    }
}
