// Path: crates/services/src/transaction.rs

use deip_types::app::{time_key, BlockSummaryObject, TransactionObject};
use deip_types::error::EvaluationError;
use deip_types::protocol::{BlockId, TimePointSec, TransactionId};
use parity_scale_codec::Encode;

facade!(
    /// Applied transactions still inside their expiration window, for
    /// duplicate detection, and the ring of recent block ids that TaPoS
    /// references resolve against.
    TransactionService
);

fn slot_of(block_num: u32) -> u16 {
    (block_num & 0xffff) as u16
}

impl<S: std::borrow::Borrow<deip_state::ObjectStore>> TransactionService<S> {
    pub fn is_known(&self, trx_id: &TransactionId) -> Result<bool, EvaluationError> {
        Ok(self
            .store()
            .find_by::<TransactionObject>("trx_id", &trx_id.encode())?
            .is_some())
    }

    /// Whether `ref_block_num`/`ref_block_prefix` name a block in the summary
    /// ring.
    pub fn verify_tapos(&self, ref_block_num: u16, ref_block_prefix: u32) -> Result<bool, EvaluationError> {
        let summary = self
            .store()
            .find_by::<BlockSummaryObject>("slot", &ref_block_num.to_be_bytes())?;
        Ok(summary.is_some_and(|s| s.block_id.prefix() == ref_block_prefix))
    }
}

impl<S: std::borrow::BorrowMut<deip_state::ObjectStore>> TransactionService<S> {
    /// Remembers an applied transaction until `expiration`.
    pub fn record(&mut self, trx_id: TransactionId, expiration: TimePointSec) -> Result<(), EvaluationError> {
        ensure!(!self.is_known(&trx_id)?, "Duplicate transaction {}", trx_id);
        self.store_mut().create::<TransactionObject>(|t| {
            t.trx_id = trx_id;
            t.expiration = expiration;
        })?;
        Ok(())
    }

    /// Forgets transactions whose expiration is before `now`.
    pub fn clear_expired(&mut self, now: TimePointSec) -> Result<usize, EvaluationError> {
        let expired = self
            .store()
            .scan_below::<TransactionObject>("expiration", &time_key(now))?;
        for trx in &expired {
            self.store_mut().remove::<TransactionObject>(trx.id)?;
        }
        Ok(expired.len())
    }

    /// Writes `block_id` into its ring slot, replacing the block 65536
    /// heights earlier.
    pub fn set_block_summary(&mut self, block_id: BlockId) -> Result<(), EvaluationError> {
        let slot = slot_of(block_id.num());
        match self
            .store()
            .find_by::<BlockSummaryObject>("slot", &slot.to_be_bytes())?
        {
            Some(summary) => {
                self.store_mut()
                    .modify::<BlockSummaryObject>(summary.id, |s| s.block_id = block_id)?;
            }
            None => {
                self.store_mut().create::<BlockSummaryObject>(|s| {
                    s.slot = slot;
                    s.block_id = block_id;
                })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deip_state::ObjectStore;

    #[test]
    fn expired_transactions_are_forgotten() {
        let mut store = ObjectStore::new();
        let mut trxs = TransactionService::new(&mut store);
        let (a, b) = (TransactionId([1; 20]), TransactionId([2; 20]));
        trxs.record(a, TimePointSec::from_secs(10)).unwrap();
        trxs.record(b, TimePointSec::from_secs(20)).unwrap();
        assert!(trxs.record(a, TimePointSec::from_secs(30)).is_err());

        assert_eq!(trxs.clear_expired(TimePointSec::from_secs(10)).unwrap(), 0);
        assert_eq!(trxs.clear_expired(TimePointSec::from_secs(11)).unwrap(), 1);
        assert!(!trxs.is_known(&a).unwrap());
        assert!(trxs.is_known(&b).unwrap());
    }

    #[test]
    fn tapos_resolves_through_the_ring() {
        let mut store = ObjectStore::new();
        let mut trxs = TransactionService::new(&mut store);
        let first = BlockId::from_header(7, b"seven");
        trxs.set_block_summary(first).unwrap();
        assert!(trxs.verify_tapos(7, first.prefix()).unwrap());
        assert!(!trxs.verify_tapos(7, first.prefix().wrapping_add(1)).unwrap());
        assert!(!trxs.verify_tapos(8, first.prefix()).unwrap());

        let wrapped = BlockId::from_header(7 + 0x1_0000, b"later");
        trxs.set_block_summary(wrapped).unwrap();
        assert!(trxs.verify_tapos(7, wrapped.prefix()).unwrap());
    }
}
