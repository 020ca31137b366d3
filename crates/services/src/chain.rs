// Path: crates/services/src/chain.rs

use deip_types::app::{
    time_key, DynamicGlobalPropertyObject, ExpertiseSample, ExpertiseStatsObject,
    RecentEntityObject,
};
use deip_types::error::EvaluationError;
use deip_types::protocol::{AccountName, Asset, BlockId, ExternalId, TimePointSec};
use deip_types::store::ObjectId;
use parity_scale_codec::Encode;

const SINGLETON: ObjectId = ObjectId(0);

facade!(
    /// The dynamic global properties singleton and the recent-entity
    /// register used for external id replay protection.
    DynamicGlobalPropertiesService
);

impl<S: std::borrow::Borrow<deip_state::ObjectStore>> DynamicGlobalPropertiesService<S> {
    pub fn get(&self) -> Result<DynamicGlobalPropertyObject, EvaluationError> {
        Ok(self.store().get(SINGLETON)?)
    }

    /// Whether `external_id` was consumed within the recent-entity lifetime.
    pub fn entity_exists(&self, external_id: &ExternalId) -> Result<bool, EvaluationError> {
        Ok(self
            .store()
            .find_by::<RecentEntityObject>("external_id", &external_id.encode())?
            .is_some())
    }
}

impl<S: std::borrow::BorrowMut<deip_state::ObjectStore>> DynamicGlobalPropertiesService<S> {
    /// Creates the singleton. Only genesis calls this.
    pub fn initialize(
        &mut self,
        time: TimePointSec,
        witness: &AccountName,
        supply: Asset,
    ) -> Result<DynamicGlobalPropertyObject, EvaluationError> {
        let props = self.store_mut().create::<DynamicGlobalPropertyObject>(|p| {
            p.time = time;
            p.current_witness = witness.clone();
            p.current_supply = supply;
        })?;
        ensure!(
            props.id == SINGLETON,
            "Dynamic global properties are already initialized"
        );
        Ok(props)
    }

    /// Advances the head to `block_id`, produced by `witness` at `time`.
    pub fn update_head(
        &mut self,
        block_id: BlockId,
        time: TimePointSec,
        witness: &AccountName,
    ) -> Result<DynamicGlobalPropertyObject, EvaluationError> {
        Ok(self
            .store_mut()
            .modify::<DynamicGlobalPropertyObject>(SINGLETON, |p| {
                p.head_block_number = block_id.num();
                p.head_block_id = block_id;
                p.time = time;
                p.current_witness = witness.clone();
            })?)
    }

    pub fn set_last_irreversible_block(&mut self, block_num: u32) -> Result<(), EvaluationError> {
        self.store_mut()
            .modify::<DynamicGlobalPropertyObject>(SINGLETON, |p| {
                p.last_irreversible_block_num = block_num;
            })?;
        Ok(())
    }

    /// Changes the core asset supply by `delta`.
    pub fn adjust_supply(&mut self, delta: &Asset) -> Result<Asset, EvaluationError> {
        let props = self.get()?;
        let supply = props.current_supply.checked_add(delta);
        ensure!(
            supply.is_some_and(|s| s.amount >= 0),
            "Cannot adjust supply {} by {}",
            props.current_supply,
            delta
        );
        let supply = supply.unwrap_or(props.current_supply);
        self.store_mut()
            .modify::<DynamicGlobalPropertyObject>(SINGLETON, |p| p.current_supply = supply)?;
        Ok(supply)
    }

    /// Marks `external_id` as consumed at the current head time.
    pub fn create_recent_entity(&mut self, external_id: &ExternalId) -> Result<(), EvaluationError> {
        ensure!(
            !self.entity_exists(external_id)?,
            "Entity with id {} was recently created",
            external_id
        );
        let now = self.get()?.time;
        self.store_mut().create::<RecentEntityObject>(|e| {
            e.external_id = external_id.clone();
            e.created_at = now;
        })?;
        Ok(())
    }

    /// Drops recent entities created more than `lifetime_sec` before `now`.
    pub fn clear_expired_recent_entities(
        &mut self,
        now: TimePointSec,
        lifetime_sec: u32,
    ) -> Result<usize, EvaluationError> {
        let cutoff = time_key(now.saturating_sub(lifetime_sec));
        let expired = self
            .store()
            .scan_below::<RecentEntityObject>("created_at", &cutoff)?;
        for entity in &expired {
            self.store_mut().remove::<RecentEntityObject>(entity.id)?;
        }
        Ok(expired.len())
    }
}

facade!(
    /// Expertise usage statistics: a running total, the amount used in the
    /// current block, and a rolling one-week window of per-block usage.
    ExpertiseStatsService
);

impl<S: std::borrow::Borrow<deip_state::ObjectStore>> ExpertiseStatsService<S> {
    pub fn get(&self) -> Result<ExpertiseStatsObject, EvaluationError> {
        Ok(self.store().get(SINGLETON)?)
    }
}

impl<S: std::borrow::BorrowMut<deip_state::ObjectStore>> ExpertiseStatsService<S> {
    /// Creates the singleton. Only genesis calls this.
    pub fn initialize(&mut self) -> Result<ExpertiseStatsObject, EvaluationError> {
        let stats = self.store_mut().create::<ExpertiseStatsObject>(|_| {})?;
        ensure!(
            stats.id == SINGLETON,
            "Expertise statistics are already initialized"
        );
        Ok(stats)
    }

    /// Charges `amount` of expertise to the current block.
    ///
    /// No operation in the current catalog spends expertise, so nothing in
    /// the pipeline calls this yet. It is the entry point for evaluators of
    /// expertise-weighted actions such as reviews and votes; the block
    /// boundary then closes whatever they charged.
    pub fn increase_total_used_expertise_amount(
        &mut self,
        amount: i64,
    ) -> Result<ExpertiseStatsObject, EvaluationError> {
        ensure!(amount >= 0, "Amount cannot be negative");
        let stats = self.get()?;
        let total = stats.total_used_expertise.checked_add(amount);
        let per_block = stats.used_expertise_per_block.checked_add(amount);
        let (Some(total), Some(per_block)) = (total, per_block) else {
            return Err(EvaluationError::Precondition(
                "Used expertise amount overflows".into(),
            ));
        };
        Ok(self.store_mut().modify::<ExpertiseStatsObject>(SINGLETON, |s| {
            s.total_used_expertise = total;
            s.used_expertise_per_block = per_block;
        })?)
    }

    /// Closes the per-block counter for `block_num`: its usage joins the
    /// weekly window and the counter restarts at zero.
    pub fn reset_used_expertise_per_block(&mut self, block_num: u32) -> Result<(), EvaluationError> {
        self.store_mut()
            .modify::<ExpertiseStatsObject>(SINGLETON, |s| {
                if s.used_expertise_per_block != 0 {
                    s.recent.push(ExpertiseSample {
                        block_num,
                        amount: s.used_expertise_per_block,
                    });
                    s.used_expertise_last_week =
                        s.used_expertise_last_week.saturating_add(s.used_expertise_per_block);
                }
                s.used_expertise_per_block = 0;
            })?;
        Ok(())
    }

    /// Drops samples that fell out of the `blocks_per_week` window ending at
    /// `block_num` and returns the usage still inside it.
    pub fn calculate_used_expertise_for_week(
        &mut self,
        block_num: u32,
        blocks_per_week: u32,
    ) -> Result<i64, EvaluationError> {
        let oldest_kept = block_num.saturating_sub(blocks_per_week);
        let stats = self.store_mut().modify::<ExpertiseStatsObject>(SINGLETON, |s| {
            let (dropped, kept): (Vec<_>, Vec<_>) =
                s.recent.drain(..).partition(|x| x.block_num <= oldest_kept);
            let dropped: i64 = dropped.iter().map(|x| x.amount).sum();
            s.used_expertise_last_week = s.used_expertise_last_week.saturating_sub(dropped);
            s.recent = kept;
        })?;
        Ok(stats.used_expertise_last_week)
    }
}
