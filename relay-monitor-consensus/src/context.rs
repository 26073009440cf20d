use crate::{basefee, cache::BoundedCache};
use beacon_api_client::{mainnet::Client, BlockId, StateId, ValidatorSummary};
use ethereum_consensus::{
    primitives::{BlsPublicKey, Epoch, Hash32, Slot, U256},
    types::mainnet::SignedBeaconBlock,
};
use parking_lot::RwLock;
use relay_monitor_types::Error;
use std::{collections::HashMap, num::NonZeroUsize, time::Duration};
use tracing::{trace, warn};

/// Default capacity for each of the three LRU maps; large enough that the
/// common case of validating slot `s` against slot `s-1` never evicts within
/// an epoch (see "LRU eviction of hot state").
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

const BACKFILL_RETRIES: usize = 3;
const BACKFILL_RETRY_DELAY: Duration = Duration::from_secs(1);
const BACKFILL_MAX_SLOTS_BACK: u64 = 3;

#[derive(Default)]
struct ValidatorState {
    pubkeys_by_index: HashMap<u64, BlsPublicKey>,
    validators: HashMap<BlsPublicKey, ValidatorSummary>,
}

/// The cached view of consensus state the bid-validation state machine needs:
/// parent hashes, proposer duties, RANDAO, block numbers, and base fees, all
/// derived from data already fetched for some other purpose wherever
/// possible rather than issued as dedicated requests.
pub struct ConsensusContext {
    beacon_node: Client,
    slots_per_epoch: Slot,
    proposers: BoundedCache<Slot, BlsPublicKey>,
    blocks: BoundedCache<Slot, SignedBeaconBlock>,
    block_number_to_slot: BoundedCache<u64, Slot>,
    validators: RwLock<ValidatorState>,
}

impl ConsensusContext {
    pub fn new(beacon_node: Client, slots_per_epoch: Slot) -> Self {
        let capacity = NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap();
        Self {
            beacon_node,
            slots_per_epoch,
            proposers: BoundedCache::new(capacity),
            blocks: BoundedCache::new(capacity),
            block_number_to_slot: BoundedCache::new(capacity),
            validators: RwLock::new(ValidatorState::default()),
        }
    }

    fn cache_block(&self, slot: Slot, block: SignedBeaconBlock) {
        if let Some(payload) = block.message().body().execution_payload() {
            self.block_number_to_slot.put(payload.block_number(), slot);
        }
        self.blocks.put(slot, block);
    }

    /// Fetches and caches the block at `slot`, applying the back-fill policy:
    /// retry three times at a one second delay for a skipped slot, then
    /// search back up to three prior slots before giving up. Never
    /// synthesizes a block it did not receive over the wire.
    async fn fetch_block(&self, slot: Slot) -> Result<SignedBeaconBlock, Error> {
        if let Some(block) = self.blocks.get(&slot) {
            return Ok(block)
        }

        for attempt in 0..=BACKFILL_RETRIES {
            match self.beacon_node.get_beacon_block(BlockId::Slot(slot)).await {
                Ok(block) => {
                    self.cache_block(slot, block.clone());
                    return Ok(block)
                }
                Err(err) if attempt < BACKFILL_RETRIES => {
                    trace!(%slot, attempt, %err, "block missing, retrying");
                    tokio::time::sleep(BACKFILL_RETRY_DELAY).await;
                }
                Err(err) => {
                    warn!(%slot, %err, "slot appears skipped; searching back-fill window");
                }
            }
        }

        for offset in 1..=BACKFILL_MAX_SLOTS_BACK {
            let candidate = slot.saturating_sub(offset);
            if let Some(block) = self.blocks.get(&candidate) {
                return Ok(block)
            }
            if let Ok(block) = self.beacon_node.get_beacon_block(BlockId::Slot(candidate)).await {
                self.cache_block(candidate, block.clone());
                return Ok(block)
            }
        }

        Err(Error::MissingBlock(slot))
    }

    /// Fetches the block at `slot` and its execution payload together;
    /// pre-merge blocks (no payload) are treated the same as a missing
    /// block, since there is nothing this monitor can validate against.
    async fn fetch_parent_payload(
        &self,
        slot: Slot,
    ) -> Result<ethereum_consensus::types::mainnet::ExecutionPayload, Error> {
        let parent_slot = slot.saturating_sub(1);
        let block = self.fetch_block(parent_slot).await?;
        block.message().body().execution_payload().cloned().ok_or(Error::MissingBlock(parent_slot))
    }

    /// Returns the execution block hash of the block proposed at `slot - 1`.
    pub async fn get_parent_hash(&self, slot: Slot) -> Result<Hash32, Error> {
        let payload = self.fetch_parent_payload(slot).await?;
        Ok(payload.block_hash().clone())
    }

    /// Looks up the cached proposer for `slot`; callers should trigger a
    /// proposer-duties refill for the covering epoch on `MissingProposer`.
    pub fn get_proposer_public_key(&self, slot: Slot) -> Result<BlsPublicKey, Error> {
        self.proposers.get(&slot).ok_or(Error::MissingProposer(slot))
    }

    /// Returns the beacon state's RANDAO mix at `slot - 1`; this is the value
    /// the proposer at `slot` must use as `prev_randao`.
    pub async fn get_randomness_for_proposal(&self, slot: Slot) -> Result<Hash32, Error> {
        let randao = self.beacon_node.get_randao(StateId::Slot(slot.saturating_sub(1)), None).await?;
        Ok(randao)
    }

    pub async fn get_block_number_for_proposal(&self, slot: Slot) -> Result<u64, Error> {
        let payload = self.fetch_parent_payload(slot).await?;
        Ok(payload.block_number() + 1)
    }

    pub async fn get_base_fee_for_proposal(&self, slot: Slot) -> Result<U256, Error> {
        let payload = self.fetch_parent_payload(slot).await?;
        Ok(basefee::compute_base_fee(
            payload.gas_limit(),
            payload.gas_used(),
            *payload.base_fee_per_gas(),
        ))
    }

    /// Resolves the parent gas limit for the block carrying execution
    /// `block_number`, used by the gas-limit drift rule. Indeterminate
    /// (`MissingBlockNumberMapping`) when the number has not been indexed
    /// yet; callers must treat that as "skip the check", not a fault.
    pub async fn get_parent_gas_limit(&self, block_number: u64) -> Result<u64, Error> {
        let parent_block_number = block_number.saturating_sub(1);
        let slot = self
            .block_number_to_slot
            .get(&parent_block_number)
            .ok_or(Error::MissingBlockNumberMapping(parent_block_number))?;
        let block = self.fetch_block(slot).await?;
        let payload = block
            .message()
            .body()
            .execution_payload()
            .cloned()
            .ok_or(Error::MissingBlock(slot))?;
        Ok(payload.gas_limit())
    }

    /// Fetches the block at head (or any slot) and warms the block caches;
    /// called from the consensus-sync loop on every head event.
    pub async fn observe_block_at(&self, slot: Slot) -> Result<(), Error> {
        self.fetch_block(slot).await.map(|_| ())
    }

    /// Refills proposer duties for `epoch`, called at every epoch boundary
    /// for `epoch + 1`.
    pub async fn refresh_proposer_duties(&self, epoch: Epoch) -> Result<(), Error> {
        let (_dependent_root, duties) = self.beacon_node.get_proposer_duties(epoch).await?;
        for duty in duties {
            self.proposers.put(duty.slot, duty.public_key);
        }
        Ok(())
    }

    /// Refreshes the validator index/pubkey maps, called at every epoch
    /// boundary, mirroring `ValidatorRegistry::on_epoch`.
    pub async fn refresh_validators(&self, epoch: Epoch) -> Result<(), Error> {
        let slot = epoch * self.slots_per_epoch;
        let summaries = self.beacon_node.get_validators(StateId::Slot(slot), &[], &[]).await?;
        let mut state = self.validators.write();
        for summary in summaries {
            let public_key = summary.validator.public_key.clone();
            state.pubkeys_by_index.insert(summary.index, public_key.clone());
            state.validators.insert(public_key, summary);
        }
        Ok(())
    }

    pub fn get_public_key_by_index(&self, index: u64) -> Option<BlsPublicKey> {
        self.validators.read().pubkeys_by_index.get(&index).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_capacity_is_non_zero() {
        assert!(DEFAULT_CACHE_CAPACITY > 0);
    }
}
