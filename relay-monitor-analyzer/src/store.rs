//! The Fault Store: per-relay state guarded by a lock, append-only record
//! history, and the latest-per-key tables the analyzer and query surface
//! both read. The validator-registration insert rule mirrors
//! `ValidatorRegistry::process_registration`'s "outdated registration" and
//! "nothing changed" rejections, generalized from a hard error into a
//! boolean accept/reject since this store has no network round trip to fail.

use ethereum_consensus::{builder::SignedValidatorRegistration, primitives::{BlsPublicKey, Slot}};
use parking_lot::RwLock;
use relay_monitor_types::{
    types::{BidContext, SignedBid, SignedBlindedBeaconBlock},
    FaultCategory, FaultRecord, FaultReason, FaultSummary,
};
use std::collections::HashMap;

const MAX_RECORDS_RETURNED: usize = 100;

/// An optionally-open slot range used throughout the query surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotBounds {
    pub start: Option<Slot>,
    pub end: Option<Slot>,
}

impl SlotBounds {
    pub fn contains(&self, slot: Slot) -> bool {
        self.start.map_or(true, |start| slot >= start) && self.end.map_or(true, |end| slot <= end)
    }
}

#[derive(Default)]
struct RelayState {
    summary: FaultSummary,
    records: Vec<FaultRecord>,
    bids: HashMap<BidContext, SignedBid>,
    acceptances: HashMap<BidContext, SignedBlindedBeaconBlock>,
}

/// Validator registrations are submitted by proposers, not by relays, so
/// they are kept network-wide rather than partitioned per relay (unlike
/// bids, acceptances, and fault records).
#[derive(Default)]
pub struct FaultStore {
    relays: RwLock<HashMap<BlsPublicKey, RelayState>>,
    registrations: RwLock<HashMap<BlsPublicKey, SignedValidatorRegistration>>,
}

impl FaultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persists the raw bid under its context; overwrites any prior bid
    /// stored at the same context (the in-memory store keeps latest-per-key,
    /// per the data model; a persistent collaborator would append instead).
    pub fn put_bid(&self, relay: &BlsPublicKey, context: BidContext, bid: SignedBid) {
        let mut relays = self.relays.write();
        let state = relays.entry(relay.clone()).or_default();
        state.bids.insert(context, bid);
    }

    pub fn get_bid(&self, relay: &BlsPublicKey, context: &BidContext) -> Option<SignedBid> {
        self.relays.read().get(relay).and_then(|state| state.bids.get(context).cloned())
    }

    /// Rejects a registration iff a strictly newer one is already on file, or
    /// the latest on file already carries identical preferences.
    pub fn put_validator_registration(&self, registration: SignedValidatorRegistration) -> bool {
        let mut registrations = self.registrations.write();
        let message = &registration.message;

        if let Some(existing) = registrations.get(&message.public_key) {
            let existing = &existing.message;
            if existing.timestamp > message.timestamp {
                return false
            }
            if existing.fee_recipient == message.fee_recipient && existing.gas_limit == message.gas_limit {
                return false
            }
        }

        registrations.insert(message.public_key.clone(), registration);
        true
    }

    pub fn latest_registration(&self, proposer_public_key: &BlsPublicKey) -> Option<SignedValidatorRegistration> {
        self.registrations.read().get(proposer_public_key).cloned()
    }

    pub fn put_acceptance(&self, relay: &BlsPublicKey, context: BidContext, acceptance: SignedBlindedBeaconBlock) {
        let mut relays = self.relays.write();
        let state = relays.entry(relay.clone()).or_default();
        state.acceptances.insert(context, acceptance);
    }

    /// Records the outcome of one analyzed bid: always bumps `totalBids`,
    /// bumps the matching category counter on a fault, and appends the
    /// detailed record either way (`records` needs `ValidBid` entries too).
    pub fn record_outcome(&self, relay: &BlsPublicKey, record: FaultRecord) {
        let mut relays = self.relays.write();
        let state = relays.entry(relay.clone()).or_default();
        state.summary.record(record.category);
        state.records.push(record);
    }

    /// A relay returned 204 ("no bid") for the slot. Bumps `no_bids` only;
    /// there is no bid content to append to `records`.
    pub fn record_no_bid(&self, relay: &BlsPublicKey) {
        let mut relays = self.relays.write();
        let state = relays.entry(relay.clone()).or_default();
        state.summary.record_no_bid();
    }

    /// Records a fault that is tracked for `records` queries but, per the
    /// transcript/stored-bid mismatch resolution, never counted in
    /// `totalBids` or any category counter.
    pub fn record_uncounted(&self, relay: &BlsPublicKey, record: FaultRecord) {
        let mut relays = self.relays.write();
        let state = relays.entry(relay.clone()).or_default();
        state.records.push(record);
    }

    pub fn fault_summary(&self, relay: &BlsPublicKey, bounds: SlotBounds) -> FaultSummary {
        let relays = self.relays.read();
        let Some(state) = relays.get(relay) else { return FaultSummary::default() };
        if bounds.start.is_none() && bounds.end.is_none() {
            return state.summary.clone()
        }
        let mut summary = FaultSummary::default();
        for record in &state.records {
            // `TranscriptBidMismatch` is appended via `record_uncounted` and,
            // per the transcript/stored-bid mismatch resolution, never
            // counted toward `total_bids` or a category counter.
            if record.reason == Some(FaultReason::TranscriptBidMismatch) {
                continue
            }
            if bounds.contains(record.slot()) {
                summary.record(record.category);
            }
        }
        summary
    }

    /// Latest 100 matching records, descending by slot.
    pub fn records(
        &self,
        relay: &BlsPublicKey,
        bounds: SlotBounds,
        category_filter: Option<FaultCategory>,
    ) -> Vec<FaultRecord> {
        let relays = self.relays.read();
        let Some(state) = relays.get(relay) else { return Vec::new() };
        let mut matched: Vec<_> = state
            .records
            .iter()
            .filter(|record| bounds.contains(record.slot()))
            .filter(|record| category_filter.map_or(true, |category| record.category == category))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.slot().cmp(&a.slot()));
        matched.truncate(MAX_RECORDS_RETURNED);
        matched
    }

    /// Time-weighted reputation: 100 with no faults in range, else decays
    /// toward 0 the more recently the last fault occurred.
    pub fn reputation_score(&self, relay: &BlsPublicKey, bounds: SlotBounds, current_slot: Slot) -> f64 {
        let relays = self.relays.read();
        let Some(state) = relays.get(relay) else { return 100.0 };
        let most_recent_fault = state
            .records
            .iter()
            .filter(|record| bounds.contains(record.slot()))
            .filter(|record| record.category != FaultCategory::ValidBid)
            .map(|record| record.slot())
            .max();

        match most_recent_fault {
            None => 100.0,
            Some(fault_slot) => {
                let elapsed = current_slot.saturating_sub(fault_slot) as f64;
                100.0 * (1.0 - (-0.1 * elapsed).exp())
            }
        }
    }

    /// `min(100, 100 * bids_analyzed / (slot_span + 1))`, where `slot_span`
    /// depends on which of `bounds.start`/`bounds.end` are present.
    pub fn bid_delivery_score(&self, relay: &BlsPublicKey, bounds: SlotBounds, current_slot: Slot) -> f64 {
        let relays = self.relays.read();
        let Some(state) = relays.get(relay) else { return 0.0 };
        let bids_analyzed =
            state.records.iter().filter(|record| bounds.contains(record.slot())).count() as f64;

        let slot_span = match (bounds.start, bounds.end) {
            (None, Some(end)) => end,
            (Some(start), None) => current_slot.saturating_sub(start),
            (Some(start), Some(end)) => end.saturating_sub(start),
            (None, None) => current_slot,
        } as f64;

        (100.0 * bids_analyzed / (slot_span + 1.0)).min(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethereum_consensus::{builder::ValidatorRegistration, primitives::BlsSignature};

    fn registration(public_key: BlsPublicKey, timestamp: u64, gas_limit: u64) -> SignedValidatorRegistration {
        SignedValidatorRegistration {
            message: ValidatorRegistration {
                fee_recipient: Default::default(),
                gas_limit,
                timestamp,
                public_key,
            },
            signature: BlsSignature::default(),
        }
    }

    #[test]
    fn test_registration_latest_wins() {
        let store = FaultStore::new();
        let proposer = BlsPublicKey::try_from(vec![7u8; 48].as_slice()).unwrap();

        assert!(store.put_validator_registration(registration(proposer.clone(), 1, 30_000_000)));
        assert!(store.put_validator_registration(registration(proposer.clone(), 3, 31_000_000)));
        assert!(!store.put_validator_registration(registration(proposer.clone(), 2, 29_000_000)));

        let latest = store.latest_registration(&proposer).unwrap();
        assert_eq!(latest.message.timestamp, 3);
        assert_eq!(latest.message.gas_limit, 31_000_000);
    }

    #[test]
    fn test_no_faults_scores_full_reputation() {
        let store = FaultStore::new();
        let relay = BlsPublicKey::default();
        assert_eq!(store.reputation_score(&relay, SlotBounds::default(), 100), 100.0);
    }
}
