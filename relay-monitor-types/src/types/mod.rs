mod bid;
mod transcript;

pub use bid::{Bid, SignedBid};
pub use ethereum_consensus::{
    builder::{SignedValidatorRegistration, ValidatorRegistration},
    types::mainnet::{ExecutionPayloadHeader, SignedBlindedBeaconBlock},
};
pub use transcript::AuctionTranscript;

use ethereum_consensus::primitives::{BlsPublicKey, Hash32, Slot};

/// The unique coordinate of one bid attempt: relay `r`'s answer to "what is
/// your best header for (slot, parent_hash, proposer)". Frozen at collection
/// time (data-model lifecycle) and used as the key everywhere a bid is
/// stored, fetched, or analyzed (invariant 1).
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct BidContext {
    pub slot: Slot,
    pub parent_hash: Hash32,
    pub proposer_public_key: BlsPublicKey,
    pub relay_public_key: BlsPublicKey,
}

impl std::fmt::Display for BidContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "slot {}, parent hash {}, proposer {} and relay {}",
            self.slot, self.parent_hash, self.proposer_public_key, self.relay_public_key
        )
    }
}
