use ethereum_consensus::primitives::BlsPublicKey;
use relay_monitor_types::types::{AuctionTranscript, BidContext, SignedBid, SignedValidatorRegistration};
use std::time::Duration;

/// The three event kinds that cross the bounded event channel into the
/// analyzer. The channel is the ownership-transfer boundary: once sent, the
/// collector never touches the event again.
#[derive(Debug)]
pub enum Event {
    Bid(BidEvent),
    ValidatorRegistration(ValidatorRegistrationEvent),
    AuctionTranscript(AuctionTranscriptEvent),
}

#[derive(Debug)]
pub struct BidEvent {
    pub context: BidContext,
    pub bid: Option<SignedBid>,
    pub latency: Duration,
}

#[derive(Debug)]
pub struct ValidatorRegistrationEvent {
    pub registration: SignedValidatorRegistration,
}

#[derive(Debug)]
pub struct AuctionTranscriptEvent {
    pub relay_public_key: BlsPublicKey,
    pub transcript: AuctionTranscript,
}
