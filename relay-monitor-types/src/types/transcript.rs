use crate::types::{SignedBid, SignedBlindedBeaconBlock};

/// A relay-published record pairing the bid it offered with the signed,
/// blinded block the proposer ultimately accepted for it. Ingesting these
/// lets the analyzer catch a relay that serves one bid over `getHeader` and
/// reveals a different payload once the block lands (`TranscriptBidMismatch`).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AuctionTranscript {
    pub bid: SignedBid,
    pub acceptance: SignedBlindedBeaconBlock,
}
