use ethereum_consensus::{primitives::Slot, Error as ConsensusError};
use thiserror::Error;

/// Errors surfaced by the consensus context cache, keyed to the taxonomy in
/// the error-handling design: a `ConsensusContextMissing` result means the
/// caller should skip the bid for this slot rather than treat it as fatal.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no cached proposer for slot {0}; awaiting a proposer-duties refill")]
    MissingProposer(Slot),
    #[error("no block number mapping for execution block number {0}")]
    MissingBlockNumberMapping(u64),
    #[error("no cached block for slot {0} after exhausting the back-fill search")]
    MissingBlock(Slot),
    #[error("beacon api error: {0}")]
    Api(#[from] beacon_api_client::Error),
    #[error("{0}")]
    Consensus(#[from] ConsensusError),
}
