use ethereum_consensus::{crypto::Error as CryptoError, primitives::Slot};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayUrlError {
    #[error("{0}")]
    Bls(#[from] CryptoError),
    #[error("{0}")]
    Hex(#[from] hex::FromHexError),
    #[error("public key {0} missing '0x' hex prefix")]
    Missing0xPrefix(String),
    #[error("URL {0} missing public key username")]
    MissingPublicKey(String),
}

/// Errors a single `getBid`/`status` round-trip can surface. Transport and
/// protocol errors are both non-fatal to the collector: the caller retries a
/// bounded number of times, then skips the slot.
#[derive(Debug, Error)]
pub enum Error {
    #[error("request to relay timed out or failed to connect: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("relay responded with unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("could not decode bid from relay response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("{0}")]
    Relay(#[from] Error),
    #[error("{0}")]
    Consensus(#[from] relay_monitor_types::Error),
    #[error("no bid available for slot {0} after exhausting retries")]
    NoBidAfterRetries(Slot),
}
