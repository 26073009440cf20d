//! Tracks which configured relays are currently in the monitored set.
//!
//! Grounded in the spec's "relay exclusion bookkeeping" note: relays that
//! fail `status()` at startup are excluded from collection but, unlike the
//! bare slice the spec describes, this registry records *why* so the
//! `/healthz`-style surface can report it instead of the relay just
//! vanishing from view.

use ethereum_consensus::primitives::BlsPublicKey;
use url::Url;

#[derive(Debug, Clone, serde::Serialize)]
pub struct RelayInfo {
    pub public_key: BlsPublicKey,
    #[serde(serialize_with = "serialize_url")]
    pub url: Url,
    /// `None` when the relay passed its startup status check and is being
    /// actively collected from; `Some(reason)` when it was excluded.
    pub excluded: Option<String>,
}

fn serialize_url<S: serde::Serializer>(url: &Url, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(url.as_str())
}

#[derive(Debug, Default, Clone)]
pub struct RelayRegistry {
    relays: Vec<RelayInfo>,
}

impl RelayRegistry {
    pub fn new(relays: Vec<RelayInfo>) -> Self {
        Self { relays }
    }

    pub fn all(&self) -> &[RelayInfo] {
        &self.relays
    }

    pub fn is_known(&self, public_key: &BlsPublicKey) -> bool {
        self.relays.iter().any(|relay| &relay.public_key == public_key)
    }

    pub fn active_count(&self) -> usize {
        self.relays.iter().filter(|relay| relay.excluded.is_none()).count()
    }
}
