//! The audit record shape from spec §6: one JSON object per analyzed bid,
//! `{timestamp, region, relay, slot, rtt_ms, bid?, error?}`. Emitting these
//! is in scope; *where they end up* (a file, a Kafka topic) is the external
//! collaborator the spec calls out as out of scope, so this module only
//! produces the record and hands it to whatever sink the binary wired up.

use ethereum_consensus::primitives::{BlsPublicKey, Slot};
use relay_monitor_types::{types::SignedBid, FaultReason};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, serde::Serialize)]
pub struct AuditError {
    pub category: String,
    pub reason: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct AuditRecord {
    pub timestamp: u64,
    pub region: Option<String>,
    pub relay: String,
    pub slot: Slot,
    pub rtt_ms: u128,
    pub bid: Option<SignedBid>,
    pub error: Option<AuditError>,
}

impl AuditRecord {
    pub fn new(
        region: Option<String>,
        relay: &BlsPublicKey,
        slot: Slot,
        rtt_ms: u128,
        bid: Option<SignedBid>,
        fault: Option<FaultReason>,
    ) -> Self {
        let timestamp =
            SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
        let error = fault.map(|reason| AuditError {
            category: reason.category().to_string(),
            reason: reason.to_string(),
        });
        Self { timestamp, region, relay: format!("{relay:#x}"), slot, rtt_ms, bid, error }
    }
}
