use crate::{
    event::{BidEvent, Event},
    relay_client::RelayClient,
};
use ethereum_consensus::primitives::{BlsPublicKey, Slot};
use futures::Stream;
use futures_util::StreamExt;
use relay_monitor_types::types::BidContext;
use relay_monitor_consensus::ConsensusContext;
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tracing::{trace, warn};

const RETRIES: usize = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// The event channel's buffer; the collector blocks on send once full, which
/// is the intended backpressure mechanism rather than a silent drop.
pub const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Drives one relay's per-slot bid acquisition: on every slot tick it
/// resolves parent hash and proposer from the consensus context, requests a
/// bid, and publishes a `BidEvent` — or emits nothing if the sequence still
/// fails after retries.
pub struct Collector {
    relay: RelayClient,
    ccc: Arc<ConsensusContext>,
    events: mpsc::Sender<Event>,
}

impl Collector {
    pub fn new(relay: RelayClient, ccc: Arc<ConsensusContext>, events: mpsc::Sender<Event>) -> Self {
        Self { relay, ccc, events }
    }

    pub fn relay_public_key(&self) -> BlsPublicKey {
        self.relay.public_key().clone()
    }

    pub async fn run(self, mut slots: impl Stream<Item = Slot> + Unpin) {
        while let Some(slot) = slots.next().await {
            self.collect_slot(slot).await;
        }
    }

    async fn collect_slot(&self, slot: Slot) {
        for attempt in 0..=RETRIES {
            match self.try_collect(slot).await {
                Ok(event) => {
                    // the event channel is bounded; a full channel applies
                    // backpressure to this collector rather than dropping.
                    if self.events.send(Event::Bid(event)).await.is_err() {
                        warn!(%slot, "event channel closed; analyzer has shut down");
                    }
                    return
                }
                Err(err) if attempt < RETRIES => {
                    trace!(%slot, attempt, %err, "retrying bid collection");
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(err) => {
                    warn!(%slot, %err, "no bid collected for slot after retries");
                }
            }
        }
    }

    async fn try_collect(&self, slot: Slot) -> Result<BidEvent, CollectError> {
        let parent = self.ccc.get_parent_hash(slot).await?;
        let proposer = self.ccc.get_proposer_public_key(slot)?;
        let response = self.relay.get_bid(slot, &parent, &proposer).await?;

        let context = BidContext {
            slot,
            parent_hash: parent,
            proposer_public_key: proposer,
            relay_public_key: self.relay.public_key().clone(),
        };

        Ok(BidEvent { context, bid: response.bid, latency: response.latency })
    }
}

#[derive(Debug, thiserror::Error)]
enum CollectError {
    #[error("{0}")]
    Consensus(#[from] relay_monitor_types::Error),
    #[error("{0}")]
    Relay(#[from] crate::error::Error),
}
