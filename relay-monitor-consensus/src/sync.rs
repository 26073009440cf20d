//! "Consensus sync": the cooperative background loops that keep the
//! [`ConsensusContext`] warm — a head-event subscriber and the two
//! epoch-boundary refill loops, wired together the way
//! `mev_relay_rs::service::Service::run` wires its own timer/duty/validator
//! tasks with `tokio::spawn` + a shared broadcast of ticks.

use crate::context::ConsensusContext;
use backoff::{backoff::Backoff, ExponentialBackoff};
use ethereum_consensus::primitives::{Epoch, Hash32, Slot};
use futures_util::StreamExt;
use serde::Deserialize;
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use url::Url;

#[derive(Debug, Clone, Deserialize)]
struct HeadEvent {
    #[serde(with = "relay_monitor_types::serde::as_str")]
    slot: Slot,
    block: Hash32,
}

/// Subscribes to `/eth/v1/events?topics=head` and forwards each parsed head
/// coordinate on `sender`. Reconnects with exponential backoff on stream
/// close or transport error; parse errors are logged and dropped without
/// tearing down the connection, per the head-stream contract.
pub async fn stream_heads(base_url: Url, sender: mpsc::Sender<(Slot, Hash32)>) {
    let mut backoff = ExponentialBackoff {
        initial_interval: Duration::from_millis(500),
        max_interval: Duration::from_secs(30),
        max_elapsed_time: None,
        ..Default::default()
    };

    loop {
        match subscribe_once(&base_url, &sender).await {
            Ok(()) => {
                warn!("head event stream closed; resubscribing");
                backoff.reset();
            }
            Err(err) => {
                warn!(%err, "head event stream failed");
            }
        }

        let delay = backoff.next_backoff().unwrap_or(Duration::from_secs(30));
        tokio::time::sleep(delay).await;
    }
}

async fn subscribe_once(
    base_url: &Url,
    sender: &mpsc::Sender<(Slot, Hash32)>,
) -> Result<(), reqwest::Error> {
    let target = base_url.join("/eth/v1/events?topics=head").expect("valid base url");
    let response = reqwest::get(target).await?.error_for_status()?;
    let mut lines = response.bytes_stream();
    let mut buffer = String::new();

    while let Some(chunk) = lines.next().await {
        let chunk = chunk?;
        buffer.push_str(&String::from_utf8_lossy(&chunk));
        while let Some(index) = buffer.find('\n') {
            let line = buffer[..index].trim_end_matches('\r').to_string();
            buffer.drain(..=index);
            let Some(data) = line.strip_prefix("data:") else { continue };
            match serde_json::from_str::<HeadEvent>(data.trim()) {
                Ok(event) => {
                    if sender.send((event.slot, event.block)).await.is_err() {
                        return Ok(())
                    }
                }
                Err(err) => debug!(%err, %data, "dropping unparseable head event"),
            }
        }
    }
    Ok(())
}

/// Drives the consensus context's background refresh: warms the block cache
/// on every head event and refills proposer duties / validator maps on
/// every epoch boundary.
pub async fn run(
    ccc: Arc<ConsensusContext>,
    beacon_url: Url,
    mut epoch_ticks: impl futures::Stream<Item = Epoch> + Unpin,
) {
    let (head_tx, mut head_rx) = mpsc::channel(32);
    tokio::spawn(stream_heads(beacon_url, head_tx));

    loop {
        tokio::select! {
            Some((slot, _root)) = head_rx.recv() => {
                if let Err(err) = ccc.observe_block_at(slot).await {
                    warn!(%slot, %err, "failed to warm block cache from head event");
                }
            }
            Some(epoch) = epoch_ticks.next() => {
                let next_epoch = epoch + 1;
                if let Err(err) = ccc.refresh_proposer_duties(next_epoch).await {
                    error!(epoch = next_epoch, %err, "failed to refill proposer duties");
                }
                if let Err(err) = ccc.refresh_validators(next_epoch).await {
                    error!(epoch = next_epoch, %err, "failed to refresh validator maps");
                }
                info!(epoch = next_epoch, "consensus sync refilled duties and validators");
            }
            else => break,
        }
    }
}
