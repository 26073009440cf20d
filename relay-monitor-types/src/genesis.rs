use beacon_api_client::mainnet::Client;
use ethereum_consensus::{networks::typical_genesis_time, state_transition::Context};
use tracing::warn;

/// Resolves the genesis time for the clock: prefer the value baked into the
/// network `Context`, fall back to asking the configured beacon node, and
/// finally fall back to a best guess so a transient beacon-node outage at
/// startup does not prevent the monitor from coming up with *some* clock.
pub async fn get_genesis_time(context: &Context, beacon_node: &Client) -> u64 {
    match context.genesis_time() {
        Ok(genesis_time) => genesis_time,
        Err(_) => match beacon_node.get_genesis_details().await {
            Ok(details) => details.genesis_time,
            Err(err) => {
                warn!(%err, "could not get `genesis_time` from beacon node; using best guess");
                typical_genesis_time(context)
            }
        },
    }
}
