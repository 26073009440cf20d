//! Wires the five components together the way `mev_relay_rs::service::
//! Service::run` wires its own timer/proposer-scheduler/builder/relay tasks:
//! construct the component graph, spawn one task per cooperative loop, then
//! `join_all` them for the lifetime of the process.

use crate::config::Config;
use beacon_api_client::mainnet::Client as BeaconClient;
use ethereum_consensus::state_transition::Context;
use futures::future::join_all;
use relay_monitor_analyzer::{api, Analyzer, ApiState, FaultStore, RelayInfo, RelayRegistry};
use relay_monitor_collector::{Collector, RelayClient, RelayEndpoint, EVENT_CHANNEL_CAPACITY};
use relay_monitor_consensus::{sync, ConsensusContext, SignatureDomains};
use relay_monitor_types::{genesis::get_genesis_time, Clock, Network};
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use url::Url;

pub struct Service {
    config: Config,
}

impl Service {
    pub fn from(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(self) -> eyre::Result<()> {
        let Config { network, consensus, relays, api: api_config, output, kafka, region } =
            self.config;

        let context: Context = (&network.name).try_into()?;
        let beacon_url: Url = consensus.endpoint.parse()?;
        let beacon_node = BeaconClient::new(beacon_url.clone());

        info!(network = %network.name, endpoint = %consensus.endpoint, "starting relay monitor");

        let genesis_time = get_genesis_time(&context, &beacon_node).await;
        let clock =
            Arc::new(Clock::new(genesis_time, context.seconds_per_slot, context.slots_per_epoch));

        let ccc = Arc::new(ConsensusContext::new(beacon_node.clone(), context.slots_per_epoch));
        let domains = Arc::new(SignatureDomains::new(context.clone())?);
        let store = Arc::new(FaultStore::new());

        if let Some(kafka) = &kafka {
            info!(
                topic = %kafka.topic,
                bootstrap_servers = %kafka.bootstrap_servers,
                "kafka audit sink configured; this build treats it as an external collaborator \
                 and writes audit records only to `output.path` (see config::KafkaConfig)",
            );
        }

        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let (relay_infos, collectors) =
            discover_relays(&relays, &ccc, &events_tx).await;
        let registry = Arc::new(RelayRegistry::new(relay_infos));
        if registry.active_count() == 0 {
            warn!("no relays passed their startup status check; faults endpoint will report baseline zero counters");
        }

        let mut tasks = Vec::new();

        for collector in collectors {
            let clock = clock.clone();
            tasks.push(tokio::spawn(async move {
                let slots = clock.stream_slots();
                tokio::pin!(slots);
                collector.run(slots).await;
            }));
        }

        {
            let ccc = ccc.clone();
            let clock = clock.clone();
            let beacon_url = beacon_url.clone();
            tasks.push(tokio::spawn(async move {
                let epochs = clock.stream_epochs();
                tokio::pin!(epochs);
                sync::run(ccc, beacon_url, epochs).await;
            }));
        }

        let audit_tx = match output {
            Some(output) => {
                let (tx, rx) = mpsc::unbounded_channel();
                tasks.push(tokio::spawn(crate::audit::run_file_sink(output.path, rx)));
                Some(tx)
            }
            None => None,
        };

        let mut analyzer =
            Analyzer::new(ccc.clone(), domains.clone(), clock.clone(), store.clone(), events_rx);
        if let Some(audit_tx) = audit_tx {
            analyzer = analyzer.with_audit_sink(region, audit_tx);
        }
        tasks.push(tokio::spawn(analyzer.run()));

        let api_state =
            ApiState { store: store.clone(), clock: clock.clone(), registry, events: events_tx };
        let addr = SocketAddr::from((api_config.host, api_config.port));
        let app = api::router(api_state);
        tasks.push(tokio::spawn(async move {
            info!(%addr, "listening for relay-monitor api requests");
            if let Err(err) = axum::Server::bind(&addr).serve(app.into_make_service()).await {
                error!(%err, "relay-monitor api server failed");
            }
        }));

        join_all(tasks).await;
        Ok(())
    }
}

/// Parses each configured relay URL, runs its startup `status()` check, and
/// splits the result into the registry's view (every relay, with exclusion
/// reasons) and the subset of live collectors to actually spawn. Per §5,
/// relays that fail this check are excluded for the run and never
/// periodically rechecked.
async fn discover_relays(
    relays: &[String],
    ccc: &Arc<ConsensusContext>,
    events_tx: &mpsc::Sender<relay_monitor_collector::Event>,
) -> (Vec<RelayInfo>, Vec<Collector>) {
    let mut relay_infos = Vec::new();
    let mut collectors = Vec::new();

    for raw in relays {
        let url: Url = match raw.parse() {
            Ok(url) => url,
            Err(err) => {
                warn!(relay = %raw, %err, "could not parse relay url; skipping");
                continue
            }
        };
        let endpoint = match RelayEndpoint::try_from(url) {
            Ok(endpoint) => endpoint,
            Err(err) => {
                warn!(relay = %raw, %err, "could not parse relay endpoint; skipping");
                continue
            }
        };

        let client = RelayClient::new(endpoint.clone());
        let excluded = match client.status().await {
            Ok(()) => None,
            Err(err) => {
                warn!(
                    relay = %endpoint.public_key(),
                    %err,
                    "relay failed startup status check; excluding for this run",
                );
                Some(err.to_string())
            }
        };

        let is_excluded = excluded.is_some();
        relay_infos.push(RelayInfo {
            public_key: endpoint.public_key().clone(),
            url: endpoint.url().clone(),
            excluded,
        });

        if !is_excluded {
            collectors.push(Collector::new(client, ccc.clone(), events_tx.clone()));
        }
    }

    (relay_infos, collectors)
}
