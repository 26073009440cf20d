//! Spins up the query API against a pre-populated `FaultStore` and hits it
//! with a real HTTP client, the same pattern `mev-boost-rs`'s own
//! `tests/integration.rs` uses (spawn a server, talk to it over the wire)
//! scaled down to the surface this binary actually owns: no live beacon
//! node or relay is required to exercise the reporting endpoints.

use ethereum_consensus::primitives::BlsPublicKey;
use relay_monitor_analyzer::{api, ApiState, FaultStore, RelayInfo, RelayRegistry};
use relay_monitor_types::{types::BidContext, Clock, FaultRecord, FaultReason};
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::mpsc;

fn relay_public_key(byte: u8) -> BlsPublicKey {
    BlsPublicKey::try_from(vec![byte; 48].as_slice()).unwrap()
}

async fn spawn_api(store: Arc<FaultStore>, registry: Arc<RelayRegistry>) -> String {
    let clock = Arc::new(Clock::new(0, 12, 32));
    let (events_tx, _events_rx) = mpsc::channel(32);
    let state = ApiState { store, clock, registry, events: events_tx };

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();

    let app = api::router(state);
    tokio::spawn(async move {
        axum::Server::from_tcp(listener)
            .unwrap()
            .serve(app.into_make_service())
            .await
            .unwrap();
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn test_healthz() {
    let store = Arc::new(FaultStore::new());
    let registry = Arc::new(RelayRegistry::new(Vec::new()));
    let base = spawn_api(store, registry).await;

    let response = reqwest::get(format!("{base}/healthz")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn test_relays_reports_excluded_reason() {
    let relay = relay_public_key(1);
    let registry = Arc::new(RelayRegistry::new(vec![RelayInfo {
        public_key: relay.clone(),
        url: "https://relay.example".parse().unwrap(),
        excluded: Some("connection refused".to_string()),
    }]));
    let store = Arc::new(FaultStore::new());
    let base = spawn_api(store, registry).await;

    let response = reqwest::get(format!("{base}/api/v1/relay-monitor/relays")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    let relays = body.as_array().unwrap();
    assert_eq!(relays.len(), 1);
    assert_eq!(relays[0]["excluded"], "connection refused");
}

#[tokio::test]
async fn test_faults_and_records_reflect_stored_outcomes() {
    let relay = relay_public_key(2);
    let proposer = relay_public_key(3);

    let store = Arc::new(FaultStore::new());
    let context = BidContext { slot: 100, proposer_public_key: proposer, relay_public_key: relay.clone(), ..Default::default() };
    store.record_outcome(&relay, FaultRecord::invalid(context.clone(), FaultReason::InvalidParentHash));
    store.record_no_bid(&relay);

    let registry = Arc::new(RelayRegistry::new(vec![RelayInfo {
        public_key: relay.clone(),
        url: "https://relay.example".parse().unwrap(),
        excluded: None,
    }]));
    let base = spawn_api(store, registry).await;
    let relay_hex = format!("{relay:#x}");

    let response = reqwest::get(format!("{base}/api/v1/relay-monitor/faults")).await.unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    let summary = &body["data"][&relay_hex];
    assert_eq!(summary["total_bids"], 1);
    assert_eq!(summary["no_bids"], 1);
    assert_eq!(summary["consensus_invalid"], 1);

    let response = reqwest::get(format!(
        "{base}/api/v1/relay-monitor/records/{relay_hex}?category=invalid-bid-consensus"
    ))
    .await
    .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    let records = body["data"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["category"], "InvalidBidConsensus");

    let response = reqwest::get(format!(
        "{base}/api/v1/relay-monitor/records/{relay_hex}?category=valid-bid"
    ))
    .await
    .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_records_rejects_unknown_category() {
    let relay = relay_public_key(4);
    let store = Arc::new(FaultStore::new());
    let registry = Arc::new(RelayRegistry::new(Vec::new()));
    let base = spawn_api(store, registry).await;
    let relay_hex = format!("{relay:#x}");

    let response = reqwest::get(format!(
        "{base}/api/v1/relay-monitor/records/{relay_hex}?category=not-a-real-category"
    ))
    .await
    .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_score_endpoint_defaults_for_unknown_relay() {
    let relay = relay_public_key(5);
    let store = Arc::new(FaultStore::new());
    let registry = Arc::new(RelayRegistry::new(Vec::new()));
    let base = spawn_api(store, registry).await;
    let relay_hex = format!("{relay:#x}");

    let response = reqwest::get(format!("{base}/api/v1/relay-monitor/score/{relay_hex}")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["reputation_score"], 100.0);
    assert_eq!(body["data"]["bid_delivery_score"], 0.0);
}
