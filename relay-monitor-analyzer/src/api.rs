//! The inbound HTTP query surface ("transport glue" row of the component
//! table): fault summaries, records, and the extended score endpoints,
//! plus a relay health check and the registration/transcript ingest routes.
//! Wired the same way as `mev_rs::blinded_block_provider::api::server`:
//! `axum::Router` + `State` + typed handlers returning `IntoResponse`.

use crate::{
    error::Error,
    registry::RelayRegistry,
    store::{FaultStore, SlotBounds},
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use ethereum_consensus::{
    builder::SignedValidatorRegistration,
    primitives::{BlsPublicKey, Slot},
};
use relay_monitor_collector::event::{AuctionTranscriptEvent, Event, ValidatorRegistrationEvent};
use relay_monitor_types::{types::AuctionTranscript, Clock, FaultCategory};
use serde::{Deserialize, Serialize};
use std::{str::FromStr, sync::Arc};
use tokio::sync::mpsc;

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<FaultStore>,
    pub clock: Arc<Clock>,
    pub registry: Arc<RelayRegistry>,
    /// The same bounded channel the collector publishes onto; registration
    /// and transcript submissions from proposers are just another producer.
    pub events: mpsc::Sender<Event>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/healthz", get(handle_health))
        .route("/api/v1/relay-monitor/relays", get(handle_relays))
        .route("/api/v1/relay-monitor/faults", get(handle_faults))
        .route("/api/v1/relay-monitor/records/:relay", get(handle_records))
        .route("/api/v1/relay-monitor/score/:relay", get(handle_score))
        .route("/eth/v1/builder/validators", post(handle_validator_registration))
        .route("/api/v1/relay-monitor/transcript/:relay", post(handle_auction_transcript))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct SlotRangeQuery {
    start: Option<Slot>,
    end: Option<Slot>,
}

impl From<SlotRangeQuery> for SlotBounds {
    fn from(query: SlotRangeQuery) -> Self {
        SlotBounds { start: query.start, end: query.end }
    }
}

#[derive(Debug, Serialize)]
struct Envelope<T> {
    slot_bounds: SlotRangeQueryEcho,
    data: T,
}

#[derive(Debug, Serialize)]
struct SlotRangeQueryEcho {
    start: Option<Slot>,
    end: Option<Slot>,
}

impl From<SlotRangeQuery> for SlotRangeQueryEcho {
    fn from(query: SlotRangeQuery) -> Self {
        Self { start: query.start, end: query.end }
    }
}

async fn handle_health() -> impl IntoResponse {
    axum::http::StatusCode::OK
}

async fn handle_relays(State(state): State<ApiState>) -> impl IntoResponse {
    Json(state.registry.all().to_vec())
}

/// `GET /api/v1/relay-monitor/faults[?start=&end=]` — mapping relay pubkey
/// to `FaultSummary`, one entry per relay the monitor knows about (including
/// excluded ones, which read back with all-zero counters).
async fn handle_faults(
    State(state): State<ApiState>,
    Query(query): Query<SlotRangeQuery>,
) -> impl IntoResponse {
    let bounds: SlotBounds = SlotRangeQuery { start: query.start, end: query.end }.into();
    let data: std::collections::BTreeMap<String, _> = state
        .registry
        .all()
        .iter()
        .map(|relay| {
            let summary = state.store.fault_summary(&relay.public_key, bounds);
            (format!("{:#x}", &relay.public_key), summary)
        })
        .collect();
    Json(Envelope { slot_bounds: SlotRangeQueryEcho { start: query.start, end: query.end }, data })
}

#[derive(Debug, Deserialize)]
struct RecordsQuery {
    start: Option<Slot>,
    end: Option<Slot>,
    category: Option<String>,
}

async fn handle_records(
    State(state): State<ApiState>,
    Path(relay): Path<String>,
    Query(query): Query<RecordsQuery>,
) -> Result<impl IntoResponse, Error> {
    let relay = parse_relay_public_key(&relay)?;
    let category = query
        .category
        .as_deref()
        .map(FaultCategory::from_str)
        .transpose()
        .map_err(|_| Error::InvalidRequest(format!("invalid category filter: {:?}", query.category)))?;
    let bounds = SlotBounds { start: query.start, end: query.end };
    let data = state.store.records(&relay, bounds, category);
    Ok(Json(Envelope {
        slot_bounds: SlotRangeQueryEcho { start: query.start, end: query.end },
        data,
    }))
}

#[derive(Debug, Serialize)]
struct Scores {
    reputation_score: f64,
    bid_delivery_score: f64,
}

async fn handle_score(
    State(state): State<ApiState>,
    Path(relay): Path<String>,
    Query(query): Query<SlotRangeQuery>,
) -> Result<impl IntoResponse, Error> {
    let relay = parse_relay_public_key(&relay)?;
    let bounds = SlotBounds { start: query.start, end: query.end };
    let current_slot = state.clock.current_slot();
    let data = Scores {
        reputation_score: state.store.reputation_score(&relay, bounds, current_slot),
        bid_delivery_score: state.store.bid_delivery_score(&relay, bounds, current_slot),
    };
    Ok(Json(Envelope {
        slot_bounds: SlotRangeQueryEcho { start: query.start, end: query.end },
        data,
    }))
}

/// Proposers submit their validator registration directly to the monitor
/// the same way they would to a relay; accepted registrations are fed into
/// the analyzer's event channel so `latest_registration` lookups observe
/// them for subsequent bid validation.
async fn handle_validator_registration(
    State(state): State<ApiState>,
    Json(registrations): Json<Vec<SignedValidatorRegistration>>,
) -> Result<(), Error> {
    for registration in registrations {
        let event = Event::ValidatorRegistration(ValidatorRegistrationEvent { registration });
        if state.events.send(event).await.is_err() {
            tracing::warn!("event channel closed while submitting validator registration");
        }
    }
    Ok(())
}

async fn handle_auction_transcript(
    State(state): State<ApiState>,
    Path(relay): Path<String>,
    Json(transcript): Json<AuctionTranscript>,
) -> Result<(), Error> {
    let relay_public_key = parse_relay_public_key(&relay)?;
    let event = Event::AuctionTranscript(AuctionTranscriptEvent { relay_public_key, transcript });
    if state.events.send(event).await.is_err() {
        tracing::warn!("event channel closed while submitting auction transcript");
    }
    Ok(())
}

fn parse_relay_public_key(input: &str) -> Result<BlsPublicKey, Error> {
    let stripped = input.strip_prefix("0x").unwrap_or(input);
    let bytes = hex::decode(stripped).map_err(|_| Error::UnknownRelay(input.to_string()))?;
    BlsPublicKey::try_from(bytes.as_slice()).map_err(|_| Error::UnknownRelay(input.to_string()))
}
