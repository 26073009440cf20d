//! Single-threaded event-channel consumer: dispatches each collected event
//! to the short-circuit validator and the fault store. Runs as one task, per
//! the concurrency model's "one analyzer worker".

use crate::{
    audit::AuditRecord,
    store::FaultStore,
    validate::{self, BidOutcome},
};
use relay_monitor_collector::event::{AuctionTranscriptEvent, BidEvent, ValidatorRegistrationEvent};
use relay_monitor_collector::Event;
use relay_monitor_consensus::{ConsensusContext, SignatureDomains};
use relay_monitor_types::{signing, Clock, FaultReason, FaultRecord};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

pub struct Analyzer {
    ccc: Arc<ConsensusContext>,
    domains: Arc<SignatureDomains>,
    clock: Arc<Clock>,
    store: Arc<FaultStore>,
    events: mpsc::Receiver<Event>,
    /// Region tag embedded in audit records (spec §6's `region` config key).
    region: Option<String>,
    /// The audit sink, if one is configured; absent entirely when
    /// `output.path` and `kafka.*` are both unset.
    audit: Option<mpsc::UnboundedSender<AuditRecord>>,
}

impl Analyzer {
    pub fn new(
        ccc: Arc<ConsensusContext>,
        domains: Arc<SignatureDomains>,
        clock: Arc<Clock>,
        store: Arc<FaultStore>,
        events: mpsc::Receiver<Event>,
    ) -> Self {
        Self { ccc, domains, clock, store, events, region: None, audit: None }
    }

    pub fn with_audit_sink(mut self, region: Option<String>, audit: mpsc::UnboundedSender<AuditRecord>) -> Self {
        self.region = region;
        self.audit = Some(audit);
        self
    }

    pub async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            match event {
                Event::Bid(event) => self.handle_bid(event).await,
                Event::ValidatorRegistration(event) => self.handle_registration(event),
                Event::AuctionTranscript(event) => self.handle_transcript(event).await,
            }
        }
    }

    async fn handle_bid(&self, event: BidEvent) {
        let BidEvent { context, bid, latency } = event;
        let relay = context.relay_public_key.clone();

        if let Some(bid) = &bid {
            self.store.put_bid(&relay, context.clone(), bid.clone());
        }

        let registration = self.store.latest_registration(&context.proposer_public_key);
        let outcome = validate::validate_bid(
            &context,
            bid.as_ref(),
            &self.ccc,
            &self.domains,
            &self.clock,
            registration.as_ref(),
        )
        .await;

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(%err, slot = context.slot, "consensus context error while validating bid");
                return
            }
        };

        if let BidOutcome::NoBid = outcome {
            self.store.record_no_bid(&relay);
            return
        }

        let fault_reason = match outcome {
            BidOutcome::NoBid => unreachable!(),
            BidOutcome::Valid => None,
            BidOutcome::Invalid(reason) => Some(reason),
        };

        if let Some(audit) = &self.audit {
            let record = AuditRecord::new(
                self.region.clone(),
                &relay,
                context.slot,
                latency.as_millis(),
                bid.clone(),
                fault_reason,
            );
            let _ = audit.send(record);
        }

        let record = match fault_reason {
            None => FaultRecord::valid(context),
            Some(reason) => FaultRecord::invalid(context, reason),
        };
        self.store.record_outcome(&relay, record);
    }

    fn handle_registration(&self, event: ValidatorRegistrationEvent) {
        self.store.put_validator_registration(event.registration);
    }

    async fn handle_transcript(&self, event: AuctionTranscriptEvent) {
        let AuctionTranscriptEvent { relay_public_key, transcript } = event;
        let bid = &transcript.bid;
        let acceptance = &transcript.acceptance;

        let header = bid.message.header();
        let slot = acceptance.message.slot;

        let proposer_index = acceptance.message.proposer_index;
        let proposer_public_key = match self.ccc.get_proposer_public_key(slot) {
            Ok(public_key) => public_key,
            Err(err) => {
                warn!(%err, %slot, proposer_index, "cannot resolve proposer for transcript; dropping");
                return
            }
        };

        let mut message = acceptance.message.clone();
        let domain = match self.domains.for_slot(slot) {
            Ok(domain) => domain,
            Err(err) => {
                warn!(%err, %slot, "cannot resolve signature domain for transcript; dropping");
                return
            }
        };
        let signing_root = match signing::compute_signing_root(&mut message, domain) {
            Ok(root) => root,
            Err(err) => {
                warn!(%err, %slot, "cannot compute signing root for transcript acceptance; dropping");
                return
            }
        };
        if signing::verify_signature(&proposer_public_key, signing_root.as_ref(), &acceptance.signature).is_err() {
            warn!(%slot, "transcript acceptance signature invalid; dropping");
            return
        }

        let context = relay_monitor_types::types::BidContext {
            slot,
            parent_hash: header.parent_hash().clone(),
            proposer_public_key,
            relay_public_key: relay_public_key.clone(),
        };

        if let Some(stored) = self.store.get_bid(&relay_public_key, &context) {
            if stored.message.header().block_hash() != bid.message.header().block_hash() {
                self.store.record_uncounted(
                    &relay_public_key,
                    FaultRecord::invalid(context.clone(), FaultReason::TranscriptBidMismatch),
                );
            }
        }

        self.store.put_acceptance(&relay_public_key, context, acceptance.clone());
    }
}
