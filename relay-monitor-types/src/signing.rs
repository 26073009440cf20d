//! Signature-domain computation shared by the consensus cache and the
//! bid-validation state machine.
//!
//! Grounded in `mev_rs::signing`: the builder domain is fork-independent
//! (builder messages are always signed over the genesis fork version), while
//! the beacon-proposer domain used to verify a proposer's blinded-block
//! acceptance is fork-aware and must be computed per-slot.

pub use ethereum_consensus::signing::{compute_signing_root, verify_signature};
use ethereum_consensus::{
    builder::compute_builder_domain,
    domains::DomainType,
    phase0::mainnet::compute_domain,
    primitives::{BlsPublicKey, BlsSignature, Domain, Slot},
    signing::verify_signed_data,
    ssz::prelude::SimpleSerialize,
    state_transition::{Context, Error},
    Fork,
};

/// The fixed domain builder bids are signed under, memoized once per process
/// by callers (see `relay_monitor_consensus::domain`).
pub fn signature_domain_for_builder(context: &Context) -> Result<Domain, Error> {
    compute_builder_domain(context)
}

/// The fork-aware domain used for proposer/beacon-block signatures at `slot`.
pub fn signature_domain_for_slot(context: &Context, slot: Slot) -> Result<Domain, Error> {
    let fork_version = match context.fork_for(slot) {
        Fork::Phase0 => context.genesis_fork_version,
        Fork::Altair => context.altair_fork_version,
        Fork::Bellatrix => context.bellatrix_fork_version,
        Fork::Capella => context.capella_fork_version,
        Fork::Deneb => context.deneb_fork_version,
        Fork::Electra => context.electra_fork_version,
    };
    compute_domain(DomainType::BeaconProposer, Some(fork_version), None, context)
}

pub fn verify_signed_consensus_message<T: SimpleSerialize>(
    message: &mut T,
    signature: &BlsSignature,
    public_key: &BlsPublicKey,
    context: &Context,
    slot: Slot,
) -> Result<(), Error> {
    let domain = signature_domain_for_slot(context, slot)?;
    verify_signed_data(message, signature, public_key, domain)
}

pub fn verify_builder_signed_message<T: SimpleSerialize>(
    message: &mut T,
    signature: &BlsSignature,
    public_key: &BlsPublicKey,
    context: &Context,
) -> Result<(), Error> {
    let domain = signature_domain_for_builder(context)?;
    let signing_root = compute_signing_root(message, domain)?;
    verify_signature(public_key, signing_root.as_ref(), signature)
}
